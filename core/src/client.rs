//! Request builders and response parsers for the todo service and the user
//! directory.
//!
//! # Design
//! `TodoClient` and `UsersClient` hold only the URLs and headers derived from a
//! `Config` and carry no state between calls. Each operation is split into a
//! `build_*` method producing an `HttpRequest` and a `parse_*` method consuming
//! an `HttpResponse`; the transport in between is the caller's business.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{NewTodo, Todo, User};

/// Stateless client for the todo collection.
#[derive(Debug, Clone)]
pub struct TodoClient {
    collection_url: String,
    access: (String, String),
}

impl TodoClient {
    pub fn new(config: &Config) -> Self {
        Self {
            collection_url: config.todo_url(),
            access: (config.access_header.clone(), config.access_value.clone()),
        }
    }

    fn authorized(&self, request: HttpRequest) -> HttpRequest {
        request.with_header(&self.access.0, &self.access.1)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.authorized(HttpRequest::get(self.collection_url.clone()))
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        self.authorized(HttpRequest::get(format!("{}/{id}", self.collection_url)))
    }

    pub fn build_create_todo(&self, input: &NewTodo) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.build_create_raw(&body))
    }

    /// POST a hand-written JSON body as-is.
    pub fn build_create_raw(&self, body: &str) -> HttpRequest {
        self.authorized(HttpRequest::post_json(
            self.collection_url.clone(),
            body.to_string(),
        ))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    /// Any 2xx is accepted on create; the services in use answer 200 or 201.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_success(&response, 201)?;
        decode(&response)
    }

    /// Like `parse_create_todo` but keeps the body untyped for field lookups.
    pub fn parse_create_raw(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_success(&response, 201)?;
        decode(&response)
    }
}

/// Stateless client for the third-party user directory.
#[derive(Debug, Clone)]
pub struct UsersClient {
    users_url: String,
}

impl UsersClient {
    pub fn new(config: &Config) -> Self {
        Self {
            users_url: config.users_url(),
        }
    }

    pub fn build_list_users(&self) -> HttpRequest {
        HttpRequest::get(self.users_url.clone()).with_header("accept", "application/json")
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map a status other than `expected` to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(status_error(response, expected))
}

fn check_success(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(status_error(response, expected))
}

fn status_error(response: &HttpResponse, expected: u16) -> ApiError {
    if response.status == 404 {
        return ApiError::NotFound;
    }
    ApiError::HttpError {
        expected,
        status: response.status,
        body: response.body.clone(),
    }
}
