use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const TODO_PATH: &str = "/api/todo";
pub const ACCESS_HEADER: &str = "canaccess";

const USERS_JSON: &str = include_str!("../fixtures/users.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub name: String,
    pub is_complete: bool,
    pub date_due: String,
}

/// Create payload. `isComplete` may arrive as a boolean or as `"true"`/`"false"`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "flag")]
    pub is_complete: bool,
    pub date_due: String,
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Flag::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        Flag::Text(s) => Err(serde::de::Error::custom(format!("invalid flag {s:?}"))),
    }
}

#[derive(Debug)]
pub struct Store {
    todos: BTreeMap<i64, Todo>,
    next_id: i64,
}

impl Store {
    /// The records the todo service ships with.
    pub fn seeded() -> Self {
        let seed = [
            (1, "Walk the dog", false, "2019-12-31T00:00:00"),
            (2, "Feed the dog", false, "2019-12-30T00:00:00"),
            (3, "Do homework", true, "2020-01-02T00:00:00"),
        ];
        let todos: BTreeMap<i64, Todo> = seed
            .into_iter()
            .map(|(id, name, is_complete, date_due)| {
                (
                    id,
                    Todo {
                        id,
                        name: name.to_string(),
                        is_complete,
                        date_due: date_due.to_string(),
                    },
                )
            })
            .collect();
        let next_id = todos.keys().max().map_or(1, |max| max + 1);
        Self { todos, next_id }
    }

    fn insert(&mut self, input: CreateTodo) -> Result<Todo, StatusCode> {
        let id = if input.id == 0 { self.next_id } else { input.id };
        if id < 0 || self.todos.contains_key(&id) {
            return Err(StatusCode::CONFLICT);
        }
        let following = id.checked_add(1).ok_or(StatusCode::CONFLICT)?;
        self.next_id = self.next_id.max(following);
        let todo = Todo {
            id,
            name: input.name,
            is_complete: input.is_complete,
            date_due: input.date_due,
        };
        self.todos.insert(id, todo.clone());
        Ok(todo)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let todos = Router::new()
        .route(TODO_PATH, get(list_todos).post(create_todo))
        .route(&format!("{TODO_PATH}/{{id}}"), get(get_todo))
        .route_layer(middleware::from_fn(require_access))
        .with_state(db);
    Router::new().merge(todos).route("/users", get(list_users))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_access(request: Request, next: Next) -> Result<Response, StatusCode> {
    let granted = request
        .headers()
        .get(ACCESS_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    if !granted {
        debug!(uri = %request.uri(), "rejected request without access header");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let store = db.read().await;
    Json(store.todos.values().cloned().collect())
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), StatusCode> {
    let todo = db.write().await.insert(input)?;
    info!(id = todo.id, name = %todo.name, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Todo>, StatusCode> {
    let store = db.read().await;
    store.todos.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn list_users() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], USERS_JSON)
}
