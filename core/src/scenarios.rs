//! The checks run against the todo service and the user directory.
//!
//! Each check issues one or two requests through the `Context` and returns
//! the first mismatch as an error. Checks share nothing but the read-only
//! configuration, so they can run in any order.

use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::expect::{
    expect_client_error, expect_eq, expect_field, expect_same_set, expect_status, field_i64,
};
use crate::http::HttpResponse;
use crate::suite::{Context, Scenario, Target};
use crate::types::{cities_where_suite_contains, NewTodo};

/// Hand-written create payload; the flag is deliberately sent as text.
pub const RAW_CREATE_BODY: &str =
    r#"{"name": "name-001","isComplete": "false","dateDue" : "2019-10-10T00:00:00Z"}"#;

pub const APT_MARKER: &str = "Apt.";
pub const APT_CITIES: [&str; 3] = ["South Christy", "South Elvis", "Gwenborough"];

/// An id the service never hands out.
pub const MISSING_TODO_ID: i64 = i32::MAX as i64;

pub fn all() -> Vec<Scenario> {
    vec![
        todo("list_fetch", list_fetch),
        todo("single_fetch", single_fetch),
        todo("create_from_raw_body", create_from_raw_body),
        todo("create_from_record", create_from_record),
        todo("create_round_trip", create_round_trip),
        todo("header_and_cookie", header_and_cookie),
        todo("repeated_fetch_is_stable", repeated_fetch_is_stable),
        todo("missing_id_is_client_error", missing_id_is_client_error),
        users("users_with_apartment_suites", users_with_apartment_suites),
        users(
            "all_cities_with_apartment_suites",
            all_cities_with_apartment_suites,
        ),
    ]
}

pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|s| s.name == name)
}

fn todo(name: &'static str, run: fn(&Context<'_>) -> Result<(), ApiError>) -> Scenario {
    Scenario {
        name,
        target: Target::TodoService,
        run,
    }
}

fn users(name: &'static str, run: fn(&Context<'_>) -> Result<(), ApiError>) -> Scenario {
    Scenario {
        name,
        target: Target::Users,
        run,
    }
}

fn json_body(response: &HttpResponse) -> Result<Value, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

pub fn list_fetch(ctx: &Context<'_>) -> Result<(), ApiError> {
    let todos = ctx.todos()?;
    let list = todos.parse_list_todos(ctx.send(todos.build_list_todos())?)?;

    let second = list.get(1).ok_or_else(|| ApiError::Mismatch {
        field: "length".to_string(),
        expected: "at least 2".to_string(),
        actual: list.len().to_string(),
    })?;
    expect_eq("[1].id", &2, &second.id)?;
    expect_eq("[1].name", "Feed the dog", second.name.as_str())?;
    expect_eq("[1].isComplete", &false, &second.is_complete)?;
    expect_eq("[1].dateDue", "2019-12-30T00:00:00", second.date_due.as_str())
}

pub fn single_fetch(ctx: &Context<'_>) -> Result<(), ApiError> {
    let todos = ctx.todos()?;
    let response = ctx.send(todos.build_get_todo(1))?;
    expect_status(&response, 200)?;

    let body = json_body(&response)?;
    expect_field(&body, "id", 1)?;
    expect_field(&body, "name", "Walk the dog")?;
    expect_field(&body, "isComplete", false)
}

pub fn create_from_raw_body(ctx: &Context<'_>) -> Result<(), ApiError> {
    let todos = ctx.todos()?;
    let created = todos.parse_create_raw(ctx.send(todos.build_create_raw(RAW_CREATE_BODY))?)?;
    expect_field(&created, "name", "name-001")?;
    expect_field(&created, "isComplete", false)?;
    expect_field(&created, "dateDue", "2019-10-10T00:00:00Z")?;

    let id = field_i64(&created, "id")?;
    info!(id, "created todo from raw body");

    let response = ctx.send(todos.build_get_todo(id))?;
    expect_status(&response, 200)?;
    let fetched = json_body(&response)?;
    expect_field(&fetched, "id", id)?;
    expect_field(&fetched, "name", "name-001")?;
    expect_field(&fetched, "isComplete", false)
}

pub fn create_from_record(ctx: &Context<'_>) -> Result<(), ApiError> {
    let todos = ctx.todos()?;
    let input = NewTodo::new("name-002", false, "2019-10-11T00:00:00Z");
    let created = todos.parse_create_todo(ctx.send(todos.build_create_todo(&input)?)?)?;
    expect_eq("name", "name-002", created.name.as_str())?;
    expect_eq("isComplete", &false, &created.is_complete)?;
    expect_eq("dateDue", "2019-10-11T00:00:00Z", created.date_due.as_str())?;
    info!(id = created.id, "created todo from record");

    let fetched = todos.parse_get_todo(ctx.send(todos.build_get_todo(created.id))?)?;
    expect_eq("id", &created.id, &fetched.id)?;
    expect_eq("name", "name-002", fetched.name.as_str())?;
    expect_eq("isComplete", &false, &fetched.is_complete)
}

pub fn create_round_trip(ctx: &Context<'_>) -> Result<(), ApiError> {
    let todos = ctx.todos()?;
    let input = NewTodo::new("name-003", false, "2019-10-11T00:00:00Z");
    let created = todos.parse_create_todo(ctx.send(todos.build_create_todo(&input)?)?)?;
    expect_eq("name", &input.name, &created.name)?;
    expect_eq("isComplete", &input.is_complete, &created.is_complete)?;
    expect_eq("dateDue", &input.date_due, &created.date_due)
}

pub fn header_and_cookie(ctx: &Context<'_>) -> Result<(), ApiError> {
    let todos = ctx.todos()?;
    let request = todos
        .build_list_todos()
        .with_cookie("testCookie", "testCookieValue");
    expect_status(&ctx.send(request)?, 200)
}

pub fn repeated_fetch_is_stable(ctx: &Context<'_>) -> Result<(), ApiError> {
    let todos = ctx.todos()?;
    let first = todos.parse_get_todo(ctx.send(todos.build_get_todo(1))?)?;
    let second = todos.parse_get_todo(ctx.send(todos.build_get_todo(1))?)?;
    expect_eq("todo", &first, &second)
}

pub fn missing_id_is_client_error(ctx: &Context<'_>) -> Result<(), ApiError> {
    let todos = ctx.todos()?;
    expect_client_error(&ctx.send(todos.build_get_todo(MISSING_TODO_ID))?)
}

pub fn users_with_apartment_suites(ctx: &Context<'_>) -> Result<(), ApiError> {
    let users = ctx.users()?;
    let list = users.parse_list_users(ctx.send(users.build_list_users())?)?;
    let cities = cities_where_suite_contains(&list, APT_MARKER);
    expect_same_set("cities", &APT_CITIES, &cities)
}

pub fn all_cities_with_apartment_suites(ctx: &Context<'_>) -> Result<(), ApiError> {
    let users = ctx.users()?;
    let list = users.parse_list_users(ctx.send(users.build_list_users())?)?;
    let cities = cities_where_suite_contains(&list, APT_MARKER);
    for city in &cities {
        info!(%city, "city with apartment suite");
    }
    if cities.is_empty() {
        return Err(ApiError::Mismatch {
            field: "cities".to_string(),
            expected: "at least one".to_string(),
            actual: "none".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::{Config, Fixture};
    use crate::error::FailureKind;
    use crate::http::{HttpMethod, HttpRequest};
    use crate::report::Outcome;
    use crate::suite::Suite;
    use crate::transport::Transport;

    const TODO_URL: &str = "http://localhost:8088/api/todo";

    /// Answers from a routing closure and records every request it sees.
    struct FakeTransport {
        route: Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn new(route: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Self {
            Self {
                route: Box::new(route),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok((self.route)(request))
        }
    }

    fn fixture() -> Fixture {
        Fixture::with_config(Config {
            base_url: "http://localhost".to_string(),
            users_base_url: "http://users.local".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn walk_the_dog() -> String {
        r#"{"id":1,"name":"Walk the dog","isComplete":false,"dateDue":"2019-12-31T00:00:00"}"#
            .to_string()
    }

    fn seeded_list() -> String {
        format!(
            "[{},{}]",
            walk_the_dog(),
            r#"{"id":2,"name":"Feed the dog","isComplete":false,"dateDue":"2019-12-30T00:00:00"}"#
        )
    }

    /// Echoes POST bodies back with id 42 and the flag as a boolean.
    fn echo_create(request: &HttpRequest) -> HttpResponse {
        let mut body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        body["id"] = Value::from(42);
        body["isComplete"] = Value::from(body["isComplete"] == "true");
        HttpResponse::new(201, body.to_string())
    }

    fn run(
        transport: &FakeTransport,
        check: fn(&Context<'_>) -> Result<(), ApiError>,
    ) -> Result<(), ApiError> {
        let fixture = fixture();
        let ctx = Context::new(&fixture, transport);
        check(&ctx)
    }

    #[test]
    fn list_fetch_checks_second_element() {
        let transport = FakeTransport::new(|_| HttpResponse::new(200, seeded_list()));
        run(&transport, list_fetch).unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, TODO_URL);
        assert_eq!(seen[0].header("canAccess"), Some("true"));
    }

    #[test]
    fn list_fetch_with_one_element_is_a_mismatch() {
        let transport =
            FakeTransport::new(|_| HttpResponse::new(200, format!("[{}]", walk_the_dog())));
        let err = run(&transport, list_fetch).unwrap_err();
        assert!(matches!(err, ApiError::Mismatch { ref field, .. } if field == "length"));
    }

    #[test]
    fn list_fetch_with_text_flag_is_a_decode_failure() {
        let transport = FakeTransport::new(|_| {
            HttpResponse::new(
                200,
                r#"[{"id":1,"name":"a","isComplete":"false","dateDue":"d"},{"id":2,"name":"b","isComplete":"false","dateDue":"d"}]"#,
            )
        });
        let err = run(&transport, list_fetch).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
    }

    #[test]
    fn single_fetch_reports_wrong_name() {
        let transport = FakeTransport::new(|_| {
            HttpResponse::new(
                200,
                r#"{"id":1,"name":"Walk the cat","isComplete":false,"dateDue":"2019-12-31T00:00:00"}"#,
            )
        });
        let err = run(&transport, single_fetch).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`name`: expected \"Walk the dog\", actual \"Walk the cat\""
        );
    }

    #[test]
    fn create_from_raw_body_chains_into_fetch_by_new_id() {
        let transport = FakeTransport::new(|req| match req.method {
            HttpMethod::Post => echo_create(req),
            HttpMethod::Get => {
                assert_eq!(req.path, format!("{TODO_URL}/42"));
                HttpResponse::new(
                    200,
                    r#"{"id":42,"name":"name-001","isComplete":false,"dateDue":"2019-10-10T00:00:00Z"}"#,
                )
            }
        });
        run(&transport, create_from_raw_body).unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].body.as_deref(), Some(RAW_CREATE_BODY));
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
    }

    #[test]
    fn create_from_record_detects_lost_record() {
        let transport = FakeTransport::new(|req| match req.method {
            HttpMethod::Post => echo_create(req),
            HttpMethod::Get => HttpResponse::new(404, ""),
        });
        let err = run(&transport, create_from_record).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn create_round_trip_detects_changed_due_date() {
        let transport = FakeTransport::new(|_| {
            HttpResponse::new(
                201,
                r#"{"id":5,"name":"name-003","isComplete":false,"dateDue":"2019-10-11T00:00:00"}"#,
            )
        });
        let err = run(&transport, create_round_trip).unwrap_err();
        assert!(matches!(err, ApiError::Mismatch { ref field, .. } if field == "dateDue"));
    }

    #[test]
    fn header_and_cookie_sends_both() {
        let transport = FakeTransport::new(|_| HttpResponse::new(200, "[]"));
        run(&transport, header_and_cookie).unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].header("cookie"), Some("testCookie=testCookieValue"));
        assert_eq!(seen[0].header("canAccess"), Some("true"));
    }

    #[test]
    fn missing_id_rejects_success_status() {
        let transport = FakeTransport::new(|_| HttpResponse::new(200, walk_the_dog()));
        assert!(run(&transport, missing_id_is_client_error).is_err());

        let transport = FakeTransport::new(|_| HttpResponse::new(404, ""));
        run(&transport, missing_id_is_client_error).unwrap();
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].path, format!("{TODO_URL}/{MISSING_TODO_ID}"));
    }

    #[test]
    fn users_check_compares_city_set() {
        let users = r#"[
            {"id":1,"name":"A","address":{"street":"s","suite":"Apt. 556","city":"Gwenborough","zipcode":"1"}},
            {"id":2,"name":"B","address":{"street":"s","suite":"Suite 879","city":"Wisokyburgh","zipcode":"2"}},
            {"id":4,"name":"C","address":{"street":"s","suite":"Apt. 692","city":"South Elvis","zipcode":"3"}},
            {"id":6,"name":"D","address":{"street":"s","suite":"Apt. 950","city":"South Christy","zipcode":"4"}}
        ]"#;
        let transport = FakeTransport::new(move |req| {
            assert_eq!(req.path, "http://users.local/users");
            HttpResponse::new(200, users)
        });
        run(&transport, users_with_apartment_suites).unwrap();
        run(&transport, all_cities_with_apartment_suites).unwrap();
    }

    #[test]
    fn empty_directory_fails_both_user_checks() {
        let transport = FakeTransport::new(|_| HttpResponse::new(200, "[]"));
        assert!(run(&transport, users_with_apartment_suites).is_err());
        assert!(run(&transport, all_cities_with_apartment_suites).is_err());
    }

    #[test]
    fn every_check_fails_fast_without_configuration() {
        let transport = FakeTransport::new(|_| HttpResponse::new(200, "[]"));
        let fixture = Fixture::new();
        let report = Suite::new(&fixture, &transport).run(&all());

        assert_eq!(report.cases.len(), all().len());
        for case in &report.cases {
            assert!(
                matches!(
                    case.outcome,
                    Outcome::Failed {
                        kind: FailureKind::Configuration,
                        ..
                    }
                ),
                "{} should fail on configuration",
                case.name
            );
        }
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn names_are_unique_and_findable() {
        let names: Vec<_> = all().iter().map(|s| s.name).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
        assert_eq!(find("single_fetch").unwrap().target, Target::TodoService);
        assert_eq!(find("users_with_apartment_suites").unwrap().target, Target::Users);
        assert!(find("nope").is_none());
    }
}
