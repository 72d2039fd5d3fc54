//! Wire DTOs for the todo service and the user directory.
//!
//! # Design
//! `Todo` is what the service returns and is strict: `isComplete` must be a
//! JSON boolean. `NewTodo` is what the checks send; it writes `isComplete` as
//! the text `"false"`/`"true"`, the form the service is known to accept, and
//! reads either form back. These types are defined independently from the
//! mock-server crate so integration tests catch schema drift.

use serde::{Deserialize, Serialize};

/// A single todo record returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub name: String,
    pub is_complete: bool,
    pub date_due: String,
}

/// Request payload for creating a todo. `id` is zero; the server assigns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(with = "flag_text")]
    pub is_complete: bool,
    pub date_due: String,
}

impl NewTodo {
    pub fn new(name: &str, is_complete: bool, date_due: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            is_complete,
            date_due: date_due.to_string(),
        }
    }
}

/// Serializes a flag as `"true"`/`"false"`; accepts a boolean or that text.
mod flag_text {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Flag::deserialize(deserializer)? {
            Flag::Bool(b) => Ok(b),
            Flag::Text(s) => match s.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(de::Error::invalid_value(
                    de::Unexpected::Str(other),
                    &"\"true\" or \"false\"",
                )),
            },
        }
    }
}

/// A user from the third-party directory. Only the fields the checks read.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
}

/// Cities of users whose address suite contains `needle`, in directory order.
pub fn cities_where_suite_contains(users: &[User], needle: &str) -> Vec<String> {
    users
        .iter()
        .map(|u| &u.address)
        .filter(|a| a.suite.contains(needle))
        .map(|a| a.city.clone())
        .collect()
}
