use crate::domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// DTO for a todo returned from the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[schema(example = "0b3c1f1e-4f36-4c0b-9a3d-2f6d7a1d3a55")]
    pub id: Uuid,
    #[schema(example = "Buy milk")]
    pub title: String,
    #[schema(example = "Two litres, semi-skimmed")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<domain::todo::Todo> for Todo {
    fn from(value: domain::todo::Todo) -> Self {
        Todo {
            id: value.id,
            title: value.title,
            description: value.description,
            completed: value.completed,
            created_at: value.created_at,
        }
    }
}

/// DTO for creating a new todo via the API
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodo {
    #[validate(length(min = 1))]
    #[schema(example = "Buy milk")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl From<NewTodo> for domain::todo::NewTodo {
    fn from(value: NewTodo) -> Self {
        domain::todo::NewTodo {
            title: value.title,
            description: value.description,
            completed: value.completed,
        }
    }
}

/// DTO for partially updating a todo via the API. Omitted fields are left as they are;
/// an explicit `"description": null` removes the description.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTodo {
    #[validate(length(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl From<UpdateTodo> for domain::todo::TodoPatch {
    fn from(value: UpdateTodo) -> Self {
        domain::todo::TodoPatch {
            title: value.title,
            description: value.description,
            completed: value.completed,
        }
    }
}

/// Marks a field as present even when its value is null, so `Option<Option<T>>` can tell
/// "missing" apart from "null"
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
