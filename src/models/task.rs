use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Priority of a task. Corresponds to the `task_priority` SQL enum.
///
/// Wire representation uses the capitalized variant names (`"Low"`,
/// `"Medium"`, `"High"`).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// A task entity as stored in the database and returned by the API.
///
/// A task is owned by exactly one user, never shared or reassigned. Every
/// store operation touching a task filters by `(id, owner_id)` in a single
/// query.
#[derive(Debug, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    /// Optional calendar due date.
    pub due_date: Option<NaiveDate>,
    /// Always a strict boolean on the way out, regardless of what the client
    /// sent on the way in.
    pub completed: bool,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    /// Set at creation, immutable.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Maximum length of 2000 characters if provided.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Defaults to `Low` when omitted.
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    /// Accepted in several wire representations; see [`completed`].
    #[serde(default, deserialize_with = "completed::deserialize")]
    pub completed: bool,
}

/// Partial input for updating a task. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "completed::deserialize_opt")]
    pub completed: Option<bool>,
}

/// Canonical normalization of the `completed` field.
///
/// Clients send it as a boolean, a 0/1 integer, or a `"Yes"`/`"No"` style
/// string. One parser handles every ingress path, case-insensitively:
/// `true`, `1`, `"Yes"`, `"true"` and `"1"` mean done; anything else does not.
pub mod completed {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    fn normalize(repr: Repr) -> bool {
        match repr {
            Repr::Bool(b) => b,
            Repr::Int(n) => n == 1,
            Repr::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true") || s == "1"
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Repr::deserialize(deserializer).map(normalize)
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Repr>::deserialize(deserializer).map(|repr| repr.map(normalize))
    }
}
