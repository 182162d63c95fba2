use serde::Deserialize;
use serde_json::Value;

use crate::users::repo_types::{NewUser, UserPatch};

/// Body for `PATCH /users`. `userId` is kept raw because deployed clients
/// send it both as a number and as a numeric string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UpdateUserRequest {
    /// An empty string means "no change requested", same as an absent field.
    pub fn into_patch(self, user_id: i64) -> UserPatch {
        UserPatch {
            user_id,
            username: normalized(self.username),
            password: normalized(self.password),
            first_name: normalized(self.first_name),
            last_name: normalized(self.last_name),
            email: normalized(self.email),
            role: normalized(self.role),
        }
    }
}

fn normalized(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

/// Parses an update id sent as a JSON number or a numeric string.
/// Persisted ids are positive, so anything else is rejected.
pub(crate) fn parse_user_id(raw: &Value) -> Option<i64> {
    let id = match raw {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (id > 0).then_some(id)
}

/// Body for `POST /users`. Fields default to empty so validation can name
/// the missing one instead of serde rejecting the whole body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl CreateUserRequest {
    /// All six fields are required; returns the first missing one.
    pub fn validate(&self) -> Result<(), &'static str> {
        let required: [(&str, &str); 6] = [
            ("username", &self.username),
            ("password", &self.password),
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("role", &self.role),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(name);
            }
        }
        Ok(())
    }

    pub fn into_new_user(self) -> NewUser {
        NewUser {
            username: self.username,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            role: self.role,
        }
    }
}
