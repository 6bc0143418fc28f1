use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                      // server-assigned
    pub tg_id: i64,                   // telegram id, unique across users
    pub tg_username: Option<String>,  // display handle
    pub anquette_id: Option<i64>,     // not checked against anquettes
}

/// Body of `POST /users` and `PUT /users/:id`. Update replaces every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRequest {
    pub tg_id: i64,
    #[serde(default)]
    pub tg_username: Option<String>,
    #[serde(default)]
    pub anquette_id: Option<i64>,
}

impl UserRequest {
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            tg_id: self.tg_id,
            tg_username: self.tg_username,
            anquette_id: self.anquette_id,
        }
    }
}
