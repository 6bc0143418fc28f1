use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Profile questionnaire as stored in the `anquettes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Anquette {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub city: Option<String>,
    pub gender: Option<String>,
    pub preferences: Option<String>,
    pub description: String,
}

/// Body of `POST /anquettes` and `PUT /anquettes/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnquetteRequest {
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub preferences: Option<String>,
    pub description: String,
}

impl AnquetteRequest {
    pub fn into_anquette(self, id: i64) -> Anquette {
        Anquette {
            id,
            name: self.name,
            age: self.age,
            city: self.city,
            gender: self.gender,
            preferences: self.preferences,
            description: self.description,
        }
    }
}
