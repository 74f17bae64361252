use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::database::record::{required_string, RecordError};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Signup payload. `password` is still plaintext here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewUser {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, RecordError> {
        Ok(Self {
            username: required_string(fields, "username")?,
            password: required_string(fields, "password")?,
            first_name: required_string(fields, "first_name")?,
            last_name: required_string(fields, "last_name")?,
            email: required_string(fields, "email")?,
        })
    }
}
