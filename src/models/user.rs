//! User and session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user, as returned by registration and authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub money: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_instant: Option<DateTime<Utc>>,
    /// JWT sent as bearer token on every API call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Body of `POST /api/users`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub login: String,
    pub password: String,
    pub birth_year: i32,
}

/// Body of `POST /api/users/authentication`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// One point of the user's money history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistoryEntry {
    pub instant: DateTime<Utc>,
    pub money: i64,
}
