//! In-memory user collection with a monotonic id counter.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A stored user record.
///
/// `extra` holds any additional fields a client merged in via update; they are
/// preserved on the record and flattened back into its JSON form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub data: Vec<User>,
    pub has_more: bool,
}

/// The single in-memory collection behind the simulated API.
///
/// Insertion order is listing order. `next_id` is strictly increasing for the
/// lifetime of the process; ids are never reused, including after deletes.
#[derive(Debug)]
pub struct UserStore {
    users: Vec<User>,
    next_id: u64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl UserStore {
    /// A store holding the two seed records with the counter at 3.
    pub fn seeded() -> Self {
        let seed = |id: &str, username: &str, email: &str, created_at: &str| User {
            id: id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: created_at.to_string(),
            extra: Map::new(),
        };

        Self {
            users: vec![
                seed(
                    "user_1",
                    "alice",
                    "alice@example.com",
                    "2023-10-27T10:00:00.000Z",
                ),
                seed(
                    "user_2",
                    "bob",
                    "bob@example.com",
                    "2023-10-27T10:05:00.000Z",
                ),
            ],
            next_id: 3,
        }
    }

    /// Restore the seeded state, for test isolation.
    pub fn reset(&mut self) {
        *self = Self::seeded();
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// The sub-sequence starting at `offset` of length up to `limit`, plus
    /// whether more records follow the page.
    pub fn list(&self, offset: usize, limit: usize) -> Page {
        let total = self.users.len();
        let start = offset.min(total);
        let end = offset.saturating_add(limit).min(total);

        Page {
            data: self.users[start..end].to_vec(),
            has_more: offset.saturating_add(limit) < total,
        }
    }

    pub fn get(&self, id: &str) -> Result<&User, ApiError> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .ok_or_else(|| ApiError::NoSuchUser(id.to_string()))
    }

    /// Create a record from request fields.
    ///
    /// `username`, `email` and `password` must be present as non-empty
    /// strings; the password is accepted but never stored. The new record gets
    /// the next id and the current UTC timestamp, and is appended at the end.
    pub fn create(&mut self, fields: &Value) -> Result<User, ApiError> {
        let required = |name: &str| -> Result<String, ApiError> {
            fields
                .get(name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or(ApiError::MissingParameters)
        };

        let username = required("username")?;
        let email = required("email")?;
        required("password")?;

        let user = User {
            id: format!("user_{}", self.next_id),
            username,
            email,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            extra: Map::new(),
        };
        self.next_id += 1;
        self.users.push(user.clone());
        Ok(user)
    }

    /// Shallow-merge `patch` onto the record, preserving its position.
    ///
    /// The merge is deliberately permissive: any field, including `id` and
    /// `created_at`, may be overwritten, and unknown fields are kept on the
    /// record. Core fields only accept string values; a non-object patch
    /// merges nothing. Returns the merged record.
    pub fn update(&mut self, id: &str, patch: &Value) -> Result<User, ApiError> {
        let user = self
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| ApiError::NoSuchUser(id.to_string()))?;

        if let Some(fields) = patch.as_object() {
            for (key, value) in fields {
                match key.as_str() {
                    "id" | "username" | "email" | "created_at" => {
                        if let Some(text) = value.as_str() {
                            let text = text.to_string();
                            match key.as_str() {
                                "id" => user.id = text,
                                "username" => user.username = text,
                                "email" => user.email = text,
                                _ => user.created_at = text,
                            }
                        }
                    }
                    _ => {
                        user.extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        Ok(user.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        let index = self
            .users
            .iter()
            .position(|user| user.id == id)
            .ok_or_else(|| ApiError::NoSuchUser(id.to_string()))?;
        self.users.remove(index);
        Ok(())
    }
}
