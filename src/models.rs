use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Profile picture identifiers a user can choose from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Avatar {
    #[default]
    Man,
    Woman,
    Cat,
    Chicken,
    Frog,
    Panda,
    Penguin,
    Rabbit,
    Robot,
    SeaLion,
}

impl Avatar {
    /// Every selectable avatar, in picker order
    pub const ALL: [Avatar; 10] = [
        Avatar::Man,
        Avatar::Woman,
        Avatar::Cat,
        Avatar::Chicken,
        Avatar::Frog,
        Avatar::Panda,
        Avatar::Penguin,
        Avatar::Rabbit,
        Avatar::Robot,
        Avatar::SeaLion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Avatar::Man => "man",
            Avatar::Woman => "woman",
            Avatar::Cat => "cat",
            Avatar::Chicken => "chicken",
            Avatar::Frog => "frog",
            Avatar::Panda => "panda",
            Avatar::Penguin => "penguin",
            Avatar::Rabbit => "rabbit",
            Avatar::Robot => "robot",
            Avatar::SeaLion => "sea_lion",
        }
    }

    /// Next avatar in picker order, wrapping around
    pub fn next(&self) -> Avatar {
        let idx = Avatar::ALL.iter().position(|a| a == self).unwrap_or(0);
        Avatar::ALL[(idx + 1) % Avatar::ALL.len()]
    }

    /// Interpret a stored column value. NULL and unknown values read as the default.
    pub fn from_stored(value: Option<&str>) -> Avatar {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Avatar {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Avatar::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| StoreError::InvalidAvatar(s.to_string()))
    }
}

impl fmt::Display for Avatar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the `users` table
#[derive(Clone, Debug, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    /// Salted hash, never the plaintext password
    pub password_hash: String,
    pub email: String,
    pub avatar: Avatar,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Signup input. All fields are required.
#[derive(Clone, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub email: String,
}

impl NewUser {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        NewUser {
            first_name: first_name.into(),
            last_name: last_name.into(),
            username: username.into(),
            password: password.into(),
            email: email.into(),
        }
    }

    /// Copy with surrounding whitespace removed from every field but the password
    pub fn trimmed(&self) -> NewUser {
        NewUser {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            email: self.email.trim().to_string(),
        }
    }

    /// Reject the first empty field, checked in form order
    pub fn validate(&self) -> Result<(), StoreError> {
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("username", &self.username),
            ("password", &self.password),
            ("email", &self.email),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(StoreError::Validation { field });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

/// A user record without credentials, safe to display or pass between screens
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub avatar_path: Avatar,
}

impl From<&UserRecord> for UserSummary {
    fn from(record: &UserRecord) -> Self {
        UserSummary {
            id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            username: record.username.clone(),
            email: record.email.clone(),
            avatar_path: record.avatar,
        }
    }
}
