//! User record as served by the authentication service

use serde::{Deserialize, Deserializer, Serialize};

/// Role of a user on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Basic,
    Employee,
    Instructor,
    Manager,
    Hr,
    Admin,
}

impl UserRole {
    /// Parse the role string stored by the authentication service.
    /// Unknown values fall back to `Basic`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "employee" => UserRole::Employee,
            "instructor" => UserRole::Instructor,
            "manager" => UserRole::Manager,
            "hr" => UserRole::Hr,
            "admin" => UserRole::Admin,
            _ => UserRole::Basic,
        }
    }

    /// Roles that author course content and may see stored answers
    pub fn authors_content(&self) -> bool {
        matches!(self, UserRole::Instructor | UserRole::Admin)
    }
}

/// A user as returned by `GET /users/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    /// The service stores this flag as the strings "True"/"False"
    #[serde(rename = "isVerified", default, deserialize_with = "verified_flag")]
    pub is_verified: bool,
}

impl UserRecord {
    pub fn new(id: i32, name: &str, email: &str, role: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            is_verified: true,
        }
    }

    pub fn role(&self) -> UserRole {
        UserRole::parse(&self.role)
    }
}

fn verified_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Text(text)) => text.eq_ignore_ascii_case("true"),
        None => false,
    })
}
