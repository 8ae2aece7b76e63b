use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<String>,
    pub profile_photo_url: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
}

impl User {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// A member has joined once the join form has filled in a name.
    pub fn has_joined(&self) -> bool {
        !self.first_name.is_empty() && !self.last_name.is_empty()
    }
}

/// Columns printed by the `list-users` maintenance command.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct UserListing {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

/// Editable profile fields, already validated by `UserService`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<String>,
    pub profile_photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: 1,
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            birthday: None,
            profile_photo_url: None,
            is_admin: false,
            created_at: "2024-06-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(user("", "").display_name(), "ada@example.com");
        assert_eq!(user("Ada", "Lovelace").display_name(), "Ada Lovelace");
        assert_eq!(user("Ada", "").display_name(), "Ada");
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let json = serde_json::to_value(user("Ada", "Lovelace")).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["first_name"], "Ada");
    }
}
