use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Form body for the token endpoint. The field is called `username` on the
/// wire but carries the email.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Public part of the user returned to clients and nested into products.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_active: bool,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            is_active: u.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serializes_expected_fields() {
        let user = PublicUser {
            id: 7,
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            is_active: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "dev@example.com");
        assert_eq!(json["name"], "Dev");
        assert_eq!(json["is_active"], true);
    }

    #[test]
    fn token_response_matches_wire_shape() {
        let response = TokenResponse {
            access_token: "abc".to_string(),
            token_type: "bearer".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("access_token"));
        assert!(json.contains("\"token_type\":\"bearer\""));
    }
}
