use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
}

impl User {
    /// Find a user by email. Emails are compared exactly as stored.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, hashed_password, is_active
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with an already-hashed password.
    pub async fn create(
        db: &PgPool,
        email: &str,
        name: &str,
        hashed_password: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, hashed_password, is_active
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(hashed_password)
        .fetch_one(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_never_serializes() {
        let user = User {
            id: 1,
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            hashed_password: "$argon2id$v=19$secret".to_string(),
            is_active: true,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("hashed_password"));
    }
}
