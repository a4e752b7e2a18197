//! # Access Crate
//!
//! The central authority for student accounts: registration, credential
//! verification, and the per-user usage counters shown on the dashboard.
//! Passwords are hashed with bcrypt and never leave this crate in plain or
//! hashed form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use turso::{Database, Error as TursoError, Row, params};
use uuid::Uuid;

/// Matches the work factor the rest of the stack was benchmarked against.
const BCRYPT_COST: u32 = 12;

const USER_COLUMNS: &str = "id, name, email, password_hash, university, course, voice_enabled, \
     learning_level, total_questions, total_conversations, total_uploads, \
     total_voice_generated, is_active, last_login_at, created_at";

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Database error: {0}")]
    Database(#[from] TursoError),
    #[error("User with this email already exists")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error("Failed to create user for email: {0}")]
    UserPersistenceFailed(String),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

/// A registered student.
///
/// The password hash is kept for verification but never serialized.
#[derive(Debug, Serialize, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub university: String,
    pub course: String,
    pub voice_enabled: bool,
    pub learning_level: String,
    pub total_questions: i64,
    pub total_conversations: i64,
    pub total_uploads: i64,
    pub total_voice_generated: i64,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AccessError> {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        .map_err(|e| AccessError::DataIntegrity(format!("Failed to parse date '{raw}': {e}")))
}

impl TryFrom<&Row> for User {
    type Error = AccessError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let voice_enabled: i64 = row.get(6)?;
        let is_active: i64 = row.get(12)?;
        let last_login: Option<String> = row.get(13)?;
        let created_at_str: String = row.get(14)?;

        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            university: row.get(4)?,
            course: row.get(5)?,
            voice_enabled: voice_enabled != 0,
            learning_level: row.get(7)?,
            total_questions: row.get(8)?,
            total_conversations: row.get(9)?,
            total_uploads: row.get(10)?,
            total_voice_generated: row.get(11)?,
            is_active: is_active != 0,
            last_login_at: last_login.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }
}

/// Registration details. The email is lowercased and the name trimmed
/// before storage.
#[derive(Debug, Deserialize, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub university: Option<String>,
    pub course: Option<String>,
}

/// The usage counters tracked per user. Updates are read-modify-write, so
/// concurrent requests for the same user may lose an increment; the counts
/// are dashboard statistics, not billing data.
#[derive(Debug, Clone, Copy)]
pub enum StatField {
    Questions,
    Conversations,
    Uploads,
    VoiceGenerated,
}

impl StatField {
    fn column(self) -> &'static str {
        match self {
            Self::Questions => "total_questions",
            Self::Conversations => "total_conversations",
            Self::Uploads => "total_uploads",
            Self::VoiceGenerated => "total_voice_generated",
        }
    }
}

/// Creates a new user account, rejecting duplicate emails.
pub async fn create_user(db: &Database, new_user: NewUser) -> Result<User, AccessError> {
    let conn = db.connect()?;
    let email = new_user.email.trim().to_lowercase();
    let name = new_user.name.trim().to_string();

    let exists = conn
        .query(
            "SELECT 1 FROM users WHERE email = ? LIMIT 1",
            params![email.clone()],
        )
        .await?
        .next()
        .await?
        .is_some();
    if exists {
        return Err(AccessError::EmailTaken);
    }

    let user_id = Uuid::new_v4().to_string();
    let password_hash = bcrypt::hash(&new_user.password, BCRYPT_COST)?;

    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, university, course) \
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            user_id.clone(),
            name,
            email.clone(),
            password_hash,
            new_user
                .university
                .unwrap_or_else(|| "Not specified".to_string()),
            new_user.course.unwrap_or_else(|| "Not specified".to_string()),
        ],
    )
    .await?;
    info!(user_id = %user_id, "Created user account");

    find_user_by_id(db, &user_id)
        .await?
        .ok_or(AccessError::UserPersistenceFailed(email))
}

/// Finds an active user by email. The lookup is case-insensitive because
/// emails are lowercased at registration.
pub async fn find_user_by_email(db: &Database, email: &str) -> Result<Option<User>, AccessError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? AND is_active = 1"),
            params![email.trim().to_lowercase()],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(User::try_from(&row)?)),
        None => Ok(None),
    }
}

pub async fn find_user_by_id(db: &Database, user_id: &str) -> Result<Option<User>, AccessError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND is_active = 1"),
            params![user_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(User::try_from(&row)?)),
        None => Ok(None),
    }
}

/// Checks a candidate password against the stored bcrypt hash.
pub fn verify_password(user: &User, password: &str) -> Result<bool, AccessError> {
    Ok(bcrypt::verify(password, &user.password_hash)?)
}

/// Stamps the user's last successful login.
pub async fn record_login(db: &Database, user_id: &str) -> Result<(), AccessError> {
    let conn = db.connect()?;
    conn.execute(
        "UPDATE users SET last_login_at = CURRENT_TIMESTAMP WHERE id = ?",
        params![user_id],
    )
    .await?;
    Ok(())
}

/// Bumps one of the user's usage counters.
pub async fn increment_stat(
    db: &Database,
    user_id: &str,
    field: StatField,
) -> Result<(), AccessError> {
    let conn = db.connect()?;
    let column = field.column();
    conn.execute(
        &format!("UPDATE users SET {column} = {column} + 1 WHERE id = ?"),
        params![user_id],
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxtutor::providers::db::sqlite::SqliteProvider;

    async fn memory_db() -> SqliteProvider {
        let provider = SqliteProvider::new(":memory:").await.unwrap();
        provider.initialize_schema().await.unwrap();
        provider
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "  Ada Lovelace  ".to_string(),
            email: email.to_string(),
            password: "correct horse battery staple".to_string(),
            university: Some("Cambridge".to_string()),
            course: None,
        }
    }

    #[tokio::test]
    async fn test_create_user_normalizes_and_defaults() {
        let provider = memory_db().await;
        let user = create_user(&provider.db, new_user("Ada@Example.COM"))
            .await
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.university, "Cambridge");
        assert_eq!(user.course, "Not specified");
        assert_eq!(user.learning_level, "intermediate");
        assert!(user.voice_enabled);
        assert!(user.is_active);
        assert_eq!(user.total_questions, 0);
        assert_ne!(user.password_hash, "correct horse battery staple");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let provider = memory_db().await;
        create_user(&provider.db, new_user("ada@example.com"))
            .await
            .unwrap();
        let second = create_user(&provider.db, new_user("ADA@example.com")).await;
        assert!(matches!(second, Err(AccessError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_password_verification() {
        let provider = memory_db().await;
        let user = create_user(&provider.db, new_user("ada@example.com"))
            .await
            .unwrap();

        assert!(verify_password(&user, "correct horse battery staple").unwrap());
        assert!(!verify_password(&user, "wrong password").unwrap());
    }

    #[tokio::test]
    async fn test_record_login_and_stat_increments() {
        let provider = memory_db().await;
        let user = create_user(&provider.db, new_user("ada@example.com"))
            .await
            .unwrap();
        assert!(user.last_login_at.is_none());

        record_login(&provider.db, &user.id).await.unwrap();
        increment_stat(&provider.db, &user.id, StatField::Questions)
            .await
            .unwrap();
        increment_stat(&provider.db, &user.id, StatField::Questions)
            .await
            .unwrap();
        increment_stat(&provider.db, &user.id, StatField::Uploads)
            .await
            .unwrap();

        let refreshed = find_user_by_id(&provider.db, &user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(refreshed.last_login_at.is_some());
        assert_eq!(refreshed.total_questions, 2);
        assert_eq!(refreshed.total_uploads, 1);
        assert_eq!(refreshed.total_conversations, 0);
    }
}
