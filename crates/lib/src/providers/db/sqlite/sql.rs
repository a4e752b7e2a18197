//! # SQLite Schema
//!
//! This module centralizes the table-creation SQL for the application.
//! Every statement is idempotent (`IF NOT EXISTS`) so the schema can be
//! applied on every startup.

pub const CREATE_USERS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    university TEXT NOT NULL DEFAULT 'Not specified',
    course TEXT NOT NULL DEFAULT 'Not specified',
    voice_enabled INTEGER NOT NULL DEFAULT 1,
    learning_level TEXT NOT NULL DEFAULT 'intermediate',
    total_questions INTEGER NOT NULL DEFAULT 0,
    total_conversations INTEGER NOT NULL DEFAULT 0,
    total_uploads INTEGER NOT NULL DEFAULT 0,
    total_voice_generated INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    last_login_at TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);";

pub const CREATE_DOCUMENTS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    original_name TEXT NOT NULL,
    stored_name TEXT NOT NULL UNIQUE,
    file_path TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    mime_type TEXT NOT NULL,
    word_count INTEGER NOT NULL DEFAULT 0,
    text_preview TEXT,
    full_text TEXT,
    topics TEXT NOT NULL DEFAULT '[]',
    subject TEXT NOT NULL DEFAULT 'general studies',
    status TEXT NOT NULL DEFAULT 'processing',
    error_message TEXT,
    uploaded_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    last_accessed_at TEXT
);";

pub const CREATE_CONVERSATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    document_id TEXT,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    ai_model TEXT NOT NULL,
    voice_generated INTEGER NOT NULL DEFAULT 0,
    voice_filename TEXT,
    voice_duration INTEGER,
    voice_size INTEGER,
    voice_provider TEXT,
    voice_fallback INTEGER,
    quality TEXT NOT NULL DEFAULT 'high',
    subject TEXT NOT NULL DEFAULT 'general',
    tokens_used INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);";

pub const CREATE_DOCUMENTS_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents (owner_id, uploaded_at);";

pub const CREATE_CONVERSATIONS_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_conversations_owner ON conversations (owner_id, created_at);";

/// All statements applied by `SqliteProvider::initialize_schema`.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_DOCUMENTS_TABLE,
    CREATE_CONVERSATIONS_TABLE,
    CREATE_DOCUMENTS_OWNER_INDEX,
    CREATE_CONVERSATIONS_OWNER_INDEX,
];
