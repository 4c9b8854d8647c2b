//! Persistence seams. Each entity has one trait with a Postgres and an
//! in-memory implementation; the backend is chosen once at startup.

pub mod memory;
pub mod postgres;
pub mod sweeper;

#[cfg(test)]
pub(crate) mod contract;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use notely_shared::clients::db;
use notely_shared::errors::{AppError, AppResult, ErrorCode};

use crate::config::{AppConfig, StorageMode};
use crate::models::{Note, OtpEntry, TagCount, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `EmailAlreadyExists` when the email is taken and with
    /// `OAuthError` when the google id is.
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>>;
    async fn save(&self, user: &User) -> AppResult<User>;
}

#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Atomically drop every entry for `entry.email` and store `entry`.
    async fn replace(&self, entry: OtpEntry) -> AppResult<()>;
    /// Matching code, unused and unexpired at `now`. Attempts are not checked here.
    async fn find_valid(&self, email: &str, code: &str, now: DateTime<Utc>) -> AppResult<Option<OtpEntry>>;
    /// Bump the attempt counter of the email's active entry, if any.
    async fn record_failed_attempt(&self, email: &str, now: DateTime<Utc>) -> AppResult<()>;
    /// Consume the entry. Returns false if it was already used.
    async fn mark_used(&self, id: Uuid) -> AppResult<bool>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert(&self, note: Note) -> AppResult<Note>;
    async fn find(&self, owner: Uuid, id: Uuid) -> AppResult<Option<Note>>;
    async fn list(&self, owner: Uuid, filter: &NoteFilter) -> AppResult<Vec<Note>>;
    /// Persist every mutable field. Scoped to `note.user_id`.
    async fn save(&self, note: &Note) -> AppResult<Option<Note>>;
    async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<bool>;
    async fn tag_counts(&self, owner: Uuid, limit: usize) -> AppResult<Vec<TagCount>>;
}

/// Normalized list filter. `search` and `tag` are already trimmed; `tag` is lowercase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteFilter {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub pinned_only: bool,
    pub archived: bool,
    pub limit: usize,
}

impl NoteFilter {
    pub fn matches(&self, note: &Note) -> bool {
        if note.is_archived != self.archived {
            return false;
        }
        if self.pinned_only && !note.is_pinned {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !note.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !note.title.to_lowercase().contains(&needle) && !note.content.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Pinned first, newest first, id descending on ties.
pub fn list_order(a: &Note, b: &Note) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Count tag occurrences, most frequent first, name ascending on ties.
pub fn count_tags<'a>(notes: impl IntoIterator<Item = &'a Note>, limit: usize) -> Vec<TagCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for note in notes {
        for tag in &note.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount { name: name.to_string(), count })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tags.truncate(limit);
    tags
}

/// Both backends reject a google id already held by another account.
pub(crate) fn google_id_taken() -> AppError {
    AppError::new(ErrorCode::OAuthError, "Google account already linked to another user")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub otps: Arc<dyn OtpStore>,
    pub notes: Arc<dyn NoteStore>,
    pub kind: StorageKind,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(memory::MemoryUserStore::default()),
            otps: Arc::new(memory::MemoryOtpStore::default()),
            notes: Arc::new(memory::MemoryNoteStore::default()),
            kind: StorageKind::Memory,
        }
    }

    pub fn postgres(pool: db::DbPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserStore::new(pool.clone())),
            otps: Arc::new(postgres::PgOtpStore::new(pool.clone())),
            notes: Arc::new(postgres::PgNoteStore::new(pool)),
            kind: StorageKind::Postgres,
        }
    }

    /// Pick the backend once. In `auto` mode an unreachable database falls
    /// back to memory with a warning.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match config.storage {
            StorageMode::Memory => {
                tracing::info!("using in-memory storage");
                Ok(Self::in_memory())
            }
            StorageMode::Postgres => Ok(Self::postgres(connect(config)?)),
            StorageMode::Auto => match connect(config) {
                Ok(pool) => Ok(Self::postgres(pool)),
                Err(e) => {
                    tracing::warn!(error = %e, "database unavailable, falling back to in-memory storage");
                    Ok(Self::in_memory())
                }
            },
        }
    }
}

fn connect(config: &AppConfig) -> anyhow::Result<db::DbPool> {
    let pool = db::create_pool(
        &config.database_url,
        Duration::from_secs(config.db_connect_timeout_secs),
    )?;
    postgres::ensure_schema(&pool)?;
    tracing::info!("connected to postgres");
    Ok(pool)
}
