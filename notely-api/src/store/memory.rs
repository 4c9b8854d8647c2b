use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use notely_shared::errors::{AppError, AppResult, ErrorCode};

use super::{count_tags, google_id_taken, list_order, NoteFilter, NoteStore, OtpStore, UserStore};
use crate::models::{Note, OtpEntry, TagCount, User};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
        }
        check_google_id(&users, &user)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn save(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.write().await;
        check_google_id(&users, user)?;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user.clone())
            }
            None => Err(AppError::new(ErrorCode::UserNotFound, "user not found")),
        }
    }
}

/// A google id belongs to at most one account.
fn check_google_id(users: &HashMap<Uuid, User>, user: &User) -> AppResult<()> {
    let Some(google_id) = user.google_id.as_deref() else {
        return Ok(());
    };
    if users
        .values()
        .any(|u| u.id != user.id && u.google_id.as_deref() == Some(google_id))
    {
        return Err(google_id_taken());
    }
    Ok(())
}

/// At most one entry per email, keyed by the lowercased address.
#[derive(Default)]
pub struct MemoryOtpStore {
    entries: RwLock<HashMap<String, OtpEntry>>,
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn replace(&self, entry: OtpEntry) -> AppResult<()> {
        self.entries.write().await.insert(entry.email.clone(), entry);
        Ok(())
    }

    async fn find_valid(&self, email: &str, code: &str, now: DateTime<Utc>) -> AppResult<Option<OtpEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .get(email)
            .filter(|e| e.code == code && e.is_active(now))
            .cloned())
    }

    async fn record_failed_attempt(&self, email: &str, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(entry) = self.entries.write().await.get_mut(email) {
            if entry.is_active(now) {
                entry.attempts += 1;
            }
        }
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        match entries.values_mut().find(|e| e.id == id && !e.used) {
            Some(entry) => {
                entry.used = true;
                entry.attempts += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RwLock<HashMap<Uuid, Note>>,
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, note: Note) -> AppResult<Note> {
        self.notes.write().await.insert(note.id, note.clone());
        Ok(note)
    }

    async fn find(&self, owner: Uuid, id: Uuid) -> AppResult<Option<Note>> {
        Ok(self
            .notes
            .read()
            .await
            .get(&id)
            .filter(|n| n.user_id == owner)
            .cloned())
    }

    async fn list(&self, owner: Uuid, filter: &NoteFilter) -> AppResult<Vec<Note>> {
        let notes = self.notes.read().await;
        let mut matched: Vec<Note> = notes
            .values()
            .filter(|n| n.user_id == owner && filter.matches(n))
            .cloned()
            .collect();
        matched.sort_by(list_order);
        matched.truncate(filter.limit);
        Ok(matched)
    }

    async fn save(&self, note: &Note) -> AppResult<Option<Note>> {
        let mut notes = self.notes.write().await;
        match notes.get_mut(&note.id) {
            Some(existing) if existing.user_id == note.user_id => {
                *existing = note.clone();
                Ok(Some(note.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<bool> {
        let mut notes = self.notes.write().await;
        if notes.get(&id).is_some_and(|n| n.user_id == owner) {
            notes.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn tag_counts(&self, owner: Uuid, limit: usize) -> AppResult<Vec<TagCount>> {
        let notes = self.notes.read().await;
        Ok(count_tags(notes.values().filter(|n| n.user_id == owner), limit))
    }
}
