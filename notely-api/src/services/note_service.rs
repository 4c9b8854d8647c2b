use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notely_shared::errors::{AppError, AppResult, ErrorCode};

use crate::clock::Clock;
use crate::models::{Note, TagCount};
use crate::store::{NoteFilter, NoteStore};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 50_000;
pub const DEFAULT_COLOR: &str = "#ffffff";
const LIST_LIMIT: usize = 100;
const TAG_LIMIT: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct NoteQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub pinned: Option<bool>,
    pub archived: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateNoteInput {
    pub title: String,
    pub content: String,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateNoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct NoteList {
    pub notes: Vec<Note>,
    pub total: usize,
}

pub struct NoteService {
    notes: Arc<dyn NoteStore>,
    clock: Arc<dyn Clock>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self { notes, clock }
    }

    pub async fn list(&self, owner: Uuid, query: NoteQuery) -> AppResult<NoteList> {
        let filter = NoteFilter {
            search: query.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            tag: query.tag.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()),
            pinned_only: query.pinned == Some(true),
            archived: query.archived.unwrap_or(false),
            limit: LIST_LIMIT,
        };

        let notes = self.notes.list(owner, &filter).await?;
        Ok(NoteList { total: notes.len(), notes })
    }

    pub async fn create(&self, owner: Uuid, input: CreateNoteInput) -> AppResult<Note> {
        let title = validated_title(&input.title)?;
        let content = validated_content(&input.content)?;
        let color = match input.color {
            Some(color) => validated_color(&color)?,
            None => DEFAULT_COLOR.to_string(),
        };

        let now = self.clock.now();
        let note = self
            .notes
            .insert(Note {
                id: Uuid::now_v7(),
                user_id: owner,
                title,
                content,
                color,
                tags: normalize_tags(input.tags.unwrap_or_default()),
                is_pinned: false,
                is_archived: false,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(user_id = %owner, note_id = %note.id, "note created");
        Ok(note)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> AppResult<Note> {
        self.notes.find(owner, id).await?.ok_or_else(note_not_found)
    }

    pub async fn update(&self, owner: Uuid, id: Uuid, input: UpdateNoteInput) -> AppResult<Note> {
        let mut note = self.get(owner, id).await?;

        if let Some(title) = &input.title {
            note.title = validated_title(title)?;
        }
        if let Some(content) = &input.content {
            note.content = validated_content(content)?;
        }
        if let Some(color) = &input.color {
            note.color = validated_color(color)?;
        }
        if let Some(tags) = input.tags {
            note.tags = normalize_tags(tags);
        }
        if let Some(pinned) = input.is_pinned {
            note.is_pinned = pinned;
        }
        if let Some(archived) = input.is_archived {
            note.is_archived = archived;
            if archived {
                note.is_pinned = false;
            }
        }

        let note = self.persist(note).await?;
        tracing::info!(user_id = %owner, note_id = %id, "note updated");
        Ok(note)
    }

    pub async fn toggle_pin(&self, owner: Uuid, id: Uuid) -> AppResult<Note> {
        let mut note = self.get(owner, id).await?;
        note.is_pinned = !note.is_pinned;
        self.persist(note).await
    }

    /// Archiving always unpins; unarchiving leaves the pin flag alone.
    pub async fn toggle_archive(&self, owner: Uuid, id: Uuid) -> AppResult<Note> {
        let mut note = self.get(owner, id).await?;
        note.is_archived = !note.is_archived;
        if note.is_archived {
            note.is_pinned = false;
        }
        self.persist(note).await
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        if !self.notes.delete(owner, id).await? {
            return Err(note_not_found());
        }
        tracing::info!(user_id = %owner, note_id = %id, "note deleted");
        Ok(())
    }

    pub async fn tags(&self, owner: Uuid) -> AppResult<Vec<TagCount>> {
        self.notes.tag_counts(owner, TAG_LIMIT).await
    }

    async fn persist(&self, mut note: Note) -> AppResult<Note> {
        note.updated_at = self.clock.now();
        self.notes.save(&note).await?.ok_or_else(note_not_found)
    }
}

/// Path ids that are not UUIDs cannot name a note.
pub fn parse_note_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| note_not_found())
}

fn note_not_found() -> AppError {
    AppError::new(ErrorCode::NoteNotFound, "note not found")
}

fn validated_text(raw: &str, field: &str, max_chars: usize) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validated_title(raw: &str) -> AppResult<String> {
    validated_text(raw, "title", MAX_TITLE_CHARS)
}

fn validated_content(raw: &str) -> AppResult<String> {
    validated_text(raw, "content", MAX_CONTENT_CHARS)
}

fn validated_color(raw: &str) -> AppResult<String> {
    let is_hex = raw.len() == 7
        && raw.starts_with('#')
        && raw[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !is_hex {
        return Err(AppError::validation("color must be a hex color like #1a2b3c"));
    }
    Ok(raw.to_string())
}

/// Trim, lowercase, drop empties and duplicates, keep first-seen order.
pub fn normalize_tags(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}
