use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::BigInt;
use uuid::Uuid;

use notely_shared::clients::db::DbPool;
use notely_shared::errors::{AppError, AppResult, ErrorCode};

use super::{google_id_taken, NoteFilter, NoteStore, OtpStore, UserStore};
use crate::models::{Note, OtpEntry, TagCount, User};
use crate::schema::{notes, otp_codes, users};

const SCHEMA: &str = include_str!("../../migrations/2024-06-01-000000_create_tables/up.sql");

/// Apply the idempotent schema so a fresh database is usable.
pub fn ensure_schema(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    conn.batch_execute(SCHEMA)?;
    Ok(())
}

type PooledConn = diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::pg::PgConnection>>;

const GOOGLE_ID_INDEX: &str = "users_google_id_key";

/// Map unique violations on `users` to the conflict they represent.
fn user_conflict(e: DieselError) -> AppError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            if info.constraint_name() == Some(GOOGLE_ID_INDEX) {
                google_id_taken()
            } else {
                AppError::new(ErrorCode::EmailAlreadyExists, "email already registered")
            }
        }
        other => other.into(),
    }
}

fn checkout(pool: &DbPool) -> AppResult<PooledConn> {
    pool.get().map_err(|e| AppError::internal(e.to_string()))
}

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut conn = checkout(&self.pool)?;
        diesel::insert_into(users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(user_conflict)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let mut conn = checkout(&self.pool)?;
        Ok(users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let mut conn = checkout(&self.pool)?;
        Ok(users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?)
    }

    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>> {
        let mut conn = checkout(&self.pool)?;
        Ok(users::table
            .filter(users::google_id.eq(google_id))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?)
    }

    async fn save(&self, user: &User) -> AppResult<User> {
        let mut conn = checkout(&self.pool)?;
        diesel::update(users::table.find(user.id))
            .set(user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(user_conflict)?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
    }
}

pub struct PgOtpStore {
    pool: DbPool,
}

impl PgOtpStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpStore for PgOtpStore {
    async fn replace(&self, entry: OtpEntry) -> AppResult<()> {
        let mut conn = checkout(&self.pool)?;
        conn.transaction::<_, DieselError, _>(|conn| {
            diesel::delete(otp_codes::table.filter(otp_codes::email.eq(&entry.email))).execute(conn)?;
            diesel::insert_into(otp_codes::table).values(&entry).execute(conn)?;
            Ok(())
        })?;
        Ok(())
    }

    async fn find_valid(&self, email: &str, code: &str, now: DateTime<Utc>) -> AppResult<Option<OtpEntry>> {
        let mut conn = checkout(&self.pool)?;
        Ok(otp_codes::table
            .filter(otp_codes::email.eq(email))
            .filter(otp_codes::code.eq(code))
            .filter(otp_codes::used.eq(false))
            .filter(otp_codes::expires_at.gt(now))
            .order(otp_codes::created_at.desc())
            .select(OtpEntry::as_select())
            .first(&mut conn)
            .optional()?)
    }

    async fn record_failed_attempt(&self, email: &str, now: DateTime<Utc>) -> AppResult<()> {
        let mut conn = checkout(&self.pool)?;
        diesel::update(
            otp_codes::table
                .filter(otp_codes::email.eq(email))
                .filter(otp_codes::used.eq(false))
                .filter(otp_codes::expires_at.gt(now)),
        )
        .set(otp_codes::attempts.eq(otp_codes::attempts + 1))
        .execute(&mut conn)?;
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = checkout(&self.pool)?;
        let updated = diesel::update(
            otp_codes::table
                .filter(otp_codes::id.eq(id))
                .filter(otp_codes::used.eq(false)),
        )
        .set((
            otp_codes::used.eq(true),
            otp_codes::attempts.eq(otp_codes::attempts + 1),
        ))
        .execute(&mut conn)?;
        Ok(updated == 1)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut conn = checkout(&self.pool)?;
        let deleted = diesel::delete(otp_codes::table.filter(otp_codes::expires_at.le(now))).execute(&mut conn)?;
        Ok(deleted as u64)
    }
}

pub struct PgNoteStore {
    pool: DbPool,
}

impl PgNoteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn insert(&self, note: Note) -> AppResult<Note> {
        let mut conn = checkout(&self.pool)?;
        Ok(diesel::insert_into(notes::table)
            .values(&note)
            .returning(Note::as_returning())
            .get_result(&mut conn)?)
    }

    async fn find(&self, owner: Uuid, id: Uuid) -> AppResult<Option<Note>> {
        let mut conn = checkout(&self.pool)?;
        Ok(notes::table
            .filter(notes::id.eq(id))
            .filter(notes::user_id.eq(owner))
            .select(Note::as_select())
            .first(&mut conn)
            .optional()?)
    }

    async fn list(&self, owner: Uuid, filter: &NoteFilter) -> AppResult<Vec<Note>> {
        let mut conn = checkout(&self.pool)?;

        let mut query = notes::table
            .select(Note::as_select())
            .filter(notes::user_id.eq(owner))
            .filter(notes::is_archived.eq(filter.archived))
            .into_boxed();

        if filter.pinned_only {
            query = query.filter(notes::is_pinned.eq(true));
        }
        if let Some(tag) = &filter.tag {
            query = query.filter(notes::tags.contains(vec![tag.clone()]));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            query = query.filter(notes::title.ilike(pattern.clone()).or(notes::content.ilike(pattern)));
        }

        Ok(query
            .order((notes::is_pinned.desc(), notes::created_at.desc(), notes::id.desc()))
            .limit(filter.limit as i64)
            .load(&mut conn)?)
    }

    async fn save(&self, note: &Note) -> AppResult<Option<Note>> {
        let mut conn = checkout(&self.pool)?;
        Ok(diesel::update(
            notes::table
                .filter(notes::id.eq(note.id))
                .filter(notes::user_id.eq(note.user_id)),
        )
        .set(note)
        .returning(Note::as_returning())
        .get_result(&mut conn)
        .optional()?)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<bool> {
        let mut conn = checkout(&self.pool)?;
        let deleted = diesel::delete(
            notes::table
                .filter(notes::id.eq(id))
                .filter(notes::user_id.eq(owner)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    async fn tag_counts(&self, owner: Uuid, limit: usize) -> AppResult<Vec<TagCount>> {
        let mut conn = checkout(&self.pool)?;
        Ok(diesel::sql_query(
            "SELECT tag AS name, COUNT(*) AS count \
             FROM notes, unnest(tags) AS tag \
             WHERE user_id = $1 \
             GROUP BY tag \
             ORDER BY count DESC, name ASC \
             LIMIT $2",
        )
        .bind::<diesel::sql_types::Uuid, _>(owner)
        .bind::<BigInt, _>(limit as i64)
        .load::<TagCount>(&mut conn)?)
    }
}
