//! Behaviour every store backend must share. Each check uses fresh
//! emails and ids so it can run against a long-lived database.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use notely_shared::errors::ErrorCode;

use super::{NoteFilter, NoteStore, OtpStore, UserStore};
use crate::models::{AuthMethod, Note, OtpEntry, TagCount, User};

fn unique_email() -> String {
    format!("{}@contract.test", Uuid::now_v7())
}

fn user(email: &str) -> User {
    User::new(email.to_string(), "contract".into(), AuthMethod::Password, Utc::now())
}

fn otp(email: &str, code: &str, now: DateTime<Utc>) -> OtpEntry {
    OtpEntry {
        id: Uuid::now_v7(),
        email: email.into(),
        code: code.into(),
        expires_at: now + Duration::minutes(10),
        attempts: 0,
        used: false,
        created_at: now,
    }
}

fn note(owner: Uuid, title: &str, tags: &[&str], created_at: DateTime<Utc>) -> Note {
    Note {
        id: Uuid::now_v7(),
        user_id: owner,
        title: title.into(),
        content: "body".into(),
        color: "#ffffff".into(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        is_pinned: false,
        is_archived: false,
        created_at,
        updated_at: created_at,
    }
}

pub async fn duplicate_email_is_rejected(users: &dyn UserStore) {
    let email = unique_email();
    users.create(user(&email)).await.unwrap();

    let err = users.create(user(&email)).await.unwrap_err();
    assert!(err.is(ErrorCode::EmailAlreadyExists));
}

pub async fn google_id_is_unique(users: &dyn UserStore) {
    let google_id = format!("g-{}", Uuid::now_v7());
    let mut first = user(&unique_email());
    first.google_id = Some(google_id.clone());
    users.create(first).await.unwrap();

    let mut second = user(&unique_email());
    second.google_id = Some(google_id.clone());
    assert!(users.create(second).await.unwrap_err().is(ErrorCode::OAuthError));

    // Linking an existing account to a held id fails the same way.
    let mut third = users.create(user(&unique_email())).await.unwrap();
    third.google_id = Some(google_id.clone());
    assert!(users.save(&third).await.unwrap_err().is(ErrorCode::OAuthError));

    let holder = users.find_by_google_id(&google_id).await.unwrap().unwrap();
    let saved = users.save(&holder).await.unwrap();
    assert_eq!(saved.google_id.as_deref(), Some(google_id.as_str()));
}

pub async fn replace_keeps_only_latest_code(otps: &dyn OtpStore) {
    let email = unique_email();
    let now = Utc::now();
    otps.replace(otp(&email, "111111", now)).await.unwrap();
    otps.replace(otp(&email, "222222", now)).await.unwrap();

    assert!(otps.find_valid(&email, "111111", now).await.unwrap().is_none());
    assert!(otps.find_valid(&email, "222222", now).await.unwrap().is_some());
}

pub async fn failed_attempts_accumulate(otps: &dyn OtpStore) {
    let email = unique_email();
    let now = Utc::now();
    otps.replace(otp(&email, "123456", now)).await.unwrap();

    otps.record_failed_attempt(&email, now).await.unwrap();
    otps.record_failed_attempt(&email, now).await.unwrap();

    let entry = otps.find_valid(&email, "123456", now).await.unwrap().unwrap();
    assert_eq!(entry.attempts, 2);
}

pub async fn entry_is_consumed_once(otps: &dyn OtpStore) {
    let email = unique_email();
    let now = Utc::now();
    let entry = otp(&email, "123456", now);
    let id = entry.id;
    otps.replace(entry).await.unwrap();

    assert!(otps.mark_used(id).await.unwrap());
    assert!(!otps.mark_used(id).await.unwrap());
    assert!(otps.find_valid(&email, "123456", now).await.unwrap().is_none());
}

pub async fn purge_drops_only_expired(otps: &dyn OtpStore) {
    let (stale, fresh) = (unique_email(), unique_email());
    let now = Utc::now();
    otps.replace(otp(&stale, "123456", now - Duration::minutes(20))).await.unwrap();
    otps.replace(otp(&fresh, "123456", now)).await.unwrap();

    assert!(otps.purge_expired(now).await.unwrap() >= 1);
    assert!(otps.find_valid(&fresh, "123456", now).await.unwrap().is_some());

    // Gone, not merely inactive: it would still be valid at this instant.
    assert!(otps
        .find_valid(&stale, "123456", now - Duration::minutes(15))
        .await
        .unwrap()
        .is_none());
}

pub async fn notes_are_owner_scoped(users: &dyn UserStore, notes: &dyn NoteStore) {
    let owner = users.create(user(&unique_email())).await.unwrap().id;
    let stranger = users.create(user(&unique_email())).await.unwrap().id;
    let note = notes.insert(note(owner, "mine", &[], Utc::now())).await.unwrap();

    assert!(notes.find(stranger, note.id).await.unwrap().is_none());
    assert!(!notes.delete(stranger, note.id).await.unwrap());
    assert!(notes.save(&Note { user_id: stranger, ..note.clone() }).await.unwrap().is_none());

    let renamed = notes
        .save(&Note { title: "renamed".into(), ..note.clone() })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.title, "renamed");
    assert!(notes.delete(owner, note.id).await.unwrap());
    assert!(notes.find(owner, note.id).await.unwrap().is_none());
}

pub async fn list_filters_and_orders(users: &dyn UserStore, notes: &dyn NoteStore) {
    let owner = users.create(user(&unique_email())).await.unwrap().id;
    let now = Utc::now();

    let old = notes.insert(note(owner, "Old 100% done", &["work"], now - Duration::hours(2))).await.unwrap();
    notes.insert(note(owner, "Middle", &["home"], now - Duration::hours(1))).await.unwrap();
    notes.insert(note(owner, "New", &["work"], now)).await.unwrap();
    notes.save(&Note { is_pinned: true, ..old.clone() }).await.unwrap();
    let mut archived = note(owner, "Archived", &["work"], now);
    archived.is_archived = true;
    notes.insert(archived).await.unwrap();

    let active = NoteFilter { limit: 100, ..Default::default() };
    let titles: Vec<_> = notes
        .list(owner, &active)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles, ["Old 100% done", "New", "Middle"]);

    let by_tag = NoteFilter { tag: Some("work".into()), ..active.clone() };
    assert_eq!(notes.list(owner, &by_tag).await.unwrap().len(), 2);

    let literal_percent = NoteFilter { search: Some("100%".into()), ..active.clone() };
    assert_eq!(notes.list(owner, &literal_percent).await.unwrap().len(), 1);

    let case_folded = NoteFilter { search: Some("MIDDLE".into()), ..active.clone() };
    assert_eq!(notes.list(owner, &case_folded).await.unwrap().len(), 1);

    let archived_only = NoteFilter { archived: true, ..active.clone() };
    assert_eq!(notes.list(owner, &archived_only).await.unwrap().len(), 1);

    let capped = NoteFilter { limit: 2, ..active };
    assert_eq!(notes.list(owner, &capped).await.unwrap().len(), 2);
}

pub async fn tag_counts_span_archived_notes(users: &dyn UserStore, notes: &dyn NoteStore) {
    let owner = users.create(user(&unique_email())).await.unwrap().id;
    let stranger = users.create(user(&unique_email())).await.unwrap().id;
    let now = Utc::now();

    notes.insert(note(owner, "a", &["work", "home"], now)).await.unwrap();
    let mut archived = note(owner, "b", &["work"], now);
    archived.is_archived = true;
    notes.insert(archived).await.unwrap();
    notes.insert(note(stranger, "c", &["home", "home-2"], now)).await.unwrap();

    assert_eq!(
        notes.tag_counts(owner, 50).await.unwrap(),
        vec![
            TagCount { name: "work".into(), count: 2 },
            TagCount { name: "home".into(), count: 1 },
        ]
    );
    assert_eq!(notes.tag_counts(owner, 1).await.unwrap().len(), 1);
}
