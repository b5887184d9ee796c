//! Persistence for chat sessions, messages and travel search audit
//! records.
use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};
use serde::de::DeserializeOwned;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::error::ChatError;
use super::models::{
    Author, Message, NewMessage, NewTravelSearch, Session, SessionSummary, TravelSearch,
};
use crate::travel::SearchType;

/// Storage used by the chat service. Every record is keyed by an
/// opaque identifier generated on creation. Messages are immutable
/// once appended.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_session(&self, title: &str, user_id: Option<&str>) -> Result<Session, Error>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, Error>;

    /// Sessions owned by `user_id` (or ownerless sessions for
    /// `None`), most recently updated first.
    async fn list_sessions_for_user(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<SessionSummary>, Error>;

    async fn rename_session(&self, id: &str, title: &str) -> Result<Option<Session>, Error>;

    /// Mark the session as titled if it isn't already. Returns `true`
    /// only for the caller that flipped the flag.
    async fn claim_title(&self, id: &str) -> Result<bool, Error>;

    /// Append a message and bump the owning session's `updated_at`.
    async fn append_message(&self, msg: NewMessage) -> Result<Message, Error>;

    /// Messages in creation order.
    async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, Error>;

    async fn record_travel_search(&self, search: NewTravelSearch) -> Result<TravelSearch, Error>;

    /// Travel searches for a session, newest first.
    async fn list_travel_searches(&self, session_id: &str) -> Result<Vec<TravelSearch>, Error>;

    /// IDs of sessions that have user messages but were never given a
    /// title.
    async fn list_untitled_sessions(&self) -> Result<Vec<String>, Error>;
}

// Stored timestamps keep microsecond precision
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// Fixed width so that timestamps sort correctly as text
fn to_db_time(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn time_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<Option<T>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|v| serde_json::from_str(&v))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn session_from_row(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        titled: row.get(3)?,
        created_at: time_column(row, 4)?,
        updated_at: time_column(row, 5)?,
    })
}

fn message_from_row(row: &Row) -> rusqlite::Result<Message> {
    let author: String = row.get(3)?;
    let author = Author::parse(&author).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("Unknown message author: {}", author).into(),
        )
    })?;
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        content: row.get(2)?,
        author,
        metadata: json_column(row, 4)?,
        created_at: time_column(row, 5)?,
    })
}

fn travel_search_from_row(row: &Row) -> rusqlite::Result<TravelSearch> {
    let search_type: String = row.get(2)?;
    let search_type = SearchType::parse(&search_type).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("Unknown search type: {}", search_type).into(),
        )
    })?;
    let query = json_column(row, 3)?.ok_or(rusqlite::Error::InvalidColumnType(
        3,
        "query".to_string(),
        Type::Null,
    ))?;
    Ok(TravelSearch {
        id: row.get(0)?,
        session_id: row.get(1)?,
        search_type,
        query,
        results: json_column(row, 4)?,
        created_at: time_column(row, 5)?,
    })
}

const SESSION_COLUMNS: &str = "id, user_id, title, titled, created_at, updated_at";

/// `ChatStore` backed by SQLite. All calls go through the single
/// `tokio_rusqlite` worker thread so writes to a session never
/// interleave.
#[derive(Clone)]
pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChatStore for SqliteStore {
    async fn create_session(&self, title: &str, user_id: Option<&str>) -> Result<Session, Error> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::EmptyTitle.into());
        }
        let created_at = now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.map(String::from),
            title: title.to_string(),
            titled: false,
            created_at,
            updated_at: created_at,
        };

        let record = session.clone();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO session (id, user_id, title, titled, created_at, updated_at)
                     VALUES (?1, ?2, ?3, 0, ?4, ?5)",
                    params![
                        record.id,
                        record.user_id,
                        record.title,
                        to_db_time(&record.created_at),
                        to_db_time(&record.updated_at)
                    ],
                )?;
                Ok(())
            })
            .await?;

        Ok(session)
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, Error> {
        let id = id.to_owned();
        let session = self
            .db
            .call(move |conn| {
                let session = conn
                    .query_row(
                        &format!("SELECT {} FROM session WHERE id = ?1", SESSION_COLUMNS),
                        [id],
                        session_from_row,
                    )
                    .optional()?;
                Ok(session)
            })
            .await?;
        Ok(session)
    }

    async fn list_sessions_for_user(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<SessionSummary>, Error> {
        let user_id = user_id.map(String::from);
        let sessions = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT s.id, s.user_id, s.title, s.titled, s.created_at, s.updated_at,
                           (SELECT COUNT(*) FROM message m WHERE m.session_id = s.id)
                    FROM session s
                    WHERE s.user_id IS ?1
                    ORDER BY s.updated_at DESC, s.rowid DESC
                    "#,
                )?;
                let sessions = stmt
                    .query_map([user_id], |row| {
                        let message_count: i64 = row.get(6)?;
                        Ok(SessionSummary {
                            session: session_from_row(row)?,
                            message_count: message_count as usize,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(sessions)
            })
            .await?;
        Ok(sessions)
    }

    async fn rename_session(&self, id: &str, title: &str) -> Result<Option<Session>, Error> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(ChatError::EmptyTitle.into());
        }
        let id = id.to_owned();
        let updated_at = to_db_time(&now());
        let session = self
            .db
            .call(move |conn| {
                let updated = conn.execute(
                    "UPDATE session SET title = ?1, titled = 1, updated_at = ?2 WHERE id = ?3",
                    params![title, updated_at, id],
                )?;
                if updated == 0 {
                    return Ok(None);
                }
                let session = conn.query_row(
                    &format!("SELECT {} FROM session WHERE id = ?1", SESSION_COLUMNS),
                    [id],
                    session_from_row,
                )?;
                Ok(Some(session))
            })
            .await?;
        Ok(session)
    }

    async fn claim_title(&self, id: &str) -> Result<bool, Error> {
        let id = id.to_owned();
        let claimed = self
            .db
            .call(move |conn| {
                let updated = conn.execute(
                    "UPDATE session SET titled = 1 WHERE id = ?1 AND titled = 0",
                    [id],
                )?;
                Ok(updated == 1)
            })
            .await?;
        Ok(claimed)
    }

    async fn append_message(&self, msg: NewMessage) -> Result<Message, Error> {
        let session_id = msg.session_id.clone();
        let metadata = msg
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let id = Uuid::new_v4().to_string();

        let message = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;

                let last_update = tx
                    .query_row(
                        "SELECT updated_at FROM session WHERE id = ?1",
                        [&msg.session_id],
                        |row| time_column(row, 0),
                    )
                    .optional()?;
                let Some(last_update) = last_update else {
                    return Ok(None);
                };

                // Never go back in time so that creation order and
                // timestamp order agree within a session
                let created_at = now().max(last_update);
                let created = to_db_time(&created_at);

                tx.execute(
                    "INSERT INTO message (id, session_id, content, author, metadata, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        id,
                        msg.session_id,
                        msg.content,
                        msg.author.as_str(),
                        metadata,
                        created
                    ],
                )?;
                tx.execute(
                    "UPDATE session SET updated_at = ?1 WHERE id = ?2",
                    params![created, msg.session_id],
                )?;
                tx.commit()?;

                Ok(Some(Message {
                    id,
                    session_id: msg.session_id,
                    content: msg.content,
                    author: msg.author,
                    metadata: msg.metadata,
                    created_at,
                }))
            })
            .await?;

        message.ok_or_else(|| ChatError::SessionNotFound(session_id).into())
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, Error> {
        let s_id = session_id.to_owned();
        let messages = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, session_id, content, author, metadata, created_at
                    FROM message
                    WHERE session_id = ?1
                    ORDER BY created_at ASC, rowid ASC
                    "#,
                )?;
                let messages = stmt
                    .query_map([s_id], message_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(messages)
            })
            .await?;
        Ok(messages)
    }

    async fn record_travel_search(&self, search: NewTravelSearch) -> Result<TravelSearch, Error> {
        let record = TravelSearch {
            id: Uuid::new_v4().to_string(),
            session_id: search.session_id,
            search_type: search.search_type,
            query: search.query,
            results: search.results,
            created_at: now(),
        };
        let query = serde_json::to_string(&record.query)?;
        let results = record
            .results
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let row = record.clone();
        let inserted = self
            .db
            .call(move |conn| {
                let exists = conn
                    .prepare("SELECT 1 FROM session WHERE id = ?1")?
                    .exists([&row.session_id])?;
                if !exists {
                    return Ok(false);
                }
                conn.execute(
                    "INSERT INTO travel_search (id, session_id, search_type, query, results, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        row.id,
                        row.session_id,
                        row.search_type.as_str(),
                        query,
                        results,
                        to_db_time(&row.created_at)
                    ],
                )?;
                Ok(true)
            })
            .await?;

        if !inserted {
            return Err(ChatError::SessionNotFound(record.session_id).into());
        }
        Ok(record)
    }

    async fn list_travel_searches(&self, session_id: &str) -> Result<Vec<TravelSearch>, Error> {
        let s_id = session_id.to_owned();
        let searches = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, session_id, search_type, query, results, created_at
                    FROM travel_search
                    WHERE session_id = ?1
                    ORDER BY created_at DESC, rowid DESC
                    "#,
                )?;
                let searches = stmt
                    .query_map([s_id], travel_search_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(searches)
            })
            .await?;
        Ok(searches)
    }

    async fn list_untitled_sessions(&self) -> Result<Vec<String>, Error> {
        let ids = self
            .db
            .call(|conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT s.id FROM session s
                    WHERE s.titled = 0
                    AND EXISTS (
                        SELECT 1 FROM message m
                        WHERE m.session_id = s.id AND m.author = 'user'
                    )
                    ORDER BY s.created_at ASC
                    "#,
                )?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(ids)
            })
            .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::TravelResults;
    use crate::core::db::memory_db;
    use crate::travel::{QueryType, TravelQuery, TravelSearchResults};

    async fn store() -> SqliteStore {
        SqliteStore::new(memory_db().await.unwrap())
    }

    fn hotel_query() -> TravelQuery {
        TravelQuery {
            destination: Some("Tokyo".to_string()),
            query_type: QueryType::Hotels,
            dates: None,
            guests: Some("2".to_string()),
            budget: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let store = store().await;
        let session = store.create_session("New Chat", None).await.unwrap();

        assert_eq!(session.title, "New Chat");
        assert!(session.updated_at >= session.created_at);
        assert!(!session.titled);

        let found = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found, session);
        assert!(store.get_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_empty_titles() {
        let store = store().await;
        let err = store.create_session("  ", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::EmptyTitle)
        ));

        let session = store.create_session("New Chat", None).await.unwrap();
        let err = store.rename_session(&session.id, "").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::EmptyTitle)
        ));
    }

    #[tokio::test]
    async fn test_claim_title_succeeds_once() {
        let store = store().await;
        let session = store.create_session("New Chat", None).await.unwrap();

        assert!(store.claim_title(&session.id).await.unwrap());
        assert!(!store.claim_title(&session.id).await.unwrap());
        assert!(!store.claim_title("missing").await.unwrap());

        let renamed = store.create_session("New Chat", None).await.unwrap();
        store.rename_session(&renamed.id, "Honeymoon").await.unwrap();
        assert!(!store.claim_title(&renamed.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_append_bumps_updated_at_and_keeps_order() {
        let store = store().await;
        let session = store.create_session("New Chat", None).await.unwrap();

        let first = store
            .append_message(NewMessage::user(&session.id, "first"))
            .await
            .unwrap();
        let second = store
            .append_message(NewMessage::assistant(&session.id, "second", None))
            .await
            .unwrap();
        let third = store
            .append_message(NewMessage::user(&session.id, "third"))
            .await
            .unwrap();

        let messages = store.list_messages(&session.id).await.unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str(), third.id.as_str()]);
        assert!(messages.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let updated = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(updated.updated_at, third.created_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_append_to_missing_session_fails() {
        let store = store().await;
        let err = store
            .append_message(NewMessage::user("nope", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::SessionNotFound(id)) if id == "nope"
        ));
    }

    #[tokio::test]
    async fn test_metadata_round_trips() {
        let store = store().await;
        let session = store.create_session("New Chat", None).await.unwrap();
        let metadata = TravelResults {
            query_type: QueryType::Hotels,
            query: hotel_query(),
            data: Some(TravelSearchResults {
                hotels: Some(vec![]),
                ..Default::default()
            }),
        };
        store
            .append_message(NewMessage::assistant(
                &session.id,
                "Here you go",
                Some(metadata.clone()),
            ))
            .await
            .unwrap();

        let messages = store.list_messages(&session.id).await.unwrap();
        assert_eq!(messages[0].metadata, Some(metadata));
        assert_eq!(messages[0].author, Author::Assistant);
    }

    #[tokio::test]
    async fn test_lists_sessions_most_recent_first_with_counts() {
        let store = store().await;
        let older = store.create_session("Older", None).await.unwrap();
        let newer = store.create_session("Newer", None).await.unwrap();
        let _other_user = store.create_session("Other", Some("user-1")).await.unwrap();

        // Touching the older session moves it to the top
        store
            .append_message(NewMessage::user(&older.id, "hello"))
            .await
            .unwrap();

        let sessions = store.list_sessions_for_user(None).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session.id, older.id);
        assert_eq!(sessions[0].message_count, 1);
        assert_eq!(sessions[1].session.id, newer.id);
        assert_eq!(sessions[1].message_count, 0);

        let owned = store.list_sessions_for_user(Some("user-1")).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].session.title, "Other");
    }

    #[tokio::test]
    async fn test_rename_marks_session_titled() {
        let store = store().await;
        let session = store.create_session("New Chat", None).await.unwrap();
        store
            .append_message(NewMessage::user(&session.id, "hotels in paris"))
            .await
            .unwrap();
        assert_eq!(
            store.list_untitled_sessions().await.unwrap(),
            vec![session.id.clone()]
        );

        let renamed = store
            .rename_session(&session.id, "Trip to Paris")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.title, "Trip to Paris");
        assert!(renamed.titled);
        assert!(store.list_untitled_sessions().await.unwrap().is_empty());
        assert!(store.rename_session("missing", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_untitled_sessions_require_user_messages() {
        let store = store().await;
        let session = store.create_session("New Chat", None).await.unwrap();
        store
            .append_message(NewMessage::assistant(&session.id, "welcome", None))
            .await
            .unwrap();
        assert!(store.list_untitled_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_travel_searches_newest_first() {
        let store = store().await;
        let session = store.create_session("New Chat", None).await.unwrap();

        let first = store
            .record_travel_search(NewTravelSearch {
                session_id: session.id.clone(),
                search_type: SearchType::Hotels,
                query: hotel_query(),
                results: Some(TravelSearchResults::default()),
            })
            .await
            .unwrap();
        let second = store
            .record_travel_search(NewTravelSearch {
                session_id: session.id.clone(),
                search_type: SearchType::Flights,
                query: hotel_query(),
                results: None,
            })
            .await
            .unwrap();

        let searches = store.list_travel_searches(&session.id).await.unwrap();
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[0].id, second.id);
        assert_eq!(searches[1], first);

        let err = store
            .record_travel_search(NewTravelSearch {
                session_id: "missing".to_string(),
                search_type: SearchType::Hotels,
                query: hotel_query(),
                results: None,
            })
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ChatError>().is_some());
    }
}
