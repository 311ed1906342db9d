//! Storage layer for crew duty activities.
//!
//! Provides persistence for activity records using `rusqlite`. The engine in
//! `safehours-core` never touches storage; hosts load a snapshot through the
//! [`ActivityStore`] port and hand it to the calculators.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! Dates are stored as `YYYY-MM-DD` and clock times as `HH:MM:SS` TEXT, so
//! lexicographic ordering matches chronological ordering. Pre/post buffer time
//! is stored as whole milliseconds to keep the fixed-point value exact.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use uuid::Uuid;

use safehours_core::{Activity, ActivityId, ActivityKind, Hours, ValidationError};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// No activity matches the given ID or prefix.
    #[error("no activity matches {0}")]
    NotFound(String),
    /// More than one activity matches an ID prefix.
    #[error("activity prefix {prefix} is ambiguous ({matches} matches)")]
    AmbiguousId { prefix: String, matches: usize },
    /// A stored row could not be decoded into an activity.
    #[error("invalid activity row {id}: {message}")]
    InvalidRow { id: String, message: String },
    /// A stored or generated ID failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// An activity together with its storage identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredActivity {
    pub id: ActivityId,
    pub activity: Activity,
}

/// Storage port the host layer reads from and writes to.
///
/// Implementations persist whole records; edits replace a record wholesale.
pub trait ActivityStore {
    /// Every stored activity, newest first by date then start time.
    fn list_activities(&self) -> Result<Vec<StoredActivity>, DbError>;

    fn get_activity(&self, id: &ActivityId) -> Result<Option<StoredActivity>, DbError>;

    /// Stores a new activity and returns its generated ID.
    fn insert_activity(&mut self, activity: &Activity) -> Result<ActivityId, DbError>;

    fn replace_activity(&mut self, id: &ActivityId, activity: &Activity) -> Result<(), DbError>;

    fn delete_activity(&mut self, id: &ActivityId) -> Result<(), DbError>;

    /// Plain activity snapshot for the calculators.
    fn snapshot(&self) -> Result<Vec<Activity>, DbError> {
        Ok(self
            .list_activities()?
            .into_iter()
            .map(|stored| stored.activity)
            .collect())
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- activities: one scheduled duty activity per row
            -- date: YYYY-MM-DD, start_time/end_time: HH:MM:SS on that date
            -- kind: display name (e.g. 'Flight', 'SIM/ATD')
            -- pre_post_ms: buffer time in milliseconds
            CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                kind TEXT NOT NULL,
                pre_post_ms INTEGER NOT NULL DEFAULT 0,
                note TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_activities_date ON activities(date);
            ",
        )?;
        Ok(())
    }

    /// Resolves a full ID or unique prefix to a stored ID.
    pub fn resolve_id(&self, prefix: &str) -> Result<ActivityId, DbError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(DbError::NotFound(prefix.to_string()));
        }
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM activities WHERE substr(id, 1, ?1) = ?2 LIMIT 2")?;
        let ids = stmt
            .query_map(params![prefix.chars().count(), prefix], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        match ids.as_slice() {
            [] => Err(DbError::NotFound(prefix.to_string())),
            [id] => Ok(ActivityId::new(id.clone())?),
            _ => Err(DbError::AmbiguousId {
                prefix: prefix.to_string(),
                matches: self.count_prefix(prefix)?,
            }),
        }
    }

    fn count_prefix(&self, prefix: &str) -> Result<usize, DbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM activities WHERE substr(id, 1, ?1) = ?2",
            params![prefix.chars().count(), prefix],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Activities on a single date, earliest first.
    pub fn list_activities_on(&self, date: NaiveDate) -> Result<Vec<StoredActivity>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, date, start_time, end_time, kind, pre_post_ms, note
            FROM activities
            WHERE date = ?1
            ORDER BY start_time ASC
            ",
        )?;
        let rows = stmt
            .query_map(params![date.format(DATE_FORMAT).to_string()], RawRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(decode_rows(rows))
    }

    /// Replaces every stored activity in one transaction.
    pub fn replace_all(&mut self, activities: &[Activity]) -> Result<usize, DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM activities", [])?;
        let now = now_timestamp();
        for activity in activities {
            insert_row(&tx, &new_id(), activity, &now)?;
        }
        tx.commit()?;
        tracing::debug!(count = activities.len(), "replaced all activities");
        Ok(activities.len())
    }

    /// Inserts several activities in one transaction.
    ///
    /// Either every activity is stored or none is.
    pub fn insert_all(&mut self, activities: &[Activity]) -> Result<Vec<ActivityId>, DbError> {
        let tx = self.conn.transaction()?;
        let now = now_timestamp();
        let mut ids = Vec::with_capacity(activities.len());
        for activity in activities {
            let id = new_id();
            insert_row(&tx, &id, activity, &now)?;
            ids.push(ActivityId::new(id)?);
        }
        tx.commit()?;
        tracing::debug!(count = ids.len(), "inserted activities");
        Ok(ids)
    }

    /// Number of stored activities.
    pub fn count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn insert_row(
    conn: &Connection,
    id: &str,
    activity: &Activity,
    now: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "
        INSERT INTO activities (id, date, start_time, end_time, kind, pre_post_ms, note, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        ",
        params![
            id,
            activity.date.format(DATE_FORMAT).to_string(),
            activity.start.format(TIME_FORMAT).to_string(),
            activity.end.format(TIME_FORMAT).to_string(),
            activity.kind.as_str(),
            activity.pre_post.as_millis(),
            activity.note,
            now,
        ],
    )
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A row as stored, before validation.
struct RawRow {
    id: String,
    date: String,
    start: String,
    end: String,
    kind: String,
    pre_post_ms: i64,
    note: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            start: row.get(2)?,
            end: row.get(3)?,
            kind: row.get(4)?,
            pre_post_ms: row.get(5)?,
            note: row.get(6)?,
        })
    }

    fn decode(self) -> Result<StoredActivity, DbError> {
        let invalid = |message: String| DbError::InvalidRow {
            id: self.id.clone(),
            message,
        };
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| invalid(format!("date {}: {e}", self.date)))?;
        let start = NaiveTime::parse_from_str(&self.start, TIME_FORMAT)
            .map_err(|e| invalid(format!("start {}: {e}", self.start)))?;
        let end = NaiveTime::parse_from_str(&self.end, TIME_FORMAT)
            .map_err(|e| invalid(format!("end {}: {e}", self.end)))?;
        let kind: ActivityKind = self
            .kind
            .parse()
            .map_err(|e: ValidationError| invalid(e.to_string()))?;
        let activity = Activity {
            date,
            start,
            end,
            kind,
            pre_post: Hours::from_millis(self.pre_post_ms),
            note: self.note,
        };
        Ok(StoredActivity {
            id: ActivityId::new(self.id)?,
            activity,
        })
    }
}

/// Decodes rows, skipping any that fail.
fn decode_rows(rows: Vec<RawRow>) -> Vec<StoredActivity> {
    rows.into_iter()
        .filter_map(|raw| match raw.decode() {
            Ok(stored) => Some(stored),
            Err(err) => {
                tracing::warn!(error = %err, "skipping undecodable activity row");
                None
            }
        })
        .collect()
}

impl ActivityStore for Database {
    fn list_activities(&self) -> Result<Vec<StoredActivity>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, date, start_time, end_time, kind, pre_post_ms, note
            FROM activities
            ORDER BY date DESC, start_time DESC
            ",
        )?;
        let rows = stmt
            .query_map([], RawRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(decode_rows(rows))
    }

    fn get_activity(&self, id: &ActivityId) -> Result<Option<StoredActivity>, DbError> {
        let raw = self
            .conn
            .query_row(
                "
                SELECT id, date, start_time, end_time, kind, pre_post_ms, note
                FROM activities
                WHERE id = ?1
                ",
                params![id.as_str()],
                RawRow::from_row,
            )
            .optional()?;
        raw.map(RawRow::decode).transpose()
    }

    fn insert_activity(&mut self, activity: &Activity) -> Result<ActivityId, DbError> {
        let id = new_id();
        let now = now_timestamp();
        insert_row(&self.conn, &id, activity, &now)?;
        tracing::debug!(%id, date = %activity.date, kind = %activity.kind, "inserted activity");
        Ok(ActivityId::new(id)?)
    }

    fn replace_activity(&mut self, id: &ActivityId, activity: &Activity) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "
            UPDATE activities
            SET date = ?2, start_time = ?3, end_time = ?4, kind = ?5, pre_post_ms = ?6, note = ?7,
                updated_at = ?8
            WHERE id = ?1
            ",
            params![
                id.as_str(),
                activity.date.format(DATE_FORMAT).to_string(),
                activity.start.format(TIME_FORMAT).to_string(),
                activity.end.format(TIME_FORMAT).to_string(),
                activity.kind.as_str(),
                activity.pre_post.as_millis(),
                activity.note,
                now_timestamp(),
            ],
        )?;
        if updated == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        tracing::debug!(%id, "replaced activity");
        Ok(())
    }

    fn delete_activity(&mut self, id: &ActivityId) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1", params![id.as_str()])?;
        if deleted == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        tracing::debug!(%id, "deleted activity");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(date: &str, start: (u32, u32), end: (u32, u32), kind: ActivityKind) -> Activity {
        Activity::with_end(
            NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            kind,
            Hours::from_minutes(30),
            "note",
        )
        .unwrap()
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(
            table_columns(&db.conn, "activities"),
            vec![
                "id",
                "date",
                "start_time",
                "end_time",
                "kind",
                "pre_post_ms",
                "note",
                "created_at",
                "updated_at",
            ]
        );
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let mut db = Database::open_in_memory().unwrap();
        let flight = activity("2024-06-10", (8, 0), (12, 0), ActivityKind::Flight);
        let id = db.insert_activity(&flight).unwrap();

        let stored = db.get_activity(&id).unwrap().expect("activity exists");
        assert_eq!(stored.id, id);
        assert_eq!(stored.activity, flight);
    }

    #[test]
    fn list_is_newest_first() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_activity(&activity("2024-06-09", (8, 0), (9, 0), ActivityKind::Ground))
            .unwrap();
        db.insert_activity(&activity("2024-06-10", (8, 0), (9, 0), ActivityKind::Ground))
            .unwrap();
        db.insert_activity(&activity("2024-06-10", (13, 0), (14, 0), ActivityKind::Flight))
            .unwrap();

        let listed = db.list_activities().unwrap();
        let keys: Vec<_> = listed
            .iter()
            .map(|s| (s.activity.date.to_string(), s.activity.start.to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-06-10".to_string(), "13:00:00".to_string()),
                ("2024-06-10".to_string(), "08:00:00".to_string()),
                ("2024-06-09".to_string(), "08:00:00".to_string()),
            ]
        );
    }

    #[test]
    fn replace_and_delete() {
        let mut db = Database::open_in_memory().unwrap();
        let id = db
            .insert_activity(&activity("2024-06-10", (8, 0), (9, 0), ActivityKind::Ground))
            .unwrap();
        let moved = activity("2024-06-11", (10, 0), (11, 30), ActivityKind::SimAtd);
        db.replace_activity(&id, &moved).unwrap();
        assert_eq!(db.get_activity(&id).unwrap().unwrap().activity, moved);

        db.delete_activity(&id).unwrap();
        assert!(db.get_activity(&id).unwrap().is_none());
        assert!(matches!(
            db.delete_activity(&id),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn resolve_id_by_prefix() {
        let mut db = Database::open_in_memory().unwrap();
        let id = db
            .insert_activity(&activity("2024-06-10", (8, 0), (9, 0), ActivityKind::Ground))
            .unwrap();
        assert_eq!(db.resolve_id(id.short()).unwrap(), id);
        assert_eq!(db.resolve_id(id.as_str()).unwrap(), id);
        assert!(matches!(db.resolve_id("zzzz"), Err(DbError::NotFound(_))));
        assert!(matches!(db.resolve_id(""), Err(DbError::NotFound(_))));
    }

    #[test]
    fn resolve_id_reports_ambiguity() {
        let db = Database::open_in_memory().unwrap();
        for id in ["abc-1", "abc-2"] {
            db.conn
                .execute(
                    "INSERT INTO activities (id, date, start_time, end_time, kind, created_at, updated_at)
                     VALUES (?1, '2024-06-10', '08:00:00', '09:00:00', 'Ground', 'x', 'x')",
                    params![id],
                )
                .unwrap();
        }
        assert!(matches!(
            db.resolve_id("abc"),
            Err(DbError::AmbiguousId { matches: 2, .. })
        ));
    }

    #[test]
    fn undecodable_rows_are_skipped() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_activity(&activity("2024-06-10", (8, 0), (9, 0), ActivityKind::Ground))
            .unwrap();
        db.conn
            .execute(
                "INSERT INTO activities (id, date, start_time, end_time, kind, created_at, updated_at)
                 VALUES ('bad', 'June 10', '08:00:00', '09:00:00', 'Ground', 'x', 'x')",
                [],
            )
            .unwrap();
        assert_eq!(db.count().unwrap(), 2);
        assert_eq!(db.list_activities().unwrap().len(), 1);
        assert_eq!(db.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn replace_all_swaps_contents() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_activity(&activity("2024-06-10", (8, 0), (9, 0), ActivityKind::Ground))
            .unwrap();
        let loaded = vec![
            activity("2024-06-01", (8, 0), (9, 0), ActivityKind::Flight),
            activity("2024-06-02", (8, 0), (9, 0), ActivityKind::Flight),
        ];
        assert_eq!(db.replace_all(&loaded).unwrap(), 2);
        let mut snapshot = db.snapshot().unwrap();
        snapshot.sort_by_key(|a| a.date);
        assert_eq!(snapshot, loaded);
    }

    #[test]
    fn insert_all_adds_to_existing() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_activity(&activity("2024-06-10", (8, 0), (9, 0), ActivityKind::Ground))
            .unwrap();
        let ids = db
            .insert_all(&[
                activity("2024-06-11", (8, 0), (9, 0), ActivityKind::Flight),
                activity("2024-06-12", (8, 0), (9, 0), ActivityKind::Flight),
            ])
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(db.count().unwrap(), 3);
        assert!(db.get_activity(&ids[1]).unwrap().is_some());
    }

    #[test]
    fn insert_all_is_all_or_nothing() {
        let mut db = Database::open_in_memory().unwrap();
        db.conn
            .execute_batch(
                "
                CREATE TRIGGER reject_marked BEFORE INSERT ON activities
                WHEN NEW.note = 'reject'
                BEGIN SELECT RAISE(ABORT, 'rejected'); END;
                ",
            )
            .unwrap();
        let mut marked = activity("2024-06-12", (8, 0), (9, 0), ActivityKind::Ground);
        marked.note = "reject".to_string();

        let result = db.insert_all(&[
            activity("2024-06-11", (8, 0), (9, 0), ActivityKind::Flight),
            marked,
        ]);
        assert!(matches!(result, Err(DbError::Sqlite(_))));
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn list_activities_on_date() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_activity(&activity("2024-06-10", (13, 0), (14, 0), ActivityKind::Ground))
            .unwrap();
        db.insert_activity(&activity("2024-06-10", (8, 0), (9, 0), ActivityKind::Flight))
            .unwrap();
        db.insert_activity(&activity("2024-06-11", (8, 0), (9, 0), ActivityKind::Flight))
            .unwrap();
        let day = db
            .list_activities_on(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())
            .unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].activity.kind, ActivityKind::Flight);
    }
}
