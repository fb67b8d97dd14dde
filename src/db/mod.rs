//! Read-only access to the CapMIT1003 SQLite store.

pub mod schema;

use chrono::NaiveDateTime;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

pub use schema::{REQUIRED, SCHEMA};

/// One image-caption pair shown to a participant.
#[derive(Debug, Clone, Serialize)]
pub struct CaptionRecord {
    pub obs_uid: String,
    pub usr_uid: String,
    pub start_time: String,
    pub caption: String,
    pub img_uid: String,
    /// Relative file name of the stimulus image. `None` when the store
    /// has no image row for `img_uid` (the join is a LEFT JOIN).
    pub img_path: Option<String>,
}

/// One recorded click within an observation. `click_id` is ascending
/// within an observation and defines the click path order; it is not
/// globally unique.
#[derive(Debug, Clone, Serialize)]
pub struct ClickRecord {
    pub click_id: i64,
    pub x: i64,
    pub y: i64,
    pub click_time: String,
}

// Timestamps are stored as text; Python's sqlite3 writes fractional
// seconds, CURRENT_TIMESTAMP does not.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

impl CaptionRecord {
    /// Presentation time as a datetime, if the stored text parses.
    pub fn start_time_parsed(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.start_time)
    }
}

impl ClickRecord {
    /// Absolute click time as a datetime, if the stored text parses.
    pub fn click_time_parsed(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.click_time)
    }
}

/// Handle over one read-only connection to the dataset store.
///
/// The connection is held for the lifetime of the handle and released on
/// drop or on an explicit [`Dataset::close`]. The store is never written.
#[derive(Debug)]
pub struct Dataset {
    path: PathBuf,
    conn: Option<Connection>,
}

impl Dataset {
    /// Open the store at `path` and validate that the expected tables
    /// and columns are present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(Error::unavailable(&path, "no such file"));
        }

        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| Error::unavailable(&path, e))?;

        let db = Self {
            path,
            conn: Some(conn),
        };
        db.check_schema()?;
        debug!(path = %db.path.display(), "opened dataset store");
        Ok(db)
    }

    /// Release the connection. Calling this more than once is a no-op;
    /// dropping the handle has the same effect.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            // A failed close hands the connection back; drop it anyway.
            let _ = conn.close();
            debug!(path = %self.path.display(), "closed dataset store");
        }
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| Error::unavailable(&self.path, "handle is closed"))
    }

    fn check_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        for (table, columns) in REQUIRED {
            let mut stmt = conn
                .prepare(&format!("PRAGMA table_info({table})"))
                .map_err(|e| Error::unavailable(&self.path, e))?;
            let present: Vec<String> = stmt
                .query_map([], |row| row.get::<_, String>(1))
                .map_err(|e| Error::unavailable(&self.path, e))?
                .filter_map(|r| r.ok())
                .collect();

            if present.is_empty() {
                return Err(Error::SchemaMismatch(format!("missing table '{table}'")));
            }
            for column in *columns {
                if !present.iter().any(|c| c == column) {
                    return Err(Error::SchemaMismatch(format!(
                        "table '{table}' is missing column '{column}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Retrieve all image-caption pairs, ordered ascending by `obs_uid`.
    pub fn get_captions(&self) -> Result<Vec<CaptionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT o.obs_uid, o.usr_uid, o.start_time, o.caption, o.img_uid, i.img_path
            FROM captions o LEFT JOIN images i USING (img_uid)
            ORDER BY o.obs_uid
            "#,
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(CaptionRecord {
                    obs_uid: row.get(0)?,
                    usr_uid: row.get(1)?,
                    start_time: row.get(2)?,
                    caption: row.get(3)?,
                    img_uid: row.get(4)?,
                    img_path: row.get(5)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    /// Retrieve the click path for one observation, sorted ascending by
    /// `click_id`. An unknown `obs_uid` yields an empty vec, not an
    /// error.
    pub fn get_click_path(&self, obs_uid: &str) -> Result<Vec<ClickRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT click_id, x, y, click_time
            FROM clicks
            WHERE obs_uid = ?
            ORDER BY click_id ASC
            "#,
        )?;
        let records = stmt
            .query_map([obs_uid], |row| {
                Ok(ClickRecord {
                    click_id: row.get(0)?,
                    x: row.get(1)?,
                    y: row.get(2)?,
                    click_time: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    /// Number of observations in the store.
    pub fn observation_count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM captions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Resolve a record's stimulus image against a local image
    /// directory. Returns `None` when the record carries no `img_path`.
    pub fn resolve_image(record: &CaptionRecord, images_dir: &Path) -> Option<PathBuf> {
        record.img_path.as_ref().map(|p| images_dir.join(p))
    }
}

impl Drop for Dataset {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fixture_store(dir: &Path) -> PathBuf {
        let path = dir.join("capmit1003.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO images (img_uid, img_path) VALUES
                ('i1', 'i1.jpg'),
                ('i2', 'i2.jpg');
            INSERT INTO captions (obs_uid, usr_uid, start_time, caption, img_uid) VALUES
                ('o2', 'u1', '2021-03-02 10:00:00.500000', 'a cat', 'i2'),
                ('o1', 'u1', '2021-03-01 09:00:00', 'a dog', 'i1'),
                ('o3', 'u2', '2021-03-03 11:00:00', 'a house', 'missing');
            INSERT INTO clicks (click_id, obs_uid, x, y, click_time) VALUES
                (2, 'o1', 5, 9, '2021-03-01 09:00:02'),
                (1, 'o1', 1, 1, '2021-03-01 09:00:01'),
                (1, 'o2', 3, 4, '2021-03-02 10:00:01');
            "#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_captions_ordered_by_obs_uid() {
        let dir = tempdir().unwrap();
        let db = Dataset::open(fixture_store(dir.path())).unwrap();

        let captions = db.get_captions().unwrap();
        assert_eq!(captions.len(), 3);
        let uids: Vec<&str> = captions.iter().map(|c| c.obs_uid.as_str()).collect();
        assert_eq!(uids, vec!["o1", "o2", "o3"]);
        assert_eq!(captions[0].caption, "a dog");
        assert_eq!(captions[0].img_path.as_deref(), Some("i1.jpg"));
        // No image row for img_uid 'missing'
        assert_eq!(captions[2].img_path, None);
    }

    #[test]
    fn test_caption_count_matches_table_cardinality() {
        let dir = tempdir().unwrap();
        let db = Dataset::open(fixture_store(dir.path())).unwrap();

        assert_eq!(db.observation_count().unwrap(), 3);
        assert_eq!(db.get_captions().unwrap().len(), 3);
    }

    #[test]
    fn test_click_path_sorted_by_click_id() {
        let dir = tempdir().unwrap();
        let db = Dataset::open(fixture_store(dir.path())).unwrap();

        let clicks = db.get_click_path("o1").unwrap();
        assert_eq!(clicks.len(), 2);
        assert_eq!((clicks[0].click_id, clicks[0].x, clicks[0].y), (1, 1, 1));
        assert_eq!((clicks[1].click_id, clicks[1].x, clicks[1].y), (2, 5, 9));
    }

    #[test]
    fn test_click_path_unknown_obs_uid_is_empty() {
        let dir = tempdir().unwrap();
        let db = Dataset::open(fixture_store(dir.path())).unwrap();

        assert!(db.get_click_path("nope").unwrap().is_empty());
        // An observation with no clicks is empty too, not an error
        assert!(db.get_click_path("o3").unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = Dataset::open(dir.path().join("absent.db")).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn test_open_schema_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE captions (obs_uid TEXT)")
            .unwrap();
        drop(conn);

        let err = Dataset::open(&path).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut db = Dataset::open(fixture_store(dir.path())).unwrap();

        db.close();
        db.close();
        let err = db.get_captions().unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn test_timestamp_parsing() {
        let dir = tempdir().unwrap();
        let db = Dataset::open(fixture_store(dir.path())).unwrap();

        let captions = db.get_captions().unwrap();
        // With and without fractional seconds
        assert!(captions[0].start_time_parsed().is_some());
        assert!(captions[1].start_time_parsed().is_some());
    }

    #[test]
    fn test_resolve_image() {
        let dir = tempdir().unwrap();
        let db = Dataset::open(fixture_store(dir.path())).unwrap();

        let captions = db.get_captions().unwrap();
        let resolved = Dataset::resolve_image(&captions[0], Path::new("mit1003/ALLSTIMULI"));
        assert_eq!(resolved, Some(PathBuf::from("mit1003/ALLSTIMULI/i1.jpg")));
        assert_eq!(Dataset::resolve_image(&captions[2], Path::new("x")), None);
    }
}
