//! CSV export of query results.

use std::path::Path;

use crate::db::Dataset;
use crate::error::Result;

/// Write all caption records to a CSV file. Returns the row count.
pub fn export_captions(db: &Dataset, output_path: &Path) -> Result<usize> {
    let captions = db.get_captions()?;
    let mut writer = csv::Writer::from_path(output_path)?;
    for record in &captions {
        writer.serialize(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(captions.len())
}

/// Write one observation's click path to a CSV file. Returns the row
/// count, which is zero for an unknown `obs_uid`.
pub fn export_click_path(db: &Dataset, obs_uid: &str, output_path: &Path) -> Result<usize> {
    let clicks = db.get_click_path(obs_uid)?;
    let mut writer = csv::Writer::from_path(output_path)?;
    for record in &clicks {
        writer.serialize(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(clicks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::tempdir;

    fn fixture_store(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("capmit1003.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(crate::db::SCHEMA).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO images (img_uid, img_path) VALUES ('i1', 'i1.jpg');
            INSERT INTO captions (obs_uid, usr_uid, start_time, caption, img_uid)
                VALUES ('o1', 'u1', '2021-03-01 09:00:00', 'a dog', 'i1');
            INSERT INTO clicks (click_id, obs_uid, x, y, click_time) VALUES
                (1, 'o1', 1, 1, '2021-03-01 09:00:01'),
                (2, 'o1', 5, 9, '2021-03-01 09:00:02');
            "#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_export_captions() {
        let dir = tempdir().unwrap();
        let db = Dataset::open(fixture_store(dir.path())).unwrap();
        let out = dir.path().join("captions.csv");

        let count = export_captions(&db, &out).unwrap();
        assert_eq!(count, 1);

        let content = std::fs::read_to_string(&out).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "obs_uid,usr_uid,start_time,caption,img_uid,img_path"
        );
        assert!(lines.next().unwrap().contains("a dog"));
    }

    #[test]
    fn test_export_click_path() {
        let dir = tempdir().unwrap();
        let db = Dataset::open(fixture_store(dir.path())).unwrap();
        let out = dir.path().join("clicks.csv");

        assert_eq!(export_click_path(&db, "o1", &out).unwrap(), 2);
        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(content.lines().next().unwrap(), "click_id,x,y,click_time");

        // Unknown obs_uid exports zero rows, not an error
        assert_eq!(export_click_path(&db, "nope", &out).unwrap(), 0);
    }
}
