// Database persistence layer using SQLite

use pulse_core::{ArchiveRecord, DeviceRecord, GroupKey, Heartbeat};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;

/// One bucket of the grouped metrics query: the coalesced group values in
/// request order, plus the device count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub values: Vec<String>,
    pub count: i64,
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                unique_id   TEXT PRIMARY KEY CHECK(length(unique_id) <= 64),
                first_seen  INTEGER NOT NULL,
                last_seen   INTEGER NOT NULL,
                part_num    TEXT CHECK(length(part_num) <= 32),
                fw_version  TEXT CHECK(length(fw_version) <= 32),
                sw_version  TEXT CHECK(length(sw_version) <= 32),
                ciq_version TEXT CHECK(length(ciq_version) <= 32),
                lang        TEXT CHECK(length(lang) <= 16),
                feat        TEXT CHECK(length(feat) <= 512),
                country     TEXT CHECK(length(country) <= 8)
            );

            CREATE INDEX IF NOT EXISTS idx_devices_first_seen
                ON devices(first_seen);

            CREATE INDEX IF NOT EXISTS idx_devices_last_seen
                ON devices(last_seen);

            -- Archive mirror of devices. Any column added to devices must be
            -- added here AND to the capture trigger below in the same change,
            -- or deleted rows silently lose that column.
            CREATE TABLE IF NOT EXISTS devices_archive (
                unique_id   TEXT NOT NULL,
                first_seen  INTEGER NOT NULL,
                last_seen   INTEGER NOT NULL,
                part_num    TEXT,
                fw_version  TEXT,
                sw_version  TEXT,
                ciq_version TEXT,
                lang        TEXT,
                feat        TEXT,
                country     TEXT,
                deleted_at  INTEGER NOT NULL
            );

            -- Capture runs inside the deleting transaction: no delete can
            -- commit without its archive row.
            CREATE TRIGGER IF NOT EXISTS devices_capture_on_delete
            AFTER DELETE ON devices
            BEGIN
                INSERT INTO devices_archive (
                    unique_id, first_seen, last_seen, part_num, fw_version,
                    sw_version, ciq_version, lang, feat, country, deleted_at
                ) VALUES (
                    OLD.unique_id, OLD.first_seen, OLD.last_seen, OLD.part_num,
                    OLD.fw_version, OLD.sw_version, OLD.ciq_version, OLD.lang,
                    OLD.feat, OLD.country,
                    CAST(strftime('%s','now') AS INTEGER)
                );
            END;
        "#,
        )?;
        Ok(())
    }

    // Ingestion

    /// Atomic create-or-update for one heartbeat. A new id gets
    /// `first_seen = last_seen = now`; a known id keeps `first_seen` and has
    /// every mutable attribute overwritten, including overwrite-to-null.
    /// Single statement, so concurrent heartbeats for the same id serialize
    /// in the store instead of racing in read-modify-write steps.
    pub fn upsert_heartbeat(&self, hb: &Heartbeat, now: i64) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO devices
                   (unique_id, first_seen, last_seen, part_num, fw_version,
                    sw_version, ciq_version, lang, feat, country)
               VALUES (?1, ?2, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
               ON CONFLICT(unique_id) DO UPDATE SET
                   last_seen   = excluded.last_seen,
                   part_num    = excluded.part_num,
                   fw_version  = excluded.fw_version,
                   sw_version  = excluded.sw_version,
                   ciq_version = excluded.ciq_version,
                   lang        = excluded.lang,
                   feat        = excluded.feat,
                   country     = excluded.country"#,
            params![
                hb.unique_id,
                now,
                hb.part_num,
                hb.fw_version,
                hb.sw_version,
                hb.ciq_version,
                hb.lang,
                hb.feat,
                hb.country,
            ],
        )?;
        Ok(())
    }

    // Query engine

    /// Number of devices seen at or after `since` (inclusive).
    pub fn count_active(&self, since: i64) -> Result<i64, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM devices WHERE last_seen >= ?1",
            params![since],
            |r| r.get(0),
        )
    }

    /// Devices seen at or after `since`, newest first.
    pub fn list_active(&self, since: i64) -> Result<Vec<DeviceRecord>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT unique_id, first_seen, last_seen, part_num, fw_version,
                    sw_version, ciq_version, lang, feat, country
             FROM devices
             WHERE last_seen >= ?1
             ORDER BY last_seen DESC",
        )?;
        let mut rows = stmt.query(params![since])?;

        let mut devices = Vec::new();
        while let Some(row) = rows.next()? {
            devices.push(Self::row_to_device(row)?);
        }
        Ok(devices)
    }

    /// Grouped device counts within the window. Null group values are folded
    /// into 'Unknown' before grouping, so genuinely-null rows and rows
    /// reporting the literal string collapse into one bucket. Buckets come
    /// back ordered by count descending, ties by the group columns ascending
    /// in request order.
    pub fn group_counts(
        &self,
        since: i64,
        keys: &[GroupKey],
    ) -> Result<Vec<GroupCount>, rusqlite::Error> {
        // keys come from a closed enum, never from raw caller input
        let select: Vec<String> = keys
            .iter()
            .map(|k| format!("COALESCE({}, 'Unknown')", k.column()))
            .collect();
        let ordinals: Vec<String> = (1..=keys.len()).map(|i| i.to_string()).collect();
        let tiebreak: Vec<String> = ordinals.iter().map(|o| format!("{} ASC", o)).collect();

        let sql = format!(
            "SELECT {}, COUNT(*) FROM devices WHERE last_seen >= ?1 \
             GROUP BY {} ORDER BY COUNT(*) DESC, {}",
            select.join(", "),
            ordinals.join(", "),
            tiebreak.join(", "),
        );

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![since])?;

        let mut buckets = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(keys.len());
            for i in 0..keys.len() {
                values.push(row.get::<_, String>(i)?);
            }
            buckets.push(GroupCount {
                values,
                count: row.get(keys.len())?,
            });
        }
        Ok(buckets)
    }

    pub fn get_device(&self, unique_id: &str) -> Result<Option<DeviceRecord>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT unique_id, first_seen, last_seen, part_num, fw_version,
                    sw_version, ciq_version, lang, feat, country
             FROM devices WHERE unique_id = ?1",
        )?;
        let mut rows = stmt.query(params![unique_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::row_to_device(row)?)),
            None => Ok(None),
        }
    }

    // Retention / archive

    /// Administrative removal of a device. The on-delete trigger captures the
    /// row into the archive within the same statement.
    pub fn delete_device(&self, unique_id: &str) -> Result<bool, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let count = conn.execute(
            "DELETE FROM devices WHERE unique_id = ?1",
            params![unique_id],
        )?;
        Ok(count > 0)
    }

    /// Archive rows, oldest capture first. Read-only diagnostics; nothing in
    /// the query engine touches the archive.
    pub fn list_archived(&self) -> Result<Vec<ArchiveRecord>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT unique_id, first_seen, last_seen, part_num, fw_version,
                    sw_version, ciq_version, lang, feat, country, deleted_at
             FROM devices_archive
             ORDER BY deleted_at ASC",
        )?;
        let mut rows = stmt.query([])?;

        let mut archived = Vec::new();
        while let Some(row) = rows.next()? {
            archived.push(ArchiveRecord {
                unique_id: row.get(0)?,
                first_seen: row.get(1)?,
                last_seen: row.get(2)?,
                part_num: row.get(3)?,
                fw_version: row.get(4)?,
                sw_version: row.get(5)?,
                ciq_version: row.get(6)?,
                lang: row.get(7)?,
                feat: row.get(8)?,
                country: row.get(9)?,
                deleted_at: row.get(10)?,
            });
        }
        Ok(archived)
    }

    /// Column names of a table, in declaration order. Used by the schema
    /// drift probe that keeps the archive honest.
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let mut rows = stmt.query([])?;

        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            columns.push(row.get::<_, String>(1)?);
        }
        Ok(columns)
    }

    fn row_to_device(row: &Row) -> Result<DeviceRecord, rusqlite::Error> {
        Ok(DeviceRecord {
            unique_id: row.get(0)?,
            first_seen: row.get(1)?,
            last_seen: row.get(2)?,
            part_num: row.get(3)?,
            fw_version: row.get(4)?,
            sw_version: row.get(5)?,
            ciq_version: row.get(6)?,
            lang: row.get(7)?,
            feat: row.get(8)?,
            country: row.get(9)?,
        })
    }
}
