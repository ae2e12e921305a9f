//! Analysis Record Storage
//!
//! SQLite persistence for analysis results and device status. This is
//! plumbing around the engines: rows go in exactly as issued and come
//! back out unmodified, in particular the issuance timestamp string the
//! certificate digest was computed over.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::logic::certificate::{Certificate, StoredCertificate};
use crate::logic::grading::{ClassificationResult, PurityGrade, ResonanceReading};
use crate::logic::status::DeviceStatus;

/// One persisted analysis
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    pub test_id: String,
    /// Issuance timestamp string, stored verbatim
    pub recorded_at: String,
    pub sample_type: String,
    pub test_mode: String,
    pub frequency: f64,
    pub amplitude: f64,
    pub q_factor: f64,
    pub grade: PurityGrade,
    pub percentage: f64,
    pub confidence: f64,
    pub certificate_id: String,
    pub digest: String,
}

impl TestRecord {
    /// Assemble the row for a completed analysis
    pub fn new(
        reading: &ResonanceReading,
        result: &ClassificationResult,
        certificate: &Certificate,
        sample_type: &str,
        test_mode: &str,
    ) -> Self {
        Self {
            test_id: certificate.test_id.clone(),
            recorded_at: certificate.issued_at.clone(),
            sample_type: sample_type.to_string(),
            test_mode: test_mode.to_string(),
            frequency: reading.frequency,
            amplitude: reading.amplitude,
            q_factor: reading.q_factor,
            grade: result.grade,
            percentage: result.percentage,
            confidence: result.confidence,
            certificate_id: certificate.certificate_id.clone(),
            digest: certificate.digest.clone(),
        }
    }

    /// The digest-bound subset of the row, for verification
    pub fn stored_certificate(&self) -> StoredCertificate {
        StoredCertificate {
            test_id: self.test_id.clone(),
            grade: self.grade,
            percentage: self.percentage,
            issued_at: self.recorded_at.clone(),
            digest: self.digest.clone(),
        }
    }
}

/// Storage errors
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Sqlite(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Sqlite(err)
    }
}

/// SQLite-backed record store
pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    /// Open (and initialize) the database at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let store = Self { conn: Connection::open(path)? };
        store.init_schema()?;
        log::info!("Result store opened at {:?}", path);
        Ok(store)
    }

    /// Open the database at the configured default path
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(&crate::constants::get_db_path())
    }

    /// In-memory database, for tests
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let store = Self { conn: Connection::open_in_memory()? };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS test_results (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                sample_type TEXT NOT NULL,
                test_mode TEXT NOT NULL,
                frequency REAL NOT NULL,
                amplitude REAL NOT NULL,
                q_factor REAL NOT NULL,
                purity_grade TEXT NOT NULL,
                purity_percentage REAL NOT NULL,
                confidence_score REAL NOT NULL,
                certificate_id TEXT UNIQUE,
                digest TEXT
            );
            CREATE TABLE IF NOT EXISTS device_status (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT DEFAULT CURRENT_TIMESTAMP,
                battery_level REAL DEFAULT 100.0,
                is_connected INTEGER DEFAULT 0,
                signal_strength REAL DEFAULT 0.0,
                temperature REAL DEFAULT 25.0,
                calibration_status TEXT DEFAULT 'pending'
            );",
        )?;
        Ok(())
    }

    pub fn insert_result(&self, record: &TestRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO test_results (
                id, timestamp, sample_type, test_mode, frequency, amplitude, q_factor,
                purity_grade, purity_percentage, confidence_score, certificate_id, digest
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.test_id,
                record.recorded_at,
                record.sample_type,
                record.test_mode,
                record.frequency,
                record.amplitude,
                record.q_factor,
                record.grade.as_str(),
                record.percentage,
                record.confidence,
                record.certificate_id,
                record.digest,
            ],
        )?;
        Ok(())
    }

    pub fn by_test_id(&self, test_id: &str) -> Result<Option<TestRecord>, StorageError> {
        let record = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_RECORD),
                params![test_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    pub fn by_certificate_id(&self, certificate_id: &str) -> Result<Option<TestRecord>, StorageError> {
        let record = self
            .conn
            .query_row(
                &format!("{} WHERE certificate_id = ?1", SELECT_RECORD),
                params![certificate_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Most recent analyses first
    pub fn history(&self, limit: usize) -> Result<Vec<TestRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY timestamp DESC LIMIT ?1", SELECT_RECORD))?;
        let rows = stmt.query_map(params![limit as i64], row_to_record)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The digest-bound fields for a certificate, if the record exists
    pub fn stored_certificate(&self, certificate_id: &str) -> Result<Option<StoredCertificate>, StorageError> {
        Ok(self
            .by_certificate_id(certificate_id)?
            .map(|r| r.stored_certificate()))
    }

    /// Latest device status, seeding the calibrated default on first use
    pub fn device_status(&self) -> Result<DeviceStatus, StorageError> {
        let existing = self
            .conn
            .query_row(
                "SELECT battery_level, is_connected, signal_strength, temperature, calibration_status
                 FROM device_status ORDER BY id DESC LIMIT 1",
                [],
                row_to_status,
            )
            .optional()?;

        match existing {
            Some(status) => Ok(status),
            None => {
                let status = DeviceStatus::default();
                self.update_device_status(&status)?;
                Ok(status)
            }
        }
    }

    /// Append a new status row (status history is append-only)
    pub fn update_device_status(&self, status: &DeviceStatus) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO device_status (battery_level, is_connected, signal_strength, temperature, calibration_status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                status.battery_level,
                status.is_connected,
                status.signal_strength,
                status.temperature,
                status.calibration_status,
            ],
        )?;
        Ok(())
    }
}

const SELECT_RECORD: &str = "SELECT id, timestamp, sample_type, test_mode, frequency, amplitude, q_factor,
    purity_grade, purity_percentage, confidence_score, certificate_id, digest
    FROM test_results";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TestRecord> {
    let grade_text: String = row.get(7)?;
    let grade = PurityGrade::parse(&grade_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            rusqlite::types::Type::Text,
            format!("unknown purity grade '{}'", grade_text).into(),
        )
    })?;

    Ok(TestRecord {
        test_id: row.get(0)?,
        recorded_at: row.get(1)?,
        sample_type: row.get(2)?,
        test_mode: row.get(3)?,
        frequency: row.get(4)?,
        amplitude: row.get(5)?,
        q_factor: row.get(6)?,
        grade,
        percentage: row.get(8)?,
        confidence: row.get(9)?,
        certificate_id: row.get(10)?,
        digest: row.get(11)?,
    })
}

fn row_to_status(row: &Row<'_>) -> rusqlite::Result<DeviceStatus> {
    Ok(DeviceStatus {
        battery_level: row.get(0)?,
        is_connected: row.get(1)?,
        signal_strength: row.get(2)?,
        temperature: row.get(3)?,
        calibration_status: row.get(4)?,
    })
}
