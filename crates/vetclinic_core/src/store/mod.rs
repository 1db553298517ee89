//! Collection storage adapter over SQLite.
//!
//! # Responsibility
//! - Load and save whole named collections as JSON payloads.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - A missing key is an empty collection, never an error.
//! - Writes replace the entire payload for a key (load-modify-save cycles,
//!   single writer).

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Persisted collection keys, one per logical collection.
pub mod keys {
    pub const USERS: &str = "vet_clinic_users";
    pub const OWNERS: &str = "vet_clinic_owners";
    pub const PETS: &str = "vet_clinic_pets";
    pub const VETERINARIANS: &str = "vet_clinic_veterinarians";
    pub const RECEPTIONISTS: &str = "vet_clinic_receptionists";
    pub const APPOINTMENTS: &str = "vet_clinic_appointments";
    pub const MEDICAL_RECORDS: &str = "vet_clinic_pet_medical_records";
    pub const COUNTERS: &str = "vet_clinic_counters";
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error for payload persistence and (de)serialization.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Persisted payload under `key` is not valid JSON for the expected shape.
    MalformedPayload { key: String, message: String },
    /// A collection value could not be serialized for writing.
    Encode { key: String, message: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MalformedPayload { key, message } => {
                write!(f, "malformed payload under `{key}`: {message}")
            }
            Self::Encode { key, message } => {
                write!(f, "cannot encode payload for `{key}`: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MalformedPayload { .. } | Self::Encode { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage collaborator: whole-collection load/save, total and synchronous.
pub trait CollectionStore {
    /// Returns the raw JSON payload stored under `key`, if any.
    fn load_payload(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replaces the payload stored under `key`.
    fn save_payload(&self, key: &str, payload: &str) -> StoreResult<()>;

    /// Loads a typed collection; a missing key yields `T::default()`.
    fn load<T>(&self, key: &str) -> StoreResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.load_payload(key)? {
            Some(payload) => {
                serde_json::from_str(&payload).map_err(|err| StoreError::MalformedPayload {
                    key: key.to_string(),
                    message: err.to_string(),
                })
            }
            None => Ok(T::default()),
        }
    }

    /// Serializes and stores a typed collection under `key`.
    fn save<T>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_string(value).map_err(|err| StoreError::Encode {
            key: key.to_string(),
            message: err.to_string(),
        })?;
        self.save_payload(key, &payload)
    }
}

/// SQLite-backed collection store over a borrowed connection.
pub struct SqliteCollectionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollectionStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CollectionStore for SqliteCollectionStore<'_> {
    fn load_payload(&self, key: &str) -> StoreResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM collections WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn save_payload(&self, key: &str, payload: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO collections (key, payload)
             VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, payload],
        )?;
        Ok(())
    }
}
