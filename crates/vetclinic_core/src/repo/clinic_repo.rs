//! Clinic repository: authoritative collections over a collection store.
//!
//! # Responsibility
//! - Load every collection once at open; keep memory authoritative.
//! - Persist the touched collection whole after each mutation.
//! - Mint `PREFIX-0000` IDs from the persisted counters map.
//!
//! # Invariants
//! - Exactly one repository mutates a store at a time (single writer).
//! - `next_id` persists the advanced counter before returning the ID.

use crate::model::entity::{EntityKind, EntityRecord};
use crate::model::user::UserAccount;
use crate::store::{keys, CollectionStore, StoreError};
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error: storage transport plus semantic not-found.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    NotFound { kind: EntityKind, id: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => {
                write!(f, "no {} with id `{id}`", kind.label().to_lowercase())
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Owns the authoritative collections mirrored from the store.
pub struct ClinicRepository<S: CollectionStore> {
    store: S,
    users: Vec<UserAccount>,
    collections: BTreeMap<EntityKind, Vec<EntityRecord>>,
    /// Prefix -> last issued sequence number.
    counters: BTreeMap<String, u32>,
}

impl<S: CollectionStore> ClinicRepository<S> {
    /// Loads every collection from the store and takes ownership of it.
    pub fn open(store: S) -> RepoResult<Self> {
        let users: Vec<UserAccount> = store.load(keys::USERS)?;
        let mut collections = BTreeMap::new();
        for kind in EntityKind::ALL {
            let records: Vec<EntityRecord> = store.load(kind.collection_key())?;
            collections.insert(kind, records);
        }
        let counters: BTreeMap<String, u32> = store.load(keys::COUNTERS)?;

        info!(
            "event=repo_open module=repo status=ok users={} records={}",
            users.len(),
            collections.values().map(Vec::len).sum::<usize>()
        );

        Ok(Self {
            store,
            users,
            collections,
            counters,
        })
    }

    /// All records of one kind, in insertion order.
    pub fn records(&self, kind: EntityKind) -> &[EntityRecord] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Exact-ID lookup within one kind.
    pub fn find(&self, kind: EntityKind, id: &str) -> Option<&EntityRecord> {
        self.records(kind).iter().find(|record| record.id == id)
    }

    /// Appends a record and persists its collection.
    pub fn insert(&mut self, kind: EntityKind, record: EntityRecord) -> RepoResult<()> {
        self.collections.entry(kind).or_default().push(record);
        self.save_collection(kind)
    }

    /// Overwrites the record with the same ID and persists its collection.
    pub fn replace(&mut self, kind: EntityKind, record: EntityRecord) -> RepoResult<()> {
        let rows = self.collections.entry(kind).or_default();
        let Some(position) = rows.iter().position(|row| row.id == record.id) else {
            return Err(RepoError::NotFound {
                kind,
                id: record.id,
            });
        };
        rows[position] = record;
        self.save_collection(kind)
    }

    /// Removes the record with the given ID and persists its collection.
    ///
    /// Rows referencing the removed ID are left untouched; links go dangling
    /// and the display layer marks them.
    pub fn delete(&mut self, kind: EntityKind, id: &str) -> RepoResult<()> {
        let rows = self.collections.entry(kind).or_default();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(RepoError::NotFound {
                kind,
                id: id.to_string(),
            });
        }
        self.save_collection(kind)
    }

    pub fn users(&self) -> &[UserAccount] {
        &self.users
    }

    /// Appends a credential row and persists the user table.
    pub fn insert_user(&mut self, user: UserAccount) -> RepoResult<()> {
        self.users.push(user);
        self.save_users()
    }

    /// Drops the credential row of an entity, if one exists.
    pub fn remove_user(&mut self, user_id: &str) -> RepoResult<()> {
        let before = self.users.len();
        self.users.retain(|user| user.user_id != user_id);
        if self.users.len() == before {
            return Ok(());
        }
        self.save_users()
    }

    /// Patches the credential row of an entity: username always, password
    /// only when a new one is supplied. Missing rows are ignored.
    pub fn update_credentials(
        &mut self,
        user_id: &str,
        username: &str,
        password: Option<&str>,
    ) -> RepoResult<()> {
        let Some(user) = self.users.iter_mut().find(|user| user.user_id == user_id) else {
            return Ok(());
        };
        user.username = username.to_string();
        if let Some(password) = password {
            user.password = password.to_string();
        }
        self.save_users()
    }

    /// Mints the next sequential ID for a kind and persists the counter.
    ///
    /// IDs are strictly increasing per prefix within a session; there is no
    /// collision detection against existing rows if the counters map was
    /// edited out of band.
    pub fn next_id(&mut self, kind: EntityKind) -> RepoResult<String> {
        let prefix = kind.prefix();
        let next = self.counters.get(prefix).copied().unwrap_or(0) + 1;
        self.counters.insert(prefix.to_string(), next);
        self.store.save(keys::COUNTERS, &self.counters)?;
        Ok(format!("{prefix}{next:04}"))
    }

    /// Clears the counters map. Used once, by first-run demo seeding.
    pub fn reset_counters(&mut self) -> RepoResult<()> {
        self.counters.clear();
        self.store.save(keys::COUNTERS, &self.counters)?;
        Ok(())
    }

    fn save_collection(&mut self, kind: EntityKind) -> RepoResult<()> {
        let rows = self.records(kind);
        self.store.save(kind.collection_key(), &rows)?;
        Ok(())
    }

    fn save_users(&mut self) -> RepoResult<()> {
        self.store.save(keys::USERS, &self.users)?;
        Ok(())
    }
}
