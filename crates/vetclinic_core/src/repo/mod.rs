//! Repository layer owning the authoritative in-memory collections.
//!
//! # Responsibility
//! - Mirror every persisted collection in memory and flush the touched
//!   collection whole after each mutation.
//! - Mint sequential entity IDs from the persisted counters map.
//!
//! # Invariants
//! - `load`/`save` through the collection store are the only storage
//!   boundary crossings; no ambient globals.
//! - Counters only move forward; sequence numbers are never reused.

pub mod clinic_repo;
