//! Domain model for clinic entities and login credentials.
//!
//! # Responsibility
//! - Define the canonical record shapes shared by all entity kinds.
//! - Keep one flat, string-valued record shape for the generic editor.
//!
//! # Invariants
//! - Every record is identified by a stable `PREFIX-0000` string ID.
//! - Credential rows are derived projections of their source record, never
//!   edited on their own.

pub mod entity;
pub mod user;
