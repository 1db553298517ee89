//! Login credential projection.
//!
//! # Responsibility
//! - Mirror the login fields of credentialed records (owners, vets,
//!   receptionists) into one flat user table for authentication.
//!
//! # Invariants
//! - `user_id` points at the owning entity record; removing that record
//!   removes this row with it.
//! - Rows are only written through the editor's add/update/remove paths.

use crate::model::entity::Role;
use serde::{Deserialize, Serialize};

/// One login credential, denormalized from its source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub password: String,
    pub role: Role,
    /// ID of the entity record this credential belongs to.
    #[serde(rename = "userId")]
    pub user_id: String,
}
