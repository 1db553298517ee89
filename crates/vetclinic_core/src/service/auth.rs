//! Login and owner self-registration.
//!
//! # Responsibility
//! - Authenticate against the user table, with an owner's email as the
//!   alternate login key.
//! - Register new owners through the generic editor path so uniqueness and
//!   credential mirroring apply unchanged.
//!
//! # Invariants
//! - This module is the only consumer of the owner email as a login key.
//! - Credentials are matched exactly; uniqueness being case-insensitive
//!   does not make login case-insensitive.

use crate::editor::{EditorError, EntityEditor};
use crate::model::entity::{EntityKind, EntityRecord, Role};
use crate::repo::clinic_repo::ClinicRepository;
use crate::store::CollectionStore;
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authenticated session data handed to the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
    /// ID of the entity record behind this login.
    pub user_id: String,
}

#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    /// Signup failed in the editor (blank fields, duplicates, ...).
    Signup(EditorError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid username/email or password"),
            Self::Signup(err) => write!(f, "signup rejected: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCredentials => None,
            Self::Signup(err) => Some(err),
        }
    }
}

/// Authenticates by username, falling back to owner email.
pub fn login<S: CollectionStore>(
    repo: &ClinicRepository<S>,
    identifier: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let identifier = identifier.trim();
    let password = password.trim();

    let user = repo
        .users()
        .iter()
        .find(|user| user.username == identifier && user.password == password)
        .or_else(|| {
            // Owners may log in with their email instead of their username.
            let owner = repo.records(EntityKind::Owner).iter().find(|owner| {
                owner.field("email") == identifier && owner.field("password") == password
            })?;
            repo.users()
                .iter()
                .find(|user| user.user_id == owner.id && user.role == Role::Owner)
        });

    match user {
        Some(user) => {
            info!(
                "event=login module=auth status=ok role={} user_id={}",
                user.role.as_str(),
                user.user_id
            );
            Ok(Session {
                username: user.username.clone(),
                role: user.role,
                user_id: user.user_id.clone(),
            })
        }
        None => {
            info!("event=login module=auth status=error reason=invalid_credentials");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Registers a new owner from signup form data.
pub fn signup_owner<S: CollectionStore>(
    repo: &mut ClinicRepository<S>,
    form: &BTreeMap<String, String>,
) -> Result<EntityRecord, AuthError> {
    let mut editor = EntityEditor::new(repo, EntityKind::Owner);
    editor.add(form).map_err(AuthError::Signup)
}
