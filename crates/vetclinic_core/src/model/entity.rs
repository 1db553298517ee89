//! Entity kinds and the flat record shape they share.
//!
//! # Responsibility
//! - Enumerate the six managed entity kinds with their ID prefixes,
//!   collection keys and login roles.
//! - Define `EntityRecord`, the flat string-field record every kind uses.
//!
//! # Invariants
//! - `prefix()` values are unique across kinds; sequence numbers under a
//!   prefix are never reused, even after deletion.
//! - Field values are plain strings, exactly as submitted by forms.

use crate::store::keys;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One of the six managed entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Owner,
    Pet,
    Veterinarian,
    Receptionist,
    Appointment,
    MedicalRecord,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Owner,
        EntityKind::Pet,
        EntityKind::Veterinarian,
        EntityKind::Receptionist,
        EntityKind::Appointment,
        EntityKind::MedicalRecord,
    ];

    /// ID prefix minted in front of the zero-padded sequence number.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Owner => "OWN-",
            Self::Pet => "PET-",
            Self::Veterinarian => "VET-",
            Self::Receptionist => "REC-",
            Self::Appointment => "APP-",
            Self::MedicalRecord => "PMR-",
        }
    }

    /// Storage key of the collection holding this kind.
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::Owner => keys::OWNERS,
            Self::Pet => keys::PETS,
            Self::Veterinarian => keys::VETERINARIANS,
            Self::Receptionist => keys::RECEPTIONISTS,
            Self::Appointment => keys::APPOINTMENTS,
            Self::MedicalRecord => keys::MEDICAL_RECORDS,
        }
    }

    /// Plural display title, e.g. for table headings.
    pub fn title(self) -> &'static str {
        match self {
            Self::Owner => "Owners",
            Self::Pet => "Pets",
            Self::Veterinarian => "Veterinarians",
            Self::Receptionist => "Receptionists",
            Self::Appointment => "Appointments",
            Self::MedicalRecord => "Medical Records",
        }
    }

    /// Singular display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Pet => "Pet",
            Self::Veterinarian => "Veterinarian",
            Self::Receptionist => "Receptionist",
            Self::Appointment => "Appointment",
            Self::MedicalRecord => "Medical Record",
        }
    }

    /// Login role mirrored into the user table, for credentialed kinds.
    pub fn login_role(self) -> Option<Role> {
        match self {
            Self::Owner => Some(Role::Owner),
            Self::Veterinarian => Some(Role::Vet),
            Self::Receptionist => Some(Role::Receptionist),
            Self::Pet | Self::Appointment | Self::MedicalRecord => None,
        }
    }

    /// Whether this kind has a mirrored credential row.
    pub fn is_credentialed(self) -> bool {
        self.login_role().is_some()
    }
}

/// Role attached to a login credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Vet,
    Receptionist,
    HeadReceptionist,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Vet => "vet",
            Self::Receptionist => "receptionist",
            Self::HeadReceptionist => "headreceptionist",
        }
    }
}

/// Flat record for any entity kind: a stable ID plus string fields.
///
/// Fields are kept as an ordered map so the persisted JSON stays flat and
/// deterministic; the schema registry decides which keys are meaningful for
/// a given kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter used by seeding and tests.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), value.to_string());
        self
    }

    /// Returns the field value, or an empty string for absent fields.
    ///
    /// Absent fields display as blanks rather than failing hard; hand-edited
    /// payloads degrade to missing-field artifacts, not errors.
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }
}
