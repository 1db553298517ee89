//! Core domain logic for the clinic management system.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;
pub mod service;
pub mod store;

pub use editor::{reference_label, EditorError, EditorResult, EntityEditor};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{EntityKind, EntityRecord, Role};
pub use model::user::UserAccount;
pub use repo::clinic_repo::{ClinicRepository, RepoError, RepoResult};
pub use schema::{schema_for, EntitySchema, FieldKind, FieldSpec};
pub use service::auth::{login, signup_owner, AuthError, Session};
pub use service::clinic::{
    add_medical_record, appointments_of_vet, pet_details, pets_of_owner, register_pet,
    request_appointment, AppointmentRequest, ClinicError, MedicalRecordEntry, PetDetails,
};
pub use service::seed::{needs_seed, seed_demo_data};
pub use store::{CollectionStore, SqliteCollectionStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
