//! Clinic flows performed from the role dashboards.
//!
//! # Responsibility
//! - Owner flows: register a pet, request an appointment, list own pets.
//! - Vet flows: list assigned appointments, record a visit.
//! - Shared: pet details with owner label and medical history.
//!
//! # Invariants
//! - Every write goes through the generic editor, so reference checks and
//!   ID minting apply uniformly.
//! - Appointments requested by owners start with the vet unassigned.

use crate::editor::{reference_label, EditorError, EntityEditor};
use crate::model::entity::{EntityKind, EntityRecord};
use crate::repo::clinic_repo::ClinicRepository;
use crate::store::CollectionStore;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ClinicError {
    /// The targeted pet does not exist.
    UnknownPet(String),
    Editor(EditorError),
}

impl Display for ClinicError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPet(id) => write!(f, "pet `{id}` does not exist"),
            Self::Editor(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ClinicError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownPet(_) => None,
            Self::Editor(err) => Some(err),
        }
    }
}

impl From<EditorError> for ClinicError {
    fn from(value: EditorError) -> Self {
        match value {
            EditorError::UnknownReference { field, id } if field == "pet" || field == "pet_id" => {
                Self::UnknownPet(id)
            }
            other => Self::Editor(other),
        }
    }
}

/// Appointment request submitted from the owner dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRequest {
    pub pet_id: String,
    /// `YYYY-MM-DDTHH:MM`, date and time joined as submitted.
    pub datetime: String,
    pub reason: String,
}

/// Visit entry recorded by a veterinarian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalRecordEntry {
    pub pet_id: String,
    pub visit_date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub medication: String,
}

/// Pet view with its owner label and medical history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetDetails {
    pub pet: EntityRecord,
    /// Owner join label; a deleted owner shows the dangling marker.
    pub owner_label: String,
    pub records: Vec<EntityRecord>,
}

/// Registers a pet for an owner. The owner link is filled in from the
/// session, not the form.
pub fn register_pet<S: CollectionStore>(
    repo: &mut ClinicRepository<S>,
    owner_id: &str,
    form: &BTreeMap<String, String>,
) -> Result<EntityRecord, ClinicError> {
    let mut form = form.clone();
    form.insert("owner".to_string(), owner_id.to_string());
    let mut editor = EntityEditor::new(repo, EntityKind::Pet);
    Ok(editor.add(&form)?)
}

/// Requests an appointment for one of the owner's pets; the vet is left
/// unassigned for a receptionist to fill in later.
pub fn request_appointment<S: CollectionStore>(
    repo: &mut ClinicRepository<S>,
    owner_id: &str,
    request: &AppointmentRequest,
) -> Result<EntityRecord, ClinicError> {
    let mut form = BTreeMap::new();
    form.insert("datetime".to_string(), request.datetime.clone());
    form.insert("reason".to_string(), request.reason.clone());
    form.insert("vet".to_string(), String::new());
    form.insert("pet".to_string(), request.pet_id.clone());
    form.insert("owner".to_string(), owner_id.to_string());
    let mut editor = EntityEditor::new(repo, EntityKind::Appointment);
    Ok(editor.add(&form)?)
}

/// Records a visit against an existing pet.
pub fn add_medical_record<S: CollectionStore>(
    repo: &mut ClinicRepository<S>,
    entry: &MedicalRecordEntry,
) -> Result<EntityRecord, ClinicError> {
    let mut form = BTreeMap::new();
    form.insert("pet_id".to_string(), entry.pet_id.clone());
    form.insert("visit_date".to_string(), entry.visit_date.clone());
    form.insert("diagnosis".to_string(), entry.diagnosis.clone());
    form.insert("treatment".to_string(), entry.treatment.clone());
    form.insert("medication".to_string(), entry.medication.clone());
    let mut editor = EntityEditor::new(repo, EntityKind::MedicalRecord);
    Ok(editor.add(&form)?)
}

/// Pets registered to one owner.
pub fn pets_of_owner<'repo, S: CollectionStore>(
    repo: &'repo ClinicRepository<S>,
    owner_id: &str,
) -> Vec<&'repo EntityRecord> {
    repo.records(EntityKind::Pet)
        .iter()
        .filter(|pet| pet.field("owner") == owner_id)
        .collect()
}

/// Appointments assigned to one veterinarian.
pub fn appointments_of_vet<'repo, S: CollectionStore>(
    repo: &'repo ClinicRepository<S>,
    vet_id: &str,
) -> Vec<&'repo EntityRecord> {
    repo.records(EntityKind::Appointment)
        .iter()
        .filter(|appointment| appointment.field("vet") == vet_id)
        .collect()
}

/// Looks up one pet with its owner label and medical history.
pub fn pet_details<S: CollectionStore>(
    repo: &ClinicRepository<S>,
    pet_id: &str,
) -> Result<PetDetails, ClinicError> {
    let pet = repo
        .find(EntityKind::Pet, pet_id)
        .cloned()
        .ok_or_else(|| ClinicError::UnknownPet(pet_id.to_string()))?;

    let owner_label = reference_label(repo, EntityKind::Owner, pet.field("owner"));

    let records = repo
        .records(EntityKind::MedicalRecord)
        .iter()
        .filter(|record| record.field("pet_id") == pet.id)
        .cloned()
        .collect();

    Ok(PetDetails {
        pet,
        owner_label,
        records,
    })
}
