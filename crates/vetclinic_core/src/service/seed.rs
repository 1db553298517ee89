//! First-run demo data seeding.
//!
//! # Responsibility
//! - Populate a fresh store with the demo fixture: one vet, two
//!   receptionists (one head), one owner with a pet, visit history and an
//!   unassigned appointment.
//!
//! # Invariants
//! - Seeding runs at most once: only when users, owners, veterinarians and
//!   receptionists are all empty.
//! - Counters are reset before seeding so demo IDs start at `0001`;
//!   subsequent sessions resume from the persisted counters.

use crate::model::entity::{EntityKind, EntityRecord, Role};
use crate::model::user::UserAccount;
use crate::repo::clinic_repo::{ClinicRepository, RepoResult};
use crate::store::CollectionStore;
use log::info;

/// Whether the store still needs the demo fixture.
pub fn needs_seed<S: CollectionStore>(repo: &ClinicRepository<S>) -> bool {
    repo.users().is_empty()
        && repo.records(EntityKind::Owner).is_empty()
        && repo.records(EntityKind::Veterinarian).is_empty()
        && repo.records(EntityKind::Receptionist).is_empty()
}

/// Seeds the demo fixture on first run. Returns whether seeding happened.
pub fn seed_demo_data<S: CollectionStore>(repo: &mut ClinicRepository<S>) -> RepoResult<bool> {
    if !needs_seed(repo) {
        info!("event=seed_demo module=seed status=skip reason=existing_data");
        return Ok(false);
    }

    repo.reset_counters()?;

    let vet_id = repo.next_id(EntityKind::Veterinarian)?;
    repo.insert(
        EntityKind::Veterinarian,
        EntityRecord::new(&vet_id)
            .with("fname", "Dr. Alice")
            .with("lname", "Smith")
            .with("specialization", "Small Animals")
            .with("phone_number", "111-222-3333")
            .with("username", "vet1")
            .with("password", "password")
            .with("dob", "1985-01-15")
            .with("address", "123 Vet St"),
    )?;
    repo.insert_user(UserAccount {
        username: "vet1".to_string(),
        password: "password".to_string(),
        role: Role::Vet,
        user_id: vet_id.clone(),
    })?;

    let reception_id = repo.next_id(EntityKind::Receptionist)?;
    repo.insert(
        EntityKind::Receptionist,
        EntityRecord::new(&reception_id)
            .with("username", "reception1")
            .with("password", "password")
            .with("fname", "Bob")
            .with("lname", "Johnson")
            .with("phone_number", "444-555-6666")
            .with("address", "456 Clinic Ave")
            .with("dob", "1990-03-20"),
    )?;
    repo.insert_user(UserAccount {
        username: "reception1".to_string(),
        password: "password".to_string(),
        role: Role::Receptionist,
        user_id: reception_id,
    })?;

    // Head receptionists live in the receptionists collection; only the
    // login role differs.
    let head_id = repo.next_id(EntityKind::Receptionist)?;
    repo.insert(
        EntityKind::Receptionist,
        EntityRecord::new(&head_id)
            .with("username", "headrec")
            .with("password", "password")
            .with("fname", "Carol")
            .with("lname", "Davis")
            .with("phone_number", "777-888-9999")
            .with("address", "789 Main Rd")
            .with("dob", "1980-07-01"),
    )?;
    repo.insert_user(UserAccount {
        username: "headrec".to_string(),
        password: "password".to_string(),
        role: Role::HeadReceptionist,
        user_id: head_id,
    })?;

    let owner_id = repo.next_id(EntityKind::Owner)?;
    repo.insert(
        EntityKind::Owner,
        EntityRecord::new(&owner_id)
            .with("fname", "John")
            .with("lname", "Doe")
            .with("email", "john@example.com")
            .with("address", "101 Pet Lane")
            .with("phone_number", "555-123-4567")
            .with("username", "john.doe")
            .with("password", "password"),
    )?;
    repo.insert_user(UserAccount {
        username: "john.doe".to_string(),
        password: "password".to_string(),
        role: Role::Owner,
        user_id: owner_id.clone(),
    })?;

    let pet_id = repo.next_id(EntityKind::Pet)?;
    repo.insert(
        EntityKind::Pet,
        EntityRecord::new(&pet_id)
            .with("name", "Buddy")
            .with("species", "Dog")
            .with("breed", "Golden Retriever")
            .with("dob", "2020-05-10")
            .with("gender", "Male")
            .with("owner", &owner_id),
    )?;

    let record_id = repo.next_id(EntityKind::MedicalRecord)?;
    repo.insert(
        EntityKind::MedicalRecord,
        EntityRecord::new(&record_id)
            .with("pet_id", &pet_id)
            .with("visit_date", "2023-01-20")
            .with("diagnosis", "Routine checkup")
            .with("treatment", "N/A")
            .with("medication", "Flea prevention"),
    )?;
    let record_id = repo.next_id(EntityKind::MedicalRecord)?;
    repo.insert(
        EntityKind::MedicalRecord,
        EntityRecord::new(&record_id)
            .with("pet_id", &pet_id)
            .with("visit_date", "2024-03-15")
            .with("diagnosis", "Ear infection")
            .with("treatment", "Cleaned ears")
            .with("medication", "Otic drops"),
    )?;

    let appointment_id = repo.next_id(EntityKind::Appointment)?;
    repo.insert(
        EntityKind::Appointment,
        EntityRecord::new(&appointment_id)
            .with("datetime", "2025-07-15T10:00")
            .with("reason", "Vaccination")
            .with("vet", "")
            .with("pet", &pet_id)
            .with("owner", &owner_id),
    )?;

    info!(
        "event=seed_demo module=seed status=ok vet={vet_id} owner={owner_id} pet={pet_id}"
    );
    Ok(true)
}
