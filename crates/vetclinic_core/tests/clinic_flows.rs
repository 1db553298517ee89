use std::collections::BTreeMap;
use vetclinic_core::db::open_db_in_memory;
use vetclinic_core::{
    add_medical_record, appointments_of_vet, pet_details, pets_of_owner, register_pet,
    request_appointment, seed_demo_data, AppointmentRequest, ClinicError, ClinicRepository,
    MedicalRecordEntry, SqliteCollectionStore,
};

#[test]
fn owner_registers_a_pet_linked_to_their_id() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    seed_demo_data(&mut repo).unwrap();

    let pet = register_pet(&mut repo, "OWN-0001", &pet_form()).unwrap();
    assert_eq!(pet.id, "PET-0002");
    assert_eq!(pet.field("owner"), "OWN-0001");

    let pets = pets_of_owner(&repo, "OWN-0001");
    assert_eq!(pets.len(), 2);
}

#[test]
fn requested_appointments_start_unassigned() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    seed_demo_data(&mut repo).unwrap();

    let request = AppointmentRequest {
        pet_id: "PET-0001".to_string(),
        datetime: "2025-08-01T09:30".to_string(),
        reason: "Limping on front leg".to_string(),
    };
    let appointment = request_appointment(&mut repo, "OWN-0001", &request).unwrap();

    assert_eq!(appointment.id, "APP-0002");
    assert_eq!(appointment.field("vet"), "");
    assert_eq!(appointment.field("pet"), "PET-0001");
    assert_eq!(appointment.field("owner"), "OWN-0001");

    // Not assigned to anyone yet.
    assert!(appointments_of_vet(&repo, "VET-0001").is_empty());
}

#[test]
fn appointment_for_unknown_pet_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    seed_demo_data(&mut repo).unwrap();

    let request = AppointmentRequest {
        pet_id: "PET-9999".to_string(),
        datetime: "2025-08-01T09:30".to_string(),
        reason: "Checkup".to_string(),
    };
    let err = request_appointment(&mut repo, "OWN-0001", &request).unwrap_err();
    assert!(matches!(err, ClinicError::UnknownPet(id) if id == "PET-9999"));
}

#[test]
fn medical_record_requires_an_existing_pet() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    seed_demo_data(&mut repo).unwrap();

    let entry = MedicalRecordEntry {
        pet_id: "PET-9999".to_string(),
        visit_date: "2025-08-01".to_string(),
        diagnosis: "Sprain".to_string(),
        treatment: "Rest".to_string(),
        medication: "None".to_string(),
    };
    let err = add_medical_record(&mut repo, &entry).unwrap_err();
    assert!(matches!(err, ClinicError::UnknownPet(id) if id == "PET-9999"));
}

#[test]
fn vet_records_a_visit_and_it_shows_in_pet_details() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    seed_demo_data(&mut repo).unwrap();

    let entry = MedicalRecordEntry {
        pet_id: "PET-0001".to_string(),
        visit_date: "2025-08-01".to_string(),
        diagnosis: "Sprain".to_string(),
        treatment: "Rest".to_string(),
        medication: "None".to_string(),
    };
    let record = add_medical_record(&mut repo, &entry).unwrap();
    assert_eq!(record.id, "PMR-0003");

    let details = pet_details(&repo, "PET-0001").unwrap();
    assert_eq!(details.pet.field("name"), "Buddy");
    assert_eq!(details.owner_label, "John Doe (ID: OWN-0001)");
    assert_eq!(details.records.len(), 3);
}

#[test]
fn pet_details_for_unknown_pet_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();

    let err = pet_details(&repo, "PET-0001").unwrap_err();
    assert!(matches!(err, ClinicError::UnknownPet(_)));
}

fn pet_form() -> BTreeMap<String, String> {
    let mut form = BTreeMap::new();
    for (key, value) in [
        ("name", "Misty"),
        ("species", "Cat"),
        ("breed", "Siamese"),
        ("dob", "2021-02-01"),
        ("gender", "Female"),
    ] {
        form.insert(key.to_string(), value.to_string());
    }
    form
}
