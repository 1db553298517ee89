use std::collections::BTreeMap;
use vetclinic_core::db::open_db_in_memory;
use vetclinic_core::{
    schema_for, ClinicRepository, EditorError, EntityEditor, EntityKind, SqliteCollectionStore,
};

#[test]
fn add_then_select_returns_the_submitted_data() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);

    let record = editor.add(&owner_form("jane", "jane@x.com")).unwrap();
    assert_eq!(record.id, "OWN-0001");

    editor.select(&record.id);
    let values = editor.form_values().unwrap();
    assert_eq!(values["id"], "OWN-0001");
    assert_eq!(values["fname"], "Jane");
    assert_eq!(values["lname"], "Doe");
    assert_eq!(values["email"], "jane@x.com");
    // Password is never echoed back into the form.
    assert_eq!(values["password"], "");
}

#[test]
fn ids_strictly_increase_per_prefix_even_interleaved() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();

    let first_owner = EntityEditor::new(&mut repo, EntityKind::Owner)
        .add(&owner_form("jane", "jane@x.com"))
        .unwrap();
    let first_pet = EntityEditor::new(&mut repo, EntityKind::Pet)
        .add(&pet_form(&first_owner.id))
        .unwrap();
    let second_owner = EntityEditor::new(&mut repo, EntityKind::Owner)
        .add(&owner_form("john", "john@x.com"))
        .unwrap();
    let second_pet = EntityEditor::new(&mut repo, EntityKind::Pet)
        .add(&pet_form(&second_owner.id))
        .unwrap();

    assert_eq!(first_owner.id, "OWN-0001");
    assert_eq!(first_pet.id, "PET-0001");
    assert_eq!(second_owner.id, "OWN-0002");
    assert_eq!(second_pet.id, "PET-0002");
}

#[test]
fn sequence_numbers_are_not_reused_after_deletion() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);

    let first = editor.add(&owner_form("jane", "jane@x.com")).unwrap();
    editor.select(&first.id);
    editor.remove().unwrap();

    let second = editor.add(&owner_form("jane", "jane@x.com")).unwrap();
    assert_eq!(second.id, "OWN-0002");
}

#[test]
fn update_preserves_id_and_blank_password_keeps_stored_one() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();

    {
        let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);
        editor.add(&owner_form("jane", "jane@x.com")).unwrap();

        editor.select("OWN-0001");
        let mut form = owner_form("jane.doe", "jane@x.com");
        form.insert("fname".to_string(), "Janet".to_string());
        form.insert("password".to_string(), String::new());
        let updated = editor.update(&form).unwrap();
        assert_eq!(updated.id, "OWN-0001");
    }

    let stored = repo.find(EntityKind::Owner, "OWN-0001").unwrap();
    assert_eq!(stored.field("fname"), "Janet");
    assert_eq!(stored.field("password"), "pw1");

    // The mirrored credential row was patched: new username, old password.
    let user = repo.users().iter().find(|u| u.user_id == "OWN-0001").unwrap();
    assert_eq!(user.username, "jane.doe");
    assert_eq!(user.password, "pw1");
}

#[test]
fn update_with_new_password_patches_record_and_credentials() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();

    {
        let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);
        editor.add(&owner_form("jane", "jane@x.com")).unwrap();
        editor.select("OWN-0001");
        let mut form = owner_form("jane", "jane@x.com");
        form.insert("password".to_string(), "pw2".to_string());
        editor.update(&form).unwrap();
    }

    let stored = repo.find(EntityKind::Owner, "OWN-0001").unwrap();
    assert_eq!(stored.field("password"), "pw2");
    let user = repo.users().iter().find(|u| u.user_id == "OWN-0001").unwrap();
    assert_eq!(user.password, "pw2");
}

#[test]
fn update_without_selection_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);

    let err = editor.update(&owner_form("jane", "jane@x.com")).unwrap_err();
    assert!(matches!(err, EditorError::NoSelection));
}

#[test]
fn remove_drops_record_and_mirrored_user() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();

    {
        let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);
        editor.add(&owner_form("jane", "jane@x.com")).unwrap();
        editor.select("OWN-0001");
        editor.remove().unwrap();

        // A fresh select of the deleted ID is a no-op.
        editor.select("OWN-0001");
        assert!(editor.selected_id().is_none());
    }

    assert!(repo.find(EntityKind::Owner, "OWN-0001").is_none());
    assert!(repo.users().iter().all(|u| u.user_id != "OWN-0001"));
}

#[test]
fn remove_without_selection_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);

    let err = editor.remove().unwrap_err();
    assert!(matches!(err, EditorError::NoSelection));
}

#[test]
fn required_blank_fields_are_listed_by_label() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);

    let mut form = owner_form("jane", "jane@x.com");
    form.insert("fname".to_string(), String::new());
    form.remove("address");

    let err = editor.add(&form).unwrap_err();
    match err {
        EditorError::Validation { missing } => {
            assert_eq!(missing, vec!["First Name".to_string(), "Address".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(repo_is_empty(&repo));
}

#[test]
fn duplicate_username_is_rejected_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);

    editor.add(&owner_form("jane", "jane@x.com")).unwrap();
    let err = editor.add(&owner_form("JANE", "other@x.com")).unwrap_err();
    assert!(matches!(err, EditorError::Duplicate { field: "username" }));
}

#[test]
fn duplicate_owner_email_is_rejected_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);

    editor.add(&owner_form("jane", "jane@x.com")).unwrap();
    let err = editor.add(&owner_form("janet", "Jane@X.com")).unwrap_err();
    assert!(matches!(err, EditorError::Duplicate { field: "email" }));
}

#[test]
fn update_uniqueness_checks_exclude_the_selected_record() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);

    editor.add(&owner_form("jane", "jane@x.com")).unwrap();
    editor.select("OWN-0001");
    // Re-submitting the record's own username/email must not collide.
    editor.update(&owner_form("jane", "jane@x.com")).unwrap();
}

#[test]
fn malformed_email_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Owner);

    let err = editor.add(&owner_form("jane", "not-an-email")).unwrap_err();
    assert!(matches!(err, EditorError::InvalidEmail { field: "email", .. }));
}

#[test]
fn unknown_owner_reference_is_rejected_on_creation() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    let mut editor = EntityEditor::new(&mut repo, EntityKind::Pet);

    let err = editor.add(&pet_form("OWN-9999")).unwrap_err();
    match err {
        EditorError::UnknownReference { field, id } => {
            assert_eq!(field, "owner");
            assert_eq!(id, "OWN-9999");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn search_matches_ids_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();

    EntityEditor::new(&mut repo, EntityKind::Owner)
        .add(&owner_form("jane", "jane@x.com"))
        .unwrap();
    EntityEditor::new(&mut repo, EntityKind::Pet)
        .add(&pet_form("OWN-0001"))
        .unwrap();

    let mut editor = EntityEditor::new(&mut repo, EntityKind::Pet);
    let hit = editor.search("pet-0001").unwrap();
    assert_eq!(hit.id, "PET-0001");
    assert_eq!(editor.selected_id(), Some("PET-0001"));
    assert_eq!(editor.visible_rows().len(), 1);

    // A miss narrows the table to nothing.
    assert!(editor.search("PET-9999").is_none());
    assert!(editor.visible_rows().is_empty());
    assert!(editor.selected_id().is_none());

    // A blank query restores the full table.
    assert!(editor.search("  ").is_none());
    assert_eq!(editor.visible_rows().len(), 1);
}

#[test]
fn deleting_an_owner_leaves_its_pet_dangling_with_a_marker() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();

    EntityEditor::new(&mut repo, EntityKind::Owner)
        .add(&owner_form("jane", "jane@x.com"))
        .unwrap();
    EntityEditor::new(&mut repo, EntityKind::Pet)
        .add(&pet_form("OWN-0001"))
        .unwrap();

    {
        let mut owners = EntityEditor::new(&mut repo, EntityKind::Owner);
        owners.select("OWN-0001");
        owners.remove().unwrap();
    }

    // The pet still holds the old owner ID.
    let pet = repo.find(EntityKind::Pet, "PET-0001").unwrap().clone();
    assert_eq!(pet.field("owner"), "OWN-0001");

    let editor = EntityEditor::new(&mut repo, EntityKind::Pet);
    let spec = schema_for(EntityKind::Pet).field("owner").unwrap();
    assert_eq!(
        editor.display_value(spec, &pet),
        "Unknown Owner (ID: OWN-0001)"
    );
}

#[test]
fn display_masks_passwords_and_labels_links() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();

    EntityEditor::new(&mut repo, EntityKind::Owner)
        .add(&owner_form("jane", "jane@x.com"))
        .unwrap();
    EntityEditor::new(&mut repo, EntityKind::Pet)
        .add(&pet_form("OWN-0001"))
        .unwrap();

    let owner = repo.find(EntityKind::Owner, "OWN-0001").unwrap().clone();
    let pet = repo.find(EntityKind::Pet, "PET-0001").unwrap().clone();

    let owners = EntityEditor::new(&mut repo, EntityKind::Owner);
    let password_spec = schema_for(EntityKind::Owner).field("password").unwrap();
    assert_eq!(owners.display_value(password_spec, &owner), "********");
    drop(owners);

    let pets = EntityEditor::new(&mut repo, EntityKind::Pet);
    let owner_spec = schema_for(EntityKind::Pet).field("owner").unwrap();
    assert_eq!(
        pets.display_value(owner_spec, &pet),
        "Jane Doe (ID: OWN-0001)"
    );
}

#[test]
fn unassigned_optional_link_displays_as_unassigned() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();

    EntityEditor::new(&mut repo, EntityKind::Owner)
        .add(&owner_form("jane", "jane@x.com"))
        .unwrap();
    EntityEditor::new(&mut repo, EntityKind::Pet)
        .add(&pet_form("OWN-0001"))
        .unwrap();

    let mut form = BTreeMap::new();
    form.insert("datetime".to_string(), "2025-07-15T10:00".to_string());
    form.insert("reason".to_string(), "Vaccination".to_string());
    form.insert("pet".to_string(), "PET-0001".to_string());
    form.insert("owner".to_string(), "OWN-0001".to_string());
    let appointment = EntityEditor::new(&mut repo, EntityKind::Appointment)
        .add(&form)
        .unwrap();

    let editor = EntityEditor::new(&mut repo, EntityKind::Appointment);
    let vet_spec = schema_for(EntityKind::Appointment).field("vet").unwrap();
    assert_eq!(editor.display_value(vet_spec, &appointment), "Unassigned");
}

#[test]
fn records_persist_across_repository_reopen() {
    let conn = open_db_in_memory().unwrap();

    {
        let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
        EntityEditor::new(&mut repo, EntityKind::Owner)
            .add(&owner_form("jane", "jane@x.com"))
            .unwrap();
    }

    let mut repo = ClinicRepository::open(SqliteCollectionStore::new(&conn)).unwrap();
    assert!(repo.find(EntityKind::Owner, "OWN-0001").is_some());
    assert_eq!(repo.users().len(), 1);

    // Counters resumed from persisted state, not reseeded.
    let next = EntityEditor::new(&mut repo, EntityKind::Owner)
        .add(&owner_form("john", "john@x.com"))
        .unwrap();
    assert_eq!(next.id, "OWN-0002");
}

fn owner_form(username: &str, email: &str) -> BTreeMap<String, String> {
    let mut form = BTreeMap::new();
    for (key, value) in [
        ("fname", "Jane"),
        ("lname", "Doe"),
        ("email", email),
        ("address", "1 Main St"),
        ("phone_number", "555-0100"),
        ("username", username),
        ("password", "pw1"),
    ] {
        form.insert(key.to_string(), value.to_string());
    }
    form
}

fn pet_form(owner_id: &str) -> BTreeMap<String, String> {
    let mut form = BTreeMap::new();
    for (key, value) in [
        ("name", "Buddy"),
        ("species", "Dog"),
        ("breed", "Golden Retriever"),
        ("dob", "2020-05-10"),
        ("gender", "Male"),
        ("owner", owner_id),
    ] {
        form.insert(key.to_string(), value.to_string());
    }
    form
}

fn repo_is_empty<S: vetclinic_core::CollectionStore>(
    repo: &ClinicRepository<S>,
) -> bool {
    repo.users().is_empty()
        && EntityKind::ALL
            .iter()
            .all(|kind| repo.records(*kind).is_empty())
}
