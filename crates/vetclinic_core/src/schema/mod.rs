//! Static schema registry for the generic entity editor.
//!
//! # Responsibility
//! - Describe, per entity kind, the ordered attributes driving form
//!   generation, table columns, validation and linked-ID display.
//!
//! # Invariants
//! - The registry is configuration, read-only at run time.
//! - `options` is populated only for `SingleSelect` fields.
//! - `references` tags link fields instead of per-kind branching in the
//!   engine; existence is checked at creation time only.

use crate::model::entity::EntityKind;

/// Input kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    ShortText,
    LongText,
    Email,
    Phone,
    Password,
    Date,
    DateTime,
    SingleSelect,
}

/// One attribute descriptor of an entity schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub read_only: bool,
    /// Allowed values, `SingleSelect` only.
    pub options: &'static [&'static str],
    /// Entity kind this field's value must point at, if it is a link.
    pub references: Option<EntityKind>,
}

/// Ordered attribute descriptors for one entity kind.
#[derive(Debug)]
pub struct EntitySchema {
    pub fields: &'static [FieldSpec],
}

impl EntitySchema {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.key == key)
    }
}

const fn id_field() -> FieldSpec {
    FieldSpec {
        key: "id",
        label: "ID",
        kind: FieldKind::ShortText,
        required: false,
        read_only: true,
        options: &[],
        references: None,
    }
}

const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required: true,
        read_only: false,
        options: &[],
        references: None,
    }
}

const fn select(
    key: &'static str,
    label: &'static str,
    options: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind: FieldKind::SingleSelect,
        required: true,
        read_only: false,
        options,
        references: None,
    }
}

const fn link(
    key: &'static str,
    label: &'static str,
    target: EntityKind,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind: FieldKind::ShortText,
        required,
        read_only: false,
        options: &[],
        references: Some(target),
    }
}

static OWNER: EntitySchema = EntitySchema {
    fields: &[
        id_field(),
        required("fname", "First Name", FieldKind::ShortText),
        required("lname", "Last Name", FieldKind::ShortText),
        required("email", "Email", FieldKind::Email),
        required("address", "Address", FieldKind::ShortText),
        required("phone_number", "Phone Number", FieldKind::Phone),
        required("username", "Username", FieldKind::ShortText),
        required("password", "Password", FieldKind::Password),
    ],
};

static VETERINARIAN: EntitySchema = EntitySchema {
    fields: &[
        id_field(),
        required("fname", "First Name", FieldKind::ShortText),
        required("lname", "Last Name", FieldKind::ShortText),
        required("specialization", "Specialization", FieldKind::ShortText),
        required("phone_number", "Phone Number", FieldKind::Phone),
        required("username", "Username", FieldKind::ShortText),
        required("password", "Password", FieldKind::Password),
        required("dob", "Date of Birth", FieldKind::Date),
        required("address", "Address", FieldKind::ShortText),
    ],
};

static PET: EntitySchema = EntitySchema {
    fields: &[
        id_field(),
        required("name", "Name", FieldKind::ShortText),
        required("species", "Species", FieldKind::ShortText),
        required("breed", "Breed", FieldKind::ShortText),
        required("dob", "Date of Birth", FieldKind::Date),
        select("gender", "Gender", &["Male", "Female"]),
        link("owner", "Owner ID", EntityKind::Owner, true),
    ],
};

static APPOINTMENT: EntitySchema = EntitySchema {
    fields: &[
        id_field(),
        required("datetime", "Date & Time", FieldKind::DateTime),
        required("reason", "Reason", FieldKind::LongText),
        // Empty vet means the appointment is still unassigned.
        link("vet", "Vet ID", EntityKind::Veterinarian, false),
        link("pet", "Pet ID", EntityKind::Pet, true),
        link("owner", "Owner ID", EntityKind::Owner, true),
    ],
};

static RECEPTIONIST: EntitySchema = EntitySchema {
    fields: &[
        id_field(),
        required("username", "Username", FieldKind::ShortText),
        required("password", "Password", FieldKind::Password),
        required("fname", "First Name", FieldKind::ShortText),
        required("lname", "Last Name", FieldKind::ShortText),
        required("phone_number", "Phone Number", FieldKind::Phone),
        required("address", "Address", FieldKind::ShortText),
        required("dob", "Date of Birth", FieldKind::Date),
    ],
};

static MEDICAL_RECORD: EntitySchema = EntitySchema {
    fields: &[
        id_field(),
        link("pet_id", "Pet ID", EntityKind::Pet, true),
        required("visit_date", "Visit Date", FieldKind::Date),
        required("diagnosis", "Diagnosis", FieldKind::ShortText),
        required("treatment", "Treatment", FieldKind::LongText),
        required("medication", "Medication", FieldKind::ShortText),
    ],
};

/// Returns the schema for one entity kind.
pub fn schema_for(kind: EntityKind) -> &'static EntitySchema {
    match kind {
        EntityKind::Owner => &OWNER,
        EntityKind::Pet => &PET,
        EntityKind::Veterinarian => &VETERINARIAN,
        EntityKind::Receptionist => &RECEPTIONIST,
        EntityKind::Appointment => &APPOINTMENT,
        EntityKind::MedicalRecord => &MEDICAL_RECORD,
    }
}

#[cfg(test)]
mod tests {
    use super::{schema_for, FieldKind};
    use crate::model::entity::EntityKind;
    use std::collections::HashSet;

    #[test]
    fn every_schema_leads_with_a_readonly_id() {
        for kind in EntityKind::ALL {
            let first = &schema_for(kind).fields[0];
            assert_eq!(first.key, "id", "{kind:?}");
            assert!(first.read_only, "{kind:?}");
        }
    }

    #[test]
    fn field_keys_are_unique_within_a_schema() {
        for kind in EntityKind::ALL {
            let keys: HashSet<_> = schema_for(kind)
                .fields
                .iter()
                .map(|spec| spec.key)
                .collect();
            assert_eq!(keys.len(), schema_for(kind).fields.len(), "{kind:?}");
        }
    }

    #[test]
    fn options_only_on_single_selects() {
        for kind in EntityKind::ALL {
            for spec in schema_for(kind).fields {
                if spec.kind == FieldKind::SingleSelect {
                    assert!(!spec.options.is_empty(), "{kind:?}.{}", spec.key);
                } else {
                    assert!(spec.options.is_empty(), "{kind:?}.{}", spec.key);
                }
            }
        }
    }

    #[test]
    fn appointment_vet_link_is_optional() {
        let spec = schema_for(EntityKind::Appointment).field("vet").unwrap();
        assert!(!spec.required);
        assert_eq!(spec.references, Some(EntityKind::Veterinarian));
    }
}
