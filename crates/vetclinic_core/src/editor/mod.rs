//! Generic entity editor: the schema-driven add/update/remove/search engine.
//!
//! # Responsibility
//! - Drive the Browsing -> Selected -> Browsing editing cycle for one
//!   entity kind, entirely through its schema.
//! - Mirror credential rows for credentialed kinds on every write path.
//! - Render linked-ID and password fields for table display.
//!
//! # Invariants
//! - Validation and uniqueness checks run before any ID is minted or any
//!   collection is touched; a failed operation persists nothing.
//! - Record IDs never change after creation.
//! - Reference existence is checked at creation time only; deletes leave
//!   dangling links in place and the display layer marks them.

use crate::model::entity::{EntityKind, EntityRecord};
use crate::model::user::UserAccount;
use crate::repo::clinic_repo::{ClinicRepository, RepoError};
use crate::schema::{schema_for, EntitySchema, FieldKind, FieldSpec};
use crate::store::CollectionStore;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub type EditorResult<T> = Result<T, EditorError>;

/// Failure signals of the editor operations. All are recoverable and leave
/// state unchanged.
#[derive(Debug)]
pub enum EditorError {
    /// Required, non-readonly fields were left blank; labels listed in
    /// schema order.
    Validation { missing: Vec<String> },
    /// Username or email collides with an existing row (case-insensitive).
    Duplicate { field: &'static str },
    /// An `Email` field does not look like an email address.
    InvalidEmail { field: &'static str, value: String },
    /// A link field points at an entity that does not exist.
    UnknownReference { field: &'static str, id: String },
    /// Update or remove was attempted with no active selection.
    NoSelection,
    /// The selected record is gone (already deleted).
    NotFound { id: String },
    Repo(RepoError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { missing } => {
                write!(f, "required fields are blank: {}", missing.join(", "))
            }
            Self::Duplicate { field } => write!(f, "{field} already exists"),
            Self::InvalidEmail { field, value } => {
                write!(f, "`{value}` is not a valid email for {field}")
            }
            Self::UnknownReference { field, id } => {
                write!(f, "{field} `{id}` does not match any existing record")
            }
            Self::NoSelection => write!(f, "no record selected"),
            Self::NotFound { id } => write!(f, "record `{id}` not found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EditorError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::NotFound { id },
            other => Self::Repo(other),
        }
    }
}

/// Display label for a link target, used by table joins.
///
/// People render as `First Last (ID: ...)`, pets as `Name (ID: ...)`;
/// a missing target becomes the dangling-reference marker
/// `Unknown <Kind> (ID: ...)`.
pub fn reference_label<S: CollectionStore>(
    repo: &ClinicRepository<S>,
    target: EntityKind,
    id: &str,
) -> String {
    match repo.find(target, id) {
        Some(linked) => {
            let name = match target {
                EntityKind::Pet => linked.field("name").to_string(),
                EntityKind::Owner | EntityKind::Veterinarian | EntityKind::Receptionist => {
                    format!("{} {}", linked.field("fname"), linked.field("lname"))
                }
                EntityKind::Appointment | EntityKind::MedicalRecord => linked.id.clone(),
            };
            format!("{name} (ID: {id})")
        }
        None => format!("Unknown {} (ID: {id})", target.label()),
    }
}

/// Schema-driven editor for one entity kind.
///
/// Holds the selection state machine: `Browsing` (no selection, full table)
/// and `Selected` (one record loaded into the form). Every successful write
/// returns to `Browsing`.
pub struct EntityEditor<'repo, S: CollectionStore> {
    repo: &'repo mut ClinicRepository<S>,
    kind: EntityKind,
    selected: Option<String>,
    /// Lowercased active search query, narrowing the visible table.
    filter: Option<String>,
}

impl<'repo, S: CollectionStore> EntityEditor<'repo, S> {
    pub fn new(repo: &'repo mut ClinicRepository<S>, kind: EntityKind) -> Self {
        Self {
            repo,
            kind,
            selected: None,
            filter: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn schema(&self) -> &'static EntitySchema {
        schema_for(self.kind)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Loads a record into the form. An unknown ID is a no-op: the state
    /// stays as it was.
    pub fn select(&mut self, id: &str) {
        if self.repo.find(self.kind, id).is_some() {
            self.selected = Some(id.to_string());
        }
    }

    /// Drops the selection, returning to `Browsing`.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Form values of the selected record, password fields blanked.
    ///
    /// Returns `None` in `Browsing` state.
    pub fn form_values(&self) -> Option<BTreeMap<&'static str, String>> {
        let id = self.selected.as_deref()?;
        let record = self.repo.find(self.kind, id)?;
        let mut values = BTreeMap::new();
        for spec in self.schema().fields {
            let value = if spec.kind == FieldKind::Password {
                String::new()
            } else if spec.key == "id" {
                record.id.clone()
            } else {
                record.field(spec.key).to_string()
            };
            values.insert(spec.key, value);
        }
        Some(values)
    }

    /// Rows visible in the table: the full collection, or the zero-or-one
    /// rows matching the active search.
    pub fn visible_rows(&self) -> Vec<&EntityRecord> {
        let rows = self.repo.records(self.kind);
        match &self.filter {
            Some(query) => rows
                .iter()
                .filter(|row| row.id.to_lowercase() == *query)
                .collect(),
            None => rows.iter().collect(),
        }
    }

    /// Case-insensitive exact-ID search.
    ///
    /// A hit narrows the table to that row and selects it; a miss empties
    /// the table and the selection. A blank query restores the full table.
    pub fn search(&mut self, query: &str) -> Option<&EntityRecord> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.filter = None;
            self.selected = None;
            return None;
        }

        let lowered = trimmed.to_lowercase();
        let matched = self
            .repo
            .records(self.kind)
            .iter()
            .find(|row| row.id.to_lowercase() == lowered)
            .map(|row| row.id.clone());

        self.filter = Some(lowered);
        match matched {
            Some(id) => {
                self.selected = Some(id.clone());
                self.repo.find(self.kind, &id)
            }
            None => {
                self.selected = None;
                None
            }
        }
    }

    /// Validates the form, mints an ID, appends the record and mirrors the
    /// credential row where applicable. Returns the stored record.
    pub fn add(&mut self, form: &BTreeMap<String, String>) -> EditorResult<EntityRecord> {
        let schema = self.schema();
        let values = collect_form(schema, form);

        self.check_required(schema, &values, false)?;
        self.check_email_shapes(schema, &values)?;
        self.check_references(schema, &values)?;
        let role = self.kind.login_role();
        if role.is_some() {
            self.check_username_unique(values_field(&values, "username"), None)?;
            if self.kind == EntityKind::Owner {
                self.check_email_unique(values_field(&values, "email"), None)?;
            }
        }

        // All checks passed; only now does the operation touch state.
        let id = self.repo.next_id(self.kind)?;
        let record = EntityRecord {
            id: id.clone(),
            fields: values,
        };
        self.repo.insert(self.kind, record.clone())?;
        if let Some(role) = role {
            self.repo.insert_user(UserAccount {
                username: record.field("username").to_string(),
                password: record.field("password").to_string(),
                role,
                user_id: id.clone(),
            })?;
        }
        info!(
            "event=entity_add module=editor status=ok kind={} id={id} mirrored_user={}",
            self.kind.label(),
            role.is_some()
        );
        self.selected = None;
        self.filter = None;
        Ok(record)
    }

    /// Overwrites every field except the ID on the selected record.
    ///
    /// A blank password means "unchanged"; the mirrored credential row is
    /// patched alongside for credentialed kinds.
    pub fn update(&mut self, form: &BTreeMap<String, String>) -> EditorResult<EntityRecord> {
        let id = self.selected.clone().ok_or(EditorError::NoSelection)?;
        let existing = self
            .repo
            .find(self.kind, &id)
            .cloned()
            .ok_or_else(|| EditorError::NotFound { id: id.clone() })?;

        let schema = self.schema();
        let values = collect_form(schema, form);

        self.check_required(schema, &values, true)?;
        self.check_email_shapes(schema, &values)?;
        if self.kind.is_credentialed() {
            self.check_username_unique(values_field(&values, "username"), Some(&id))?;
            if self.kind == EntityKind::Owner {
                self.check_email_unique(values_field(&values, "email"), Some(&id))?;
            }
        }

        let mut record = existing;
        for (key, value) in &values {
            // Blank password keeps the stored one.
            if key == "password" && value.is_empty() {
                continue;
            }
            record.fields.insert(key.clone(), value.clone());
        }
        self.repo.replace(self.kind, record.clone())?;

        if self.kind.is_credentialed() {
            let password = Some(values_field(&values, "password")).filter(|v| !v.is_empty());
            self.repo
                .update_credentials(&id, values_field(&values, "username"), password)?;
        }

        info!(
            "event=entity_update module=editor status=ok kind={} id={id}",
            self.kind.label()
        );
        self.selected = None;
        self.filter = None;
        Ok(record)
    }

    /// Deletes the selected record and, for credentialed kinds, its mirrored
    /// credential row. Rows referencing the deleted ID are not touched.
    pub fn remove(&mut self) -> EditorResult<String> {
        let id = self.selected.clone().ok_or(EditorError::NoSelection)?;
        self.repo.delete(self.kind, &id)?;
        if self.kind.is_credentialed() {
            self.repo.remove_user(&id)?;
        }
        info!(
            "event=entity_remove module=editor status=ok kind={} id={id}",
            self.kind.label()
        );
        self.selected = None;
        self.filter = None;
        Ok(id)
    }

    /// Table-cell rendering for one field of one record: passwords masked,
    /// link fields joined to their display label, empty optional links
    /// shown as `Unassigned`.
    pub fn display_value(&self, spec: &FieldSpec, record: &EntityRecord) -> String {
        if spec.kind == FieldKind::Password {
            return "********".to_string();
        }
        let raw = if spec.key == "id" {
            record.id.as_str()
        } else {
            record.field(spec.key)
        };
        if let Some(target) = spec.references {
            if raw.is_empty() {
                return if spec.required {
                    String::new()
                } else {
                    "Unassigned".to_string()
                };
            }
            return reference_label(self.repo, target, raw);
        }
        raw.to_string()
    }

    fn check_required(
        &self,
        schema: &EntitySchema,
        values: &BTreeMap<String, String>,
        updating: bool,
    ) -> EditorResult<()> {
        let mut missing = Vec::new();
        for spec in schema.fields {
            if spec.read_only || !spec.required {
                continue;
            }
            // On update a blank password means "keep the stored one".
            if updating && spec.kind == FieldKind::Password {
                continue;
            }
            if values_field(values, spec.key).is_empty() {
                missing.push(spec.label.to_string());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EditorError::Validation { missing })
        }
    }

    fn check_email_shapes(
        &self,
        schema: &EntitySchema,
        values: &BTreeMap<String, String>,
    ) -> EditorResult<()> {
        for spec in schema.fields {
            if spec.kind != FieldKind::Email {
                continue;
            }
            let value = values_field(values, spec.key);
            if !value.is_empty() && !EMAIL_RE.is_match(value) {
                return Err(EditorError::InvalidEmail {
                    field: spec.key,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Creation-time link checks. Not re-run on update, and never run
    /// retroactively: deleting a referenced row leaves links dangling.
    fn check_references(
        &self,
        schema: &EntitySchema,
        values: &BTreeMap<String, String>,
    ) -> EditorResult<()> {
        for spec in schema.fields {
            let Some(target) = spec.references else {
                continue;
            };
            let value = values_field(values, spec.key);
            if value.is_empty() {
                continue;
            }
            if self.repo.find(target, value).is_none() {
                return Err(EditorError::UnknownReference {
                    field: spec.key,
                    id: value.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_username_unique(&self, username: &str, exclude_id: Option<&str>) -> EditorResult<()> {
        let lowered = username.to_lowercase();
        let taken = self.repo.users().iter().any(|user| {
            user.username.to_lowercase() == lowered && Some(user.user_id.as_str()) != exclude_id
        });
        if taken {
            return Err(EditorError::Duplicate { field: "username" });
        }
        Ok(())
    }

    fn check_email_unique(&self, email: &str, exclude_id: Option<&str>) -> EditorResult<()> {
        let lowered = email.to_lowercase();
        let taken = self.repo.records(EntityKind::Owner).iter().any(|owner| {
            owner.field("email").to_lowercase() == lowered && Some(owner.id.as_str()) != exclude_id
        });
        if taken {
            return Err(EditorError::Duplicate { field: "email" });
        }
        Ok(())
    }
}

/// Collects trimmed form values for every editable schema key. Keys outside
/// the schema are dropped; absent keys become empty strings.
fn collect_form(schema: &EntitySchema, form: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for spec in schema.fields {
        if spec.read_only {
            continue;
        }
        let value = form
            .get(spec.key)
            .map(|value| value.trim().to_string())
            .unwrap_or_default();
        values.insert(spec.key.to_string(), value);
    }
    values
}

fn values_field<'a>(values: &'a BTreeMap<String, String>, key: &str) -> &'a str {
    values.get(key).map(String::as_str).unwrap_or("")
}
