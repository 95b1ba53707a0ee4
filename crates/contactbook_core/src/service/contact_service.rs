//! Contact use-case service.
//!
//! # Responsibility
//! - Group-scoped contact create/list/search and per-record update/delete.
//! - Enforce the "fill all fields" rule for manual creation only.
//!
//! # Invariants
//! - Creating into an unknown group fails with `GroupNotFound`.
//! - `list` and `search` of an unknown or deleted group return no contacts.
//! - `update` is a full replace of the value mapping.

use crate::error::ErrorKind;
use crate::model::contact::{Contact, ContactId, ContactValues};
use crate::model::group::{Group, GroupId};
use crate::model::validation::ValidationError;
use crate::repo::contact_repo::ContactRepository;
use crate::repo::group_repo::GroupRepository;
use crate::repo::RepoError;
use crate::search::matcher::{filter_contacts, ContactQuery};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for contact use-cases.
#[derive(Debug)]
pub enum ContactServiceError {
    Validation(ValidationError),
    GroupNotFound(GroupId),
    ContactNotFound(ContactId),
    Repo(RepoError),
}

impl ContactServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::GroupNotFound(_) | Self::ContactNotFound(_) => ErrorKind::NotFound,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::ContactNotFound(id) => write!(f, "contact not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContactServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::GroupNotFound(id) => Self::GroupNotFound(id),
            RepoError::ContactNotFound(id) => Self::ContactNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Contact service facade; reads groups only to check ownership.
pub struct ContactService<G: GroupRepository, C: ContactRepository> {
    groups: G,
    contacts: C,
}

impl<G: GroupRepository, C: ContactRepository> ContactService<G, C> {
    pub fn new(groups: G, contacts: C) -> Self {
        Self { groups, contacts }
    }

    /// Lists a group's contacts in insertion order.
    pub fn list(&self, group_id: GroupId) -> Result<Vec<Contact>, ContactServiceError> {
        Ok(self.contacts.list_contacts(group_id)?)
    }

    /// Gets one contact by id.
    pub fn get(&self, id: ContactId) -> Result<Contact, ContactServiceError> {
        self.contacts
            .get_contact(id)?
            .ok_or(ContactServiceError::ContactNotFound(id))
    }

    /// Creates one contact; every value must be non-blank.
    ///
    /// Keys are not required to match the group schema exactly.
    pub fn create(
        &self,
        group_id: GroupId,
        values: ContactValues,
    ) -> Result<Contact, ContactServiceError> {
        let group = self.require_group(group_id)?;
        let contact = self.contacts.create_contact(group_id, &values)?;
        let unlisted = values.keys().filter(|key| !group.has_column(key)).count();
        info!(
            "event=contact_create module=contact status=ok group_id={} contact_id={} fields={} unlisted_fields={}",
            group_id,
            contact.id,
            contact.values.len(),
            unlisted
        );
        Ok(contact)
    }

    /// Appends imported rows as new contacts; blank values are allowed.
    pub fn bulk_create(
        &self,
        group_id: GroupId,
        rows: &[ContactValues],
    ) -> Result<usize, ContactServiceError> {
        self.require_group(group_id)?;
        let inserted = self.contacts.bulk_create(group_id, rows)?;
        info!(
            "event=contact_bulk_create module=contact status=ok group_id={} rows={}",
            group_id, inserted
        );
        Ok(inserted)
    }

    /// Replaces the full value mapping and returns the stored record.
    pub fn update(
        &self,
        id: ContactId,
        values: ContactValues,
    ) -> Result<Contact, ContactServiceError> {
        self.contacts.update_values(id, &values)?;
        info!("event=contact_update module=contact status=ok contact_id={id}");
        self.get(id)
    }

    /// Deletes one contact; a second delete of the same id is `ContactNotFound`.
    pub fn delete(&self, id: ContactId) -> Result<(), ContactServiceError> {
        self.contacts.delete_contact(id)?;
        info!("event=contact_delete module=contact status=ok contact_id={id}");
        Ok(())
    }

    /// Removes every contact of a group; cascade helper for group deletion.
    pub fn delete_by_group(&self, group_id: GroupId) -> Result<usize, ContactServiceError> {
        let removed = self.contacts.delete_by_group(group_id)?;
        info!(
            "event=contact_delete_by_group module=contact status=ok group_id={} removed={}",
            group_id, removed
        );
        Ok(removed)
    }

    /// Returns contacts where any value contains `query`, case-insensitively.
    ///
    /// A blank query is equivalent to [`Self::list`].
    pub fn search(
        &self,
        group_id: GroupId,
        query: &str,
    ) -> Result<Vec<Contact>, ContactServiceError> {
        let query = ContactQuery::new(query);
        let contacts = self.contacts.list_contacts(group_id)?;
        let scanned = contacts.len();
        let hits = filter_contacts(contacts, &query);
        debug!(
            "event=contact_search module=search status=ok group_id={} scanned={} hits={}",
            group_id,
            scanned,
            hits.len()
        );
        Ok(hits)
    }

    fn require_group(&self, group_id: GroupId) -> Result<Group, ContactServiceError> {
        self.groups
            .get_group(group_id)?
            .ok_or(ContactServiceError::GroupNotFound(group_id))
    }
}
