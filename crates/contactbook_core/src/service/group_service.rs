//! Group use-case service.
//!
//! # Responsibility
//! - Group lifecycle: create, list, get, delete with contact cascade.
//! - Explicit schema read and redefinition (replace, not merge).
//!
//! # Invariants
//! - Deleting a group removes every contact it owns.
//! - Schema redefinition never rewrites stored contact values.

use crate::error::ErrorKind;
use crate::model::group::{Group, GroupId};
use crate::model::validation::ValidationError;
use crate::repo::contact_repo::ContactRepository;
use crate::repo::group_repo::GroupRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for group use-cases.
#[derive(Debug)]
pub enum GroupServiceError {
    Validation(ValidationError),
    GroupNotFound(GroupId),
    Repo(RepoError),
}

impl GroupServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::GroupNotFound(_) => ErrorKind::NotFound,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for GroupServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GroupServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::GroupNotFound(_) => None,
        }
    }
}

impl From<RepoError> for GroupServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::GroupNotFound(id) => Self::GroupNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Outcome of a cascading group delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDeletion {
    pub group_id: GroupId,
    pub contacts_removed: usize,
}

/// Group service facade over group and contact repositories.
pub struct GroupService<G: GroupRepository, C: ContactRepository> {
    groups: G,
    contacts: C,
}

impl<G: GroupRepository, C: ContactRepository> GroupService<G, C> {
    pub fn new(groups: G, contacts: C) -> Self {
        Self { groups, contacts }
    }

    /// Creates a group with an empty schema.
    pub fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Group, GroupServiceError> {
        let group = self.groups.create_group(name, description)?;
        info!(
            "event=group_create module=group status=ok group_id={}",
            group.id
        );
        Ok(group)
    }

    /// Lists all groups in creation order.
    pub fn list_groups(&self) -> Result<Vec<Group>, GroupServiceError> {
        Ok(self.groups.list_groups()?)
    }

    /// Gets one group, failing with `GroupNotFound` when absent.
    pub fn get_group(&self, id: GroupId) -> Result<Group, GroupServiceError> {
        self.groups
            .get_group(id)?
            .ok_or(GroupServiceError::GroupNotFound(id))
    }

    /// Deletes a group and cascades to all of its contacts.
    pub fn delete_group(&self, id: GroupId) -> Result<GroupDeletion, GroupServiceError> {
        self.get_group(id)?;
        let contacts_removed = self.contacts.delete_by_group(id)?;
        self.groups.delete_group(id)?;
        info!(
            "event=group_delete module=group status=ok group_id={} contacts_removed={}",
            id, contacts_removed
        );
        Ok(GroupDeletion {
            group_id: id,
            contacts_removed,
        })
    }

    /// Returns the ordered column schema.
    pub fn get_schema(&self, id: GroupId) -> Result<Vec<String>, GroupServiceError> {
        Ok(self.groups.get_schema(id)?)
    }

    /// Replaces the schema with `columns` after normalization.
    ///
    /// Columns dropped here stay in stored contact values but are no longer
    /// surfaced or exported.
    pub fn redefine_schema(
        &self,
        id: GroupId,
        columns: &[String],
    ) -> Result<Vec<String>, GroupServiceError> {
        let schema = self.groups.set_schema(id, columns)?;
        info!(
            "event=schema_redefine module=group status=ok group_id={} columns={}",
            id,
            schema.len()
        );
        Ok(schema)
    }
}
