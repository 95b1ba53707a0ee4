//! Case-insensitive substring matching over contact values.

use crate::model::contact::Contact;

/// Normalized search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactQuery {
    needle: String,
}

impl ContactQuery {
    /// Lowercases the raw user query; surrounding spaces stay significant.
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.to_lowercase(),
        }
    }

    /// Whitespace-only queries behave like a plain list.
    pub fn is_blank(&self) -> bool {
        self.needle.trim().is_empty()
    }

    /// Returns whether any stored value of `contact` contains the needle.
    ///
    /// Stale keys outside the current schema are searched too.
    pub fn matches(&self, contact: &Contact) -> bool {
        self.is_blank()
            || contact
                .values
                .values()
                .any(|value| value.to_lowercase().contains(&self.needle))
    }
}

/// Keeps matching contacts, preserving input order.
pub fn filter_contacts(contacts: Vec<Contact>, query: &ContactQuery) -> Vec<Contact> {
    if query.is_blank() {
        return contacts;
    }
    contacts
        .into_iter()
        .filter(|contact| query.matches(contact))
        .collect()
}
