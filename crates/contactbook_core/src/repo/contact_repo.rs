//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Store each contact's value mapping as one JSON document.
//! - Provide group-scoped list plus single-record CRUD.
//!
//! # Invariants
//! - Listing is by insertion order (`seq ASC`).
//! - `group_id` is written once at insert and never updated.
//! - `bulk_create` inserts all rows in one transaction or none.
//! - Repositories never read or mutate the group schema.

use crate::model::contact::{
    validate_new_values, validate_value_keys, Contact, ContactId, ContactValues,
};
use crate::model::group::GroupId;
use crate::repo::{ensure_table_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    group_id,
    data,
    created_at,
    updated_at
FROM contacts";

/// Repository interface for contact records.
pub trait ContactRepository {
    /// Inserts one manually entered contact; every value must be non-blank.
    fn create_contact(&self, group_id: GroupId, values: &ContactValues) -> RepoResult<Contact>;
    /// Inserts imported rows as new contacts, blank values allowed.
    fn bulk_create(&self, group_id: GroupId, rows: &[ContactValues]) -> RepoResult<usize>;
    /// Loads one contact by id.
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Lists all contacts of one group in insertion order.
    fn list_contacts(&self, group_id: GroupId) -> RepoResult<Vec<Contact>>;
    /// Replaces the full value mapping of one contact.
    fn update_values(&self, id: ContactId, values: &ContactValues) -> RepoResult<()>;
    /// Deletes one contact.
    fn delete_contact(&self, id: ContactId) -> RepoResult<()>;
    /// Deletes every contact of one group and returns how many were removed.
    fn delete_by_group(&self, group_id: GroupId) -> RepoResult<usize>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "contacts",
            &["seq", "id", "group_id", "data", "created_at", "updated_at"],
        )?;
        Ok(Self { conn })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create_contact(&self, group_id: GroupId, values: &ContactValues) -> RepoResult<Contact> {
        validate_new_values(values)?;
        let id = Uuid::new_v4();
        insert_contact(self.conn, id, group_id, values)?;

        self.get_contact(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created contact {id} missing in read-back"))
        })
    }

    fn bulk_create(&self, group_id: GroupId, rows: &[ContactValues]) -> RepoResult<usize> {
        for values in rows {
            validate_value_keys(values)?;
        }

        // Callers must not hold an open transaction on this connection.
        let tx = self.conn.unchecked_transaction()?;
        for values in rows {
            insert_contact(&tx, Uuid::new_v4(), group_id, values)?;
        }
        tx.commit()?;

        Ok(rows.len())
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }
        Ok(None)
    }

    fn list_contacts(&self, group_id: GroupId) -> RepoResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL} WHERE group_id = ?1 ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([group_id.to_string()])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }

    fn update_values(&self, id: ContactId, values: &ContactValues) -> RepoResult<()> {
        validate_value_keys(values)?;
        let changed = self.conn.execute(
            "UPDATE contacts
             SET data = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), encode_values(values)?],
        )?;
        if changed == 0 {
            return Err(RepoError::ContactNotFound(id));
        }
        Ok(())
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ContactNotFound(id));
        }
        Ok(())
    }

    fn delete_by_group(&self, group_id: GroupId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM contacts WHERE group_id = ?1;",
            [group_id.to_string()],
        )?;
        Ok(removed)
    }
}

fn insert_contact(
    conn: &Connection,
    id: ContactId,
    group_id: GroupId,
    values: &ContactValues,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO contacts (id, group_id, data) VALUES (?1, ?2, ?3);",
        params![id.to_string(), group_id.to_string(), encode_values(values)?],
    )?;
    Ok(())
}

fn encode_values(values: &ContactValues) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode contact values: {err}")))
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id_text: String = row.get("id")?;
    let group_text: String = row.get("group_id")?;
    let raw_data: String = row.get("data")?;
    let values: ContactValues = serde_json::from_str(&raw_data).map_err(|err| {
        RepoError::InvalidData(format!("invalid value mapping in contacts.data: {err}"))
    })?;

    Ok(Contact {
        id: parse_uuid(&id_text, "contacts.id")?,
        group_id: parse_uuid(&group_text, "contacts.group_id")?,
        values,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
