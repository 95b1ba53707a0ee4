//! Group repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist group identity, naming and the per-group column schema.
//! - Act as the schema store: the only writer of `column_schema`.
//!
//! # Invariants
//! - `set_schema` replaces the whole schema in one statement and never
//!   touches contact rows.
//! - Listing is deterministic: `created_at ASC`, then insertion order.

use crate::model::group::{normalize_description, normalize_group_name, Group, GroupId};
use crate::model::schema::normalize_schema;
use crate::repo::{ensure_table_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const GROUP_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    column_schema,
    created_at
FROM contact_groups";

/// Repository interface for group lifecycle and schema storage.
pub trait GroupRepository {
    /// Creates one group with an empty schema.
    fn create_group(&self, name: &str, description: Option<&str>) -> RepoResult<Group>;
    /// Loads one group by id.
    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>>;
    /// Lists all groups in creation order.
    fn list_groups(&self) -> RepoResult<Vec<Group>>;
    /// Deletes one group row. Contact cleanup is the caller's cascade step.
    fn delete_group(&self, id: GroupId) -> RepoResult<()>;
    /// Returns the ordered column schema of one group.
    fn get_schema(&self, id: GroupId) -> RepoResult<Vec<String>>;
    /// Replaces the schema atomically and returns the normalized columns.
    fn set_schema(&self, id: GroupId, columns: &[String]) -> RepoResult<Vec<String>>;
}

/// SQLite-backed group repository.
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "contact_groups",
            &[
                "id",
                "name",
                "description",
                "column_schema",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn create_group(&self, name: &str, description: Option<&str>) -> RepoResult<Group> {
        let name = normalize_group_name(name)?;
        let description = normalize_description(description);
        let id = Uuid::new_v4();

        self.conn.execute(
            "INSERT INTO contact_groups (id, name, description, column_schema)
             VALUES (?1, ?2, ?3, '[]');",
            params![id.to_string(), name, description],
        )?;

        self.get_group(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created group {id} missing in read-back"))
        })
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_group_row(row)?));
        }
        Ok(None)
    }

    fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GROUP_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }
        Ok(groups)
    }

    fn delete_group(&self, id: GroupId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contact_groups WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::GroupNotFound(id));
        }
        Ok(())
    }

    fn get_schema(&self, id: GroupId) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT column_schema FROM contact_groups WHERE id = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => {
                let raw: String = row.get(0)?;
                decode_schema(&raw)
            }
            None => Err(RepoError::GroupNotFound(id)),
        }
    }

    fn set_schema(&self, id: GroupId, columns: &[String]) -> RepoResult<Vec<String>> {
        let normalized = normalize_schema(columns)?;
        let encoded = serde_json::to_string(&normalized)
            .map_err(|err| RepoError::InvalidData(format!("cannot encode schema: {err}")))?;

        let changed = self.conn.execute(
            "UPDATE contact_groups
             SET column_schema = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), encoded],
        )?;
        if changed == 0 {
            return Err(RepoError::GroupNotFound(id));
        }
        Ok(normalized)
    }
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<Group> {
    let id_text: String = row.get("id")?;
    let raw_schema: String = row.get("column_schema")?;

    Ok(Group {
        id: parse_uuid(&id_text, "contact_groups.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        column_schema: decode_schema(&raw_schema)?,
        created_at: row.get("created_at")?,
    })
}

fn decode_schema(raw: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid column list in contact_groups.column_schema: {err}"
        ))
    })
}
