//! Command-line front end for the contact book.
//!
//! # Responsibility
//! - Map subcommands onto core services over one SQLite file.
//! - Render service errors as `[kind] message` on stderr.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use contactbook_core::db::open_db;
use contactbook_core::{
    default_log_level, init_logging, Contact, ContactService, ContactValues, ErrorKind,
    ExportOutcome, ExportService, GroupService, ImportService, SqliteContactRepository,
    SqliteGroupRepository,
};
use rusqlite::Connection;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "contactbook", about = "Schema-flexible contact groups")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "CONTACTBOOK_DB", default_value = "contactbook.sqlite3")]
    db: PathBuf,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "CONTACTBOOK_LOG_LEVEL", default_value = default_log_level())]
    log_level: String,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, env = "CONTACTBOOK_LOG_DIR", value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Manage contact groups and their column schema
    #[command(subcommand)]
    Group(GroupCmd),
    /// Manage contacts inside one group
    #[command(subcommand)]
    Contact(ContactCmd),
    /// Import a CSV/TSV/XLSX/ODS file into a group
    Import {
        group: Uuid,
        file: PathBuf,
    },
    /// Export a group as `<name>_contacts.csv`
    Export {
        group: Uuid,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum GroupCmd {
    /// Create a group with an empty schema
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List all groups
    List,
    /// Show one group and its schema
    Show { group: Uuid },
    /// Delete a group and all its contacts
    Delete { group: Uuid },
    /// Replace the column schema
    SetSchema {
        group: Uuid,
        #[arg(required = true)]
        columns: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ContactCmd {
    /// Add a contact; every field must be filled
    Add {
        group: Uuid,
        /// Field as `Name=Value`, repeatable
        #[arg(long = "field", value_parser = parse_field, required = true)]
        fields: Vec<(String, String)>,
    },
    /// List contacts in insertion order
    List { group: Uuid },
    /// Replace all fields of one contact
    Edit {
        contact: Uuid,
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Delete one contact
    Delete { contact: Uuid },
    /// Case-insensitive search across every field
    Search { group: Uuid, query: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(dir) = cli.log_dir.as_deref() {
        let dir = absolute(dir)?;
        init_logging(&cli.log_level, &dir.to_string_lossy()).map_err(|err| anyhow!(err))?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;

    match cli.cmd {
        Cmd::Group(cmd) => run_group(&conn, cmd),
        Cmd::Contact(cmd) => run_contact(&conn, cmd),
        Cmd::Import { group, file } => run_import(&conn, group, &file),
        Cmd::Export { group, out } => run_export(&conn, group, &out),
    }
}

fn run_group(conn: &Connection, cmd: GroupCmd) -> Result<()> {
    let service = GroupService::new(
        SqliteGroupRepository::try_new(conn)?,
        SqliteContactRepository::try_new(conn)?,
    );
    match cmd {
        GroupCmd::Create { name, description } => {
            let group = service
                .create_group(&name, description.as_deref())
                .map_err(|err| tagged(err.kind(), err))?;
            println!("{}", group.id);
        }
        GroupCmd::List => {
            let groups = service.list_groups().map_err(|err| tagged(err.kind(), err))?;
            for group in groups {
                println!(
                    "{}\t{}\t{}",
                    group.id,
                    group.name,
                    group.column_schema.join(",")
                );
            }
        }
        GroupCmd::Show { group } => {
            let group = service
                .get_group(group)
                .map_err(|err| tagged(err.kind(), err))?;
            println!("id: {}", group.id);
            println!("name: {}", group.name);
            if let Some(description) = &group.description {
                println!("description: {description}");
            }
            println!("columns: {}", group.column_schema.join(", "));
        }
        GroupCmd::Delete { group } => {
            let deletion = service
                .delete_group(group)
                .map_err(|err| tagged(err.kind(), err))?;
            println!(
                "deleted group {} and {} contacts",
                deletion.group_id, deletion.contacts_removed
            );
        }
        GroupCmd::SetSchema { group, columns } => {
            let stored = service
                .redefine_schema(group, &columns)
                .map_err(|err| tagged(err.kind(), err))?;
            println!("{}", stored.join(","));
        }
    }
    Ok(())
}

fn run_contact(conn: &Connection, cmd: ContactCmd) -> Result<()> {
    let groups = GroupService::new(
        SqliteGroupRepository::try_new(conn)?,
        SqliteContactRepository::try_new(conn)?,
    );
    let service = ContactService::new(
        SqliteGroupRepository::try_new(conn)?,
        SqliteContactRepository::try_new(conn)?,
    );
    match cmd {
        ContactCmd::Add { group, fields } => {
            let contact = service
                .create(group, fields.into_iter().collect())
                .map_err(|err| tagged(err.kind(), err))?;
            println!("{}", contact.id);
        }
        ContactCmd::List { group } => {
            let schema = groups
                .get_schema(group)
                .map_err(|err| tagged(err.kind(), err))?;
            let contacts = service.list(group).map_err(|err| tagged(err.kind(), err))?;
            print_table(&schema, &contacts);
        }
        ContactCmd::Edit { contact, fields } => {
            let values: ContactValues = fields.into_iter().collect();
            let contact = service
                .update(contact, values)
                .map_err(|err| tagged(err.kind(), err))?;
            println!("updated {}", contact.id);
        }
        ContactCmd::Delete { contact } => {
            service
                .delete(contact)
                .map_err(|err| tagged(err.kind(), err))?;
            println!("deleted {contact}");
        }
        ContactCmd::Search { group, query } => {
            let schema = groups
                .get_schema(group)
                .map_err(|err| tagged(err.kind(), err))?;
            let hits = service
                .search(group, &query)
                .map_err(|err| tagged(err.kind(), err))?;
            print_table(&schema, &hits);
        }
    }
    Ok(())
}

fn run_import(conn: &Connection, group: Uuid, file: &Path) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("failed to read `{}`", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let service = ImportService::new(
        SqliteGroupRepository::try_new(conn)?,
        SqliteContactRepository::try_new(conn)?,
    );
    let report = service
        .import_file(group, &file_name, &bytes)
        .map_err(|err| tagged(err.kind(), err))?;

    if let Some(warning) = &report.warning {
        eprintln!("warning: {warning}");
    }
    println!("{}", report.message);
    if !report.added_columns.is_empty() {
        println!("added columns: {}", report.added_columns.join(", "));
    }
    Ok(())
}

fn run_export(conn: &Connection, group: Uuid, out: &Path) -> Result<()> {
    let service = ExportService::new(
        SqliteGroupRepository::try_new(conn)?,
        SqliteContactRepository::try_new(conn)?,
    );
    let table = match service
        .export(group)
        .map_err(|err| tagged(err.kind(), err))?
    {
        ExportOutcome::Table(table) => table,
        ExportOutcome::Empty { group_id } => {
            eprintln!("[{}] no contacts to export in group {group_id}", ErrorKind::Empty);
            return Ok(());
        }
    };

    fs::create_dir_all(out)
        .with_context(|| format!("failed to create `{}`", out.display()))?;
    let path = out.join(table.file_name("csv"));
    let file = fs::File::create(&path)
        .with_context(|| format!("failed to create `{}`", path.display()))?;
    table
        .write_delimited(file, b',')
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn print_table(schema: &[String], contacts: &[Contact]) {
    println!("id\t{}\thidden", schema.join("\t"));
    for contact in contacts {
        let values = contact.visible_values(schema);
        let cells: Vec<&str> = values.values().map(String::as_str).collect();
        let hidden = contact.stale_columns(schema).join(",");
        println!("{}\t{}\t{hidden}", contact.id, cells.join("\t"));
    }
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `Name=Value`, got `{raw}`"))?;
    if name.trim().is_empty() {
        return Err(format!("field name is blank in `{raw}`"));
    }
    Ok((name.trim().to_string(), value.to_string()))
}

fn absolute(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(dir))
}

fn tagged(kind: ErrorKind, err: impl Display) -> anyhow::Error {
    anyhow!("[{kind}] {err}")
}
