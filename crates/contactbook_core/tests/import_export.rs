use contactbook_core::db::open_db_in_memory;
use contactbook_core::{
    Contact, ContactId, ContactRepository, ContactValues, ErrorKind, ExportOutcome,
    ExportService, GroupId, GroupRepository, ImportService, ImportServiceError, IngestError,
    RepoError, RepoResult, SqliteContactRepository, SqliteGroupRepository,
};
use rusqlite::Connection;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use uuid::Uuid;

fn import_service(
    conn: &Connection,
) -> ImportService<SqliteGroupRepository<'_>, SqliteContactRepository<'_>> {
    ImportService::new(
        SqliteGroupRepository::try_new(conn).unwrap(),
        SqliteContactRepository::try_new(conn).unwrap(),
    )
}

fn export_service(
    conn: &Connection,
) -> ExportService<SqliteGroupRepository<'_>, SqliteContactRepository<'_>> {
    ExportService::new(
        SqliteGroupRepository::try_new(conn).unwrap(),
        SqliteContactRepository::try_new(conn).unwrap(),
    )
}

fn new_group(conn: &Connection, name: &str) -> GroupId {
    SqliteGroupRepository::try_new(conn)
        .unwrap()
        .create_group(name, None)
        .unwrap()
        .id
}

fn schema_of(conn: &Connection, group_id: GroupId) -> Vec<String> {
    SqliteGroupRepository::try_new(conn)
        .unwrap()
        .get_schema(group_id)
        .unwrap()
}

fn contacts_of(conn: &Connection, group_id: GroupId) -> Vec<Contact> {
    SqliteContactRepository::try_new(conn)
        .unwrap()
        .list_contacts(group_id)
        .unwrap()
}

fn values(pairs: &[(&str, &str)]) -> ContactValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Contact repository whose bulk insert always fails.
struct RejectingBulkRepo<'conn> {
    inner: SqliteContactRepository<'conn>,
}

impl ContactRepository for RejectingBulkRepo<'_> {
    fn create_contact(&self, group_id: GroupId, values: &ContactValues) -> RepoResult<Contact> {
        self.inner.create_contact(group_id, values)
    }

    fn bulk_create(&self, _group_id: GroupId, _rows: &[ContactValues]) -> RepoResult<usize> {
        Err(RepoError::InvalidData("disk full".to_string()))
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        self.inner.get_contact(id)
    }

    fn list_contacts(&self, group_id: GroupId) -> RepoResult<Vec<Contact>> {
        self.inner.list_contacts(group_id)
    }

    fn update_values(&self, id: ContactId, values: &ContactValues) -> RepoResult<()> {
        self.inner.update_values(id, values)
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        self.inner.delete_contact(id)
    }

    fn delete_by_group(&self, group_id: GroupId) -> RepoResult<usize> {
        self.inner.delete_by_group(group_id)
    }
}

#[test]
fn csv_import_creates_schema_then_extends_it() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");
    let service = import_service(&conn);

    let first = service
        .import_file(group_id, "first.csv", b"A,B\n1,2\n3,4\n")
        .unwrap();
    assert_eq!(first.rows_inserted, 2);
    assert!(first.schema_updated);
    assert_eq!(first.columns, vec!["A", "B"]);
    assert_eq!(first.message, "Successfully imported 2 contacts");
    assert!(!first.is_partial());

    let second = service
        .import_file(group_id, "second.csv", b"B,C\n5,6\n")
        .unwrap();
    assert_eq!(second.added_columns, vec!["C"]);
    assert_eq!(schema_of(&conn, group_id), vec!["A", "B", "C"]);

    let contacts = contacts_of(&conn, group_id);
    assert_eq!(contacts.len(), 3);
    assert_eq!(contacts[0].values, values(&[("A", "1"), ("B", "2")]));
    assert_eq!(contacts[2].values, values(&[("B", "5"), ("C", "6")]));
}

#[test]
fn import_with_known_columns_leaves_schema_untouched() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");
    let service = import_service(&conn);
    service
        .import_file(group_id, "a.csv", b"A,B\n1,2\n")
        .unwrap();

    let report = service
        .import_file(group_id, "b.csv", b"B\n7\n")
        .unwrap();
    assert!(!report.schema_updated);
    assert!(report.added_columns.is_empty());
    assert_eq!(report.columns, vec!["A", "B"]);
}

#[test]
fn import_keeps_blank_cells_as_empty_strings() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");

    let report = import_service(&conn)
        .import_file(group_id, "gaps.csv", b"Name,Phone\nAda,\n,555\n")
        .unwrap();
    assert_eq!(report.rows_inserted, 2);

    let contacts = contacts_of(&conn, group_id);
    assert_eq!(contacts[0].values, values(&[("Name", "Ada"), ("Phone", "")]));
    assert_eq!(contacts[1].values, values(&[("Name", ""), ("Phone", "555")]));
}

#[test]
fn tsv_import_uses_tab_delimiter() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");

    import_service(&conn)
        .import_file(group_id, "people.tsv", b"Name\tCity\nAda\tLondon, UK\n")
        .unwrap();

    let contacts = contacts_of(&conn, group_id);
    assert_eq!(contacts[0].values["City"], "London, UK");
}

#[test]
fn xlsx_import_reads_first_sheet() {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "Age").unwrap();
        sheet.write_string(1, 0, "Ada").unwrap();
        sheet.write_number(1, 1, 36).unwrap();
        sheet.write_string(2, 0, "Max").unwrap();
    }
    let bytes = workbook.save_to_buffer().unwrap();

    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");
    let report = import_service(&conn)
        .import_file(group_id, "people.xlsx", &bytes)
        .unwrap();
    assert_eq!(report.rows_inserted, 2);
    assert_eq!(report.columns, vec!["Name", "Age"]);

    let contacts = contacts_of(&conn, group_id);
    assert_eq!(contacts[0].values, values(&[("Name", "Ada"), ("Age", "36")]));
    assert_eq!(contacts[1].values, values(&[("Name", "Max"), ("Age", "")]));
}

#[test]
fn xlsx_date_cells_import_as_dates() {
    let mut workbook = Workbook::new();
    {
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let birthday = ExcelDateTime::from_ymd(1990, 12, 10).unwrap();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "Birthday").unwrap();
        sheet.write_string(1, 0, "Ada").unwrap();
        sheet
            .write_datetime_with_format(1, 1, &birthday, &date_format)
            .unwrap();
    }
    let bytes = workbook.save_to_buffer().unwrap();

    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");
    import_service(&conn)
        .import_file(group_id, "birthdays.xlsx", &bytes)
        .unwrap();

    let contacts = contacts_of(&conn, group_id);
    assert_eq!(contacts[0].values["Birthday"], "1990-12-10 00:00:00");
}

#[test]
fn unsupported_or_empty_uploads_are_format_errors() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");
    let service = import_service(&conn);

    let err = service
        .import_file(group_id, "notes.txt", b"A\n1\n")
        .unwrap_err();
    assert!(matches!(
        err,
        ImportServiceError::Format(IngestError::UnsupportedFormat(_))
    ));
    assert_eq!(err.kind(), ErrorKind::Format);

    let err = service.import_file(group_id, "empty.csv", b"").unwrap_err();
    assert!(matches!(err, ImportServiceError::Format(IngestError::Empty)));

    let err = service
        .import_file(group_id, "broken.xlsx", b"definitely not a zip")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);

    assert!(schema_of(&conn, group_id).is_empty());
    assert!(contacts_of(&conn, group_id).is_empty());
}

#[test]
fn import_into_unknown_group_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let missing = Uuid::new_v4();

    let err = import_service(&conn)
        .import_file(missing, "people.csv", b"A\n1\n")
        .unwrap_err();
    assert!(matches!(err, ImportServiceError::GroupNotFound(id) if id == missing));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn failed_insert_after_schema_write_is_partial_success() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");
    let service = ImportService::new(
        SqliteGroupRepository::try_new(&conn).unwrap(),
        RejectingBulkRepo {
            inner: SqliteContactRepository::try_new(&conn).unwrap(),
        },
    );

    let report = service
        .import_file(group_id, "people.csv", b"Name,Email\nAda,a@x\n")
        .unwrap();
    assert!(report.is_partial());
    assert!(report.schema_updated);
    assert_eq!(report.rows_inserted, 0);
    assert!(report.warning.as_deref().unwrap().contains("disk full"));

    assert_eq!(schema_of(&conn, group_id), vec!["Name", "Email"]);
    assert!(contacts_of(&conn, group_id).is_empty());
}

#[test]
fn failed_insert_without_schema_change_is_an_error() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");
    SqliteGroupRepository::try_new(&conn)
        .unwrap()
        .set_schema(group_id, &["Name".to_string()])
        .unwrap();
    let service = ImportService::new(
        SqliteGroupRepository::try_new(&conn).unwrap(),
        RejectingBulkRepo {
            inner: SqliteContactRepository::try_new(&conn).unwrap(),
        },
    );

    let err = service
        .import_file(group_id, "people.csv", b"Name\nAda\n")
        .unwrap_err();
    assert!(matches!(err, ImportServiceError::Repo(_)));
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[test]
fn export_projects_records_onto_current_schema() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");
    let groups = SqliteGroupRepository::try_new(&conn).unwrap();
    let contacts = SqliteContactRepository::try_new(&conn).unwrap();
    groups
        .set_schema(group_id, &["A".to_string(), "B".to_string()])
        .unwrap();
    contacts
        .create_contact(group_id, &values(&[("A", "1"), ("Old", "hidden")]))
        .unwrap();

    let outcome = export_service(&conn).export(group_id).unwrap();
    assert_eq!(outcome.soft_error(), None);
    let ExportOutcome::Table(table) = outcome else {
        panic!("expected a table");
    };
    assert_eq!(table.columns, vec!["A", "B"]);
    assert_eq!(table.rows, vec![values(&[("A", "1"), ("B", "")])]);
    assert_eq!(table.file_name("csv"), "people_contacts.csv");
}

#[test]
fn export_of_empty_group_is_soft_empty() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "people");

    let outcome = export_service(&conn).export(group_id).unwrap();
    assert_eq!(outcome, ExportOutcome::Empty { group_id });
    assert_eq!(outcome.soft_error(), Some(ErrorKind::Empty));
}

#[test]
fn export_of_unknown_group_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let err = export_service(&conn).export(Uuid::new_v4()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn exported_csv_imports_back_into_fresh_group() {
    let conn = open_db_in_memory().unwrap();
    let source = new_group(&conn, "source");
    import_service(&conn)
        .import_file(
            source,
            "people.csv",
            b"Name,Notes\nAda,\"likes, commas\"\nMax,\n",
        )
        .unwrap();
    SqliteContactRepository::try_new(&conn)
        .unwrap()
        .create_contact(source, &values(&[("Name", " Grace "), ("Notes", "x  ")]))
        .unwrap();

    let ExportOutcome::Table(table) = export_service(&conn).export(source).unwrap() else {
        panic!("expected a table");
    };
    let mut buffer = Vec::new();
    table.write_delimited(&mut buffer, b',').unwrap();

    let target = new_group(&conn, "target");
    let report = import_service(&conn)
        .import_file(target, &table.file_name("csv"), &buffer)
        .unwrap();
    assert_eq!(report.rows_inserted, 3);
    assert_eq!(schema_of(&conn, target), schema_of(&conn, source));

    let copied: Vec<_> = contacts_of(&conn, target)
        .into_iter()
        .map(|contact| contact.values)
        .collect();
    let original: Vec<_> = contacts_of(&conn, source)
        .into_iter()
        .map(|contact| contact.values)
        .collect();
    assert_eq!(copied, original);
    assert_eq!(copied[2], values(&[("Name", " Grace "), ("Notes", "x  ")]));
}
