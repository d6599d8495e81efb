use chrono::Duration;
use rusqlite::Connection;
use shoplist_core::db::open_db_in_memory;
use shoplist_core::share::{
    export_list, export_list_to_file, import_document, import_share_file, parse_share_document,
    read_share_file, to_json,
};
use shoplist_core::{
    ItemQuery, ListQuery, ListService, NewItem, NewList, Priority, ShareError,
    SqliteListRepository, ValidationError, SHARE_FILE_EXTENSION,
};

fn service(conn: &Connection) -> ListService<SqliteListRepository<'_>> {
    ListService::new(SqliteListRepository::try_new(conn).unwrap())
}

fn list_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM lists;", [], |row| row.get(0))
        .unwrap()
}

fn item_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))
        .unwrap()
}

const VALID_DOCUMENT: &str = r#"{
  "id": "6f2b3c1e-8d4a-4f6b-9c2d-1a2b3c4d5e6f",
  "name": "Party",
  "notes": "Saturday",
  "creationDate": "2026-01-01T10:00:00Z",
  "endDate": "2026-01-03T10:00:00Z",
  "items": [
    {
      "id": "0b1c2d3e-4f50-4617-8293-a4b5c6d7e8f9",
      "listId": "6f2b3c1e-8d4a-4f6b-9c2d-1a2b3c4d5e6f",
      "name": "Chips",
      "notes": null,
      "priority": 2,
      "quantity": 3,
      "creationDate": "2026-01-01T10:05:00Z",
      "endDate": null
    },
    {
      "id": "1c2d3e4f-5061-4728-93a4-b5c6d7e8f901",
      "listId": "6f2b3c1e-8d4a-4f6b-9c2d-1a2b3c4d5e6f",
      "name": "Soda",
      "notes": null,
      "priority": 0,
      "quantity": 6,
      "creationDate": "2026-01-01T10:06:00Z",
      "endDate": null
    }
  ]
}"#;

#[test]
fn export_then_import_reproduces_name_and_items() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);
    let list = lists.create_list(NewList::named("Weekend")).unwrap();
    let mut milk = NewItem::named("Milk");
    milk.quantity = 2;
    milk.priority = Priority::High;
    lists.add_item(list.id, milk).unwrap();
    let eggs = lists.add_item(list.id, NewItem::named("Eggs")).unwrap();
    lists.set_item_completed(eggs.id, true).unwrap();

    let json = to_json(&export_list(&conn, list.id).unwrap()).unwrap();
    let document = parse_share_document(&json).unwrap();
    let imported = import_document(&conn, &document).unwrap();

    assert_ne!(imported.id, list.id, "import assigns a fresh id");
    assert_eq!(imported.name, "Weekend");
    assert_eq!(list_count(&conn), 2);

    let items = lists.list_items(&ItemQuery::for_list(imported.id)).unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| !item.is_completed));
    assert!(!imported.is_completed);

    let milk = items.iter().find(|item| item.name == "Milk").unwrap();
    assert_eq!(milk.quantity, 2);
    assert_eq!(milk.priority, Priority::High);
}

#[test]
fn exported_json_uses_camel_case_keys_and_integer_priority() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);
    let list = lists.create_list(NewList::named("Keys")).unwrap();
    lists.add_item(list.id, NewItem::named("Tea")).unwrap();

    let json = to_json(&export_list(&conn, list.id).unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value.get("creationDate").is_some());
    assert!(value.get("endDate").is_some());
    let item = &value["items"][0];
    assert_eq!(item["listId"], list.id.to_string());
    assert_eq!(item["priority"], 1);
    assert_eq!(item["quantity"], 1);
}

#[test]
fn import_of_handwritten_document_keeps_dates() {
    let conn = open_db_in_memory().unwrap();
    let document = parse_share_document(VALID_DOCUMENT).unwrap();

    let imported = import_document(&conn, &document).unwrap();

    assert_eq!(imported.name, "Party");
    assert_eq!(imported.notes.as_deref(), Some("Saturday"));
    assert_eq!(imported.creation_date, document.creation_date);
    assert_eq!(
        imported.end_date,
        Some(document.creation_date + Duration::days(2))
    );
    assert_eq!(item_count(&conn), 2);
}

#[test]
fn malformed_json_is_rejected() {
    let err = parse_share_document("{\"name\": \"Broken\", ").unwrap_err();
    assert!(matches!(err, ShareError::Json(_)));

    let unknown_priority = VALID_DOCUMENT.replace("\"priority\": 2", "\"priority\": 7");
    assert!(matches!(
        parse_share_document(&unknown_priority),
        Err(ShareError::Json(_))
    ));
}

#[test]
fn invalid_item_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let mut document = parse_share_document(VALID_DOCUMENT).unwrap();
    document.items[1].quantity = 0;

    let err = import_document(&conn, &document).unwrap_err();

    assert!(matches!(
        err,
        ShareError::Validation(ValidationError::ZeroQuantity)
    ));
    assert_eq!(list_count(&conn), 0);
    assert_eq!(item_count(&conn), 0);
}

#[test]
fn end_date_before_creation_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let mut document = parse_share_document(VALID_DOCUMENT).unwrap();
    document.end_date = Some(document.creation_date - Duration::days(1));

    let err = import_document(&conn, &document).unwrap_err();

    assert!(matches!(
        err,
        ShareError::Validation(ValidationError::EndBeforeCreation { .. })
    ));
    assert_eq!(list_count(&conn), 0);
}

#[test]
fn share_file_round_trip_through_directory() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);
    let list = lists.create_list(NewList::named("BBQ / Sunday")).unwrap();
    lists.add_item(list.id, NewItem::named("Charcoal")).unwrap();

    let path = export_list_to_file(&conn, list.id, dir.path()).unwrap();
    assert_eq!(
        path.extension().and_then(|ext| ext.to_str()),
        Some(SHARE_FILE_EXTENSION)
    );
    assert_eq!(path.parent(), Some(dir.path()));

    let document = read_share_file(&path).unwrap();
    assert_eq!(document.id, list.id);
    assert_eq!(document.items.len(), 1);

    let imported = import_share_file(&conn, &path).unwrap();
    assert_eq!(imported.name, "BBQ / Sunday");
    let all = lists.list_lists(&ListQuery::default()).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn missing_share_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_share_file(dir.path().join("absent.shoplist")).unwrap_err();
    assert!(matches!(err, ShareError::Io(_)));
}

#[test]
fn exporting_unknown_list_fails() {
    let conn = open_db_in_memory().unwrap();
    let ghost = shoplist_core::ShoppingList::new("ghost");
    assert!(matches!(
        export_list(&conn, ghost.id),
        Err(ShareError::ListNotFound(id)) if id == ghost.id
    ));
}
