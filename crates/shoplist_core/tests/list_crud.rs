use chrono::Duration;
use rusqlite::Connection;
use shoplist_core::db::open_db_in_memory;
use shoplist_core::model::now;
use shoplist_core::{
    ItemQuery, ListQuery, ListRepository, ListService, ListServiceError, ListSort, NewItem,
    NewList, ShoppingList, SqliteListRepository, ValidationError,
};

fn service(conn: &Connection) -> ListService<SqliteListRepository<'_>> {
    ListService::new(SqliteListRepository::try_new(conn).unwrap())
}

#[test]
fn creating_a_list_persists_one_record_retrievable_by_name() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);

    let created = lists.create_list(NewList::named("  Groceries ")).unwrap();
    assert_eq!(created.name, "Groceries");

    let found = lists.find_lists_by_name("groceries").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, created.id);

    let all = lists.list_lists(&ListQuery::default()).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn find_by_name_folds_non_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);

    let apples = lists.create_list(NewList::named("Äpfel")).unwrap();
    lists.create_list(NewList::named("Apfel")).unwrap();

    let found = lists.find_lists_by_name(" äPFEL ").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, apples.id);
}

#[test]
fn create_and_get_roundtrip_preserves_fields() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);

    let input = NewList {
        name: "Party".to_string(),
        notes: Some("  bring ice  ".to_string()),
        end_date: Some(now() + Duration::days(2)),
    };
    let created = lists.create_list(input.clone()).unwrap();
    let loaded = lists.get_list(created.id).unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.notes.as_deref(), Some("bring ice"));
    assert_eq!(loaded.end_date, input.end_date);
    assert!(loaded.is_expanded);
    assert!(!loaded.is_completed);
}

#[test]
fn blank_list_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);

    let err = lists.create_list(NewList::named("   ")).unwrap_err();
    assert!(matches!(
        err,
        ListServiceError::Validation(ValidationError::BlankName { entity: "list" })
    ));
    assert!(lists.list_lists(&ListQuery::default()).unwrap().is_empty());
}

#[test]
fn end_date_before_creation_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);

    let input = NewList {
        end_date: Some(now() - Duration::days(1)),
        ..NewList::named("Yesterday")
    };
    assert!(matches!(
        lists.create_list(input),
        Err(ListServiceError::Validation(
            ValidationError::EndBeforeCreation { .. }
        ))
    ));
}

#[test]
fn pinned_lists_sort_first_then_by_requested_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();

    let base = now();
    let mut banana = ShoppingList::new("banana");
    banana.creation_date = base - Duration::hours(3);
    let mut apple = ShoppingList::new("Apple");
    apple.creation_date = base - Duration::hours(2);
    let mut cherry = ShoppingList::new("cherry");
    cherry.creation_date = base - Duration::hours(1);
    cherry.end_date = Some(base + Duration::days(1));
    let mut pinned = ShoppingList::new("zucchini");
    pinned.creation_date = base - Duration::hours(10);
    pinned.is_pinned = true;
    for list in [&banana, &apple, &cherry, &pinned] {
        repo.create_list(list).unwrap();
    }

    let names = |sort| {
        repo.list_lists(&ListQuery {
            include_completed: true,
            sort,
        })
        .unwrap()
        .into_iter()
        .map(|list| list.name)
        .collect::<Vec<_>>()
    };

    assert_eq!(
        names(ListSort::CreationDate),
        ["zucchini", "cherry", "Apple", "banana"]
    );
    assert_eq!(names(ListSort::Name), ["zucchini", "Apple", "banana", "cherry"]);
    assert_eq!(names(ListSort::EndDate)[..2], ["zucchini", "cherry"]);
}

#[test]
fn flags_are_updated_through_service() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);
    let list = lists.create_list(NewList::named("Hardware")).unwrap();

    let pinned = lists.set_list_pinned(list.id, true).unwrap();
    assert!(pinned.is_pinned);
    let collapsed = lists.set_list_expanded(list.id, false).unwrap();
    assert!(!collapsed.is_expanded);
    let renamed = lists.rename_list(list.id, " Tools ").unwrap();
    assert_eq!(renamed.name, "Tools");
    assert!(renamed.is_pinned);
}

#[test]
fn deleting_a_list_with_no_remaining_items_removes_it() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);
    let list = lists.create_list(NewList::named("Empty")).unwrap();
    let item = lists.add_item(list.id, NewItem::named("Temp")).unwrap();
    lists.delete_item(item.id).unwrap();

    lists.delete_list(list.id).unwrap();

    assert!(lists.get_list(list.id).unwrap().is_none());
    assert!(lists.find_lists_by_name("Empty").unwrap().is_empty());
}

#[test]
fn deleting_a_list_cascades_to_its_items() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);
    let list = lists.create_list(NewList::named("Weekly")).unwrap();
    let item = lists.add_item(list.id, NewItem::named("Milk")).unwrap();

    lists.delete_list(list.id).unwrap();

    assert!(lists.get_item(item.id).unwrap().is_none());
    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn deleting_unknown_list_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);
    let missing = ShoppingList::new("ghost");

    assert!(matches!(
        lists.delete_list(missing.id),
        Err(ListServiceError::ListNotFound(id)) if id == missing.id
    ));
}

#[test]
fn delete_selected_lists_removes_only_selected() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);
    let keep = lists.create_list(NewList::named("Keep")).unwrap();
    let drop_a = lists.create_list(NewList::named("Drop A")).unwrap();
    let drop_b = lists.create_list(NewList::named("Drop B")).unwrap();
    lists.set_list_selected(drop_a.id, true).unwrap();
    lists.set_list_selected(drop_b.id, true).unwrap();

    assert_eq!(lists.delete_selected_lists().unwrap(), 2);

    let remaining = lists.list_lists(&ListQuery::default()).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);
}

#[test]
fn overview_reports_item_counts() {
    let conn = open_db_in_memory().unwrap();
    let lists = service(&conn);
    let list = lists.create_list(NewList::named("Counts")).unwrap();
    let first = lists.add_item(list.id, NewItem::named("One")).unwrap();
    lists.add_item(list.id, NewItem::named("Two")).unwrap();
    lists.set_item_completed(first.id, true).unwrap();

    let overview = lists.list_overview(&ListQuery::default()).unwrap();
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].counts.total, 2);
    assert_eq!(overview[0].counts.completed, 1);

    let items = lists.list_items(&ItemQuery::for_list(list.id)).unwrap();
    assert_eq!(items.len(), 2);
}
