use shoplist_core::db::open_db_in_memory;
use shoplist_core::{
    Action, ItemSort, ListSort, NewItem, NewList, ProductQuery, SettingsField, ShoppingStore,
};

#[test]
fn fresh_store_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = ShoppingStore::try_new(&conn).unwrap();

    let state = store.state();
    assert!(state.lists.is_empty());
    assert!(state.active_list.is_none());
    assert!(state.categories.is_empty());
    assert!(state.show_completed_items);
    assert!(state.last_error.is_none());
}

#[test]
fn create_list_opens_it_and_items_follow() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();

    assert!(store.dispatch(Action::CreateList(NewList::named("Groceries"))));
    assert!(store.dispatch(Action::AddItem(NewItem::named("Milk"))));
    assert!(store.dispatch(Action::AddItem(NewItem::named("Eggs"))));

    let state = store.state();
    assert_eq!(state.lists.len(), 1);
    assert_eq!(state.lists[0].counts.total, 2);
    assert_eq!(
        state.active_list.as_ref().map(|list| list.name.as_str()),
        Some("Groceries")
    );
    assert_eq!(state.items.len(), 2);
}

#[test]
fn toggling_all_items_completes_active_list() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();
    store.dispatch(Action::CreateList(NewList::named("Quick")));
    store.dispatch(Action::AddItem(NewItem::named("Bread")));
    let bread = store.state().items[0].id;

    assert!(store.dispatch(Action::ToggleItem(bread)));
    assert!(store
        .state()
        .active_list
        .as_ref()
        .is_some_and(|list| list.is_completed));
    assert_eq!(store.state().lists[0].counts.completed, 1);

    assert!(store.dispatch(Action::SetShowCompletedItems(false)));
    assert!(store.state().items.is_empty());
}

#[test]
fn failed_action_returns_false_and_records_error() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();

    assert!(!store.dispatch(Action::AddItem(NewItem::named("Orphan"))));
    assert!(store.state().last_error.is_some());

    assert!(!store.dispatch(Action::CreateList(NewList::named("   "))));
    assert!(store.state().lists.is_empty());

    assert!(store.dispatch(Action::Refresh));
    assert!(store.state().last_error.is_none(), "success clears the error");
}

#[test]
fn deleting_active_list_closes_it() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();
    store.dispatch(Action::CreateList(NewList::named("Temp")));
    let id = store.state().active_list.as_ref().unwrap().id;

    assert!(store.dispatch(Action::DeleteList(id)));
    assert!(store.state().active_list.is_none());
    assert!(store.state().lists.is_empty());
    assert!(!store.dispatch(Action::OpenList(id)));
}

#[test]
fn sort_changes_are_applied_on_refresh() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();
    store.dispatch(Action::CreateList(NewList::named("beta")));
    store.dispatch(Action::CreateList(NewList::named("Alpha")));
    store.dispatch(Action::AddItem(NewItem::named("zest")));
    store.dispatch(Action::AddItem(NewItem::named("Apple")));

    store.dispatch(Action::SetListSort(ListSort::Name));
    store.dispatch(Action::SetItemSort(ItemSort::Name));

    let state = store.state();
    let list_names: Vec<_> = state.lists.iter().map(|row| row.list.name.as_str()).collect();
    assert_eq!(list_names, ["Alpha", "beta"]);
    let item_names: Vec<_> = state.items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(item_names, ["Apple", "zest"]);
}

#[test]
fn library_actions_seed_filter_and_add_products() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();

    assert!(store.dispatch(Action::LoadInitialData));
    assert!(!store.state().categories.is_empty());
    assert!(!store.state().library.is_empty());

    assert!(store.dispatch(Action::FilterProducts(ProductQuery {
        text: Some("coffee".to_string()),
        ..ProductQuery::default()
    })));
    let groups = &store.state().library;
    assert_eq!(groups.len(), 1);
    let coffee = groups[0].products[0].clone();

    store.dispatch(Action::CreateList(NewList::named("Morning")));
    assert!(store.dispatch(Action::AddProduct(coffee.id)));
    assert_eq!(store.state().items[0].name, "Coffee");

    assert!(!store.dispatch(Action::DeleteProduct(coffee.id)));
    assert!(store.dispatch(Action::ToggleProductFavorite(coffee.id)));
    assert!(store.state().library[0].products[0].is_favorite);
}

#[test]
fn creating_category_first_still_allows_seeding() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();

    assert!(store.dispatch(Action::CreateCategory("Snacks".to_string())));
    assert!(store.dispatch(Action::LoadInitialData));

    let state = store.state();
    assert!(state.categories.len() > 1);
    assert!(state.categories.iter().any(|category| category.name == "Snacks"));
    assert!(state.categories.iter().any(|category| category.name == "Bakery"));
    assert!(!state.library.is_empty());
}

#[test]
fn settings_actions_update_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();

    assert!(store.dispatch(Action::SetFieldVisible {
        field: SettingsField::ItemPriority,
        visible: false,
    }));
    assert!(!store.state().settings.show_item_priority);

    assert!(store.dispatch(Action::ResetSettings));
    assert!(store.state().settings.show_item_priority);
}

#[test]
fn export_and_import_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();
    store.dispatch(Action::CreateList(NewList::named("Shared")));
    store.dispatch(Action::AddItem(NewItem::named("Cake")));
    let original = store.state().active_list.as_ref().unwrap().id;

    assert!(store.dispatch(Action::ExportActiveList {
        dir: dir.path().to_path_buf(),
    }));
    let path = store.state().last_export.clone().unwrap();
    assert!(path.exists());

    assert!(store.dispatch(Action::ImportFile(path)));
    let state = store.state();
    let active = state.active_list.as_ref().unwrap();
    assert_ne!(active.id, original);
    assert_eq!(active.name, "Shared");
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.lists.len(), 2);
}

#[test]
fn import_of_missing_file_fails_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let mut store = ShoppingStore::try_new(&conn).unwrap();

    assert!(!store.dispatch(Action::ImportFile(dir.path().join("nope.shoplist"))));
    assert!(store.state().lists.is_empty());
    assert!(store.state().last_error.is_some());
}
