//! Command line driver over the shoplist core.
//!
//! # Responsibility
//! - Map subcommands onto the same services the mobile UI uses.
//! - Keep output line-oriented so it can be piped and grepped.
//!
//! # Usage
//!
//! ```bash
//! shoplist new-list "Weekend"
//! shoplist add <LIST_ID> "Milk" --qty 2 --priority high
//! shoplist items <LIST_ID>
//! shoplist export <LIST_ID> --dir /tmp
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use shoplist_core::config::{resolve_db_path, DB_PATH_ENV};
use shoplist_core::db::open_db;
use shoplist_core::share::{export_list_to_file, import_share_file};
use shoplist_core::{
    default_log_level, init_logging, ItemQuery, ItemSort, LibraryService, ListQuery, ListService,
    ListSort, NewItem, NewList, Priority, ProductQuery, SeedOutcome, SettingsField,
    SettingsService, SqliteLibraryRepository, SqliteListRepository, SqliteSettingsRepository,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

type CliResult = Result<(), Box<dyn Error>>;

/// Shopping lists from the terminal.
#[derive(Parser, Debug)]
#[command(name = "shoplist")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<String>,

    /// Directory for rolling log files; logging stays off when omitted
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all lists with item totals
    Lists {
        #[arg(long, value_enum, default_value_t = ListOrder::Created)]
        sort: ListOrder,
        /// Hide lists whose items are all done
        #[arg(long)]
        hide_completed: bool,
    },
    /// Create a list
    NewList {
        name: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Add an item to a list
    Add {
        list_id: Uuid,
        name: String,
        #[arg(long, default_value_t = 1)]
        qty: u32,
        /// low|normal|high (or 0|1|2)
        #[arg(long, default_value = "normal", value_parser = parse_priority)]
        priority: Priority,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        favorite: bool,
    },
    /// Show the items of a list
    Items {
        list_id: Uuid,
        #[arg(long, value_enum, default_value_t = ItemOrder::Priority)]
        sort: ItemOrder,
        /// Only items still to buy
        #[arg(long)]
        open_only: bool,
        #[arg(long)]
        favorites: bool,
    },
    /// Mark an item done
    Done {
        item_id: Uuid,
        /// Reopen instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete a list and its items
    DeleteList { list_id: Uuid },
    /// Load the built-in product library (first run only)
    Seed,
    /// Browse the product library
    Products {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        favorites: bool,
        /// Include deactivated products
        #[arg(long)]
        all: bool,
    },
    /// Write a list to a .shoplist file
    Export {
        list_id: Uuid,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Import a .shoplist file as a new list
    Import { path: PathBuf },
    /// Show or change field visibility settings
    Settings {
        /// Field to flip, e.g. item_notes
        #[arg(long, value_parser = parse_settings_field)]
        toggle: Option<SettingsField>,
        #[arg(long, conflicts_with = "toggle")]
        reset: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListOrder {
    Created,
    Name,
    EndDate,
}

impl From<ListOrder> for ListSort {
    fn from(value: ListOrder) -> Self {
        match value {
            ListOrder::Created => ListSort::CreationDate,
            ListOrder::Name => ListSort::Name,
            ListOrder::EndDate => ListSort::EndDate,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ItemOrder {
    Priority,
    Name,
    Created,
}

impl From<ItemOrder> for ItemSort {
    fn from(value: ItemOrder) -> Self {
        match value {
            ItemOrder::Priority => ItemSort::Priority,
            ItemOrder::Name => ItemSort::Name,
            ItemOrder::Created => ItemSort::CreationDate,
        }
    }
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse_label(value).ok_or_else(|| format!("unknown priority `{value}`"))
}

fn parse_settings_field(value: &str) -> Result<SettingsField, String> {
    SettingsField::parse_key(value).ok_or_else(|| {
        let known = SettingsField::ALL
            .iter()
            .map(|field| field.key())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown field `{value}` (expected one of: {known})")
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let db_path = resolve_db_path(cli.db.as_deref());
    let conn = open_db(&db_path)?;
    info!("event=cli_start module=cli status=ok");

    match cli.command {
        Command::Lists {
            sort,
            hide_completed,
        } => {
            let lists = ListService::new(SqliteListRepository::try_new(&conn)?);
            let query = ListQuery {
                include_completed: !hide_completed,
                sort: sort.into(),
            };
            for row in lists.list_overview(&query)? {
                let mut flags = String::new();
                if row.list.is_pinned {
                    flags.push_str(" [pinned]");
                }
                if row.list.is_completed {
                    flags.push_str(" [done]");
                }
                println!(
                    "{}  {}  {}/{}{flags}",
                    row.list.id, row.list.name, row.counts.completed, row.counts.total
                );
            }
        }
        Command::NewList { name, notes } => {
            let lists = ListService::new(SqliteListRepository::try_new(&conn)?);
            let list = lists.create_list(NewList {
                name,
                notes,
                end_date: None,
            })?;
            println!("{}", list.id);
        }
        Command::Add {
            list_id,
            name,
            qty,
            priority,
            notes,
            favorite,
        } => {
            let lists = ListService::new(SqliteListRepository::try_new(&conn)?);
            let mut input = NewItem::named(name);
            input.quantity = qty;
            input.priority = priority;
            input.notes = notes;
            input.is_favorite = favorite;
            let item = lists.add_item(list_id, input)?;
            println!("{}", item.id);
        }
        Command::Items {
            list_id,
            sort,
            open_only,
            favorites,
        } => {
            let lists = ListService::new(SqliteListRepository::try_new(&conn)?);
            let query = ItemQuery {
                list_id,
                include_completed: !open_only,
                favorites_only: favorites,
                sort: sort.into(),
            };
            for item in lists.list_items(&query)? {
                let mark = if item.is_completed { 'x' } else { ' ' };
                let star = if item.is_favorite { " *" } else { "" };
                println!(
                    "[{mark}] {}  {} x{}  ({}){star}",
                    item.id,
                    item.name,
                    item.quantity,
                    item.priority.label()
                );
            }
        }
        Command::Done { item_id, undo } => {
            let lists = ListService::new(SqliteListRepository::try_new(&conn)?);
            let item = lists.set_item_completed(item_id, !undo)?;
            let list_done = lists
                .get_list(item.list_id)?
                .is_some_and(|list| list.is_completed);
            println!(
                "{} {}{}",
                if item.is_completed { "done" } else { "open" },
                item.name,
                if list_done { " (list complete)" } else { "" }
            );
        }
        Command::DeleteList { list_id } => {
            let lists = ListService::new(SqliteListRepository::try_new(&conn)?);
            lists.delete_list(list_id)?;
            println!("deleted {list_id}");
        }
        Command::Seed => {
            let library = LibraryService::new(SqliteLibraryRepository::try_new(&conn)?);
            match library.load_initial_data_if_needed()? {
                SeedOutcome::Seeded {
                    categories,
                    products,
                } => println!("seeded {categories} categories, {products} products"),
                SeedOutcome::AlreadyLoaded => println!("library already loaded"),
            }
        }
        Command::Products {
            search,
            category,
            favorites,
            all,
        } => {
            let library = LibraryService::new(SqliteLibraryRepository::try_new(&conn)?);
            let query = ProductQuery {
                category_id: category,
                text: search,
                favorites_only: favorites,
                include_inactive: all,
            };
            for group in library.products_by_category(&query)? {
                println!("{} (#{})", group.category.name, group.category.id);
                for product in group.products {
                    let inactive = if product.is_active { "" } else { " [inactive]" };
                    println!("  {}  {}{inactive}", product.id, product.name);
                }
            }
        }
        Command::Export { list_id, dir } => {
            let path = export_list_to_file(&conn, list_id, dir)?;
            println!("{}", path.display());
        }
        Command::Import { path } => {
            let list = import_share_file(&conn, path)?;
            println!("{}", list.id);
        }
        Command::Settings { toggle, reset } => {
            let settings = SettingsService::new(SqliteSettingsRepository::try_new(&conn)?);
            let current = match (toggle, reset) {
                (Some(field), _) => settings.toggle_field(field)?,
                (None, true) => settings.reset_settings()?,
                (None, false) => settings.get_settings()?,
            };
            for field in SettingsField::ALL {
                let state = if current.is_visible(field) { "on" } else { "off" };
                println!("{} = {state}", field.key());
            }
        }
    }
    Ok(())
}
