//! Interactive session: line commands drive the browser, and the table is
//! re-rendered every time the browser publishes a new view.

use domain_inventory::{
    CLEAR_CATEGORY_LABEL, Category, DeletedItemsBrowser, InventoryRepository, ItemRow, SortOption,
};
use strum::IntoEnumIterator;
use eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::render;

/// Command reference, with the selectable categories and sort options
pub fn help() -> String {
    let categories: Vec<&str> = Category::iter().map(|c| c.as_str()).collect();
    let sorts: Vec<String> = SortOption::SELECTABLE.iter().map(|s| s.to_string()).collect();

    format!(
        "Commands:
  search <term>       filter by name (no term clears the search)
  filter <category>   {} or {CLEAR_CATEGORY_LABEL}
  sort <option>       {}
  restore <sku>       restore a product
  reload              fetch the deleted set again
  show                print the current view
  help                show this help
  quit                leave the session",
        categories.join(", "),
        sorts.join(", ")
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(String),
    Filter(String),
    Sort(String),
    Restore(String),
    Reload,
    Show,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "search" => SessionCommand::Search(rest.to_string()),
            "filter" if !rest.is_empty() => SessionCommand::Filter(rest.to_string()),
            "sort" if !rest.is_empty() => SessionCommand::Sort(rest.to_string()),
            "restore" if !rest.is_empty() => SessionCommand::Restore(rest.to_string()),
            "filter" | "sort" | "restore" => return Err(format!("'{verb}' needs an argument")),
            "reload" => SessionCommand::Reload,
            "show" => SessionCommand::Show,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            _ => return Err(format!("Unknown command '{verb}', try 'help'")),
        };
        Ok(Some(command))
    }
}

/// What the session loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Apply one command to the browser
pub async fn execute<R>(browser: &DeletedItemsBrowser<R>, command: SessionCommand) -> Flow
where
    R: InventoryRepository,
{
    match command {
        SessionCommand::Search(term) => browser.set_search_term(term).await,
        SessionCommand::Filter(label) => {
            if let Err(err) = browser.select_category(&label).await {
                eprintln!("Unknown category '{label}': {err}");
            }
        }
        SessionCommand::Sort(label) => {
            let sort = browser.select_sort(&label).await;
            debug!(%sort, "Sort selected");
        }
        SessionCommand::Restore(sku) => {
            // Restore failures are already logged by the browser
            if let Err(err) = browser.restore_by_sku(&sku).await {
                warn!(error = %err, "Restore did not complete");
            }
        }
        SessionCommand::Reload => {
            let _ = browser.reload().await;
        }
        SessionCommand::Show => print_view(browser).await,
        SessionCommand::Help => println!("{}", help()),
        SessionCommand::Quit => return Flow::Stop,
    }
    Flow::Continue
}

async fn print_view<R: InventoryRepository>(browser: &DeletedItemsBrowser<R>) {
    let rows = browser.rows();
    println!("{}", render::summary(&browser.query().await, rows.len()));
    print!("{}", render::table(&rows));
}

/// Run the session on stdin until `quit` or end of input
pub async fn run<R>(browser: DeletedItemsBrowser<R>) -> Result<()>
where
    R: InventoryRepository + 'static,
{
    let mut views = browser.subscribe();
    let renderer = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let rows: Vec<ItemRow> = views.borrow_and_update().iter().map(ItemRow::from).collect();
            print!("{}", render::table(&rows));
        }
    });

    browser.on_mount().await;
    println!("{}", help());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match SessionCommand::parse(&line) {
            Ok(Some(command)) => {
                if execute(&browser, command).await == Flow::Stop {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }

    browser.close().await;
    renderer.abort();
    Ok(())
}
