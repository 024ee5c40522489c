//! Item command handlers
//!
//! Every mutation follows the same shape: load the full list, change it in
//! memory, save the whole list back. The coordinator takes care of local
//! durability and remote sync.

use anyhow::{anyhow, bail, Result};

use wallet_core::{Item, SaveOutcome, SyncCoordinator};

use crate::metadata;
use crate::output::{short_id, Output};

/// Add a new item
pub async fn add(
    coordinator: &SyncCoordinator,
    value: String,
    name: Option<String>,
    category: Option<String>,
    output: &Output,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => metadata::item_name(&value).await,
    };

    let mut item = Item::new(name, value);
    if let Some(category) = category {
        item.set_category(category);
    }

    let mut items = coordinator.load_items().await;
    items.push(item.clone());

    let outcome = coordinator.save_items(&items).await;
    report_save(&outcome, coordinator, output)?;

    output.success(&format!("Added item: {}", short_id(&item.id)));
    output.print_item(&item);
    Ok(())
}

/// List items, optionally filtered by category
pub async fn list(
    coordinator: &SyncCoordinator,
    category: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut items = coordinator.load_items().await;

    if let Some(ref category) = category {
        items.retain(|item| item.category.eq_ignore_ascii_case(category));
    }

    output.print_items(&items);
    Ok(())
}

/// Show a single item
pub async fn show(coordinator: &SyncCoordinator, id: &str, output: &Output) -> Result<()> {
    let items = coordinator.load_items().await;
    let item = find_item(&items, id)?;

    output.print_item(item);
    Ok(())
}

/// Edit an item
pub async fn edit(
    coordinator: &SyncCoordinator,
    id: &str,
    name: Option<String>,
    value: Option<String>,
    category: Option<String>,
    output: &Output,
) -> Result<()> {
    if name.is_none() && value.is_none() && category.is_none() {
        bail!("Nothing to change. Pass --name, --value, or --category.");
    }

    let mut items = coordinator.load_items().await;
    let position = find_position(&items, id)?;

    {
        let item = &mut items[position];
        if let Some(name) = name {
            item.set_name(name);
        }
        if let Some(value) = value {
            item.set_value(value);
        }
        if let Some(category) = category {
            item.set_category(category);
        }
    }
    let updated = items[position].clone();

    let outcome = coordinator.save_items(&items).await;
    report_save(&outcome, coordinator, output)?;

    output.success("Item updated");
    output.print_item(&updated);
    Ok(())
}

/// Delete an item by id
pub async fn remove(coordinator: &SyncCoordinator, id: &str, output: &Output) -> Result<()> {
    let mut items = coordinator.load_items().await;
    let position = find_position(&items, id)?;
    let item = items[position].clone();

    if output.should_prompt() {
        println!("Delete item: {} - {}", short_id(&item.id), item.name);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    items.remove(position);

    let outcome = coordinator.save_items(&items).await;
    report_save(&outcome, coordinator, output)?;

    output.success(&format!("Deleted item: {}", short_id(&item.id)));
    Ok(())
}

/// Open a URL item in the browser
pub async fn open(coordinator: &SyncCoordinator, id: &str, output: &Output) -> Result<()> {
    let items = coordinator.load_items().await;
    let item = find_item(&items, id)?;

    let url = metadata::normalize_url(&item.value)
        .ok_or_else(|| anyhow!("Item value is not a URL: {}", item.value))?;

    open::that(url.as_str())?;
    output.success(&format!("Opened {}", url));
    Ok(())
}

/// Surface a failed local save; remote-only failures just get a note.
fn report_save(
    outcome: &SaveOutcome,
    coordinator: &SyncCoordinator,
    output: &Output,
) -> Result<()> {
    if !outcome.success {
        bail!(
            "Error saving items: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    if !outcome.synced && coordinator.sync_enabled() {
        output.message("Saved locally; will sync when the remote store is reachable.");
    }
    Ok(())
}

/// Resolve an id or unique id prefix to an item
fn find_item<'a>(items: &'a [Item], id: &str) -> Result<&'a Item> {
    let position = find_position(items, id)?;
    Ok(&items[position])
}

fn find_position(items: &[Item], id: &str) -> Result<usize> {
    if let Some(position) = items.iter().position(|item| item.id == id) {
        return Ok(position);
    }

    let matches: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.id.starts_with(id))
        .map(|(position, _)| position)
        .collect();

    match matches.as_slice() {
        [] => bail!("Item not found: {}", id),
        [position] => Ok(*position),
        _ => bail!("Ambiguous id prefix '{}' matches {} items", id, matches.len()),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::{self, Write};

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
