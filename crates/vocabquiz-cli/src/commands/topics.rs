//! The `vocabquiz topics` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde::Serialize;

use vocabquiz_core::traits::TopicStore;
use vocabquiz_providers::load_config_from;

#[derive(Serialize)]
struct TopicRow {
    source: &'static str,
    id: Option<String>,
    name: String,
    pairs: usize,
}

pub fn execute(
    config_path: Option<PathBuf>,
    topics_dir: Option<PathBuf>,
    store_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = super::load_catalog(topics_dir.as_deref(), &config)?;
    let store = super::open_store(store_path, &config);

    let mut rows: Vec<TopicRow> = catalog
        .list()
        .iter()
        .map(|t| TopicRow {
            source: "predefined",
            id: Some(t.id.clone()),
            name: t.name.clone(),
            pairs: t.pairs.len(),
        })
        .collect();

    match store.list_saved() {
        Ok(saved) => rows.extend(saved.into_iter().map(|t| TopicRow {
            source: "saved",
            id: None,
            name: t.name,
            pairs: t.pairs.len(),
        })),
        Err(e) => eprintln!("Saved topics unavailable: {e}"),
    }

    if json {
        let out = serde_json::to_string_pretty(&rows).context("failed to serialize topics")?;
        println!("{out}");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Source", "ID", "Name", "Pairs"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(row.source),
            Cell::new(row.id.as_deref().unwrap_or("-")),
            Cell::new(&row.name),
            Cell::new(row.pairs),
        ]);
    }
    println!("{table}");

    Ok(())
}
