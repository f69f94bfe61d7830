// Copyright 2026-present Malte Kjellberg
// SPDX-License-Identifier: Apache-2.0

//! jot CLI: index, update, search, and inspect a note store.
//!
//! ```bash
//! # Build the index files from a directory of notes
//! jot index --notes ~/notes --store ~/notes/.jot
//!
//! # Boolean search (quote the query from your shell)
//! jot search 'meeting & (tea | coffee:*)' --store ~/notes/.jot
//!
//! # Fold one edited note back in
//! jot update ~/notes/2026/08/2026-08-01_Saturday.md --store ~/notes/.jot
//! ```
//!
//! Set `RUST_LOG=jot=debug` for indexing diagnostics on stderr.

use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jot::indexer;
use jot::tsar::{Entry, Index, CHECKPOINT_SIZE};

mod cli;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Index { notes, store } => {
            let count = indexer::reindex(&notes, &store)
                .with_context(|| format!("indexing {}", notes.display()))?;
            println!("indexed {count} notes");
        }

        Commands::Update { file, store } => {
            let id = indexer::update_note(&file, &store)
                .with_context(|| format!("updating {}", file.display()))?;
            println!("updated {} (id {id})", file.display());
        }

        Commands::Search {
            query,
            store,
            limit,
            offset,
        } => {
            let ids = indexer::search(&store, &query)?;
            let catalog = indexer::load_catalog(&store)?;
            if ids.is_empty() {
                println!("no entries");
                return Ok(());
            }
            for id in ids.iter().skip(offset).take(limit) {
                match catalog.name_of(*id) {
                    Some(name) => println!("{name}"),
                    None => println!("<unknown note {id}>"),
                }
            }
        }

        Commands::Tag { tag, store } => {
            let catalog = indexer::load_catalog(&store)?;
            let ids = catalog.ids_for_tag(&tag);
            if ids.is_empty() {
                println!("no entries");
                return Ok(());
            }
            for &id in ids {
                if let Some(name) = catalog.name_of(id) {
                    println!("{name}");
                }
            }
        }

        Commands::Inspect { store } => {
            let path = store.join(indexer::INDEX_FILE);
            let data = fs::read(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let index = Index::unmarshal(&data).context("archive is corrupt")?;

            let entries = index.entries();
            let pointers: usize = entries.iter().map(|e| e.pointers.len()).sum();
            let header = 4 + index.checkpoints().len() * CHECKPOINT_SIZE;
            let body: u32 = entries.iter().map(Entry::encoded_len).sum();

            println!("{}", path.display());
            println!("  file size    {} bytes", data.len());
            println!("  header       {header} bytes ({} checkpoints)", index.checkpoints().len());
            println!("  entries      {} ({body} bytes, {pointers} pointers)", entries.len());
            if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
                println!("  key range    {} .. {}", first.key, last.key);
            }
        }
    }
    Ok(())
}
