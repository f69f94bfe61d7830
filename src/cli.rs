// Copyright 2026-present Malte Kjellberg
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the jot command-line interface.
//!
//! Five subcommands: `index` rebuilds the store from every note,
//! `update` folds in a single edited note, `search` runs a boolean
//! query, `tag` lists the notes under a tag, and `inspect` shows the
//! on-disk layout of the term archive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jot",
    about = "Index and search a directory of notes",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the term archive and catalog from every note
    Index {
        /// Directory of notes (.md files, searched recursively)
        #[arg(short, long)]
        notes: PathBuf,

        /// Directory holding index.tsar and index.json
        #[arg(short, long, default_value = ".")]
        store: PathBuf,
    },

    /// Re-index a single edited or created note
    Update {
        /// Path to the note file
        file: PathBuf,

        #[arg(short, long, default_value = ".")]
        store: PathBuf,
    },

    /// Search notes with a boolean query
    ///
    /// Literals match whole words, case-insensitively. A trailing `:*`
    /// makes a literal a prefix match. Combine with `&` and `|`
    /// (OR binds loosest); parentheses group.
    Search {
        /// Query, e.g. '(tea | coffee) & meeting:*'
        query: String,

        #[arg(short, long, default_value = ".")]
        store: PathBuf,

        /// Maximum number of notes to list
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Result rows to skip before listing
        #[arg(short, long, default_value = "0")]
        offset: usize,
    },

    /// List notes carrying a tag
    Tag {
        /// Tag name, without the leading '#'
        tag: String,

        #[arg(short, long, default_value = ".")]
        store: PathBuf,
    },

    /// Show the on-disk layout of the term archive
    Inspect {
        #[arg(short, long, default_value = ".")]
        store: PathBuf,
    },
}
