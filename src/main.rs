//! Lintpad - shareable state core for an interactive lint playground
//!
//! Main entry point for the link-inspector CLI.
//!
//! # Overview
//!
//! This binary decodes the URL fragment of a shared playground link and
//! prints the configuration it would restore. It initializes:
//! - Logging infrastructure (file rotation, console output in debug mode)
//! - A [`StateStore`] layered over in-memory storage and the given fragment
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/lintpad.<date>
//! 2. Extract the fragment from the argument (full URLs are accepted)
//! 3. Build the store: defaults ← fragment overrides
//! 4. Print the effective configuration as pretty JSON
//! 5. Print the canonical re-encoding of that configuration
//!
//! # Usage
//!
//! ```text
//! lintpad [--debug] [FRAGMENT_OR_URL]
//! ```
//!
//! With no argument the starter configuration is shown. When a full URL is
//! pasted, everything up to and including the first `#` is ignored.

use anyhow::Result;
use lintpad::state::MemoryLocation;
use lintpad::storage::MemoryStorage;
use lintpad::{APP_NAME, ConfigModel, StateStore, VERSION};
use std::sync::Arc;

/// Main entry point for the lintpad link inspector
///
/// # Returns
///
/// - `Ok(())` if the link was inspected and printed
/// - `Err(_)` if initialization or serialization failed
///
/// # Errors
///
/// This function can fail if:
/// - Logging initialization fails (disk space, permissions)
/// - The effective configuration cannot be serialized
fn main() -> Result<()> {
    let mut debug_mode = false;
    let mut input: Option<String> = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--debug" => debug_mode = true,
            "--help" | "-h" => {
                println!("Usage: lintpad [--debug] [FRAGMENT_OR_URL]");
                println!();
                println!("Decodes a shared playground link and prints the");
                println!("configuration it restores, plus its canonical fragment.");
                return Ok(());
            }
            _ => input = Some(arg),
        }
    }

    // Console output only in debug mode so the JSON stays pipeable
    let _guard = lintpad::logging::setup_logging("logs", "lintpad", debug_mode, debug_mode)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // A full URL may be pasted; the fragment starts after the first '#'
    let fragment = match &input {
        Some(raw) => match raw.split_once('#') {
            Some((_, fragment)) => fragment.to_string(),
            None => raw.clone(),
        },
        None => String::new(),
    };

    tracing::info!("Inspecting fragment ({} bytes)", fragment.len());

    // Layer the fragment over the defaults the way the playground does at
    // startup; storage is empty so only the link contributes overrides
    let storage = Arc::new(MemoryStorage::new());
    let location = Arc::new(MemoryLocation::with_fragment(&fragment));
    let store = StateStore::new(ConfigModel::default(), storage, location);

    let config = store.snapshot();
    println!("{}", serde_json::to_string_pretty(&config)?);

    let canonical = store.canonical_fragment();
    println!();
    println!("canonical fragment:");
    println!("#{}", canonical);

    if !fragment.is_empty() && fragment != canonical {
        tracing::info!("input fragment was not canonical, re-encoded form differs");
    }

    store.metrics().log_summary();
    tracing::info!("Inspection complete");

    Ok(())
}
