//! Output formatting and persistence for normalized catalogs.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::normalize::NormalizedAsteroid;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Response body for a feed query: a count plus the list.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub count: usize,
    pub asteroids: Vec<NormalizedAsteroid>,
}

impl FeedResponse {
    pub fn new(asteroids: Vec<NormalizedAsteroid>) -> Self {
        Self {
            count: asteroids.len(),
            asteroids,
        }
    }
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Writes a value as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(mut writer: W, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Appends one CSV row per asteroid.
///
/// Creates the file if needed and writes headers only into an empty file.
pub fn append_records(path: &str, asteroids: &[NormalizedAsteroid]) -> Result<()> {
    // A file left empty by an earlier zero-row append still needs a header.
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    debug!(path, needs_header, rows = asteroids.len(), "Appending CSV records");

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);

    for asteroid in asteroids {
        writer.serialize(asteroid)?;
    }
    writer.flush()?;

    Ok(())
}
