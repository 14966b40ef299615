//! Append-only JSON-lines snapshots of collected reviews.
//!
//! Files are named `{app_id}_{country}_{YYYYMMDD}.jsonl` inside the data
//! directory. They are never read back.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use storelytics_core::RawReview;

use crate::error::AppStoreError;

/// Snapshot path for one app, storefront, and day.
#[must_use]
pub fn snapshot_path(dir: &Path, app_id: &str, country: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{app_id}_{country}_{}.jsonl", date.format("%Y%m%d")))
}

/// Appends one JSON line per review, creating `dir` and the file as needed.
///
/// # Errors
///
/// Returns [`AppStoreError::Snapshot`] if the directory or file cannot be
/// written.
pub fn append_snapshot(
    dir: &Path,
    app_id: &str,
    country: &str,
    date: NaiveDate,
    reviews: &[RawReview],
) -> Result<PathBuf, AppStoreError> {
    let path = snapshot_path(dir, app_id, country, date);
    let to_err = |source: io::Error| AppStoreError::Snapshot {
        path: path.display().to_string(),
        source,
    };

    fs::create_dir_all(dir).map_err(to_err)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(to_err)?;
    let mut writer = BufWriter::new(file);
    for review in reviews {
        serde_json::to_writer(&mut writer, review)
            .map_err(io::Error::from)
            .map_err(to_err)?;
        writer.write_all(b"\n").map_err(to_err)?;
    }
    writer.flush().map_err(to_err)?;

    tracing::debug!(path = %path.display(), count = reviews.len(), "review snapshot appended");
    Ok(path)
}
