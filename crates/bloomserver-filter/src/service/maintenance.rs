//! Offline filter maintenance
//!
//! Create, fill and inspect filter files. None of this is safe to run
//! against a file that a live server or another maintenance run is using;
//! the last complete save wins.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapters::{FilterStore, HEADER_LEN};
use crate::domain::{estimate_parameters, BloomFilter, FilterParameters};
use crate::error::{FilterError, StoreError};

/// Result of sizing a filter ahead of time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterEstimate {
    pub params: FilterParameters,
    /// Size of the filter file, header included
    pub file_size_bytes: u64,
}

impl FilterEstimate {
    /// File size in binary units, e.g. `1.1 MiB`
    pub fn human_file_size(&self) -> String {
        format_binary_size(self.file_size_bytes)
    }
}

/// Size a filter for `n` expected entries at false positive rate `p`
pub fn estimate(n: u64, p: f64) -> Result<FilterEstimate, FilterError> {
    let params = estimate_parameters(n, p)?;
    Ok(FilterEstimate {
        params,
        file_size_bytes: HEADER_LEN as u64 + params.byte_len(),
    })
}

/// Maintenance operations on one filter file
#[derive(Clone, Debug)]
pub struct FilterMaintenance {
    path: PathBuf,
}

impl FilterMaintenance {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a new, empty filter, replacing any existing file
    pub fn create(&self, m: u64, k: u64) -> Result<FilterParameters, FilterError> {
        let filter = BloomFilter::new(m, k)?;
        FilterStore::save_to_path(&filter, &self.path)?;

        info!(path = %self.path.display(), m, k, "created empty filter");
        Ok(filter.parameters())
    }

    /// Insert `words` into the existing filter and save it
    ///
    /// Returns the number of words inserted.
    pub fn insert_words<I, W>(&self, words: I) -> Result<u64, FilterError>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<[u8]>,
    {
        let mut filter = FilterStore::load_from_path(&self.path)?;
        let mut count = 0u64;
        for word in words {
            filter.insert(word.as_ref());
            count += 1;
        }
        FilterStore::save_to_path(&filter, &self.path)?;

        info!(path = %self.path.display(), count, "inserted words");
        Ok(count)
    }

    /// Insert every line of a newline-separated word list
    ///
    /// Lines are inserted as raw bytes with the line ending removed. A read
    /// error aborts before anything is saved.
    pub fn insert_word_list<R: BufRead>(&self, reader: R) -> Result<u64, FilterError> {
        let mut filter = FilterStore::load_from_path(&self.path)?;
        let mut count = 0u64;
        for line in reader.split(b'\n') {
            let mut word = line.map_err(StoreError::io("reading word list"))?;
            if word.last() == Some(&b'\r') {
                word.pop();
            }
            filter.insert(&word);
            count += 1;
        }
        FilterStore::save_to_path(&filter, &self.path)?;

        info!(path = %self.path.display(), count, "inserted word list");
        Ok(count)
    }

    /// Parameters of the existing filter
    pub fn show(&self) -> Result<FilterParameters, FilterError> {
        Ok(FilterStore::load_from_path(&self.path)?.parameters())
    }
}

fn format_binary_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.1}", value);
    let rounded = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{} {}", rounded, UNITS[unit])
}
