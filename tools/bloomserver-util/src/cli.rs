//! Command definitions and dispatch.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bloomserver_filter::{estimate, FilterMaintenance};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bloomserver-util", version)]
#[command(about = "Create, fill and inspect bloomserver filter files")]
pub struct Cli {
    /// Path to the bloom filter file
    #[arg(long, global = true, env = "BLOOMSERVER_FILTER_FILE")]
    pub bloom_filter_file: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a new empty filter with M bits and K hash functions
    Create {
        /// Number of bits
        m: u64,
        /// Number of hash functions
        k: u64,
    },
    /// Add every line of a word-list file to the filter
    Add {
        /// Newline-separated word list
        word_list_file: PathBuf,
    },
    /// Add the given words to the filter
    AddWords {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Print M, K and the file size for N entries at false positive rate P
    Estimate {
        /// Expected number of entries
        n: u64,
        /// Acceptable false positive rate, between 0 and 1
        p: f64,
    },
    /// Print the parameters of the filter file
    Show,
}

impl Cli {
    fn maintenance(&self) -> Result<FilterMaintenance> {
        let path = self
            .bloom_filter_file
            .as_ref()
            .context("must provide a value for --bloom-filter-file")?;
        Ok(FilterMaintenance::new(path))
    }
}

/// Run one command, writing its report to `out`
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Command::Create { m, k } => {
            let maintenance = cli.maintenance()?;
            let params = maintenance
                .create(*m, *k)
                .with_context(|| format!("could not create {}", maintenance.path().display()))?;
            writeln!(out, "{}: {}", maintenance.path().display(), params)?;
        }
        Command::Add { word_list_file } => {
            let maintenance = cli.maintenance()?;
            let reader = open_word_list(word_list_file)?;
            let count = maintenance.insert_word_list(reader).with_context(|| {
                format!(
                    "could not add {} to {}",
                    word_list_file.display(),
                    maintenance.path().display()
                )
            })?;
            writeln!(out, "added {} words", count)?;
        }
        Command::AddWords { words } => {
            let maintenance = cli.maintenance()?;
            let count = maintenance
                .insert_words(words)
                .with_context(|| format!("could not update {}", maintenance.path().display()))?;
            writeln!(out, "added {} words", count)?;
        }
        Command::Estimate { n, p } => {
            let estimate = estimate(*n, *p).context("could not estimate parameters")?;
            writeln!(
                out,
                "M (number of bits): {} (~{}), K (number of hash functions): {}",
                estimate.params.m,
                estimate.human_file_size(),
                estimate.params.k
            )?;
        }
        Command::Show => {
            let maintenance = cli.maintenance()?;
            let params = maintenance
                .show()
                .with_context(|| format!("could not read {}", maintenance.path().display()))?;
            writeln!(out, "{}: {}", maintenance.path().display(), params)?;
        }
    }
    Ok(())
}

fn open_word_list(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open word-list file {}", path.display()))?;
    Ok(BufReader::new(file))
}
