//! Input loading for the runner.
//!
//! - Basket CSV: `ticker, weight` plus an optional `name` column
//! - Market CSV: `ticker, spot, atm_vol, div_yield`
//! - JSON documents (trade, market, request, result) via serde
//!
//! Headers are matched after trimming and lower-casing, so `" Ticker "` and
//! `ticker` are the same column. Column order does not matter.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors from reading or writing run inputs and outputs.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("{path}: {source}")]
    Fs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: file is empty")]
    Empty { path: PathBuf },
    #[error("{path}: missing columns {missing:?}")]
    MissingColumns { path: PathBuf, missing: Vec<String> },
    #[error("{path}: row {row}: {column} is not a number ({value:?})")]
    InvalidNumber {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
}

/// One row of the basket file.
#[derive(Debug, Clone, PartialEq)]
pub struct BasketRow {
    pub ticker: String,
    pub weight: f64,
    pub name: Option<String>,
}

/// One row of the market file, as written (no percentage normalization yet).
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRow {
    pub ticker: String,
    pub spot: f64,
    pub atm_vol: f64,
    pub div_yield: f64,
}

/// Values above 2 are read as percentages: `20` means `0.20`.
pub fn normalize_rate_col(value: f64) -> f64 {
    if value > 2.0 {
        value / 100.0
    } else {
        value
    }
}

// ─── CSV ────────────────────────────────────────────────────────────

/// A CSV table with normalized headers.
struct Table {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    fn read(path: &Path) -> Result<Self, IoError> {
        let file = File::open(path).map_err(|source| IoError::Fs {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let csv_err = |source| IoError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        if headers.iter().all(|h| h.is_empty()) || rows.is_empty() {
            return Err(IoError::Empty {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    fn require(&self, columns: &[&str]) -> Result<Vec<usize>, IoError> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| !self.headers.iter().any(|h| h == *c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IoError::MissingColumns {
                path: self.path.clone(),
                missing,
            });
        }
        Ok(columns.iter().filter_map(|c| self.column(c)).collect())
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn text<'a>(&self, record: &'a StringRecord, col: usize) -> &'a str {
        record.get(col).unwrap_or("")
    }

    fn number(&self, record: &StringRecord, row: usize, col: usize) -> Result<f64, IoError> {
        let raw = self.text(record, col);
        raw.parse::<f64>().map_err(|_| IoError::InvalidNumber {
            path: self.path.clone(),
            // 1-based, counting the header line.
            row: row + 2,
            column: self.headers[col].clone(),
            value: raw.to_string(),
        })
    }
}

/// Read the basket constituents file.
pub fn read_basket_csv(path: &Path) -> Result<Vec<BasketRow>, IoError> {
    let table = Table::read(path)?;
    let cols = table.require(&["ticker", "weight"])?;
    let (ticker, weight) = (cols[0], cols[1]);
    let name = table.column("name");

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Ok(BasketRow {
                ticker: table.text(r, ticker).to_string(),
                weight: table.number(r, i, weight)?,
                name: name
                    .map(|c| table.text(r, c))
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Read the market snapshot file.
pub fn read_market_csv(path: &Path) -> Result<Vec<MarketRow>, IoError> {
    let table = Table::read(path)?;
    let cols = table.require(&["ticker", "spot", "atm_vol", "div_yield"])?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Ok(MarketRow {
                ticker: table.text(r, cols[0]).to_string(),
                spot: table.number(r, i, cols[1])?,
                atm_vol: table.number(r, i, cols[2])?,
                div_yield: table.number(r, i, cols[3])?,
            })
        })
        .collect()
}

fn create_parent(path: &Path) -> Result<(), IoError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| IoError::Fs {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Write a header row followed by `rows`, creating the parent directory.
pub fn write_csv(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> Result<(), IoError> {
    create_parent(path)?;
    let csv_err = |source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(headers).map_err(csv_err)?;
    for row in rows {
        writer.write_record(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| IoError::Fs {
        path: path.to_path_buf(),
        source,
    })
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let mut content = String::new();
    File::open(path)
        .and_then(|mut f| f.read_to_string(&mut content))
        .map_err(|source| IoError::Fs {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-printed JSON, creating the parent directory.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IoError> {
    create_parent(path)?;
    let file = File::create(path).map_err(|source| IoError::Fs {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| IoError::Fs {
        path: path.to_path_buf(),
        source,
    })
}
