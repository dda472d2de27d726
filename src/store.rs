//! Output directory layout and CSV persistence.
//!
//! ```text
//! <output_dir>/
//!   pmcid_<id>_article.html      raw page as fetched
//!   pmcid_<id>_coordinates.csv   pmcid,table_id,x,y,z
//!   all_coordinates.csv          every successful article, in run order
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pmcids::Pmcid;

pub const MERGED_FILE: &str = "all_coordinates.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRow {
    pub pmcid: String,
    pub table_id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub struct MergeStats {
    pub coordinates: usize,
    pub articles: usize,
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {:?}", dir))
}

pub fn article_path(dir: &Path, pmcid: &Pmcid) -> PathBuf {
    dir.join(format!("pmcid_{}_article.html", pmcid))
}

pub fn coordinates_path(dir: &Path, pmcid: &Pmcid) -> PathBuf {
    dir.join(format!("pmcid_{}_coordinates.csv", pmcid))
}

pub fn merged_path(dir: &Path) -> PathBuf {
    dir.join(MERGED_FILE)
}

pub fn write_page(path: &Path, body: &[u8]) -> Result<()> {
    std::fs::write(path, body).with_context(|| format!("Failed to write {:?}", path))
}

pub fn write_coordinates(path: &Path, rows: &[CoordinateRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    if rows.is_empty() {
        // serde only emits the header alongside the first record
        wtr.write_record(["pmcid", "table_id", "x", "y", "z"])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_coordinates(path: &Path) -> Result<Vec<CoordinateRow>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;
    let rows = rdr
        .deserialize()
        .collect::<Result<Vec<CoordinateRow>, _>>()
        .with_context(|| format!("Malformed coordinates file {:?}", path))?;
    Ok(rows)
}

/// Concatenate per-article coordinate files into `dest`.
pub fn merge_coordinates(files: &[PathBuf], dest: &Path) -> Result<MergeStats> {
    let mut all = Vec::new();
    for file in files {
        all.extend(read_coordinates(file)?);
    }
    let articles = all
        .iter()
        .map(|r| r.pmcid.as_str())
        .collect::<HashSet<_>>()
        .len();
    write_coordinates(dest, &all)?;
    Ok(MergeStats {
        coordinates: all.len(),
        articles,
    })
}
