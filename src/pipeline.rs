//! Sequential fetch → save → extract loop over a PMCID list.
//!
//! Every request is preceded by a throttle wait, failed or not. A PMCID that
//! fails is logged and counted; the loop moves on to the next one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info};

use crate::extract::CoordinateExtractor;
use crate::fetcher::{article_url, PageFetcher};
use crate::pmcids::Pmcid;
use crate::store;
use crate::throttle::{Sleeper, ThreadSleeper, Throttle};

/// Counts returned after completion.
#[derive(Debug)]
pub struct RunSummary {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
    pub coordinates: usize,
    pub articles: usize,
    pub merged: PathBuf,
}

pub struct Pipeline<F, E, S = ThreadSleeper> {
    fetcher: F,
    extractor: E,
    throttle: Throttle<S>,
    url_template: String,
    show_progress: bool,
}

impl<F: PageFetcher, E: CoordinateExtractor, S: Sleeper> Pipeline<F, E, S> {
    pub fn new(fetcher: F, extractor: E, throttle: Throttle<S>, url_template: &str) -> Self {
        Pipeline {
            fetcher,
            extractor,
            throttle,
            url_template: url_template.to_string(),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn run(&mut self, pmcids: &[Pmcid], output_dir: &Path) -> Result<RunSummary> {
        store::ensure_dir(output_dir)?;
        info!("Collecting data for {} PMCIDs", pmcids.len());
        info!("Storing results in {:?}", output_dir);

        let pb = self.progress_bar(pmcids.len())?;
        let mut coords_files = Vec::new();
        let mut errors = 0usize;

        for (idx, pmcid) in pmcids.iter().enumerate() {
            match self.process_one(pmcid, output_dir) {
                Ok(file) => coords_files.push(file),
                Err(e) => {
                    errors += 1;
                    error!("Failed to process PMCID {}: {:#}", pmcid, e);
                }
            }
            pb.inc(1);
            info!(
                "Processed {} / {} PMCIDs ({} errors)",
                idx + 1,
                pmcids.len(),
                errors
            );
        }
        pb.finish_and_clear();

        let merged = store::merged_path(output_dir);
        let stats = store::merge_coordinates(&coords_files, &merged)
            .context("Failed to merge coordinate files")?;
        let ok = pmcids.len() - errors;
        info!(
            "Found {} coordinates from {} articles ({} PMCIDs successfully processed, {} errors)",
            stats.coordinates, stats.articles, ok, errors
        );
        info!("Coordinates stored in {:?}", merged);

        Ok(RunSummary {
            total: pmcids.len(),
            ok,
            errors,
            coordinates: stats.coordinates,
            articles: stats.articles,
            merged,
        })
    }

    fn process_one(&mut self, pmcid: &Pmcid, output_dir: &Path) -> Result<PathBuf> {
        info!("Processing PMCID {}", pmcid);
        let url = article_url(&self.url_template, pmcid);

        self.throttle.wait();
        debug!("Downloading {}", url);
        let body = self.fetcher.fetch(&url)?;

        let page = store::article_path(output_dir, pmcid);
        store::write_page(&page, &body)?;
        debug!("Saved {} bytes to {:?}", body.len(), page);

        let coords = store::coordinates_path(output_dir, pmcid);
        self.extractor
            .extract(pmcid, &page, &coords)
            .with_context(|| format!("Coordinate extraction failed for {:?}", page))?;
        Ok(coords)
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")?
                .progress_chars("=> "),
        );
        Ok(pb)
    }

    #[cfg(test)]
    fn throttle(&self) -> &Throttle<S> {
        &self.throttle
    }
}

// ── Tests ──
