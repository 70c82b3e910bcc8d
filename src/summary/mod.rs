//! Session summarization
//!
//! Turns a finalized record store into its derived artifacts: a statistics
//! text file and a two-view PNG figure, both placed alongside the store. The
//! store itself is read-only input here; summarization can run for any
//! finalized store, not only the one the panel just closed.
//!
//! # Main Types
//!
//! - [`SessionArtifacts`]: the paths and statistics produced for one session
//! - [`SummaryStats`]: descriptive statistics over the readings
//! - [`HistogramBin`]: one bin of the figure's distribution view

pub mod figure;
pub mod stats;

pub use figure::{histogram, HistogramBin, DEFAULT_BIN_COUNT};
pub use stats::SummaryStats;

use crate::error::{PanelError, Result};
use crate::recorder::RecordStore;
use std::path::{Path, PathBuf};

/// Artifacts produced by summarizing one session
#[derive(Debug, Clone)]
pub struct SessionArtifacts {
    /// The record store the summary was computed from
    pub store_path: PathBuf,
    /// Rendered two-view figure
    pub figure_path: PathBuf,
    /// Human-readable statistics file
    pub stats_path: PathBuf,
    /// The computed statistics
    pub stats: SummaryStats,
}

/// Summarize a finalized record store
///
/// Reads the store back, computes statistics, writes the `<stem>_stats.txt`
/// report next to it, and renders the `<stem>.png` figure. Fails with
/// [`PanelError::EmptySession`] when the store is missing or holds no data
/// rows; no artifact is written in that case.
pub fn summarize(store_path: &Path, bin_count: usize) -> Result<SessionArtifacts> {
    let samples = RecordStore::read_samples(store_path)?;
    if samples.is_empty() {
        return Err(PanelError::EmptySession(store_path.display().to_string()));
    }

    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    let stats = SummaryStats::compute(&values).ok_or_else(|| {
        PanelError::EmptySession(store_path.display().to_string())
    })?;

    let stats_path = stats_path_for(store_path);
    std::fs::write(&stats_path, stats.render_report())?;
    tracing::info!("Statistics saved to {}", stats_path.display());

    let figure_path = store_path.with_extension("png");
    figure::render(&figure_path, &samples, bin_count)?;

    Ok(SessionArtifacts {
        store_path: store_path.to_path_buf(),
        figure_path,
        stats_path,
        stats,
    })
}

/// Statistics file path for a store: `<stem>_stats.txt` in the same directory
fn stats_path_for(store_path: &Path) -> PathBuf {
    let stem = store_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session".to_string());
    store_path.with_file_name(format!("{}_stats.txt", stem))
}
