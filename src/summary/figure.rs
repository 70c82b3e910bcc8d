//! Session figure rendering
//!
//! Draws the two-view session figure as a PNG: a value-over-time line series
//! on top and a value-distribution histogram below, both over the same
//! underlying readings. Binning is computed here so the figure is
//! deterministic for identical input; rendering text needs a font provider
//! the minimal bitmap backend does not carry, so the views are drawn without
//! captions.

use crate::error::{PanelError, Result};
use crate::types::Sample;
use plotters::prelude::*;
use std::path::Path;

/// Default number of histogram bins
pub const DEFAULT_BIN_COUNT: usize = 50;

/// Figure dimensions in pixels
const FIGURE_SIZE: (u32, u32) = (1200, 800);

/// One histogram bin over the value domain
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// Inclusive lower edge
    pub lo: f64,
    /// Exclusive upper edge (inclusive for the last bin)
    pub hi: f64,
    /// Number of readings falling in this bin
    pub count: usize,
}

/// Bin readings into `bin_count` equal-width bins across their value range
///
/// A degenerate range (all readings equal) is widened by half a unit on each
/// side so every reading still lands in a bin.
pub fn histogram(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lo: lo + i as f64 * width,
            hi: lo + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for &v in values {
        let index = (((v - lo) / width) as usize).min(bin_count - 1);
        bins[index].count += 1;
    }

    bins
}

/// Render the two-view session figure to `path`
pub fn render(path: &Path, samples: &[Sample], bin_count: usize) -> Result<()> {
    if samples.is_empty() {
        return Err(PanelError::EmptySession(path.display().to_string()));
    }

    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    let bins = histogram(&values, bin_count);

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(to_figure_error)?;
    let (upper, lower) = root.split_vertically(FIGURE_SIZE.1 / 2);

    draw_time_series(&upper, samples, &values)?;
    draw_histogram(&lower, &bins)?;

    root.present().map_err(to_figure_error)?;
    tracing::info!("Session figure saved to {}", path.display());
    Ok(())
}

fn draw_time_series<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    samples: &[Sample],
    values: &[f64],
) -> Result<()> {
    let t0 = samples[0].timestamp;
    let elapsed: Vec<f64> = samples
        .iter()
        .map(|s| (s.timestamp - t0).num_milliseconds() as f64 / 1000.0)
        .collect();

    let x_max = elapsed.last().copied().unwrap_or(0.0).max(1.0);
    let (y_lo, y_hi) = padded_range(values);

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_max, y_lo..y_hi)
        .map_err(to_figure_error)?;

    chart
        .draw_series(LineSeries::new(
            elapsed.iter().copied().zip(values.iter().copied()),
            &BLUE,
        ))
        .map_err(to_figure_error)?;

    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    bins: &[HistogramBin],
) -> Result<()> {
    let x_lo = bins.first().map(|b| b.lo).unwrap_or(0.0);
    let x_hi = bins.last().map(|b| b.hi).unwrap_or(1.0);
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(1).max(1);

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, 0usize..(y_max + 1))
        .map_err(to_figure_error)?;

    chart
        .draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
            Rectangle::new([(b.lo, 0), (b.hi, b.count)], GREEN.mix(0.7).filled())
        }))
        .map_err(to_figure_error)?;

    Ok(())
}

/// Value range padded so a flat series still spans a drawable band
fn padded_range(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn to_figure_error(e: impl std::fmt::Display) -> PanelError {
    PanelError::Figure(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_histogram_counts_sum_to_n() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = histogram(&values, 50);
        assert_eq!(bins.len(), 50);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
    }

    #[test]
    fn test_histogram_edges_cover_range() {
        let bins = histogram(&[1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(bins.first().unwrap().lo, 1.0);
        assert_eq!(bins.last().unwrap().hi, 4.0);
        // The maximum value lands in the last bin, not past it
        assert_eq!(bins.last().unwrap().count, 1);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let bins = histogram(&[5.0, 5.0, 5.0], 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        assert!(bins.first().unwrap().lo < 5.0);
        assert!(bins.last().unwrap().hi > 5.0);
    }

    #[test]
    fn test_histogram_empty_input() {
        assert!(histogram(&[], 50).is_empty());
        assert!(histogram(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_histogram_is_deterministic() {
        let values = [3.1, 4.1, 5.9, 2.6, 5.3];
        assert_eq!(histogram(&values, 10), histogram(&values, 10));
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.png");
        let samples: Vec<Sample> = (0..20).map(|i| Sample::now(i as f64)).collect();

        render(&path, &samples, DEFAULT_BIN_COUNT).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_render_empty_session_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let err = render(&path, &[], DEFAULT_BIN_COUNT).unwrap_err();
        assert!(matches!(err, PanelError::EmptySession(_)));
    }
}
