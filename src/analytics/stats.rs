//! Histogram binning and linear-interpolation quantiles.

use serde::Serialize;

/// Equal-width bins over the observed range. `edges` has `bin_count + 1`
/// entries, or none when there was no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bin_count: usize,
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn build(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let mut counts = vec![0usize; bins];
        let Some((mut lo, mut hi)) = min_max(values) else {
            return Self {
                bin_count: bins,
                edges: Vec::new(),
                counts,
            };
        };
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        edges[bins] = hi;

        for v in values {
            let idx = ((v - lo) / width).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }
        Self {
            bin_count: bins,
            edges,
            counts,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(values.iter().fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))))
}

/// Quantile of an ascending slice, interpolating linearly between ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.25), Some(1.75));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert_eq!(quantile(&v, 0.75), Some(3.25));
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn histogram_spans_observed_range() {
        let h = Histogram::build(&[0.0, 1.0, 5.0, 10.0], 10);
        assert_eq!(h.edges.len(), 11);
        assert_eq!(h.edges[0], 0.0);
        assert_eq!(h.edges[10], 10.0);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[1], 1);
        assert_eq!(h.counts[5], 1);
        // maximum lands in the last bin
        assert_eq!(h.counts[9], 1);
        assert_eq!(h.total(), 4);
    }

    #[test]
    fn single_value_widens_range() {
        let h = Histogram::build(&[3.0, 3.0], 2);
        assert_eq!(h.edges, vec![2.5, 3.0, 3.5]);
        assert_eq!(h.counts, vec![0, 2]);
    }

    #[test]
    fn empty_has_zero_counts() {
        let h = Histogram::build(&[], 10);
        assert_eq!(h.counts, vec![0; 10]);
        assert!(h.edges.is_empty());
    }
}
