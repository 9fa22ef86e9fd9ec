//! Feature binning for histogram-based tree growth.
//!
//! Each feature is cut into at most `max_bins` bins. With few distinct values
//! every gap between neighbours gets its own edge; otherwise edges are taken
//! at evenly spaced ranks of the distinct values. Edges are always midpoints
//! between two distinct training values, so `bin(x) <= j` holds exactly when
//! `x <= edges[j]`.

use ndarray::ArrayView2;

/// Column-major bin indices of a training matrix plus the cut points.
#[derive(Debug, Clone)]
pub(crate) struct BinnedMatrix {
    n_rows: usize,
    bins: Vec<u8>,
    edges: Vec<Vec<f64>>,
}

impl BinnedMatrix {
    /// Bin every column of `x`. `max_bins` must be in `2..=255`.
    pub(crate) fn from_matrix(x: ArrayView2<'_, f64>, max_bins: usize) -> Self {
        let (n_rows, n_features) = x.dim();
        let mut bins = Vec::with_capacity(n_rows * n_features);
        let mut edges = Vec::with_capacity(n_features);

        for column in x.columns() {
            let cuts = cut_points(column.iter().copied(), max_bins);
            bins.extend(column.iter().map(|&v| bin_of(&cuts, v)));
            edges.push(cuts);
        }

        Self {
            n_rows,
            bins,
            edges,
        }
    }

    #[inline]
    pub(crate) fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub(crate) fn n_features(&self) -> usize {
        self.edges.len()
    }

    /// Number of bins used by `feature` (edges + 1).
    #[inline]
    pub(crate) fn n_bins(&self, feature: usize) -> usize {
        self.edges[feature].len() + 1
    }

    #[inline]
    pub(crate) fn edge(&self, feature: usize, bin: u8) -> f64 {
        self.edges[feature][bin as usize]
    }

    #[inline]
    pub(crate) fn column(&self, feature: usize) -> &[u8] {
        let start = feature * self.n_rows;
        &self.bins[start..start + self.n_rows]
    }

    #[inline]
    pub(crate) fn get(&self, row: usize, feature: usize) -> u8 {
        self.bins[feature * self.n_rows + row]
    }
}

/// Cut points for one feature, strictly increasing, at most `max_bins - 1`.
fn cut_points(values: impl Iterator<Item = f64>, max_bins: usize) -> Vec<f64> {
    let mut distinct: Vec<f64> = values.collect();
    distinct.sort_unstable_by(f64::total_cmp);
    distinct.dedup();

    if distinct.len() <= max_bins {
        return distinct
            .windows(2)
            .map(|pair| midpoint(pair[0], pair[1]))
            .collect();
    }

    let mut cuts: Vec<f64> = (1..max_bins)
        .map(|k| {
            let rank = k * distinct.len() / max_bins;
            midpoint(distinct[rank - 1], distinct[rank])
        })
        .collect();
    cuts.dedup();
    cuts
}

#[inline]
fn midpoint(low: f64, high: f64) -> f64 {
    low + (high - low) / 2.0
}

#[inline]
fn bin_of(cuts: &[f64], value: f64) -> u8 {
    cuts.partition_point(|&edge| edge < value) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_few_distinct_values_get_midpoints() {
        let cuts = cut_points([3.0, 1.0, 2.0, 1.0].into_iter(), 255);
        assert_eq!(cuts, vec![1.5, 2.5]);
    }

    #[test]
    fn test_many_distinct_values_are_capped() {
        let cuts = cut_points((0..1000).map(f64::from), 16);
        assert_eq!(cuts.len(), 15);
        assert!(cuts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_bin_matches_threshold() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let binned = BinnedMatrix::from_matrix(x.view(), 255);

        for row in 0..binned.n_rows() {
            let value = x[[row, 0]];
            for bin in 0..binned.n_bins(0) - 1 {
                let left = binned.get(row, 0) <= bin as u8;
                assert_eq!(left, value <= binned.edge(0, bin as u8));
            }
        }
    }

    #[test]
    fn test_constant_feature_has_one_bin() {
        let x = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let binned = BinnedMatrix::from_matrix(x.view(), 255);
        assert_eq!(binned.n_features(), 2);
        assert_eq!(binned.n_bins(1), 1);
        assert_eq!(binned.column(1), &[0u8, 0, 0]);
        assert_eq!(binned.column(0), &[0u8, 1, 2]);
    }
}
