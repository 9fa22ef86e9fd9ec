//! Histogram-based regression tree shared by the forest and boosting models.
//!
//! Growth works on a [`BinnedMatrix`]: for every open node the per-bin target
//! sums and counts are accumulated for each feature, and the split maximising
//!
//! ```text
//! gain = G_L² / (n_L + λ) + G_R² / (n_R + λ) - G² / (n + λ)
//! ```
//!
//! is taken, where `G` is the sum of the targets reaching a node. Leaves
//! predict `G / (n + λ)`. With `λ = 0` this is the usual variance-reduction
//! CART; with `λ > 0` it is the regularised leaf of gradient boosting on
//! squared loss.

use super::histogram::BinnedMatrix;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Relative gain below which a split is treated as rounding noise.
const GAIN_TOLERANCE: f64 = 1e-12;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub lambda: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            lambda: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        /// Rows with `x[feature] <= threshold` go left.
        threshold: f64,
        /// Bin index of `threshold` in the training binning.
        bin: u8,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct Task {
    node: usize,
    start: usize,
    end: usize,
    depth: usize,
}

struct Candidate {
    feature: usize,
    bin: u8,
    gain: f64,
}

/// Reusable per-feature histograms, laid out back to back.
struct Histograms {
    offsets: Vec<usize>,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl Histograms {
    fn new(binned: &BinnedMatrix) -> Self {
        let mut offsets = Vec::with_capacity(binned.n_features() + 1);
        let mut total = 0;
        for feature in 0..binned.n_features() {
            offsets.push(total);
            total += binned.n_bins(feature);
        }
        offsets.push(total);
        Self {
            offsets,
            sums: vec![0.0; total],
            counts: vec![0; total],
        }
    }

    fn range(&self, feature: usize) -> std::ops::Range<usize> {
        self.offsets[feature]..self.offsets[feature + 1]
    }
}

impl RegressionTree {
    /// Grow a tree on the rows listed in `rows` (repeats allowed).
    ///
    /// `rows` is reordered in place while partitioning.
    pub(crate) fn fit(
        binned: &BinnedMatrix,
        targets: ArrayView1<'_, f64>,
        rows: &mut [usize],
        params: &TreeParams,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut histograms = Histograms::new(binned);
        let mut stack = vec![Task {
            node: 0,
            start: 0,
            end: rows.len(),
            depth: 0,
        }];

        while let Some(task) = stack.pop() {
            let slice = &mut rows[task.start..task.end];
            let count = slice.len();
            let sum: f64 = slice.iter().map(|&r| targets[r]).sum();
            let leaf = Node::Leaf {
                value: leaf_value(sum, count, params.lambda),
            };

            let depth_reached = params.max_depth.is_some_and(|d| task.depth >= d);
            if depth_reached || count < params.min_samples_split || is_pure(slice, targets) {
                nodes[task.node] = leaf;
                continue;
            }

            let Some(best) = best_split(binned, targets, slice, sum, params, &mut histograms)
            else {
                nodes[task.node] = leaf;
                continue;
            };

            let column = binned.column(best.feature);
            let mid = partition(slice, |r| column[r] <= best.bin);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[task.node] = Node::Split {
                feature: best.feature,
                threshold: binned.edge(best.feature, best.bin),
                bin: best.bin,
                left,
                right,
            };

            stack.push(Task {
                node: right,
                start: task.start + mid,
                end: task.end,
                depth: task.depth + 1,
            });
            stack.push(Task {
                node: left,
                start: task.start,
                end: task.start + mid,
                depth: task.depth + 1,
            });
        }

        Self { nodes }
    }

    /// Predict one raw feature row.
    pub(crate) fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Predict a row of the matrix the tree was grown on.
    pub(crate) fn predict_binned(&self, binned: &BinnedMatrix, row: usize) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    bin,
                    left,
                    right,
                    ..
                } => {
                    index = if binned.get(row, *feature) <= *bin {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }
}

#[inline]
fn leaf_value(sum: f64, count: usize, lambda: f64) -> f64 {
    let denominator = count as f64 + lambda;
    if denominator > 0.0 { sum / denominator } else { 0.0 }
}

#[inline]
fn score(sum: f64, count: usize, lambda: f64) -> f64 {
    let denominator = count as f64 + lambda;
    if denominator > 0.0 {
        sum * sum / denominator
    } else {
        0.0
    }
}

fn is_pure(rows: &[usize], targets: ArrayView1<'_, f64>) -> bool {
    let first = targets[rows[0]];
    rows.iter().all(|&r| targets[r] == first)
}

fn best_split(
    binned: &BinnedMatrix,
    targets: ArrayView1<'_, f64>,
    rows: &[usize],
    sum: f64,
    params: &TreeParams,
    histograms: &mut Histograms,
) -> Option<Candidate> {
    let count = rows.len();
    let parent = score(sum, count, params.lambda);
    let tolerance = GAIN_TOLERANCE * parent.abs().max(1.0);
    let mut best: Option<Candidate> = None;

    for feature in 0..binned.n_features() {
        let range = histograms.range(feature);
        if range.len() < 2 {
            continue;
        }

        let sums = &mut histograms.sums[range.clone()];
        let counts = &mut histograms.counts[range];
        sums.fill(0.0);
        counts.fill(0);

        let column = binned.column(feature);
        for &r in rows {
            let bin = column[r] as usize;
            sums[bin] += targets[r];
            counts[bin] += 1;
        }

        let mut left_sum = 0.0;
        let mut left_count = 0;
        for bin in 0..sums.len() - 1 {
            left_sum += sums[bin];
            left_count += counts[bin];
            let right_count = count - left_count;

            if left_count < params.min_samples_leaf {
                continue;
            }
            if right_count < params.min_samples_leaf {
                break;
            }
            // Empty bins do not move the boundary.
            if counts[bin] == 0 {
                continue;
            }

            let gain = score(left_sum, left_count, params.lambda)
                + score(sum - left_sum, right_count, params.lambda)
                - parent;

            let improves = match &best {
                Some(current) => gain > current.gain,
                None => gain > tolerance,
            };
            if improves {
                best = Some(Candidate {
                    feature,
                    bin: bin as u8,
                    gain,
                });
            }
        }
    }

    best
}

/// In-place partition. Returns the number of rows for which
/// `goes_left` holds, which are moved to the front.
fn partition(rows: &mut [usize], goes_left: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..rows.len() {
        if goes_left(rows[i]) {
            rows.swap(i, mid);
            mid += 1;
        }
    }
    mid
}
