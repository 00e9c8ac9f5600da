//! Binary sum tree over per-process propensities.
//!
//! Leaves hold the cached rate of each process; every internal node holds
//! the sum of its children, so the root is the total propensity. Updating
//! one leaf and selecting a channel are both O(log N). Internal sums are
//! recomputed from children on every update, never accumulated, so there
//! is no drift across long runs.

#[derive(Clone, Debug)]
pub(crate) struct PropensityTree {
    len: usize,
    leaf_count: usize,
    data: Vec<f64>,
}

impl PropensityTree {
    pub(crate) fn new(len: usize) -> Self {
        let leaf_count = len.max(1).next_power_of_two();
        Self {
            len,
            leaf_count,
            data: vec![0.0; leaf_count * 2],
        }
    }

    pub(crate) fn rebuild(&mut self, values: &[f64]) {
        debug_assert_eq!(values.len(), self.len);
        self.data.fill(0.0);
        self.data[self.leaf_count..self.leaf_count + values.len()].copy_from_slice(values);
        for node in (1..self.leaf_count).rev() {
            self.data[node] = self.data[node << 1] + self.data[(node << 1) | 1];
        }
    }

    pub(crate) fn total(&self) -> f64 {
        self.data[1]
    }

    pub(crate) fn leaves(&self) -> &[f64] {
        &self.data[self.leaf_count..self.leaf_count + self.len]
    }

    pub(crate) fn update(&mut self, idx: usize, value: f64) {
        debug_assert!(idx < self.len);
        let mut pos = self.leaf_count + idx;
        self.data[pos] = value;
        while pos > 1 {
            pos >>= 1;
            self.data[pos] = self.data[pos << 1] + self.data[(pos << 1) | 1];
        }
    }

    /// Leaf whose half-open cumulative interval contains `target`.
    ///
    /// Requires `total() > 0`. Descends only into subtrees with a positive
    /// sum, so a zero-rate leaf is never returned even when rounding pushes
    /// `target` to the upper edge.
    pub(crate) fn select(&self, mut target: f64) -> usize {
        debug_assert!(self.total() > 0.0);
        let mut node = 1usize;
        while node < self.leaf_count {
            let left = self.data[node << 1];
            let right = self.data[(node << 1) | 1];
            if target < left || right <= 0.0 {
                node <<= 1;
            } else {
                target -= left;
                node = (node << 1) | 1;
            }
        }
        (node - self.leaf_count).min(self.len.saturating_sub(1))
    }
}
