//! Weighted round-robin scheduling across slaves.

/// A precomputed cycle of slave indices.
///
/// Over one cycle, index `i` appears exactly `weights[i]` times. The cycle is
/// built with smooth weighted round robin, with one extra rule: an index is
/// never chosen twice in a row while any other index still has weight
/// remaining in the cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    order: Vec<usize>,
}

impl Schedule {
    /// Builds one cycle, holding `weights.iter().sum()` entries.
    ///
    /// Nodes bound the sum by [crate::node::MAX_TOTAL_WEIGHT] before building
    /// a schedule.
    pub fn new(weights: &[usize]) -> Self {
        let total: usize = weights.iter().sum();
        let mut order = Vec::with_capacity(total);

        // Smooth weighted round robin: every step, each index gains its
        // weight, and the chosen index pays back the total.
        let mut current = vec![0i64; weights.len()];
        let mut remaining = weights.to_vec();
        let mut previous = None;

        for _ in 0..total {
            for (current, weight) in current.iter_mut().zip(weights) {
                *current += *weight as i64;
            }

            let others_remaining = remaining
                .iter()
                .enumerate()
                .any(|(i, left)| *left > 0 && Some(i) != previous);

            let mut chosen: Option<usize> = None;
            for (i, left) in remaining.iter().enumerate() {
                if *left == 0 || (others_remaining && Some(i) == previous) {
                    continue;
                }
                // Strictly greater, so ties resolve in configuration order.
                if chosen.map_or(true, |c| current[i] > current[c]) {
                    chosen = Some(i);
                }
            }

            let Some(chosen) = chosen else {
                break;
            };
            current[chosen] -= total as i64;
            remaining[chosen] -= 1;
            order.push(chosen);
            previous = Some(chosen);
        }

        Self { order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the slave index at `position` in the cycle.
    pub fn get(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }
}
