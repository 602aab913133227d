use crate::spaces::ClassifiedPoints;

/// Cell count and share of the grid for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    /// Fraction of all cells, 0.0..=1.0.
    pub share: f64,
}

/// Compute per-label cell counts and shares, in code order.
pub fn label_shares(points: &ClassifiedPoints) -> Vec<LabelShare> {
    let total = points.rows * points.cols;
    points
        .labels
        .iter()
        .map(|entry| LabelShare {
            label: entry.label.clone(),
            count: entry.points.len(),
            share: if total == 0 {
                0.0
            } else {
                entry.points.len() as f64 / total as f64
            },
        })
        .collect()
}

/// Plot bounds `[min, max]` padded by half a cell so edge points stay visible.
pub fn axis_bounds(cells: usize) -> [f64; 2] {
    [-0.5, cells.max(1) as f64 - 0.5]
}
