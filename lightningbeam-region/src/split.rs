//! Positions on a component's outline

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::tolerance::param_almost_equal;

/// Stable identity of a split, assigned by whoever creates the split set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitId(pub u32);

impl SplitId {
    /// Identity for splits that do not belong to any split set
    pub const NONE: SplitId = SplitId(u32::MAX);
}

/// A location on a component: segment index plus curve parameter
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Split {
    pub index: usize,
    pub t: f64,
    pub point: Point,
    pub id: SplitId,
}

impl Split {
    pub fn new(index: usize, t: f64, point: Point) -> Self {
        Self {
            index,
            t,
            point,
            id: SplitId::NONE,
        }
    }

    /// Create a split, moving `t == 1` onto the start of the following segment
    pub fn normalized(index: usize, t: f64, point: Point, segment_count: usize) -> Self {
        if t >= 1.0 && segment_count > 0 {
            Self::new((index + 1) % segment_count, 0.0, point)
        } else {
            Self::new(index, t.max(0.0), point)
        }
    }

    pub fn with_id(mut self, id: SplitId) -> Self {
        self.id = id;
        self
    }

    /// Same split identity, or the same position within tolerance
    pub fn almost_equal(&self, other: &Split) -> bool {
        (self.id != SplitId::NONE && self.id == other.id)
            || (self.index == other.index && param_almost_equal(self.t, other.t))
    }

    /// Order along the outline: by segment index, then by parameter
    pub fn cmp_position(&self, other: &Split) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.t.total_cmp(&other.t))
    }
}
