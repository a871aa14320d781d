#![forbid(unsafe_code)]

//! Grid-cell geometry.
//!
//! The grid is a fixed number of columns wide ([`GRID_COLUMNS`]) and unbounded
//! in height. Every coordinate is measured in whole grid cells, origin at the
//! top-left corner.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Number of columns in the grid.
pub const GRID_COLUMNS: u16 = 12;

/// A rectangle of grid cells.
///
/// A rect with zero width or zero height is *degenerate*: the tile still
/// exists (so the renderer keeps a stable element for it) but is not shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridRect {
    /// Left column (inclusive).
    pub x: u16,
    /// Top row (inclusive).
    pub y: u16,
    /// Width in columns.
    pub w: u16,
    /// Height in rows.
    pub h: u16,
}

impl GridRect {
    /// The degenerate `(0, 0, 0, 0)` rect used for hidden tiles.
    pub const HIDDEN: Self = Self::new(0, 0, 0, 0);

    /// Create a new rect.
    #[inline]
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.w as u32 * self.h as u32
    }

    /// True when both dimensions are non-zero.
    #[inline]
    pub const fn is_visible(&self) -> bool {
        self.w > 0 && self.h > 0
    }

    /// True when the rect has no area.
    #[inline]
    pub const fn is_degenerate(&self) -> bool {
        !self.is_visible()
    }

    /// True when the rect fits inside the grid's column range.
    #[inline]
    pub const fn fits_columns(&self) -> bool {
        self.x as u32 + self.w as u32 <= GRID_COLUMNS as u32
    }

    /// Shrink the rect horizontally so it fits inside the grid's columns.
    ///
    /// Rects starting at or past the last column are moved to the last
    /// column with a width of one.
    #[must_use]
    pub fn clamp_to_columns(self) -> Self {
        if self.fits_columns() {
            return self;
        }
        let x = self.x.min(GRID_COLUMNS - 1);
        let w = self.w.min(GRID_COLUMNS - x).max(1);
        Self { x, w, ..self }
    }

    /// Check if two visible rects overlap.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.is_visible()
            && other.is_visible()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Visual reading order: top-to-bottom, then left-to-right.
    #[inline]
    pub fn reading_order(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl From<(u16, u16, u16, u16)> for GridRect {
    fn from((x, y, w, h): (u16, u16, u16, u16)) -> Self {
        Self::new(x, y, w, h)
    }
}
