// ABOUTME: A placed rectangle of cells on a grid.
// ABOUTME: Either empty (always 1x1) or filled with one opaque payload.

use crate::geometry::{Area, Cell};
use crate::grid::GridId;

/// Handle to a region. Only valid for the grid that issued it, and only
/// until that region is absorbed by a merge or replaced by a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u64);

#[derive(Debug, Clone)]
pub struct Region<P> {
    id: RegionId,
    grid: GridId,
    area: Area,
    payload: Option<P>,
}

impl<P> Region<P> {
    pub(crate) fn empty(id: RegionId, grid: GridId, cell: Cell) -> Self {
        Self {
            id,
            grid,
            area: Area::new(cell, 1, 1),
            payload: None,
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Grid that owns this region
    pub fn grid(&self) -> GridId {
        self.grid
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn anchor(&self) -> Cell {
        self.area.anchor
    }

    pub fn row_span(&self) -> usize {
        self.area.row_span
    }

    pub fn column_span(&self) -> usize {
        self.area.column_span
    }

    pub fn is_filled(&self) -> bool {
        self.payload.is_some()
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.area.contains(cell)
    }

    /// Every cell this region covers
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        self.area.cells()
    }

    pub(crate) fn set_area(&mut self, area: Area) {
        self.area = area;
    }

    pub(crate) fn fill(&mut self, payload: P) {
        self.payload = Some(payload);
    }

    pub(crate) fn into_payload(self) -> Option<P> {
        self.payload
    }
}
