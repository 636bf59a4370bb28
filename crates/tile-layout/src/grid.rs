// ABOUTME: Rows x columns partition of cells into regions.
// ABOUTME: Handles placement, removal, structural growth/shrink and cell geometry.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tile_core::{Color, ConfigError, Highlight, TileConfig};
use uuid::Uuid;

use crate::geometry::{span_extent, Area, Cell, Rect};
use crate::region::{Region, RegionId};

/// Identity of a grid, unique across the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridId(pub Uuid);

impl GridId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GridId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Notifications for the host, queued after the grid is consistent again
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent<P> {
    RegionResized {
        region: RegionId,
        payload: P,
        anchor: Cell,
        row_span: usize,
        column_span: usize,
    },
    RegionMoved {
        payload: P,
        origin: GridId,
        destination: GridId,
        from: Cell,
        to: Cell,
    },
    /// The payload should be laid out at this pixel size
    SizeRequested {
        region: RegionId,
        payload: P,
        height: u32,
        width: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Area at {cell:?} spanning {row_span}x{column_span} exceeds the {rows}x{columns} grid")]
    OutOfBounds {
        cell: Cell,
        row_span: usize,
        column_span: usize,
        rows: usize,
        columns: usize,
    },

    #[error("Area at {cell:?} spanning {row_span}x{column_span} overlaps a filled region")]
    Overlap {
        cell: Cell,
        row_span: usize,
        column_span: usize,
    },

    #[error("Region {0:?} is not tracked by this grid")]
    NotFound(RegionId),

    #[error("Region {0:?} holds no payload")]
    EmptyRegion(RegionId),

    #[error("Trailing {count} {axis} are not empty")]
    NonEmptyArea { axis: &'static str, count: usize },

    #[error("Resizing is disabled on this grid")]
    ResizeDisabled,

    #[error("Resize plan for region {0:?} no longer matches its geometry")]
    StalePlan(RegionId),

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Partition broken at {cell:?}: {reason}")]
    Corrupt { cell: Cell, reason: &'static str },
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    region: RegionId,
    highlight: Highlight,
}

#[derive(Debug)]
pub struct Grid<P> {
    id: GridId,
    rows: usize,
    columns: usize,
    config: TileConfig,
    slots: Vec<Vec<Slot>>,
    regions: HashMap<RegionId, Region<P>>,
    /// Filled regions in placement order
    placed: Vec<RegionId>,
    events: Vec<GridEvent<P>>,
    next_id: u64,
}

impl<P: Clone> Grid<P> {
    pub fn new(rows: usize, columns: usize, config: TileConfig) -> Result<Self, LayoutError> {
        if rows == 0 || columns == 0 {
            return Err(LayoutError::InvalidArgument("a grid needs at least one row and column"));
        }
        if let Err(ConfigError::Invalid(reason)) = config.validate() {
            return Err(LayoutError::InvalidArgument(reason));
        }

        let mut grid = Self {
            id: GridId::new(),
            rows,
            columns,
            config,
            slots: Vec::with_capacity(rows),
            regions: HashMap::new(),
            placed: Vec::new(),
            events: Vec::new(),
            next_id: 0,
        };
        for row in 0..rows {
            let slots = (0..columns)
                .map(|column| grid.fresh_slot(Cell::new(row, column)))
                .collect();
            grid.slots.push(slots);
        }
        tracing::debug!("Created grid {} with {}x{} cells", grid.id, rows, columns);
        Ok(grid)
    }

    pub fn id(&self) -> GridId {
        self.id
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn config(&self) -> &TileConfig {
        &self.config
    }

    pub fn region(&self, id: RegionId) -> Option<&Region<P>> {
        self.regions.get(&id)
    }

    pub fn region_id_at(&self, cell: Cell) -> Option<RegionId> {
        self.slot(cell).map(|slot| slot.region)
    }

    pub fn region_at(&self, cell: Cell) -> Option<&Region<P>> {
        self.region_id_at(cell).and_then(|id| self.regions.get(&id))
    }

    /// Every region, in no particular order
    pub fn regions(&self) -> impl Iterator<Item = &Region<P>> {
        self.regions.values()
    }

    /// Filled regions in the order their payloads were placed
    pub fn filled_regions(&self) -> impl Iterator<Item = &Region<P>> {
        self.placed.iter().filter_map(|id| self.regions.get(id))
    }

    /// Payloads in the order they were placed
    pub fn payloads(&self) -> Vec<&P> {
        self.filled_regions().filter_map(Region::payload).collect()
    }

    /// Check that a payload could be placed at this area without touching the grid
    pub fn check_placement(
        &self,
        cell: Cell,
        row_span: usize,
        column_span: usize,
    ) -> Result<(), LayoutError> {
        if row_span == 0 || column_span == 0 {
            return Err(LayoutError::InvalidArgument("spans must be at least 1"));
        }
        self.check_bounds(cell, row_span, column_span)?;
        if !self.is_area_empty(cell, row_span, column_span) {
            return Err(LayoutError::Overlap {
                cell,
                row_span,
                column_span,
            });
        }
        Ok(())
    }

    /// Put a payload on an empty area. The region already at `cell` survives
    /// and absorbs the rest of the area.
    pub fn place_region(
        &mut self,
        cell: Cell,
        payload: P,
        row_span: usize,
        column_span: usize,
    ) -> Result<RegionId, LayoutError> {
        self.check_placement(cell, row_span, column_span)?;
        let id = self.region_id_at(cell).ok_or(LayoutError::Corrupt {
            cell,
            reason: "cell has no region",
        })?;

        if row_span > 1 || column_span > 1 {
            let target = Area::new(cell, row_span, column_span);
            let absorbed: Vec<Cell> = target.cells().filter(|c| *c != cell).collect();
            self.absorb(id, cell, row_span, column_span, &absorbed)?;
        }

        self.region_mut(id)?.fill(payload);
        self.placed.push(id);
        self.request_size(id);
        tracing::debug!(
            "Placed region {:?} at {:?} spanning {}x{}",
            id,
            cell,
            row_span,
            column_span
        );
        Ok(id)
    }

    /// Take the payload out of a filled region; its footprint goes back to 1x1 empty regions
    pub fn remove_region(&mut self, id: RegionId) -> Result<P, LayoutError> {
        let region = self.region_ref(id)?;
        if !region.is_filled() {
            return Err(LayoutError::EmptyRegion(id));
        }
        let area = region.area();
        let cells: Vec<Cell> = area.cells().collect();

        let (_, discarded) = self.split_all(&cells, area.anchor)?;
        let payload = discarded
            .into_iter()
            .find(|region| region.id() == id)
            .and_then(Region::into_payload)
            .ok_or(LayoutError::EmptyRegion(id))?;

        self.paint(Highlight::Idle);
        tracing::debug!("Removed region {:?} from {:?}", id, area.anchor);
        Ok(payload)
    }

    pub fn grow_rows(&mut self, count: usize) -> Result<(), LayoutError> {
        if count == 0 {
            return Err(LayoutError::InvalidArgument("row count must be positive"));
        }
        for row in self.rows..self.rows + count {
            let slots = (0..self.columns)
                .map(|column| self.fresh_slot(Cell::new(row, column)))
                .collect();
            self.slots.push(slots);
        }
        self.rows += count;
        tracing::info!("Grid {} grew to {} rows", self.id, self.rows);
        Ok(())
    }

    pub fn grow_columns(&mut self, count: usize) -> Result<(), LayoutError> {
        if count == 0 {
            return Err(LayoutError::InvalidArgument("column count must be positive"));
        }
        for row in 0..self.rows {
            for column in self.columns..self.columns + count {
                let slot = self.fresh_slot(Cell::new(row, column));
                self.slots[row].push(slot);
            }
        }
        self.columns += count;
        tracing::info!("Grid {} grew to {} columns", self.id, self.columns);
        Ok(())
    }

    /// Drop trailing rows; they must not hold any payload
    pub fn shrink_rows(&mut self, count: usize) -> Result<(), LayoutError> {
        if count == 0 || count >= self.rows {
            return Err(LayoutError::InvalidArgument(
                "row count must be positive and leave at least one row",
            ));
        }
        let band = Cell::new(self.rows - count, 0);
        if !self.is_area_empty(band, count, self.columns) {
            return Err(LayoutError::NonEmptyArea {
                axis: "rows",
                count,
            });
        }
        for slots in self.slots.drain(self.rows - count..) {
            for slot in slots {
                self.regions.remove(&slot.region);
            }
        }
        self.rows -= count;
        tracing::info!("Grid {} shrank to {} rows", self.id, self.rows);
        Ok(())
    }

    /// Drop trailing columns; they must not hold any payload
    pub fn shrink_columns(&mut self, count: usize) -> Result<(), LayoutError> {
        if count == 0 || count >= self.columns {
            return Err(LayoutError::InvalidArgument(
                "column count must be positive and leave at least one column",
            ));
        }
        let band = Cell::new(0, self.columns - count);
        if !self.is_area_empty(band, self.rows, count) {
            return Err(LayoutError::NonEmptyArea {
                axis: "columns",
                count,
            });
        }
        let keep = self.columns - count;
        for row in &mut self.slots {
            for slot in row.drain(keep..) {
                self.regions.remove(&slot.region);
            }
        }
        self.columns = keep;
        tracing::info!("Grid {} shrank to {} columns", self.id, self.columns);
        Ok(())
    }

    /// True when the area lies inside the grid and no covered cell is filled
    pub fn is_area_empty(&self, cell: Cell, row_span: usize, column_span: usize) -> bool {
        if self.check_bounds(cell, row_span, column_span).is_err() {
            return false;
        }
        Area::new(cell, row_span, column_span)
            .cells()
            .all(|c| !self.is_filled_at(c))
    }

    /// Emptiness check that also leaves visual feedback: the whole grid is
    /// painted with `highlight`, and the area with `EmptyCheck` when it is empty.
    pub fn check_area(
        &mut self,
        cell: Cell,
        row_span: usize,
        column_span: usize,
        highlight: Highlight,
    ) -> bool {
        self.paint(highlight);
        let empty = self.is_area_empty(cell, row_span, column_span);
        if empty {
            self.paint_area(Highlight::EmptyCheck, Area::new(cell, row_span, column_span));
        }
        empty
    }

    pub fn highlight(&self, cell: Cell) -> Option<Highlight> {
        self.slot(cell).map(|slot| slot.highlight)
    }

    /// Color a renderer should use for the tile at `cell`
    pub fn tile_color(&self, cell: Cell) -> Option<Color> {
        self.highlight(cell)
            .map(|highlight| self.config.colors.color_for(highlight))
    }

    /// Set every empty cell to `highlight`; filled cells always show as idle
    pub fn paint(&mut self, highlight: Highlight) {
        let area = Area::new(Cell::new(0, 0), self.rows, self.columns);
        self.paint_area(highlight, area);
    }

    /// Like `paint`, limited to the part of `area` inside the grid
    pub fn paint_area(&mut self, highlight: Highlight, area: Area) {
        for cell in area.cells() {
            let filled = self.is_filled_at(cell);
            if let Some(slot) = self.slot_mut(cell) {
                slot.highlight = if filled { Highlight::Idle } else { highlight };
            }
        }
    }

    pub fn set_drag_and_drop(&mut self, accept: bool) {
        self.config.drag_and_drop = accept;
    }

    pub fn set_resizable(&mut self, accept: bool) {
        self.config.resizable = accept;
    }

    pub fn cell_height(&self) -> u32 {
        self.config.cell_height
    }

    pub fn cell_width(&self) -> u32 {
        self.config.cell_width
    }

    pub fn row_spacing(&self) -> u32 {
        self.config.row_spacing
    }

    pub fn column_spacing(&self) -> u32 {
        self.config.column_spacing
    }

    pub fn set_cell_height(&mut self, height: u32) -> Result<(), LayoutError> {
        if height < self.config.min_cell_height {
            return Err(LayoutError::InvalidArgument("cell height is below the minimum"));
        }
        self.config.cell_height = height;
        self.refresh_sizes();
        Ok(())
    }

    pub fn set_cell_width(&mut self, width: u32) -> Result<(), LayoutError> {
        if width < self.config.min_cell_width {
            return Err(LayoutError::InvalidArgument("cell width is below the minimum"));
        }
        self.config.cell_width = width;
        self.refresh_sizes();
        Ok(())
    }

    /// Raises the current cell height when it falls below the new minimum
    pub fn set_min_cell_height(&mut self, height: u32) -> Result<(), LayoutError> {
        if height == 0 {
            return Err(LayoutError::InvalidArgument("minimum cell height must be positive"));
        }
        self.config.min_cell_height = height;
        if self.config.cell_height < height {
            self.config.cell_height = height;
            self.refresh_sizes();
        }
        Ok(())
    }

    /// Raises the current cell width when it falls below the new minimum
    pub fn set_min_cell_width(&mut self, width: u32) -> Result<(), LayoutError> {
        if width == 0 {
            return Err(LayoutError::InvalidArgument("minimum cell width must be positive"));
        }
        self.config.min_cell_width = width;
        if self.config.cell_width < width {
            self.config.cell_width = width;
            self.refresh_sizes();
        }
        Ok(())
    }

    pub fn set_row_spacing(&mut self, spacing: u32) {
        self.config.row_spacing = spacing;
        self.refresh_sizes();
    }

    pub fn set_column_spacing(&mut self, spacing: u32) {
        self.config.column_spacing = spacing;
        self.refresh_sizes();
    }

    /// Spread the cells over a container of the given pixel size, never going
    /// below the minimum cell size
    pub fn fit_to_size(&mut self, height: u32, width: u32) {
        let rows = self.rows as u32;
        let columns = self.columns as u32;
        let free_height = height.saturating_sub((rows - 1) * self.config.row_spacing);
        let free_width = width.saturating_sub((columns - 1) * self.config.column_spacing);

        self.config.cell_height = (free_height / rows).max(self.config.min_cell_height);
        self.config.cell_width = (free_width / columns).max(self.config.min_cell_width);
        tracing::debug!(
            "Grid {} cells now {}x{} px",
            self.id,
            self.config.cell_width,
            self.config.cell_height
        );
        self.refresh_sizes();
    }

    /// Pixel rectangle of one cell
    pub fn cell_rect(&self, cell: Cell) -> Option<Rect> {
        self.slot(cell)?;
        Some(Rect {
            x: (cell.column as u32 * (self.config.cell_width + self.config.column_spacing)) as i32,
            y: (cell.row as u32 * (self.config.cell_height + self.config.row_spacing)) as i32,
            width: self.config.cell_width as i32,
            height: self.config.cell_height as i32,
        })
    }

    /// (height, width) in pixels a region's payload should occupy
    pub fn region_pixel_size(&self, id: RegionId) -> Result<(u32, u32), LayoutError> {
        let region = self.region_ref(id)?;
        Ok(self.area_pixel_size(region.area()))
    }

    pub fn region_rect(&self, id: RegionId) -> Result<Rect, LayoutError> {
        let region = self.region_ref(id)?;
        let origin = self.cell_rect(region.anchor()).ok_or(LayoutError::Corrupt {
            cell: region.anchor(),
            reason: "region anchor outside the grid",
        })?;
        let (height, width) = self.area_pixel_size(region.area());
        Ok(Rect {
            height: height as i32,
            width: width as i32,
            ..origin
        })
    }

    /// Cell under a grid-relative pixel position. Points in the spacing
    /// between cells hit nothing.
    pub fn cell_at_point(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        let column_stride = self.config.cell_width + self.config.column_spacing;
        let row_stride = self.config.cell_height + self.config.row_spacing;
        if x % column_stride >= self.config.cell_width || y % row_stride >= self.config.cell_height
        {
            return None;
        }
        let cell = Cell::new((y / row_stride) as usize, (x / column_stride) as usize);
        self.slot(cell).map(|_| cell)
    }

    /// Which cell of a region (as row/column offsets from its anchor) sits
    /// under a region-relative pixel position
    pub fn grab_offset(&self, id: RegionId, x: i32, y: i32) -> Result<(usize, usize), LayoutError> {
        let region = self.region_ref(id)?;
        let row_stride = (self.config.cell_height + self.config.row_spacing) as i32;
        let column_stride = (self.config.cell_width + self.config.column_spacing) as i32;
        let row_offset = (y.max(0) / row_stride) as usize;
        let column_offset = (x.max(0) / column_stride) as usize;
        Ok((
            row_offset.min(region.row_span() - 1),
            column_offset.min(region.column_span() - 1),
        ))
    }

    /// Take all notifications queued since the last call
    pub fn drain_events(&mut self) -> Vec<GridEvent<P>> {
        std::mem::take(&mut self.events)
    }

    /// Full scan of the cell mapping against region footprints
    pub fn verify_partition(&self) -> Result<(), LayoutError> {
        if self.slots.len() != self.rows {
            return Err(LayoutError::Corrupt {
                cell: Cell::new(self.slots.len(), 0),
                reason: "row count does not match the cell map",
            });
        }
        for (row, slots) in self.slots.iter().enumerate() {
            if slots.len() != self.columns {
                return Err(LayoutError::Corrupt {
                    cell: Cell::new(row, slots.len()),
                    reason: "column count does not match the cell map",
                });
            }
            for (column, slot) in slots.iter().enumerate() {
                let cell = Cell::new(row, column);
                let region = self.regions.get(&slot.region).ok_or(LayoutError::Corrupt {
                    cell,
                    reason: "cell points at a missing region",
                })?;
                if !region.contains(cell) {
                    return Err(LayoutError::Corrupt {
                        cell,
                        reason: "cell lies outside its region",
                    });
                }
            }
        }
        for region in self.regions.values() {
            let anchor = region.anchor();
            if region.grid() != self.id {
                return Err(LayoutError::Corrupt {
                    cell: anchor,
                    reason: "region belongs to another grid",
                });
            }
            if !region.is_filled() && (region.row_span() != 1 || region.column_span() != 1) {
                return Err(LayoutError::Corrupt {
                    cell: anchor,
                    reason: "empty region spans several cells",
                });
            }
            for cell in region.cells() {
                if self.region_id_at(cell) != Some(region.id()) {
                    return Err(LayoutError::Corrupt {
                        cell,
                        reason: "region footprint does not map back to it",
                    });
                }
            }
        }
        let filled = self.regions.values().filter(|r| r.is_filled()).count();
        let placed_filled = self
            .placed
            .iter()
            .all(|id| self.regions.get(id).is_some_and(Region::is_filled));
        if filled != self.placed.len() || !placed_filled {
            return Err(LayoutError::Corrupt {
                cell: Cell::new(0, 0),
                reason: "placement list out of sync with filled regions",
            });
        }
        Ok(())
    }

    pub(crate) fn check_bounds(
        &self,
        cell: Cell,
        row_span: usize,
        column_span: usize,
    ) -> Result<(), LayoutError> {
        let fits = |start: usize, span: usize, limit: usize| {
            start < limit && start.checked_add(span).is_some_and(|end| end <= limit)
        };
        if fits(cell.row, row_span, self.rows) && fits(cell.column, column_span, self.columns) {
            Ok(())
        } else {
            Err(LayoutError::OutOfBounds {
                cell,
                row_span,
                column_span,
                rows: self.rows,
                columns: self.columns,
            })
        }
    }

    pub(crate) fn is_filled_at(&self, cell: Cell) -> bool {
        self.region_at(cell).is_some_and(Region::is_filled)
    }

    pub(crate) fn region_ref(&self, id: RegionId) -> Result<&Region<P>, LayoutError> {
        self.regions.get(&id).ok_or(LayoutError::NotFound(id))
    }

    pub(crate) fn region_mut(&mut self, id: RegionId) -> Result<&mut Region<P>, LayoutError> {
        self.regions.get_mut(&id).ok_or(LayoutError::NotFound(id))
    }

    fn slot(&self, cell: Cell) -> Option<&Slot> {
        self.slots.get(cell.row)?.get(cell.column)
    }

    fn slot_mut(&mut self, cell: Cell) -> Option<&mut Slot> {
        self.slots.get_mut(cell.row)?.get_mut(cell.column)
    }

    /// Point a cell at a region. The caller has checked the cell is inside the grid.
    pub(crate) fn assign(&mut self, cell: Cell, region: RegionId) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.region = region;
        }
    }

    /// New 1x1 empty region for `cell`; the cell map is left to the caller
    pub(crate) fn create_region(&mut self, cell: Cell) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        self.regions.insert(id, Region::empty(id, self.id, cell));
        id
    }

    pub(crate) fn discard_region(&mut self, id: RegionId) -> Option<Region<P>> {
        self.placed.retain(|placed| *placed != id);
        self.regions.remove(&id)
    }

    pub(crate) fn push_event(&mut self, event: GridEvent<P>) {
        self.events.push(event);
    }

    /// Queue the resized notification plus a size request for a region
    pub(crate) fn notify_resized(&mut self, id: RegionId) {
        let Some(region) = self.regions.get(&id) else {
            return;
        };
        let Some(payload) = region.payload().cloned() else {
            return;
        };
        let area = region.area();
        self.events.push(GridEvent::RegionResized {
            region: id,
            payload,
            anchor: area.anchor,
            row_span: area.row_span,
            column_span: area.column_span,
        });
        self.request_size(id);
    }

    fn fresh_slot(&mut self, cell: Cell) -> Slot {
        Slot {
            region: self.create_region(cell),
            highlight: Highlight::Idle,
        }
    }

    fn area_pixel_size(&self, area: Area) -> (u32, u32) {
        (
            span_extent(area.row_span, self.config.cell_height, self.config.row_spacing),
            span_extent(area.column_span, self.config.cell_width, self.config.column_spacing),
        )
    }

    fn request_size(&mut self, id: RegionId) {
        let Some(region) = self.regions.get(&id) else {
            return;
        };
        let Some(payload) = region.payload().cloned() else {
            return;
        };
        let (height, width) = self.area_pixel_size(region.area());
        self.events.push(GridEvent::SizeRequested {
            region: id,
            payload,
            height,
            width,
        });
    }

    fn refresh_sizes(&mut self) {
        for id in self.placed.clone() {
            self.request_size(id);
        }
    }
}
