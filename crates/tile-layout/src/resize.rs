// ABOUTME: Resize planning and the edge-drag resize interaction.
// ABOUTME: Converts pointer travel to whole tiles and grows or shrinks regions.

use tile_core::Highlight;

use crate::geometry::{Area, Cell, Direction};
use crate::grid::{Grid, LayoutError};
use crate::region::RegionId;

/// Outcome of planning a resize; nothing is changed until it is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizePlan {
    pub region: RegionId,
    pub direction: Direction,
    /// Tiles asked for: positive grows outward, negative shrinks
    pub requested: i32,
    /// Tiles that can actually move, same sign convention as `requested`
    pub feasible_count: i32,
    pub grows: bool,
    /// Cells to absorb when growing, or to release when shrinking (row-major)
    pub affected_cells: Vec<Cell>,
    /// Region geometry the plan was computed against
    pub from: Area,
    /// Region geometry once applied
    pub to: Area,
}

impl ResizePlan {
    pub fn anchor(&self) -> Cell {
        self.to.anchor
    }

    pub fn row_span(&self) -> usize {
        self.to.row_span
    }

    pub fn column_span(&self) -> usize {
        self.to.column_span
    }

    pub fn is_noop(&self) -> bool {
        self.feasible_count == 0
    }
}

/// Work out how far a filled region can move its `direction` edge by
/// `tile_count` tiles. Growth stops at the grid boundary and before the first
/// strip holding any filled cell; shrinking never goes below one tile.
pub fn plan_resize<P: Clone>(
    grid: &Grid<P>,
    region: RegionId,
    direction: Direction,
    tile_count: i32,
) -> Result<ResizePlan, LayoutError> {
    let target = grid.region(region).ok_or(LayoutError::NotFound(region))?;
    if !target.is_filled() {
        return Err(LayoutError::EmptyRegion(region));
    }
    let from = target.area();

    let (feasible, to, affected) = if tile_count > 0 {
        let room = match direction {
            Direction::Left => from.anchor.column,
            Direction::Up => from.anchor.row,
            Direction::Right => grid.columns() - from.end_column(),
            Direction::Down => grid.rows() - from.end_row(),
        };
        let limit = room.min(tile_count.unsigned_abs() as usize);

        let mut feasible = 0;
        while feasible < limit {
            let Some(reach) = from.resized(direction, feasible as isize + 1) else {
                break;
            };
            let strip = reach.edge_band(direction, 1);
            if strip.cells().any(|cell| grid.is_filled_at(cell)) {
                break;
            }
            feasible += 1;
        }

        let to = from.resized(direction, feasible as isize).unwrap_or(from);
        let affected: Vec<Cell> = to.cells().filter(|cell| !from.contains(*cell)).collect();
        (feasible as i32, to, affected)
    } else {
        let span = from.span_along(direction);
        let feasible = (tile_count.unsigned_abs() as usize).min(span - 1);
        let to = from.resized(direction, -(feasible as isize)).unwrap_or(from);
        let affected: Vec<Cell> = from.edge_band(direction, feasible).cells().collect();
        (-(feasible as i32), to, affected)
    };

    tracing::debug!(
        "Planned {:?} resize of region {:?}: requested {}, feasible {}",
        direction,
        region,
        tile_count,
        feasible
    );

    Ok(ResizePlan {
        region,
        direction,
        requested: tile_count,
        feasible_count: feasible,
        grows: tile_count > 0,
        affected_cells: affected,
        from,
        to,
    })
}

/// Carry out a plan. Refuses plans computed against different geometry; a
/// no-op plan changes nothing and emits nothing.
pub fn apply_resize_plan<P: Clone>(
    grid: &mut Grid<P>,
    plan: &ResizePlan,
) -> Result<RegionId, LayoutError> {
    let region = grid.region(plan.region).ok_or(LayoutError::NotFound(plan.region))?;
    if region.area() != plan.from {
        return Err(LayoutError::StalePlan(plan.region));
    }
    if plan.is_noop() {
        return Ok(plan.region);
    }

    let to = plan.to;
    if plan.grows {
        grid.merge(plan.region, to.anchor, to.row_span, to.column_span, &plan.affected_cells)?;
    } else {
        grid.split(plan.region, to.anchor, to.row_span, to.column_span, &plan.affected_cells)?;
    }
    grid.notify_resized(plan.region);

    tracing::debug!(
        "Resized region {:?} to {:?} spanning {}x{}",
        plan.region,
        to.anchor,
        to.row_span,
        to.column_span
    );
    Ok(plan.region)
}

/// Turn a pointer position along the resize axis into whole tiles.
///
/// `pointer` is measured from the region's top/left edge. The result counts
/// tiles whose midpoint the pointer has passed beyond the dragged edge:
/// positive grows outward, negative shrinks, rounding toward negative
/// infinity.
pub fn tile_count_from_offset(
    direction: Direction,
    pointer: i32,
    tile_extent: u32,
    spacing: u32,
    current_span: usize,
) -> Result<i32, LayoutError> {
    let stride = i64::from(tile_extent) + i64::from(spacing);
    if stride == 0 {
        return Err(LayoutError::InvalidArgument(
            "tile extent plus spacing must be positive",
        ));
    }
    // Widened so extreme pointers and spans cannot overflow
    let span = i64::try_from(current_span).unwrap_or(i64::MAX);
    let extent = span
        .saturating_mul(i64::from(tile_extent))
        .saturating_add(span.saturating_sub(1).max(0).saturating_mul(i64::from(spacing)));
    let pointer = i64::from(pointer);
    let outward = if direction.is_positive() {
        pointer.saturating_sub(extent)
    } else {
        -pointer
    };
    let tiles = (outward + i64::from(tile_extent / 2)).div_euclid(stride);
    Ok(tiles.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

/// Edge grabbed by a press at a region-relative position, if the press lands
/// within `margin` pixels of one. Horizontal edges win over vertical ones.
pub fn resize_edge(x: i32, y: i32, width: i32, height: i32, margin: i32) -> Option<Direction> {
    if !(0..=width).contains(&x) || !(0..=height).contains(&y) {
        return None;
    }
    if x < margin {
        Some(Direction::Left)
    } else if x > width - margin {
        Some(Direction::Right)
    } else if y < margin {
        Some(Direction::Up)
    } else if y > height - margin {
        Some(Direction::Down)
    } else {
        None
    }
}

/// An edge drag in progress: begin, any number of updates, then commit or abort
#[derive(Debug, Clone)]
pub struct ResizeSession {
    region: RegionId,
    direction: Direction,
    tile_count: i32,
}

impl ResizeSession {
    pub fn begin<P: Clone>(
        grid: &mut Grid<P>,
        region: RegionId,
        direction: Direction,
    ) -> Result<Self, LayoutError> {
        if !grid.config().resizable {
            return Err(LayoutError::ResizeDisabled);
        }
        let target = grid.region(region).ok_or(LayoutError::NotFound(region))?;
        if !target.is_filled() {
            return Err(LayoutError::EmptyRegion(region));
        }
        grid.paint(Highlight::Resize);
        tracing::debug!("Resize of region {:?} started on {:?} edge", region, direction);
        Ok(Self {
            region,
            direction,
            tile_count: 0,
        })
    }

    /// Start a resize from a press at a region-relative position. Ok(None)
    /// when the press is not on a resize edge.
    pub fn begin_at<P: Clone>(
        grid: &mut Grid<P>,
        region: RegionId,
        x: i32,
        y: i32,
    ) -> Result<Option<Self>, LayoutError> {
        let (height, width) = grid.region_pixel_size(region)?;
        let margin = grid.config().resize_margin as i32;
        match resize_edge(x, y, width as i32, height as i32, margin) {
            Some(direction) => Self::begin(grid, region, direction).map(Some),
            None => Ok(None),
        }
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Tile count of the last preview
    pub fn tile_count(&self) -> i32 {
        self.tile_count
    }

    /// Preview the resize for a pointer at a region-relative position. The
    /// highlight is only repainted when the tile count changes.
    pub fn update<P: Clone>(
        &mut self,
        grid: &mut Grid<P>,
        x: i32,
        y: i32,
    ) -> Result<ResizePlan, LayoutError> {
        let tile_count = self.pointer_tiles(grid, x, y)?;
        let plan = plan_resize(grid, self.region, self.direction, tile_count)?;
        if tile_count != self.tile_count {
            self.tile_count = tile_count;
            grid.paint(Highlight::Resize);
            if !plan.is_noop() {
                grid.paint_area(Highlight::EmptyCheck, plan.to);
            }
        }
        Ok(plan)
    }

    /// Apply the resize for the release position and clear the feedback
    pub fn commit<P: Clone>(
        self,
        grid: &mut Grid<P>,
        x: i32,
        y: i32,
    ) -> Result<RegionId, LayoutError> {
        let result = self.apply_at(grid, x, y);
        grid.paint(Highlight::Idle);
        result
    }

    pub fn abort<P: Clone>(self, grid: &mut Grid<P>) {
        grid.paint(Highlight::Idle);
    }

    fn apply_at<P: Clone>(&self, grid: &mut Grid<P>, x: i32, y: i32) -> Result<RegionId, LayoutError> {
        let tile_count = self.pointer_tiles(grid, x, y)?;
        let plan = plan_resize(grid, self.region, self.direction, tile_count)?;
        apply_resize_plan(grid, &plan)
    }

    fn pointer_tiles<P: Clone>(&self, grid: &Grid<P>, x: i32, y: i32) -> Result<i32, LayoutError> {
        let region = grid
            .region(self.region)
            .ok_or(LayoutError::NotFound(self.region))?;
        let span = region.area().span_along(self.direction);
        if self.direction.is_horizontal() {
            tile_count_from_offset(self.direction, x, grid.cell_width(), grid.column_spacing(), span)
        } else {
            tile_count_from_offset(self.direction, y, grid.cell_height(), grid.row_spacing(), span)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridEvent;
    use tile_core::TileConfig;

    fn grid(rows: usize, columns: usize) -> Grid<&'static str> {
        Grid::new(rows, columns, TileConfig::with_cell_size(10, 10).with_spacing(0, 0)).unwrap()
    }

    #[test]
    fn growth_stops_before_filled_cell() {
        let mut grid = grid(5, 5);
        let id = grid.place_region(Cell::new(1, 1), "A", 1, 1).unwrap();
        grid.place_region(Cell::new(1, 4), "B", 1, 1).unwrap();
        grid.place_region(Cell::new(1, 3), "C", 1, 1).unwrap();

        let plan = plan_resize(&grid, id, Direction::Right, 2).unwrap();
        assert_eq!(plan.feasible_count, 1);
        assert!(plan.grows);
        assert_eq!(plan.affected_cells, vec![Cell::new(1, 2)]);
    }

    #[test]
    fn growth_scans_the_whole_strip() {
        let mut grid = grid(5, 5);
        let id = grid.place_region(Cell::new(1, 1), "A", 2, 1).unwrap();
        grid.place_region(Cell::new(2, 3), "B", 1, 1).unwrap();

        let plan = plan_resize(&grid, id, Direction::Right, 3).unwrap();
        assert_eq!(plan.feasible_count, 1);
        assert_eq!(plan.to, Area::new(Cell::new(1, 1), 2, 2));
    }

    #[test]
    fn growth_is_clamped_to_grid() {
        let mut grid = grid(5, 5);
        let id = grid.place_region(Cell::new(1, 1), "A", 1, 1).unwrap();

        let left = plan_resize(&grid, id, Direction::Left, 4).unwrap();
        assert_eq!(left.feasible_count, 1);
        assert_eq!(left.anchor(), Cell::new(1, 0));

        let down = plan_resize(&grid, id, Direction::Down, 10).unwrap();
        assert_eq!(down.feasible_count, 3);
        assert_eq!(down.row_span(), 4);
    }

    #[test]
    fn shrink_never_drops_below_one_tile() {
        let mut grid = grid(5, 5);
        let id = grid.place_region(Cell::new(0, 0), "A", 3, 4).unwrap();

        for k in 1..6 {
            let plan = plan_resize(&grid, id, Direction::Right, -k).unwrap();
            assert_eq!(plan.feasible_count, -(k.min(3)));
            assert!(!plan.grows);
        }
        let up = plan_resize(&grid, id, Direction::Up, -5).unwrap();
        assert_eq!(up.feasible_count, -2);
        assert_eq!(up.to, Area::new(Cell::new(2, 0), 1, 4));
        assert_eq!(up.affected_cells.len(), 8);
        assert!(up.affected_cells.iter().all(|cell| cell.row < 2));
    }

    #[test]
    fn empty_region_cannot_be_resized() {
        let grid = grid(3, 3);
        let empty = grid.region_id_at(Cell::new(0, 0)).unwrap();
        assert_eq!(
            plan_resize(&grid, empty, Direction::Right, 1),
            Err(LayoutError::EmptyRegion(empty))
        );
    }

    #[test]
    fn apply_grow_then_shrink() {
        let mut grid = grid(4, 4);
        let id = grid.place_region(Cell::new(1, 1), "A", 1, 1).unwrap();
        grid.drain_events();

        let grow = plan_resize(&grid, id, Direction::Left, 1).unwrap();
        apply_resize_plan(&mut grid, &grow).unwrap();
        assert_eq!(grid.region(id).unwrap().area(), Area::new(Cell::new(1, 0), 1, 2));
        assert!(grid.verify_partition().is_ok());

        let events = grid.drain_events();
        assert_eq!(
            events[0],
            GridEvent::RegionResized {
                region: id,
                payload: "A",
                anchor: Cell::new(1, 0),
                row_span: 1,
                column_span: 2,
            }
        );

        let shrink = plan_resize(&grid, id, Direction::Left, -1).unwrap();
        apply_resize_plan(&mut grid, &shrink).unwrap();
        assert_eq!(grid.region(id).unwrap().area(), Area::new(Cell::new(1, 1), 1, 1));
        assert!(grid.region_at(Cell::new(1, 0)).is_some_and(|r| !r.is_filled()));
        assert!(grid.verify_partition().is_ok());
    }

    #[test]
    fn noop_plan_emits_nothing() {
        let mut grid = grid(3, 3);
        let id = grid.place_region(Cell::new(0, 0), "A", 1, 1).unwrap();
        grid.drain_events();

        let plan = plan_resize(&grid, id, Direction::Left, 2).unwrap();
        assert!(plan.is_noop());
        apply_resize_plan(&mut grid, &plan).unwrap();
        assert!(grid.drain_events().is_empty());
    }

    #[test]
    fn stale_plan_is_refused() {
        let mut grid = grid(4, 4);
        let id = grid.place_region(Cell::new(0, 0), "A", 1, 1).unwrap();
        let first = plan_resize(&grid, id, Direction::Right, 1).unwrap();
        let second = plan_resize(&grid, id, Direction::Down, 1).unwrap();
        apply_resize_plan(&mut grid, &first).unwrap();

        assert_eq!(
            apply_resize_plan(&mut grid, &second),
            Err(LayoutError::StalePlan(id))
        );
        assert!(grid.verify_partition().is_ok());
    }

    #[test]
    fn plan_against_newly_filled_cells_fails_cleanly() {
        let mut grid = grid(3, 3);
        let id = grid.place_region(Cell::new(0, 0), "A", 1, 1).unwrap();
        let plan = plan_resize(&grid, id, Direction::Right, 1).unwrap();
        grid.place_region(Cell::new(0, 1), "B", 1, 1).unwrap();

        assert!(matches!(
            apply_resize_plan(&mut grid, &plan),
            Err(LayoutError::Overlap { .. })
        ));
        assert_eq!(grid.region(id).unwrap().column_span(), 1);
    }

    #[test]
    fn pointer_offset_rounds_at_tile_midpoints() {
        let count = |direction, pointer| tile_count_from_offset(direction, pointer, 10, 0, 1).unwrap();
        assert_eq!(count(Direction::Right, 10), 0);
        assert_eq!(count(Direction::Right, 14), 0);
        assert_eq!(count(Direction::Right, 15), 1);
        assert_eq!(count(Direction::Right, 36), 3);
        assert_eq!(count(Direction::Right, 5), 0);
        assert_eq!(count(Direction::Right, 4), -1);
        assert_eq!(count(Direction::Left, -4), 0);
        assert_eq!(count(Direction::Left, -5), 1);
        assert_eq!(count(Direction::Left, 6), -1);
    }

    #[test]
    fn pointer_offset_accounts_for_spacing() {
        // Two 10px tiles with 4px gaps: trailing edge at 24, next midpoint at 33
        assert_eq!(tile_count_from_offset(Direction::Down, 32, 10, 4, 2).unwrap(), 0);
        assert_eq!(tile_count_from_offset(Direction::Down, 33, 10, 4, 2).unwrap(), 1);
        assert_eq!(tile_count_from_offset(Direction::Up, -9, 10, 4, 2).unwrap(), 1);
    }

    #[test]
    fn extreme_pointers_do_not_overflow() {
        assert_eq!(
            tile_count_from_offset(Direction::Left, i32::MIN, 1, 0, 1).unwrap(),
            i32::MAX
        );
        assert_eq!(
            tile_count_from_offset(Direction::Right, i32::MIN, 1, 0, usize::MAX).unwrap(),
            i32::MIN
        );
        assert_eq!(
            tile_count_from_offset(Direction::Up, i32::MAX, 10, 5, 3).unwrap(),
            (-(i32::MAX as i64) + 5).div_euclid(15) as i32
        );
    }

    #[test]
    fn zero_stride_is_rejected() {
        assert!(matches!(
            tile_count_from_offset(Direction::Right, 3, 0, 0, 1),
            Err(LayoutError::InvalidArgument(_))
        ));
    }

    #[test]
    fn press_near_edges_selects_direction() {
        assert_eq!(resize_edge(2, 50, 100, 100, 5), Some(Direction::Left));
        assert_eq!(resize_edge(98, 50, 100, 100, 5), Some(Direction::Right));
        assert_eq!(resize_edge(50, 1, 100, 100, 5), Some(Direction::Up));
        assert_eq!(resize_edge(50, 97, 100, 100, 5), Some(Direction::Down));
        assert_eq!(resize_edge(50, 50, 100, 100, 5), None);
        assert_eq!(resize_edge(-3, 50, 100, 100, 5), None);
    }

    #[test]
    fn session_previews_then_commits() {
        let mut grid = grid(4, 4);
        let id = grid.place_region(Cell::new(0, 0), "A", 1, 1).unwrap();

        let mut session = ResizeSession::begin_at(&mut grid, id, 9, 5).unwrap().unwrap();
        assert_eq!(session.direction(), Direction::Right);
        assert_eq!(grid.highlight(Cell::new(3, 3)), Some(Highlight::Resize));

        let plan = session.update(&mut grid, 26, 5).unwrap();
        assert_eq!(plan.feasible_count, 2);
        assert_eq!(grid.highlight(Cell::new(0, 2)), Some(Highlight::EmptyCheck));
        assert_eq!(grid.highlight(Cell::new(1, 2)), Some(Highlight::Resize));
        assert_eq!(grid.region(id).unwrap().column_span(), 1);

        session.commit(&mut grid, 26, 5).unwrap();
        assert_eq!(grid.region(id).unwrap().column_span(), 3);
        assert_eq!(grid.highlight(Cell::new(3, 3)), Some(Highlight::Idle));
        assert!(grid.verify_partition().is_ok());
    }

    #[test]
    fn session_respects_resizable_flag() {
        let mut grid = grid(2, 2);
        let id = grid.place_region(Cell::new(0, 0), "A", 1, 1).unwrap();
        grid.set_resizable(false);
        assert!(matches!(
            ResizeSession::begin(&mut grid, id, Direction::Down),
            Err(LayoutError::ResizeDisabled)
        ));
    }
}
