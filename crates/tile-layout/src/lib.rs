// ABOUTME: Tile grid layout management for dashboard-style panels.
// ABOUTME: Places, resizes and moves rectangular regions on linked cell grids.

mod geometry;
mod grid;
mod link;
mod partition;
mod region;
mod resize;
mod transfer;

pub use geometry::{span_extent, Area, Cell, Direction, Rect};
pub use grid::{Grid, GridEvent, GridId, LayoutError};
pub use link::{LinkError, LinkGraph};
pub use region::{Region, RegionId};
pub use resize::{
    apply_resize_plan, plan_resize, resize_edge, tile_count_from_offset, ResizePlan,
    ResizeSession,
};
pub use tile_core::{Color, Highlight, TileColors, TileConfig};
pub use transfer::{Transfer, TransferError, TransferManifest, TransferOutcome, TransferPhase};
