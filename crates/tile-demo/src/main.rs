// ABOUTME: Demo entry point for the tile grid engine.
// ABOUTME: Builds two linked grids, resizes and moves tiles, and prints each layout.

use anyhow::{Context, Result};
use tile_core::TileConfig;
use tile_layout::{Cell, Grid, GridEvent, LinkGraph, ResizeSession, Transfer, TransferManifest};

const ROWS: usize = 6;
const COLUMNS: usize = 8;

/// One label per cell; spanning tiles repeat their label
fn render(grid: &Grid<String>) -> String {
    let mut out = String::new();
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            let label = grid
                .region_at(Cell::new(row, column))
                .and_then(|region| region.payload())
                .map_or(".", String::as_str);
            out.push_str(&format!("{label:>5}"));
        }
        out.push('\n');
    }
    out
}

fn log_events(name: &str, grid: &mut Grid<String>) {
    for event in grid.drain_events() {
        match event {
            GridEvent::RegionResized {
                payload,
                anchor,
                row_span,
                column_span,
                ..
            } => {
                tracing::info!(
                    "[{}] {} resized to {:?} spanning {}x{}",
                    name,
                    payload,
                    anchor,
                    row_span,
                    column_span
                );
            }
            GridEvent::RegionMoved { payload, from, to, .. } => {
                tracing::info!("[{}] {} moved from {:?} to {:?}", name, payload, from, to);
            }
            GridEvent::SizeRequested {
                payload,
                height,
                width,
                ..
            } => {
                tracing::debug!("[{}] {} should be {}x{} px", name, payload, width, height);
            }
        }
    }
}

/// Fill every cell but the last two rows, then put one 2x2 tile in the gap
fn populate(grid: &mut Grid<String>) -> Result<()> {
    for row in 0..ROWS - 2 {
        for column in 0..COLUMNS {
            grid.place_region(Cell::new(row, column), format!("{row}:{column}"), 1, 1)?;
        }
    }
    grid.place_region(Cell::new(ROWS - 2, 1), "big".to_string(), 2, 2)?;

    let scratch = grid.place_region(Cell::new(ROWS - 1, 0), "tmp".to_string(), 1, 1)?;
    grid.remove_region(scratch)?;

    grid.grow_rows(1)?;
    grid.grow_columns(1)?;
    grid.shrink_rows(1)?;
    grid.shrink_columns(1)?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting tile-demo");

    let config = TileConfig::load_or_default();
    let mut board: Grid<String> = Grid::new(ROWS, COLUMNS, config.clone())?;
    let mut dock: Grid<String> = Grid::new(3, 3, config)?;
    let mut links = LinkGraph::new();
    links.link(board.id(), dock.id())?;

    populate(&mut board)?;
    log_events("board", &mut board);
    println!("Initial board:\n{}", render(&board));

    // Drag the right edge of the big tile two tiles outward
    let big = board
        .region_id_at(Cell::new(ROWS - 2, 1))
        .context("big tile is missing")?;
    let rect = board.region_rect(big)?;
    let (press_x, press_y) = (rect.x + rect.width - 1, rect.y + rect.height / 2);
    if !rect.contains(press_x, press_y) {
        anyhow::bail!("press at ({press_x}, {press_y}) misses the big tile");
    }
    let (edge_x, middle_y) = (press_x - rect.x, press_y - rect.y);
    if let Some(mut session) = ResizeSession::begin_at(&mut board, big, edge_x, middle_y)? {
        let stride = (board.cell_width() + board.column_spacing()) as i32;
        let release_x = edge_x + 2 * stride;
        let plan = session.update(&mut board, release_x, middle_y)?;
        tracing::info!(
            "Resize preview: {} of {} requested tiles fit",
            plan.feasible_count,
            plan.requested
        );
        session.commit(&mut board, release_x, middle_y)?;
    }
    log_events("board", &mut board);
    println!("After resize:\n{}", render(&board));

    // Move the top-left tile into the middle of the dock
    let mut transfer = Transfer::new();
    let corner = board
        .region_id_at(Cell::new(0, 0))
        .context("corner tile is missing")?;
    let manifest = transfer.begin(&mut board, corner, 0, 0)?;
    let data = manifest.to_json()?;
    tracing::debug!("Drag data ({}): {}", TransferManifest::MIME_TYPE, data);
    let target = Cell::new(1, 1);
    if transfer.preview_drop(&links, &mut dock, &data, target) {
        transfer.commit(&links, &mut dock, target)?;
    } else {
        transfer.cancel(&mut board)?;
    }

    // A second drop onto the now occupied cell is refused and rolled back
    let neighbour = board
        .region_id_at(Cell::new(0, 1))
        .context("neighbour tile is missing")?;
    let data = transfer.begin(&mut board, neighbour, 0, 0)?.to_json()?;
    if transfer.validate_drop_target(&links, &dock, &data, target) {
        transfer.commit(&links, &mut dock, target)?;
    } else {
        tracing::warn!("Dock cell {:?} is taken, returning tile", target);
        transfer.cancel(&mut board)?;
    }

    log_events("board", &mut board);
    log_events("dock", &mut dock);
    println!("Board:\n{}", render(&board));
    println!("Dock:\n{}", render(&dock));

    links.unlink(board.id(), dock.id())?;
    board.verify_partition()?;
    dock.verify_partition()?;
    Ok(())
}
