// ABOUTME: Drag-style move of a tile's payload between linked grids.
// ABOUTME: Serializes the drag manifest as JSON and restores the source on cancel.

use serde::{Deserialize, Serialize};
use tile_core::Highlight;

use crate::geometry::{Area, Cell};
use crate::grid::{Grid, GridEvent, GridId, LayoutError};
use crate::link::LinkGraph;
use crate::region::RegionId;

/// What travels with a drag: where the tile came from and where it was grabbed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferManifest {
    pub origin_grid_id: GridId,
    pub row: usize,
    pub column: usize,
    pub row_span: usize,
    pub column_span: usize,
    /// Row within the tile that the pointer grabbed
    pub row_offset: usize,
    /// Column within the tile that the pointer grabbed
    pub column_offset: usize,
}

impl TransferManifest {
    pub const MIME_TYPE: &'static str = "application/x-tile-grid-transfer+json";

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse drag data. Anything malformed or degenerate yields None.
    pub fn from_json(data: &str) -> Option<Self> {
        let manifest: TransferManifest = serde_json::from_str(data).ok()?;
        if manifest.row_span == 0 || manifest.column_span == 0 {
            return None;
        }
        Some(manifest)
    }

    /// Geometry the tile had on its origin grid
    pub fn origin(&self) -> Area {
        Area::new(
            Cell::new(self.row, self.column),
            self.row_span,
            self.column_span,
        )
    }

    /// Anchor a drop lands on when the pointer is over `candidate`
    pub fn drop_anchor(&self, candidate: Cell) -> Option<Cell> {
        candidate.offset(-(self.row_offset as isize), -(self.column_offset as isize))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Idle,
    Dragging,
}

/// How the last finished transfer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Committed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("No transfer is in progress")]
    NotDragging,

    #[error("A transfer is already in progress")]
    AlreadyDragging,

    #[error("Drag and drop is disabled on grid {0}")]
    DragDisabled(GridId),

    #[error("Grid {destination} is not linked to origin grid {origin}")]
    NotLinked { origin: GridId, destination: GridId },

    #[error("Transfer came from grid {expected}, not {actual}")]
    OriginMismatch { expected: GridId, actual: GridId },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug)]
enum TransferState<P> {
    Idle,
    Dragging {
        manifest: TransferManifest,
        payload: P,
    },
}

/// Drives one drag at a time. The payload is held here between `begin` and
/// `commit`/`cancel`; it is never dropped by a failed call.
#[derive(Debug)]
pub struct Transfer<P> {
    state: TransferState<P>,
    last_outcome: Option<TransferOutcome>,
}

impl<P> Default for Transfer<P> {
    fn default() -> Self {
        Self {
            state: TransferState::Idle,
            last_outcome: None,
        }
    }
}

impl<P: Clone> Transfer<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TransferPhase {
        match self.state {
            TransferState::Idle => TransferPhase::Idle,
            TransferState::Dragging { .. } => TransferPhase::Dragging,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.phase() == TransferPhase::Dragging
    }

    pub fn manifest(&self) -> Option<&TransferManifest> {
        match &self.state {
            TransferState::Dragging { manifest, .. } => Some(manifest),
            TransferState::Idle => None,
        }
    }

    /// Payload in flight
    pub fn payload(&self) -> Option<&P> {
        match &self.state {
            TransferState::Dragging { payload, .. } => Some(payload),
            TransferState::Idle => None,
        }
    }

    pub fn last_outcome(&self) -> Option<TransferOutcome> {
        self.last_outcome
    }

    /// Lift a filled region off its grid. `row_offset`/`column_offset` name
    /// the cell of the region the pointer holds.
    pub fn begin(
        &mut self,
        source: &mut Grid<P>,
        region: RegionId,
        row_offset: usize,
        column_offset: usize,
    ) -> Result<TransferManifest, TransferError> {
        if self.is_dragging() {
            return Err(TransferError::AlreadyDragging);
        }
        if !source.config().drag_and_drop {
            return Err(TransferError::DragDisabled(source.id()));
        }
        let target = source
            .region(region)
            .ok_or(LayoutError::NotFound(region))?;
        if !target.is_filled() {
            return Err(LayoutError::EmptyRegion(region).into());
        }
        if row_offset >= target.row_span() || column_offset >= target.column_span() {
            return Err(LayoutError::InvalidArgument("grab offset lies outside the region").into());
        }

        let area = target.area();
        let manifest = TransferManifest {
            origin_grid_id: source.id(),
            row: area.anchor.row,
            column: area.anchor.column,
            row_span: area.row_span,
            column_span: area.column_span,
            row_offset,
            column_offset,
        };
        let payload = source.remove_region(region)?;
        self.state = TransferState::Dragging {
            manifest: manifest.clone(),
            payload,
        };

        tracing::info!(
            "Started transfer from grid {} at {:?} spanning {}x{}",
            manifest.origin_grid_id,
            area.anchor,
            area.row_span,
            area.column_span
        );
        Ok(manifest)
    }

    /// Begin from a press at a region-relative pixel position
    pub fn begin_at(
        &mut self,
        source: &mut Grid<P>,
        region: RegionId,
        x: i32,
        y: i32,
    ) -> Result<TransferManifest, TransferError> {
        let (row_offset, column_offset) = source.grab_offset(region, x, y)?;
        self.begin(source, region, row_offset, column_offset)
    }

    /// Would dropping `data` with the pointer over `candidate` succeed?
    pub fn validate_drop_target(
        &self,
        links: &LinkGraph,
        destination: &Grid<P>,
        data: &str,
        candidate: Cell,
    ) -> bool {
        self.drop_area(links, destination, data, candidate).is_some()
    }

    /// Validate a hover and paint the destination: drop-and-drag tint
    /// everywhere, plus the empty-check tint over an acceptable landing area
    pub fn preview_drop(
        &self,
        links: &LinkGraph,
        destination: &mut Grid<P>,
        data: &str,
        candidate: Cell,
    ) -> bool {
        let landing = self.drop_area(links, destination, data, candidate);
        destination.paint(Highlight::DragAndDrop);
        if let Some(area) = landing {
            destination.paint_area(Highlight::EmptyCheck, area);
        }
        landing.is_some()
    }

    /// Place the payload on `destination` with its anchor at `anchor`.
    /// On failure the transfer stays in progress.
    pub fn commit(
        &mut self,
        links: &LinkGraph,
        destination: &mut Grid<P>,
        anchor: Cell,
    ) -> Result<RegionId, TransferError> {
        let TransferState::Dragging { manifest, .. } = &self.state else {
            return Err(TransferError::NotDragging);
        };
        let origin = manifest.origin_grid_id;
        if !links.is_linked(origin, destination.id()) {
            tracing::warn!("Refused drop from grid {} onto unlinked grid {}", origin, destination.id());
            return Err(TransferError::NotLinked {
                origin,
                destination: destination.id(),
            });
        }
        if !destination.config().drag_and_drop {
            return Err(TransferError::DragDisabled(destination.id()));
        }

        let TransferState::Dragging { manifest, payload } =
            std::mem::replace(&mut self.state, TransferState::Idle)
        else {
            return Err(TransferError::NotDragging);
        };
        let id = match destination.place_region(
            anchor,
            payload.clone(),
            manifest.row_span,
            manifest.column_span,
        ) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("Drop at {:?} on grid {} refused: {}", anchor, destination.id(), err);
                self.state = TransferState::Dragging { manifest, payload };
                return Err(err.into());
            }
        };

        destination.push_event(GridEvent::RegionMoved {
            payload,
            origin,
            destination: destination.id(),
            from: manifest.origin().anchor,
            to: anchor,
        });
        destination.paint(Highlight::Idle);
        self.last_outcome = Some(TransferOutcome::Committed);

        tracing::info!(
            "Moved tile from grid {} {:?} to grid {} {:?}",
            origin,
            manifest.origin().anchor,
            destination.id(),
            anchor
        );
        Ok(id)
    }

    /// Put the payload back exactly where it was lifted from
    pub fn cancel(&mut self, source: &mut Grid<P>) -> Result<RegionId, TransferError> {
        let TransferState::Dragging { manifest, .. } = &self.state else {
            return Err(TransferError::NotDragging);
        };
        if manifest.origin_grid_id != source.id() {
            return Err(TransferError::OriginMismatch {
                expected: manifest.origin_grid_id,
                actual: source.id(),
            });
        }

        let TransferState::Dragging { manifest, payload } =
            std::mem::replace(&mut self.state, TransferState::Idle)
        else {
            return Err(TransferError::NotDragging);
        };
        let origin = manifest.origin();
        let id = match source.place_region(
            origin.anchor,
            payload.clone(),
            origin.row_span,
            origin.column_span,
        ) {
            Ok(id) => id,
            Err(err) => {
                self.state = TransferState::Dragging { manifest, payload };
                return Err(err.into());
            }
        };

        source.paint(Highlight::Idle);
        self.last_outcome = Some(TransferOutcome::Cancelled);
        tracing::info!("Cancelled transfer, tile back at {:?} on grid {}", origin.anchor, source.id());
        Ok(id)
    }

    fn drop_area(
        &self,
        links: &LinkGraph,
        destination: &Grid<P>,
        data: &str,
        candidate: Cell,
    ) -> Option<Area> {
        let active = self.manifest()?;
        let manifest = TransferManifest::from_json(data)?;
        if manifest != *active {
            tracing::debug!("Drag data does not describe the active transfer");
            return None;
        }
        if !destination.config().drag_and_drop
            || !links.is_linked(manifest.origin_grid_id, destination.id())
        {
            return None;
        }
        let anchor = manifest.drop_anchor(candidate)?;
        destination
            .is_area_empty(anchor, manifest.row_span, manifest.column_span)
            .then(|| Area::new(anchor, manifest.row_span, manifest.column_span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_core::TileConfig;

    fn grid(rows: usize, columns: usize) -> Grid<&'static str> {
        Grid::new(rows, columns, TileConfig::with_cell_size(10, 10).with_spacing(0, 0)).unwrap()
    }

    /// Per cell: the covering region's geometry and payload
    fn snapshot(grid: &Grid<&'static str>) -> Vec<(Area, Option<&'static str>)> {
        Area::new(Cell::new(0, 0), grid.rows(), grid.columns())
            .cells()
            .filter_map(|cell| grid.region_at(cell))
            .map(|region| (region.area(), region.payload().copied()))
            .collect()
    }

    #[test]
    fn moves_payload_to_linked_grid() {
        let mut a = grid(3, 3);
        let mut b = grid(3, 3);
        let mut links = LinkGraph::new();
        links.link(a.id(), b.id()).unwrap();
        let id = a.place_region(Cell::new(0, 0), "P", 1, 1).unwrap();
        b.drain_events();

        let mut transfer = Transfer::new();
        let manifest = transfer.begin(&mut a, id, 0, 0).unwrap();
        let data = manifest.to_json().unwrap();
        assert!(transfer.validate_drop_target(&links, &b, &data, Cell::new(2, 2)));

        let placed = transfer.commit(&links, &mut b, Cell::new(2, 2)).unwrap();
        assert!(a.is_area_empty(Cell::new(0, 0), 1, 1));
        assert_eq!(b.region(placed).unwrap().payload(), Some(&"P"));
        assert_eq!(transfer.phase(), TransferPhase::Idle);
        assert_eq!(transfer.last_outcome(), Some(TransferOutcome::Committed));

        let moved: Vec<_> = b
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, GridEvent::RegionMoved { .. }))
            .collect();
        assert_eq!(
            moved,
            vec![GridEvent::RegionMoved {
                payload: "P",
                origin: a.id(),
                destination: b.id(),
                from: Cell::new(0, 0),
                to: Cell::new(2, 2),
            }]
        );
        assert!(a.verify_partition().is_ok());
        assert!(b.verify_partition().is_ok());
    }

    #[test]
    fn cancel_restores_source_exactly() {
        let mut a = grid(4, 4);
        let b = grid(4, 4);
        let mut links = LinkGraph::new();
        links.link(a.id(), b.id()).unwrap();
        a.place_region(Cell::new(0, 3), "Q", 2, 1).unwrap();
        let id = a.place_region(Cell::new(1, 1), "P", 2, 2).unwrap();
        let before = snapshot(&a);

        let mut transfer = Transfer::new();
        let data = transfer.begin(&mut a, id, 1, 0).unwrap().to_json().unwrap();
        assert!(transfer.validate_drop_target(&links, &b, &data, Cell::new(3, 0)));
        assert!(!transfer.validate_drop_target(&links, &b, &data, Cell::new(0, 0)));
        assert!(transfer.validate_drop_target(&links, &a, &data, Cell::new(2, 1)));

        transfer.cancel(&mut a).unwrap();
        assert_eq!(snapshot(&a), before);
        assert_eq!(transfer.last_outcome(), Some(TransferOutcome::Cancelled));
        assert_eq!(transfer.cancel(&mut a), Err(TransferError::NotDragging));
        assert!(a.verify_partition().is_ok());
    }

    #[test]
    fn malformed_drag_data_is_rejected() {
        let mut a = grid(3, 3);
        let id = a.place_region(Cell::new(0, 0), "P", 1, 1).unwrap();
        let links = LinkGraph::new();
        let mut transfer = Transfer::new();
        let manifest = transfer.begin(&mut a, id, 0, 0).unwrap();

        let zero_span = TransferManifest {
            row_span: 0,
            ..manifest.clone()
        }
        .to_json()
        .unwrap();
        let missing = format!(r#"{{"originGridId":"{}","row":0,"column":0}}"#, a.id());
        for data in ["", "not json", "{}", missing.as_str(), zero_span.as_str()] {
            assert!(!transfer.validate_drop_target(&links, &a, data, Cell::new(1, 1)));
        }
        assert!(TransferManifest::from_json(&manifest.to_json().unwrap()).is_some());
    }

    #[test]
    fn stale_drag_data_is_rejected() {
        let mut a = grid(3, 3);
        let id = a.place_region(Cell::new(0, 0), "P", 1, 1).unwrap();
        let links = LinkGraph::new();
        let mut transfer = Transfer::new();
        let manifest = transfer.begin(&mut a, id, 0, 0).unwrap();

        let other = TransferManifest {
            origin_grid_id: GridId::new(),
            ..manifest
        };
        let data = other.to_json().unwrap();
        assert!(!transfer.validate_drop_target(&links, &a, &data, Cell::new(2, 2)));
    }

    #[test]
    fn unlinked_destination_is_refused() {
        let mut a = grid(3, 3);
        let mut b = grid(3, 3);
        let links = LinkGraph::new();
        let id = a.place_region(Cell::new(0, 0), "P", 1, 1).unwrap();

        let mut transfer = Transfer::new();
        let data = transfer.begin(&mut a, id, 0, 0).unwrap().to_json().unwrap();
        assert!(!transfer.validate_drop_target(&links, &b, &data, Cell::new(1, 1)));
        assert_eq!(
            transfer.commit(&links, &mut b, Cell::new(1, 1)),
            Err(TransferError::NotLinked {
                origin: a.id(),
                destination: b.id(),
            })
        );
        assert!(transfer.is_dragging());
        assert!(b.payloads().is_empty());
    }

    #[test]
    fn occupied_target_keeps_transfer_alive() {
        let mut a = grid(3, 3);
        let mut b = grid(3, 3);
        let mut links = LinkGraph::new();
        links.link(a.id(), b.id()).unwrap();
        let id = a.place_region(Cell::new(0, 0), "P", 1, 2).unwrap();
        b.place_region(Cell::new(1, 2), "X", 1, 1).unwrap();

        let mut transfer = Transfer::new();
        let data = transfer.begin(&mut a, id, 0, 0).unwrap().to_json().unwrap();
        assert!(!transfer.validate_drop_target(&links, &b, &data, Cell::new(1, 1)));
        assert!(matches!(
            transfer.commit(&links, &mut b, Cell::new(1, 1)),
            Err(TransferError::Layout(LayoutError::Overlap { .. }))
        ));
        assert_eq!(transfer.payload(), Some(&"P"));
        assert_eq!(b.payloads(), vec![&"X"]);

        transfer.cancel(&mut a).unwrap();
        assert_eq!(a.region_at(Cell::new(0, 1)).and_then(|r| r.payload()), Some(&"P"));
    }

    #[test]
    fn grab_offset_shifts_drop_anchor() {
        let mut a = grid(4, 4);
        let mut b = grid(4, 4);
        let mut links = LinkGraph::new();
        links.link(b.id(), a.id()).unwrap();
        let id = a.place_region(Cell::new(0, 0), "P", 2, 2).unwrap();

        let mut transfer = Transfer::new();
        let manifest = transfer.begin_at(&mut a, id, 15, 15).unwrap();
        assert_eq!((manifest.row_offset, manifest.column_offset), (1, 1));
        assert_eq!(manifest.drop_anchor(Cell::new(3, 3)), Some(Cell::new(2, 2)));

        let data = manifest.to_json().unwrap();
        assert!(transfer.validate_drop_target(&links, &b, &data, Cell::new(3, 3)));
        assert!(!transfer.validate_drop_target(&links, &b, &data, Cell::new(0, 0)));

        let placed = transfer.commit(&links, &mut b, Cell::new(2, 2)).unwrap();
        assert_eq!(b.region(placed).unwrap().area(), Area::new(Cell::new(2, 2), 2, 2));
    }

    #[test]
    fn same_grid_move_needs_no_link() {
        let mut a = grid(3, 3);
        let links = LinkGraph::new();
        let id = a.place_region(Cell::new(0, 0), "P", 1, 1).unwrap();

        let mut transfer = Transfer::new();
        transfer.begin(&mut a, id, 0, 0).unwrap();
        transfer.commit(&links, &mut a, Cell::new(2, 2)).unwrap();
        assert!(a.is_area_empty(Cell::new(0, 0), 1, 1));
        assert!(!a.is_area_empty(Cell::new(2, 2), 1, 1));
        assert!(a.verify_partition().is_ok());
    }

    #[test]
    fn protocol_order_is_enforced() {
        let mut a = grid(2, 2);
        let links = LinkGraph::new();
        let id = a.place_region(Cell::new(0, 0), "P", 1, 1).unwrap();
        let other = a.place_region(Cell::new(1, 1), "Q", 1, 1).unwrap();

        let mut transfer = Transfer::new();
        assert_eq!(
            transfer.commit(&links, &mut a, Cell::new(0, 1)),
            Err(TransferError::NotDragging)
        );
        transfer.begin(&mut a, id, 0, 0).unwrap();
        assert_eq!(transfer.begin(&mut a, other, 0, 0), Err(TransferError::AlreadyDragging));

        let mut b = grid(2, 2);
        assert!(matches!(
            transfer.cancel(&mut b),
            Err(TransferError::OriginMismatch { .. })
        ));
        assert!(transfer.cancel(&mut a).is_ok());
    }

    #[test]
    fn disabled_grids_refuse_drags() {
        let mut a = grid(2, 2);
        let id = a.place_region(Cell::new(0, 0), "P", 1, 1).unwrap();
        a.set_drag_and_drop(false);

        let mut transfer = Transfer::new();
        assert_eq!(
            transfer.begin(&mut a, id, 0, 0),
            Err(TransferError::DragDisabled(a.id()))
        );
        assert!(a.region(id).is_some_and(|r| r.is_filled()));
        assert!(matches!(
            transfer.begin(&mut a, id, 1, 0),
            Err(TransferError::DragDisabled(_))
        ));
    }

    #[test]
    fn preview_paints_landing_area() {
        let mut a = grid(3, 3);
        let mut b = grid(3, 3);
        let mut links = LinkGraph::new();
        links.link(a.id(), b.id()).unwrap();
        let id = a.place_region(Cell::new(0, 0), "P", 1, 2).unwrap();

        let mut transfer = Transfer::new();
        let data = transfer.begin(&mut a, id, 0, 0).unwrap().to_json().unwrap();
        assert!(transfer.preview_drop(&links, &mut b, &data, Cell::new(2, 0)));
        assert_eq!(b.highlight(Cell::new(2, 1)), Some(Highlight::EmptyCheck));
        assert_eq!(b.highlight(Cell::new(0, 0)), Some(Highlight::DragAndDrop));

        assert!(!transfer.preview_drop(&links, &mut b, &data, Cell::new(2, 2)));
        assert_eq!(b.highlight(Cell::new(2, 1)), Some(Highlight::DragAndDrop));
    }

    #[test]
    fn manifest_uses_camel_case_fields() {
        let manifest = TransferManifest {
            origin_grid_id: GridId::new(),
            row: 1,
            column: 2,
            row_span: 3,
            column_span: 1,
            row_offset: 2,
            column_offset: 0,
        };
        let json = manifest.to_json().unwrap();
        for field in ["originGridId", "rowSpan", "columnSpan", "rowOffset", "columnOffset"] {
            assert!(json.contains(field), "{json} lacks {field}");
        }
        assert_eq!(TransferManifest::from_json(&json), Some(manifest));
    }
}
