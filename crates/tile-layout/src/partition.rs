// ABOUTME: Merge and split primitives that keep the cell partition consistent.
// ABOUTME: Every primitive validates the whole change before touching the grid.

use std::collections::BTreeSet;

use crate::geometry::{Area, Cell};
use crate::grid::{Grid, LayoutError};
use crate::region::{Region, RegionId};

impl<P: Clone> Grid<P> {
    /// Grow the filled region `survivor` to the given area by absorbing the
    /// empty regions that cover `cells`. Old footprint plus `cells` must be
    /// exactly the new area.
    pub fn merge(
        &mut self,
        survivor: RegionId,
        anchor: Cell,
        row_span: usize,
        column_span: usize,
        cells: &[Cell],
    ) -> Result<(), LayoutError> {
        if !self.region_ref(survivor)?.is_filled() {
            return Err(LayoutError::EmptyRegion(survivor));
        }
        self.absorb(survivor, anchor, row_span, column_span, cells)
    }

    /// `merge` without the filled check; placement grows the anchor region
    /// before its payload goes in
    pub(crate) fn absorb(
        &mut self,
        survivor: RegionId,
        anchor: Cell,
        row_span: usize,
        column_span: usize,
        cells: &[Cell],
    ) -> Result<(), LayoutError> {
        let region = self.region_ref(survivor)?;
        self.check_bounds(anchor, row_span, column_span)?;

        let absorb: BTreeSet<Cell> = cells.iter().copied().collect();
        let mut covered: BTreeSet<Cell> = region.cells().collect();
        if !covered.is_disjoint(&absorb) {
            return Err(LayoutError::InvalidArgument(
                "cells to absorb overlap the surviving region",
            ));
        }
        covered.extend(absorb.iter().copied());
        let target = Area::new(anchor, row_span, column_span);
        let expected: BTreeSet<Cell> = target.cells().collect();
        if covered != expected {
            return Err(LayoutError::InvalidArgument(
                "merged cells do not form the requested rectangle",
            ));
        }

        let victims = self.occupants(&absorb)?;
        for victim in &victims {
            let victim = self.region_ref(*victim)?;
            if victim.is_filled() {
                return Err(LayoutError::Overlap {
                    cell: anchor,
                    row_span,
                    column_span,
                });
            }
            if !victim.cells().all(|cell| absorb.contains(&cell)) {
                return Err(LayoutError::InvalidArgument(
                    "absorbed region extends outside the merge",
                ));
            }
        }

        for cell in &absorb {
            self.assign(*cell, survivor);
        }
        for victim in victims {
            self.discard_region(victim);
        }
        self.region_mut(survivor)?.set_area(target);
        Ok(())
    }

    /// Shrink `survivor` to the given area, handing `cells` back as fresh
    /// 1x1 empty regions. Old footprint minus `cells` must be exactly the new area.
    pub fn split(
        &mut self,
        survivor: RegionId,
        anchor: Cell,
        row_span: usize,
        column_span: usize,
        cells: &[Cell],
    ) -> Result<(), LayoutError> {
        if row_span == 0 || column_span == 0 {
            return Err(LayoutError::InvalidArgument("a region cannot shrink to zero span"));
        }
        let region = self.region_ref(survivor)?;
        let footprint: BTreeSet<Cell> = region.cells().collect();
        let release: BTreeSet<Cell> = cells.iter().copied().collect();
        if !release.is_subset(&footprint) {
            return Err(LayoutError::InvalidArgument(
                "released cells lie outside the region",
            ));
        }
        let target = Area::new(anchor, row_span, column_span);
        let remaining: BTreeSet<Cell> = footprint.difference(&release).copied().collect();
        let expected: BTreeSet<Cell> = target.cells().collect();
        if remaining != expected {
            return Err(LayoutError::InvalidArgument(
                "remaining cells do not form the requested rectangle",
            ));
        }

        for cell in release {
            let fresh = self.create_region(cell);
            self.assign(cell, fresh);
        }
        self.region_mut(survivor)?.set_area(target);
        Ok(())
    }

    /// Replace every region covering `cells` with fresh 1x1 empty regions and
    /// return the new region at `at`. Payloads of the old regions are dropped.
    pub fn hard_split(&mut self, cells: &[Cell], at: Cell) -> Result<RegionId, LayoutError> {
        self.split_all(cells, at).map(|(id, _)| id)
    }

    /// `hard_split` that hands the discarded regions back to the caller
    pub(crate) fn split_all(
        &mut self,
        cells: &[Cell],
        at: Cell,
    ) -> Result<(RegionId, Vec<Region<P>>), LayoutError> {
        let cells: BTreeSet<Cell> = cells.iter().copied().collect();
        if !cells.contains(&at) {
            return Err(LayoutError::InvalidArgument(
                "hard split handle cell is not part of the split",
            ));
        }
        for cell in &cells {
            self.check_bounds(*cell, 1, 1)?;
        }
        let occupants = self.occupants(&cells)?;
        for occupant in &occupants {
            let occupant = self.region_ref(*occupant)?;
            if !occupant.cells().all(|cell| cells.contains(&cell)) {
                return Err(LayoutError::InvalidArgument(
                    "hard split would leave part of a region behind",
                ));
            }
        }

        let mut handle = None;
        for cell in &cells {
            let fresh = self.create_region(*cell);
            self.assign(*cell, fresh);
            if *cell == at {
                handle = Some(fresh);
            }
        }
        let discarded = occupants
            .into_iter()
            .filter_map(|occupant| self.discard_region(occupant))
            .collect();
        let handle = handle.ok_or(LayoutError::Corrupt {
            cell: at,
            reason: "hard split produced no region at the handle cell",
        })?;
        Ok((handle, discarded))
    }

    /// Distinct regions referenced by a set of cells
    fn occupants(&self, cells: &BTreeSet<Cell>) -> Result<BTreeSet<RegionId>, LayoutError> {
        cells
            .iter()
            .map(|cell| {
                self.region_id_at(*cell).ok_or(LayoutError::Corrupt {
                    cell: *cell,
                    reason: "cell has no region",
                })
            })
            .collect()
    }
}
