// ABOUTME: Symmetric registry of grids allowed to exchange tiles.
// ABOUTME: Every grid is implicitly linked to itself.

use std::collections::HashSet;

use crate::grid::GridId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("Grids {0} and {1} are already linked")]
    AlreadyLinked(GridId, GridId),

    #[error("Grids {0} and {1} are not linked")]
    NotLinked(GridId, GridId),

    #[error("Grid {0} is always linked to itself")]
    SelfLink(GridId),
}

#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    /// Unordered pairs, stored smallest id first
    links: HashSet<(GridId, GridId)>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(&mut self, a: GridId, b: GridId) -> Result<(), LinkError> {
        if a == b || !self.links.insert(Self::key(a, b)) {
            return Err(LinkError::AlreadyLinked(a, b));
        }
        tracing::debug!("Linked grids {} and {}", a, b);
        Ok(())
    }

    pub fn unlink(&mut self, a: GridId, b: GridId) -> Result<(), LinkError> {
        if a == b {
            return Err(LinkError::SelfLink(a));
        }
        if !self.links.remove(&Self::key(a, b)) {
            return Err(LinkError::NotLinked(a, b));
        }
        tracing::debug!("Unlinked grids {} and {}", a, b);
        Ok(())
    }

    pub fn is_linked(&self, a: GridId, b: GridId) -> bool {
        a == b || self.links.contains(&Self::key(a, b))
    }

    /// Grids `grid` may exchange tiles with, itself included, sorted
    pub fn linked_to(&self, grid: GridId) -> Vec<GridId> {
        let mut linked: Vec<GridId> = self
            .links
            .iter()
            .filter_map(|&(a, b)| match (a == grid, b == grid) {
                (true, _) => Some(b),
                (_, true) => Some(a),
                _ => None,
            })
            .collect();
        linked.push(grid);
        linked.sort();
        linked
    }

    /// Drop every link touching a grid that is going away
    pub fn forget(&mut self, grid: GridId) {
        self.links.retain(|&(a, b)| a != grid && b != grid);
    }

    fn key(a: GridId, b: GridId) -> (GridId, GridId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}
