// ABOUTME: Cell addresses, rectangular areas and pixel rectangles.
// ABOUTME: Direction arithmetic shared by resize planning and hit testing.

/// A unit address on a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Shift by a signed amount; None when the result would be negative
    pub fn offset(self, rows: isize, columns: isize) -> Option<Cell> {
        Some(Cell {
            row: self.row.checked_add_signed(rows)?,
            column: self.column.checked_add_signed(columns)?,
        })
    }
}

/// Edge of a region that a resize moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector as (row delta, column delta)
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Right and Down point away from the anchor
    pub fn is_positive(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

/// Rectangle of cells: anchor (top-left) plus span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Area {
    pub anchor: Cell,
    pub row_span: usize,
    pub column_span: usize,
}

impl Area {
    pub const fn new(anchor: Cell, row_span: usize, column_span: usize) -> Self {
        Self {
            anchor,
            row_span,
            column_span,
        }
    }

    /// One past the last row
    pub fn end_row(&self) -> usize {
        self.anchor.row + self.row_span
    }

    /// One past the last column
    pub fn end_column(&self) -> usize {
        self.anchor.column + self.column_span
    }

    pub fn is_empty(&self) -> bool {
        self.row_span == 0 || self.column_span == 0
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (self.anchor.row..self.end_row()).contains(&cell.row)
            && (self.anchor.column..self.end_column()).contains(&cell.column)
    }

    /// Row-major iteration over every covered cell
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let Area {
            anchor,
            row_span,
            column_span,
        } = *self;
        (anchor.row..anchor.row + row_span).flat_map(move |row| {
            (anchor.column..anchor.column + column_span).map(move |column| Cell::new(row, column))
        })
    }

    /// Span along the axis a direction moves on
    pub fn span_along(&self, direction: Direction) -> usize {
        if direction.is_horizontal() {
            self.column_span
        } else {
            self.row_span
        }
    }

    /// Area with the edge facing `direction` moved outward by `delta` tiles
    /// (inward when negative). None if the result underflows or collapses.
    pub fn resized(&self, direction: Direction, delta: isize) -> Option<Area> {
        let (dr, dc) = direction.delta();
        let row_span = self.row_span.checked_add_signed(delta * dr.abs())?;
        let column_span = self.column_span.checked_add_signed(delta * dc.abs())?;
        // The anchor only moves when the leading (top/left) edge moves
        let row = self.anchor.row.checked_add_signed(delta * dr.min(0))?;
        let column = self.anchor.column.checked_add_signed(delta * dc.min(0))?;
        if row_span == 0 || column_span == 0 {
            return None;
        }
        Some(Area::new(Cell::new(row, column), row_span, column_span))
    }

    /// Band of `thickness` tiles along the inside of the edge facing `direction`
    pub fn edge_band(&self, direction: Direction, thickness: usize) -> Area {
        let (dr, dc) = direction.delta();
        let thickness = thickness.min(self.span_along(direction));
        let row_span = if dr != 0 { thickness } else { self.row_span };
        let column_span = if dc != 0 { thickness } else { self.column_span };
        let row = self.anchor.row + (self.row_span - row_span) * dr.max(0) as usize;
        let column = self.anchor.column + (self.column_span - column_span) * dc.max(0) as usize;
        Area::new(Cell::new(row, column), row_span, column_span)
    }
}

/// Rectangle in pixels, relative to the grid's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Pixel length of `span` tiles of `tile` pixels separated by `spacing`
pub fn span_extent(span: usize, tile: u32, spacing: u32) -> u32 {
    let span = span as u32;
    span * tile + span.saturating_sub(1) * spacing
}
