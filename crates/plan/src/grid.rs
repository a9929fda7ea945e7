use serde::Serialize;

/// Largest encroachment distance recorded at a cell during planning.
///
/// `x` is measured along columns, `z` along rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Clearance {
    pub x: f32,
    pub z: f32,
}

/// One grid cell. A non-zero `width` means a plot is centered here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Cell {
    pub width: u32,
    pub height: u32,
    pub clearance: Clearance,
}

impl Cell {
    pub fn is_occupied(&self) -> bool {
        self.width > 0
    }
}

/// A placed plot, as handed to placement callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlacementRequest {
    pub row: usize,
    pub col: usize,
    pub width: u32,
    pub height: u32,
}

impl PlacementRequest {
    /// Whether the `(2w-1)`-sided footprints of two plots share any cell.
    pub fn footprint_intersects(&self, other: &PlacementRequest) -> bool {
        let reach = (self.width + other.width) as usize - 2;
        self.row.abs_diff(other.row) <= reach && self.col.abs_diff(other.col) <= reach
    }

    /// Whether `other`'s extent (`center ± width/2`) lies entirely inside
    /// this plot's extent on both axes.
    pub fn encloses(&self, other: &PlacementRequest) -> bool {
        let fits = |delta: usize| 2 * delta + other.width as usize <= self.width as usize;
        fits(self.row.abs_diff(other.row)) && fits(self.col.abs_diff(other.col))
    }
}

/// Row-major occupancy grid produced by the planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get a cell, or `None` when out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        &mut self.cells[row * self.cols + col]
    }

    /// The plot centered at a cell, if any.
    pub fn placement_at(&self, row: usize, col: usize) -> Option<PlacementRequest> {
        self.cell(row, col)
            .filter(|c| c.is_occupied())
            .map(|c| PlacementRequest {
                row,
                col,
                width: c.width,
                height: c.height,
            })
    }

    /// Every placed plot, in row-major scan order.
    pub fn placements(&self) -> impl Iterator<Item = PlacementRequest> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_occupied())
            .map(|(i, c)| PlacementRequest {
                row: i / self.cols,
                col: i % self.cols,
                width: c.width,
                height: c.height,
            })
    }

    /// Number of cells holding a plot.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Brute-force list of plot pairs whose footprints intersect.
    pub fn overlapping_pairs(&self) -> Vec<(PlacementRequest, PlacementRequest)> {
        let placed: Vec<_> = self.placements().collect();
        let mut pairs = Vec::new();
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                if a.footprint_intersects(b) {
                    pairs.push((*a, *b));
                }
            }
        }
        pairs
    }

    /// Text dump of plot widths, one bracketed line per row.
    pub fn width_map(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols * 2 + 4));
        for row in self.cells.chunks(self.cols.max(1)) {
            out.push_str("[ ");
            for cell in row {
                out.push_str(&cell.width.to_string());
                out.push(' ');
            }
            out.push_str("]\n");
        }
        out
    }
}
