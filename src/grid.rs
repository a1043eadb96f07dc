use crate::config::ConfigError;
use crate::constants::{DEFAULT_GRID_SIZE, MIN_GRID_SIZE};
use crate::types::Direction;

/// Square board addressed by linear index; the exit is always the last cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
        }
    }
}

impl GridConfig {
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall {
                size,
                min: MIN_GRID_SIZE,
            });
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    pub fn exit_cell(&self) -> usize {
        self.cell_count() - 1
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos < self.cell_count()
    }

    pub fn to_row_col(&self, pos: usize) -> (usize, usize) {
        (pos / self.size, pos % self.size)
    }

    pub fn to_index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    /// Cell one step away in `dir`, or `None` when that step leaves the board.
    pub fn step(&self, pos: usize, dir: Direction) -> Option<usize> {
        let (row, col) = self.to_row_col(pos);
        let last = self.size - 1;
        match dir {
            Direction::Up if row > 0 => Some(self.to_index(row - 1, col)),
            Direction::Down if row < last => Some(self.to_index(row + 1, col)),
            Direction::Left if col > 0 => Some(self.to_index(row, col - 1)),
            Direction::Right if col < last => Some(self.to_index(row, col + 1)),
            _ => None,
        }
    }

    /// In-bounds 4-neighbors in up, down, left, right order.
    pub fn neighbors(&self, pos: usize) -> Vec<usize> {
        Direction::EVALUATION_ORDER
            .iter()
            .filter_map(|dir| self.step(pos, *dir))
            .collect()
    }

    pub fn manhattan(&self, a: usize, b: usize) -> usize {
        let (ar, ac) = self.to_row_col(a);
        let (br, bc) = self.to_row_col(b);
        ar.abs_diff(br) + ac.abs_diff(bc)
    }
}
