use crate::grid::GridConfig;
use crate::types::Direction;

/// Applies one player step; leaving the board is a no-op.
pub fn resolve_player_move(grid: &GridConfig, pos: usize, dir: Direction) -> usize {
    grid.step(pos, dir).unwrap_or(pos)
}

/// One greedy step toward `exit`: the first strictly closest neighbor in
/// up, down, left, right order, or `pos` when no neighbor is closer.
pub fn resolve_pursued_move(grid: &GridConfig, pos: usize, exit: usize) -> usize {
    let mut best = pos;
    let mut best_distance = grid.manhattan(pos, exit);
    for candidate in grid.neighbors(pos) {
        let distance = grid.manhattan(candidate, exit);
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}
