use crate::types::Collision;

/// Escape is checked first; a pursued entity arriving on an exit the player
/// already occupies counts as a capture.
pub fn evaluate(player_pos: usize, pursued_pos: usize, exit: usize) -> Collision {
    if pursued_pos == exit && player_pos != exit {
        return Collision::Escaped;
    }
    if player_pos == pursued_pos {
        return Collision::Captured;
    }
    Collision::Continue
}
