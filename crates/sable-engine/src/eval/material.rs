//! Material balance and game phase.
//!
//! Scores are from White's perspective (positive = White ahead).

use shakmaty::{Board, Color, Role};

/// Centipawn value per role, indexed by [`role_index`].
pub const MATERIAL_VALUE: [i32; 6] = [100, 320, 330, 500, 900, 0];

/// Bonus for owning two or more bishops.
pub const BISHOP_PAIR_BONUS: i32 = 50;

/// Phase of a full starting complement of non-pawn material.
///
/// Weights: Knight=1, Bishop=1, Rook=2, Queen=4.
pub const MAX_PHASE: i32 = 24;

/// Every role, in table order.
pub const ROLES: [Role; 6] = [
    Role::Pawn,
    Role::Knight,
    Role::Bishop,
    Role::Rook,
    Role::Queen,
    Role::King,
];

/// Table index of a role (pawn = 0 .. king = 5).
pub fn role_index(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

fn count(board: &Board, color: Color, role: Role) -> i32 {
    (board.by_color(color) & board.by_role(role)).count() as i32
}

/// Material balance including the bishop-pair bonus.
pub fn material(board: &Board) -> i32 {
    let mut score = 0;
    for role in ROLES {
        let diff = count(board, Color::White, role) - count(board, Color::Black, role);
        score += MATERIAL_VALUE[role_index(role)] * diff;
    }

    if count(board, Color::White, Role::Bishop) >= 2 {
        score += BISHOP_PAIR_BONUS;
    }
    if count(board, Color::Black, Role::Bishop) >= 2 {
        score -= BISHOP_PAIR_BONUS;
    }
    score
}

/// Game phase in `0..=MAX_PHASE` from remaining non-pawn material.
pub fn game_phase(board: &Board) -> i32 {
    let phase = board.knights().count() as i32
        + board.bishops().count() as i32
        + board.rooks().count() as i32 * 2
        + board.queens().count() as i32 * 4;
    phase.min(MAX_PHASE)
}
