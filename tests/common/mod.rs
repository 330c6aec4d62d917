use rand::{Rng as _, SeedableRng as _};
use rand_xoshiro::Xoshiro256PlusPlus;

use kyokumen::*;

pub fn sq(col: i32, row: i32) -> Square {
    Square::from_col_row(Col::from_inner(col), Row::from_inner(row))
}

pub fn rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

/// 疑似指し手からランダムに 1 手選ぶ。指し手がなければ `None`。
pub fn random_move(rng: &mut Xoshiro256PlusPlus, pos: &Position) -> Option<Move> {
    let mvs = generate_pseudo_moves(pos);
    if mvs.is_empty() {
        return None;
    }

    Some(mvs[rng.random_range(0..mvs.len())])
}
