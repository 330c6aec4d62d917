//! 利き情報関連。
//!
//! 利きは近接利き (1 マス移動と桂跳び) と遠隔利き (香、角、飛車、馬、龍の走り) に分けて扱う。
//! 局面は両者を合わせた利き数と、各マスに届いている遠隔利きの方向を差分更新で保持する。
//! 本モジュールはその定義となる駒ごとの利きテーブルと、盤面から一から計算する関数を提供する。

use crate::shogi::*;

/// 指定した駒の近接利きの差分値を返す。陣営を区別する。
///
/// 馬の近接利きは縦横 1 マス、龍の近接利きは斜め 1 マス。走りの部分は `ranged_dirs()` が受け持つ。
pub fn melee_deltas(pc: Piece) -> &'static [i32] {
    const RU: i32 = Square::DIR_RU;
    const R: i32 = Square::DIR_R;
    const RD: i32 = Square::DIR_RD;
    const U: i32 = Square::DIR_U;
    const D: i32 = Square::DIR_D;
    const LU: i32 = Square::DIR_LU;
    const L: i32 = Square::DIR_L;
    const LD: i32 = Square::DIR_LD;
    const RUU: i32 = Square::DIR_RUU;
    const LUU: i32 = Square::DIR_LUU;

    const NONE: &[i32] = &[];

    const B_PAWN_DELTAS: &[i32] = &[U];
    const B_KNIGHT_DELTAS: &[i32] = &[RUU, LUU];
    const B_SILVER_DELTAS: &[i32] = &[RU, U, LU, RD, LD];
    const B_GOLD_DELTAS: &[i32] = &[RU, U, LU, R, L, D];

    // 後手の駒は先手の差分値の符号を反転したもの。
    const W_PAWN_DELTAS: &[i32] = &[-U];
    const W_KNIGHT_DELTAS: &[i32] = &[-RUU, -LUU];
    const W_SILVER_DELTAS: &[i32] = &[-RU, -U, -LU, -RD, -LD];
    const W_GOLD_DELTAS: &[i32] = &[-RU, -U, -LU, -R, -L, -D];

    const KING_DELTAS: &[i32] = &[RU, R, RD, U, D, LU, L, LD];
    const HORSE_DELTAS: &[i32] = &[R, U, D, L];
    const DRAGON_DELTAS: &[i32] = &[RU, RD, LU, LD];

    const TABLE: [&[i32]; Piece::NB] = [
        NONE,            // NO_PIECE
        B_PAWN_DELTAS,   // B_PAWN
        NONE,            // B_LANCE
        B_KNIGHT_DELTAS, // B_KNIGHT
        B_SILVER_DELTAS, // B_SILVER
        NONE,            // B_BISHOP
        NONE,            // B_ROOK
        B_GOLD_DELTAS,   // B_GOLD
        KING_DELTAS,     // B_KING
        B_GOLD_DELTAS,   // B_PRO_PAWN
        B_GOLD_DELTAS,   // B_PRO_LANCE
        B_GOLD_DELTAS,   // B_PRO_KNIGHT
        B_GOLD_DELTAS,   // B_PRO_SILVER
        HORSE_DELTAS,    // B_HORSE
        DRAGON_DELTAS,   // B_DRAGON
        NONE,            // (15)
        NONE,            // (16)
        W_PAWN_DELTAS,   // W_PAWN
        NONE,            // W_LANCE
        W_KNIGHT_DELTAS, // W_KNIGHT
        W_SILVER_DELTAS, // W_SILVER
        NONE,            // W_BISHOP
        NONE,            // W_ROOK
        W_GOLD_DELTAS,   // W_GOLD
        KING_DELTAS,     // W_KING
        W_GOLD_DELTAS,   // W_PRO_PAWN
        W_GOLD_DELTAS,   // W_PRO_LANCE
        W_GOLD_DELTAS,   // W_PRO_KNIGHT
        W_GOLD_DELTAS,   // W_PRO_SILVER
        HORSE_DELTAS,    // W_HORSE
        DRAGON_DELTAS,   // W_DRAGON
        NONE,            // WALL
    ];

    TABLE[usize::from(pc)]
}

/// 指定した駒の遠隔利きの方向を返す。陣営を区別する。
pub const fn ranged_dirs(pc: Piece) -> DirectionSet {
    const DIAGONAL: DirectionSet = DirectionSet::DIAGONAL;
    const ORTHOGONAL: DirectionSet = DirectionSet::ORTHOGONAL;
    const NONE: DirectionSet = DirectionSet::empty();

    // 遠隔利きを持つのは香、角、飛車、馬、龍のみ。
    const TABLE: [DirectionSet; Piece::NB] = [
        NONE,             // NO_PIECE
        NONE,             // B_PAWN
        DirectionSet::U,  // B_LANCE
        NONE,             // B_KNIGHT
        NONE,             // B_SILVER
        DIAGONAL,         // B_BISHOP
        ORTHOGONAL,       // B_ROOK
        NONE,             // B_GOLD
        NONE,             // B_KING
        NONE,             // B_PRO_PAWN
        NONE,             // B_PRO_LANCE
        NONE,             // B_PRO_KNIGHT
        NONE,             // B_PRO_SILVER
        DIAGONAL,         // B_HORSE
        ORTHOGONAL,       // B_DRAGON
        NONE,             // (15)
        NONE,             // (16)
        NONE,             // W_PAWN
        DirectionSet::D,  // W_LANCE
        NONE,             // W_KNIGHT
        NONE,             // W_SILVER
        DIAGONAL,         // W_BISHOP
        ORTHOGONAL,       // W_ROOK
        NONE,             // W_GOLD
        NONE,             // W_KING
        NONE,             // W_PRO_PAWN
        NONE,             // W_PRO_LANCE
        NONE,             // W_PRO_KNIGHT
        NONE,             // W_PRO_SILVER
        DIAGONAL,         // W_HORSE
        ORTHOGONAL,       // W_DRAGON
        NONE,             // WALL
    ];

    TABLE[pc.inner() as usize]
}

/// 盤面上の各マスの利き数を保持する。一方の陣営のみ。壁マスは常に 0。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct ControlBoard([u8; SQUARE_NB]);

impl ControlBoard {
    /// 全マスの利き数が 0 の `ControlBoard` を返す。
    pub const fn empty() -> Self {
        Self([0; SQUARE_NB])
    }
}

impl std::ops::Index<Square> for ControlBoard {
    type Output = u8;

    fn index(&self, sq: Square) -> &Self::Output {
        &self.0[usize::from(sq)]
    }
}

impl std::ops::IndexMut<Square> for ControlBoard {
    fn index_mut(&mut self, sq: Square) -> &mut Self::Output {
        &mut self.0[usize::from(sq)]
    }
}

impl std::fmt::Display for ControlBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in Row::iter() {
            for col in Col::iter().rev() {
                let n = self[Square::from_col_row(col, row)];
                if n < 16 {
                    write!(f, "{:X}", n)?;
                } else {
                    write!(f, "[{}]", n)?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// 盤面上の各マスについて、一方の陣営の遠隔利きが届いている方向を保持する。
///
/// 方向は利きの進む向き。たとえば先手の香の利きが届いているマスには `Direction::U` が含まれる。
/// 遠隔利きは最初の駒 (敵味方問わず) で止まり、そのマスも含む。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct RangedBoard([DirectionSet; SQUARE_NB]);

impl RangedBoard {
    /// 全マスに一切の遠隔利きがない `RangedBoard` を返す。
    pub const fn empty() -> Self {
        Self([DirectionSet::empty(); SQUARE_NB])
    }
}

impl std::ops::Index<Square> for RangedBoard {
    type Output = DirectionSet;

    fn index(&self, sq: Square) -> &Self::Output {
        &self.0[usize::from(sq)]
    }
}

impl std::ops::IndexMut<Square> for RangedBoard {
    fn index_mut(&mut self, sq: Square) -> &mut Self::Output {
        &mut self.0[usize::from(sq)]
    }
}

/// `origin` から `delta` 方向へ走る遠隔利きが届くマスを列挙する。
///
/// 壁の手前まで、または最初に駒があるマス (そのマスを含む) まで。
pub fn ray<'a, B: PieceAt + ?Sized>(
    board: &'a B,
    origin: Square,
    delta: i32,
) -> impl Iterator<Item = Square> + 'a {
    let mut sq = origin;
    let mut blocked = false;

    std::iter::from_fn(move || {
        if blocked {
            return None;
        }

        sq += delta;
        let pc = board.piece_at(sq);
        if pc.is_wall() {
            blocked = true;
            return None;
        }
        blocked = !pc.is_empty();

        Some(sq)
    })
}

/// 盤面から一方の陣営の利き数を一から計算する。
pub fn calc_control<B: PieceAt + ?Sized>(board: &B, side: Side) -> ControlBoard {
    let mut control = ControlBoard::empty();

    for src in Square::iter() {
        let pc = board.piece_at(src);
        if !pc.is_piece() || pc.side() != side {
            continue;
        }

        for &delta in melee_deltas(pc) {
            let dst = src + delta;
            if !board.piece_at(dst).is_wall() {
                control[dst] += 1;
            }
        }

        for dir in ranged_dirs(pc).iter() {
            for dst in ray(board, src, dir.to_delta()) {
                control[dst] += 1;
            }
        }
    }

    control
}

/// 盤面から一方の陣営の遠隔利きの方向を一から計算する。
pub fn calc_ranged<B: PieceAt + ?Sized>(board: &B, side: Side) -> RangedBoard {
    let mut ranged = RangedBoard::empty();

    for src in Square::iter() {
        let pc = board.piece_at(src);
        if !pc.is_piece() || pc.side() != side {
            continue;
        }

        for dir in ranged_dirs(pc).iter() {
            for dst in ray(board, src, dir.to_delta()) {
                ranged[dst] |= DirectionSet::from(dir);
            }
        }
    }

    ranged
}

#[cfg(test)]
mod tests {
    use super::*;

    use itertools::assert_equal;
    #[allow(unused_imports)]
    use pretty_assertions::{assert_eq, assert_ne};

    fn sq(col: i32, row: i32) -> Square {
        Square::from_col_row(Col::from_inner(col), Row::from_inner(row))
    }

    #[test]
    fn test_tables_mirror() {
        for pc in Piece::iter().filter(|pc| pc.side() == BLACK) {
            let pc_w = Piece::new(WHITE, pc.kind());

            let mut deltas_b: Vec<_> = melee_deltas(pc).iter().map(|&d| -d).collect();
            let mut deltas_w = melee_deltas(pc_w).to_vec();
            deltas_b.sort_unstable();
            deltas_w.sort_unstable();
            assert_eq!(deltas_b, deltas_w);

            assert_eq!(ranged_dirs(pc).len(), ranged_dirs(pc_w).len());
        }

        assert!(melee_deltas(WALL).is_empty());
        assert!(ranged_dirs(NO_PIECE).is_empty());
    }

    #[test]
    fn test_ray() {
        let mut board = Board::empty();
        board[sq(5, 5)] = B_ROOK;
        board[sq(5, 2)] = W_PAWN;

        assert_equal(
            ray(&board, sq(5, 5), Square::DIR_U),
            [sq(5, 4), sq(5, 3), sq(5, 2)],
        );
        assert_equal(
            ray(&board, sq(5, 5), Square::DIR_D),
            [sq(5, 6), sq(5, 7), sq(5, 8), sq(5, 9)],
        );
        assert_eq!(ray(&board, sq(1, 5), Square::DIR_R).count(), 0);
    }

    #[test]
    fn test_calc_control_startpos() {
        let board = Board::startpos();

        let black = calc_control(&board, BLACK);
        let white = calc_control(&board, WHITE);

        // ５八には玉、左右の金、飛車の横利きが届く。
        assert_eq!(black[sq(5, 8)], 4);
        assert_eq!(black[sq(7, 6)], 1);
        assert_eq!(white[sq(7, 6)], 0);
        // １八には香と飛車の横利き。
        assert_eq!(black[sq(1, 8)], 2);

        // 盤面は点対称なので、利き数も点対称になる。
        for s in Square::iter() {
            let mirror = sq(10 - s.col().inner(), 10 - s.row().inner());
            assert_eq!(black[s], white[mirror]);
        }

        assert_eq!(black[SQ_NONE], 0);
    }

    #[test]
    fn test_calc_ranged() {
        let mut board = Board::empty();
        board[sq(2, 8)] = B_BISHOP;
        board[sq(5, 5)] = W_GOLD;
        board[sq(1, 9)] = W_LANCE;

        let black = calc_ranged(&board, BLACK);
        let white = calc_ranged(&board, WHITE);

        assert_eq!(black[sq(4, 6)], DirectionSet::LU);
        assert_eq!(black[sq(5, 5)], DirectionSet::LU);
        assert_eq!(black[sq(6, 4)], DirectionSet::empty());
        assert_eq!(black[sq(1, 7)], DirectionSet::RU);
        assert_eq!(black[sq(1, 9)], DirectionSet::RD);

        // 九段目の香は盤外へ向かうので利きがない。
        assert!(Square::iter().all(|s| white[s].is_empty()));
    }

    #[test]
    fn test_control_board_display() {
        let mut control = ControlBoard::empty();
        control[sq(9, 1)] = 11;
        control[sq(1, 9)] = 20;

        let s = control.to_string();
        let lines: Vec<_> = s.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "B00000000");
        assert_eq!(lines[8], "00000000[20]");
    }
}
