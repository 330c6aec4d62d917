//! Zobrist ハッシュ。
//!
//! (駒, マス) の組ごと、および手番ごとに 64bit の乱数を割り当て、局面のハッシュ値はそれらの XOR とする。
//! テーブルは固定シードの疑似乱数で一度だけ生成され、以後は読み取り専用。
//! 初回アクセス時に自動で生成されるが、`init()` で明示的に生成しておくこともできる。

use once_cell::sync::OnceCell;
use rand::{RngCore as _, SeedableRng as _};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::shogi::*;

/// 局面のハッシュ値。
pub type Key = u64;

/// テーブル生成に使うシード。
const SEED: u64 = 20150503;

#[derive(Debug)]
struct ZobristTable {
    /// 駒の内部値、マスの内部値の順でインデックスアクセスする。空白と壁は 0。
    piece: [[Key; SQUARE_NB]; Piece::NB],
    side: [Key; 2],
}

static TABLE: OnceCell<Box<ZobristTable>> = OnceCell::new();

/// テーブルを生成する。既に生成済みなら何もしない。
pub fn init() {
    table();
}

fn table() -> &'static ZobristTable {
    TABLE.get_or_init(init_table)
}

fn init_table() -> Box<ZobristTable> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(SEED);

    let mut table = Box::new(ZobristTable {
        piece: [[0; SQUARE_NB]; Piece::NB],
        side: [0; 2],
    });

    // 空白と壁は 0 のままにしておく。こうすれば盤面全体を走査しても結果が変わらない。
    for pc in Piece::iter() {
        for sq in Square::iter() {
            table.piece[usize::from(pc)][usize::from(sq)] = rng.next_u64();
        }
    }

    for side in Side::iter() {
        table.side[usize::from(side)] = rng.next_u64();
    }

    log::debug!("zobrist table initialized (seed: {})", SEED);

    table
}

/// (駒, マス) に対応する乱数を返す。空白や壁に対しては 0 を返す。
pub fn piece_key(pc: Piece, sq: Square) -> Key {
    debug_assert!(pc.is_valid());
    debug_assert!(sq.is_valid());

    table().piece[usize::from(pc)][usize::from(sq)]
}

/// 手番に対応する乱数を返す。
pub fn side_key(side: Side) -> Key {
    table().side[usize::from(side)]
}

/// ハッシュ値に (駒, マス) の乱数を XOR する。同じ引数で 2 回呼ぶと元に戻る。
pub fn xor_piece(key: &mut Key, pc: Piece, sq: Square) {
    *key ^= piece_key(pc, sq);
}

/// 盤面全体と手番からハッシュ値を一から計算する。
pub fn calc_hash(board: &impl PieceAt, side: Side) -> Key {
    calc_hash_range(board, COL_1, COL_9, ROW_1, ROW_9, side)
}

/// 盤面の指定した矩形範囲と手番からハッシュ値を一から計算する。
///
/// 範囲は `col_min..=col_max`, `row_min..=row_max` で、いずれも空であってはならない。
/// 結果には手番の乱数も含まれる。
pub fn calc_hash_range(
    board: &impl PieceAt,
    col_min: Col,
    col_max: Col,
    row_min: Row,
    row_max: Row,
    side: Side,
) -> Key {
    assert!(col_min.is_on_board() && col_max.is_on_board());
    assert!(row_min.is_on_board() && row_max.is_on_board());
    assert!(col_min <= col_max);
    assert!(row_min <= row_max);

    let mut key = side_key(side);

    for col in Col::iter_range(col_min, col_max) {
        for row in Row::iter_range(row_min, row_max) {
            let sq = Square::from_col_row(col, row);
            xor_piece(&mut key, board.piece_at(sq), sq);
        }
    }

    key
}

/// 手駒の値に対する補助ハッシュ。
///
/// `HandValue` は小さな値に偏るので、そのまま XOR すると盤面のハッシュと衝突しやすい。
/// splitmix64 の最終段で全ビットに拡散させてから使う。
pub fn hand_hash(hv: HandValue) -> Key {
    let mut x = u64::from(hv.inner()).wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(unused_imports)]
    use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn test_table() {
        for sq in [SQ_NONE, Square::from_inner(SQUARE_NB as i32 - 1)] {
            for pc in Piece::iter() {
                assert_eq!(piece_key(pc, sq), 0);
            }
        }

        let sq = Square::from_col_row(COL_5, ROW_5);
        assert_eq!(piece_key(NO_PIECE, sq), 0);
        assert_eq!(piece_key(WALL, sq), 0);
        assert_ne!(piece_key(B_PAWN, sq), piece_key(W_PAWN, sq));
        assert_ne!(side_key(BLACK), side_key(WHITE));
    }

    #[test]
    fn test_xor_piece_twice() {
        let sq = Square::from_col_row(COL_7, ROW_6);

        let mut key: Key = 0x0123_4567_89AB_CDEF;
        xor_piece(&mut key, B_SILVER, sq);
        assert_ne!(key, 0x0123_4567_89AB_CDEF);
        xor_piece(&mut key, B_SILVER, sq);
        assert_eq!(key, 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn test_calc_hash_range() {
        let board = Board::startpos();

        let left = calc_hash_range(&board, COL_1, COL_4, ROW_1, ROW_9, BLACK);
        let right = calc_hash_range(&board, COL_5, COL_9, ROW_1, ROW_9, BLACK);

        // 手番の乱数は両方に含まれるので 1 回分打ち消す。
        assert_eq!(left ^ right ^ side_key(BLACK), calc_hash(&board, BLACK));

        assert_eq!(
            calc_hash(&board, BLACK) ^ calc_hash(&board, WHITE),
            side_key(BLACK) ^ side_key(WHITE)
        );
    }

    #[test]
    #[should_panic]
    fn test_calc_hash_range_reversed() {
        calc_hash_range(&Board::empty(), COL_5, COL_4, ROW_1, ROW_9, BLACK);
    }

    #[test]
    #[should_panic]
    fn test_calc_hash_range_reversed_rows() {
        calc_hash_range(&Board::empty(), COL_1, COL_9, ROW_5, ROW_4, BLACK);
    }

    #[test]
    fn test_hand_hash() {
        assert_ne!(hand_hash(HandValue::EMPTY), 0);
        assert_ne!(
            hand_hash(HandValue::EMPTY.add(PAWN)),
            hand_hash(HandValue::EMPTY.add(LANCE))
        );
    }
}
