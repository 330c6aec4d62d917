//! 局面の整合性検査。
//!
//! 差分更新で保持している導出情報を盤面から一から計算し直し、食い違いを報告する。
//! 検査項目は互いに独立で、食い違いがあっても全項目を検査する。食い違いで panic することはない。

use crate::effect;
use crate::position::Position;
use crate::shogi::*;
use crate::zobrist::{self, Key};

/// 食い違いがないときの報告文字列。
pub const REPORT_OK: &str = "OK";

/// 導出情報の食い違い 1 件。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Divergence {
    /// 保持しているハッシュ値が盤面と手番から計算した値と異なる。
    Hash { stored: Key, computed: Key },
    /// 保持している手駒の値が手駒から計算した値と異なる。
    HandValue {
        stored: HandValue,
        computed: HandValue,
    },
    /// 保持している玉位置に、その陣営の玉がない。
    ///
    /// `sq == SQ_NONE` なら、玉がないとされているのに盤上に玉がある (`found` はその位置)。
    King {
        side: Side,
        sq: Square,
        found: Piece,
    },
    /// 歩のある筋のフラグが盤面と異なる。
    PawnFile {
        side: Side,
        col: Col,
        stored: bool,
        computed: bool,
    },
    /// 利き数が盤面から計算した値と異なる。
    Control {
        side: Side,
        sq: Square,
        stored: u8,
        computed: u8,
    },
    /// 遠隔利きの方向が盤面から計算した値と異なる。
    Ranged {
        side: Side,
        sq: Square,
        stored: DirectionSet,
        computed: DirectionSet,
    },
}

impl std::fmt::Display for Divergence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Hash { stored, computed } => write!(
                f,
                "ハッシュ値: 保持 {:#018x}, 計算 {:#018x}",
                stored, computed
            ),
            Self::HandValue { stored, computed } => write!(
                f,
                "手駒: 保持 {:#x}, 計算 {:#x}",
                stored.inner(),
                computed.inner()
            ),
            Self::King { side, sq, found } => {
                if *sq == SQ_NONE {
                    write!(f, "{}玉位置: 保持 なし, 盤上 {}", side, found)
                } else {
                    write!(f, "{}玉位置: 保持 {} (内部値 {}), 盤上 {}", side, sq, sq.inner(), found)
                }
            }
            Self::PawnFile {
                side,
                col,
                stored,
                computed,
            } => write!(
                f,
                "{}歩のある筋: {}筋 保持 {}, 計算 {}",
                side, col, stored, computed
            ),
            Self::Control {
                side,
                sq,
                stored,
                computed,
            } => write!(
                f,
                "{}利き数: {} 保持 {}, 計算 {}",
                side, sq, stored, computed
            ),
            Self::Ranged {
                side,
                sq,
                stored,
                computed,
            } => write!(
                f,
                "{}遠隔利き: {} 保持 {:?}, 計算 {:?}",
                side, sq, stored, computed
            ),
        }
    }
}

/// 局面の導出情報を全て検査し、食い違いを全て返す。
pub fn verify(pos: &Position) -> Vec<Divergence> {
    let mut divergences = Vec::new();

    let hash = zobrist::calc_hash(pos, pos.side_to_move());
    if hash != pos.hash() {
        divergences.push(Divergence::Hash {
            stored: pos.hash(),
            computed: hash,
        });
    }

    let hand_value = HandValue::from(pos.hand(BLACK));
    if hand_value != pos.hand_value() {
        divergences.push(Divergence::HandValue {
            stored: pos.hand_value(),
            computed: hand_value,
        });
    }

    for side in Side::iter() {
        verify_king(pos, side, &mut divergences);
        verify_pawn_files(pos, side, &mut divergences);
        verify_effects(pos, side, &mut divergences);
    }

    for divergence in &divergences {
        log::warn!("{}", divergence);
    }

    divergences
}

fn verify_king(pos: &Position, side: Side, divergences: &mut Vec<Divergence>) {
    let king = Piece::new(side, KING);
    let sq = pos.king_square(side);

    if sq != SQ_NONE {
        let found = if sq.is_valid() { pos.piece_at(sq) } else { WALL };
        if found != king {
            divergences.push(Divergence::King { side, sq, found });
        }
    } else if let Some(found) = Square::iter().find(|&sq| pos.piece_at(sq) == king) {
        // 玉がないとされているのに盤上に玉がある。
        divergences.push(Divergence::King {
            side,
            sq: SQ_NONE,
            found: pos.piece_at(found),
        });
        log::debug!("{} king found at {:?} while none is recorded", side, found);
    }
}

fn verify_pawn_files(pos: &Position, side: Side, divergences: &mut Vec<Divergence>) {
    let pawn = Piece::new(side, PAWN);

    for col in Col::iter() {
        let computed = Square::iter_col(col).any(|sq| pos.piece_at(sq) == pawn);
        let stored = pos.has_pawn_on(side, col);
        if stored != computed {
            divergences.push(Divergence::PawnFile {
                side,
                col,
                stored,
                computed,
            });
        }
    }
}

fn verify_effects(pos: &Position, side: Side, divergences: &mut Vec<Divergence>) {
    let control = effect::calc_control(pos, side);
    let ranged = effect::calc_ranged(pos, side);

    for sq in Square::iter() {
        let stored = pos.control(side, sq);
        if stored != control[sq] {
            divergences.push(Divergence::Control {
                side,
                sq,
                stored,
                computed: control[sq],
            });
        }

        let stored = pos.ranged(side, sq);
        if stored != ranged[sq] {
            divergences.push(Divergence::Ranged {
                side,
                sq,
                stored,
                computed: ranged[sq],
            });
        }
    }
}

/// 食い違いのリストを報告文字列にする。空なら `REPORT_OK`。
pub fn format_report(divergences: &[Divergence]) -> String {
    if divergences.is_empty() {
        return REPORT_OK.to_owned();
    }

    divergences
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// 局面の導出情報を全て検査し、報告文字列を返す。
///
/// 食い違いがなければ `"OK"`、あれば 1 件につき 1 行。
pub fn consistency_report(pos: &Position) -> String {
    format_report(&verify(pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(unused_imports)]
    use pretty_assertions::{assert_eq, assert_ne};

    fn sq(col: i32, row: i32) -> Square {
        Square::from_col_row(Col::from_inner(col), Row::from_inner(row))
    }

    #[test]
    fn test_ok() {
        let pos = Position::startpos();

        assert!(verify(&pos).is_empty());
        assert_eq!(consistency_report(&pos), REPORT_OK);
    }

    #[test]
    fn test_hash() {
        let mut pos = Position::startpos();
        let hash = pos.hash();
        pos.corrupt_hash(hash ^ 1);

        assert_eq!(
            verify(&pos),
            [Divergence::Hash {
                stored: hash ^ 1,
                computed: hash,
            }]
        );
    }

    #[test]
    fn test_hand_value() {
        let mut pos = Position::startpos();
        pos.corrupt_hand_value(HandValue::EMPTY.add(PAWN));

        assert_eq!(
            verify(&pos),
            [Divergence::HandValue {
                stored: HandValue::EMPTY.add(PAWN),
                computed: HandValue::EMPTY,
            }]
        );
    }

    #[test]
    fn test_king() {
        let mut pos = Position::startpos();
        pos.corrupt_king_square(WHITE, sq(4, 1));

        assert_eq!(
            verify(&pos),
            [Divergence::King {
                side: WHITE,
                sq: sq(4, 1),
                found: W_GOLD,
            }]
        );

        let report = consistency_report(&pos);
        assert_eq!(report.lines().count(), 1);
        assert!(report.contains("後手"));
        assert!(report.contains("４一"));
    }

    #[test]
    fn test_king_missing() {
        let mut pos = Position::startpos();
        pos.corrupt_king_square(BLACK, SQ_NONE);

        assert_eq!(
            verify(&pos),
            [Divergence::King {
                side: BLACK,
                sq: SQ_NONE,
                found: B_KING,
            }]
        );
    }

    #[test]
    fn test_pawn_file() {
        let mut pos = Position::startpos();
        pos.corrupt_pawn_flag(BLACK, COL_3, false);

        assert_eq!(
            verify(&pos),
            [Divergence::PawnFile {
                side: BLACK,
                col: COL_3,
                stored: false,
                computed: true,
            }]
        );
    }

    #[test]
    fn test_control() {
        let mut pos = Position::startpos();
        pos.corrupt_control(WHITE, sq(5, 5), 3);

        assert_eq!(
            verify(&pos),
            [Divergence::Control {
                side: WHITE,
                sq: sq(5, 5),
                stored: 3,
                computed: 0,
            }]
        );

        let report = consistency_report(&pos);
        assert!(report.contains("利き数"));
        assert!(report.contains("５五"));
    }

    #[test]
    fn test_ranged() {
        let mut pos = Position::startpos();
        pos.corrupt_ranged(BLACK, sq(1, 8), DirectionSet::empty());

        assert_eq!(
            verify(&pos),
            [Divergence::Ranged {
                side: BLACK,
                sq: sq(1, 8),
                stored: DirectionSet::empty(),
                computed: DirectionSet::U | DirectionSet::R,
            }]
        );
    }

    #[test]
    fn test_multiple() {
        let mut pos = Position::startpos();
        pos.corrupt_hash(0);
        pos.corrupt_control(BLACK, sq(9, 9), 9);

        let divergences = verify(&pos);
        assert_eq!(divergences.len(), 2);
        assert_eq!(consistency_report(&pos).lines().count(), 2);
    }
}
