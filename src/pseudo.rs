//! 疑似指し手生成。
//!
//! 局面の差分更新を検査するためのランダムウォーク用。生成される指し手の順序は未規定。
//!
//! 生成される指し手は以下を満たす:
//!
//! * 玉を取る手は含まない。
//! * 行き所のない駒を生じる手 (不成、打ち) は含まない。
//! * 二歩は含まない。
//!
//! 自殺手、王手放置、打ち歩詰めは含まれうる。

use arrayvec::ArrayVec;

use crate::effect::{self, melee_deltas, ranged_dirs};
use crate::position::Position;
use crate::shogi::*;

/// 指し手配列。
///
/// 将棋の最大分岐数は 593 だが、一応もう少し余裕をもたせておく。
pub type MoveArray = ArrayVec<Move, 600>;

/// 指定した局面における疑似指し手を全て生成する。
pub fn generate_pseudo_moves(pos: &Position) -> MoveArray {
    let us = pos.side_to_move();

    let mut mvs = MoveArray::new();

    for src in Square::iter() {
        let pc = pos.piece_at(src);
        if !pc.is_piece() || pc.side() != us {
            continue;
        }

        for &delta in melee_deltas(pc) {
            push_walks(pos, pc, src, src + delta, &mut mvs);
        }
        for dir in ranged_dirs(pc).iter() {
            for dst in effect::ray(pos, src, dir.to_delta()) {
                push_walks(pos, pc, src, dst, &mut mvs);
            }
        }
    }

    generate_drops(pos, &mut mvs);

    mvs
}

/// 駒 `pc` を `src` から `dst` へ動かす指し手を生成する (成/不成)。
fn push_walks(pos: &Position, pc: Piece, src: Square, dst: Square, mvs: &mut MoveArray) {
    let us = pc.side();

    // 壁、自駒、玉のあるマスへは動けない。
    let target = pos.piece_at(dst);
    if target.is_wall() || (target.is_piece() && (target.side() == us || target.kind() == KING)) {
        return;
    }

    if pc.is_promotable() && (src.is_promotion_zone(us) || dst.is_promotion_zone(us)) {
        mvs.push(Move::new_walk_promotion(src, dst));
    }

    if can_stay(pc.kind(), dst.row().relative(us)) {
        mvs.push(Move::new_walk(src, dst));
    }
}

/// 駒打ちの指し手を生成する。
fn generate_drops(pos: &Position, mvs: &mut MoveArray) {
    let us = pos.side_to_move();
    let hand = pos.hand(us);

    for pk in PieceKind::iter_hand().filter(|&pk| hand[pk] > 0) {
        for dst in Square::iter() {
            if !pos.piece_at(dst).is_empty() {
                continue;
            }
            if !can_stay(pk, dst.row().relative(us)) {
                continue;
            }
            if pk == PAWN && pos.has_pawn_on(us, dst.col()) {
                continue;
            }

            mvs.push(Move::new_drop(pk, dst));
        }
    }
}

/// 駒種 `pk` の駒が、自陣営から見て `rel_row` 段目で行き所を持つかどうかを返す。
fn can_stay(pk: PieceKind, rel_row: i32) -> bool {
    match pk {
        PAWN | LANCE => rel_row >= 2,
        KNIGHT => rel_row >= 3,
        _ => true,
    }
}
