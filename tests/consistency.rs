mod common;

use itertools::Itertools as _;
#[allow(unused_imports)]
use pretty_assertions::{assert_eq, assert_ne};

use kyokumen::*;

use common::{random_move, rng, sq};

#[test]
fn test_random_walk() {
    let mut rng = rng(1);

    for _ in 0..20 {
        let mut pos = Position::startpos();
        let initial = pos.clone();

        for _ in 0..150 {
            let mv = match random_move(&mut rng, &pos) {
                Some(mv) => mv,
                None => break,
            };
            pos.do_move(mv);

            assert_eq!(pos.consistency_report(), REPORT_OK);
            assert_eq!(
                pos.hash(),
                zobrist::calc_hash(&pos, pos.side_to_move())
            );
        }

        while !pos.history().is_empty() {
            pos.undo_move();
            assert_eq!(pos.consistency_report(), REPORT_OK);
        }

        assert_eq!(pos, initial);
    }
}

#[test]
fn test_do_undo_restores_everything() {
    let mut rng = rng(2);
    let mut pos = Position::startpos();

    for _ in 0..200 {
        let mv = match random_move(&mut rng, &pos) {
            Some(mv) => mv,
            None => break,
        };

        // 1 手進めて戻すと、全ての導出情報がビット単位で元に戻る。
        let before = pos.clone();
        pos.do_move(mv);
        let entry = pos.undo_move();
        assert_eq!(pos, before);
        assert_eq!(entry.mv(), mv);
        assert_eq!(entry.hash(), before.hash());
        assert_eq!(entry.hand(), before.hand_value());

        pos.do_move(mv);
    }
}

#[test]
fn test_transposition() {
    // 手順が異なっても同じ局面になればハッシュ値と導出情報は一致する。
    let seq1 = [
        Move::new_walk(sq(7, 7), sq(7, 6)),
        Move::new_walk(sq(3, 3), sq(3, 4)),
        Move::new_walk(sq(2, 7), sq(2, 6)),
        Move::new_walk(sq(8, 3), sq(8, 4)),
    ];
    let seq2 = [
        Move::new_walk(sq(2, 7), sq(2, 6)),
        Move::new_walk(sq(8, 3), sq(8, 4)),
        Move::new_walk(sq(7, 7), sq(7, 6)),
        Move::new_walk(sq(3, 3), sq(3, 4)),
    ];

    let mut pos1 = Position::startpos();
    let mut pos2 = Position::startpos();
    for (mv1, mv2) in seq1.into_iter().zip_eq(seq2) {
        pos1.do_move(mv1);
        pos2.do_move(mv2);
    }

    assert_eq!(pos1.hash(), pos2.hash());
    assert_eq!(pos1.key(), pos2.key());
    for side in Side::iter() {
        for sq in Square::iter() {
            assert_eq!(pos1.control(side, sq), pos2.control(side, sq));
        }
    }
    assert_ne!(pos1.history(), pos2.history());
}

#[test]
fn test_capture_cycle_hand_value() {
    // 角交換: 先手が角を取り、後手が取り返す。
    let mut pos = Position::startpos();
    for mv in [
        Move::new_walk(sq(7, 7), sq(7, 6)),
        Move::new_walk(sq(3, 3), sq(3, 4)),
        Move::new_walk(sq(8, 8), sq(2, 2)),
        Move::new_walk(sq(3, 1), sq(2, 2)),
    ] {
        pos.do_move(mv);
        assert_eq!(pos.consistency_report(), REPORT_OK);
    }

    assert_eq!(pos.hand(BLACK)[BISHOP], 1);
    assert_eq!(pos.hand(WHITE)[BISHOP], 1);
    assert_eq!(pos.hand_value().count(BISHOP), 1);
    assert_eq!(pos.piece_at(sq(2, 2)), W_SILVER);

    // 先手が角を打つ。
    pos.do_move(Move::new_drop(BISHOP, sq(4, 5)));
    assert_eq!(pos.hand_value(), HandValue::EMPTY);
    assert_eq!(pos.consistency_report(), REPORT_OK);

    for _ in 0..5 {
        pos.undo_move();
    }
    assert_eq!(pos, Position::startpos());
}

#[test]
fn test_startpos_hash() {
    zobrist::init();

    let pos = Position::startpos();
    assert_eq!(
        zobrist::calc_hash_range(&Board::startpos(), COL_1, COL_9, ROW_1, ROW_9, BLACK),
        pos.hash()
    );
}
