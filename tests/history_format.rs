mod common;

#[allow(unused_imports)]
use pretty_assertions::{assert_eq, assert_ne};
use rand::RngCore as _;

use kyokumen::*;

use common::{random_move, rng, sq};

#[test]
fn test_entry_arbitrary_values() {
    let mut rng = rng(3);

    let mvs = [
        Move::new_walk(sq(1, 1), sq(9, 9)),
        Move::new_walk_promotion(sq(8, 8), sq(2, 2)),
        Move::new_drop(PAWN, sq(5, 5)),
        Move::new_drop(ROOK, sq(9, 1)),
    ];
    let captured = [B_PRO_SILVER, W_DRAGON, NO_PIECE, NO_PIECE];

    for (i, (&mv, &pc)) in mvs.iter().zip(&captured).enumerate() {
        let entry = HistoryEntry::new(
            rng.next_u64(),
            HandValue::from_inner(rng.next_u32()),
            mv,
            pc,
            i % 2 == 0,
        );

        let buf = entry.encode();
        assert_eq!(buf.len(), HistoryEntry::ENCODED_LEN);
        assert_eq!(HistoryEntry::decode(&buf).unwrap(), entry);
    }
}

#[test]
fn test_game_ledger_io() {
    let mut rng = rng(4);
    let mut pos = Position::startpos();

    for _ in 0..80 {
        match random_move(&mut rng, &pos) {
            Some(mv) => pos.do_move(mv),
            None => break,
        }
    }

    let mut buf = Vec::<u8>::new();
    pos.history().write_to(&mut buf).unwrap();

    let history = History::read_from(buf.as_slice()).unwrap();
    assert_eq!(&history, pos.history());

    // 読み込んだ履歴の指し手で手を戻せることを確認する。
    for entry in history.iter().rev() {
        assert_eq!(pos.undo_move(), *entry);
    }
    assert_eq!(pos, Position::startpos());
}

#[test]
fn test_truncated_ledger() {
    let mut pos = Position::startpos();
    pos.do_move(Move::new_walk(sq(7, 7), sq(7, 6)));

    let mut buf = Vec::<u8>::new();
    pos.history().write_to(&mut buf).unwrap();
    buf.pop();

    assert!(History::read_from(buf.as_slice()).is_err());
}
