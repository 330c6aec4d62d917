//! 局面。
//!
//! 盤面と、そこから導出される情報 (ハッシュ値、玉位置、二歩判定用フラグ、利き数、遠隔利き) を
//! 差分更新で保持する。盤面の変更は全て `put_piece()` / `remove_piece()` を経由し、
//! 導出情報はこの 2 つの中でのみ更新される。
//!
//! 固定長のテーブルは全て 1 つの `Arena` 上に以下の順で並べる:
//!
//! | 領域               | バイト数         |
//! |--------------------|------------------|
//! | 盤面 (駒コード)    | `SQUARE_NB`      |
//! | 利き数 (先手/後手) | `SQUARE_NB` × 2  |
//! | 遠隔利き (先手/後手) | `SQUARE_NB` × 2 |
//! | 歩のある筋 (先手/後手) | 10 × 2       |

// 遠隔利きの差分更新:
//
// 各マスについて、そこに届いている遠隔利きの方向を陣営ごとに持っておく。
// あるマスに駒を置くと、そのマスに届いている遠隔利きはそこで遮断される。
// あるマスから駒を除去すると、そのマスで止まっていた遠隔利きが先へ延長される。
// いずれも「そのマスから利きの方向へ、壁か駒に当たるまで」の範囲を更新すればよい。

use crate::arena::{Arena, Region};
use crate::effect::{melee_deltas, ranged_dirs};
use crate::history::{History, HistoryEntry, Repetition};
use crate::shogi::*;
use crate::verify::{self, Divergence};
use crate::zobrist::{self, Key};

/// 局面の自己検査に関する設定。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Instrumentation {
    /// アリーナの容量検査を行うか。
    pub arena_checks: bool,
    /// 着手/手戻しのたびに `verify()` を行い、不整合があれば panic するか。
    pub verify_each_move: bool,
}

impl Default for Instrumentation {
    /// 容量検査はデバッグビルドでのみ有効。着手ごとの検査は無効。
    fn default() -> Self {
        Self {
            arena_checks: cfg!(debug_assertions),
            verify_each_move: false,
        }
    }
}

/// アリーナ上の各テーブルの位置。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Layout {
    board: Region,
    control: SideArray<Region>,
    ranged: SideArray<Region>,
    pawn_files: SideArray<Region>,
}

impl Layout {
    /// 歩のある筋のテーブルは筋の内部値 (1..=9) でインデックスアクセスする。
    const PAWN_FILES_LEN: usize = 10;

    const SIZE: usize = 5 * SQUARE_NB + 2 * Self::PAWN_FILES_LEN;

    fn carve(arena: &mut Arena) -> Self {
        let board = arena.carve(SQUARE_NB);
        let control = SideArray::new(arena.carve(SQUARE_NB), arena.carve(SQUARE_NB));
        let ranged = SideArray::new(arena.carve(SQUARE_NB), arena.carve(SQUARE_NB));
        let pawn_files = SideArray::new(
            arena.carve(Self::PAWN_FILES_LEN),
            arena.carve(Self::PAWN_FILES_LEN),
        );
        arena.finish();

        Self {
            board,
            control,
            ranged,
            pawn_files,
        }
    }
}

/// 局面。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    arena: Arena,
    layout: Layout,

    hash: Key,
    hands: Hands,
    hand_value: HandValue, // 先手の手駒
    king_sq: SideArray<Square>,

    side_to_move: Side,
    ply: u32, // 常に 1 から始まるものとする。
    history: History,

    instrumentation: Instrumentation,
}

impl Position {
    /// 手番、盤面、両陣営の手駒を指定して局面を作る。
    ///
    /// 合法性チェックは一切行わない。ただし、同じ陣営の歩が同じ筋に 2 枚以上あってはならない。
    pub fn new(side_to_move: Side, board: &Board, hands: &Hands) -> Self {
        Self::with_instrumentation(Instrumentation::default(), side_to_move, board, hands)
    }

    /// 自己検査の設定を指定して局面を作る。
    pub fn with_instrumentation(
        instrumentation: Instrumentation,
        side_to_move: Side,
        board: &Board,
        hands: &Hands,
    ) -> Self {
        let mut arena = Arena::with_checks(Layout::SIZE, instrumentation.arena_checks);
        let layout = Layout::carve(&mut arena);

        let mut this = Self {
            arena,
            layout,
            hash: 0,
            hands: Hands::default(),
            hand_value: HandValue::EMPTY,
            king_sq: SideArray::new(SQ_NONE, SQ_NONE),
            side_to_move,
            ply: 1,
            history: History::new(),
            instrumentation,
        };
        this.setup(side_to_move, board, hands);

        this
    }

    /// 平手初期局面を作る。
    pub fn startpos() -> Self {
        Self::new(BLACK, &Board::startpos(), &Hands::default())
    }

    /// アリーナを再利用して局面を作り直す。履歴は消去される。
    pub fn reset(&mut self, side_to_move: Side, board: &Board, hands: &Hands) {
        self.arena.reset();
        self.layout = Layout::carve(&mut self.arena);
        self.king_sq = SideArray::new(SQ_NONE, SQ_NONE);
        self.ply = 1;
        self.history.clear();

        self.setup(side_to_move, board, hands);
    }

    /// ゼロクリアされたアリーナ上に局面を構築する。
    fn setup(&mut self, side_to_move: Side, board: &Board, hands: &Hands) {
        let empty = Board::empty();
        let cells = self.arena.slice_mut(self.layout.board);
        for (i, cell) in cells.iter_mut().enumerate() {
            *cell = u8::from(empty[Square::from_inner(i as i32)]);
        }

        self.side_to_move = side_to_move;
        self.hash = zobrist::side_key(side_to_move);

        for sq in Square::iter() {
            let pc = board[sq];
            if pc.is_piece() {
                self.put_piece(sq, pc);
            }
        }

        self.hands = *hands;
        self.hand_value = HandValue::from(&hands[BLACK]);
    }

    /// 手数を返す。
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// 手番を返す。
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// 両陣営の手駒への参照を返す。
    pub fn hands(&self) -> &Hands {
        &self.hands
    }

    /// 指定した陣営の手駒への参照を返す。
    pub fn hand(&self, side: Side) -> &Hand {
        &self.hands[side]
    }

    /// 先手の手駒を詰めた値を返す。
    pub fn hand_value(&self) -> HandValue {
        self.hand_value
    }

    /// 盤面と手番のハッシュ値を返す。手駒は含まない。
    pub fn hash(&self) -> Key {
        self.hash
    }

    /// 手駒を含めた局面の識別キーを返す。同一局面判定にはこちらを使う。
    pub fn key(&self) -> Key {
        self.hash ^ zobrist::hand_hash(self.hand_value)
    }

    /// 手駒を単純に XOR した識別キーを返す。
    pub fn key_cheap(&self) -> Key {
        self.hash ^ Key::from(self.hand_value.inner())
    }

    /// 指定した陣営の玉位置を返す。玉がなければ `SQ_NONE` を返す。
    pub fn king_square(&self, side: Side) -> Square {
        self.king_sq[side]
    }

    /// 指定した陣営の成っていない歩が指定した筋にあるかどうかを返す。
    pub fn has_pawn_on(&self, side: Side, col: Col) -> bool {
        self.arena.slice(self.layout.pawn_files[side])[usize::from(col)] != 0
    }

    /// 指定した陣営の、指定したマスへの利き数を返す。
    pub fn control(&self, side: Side, sq: Square) -> u8 {
        self.arena.slice(self.layout.control[side])[usize::from(sq)]
    }

    /// 指定したマスに届いている、指定した陣営の遠隔利きの方向を返す。
    pub(crate) fn ranged(&self, side: Side, sq: Square) -> DirectionSet {
        DirectionSet::from_inner(self.arena.slice(self.layout.ranged[side])[usize::from(sq)])
    }

    /// 指し手の履歴への参照を返す。
    pub fn history(&self) -> &History {
        &self.history
    }

    /// 指定した陣営が王手をかけられているかどうかを返す。玉がなければ常に false。
    pub fn is_checked(&self, side: Side) -> bool {
        let king_sq = self.king_sq[side];

        king_sq != SQ_NONE && self.control(side.inv(), king_sq) > 0
    }

    /// 現局面の千日手判定を行う。
    pub fn repetition(&self) -> Repetition {
        self.history.repetition(self.key(), self.side_to_move)
    }

    /// 導出情報を盤面から一から計算し直し、食い違いを全て返す。
    pub fn verify(&self) -> Vec<Divergence> {
        verify::verify(self)
    }

    /// 導出情報の整合性を検査し、結果を文字列で返す。問題がなければ `"OK"`。
    pub fn consistency_report(&self) -> String {
        verify::consistency_report(self)
    }

    /// 指し手で局面を進める。
    ///
    /// `mv` は少なくとも疑似合法手であり、かつ玉を取る手ではないと仮定している。
    pub fn do_move(&mut self, mv: Move) {
        debug_assert!(mv.is_valid());

        let us = self.side_to_move;
        let them = us.inv();

        let hash_before = self.hash;
        let hand_before = self.hand_value;

        let captured = if mv.is_drop() {
            let pk = mv.dropped_piece_kind();
            debug_assert!(self.hands[us][pk] > 0);
            debug_assert!(self.piece_at(mv.dst()).is_empty());

            self.take_from_hand(us, pk);
            self.put_piece(mv.dst(), Piece::new(us, pk));

            NO_PIECE
        } else {
            let src = mv.src();
            let dst = mv.dst();

            // 移動先は自駒であってはならない。玉を取る手も不可。
            let captured = self.piece_at(dst);
            debug_assert!(captured.is_empty() || captured.side() == them);
            debug_assert!(captured.kind() != KING);

            if !captured.is_empty() {
                self.remove_piece(dst);
                self.add_to_hand(us, captured.raw_kind());
            }

            let pc = self.remove_piece(src);
            debug_assert_eq!(pc.side(), us);
            let pc = if mv.is_promotion() {
                pc.to_promoted()
            } else {
                pc
            };
            self.put_piece(dst, pc);

            captured
        };

        self.hash ^= zobrist::side_key(us) ^ zobrist::side_key(them);
        self.side_to_move = them;
        self.ply += 1;

        let checked = self.is_checked(them);
        self.history.push(HistoryEntry::new(
            hash_before,
            hand_before,
            mv,
            captured,
            checked,
        ));

        if self.instrumentation.verify_each_move {
            self.self_check("do_move", mv);
        }
    }

    /// 最後の指し手を戻し、その履歴エントリを返す。
    ///
    /// 戻す手がない状態で呼んではならない。
    pub fn undo_move(&mut self) -> HistoryEntry {
        let entry = self.history.pop().expect("undo_move: no move to undo");
        let mv = entry.mv();

        let them = self.side_to_move;
        let us = them.inv();

        self.hash ^= zobrist::side_key(us) ^ zobrist::side_key(them);
        self.side_to_move = us;
        self.ply -= 1;

        if mv.is_drop() {
            let pc = self.remove_piece(mv.dst());
            self.add_to_hand(us, pc.kind());
        } else {
            let pc = self.remove_piece(mv.dst());
            let pc = if mv.is_promotion() {
                pc.to_unpromoted()
            } else {
                pc
            };
            self.put_piece(mv.src(), pc);

            let captured = entry.captured();
            if !captured.is_empty() {
                self.take_from_hand(us, captured.raw_kind());
                self.put_piece(mv.dst(), captured);
            }
        }

        debug_assert_eq!(self.hash, entry.hash());
        debug_assert_eq!(self.hand_value, entry.hand());

        if self.instrumentation.verify_each_move {
            self.self_check("undo_move", mv);
        }

        entry
    }

    fn self_check(&self, context: &str, mv: Move) {
        let divergences = self.verify();
        if divergences.is_empty() {
            return;
        }

        let report = verify::format_report(&divergences);
        log::error!("{} {}: 局面が壊れている\n{}\n{}", context, mv, self, report);
        panic!("{} {}: inconsistent position\n{}", context, mv, report);
    }

    fn add_to_hand(&mut self, side: Side, pk: PieceKind) {
        self.hands[side][pk] += 1;
        if side == BLACK {
            self.hand_value = self.hand_value.add(pk);
        }
    }

    fn take_from_hand(&mut self, side: Side, pk: PieceKind) {
        debug_assert!(self.hands[side][pk] > 0);

        self.hands[side][pk] -= 1;
        if side == BLACK {
            self.hand_value = self.hand_value.sub(pk);
        }
    }

    /// 空白マス `sq` に駒 `pc` を置き、導出情報を更新する。
    fn put_piece(&mut self, sq: Square, pc: Piece) {
        debug_assert!(sq.is_on_board());
        debug_assert!(pc.is_piece());
        debug_assert!(self.piece_at(sq).is_empty());

        // sq を通過していた遠隔利きを遮断する。
        for side in Side::iter() {
            for dir in self.ranged(side, sq).iter() {
                self.update_ray(side, sq, dir, false);
            }
        }

        self.set_piece(sq, pc);
        zobrist::xor_piece(&mut self.hash, pc, sq);
        self.update_piece_effect(sq, pc, true);

        let side = pc.side();
        match pc.kind() {
            KING => {
                debug_assert_eq!(self.king_sq[side], SQ_NONE);
                self.king_sq[side] = sq;
            }
            PAWN => {
                debug_assert!(!self.has_pawn_on(side, sq.col()));
                self.set_pawn_flag(side, sq.col(), true);
            }
            _ => {}
        }
    }

    /// マス `sq` の駒を除去して返し、導出情報を更新する。
    fn remove_piece(&mut self, sq: Square) -> Piece {
        let pc = self.piece_at(sq);
        debug_assert!(pc.is_piece());

        self.update_piece_effect(sq, pc, false);
        zobrist::xor_piece(&mut self.hash, pc, sq);
        self.set_piece(sq, NO_PIECE);

        // sq で止まっていた遠隔利きを延長する。
        for side in Side::iter() {
            for dir in self.ranged(side, sq).iter() {
                self.update_ray(side, sq, dir, true);
            }
        }

        let side = pc.side();
        match pc.kind() {
            KING => self.king_sq[side] = SQ_NONE,
            PAWN => self.set_pawn_flag(side, sq.col(), false),
            _ => {}
        }

        pc
    }

    /// `sq` にある駒 `pc` 自身の利きを加える (`add == true`) か取り除く。
    fn update_piece_effect(&mut self, sq: Square, pc: Piece, add: bool) {
        let side = pc.side();

        for &delta in melee_deltas(pc) {
            let dst = sq + delta;
            if !self.piece_at(dst).is_wall() {
                self.bump_control(side, dst, add);
            }
        }

        for dir in ranged_dirs(pc).iter() {
            self.update_ray(side, sq, dir, add);
        }
    }

    /// `origin` の次のマスから `dir` 方向へ、壁の手前または最初の駒までの遠隔利きを加える (`add == true`) か取り除く。
    fn update_ray(&mut self, side: Side, origin: Square, dir: Direction, add: bool) {
        let delta = dir.to_delta();
        let bit = DirectionSet::from(dir).inner();

        let mut sq = origin + delta;
        loop {
            let pc = self.piece_at(sq);
            if pc.is_wall() {
                break;
            }

            self.bump_control(side, sq, add);

            let cell = &mut self.arena.slice_mut(self.layout.ranged[side])[usize::from(sq)];
            if add {
                debug_assert_eq!(*cell & bit, 0);
                *cell |= bit;
            } else {
                debug_assert_ne!(*cell & bit, 0);
                *cell &= !bit;
            }

            if !pc.is_empty() {
                break;
            }
            sq += delta;
        }
    }

    fn bump_control(&mut self, side: Side, sq: Square, add: bool) {
        let cell = &mut self.arena.slice_mut(self.layout.control[side])[usize::from(sq)];
        if add {
            *cell += 1;
        } else {
            debug_assert!(*cell > 0);
            *cell -= 1;
        }
    }

    fn set_piece(&mut self, sq: Square, pc: Piece) {
        self.arena.slice_mut(self.layout.board)[usize::from(sq)] = u8::from(pc);
    }

    fn set_pawn_flag(&mut self, side: Side, col: Col, value: bool) {
        self.arena.slice_mut(self.layout.pawn_files[side])[usize::from(col)] = u8::from(value);
    }
}

impl PieceAt for Position {
    fn piece_at(&self, sq: Square) -> Piece {
        Piece::from_inner(u32::from(
            self.arena.slice(self.layout.board)[usize::from(sq)],
        ))
    }
}

/// 導出情報を直接書き換える。整合性検査のテスト専用。
#[cfg(test)]
impl Position {
    pub(crate) fn corrupt_hash(&mut self, hash: Key) {
        self.hash = hash;
    }

    pub(crate) fn corrupt_hand_value(&mut self, hv: HandValue) {
        self.hand_value = hv;
    }

    pub(crate) fn corrupt_king_square(&mut self, side: Side, sq: Square) {
        self.king_sq[side] = sq;
    }

    pub(crate) fn corrupt_pawn_flag(&mut self, side: Side, col: Col, value: bool) {
        self.set_pawn_flag(side, col, value);
    }

    pub(crate) fn corrupt_control(&mut self, side: Side, sq: Square, n: u8) {
        self.arena.slice_mut(self.layout.control[side])[usize::from(sq)] = n;
    }

    pub(crate) fn corrupt_ranged(&mut self, side: Side, sq: Square, dirs: DirectionSet) {
        self.arena.slice_mut(self.layout.ranged[side])[usize::from(sq)] = dirs.inner();
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "後手の持駒: {}", self.hands[WHITE])?;
        fmt_board(self, f)?;
        writeln!(f, "先手の持駒: {}", self.hands[BLACK])?;
        writeln!(f, "手番: {} ({} 手目)", self.side_to_move, self.ply)?;

        Ok(())
    }
}
