//! 将棋の基本要素たち。
//!
//! 駒などは enum ではなく、いわゆる newtype で表現する。
//! 駒の内部値はビット演算で成/陣営を扱えるように割り当ててあり、
//! 局面のアリーナや履歴エントリにはこの内部値がそのまま 1 バイトで格納される。
//!
//! 筋、段、マスの内部値は以下のように割り当てている:
//!
//! * 筋は 1 (１筋) から 9 (９筋)。
//! * 段は 1 (一段目) から 9 (九段目)。
//! * マスは壁つきの 1 次元インデックス `16 * 筋 + 段 + 2`。盤外のセルは全て壁マス。
//!
//! 壁は筋方向に 0 筋と 10 筋の 2 本、段方向に一段目の上へ 3 セル、九段目の下へ 4 セル。
//! 盤内のマスから 8 方向に 1 歩、または桂跳びで進んだ先は必ずテーブル内に収まる。

use std::iter::FusedIterator;

/// 陣営。先手が `BLACK`、後手が `WHITE`。
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Side(u32);

pub const BLACK: Side = Side(0);
pub const WHITE: Side = Side(1);

impl Side {
    /// 有効値かどうかを返す。
    pub const fn is_valid(self) -> bool {
        self.0 == BLACK.0 || self.0 == WHITE.0
    }

    /// 敵陣営を返す。
    pub const fn inv(self) -> Side {
        Self(self.0 ^ 1)
    }

    /// 陣営を昇順に列挙する。(`BLACK`、`WHITE` の順)
    pub fn iter(
    ) -> impl Iterator<Item = Self> + DoubleEndedIterator + ExactSizeIterator + FusedIterator {
        [BLACK, WHITE].into_iter()
    }

    /// 内部値を返す。`const` 文脈で使える。
    pub const fn inner(self) -> u32 {
        self.0
    }
}

impl From<Side> for u32 {
    fn from(side: Side) -> Self {
        side.0
    }
}

impl From<Side> for usize {
    fn from(side: Side) -> Self {
        debug_assert!(side.is_valid());

        side.0 as Self
    }
}

impl std::fmt::Debug for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            BLACK => write!(f, "BLACK"),
            WHITE => write!(f, "WHITE"),
            _ => write!(f, "Side({})", self.0),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            BLACK => write!(f, "先手"),
            WHITE => write!(f, "後手"),
            side => write!(f, "無効な陣営({})", side.0),
        }
    }
}

/// 陣営ごとの値の組。`Side` でインデックスアクセスできる。
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SideArray<T>([T; 2]);

impl<T> SideArray<T> {
    /// 先手、後手の値を指定して作る。
    pub const fn new(black: T, white: T) -> Self {
        Self([black, white])
    }
}

impl<T> From<[T; 2]> for SideArray<T> {
    fn from(inner: [T; 2]) -> Self {
        Self(inner)
    }
}

impl<T> std::ops::Index<Side> for SideArray<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        &self.0[usize::from(side)]
    }
}

impl<T> std::ops::IndexMut<Side> for SideArray<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        &mut self.0[usize::from(side)]
    }
}

/// 盤面の筋。たとえば `COL_3` は３筋。
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Col(i32);

pub const COL_1: Col = Col(1);
pub const COL_2: Col = Col(2);
pub const COL_3: Col = Col(3);
pub const COL_4: Col = Col(4);
pub const COL_5: Col = Col(5);
pub const COL_6: Col = Col(6);
pub const COL_7: Col = Col(7);
pub const COL_8: Col = Col(8);
pub const COL_9: Col = Col(9);

impl Col {
    /// 内部値を指定して筋を作る。盤面外の値を渡してはならない。
    pub const fn from_inner(inner: i32) -> Self {
        let this = Self(inner);
        debug_assert!(this.is_on_board());

        this
    }

    /// 筋が盤面内かどうかを返す。
    pub const fn is_on_board(self) -> bool {
        COL_1.0 <= self.0 && self.0 <= COL_9.0
    }

    /// 全ての筋を昇順に列挙する。(`COL_1`, `COL_2`, ..., `COL_9` の順)
    pub fn iter(
    ) -> impl Iterator<Item = Self> + DoubleEndedIterator + ExactSizeIterator + FusedIterator {
        [
            COL_1, COL_2, COL_3, COL_4, COL_5, COL_6, COL_7, COL_8, COL_9,
        ]
        .into_iter()
    }

    /// 指定した範囲の筋を昇順に列挙する。
    pub fn iter_range(
        min: Self,
        max: Self,
    ) -> impl Iterator<Item = Self> + DoubleEndedIterator + FusedIterator {
        (min.0..=max.0).map(Self)
    }

    /// 内部値を返す。`const` 文脈で使える。
    pub const fn inner(self) -> i32 {
        self.0
    }
}

impl From<Col> for i32 {
    fn from(col: Col) -> Self {
        col.0
    }
}

impl From<Col> for usize {
    fn from(col: Col) -> Self {
        debug_assert!(col.is_on_board());

        col.0 as Self
    }
}

impl std::fmt::Debug for Col {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_on_board() {
            write!(f, "COL_{}", self.0)
        } else {
            write!(f, "Col({})", self.0)
        }
    }
}

impl std::fmt::Display for Col {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        const NAMES: [&str; 9] = ["１", "２", "３", "４", "５", "６", "７", "８", "９"];

        if self.is_on_board() {
            f.write_str(NAMES[(self.0 - 1) as usize])
        } else {
            write!(f, "無効な筋({})", self.0)
        }
    }
}

/// 盤面の段。たとえば `ROW_3` は三段目。
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Row(i32);

pub const ROW_1: Row = Row(1);
pub const ROW_2: Row = Row(2);
pub const ROW_3: Row = Row(3);
pub const ROW_4: Row = Row(4);
pub const ROW_5: Row = Row(5);
pub const ROW_6: Row = Row(6);
pub const ROW_7: Row = Row(7);
pub const ROW_8: Row = Row(8);
pub const ROW_9: Row = Row(9);

impl Row {
    /// 内部値を指定して段を作る。盤面外の値を渡してはならない。
    pub const fn from_inner(inner: i32) -> Self {
        let this = Self(inner);
        debug_assert!(this.is_on_board());

        this
    }

    /// 段が盤面内かどうかを返す。
    pub const fn is_on_board(self) -> bool {
        ROW_1.0 <= self.0 && self.0 <= ROW_9.0
    }

    /// 段が指定した陣営にとって敵陣かどうかを返す。
    pub const fn is_promotion_zone(self, side: Side) -> bool {
        debug_assert!(self.is_on_board());

        // bit (段 + 16 * 陣営) が立っていれば敵陣。
        const MASK: u32 = 0b1110 | (0b11_1000_0000 << 16);

        (MASK & (1 << (self.0 as u32 + 16 * side.0))) != 0
    }

    /// 指定した陣営から見た段を返す。先手なら内部値そのまま、後手なら上下反転した値。
    pub const fn relative(self, side: Side) -> i32 {
        if side.0 == BLACK.0 {
            self.0
        } else {
            10 - self.0
        }
    }

    /// 全ての段を昇順に列挙する。(`ROW_1`, `ROW_2`, ..., `ROW_9` の順)
    pub fn iter(
    ) -> impl Iterator<Item = Self> + DoubleEndedIterator + ExactSizeIterator + FusedIterator {
        [
            ROW_1, ROW_2, ROW_3, ROW_4, ROW_5, ROW_6, ROW_7, ROW_8, ROW_9,
        ]
        .into_iter()
    }

    /// 指定した範囲の段を昇順に列挙する。
    pub fn iter_range(
        min: Self,
        max: Self,
    ) -> impl Iterator<Item = Self> + DoubleEndedIterator + FusedIterator {
        (min.0..=max.0).map(Self)
    }

    /// 内部値を返す。`const` 文脈で使える。
    pub const fn inner(self) -> i32 {
        self.0
    }
}

impl From<Row> for i32 {
    fn from(row: Row) -> Self {
        row.0
    }
}

impl From<Row> for usize {
    fn from(row: Row) -> Self {
        debug_assert!(row.is_on_board());

        row.0 as Self
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_on_board() {
            write!(f, "ROW_{}", self.0)
        } else {
            write!(f, "Row({})", self.0)
        }
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        const NAMES: [&str; 9] = ["一", "二", "三", "四", "五", "六", "七", "八", "九"];

        if self.is_on_board() {
            f.write_str(NAMES[(self.0 - 1) as usize])
        } else {
            write!(f, "無効な段({})", self.0)
        }
    }
}

/// 壁マスを含むテーブルのサイズ。
pub const SQUARE_NB: usize = 11 * Square::STRIDE as usize;

/// 盤面のマス(壁マスを含む)。
///
/// 内部値は `16 * 筋 + 段 + 2`。盤内のマスは 81 個、残りは全て壁マス。
/// 盤内のマスには別途 0..81 の通し番号(`9 * (筋 - 1) + (段 - 1)`)があり、指し手の符号化に使う。
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Square(i32);

/// 「マスなし」を表す値。壁マスの 1 つであり、玉が存在しないことを表すのにも使う。
pub const SQ_NONE: Square = Square(0);

impl Square {
    /// 筋 1 つ分の差分。段の範囲より大きい 2 の冪。
    pub const STRIDE: i32 = 16;
    /// 一段目の上に置く壁の数から 1 を引いたもの。
    pub const PADDING: i32 = 2;

    pub const DIR_R: i32 = -Self::STRIDE;
    pub const DIR_U: i32 = -1;
    pub const DIR_D: i32 = -Self::DIR_U;
    pub const DIR_L: i32 = -Self::DIR_R;

    pub const DIR_RU: i32 = Self::DIR_R + Self::DIR_U;
    pub const DIR_RD: i32 = Self::DIR_R + Self::DIR_D;
    pub const DIR_LU: i32 = Self::DIR_L + Self::DIR_U;
    pub const DIR_LD: i32 = Self::DIR_L + Self::DIR_D;
    pub const DIR_RUU: i32 = Self::DIR_RU + Self::DIR_U;
    pub const DIR_RDD: i32 = Self::DIR_RD + Self::DIR_D;
    pub const DIR_LUU: i32 = Self::DIR_LU + Self::DIR_U;
    pub const DIR_LDD: i32 = Self::DIR_LD + Self::DIR_D;

    /// 内部値を指定してマスを作る。テーブル外の値を渡してはならない。
    pub const fn from_inner(inner: i32) -> Self {
        let this = Self(inner);
        debug_assert!(this.is_valid());

        this
    }

    /// 筋と段を指定してマスを作る。
    pub const fn from_col_row(col: Col, row: Row) -> Self {
        debug_assert!(col.is_on_board());
        debug_assert!(row.is_on_board());

        Self(Self::STRIDE * col.0 + row.0 + Self::PADDING)
    }

    /// 盤内のマスの通し番号 (0..81) からマスを作る。
    pub const fn from_compact(idx: u32) -> Self {
        debug_assert!(idx < 81);

        let col = (idx / 9) as i32 + 1;
        let row = (idx % 9) as i32 + 1;

        Self(Self::STRIDE * col + row + Self::PADDING)
    }

    /// 盤内のマスの通し番号 (0..81) を返す。`self` は盤内のマスでなければならない。
    pub const fn to_compact(self) -> u32 {
        debug_assert!(self.is_on_board());

        (9 * (self.col().0 - 1) + (self.row().0 - 1)) as u32
    }

    /// テーブル内のセル(壁マスを含む)かどうかを返す。
    pub const fn is_valid(self) -> bool {
        0 <= self.0 && self.0 < SQUARE_NB as i32
    }

    /// 盤内のマスかどうかを返す。
    pub const fn is_on_board(self) -> bool {
        let col = self.0 >> 4;
        let row = (self.0 & 0xF) - Self::PADDING;

        self.is_valid() && 1 <= col && col <= 9 && 1 <= row && row <= 9
    }

    /// マスの筋を返す。`self` は盤内のマスでなければならない。
    pub const fn col(self) -> Col {
        debug_assert!(self.is_on_board());

        Col(self.0 >> 4)
    }

    /// マスの段を返す。`self` は盤内のマスでなければならない。
    pub const fn row(self) -> Row {
        debug_assert!(self.is_on_board());

        Row((self.0 & 0xF) - Self::PADDING)
    }

    /// マスが指定した陣営にとって敵陣かどうかを返す。
    pub const fn is_promotion_zone(self, side: Side) -> bool {
        self.row().is_promotion_zone(side)
    }

    /// 盤内の全てのマスを通し番号順に列挙する。(１一, １二, ..., ９九 の順)
    pub fn iter(
    ) -> impl Iterator<Item = Self> + DoubleEndedIterator + ExactSizeIterator + FusedIterator {
        const ALL: [Square; 81] = {
            let mut res = [SQ_NONE; 81];
            let mut i = 0;
            while i < 81 {
                res[i] = Square::from_compact(i as u32);
                i += 1;
            }
            res
        };

        ALL.into_iter()
    }

    /// 指定した筋の盤内のマスを段の昇順に列挙する。
    pub fn iter_col(col: Col) -> impl Iterator<Item = Self> + DoubleEndedIterator + FusedIterator {
        Row::iter().map(move |row| Self::from_col_row(col, row))
    }

    /// 内部値を返す。`const` 文脈で使える。
    pub const fn inner(self) -> i32 {
        self.0
    }
}

impl std::ops::Add<i32> for Square {
    type Output = Square;

    fn add(self, rhs: i32) -> Square {
        Square(self.0 + rhs)
    }
}

impl std::ops::AddAssign<i32> for Square {
    fn add_assign(&mut self, rhs: i32) {
        *self = *self + rhs;
    }
}

impl From<Square> for i32 {
    fn from(sq: Square) -> Self {
        sq.0
    }
}

impl From<Square> for usize {
    fn from(sq: Square) -> Self {
        debug_assert!(sq.is_valid());

        sq.0 as Self
    }
}

impl std::fmt::Debug for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_on_board() {
            write!(f, "SQ_{}{}", self.col().0, self.row().0)
        } else {
            write!(f, "Square({})", self.0)
        }
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_on_board() {
            write!(f, "{}{}", self.col(), self.row())
        } else {
            write!(f, "壁({})", self.0)
        }
    }
}

/// 駒種(陣営の区別なし)。
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct PieceKind(u32);

// 値が連続で、かつ (1 << 3) を OR することで成駒になる。
// 玉は「成った空白」の位置を使う。金を成らせた位置 (15) は欠番。

pub const NO_PIECE_KIND: PieceKind = PieceKind(0);
pub const PAWN: PieceKind = PieceKind(1);
pub const LANCE: PieceKind = PieceKind(2);
pub const KNIGHT: PieceKind = PieceKind(3);
pub const SILVER: PieceKind = PieceKind(4);
pub const BISHOP: PieceKind = PieceKind(5);
pub const ROOK: PieceKind = PieceKind(6);
pub const GOLD: PieceKind = PieceKind(7);
pub const KING: PieceKind = PieceKind(8);
pub const PRO_PAWN: PieceKind = PieceKind(9);
pub const PRO_LANCE: PieceKind = PieceKind(10);
pub const PRO_KNIGHT: PieceKind = PieceKind(11);
pub const PRO_SILVER: PieceKind = PieceKind(12);
pub const HORSE: PieceKind = PieceKind(13);
pub const DRAGON: PieceKind = PieceKind(14);

impl PieceKind {
    /// 成りフラグ。
    pub const FLAG_PROMOTED: u32 = 1 << 3;

    /// 有効値かどうかを返す。`NO_PIECE_KIND` も有効とみなす。
    pub const fn is_valid(self) -> bool {
        NO_PIECE_KIND.0 <= self.0 && self.0 <= DRAGON.0
    }

    /// 有効値かつ実際の駒かどうかを返す。`NO_PIECE_KIND` は実際の駒ではない。
    pub const fn is_piece(self) -> bool {
        PAWN.0 <= self.0 && self.0 <= DRAGON.0
    }

    /// 成れる駒種かどうかを返す。
    pub const fn is_promotable(self) -> bool {
        PAWN.0 <= self.0 && self.0 <= ROOK.0
    }

    /// 成駒かどうかを返す。
    pub const fn is_promoted(self) -> bool {
        PRO_PAWN.0 <= self.0 && self.0 <= DRAGON.0
    }

    /// 手駒となりうる駒種かどうかを返す。
    pub const fn is_hand(self) -> bool {
        PAWN.0 <= self.0 && self.0 <= GOLD.0
    }

    /// 成った駒種を返す。`self` は成れる駒種でなければならない。
    pub const fn to_promoted(self) -> Self {
        debug_assert!(self.is_promotable());

        Self(self.0 | Self::FLAG_PROMOTED)
    }

    /// 成る前の駒種を返す。成駒でなければ `self` をそのまま返す。
    pub const fn to_raw(self) -> Self {
        if self.is_promoted() {
            Self(self.0 & 7)
        } else {
            self
        }
    }

    /// 手駒となりうる駒種を昇順に列挙する。
    pub fn iter_hand(
    ) -> impl Iterator<Item = Self> + DoubleEndedIterator + ExactSizeIterator + FusedIterator {
        [PAWN, LANCE, KNIGHT, SILVER, BISHOP, ROOK, GOLD].into_iter()
    }

    /// 内部値を返す。`const` 文脈で使える。
    pub const fn inner(self) -> u32 {
        self.0
    }
}

impl From<PieceKind> for u32 {
    fn from(pk: PieceKind) -> Self {
        pk.0
    }
}

impl From<PieceKind> for usize {
    fn from(pk: PieceKind) -> Self {
        debug_assert!(pk.is_valid());

        pk.0 as Self
    }
}

impl std::fmt::Debug for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        const NAMES: [&str; 15] = [
            "NO_PIECE_KIND",
            "PAWN",
            "LANCE",
            "KNIGHT",
            "SILVER",
            "BISHOP",
            "ROOK",
            "GOLD",
            "KING",
            "PRO_PAWN",
            "PRO_LANCE",
            "PRO_KNIGHT",
            "PRO_SILVER",
            "HORSE",
            "DRAGON",
        ];

        match NAMES.get(self.0 as usize) {
            Some(name) => f.write_str(name),
            None => write!(f, "PieceKind({})", self.0),
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        const NAMES: [&str; 15] = [
            "・", "歩", "香", "桂", "銀", "角", "飛", "金", "玉", "と", "杏", "圭", "全", "馬", "龍",
        ];

        match NAMES.get(self.0 as usize) {
            Some(name) => f.write_str(name),
            None => write!(f, "無効な駒種({})", self.0),
        }
    }
}

/// 駒(陣営の区別あり)。空白と壁もこの型で表す。
///
/// 内部値は 0..=31 に収まる:
///
/// * bit0-2: 成る前の駒種 (玉は bit3 のみ)
/// * bit3:   成りフラグ
/// * bit4:   後手フラグ
///
/// 先手の駒は 1..=14、後手の駒は 17..=30、壁は 31。15 と 16 は欠番。
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Piece(u32);

pub const NO_PIECE: Piece = Piece(0);
pub const B_PAWN: Piece = Piece(1);
pub const B_LANCE: Piece = Piece(2);
pub const B_KNIGHT: Piece = Piece(3);
pub const B_SILVER: Piece = Piece(4);
pub const B_BISHOP: Piece = Piece(5);
pub const B_ROOK: Piece = Piece(6);
pub const B_GOLD: Piece = Piece(7);
pub const B_KING: Piece = Piece(8);
pub const B_PRO_PAWN: Piece = Piece(9);
pub const B_PRO_LANCE: Piece = Piece(10);
pub const B_PRO_KNIGHT: Piece = Piece(11);
pub const B_PRO_SILVER: Piece = Piece(12);
pub const B_HORSE: Piece = Piece(13);
pub const B_DRAGON: Piece = Piece(14);
pub const W_PAWN: Piece = Piece(17);
pub const W_LANCE: Piece = Piece(18);
pub const W_KNIGHT: Piece = Piece(19);
pub const W_SILVER: Piece = Piece(20);
pub const W_BISHOP: Piece = Piece(21);
pub const W_ROOK: Piece = Piece(22);
pub const W_GOLD: Piece = Piece(23);
pub const W_KING: Piece = Piece(24);
pub const W_PRO_PAWN: Piece = Piece(25);
pub const W_PRO_LANCE: Piece = Piece(26);
pub const W_PRO_KNIGHT: Piece = Piece(27);
pub const W_PRO_SILVER: Piece = Piece(28);
pub const W_HORSE: Piece = Piece(29);
pub const W_DRAGON: Piece = Piece(30);
pub const WALL: Piece = Piece(31);

impl Piece {
    /// 後手フラグ。
    pub const FLAG_WHITE: u32 = 1 << 4;

    /// 内部値の種類数。
    pub const NB: usize = 32;

    /// 陣営と駒種を指定して駒を作る。pk は実際の駒でなければならない。
    pub const fn new(side: Side, pk: PieceKind) -> Self {
        debug_assert!(pk.is_piece());

        Self((side.0 << 4) | pk.0)
    }

    /// 成る前の駒種、成りフラグ、陣営を指定して駒を作る。
    ///
    /// `raw` は成駒以外の実際の駒でなければならない。
    /// 成れない駒種 (金、玉) に成りフラグを立てた結果は未定義。
    pub const fn from_parts(raw: PieceKind, promoted: bool, side: Side) -> Self {
        debug_assert!(raw.is_piece() && !raw.is_promoted());

        let flag = if promoted { PieceKind::FLAG_PROMOTED } else { 0 };

        Self((side.0 << 4) | raw.0 | flag)
    }

    /// 内部値を指定して駒を作る。無効値を渡してはならない。
    pub const fn from_inner(inner: u32) -> Self {
        let this = Self(inner);
        debug_assert!(this.is_valid());

        this
    }

    /// 有効値かどうかを返す。`NO_PIECE` と `WALL` も有効とみなす。
    pub const fn is_valid(self) -> bool {
        matches!(self.0, 0..=14 | 17..=31)
    }

    /// 有効値かつ実際の駒かどうかを返す。`NO_PIECE` と `WALL` は実際の駒ではない。
    pub const fn is_piece(self) -> bool {
        matches!(self.0, 1..=14 | 17..=30)
    }

    /// 空白かどうかを返す。
    pub const fn is_empty(self) -> bool {
        self.0 == NO_PIECE.0
    }

    /// 壁かどうかを返す。
    pub const fn is_wall(self) -> bool {
        self.0 == WALL.0
    }

    /// 成れる駒かどうかを返す。
    pub const fn is_promotable(self) -> bool {
        self.is_piece() && self.kind().is_promotable()
    }

    /// 成駒かどうかを返す。
    pub const fn is_promoted(self) -> bool {
        self.is_piece() && self.kind().is_promoted()
    }

    /// 所属陣営を返す。`self` は実際の駒でなければならない。
    pub const fn side(self) -> Side {
        debug_assert!(self.is_piece());

        Side((self.0 >> 4) & 1)
    }

    /// 駒種を返す。`self` は実際の駒か空白でなければならない。
    pub const fn kind(self) -> PieceKind {
        debug_assert!(!self.is_wall());

        PieceKind(self.0 & 0xF)
    }

    /// 成る前の駒種を返す。玉なら `KING` を返す。
    pub const fn raw_kind(self) -> PieceKind {
        self.kind().to_raw()
    }

    /// 成った駒を返す。`self` は成れる駒でなければならない。
    pub const fn to_promoted(self) -> Self {
        debug_assert!(self.is_promotable());

        Self(self.0 | PieceKind::FLAG_PROMOTED)
    }

    /// 成る前の駒を返す。`self` は成駒でなければならない。
    pub const fn to_unpromoted(self) -> Self {
        debug_assert!(self.is_promoted());

        Self(self.0 & !PieceKind::FLAG_PROMOTED)
    }

    /// 実際の駒を全て昇順に列挙する。
    pub fn iter() -> impl Iterator<Item = Self> + DoubleEndedIterator + FusedIterator {
        (B_PAWN.0..=B_DRAGON.0)
            .chain(W_PAWN.0..=W_DRAGON.0)
            .map(Self)
    }

    /// 内部値を返す。`const` 文脈で使える。
    pub const fn inner(self) -> u32 {
        self.0
    }
}

impl From<Piece> for u32 {
    fn from(pc: Piece) -> Self {
        pc.0
    }
}

impl From<Piece> for u8 {
    fn from(pc: Piece) -> Self {
        debug_assert!(pc.is_valid());

        pc.0 as Self
    }
}

impl From<Piece> for usize {
    fn from(pc: Piece) -> Self {
        debug_assert!(pc.is_valid());

        pc.0 as Self
    }
}

impl std::fmt::Debug for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            NO_PIECE => f.write_str("NO_PIECE"),
            WALL => f.write_str("WALL"),
            pc if pc.is_piece() => {
                let prefix = if pc.side() == BLACK { "B" } else { "W" };
                write!(f, "{}_{:?}", prefix, pc.kind())
            }
            _ => write!(f, "Piece({})", self.0),
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            NO_PIECE => f.write_str("・"),
            WALL => f.write_str("壁"),
            pc if pc.is_piece() => {
                let mark = if pc.side() == BLACK { "▲" } else { "△" };
                write!(f, "{}{}", mark, pc.kind())
            }
            _ => write!(f, "無効な駒({})", self.0),
        }
    }
}

/// 指し手。
///
/// `u16` に pack されており、この値がそのまま履歴エントリの指し手コードになる:
///
/// * bit0-6:   移動先 (マスの通し番号)
/// * bit7-13:  移動元 (マスの通し番号。駒打ちなら打った駒種)
/// * bit14:    駒打ちか
/// * bit15:    成りか
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct Move(u16);

impl Move {
    const FLAG_DROP: u16 = 1 << 14;
    const FLAG_PROMOTION: u16 = 1 << 15;

    /// 盤上の駒を動かして成らない指し手を作る。
    ///
    /// `src` と `dst` は相異なる盤面内のマスでなければならない。
    pub const fn new_walk(src: Square, dst: Square) -> Self {
        debug_assert!(src.0 != dst.0);

        Self((dst.to_compact() | (src.to_compact() << 7)) as u16)
    }

    /// 盤上の駒を動かして成る指し手を作る。
    ///
    /// `src` と `dst` は相異なる盤面内のマスでなければならない。
    pub const fn new_walk_promotion(src: Square, dst: Square) -> Self {
        Self(Self::new_walk(src, dst).0 | Self::FLAG_PROMOTION)
    }

    /// 駒打ちの指し手を作る。
    ///
    /// `pk` は手駒となりうる駒種でなければならない。
    /// `dst` は盤面内のマスでなければならない。
    pub const fn new_drop(pk: PieceKind, dst: Square) -> Self {
        debug_assert!(pk.is_hand());

        Self((dst.to_compact() | (pk.0 << 7)) as u16 | Self::FLAG_DROP)
    }

    /// 指し手コードから指し手を作る。有効性は検査しない。
    pub const fn from_inner(inner: u16) -> Self {
        Self(inner)
    }

    /// 指し手が有効かどうかを返す。盤面は考慮しない。
    ///
    /// 有効な指し手の定義は以下の通り:
    ///
    /// * 駒打ちフラグと成りフラグが同時に立っていない。
    /// * 盤上の駒を動かす場合、移動元と移動先が相異なる盤面内のマスである。
    /// * 駒打ちの場合、駒種が手駒となりうるものであり、かつ移動先が盤面内のマスである。
    pub const fn is_valid(self) -> bool {
        if self.is_drop() && self.is_promotion() {
            return false;
        }

        let dst = self.0 & 0x7F;
        let src = (self.0 >> 7) & 0x7F;
        if dst >= 81 {
            return false;
        }

        if self.is_drop() {
            PieceKind(src as u32).is_hand()
        } else {
            src < 81 && src != dst
        }
    }

    /// 駒打ちかどうかを返す。
    pub const fn is_drop(self) -> bool {
        (self.0 & Self::FLAG_DROP) != 0
    }

    /// 成りかどうかを返す。
    pub const fn is_promotion(self) -> bool {
        (self.0 & Self::FLAG_PROMOTION) != 0
    }

    /// 移動先を返す。
    pub const fn dst(self) -> Square {
        Square::from_compact((self.0 & 0x7F) as u32)
    }

    /// 移動元を返す。`self` は盤上の駒を動かす指し手でなければならない。
    pub const fn src(self) -> Square {
        debug_assert!(!self.is_drop());

        Square::from_compact(((self.0 >> 7) & 0x7F) as u32)
    }

    /// 打った駒種を返す。`self` は駒打ちでなければならない。
    pub const fn dropped_piece_kind(self) -> PieceKind {
        debug_assert!(self.is_drop());

        PieceKind(((self.0 >> 7) & 0x7F) as u32)
    }

    /// 内部値(指し手コード)を返す。`const` 文脈で使える。
    pub const fn inner(self) -> u16 {
        self.0
    }
}

impl From<Move> for u16 {
    fn from(mv: Move) -> Self {
        mv.0
    }
}

impl std::fmt::Debug for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if !self.is_valid() {
            return write!(f, "Move({:#06x})", self.0);
        }

        if self.is_drop() {
            write!(
                f,
                "Drop {{ pk: {:?}, dst: {:?} }}",
                self.dropped_piece_kind(),
                self.dst()
            )
        } else {
            write!(
                f,
                "Walk {{ src: {:?}, dst: {:?}, promo: {} }}",
                self.src(),
                self.dst(),
                self.is_promotion()
            )
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if !self.is_valid() {
            return write!(f, "無効な指し手({:#06x})", self.0);
        }

        if self.is_drop() {
            write!(f, "{}{}打", self.dst(), self.dropped_piece_kind())?;
        } else {
            write!(f, "{}{}", self.src(), self.dst())?;
            if self.is_promotion() {
                f.write_str("成")?;
            }
        }

        Ok(())
    }
}

/// マスを指定して駒を参照できる盤面表現。
pub trait PieceAt {
    /// `sq` にある駒を返す。壁マスなら `WALL` を返す。
    fn piece_at(&self, sq: Square) -> Piece;
}

/// 盤面。壁マスを含む全セルの駒を持つ。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct Board([Piece; SQUARE_NB]);

impl Board {
    /// 空の盤面を返す。盤外のセルは全て壁。
    pub const fn empty() -> Self {
        let mut inner = [WALL; SQUARE_NB];

        let mut i = 0;
        while i < 81 {
            inner[Square::from_compact(i).0 as usize] = NO_PIECE;
            i += 1;
        }

        Self(inner)
    }

    /// 平手初期盤面を返す。
    pub const fn startpos() -> Self {
        // 筋ごとに一段目から九段目までを並べる。
        #[rustfmt::skip]
        const COLS: [[Piece; 9]; 9] = [
            [W_LANCE,  NO_PIECE, W_PAWN, NO_PIECE, NO_PIECE, NO_PIECE, B_PAWN, NO_PIECE, B_LANCE],
            [W_KNIGHT, W_BISHOP, W_PAWN, NO_PIECE, NO_PIECE, NO_PIECE, B_PAWN, B_ROOK,   B_KNIGHT],
            [W_SILVER, NO_PIECE, W_PAWN, NO_PIECE, NO_PIECE, NO_PIECE, B_PAWN, NO_PIECE, B_SILVER],
            [W_GOLD,   NO_PIECE, W_PAWN, NO_PIECE, NO_PIECE, NO_PIECE, B_PAWN, NO_PIECE, B_GOLD],
            [W_KING,   NO_PIECE, W_PAWN, NO_PIECE, NO_PIECE, NO_PIECE, B_PAWN, NO_PIECE, B_KING],
            [W_GOLD,   NO_PIECE, W_PAWN, NO_PIECE, NO_PIECE, NO_PIECE, B_PAWN, NO_PIECE, B_GOLD],
            [W_SILVER, NO_PIECE, W_PAWN, NO_PIECE, NO_PIECE, NO_PIECE, B_PAWN, NO_PIECE, B_SILVER],
            [W_KNIGHT, W_ROOK,   W_PAWN, NO_PIECE, NO_PIECE, NO_PIECE, B_PAWN, B_BISHOP, B_KNIGHT],
            [W_LANCE,  NO_PIECE, W_PAWN, NO_PIECE, NO_PIECE, NO_PIECE, B_PAWN, NO_PIECE, B_LANCE],
        ];

        let mut this = Self::empty();

        let mut i = 0;
        while i < 81 {
            let sq = Square::from_compact(i);
            this.0[sq.0 as usize] = COLS[(i / 9) as usize][(i % 9) as usize];
            i += 1;
        }

        this
    }
}

impl std::ops::Index<Square> for Board {
    type Output = Piece;

    fn index(&self, sq: Square) -> &Self::Output {
        &self.0[usize::from(sq)]
    }
}

impl std::ops::IndexMut<Square> for Board {
    /// 壁マスを書き換えてはならない。
    fn index_mut(&mut self, sq: Square) -> &mut Self::Output {
        debug_assert!(sq.is_on_board());

        &mut self.0[usize::from(sq)]
    }
}

impl PieceAt for Board {
    fn piece_at(&self, sq: Square) -> Piece {
        self[sq]
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt_board(self, f)
    }
}

/// 盤面を 9x9 のテキストで出力する。後手の駒には 'v' を前置する。
pub(crate) fn fmt_board(board: &impl PieceAt, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    for row in Row::iter() {
        for col in Col::iter().rev() {
            let pc = board.piece_at(Square::from_col_row(col, row));
            if pc.is_piece() && pc.side() == WHITE {
                f.write_str("v")?;
            } else {
                f.write_str(" ")?;
            }
            if pc.is_piece() {
                write!(f, "{}", pc.kind())?;
            } else {
                write!(f, "{}", NO_PIECE_KIND)?;
            }
        }
        writeln!(f)?;
    }

    Ok(())
}

/// 手駒。
///
/// 駒種ごとの枚数を持つ単純な配列。局面の識別用には `HandValue` に詰めて使う。
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct Hand([u32; 8]);

impl Hand {
    /// 空の手駒を返す。
    pub const fn empty() -> Self {
        Self([0; 8])
    }

    /// 手駒が空かどうかを返す。
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&n| n == 0)
    }
}

impl std::ops::Index<PieceKind> for Hand {
    type Output = u32;

    /// 手駒とならない駒種を渡してはならない。
    fn index(&self, pk: PieceKind) -> &Self::Output {
        debug_assert!(pk.is_hand());

        &self.0[usize::from(pk)]
    }
}

impl std::ops::IndexMut<PieceKind> for Hand {
    /// 手駒とならない駒種を渡してはならない。
    fn index_mut(&mut self, pk: PieceKind) -> &mut Self::Output {
        debug_assert!(pk.is_hand());

        &mut self.0[usize::from(pk)]
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        const PKS: [PieceKind; 7] = [ROOK, BISHOP, GOLD, SILVER, KNIGHT, LANCE, PAWN];

        if self.is_empty() {
            return f.write_str("なし");
        }

        for pk in PKS {
            let n = self[pk];
            if n == 0 {
                continue;
            }

            write!(f, "{}", pk)?;
            if n >= 2 {
                write!(f, "{}", n)?;
            }
        }

        Ok(())
    }
}

/// 両陣営の手駒。`Side` でインデックスアクセスできる。
pub type Hands = SideArray<Hand>;

/// 手駒を 32bit に詰めたもの。局面の識別に使う。
///
/// * bit0-4:   歩 (0..=18)
/// * bit5-7:   香 (0..=4)
/// * bit8-10:  桂 (0..=4)
/// * bit11-13: 銀 (0..=4)
/// * bit14-16: 金 (0..=4)
/// * bit17-18: 角 (0..=2)
/// * bit19-20: 飛 (0..=2)
///
/// `Position` は先手の手駒のみをこの形で保持する。
/// 平手の駒一式なら、後手の手駒は盤上の駒と先手の手駒から一意に定まる。
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct HandValue(u32);

impl HandValue {
    /// 空の手駒。
    pub const EMPTY: Self = Self(0);

    // PieceKind の内部値でインデックスアクセスする。
    const SHIFTS: [u32; 8] = [0, 0, 5, 8, 11, 17, 19, 14];
    const MASKS: [u32; 8] = [0, 0x1F, 0x7, 0x7, 0x7, 0x3, 0x3, 0x7];

    /// 内部値を指定して作る。
    pub const fn from_inner(inner: u32) -> Self {
        Self(inner)
    }

    /// 手駒を詰める。各駒種の枚数は上限以内でなければならない。
    pub fn from_hand(hand: &Hand) -> Self {
        PieceKind::iter_hand().fold(Self::EMPTY, |acc, pk| {
            debug_assert!(hand[pk] <= Self::MASKS[usize::from(pk)]);
            Self(acc.0 + (hand[pk] << Self::SHIFTS[usize::from(pk)]))
        })
    }

    /// 指定した駒種の枚数を返す。`pk` は手駒となりうる駒種でなければならない。
    pub const fn count(self, pk: PieceKind) -> u32 {
        debug_assert!(pk.is_hand());

        (self.0 >> Self::SHIFTS[pk.0 as usize]) & Self::MASKS[pk.0 as usize]
    }

    /// 指定した駒種を 1 枚加えたものを返す。
    pub const fn add(self, pk: PieceKind) -> Self {
        debug_assert!(pk.is_hand());
        debug_assert!(self.count(pk) < Self::MASKS[pk.0 as usize]);

        Self(self.0 + (1 << Self::SHIFTS[pk.0 as usize]))
    }

    /// 指定した駒種を 1 枚除いたものを返す。その駒種を 1 枚以上持っていなければならない。
    pub const fn sub(self, pk: PieceKind) -> Self {
        debug_assert!(pk.is_hand());
        debug_assert!(self.count(pk) > 0);

        Self(self.0 - (1 << Self::SHIFTS[pk.0 as usize]))
    }

    /// 内部値を返す。`const` 文脈で使える。
    pub const fn inner(self) -> u32 {
        self.0
    }
}

impl From<&Hand> for HandValue {
    fn from(hand: &Hand) -> Self {
        Self::from_hand(hand)
    }
}

impl From<HandValue> for u32 {
    fn from(hv: HandValue) -> Self {
        hv.0
    }
}

/// 方向。
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct Direction(u32);

impl Direction {
    pub const RU: Direction = Direction(0);
    pub const R: Direction = Direction(1);
    pub const RD: Direction = Direction(2);
    pub const U: Direction = Direction(3);
    pub const D: Direction = Direction(4);
    pub const LU: Direction = Direction(5);
    pub const L: Direction = Direction(6);
    pub const LD: Direction = Direction(7);

    /// 有効値かどうかを返す。
    pub const fn is_valid(self) -> bool {
        Self::RU.0 <= self.0 && self.0 <= Self::LD.0
    }

    /// 逆方向を返す。
    pub const fn inv(self) -> Self {
        // 内部値は以下のように割り当てられているので、逆方向同士を加えると常に 7 になる。
        //
        // 530
        // 6.1
        // 742

        Self(7 - self.0)
    }

    /// 方向を `Square` の差分値に変換する。
    pub const fn to_delta(self) -> i32 {
        const TABLE: [i32; 8] = [
            Square::DIR_RU,
            Square::DIR_R,
            Square::DIR_RD,
            Square::DIR_U,
            Square::DIR_D,
            Square::DIR_LU,
            Square::DIR_L,
            Square::DIR_LD,
        ];

        TABLE[self.0 as usize]
    }

    /// 全ての方向を内部値の昇順に列挙する。
    pub fn iter(
    ) -> impl Iterator<Item = Self> + DoubleEndedIterator + ExactSizeIterator + FusedIterator {
        [
            Self::RU,
            Self::R,
            Self::RD,
            Self::U,
            Self::D,
            Self::LU,
            Self::L,
            Self::LD,
        ]
        .into_iter()
    }

    /// 内部値を返す。`const` 文脈で使える。
    pub const fn inner(self) -> u32 {
        self.0
    }
}

impl From<Direction> for usize {
    fn from(dir: Direction) -> Self {
        debug_assert!(dir.is_valid());

        dir.0 as Self
    }
}

impl std::fmt::Debug for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        const NAMES: [&str; 8] = ["RU", "R", "RD", "U", "D", "LU", "L", "LD"];

        match NAMES.get(self.0 as usize) {
            Some(name) => write!(f, "Direction::{}", name),
            None => write!(f, "Direction({})", self.0),
        }
    }
}

/// 8 方向の集合。bit i が内部値 i の `Direction` に対応する。
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const RU: DirectionSet = DirectionSet(1 << 0);
    pub const R: DirectionSet = DirectionSet(1 << 1);
    pub const RD: DirectionSet = DirectionSet(1 << 2);
    pub const U: DirectionSet = DirectionSet(1 << 3);
    pub const D: DirectionSet = DirectionSet(1 << 4);
    pub const LU: DirectionSet = DirectionSet(1 << 5);
    pub const L: DirectionSet = DirectionSet(1 << 6);
    pub const LD: DirectionSet = DirectionSet(1 << 7);

    /// 斜め 4 方向。
    pub const DIAGONAL: DirectionSet = Self::RU.or(Self::RD).or(Self::LU).or(Self::LD);
    /// 縦横 4 方向。
    pub const ORTHOGONAL: DirectionSet = Self::R.or(Self::U).or(Self::D).or(Self::L);

    /// 空の(どの方向も含まない) `DirectionSet` を作る。
    pub const fn empty() -> Self {
        Self(0)
    }

    /// 内部値を指定して `DirectionSet` を作る。
    pub const fn from_inner(inner: u8) -> Self {
        Self(inner)
    }

    /// `self` が空かどうかを返す。
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 指定した方向を含むかどうかを返す。
    pub const fn contains(self, dir: Direction) -> bool {
        (self.0 & (1 << dir.0)) != 0
    }

    /// 含まれる方向の個数を返す。
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// 含まれる方向のうち、内部値が最小のものを pop する。`self` は空であってはならない。
    pub fn pop_least(&mut self) -> Direction {
        debug_assert!(!self.is_empty());

        let inner = self.0.trailing_zeros();
        self.0 &= self.0 - 1;

        Direction(inner)
    }

    /// 含まれる方向を内部値の昇順に列挙する。
    pub fn iter(self) -> impl Iterator<Item = Direction> + FusedIterator {
        let mut dirs = self;
        std::iter::from_fn(move || (!dirs.is_empty()).then(|| dirs.pop_least())).fuse()
    }

    /// NOT 演算。`const` 文脈で使えるのが `!` 演算子との違い。
    pub const fn not(self) -> Self {
        Self(!self.0)
    }

    /// AND 演算。`const` 文脈で使えるのが `&` 演算子との違い。
    pub const fn and(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }

    /// OR 演算。`const` 文脈で使えるのが '|' 演算子との違い。
    pub const fn or(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }

    /// 内部値を返す。`const` 文脈で使える。
    pub const fn inner(self) -> u8 {
        self.0
    }
}

impl From<Direction> for DirectionSet {
    /// 単一の方向のみを含む `DirectionSet` を返す。
    fn from(dir: Direction) -> Self {
        Self(1 << dir.0)
    }
}

impl std::ops::Not for DirectionSet {
    type Output = Self;

    fn not(self) -> Self {
        DirectionSet::not(self)
    }
}

impl std::ops::BitAnd for DirectionSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl std::ops::BitAndAssign for DirectionSet {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl std::ops::BitOr for DirectionSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl std::ops::BitOrAssign for DirectionSet {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl From<DirectionSet> for u8 {
    fn from(dirs: DirectionSet) -> Self {
        dirs.0
    }
}

impl std::fmt::Debug for DirectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("DirectionSet(0)");
        }

        for (i, dir) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{:?}", dir)?;
        }

        Ok(())
    }
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
    fn test_row_is_promotion_zone() {
        for row in Row::iter() {
            assert_eq!(row.is_promotion_zone(BLACK), row.inner() <= 3);
            assert_eq!(row.is_promotion_zone(WHITE), row.inner() >= 7);
        }
    }

    #[test]
    fn test_square_layout() {
        assert_eq!(sq(1, 1).inner(), 19);
        assert_eq!(sq(9, 9).inner(), 155);
        assert_eq!(SQUARE_NB, 176);

        for sq in Square::iter() {
            assert!(sq.is_on_board());
            assert_eq!(Square::from_col_row(sq.col(), sq.row()), sq);
            assert_eq!(Square::from_compact(sq.to_compact()), sq);
        }

        let on_board = (0..SQUARE_NB as i32)
            .filter(|&i| Square::from_inner(i).is_on_board())
            .count();
        assert_eq!(on_board, 81);
        assert!(!SQ_NONE.is_on_board());
    }

    #[test]
    fn test_square_iter_order() {
        assert_equal(
            Square::iter().take(3),
            [sq(1, 1), sq(1, 2), sq(1, 3)],
        );
        assert_equal(Square::iter().rev().take(2), [sq(9, 9), sq(9, 8)]);
        assert_equal(
            Square::iter_col(COL_4).map(Square::row),
            Row::iter(),
        );
    }

    /// 盤内のマスから 1 歩または桂跳びで進んだ先は、必ずテーブル内に収まる。
    #[test]
    fn test_square_steps_stay_in_table() {
        const DELTAS: [i32; 12] = [
            Square::DIR_RU,
            Square::DIR_R,
            Square::DIR_RD,
            Square::DIR_U,
            Square::DIR_D,
            Square::DIR_LU,
            Square::DIR_L,
            Square::DIR_LD,
            Square::DIR_RUU,
            Square::DIR_RDD,
            Square::DIR_LUU,
            Square::DIR_LDD,
        ];

        let board = Board::empty();
        for src in Square::iter() {
            for delta in DELTAS {
                let dst = src + delta;
                assert!(dst.is_valid());
                if !dst.is_on_board() {
                    assert_eq!(board[dst], WALL);
                }
            }
        }
    }

    #[test]
    fn test_piece_round_trip() {
        let mut count = 0;
        for code in 0..Piece::NB as u32 {
            let pc = Piece(code);
            if !pc.is_piece() {
                continue;
            }
            count += 1;

            let decoded = Piece::from_parts(pc.raw_kind(), pc.is_promoted(), pc.side());
            assert_eq!(decoded, pc);
            assert_eq!(Piece::new(pc.side(), pc.kind()), pc);
        }
        assert_eq!(count, 28);
        assert_eq!(Piece::iter().count(), 28);
    }

    #[test]
    fn test_piece_decode() {
        assert_eq!(W_HORSE.side(), WHITE);
        assert_eq!(W_HORSE.raw_kind(), BISHOP);
        assert!(W_HORSE.is_promoted());
        assert_eq!(B_KING.raw_kind(), KING);
        assert!(!B_KING.is_promoted());
        assert_eq!(B_PRO_SILVER.to_unpromoted(), B_SILVER);
        assert_eq!(W_PAWN.to_promoted(), W_PRO_PAWN);

        // 壁と空白は区別でき、どちらも実際の駒ではない。
        assert_ne!(WALL, NO_PIECE);
        assert!(WALL.is_wall() && !WALL.is_empty());
        assert!(NO_PIECE.is_empty() && !NO_PIECE.is_wall());
        assert!(!WALL.is_piece());
        assert!(!NO_PIECE.is_piece());
        assert!(WALL.is_valid());
        assert!(!Piece(15).is_valid());
        assert!(!Piece(16).is_valid());
    }

    #[test]
    fn test_move_code() {
        let mv = Move::new_walk_promotion(sq(2, 4), sq(2, 3));
        assert!(mv.is_valid());
        assert!(mv.is_promotion());
        assert!(!mv.is_drop());
        assert_eq!(mv.src(), sq(2, 4));
        assert_eq!(mv.dst(), sq(2, 3));
        assert_eq!(Move::from_inner(u16::from(mv)), mv);

        let mv = Move::new_drop(GOLD, sq(5, 2));
        assert!(mv.is_valid());
        assert!(mv.is_drop());
        assert_eq!(mv.dropped_piece_kind(), GOLD);
        assert_eq!(mv.dst(), sq(5, 2));
        assert_eq!(mv.to_string(), "５二金打");

        assert!(!Move::from_inner(0x7F).is_valid());
        assert!(!Move::from_inner(0xC000).is_valid());
    }

    #[test]
    fn test_board_startpos() {
        let board = Board::startpos();
        assert_eq!(board[sq(5, 9)], B_KING);
        assert_eq!(board[sq(5, 1)], W_KING);
        assert_eq!(board[sq(2, 8)], B_ROOK);
        assert_eq!(board[sq(8, 8)], B_BISHOP);
        assert_eq!(board[sq(8, 2)], W_ROOK);
        assert_eq!(board[sq(2, 2)], W_BISHOP);
        assert_eq!(board[SQ_NONE], WALL);
        assert_eq!(
            Square::iter().filter(|&sq| board[sq].is_piece()).count(),
            40
        );
    }

    #[test]
    fn test_hand_value() {
        let mut hand = Hand::empty();
        hand[PAWN] = 18;
        hand[GOLD] = 4;
        hand[ROOK] = 2;

        let hv = HandValue::from(&hand);
        assert_eq!(hv.count(PAWN), 18);
        assert_eq!(hv.count(GOLD), 4);
        assert_eq!(hv.count(ROOK), 2);
        assert_eq!(hv.count(BISHOP), 0);

        let hv2 = hv.add(BISHOP).sub(PAWN);
        assert_eq!(hv2.count(BISHOP), 1);
        assert_eq!(hv2.count(PAWN), 17);
        assert_eq!(hv2.sub(BISHOP).add(PAWN), hv);

        assert_eq!(HandValue::from(&Hand::empty()), HandValue::EMPTY);
    }

    #[test]
    fn test_direction_delta() {
        for dir in Direction::iter() {
            assert_eq!(dir.to_delta(), -dir.inv().to_delta());
        }
        assert_eq!(sq(3, 4) + Direction::RU.to_delta(), sq(2, 3));
        assert_eq!(sq(3, 4) + Direction::L.to_delta(), sq(4, 4));
        assert_eq!(sq(3, 4) + Direction::D.to_delta(), sq(3, 5));
    }

    #[test]
    fn test_direction_set_pop_least() {
        let mut dirs = DirectionSet::RU | DirectionSet::D | DirectionSet::L;
        assert_eq!(dirs.len(), 3);

        assert_eq!(dirs.pop_least(), Direction::RU);
        assert_eq!(dirs.pop_least(), Direction::D);
        assert_eq!(dirs.pop_least(), Direction::L);

        assert_eq!(dirs, DirectionSet::empty());
    }

    #[test]
    fn test_direction_set_bitop() {
        let dirs = DirectionSet::RU | DirectionSet::D | DirectionSet::L;

        assert!(dirs.contains(Direction::D));
        assert!(!dirs.contains(Direction::U));
        assert_eq!(
            dirs & DirectionSet::ORTHOGONAL,
            DirectionSet::D | DirectionSet::L
        );
        assert_eq!(!DirectionSet::DIAGONAL, DirectionSet::ORTHOGONAL);
        assert_equal(dirs.iter(), [Direction::RU, Direction::D, Direction::L]);
    }
}
