//! 指し手の履歴。
//!
//! 着手ごとに着手前のハッシュ値と手駒、指し手、取った駒、王手だったかを記録する。
//! 手を戻す際はこれを pop し、逆操作に使う。
//!
//! 各エントリは 16 バイトの固定長バイナリとして読み書きできる (全てリトルエンディアン):
//!
//! | オフセット | 幅 | 内容                       |
//! |------------|----|----------------------------|
//! | 0          | 8  | 着手前のハッシュ値         |
//! | 8          | 4  | 着手前の手駒 (`HandValue`) |
//! | 12         | 2  | 指し手コード               |
//! | 14         | 1  | 取った駒 (なければ 0)      |
//! | 15         | 1  | 王手フラグ (0 または 1)    |

use std::io::{Read, Write};

use anyhow::{bail, ensure, Context as _};

use crate::shogi::*;
use crate::zobrist::{self, Key};

/// 履歴の 1 エントリ。着手前の状態と、その着手の内容。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HistoryEntry {
    hash: Key,
    hand: HandValue,
    mv: Move,
    captured: Piece,
    checked: bool,
}

impl HistoryEntry {
    /// バイナリ表現のバイト数。
    pub const ENCODED_LEN: usize = 16;

    pub fn new(hash: Key, hand: HandValue, mv: Move, captured: Piece, checked: bool) -> Self {
        debug_assert!(captured.is_empty() || captured.is_piece());
        debug_assert!(!mv.is_drop() || captured.is_empty());

        Self {
            hash,
            hand,
            mv,
            captured,
            checked,
        }
    }

    /// 着手前のハッシュ値を返す。
    pub fn hash(&self) -> Key {
        self.hash
    }

    /// 着手前の手駒を返す。
    pub fn hand(&self) -> HandValue {
        self.hand
    }

    pub fn mv(&self) -> Move {
        self.mv
    }

    /// 取った駒を返す。駒を取らなかった場合は `NO_PIECE`。
    pub fn captured(&self) -> Piece {
        self.captured
    }

    /// この着手が王手だったかどうかを返す。
    pub fn is_check(&self) -> bool {
        self.checked
    }

    /// ハッシュ値と手駒を単純に XOR した識別キー。
    ///
    /// 手駒の値は下位ビットに偏るため衝突しやすい。高速な粗い判定にのみ使う。
    pub fn key_cheap(&self) -> Key {
        self.hash ^ Key::from(self.hand.inner())
    }

    /// ハッシュ値と手駒の補助ハッシュを XOR した識別キー。同一局面判定にはこちらを使う。
    pub fn key(&self) -> Key {
        self.hash ^ zobrist::hand_hash(self.hand)
    }

    /// バイナリ表現に変換する。
    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut buf = [0; Self::ENCODED_LEN];

        buf[0..8].copy_from_slice(&self.hash.to_le_bytes());
        buf[8..12].copy_from_slice(&self.hand.inner().to_le_bytes());
        buf[12..14].copy_from_slice(&self.mv.inner().to_le_bytes());
        buf[14] = u8::from(self.captured);
        buf[15] = u8::from(self.checked);

        buf
    }

    /// バイナリ表現から復元する。
    pub fn decode(buf: &[u8; Self::ENCODED_LEN]) -> anyhow::Result<Self> {
        let mut hash = [0; 8];
        hash.copy_from_slice(&buf[0..8]);
        let mut hand = [0; 4];
        hand.copy_from_slice(&buf[8..12]);
        let mv = Move::from_inner(u16::from_le_bytes([buf[12], buf[13]]));

        ensure!(mv.is_valid(), "invalid move code: {:#06x}", mv.inner());

        let captured = decode_piece(buf[14])?;
        ensure!(
            captured.is_empty() || captured.kind() != KING,
            "captured piece must not be a king: {}",
            buf[14]
        );
        ensure!(
            !mv.is_drop() || captured.is_empty(),
            "drop move must not capture: {}",
            buf[14]
        );

        let checked = match buf[15] {
            0 => false,
            1 => true,
            b => bail!("invalid check flag: {}", b),
        };

        Ok(Self {
            hash: u64::from_le_bytes(hash),
            hand: HandValue::from_inner(u32::from_le_bytes(hand)),
            mv,
            captured,
            checked,
        })
    }

    /// バイナリ表現を書き出す。
    pub fn write_to<W: Write>(&self, mut wtr: W) -> anyhow::Result<()> {
        wtr.write_all(&self.encode())?;

        Ok(())
    }

    /// バイナリ表現を読み込んで復元する。
    pub fn read_from<R: Read>(mut rdr: R) -> anyhow::Result<Self> {
        let mut buf = [0; Self::ENCODED_LEN];
        rdr.read_exact(&mut buf)
            .context("history entry is truncated")?;

        Self::decode(&buf)
    }
}

/// 1 バイトの駒コードを検査しつつ駒に変換する。盤上に置ける駒か空白のみを受け付ける。
fn decode_piece(b: u8) -> anyhow::Result<Piece> {
    let code = u32::from(b);
    ensure!(
        matches!(code, 0..=14 | 17..=30),
        "invalid piece code: {}",
        b
    );

    Ok(Piece::from_inner(code))
}

/// 千日手判定の結果。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Repetition {
    /// 千日手ではない。
    NotRepeated,
    /// 通常の千日手 (引き分け)。
    Draw,
    /// 連続王手の千日手。王手をかけ続けた側を持つ。
    PerpetualCheck(Side),
}

/// 履歴のスタック。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// エントリを積む。
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// 最新のエントリを取り出す。空なら `None` を返す。
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    /// `n_ago` 手前のエントリを返す。`n_ago == 0` は最新のエントリ。
    pub fn get(&self, n_ago: usize) -> Option<&HistoryEntry> {
        let idx = self.entries.len().checked_sub(n_ago + 1)?;
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 古いものから `len` 個だけ残す。
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// エントリを古い順に列挙する。
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> + DoubleEndedIterator + ExactSizeIterator {
        self.entries.iter()
    }

    /// 現局面と同じ手番の過去局面のうち、識別キーが `key` と一致するものの数を返す。
    ///
    /// 最新のエントリの着手前局面は手番が逆なので、1 手前, 3 手前, ... のエントリを調べる。
    pub fn count_repetitions(&self, key: Key) -> usize {
        self.entries
            .iter()
            .rev()
            .skip(1)
            .step_by(2)
            .filter(|entry| entry.key() == key)
            .count()
    }

    /// 現局面 (識別キー `key`、手番 `us`) について千日手判定を行う。
    ///
    /// 同一局面が現局面を含めて 4 回現れたら千日手。そのうち最も古い出現以降、
    /// 一方の着手が全て王手だったなら連続王手の千日手とする。
    pub fn repetition(&self, key: Key, us: Side) -> Repetition {
        let them = us.inv();

        let mut count = 0;
        let mut earliest = None;
        for n_ago in (1..self.entries.len()).step_by(2) {
            if self.entry_at(n_ago).key() != key {
                continue;
            }
            count += 1;
            if count == 3 {
                earliest = Some(n_ago);
                break;
            }
        }

        let earliest = match earliest {
            Some(n_ago) => n_ago,
            None => return Repetition::NotRepeated,
        };

        // 偶数手前のエントリは相手の着手、奇数手前のエントリは自分の着手。
        let all_checks = |parity: usize| {
            (0..=earliest)
                .filter(|n_ago| n_ago % 2 == parity)
                .all(|n_ago| self.entry_at(n_ago).is_check())
        };

        if all_checks(0) {
            Repetition::PerpetualCheck(them)
        } else if all_checks(1) {
            Repetition::PerpetualCheck(us)
        } else {
            Repetition::Draw
        }
    }

    fn entry_at(&self, n_ago: usize) -> &HistoryEntry {
        &self.entries[self.entries.len() - 1 - n_ago]
    }

    /// 履歴全体を書き出す。エントリ数 (u32, リトルエンディアン) に続けて各エントリを並べる。
    pub fn write_to<W: Write>(&self, mut wtr: W) -> anyhow::Result<()> {
        let len = u32::try_from(self.entries.len()).context("history is too long")?;
        wtr.write_all(&len.to_le_bytes())?;

        for entry in &self.entries {
            entry.write_to(&mut wtr)?;
        }

        Ok(())
    }

    /// `write_to()` で書き出した履歴を読み込む。
    pub fn read_from<R: Read>(mut rdr: R) -> anyhow::Result<Self> {
        let mut buf = [0; 4];
        rdr.read_exact(&mut buf)
            .context("history length is truncated")?;
        let len = u32::from_le_bytes(buf) as usize;

        let entries = (0..len)
            .map(|i| {
                HistoryEntry::read_from(&mut rdr).with_context(|| format!("history entry #{}", i))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self { entries })
    }
}
