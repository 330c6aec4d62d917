//! 局面の固定長テーブルを格納する連続領域。
//!
//! 1 つの `Box<[u8]>` を先頭から順に切り出して使う。切り出した領域はアドレスではなく
//! `Region` (オフセットと長さ) で表し、読み書きは必ず `Arena` を経由する。

/// `Arena` から切り出した領域。所有権は持たない。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Region {
    offset: usize,
    len: usize,
}

impl Region {
    /// 領域の先頭オフセットを返す。
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// 領域のバイト数を返す。
    pub const fn len(self) -> usize {
        self.len
    }

    /// 領域が空かどうかを返す。
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// 領域の終端オフセット(排他的)を返す。
    pub const fn end(self) -> usize {
        self.offset + self.len
    }
}

/// 連続領域と、その切り出し位置。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Arena {
    buf: Box<[u8]>,
    cursor: usize,
    checked: bool,
}

impl Arena {
    /// 指定したバイト数の領域を確保する。ゼロ初期化される。
    ///
    /// 容量検査はデバッグビルドでのみ有効。
    pub fn new(size: usize) -> Self {
        Self::with_checks(size, cfg!(debug_assertions))
    }

    /// 容量検査の有無を指定して領域を確保する。
    pub fn with_checks(size: usize, checked: bool) -> Self {
        Self {
            buf: vec![0; size].into_boxed_slice(),
            cursor: 0,
            checked,
        }
    }

    /// 全体のバイト数を返す。
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    /// まだ切り出していないバイト数を返す。
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.cursor)
    }

    /// 容量検査が有効かどうかを返す。
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// 現在位置から `n` バイトを切り出し、位置を進める。
    ///
    /// 容量検査が有効な場合、残りが `n` バイト未満なら panic する。
    pub fn carve(&mut self, n: usize) -> Region {
        if self.checked {
            assert!(
                n <= self.remaining(),
                "arena: insufficient space (容量不足): requested {} bytes, {} remaining",
                n,
                self.remaining()
            );
        }

        let region = Region {
            offset: self.cursor,
            len: n,
        };
        self.cursor += n;

        region
    }

    /// 切り出しを終える。
    ///
    /// 容量検査が有効な場合、切り出されずに残ったバイトがあれば panic する。
    pub fn finish(&self) {
        if self.checked {
            assert!(
                self.remaining() == 0,
                "arena: leftover bytes (余分): {} bytes not carved",
                self.remaining()
            );
        }
    }

    /// 切り出し位置を先頭に戻し、全体をゼロクリアする。
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.buf.fill(0);
    }

    /// 領域の内容を返す。
    pub fn slice(&self, region: Region) -> &[u8] {
        &self.buf[region.offset..region.end()]
    }

    /// 領域の内容を可変で返す。
    pub fn slice_mut(&mut self, region: Region) -> &mut [u8] {
        &mut self.buf[region.offset..region.end()]
    }
}
