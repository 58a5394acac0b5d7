//! 境界検査付きのバイトカーソル
//!
//! 接続コスト行列やセクションコンテナのバイナリを先頭から順に読み進めるためのカーソルです。
//! 読み込みのたびに残りの長さを検査し、足りない場合は `None` を返します。

/// 借用したバイト列を前進しながら読むカーソル
#[derive(Debug, Clone)]
pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// バッファ先頭からの現在のオフセット
    #[inline(always)]
    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    /// 残りのバイト数
    #[inline(always)]
    pub(crate) const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// 現在位置が `align` バイト境界に揃っているかを返します。
    #[inline(always)]
    pub(crate) const fn is_aligned(&self, align: usize) -> bool {
        self.pos % align == 0
    }

    /// `len` バイトを切り出して前進します。
    pub(crate) fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    /// リトルエンディアンの `u16` を読んで前進します。
    pub(crate) fn read_u16(&mut self) -> Option<u16> {
        let bytes = self.take(2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// リトルエンディアンの `u32` を読んで前進します。
    pub(crate) fn read_u32(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
