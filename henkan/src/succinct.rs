//! 簡潔ビットベクトルの索引
//!
//! 借用したバイト列をビット配列として扱い、`get` と `rank1` を定数時間で提供します。
//! ビットはリトルエンディアンの各バイト内で最下位ビットから順に並びます。
//! 元のバイト列はコピーせず、32ビットワードごとの累積カウントだけを保持します。

use crate::utils::FromU32;

/// バイト列上のビットベクトル索引
#[derive(Debug)]
pub struct BitVectorIndex<'a> {
    bits: &'a [u8],
    /// `ranks[i]` はバイト `[0, 4i)` に含まれる1の数
    ranks: Vec<u32>,
}

impl<'a> BitVectorIndex<'a> {
    /// 新しい索引を構築します。
    ///
    /// # 引数
    ///
    /// * `bits` - ビット列のバイト表現
    pub fn new(bits: &'a [u8]) -> Self {
        let num_words = bits.len().div_ceil(4);
        let mut ranks = Vec::with_capacity(num_words + 1);
        let mut acc = 0;
        ranks.push(acc);
        for i in 0..num_words {
            acc += Self::load_word(bits, i).count_ones();
            ranks.push(acc);
        }
        Self { bits, ranks }
    }

    #[inline(always)]
    fn load_word(bits: &[u8], word_idx: usize) -> u32 {
        let start = word_idx * 4;
        let mut buf = [0; 4];
        if let Some(tail) = bits.get(start..) {
            let len = tail.len().min(4);
            buf[..len].copy_from_slice(&tail[..len]);
        }
        u32::from_le_bytes(buf)
    }

    /// ビット数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bits.len() * 8
    }

    /// ビットが1つもない場合に `true` を返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// `pos` 番目のビットを返します。
    ///
    /// # Panics
    ///
    /// `pos` が範囲外の場合にパニックします。
    #[inline(always)]
    pub fn get(&self, pos: usize) -> bool {
        (self.bits[pos / 8] >> (pos % 8)) & 1 == 1
    }

    /// 位置 `[0, pos)` に含まれる1の数を返します。
    ///
    /// `pos` はビット数以下である必要があります。
    #[inline(always)]
    pub fn rank1(&self, pos: usize) -> usize {
        debug_assert!(pos <= self.len());
        let word_idx = pos / 32;
        let base = self.ranks[word_idx];
        let offset = pos % 32;
        let rank = if offset == 0 {
            base
        } else {
            let mask = (1u32 << offset) - 1;
            base + (Self::load_word(self.bits, word_idx) & mask).count_ones()
        };
        usize::from_u32(rank)
    }

    /// 1の総数を返します。
    #[inline(always)]
    pub fn num_ones(&self) -> usize {
        usize::from_u32(self.ranks[self.ranks.len() - 1])
    }
}

/// [`BitVectorIndex`] で読める形式のビット列を組み立てるビルダー
#[derive(Debug, Default, Clone)]
pub struct BitVectorBuilder {
    bytes: Vec<u8>,
    len: usize,
}

impl BitVectorBuilder {
    /// 空のビルダーを作成します。
    pub const fn new() -> Self {
        Self {
            bytes: vec![],
            len: 0,
        }
    }

    /// 末尾にビットを追加します。
    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    /// 追加されたビット数を返します。
    pub const fn len(&self) -> usize {
        self.len
    }

    /// ビットが追加されていない場合に `true` を返します。
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 4バイト境界までゼロで埋めたバイト列を返します。
    pub fn into_padded_bytes(mut self) -> Vec<u8> {
        self.bytes.resize(crate::utils::round_up_4(self.bytes.len()), 0);
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_rank() {
        // bits: 1 0 1 1 0 0 0 0 | 0 0 0 0 0 0 0 1
        let bytes = [0b0000_1101, 0b1000_0000];
        let bv = BitVectorIndex::new(&bytes);
        assert_eq!(bv.len(), 16);
        assert!(bv.get(0));
        assert!(!bv.get(1));
        assert!(bv.get(2));
        assert!(bv.get(3));
        assert!(bv.get(15));
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.rank1(1), 1);
        assert_eq!(bv.rank1(3), 2);
        assert_eq!(bv.rank1(4), 3);
        assert_eq!(bv.rank1(15), 3);
        assert_eq!(bv.rank1(16), 4);
        assert_eq!(bv.num_ones(), 4);
    }

    #[test]
    fn test_rank_across_words() {
        let bytes = [0xff; 12];
        let bv = BitVectorIndex::new(&bytes);
        for i in 0..=96 {
            assert_eq!(bv.rank1(i), i);
        }
    }

    #[test]
    fn test_rank_matches_naive() {
        let bytes: Vec<u8> = (0..37u32).map(|i| (i * 73 + 11) as u8).collect();
        let bv = BitVectorIndex::new(&bytes);
        let mut naive = 0;
        for i in 0..bv.len() {
            assert_eq!(bv.rank1(i), naive);
            if bv.get(i) {
                naive += 1;
            }
        }
        assert_eq!(bv.rank1(bv.len()), naive);
    }

    #[test]
    fn test_empty() {
        let bv = BitVectorIndex::new(&[]);
        assert!(bv.is_empty());
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.num_ones(), 0);
    }

    #[test]
    fn test_builder() {
        let mut builder = BitVectorBuilder::new();
        for i in 0..10 {
            builder.push(i % 3 == 0);
        }
        assert_eq!(builder.len(), 10);
        let bytes = builder.into_padded_bytes();
        assert_eq!(bytes.len(), 4);
        let bv = BitVectorIndex::new(&bytes);
        for i in 0..10 {
            assert_eq!(bv.get(i), i % 3 == 0);
        }
        assert_eq!(bv.rank1(10), 4);
    }
}
