//! ビットベクトルで索引付けされた可変長配列
//!
//! 各要素は `base_length + k * step_length` バイトの枠に0埋めで格納され、
//! 索引ビット列には要素ごとに `1` と、続けて `k` 個の `0` が並びます。
//! 索引の最後には終端の `1` が1つ置かれます。
//!
//! ```text
//! num_elements: u32 | base_length: u32 | step_length: u32 | index_bytes: u32
//! index bits (padded to 4 bytes)
//! element data (padded to 4 bytes)
//! ```

use crate::errors::{HenkanError, Result};
use crate::succinct::{BitVectorBuilder, BitVectorIndex};
use crate::utils::{FromU32, round_up_4};

const HEADER_SIZE: usize = 16;

/// 可変長配列のビルダー
#[derive(Debug)]
pub struct BitVectorBasedArrayBuilder {
    elements: Vec<Vec<u8>>,
    base_length: usize,
    step_length: usize,
    image: Vec<u8>,
}

impl Default for BitVectorBasedArrayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BitVectorBasedArrayBuilder {
    /// 枠の大きさが `base_length = 4`, `step_length = 1` のビルダーを作成します。
    pub const fn new() -> Self {
        Self {
            elements: vec![],
            base_length: 4,
            step_length: 1,
            image: vec![],
        }
    }

    /// 枠の大きさを設定します。
    ///
    /// # Panics
    ///
    /// `step_length` が0の場合にパニックします。
    pub fn set_size(&mut self, base_length: usize, step_length: usize) {
        assert!(step_length > 0, "step_length must be positive");
        self.base_length = base_length;
        self.step_length = step_length;
    }

    /// 要素を追加します。
    pub fn add(&mut self, element: Vec<u8>) {
        self.elements.push(element);
    }

    /// 追加された要素の数を返します。
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// 要素が追加されていない場合に `true` を返します。
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// 配列のイメージを構築します。
    ///
    /// # エラー
    ///
    /// 要素数や長さが `u32` に収まらない場合にエラーを返します。
    pub fn build(&mut self) -> Result<()> {
        let mut index = BitVectorBuilder::new();
        let mut data = vec![];
        for element in &self.elements {
            let extra = element.len().saturating_sub(self.base_length);
            let steps = extra.div_ceil(self.step_length);
            index.push(true);
            for _ in 0..steps {
                index.push(false);
            }
            let slot_len = self.base_length + steps * self.step_length;
            data.extend_from_slice(element);
            data.resize(data.len() + slot_len - element.len(), 0);
        }
        index.push(true);
        let index = index.into_padded_bytes();
        data.resize(round_up_4(data.len()), 0);

        let mut image = Vec::with_capacity(HEADER_SIZE + index.len() + data.len());
        for n in [
            self.elements.len(),
            self.base_length,
            self.step_length,
            index.len(),
        ] {
            image.extend_from_slice(&u32::try_from(n)?.to_le_bytes());
        }
        image.extend_from_slice(&index);
        image.extend_from_slice(&data);
        log::debug!(
            "built token array: {} elements, {} bytes",
            self.elements.len(),
            image.len()
        );
        self.image = image;
        Ok(())
    }

    /// 構築済みのイメージを返します。
    pub fn image(&self) -> &[u8] {
        &self.image
    }
}

/// [`BitVectorBasedArrayBuilder`] で作ったイメージの読み出し
pub struct BitVectorBasedArray<'a> {
    data: &'a [u8],
    base_length: usize,
    step_length: usize,
    /// 各要素の開始位置。末尾に番兵を持つ
    offsets: Vec<usize>,
}

impl<'a> BitVectorBasedArray<'a> {
    /// イメージを読み込みます。
    ///
    /// # エラー
    ///
    /// イメージが途中で切れている場合にエラーを返します。
    pub fn new(image: &'a [u8]) -> Result<Self> {
        let header = image.get(..HEADER_SIZE).ok_or_else(|| {
            HenkanError::out_of_range(None, "header", "the token array image is too small")
        })?;
        let field = |i: usize| {
            usize::from_u32(u32::from_le_bytes([
                header[i * 4],
                header[i * 4 + 1],
                header[i * 4 + 2],
                header[i * 4 + 3],
            ]))
        };
        let (num_elements, base_length, step_length, index_bytes) =
            (field(0), field(1), field(2), field(3));
        let index = image
            .get(HEADER_SIZE..HEADER_SIZE + index_bytes)
            .ok_or_else(|| HenkanError::out_of_range(None, "index", "the index is truncated"))?;
        let data = &image[HEADER_SIZE + index_bytes..];

        let index = BitVectorIndex::new(index);
        let mut offsets = Vec::with_capacity(num_elements + 1);
        let mut offset = 0;
        let mut pos = 0;
        for i in 0..=num_elements {
            if pos >= index.len() || !index.get(pos) {
                return Err(HenkanError::invalid_format(
                    "tokens",
                    format!("the index has no start bit for element {i}"),
                ));
            }
            if i == num_elements {
                break;
            }
            offsets.push(offset);
            pos += 1;
            offset += base_length;
            while pos < index.len() && !index.get(pos) {
                offset += step_length;
                pos += 1;
            }
        }
        if data.len() < offset {
            return Err(HenkanError::out_of_range(
                None,
                "data",
                format!("{offset} bytes required, {} remaining", data.len()),
            ));
        }
        offsets.push(offset);

        Ok(Self {
            data,
            base_length,
            step_length,
            offsets,
        })
    }

    /// 要素数を返します。
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// 要素がない場合に `true` を返します。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `i` 番目の要素の枠を返します。枠の末尾は0で埋められている場合があります。
    pub fn get(&self, i: usize) -> Option<&'a [u8]> {
        let start = *self.offsets.get(i)?;
        let end = *self.offsets.get(i + 1)?;
        debug_assert_eq!((end - start - self.base_length) % self.step_length, 0);
        Some(&self.data[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let mut builder = BitVectorBasedArrayBuilder::new();
        builder.set_size(2, 2);
        builder.add(vec![1]);
        builder.add(vec![2, 3, 4]);
        builder.add(vec![5, 6]);
        builder.build().unwrap();
        assert_eq!(
            builder.image(),
            &[
                3, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 4, 0, 0, 0, // header
                0b0001_1011, 0, 0, 0, // index: 1 | 1 0 | 1 | 1
                1, 0, 2, 3, 4, 0, 5, 6, // data
            ]
        );
    }

    #[test]
    fn test_read() {
        let elements: Vec<Vec<u8>> = vec![vec![], vec![1; 9], vec![2; 4], vec![3; 5], vec![0xff]];
        let mut builder = BitVectorBasedArrayBuilder::new();
        for element in &elements {
            builder.add(element.clone());
        }
        builder.build().unwrap();

        let array = BitVectorBasedArray::new(builder.image()).unwrap();
        assert_eq!(array.len(), elements.len());
        for (i, element) in elements.iter().enumerate() {
            let slot = array.get(i).unwrap();
            assert!(slot.len() >= 4);
            assert_eq!(&slot[..element.len()], element.as_slice());
            assert!(slot[element.len()..].iter().all(|&b| b == 0));
        }
        assert_eq!(array.get(elements.len()), None);
    }

    #[test]
    fn test_truncated() {
        let mut builder = BitVectorBasedArrayBuilder::new();
        builder.add(vec![1, 2, 3, 4, 5]);
        builder.build().unwrap();
        let image = builder.image();
        assert!(BitVectorBasedArray::new(&image[..8]).is_err());
        assert!(BitVectorBasedArray::new(&image[..image.len() - 4]).is_err());
    }
}
