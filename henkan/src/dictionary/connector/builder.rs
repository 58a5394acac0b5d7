//! 接続コスト行列のバイナリを書き出すビルダー
//!
//! 密な [`MatrixConnector`] を、[`Connector`](super::Connector) が直接読める
//! 簡潔な行単位の形式に変換します。各行では最も頻度の高いコストをデフォルトコストとし、
//! それと異なるエントリだけを2段のビットベクトルと値配列に格納します。

use std::io::Write;

use hashbrown::HashMap;

use crate::dictionary::connector::matrix_connector::MatrixConnector;
use crate::dictionary::connector::{
    CONNECTOR_MAGIC, ConnectorView, INVALID_1BYTE_COST_VALUE, INVALID_COST, chunk_bits_size,
};
use crate::errors::{HenkanError, Result};
use crate::succinct::BitVectorBuilder;
use crate::utils::round_up_4;

/// 接続コスト行列のバイナリを作るビルダー
#[derive(Debug, Clone, Copy)]
pub struct ConnectorBuilder {
    resolution: u16,
}

impl Default for ConnectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectorBuilder {
    /// 量子化なし(`resolution = 1`)のビルダーを作成します。
    pub const fn new() -> Self {
        Self { resolution: 1 }
    }

    /// コストの量子化の刻み幅を設定します。
    ///
    /// 1以外を指定すると、各コストは `resolution` で割って丸めた1バイトの値として格納されます。
    ///
    /// # エラー
    ///
    /// `resolution` が0の場合にエラーを返します。
    pub fn resolution(mut self, resolution: u16) -> Result<Self> {
        if resolution == 0 {
            return Err(HenkanError::invalid_argument(
                "resolution",
                "must be positive",
            ));
        }
        self.resolution = resolution;
        Ok(self)
    }

    /// 行列をバイナリに変換します。
    ///
    /// # エラー
    ///
    /// 行列が正方でない場合、またはコストが値配列の幅に収まらない場合にエラーを返します。
    pub fn build(&self, matrix: &MatrixConnector) -> Result<Vec<u8>> {
        if matrix.num_left() != matrix.num_right() {
            return Err(HenkanError::invalid_argument(
                "matrix",
                format!(
                    "the matrix must be square, but got {}x{}",
                    matrix.num_left(),
                    matrix.num_right()
                ),
            ));
        }
        let size = u16::try_from(matrix.num_left())?;
        let use_1byte_cost = self.resolution != 1;

        let mut buf = vec![];
        for field in [CONNECTOR_MAGIC, self.resolution, size, size] {
            buf.extend_from_slice(&field.to_le_bytes());
        }

        let default_costs: Vec<u16> = (0..size).map(|i| Self::mode(matrix.row(i))).collect();
        for &cost in &default_costs {
            buf.extend_from_slice(&cost.to_le_bytes());
        }
        if size % 2 == 1 {
            buf.extend_from_slice(&0u16.to_le_bytes());
        }

        let chunk_bits_size = chunk_bits_size(size);
        for left_id in 0..size {
            let row = matrix.row(left_id);
            let default_cost = default_costs[usize::from(left_id)];

            let mut chunk_bits = BitVectorBuilder::new();
            let mut compact_bits = vec![];
            let mut values = vec![];
            for (chunk_idx, chunk) in row.chunks(8).enumerate() {
                let mut byte = 0u8;
                for (k, &cost) in chunk.iter().enumerate() {
                    if cost != default_cost {
                        byte |= 1 << k;
                        self.push_value(&mut values, cost, left_id, chunk_idx * 8 + k)?;
                    }
                }
                chunk_bits.push(byte != 0);
                if byte != 0 {
                    compact_bits.push(byte);
                }
            }
            let mut chunk_bits = chunk_bits.into_padded_bytes();
            chunk_bits.resize(chunk_bits_size, 0);
            compact_bits.resize(round_up_4(compact_bits.len()), 0);
            values.resize(round_up_4(values.len()), 0);

            buf.extend_from_slice(&u16::try_from(compact_bits.len())?.to_le_bytes());
            buf.extend_from_slice(&u16::try_from(values.len())?.to_le_bytes());
            buf.extend_from_slice(&chunk_bits);
            buf.extend_from_slice(&compact_bits);
            buf.extend_from_slice(&values);
        }

        log::debug!(
            "built connector: size={size}, resolution={}, {} bytes",
            self.resolution,
            buf.len()
        );
        Ok(buf)
    }

    /// 行列をバイナリに変換して書き出します。
    pub fn write<W>(&self, matrix: &MatrixConnector, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        let bytes = self.build(matrix)?;
        wtr.write_all(&bytes)?;
        Ok(())
    }

    fn push_value(&self, values: &mut Vec<u8>, cost: u16, left_id: u16, right_id: usize) -> Result<()> {
        if self.resolution == 1 {
            values.extend_from_slice(&cost.to_le_bytes());
            return Ok(());
        }
        if i32::from(cost) == INVALID_COST {
            values.push(INVALID_1BYTE_COST_VALUE);
            return Ok(());
        }
        let resolution = u32::from(self.resolution);
        let quantized = (u32::from(cost) + resolution / 2) / resolution;
        match u8::try_from(quantized) {
            Ok(v) if v != INVALID_1BYTE_COST_VALUE => {
                values.push(v);
                Ok(())
            }
            _ => Err(HenkanError::invalid_argument(
                "resolution",
                format!(
                    "cost {cost} at ({left_id}, {right_id}) does not fit in one byte with resolution {}",
                    self.resolution
                ),
            )),
        }
    }

    /// 最も頻度の高いコストを返します。同数の場合は小さいほうを選びます。
    fn mode(row: &[u16]) -> u16 {
        let mut counts = HashMap::new();
        for &cost in row {
            *counts.entry(cost).or_insert(0usize) += 1;
        }
        counts
            .into_iter()
            .max_by(|(c1, n1), (c2, n2)| n1.cmp(n2).then(c2.cmp(c1)))
            .map_or(0, |(cost, _)| cost)
    }
}
