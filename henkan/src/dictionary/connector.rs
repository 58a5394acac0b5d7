//! 接続コスト計算のためのコネクター
//!
//! このモジュールは、左文脈IDと右文脈IDの間の接続コストを、
//! メモリマップされたバイナリから直接引くための [`Connector`] を提供します。
//!
//! # バイナリ形式
//!
//! すべての多バイト整数はリトルエンディアンです。
//!
//! ```text
//! header:        magic:u16 resolution:u16 rsize:u16 lsize:u16
//! default costs: [u16; rsize + rsize % 2]
//! rows (rsize):  compact_bits_size:u16 values_size:u16
//!                chunk_bits:[u8; round_up_4(ceil(lsize / 8))]
//!                compact_bits:[u8; compact_bits_size]
//!                values:[u8; values_size]
//! ```
//!
//! 各ブロックはバッファ先頭から4バイト境界に揃っている必要があります。

mod builder;
mod matrix_connector;

use std::sync::atomic::{AtomicU64, Ordering};

pub use crate::dictionary::connector::builder::ConnectorBuilder;
pub use crate::dictionary::connector::matrix_connector::MatrixConnector;

use crate::cursor::ByteCursor;
use crate::data_manager::DataManager;
use crate::errors::{HenkanError, Result};
use crate::succinct::BitVectorIndex;
use crate::utils::round_up_4;

/// 接続コスト行列のバイナリを識別するマジック値
pub const CONNECTOR_MAGIC: u16 = 0xCDAB;

/// コストが定義されていない接続に返されるコスト
pub const INVALID_COST: i32 = 30000;

/// 1バイトの値配列で [`INVALID_COST`] を表す値
pub const INVALID_1BYTE_COST_VALUE: u8 = 0xFF;

/// プラットフォームごとのキャッシュのセル数
#[cfg(any(target_os = "android", target_os = "ios"))]
pub const DEFAULT_CACHE_SIZE: usize = 256;

/// プラットフォームごとのキャッシュのセル数
#[cfg(not(any(target_os = "android", target_os = "ios")))]
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// 空のキャッシュセルのキー
///
/// 有効なIDは `rsize` 未満で `rsize <= 0xFFFF` なので、どのペアもこのキーにはなりません。
const EMPTY_CACHE_KEY: u32 = u32::MAX;

const HEADER_SIZE: usize = 8;

/// 1行分のチャンクビットのバイト数を返します。
#[inline(always)]
pub(crate) fn chunk_bits_size(lsize: u16) -> usize {
    round_up_4(usize::from(lsize).div_ceil(8))
}

/// コネクターのビュー機能を提供するトレイト
pub trait ConnectorView {
    /// 左文脈IDの数を返します。
    fn num_left(&self) -> usize;

    /// 右文脈IDの数を返します。
    fn num_right(&self) -> usize;
}

/// 接続コスト計算機能を提供するトレイト
pub trait ConnectorCost: ConnectorView {
    /// 接続コストを取得します。
    ///
    /// # 引数
    ///
    /// * `left_id` - 左文脈ID
    /// * `right_id` - 右文脈ID
    fn cost(&self, left_id: u16, right_id: u16) -> i32;
}

/// 接続コスト行列のヘッダ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorMetadata {
    pub magic: u16,
    pub resolution: u16,
    pub rsize: u16,
    pub lsize: u16,
}

/// 行の読み込みに使う、ヘッダから決まる大きさ
#[derive(Debug, Clone, Copy)]
struct RowLayout {
    num_chunks: usize,
    chunk_bits_size: usize,
    value_width: usize,
}

/// 1つの左文脈IDに対応する行
#[derive(Debug)]
struct Row<'a> {
    chunk_bits: BitVectorIndex<'a>,
    compact_bits: BitVectorIndex<'a>,
    values: &'a [u8],
}

/// 簡潔な接続コスト行列のリーダー
///
/// 呼び出し側のバッファを借用し、行列のバイトをコピーしません。
/// 構築後は読み取り専用で、任意の数のスレッドから同時に使えます。
/// 唯一の可変状態であるキャッシュは、各セルを1回のアトミック操作で読み書きします。
pub struct Connector<'a> {
    metadata: ConnectorMetadata,
    default_costs: &'a [u8],
    rows: Vec<Row<'a>>,
    resolution: i32,
    use_1byte_cost: bool,
    cache: Box<[AtomicU64]>,
    cache_hash_mask: u32,
}

impl<'a> Connector<'a> {
    /// バイト列から新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `data` - 接続コスト行列のバイナリ
    /// * `cache_size` - キャッシュのセル数。2の累乗である必要があります
    ///
    /// # エラー
    ///
    /// - `cache_size` が2の累乗でない場合は `InvalidArgument`
    /// - マジック値の不一致、正方でない行列、アライメント違反は `FailedPrecondition`
    /// - バイナリが途中で切れている場合は `OutOfRange`
    pub fn new(data: &'a [u8], cache_size: usize) -> Result<Self> {
        let cache_hash_mask = match u32::try_from(cache_size.wrapping_sub(1)) {
            Ok(mask) if cache_size.is_power_of_two() => mask,
            _ => {
                return Err(HenkanError::invalid_argument(
                    "cache_size",
                    format!("must be a power of two up to 2^32, but got {cache_size}"),
                ));
            }
        };

        let mut cursor = ByteCursor::new(data);
        let metadata = Self::read_metadata(&mut cursor)?;
        let rsize = usize::from(metadata.rsize);
        let use_1byte_cost = metadata.resolution != 1;

        if !cursor.is_aligned(4) {
            return Err(HenkanError::failed_precondition(
                "default_costs",
                cursor.position(),
                "the default cost array is not 4-byte aligned",
            ));
        }
        let default_costs = cursor.take(2 * (rsize + rsize % 2)).ok_or_else(|| {
            HenkanError::out_of_range(
                None,
                "default_costs",
                format!("{} bytes remain", cursor.remaining()),
            )
        })?;

        let layout = RowLayout {
            num_chunks: usize::from(metadata.lsize).div_ceil(8),
            chunk_bits_size: chunk_bits_size(metadata.lsize),
            value_width: if use_1byte_cost { 1 } else { 2 },
        };
        let mut rows = Vec::with_capacity(rsize);
        for row_idx in 0..rsize {
            rows.push(Self::read_row(&mut cursor, row_idx, layout)?);
        }
        if cursor.remaining() != 0 {
            log::warn!(
                "{} trailing bytes after the connection matrix are ignored",
                cursor.remaining()
            );
        }

        let cache = (0..cache_size)
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let connector = Self {
            metadata,
            default_costs,
            rows,
            resolution: i32::from(metadata.resolution),
            use_1byte_cost,
            cache,
            cache_hash_mask,
        };
        connector.clear_cache();

        log::debug!(
            "loaded connector: size={}, resolution={}, cache_size={cache_size}",
            metadata.rsize,
            metadata.resolution
        );
        Ok(connector)
    }

    /// [`DataManager`] の接続コスト行列から新しいインスタンスを作成します。
    ///
    /// キャッシュのセル数は [`DEFAULT_CACHE_SIZE`] です。
    ///
    /// # エラー
    ///
    /// データに接続コスト行列が含まれない場合、または行列が不正な場合にエラーを返します。
    pub fn from_data_manager(data_manager: &'a DataManager) -> Result<Self> {
        Self::new(data_manager.connection_data()?, DEFAULT_CACHE_SIZE)
    }

    fn read_metadata(cursor: &mut ByteCursor<'a>) -> Result<ConnectorMetadata> {
        let mut fields = [0u16; 4];
        for (field, name) in fields
            .iter_mut()
            .zip(["magic", "resolution", "rsize", "lsize"])
        {
            *field = cursor.read_u16().ok_or_else(|| {
                HenkanError::out_of_range(None, name, "the header is truncated")
            })?;
        }
        let [magic, resolution, rsize, lsize] = fields;
        if magic != CONNECTOR_MAGIC {
            return Err(HenkanError::failed_precondition(
                "magic",
                0,
                format!("expected {CONNECTOR_MAGIC:#06x}, but got {magic:#06x}"),
            ));
        }
        if resolution == 0 {
            return Err(HenkanError::failed_precondition(
                "resolution",
                2,
                "must be positive",
            ));
        }
        if rsize != lsize {
            return Err(HenkanError::failed_precondition(
                "rsize",
                4,
                format!("the matrix must be square, but rsize={rsize} and lsize={lsize}"),
            ));
        }
        debug_assert_eq!(cursor.position(), HEADER_SIZE);
        Ok(ConnectorMetadata {
            magic,
            resolution,
            rsize,
            lsize,
        })
    }

    fn read_row(cursor: &mut ByteCursor<'a>, row_idx: usize, layout: RowLayout) -> Result<Row<'a>> {
        if !cursor.is_aligned(4) {
            return Err(HenkanError::failed_precondition(
                "row",
                cursor.position(),
                format!("row {row_idx} is not 4-byte aligned"),
            ));
        }
        let compact_bits_size = Self::read_row_u16(cursor, row_idx, "compact_bits_size")?;
        let values_size = Self::read_row_u16(cursor, row_idx, "values_size")?;
        let chunk_offset = cursor.position();
        let chunk_bits =
            Self::take_block(cursor, row_idx, "chunk_bits", layout.chunk_bits_size)?;
        let compact_bits = Self::take_block(
            cursor,
            row_idx,
            "compact_bits",
            usize::from(compact_bits_size),
        )?;
        let values = Self::take_block(cursor, row_idx, "values", usize::from(values_size))?;
        let row = Row {
            chunk_bits: BitVectorIndex::new(chunk_bits),
            compact_bits: BitVectorIndex::new(compact_bits),
            values,
        };
        Self::check_row(&row, row_idx, chunk_offset, layout)?;
        Ok(row)
    }

    /// 行内のブロックどうしが矛盾せず、参照がすべて範囲内に収まることを確かめます。
    fn check_row(row: &Row, row_idx: usize, chunk_offset: usize, layout: RowLayout) -> Result<()> {
        let num_set_chunks = row.chunk_bits.rank1(layout.num_chunks);
        if num_set_chunks != row.chunk_bits.num_ones() {
            return Err(HenkanError::failed_precondition(
                "chunk_bits",
                chunk_offset,
                format!(
                    "row {row_idx} sets chunk bits beyond {} chunks",
                    layout.num_chunks
                ),
            ));
        }
        let num_compact_bits = num_set_chunks * 8;
        if row.compact_bits.len() < num_compact_bits {
            return Err(HenkanError::out_of_range(
                Some(row_idx),
                "compact_bits",
                format!(
                    "{num_set_chunks} chunks are set, but the block has {} bytes",
                    row.compact_bits.len() / 8
                ),
            ));
        }
        let num_values = row.compact_bits.rank1(num_compact_bits);
        if row.values.len() < num_values * layout.value_width {
            return Err(HenkanError::out_of_range(
                Some(row_idx),
                "values",
                format!(
                    "{num_values} values of {} bytes are set, but the block has {} bytes",
                    layout.value_width,
                    row.values.len()
                ),
            ));
        }
        Ok(())
    }

    fn read_row_u16(
        cursor: &mut ByteCursor<'a>,
        row_idx: usize,
        field: &'static str,
    ) -> Result<u16> {
        cursor.read_u16().ok_or_else(|| {
            HenkanError::out_of_range(
                Some(row_idx),
                field,
                format!("{} bytes remain", cursor.remaining()),
            )
        })
    }

    fn take_block(
        cursor: &mut ByteCursor<'a>,
        row_idx: usize,
        field: &'static str,
        len: usize,
    ) -> Result<&'a [u8]> {
        if !cursor.is_aligned(4) {
            return Err(HenkanError::failed_precondition(
                field,
                cursor.position(),
                format!("the block of row {row_idx} is not 4-byte aligned"),
            ));
        }
        cursor.take(len).ok_or_else(|| {
            HenkanError::out_of_range(
                Some(row_idx),
                field,
                format!("{len} bytes required, but {} bytes remain", cursor.remaining()),
            )
        })
    }

    /// ヘッダを返します。
    #[inline(always)]
    pub const fn metadata(&self) -> ConnectorMetadata {
        self.metadata
    }

    /// コストの量子化の刻み幅を返します。
    #[inline(always)]
    pub const fn resolution(&self) -> i32 {
        self.resolution
    }

    /// `left_id` 行のデフォルトコストを返します。
    #[inline(always)]
    pub fn default_cost(&self, left_id: u16) -> i32 {
        let i = usize::from(left_id) * 2;
        i32::from(u16::from_le_bytes([
            self.default_costs[i],
            self.default_costs[i + 1],
        ]))
    }

    #[inline(always)]
    const fn encode_key(left_id: u16, right_id: u16) -> u32 {
        ((left_id as u32) << 16) | right_id as u32
    }

    #[inline(always)]
    fn cache_bucket(&self, left_id: u16, right_id: u16) -> usize {
        let hash = 3 * u32::from(left_id) + u32::from(right_id);
        (hash & self.cache_hash_mask) as usize
    }

    /// 接続コストを返します。
    ///
    /// 結果はキャッシュに記録され、同じペアの次回以降の呼び出しはキャッシュから返されます。
    ///
    /// # Panics
    ///
    /// `left_id` または `right_id` が行列の範囲外の場合にパニックすることがあります。
    #[inline]
    pub fn transition_cost(&self, left_id: u16, right_id: u16) -> i32 {
        let key = Self::encode_key(left_id, right_id);
        let cell = &self.cache[self.cache_bucket(left_id, right_id)];

        let entry = cell.load(Ordering::Relaxed);
        if entry as u32 == key {
            return (entry >> 32) as u32 as i32;
        }

        let cost = self.lookup_cost(left_id, right_id);
        cell.store(
            (u64::from(cost as u32) << 32) | u64::from(key),
            Ordering::Relaxed,
        );
        cost
    }

    /// キャッシュを使わずに簡潔な行から接続コストを求めます。
    pub(crate) fn lookup_cost(&self, left_id: u16, right_id: u16) -> i32 {
        debug_assert!(left_id < self.metadata.rsize);
        debug_assert!(right_id < self.metadata.lsize);

        let row = &self.rows[usize::from(left_id)];
        let right_id = usize::from(right_id);

        let chunk_idx = right_id / 8;
        if !row.chunk_bits.get(chunk_idx) {
            return self.default_cost(left_id);
        }
        let bit_idx = row.chunk_bits.rank1(chunk_idx) * 8 + right_id % 8;
        if !row.compact_bits.get(bit_idx) {
            return self.default_cost(left_id);
        }
        let value_idx = row.compact_bits.rank1(bit_idx);

        let value = if self.use_1byte_cost {
            let value = row.values[value_idx];
            if value == INVALID_1BYTE_COST_VALUE {
                return INVALID_COST;
            }
            i32::from(value)
        } else {
            let i = value_idx * 2;
            i32::from(u16::from_le_bytes([row.values[i], row.values[i + 1]]))
        };
        value * self.resolution
    }

    /// すべてのキャッシュセルを空にします。
    pub fn clear_cache(&self) {
        for cell in self.cache.iter() {
            cell.store(u64::from(EMPTY_CACHE_KEY), Ordering::Relaxed);
        }
    }
}

impl ConnectorView for Connector<'_> {
    #[inline(always)]
    fn num_left(&self) -> usize {
        usize::from(self.metadata.rsize)
    }

    #[inline(always)]
    fn num_right(&self) -> usize {
        usize::from(self.metadata.lsize)
    }
}

impl ConnectorCost for Connector<'_> {
    #[inline(always)]
    fn cost(&self, left_id: u16, right_id: u16) -> i32 {
        self.transition_cost(left_id, right_id)
    }
}
