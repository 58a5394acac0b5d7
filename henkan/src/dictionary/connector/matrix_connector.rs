//! 行列ベースのコネクター実装
//!
//! `matrix.def` 形式のテキストを密な行列として読み込みます。
//! 主に [`ConnectorBuilder`](super::ConnectorBuilder) の入力と、テストでの参照実装として使われます。

use std::io::{BufRead, BufReader, Read};

use crate::dictionary::connector::{ConnectorCost, ConnectorView};
use crate::errors::{HenkanError, Result};

/// 接続コストの密な行列
///
/// 左文脈IDを行、右文脈IDを列として保持します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixConnector {
    data: Vec<u16>,
    num_left: usize,
    num_right: usize,
}

impl MatrixConnector {
    /// 新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `data` - 行優先で並べた接続コスト。長さは `num_left * num_right`
    /// * `num_left` - 左文脈IDの数
    /// * `num_right` - 右文脈IDの数
    pub fn new(data: Vec<u16>, num_left: usize, num_right: usize) -> Result<Self> {
        if data.len() != num_left * num_right {
            return Err(HenkanError::invalid_argument(
                "data",
                format!(
                    "expected {} costs for a {num_left}x{num_right} matrix, got {}",
                    num_left * num_right,
                    data.len()
                ),
            ));
        }
        Ok(Self {
            data,
            num_left,
            num_right,
        })
    }

    /// `matrix.def` から新しいインスタンスを作成します。
    ///
    /// 1行目は `num_left num_right`、以降の各行は `left_id right_id cost` です。
    /// 記載のないペアのコストは0になります。
    ///
    /// # エラー
    ///
    /// ファイルフォーマットが不正な場合にエラーを返します。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut lines = BufReader::new(rdr).lines();

        let (num_left, num_right) = match lines.next() {
            Some(line) => Self::parse_header(&line?)?,
            None => {
                return Err(HenkanError::invalid_format(
                    "matrix.def",
                    "The header line is missing",
                ));
            }
        };

        let mut data = vec![0; num_left * num_right];
        for line in lines {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (left_id, right_id, cost) = Self::parse_body(line)?;
            if num_left <= left_id || num_right <= right_id {
                return Err(HenkanError::invalid_format(
                    "matrix.def",
                    format!("The id is out of range, {line}"),
                ));
            }
            data[left_id * num_right + right_id] = cost;
        }
        Self::new(data, num_left, num_right)
    }

    fn parse_header(line: &str) -> Result<(usize, usize)> {
        let mut spl = line.split_ascii_whitespace();
        let num_left = spl.next();
        let num_right = spl.next();
        let rest = spl.next();
        if let (Some(num_left), Some(num_right), None) = (num_left, num_right, rest) {
            let num_left: u16 = num_left.parse()?;
            let num_right: u16 = num_right.parse()?;
            return Ok((usize::from(num_left), usize::from(num_right)));
        }
        let msg = format!("The header must be two integers, {line}");
        Err(HenkanError::invalid_format("matrix.def", msg))
    }

    fn parse_body(line: &str) -> Result<(usize, usize, u16)> {
        let mut spl = line.split_ascii_whitespace();
        let left_id = spl.next();
        let right_id = spl.next();
        let cost = spl.next();
        let rest = spl.next();
        if let (Some(left_id), Some(right_id), Some(cost), None) = (left_id, right_id, cost, rest) {
            let left_id: u16 = left_id.parse()?;
            let right_id: u16 = right_id.parse()?;
            let cost: i32 = cost.parse()?;
            let cost = u16::try_from(cost).map_err(|_| {
                HenkanError::invalid_format(
                    "matrix.def",
                    format!("The cost must be in 0..=65535, {line}"),
                )
            })?;
            return Ok((usize::from(left_id), usize::from(right_id), cost));
        }
        let msg = format!("The body must be three integers, {line}");
        Err(HenkanError::invalid_format("matrix.def", msg))
    }

    /// `left_id` 行のコストをスライスで返します。
    #[inline(always)]
    pub fn row(&self, left_id: u16) -> &[u16] {
        let start = usize::from(left_id) * self.num_right;
        &self.data[start..start + self.num_right]
    }
}

impl ConnectorView for MatrixConnector {
    #[inline(always)]
    fn num_left(&self) -> usize {
        self.num_left
    }

    #[inline(always)]
    fn num_right(&self) -> usize {
        self.num_right
    }
}

impl ConnectorCost for MatrixConnector {
    #[inline(always)]
    fn cost(&self, left_id: u16, right_id: u16) -> i32 {
        i32::from(self.data[usize::from(left_id) * self.num_right + usize::from(right_id)])
    }
}
