//! エラー型の定義
//!
//! このモジュールは、henkan で使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt;

/// henkan 専用のResult型
///
/// エラー型としてデフォルトで[`HenkanError`]を使用します。
pub type Result<T, E = HenkanError> = std::result::Result<T, E>;

/// henkan のエラー型
///
/// 接続コスト行列の読み込み、辞書ソースのパース、入出力で発生するエラーを表現します。
/// システム辞書ビルダーの前提条件違反はエラーとして返されず、パニックします。
#[derive(Debug, thiserror::Error)]
pub enum HenkanError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 前提条件違反エラー
    ///
    /// バイナリデータのマジック値、行列の形状、アライメントが不正な場合に発生します。
    /// [`FailedPreconditionError`]のエラーバリアント。
    #[error(transparent)]
    FailedPrecondition(FailedPreconditionError),

    /// 範囲外エラー
    ///
    /// バイナリデータが途中で切れている場合に発生します。
    /// [`OutOfRangeError`]のエラーバリアント。
    #[error(transparent)]
    OutOfRange(OutOfRangeError),

    /// 無効なフォーマットエラー
    ///
    /// テキスト形式のソースファイルが不正な場合に発生します。
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    ///
    /// [`InvalidStateError`]のエラーバリアント。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 整数変換エラー
    #[error(transparent)]
    TryFromInt(std::num::TryFromIntError),

    /// 整数パースエラー
    #[error(transparent)]
    ParseInt(std::num::ParseIntError),

    /// I/Oエラー
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HenkanError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 前提条件違反エラーを生成します
    ///
    /// # 引数
    ///
    /// * `field` - 問題のあったフィールド名
    /// * `offset` - バッファ先頭からのバイトオフセット
    /// * `msg` - エラーメッセージ
    pub(crate) fn failed_precondition<S>(field: &'static str, offset: usize, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::FailedPrecondition(FailedPreconditionError {
            field,
            offset,
            msg: msg.into(),
        })
    }

    /// 範囲外エラーを生成します
    ///
    /// # 引数
    ///
    /// * `row` - 読み込み中だった行。ヘッダ部分の場合は `None`
    /// * `field` - 読み込み中だったブロック名
    /// * `msg` - エラーメッセージ
    pub(crate) fn out_of_range<S>(row: Option<usize>, field: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::OutOfRange(OutOfRangeError {
            row,
            field,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// バイナリデータの前提条件が満たされない場合に使用されるエラー
#[derive(Debug)]
pub struct FailedPreconditionError {
    /// フィールド名
    pub(crate) field: &'static str,

    /// バッファ先頭からのバイトオフセット
    pub(crate) offset: usize,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl FailedPreconditionError {
    /// 問題のあったフィールド名を返します。
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// 問題のあったバイトオフセットを返します。
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for FailedPreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FailedPreconditionError: {} at offset {}: {}",
            self.field, self.offset, self.msg
        )
    }
}

impl Error for FailedPreconditionError {}

/// バイナリデータが途中で切れている場合に使用されるエラー
#[derive(Debug)]
pub struct OutOfRangeError {
    /// 行番号
    pub(crate) row: Option<usize>,

    /// ブロック名
    pub(crate) field: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl OutOfRangeError {
    /// 読み込み中だった行番号を返します。
    pub fn row(&self) -> Option<usize> {
        self.row
    }

    /// 読み込み中だったブロック名を返します。
    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.row {
            Some(row) => write!(
                f,
                "OutOfRangeError: row {}: {}: {}",
                row, self.field, self.msg
            ),
            None => write!(f, "OutOfRangeError: {}: {}", self.field, self.msg),
        }
    }
}

impl Error for OutOfRangeError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

impl From<std::num::TryFromIntError> for HenkanError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}

impl From<std::num::ParseIntError> for HenkanError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::ParseInt(error)
    }
}
