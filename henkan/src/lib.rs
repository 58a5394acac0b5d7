//! # henkan
//!
//! かな漢字変換エンジンのための、接続コスト行列のリーダーとシステム辞書のコンパイラです。
//!
//! ## 概要
//!
//! 変換に必要なデータは1つの読み取り専用ファイルにまとめて配布され、
//! 実行時はメモリマップしたまま使われます。起動時に構造体へ展開することはありません。
//!
//! ## 主な機能
//!
//! - **接続コスト行列**: 行ごとの簡潔ビットベクトルで表現した行列を直接引く [`Connector`]。
//!   ロックのない小さなキャッシュを持ち、複数スレッドから同時に使えます。
//! - **システム辞書のビルド**: 読みごとにトークンをまとめ、値の重複を除き、
//!   トークンごとに最も短い符号化を選ぶ [`SystemDictionaryBuilder`]。
//! - **データファイル**: 名前付きセクションのコンテナと、それをメモリマップする [`DataManager`]。
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use henkan::data_manager::write_data_file;
//! use henkan::dictionary::{ConnectorBuilder, MatrixConnector, Token};
//! use henkan::{Connector, DataManager, SystemDictionaryBuilder};
//!
//! let matrix_def = "2 2\n0 0 100\n0 1 50\n1 0 200\n1 1 200";
//! let matrix = MatrixConnector::from_reader(matrix_def.as_bytes())?;
//! let conn = ConnectorBuilder::new().build(&matrix)?;
//!
//! let tokens = vec![
//!     Token::new("とうきょう", "東京", 1, 1, 3000),
//!     Token::new("きょうと", "京都", 1, 1, 3500),
//! ];
//! let mut builder = SystemDictionaryBuilder::new();
//! builder.build_from_tokens(&tokens)?;
//!
//! let mut data = vec![];
//! write_data_file(&conn, builder.sections(), &mut data)?;
//!
//! let data_manager = DataManager::from_bytes(data)?;
//! let connector = Connector::from_data_manager(&data_manager)?;
//! assert_eq!(connector.transition_cost(0, 1), 50);
//! assert_eq!(connector.transition_cost(1, 0), 200);
//! # Ok(())
//! # }
//! ```

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// 境界検査付きのバイトカーソル
mod cursor;

/// データファイルの管理
pub mod data_manager;

/// 辞書データ構造とビルダー
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 名前付きセクションのコンテナファイル
pub mod file;

/// 簡潔ビットベクトル
pub mod succinct;

/// 内部ユーティリティ関数
pub mod utils;

#[cfg(test)]
mod tests;

// Re-exports
pub use data_manager::DataManager;
pub use dictionary::{Connector, SystemDictionaryBuilder, Token};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
