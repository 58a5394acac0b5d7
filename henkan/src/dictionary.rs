//! 変換辞書のデータ構造とビルダー
//!
//! このモジュールは、かな漢字変換で使う2種類のデータを扱います。
//!
//! - 接続コスト行列: [`Connector`] がメモリ上のバイナリを直接読み、
//!   [`ConnectorBuilder`] が `matrix.def` からバイナリを作ります。
//! - システム辞書: [`SystemDictionaryBuilder`] がトークンの一覧から
//!   トライとトークン配列のセクションを作ります。
//!
//! どちらもビルド時に一度だけ作り、実行時は [`DataManager`](crate::data_manager::DataManager)
//! が保持するメモリマップ上でそのまま使います。
pub mod builder;
pub mod codec;
pub mod connector;
pub mod louds;
pub mod token;
pub mod token_array;

pub use crate::dictionary::builder::{FrequentPosMap, HeterophoneValues, SystemDictionaryBuilder};
pub use crate::dictionary::codec::{DictionaryCodec, SystemDictionaryCodec};
pub use crate::dictionary::connector::{
    Connector, ConnectorBuilder, ConnectorCost, ConnectorView, MatrixConnector,
};
pub use crate::dictionary::louds::{LoudsTrieBuilder, TrieBuilder};
pub use crate::dictionary::token::{Token, TokenAttributes, read_tokens};
pub use crate::dictionary::token_array::{BitVectorBasedArray, BitVectorBasedArrayBuilder};
