//! データファイルの管理
//!
//! 接続コスト行列とシステム辞書のセクションを1つのコンテナファイルにまとめ、
//! 実行時はメモリマップしたまま各セクションを貸し出します。

use std::io::Write;
use std::path::Path;

use crate::dictionary::codec::DictionaryCodec;
use crate::errors::{HenkanError, Result};
use crate::file::{DictionaryFile, DictionaryFileSection, write_sections};

/// 接続コスト行列のセクション名
pub const CONNECTION_SECTION_NAME: &str = "conn";

/// システム辞書のセクション
#[derive(Debug, Clone, Copy)]
pub struct SystemDictionaryData<'a> {
    pub value_trie: &'a [u8],
    pub key_trie: &'a [u8],
    pub token_array: &'a [u8],
    pub frequent_pos: &'a [u8],
}

/// 読み込み済みのデータファイル
///
/// # 例
///
/// ```
/// use henkan::data_manager::{DataManager, write_data_file};
/// use henkan::dictionary::{Connector, ConnectorBuilder, MatrixConnector};
///
/// let matrix = MatrixConnector::from_reader("2 2\n0 1 50".as_bytes()).unwrap();
/// let conn = ConnectorBuilder::new().build(&matrix).unwrap();
///
/// let mut buf = vec![];
/// write_data_file(&conn, vec![], &mut buf).unwrap();
///
/// let data_manager = DataManager::from_bytes(buf).unwrap();
/// let connector = Connector::from_data_manager(&data_manager).unwrap();
/// assert_eq!(connector.transition_cost(0, 1), 50);
/// ```
pub struct DataManager {
    file: DictionaryFile,
}

impl DataManager {
    /// ファイルをメモリマップして読み込みます。
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合、またはコンテナの形式が不正な場合にエラーを返します。
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self {
            file: DictionaryFile::from_path(path)?,
        })
    }

    /// ヒープ上のバイト列から読み込みます。
    ///
    /// # エラー
    ///
    /// コンテナの形式が不正な場合にエラーを返します。
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self {
            file: DictionaryFile::from_bytes(bytes)?,
        })
    }

    /// 名前からセクションを返します。
    pub fn section(&self, name: &str) -> Option<&[u8]> {
        self.file.section(name)
    }

    fn required_section(&self, name: &str) -> Result<&[u8]> {
        self.section(name).ok_or_else(|| {
            HenkanError::invalid_state(
                format!("the data file has no {name:?} section"),
                format!("{} sections are available", self.file.num_sections()),
            )
        })
    }

    /// 接続コスト行列のバイナリを返します。
    ///
    /// # エラー
    ///
    /// セクションがない場合にエラーを返します。
    pub fn connection_data(&self) -> Result<&[u8]> {
        self.required_section(CONNECTION_SECTION_NAME)
    }

    /// `codec` のセクション名でシステム辞書のセクションを返します。
    ///
    /// # エラー
    ///
    /// いずれかのセクションがない場合にエラーを返します。
    pub fn system_dictionary_data<C>(&self, codec: &C) -> Result<SystemDictionaryData<'_>>
    where
        C: DictionaryCodec,
    {
        Ok(SystemDictionaryData {
            value_trie: self.required_section(codec.section_name_for_value())?,
            key_trie: self.required_section(codec.section_name_for_key())?,
            token_array: self.required_section(codec.section_name_for_tokens())?,
            frequent_pos: self.required_section(codec.section_name_for_pos())?,
        })
    }
}

/// 接続コスト行列と辞書のセクションをデータファイルとして書き出します。
///
/// # エラー
///
/// 書き込みに失敗した場合にエラーを返します。
pub fn write_data_file<W>(
    connection_data: &[u8],
    dictionary_sections: Vec<DictionaryFileSection>,
    wtr: W,
) -> Result<()>
where
    W: Write,
{
    let mut sections = vec![DictionaryFileSection::new(
        CONNECTION_SECTION_NAME,
        connection_data,
    )];
    sections.extend(dictionary_sections);
    write_sections(&sections, wtr)
}
