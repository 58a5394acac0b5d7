//! システム辞書のトークン
//!
//! 辞書ソースの1行に相当する [`Token`] と、ビルド中にトークンごとの
//! 符号化方法を記録する [`TokenInfo`]、読みごとにトークンをまとめる [`KeyInfo`] を定義します。

use std::io::{BufRead, BufReader, Read};
use std::ops::BitOr;

use crate::errors::{HenkanError, Result};
use crate::utils::parse_tsv_row;

/// トークンの属性フラグ
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAttributes(u8);

impl TokenAttributes {
    /// 属性なし
    pub const NONE: Self = Self(0);

    /// スペル訂正用のトークン
    pub const SPELLING_CORRECTION: Self = Self(1);

    /// `other` のすべてのビットを含む場合に `true` を返します。
    #[inline(always)]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TokenAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// 辞書のトークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// 読み
    pub key: String,

    /// 表層形
    pub value: String,

    /// 左文脈ID
    pub left_id: u16,

    /// 右文脈ID
    pub right_id: u16,

    /// 単語コスト
    pub cost: u16,

    /// 属性
    pub attributes: TokenAttributes,
}

impl Token {
    /// 属性なしのトークンを作成します。
    pub fn new<K, V>(key: K, value: V, left_id: u16, right_id: u16, cost: u16) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
            left_id,
            right_id,
            cost,
            attributes: TokenAttributes::NONE,
        }
    }

    /// 属性を設定します。
    pub fn with_attributes(mut self, attributes: TokenAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// 左右の文脈IDを `(left_id << 16) | right_id` にまとめた値を返します。
    #[inline(always)]
    pub const fn pos(&self) -> u32 {
        ((self.left_id as u32) << 16) | self.right_id as u32
    }
}

/// タブ区切りの辞書ソースからトークンを読み込みます。
///
/// 各行は `key \t left_id \t right_id \t cost \t value` で、
/// 6列目が `SPELLING_CORRECTION` の場合はスペル訂正用のトークンになります。
/// 空行と `#` で始まる行は無視します。
///
/// # エラー
///
/// 列が足りない場合、または数値を解釈できない場合にエラーを返します。
pub fn read_tokens<R>(rdr: R) -> Result<Vec<Token>>
where
    R: Read,
{
    let mut tokens = vec![];
    for line in BufReader::new(rdr).lines() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let cols = parse_tsv_row(&line);
        if cols.len() < 5 {
            let msg = format!("A row of the dictionary must have five items at least, {line:?}");
            return Err(HenkanError::invalid_format("dictionary.tsv", msg));
        }
        let attributes = match cols.get(5).map(String::as_str) {
            Some("SPELLING_CORRECTION") => TokenAttributes::SPELLING_CORRECTION,
            _ => TokenAttributes::NONE,
        };
        if cols[0].is_empty() || cols[4].is_empty() {
            log::warn!("Skipped a token with an empty key or value, {line:?}");
            continue;
        }
        let token = Token::new(
            cols[0].as_str(),
            cols[4].as_str(),
            cols[1].parse()?,
            cols[2].parse()?,
            cols[3].parse()?,
        )
        .with_attributes(attributes);
        tokens.push(token);
    }
    Ok(tokens)
}

/// 値の符号化方法
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// 値トライのIDを格納する
    #[default]
    Default,

    /// 直前のトークンと同じ値
    SameAsPrevValue,

    /// 読みと同じひらがな
    AsIsHiragana,

    /// 読みをカタカナにしたもの
    AsIsKatakana,
}

/// コストの符号化方法
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CostType {
    /// 2バイト
    #[default]
    Normal,

    /// 下位8ビットを落とした1バイト
    CanUseSmallEncoding,
}

/// 品詞の符号化方法
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PosType {
    /// 左右の文脈IDをそのまま格納する
    #[default]
    Normal,

    /// 頻出品詞表のIDを格納する
    FrequentPos,

    /// 直前のトークンと同じ品詞
    SameAsPrevPos,
}

/// ビルド中のトークン情報
#[derive(Debug, Clone)]
pub struct TokenInfo<'t> {
    /// 元のトークン
    pub token: &'t Token,

    /// 値トライでのID。読みから値を復元できる場合は `None`
    pub id_in_value_trie: Option<u32>,

    pub value_type: ValueType,
    pub cost_type: CostType,
    pub pos_type: PosType,

    /// 頻出品詞表でのID。`pos_type` が [`PosType::FrequentPos`] のときだけ有効
    pub id_in_frequent_pos_map: u8,
}

impl<'t> TokenInfo<'t> {
    /// 派生情報が未設定のトークン情報を作成します。
    pub fn new(token: &'t Token) -> Self {
        Self {
            token,
            id_in_value_trie: None,
            value_type: ValueType::Default,
            cost_type: CostType::Normal,
            pos_type: PosType::Normal,
            id_in_frequent_pos_map: 0,
        }
    }

    /// 値が読みから復元できる場合に `true` を返します。
    #[inline(always)]
    pub const fn is_as_is(&self) -> bool {
        matches!(
            self.value_type,
            ValueType::AsIsHiragana | ValueType::AsIsKatakana
        )
    }
}

/// 同じ読みを持つトークンの集まり
#[derive(Debug, Clone)]
pub struct KeyInfo<'t> {
    /// 読み
    pub key: &'t str,

    /// キートライでのID
    pub id_in_key_trie: Option<u32>,

    pub tokens: Vec<TokenInfo<'t>>,
}

impl<'t> KeyInfo<'t> {
    /// トークン情報が空の状態で作成します。
    pub const fn new(key: &'t str) -> Self {
        Self {
            key,
            id_in_key_trie: None,
            tokens: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_tokens() {
        let src = "\
# comment
とうきょう\t10\t20\t3000\t東京

あ\t1\t1\t500\t亜\tSPELLING_CORRECTION
\"\t5\t5\t100\t\"
";
        let tokens = read_tokens(src.as_bytes()).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new("とうきょう", "東京", 10, 20, 3000),
                Token::new("あ", "亜", 1, 1, 500)
                    .with_attributes(TokenAttributes::SPELLING_CORRECTION),
                Token::new("\"", "\"", 5, 5, 100),
            ]
        );
    }

    #[test]
    fn test_read_tokens_few_cols() {
        assert!(read_tokens("あ\t1\t1\t500".as_bytes()).is_err());
    }

    #[test]
    fn test_read_tokens_bad_number() {
        assert!(read_tokens("あ\t1\t1\t-5\t亜".as_bytes()).is_err());
        assert!(read_tokens("あ\t70000\t1\t5\t亜".as_bytes()).is_err());
    }

    #[test]
    fn test_read_tokens_skips_empty_value() {
        let tokens = read_tokens("あ\t1\t1\t5\t\n".as_bytes()).unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_pos() {
        let token = Token::new("あ", "亜", 0x1234, 0x5678, 0);
        assert_eq!(token.pos(), 0x1234_5678);
    }

    #[test]
    fn test_attributes_order() {
        assert!(TokenAttributes::NONE < TokenAttributes::SPELLING_CORRECTION);
        let attrs = TokenAttributes::NONE | TokenAttributes::SPELLING_CORRECTION;
        assert!(attrs.contains(TokenAttributes::SPELLING_CORRECTION));
        assert!(!TokenAttributes::NONE.contains(TokenAttributes::SPELLING_CORRECTION));
    }
}
