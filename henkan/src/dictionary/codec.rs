//! システム辞書の符号化
//!
//! 読みと表層形のバイト列表現、読みごとのトークンレコードの形式、
//! 出力セクションの名前を [`DictionaryCodec`] としてまとめます。
//!
//! # トークンレコード
//!
//! 各トークンはフラグ1バイトと、それに続く可変長のフィールドで表現されます。
//!
//! ```text
//! flags | pos (0, 1, 2 or 4 bytes) | cost (1 or 2 bytes) | value id (0 or 3 bytes)
//! ```
//!
//! | bit    | meaning                                                        |
//! |--------|----------------------------------------------------------------|
//! | `0x80` | last token of the key                                          |
//! | `0x40` | spelling correction                                            |
//! | `0x20` | small cost (`cost >> 8` in one byte)                           |
//! | `0x0C` | value: default / same as prev / as-is hiragana / as-is katakana |
//! | `0x03` | pos: full / frequent / same as prev / mono (`left == right`)   |
//!
//! `0x10` は使われないため、`0xFF` をトークン列の終端として使えます。

use crate::dictionary::token::{CostType, PosType, TokenAttributes, TokenInfo, ValueType};
use crate::errors::{HenkanError, Result};

/// 読みごとのトークン列の終端フラグ
pub const TOKENS_TERMINATION_FLAG: u8 = 0xff;

const LAST_TOKEN_FLAG: u8 = 0x80;
const SPELLING_CORRECTION_FLAG: u8 = 0x40;
const SMALL_COST_FLAG: u8 = 0x20;

const VALUE_TYPE_MASK: u8 = 0x0c;
const DEFAULT_VALUE_FLAG: u8 = 0x00;
const SAME_AS_PREV_VALUE_FLAG: u8 = 0x04;
const AS_IS_HIRAGANA_VALUE_FLAG: u8 = 0x08;
const AS_IS_KATAKANA_VALUE_FLAG: u8 = 0x0c;

const POS_TYPE_MASK: u8 = 0x03;
const FULL_POS_FLAG: u8 = 0x00;
const FREQUENT_POS_FLAG: u8 = 0x01;
const SAME_AS_PREV_POS_FLAG: u8 = 0x02;
const MONO_POS_FLAG: u8 = 0x03;

/// 値トライのIDの上限(24ビット)
pub const MAX_VALUE_ID: u32 = (1 << 24) - 1;

const HIRAGANA_FIRST: u32 = 0x3041;
const HIRAGANA_LAST: u32 = 0x3096;
const KATAKANA_FIRST: u32 = 0x30a1;
const KATAKANA_LAST: u32 = 0x30f6;
const PROLONGED_SOUND_MARK: u32 = 0x30fc;

const HIRAGANA_OFFSET: u8 = 0x01;
const KATAKANA_OFFSET: u8 = 0x57;
const PROLONGED_SOUND_MARK_CODE: u8 = 0xad;
const BMP_PREFIX: u8 = 0xfe;
const SUPPLEMENTARY_PREFIX: u8 = 0xff;

/// システム辞書の符号化方式
pub trait DictionaryCodec {
    /// 値トライのセクション名
    fn section_name_for_value(&self) -> &str;

    /// キートライのセクション名
    fn section_name_for_key(&self) -> &str;

    /// トークン配列のセクション名
    fn section_name_for_tokens(&self) -> &str;

    /// 頻出品詞表のセクション名
    fn section_name_for_pos(&self) -> &str;

    /// 読みをトライに登録するバイト列に変換します。
    fn encode_key(&self, src: &str) -> Vec<u8>;

    /// 表層形をトライに登録するバイト列に変換します。
    fn encode_value(&self, src: &str) -> Vec<u8>;

    /// 1つの読みに属するトークン列を `output` の末尾に符号化します。
    ///
    /// # Panics
    ///
    /// 既定の値型のトークンに値トライのIDがない場合、またはIDが24ビットに収まらない場合にパニックします。
    fn encode_tokens(&self, tokens: &[TokenInfo], output: &mut Vec<u8>);

    /// トークン配列の終端レコードに使うフラグ
    fn tokens_termination_flag(&self) -> u8;
}

/// 標準のシステム辞書コーデック
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDictionaryCodec;

impl SystemDictionaryCodec {
    /// 新しいインスタンスを作成します。
    pub const fn new() -> Self {
        Self
    }

    fn encode_string(src: &str) -> Vec<u8> {
        let mut dst = Vec::with_capacity(src.len());
        for c in src.chars() {
            let code = u32::from(c);
            match code {
                HIRAGANA_FIRST..=HIRAGANA_LAST => {
                    dst.push((code - HIRAGANA_FIRST) as u8 + HIRAGANA_OFFSET);
                }
                KATAKANA_FIRST..=KATAKANA_LAST => {
                    dst.push((code - KATAKANA_FIRST) as u8 + KATAKANA_OFFSET);
                }
                PROLONGED_SOUND_MARK => dst.push(PROLONGED_SOUND_MARK_CODE),
                0..=0xffff => {
                    dst.push(BMP_PREFIX);
                    dst.extend_from_slice(&(code as u16).to_be_bytes());
                }
                _ => {
                    dst.push(SUPPLEMENTARY_PREFIX);
                    dst.extend_from_slice(&code.to_be_bytes()[1..]);
                }
            }
        }
        dst
    }

    /// [`encode_key`](DictionaryCodec::encode_key) の逆変換です。
    ///
    /// # エラー
    ///
    /// バイト列が途中で切れている場合、または有効な文字を表さない場合にエラーを返します。
    pub fn decode_string(&self, src: &[u8]) -> Result<String> {
        let mut dst = String::new();
        let mut i = 0;
        while i < src.len() {
            let b = src[i];
            let (code, len) = match b {
                BMP_PREFIX => {
                    let bytes = src.get(i + 1..i + 3).ok_or_else(|| {
                        HenkanError::invalid_format("key", "a BMP character is truncated")
                    })?;
                    (u32::from(u16::from_be_bytes([bytes[0], bytes[1]])), 3)
                }
                SUPPLEMENTARY_PREFIX => {
                    let bytes = src.get(i + 1..i + 4).ok_or_else(|| {
                        HenkanError::invalid_format("key", "a supplementary character is truncated")
                    })?;
                    (u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]), 4)
                }
                PROLONGED_SOUND_MARK_CODE => (PROLONGED_SOUND_MARK, 1),
                b if b >= KATAKANA_OFFSET => (u32::from(b - KATAKANA_OFFSET) + KATAKANA_FIRST, 1),
                b if b >= HIRAGANA_OFFSET => (u32::from(b - HIRAGANA_OFFSET) + HIRAGANA_FIRST, 1),
                _ => {
                    return Err(HenkanError::invalid_format(
                        "key",
                        format!("unexpected byte 0x{b:02x} at {i}"),
                    ));
                }
            };
            let c = char::from_u32(code).ok_or_else(|| {
                HenkanError::invalid_format("key", format!("invalid code point U+{code:04X}"))
            })?;
            dst.push(c);
            i += len;
        }
        Ok(dst)
    }

    fn encode_token(token_info: &TokenInfo, is_last: bool, output: &mut Vec<u8>) {
        let token = token_info.token;
        let mut flags = 0;
        if is_last {
            flags |= LAST_TOKEN_FLAG;
        }
        if token.attributes.contains(TokenAttributes::SPELLING_CORRECTION) {
            flags |= SPELLING_CORRECTION_FLAG;
        }
        if token_info.cost_type == CostType::CanUseSmallEncoding {
            flags |= SMALL_COST_FLAG;
        }
        flags |= match token_info.value_type {
            ValueType::Default => DEFAULT_VALUE_FLAG,
            ValueType::SameAsPrevValue => SAME_AS_PREV_VALUE_FLAG,
            ValueType::AsIsHiragana => AS_IS_HIRAGANA_VALUE_FLAG,
            ValueType::AsIsKatakana => AS_IS_KATAKANA_VALUE_FLAG,
        };
        let pos_flag = match token_info.pos_type {
            PosType::FrequentPos => FREQUENT_POS_FLAG,
            PosType::SameAsPrevPos => SAME_AS_PREV_POS_FLAG,
            PosType::Normal if token.left_id == token.right_id => MONO_POS_FLAG,
            PosType::Normal => FULL_POS_FLAG,
        };
        flags |= pos_flag;
        output.push(flags);

        match pos_flag {
            FREQUENT_POS_FLAG => output.push(token_info.id_in_frequent_pos_map),
            MONO_POS_FLAG => output.extend_from_slice(&token.left_id.to_le_bytes()),
            FULL_POS_FLAG => {
                output.extend_from_slice(&token.left_id.to_le_bytes());
                output.extend_from_slice(&token.right_id.to_le_bytes());
            }
            _ => {}
        }

        match token_info.cost_type {
            CostType::CanUseSmallEncoding => output.push((token.cost >> 8) as u8),
            CostType::Normal => output.extend_from_slice(&token.cost.to_le_bytes()),
        }

        if token_info.value_type == ValueType::Default {
            let Some(id) = token_info.id_in_value_trie else {
                panic!(
                    "no value id for {:?} ({:?})",
                    token.value, token.key
                );
            };
            assert!(
                id <= MAX_VALUE_ID,
                "value id {id} of {:?} does not fit in 24 bits",
                token.value
            );
            output.extend_from_slice(&id.to_le_bytes()[..3]);
        }
    }

    /// 1つの読みに属するトークン列を復号します。
    ///
    /// 最後のトークンのフラグが現れるまで読み進めます。
    ///
    /// # エラー
    ///
    /// レコードが途中で切れている場合にエラーを返します。
    pub fn decode_tokens(&self, mut data: &[u8]) -> Result<Vec<EncodedToken>> {
        let mut tokens = vec![];
        loop {
            let (&flags, rest) = data
                .split_first()
                .ok_or_else(|| HenkanError::invalid_format("tokens", "missing last token flag"))?;
            data = rest;
            if flags == TOKENS_TERMINATION_FLAG {
                return Err(HenkanError::invalid_format(
                    "tokens",
                    "unexpected termination flag",
                ));
            }
            let mut take = |n: usize| -> Result<&[u8]> {
                if data.len() < n {
                    return Err(HenkanError::invalid_format("tokens", "truncated token record"));
                }
                let (head, tail) = data.split_at(n);
                data = tail;
                Ok(head)
            };

            let pos = match flags & POS_TYPE_MASK {
                FREQUENT_POS_FLAG => EncodedPos::Frequent(take(1)?[0]),
                SAME_AS_PREV_POS_FLAG => EncodedPos::SameAsPrev,
                MONO_POS_FLAG => {
                    let b = take(2)?;
                    EncodedPos::Mono(u16::from_le_bytes([b[0], b[1]]))
                }
                _ => {
                    let b = take(4)?;
                    EncodedPos::Full {
                        left_id: u16::from_le_bytes([b[0], b[1]]),
                        right_id: u16::from_le_bytes([b[2], b[3]]),
                    }
                }
            };
            let small_cost = flags & SMALL_COST_FLAG != 0;
            let cost = if small_cost {
                u16::from(take(1)?[0]) << 8
            } else {
                let b = take(2)?;
                u16::from_le_bytes([b[0], b[1]])
            };
            let value = match flags & VALUE_TYPE_MASK {
                SAME_AS_PREV_VALUE_FLAG => EncodedValue::SameAsPrev,
                AS_IS_HIRAGANA_VALUE_FLAG => EncodedValue::AsIsHiragana,
                AS_IS_KATAKANA_VALUE_FLAG => EncodedValue::AsIsKatakana,
                _ => {
                    let b = take(3)?;
                    EncodedValue::Id(u32::from_le_bytes([b[0], b[1], b[2], 0]))
                }
            };
            tokens.push(EncodedToken {
                pos,
                cost,
                small_cost,
                value,
                spelling_correction: flags & SPELLING_CORRECTION_FLAG != 0,
            });
            if flags & LAST_TOKEN_FLAG != 0 {
                return Ok(tokens);
            }
        }
    }
}

impl DictionaryCodec for SystemDictionaryCodec {
    fn section_name_for_value(&self) -> &str {
        "dictionary.value"
    }

    fn section_name_for_key(&self) -> &str {
        "dictionary.key"
    }

    fn section_name_for_tokens(&self) -> &str {
        "dictionary.tokens"
    }

    fn section_name_for_pos(&self) -> &str {
        "dictionary.freq_pos"
    }

    fn encode_key(&self, src: &str) -> Vec<u8> {
        Self::encode_string(src)
    }

    fn encode_value(&self, src: &str) -> Vec<u8> {
        Self::encode_string(src)
    }

    fn encode_tokens(&self, tokens: &[TokenInfo], output: &mut Vec<u8>) {
        for (i, token_info) in tokens.iter().enumerate() {
            Self::encode_token(token_info, i + 1 == tokens.len(), output);
        }
    }

    fn tokens_termination_flag(&self) -> u8 {
        TOKENS_TERMINATION_FLAG
    }
}

/// 復号された品詞
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedPos {
    Full { left_id: u16, right_id: u16 },
    Frequent(u8),
    SameAsPrev,
    Mono(u16),
}

/// 復号された値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedValue {
    Id(u32),
    SameAsPrev,
    AsIsHiragana,
    AsIsKatakana,
}

/// 復号されたトークンレコード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedToken {
    pub pos: EncodedPos,

    /// コスト。`small_cost` の場合は下位8ビットが0になります。
    pub cost: u16,

    pub small_cost: bool,
    pub value: EncodedValue,
    pub spelling_correction: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::token::Token;

    #[test]
    fn test_encode_key() {
        let codec = SystemDictionaryCodec::new();
        assert_eq!(codec.encode_key("ぁゖ"), vec![0x01, 0x56]);
        assert_eq!(codec.encode_key("ァヶー"), vec![0x57, 0xac, 0xad]);
        assert_eq!(codec.encode_key("亜a"), vec![0xfe, 0x4e, 0x9c, 0xfe, 0x00, 0x61]);
        assert_eq!(codec.encode_key("𠮷"), vec![0xff, 0x02, 0x0b, 0xb7]);
    }

    #[test]
    fn test_decode_string() {
        let codec = SystemDictionaryCodec::new();
        for src in ["とうきょう", "トーキョー", "東京タワー", "𠮷野家", "abc"] {
            assert_eq!(codec.decode_string(&codec.encode_value(src)).unwrap(), src);
        }
        assert!(codec.decode_string(&[0xfe, 0x4e]).is_err());
        assert!(codec.decode_string(&[0x00]).is_err());
    }

    #[test]
    fn test_encode_tokens() {
        let codec = SystemDictionaryCodec::new();
        let t1 = Token::new("あ", "亜", 3, 3, 0x1234);
        let t2 = Token::new("あ", "亜", 1, 2, 0x5678)
            .with_attributes(TokenAttributes::SPELLING_CORRECTION);
        let mut i1 = TokenInfo::new(&t1);
        i1.id_in_value_trie = Some(0x0a0b0c);
        let mut i2 = TokenInfo::new(&t2);
        i2.id_in_value_trie = Some(0x0a0b0c);
        i2.value_type = ValueType::SameAsPrevValue;
        i2.cost_type = CostType::CanUseSmallEncoding;
        i2.pos_type = PosType::FrequentPos;
        i2.id_in_frequent_pos_map = 7;

        let mut output = vec![];
        codec.encode_tokens(&[i1, i2], &mut output);
        assert_eq!(
            output,
            vec![
                0x03, 3, 0, 0x34, 0x12, 0x0c, 0x0b, 0x0a, // mono pos, u16 cost, value id
                0xe5, 7, 0x56, // last, spelling correction, small cost, same value, frequent pos
            ]
        );

        let decoded = codec.decode_tokens(&output).unwrap();
        assert_eq!(
            decoded,
            vec![
                EncodedToken {
                    pos: EncodedPos::Mono(3),
                    cost: 0x1234,
                    small_cost: false,
                    value: EncodedValue::Id(0x0a0b0c),
                    spelling_correction: false,
                },
                EncodedToken {
                    pos: EncodedPos::Frequent(7),
                    cost: 0x5600,
                    small_cost: true,
                    value: EncodedValue::SameAsPrev,
                    spelling_correction: true,
                },
            ]
        );
    }

    #[test]
    fn test_flags_never_collide_with_termination() {
        let codec = SystemDictionaryCodec::new();
        let token = Token::new("あ", "ア", 1, 2, 300)
            .with_attributes(TokenAttributes::SPELLING_CORRECTION);
        let mut info = TokenInfo::new(&token);
        info.value_type = ValueType::AsIsKatakana;
        info.cost_type = CostType::CanUseSmallEncoding;
        info.pos_type = PosType::SameAsPrevPos;
        let mut output = vec![];
        codec.encode_tokens(&[info], &mut output);
        assert_eq!(output, vec![0xee, 1]);
        assert_ne!(output[0], codec.tokens_termination_flag());
    }

    #[test]
    #[should_panic]
    fn test_missing_value_id() {
        let token = Token::new("あ", "亜", 1, 2, 300);
        let mut output = vec![];
        SystemDictionaryCodec::new().encode_tokens(&[TokenInfo::new(&token)], &mut output);
    }

    #[test]
    fn test_truncated_record() {
        let codec = SystemDictionaryCodec::new();
        assert!(codec.decode_tokens(&[0x80, 1, 0]).is_err());
        assert!(codec.decode_tokens(&[]).is_err());
        assert!(codec.decode_tokens(&[0xff]).is_err());
    }
}
