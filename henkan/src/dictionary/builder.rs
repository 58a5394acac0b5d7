//! システム辞書のビルダー
//!
//! トークンの一覧から、値トライ・キートライ・トークン配列・頻出品詞表の
//! 4つのセクションを構築します。
//!
//! ビルドは以下の順に進みます。各段は前の段の結果だけを読みます。
//!
//! 1. 読みごとにトークンをまとめ、読みから復元できる値を判定する
//! 2. 頻出品詞表を作る
//! 3. 値トライを作り、トークンに値IDを割り当てる
//! 4. 読みごとにトークンを並べ替える
//! 5. コストを1バイトで持てるトークンを判定する
//! 6. 品詞と値を直前のトークンとの差分で表せるか判定する
//! 7. キートライを作り、読みにキーIDを割り当てる
//! 8. キーID順にトークンを符号化してトークン配列を作る

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};

use crate::dictionary::codec::{DictionaryCodec, SystemDictionaryCodec};
use crate::dictionary::louds::{LoudsTrieBuilder, TrieBuilder};
use crate::dictionary::token::{CostType, KeyInfo, PosType, Token, TokenInfo, ValueType};
use crate::dictionary::token_array::BitVectorBasedArrayBuilder;
use crate::errors::Result;
use crate::file::{DictionaryFileSection, write_sections};
use crate::utils::hiragana_to_katakana;

/// コストの1バイト符号化を許す読みの最小文字数の既定値
pub const DEFAULT_MIN_KEY_LENGTH_TO_USE_SMALL_COST_ENCODING: usize = 6;

/// 頻出品詞表の要素数
pub const FREQUENT_POS_TABLE_SIZE: usize = 256;

/// 頻出品詞として選べる品詞の最大数
pub const MAX_FREQUENT_POS: usize = 255;

/// 1バイト符号化の対象になるコストの下限
const MIN_COST_FOR_SMALL_ENCODING: u16 = 256;

const TOKEN_ARRAY_BASE_LENGTH: usize = 4;
const TOKEN_ARRAY_STEP_LENGTH: usize = 2;

/// 出現頻度の高い品詞に1バイトのIDを割り当てた表
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrequentPosMap {
    ids: HashMap<u32, u8>,
}

impl FrequentPosMap {
    /// 品詞の出現頻度から表を作ります。
    ///
    /// 頻度の高い順に、同じ頻度の品詞をまとめて選びます。
    /// 次の頻度の品詞をすべて加えると [`MAX_FREQUENT_POS`] を超える場合はそこで止めるため、
    /// 表が埋まりきらないことがあります。
    /// 選ばれた品詞には `(left_id << 16) | right_id` の昇順にIDが振られます。
    pub fn build(key_infos: &[KeyInfo]) -> Self {
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for token_info in key_infos.iter().flat_map(|k| &k.tokens) {
            *counts.entry(token_info.token.pos()).or_insert(0) += 1;
        }
        let mut by_freq: Vec<(usize, u32)> = counts.into_iter().map(|(pos, c)| (c, pos)).collect();
        by_freq.sort_unstable_by(|a, b| b.cmp(a));

        let mut selected = vec![];
        for level in by_freq.chunk_by(|a, b| a.0 == b.0) {
            if selected.len() + level.len() > MAX_FREQUENT_POS {
                break;
            }
            selected.extend(level.iter().map(|&(_, pos)| pos));
        }
        selected.sort_unstable();

        let ids = selected.into_iter().zip(0..=u8::MAX).collect();
        Self { ids }
    }

    /// 品詞のIDを返します。
    #[inline(always)]
    pub fn get(&self, pos: u32) -> Option<u8> {
        self.ids.get(&pos).copied()
    }

    /// 登録された品詞の数を返します。
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// 品詞が登録されていない場合に `true` を返します。
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// IDを添字とする `u32` の表をリトルエンディアンで返します。未使用の要素は0です。
    pub fn to_table_bytes(&self) -> Vec<u8> {
        assert!(
            self.ids.len() <= MAX_FREQUENT_POS,
            "too many frequent pos: {}",
            self.ids.len()
        );
        let mut table = [0u32; FREQUENT_POS_TABLE_SIZE];
        for (&pos, &id) in &self.ids {
            table[usize::from(id)] = pos;
        }
        table.iter().flat_map(|pos| pos.to_le_bytes()).collect()
    }
}

/// 複数の読みから参照される値の集合
#[derive(Debug, Default)]
pub struct HeterophoneValues<'t> {
    values: HashSet<&'t str>,
}

impl<'t> HeterophoneValues<'t> {
    /// 辞書全体から異なる読みを持つ値を集めます。
    pub fn collect(key_infos: &[KeyInfo<'t>]) -> Self {
        let mut first_keys: HashMap<&'t str, &'t str> = HashMap::new();
        let mut values = HashSet::new();
        for key_info in key_infos {
            for token_info in &key_info.tokens {
                let token: &'t Token = token_info.token;
                match first_keys.entry(token.value.as_str()) {
                    Entry::Occupied(e) => {
                        if *e.get() != key_info.key {
                            values.insert(token.value.as_str());
                        }
                    }
                    Entry::Vacant(e) => {
                        e.insert(key_info.key);
                    }
                }
            }
        }
        Self { values }
    }

    /// `value` が複数の読みを持つ場合に `true` を返します。
    #[inline(always)]
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    /// 集合の大きさを返します。
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 集合が空の場合に `true` を返します。
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// システム辞書のビルダー
///
/// トライのビルダーとコーデックを所有し、入力のトークンと出力先は借用します。
///
/// # 例
///
/// ```
/// use henkan::dictionary::{SystemDictionaryBuilder, Token};
///
/// let tokens = vec![
///     Token::new("とうきょう", "東京", 10, 10, 3000),
///     Token::new("とうきょう", "とうきょう", 10, 10, 5000),
/// ];
/// let mut builder = SystemDictionaryBuilder::new();
/// builder.build_from_tokens(&tokens).unwrap();
///
/// let mut buf = vec![];
/// builder.write_to_stream(None, &mut buf).unwrap();
/// assert!(buf.starts_with(b"HenkanDictionary 1\n"));
/// ```
pub struct SystemDictionaryBuilder<V = LoudsTrieBuilder, K = LoudsTrieBuilder, C = SystemDictionaryCodec> {
    value_trie: V,
    key_trie: K,
    codec: C,
    token_array: BitVectorBasedArrayBuilder,
    frequent_pos_table: Vec<u8>,
    min_key_length_to_use_small_cost_encoding: usize,
}

impl Default for SystemDictionaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemDictionaryBuilder {
    /// LOUDSトライと標準のコーデックを使うビルダーを作成します。
    pub fn new() -> Self {
        Self::with_components(
            LoudsTrieBuilder::new(),
            LoudsTrieBuilder::new(),
            SystemDictionaryCodec::new(),
        )
    }
}

impl<V, K, C> SystemDictionaryBuilder<V, K, C>
where
    V: TrieBuilder,
    K: TrieBuilder,
    C: DictionaryCodec,
{
    /// トライのビルダーとコーデックを指定してビルダーを作成します。
    ///
    /// # 引数
    ///
    /// * `value_trie` - 値トライのビルダー
    /// * `key_trie` - キートライのビルダー
    /// * `codec` - 符号化方式
    pub fn with_components(value_trie: V, key_trie: K, codec: C) -> Self {
        Self {
            value_trie,
            key_trie,
            codec,
            token_array: BitVectorBasedArrayBuilder::new(),
            frequent_pos_table: vec![0; FREQUENT_POS_TABLE_SIZE * 4],
            min_key_length_to_use_small_cost_encoding:
                DEFAULT_MIN_KEY_LENGTH_TO_USE_SMALL_COST_ENCODING,
        }
    }

    /// コストの1バイト符号化を許す読みの最小文字数を設定します。
    pub fn min_key_length_to_use_small_cost_encoding(mut self, len: usize) -> Self {
        self.min_key_length_to_use_small_cost_encoding = len;
        self
    }

    /// トークンから辞書を構築します。
    ///
    /// # エラー
    ///
    /// トークン配列の大きさが `u32` に収まらない場合にエラーを返します。
    ///
    /// # Panics
    ///
    /// 読みまたは値が空のトークンがある場合、トライからIDを引けない場合、
    /// またはすでに構築済みの場合にパニックします。
    pub fn build_from_tokens(&mut self, tokens: &[Token]) -> Result<()> {
        log::info!("building system dictionary from {} tokens", tokens.len());
        let key_infos = self.build_key_infos(tokens);
        self.build_token_array(&key_infos)?;
        log::info!(
            "built system dictionary: {} keys, {} bytes of tokens",
            key_infos.len(),
            self.token_array.image().len()
        );
        Ok(())
    }

    /// トークン配列の直前までビルドを進め、読みごとの情報を返します。
    pub(crate) fn build_key_infos<'t>(&mut self, tokens: &'t [Token]) -> Vec<KeyInfo<'t>> {
        let mut key_infos = Self::read_tokens(tokens);
        log::debug!("grouped tokens into {} keys", key_infos.len());

        let frequent_pos = FrequentPosMap::build(&key_infos);
        log::debug!("selected {} frequent pos", frequent_pos.len());
        self.frequent_pos_table = frequent_pos.to_table_bytes();

        self.build_value_trie(&key_infos);
        self.set_id_for_value(&mut key_infos);
        Self::sort_token_info(&mut key_infos);

        let heterophones = HeterophoneValues::collect(&key_infos);
        log::debug!("found {} heterophone values", heterophones.len());
        self.set_cost_type(&mut key_infos, &heterophones);
        Self::set_pos_type(&mut key_infos, &frequent_pos);
        Self::set_value_type(&mut key_infos);

        self.build_key_trie(&key_infos);
        self.set_id_for_key(&mut key_infos);
        key_infos
    }

    fn read_tokens(tokens: &[Token]) -> Vec<KeyInfo> {
        for token in tokens {
            assert!(!token.key.is_empty(), "empty key: {token:?}");
            assert!(!token.value.is_empty(), "empty value: {token:?}");
        }
        let mut sorted: Vec<&Token> = tokens.iter().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));

        sorted
            .chunk_by(|a, b| a.key == b.key)
            .map(|group| {
                let first: &Token = group[0];
                let katakana = hiragana_to_katakana(&first.key);
                let mut key_info = KeyInfo::new(&first.key);
                key_info.tokens = group
                    .iter()
                    .map(|&token| {
                        let mut token_info = TokenInfo::new(token);
                        if token.value == token.key {
                            token_info.value_type = ValueType::AsIsHiragana;
                        } else if token.value == katakana {
                            token_info.value_type = ValueType::AsIsKatakana;
                        }
                        token_info
                    })
                    .collect();
                key_info
            })
            .collect()
    }

    fn build_value_trie(&mut self, key_infos: &[KeyInfo]) {
        for token_info in key_infos.iter().flat_map(|k| &k.tokens) {
            if !token_info.is_as_is() {
                self.value_trie
                    .add(&self.codec.encode_value(&token_info.token.value));
            }
        }
        self.value_trie.build();
    }

    fn set_id_for_value(&self, key_infos: &mut [KeyInfo]) {
        for token_info in key_infos.iter_mut().flat_map(|k| &mut k.tokens) {
            if token_info.is_as_is() {
                continue;
            }
            let value = &token_info.token.value;
            let id = self
                .value_trie
                .id(&self.codec.encode_value(value))
                .unwrap_or_else(|| panic!("no value id for {value:?}"));
            token_info.id_in_value_trie = Some(id);
        }
    }

    fn sort_token_info(key_infos: &mut [KeyInfo]) {
        for key_info in key_infos {
            key_info.tokens.sort_by(|a, b| {
                b.token
                    .left_id
                    .cmp(&a.token.left_id)
                    .then(b.token.right_id.cmp(&a.token.right_id))
                    .then(a.id_in_value_trie.cmp(&b.id_in_value_trie))
                    .then(a.token.attributes.cmp(&b.token.attributes))
            });
        }
    }

    fn has_homonyms_in_same_pos(key_info: &KeyInfo) -> bool {
        let mut seen = HashSet::new();
        key_info
            .tokens
            .iter()
            .any(|token_info| !seen.insert(token_info.token.pos()))
    }

    fn set_cost_type(&self, key_infos: &mut [KeyInfo], heterophones: &HeterophoneValues) {
        for key_info in key_infos {
            if key_info.key.chars().count() < self.min_key_length_to_use_small_cost_encoding {
                continue;
            }
            if Self::has_homonyms_in_same_pos(key_info) {
                continue;
            }
            if key_info
                .tokens
                .iter()
                .any(|token_info| heterophones.contains(&token_info.token.value))
            {
                continue;
            }
            for token_info in &mut key_info.tokens {
                if token_info.token.cost >= MIN_COST_FOR_SMALL_ENCODING {
                    token_info.cost_type = CostType::CanUseSmallEncoding;
                }
            }
        }
    }

    fn set_pos_type(key_infos: &mut [KeyInfo], frequent_pos: &FrequentPosMap) {
        for key_info in key_infos {
            let mut prev_pos = None;
            for token_info in &mut key_info.tokens {
                let pos = token_info.token.pos();
                if let Some(id) = frequent_pos.get(pos) {
                    token_info.pos_type = PosType::FrequentPos;
                    token_info.id_in_frequent_pos_map = id;
                }
                if prev_pos == Some(pos) {
                    token_info.pos_type = PosType::SameAsPrevPos;
                }
                prev_pos = Some(pos);
            }
        }
    }

    fn set_value_type(key_infos: &mut [KeyInfo]) {
        for key_info in key_infos {
            for i in 1..key_info.tokens.len() {
                let prev_value = &key_info.tokens[i - 1].token.value;
                let token_info = &key_info.tokens[i];
                if !token_info.is_as_is() && token_info.token.value == *prev_value {
                    key_info.tokens[i].value_type = ValueType::SameAsPrevValue;
                }
            }
        }
    }

    fn build_key_trie(&mut self, key_infos: &[KeyInfo]) {
        for key_info in key_infos {
            self.key_trie.add(&self.codec.encode_key(key_info.key));
        }
        self.key_trie.build();
    }

    fn set_id_for_key(&self, key_infos: &mut [KeyInfo]) {
        for key_info in key_infos {
            let id = self
                .key_trie
                .id(&self.codec.encode_key(key_info.key))
                .unwrap_or_else(|| panic!("no key id for {:?}", key_info.key));
            key_info.id_in_key_trie = Some(id);
        }
    }

    fn build_token_array(&mut self, key_infos: &[KeyInfo]) -> Result<()> {
        let mut by_id: Vec<Option<&KeyInfo>> = vec![None; key_infos.len()];
        for key_info in key_infos {
            let id = key_info
                .id_in_key_trie
                .and_then(|id| usize::try_from(id).ok())
                .filter(|&id| id < by_id.len())
                .unwrap_or_else(|| panic!("invalid key id for {:?}", key_info.key));
            assert!(by_id[id].is_none(), "duplicate key id {id}");
            by_id[id] = Some(key_info);
        }

        self.token_array
            .set_size(TOKEN_ARRAY_BASE_LENGTH, TOKEN_ARRAY_STEP_LENGTH);
        for (id, key_info) in by_id.into_iter().enumerate() {
            let key_info = key_info.unwrap_or_else(|| panic!("key id {id} is not assigned"));
            let mut record = vec![];
            self.codec.encode_tokens(&key_info.tokens, &mut record);
            self.token_array.add(record);
        }
        self.token_array
            .add(vec![self.codec.tokens_termination_flag()]);
        self.token_array.build()
    }

    /// 構築した4つのセクションを返します。
    ///
    /// 接続コスト行列など、他のセクションと同じコンテナに格納する場合に使います。
    pub fn sections(&self) -> Vec<DictionaryFileSection<'_>> {
        vec![
            DictionaryFileSection::new(
                self.codec.section_name_for_value(),
                self.value_trie.image(),
            ),
            DictionaryFileSection::new(self.codec.section_name_for_key(), self.key_trie.image()),
            DictionaryFileSection::new(
                self.codec.section_name_for_tokens(),
                self.token_array.image(),
            ),
            DictionaryFileSection::new(
                self.codec.section_name_for_pos(),
                &self.frequent_pos_table,
            ),
        ]
    }

    /// 構築した辞書をコンテナ形式で書き出します。
    ///
    /// `dump_base` を指定すると、各セクションを `<dump_base>.value`、`.key`、`.tokens`、
    /// `.freq_pos` にも書き出します。
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合にエラーを返します。
    pub fn write_to_stream<W>(&self, dump_base: Option<&Path>, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let sections = self.sections();
        if let Some(base) = dump_base {
            for (section, ext) in sections.iter().zip(["value", "key", "tokens", "freq_pos"]) {
                let path = dump_path(base, ext);
                std::fs::write(&path, section.data)?;
                log::info!("dumped {} ({} bytes)", path.display(), section.data.len());
            }
        }
        write_sections(&sections, wtr)
    }
}

fn dump_path(base: &Path, ext: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::token::TokenAttributes;

    type DefaultBuilder = SystemDictionaryBuilder;

    fn tokens_with_pos(pos_counts: &[(u16, usize)]) -> Vec<Token> {
        let mut tokens = vec![];
        for &(id, count) in pos_counts {
            for i in 0..count {
                tokens.push(Token::new(format!("き{i}"), format!("木{id}"), id, id, 100));
            }
        }
        tokens
    }

    #[test]
    fn test_read_tokens_groups_and_as_is() {
        let tokens = vec![
            Token::new("かな", "仮名", 1, 1, 100),
            Token::new("あい", "アイ", 2, 2, 100),
            Token::new("かな", "かな", 3, 3, 100),
            Token::new("あい", "愛", 4, 4, 100),
        ];
        let key_infos = DefaultBuilder::read_tokens(&tokens);
        assert_eq!(key_infos.len(), 2);
        assert_eq!(key_infos[0].key, "あい");
        assert_eq!(key_infos[1].key, "かな");
        let values: Vec<&str> = key_infos[1]
            .tokens
            .iter()
            .map(|t| t.token.value.as_str())
            .collect();
        assert_eq!(values, vec!["仮名", "かな"]);
        assert_eq!(key_infos[0].tokens[0].value_type, ValueType::AsIsKatakana);
        assert_eq!(key_infos[0].tokens[1].value_type, ValueType::Default);
        assert_eq!(key_infos[1].tokens[1].value_type, ValueType::AsIsHiragana);
    }

    #[test]
    #[should_panic(expected = "empty value")]
    fn test_empty_value_panics() {
        let tokens = vec![Token::new("あ", "", 1, 1, 100)];
        SystemDictionaryBuilder::new().build_from_tokens(&tokens).unwrap();
    }

    #[test]
    #[should_panic(expected = "empty key")]
    fn test_empty_key_panics() {
        let tokens = vec![Token::new("", "亜", 1, 1, 100)];
        SystemDictionaryBuilder::new().build_from_tokens(&tokens).unwrap();
    }

    #[test]
    fn test_frequent_pos_ids_are_sorted_by_pos() {
        let tokens = tokens_with_pos(&[(9, 3), (2, 1), (5, 2)]);
        let mut builder = SystemDictionaryBuilder::new();
        let key_infos = builder.build_key_infos(&tokens);
        let map = FrequentPosMap::build(&key_infos);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get((2 << 16) | 2), Some(0));
        assert_eq!(map.get((5 << 16) | 5), Some(1));
        assert_eq!(map.get((9 << 16) | 9), Some(2));

        let table = map.to_table_bytes();
        assert_eq!(table.len(), 1024);
        assert_eq!(&table[4..8], &((5u32 << 16) | 5).to_le_bytes());
        assert!(table[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_frequent_pos_does_not_split_levels() {
        // 200 pos appear twice and 60 pos appear once: 200 + 60 > 255.
        let mut pos_counts = vec![];
        for id in 0..200 {
            pos_counts.push((id, 2));
        }
        for id in 200..260 {
            pos_counts.push((id, 1));
        }
        let tokens = tokens_with_pos(&pos_counts);
        let mut builder = SystemDictionaryBuilder::new();
        let key_infos = builder.build_key_infos(&tokens);
        let map = FrequentPosMap::build(&key_infos);
        assert_eq!(map.len(), 200);
        assert_eq!(map.get((199 << 16) | 199), Some(199));
        assert_eq!(map.get((200 << 16) | 200), None);
    }

    #[test]
    fn test_frequent_pos_fills_up_to_limit() {
        let pos_counts: Vec<(u16, usize)> = (0..255).map(|id| (id, 1)).collect();
        let tokens = tokens_with_pos(&pos_counts);
        let mut builder = SystemDictionaryBuilder::new();
        let key_infos = builder.build_key_infos(&tokens);
        assert_eq!(FrequentPosMap::build(&key_infos).len(), 255);
    }

    #[test]
    fn test_heterophones() {
        let tokens = vec![
            Token::new("かみ", "紙", 1, 1, 100),
            Token::new("し", "紙", 1, 1, 100),
            Token::new("かみ", "神", 1, 1, 100),
            Token::new("かみ", "神", 2, 2, 100),
        ];
        let key_infos = DefaultBuilder::read_tokens(&tokens);
        let heterophones = HeterophoneValues::collect(&key_infos);
        assert_eq!(heterophones.len(), 1);
        assert!(heterophones.contains("紙"));
        assert!(!heterophones.contains("神"));
    }

    #[test]
    fn test_sort_and_same_as_prev() {
        let tokens = vec![
            Token::new("はし", "橋", 1, 1, 100),
            Token::new("はし", "箸", 5, 3, 100),
            Token::new("はし", "端", 5, 3, 100),
            Token::new("はし", "橋", 5, 3, 300),
        ];
        let mut builder = SystemDictionaryBuilder::new();
        let key_infos = builder.build_key_infos(&tokens);
        let infos = &key_infos[0].tokens;
        assert_eq!(infos[0].token.left_id, 5);
        assert_eq!(infos[3].token.left_id, 1);
        for w in infos[..3].windows(2) {
            assert!(w[0].id_in_value_trie <= w[1].id_in_value_trie);
        }
        assert_eq!(infos[0].pos_type, PosType::FrequentPos);
        assert_eq!(infos[1].pos_type, PosType::SameAsPrevPos);
        assert_eq!(infos[2].pos_type, PosType::SameAsPrevPos);
        assert_eq!(infos[3].pos_type, PosType::FrequentPos);
        assert!(infos.iter().all(|t| t.value_type == ValueType::Default));
    }

    #[test]
    fn test_same_value_different_attributes() {
        let tokens = vec![
            Token::new("かお", "顔", 1, 1, 100)
                .with_attributes(TokenAttributes::SPELLING_CORRECTION),
            Token::new("かお", "顔", 2, 2, 100),
            Token::new("かお", "顔", 2, 2, 200),
        ];
        let mut builder = SystemDictionaryBuilder::new();
        let key_infos = builder.build_key_infos(&tokens);
        let infos = &key_infos[0].tokens;
        assert_eq!(infos[0].value_type, ValueType::Default);
        assert_eq!(infos[1].value_type, ValueType::SameAsPrevValue);
        assert_eq!(infos[2].value_type, ValueType::SameAsPrevValue);
        assert_eq!(infos[2].token.left_id, 1);
    }

    #[test]
    fn test_cost_type() {
        let tokens = vec![
            Token::new("とうきょうと", "東京都", 1, 1, 3000),
            Token::new("とうきょうと", "東京斗", 2, 2, 100),
            Token::new("とうきょうえき", "東京駅", 1, 1, 3000),
            Token::new("とうきょうえき", "東京駅", 1, 1, 4000),
            Token::new("きょうとふ", "京都府", 1, 1, 3000),
        ];
        let mut builder = SystemDictionaryBuilder::new();
        let key_infos = builder.build_key_infos(&tokens);
        let find = |key: &str| key_infos.iter().find(|k| k.key == key).unwrap();

        let tokyo_to = find("とうきょうと");
        assert_eq!(tokyo_to.tokens[0].token.cost, 100);
        assert_eq!(tokyo_to.tokens[0].cost_type, CostType::Normal);
        assert_eq!(tokyo_to.tokens[1].cost_type, CostType::CanUseSmallEncoding);
        assert!(
            find("とうきょうえき")
                .tokens
                .iter()
                .all(|t| t.cost_type == CostType::Normal)
        );
        assert_eq!(find("きょうとふ").tokens[0].cost_type, CostType::Normal);
    }

    #[test]
    fn test_min_key_length_setting() {
        let tokens = vec![Token::new("あい", "愛", 1, 1, 3000)];
        let mut builder =
            SystemDictionaryBuilder::new().min_key_length_to_use_small_cost_encoding(2);
        let key_infos = builder.build_key_infos(&tokens);
        assert_eq!(key_infos[0].tokens[0].cost_type, CostType::CanUseSmallEncoding);
    }

    #[test]
    fn test_dump_path() {
        assert_eq!(
            dump_path(Path::new("/tmp/dict.data"), "key"),
            PathBuf::from("/tmp/dict.data.key")
        );
    }
}
