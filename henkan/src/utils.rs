//! ユーティリティ関数と型変換トレイトを提供するモジュール
//!
//! 主に以下の機能を提供します：
//!
//! - `FromU32`: u32からの型変換トレイト
//! - TSV行の解析
//! - ひらがなからカタカナへの変換
//! - 4バイト境界への切り上げ

use csv_core::{ReadFieldResult, ReaderBuilder};

/// u32から他の型への変換を提供するトレイト
///
/// 標準ライブラリのFromトレイトとは異なり、プラットフォーム固有の仮定を行うことができます。
pub trait FromU32 {
    /// u32値から実装型を生成する
    fn from_u32(src: u32) -> Self;
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl FromU32 for usize {
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // Since the pointer width is guaranteed to be 32 or 64,
        // the following process always succeeds.
        unsafe { Self::try_from(src).unwrap_unchecked() }
    }
}

/// `n` を4の倍数に切り上げます。
#[inline(always)]
pub const fn round_up_4(n: usize) -> usize {
    (n + 3) & !3
}

/// タブ区切りの行を解析してフィールドのベクターに分割する
///
/// 辞書ソースは引用符を使わない形式のため、`"` も通常の文字として扱います。
///
/// # 例
///
/// ```
/// # use henkan::utils::parse_tsv_row;
/// let fields = parse_tsv_row("とうきょう\t1\t1\t3000\t東京");
/// assert_eq!(fields, vec!["とうきょう", "1", "1", "3000", "東京"]);
///
/// let fields = parse_tsv_row("\"\t5\t5\t100\t\"");
/// assert_eq!(fields[0], "\"");
/// ```
pub fn parse_tsv_row(row: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut rdr = ReaderBuilder::new().delimiter(b'\t').quoting(false).build();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    let mut field = vec![];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        field.extend_from_slice(&output[..nout]);
        bytes = &bytes[nin..];
        let end = match result {
            ReadFieldResult::InputEmpty => true,
            ReadFieldResult::OutputFull => continue,
            ReadFieldResult::Field { record_end } => record_end,
            ReadFieldResult::End => true,
        };
        // The input is a valid &str and fields are split at ASCII tabs.
        fields.push(String::from_utf8_lossy(&field).into_owned());
        field.clear();
        if end {
            break;
        }
    }
    fields
}

/// ひらがなをカタカナに変換します。
///
/// ぁ(U+3041)からゖ(U+3096)までを対応するカタカナに置き換え、それ以外の文字はそのまま残します。
///
/// # 例
///
/// ```
/// # use henkan::utils::hiragana_to_katakana;
/// assert_eq!(hiragana_to_katakana("とうきょうタワー"), "トウキョウタワー");
/// ```
pub fn hiragana_to_katakana(src: &str) -> String {
    src.chars()
        .map(|c| match c {
            '\u{3041}'..='\u{3096}' => char::from_u32(u32::from(c) + 0x60).unwrap_or(c),
            _ => c,
        })
        .collect()
}
