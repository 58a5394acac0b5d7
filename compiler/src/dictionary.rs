//! システム辞書のビルド
//!
//! タブ区切りの辞書ソースを読み込み、値トライ・キートライ・トークン配列・
//! 頻出品詞表の4セクションからなるコンテナを書き出します。

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use henkan::dictionary::builder::DEFAULT_MIN_KEY_LENGTH_TO_USE_SMALL_COST_ENCODING;
use henkan::dictionary::{SystemDictionaryBuilder, Token, read_tokens};
use henkan::errors::HenkanError;

/// dictionary コマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "dictionary",
    about = "A program to build the system dictionary container."
)]
pub struct Args {
    /// Dictionary source files (key, left_id, right_id, cost, value separated by tabs).
    #[clap(short = 'i', long, required = true, num_args = 1..)]
    pub dictionary_in: Vec<PathBuf>,

    /// File to which the dictionary container is output.
    #[clap(short = 'o', long)]
    pub dictionary_out: PathBuf,

    /// Base path to dump each section to `<base>.value`, `.key`, `.tokens` and `.freq_pos`.
    #[clap(long)]
    pub dump_base: Option<PathBuf>,

    /// Minimum number of characters of a key whose costs may be stored in one byte.
    #[clap(long, default_value_t = DEFAULT_MIN_KEY_LENGTH_TO_USE_SMALL_COST_ENCODING)]
    pub min_key_length_to_use_small_cost_encoding: usize,
}

/// ビルド中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 辞書ソースの読み込みやビルドのエラー
    #[error("Dictionary building failed: {0}")]
    Henkan(#[from] HenkanError),
}

/// 複数の辞書ソースからトークンを読み込みます。
pub fn load_tokens(paths: &[PathBuf]) -> Result<Vec<Token>, HenkanError> {
    let mut tokens = vec![];
    for path in paths {
        let loaded = read_tokens(BufReader::new(File::open(path)?))?;
        log::info!("loaded {} tokens from {}", loaded.len(), path.display());
        tokens.extend(loaded);
    }
    Ok(tokens)
}

/// トークンからシステム辞書をビルドします。
pub fn build_dictionary(
    tokens: &[Token],
    min_key_length_to_use_small_cost_encoding: usize,
) -> Result<SystemDictionaryBuilder, HenkanError> {
    let mut builder = SystemDictionaryBuilder::new()
        .min_key_length_to_use_small_cost_encoding(min_key_length_to_use_small_cost_encoding);
    builder.build_from_tokens(tokens)?;
    Ok(builder)
}

/// dictionary コマンドを実行します。
pub fn run(args: Args) -> Result<(), DictionaryError> {
    let tokens = load_tokens(&args.dictionary_in)?;

    println!("Compiling the system dictionary...");
    let builder = build_dictionary(&tokens, args.min_key_length_to_use_small_cost_encoding)?;

    println!("Writing the system dictionary...");
    let mut wtr = BufWriter::new(File::create(&args.dictionary_out)?);
    builder.write_to_stream(args.dump_base.as_deref(), &mut wtr)?;
    wtr.flush()?;

    println!(
        "Successfully built the dictionary to {}",
        args.dictionary_out.display()
    );
    Ok(())
}
