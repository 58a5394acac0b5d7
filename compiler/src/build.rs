//! データファイルのビルド
//!
//! 接続コスト行列とシステム辞書をビルドし、変換エンジンが起動時に
//! メモリマップする1つのデータファイルにまとめます。

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use henkan::data_manager::write_data_file;
use henkan::dictionary::builder::DEFAULT_MIN_KEY_LENGTH_TO_USE_SMALL_COST_ENCODING;
use henkan::errors::HenkanError;

use crate::connector::build_connector;
use crate::dictionary::{build_dictionary, load_tokens};

/// build コマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "build", about = "A program to build the data file.")]
pub struct Args {
    /// Dictionary source files (key, left_id, right_id, cost, value separated by tabs).
    #[clap(short = 'i', long, required = true, num_args = 1..)]
    pub dictionary_in: Vec<PathBuf>,

    /// Matrix definition file (matrix.def).
    #[clap(short = 'm', long)]
    pub matrix_in: PathBuf,

    /// File to which the data file is output.
    #[clap(short = 'o', long)]
    pub data_out: PathBuf,

    /// Quantization step of the connection costs.
    #[clap(short = 'r', long, default_value_t = 1)]
    pub resolution: u16,

    /// Minimum number of characters of a key whose costs may be stored in one byte.
    #[clap(long, default_value_t = DEFAULT_MIN_KEY_LENGTH_TO_USE_SMALL_COST_ENCODING)]
    pub min_key_length_to_use_small_cost_encoding: usize,
}

/// ビルド中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 行列や辞書のビルドエラー
    #[error("Data file building failed: {0}")]
    Henkan(#[from] HenkanError),
}

/// build コマンドを実行します。
pub fn run(args: Args) -> Result<(), BuildError> {
    println!("Compiling the connector...");
    let connection_data = build_connector(&args.matrix_in, args.resolution)?;

    let tokens = load_tokens(&args.dictionary_in)?;
    println!("Compiling the system dictionary...");
    let builder = build_dictionary(&tokens, args.min_key_length_to_use_small_cost_encoding)?;

    println!("Writing the data file...");
    let mut wtr = BufWriter::new(File::create(&args.data_out)?);
    write_data_file(&connection_data, builder.sections(), &mut wtr)?;
    wtr.flush()?;

    println!("Successfully built the data file to {}", args.data_out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use henkan::dictionary::{Connector, SystemDictionaryCodec};
    use henkan::DataManager;

    #[test]
    fn test_run() {
        let dir = tempfile::tempdir().unwrap();
        let matrix_in = dir.path().join("matrix.def");
        let dictionary_in = dir.path().join("dictionary.tsv");
        let data_out = dir.path().join("henkan.data");
        std::fs::write(&matrix_in, "2 2\n0 0 100\n0 1 50\n1 0 200\n1 1 200\n").unwrap();
        std::fs::write(
            &dictionary_in,
            "とうきょう\t1\t1\t3000\t東京\nきょうと\t1\t0\t3500\t京都\n",
        )
        .unwrap();

        run(Args {
            dictionary_in: vec![dictionary_in],
            matrix_in,
            data_out: data_out.clone(),
            resolution: 1,
            min_key_length_to_use_small_cost_encoding: 6,
        })
        .unwrap();

        let data_manager = DataManager::from_path(&data_out).unwrap();
        let connector = Connector::from_data_manager(&data_manager).unwrap();
        assert_eq!(connector.transition_cost(0, 1), 50);
        assert!(
            data_manager
                .system_dictionary_data(&SystemDictionaryCodec::new())
                .is_ok()
        );
    }
}
