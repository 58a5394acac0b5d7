//! henkan のデータファイルコンパイラ
//!
//! 接続コスト行列 (matrix.def) と辞書ソース (TSV) から、
//! 変換エンジンが読み込むバイナリを生成するCLIツールです。

mod build;
mod connector;
mod dictionary;

use std::io::Write;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use thiserror::Error;

use crate::build::BuildError;
use crate::connector::ConnectorError;
use crate::dictionary::DictionaryError;

/// コマンドライン引数の構造体
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// ログの詳細度。`-v` で info、`-vv` で debug を出力します
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// matrix.def から接続コスト行列のバイナリを作ります
    Connector(connector::Args),

    /// 辞書ソースからシステム辞書のコンテナを作ります
    ///
    /// 各セクションを個別のファイルに書き出すこともできます。
    Dictionary(dictionary::Args),

    /// 接続コスト行列とシステム辞書を1つのデータファイルにまとめます
    Build(build::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
///
/// 各サブコマンドで発生したエラーをラップします。
#[derive(Debug, Error)]
pub enum CompileError {
    /// 接続コスト行列の変換中のエラー
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    /// システム辞書のビルド中のエラー
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    /// データファイルのビルド中のエラー
    #[error(transparent)]
    Build(#[from] BuildError),
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

/// コマンドライン引数をパースし、指定されたサブコマンドを実行します。
fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match cli.command {
        Command::Connector(args) => Ok(connector::run(args)?),
        Command::Dictionary(args) => Ok(dictionary::run(args)?),
        Command::Build(args) => Ok(build::run(args)?),
    }
}
