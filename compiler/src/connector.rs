//! 接続コスト行列の変換
//!
//! matrix.def を [`henkan::Connector`] が直接読める簡潔な形式に変換します。

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use henkan::dictionary::{ConnectorBuilder, ConnectorView, MatrixConnector};
use henkan::errors::HenkanError;

/// connector コマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "connector",
    about = "A program to convert matrix.def into the succinct connector binary."
)]
pub struct Args {
    /// Matrix definition file (matrix.def).
    #[clap(short = 'm', long)]
    pub matrix_in: PathBuf,

    /// File to which the connector binary is output.
    #[clap(short = 'o', long)]
    pub connector_out: PathBuf,

    /// Quantization step of the costs. Values other than 1 store one byte per cost.
    #[clap(short = 'r', long, default_value_t = 1)]
    pub resolution: u16,
}

/// 変換中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 行列の読み込みや変換のエラー
    #[error("Connector building failed: {0}")]
    Henkan(#[from] HenkanError),
}

/// matrix.def を読み込みます。
pub fn load_matrix(matrix_in: &Path) -> Result<MatrixConnector, HenkanError> {
    let matrix = MatrixConnector::from_reader(BufReader::new(File::open(matrix_in)?))?;
    log::info!(
        "loaded {} ({}x{})",
        matrix_in.display(),
        matrix.num_left(),
        matrix.num_right()
    );
    Ok(matrix)
}

/// matrix.def を読み込み、接続コスト行列のバイナリを返します。
pub fn build_connector(matrix_in: &Path, resolution: u16) -> Result<Vec<u8>, HenkanError> {
    let matrix = load_matrix(matrix_in)?;
    ConnectorBuilder::new().resolution(resolution)?.build(&matrix)
}

/// connector コマンドを実行します。
pub fn run(args: Args) -> Result<(), ConnectorError> {
    println!("Compiling the connector...");
    let matrix = load_matrix(&args.matrix_in)?;

    let mut wtr = BufWriter::new(File::create(&args.connector_out)?);
    ConnectorBuilder::new()
        .resolution(args.resolution)?
        .write(&matrix, &mut wtr)?;
    wtr.flush()?;

    println!(
        "Successfully wrote {} bytes to {}",
        fs::metadata(&args.connector_out)?.len(),
        args.connector_out.display()
    );
    Ok(())
}
