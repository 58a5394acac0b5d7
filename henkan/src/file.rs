//! 名前付きセクションのコンテナファイル
//!
//! データファイルは以下の形式で、複数のバイナリセクションを1つにまとめます。
//!
//! ```text
//! magic ("HenkanDictionary 1\n") | 0xFF padding to 16 bytes
//! num_sections: u32
//! { fingerprint: [u8; 8] | size: u32 | data | zero padding to 4 bytes } * num_sections
//! ```
//!
//! `fingerprint` はセクション名のSHA-256ダイジェストの先頭8バイトです。
//! すべての数値はリトルエンディアンで、セクションのデータは常に4バイト境界から始まります。

use std::fs::File;
use std::io::Write;
use std::ops::Range;
use std::path::Path;

use memmap2::Mmap;
use sha2::{Digest, Sha256};

use crate::cursor::ByteCursor;
use crate::errors::{HenkanError, Result};
use crate::utils::{FromU32, round_up_4};

/// コンテナファイルのマジックナンバー
pub const FILE_MAGIC: &[u8] = b"HenkanDictionary 1\n";

const FILE_ALIGNMENT: usize = 16;
const FILE_MAGIC_LEN: usize = FILE_MAGIC.len();
const PADDING_LEN: usize = (FILE_ALIGNMENT - (FILE_MAGIC_LEN % FILE_ALIGNMENT)) % FILE_ALIGNMENT;
const DATA_START: usize = FILE_MAGIC_LEN + PADDING_LEN;

/// 書き出すセクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryFileSection<'a> {
    /// セクション名
    pub name: String,

    /// セクションのデータ
    pub data: &'a [u8],
}

impl<'a> DictionaryFileSection<'a> {
    /// 新しいセクションを作成します。
    pub fn new<S>(name: S, data: &'a [u8]) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// セクション名のフィンガープリントを計算します。
pub fn fingerprint(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(name.as_bytes());
    let mut fp = [0; 8];
    fp.copy_from_slice(&digest[..8]);
    fp
}

/// セクションをコンテナ形式で書き出します。
///
/// # エラー
///
/// 書き込みに失敗した場合、またはセクション数やサイズが `u32` に収まらない場合にエラーを返します。
pub fn write_sections<W>(sections: &[DictionaryFileSection], mut wtr: W) -> Result<()>
where
    W: Write,
{
    wtr.write_all(FILE_MAGIC)?;
    wtr.write_all(&[0xff; PADDING_LEN])?;
    wtr.write_all(&u32::try_from(sections.len())?.to_le_bytes())?;
    for section in sections {
        let size = u32::try_from(section.data.len())?;
        wtr.write_all(&fingerprint(&section.name))?;
        wtr.write_all(&size.to_le_bytes())?;
        wtr.write_all(section.data)?;
        let padding = round_up_4(section.data.len()) - section.data.len();
        wtr.write_all(&[0; 3][..padding])?;
        log::debug!("wrote section {:?}: {} bytes", section.name, section.data.len());
    }
    Ok(())
}

/// コンテナを保持するメモリバッファ
///
/// - `Mmap`: メモリマップドファイル
/// - `Owned`: ヒープ上のバッファ
enum FileBuffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl FileBuffer {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Mmap(mmap) => &mmap[..],
            Self::Owned(bytes) => &bytes[..],
        }
    }
}

/// 読み込み済みのコンテナファイル
///
/// セクションのデータはコピーされず、バッファ上の範囲として保持されます。
pub struct DictionaryFile {
    buffer: FileBuffer,
    sections: Vec<([u8; 8], Range<usize>)>,
}

impl DictionaryFile {
    /// ファイルをメモリマップして読み込みます。
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合、またはコンテナの形式が不正な場合にエラーを返します。
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            HenkanError::invalid_argument("path", format!("Failed to open data file: {e}"))
        })?;
        // The mapping is read-only and the file is not expected to change while mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        log::info!("mapped {} ({} bytes)", path.display(), mmap.len());
        Self::parse(FileBuffer::Mmap(mmap))
    }

    /// ヒープ上のバイト列から読み込みます。
    ///
    /// # エラー
    ///
    /// コンテナの形式が不正な場合にエラーを返します。
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::parse(FileBuffer::Owned(bytes))
    }

    fn parse(buffer: FileBuffer) -> Result<Self> {
        let bytes = buffer.as_bytes();
        if !bytes.starts_with(FILE_MAGIC) {
            return Err(HenkanError::invalid_argument(
                "data",
                "The magic number of the data file mismatches.",
            ));
        }
        let mut cursor = ByteCursor::new(bytes);
        cursor.take(DATA_START).ok_or_else(|| {
            HenkanError::out_of_range(None, "padding", "the data file is too small")
        })?;
        let num_sections = cursor.read_u32().ok_or_else(|| {
            HenkanError::out_of_range(None, "num_sections", "the data file is too small")
        })?;

        let mut sections = vec![];
        for i in 0..usize::from_u32(num_sections) {
            let fp = cursor.take(8).ok_or_else(|| {
                HenkanError::out_of_range(Some(i), "fingerprint", "the section header is truncated")
            })?;
            let mut fingerprint = [0; 8];
            fingerprint.copy_from_slice(fp);
            let size = cursor.read_u32().ok_or_else(|| {
                HenkanError::out_of_range(Some(i), "size", "the section header is truncated")
            })?;
            let size = usize::from_u32(size);
            let start = cursor.position();
            let remaining = cursor.remaining();
            cursor.take(round_up_4(size)).ok_or_else(|| {
                HenkanError::out_of_range(
                    Some(i),
                    "data",
                    format!("{} bytes required, {remaining} remaining", round_up_4(size)),
                )
            })?;
            sections.push((fingerprint, start..start + size));
        }
        log::debug!("loaded data file with {} sections", sections.len());

        Ok(Self { buffer, sections })
    }

    /// コンテナ全体のバイト列を返します。
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// セクション数を返します。
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// 名前からセクションのデータを返します。
    ///
    /// 同名のセクションが複数ある場合は最初のものを返します。
    pub fn section(&self, name: &str) -> Option<&[u8]> {
        let fp = fingerprint(name);
        self.sections
            .iter()
            .find(|(f, _)| *f == fp)
            .map(|(_, range)| &self.as_bytes()[range.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let sections = [
            DictionaryFileSection::new("a", &[1, 2, 3]),
            DictionaryFileSection::new("b", &[4, 5, 6, 7]),
        ];
        let mut buf = vec![];
        write_sections(&sections, &mut buf).unwrap();

        assert_eq!(&buf[..FILE_MAGIC_LEN], FILE_MAGIC);
        assert!(buf[FILE_MAGIC_LEN..DATA_START].iter().all(|&b| b == 0xff));
        assert_eq!(&buf[DATA_START..DATA_START + 4], &[2, 0, 0, 0]);
        let first = DATA_START + 4;
        assert_eq!(&buf[first..first + 8], &fingerprint("a"));
        assert_eq!(&buf[first + 8..first + 12], &[3, 0, 0, 0]);
        assert_eq!(&buf[first + 12..first + 16], &[1, 2, 3, 0]);
        assert_eq!(buf.len(), first + 16 + 16);
    }

    #[test]
    fn test_read_sections() {
        let sections = [
            DictionaryFileSection::new("conn", &[9; 5]),
            DictionaryFileSection::new("tokens", &[]),
        ];
        let mut buf = vec![];
        write_sections(&sections, &mut buf).unwrap();

        let file = DictionaryFile::from_bytes(buf).unwrap();
        assert_eq!(file.num_sections(), 2);
        assert_eq!(file.section("conn"), Some(&[9u8; 5][..]));
        assert_eq!(file.section("tokens"), Some(&[][..]));
        assert_eq!(file.section("missing"), None);
    }

    #[test]
    fn test_section_data_is_aligned() {
        let sections = [
            DictionaryFileSection::new("x", &[1]),
            DictionaryFileSection::new("y", &[2, 3]),
        ];
        let mut buf = vec![];
        write_sections(&sections, &mut buf).unwrap();
        let file = DictionaryFile::from_bytes(buf).unwrap();
        let base = file.as_bytes().as_ptr() as usize;
        for name in ["x", "y"] {
            let data = file.section(name).unwrap();
            assert_eq!((data.as_ptr() as usize - base) % 4, 0);
        }
    }

    #[test]
    fn test_bad_magic() {
        let buf = b"NotADictionary 1\n\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff\0\0\0\0".to_vec();
        assert!(DictionaryFile::from_bytes(buf).is_err());
    }

    #[test]
    fn test_truncated_section() {
        let sections = [DictionaryFileSection::new("a", &[1, 2, 3, 4, 5, 6, 7, 8])];
        let mut buf = vec![];
        write_sections(&sections, &mut buf).unwrap();
        buf.truncate(buf.len() - 1);
        assert!(matches!(
            DictionaryFile::from_bytes(buf),
            Err(HenkanError::OutOfRange(_))
        ));
    }
}
