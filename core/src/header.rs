//! Mask header line: `<id> <direction> <height>x<width> <colbytes> <hlen>\n`.
//!
//! `header_len` is the base offset of every row seek. It is trusted as
//! written; when it disagrees with the number of bytes the first line really
//! occupies, a warning is logged and the declared value still wins, so masks
//! produced by older encoders keep resolving the same way.

use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use tracing::warn;

use crate::error::MaskError;

/// Upper bound on the header line, so a file without line breaks is not
/// slurped whole while looking for the end of the header.
const MAX_HEADER_BYTES: u64 = 512;

/// Metadata parsed from the first line of a mask file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskHeader {
    pub id: String,
    pub direction: String,
    pub height: u32,
    pub width: u32,
    /// Fixed byte width of every encoded row.
    pub column_bytes: u32,
    /// Declared byte length of the header line, terminator included.
    pub header_len: u32,
}

impl MaskHeader {
    /// Parse a header line. Surrounding whitespace, including the line
    /// terminator, is ignored.
    pub fn parse(line: &str) -> Result<Self, MaskError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [id, direction, size, column_bytes, header_len] = fields[..] else {
            return Err(MaskError::MalformedHeader(format!(
                "expected 5 fields, found {}",
                fields.len()
            )));
        };

        let (height, width) = size
            .split_once('x')
            .ok_or_else(|| MaskError::MalformedHeader(format!("size {size:?} is not HxW")))?;

        Ok(Self {
            id: id.to_string(),
            direction: direction.to_string(),
            height: number("height", height)?,
            width: number("width", width)?,
            column_bytes: number("column bytes", column_bytes)?,
            header_len: number("header length", header_len)?,
        })
    }

    /// Read and parse the first line of `source`.
    ///
    /// The source is rewound first; its position afterwards is unspecified
    /// since every row read seeks absolutely.
    pub fn read_from<R: Read + Seek>(source: &mut R) -> Result<Self, MaskError> {
        source.seek(SeekFrom::Start(0))?;
        let mut line = Vec::new();
        BufReader::new(source.by_ref().take(MAX_HEADER_BYTES)).read_until(b'\n', &mut line)?;
        if line.last() != Some(&b'\n') {
            return Err(MaskError::MalformedHeader("header line is not terminated".into()));
        }

        let text = std::str::from_utf8(&line)
            .map_err(|_| MaskError::MalformedHeader("header is not utf8".into()))?;
        let header = Self::parse(text)?;

        if u64::from(header.header_len) != line.len() as u64 {
            warn!(
                mask = %header.id,
                declared = header.header_len,
                actual = line.len(),
                "mask header length disagrees with header line; row offsets follow the declared value"
            );
        }
        Ok(header)
    }

    /// Byte offset of row `y` from the start of the file.
    pub fn row_offset(&self, y: u32) -> u64 {
        u64::from(self.header_len) + u64::from(self.column_bytes) * u64::from(y)
    }
}

fn number(field: &str, value: &str) -> Result<u32, MaskError> {
    value
        .parse()
        .map_err(|_| MaskError::MalformedHeader(format!("{field} {value:?} is not a number")))
}
