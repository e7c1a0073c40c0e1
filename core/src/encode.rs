//! Writing solution masks.
//!
//! Rows of booleans become `W` (target) and `B` (background) runs. Every row
//! is padded with `0` bytes to the width of the longest encoded row and ends
//! in `\n`; the terminator counts toward `column_bytes`. The header carries
//! its own exact byte length so readers can seek straight to any row.

use thiserror::Error;

use crate::rle::TARGET_COLOR;

const MASK_ID: &str = "3DC";
const DIRECTION: &str = "R";
const BACKGROUND_COLOR: &str = "B";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("row {row} has {found} pixels, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Run-length encode one row of pixels, without padding.
pub fn encode_row(pixels: &[bool]) -> String {
    let mut out = String::new();
    let mut iter = pixels.iter().peekable();
    while let Some(&value) = iter.next() {
        let mut len = 1usize;
        while iter.next_if_eq(&&value).is_some() {
            len += 1;
        }
        let color = if value { TARGET_COLOR } else { BACKGROUND_COLOR };
        out.push_str(&len.to_string());
        out.push_str(color);
    }
    out
}

/// Header line for a mask, with `header_len` solved so that it equals the
/// byte length of the line it is written in.
pub fn forge_header(height: usize, width: usize, column_bytes: usize) -> String {
    let prefix = format!("{MASK_ID} {DIRECTION} {height}x{width} {column_bytes} ");
    // prefix + digits + '\n'; the digit count may grow once the length is added.
    let mut len = prefix.len() + 1;
    loop {
        let total = prefix.len() + len.to_string().len() + 1;
        if total == len {
            return format!("{prefix}{len}\n");
        }
        len = total;
    }
}

/// Encode a complete mask file.
pub fn encode_mask(rows: &[Vec<bool>]) -> Result<Vec<u8>, EncodeError> {
    let width = rows.first().map_or(0, Vec::len);
    if let Some((row, found)) = rows
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|&(_, len)| len != width)
    {
        return Err(EncodeError::RaggedRows {
            row,
            expected: width,
            found,
        });
    }

    let encoded: Vec<String> = rows.iter().map(|r| encode_row(r)).collect();
    let text_width = encoded.iter().map(String::len).max().unwrap_or(0);
    let column_bytes = text_width + 1;

    let mut out = forge_header(rows.len(), width, column_bytes).into_bytes();
    out.reserve(column_bytes * rows.len());
    for row in &encoded {
        out.extend_from_slice(row.as_bytes());
        out.resize(out.len() + text_width - row.len(), b'0');
        out.push(b'\n');
    }
    Ok(out)
}
