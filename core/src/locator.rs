//! Random access to encoded rows.
//!
//! Every row occupies exactly `column_bytes` bytes, so row `y` starts at
//! `header_len + column_bytes * y`. No bounds check against the mask height
//! happens here; a row that starts at or past the end of the file reads back
//! as `None`, distinct from a present row that is blank.

use std::io::{Read, Seek, SeekFrom};

use tracing::debug;

use crate::error::MaskError;
use crate::header::MaskHeader;

/// Read row `y`: at most `column_bytes` bytes, cut at the first line break,
/// with the `\n` / `\r\n` terminator removed. `None` when no byte of the row
/// exists in storage.
pub fn read_row<R: Read + Seek>(
    header: &MaskHeader,
    source: &mut R,
    y: u32,
) -> Result<Option<Vec<u8>>, MaskError> {
    let offset = header.row_offset(y);
    source.seek(SeekFrom::Start(offset))?;

    // `column_bytes` comes from the file; the `take` bounds the read.
    let mut row = Vec::new();
    let read = source
        .by_ref()
        .take(u64::from(header.column_bytes))
        .read_to_end(&mut row)?;
    if read == 0 {
        debug!(mask = %header.id, y, offset, "mask row past end of data");
        return Ok(None);
    }

    if let Some(end) = row.iter().position(|&b| b == b'\n') {
        row.truncate(end);
    }
    if row.last() == Some(&b'\r') {
        row.pop();
    }

    debug!(mask = %header.id, y, offset, len = row.len(), "read mask row");
    Ok(Some(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header(column_bytes: u32, header_len: u32) -> MaskHeader {
        MaskHeader {
            id: "t".to_string(),
            direction: "R".to_string(),
            height: 3,
            width: 10,
            column_bytes,
            header_len,
        }
    }

    #[test]
    fn seeks_to_fixed_width_rows() {
        let mut file = Cursor::new(b"HDR\n10W0\n5B5W\n10B0\n".to_vec());
        let h = header(5, 4);
        assert_eq!(read_row(&h, &mut file, 0).unwrap().unwrap(), b"10W0");
        assert_eq!(read_row(&h, &mut file, 1).unwrap().unwrap(), b"5B5W");
        assert_eq!(read_row(&h, &mut file, 2).unwrap().unwrap(), b"10B0");
    }

    #[test]
    fn unterminated_rows_are_cut_at_column_width() {
        let mut file = Cursor::new(b"HDR\n10W0005B5W010B0".to_vec());
        let h = header(5, 4);
        assert_eq!(read_row(&h, &mut file, 0).unwrap().unwrap(), b"10W00");
        assert_eq!(read_row(&h, &mut file, 1).unwrap().unwrap(), b"05B5W");
        assert_eq!(read_row(&h, &mut file, 2).unwrap().unwrap(), b"010B0");
    }

    #[test]
    fn crlf_terminator_is_stripped() {
        let mut file = Cursor::new(b"HDR\n10W\r\n".to_vec());
        assert_eq!(read_row(&header(5, 4), &mut file, 0).unwrap().unwrap(), b"10W");
    }

    #[test]
    fn row_past_end_is_absent() {
        let mut file = Cursor::new(b"HDR\n10W\n".to_vec());
        assert_eq!(read_row(&header(4, 4), &mut file, 1).unwrap(), None);
        assert_eq!(read_row(&header(4, 4), &mut file, 9).unwrap(), None);
    }

    #[test]
    fn blank_row_is_present_but_empty() {
        let mut file = Cursor::new(b"HDR\n\n".to_vec());
        assert_eq!(read_row(&header(4, 4), &mut file, 0).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn huge_declared_width_reads_only_available_bytes() {
        let mut file = Cursor::new(b"HDR\n10W\n".to_vec());
        let row = read_row(&header(u32::MAX, 4), &mut file, 0).unwrap().unwrap();
        assert_eq!(row, b"10W");
        assert!(row.capacity() < 4096);
    }
}
