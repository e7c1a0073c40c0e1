//! Point-in-mask classification.
//!
//! # Design
//! The header is read once when a `MaskFile` is opened. Each lookup then
//! rejects out-of-range points before touching storage, seeks to the single
//! row it needs and walks its runs lazily, stopping at the first run that
//! covers `x`. Nothing is cached between lookups.
//!
//! Both range tests are inclusive at the top: `x == width` and
//! `y == height` pass the bounds check, and a run spanning
//! `[lastpos, lastpos + length]` also claims the first pixel of the next run.
//! A pixel on a boundary therefore belongs to the earlier run.

use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;

use tracing::warn;

use crate::error::{MaskError, RowFault};
use crate::header::MaskHeader;
use crate::locator::read_row;
use crate::rle::{RowPolicy, RunDecoder};
use crate::types::Point;

/// Outcome of looking up a point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The point lies outside `[0, width] x [0, height]`.
    OutOfRange,
    /// The first run covering `x`.
    Run { color: String, target: bool },
    /// The row ran out of runs before reaching `x`, or lies past the end
    /// of the stored rows.
    Unmatched,
}

impl Lookup {
    pub fn is_target(&self) -> bool {
        matches!(self, Lookup::Run { target: true, .. })
    }
}

/// Look up `point` in a mask whose header has already been read.
pub fn locate<R: Read + Seek>(
    header: &MaskHeader,
    source: &mut R,
    point: Point,
    policy: RowPolicy,
) -> Result<Lookup, MaskError> {
    let Point { x, y } = point;
    if x < 0 || y < 0 || x > i64::from(header.width) || y > i64::from(header.height) {
        warn!(mask = %header.id, x, y, "pixel position outside range");
        return Ok(Lookup::OutOfRange);
    }
    // Bounded by the height check above.
    let y = y as u32;

    let Some(row) = read_row(header, source, y)? else {
        return Ok(Lookup::Unmatched);
    };
    let malformed = |offset, fault| MaskError::MalformedRow { row: y, offset, fault };

    let mut lastpos: i64 = 0;
    let mut seen = false;
    for run in RunDecoder::new(&row, policy) {
        let run = run.map_err(|e| malformed(e.offset, e.fault))?;
        seen = true;
        let end = lastpos + i64::from(run.length);
        if lastpos <= x && x <= end {
            let target = run.is_target();
            return Ok(Lookup::Run {
                color: run.color,
                target,
            });
        }
        lastpos = end;
    }

    if !seen && policy == RowPolicy::Strict {
        return Err(malformed(0, RowFault::Empty));
    }
    Ok(Lookup::Unmatched)
}

/// True iff `point` falls in a run whose color code is exactly `W`.
pub fn classify<R: Read + Seek>(
    header: &MaskHeader,
    source: &mut R,
    point: Point,
    policy: RowPolicy,
) -> Result<bool, MaskError> {
    locate(header, source, point, policy).map(|lookup| lookup.is_target())
}

/// An open mask: parsed header plus the storage rows are read from.
#[derive(Debug)]
pub struct MaskFile<R> {
    header: MaskHeader,
    source: R,
    policy: RowPolicy,
}

impl MaskFile<File> {
    pub fn open(path: impl AsRef<Path>, policy: RowPolicy) -> Result<Self, MaskError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MaskError::UnknownMask(path.display().to_string()),
            _ => MaskError::Io(e),
        })?;
        Self::from_reader(file, policy)
    }
}

impl<R: Read + Seek> MaskFile<R> {
    pub fn from_reader(mut source: R, policy: RowPolicy) -> Result<Self, MaskError> {
        let header = MaskHeader::read_from(&mut source)?;
        Ok(Self {
            header,
            source,
            policy,
        })
    }

    pub fn header(&self) -> &MaskHeader {
        &self.header
    }

    pub fn read_row(&mut self, y: u32) -> Result<Option<Vec<u8>>, MaskError> {
        read_row(&self.header, &mut self.source, y)
    }

    pub fn locate(&mut self, point: Point) -> Result<Lookup, MaskError> {
        locate(&self.header, &mut self.source, point, self.policy)
    }

    pub fn classify(&mut self, point: Point) -> Result<bool, MaskError> {
        classify(&self.header, &mut self.source, point, self.policy)
    }
}
