//! Submitted coordinates.
//!
//! Points arrive as text from a form: either one `x:y` value or a separate
//! field per axis. Each coordinate is read as an integer, falling back to a
//! float truncated toward zero (`12.9` becomes `12`). Nothing here checks the
//! point against a mask; negative and oversized values are left for the
//! classifier to reject.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A pixel coordinate as submitted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointError {
    #[error("expected x:y, got {0:?}")]
    MissingSeparator(String),

    #[error("not a coordinate: {0:?}")]
    InvalidCoordinate(String),
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Build a point from one text field per axis.
    pub fn from_parts(x: &str, y: &str) -> Result<Self, PointError> {
        Ok(Self {
            x: coordinate(x)?,
            y: coordinate(y)?,
        })
    }
}

impl FromStr for Point {
    type Err = PointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(':')
            .ok_or_else(|| PointError::MissingSeparator(s.to_string()))?;
        Self::from_parts(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

fn coordinate(text: &str) -> Result<i64, PointError> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Ok(value);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() < i64::MAX as f64 => Ok(value.trunc() as i64),
        _ => Err(PointError::InvalidCoordinate(text.to_string())),
    }
}
