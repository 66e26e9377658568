//! Embedding region shared by embed and extract.
//!
//! The region addresses a rectangular block of the coefficient grid. The same
//! value must be handed to both [`embed`](crate::embed) and
//! [`extract`](crate::extract); nothing in the grid records where a watermark
//! was placed.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WatermarkError};

/// Default region: a 32x32 block whose top-left corner sits at (100, 100).
pub const DEFAULT_REGION: EmbeddingRegion = EmbeddingRegion::square(100, 100, 32);

/// Rectangular coefficient block, addressed as column/row offset plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbeddingRegion {
    /// Column offset of the top-left coefficient
    pub x: u32,
    /// Row offset of the top-left coefficient
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl EmbeddingRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn square(x: u32, y: u32, size: u32) -> Self {
        Self::new(x, y, size, size)
    }

    /// `(x, y)` of the top-left coefficient.
    pub fn offset(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// `(width, height)` of the block.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smallest grid `(width, height)` that contains this region, or `None`
    /// when the far edge overflows `u32`.
    pub fn min_extent(&self) -> Option<(u32, u32)> {
        Some((
            self.x.checked_add(self.width)?,
            self.y.checked_add(self.height)?,
        ))
    }

    /// Whether the region lies entirely inside a `width` x `height` grid.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        match self.min_extent() {
            Some((right, bottom)) => right <= width && bottom <= height,
            None => false,
        }
    }

    /// Fails with a shape error naming both extents when the region does not
    /// fit inside a grid of `dimensions` (`(width, height)`).
    pub fn check_fits(&self, dimensions: (u32, u32), context: &'static str) -> Result<()> {
        if self.fits_within(dimensions.0, dimensions.1) {
            return Ok(());
        }
        Err(WatermarkError::Shape {
            context,
            expected: self.min_extent().unwrap_or((u32::MAX, u32::MAX)),
            actual: dimensions,
        })
    }

    /// Row range in grid index space.
    pub fn rows(&self) -> Range<usize> {
        self.y as usize..(self.y as usize + self.height as usize)
    }

    /// Column range in grid index space.
    pub fn cols(&self) -> Range<usize> {
        self.x as usize..(self.x as usize + self.width as usize)
    }
}

impl fmt::Display for EmbeddingRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// Parses `x,y,width,height`.
impl FromStr for EmbeddingRegion {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let &[x, y, width, height] = parts.as_slice() else {
            return Err(WatermarkError::InvalidParameter(format!(
                "region must be x,y,width,height, got '{s}'"
            )));
        };

        let parse = |name: &str, value: &str| {
            value.parse::<u32>().map_err(|e| {
                WatermarkError::InvalidParameter(format!("region {name} '{value}': {e}"))
            })
        };

        let region = Self::new(
            parse("x", x)?,
            parse("y", y)?,
            parse("width", width)?,
            parse("height", height)?,
        );

        if region.is_empty() {
            return Err(WatermarkError::InvalidParameter(format!(
                "region must have a non-zero size, got '{s}'"
            )));
        }
        if region.min_extent().is_none() {
            return Err(WatermarkError::InvalidParameter(format!(
                "region '{s}' overflows the coordinate range"
            )));
        }

        Ok(region)
    }
}
