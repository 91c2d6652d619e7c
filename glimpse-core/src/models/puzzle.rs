use serde::{Deserialize, Serialize};

use crate::error::GlimpseError;

/// A flattened square grid of pixel intensities in [0, 1].
///
/// Constructed only through [`PixelGrid::from_flat`], which derives the side
/// length and rejects images whose pixel count is zero or not a perfect
/// square.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelGrid {
    pixels: Vec<f32>,
    side: usize,
}

impl PixelGrid {
    pub fn from_flat(pixels: Vec<f32>) -> Result<Self, GlimpseError> {
        let count = pixels.len();
        let side = (count as f64).sqrt().round() as usize;
        if count == 0 || side * side != count {
            return Err(GlimpseError::MalformedPuzzle { pixels: count });
        }
        Ok(Self { pixels, side })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Intensity at (row, col). Callers stay within `side()`; the mask is the
    /// bounds authority for user input.
    pub fn intensity(&self, row: usize, col: usize) -> f32 {
        self.pixels[row * self.side + col]
    }

    pub fn as_flat(&self) -> &[f32] {
        &self.pixels
    }
}

/// Per-cell visibility for one session, `true` = still hidden.
///
/// A cell cleared by [`Mask::reveal`] never returns to hidden within the same
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mask {
    hidden: Vec<bool>,
    side: usize,
}

impl Mask {
    pub fn all_hidden(side: usize) -> Self {
        Self {
            hidden: vec![true; side * side],
            side,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.side && col < self.side
    }

    pub fn is_hidden(&self, row: usize, col: usize) -> Result<bool, GlimpseError> {
        if !self.in_bounds(row, col) {
            return Err(GlimpseError::OutOfBounds {
                row,
                col,
                side: self.side,
            });
        }
        Ok(self.hidden[row * self.side + col])
    }

    /// Clears the hidden bit for a cell. Errors if the cell is out of bounds
    /// or was already revealed.
    pub fn reveal(&mut self, row: usize, col: usize) -> Result<(), GlimpseError> {
        if !self.is_hidden(row, col)? {
            return Err(GlimpseError::AlreadyRevealed { row, col });
        }
        self.hidden[row * self.side + col] = false;
        Ok(())
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.iter().filter(|h| **h).count()
    }
}
