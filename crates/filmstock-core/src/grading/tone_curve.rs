//! Per-channel contrast curves baked into 256-entry lookup tables.
//!
//! # Curves
//! ```text
//! Lift:    out = lift + (in / 255) × (255 − lift)
//! Sigmoid: out = clamp((255 / (1 + e^(−k × (in / 255 − 0.5))) − offset) × gain)
//! ```
//! Lift raises the black floor and compresses the range upward. Sigmoid is an
//! S-curve whose floor sits slightly above zero once offset and gain are applied.
//!
//! # Complexity
//! - Build: O(256)
//! - Apply: one table lookup per channel

use serde::{Deserialize, Serialize};

/// Curve shape and its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToneCurveKind {
    /// Linear black-point lift.
    Lift {
        /// Output value for input 0.
        black_lift: f32,
    },
    /// Logistic S-curve.
    Sigmoid {
        /// Logistic steepness `k`.
        steepness: f32,
        /// Subtracted from the 8-bit logistic output.
        offset: f32,
        /// Multiplier applied after the offset.
        gain: f32,
    },
}

impl ToneCurveKind {
    /// Evaluate the curve for one 8-bit input, before quantization.
    pub fn evaluate(&self, input: u8) -> f32 {
        let x = input as f32 / 255.0;
        match *self {
            Self::Lift { black_lift } => black_lift + x * (255.0 - black_lift),
            Self::Sigmoid {
                steepness,
                offset,
                gain,
            } => {
                let logistic = 1.0 / (1.0 + (-steepness * (x - 0.5)).exp());
                (logistic * 255.0 - offset) * gain
            }
        }
    }

    /// Returns `true` if every parameter is finite.
    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Lift { black_lift } => black_lift.is_finite(),
            Self::Sigmoid {
                steepness,
                offset,
                gain,
            } => steepness.is_finite() && offset.is_finite() && gain.is_finite(),
        }
    }
}

/// A baked 8-bit → 8-bit lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneCurve {
    table: [u8; 256],
}

impl ToneCurve {
    /// Bake a curve. Values are rounded to nearest and clamped to `0..=255`.
    pub fn build(kind: &ToneCurveKind) -> Self {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = kind.evaluate(i as u8).round().clamp(0.0, 255.0) as u8;
        }
        Self { table }
    }

    /// Look up one channel value.
    #[inline]
    pub fn map(&self, value: u8) -> u8 {
        self.table[value as usize]
    }

    /// Look up an RGB triple.
    #[inline]
    pub fn map_rgb(&self, rgb: [u8; 3]) -> [u8; 3] {
        [self.map(rgb[0]), self.map(rgb[1]), self.map(rgb[2])]
    }

    /// Apply the curve to the RGB channels of an interleaved RGBA8 slice in place.
    /// Alpha is left untouched.
    pub fn apply_to_rgba(&self, data: &mut [u8]) {
        for px in data.chunks_exact_mut(4) {
            px[0] = self.map(px[0]);
            px[1] = self.map(px[1]);
            px[2] = self.map(px[2]);
        }
    }

    /// The baked table.
    pub fn table(&self) -> &[u8; 256] {
        &self.table
    }
}
