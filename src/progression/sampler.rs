// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Surprise-controlled selection among weighted candidates.
//!
//! A single parameter `s` blends three distributions with quadratic
//! Bernstein weights:
//!
//! ```text
//! (1 - s)^2 * argmax + 2s(1 - s) * proportional + s^2 * uniform
//! ```
//!
//! At `s = 0` the best candidate always wins; at `s = 1` every candidate
//! is equally likely. The best candidate's probability never rises with `s`.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

use crate::error::{HarmonizeError, Result};

/// How far the generator may stray from the most expected chord (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Surprise(f64);

impl Surprise {
    /// Always pick the best candidate
    pub const PREDICTABLE: Surprise = Surprise(0.0);
    /// Pick uniformly among the candidates
    pub const UNIFORM: Surprise = Surprise(1.0);

    /// Create a surprise value, clamping into [0, 1]. NaN is rejected.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() {
            return Err(HarmonizeError::InvalidSurprise("NaN".to_string()));
        }
        Ok(Surprise(value.clamp(0.0, 1.0)))
    }

    /// The clamped value
    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Surprise {
    type Err = HarmonizeError;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| HarmonizeError::InvalidSurprise(format!("{:?} is not a number", s)))?;
        Surprise::new(value)
    }
}

impl fmt::Display for Surprise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Weights closer than this to the maximum tie with it
const TIE_TOLERANCE: f64 = 1e-9;

/// Blend combined candidate weights into selection probabilities.
///
/// The argmax component goes to the first of any tied maxima. Negative or
/// non-finite weights count as zero.
pub fn selection_weights(combined: &[f64], surprise: Surprise) -> Vec<f64> {
    selection_weights_preferring(combined, surprise, |_| false)
}

/// Like [`selection_weights`], but the argmax component goes to the first
/// tied maximum that `preferred` accepts, falling back to the first one
pub fn selection_weights_preferring(
    combined: &[f64],
    surprise: Surprise,
    preferred: impl Fn(usize) -> bool,
) -> Vec<f64> {
    let n = combined.len();
    if n == 0 {
        return Vec::new();
    }

    let clean: Vec<f64> = combined
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();
    let total: f64 = clean.iter().sum();
    let uniform = 1.0 / n as f64;

    let top = clean.iter().copied().fold(0.0, f64::max);
    let tied: Vec<usize> = (0..n).filter(|&i| clean[i] >= top - TIE_TOLERANCE).collect();
    let best = tied
        .iter()
        .copied()
        .find(|&i| preferred(i))
        .or_else(|| tied.first().copied())
        .unwrap_or(0);

    let s = surprise.value();
    let greedy = (1.0 - s) * (1.0 - s);
    let proportional = 2.0 * s * (1.0 - s);
    let flat = s * s;

    clean
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let argmax = if i == best { 1.0 } else { 0.0 };
            let share = if total > 0.0 { w / total } else { uniform };
            greedy * argmax + proportional * share + flat * uniform
        })
        .collect()
}

/// Draw an index from unnormalized weights. Zero weights are never drawn.
pub fn sample(weights: &[f64], rng: &mut StdRng) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = rng.gen::<f64>() * total;
    let mut last = None;
    for (i, &weight) in weights.iter().enumerate() {
        if !(weight.is_finite() && weight > 0.0) {
            continue;
        }
        if roll < weight {
            return Some(i);
        }
        roll -= weight;
        last = Some(i);
    }
    // Rounding can leave a sliver past the final bucket
    last
}
