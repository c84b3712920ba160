// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord progressions: one chord per bar over the eight bar windows.

pub mod generator;
pub mod sampler;
pub mod transitions;

use std::fmt;

use serde::Serialize;

use crate::music::{ChordSource, ChordTemplate, FunctionalRole};

pub use generator::{ProgressionGenerator, DEFAULT_CADENCE_WEIGHT};
pub use sampler::{sample, selection_weights, selection_weights_preferring, Surprise};
pub use transitions::TransitionTable;

/// One bar of a progression
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressionBar {
    /// Zero-based bar index
    pub index: usize,
    /// Start in beats
    pub start: f64,
    /// End in beats (exclusive)
    pub end: f64,
    pub chord: ChordTemplate,
    pub role: FunctionalRole,
    pub source: ChordSource,
    /// Consonance score of the chord against the bar's melody
    pub score: f64,
}

/// Chord sequence covering the eight bars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progression {
    bars: Vec<ProgressionBar>,
}

impl Progression {
    pub fn new(bars: Vec<ProgressionBar>) -> Self {
        Self { bars }
    }

    /// Bars in time order
    pub fn bars(&self) -> &[ProgressionBar] {
        &self.bars
    }

    /// Chords in bar order
    pub fn chords(&self) -> Vec<ChordTemplate> {
        self.bars.iter().map(|b| b.chord).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Length of one bar in beats (0.0 when empty)
    pub fn bar_length(&self) -> f64 {
        self.bars.first().map(|b| b.end - b.start).unwrap_or(0.0)
    }

    /// Total span in beats
    pub fn span(&self) -> f64 {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => last.end - first.start,
            _ => 0.0,
        }
    }

    /// True when bars start at zero and each begins where the last ended
    pub fn is_contiguous(&self) -> bool {
        let starts_at_zero = self.bars.first().map(|b| b.start.abs() < 1e-9).unwrap_or(true);
        starts_at_zero
            && self
                .bars
                .windows(2)
                .all(|pair| (pair[1].start - pair[0].end).abs() < 1e-9)
            && self.bars.iter().all(|b| b.end > b.start)
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<String> = self.bars.iter().map(|b| b.chord.symbol()).collect();
        write!(f, "| {} |", symbols.join(" | "))
    }
}
