// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Segmentation of a melody into the eight bar windows.
//!
//! Each window records the melody notes sounding in it, weighted by how
//! long they sound there and how strong the metric position is.

use serde::Serialize;
use tracing::warn;

use crate::music::{Melody, MidiNote, PitchClass};

/// Number of bars in every progression
pub const BARS: usize = 8;

const EPSILON: f64 = 1e-9;

/// Metric weight of a position in the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStrength {
    /// Downbeat
    Strong,
    /// Middle of the bar (beat 3 in 4/4)
    Medium,
    /// Other beats
    Weak,
    /// Off-beats
    VeryWeak,
}

impl MetricStrength {
    /// Position strength for a beat offset, given the meter
    pub fn at(beat: f64, beats_per_bar: u8) -> Self {
        let bar = beats_per_bar.max(1) as f64;
        let pos = beat.rem_euclid(bar);
        let near = |target: f64| (pos - target).abs() < EPSILON;

        if near(0.0) || near(bar) {
            MetricStrength::Strong
        } else if beats_per_bar % 2 == 0 && near(bar / 2.0) {
            MetricStrength::Medium
        } else if near(pos.round()) {
            MetricStrength::Weak
        } else {
            MetricStrength::VeryWeak
        }
    }

    /// Multiplier applied to a note's sounding time
    pub fn weight(self) -> f64 {
        match self {
            MetricStrength::Strong => 1.0,
            MetricStrength::Medium => 0.85,
            MetricStrength::Weak => 0.7,
            MetricStrength::VeryWeak => 0.5,
        }
    }
}

/// A melody note as heard inside one window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowNote {
    pub pitch: PitchClass,
    pub midi: MidiNote,
    pub weight: f64,
}

/// One bar-long span of the progression and the melody sounding in it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window {
    index: usize,
    start: f64,
    end: f64,
    notes: Vec<WindowNote>,
}

impl Window {
    /// Zero-based bar index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Start in beats (inclusive)
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End in beats (exclusive)
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length in beats
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Melody notes sounding in the window
    pub fn notes(&self) -> &[WindowNote] {
        &self.notes
    }

    /// True when no melody note sounds in the window
    pub fn is_silent(&self) -> bool {
        self.notes.is_empty()
    }

    /// Distinct pitch classes sounding, ascending
    pub fn pitch_classes(&self) -> Vec<PitchClass> {
        let mut pcs: Vec<PitchClass> = self.notes.iter().map(|n| n.pitch).collect();
        pcs.sort();
        pcs.dedup();
        pcs
    }

    /// Total weight of one pitch class
    pub fn weight_of(&self, pc: PitchClass) -> f64 {
        self.notes
            .iter()
            .filter(|n| n.pitch == pc)
            .map(|n| n.weight)
            .sum()
    }

    /// Total weight of everything sounding
    pub fn total_weight(&self) -> f64 {
        self.notes.iter().map(|n| n.weight).sum()
    }
}

/// Bar length used for a melody: the meter's bar when the melody fits in
/// eight bars, otherwise its length (trailing rests included) split eight
/// ways, rounded up to whole beats
pub fn bar_length(melody: &Melody, beats_per_bar: u8) -> f64 {
    let bar = beats_per_bar.max(1) as f64;
    let span = melody.length_beats();
    if span <= bar * BARS as f64 + EPSILON {
        bar
    } else {
        (span / BARS as f64).ceil()
    }
}

/// Split a melody into the eight bar windows
pub fn segment(melody: &Melody, beats_per_bar: u8) -> Vec<Window> {
    let length = bar_length(melody, beats_per_bar);
    if length > beats_per_bar.max(1) as f64 {
        warn!(
            span = melody.length_beats(),
            bar_length = length,
            "melody is longer than eight bars, stretching windows"
        );
    }

    (0..BARS)
        .map(|index| {
            let start = index as f64 * length;
            let end = start + length;
            let notes = melody
                .notes()
                .iter()
                .filter(|n| n.onset() < end - EPSILON && n.end() > start + EPSILON)
                .map(|n| {
                    let sounding_from = n.onset().max(start);
                    let overlap = n.end().min(end) - sounding_from;
                    let strength = MetricStrength::at(sounding_from, beats_per_bar);
                    WindowNote {
                        pitch: n.pitch(),
                        midi: n.midi(),
                        weight: overlap * strength.weight(),
                    }
                })
                .collect();
            Window {
                index,
                start,
                end,
                notes,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_strength() {
        assert_eq!(MetricStrength::at(0.0, 4), MetricStrength::Strong);
        assert_eq!(MetricStrength::at(4.0, 4), MetricStrength::Strong);
        assert_eq!(MetricStrength::at(2.0, 4), MetricStrength::Medium);
        assert_eq!(MetricStrength::at(1.0, 4), MetricStrength::Weak);
        assert_eq!(MetricStrength::at(1.5, 4), MetricStrength::VeryWeak);
        // No mid-bar accent in 3/4
        assert_eq!(MetricStrength::at(1.5, 3), MetricStrength::VeryWeak);
        assert_eq!(MetricStrength::at(1.0, 3), MetricStrength::Weak);
    }

    #[test]
    fn test_segment_covers_eight_bars() {
        let melody = Melody::parse("C4 E4 G4 C4").unwrap();
        let windows = segment(&melody, 4);
        assert_eq!(windows.len(), BARS);
        for (i, w) in windows.iter().enumerate() {
            assert_eq!(w.index(), i);
            assert_eq!(w.start(), i as f64 * 4.0);
            assert_eq!(w.length(), 4.0);
        }
        assert!(!windows[0].is_silent());
        assert!(windows[1..].iter().all(Window::is_silent));
    }

    #[test]
    fn test_window_weights() {
        let melody = Melody::parse("C4 E4 G4 C4").unwrap();
        let windows = segment(&melody, 4);
        let first = &windows[0];

        assert_eq!(
            first.pitch_classes(),
            vec![PitchClass::C, PitchClass::E, PitchClass::G]
        );
        // C on the downbeat (1.0) and on beat 4 (0.7)
        assert!((first.weight_of(PitchClass::C) - 1.7).abs() < 1e-9);
        assert!((first.weight_of(PitchClass::G) - 0.85).abs() < 1e-9);
        assert!((first.total_weight() - 3.25).abs() < 1e-9);
    }

    #[test]
    fn test_tied_note_sounds_in_both_bars() {
        let melody = Melody::parse("R:3 D4:2").unwrap();
        let windows = segment(&melody, 4);
        assert_eq!(windows[0].pitch_classes(), vec![PitchClass::D]);
        assert_eq!(windows[1].pitch_classes(), vec![PitchClass::D]);
        // Held across the barline, it counts as sounding on the downbeat
        assert!((windows[1].weight_of(PitchClass::D) - 1.0).abs() < 1e-9);
        assert!((windows[0].weight_of(PitchClass::D) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_long_melody_stretches_windows() {
        let melody = Melody::parse("C4:4").unwrap().repeated(12);
        assert_eq!(bar_length(&melody, 4), 6.0);

        let windows = segment(&melody, 4);
        assert_eq!(windows.len(), BARS);
        assert_eq!(windows[7].end(), 48.0);
        assert!(windows.iter().all(|w| !w.is_silent()));
    }

    #[test]
    fn test_trailing_rests_count_toward_bar_length() {
        let melody = Melody::parse("C4:4 R:1").unwrap().repeated(8);
        assert_eq!(melody.span_beats(), 39.0);
        assert_eq!(bar_length(&melody, 4), 5.0);

        let windows = segment(&melody, 4);
        assert_eq!(windows[7].end(), 40.0);
        // Each bar opens with its own C
        assert!(windows
            .iter()
            .all(|w| w.pitch_classes() == vec![PitchClass::C]));
    }
}
