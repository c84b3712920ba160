// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Seventh-chord qualities and chord templates.
//!
//! A chord template is a root plus a quality; its tones come from a fixed
//! interval set per quality. Diatonic chords are built by stacking thirds
//! on a scale degree and classifying the result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::scale::{PitchClass, Scale, Semitones};
use crate::error::{HarmonizeError, Result};

/// Four-note chord qualities used in jazz harmony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major7,
    Minor7,
    Dominant7,
    HalfDiminished7,
    Diminished7,
    MinorMajor7,
    AugmentedMajor7,
}

impl ChordQuality {
    /// All qualities
    pub const ALL: [ChordQuality; 7] = [
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Dominant7,
        ChordQuality::HalfDiminished7,
        ChordQuality::Diminished7,
        ChordQuality::MinorMajor7,
        ChordQuality::AugmentedMajor7,
    ];

    /// Semitones above the root (root, third, fifth, seventh)
    pub fn intervals(self) -> [u8; 4] {
        match self {
            ChordQuality::Major7 => [0, 4, 7, 11],
            ChordQuality::Minor7 => [0, 3, 7, 10],
            ChordQuality::Dominant7 => [0, 4, 7, 10],
            ChordQuality::HalfDiminished7 => [0, 3, 6, 10],
            ChordQuality::Diminished7 => [0, 3, 6, 9],
            ChordQuality::MinorMajor7 => [0, 3, 7, 11],
            ChordQuality::AugmentedMajor7 => [0, 4, 8, 11],
        }
    }

    /// Classify a stacked-thirds interval set
    pub fn from_intervals(intervals: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.intervals() == intervals)
    }

    /// Available tensions in semitones above the root (9ths, 11ths, 13ths)
    pub fn tensions(self) -> &'static [u8] {
        match self {
            ChordQuality::Major7 => &[2, 6, 9],
            ChordQuality::Minor7 => &[2, 5, 9],
            ChordQuality::Dominant7 => &[1, 2, 3, 6, 9],
            ChordQuality::HalfDiminished7 => &[2, 5, 8],
            // A whole step above each chord tone
            ChordQuality::Diminished7 => &[2, 5, 8, 11],
            ChordQuality::MinorMajor7 => &[2, 5, 9],
            ChordQuality::AugmentedMajor7 => &[2, 6],
        }
    }

    /// Chord-symbol suffix
    pub fn symbol(self) -> &'static str {
        match self {
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Dominant7 => "7",
            ChordQuality::HalfDiminished7 => "m7b5",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::MinorMajor7 => "mMaj7",
            ChordQuality::AugmentedMajor7 => "maj7#5",
        }
    }

    /// Diminished-fifth qualities; nothing gets a secondary dominant aimed at them
    pub fn is_diminished(self) -> bool {
        matches!(self, ChordQuality::HalfDiminished7 | ChordQuality::Diminished7)
    }
}

impl FromStr for ChordQuality {
    type Err = HarmonizeError;

    /// Accepts the usual lead-sheet spellings ("maj7", "Δ", "-7", "ø", ...)
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "maj7" | "ma7" | "MA7" | "M7" | "Δ" | "Δ7" => Ok(ChordQuality::Major7),
            "m7" | "mi7" | "min7" | "-7" => Ok(ChordQuality::Minor7),
            "7" | "dom7" => Ok(ChordQuality::Dominant7),
            "m7b5" | "ø" | "ø7" | "hdim7" | "-7b5" => Ok(ChordQuality::HalfDiminished7),
            "dim7" | "o7" | "°7" | "dim" => Ok(ChordQuality::Diminished7),
            "mMaj7" | "m(maj7)" | "-Δ7" => Ok(ChordQuality::MinorMajor7),
            "maj7#5" | "+maj7" | "Δ#5" => Ok(ChordQuality::AugmentedMajor7),
            _ => Err(HarmonizeError::InvalidChordSymbol(format!(
                "unknown chord quality {:?}",
                s
            ))),
        }
    }
}

/// A chord: root pitch class plus quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordTemplate {
    root: PitchClass,
    quality: ChordQuality,
}

impl ChordTemplate {
    /// Create a chord template
    pub fn new(root: PitchClass, quality: ChordQuality) -> Self {
        Self { root, quality }
    }

    /// Dominant seventh a fifth above `target`
    pub fn dominant_of(target: PitchClass) -> Self {
        Self::new(target.transpose(7), ChordQuality::Dominant7)
    }

    /// Get the root
    pub fn root(&self) -> PitchClass {
        self.root
    }

    /// Get the quality
    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    /// The four chord tones, root first
    pub fn tones(&self) -> [PitchClass; 4] {
        self.quality
            .intervals()
            .map(|i| self.root.transpose(i as Semitones))
    }

    /// Check whether a pitch class is a chord tone
    pub fn contains(&self, pc: PitchClass) -> bool {
        self.tones().contains(&pc)
    }

    /// Check whether a pitch class is an available tension (never a chord tone)
    pub fn has_tension(&self, pc: PitchClass) -> bool {
        self.quality
            .tensions()
            .iter()
            .any(|&t| self.root.transpose(t as Semitones) == pc)
    }

    /// Chord symbol such as "Dm7" or "Bbmaj7"
    pub fn symbol(&self) -> String {
        format!("{}{}", self.root, self.quality.symbol())
    }
}

impl fmt::Display for ChordTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality.symbol())
    }
}

impl FromStr for ChordTemplate {
    type Err = HarmonizeError;

    /// Parse a chord symbol ("Cmaj7", "F#m7b5", "Bb7")
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.char_indices();
        let Some((_, letter)) = chars.next() else {
            return Err(HarmonizeError::InvalidChordSymbol("empty chord symbol".to_string()));
        };
        if !letter.is_ascii_alphabetic() {
            return Err(HarmonizeError::InvalidChordSymbol(format!(
                "{:?} does not start with a note letter",
                s
            )));
        }

        let split = match chars.next() {
            Some((i, '#')) | Some((i, 'b')) => i + 1,
            Some((i, _)) => i,
            None => s.len(),
        };

        let root: PitchClass = s[..split].parse()?;
        let quality: ChordQuality = s[split..].parse()?;
        Ok(ChordTemplate::new(root, quality))
    }
}

/// The four pitch classes of a chord template
pub fn tones_of(chord: &ChordTemplate) -> [PitchClass; 4] {
    chord.tones()
}

/// Seventh chord built on a 1-based scale degree, if the stack classifies
pub fn diatonic_seventh(scale: &Scale, degree: usize) -> Option<ChordTemplate> {
    let root = scale.note_at_degree(degree)?;
    let quality = ChordQuality::from_intervals(scale.stacked_thirds(degree)?)?;
    Some(ChordTemplate::new(root, quality))
}

/// All diatonic seventh chords of a scale, paired with their degree
pub fn diatonic_sevenths(scale: &Scale) -> Vec<(usize, ChordTemplate)> {
    (1..=7)
        .filter_map(|degree| diatonic_seventh(scale, degree).map(|chord| (degree, chord)))
        .collect()
}
