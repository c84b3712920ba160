// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Functional harmony: what job a chord does inside a key.

use std::fmt;

use serde::Serialize;

const ROMAN: [&str; 8] = ["?", "I", "II", "III", "IV", "V", "VI", "VII"];

/// Harmonic function of a chord within its key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionalRole {
    Tonic,
    Subdominant,
    Dominant,
    SecondaryDominant,
}

impl FunctionalRole {
    /// All roles, in transition-table order
    pub const ALL: [FunctionalRole; 4] = [
        FunctionalRole::Tonic,
        FunctionalRole::Subdominant,
        FunctionalRole::Dominant,
        FunctionalRole::SecondaryDominant,
    ];

    /// Row/column index in the transition table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Role of a chord built on a 1-based scale degree
    pub fn for_degree(degree: u8) -> Self {
        match degree {
            2 | 4 => FunctionalRole::Subdominant,
            5 | 7 => FunctionalRole::Dominant,
            _ => FunctionalRole::Tonic,
        }
    }

    /// Short label
    pub fn abbreviation(self) -> &'static str {
        match self {
            FunctionalRole::Tonic => "T",
            FunctionalRole::Subdominant => "S",
            FunctionalRole::Dominant => "D",
            FunctionalRole::SecondaryDominant => "SD",
        }
    }
}

impl fmt::Display for FunctionalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Where a vocabulary chord comes from relative to the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChordSource {
    /// Seventh chord on a degree of the key's own scale
    Diatonic { degree: u8 },
    /// Dominant seventh resolving to the chord on `target_degree`
    SecondaryDominant { target_degree: u8 },
    /// Seventh chord on a degree of the parallel mode
    Borrowed { degree: u8 },
}

impl ChordSource {
    /// True for chords of the key's own scale
    pub fn is_diatonic(self) -> bool {
        matches!(self, ChordSource::Diatonic { .. })
    }

    /// Functional role this source implies
    pub fn role(self) -> FunctionalRole {
        match self {
            ChordSource::Diatonic { degree } | ChordSource::Borrowed { degree } => {
                FunctionalRole::for_degree(degree)
            }
            ChordSource::SecondaryDominant { .. } => FunctionalRole::SecondaryDominant,
        }
    }
}

impl fmt::Display for ChordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roman = |degree: u8| ROMAN.get(degree as usize).copied().unwrap_or("?");
        match *self {
            ChordSource::Diatonic { degree } => write!(f, "{}", roman(degree)),
            ChordSource::SecondaryDominant { target_degree } => {
                write!(f, "V/{}", roman(target_degree))
            }
            ChordSource::Borrowed { degree } => write!(f, "b:{}", roman(degree)),
        }
    }
}
