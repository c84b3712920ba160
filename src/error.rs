// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the harmonization pipeline.

use thiserror::Error;

/// Errors reported by the harmonization pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarmonizeError {
    /// Empty melody or a malformed note
    #[error("invalid melody: {0}")]
    InvalidMelody(String),

    /// Surprise value that is not a number (out-of-range values are clamped instead)
    #[error("invalid surprise value: {0}")]
    InvalidSurprise(String),

    /// No chord could be produced for a window (only possible with an empty vocabulary)
    #[error("no chord could be resolved for window {window}: {reason}")]
    UnresolvableWindow { window: usize, reason: String },

    /// Pitch class outside 0-11
    #[error("pitch class {0} is outside 0-11")]
    InvalidPitchClass(i32),

    /// Note or pitch name that could not be parsed
    #[error("invalid note name: {0:?}")]
    InvalidNoteName(String),

    /// Chord symbol with an unknown quality suffix
    #[error("invalid chord symbol: {0}")]
    InvalidChordSymbol(String),

    /// Mode name that is not recognized
    #[error("unknown mode: {0:?}")]
    UnknownMode(String),

    /// Configuration value that makes no sense
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, HarmonizeError>;
