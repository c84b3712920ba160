// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Harmonic analysis: windows, key, vocabulary and candidate chords.

pub mod candidates;
pub mod key;
pub mod vocabulary;
pub mod window;

pub use candidates::{
    consonance, Candidate, CandidateSet, ConsonanceWeights, Continuity, HarmonicAnalyzer,
};
pub use key::{detect_key, key_fit, pitch_class_profile, KeyDetection, KeyEstimate};
pub use vocabulary::{Vocabulary, VocabularyEntry, VocabularyOptions};
pub use window::{bar_length, segment, MetricStrength, Window, WindowNote, BARS};
