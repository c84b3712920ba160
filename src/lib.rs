// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Jazz harmonization of user melodies.
//!
//! A melody is split into eight bar windows and scored against the seventh
//! chords of its key. A Markov walk over functional roles picks one chord
//! per bar, with a surprise value trading expected choices for unexpected
//! ones. The result is voiced with minimal voice leading and laid out on a
//! comping rhythm, ready for a playback scheduler.

pub mod analysis;
pub mod arrangement;
pub mod config;
pub mod error;
pub mod music;
pub mod pipeline;
pub mod progression;

pub use analysis::{CandidateSet, HarmonicAnalyzer, Vocabulary, Window};
pub use arrangement::{Arrangement, ArrangementEvent, Arranger, MidiEvent, Part, PPQN};
pub use config::HarmonizerConfig;
pub use error::{HarmonizeError, Result};
pub use music::{ChordQuality, ChordTemplate, FunctionalRole, Key, Melody, MelodyNote, Mode, PitchClass};
pub use pipeline::{HarmonizeRequest, Harmonization, Harmonizer};
pub use progression::{Progression, ProgressionBar, ProgressionGenerator, Surprise};
