// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities: pitch classes, scales, chords and melodies.

pub mod chord;
pub mod function;
pub mod melody;
pub mod scale;

pub use chord::{diatonic_sevenths, tones_of, ChordQuality, ChordTemplate};
pub use function::{ChordSource, FunctionalRole};
pub use melody::{Melody, MelodyNote};
pub use scale::{interval_between, root_distance, scale_of, Key, MidiNote, Mode, PitchClass, Scale};
