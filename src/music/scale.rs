// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch classes, diatonic modes, scales and keys.
//!
//! Everything here is pure lookup: building a scale, measuring intervals
//! and relating keys never fails except on out-of-range pitch input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarmonizeError, Result};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Semitone offset type
pub type Semitones = i32;

/// Pitch classes, semitones above C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Semitones above C (0-11)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Pitch class from a semitone index, rejecting values outside 0-11
    pub fn from_index(index: i32) -> Result<Self> {
        if (0..12).contains(&index) {
            Ok(Self::ALL[index as usize])
        } else {
            Err(HarmonizeError::InvalidPitchClass(index))
        }
    }

    /// Pitch class from any semitone count, wrapping into the octave
    pub fn wrapping(semitones: Semitones) -> Self {
        Self::ALL[semitones.rem_euclid(12) as usize]
    }

    /// Pitch class of a MIDI note
    pub fn of_midi(note: MidiNote) -> Self {
        Self::ALL[(note % 12) as usize]
    }

    /// Transpose by semitones
    pub fn transpose(self, semitones: Semitones) -> Self {
        Self::wrapping(self.index() as Semitones + semitones)
    }

    /// Ascending interval in semitones to another pitch class (0-11)
    pub fn interval_to(self, other: PitchClass) -> u8 {
        (other.index() as i16 - self.index() as i16).rem_euclid(12) as u8
    }

    /// Smallest semitone distance in either direction (0-6)
    pub fn distance_to(self, other: PitchClass) -> u8 {
        let up = self.interval_to(other);
        up.min(12 - up)
    }

    /// Jazz chart spelling (flats for the black keys except F#)
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "Db",
            PitchClass::D => "D",
            PitchClass::Ds => "Eb",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "Ab",
            PitchClass::A => "A",
            PitchClass::As => "Bb",
            PitchClass::B => "B",
        }
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = HarmonizeError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_index(value as i32)
    }
}

impl FromStr for PitchClass {
    type Err = HarmonizeError;

    /// Parse "C", "C#", "Cs", "Db", "Bb" and friends
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "C" | "B#" | "BS" => Ok(PitchClass::C),
            "C#" | "CS" | "DB" => Ok(PitchClass::Cs),
            "D" => Ok(PitchClass::D),
            "D#" | "DS" | "EB" => Ok(PitchClass::Ds),
            "E" | "FB" => Ok(PitchClass::E),
            "F" | "E#" | "ES" => Ok(PitchClass::F),
            "F#" | "FS" | "GB" => Ok(PitchClass::Fs),
            "G" => Ok(PitchClass::G),
            "G#" | "GS" | "AB" => Ok(PitchClass::Gs),
            "A" => Ok(PitchClass::A),
            "A#" | "AS" | "BB" => Ok(PitchClass::As),
            "B" | "CB" => Ok(PitchClass::B),
            _ => Err(HarmonizeError::InvalidNoteName(s.to_string())),
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ascending semitone distance from `a` to `b`
pub fn interval_between(a: PitchClass, b: PitchClass) -> u8 {
    a.interval_to(b)
}

/// Smallest semitone distance between two roots, either direction
pub fn root_distance(a: PitchClass, b: PitchClass) -> u8 {
    a.distance_to(b)
}

/// Seven-note modes the harmonizer can work in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    // Major scale and its modes
    Major,        // Ionian
    Dorian,       // Minor with raised 6th
    Phrygian,     // Minor with lowered 2nd
    Lydian,       // Major with raised 4th
    Mixolydian,   // Major with lowered 7th
    NaturalMinor, // Aeolian
    Locrian,      // Diminished

    // Other minor scales
    HarmonicMinor,
    MelodicMinor, // Jazz (ascending) form
}

impl Mode {
    /// All supported modes
    pub const ALL: [Mode; 9] = [
        Mode::Major,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
        Mode::NaturalMinor,
        Mode::Locrian,
        Mode::HarmonicMinor,
        Mode::MelodicMinor,
    ];

    /// Semitones from the tonic for each of the seven degrees
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => [0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => [0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
            Mode::NaturalMinor => [0, 2, 3, 5, 7, 8, 10],
            Mode::Locrian => [0, 1, 3, 5, 6, 8, 10],
            Mode::HarmonicMinor => [0, 2, 3, 5, 7, 8, 11],
            Mode::MelodicMinor => [0, 2, 3, 5, 7, 9, 11],
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::NaturalMinor => "minor",
            Mode::Locrian => "locrian",
            Mode::HarmonicMinor => "harmonic minor",
            Mode::MelodicMinor => "melodic minor",
        }
    }

    /// True when the third degree is a major third
    pub fn has_major_third(self) -> bool {
        self.intervals()[2] == 4
    }

    /// Parallel mode used for borrowed chords (major <-> natural minor)
    pub fn parallel(self) -> Mode {
        if self.has_major_third() {
            Mode::NaturalMinor
        } else {
            Mode::Major
        }
    }

    /// How readily a jazz tune sits in this mode, used when inferring a key
    pub fn preference(self) -> f64 {
        match self {
            Mode::Major => 1.0,
            Mode::NaturalMinor => 0.9,
            Mode::Dorian => 0.85,
            Mode::Mixolydian => 0.85,
            Mode::MelodicMinor => 0.8,
            Mode::HarmonicMinor => 0.8,
            Mode::Lydian => 0.7,
            Mode::Phrygian => 0.5,
            Mode::Locrian => 0.3,
        }
    }
}

impl FromStr for Mode {
    type Err = HarmonizeError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match normalized.as_str() {
            "major" | "ionian" | "maj" => Ok(Mode::Major),
            "dorian" => Ok(Mode::Dorian),
            "phrygian" => Ok(Mode::Phrygian),
            "lydian" => Ok(Mode::Lydian),
            "mixolydian" => Ok(Mode::Mixolydian),
            "minor" | "naturalminor" | "aeolian" | "min" => Ok(Mode::NaturalMinor),
            "locrian" => Ok(Mode::Locrian),
            "harmonicminor" => Ok(Mode::HarmonicMinor),
            "melodicminor" | "jazzminor" => Ok(Mode::MelodicMinor),
            _ => Err(HarmonizeError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A diatonic scale: a root, a mode and its seven pitch classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scale {
    root: PitchClass,
    mode: Mode,
    notes: [PitchClass; 7],
}

impl Scale {
    /// Build the scale for a root and mode
    pub fn new(root: PitchClass, mode: Mode) -> Self {
        let notes = mode.intervals().map(|i| root.transpose(i as Semitones));
        Self { root, mode, notes }
    }

    /// Get the root
    pub fn root(&self) -> PitchClass {
        self.root
    }

    /// Get the mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The seven pitch classes, tonic first
    pub fn notes(&self) -> &[PitchClass; 7] {
        &self.notes
    }

    /// Check if a pitch class is in this scale
    pub fn contains(&self, pc: PitchClass) -> bool {
        self.notes.contains(&pc)
    }

    /// Get the scale degree (1-based) for a pitch class, if it's in the scale
    pub fn degree_of(&self, pc: PitchClass) -> Option<usize> {
        self.notes.iter().position(|&n| n == pc).map(|i| i + 1)
    }

    /// Get the pitch class at a scale degree (1-based)
    pub fn note_at_degree(&self, degree: usize) -> Option<PitchClass> {
        if degree == 0 || degree > self.notes.len() {
            return None;
        }
        Some(self.notes[degree - 1])
    }

    /// Intervals above the degree's note when stacking diatonic thirds
    /// (root, third, fifth, seventh)
    pub fn stacked_thirds(&self, degree: usize) -> Option<[u8; 4]> {
        if degree == 0 || degree > self.notes.len() {
            return None;
        }
        let base = degree - 1;
        let root = self.notes[base];
        Some([0, 2, 4, 6].map(|step| root.interval_to(self.notes[(base + step) % 7])))
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.mode)
    }
}

/// The diatonic pitch-class set for a root and mode
pub fn scale_of(root: PitchClass, mode: Mode) -> Scale {
    Scale::new(root, mode)
}

/// A musical key: tonic plus mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key {
    tonic: PitchClass,
    mode: Mode,
    #[serde(skip)]
    scale: Scale,
}

impl Key {
    /// Create a new key
    pub fn new(tonic: PitchClass, mode: Mode) -> Self {
        Self {
            tonic,
            mode,
            scale: Scale::new(tonic, mode),
        }
    }

    /// Parse a key from a tonic name and a mode name
    pub fn parse(tonic: &str, mode: &str) -> Result<Self> {
        Ok(Key::new(tonic.parse()?, mode.parse()?))
    }

    /// Get the tonic
    pub fn tonic(&self) -> PitchClass {
        self.tonic
    }

    /// Get the mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get the scale
    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    /// Transpose the key by semitones
    pub fn transpose(&self, semitones: Semitones) -> Self {
        Key::new(self.tonic.transpose(semitones), self.mode)
    }

    /// Relative key (C major <-> A minor)
    pub fn relative(&self) -> Option<Key> {
        match self.mode {
            Mode::Major => Some(Key::new(self.tonic.transpose(-3), Mode::NaturalMinor)),
            Mode::NaturalMinor => Some(Key::new(self.tonic.transpose(3), Mode::Major)),
            _ => None,
        }
    }

    /// Parallel key, same tonic in the parallel mode
    pub fn parallel(&self) -> Key {
        Key::new(self.tonic, self.mode.parallel())
    }

    /// Get the dominant key (V)
    pub fn dominant(&self) -> Key {
        Key::new(self.tonic.transpose(7), self.mode)
    }

    /// Get the subdominant key (IV)
    pub fn subdominant(&self) -> Key {
        Key::new(self.tonic.transpose(5), self.mode)
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::new(PitchClass::C, Mode::Major)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_index() {
        assert_eq!(PitchClass::C.index(), 0);
        assert_eq!(PitchClass::A.index(), 9);
        assert_eq!(PitchClass::B.index(), 11);
    }

    #[test]
    fn test_pitch_class_rejects_out_of_range() {
        assert_eq!(PitchClass::from_index(7), Ok(PitchClass::G));
        assert_eq!(
            PitchClass::from_index(12),
            Err(HarmonizeError::InvalidPitchClass(12))
        );
        assert_eq!(
            PitchClass::from_index(-1),
            Err(HarmonizeError::InvalidPitchClass(-1))
        );
        assert!(PitchClass::try_from(200u8).is_err());
    }

    #[test]
    fn test_pitch_class_from_str() {
        assert_eq!("C".parse::<PitchClass>(), Ok(PitchClass::C));
        assert_eq!("C#".parse::<PitchClass>(), Ok(PitchClass::Cs));
        assert_eq!("Db".parse::<PitchClass>(), Ok(PitchClass::Cs));
        assert_eq!("F#".parse::<PitchClass>(), Ok(PitchClass::Fs));
        assert_eq!("Bb".parse::<PitchClass>(), Ok(PitchClass::As));
        assert!("X".parse::<PitchClass>().is_err());
    }

    #[test]
    fn test_pitch_class_transpose() {
        assert_eq!(PitchClass::C.transpose(2), PitchClass::D);
        assert_eq!(PitchClass::C.transpose(12), PitchClass::C);
        assert_eq!(PitchClass::C.transpose(-1), PitchClass::B);
        assert_eq!(PitchClass::G.transpose(5), PitchClass::C);
    }

    #[test]
    fn test_intervals_and_distance() {
        assert_eq!(interval_between(PitchClass::C, PitchClass::G), 7);
        assert_eq!(interval_between(PitchClass::C, PitchClass::C), 0);
        assert_eq!(interval_between(PitchClass::G, PitchClass::C), 5);

        assert_eq!(root_distance(PitchClass::C, PitchClass::G), 5);
        assert_eq!(root_distance(PitchClass::C, PitchClass::B), 1);
        assert_eq!(root_distance(PitchClass::C, PitchClass::Fs), 6);
    }

    #[test]
    fn test_every_mode_has_seven_distinct_notes() {
        for root in PitchClass::ALL {
            for mode in Mode::ALL {
                let scale = scale_of(root, mode);
                let mut notes = scale.notes().to_vec();
                notes.sort();
                notes.dedup();
                assert_eq!(notes.len(), 7, "{} has duplicate notes", scale);
            }
        }
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("major".parse::<Mode>(), Ok(Mode::Major));
        assert_eq!("Minor".parse::<Mode>(), Ok(Mode::NaturalMinor));
        assert_eq!("harmonic_minor".parse::<Mode>(), Ok(Mode::HarmonicMinor));
        assert_eq!("melodic-minor".parse::<Mode>(), Ok(Mode::MelodicMinor));
        assert!("blues".parse::<Mode>().is_err());
    }

    #[test]
    fn test_scale_notes() {
        let c_major = Scale::new(PitchClass::C, Mode::Major);
        assert_eq!(
            c_major.notes(),
            &[
                PitchClass::C,
                PitchClass::D,
                PitchClass::E,
                PitchClass::F,
                PitchClass::G,
                PitchClass::A,
                PitchClass::B
            ]
        );
        assert!(c_major.contains(PitchClass::G));
        assert!(!c_major.contains(PitchClass::Fs));
        assert_eq!(c_major.degree_of(PitchClass::E), Some(3));
        assert_eq!(c_major.note_at_degree(5), Some(PitchClass::G));
        assert_eq!(c_major.note_at_degree(0), None);
        assert_eq!(c_major.note_at_degree(8), None);
    }

    #[test]
    fn test_stacked_thirds() {
        let c_major = Scale::new(PitchClass::C, Mode::Major);
        assert_eq!(c_major.stacked_thirds(1), Some([0, 4, 7, 11]));
        assert_eq!(c_major.stacked_thirds(5), Some([0, 4, 7, 10]));
        assert_eq!(c_major.stacked_thirds(7), Some([0, 3, 6, 10]));
        assert_eq!(c_major.stacked_thirds(8), None);
    }

    #[test]
    fn test_key_relations() {
        let c_major = Key::new(PitchClass::C, Mode::Major);
        assert_eq!(c_major.dominant().tonic(), PitchClass::G);
        assert_eq!(c_major.subdominant().tonic(), PitchClass::F);
        assert_eq!(c_major.transpose(2).tonic(), PitchClass::D);

        let relative = c_major.relative().unwrap();
        assert_eq!(relative.tonic(), PitchClass::A);
        assert_eq!(relative.mode(), Mode::NaturalMinor);

        let parallel = c_major.parallel();
        assert_eq!(parallel.tonic(), PitchClass::C);
        assert_eq!(parallel.mode(), Mode::NaturalMinor);

        assert_eq!(Key::new(PitchClass::D, Mode::Dorian).parallel().mode(), Mode::Major);
    }

    #[test]
    fn test_key_parse() {
        let key = Key::parse("Bb", "major").unwrap();
        assert_eq!(key.tonic(), PitchClass::As);
        assert_eq!(key.to_string(), "Bb major");

        assert!(Key::parse("H", "major").is_err());
        assert!(Key::parse("C", "bebop").is_err());
    }
}
