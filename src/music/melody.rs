// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Melody input: timed notes and a compact text form for them.

use std::fmt;

use serde::Serialize;

use super::scale::{MidiNote, PitchClass};
use crate::error::{HarmonizeError, Result};

/// Default velocity for melody notes
pub const DEFAULT_VELOCITY: u8 = 80;

/// One melody note; immutable once created
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MelodyNote {
    pitch: PitchClass,
    octave: i8,
    onset: f64,
    duration: f64,
    velocity: u8,
}

impl MelodyNote {
    /// Create a note. Onset and duration are in beats; octave uses the
    /// MIDI convention (middle C = C4 = 60).
    pub fn new(pitch: PitchClass, octave: i8, onset: f64, duration: f64) -> Result<Self> {
        if !onset.is_finite() || onset < 0.0 {
            return Err(HarmonizeError::InvalidMelody(format!(
                "note onset {} must be a non-negative number of beats",
                onset
            )));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(HarmonizeError::InvalidMelody(format!(
                "note duration {} must be a positive number of beats",
                duration
            )));
        }
        let midi = (octave as i16 + 1) * 12 + pitch.index() as i16;
        if !(0..=127).contains(&midi) {
            return Err(HarmonizeError::InvalidMelody(format!(
                "{}{} is outside the MIDI range",
                pitch, octave
            )));
        }

        Ok(Self {
            pitch,
            octave,
            onset,
            duration,
            velocity: DEFAULT_VELOCITY,
        })
    }

    /// Create a note from a MIDI note number
    pub fn from_midi(note: MidiNote, onset: f64, duration: f64) -> Result<Self> {
        let octave = (note / 12) as i8 - 1;
        Self::new(PitchClass::of_midi(note), octave, onset, duration)
    }

    /// Parse scientific pitch notation ("C4", "Eb5", "F#3", "A-1")
    pub fn parse(name: &str, onset: f64, duration: f64) -> Result<Self> {
        let name = name.trim();
        let split = name
            .char_indices()
            .find(|&(i, c)| i > 0 && (c.is_ascii_digit() || c == '-'))
            .map(|(i, _)| i)
            .ok_or_else(|| HarmonizeError::InvalidNoteName(name.to_string()))?;

        let pitch: PitchClass = name[..split].parse()?;
        let octave: i8 = name[split..]
            .parse()
            .map_err(|_| HarmonizeError::InvalidNoteName(name.to_string()))?;
        Self::new(pitch, octave, onset, duration)
    }

    /// Set the velocity (clamped to 1-127)
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity.clamp(1, 127);
        self
    }

    /// Get the pitch class
    pub fn pitch(&self) -> PitchClass {
        self.pitch
    }

    /// Get the octave
    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Onset in beats
    pub fn onset(&self) -> f64 {
        self.onset
    }

    /// Duration in beats
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// End of the note in beats
    pub fn end(&self) -> f64 {
        self.onset + self.duration
    }

    /// Get the velocity
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// MIDI note number
    pub fn midi(&self) -> MidiNote {
        ((self.octave as i16 + 1) * 12 + self.pitch.index() as i16) as MidiNote
    }

    fn shifted(&self, beats: f64) -> Self {
        Self {
            onset: self.onset + beats,
            ..*self
        }
    }
}

impl fmt::Display for MelodyNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} (beat {:.2}, dur {:.2})",
            self.pitch, self.octave, self.onset, self.duration
        )
    }
}

/// A non-empty melody, notes ordered by onset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Melody {
    notes: Vec<MelodyNote>,
    /// Beats from time zero to the end of the melody, trailing rests included
    length: f64,
}

impl Melody {
    /// Create a melody; an empty note list is rejected
    pub fn new(mut notes: Vec<MelodyNote>) -> Result<Self> {
        if notes.is_empty() {
            return Err(HarmonizeError::InvalidMelody(
                "melody has no notes".to_string(),
            ));
        }
        notes.sort_by(|a, b| a.onset.total_cmp(&b.onset));
        let length = notes.iter().map(MelodyNote::end).fold(0.0, f64::max);
        Ok(Self { notes, length })
    }

    /// Extend the melody with silence so it lasts at least `beats`
    pub fn with_length(mut self, beats: f64) -> Self {
        if beats.is_finite() {
            self.length = self.length.max(beats);
        }
        self
    }

    /// Parse the compact text form: whitespace-separated `PITCH[:BEATS]`
    /// tokens laid end to end, `R` for a rest. Duration defaults to one beat.
    ///
    /// `"C4:1 E4:1 R:2 G4:0.5"`
    ///
    /// Trailing rests count toward the melody's length.
    pub fn parse(text: &str) -> Result<Self> {
        let mut notes = Vec::new();
        let mut cursor = 0.0;

        for token in text.split_whitespace() {
            let (name, beats) = match token.split_once(':') {
                Some((name, beats)) => {
                    let beats: f64 = beats.parse().map_err(|_| {
                        HarmonizeError::InvalidMelody(format!("bad duration in {:?}", token))
                    })?;
                    (name, beats)
                }
                None => (token, 1.0),
            };
            if !beats.is_finite() || beats <= 0.0 {
                return Err(HarmonizeError::InvalidMelody(format!(
                    "bad duration in {:?}",
                    token
                )));
            }

            if !name.eq_ignore_ascii_case("r") {
                notes.push(MelodyNote::parse(name, cursor, beats)?);
            }
            cursor += beats;
        }

        Ok(Self::new(notes)?.with_length(cursor))
    }

    /// The melody played `times` times end to end, one length apart
    pub fn repeated(&self, times: usize) -> Self {
        let times = times.max(1);
        let period = self.length;
        let notes = (0..times)
            .flat_map(|i| self.notes.iter().map(move |n| n.shifted(period * i as f64)))
            .collect();
        Self {
            notes,
            length: period * times as f64,
        }
    }

    /// Get the notes
    pub fn notes(&self) -> &[MelodyNote] {
        &self.notes
    }

    /// Number of notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Beats from time zero to the end of the last-sounding note
    pub fn span_beats(&self) -> f64 {
        self.notes.iter().map(MelodyNote::end).fold(0.0, f64::max)
    }

    /// Beats from time zero to the end of the melody, trailing rests included
    pub fn length_beats(&self) -> f64 {
        self.length
    }

    /// The note that sounds last (by onset)
    pub fn last(&self) -> Option<&MelodyNote> {
        self.notes.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_parse() {
        let note = MelodyNote::parse("C4", 0.0, 1.0).unwrap();
        assert_eq!(note.pitch(), PitchClass::C);
        assert_eq!(note.octave(), 4);
        assert_eq!(note.midi(), 60);

        let note = MelodyNote::parse("Eb5", 2.0, 0.5).unwrap();
        assert_eq!(note.pitch(), PitchClass::Ds);
        assert_eq!(note.midi(), 75);
        assert_eq!(note.end(), 2.5);

        assert_eq!(MelodyNote::parse("F#3", 0.0, 1.0).unwrap().midi(), 54);
        assert_eq!(MelodyNote::parse("C-1", 0.0, 1.0).unwrap().midi(), 0);
        assert!(MelodyNote::parse("C", 0.0, 1.0).is_err());
        assert!(MelodyNote::parse("H4", 0.0, 1.0).is_err());
    }

    #[test]
    fn test_note_validation() {
        assert!(MelodyNote::new(PitchClass::C, 4, -1.0, 1.0).is_err());
        assert!(MelodyNote::new(PitchClass::C, 4, 0.0, 0.0).is_err());
        assert!(MelodyNote::new(PitchClass::C, 4, f64::NAN, 1.0).is_err());
        assert!(MelodyNote::new(PitchClass::G, 9, 0.0, 1.0).is_ok()); // MIDI 127
        assert!(MelodyNote::new(PitchClass::Gs, 9, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_from_midi() {
        let note = MelodyNote::from_midi(67, 1.0, 1.0).unwrap();
        assert_eq!(note.pitch(), PitchClass::G);
        assert_eq!(note.octave(), 4);
        assert_eq!(note.midi(), 67);
    }

    #[test]
    fn test_empty_melody_rejected() {
        assert!(matches!(
            Melody::new(Vec::new()),
            Err(HarmonizeError::InvalidMelody(_))
        ));
        assert!(Melody::parse("").is_err());
        assert!(Melody::parse("R:4").is_err());
    }

    #[test]
    fn test_melody_parse_lays_notes_end_to_end() {
        let melody = Melody::parse("C4:1 E4 R:2 G4:0.5").unwrap();
        let onsets: Vec<f64> = melody.notes().iter().map(|n| n.onset()).collect();
        assert_eq!(onsets, vec![0.0, 1.0, 4.0]);
        assert_eq!(melody.span_beats(), 4.5);

        assert!(Melody::parse("C4:x").is_err());
        assert!(Melody::parse("C4:-1").is_err());
    }

    #[test]
    fn test_melody_sorted_by_onset() {
        let notes = vec![
            MelodyNote::parse("G4", 2.0, 1.0).unwrap(),
            MelodyNote::parse("C4", 0.0, 1.0).unwrap(),
        ];
        let melody = Melody::new(notes).unwrap();
        assert_eq!(melody.notes()[0].pitch(), PitchClass::C);
        assert_eq!(melody.last().unwrap().pitch(), PitchClass::G);
    }

    #[test]
    fn test_repeated() {
        let melody = Melody::parse("C4 E4 G4 C4").unwrap().repeated(8);
        assert_eq!(melody.len(), 32);
        assert_eq!(melody.span_beats(), 32.0);
        assert_eq!(melody.notes()[4].onset(), 4.0);
        assert_eq!(melody.notes()[4].pitch(), PitchClass::C);
    }

    #[test]
    fn test_trailing_rest_kept_when_repeating() {
        let melody = Melody::parse("C4 E4 R:2").unwrap();
        assert_eq!(melody.span_beats(), 2.0);
        assert_eq!(melody.length_beats(), 4.0);

        let twice = melody.repeated(2);
        let onsets: Vec<f64> = twice.notes().iter().map(|n| n.onset()).collect();
        assert_eq!(onsets, vec![0.0, 1.0, 4.0, 5.0]);
        assert_eq!(twice.length_beats(), 8.0);
        assert_eq!(twice.span_beats(), 6.0);
    }

    #[test]
    fn test_length_never_shorter_than_notes() {
        let notes = vec![MelodyNote::parse("C4", 0.0, 3.0).unwrap()];
        let melody = Melody::new(notes).unwrap().with_length(2.0);
        assert_eq!(melody.length_beats(), 3.0);
        assert_eq!(melody.with_length(f64::NAN).length_beats(), 3.0);
    }
}
