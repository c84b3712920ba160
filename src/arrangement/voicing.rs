// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord voicings and voice-led selection.
//!
//! Every chord is offered in each allowed style, each inversion and each
//! octave placement that fits the register. The first chord is played in
//! root-position close voicing near the middle of the register; every later
//! chord takes the candidate that moves the voices the least.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarmonizeError, Result};
use crate::music::{ChordTemplate, MidiNote};

/// Lowest default comping note (C3)
pub const DEFAULT_REGISTER_LOW: MidiNote = 48;
/// Highest default comping note (E5)
pub const DEFAULT_REGISTER_HIGH: MidiNote = 76;

/// Major ninth above the root
const NINTH: u8 = 14;

/// How the chord tones are stacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicingStyle {
    /// Root, 3rd, 5th, 7th within an octave
    Close,
    /// 3rd, 5th, 7th, 9th with the root left to the bass
    Rootless,
    /// Close voicing with the second-highest note dropped an octave
    Drop2,
}

impl VoicingStyle {
    pub const ALL: [VoicingStyle; 3] = [
        VoicingStyle::Close,
        VoicingStyle::Rootless,
        VoicingStyle::Drop2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VoicingStyle::Close => "close",
            VoicingStyle::Rootless => "rootless",
            VoicingStyle::Drop2 => "drop2",
        }
    }

    /// Intervals above the root before inversion
    fn stack(self, chord: &ChordTemplate) -> [u8; 4] {
        let [root, third, fifth, seventh] = chord.quality().intervals();
        match self {
            VoicingStyle::Close | VoicingStyle::Drop2 => [root, third, fifth, seventh],
            VoicingStyle::Rootless => [third, fifth, seventh, NINTH],
        }
    }
}

impl FromStr for VoicingStyle {
    type Err = HarmonizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "close" => Ok(VoicingStyle::Close),
            "rootless" => Ok(VoicingStyle::Rootless),
            "drop2" => Ok(VoicingStyle::Drop2),
            _ => Err(HarmonizeError::InvalidConfig(format!(
                "unknown voicing style {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for VoicingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive MIDI range the comping voices must stay in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Register {
    low: MidiNote,
    high: MidiNote,
}

impl Default for Register {
    fn default() -> Self {
        Self {
            low: DEFAULT_REGISTER_LOW,
            high: DEFAULT_REGISTER_HIGH,
        }
    }
}

impl Register {
    /// Create a register at least an octave wide
    pub fn new(low: MidiNote, high: MidiNote) -> Result<Self> {
        if high > 127 || low >= high || high - low < 12 {
            return Err(HarmonizeError::InvalidConfig(format!(
                "register {}-{} must lie in 0-127 and span at least an octave",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> MidiNote {
        self.low
    }

    pub fn high(&self) -> MidiNote {
        self.high
    }

    fn center(&self) -> f64 {
        (self.low as f64 + self.high as f64) / 2.0
    }

    fn fits(&self, notes: &[i32]) -> bool {
        notes
            .iter()
            .all(|&n| n >= self.low as i32 && n <= self.high as i32)
    }
}

/// A chord as concrete MIDI notes, lowest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voicing {
    pub style: VoicingStyle,
    pub inversion: u8,
    pub notes: Vec<MidiNote>,
}

impl Voicing {
    /// Lowest note
    pub fn bass(&self) -> Option<MidiNote> {
        self.notes.first().copied()
    }

    fn center(&self) -> f64 {
        if self.notes.is_empty() {
            return 0.0;
        }
        self.notes.iter().map(|&n| n as f64).sum::<f64>() / self.notes.len() as f64
    }
}

/// Rotate the bottom note up an octave `inversion` times
fn invert(notes: &[i32], inversion: u8) -> Vec<i32> {
    let mut result = notes.to_vec();
    for _ in 0..inversion {
        if !result.is_empty() {
            let bottom = result.remove(0);
            result.push(bottom + 12);
        }
    }
    result.sort();
    result
}

/// Drop the second-highest note an octave
fn drop2(notes: &mut [i32]) {
    notes.sort();
    if notes.len() >= 2 {
        let idx = notes.len() - 2;
        notes[idx] -= 12;
    }
    notes.sort();
}

/// Total semitone motion between two voicings, voice by voice from the bottom
pub fn voice_leading_distance(from: &[MidiNote], to: &[MidiNote]) -> u32 {
    let mut total = 0u32;
    for (i, &note) in to.iter().enumerate() {
        if let Some(&prev) = from.get(i) {
            total += (note as i32 - prev as i32).unsigned_abs();
        }
    }
    total
}

/// Picks voicings for a chord sequence
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceLeader {
    styles: Vec<VoicingStyle>,
    register: Register,
}

impl Default for VoiceLeader {
    fn default() -> Self {
        Self {
            styles: VoicingStyle::ALL.to_vec(),
            register: Register::default(),
        }
    }
}

impl VoiceLeader {
    /// Create a voice leader; at least one style is required
    pub fn new(styles: Vec<VoicingStyle>, register: Register) -> Result<Self> {
        if styles.is_empty() {
            return Err(HarmonizeError::InvalidConfig(
                "at least one voicing style is required".to_string(),
            ));
        }
        let mut unique: Vec<VoicingStyle> = Vec::with_capacity(styles.len());
        for style in styles {
            if !unique.contains(&style) {
                unique.push(style);
            }
        }
        Ok(Self {
            styles: unique,
            register,
        })
    }

    pub fn styles(&self) -> &[VoicingStyle] {
        &self.styles
    }

    pub fn register(&self) -> Register {
        self.register
    }

    /// Placements of one style and inversion inside the register, lowest first.
    /// When none fits, the placement centred closest to the register stands in.
    fn placements(&self, chord: &ChordTemplate, style: VoicingStyle, inversion: u8) -> Vec<Voicing> {
        let root = chord.root().index() as i32;
        let stacked: Vec<i32> = style.stack(chord).iter().map(|&i| root + i as i32).collect();
        let mut shape = invert(&stacked, inversion);
        if style == VoicingStyle::Drop2 {
            drop2(&mut shape);
        }

        let shifted: Vec<Vec<i32>> = (-1..=11)
            .map(|octave| shape.iter().map(|&n| n + 12 * octave).collect::<Vec<i32>>())
            .filter(|notes| notes.iter().all(|&n| (0..=127).contains(&n)))
            .collect();

        let fitting: Vec<&Vec<i32>> = shifted.iter().filter(|n| self.register.fits(n)).collect();
        let chosen: Vec<&Vec<i32>> = if fitting.is_empty() {
            let center = self.register.center();
            shifted
                .iter()
                .min_by(|a, b| {
                    let da = (mean(a) - center).abs();
                    let db = (mean(b) - center).abs();
                    da.total_cmp(&db)
                })
                .into_iter()
                .collect()
        } else {
            fitting
        };

        chosen
            .into_iter()
            .map(|notes| Voicing {
                style,
                inversion,
                notes: notes.iter().map(|&n| n as MidiNote).collect(),
            })
            .collect()
    }

    /// Every allowed voicing of a chord in style, inversion, octave order
    pub fn candidates(&self, chord: &ChordTemplate) -> Vec<Voicing> {
        let mut result = Vec::new();
        for &style in &self.styles {
            for inversion in 0..4 {
                result.extend(self.placements(chord, style, inversion));
            }
        }
        result
    }

    /// Opening voicing: root position of the first style, nearest the register centre
    pub fn opening(&self, chord: &ChordTemplate) -> Voicing {
        let style = self.styles.first().copied().unwrap_or(VoicingStyle::Close);
        let center = self.register.center();
        let mut best: Option<Voicing> = None;
        for voicing in self.placements(chord, style, 0) {
            let better = match &best {
                Some(current) => {
                    (voicing.center() - center).abs() < (current.center() - center).abs()
                }
                None => true,
            };
            if better {
                best = Some(voicing);
            }
        }
        best.unwrap_or(Voicing {
            style,
            inversion: 0,
            notes: Vec::new(),
        })
    }

    /// Voicing with least motion from `previous` (earliest candidate wins ties)
    pub fn next(&self, previous: &Voicing, chord: &ChordTemplate) -> Voicing {
        let mut best: Option<(u32, Voicing)> = None;
        for voicing in self.candidates(chord) {
            let movement = voice_leading_distance(&previous.notes, &voicing.notes);
            let better = match &best {
                Some((lowest, _)) => movement < *lowest,
                None => true,
            };
            if better {
                best = Some((movement, voicing));
            }
        }
        match best {
            Some((_, voicing)) => voicing,
            None => self.opening(chord),
        }
    }

    /// Voice a whole chord sequence
    pub fn voice(&self, chords: &[ChordTemplate]) -> Vec<Voicing> {
        let mut voicings: Vec<Voicing> = Vec::with_capacity(chords.len());
        for chord in chords {
            let voicing = match voicings.last() {
                Some(previous) => self.next(previous, chord),
                None => self.opening(chord),
            };
            voicings.push(voicing);
        }
        voicings
    }
}

fn mean(notes: &[i32]) -> f64 {
    if notes.is_empty() {
        return 0.0;
    }
    notes.iter().map(|&n| n as f64).sum::<f64>() / notes.len() as f64
}
