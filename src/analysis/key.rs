// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key inference from melody pitch content.
//!
//! Two strategies are available:
//! - Diatonic fit: every tonic and mode is scored by how much of the
//!   melody lies inside its scale, weighted by how common the mode is in
//!   jazz, plus a pull toward the tonal centre the melody emphasizes.
//! - Krumhansl-Schmuckler: correlation with the major/minor probe-tone
//!   profiles, then refined to a jazz mode from characteristic degrees.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarmonizeError, Result};
use crate::music::{Key, Melody, Mode, PitchClass, Scale};

/// Weight of the tonal-centre term against the scale fit
const TONAL_EMPHASIS: f64 = 0.5;

/// Bonus (before emphasis) when the melody ends on the tonic
const FINAL_TONIC_BONUS: f64 = 0.25;

const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Strategy used to infer a key when the caller does not declare one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDetection {
    #[default]
    DiatonicFit,
    Krumhansl,
}

impl FromStr for KeyDetection {
    type Err = HarmonizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "diatonic_fit" | "diatonic" => Ok(KeyDetection::DiatonicFit),
            "krumhansl" | "krumhansl_schmuckler" => Ok(KeyDetection::Krumhansl),
            other => Err(HarmonizeError::InvalidConfig(format!(
                "unknown key detection method {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for KeyDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyDetection::DiatonicFit => f.write_str("diatonic_fit"),
            KeyDetection::Krumhansl => f.write_str("krumhansl"),
        }
    }
}

/// An inferred key and how well the melody supports it (0.0 - 1.0)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEstimate {
    pub key: Key,
    pub confidence: f64,
}

/// Duration-weighted pitch-class distribution of a melody
pub fn pitch_class_profile(melody: &Melody) -> [f64; 12] {
    let mut profile = [0.0; 12];
    for note in melody.notes() {
        profile[note.pitch().index() as usize] += note.duration();
    }
    profile
}

/// Infer the key of a melody
pub fn detect_key(melody: &Melody, method: KeyDetection) -> KeyEstimate {
    let profile = pitch_class_profile(melody);
    let total: f64 = profile.iter().sum();
    if total <= 0.0 {
        return KeyEstimate {
            key: Key::default(),
            confidence: 0.0,
        };
    }

    match method {
        KeyDetection::DiatonicFit => {
            let final_pc = melody.last().map(|n| n.pitch());
            diatonic_fit(&profile, total, final_pc)
        }
        KeyDetection::Krumhansl => krumhansl(&profile),
    }
}

/// Fraction of the melody's duration that lies inside a key's scale
pub fn key_fit(melody: &Melody, key: &Key) -> f64 {
    let profile = pitch_class_profile(melody);
    let total: f64 = profile.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    key.scale()
        .notes()
        .iter()
        .map(|pc| profile[pc.index() as usize])
        .sum::<f64>()
        / total
}

fn diatonic_fit(profile: &[f64; 12], total: f64, final_pc: Option<PitchClass>) -> KeyEstimate {
    let mut best = KeyEstimate {
        key: Key::default(),
        confidence: 0.0,
    };
    let mut best_score = f64::NEG_INFINITY;

    for tonic in PitchClass::ALL {
        for mode in Mode::ALL {
            let scale = Scale::new(tonic, mode);
            let fit = scale
                .notes()
                .iter()
                .map(|pc| profile[pc.index() as usize])
                .sum::<f64>()
                / total;

            let fifth = tonic.transpose(7);
            let mut tonal =
                (profile[tonic.index() as usize] + 0.5 * profile[fifth.index() as usize]) / total;
            if final_pc == Some(tonic) {
                tonal += FINAL_TONIC_BONUS;
            }

            let score = fit * mode.preference() + TONAL_EMPHASIS * tonal;
            if score > best_score + 1e-12 {
                best_score = score;
                best = KeyEstimate {
                    key: Key::new(tonic, mode),
                    confidence: fit,
                };
            }
        }
    }

    best
}

fn krumhansl(profile: &[f64; 12]) -> KeyEstimate {
    let mut best_tonic = PitchClass::C;
    let mut best_minor = false;
    let mut best_r = f64::NEG_INFINITY;

    for tonic in PitchClass::ALL {
        for (minor, reference) in [(false, &MAJOR_PROFILE), (true, &MINOR_PROFILE)] {
            let rotated: [f64; 12] =
                std::array::from_fn(|i| reference[(i + 12 - tonic.index() as usize) % 12]);
            let r = correlation(profile, &rotated);
            if r > best_r + 1e-12 {
                best_r = r;
                best_tonic = tonic;
                best_minor = minor;
            }
        }
    }

    let mode = refine_mode(profile, best_tonic, best_minor);
    KeyEstimate {
        key: Key::new(best_tonic, mode),
        confidence: best_r.clamp(0.0, 1.0),
    }
}

/// Pick the jazz mode from the degrees that tell the modes apart
fn refine_mode(profile: &[f64; 12], tonic: PitchClass, minor: bool) -> Mode {
    let at = |semitones: i32| profile[tonic.transpose(semitones).index() as usize];

    if minor {
        let raised_sixth = at(9) > at(8);
        let raised_seventh = at(11) > at(10);
        match (raised_sixth, raised_seventh) {
            (true, true) => Mode::MelodicMinor,
            (false, true) => Mode::HarmonicMinor,
            (true, false) => Mode::Dorian,
            (false, false) => Mode::NaturalMinor,
        }
    } else if at(6) > at(5) {
        Mode::Lydian
    } else if at(10) > at(11) {
        Mode::Mixolydian
    } else {
        Mode::Major
    }
}

/// Pearson correlation of two 12-bin profiles
fn correlation(a: &[f64; 12], b: &[f64; 12]) -> f64 {
    let mean_a = a.iter().sum::<f64>() / 12.0;
    let mean_b = b.iter().sum::<f64>() / 12.0;

    let mut num = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..12 {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        num += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let den = (var_a * var_b).sqrt();
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}
