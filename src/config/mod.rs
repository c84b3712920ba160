// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for the harmonizer.
//!
//! A configuration file holds four sections, each optional:
//! `harmony` (key and progression settings), `scoring` (consonance
//! weights), `meter` and `arrangement`. YAML and TOML are both accepted,
//! chosen by file extension.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::{ConsonanceWeights, KeyDetection, VocabularyOptions};
use crate::arrangement::voicing::{DEFAULT_REGISTER_HIGH, DEFAULT_REGISTER_LOW};
use crate::arrangement::{
    Arranger, CompHit, CompPattern, Register, VoiceLeader, VoicingStyle, DEFAULT_COMP_VELOCITY,
};
use crate::error::HarmonizeError;
use crate::music::Key;
use crate::progression::{ProgressionGenerator, TransitionTable, DEFAULT_CADENCE_WEIGHT};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HarmonizerConfig {
    /// Key and progression settings
    #[serde(default)]
    pub harmony: HarmonyConfig,
    /// Consonance weights
    #[serde(default)]
    pub scoring: ConsonanceWeights,
    /// Time signature and tempo
    #[serde(default)]
    pub meter: MeterConfig,
    /// Comping rhythm and voicing
    #[serde(default)]
    pub arrangement: ArrangementConfig,
}

impl HarmonizerConfig {
    /// Load a configuration file, YAML or TOML by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let config = match extension.as_deref() {
            Some("toml") => Self::from_toml(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            other => Err(anyhow!(
                "Unsupported config format {:?} (expected .yaml, .yml or .toml)",
                other.unwrap_or("")
            )),
        }
        .with_context(|| format!("Failed to load config file: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        Ok(config)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize configuration to TOML")
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: String| Err(HarmonizeError::InvalidConfig(msg));

        let harmony = &self.harmony;
        if harmony.surprise.is_nan() {
            return Err(HarmonizeError::InvalidSurprise("NaN".to_string()));
        }
        if !harmony.cadence_weight.is_finite() || harmony.cadence_weight < 0.0 {
            return invalid(format!(
                "cadence_weight must be a non-negative number, got {}",
                harmony.cadence_weight
            ));
        }
        self.declared_key()?;

        let scoring = &self.scoring;
        let weights = [
            ("chord_tone_weight", scoring.chord_tone_weight),
            ("tension_weight", scoring.tension_weight),
            ("scale_tone_weight", scoring.scale_tone_weight),
            ("outside_penalty", scoring.outside_penalty),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        if !scoring.min_score.is_finite() {
            return invalid("min_score must be finite".to_string());
        }

        if self.meter.beats_per_bar == 0 {
            return invalid("beats_per_bar must be at least 1".to_string());
        }
        if !self.meter.tempo.is_finite() || self.meter.tempo <= 0.0 {
            return invalid(format!("tempo must be positive, got {}", self.meter.tempo));
        }

        let arrangement = &self.arrangement;
        if arrangement.velocity == 0 || arrangement.velocity > 127 {
            return invalid(format!(
                "velocity must be 1-127, got {}",
                arrangement.velocity
            ));
        }
        self.comp_hits()?;
        self.voice_leader()?;
        Ok(())
    }

    /// The key named in the configuration, if any
    pub fn declared_key(&self) -> crate::Result<Option<Key>> {
        self.harmony
            .key
            .as_deref()
            .map(|tonic| Key::parse(tonic, &self.harmony.mode))
            .transpose()
    }

    /// Which chords beyond the diatonic ones the analyzer may use
    pub fn vocabulary_options(&self) -> VocabularyOptions {
        VocabularyOptions {
            secondary_dominants: self.harmony.secondary_dominants,
            borrowed_chords: self.harmony.borrowed_chords,
        }
    }

    /// Progression generator with the configured cadence weight
    pub fn generator(&self) -> ProgressionGenerator {
        ProgressionGenerator::new(TransitionTable::default(), self.harmony.cadence_weight)
    }

    /// Comp hits of the configured pattern
    pub fn comp_hits(&self) -> crate::Result<Vec<CompHit>> {
        self.arrangement
            .pattern
            .resolve(&self.arrangement.custom_hits)
    }

    /// Voice leader over the configured styles and register
    pub fn voice_leader(&self) -> crate::Result<VoiceLeader> {
        let register = Register::new(
            self.arrangement.register_low,
            self.arrangement.register_high,
        )?;
        VoiceLeader::new(self.arrangement.voicings.clone(), register)
    }

    /// Arranger for the configured rhythm, voicings, bass and tempo
    pub fn arranger(&self) -> crate::Result<Arranger> {
        Ok(Arranger::new(
            self.comp_hits()?,
            self.voice_leader()?,
            self.arrangement.velocity,
        )
        .with_bass(self.arrangement.bass)
        .with_tempo(self.meter.tempo))
    }
}

/// Key and progression settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarmonyConfig {
    /// Tonic (e.g., "C", "Bb"); inferred from the melody when absent
    #[serde(default)]
    pub key: Option<String>,
    /// Mode used with `key` (e.g., "major", "dorian")
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Key inference strategy
    #[serde(default)]
    pub key_detection: KeyDetection,
    /// Surprise (0.0 - 1.0)
    #[serde(default)]
    pub surprise: f64,
    /// RNG seed; drawn fresh per request when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Offer V7 of diatonic targets
    #[serde(default = "default_true")]
    pub secondary_dominants: bool,
    /// Offer chords of the parallel mode
    #[serde(default = "default_true")]
    pub borrowed_chords: bool,
    /// Extra pull toward the tonic on the last bar
    #[serde(default = "default_cadence_weight")]
    pub cadence_weight: f64,
}

fn default_mode() -> String {
    "major".to_string()
}
fn default_true() -> bool {
    true
}
fn default_cadence_weight() -> f64 {
    DEFAULT_CADENCE_WEIGHT
}

impl Default for HarmonyConfig {
    fn default() -> Self {
        Self {
            key: None,
            mode: default_mode(),
            key_detection: KeyDetection::default(),
            surprise: 0.0,
            seed: None,
            secondary_dominants: true,
            borrowed_chords: true,
            cadence_weight: default_cadence_weight(),
        }
    }
}

/// Time signature and tempo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeterConfig {
    /// Beats per bar (time signature numerator)
    #[serde(default = "default_beats_per_bar")]
    pub beats_per_bar: u8,
    /// Tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo: f64,
}

fn default_beats_per_bar() -> u8 {
    4
}
fn default_tempo() -> f64 {
    120.0
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            beats_per_bar: default_beats_per_bar(),
            tempo: default_tempo(),
        }
    }
}

/// Comping rhythm and voicing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArrangementConfig {
    /// Named rhythm, or `custom` to use `custom_hits`
    #[serde(default)]
    pub pattern: CompPattern,
    /// Hits used by the `custom` pattern
    #[serde(default)]
    pub custom_hits: Vec<CompHit>,
    /// Allowed voicing styles, in tie-break order
    #[serde(default = "default_voicings")]
    pub voicings: Vec<VoicingStyle>,
    /// Base comping velocity (1-127)
    #[serde(default = "default_velocity")]
    pub velocity: u8,
    /// Add a bass part on chord roots
    #[serde(default)]
    pub bass: bool,
    /// Lowest comping note
    #[serde(default = "default_register_low")]
    pub register_low: u8,
    /// Highest comping note
    #[serde(default = "default_register_high")]
    pub register_high: u8,
}

fn default_voicings() -> Vec<VoicingStyle> {
    VoicingStyle::ALL.to_vec()
}
fn default_velocity() -> u8 {
    DEFAULT_COMP_VELOCITY
}
fn default_register_low() -> u8 {
    DEFAULT_REGISTER_LOW
}
fn default_register_high() -> u8 {
    DEFAULT_REGISTER_HIGH
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self {
            pattern: CompPattern::default(),
            custom_hits: Vec::new(),
            voicings: default_voicings(),
            velocity: default_velocity(),
            bass: false,
            register_low: default_register_low(),
            register_high: default_register_high(),
        }
    }
}
