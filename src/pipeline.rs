// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! End-to-end harmonization of one melody.
//!
//! Melody -> windows -> candidate sets -> progression -> arrangement. Every
//! request builds its own RNG from its seed, so a `Harmonizer` can be shared
//! between threads and requests never influence each other.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::analysis::{
    detect_key, key_fit, segment, CandidateSet, HarmonicAnalyzer, Vocabulary, Window,
};
use crate::arrangement::{Arrangement, Arranger, MidiEvent, PPQN};
use crate::config::HarmonizerConfig;
use crate::error::Result;
use crate::music::{Key, Melody};
use crate::progression::{Progression, ProgressionGenerator, Surprise};

/// One melody to harmonize and the knobs for this run
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonizeRequest {
    melody: Melody,
    key: Option<Key>,
    surprise: Surprise,
    seed: Option<u64>,
}

impl HarmonizeRequest {
    /// Request with an inferred key, no surprise and a fresh seed
    pub fn new(melody: Melody) -> Self {
        Self {
            melody,
            key: None,
            surprise: Surprise::PREDICTABLE,
            seed: None,
        }
    }

    /// Use this key instead of inferring one
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_surprise(mut self, surprise: Surprise) -> Self {
        self.surprise = surprise;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn melody(&self) -> &Melody {
        &self.melody
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn surprise(&self) -> Surprise {
        self.surprise
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Everything produced for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Harmonization {
    pub key: Key,
    /// Share of the melody inside the key's scale (or the inference confidence)
    pub key_confidence: f64,
    /// True when the caller supplied the key
    pub key_declared: bool,
    /// Seed the progression was sampled with
    pub seed: u64,
    pub surprise: Surprise,
    pub windows: Vec<Window>,
    pub candidates: Vec<CandidateSet>,
    pub progression: Progression,
    pub arrangement: Arrangement,
}

impl Harmonization {
    /// Arrangement as MIDI events at 24 PPQN
    pub fn midi_events(&self) -> Vec<MidiEvent> {
        self.arrangement.to_midi_events(PPQN)
    }
}

/// Immutable pipeline built from a validated configuration
#[derive(Debug, Clone)]
pub struct Harmonizer {
    config: HarmonizerConfig,
    generator: ProgressionGenerator,
    arranger: Arranger,
}

impl Harmonizer {
    /// Validate a configuration and build the pipeline
    pub fn new(config: HarmonizerConfig) -> Result<Self> {
        config.validate()?;
        let generator = config.generator();
        let arranger = config.arranger()?;
        Ok(Self {
            config,
            generator,
            arranger,
        })
    }

    pub fn config(&self) -> &HarmonizerConfig {
        &self.config
    }

    /// Request carrying the configured key, surprise and seed
    pub fn request(&self, melody: Melody) -> Result<HarmonizeRequest> {
        let harmony = &self.config.harmony;
        let mut request =
            HarmonizeRequest::new(melody).with_surprise(Surprise::new(harmony.surprise)?);
        if let Some(key) = self.config.declared_key()? {
            request = request.with_key(key);
        }
        if let Some(seed) = harmony.seed {
            request = request.with_seed(seed);
        }
        Ok(request)
    }

    /// Run the whole pipeline for one request
    pub fn harmonize(&self, request: &HarmonizeRequest) -> Result<Harmonization> {
        let melody = request.melody();
        let (key, key_confidence, key_declared) = match request.key() {
            Some(key) => (key.clone(), key_fit(melody, key), true),
            None => {
                let estimate = detect_key(melody, self.config.harmony.key_detection);
                (estimate.key, estimate.confidence, false)
            }
        };
        let seed = request.seed().unwrap_or_else(rand::random::<u64>);

        info!(
            key = %key,
            declared = key_declared,
            seed,
            surprise = %request.surprise(),
            notes = melody.len(),
            "harmonizing melody"
        );

        let windows = segment(melody, self.config.meter.beats_per_bar);
        let vocabulary = Vocabulary::for_key(&key, self.config.vocabulary_options());
        let candidates =
            HarmonicAnalyzer::new(&key, &vocabulary, self.config.scoring).analyze(&windows)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let progression =
            self.generator
                .generate(&candidates, &windows, request.surprise(), &mut rng)?;
        let arrangement = self.arranger.arrange(&progression);

        info!(progression = %progression, events = arrangement.events().len(), "harmonized");

        Ok(Harmonization {
            key,
            key_confidence,
            key_declared,
            seed,
            surprise: request.surprise(),
            windows,
            candidates,
            progression,
            arrangement,
        })
    }
}
