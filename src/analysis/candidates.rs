// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Consonance scoring and per-window candidate sets.
//!
//! Every vocabulary chord is scored against the weighted melody pitch
//! classes of a window. Chords sharing no pitch class with the melody are
//! never proposed while any chord shares one; silent windows inherit a
//! neighbour's candidates.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::vocabulary::{Vocabulary, VocabularyEntry};
use super::window::Window;
use crate::error::{HarmonizeError, Result};
use crate::music::{root_distance, ChordTemplate, Key, PitchClass, Scale};

/// Weights of the consonance score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsonanceWeights {
    /// Reward per unit of melody weight on chord tones
    #[serde(default = "default_chord_tone_weight")]
    pub chord_tone_weight: f64,
    /// Reward per unit on available tensions (9ths, 11ths, 13ths), in or out of the key
    #[serde(default = "default_tension_weight")]
    pub tension_weight: f64,
    /// Reward per unit on scale tones that are neither chord tones nor tensions
    #[serde(default = "default_scale_tone_weight")]
    pub scale_tone_weight: f64,
    /// Penalty per unit on tones outside the key (and the chord)
    #[serde(default = "default_outside_penalty")]
    pub outside_penalty: f64,
    /// Candidates scoring below this are dropped, unless nothing else
    /// sharing a melody tone is left
    #[serde(default)]
    pub min_score: f64,
}

fn default_chord_tone_weight() -> f64 {
    1.0
}
fn default_tension_weight() -> f64 {
    0.35
}
fn default_scale_tone_weight() -> f64 {
    0.35
}
fn default_outside_penalty() -> f64 {
    0.6
}

impl Default for ConsonanceWeights {
    fn default() -> Self {
        Self {
            chord_tone_weight: default_chord_tone_weight(),
            tension_weight: default_tension_weight(),
            scale_tone_weight: default_scale_tone_weight(),
            outside_penalty: default_outside_penalty(),
            min_score: 0.0,
        }
    }
}

/// Score how well a chord fits the melody of a window (0.0 for silence)
pub fn consonance(
    chord: &ChordTemplate,
    window: &Window,
    scale: &Scale,
    weights: &ConsonanceWeights,
) -> f64 {
    let total = window.total_weight();
    if total <= 0.0 {
        return 0.0;
    }

    let mut chord_tones = 0.0;
    let mut tensions = 0.0;
    let mut scale_tones = 0.0;
    let mut outside = 0.0;
    for note in window.notes() {
        if chord.contains(note.pitch) {
            chord_tones += note.weight;
        } else if chord.has_tension(note.pitch) {
            tensions += note.weight;
        } else if scale.contains(note.pitch) {
            scale_tones += note.weight;
        } else {
            outside += note.weight;
        }
    }

    (weights.chord_tone_weight * chord_tones
        + weights.tension_weight * tensions
        + weights.scale_tone_weight * scale_tones
        - weights.outside_penalty * outside)
        / total
}

/// A scored vocabulary chord
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub entry: VocabularyEntry,
    pub score: f64,
}

/// How a window's candidate set was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Continuity {
    /// Scored against the window's own melody
    Scored,
    /// No chord reached `min_score`; every chord sharing a melody tone is kept
    BestAvailable,
    /// No vocabulary chord shares a melody tone; the tonic chord stands in
    TonicFallback,
    /// Silent window carrying the previous window's candidates
    RepeatPrevious,
    /// Leading silent window borrowing the next sounding window's candidates
    PivotToNext,
}

/// Ranked chords for one window, best first; never empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSet {
    window: usize,
    continuity: Continuity,
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// Window index this set belongs to
    pub fn window(&self) -> usize {
        self.window
    }

    /// How the set was obtained
    pub fn continuity(&self) -> Continuity {
        self.continuity
    }

    /// Candidates, best first
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Highest-ranked candidate
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Never true for sets produced by the analyzer
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Check whether a chord is among the candidates
    pub fn contains(&self, chord: &ChordTemplate) -> bool {
        self.candidates.iter().any(|c| &c.entry.chord == chord)
    }

    fn inherited(&self, window: usize, continuity: Continuity) -> Self {
        Self {
            window,
            continuity,
            candidates: self.candidates.clone(),
        }
    }
}

/// Scores a key's vocabulary against each window
#[derive(Debug, Clone)]
pub struct HarmonicAnalyzer<'a> {
    key: &'a Key,
    vocabulary: &'a Vocabulary,
    weights: ConsonanceWeights,
}

impl<'a> HarmonicAnalyzer<'a> {
    /// Create an analyzer for a key and vocabulary
    pub fn new(key: &'a Key, vocabulary: &'a Vocabulary, weights: ConsonanceWeights) -> Self {
        Self {
            key,
            vocabulary,
            weights,
        }
    }

    /// Produce one candidate set per window, in window order
    pub fn analyze(&self, windows: &[Window]) -> Result<Vec<CandidateSet>> {
        if self.vocabulary.is_empty() {
            return Err(HarmonizeError::UnresolvableWindow {
                window: windows.first().map(Window::index).unwrap_or(0),
                reason: "chord vocabulary is empty".to_string(),
            });
        }

        let mut reference_root = self.key.tonic();
        let mut scored: Vec<Option<CandidateSet>> = Vec::with_capacity(windows.len());
        for window in windows {
            if window.is_silent() {
                scored.push(None);
                continue;
            }
            let set = self.score_window(window, reference_root)?;
            if let Some(best) = set.best() {
                reference_root = best.entry.chord.root();
            }
            debug!(
                window = window.index(),
                candidates = set.len(),
                best = %set.best().map(|c| c.entry.chord.symbol()).unwrap_or_default(),
                "scored window"
            );
            scored.push(Some(set));
        }

        self.fill_silent_windows(windows, scored)
    }

    fn score_window(&self, window: &Window, reference_root: PitchClass) -> Result<CandidateSet> {
        let scale = self.key.scale();
        let pitches = window.pitch_classes();

        let sharing: Vec<(usize, Candidate)> = self
            .vocabulary
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| pitches.iter().any(|&pc| entry.chord.contains(pc)))
            .map(|(order, entry)| {
                let score = consonance(&entry.chord, window, scale, &self.weights);
                (order, Candidate { entry: *entry, score })
            })
            .collect();

        if sharing.is_empty() {
            let tonic = self.tonic_entry(window)?;
            warn!(
                window = window.index(),
                chord = %tonic.chord,
                "no chord shares a melody tone, falling back to the tonic"
            );
            return Ok(CandidateSet {
                window: window.index(),
                continuity: Continuity::TonicFallback,
                candidates: vec![Candidate {
                    entry: tonic,
                    score: consonance(&tonic.chord, window, scale, &self.weights),
                }],
            });
        }

        let passing: Vec<(usize, Candidate)> = sharing
            .iter()
            .filter(|(_, candidate)| candidate.score >= self.weights.min_score)
            .copied()
            .collect();
        let (continuity, mut ranked) = if passing.is_empty() {
            debug!(
                window = window.index(),
                min_score = self.weights.min_score,
                candidates = sharing.len(),
                "no chord reaches the minimum score, keeping every chord sharing a melody tone"
            );
            (Continuity::BestAvailable, sharing)
        } else {
            (Continuity::Scored, passing)
        };

        ranked.sort_by_key(|(order, candidate)| {
            (
                Reverse(score_key(candidate.score)),
                !candidate.entry.source.is_diatonic(),
                root_distance(candidate.entry.chord.root(), reference_root),
                *order,
            )
        });

        Ok(CandidateSet {
            window: window.index(),
            continuity,
            candidates: ranked.into_iter().map(|(_, c)| c).collect(),
        })
    }

    fn tonic_entry(&self, window: &Window) -> Result<VocabularyEntry> {
        self.vocabulary
            .tonic()
            .or_else(|| self.vocabulary.entries().first())
            .copied()
            .ok_or_else(|| HarmonizeError::UnresolvableWindow {
                window: window.index(),
                reason: "chord vocabulary is empty".to_string(),
            })
    }

    /// Silent windows repeat the previous set, or pivot toward the next
    /// sounding window when nothing has sounded yet
    fn fill_silent_windows(
        &self,
        windows: &[Window],
        scored: Vec<Option<CandidateSet>>,
    ) -> Result<Vec<CandidateSet>> {
        let first_sounding = scored.iter().flatten().next().cloned();
        let mut sets: Vec<CandidateSet> = Vec::with_capacity(scored.len());

        for (window, slot) in windows.iter().zip(scored) {
            let set = match (slot, sets.last()) {
                (Some(set), _) => set,
                (None, Some(previous)) => {
                    previous.inherited(window.index(), Continuity::RepeatPrevious)
                }
                (None, None) => match &first_sounding {
                    Some(next) => next.inherited(window.index(), Continuity::PivotToNext),
                    None => {
                        let tonic = self.tonic_entry(window)?;
                        CandidateSet {
                            window: window.index(),
                            continuity: Continuity::TonicFallback,
                            candidates: vec![Candidate {
                                entry: tonic,
                                score: 0.0,
                            }],
                        }
                    }
                },
            };
            sets.push(set);
        }

        Ok(sets)
    }
}

/// Scores as integers so equal scores compare equal despite rounding noise
fn score_key(score: f64) -> i64 {
    (score * 1e9).round() as i64
}
