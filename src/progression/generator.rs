// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Markov walk over functional roles, one chord per window.

use rand::rngs::StdRng;
use tracing::debug;

use super::sampler::{sample, selection_weights_preferring, Surprise};
use super::transitions::TransitionTable;
use super::{Progression, ProgressionBar};
use crate::analysis::{CandidateSet, Continuity, Window};
use crate::error::{HarmonizeError, Result};
use crate::music::FunctionalRole;

/// Default boost of the Tonic column on the final bar
pub const DEFAULT_CADENCE_WEIGHT: f64 = 1.0;

/// Keeps low-scoring candidates selectable once surprise is raised
const SCORE_FLOOR: f64 = 0.05;

/// Chooses a chord for each window from its candidate set
#[derive(Debug, Clone)]
pub struct ProgressionGenerator {
    table: TransitionTable,
    cadence_weight: f64,
}

impl Default for ProgressionGenerator {
    fn default() -> Self {
        Self::new(TransitionTable::default(), DEFAULT_CADENCE_WEIGHT)
    }
}

impl ProgressionGenerator {
    pub fn new(table: TransitionTable, cadence_weight: f64) -> Self {
        Self {
            table,
            cadence_weight,
        }
    }

    /// Transition table in use
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Walk the windows in bar order.
    ///
    /// Each candidate's combined weight is its (floored) consonance times
    /// the probability of its role following the previous chord's role.
    /// When combined weights tie, a chord of the most probable next role
    /// goes first. Silent windows that repeat the previous set keep the
    /// previous chord.
    pub fn generate(
        &self,
        sets: &[CandidateSet],
        windows: &[Window],
        surprise: Surprise,
        rng: &mut StdRng,
    ) -> Result<Progression> {
        if sets.len() != windows.len() {
            return Err(HarmonizeError::UnresolvableWindow {
                window: sets.len().min(windows.len()),
                reason: format!(
                    "{} candidate sets for {} windows",
                    sets.len(),
                    windows.len()
                ),
            });
        }

        let mut bars: Vec<ProgressionBar> = Vec::with_capacity(windows.len());
        let mut previous_role: Option<FunctionalRole> = None;

        for (position, (set, window)) in sets.iter().zip(windows).enumerate() {
            let repeat = match (set.continuity(), bars.last()) {
                (Continuity::RepeatPrevious, Some(previous)) => Some(*previous),
                _ => None,
            };

            let bar = match repeat {
                Some(previous) => ProgressionBar {
                    index: window.index(),
                    start: window.start(),
                    end: window.end(),
                    ..previous
                },
                None => {
                    let is_final = position + 1 == windows.len();
                    let row = if is_final {
                        self.table.cadential_row(previous_role, self.cadence_weight)
                    } else {
                        self.table.row(previous_role)
                    };

                    let expected = self.table.most_probable(previous_role);
                    let candidates = set.candidates();
                    let combined: Vec<f64> = candidates
                        .iter()
                        .map(|c| (c.score.max(0.0) + SCORE_FLOOR) * row[c.entry.role.index()])
                        .collect();
                    let weights = selection_weights_preferring(&combined, surprise, |i| {
                        candidates[i].entry.role == expected
                    });
                    let choice = sample(&weights, rng)
                        .and_then(|i| set.candidates().get(i))
                        .ok_or_else(|| HarmonizeError::UnresolvableWindow {
                            window: window.index(),
                            reason: "no selectable candidate".to_string(),
                        })?;

                    ProgressionBar {
                        index: window.index(),
                        start: window.start(),
                        end: window.end(),
                        chord: choice.entry.chord,
                        role: choice.entry.role,
                        source: choice.entry.source,
                        score: choice.score,
                    }
                }
            };

            debug!(
                bar = bar.index,
                chord = %bar.chord,
                role = %bar.role,
                candidates = set.len(),
                repeated = repeat.is_some(),
                "chose chord"
            );
            previous_role = Some(bar.role);
            bars.push(bar);
        }

        Ok(Progression::new(bars))
    }
}
