// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Functional-role transition probabilities.

use crate::music::FunctionalRole;

/// First-order Markov table over functional roles.
///
/// Rows and columns follow `FunctionalRole::ALL` (T, S, D, SD). The opening
/// row stands in for the Tonic initial state before the first bar.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    opening: [f64; 4],
    rows: [[f64; 4]; 4],
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self {
            opening: [0.70, 0.15, 0.10, 0.05],
            rows: [
                // Tonic moves away, usually to the subdominant
                [0.20, 0.40, 0.25, 0.15],
                // Subdominant wants the dominant (ii-V)
                [0.15, 0.15, 0.55, 0.15],
                // Dominant resolves home
                [0.65, 0.10, 0.15, 0.10],
                // Secondary dominants lead into S or D
                [0.15, 0.35, 0.40, 0.10],
            ],
        }
    }
}

impl TransitionTable {
    /// Create a table from explicit rows (each row should sum to 1)
    pub fn new(opening: [f64; 4], rows: [[f64; 4]; 4]) -> Self {
        Self { opening, rows }
    }

    /// Distribution over the next role given the previous one
    pub fn row(&self, previous: Option<FunctionalRole>) -> [f64; 4] {
        match previous {
            Some(role) => self.rows[role.index()],
            None => self.opening,
        }
    }

    /// P(next | previous)
    pub fn probability(&self, previous: Option<FunctionalRole>, next: FunctionalRole) -> f64 {
        self.row(previous)[next.index()]
    }

    /// Row with the Tonic column scaled up for a closing cadence
    pub fn cadential_row(&self, previous: Option<FunctionalRole>, cadence_weight: f64) -> [f64; 4] {
        let mut row = self.row(previous);
        row[FunctionalRole::Tonic.index()] *= 1.0 + cadence_weight.max(0.0);
        row
    }

    /// Most likely next role (earlier roles win ties)
    pub fn most_probable(&self, previous: Option<FunctionalRole>) -> FunctionalRole {
        let row = self.row(previous);
        let mut best = FunctionalRole::Tonic;
        for role in FunctionalRole::ALL {
            if row[role.index()] > row[best.index()] {
                best = role;
            }
        }
        best
    }
}
