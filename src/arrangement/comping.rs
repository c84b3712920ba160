// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Comping rhythms, expressed as fractions of a bar.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarmonizeError, Result};

const EPSILON: f64 = 1e-9;

/// One chord attack within a bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompHit {
    /// Start as a fraction of the bar (0.0 - 1.0)
    pub position: f64,
    /// Length as a fraction of the bar
    pub length: f64,
    /// Velocity multiplier
    #[serde(default = "default_accent")]
    pub accent: f64,
}

fn default_accent() -> f64 {
    1.0
}

impl CompHit {
    pub fn new(position: f64, length: f64, accent: f64) -> Self {
        Self {
            position,
            length,
            accent,
        }
    }

    fn validate(&self) -> Result<()> {
        let finite = self.position.is_finite() && self.length.is_finite() && self.accent.is_finite();
        if !finite
            || self.position < 0.0
            || self.position >= 1.0
            || self.length <= 0.0
            || self.position + self.length > 1.0 + EPSILON
            || self.accent <= 0.0
        {
            return Err(HarmonizeError::InvalidConfig(format!(
                "comp hit at {} for {} (accent {}) does not fit in a bar",
                self.position, self.length, self.accent
            )));
        }
        Ok(())
    }
}

/// Named comping rhythm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompPattern {
    /// Half-note pushes on beats 1 and 3
    #[default]
    OneAndThree,
    /// Short stabs on the backbeat
    TwoAndFour,
    /// Dotted quarter on 1, eighth on the and of 2
    Charleston,
    /// One chord held for the bar
    Whole,
    /// Hits supplied by the configuration
    Custom,
}

impl CompPattern {
    pub const ALL: [CompPattern; 5] = [
        CompPattern::OneAndThree,
        CompPattern::TwoAndFour,
        CompPattern::Charleston,
        CompPattern::Whole,
        CompPattern::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CompPattern::OneAndThree => "one_and_three",
            CompPattern::TwoAndFour => "two_and_four",
            CompPattern::Charleston => "charleston",
            CompPattern::Whole => "whole",
            CompPattern::Custom => "custom",
        }
    }

    /// Built-in hits (empty for `Custom`)
    pub fn hits(self) -> Vec<CompHit> {
        match self {
            CompPattern::OneAndThree => vec![
                CompHit::new(0.0, 0.375, 1.0),
                CompHit::new(0.5, 0.375, 0.9),
            ],
            CompPattern::TwoAndFour => vec![
                CompHit::new(0.25, 0.125, 0.9),
                CompHit::new(0.75, 0.125, 0.9),
            ],
            CompPattern::Charleston => vec![
                CompHit::new(0.0, 0.375, 1.0),
                CompHit::new(0.375, 0.125, 0.85),
            ],
            CompPattern::Whole => vec![CompHit::new(0.0, 1.0, 1.0)],
            CompPattern::Custom => Vec::new(),
        }
    }

    /// Resolve the hits to play, checking custom hits and ordering them
    pub fn resolve(self, custom: &[CompHit]) -> Result<Vec<CompHit>> {
        let mut hits = match self {
            CompPattern::Custom => custom.to_vec(),
            named => named.hits(),
        };
        if hits.is_empty() {
            return Err(HarmonizeError::InvalidConfig(
                "custom comping pattern has no hits".to_string(),
            ));
        }
        for hit in &hits {
            hit.validate()?;
        }
        hits.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(hits)
    }
}

impl FromStr for CompPattern {
    type Err = HarmonizeError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        CompPattern::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| HarmonizeError::InvalidConfig(format!("unknown comping pattern {:?}", s)))
    }
}

impl fmt::Display for CompPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
