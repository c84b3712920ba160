// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Turns a progression into comping (and optional bass) events.

use tracing::debug;

use super::comping::CompHit;
use super::voicing::VoiceLeader;
use super::{Arrangement, ArrangementEvent, Part};
use crate::music::MidiNote;
use crate::progression::Progression;

/// Base velocity of comping hits
pub const DEFAULT_COMP_VELOCITY: u8 = 80;

/// Bass roots sit in the octave starting at C2
const BASS_BASE: MidiNote = 36;

/// Arranges progressions with a fixed rhythm and voicing policy
#[derive(Debug, Clone)]
pub struct Arranger {
    hits: Vec<CompHit>,
    leader: VoiceLeader,
    velocity: u8,
    bass: bool,
    tempo: f64,
}

impl Default for Arranger {
    fn default() -> Self {
        Self {
            hits: super::CompPattern::default().hits(),
            leader: VoiceLeader::default(),
            velocity: DEFAULT_COMP_VELOCITY,
            bass: false,
            tempo: 120.0,
        }
    }
}

impl Arranger {
    /// Create an arranger from resolved comp hits
    pub fn new(hits: Vec<CompHit>, leader: VoiceLeader, velocity: u8) -> Self {
        Self {
            hits,
            leader,
            velocity: velocity.clamp(1, 127),
            ..Self::default()
        }
    }

    /// Add a bass part playing chord roots on each downbeat
    pub fn with_bass(mut self, bass: bool) -> Self {
        self.bass = bass;
        self
    }

    /// Set the tempo reported with the arrangement
    pub fn with_tempo(mut self, tempo: f64) -> Self {
        self.tempo = tempo;
        self
    }

    pub fn voice_leader(&self) -> &VoiceLeader {
        &self.leader
    }

    fn accented(&self, accent: f64) -> u8 {
        (self.velocity as f64 * accent).round().clamp(1.0, 127.0) as u8
    }

    /// Voice every bar and lay the comp hits over it
    pub fn arrange(&self, progression: &Progression) -> Arrangement {
        let voicings = self.leader.voice(&progression.chords());
        let mut events: Vec<ArrangementEvent> = Vec::new();

        for (bar, voicing) in progression.bars().iter().zip(&voicings) {
            let length = bar.end - bar.start;
            for hit in &self.hits {
                events.push(ArrangementEvent {
                    onset: bar.start + hit.position * length,
                    duration: hit.length * length,
                    velocity: self.accented(hit.accent),
                    notes: voicing.notes.clone(),
                    part: Part::Comping,
                });
            }

            if self.bass {
                events.push(ArrangementEvent {
                    onset: bar.start,
                    duration: length,
                    velocity: self.velocity,
                    notes: vec![BASS_BASE + bar.chord.root().index()],
                    part: Part::Bass,
                });
            }

            debug!(
                bar = bar.index,
                chord = %bar.chord,
                style = %voicing.style,
                inversion = voicing.inversion,
                notes = ?voicing.notes,
                "voiced bar"
            );
        }

        events.sort_by(|a, b| a.onset.total_cmp(&b.onset));
        Arrangement::new(events, voicings, progression.bar_length(), self.tempo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::CompPattern;
    use crate::music::{ChordSource, ChordTemplate, FunctionalRole};
    use crate::progression::ProgressionBar;

    fn progression(symbols: &[&str]) -> Progression {
        let bars = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| ProgressionBar {
                index: i,
                start: i as f64 * 4.0,
                end: (i + 1) as f64 * 4.0,
                chord: s.parse::<ChordTemplate>().unwrap(),
                role: FunctionalRole::Tonic,
                source: ChordSource::Diatonic { degree: 1 },
                score: 1.0,
            })
            .collect();
        Progression::new(bars)
    }

    fn ii_v_i() -> Progression {
        progression(&["Dm7", "G7", "Cmaj7", "Cmaj7", "Em7", "A7", "Dm7", "G7"])
    }

    #[test]
    fn test_events_cover_eight_bars() {
        let arrangement = Arranger::default().arrange(&ii_v_i());
        assert_eq!(arrangement.events().len(), 16);
        assert_eq!(arrangement.voicings().len(), 8);
        assert_eq!(arrangement.span(), 32.0);

        let onsets: Vec<f64> = arrangement.events().iter().map(|e| e.onset).collect();
        assert_eq!(onsets[0], 0.0);
        assert_eq!(onsets[1], 2.0);
        assert_eq!(onsets[15], 30.0);
        assert!(onsets.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_accented_velocities() {
        let arrangement = Arranger::default().arrange(&ii_v_i());
        assert_eq!(arrangement.events()[0].velocity, 80);
        assert_eq!(arrangement.events()[1].velocity, 72);
    }

    #[test]
    fn test_bass_part() {
        let hits = CompPattern::Whole.hits();
        let arranger = Arranger::new(hits, VoiceLeader::default(), 90).with_bass(true);
        let arrangement = arranger.arrange(&ii_v_i());
        let roots: Vec<MidiNote> = arrangement
            .part(Part::Bass)
            .map(|e| e.notes[0])
            .collect();
        assert_eq!(roots, vec![38, 43, 36, 36, 40, 45, 38, 43]);
        assert_eq!(arrangement.part(Part::Comping).count(), 8);
    }

    #[test]
    fn test_arrangement_is_deterministic() {
        let arranger = Arranger::default();
        assert_eq!(arranger.arrange(&ii_v_i()), arranger.arrange(&ii_v_i()));
    }
}
