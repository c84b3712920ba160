// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Rhythmic arrangement of a progression.
//!
//! This module provides:
//! - Voicings: close, rootless and drop-2 shapes with voice-led selection
//! - Comping: bar-relative rhythm patterns
//! - Arranger: progression to time-ordered events, and MIDI tick events
//!   for a playback scheduler

pub mod arranger;
pub mod comping;
pub mod voicing;

use serde::Serialize;

use crate::music::MidiNote;

pub use arranger::{Arranger, DEFAULT_COMP_VELOCITY};
pub use comping::{CompHit, CompPattern};
pub use voicing::{voice_leading_distance, Register, VoiceLeader, Voicing, VoicingStyle};

/// Ticks per quarter note used for MIDI output
pub const PPQN: u32 = 24;

/// Which instrument plays an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Comping,
    Bass,
}

impl Part {
    /// MIDI channel (0-15)
    pub fn channel(self) -> u8 {
        match self {
            Part::Comping => 0,
            Part::Bass => 1,
        }
    }
}

/// Notes struck together at one point in the arrangement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrangementEvent {
    /// Start in beats
    pub onset: f64,
    /// Length in beats
    pub duration: f64,
    pub velocity: u8,
    /// MIDI notes, lowest first
    pub notes: Vec<MidiNote>,
    pub part: Part,
}

/// MIDI note event for a playback scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MidiEvent {
    /// MIDI note number (0-127)
    pub note: u8,
    /// Velocity (0-127)
    pub velocity: u8,
    /// Start time in ticks from the top of the arrangement
    pub start_tick: u64,
    /// Duration in ticks
    pub duration_ticks: u64,
    /// MIDI channel (0-15)
    pub channel: u8,
}

impl MidiEvent {
    /// Create a new MIDI event
    pub fn new(note: u8, velocity: u8, start_tick: u64, duration_ticks: u64) -> Self {
        Self {
            note,
            velocity,
            start_tick,
            duration_ticks,
            channel: 0,
        }
    }

    /// Set the channel for this event
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }
}

/// Time-ordered events spanning the eight bars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrangement {
    events: Vec<ArrangementEvent>,
    voicings: Vec<Voicing>,
    bar_length: f64,
    bars: usize,
    tempo: f64,
}

impl Arrangement {
    pub(crate) fn new(
        events: Vec<ArrangementEvent>,
        voicings: Vec<Voicing>,
        bar_length: f64,
        tempo: f64,
    ) -> Self {
        let bars = voicings.len();
        Self {
            events,
            voicings,
            bar_length,
            bars,
            tempo,
        }
    }

    /// Events ordered by onset
    pub fn events(&self) -> &[ArrangementEvent] {
        &self.events
    }

    /// Comping voicing of each bar
    pub fn voicings(&self) -> &[Voicing] {
        &self.voicings
    }

    /// Events played by one part
    pub fn part(&self, part: Part) -> impl Iterator<Item = &ArrangementEvent> {
        self.events.iter().filter(move |e| e.part == part)
    }

    /// Bar length in beats
    pub fn bar_length(&self) -> f64 {
        self.bar_length
    }

    /// Total length in beats
    pub fn span(&self) -> f64 {
        self.bar_length * self.bars as f64
    }

    /// Tempo in BPM
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Total length in seconds at the arrangement tempo
    pub fn duration_seconds(&self) -> f64 {
        if self.tempo <= 0.0 {
            return 0.0;
        }
        self.span() * 60.0 / self.tempo
    }

    /// Flatten into one MIDI event per note, ordered by start tick
    pub fn to_midi_events(&self, ppqn: u32) -> Vec<MidiEvent> {
        let ticks = |beats: f64| (beats * ppqn as f64).round().max(0.0) as u64;
        let mut midi: Vec<MidiEvent> = self
            .events
            .iter()
            .flat_map(|event| {
                let start = ticks(event.onset);
                let length = ticks(event.duration).max(1);
                event.notes.iter().map(move |&note| {
                    MidiEvent::new(note, event.velocity, start, length)
                        .with_channel(event.part.channel())
                })
            })
            .collect();
        midi.sort_by_key(|e| (e.start_tick, e.channel, e.note));
        midi
    }
}
