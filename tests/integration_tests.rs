// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for the harmonizer
//!
//! These tests drive the public API from melody to arrangement.

use std::fs;
use std::sync::Arc;
use std::thread;

use harmonize::analysis::{segment, ConsonanceWeights, Continuity, HarmonicAnalyzer, Vocabulary};
use harmonize::arrangement::{Part, VoiceLeader, PPQN};
use harmonize::progression::selection_weights;
use harmonize::{
    ChordTemplate, HarmonizeError, HarmonizeRequest, Harmonization, Harmonizer, HarmonizerConfig,
    Key, Melody, MelodyNote, Mode, PitchClass, Surprise,
};
use tempfile::tempdir;

fn harmonizer() -> Harmonizer {
    Harmonizer::new(HarmonizerConfig::default()).unwrap()
}

fn c_major() -> Key {
    Key::new(PitchClass::C, Mode::Major)
}

fn arpeggio_melody() -> Melody {
    Melody::parse("C4 E4 G4 C4").unwrap().repeated(8)
}

fn run(melody: Melody, surprise: f64, seed: u64) -> Harmonization {
    let request = HarmonizeRequest::new(melody)
        .with_key(c_major())
        .with_surprise(Surprise::new(surprise).unwrap())
        .with_seed(seed);
    harmonizer().harmonize(&request).unwrap()
}

fn symbols(result: &Harmonization) -> Vec<String> {
    result.progression.chords().iter().map(|c| c.symbol()).collect()
}

/// Every sounding bar's chord holds at least one of the bar's melody pitch classes
fn assert_consonant(result: &Harmonization) {
    for (bar, window) in result.progression.bars().iter().zip(&result.windows) {
        if window.is_silent() {
            continue;
        }
        assert!(
            window
                .pitch_classes()
                .iter()
                .any(|&pc| bar.chord.contains(pc)),
            "bar {} chord {} shares no pitch with the melody",
            bar.index + 1,
            bar.chord
        );
    }
}

/// The arpeggiated C major melody at surprise 0 stays diatonic and opens on the tonic
#[test]
fn test_predictable_c_major_progression() {
    let result = run(arpeggio_melody(), 0.0, 0);

    assert_eq!(result.progression.len(), 8);
    assert_eq!(result.progression.bars()[0].chord.symbol(), "Cmaj7");
    assert!(result
        .progression
        .bars()
        .iter()
        .all(|bar| bar.source.is_diatonic()));
    assert_consonant(&result);
}

/// Full surprise with a fixed seed wanders away from the predictable walk
#[test]
fn test_full_surprise_changes_progression() {
    let predictable = run(arpeggio_melody(), 0.0, 42);
    let surprising = run(arpeggio_melody(), 1.0, 42);

    let differing = symbols(&predictable)
        .iter()
        .zip(symbols(&surprising).iter())
        .filter(|(a, b)| a != b)
        .count();
    assert!(differing >= 1);
    assert_consonant(&surprising);
}

/// Identical inputs give identical progressions and arrangements
#[test]
fn test_deterministic_for_same_seed() {
    for surprise in [0.0, 0.3, 0.7, 1.0] {
        let first = run(arpeggio_melody(), surprise, 1234);
        let second = run(arpeggio_melody(), surprise, 1234);
        assert_eq!(first.progression, second.progression);
        assert_eq!(first.arrangement, second.arrangement);
    }
}

/// Chosen chords always contain a melody pitch class, whatever the surprise
#[test]
fn test_chords_share_melody_tones() {
    let melodies = [
        "C4 D4 E4 F4 G4 A4 B4 C5 B4 A4 G4 F4 E4 D4 C4:2",
        "E4:2 G4:2 A4 B4 C5 D5 E5:4 R:4 D5 C5 B4 A4 G4:4",
        "R:6 A4 B4 C5:2 E5:2 F5 E5 D5 C5 B4:4",
        "G4:0.5 A4:0.5 B4 D5 F5 E5:3 C5 A4:0.5 G4:0.5",
    ];
    for text in melodies {
        for seed in 0..10 {
            let result = run(Melody::parse(text).unwrap(), 0.6, seed);
            assert_consonant(&result);
        }
    }

    // Out-of-key and chromatic lines against the declared C major
    let chromatic = [
        Melody::parse("R:0.5 C#4 F#4 G#4 R:0.5").unwrap().repeated(8),
        Melody::parse("C4 C#4 D4 D#4 E4 F4 F#4 G4 G#4 A4 A#4 B4").unwrap().repeated(2),
        Melody::parse("Eb4:3 C4 Ab4:2 F#4:2 Db5:4 B4:2 E4:2").unwrap().repeated(2),
        Melody::parse("F#4:4 C#5:4 G#4:4 D#5:4 A#4:4 F5:4 C6:4 G#4:4").unwrap(),
    ];
    for melody in chromatic {
        for surprise in [0.0, 0.6, 1.0] {
            for seed in 0..10 {
                let result = run(melody.clone(), surprise, seed);
                assert!(result.key_declared);
                assert_consonant(&result);
                assert!(result
                    .candidates
                    .iter()
                    .all(|set| set.continuity() != Continuity::TonicFallback));
            }
        }
    }
}

/// Progressions always cover eight contiguous bars
#[test]
fn test_progression_covers_eight_bars() {
    let cases = [
        (Melody::parse("C4").unwrap(), 4.0),
        (arpeggio_melody(), 4.0),
        (Melody::parse("C4:4").unwrap().repeated(12), 6.0),
    ];
    for (melody, bar_length) in cases {
        let result = run(melody, 0.5, 9);
        let progression = &result.progression;
        assert_eq!(progression.len(), 8);
        assert!(progression.is_contiguous());
        assert_eq!(progression.bar_length(), bar_length);
        assert_eq!(progression.span(), bar_length * 8.0);
        assert_eq!(result.arrangement.span(), bar_length * 8.0);
    }
}

/// Raising surprise never makes the favourite candidate more likely
#[test]
fn test_top_candidate_probability_non_increasing() {
    let key = c_major();
    let vocabulary = Vocabulary::for_key(&key, Default::default());
    let windows = segment(&arpeggio_melody(), 4);
    let sets = HarmonicAnalyzer::new(&key, &vocabulary, ConsonanceWeights::default())
        .analyze(&windows)
        .unwrap();

    for set in &sets {
        let combined: Vec<f64> = set.candidates().iter().map(|c| c.score + 0.05).collect();
        let mut previous = f64::INFINITY;
        for step in 0..=10 {
            let surprise = Surprise::new(step as f64 / 10.0).unwrap();
            let weights = selection_weights(&combined, surprise);
            let top = weights[0];
            assert!(top <= previous + 1e-12);
            assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            previous = top;
        }
    }
}

/// Voicing the same chord sequence twice gives the same notes
#[test]
fn test_voicing_is_deterministic() {
    let chords: Vec<ChordTemplate> = ["Dm7", "G7", "Cmaj7", "A7", "Dm7", "G7", "Cmaj7", "Cmaj7"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let leader = VoiceLeader::default();
    let first = leader.voice(&chords);
    let second = leader.voice(&chords);
    assert_eq!(first, second);
    assert_eq!(first[0].notes, vec![62, 65, 69, 72]);
}

/// The arrangement converts to 24 PPQN MIDI events per part
#[test]
fn test_midi_events() {
    let mut config = HarmonizerConfig::default();
    config.arrangement.bass = true;
    let harmonizer = Harmonizer::new(config).unwrap();
    let request = HarmonizeRequest::new(arpeggio_melody())
        .with_key(c_major())
        .with_seed(5);
    let result = harmonizer.harmonize(&request).unwrap();

    assert_eq!(PPQN, 24);
    assert_eq!(result.arrangement.part(Part::Bass).count(), 8);
    let midi = result.midi_events();
    // Two four-note hits per bar plus one bass note
    assert_eq!(midi.len(), 8 * (2 * 4 + 1));
    assert!(midi.windows(2).all(|pair| pair[0].start_tick <= pair[1].start_tick));
    assert_eq!(midi.last().map(|e| e.start_tick), Some(7 * 96 + 48));
    assert!(midi.iter().any(|e| e.channel == Part::Bass.channel()));
}

/// Results serialize to JSON for downstream tools
#[test]
fn test_json_output() {
    let result = run(arpeggio_melody(), 0.0, 3);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["seed"], 3);
    assert_eq!(json["progression"]["bars"].as_array().map(Vec::len), Some(8));
    assert_eq!(json["key"]["tonic"], "C");
}

/// A shared harmonizer gives the same answers from many threads
#[test]
fn test_shared_across_threads() {
    let harmonizer = Arc::new(harmonizer());
    let expected = run(arpeggio_melody(), 0.8, 77).progression;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let harmonizer = Arc::clone(&harmonizer);
            thread::spawn(move || {
                let request = HarmonizeRequest::new(arpeggio_melody())
                    .with_key(c_major())
                    .with_surprise(Surprise::new(0.8).unwrap())
                    .with_seed(77);
                harmonizer.harmonize(&request).unwrap().progression
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_load_yaml_config() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("harmonize.yaml");

    let yaml = r#"
harmony:
  key: "F"
  surprise: 0.25
  seed: 99

arrangement:
  pattern: two_and_four
  bass: true
"#;
    fs::write(&file_path, yaml).unwrap();

    let config = HarmonizerConfig::load(&file_path).unwrap();
    assert_eq!(config.harmony.seed, Some(99));

    let harmonizer = Harmonizer::new(config).unwrap();
    let request = harmonizer.request(arpeggio_melody()).unwrap();
    let result = harmonizer.harmonize(&request).unwrap();
    assert_eq!(result.key, Key::new(PitchClass::F, Mode::Major));
    assert_eq!(result.seed, 99);
    assert_eq!(result.arrangement.events()[0].onset, 0.0);
    assert_eq!(result.arrangement.events()[0].notes.len(), 1);
}

#[test]
fn test_load_toml_config() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("harmonize.toml");

    let text = r#"
[harmony]
key_detection = "krumhansl"

[meter]
beats_per_bar = 3
"#;
    fs::write(&file_path, text).unwrap();

    let config = HarmonizerConfig::load(&file_path).unwrap();
    assert_eq!(config.meter.beats_per_bar, 3);

    let harmonizer = Harmonizer::new(config).unwrap();
    let result = harmonizer
        .harmonize(&HarmonizeRequest::new(Melody::parse("C4 E4 G4").unwrap()).with_seed(1))
        .unwrap();
    assert_eq!(result.progression.bar_length(), 3.0);
}

#[test]
fn test_load_invalid_config() {
    let dir = tempdir().unwrap();

    let broken = dir.path().join("broken.yaml");
    fs::write(&broken, "harmony: [").unwrap();
    assert!(HarmonizerConfig::load(&broken).is_err());

    let unsupported = dir.path().join("settings.ini");
    fs::write(&unsupported, "key = C").unwrap();
    assert!(HarmonizerConfig::load(&unsupported).is_err());

    let nonsense = dir.path().join("nonsense.yaml");
    fs::write(&nonsense, "meter:\n  tempo: -10\n").unwrap();
    assert!(HarmonizerConfig::load(&nonsense).is_err());

    assert!(HarmonizerConfig::load(dir.path().join("missing.yaml")).is_err());
}

#[test]
fn test_empty_melody_rejected() {
    assert!(matches!(
        Melody::new(Vec::new()),
        Err(HarmonizeError::InvalidMelody(_))
    ));
    assert!(matches!(
        Melody::parse(""),
        Err(HarmonizeError::InvalidMelody(_))
    ));
    assert!(matches!(
        Melody::parse("R:4"),
        Err(HarmonizeError::InvalidMelody(_))
    ));
}

#[test]
fn test_invalid_surprise_rejected() {
    assert!(matches!(
        Surprise::new(f64::NAN),
        Err(HarmonizeError::InvalidSurprise(_))
    ));
    assert!(matches!(
        "very".parse::<Surprise>(),
        Err(HarmonizeError::InvalidSurprise(_))
    ));
    assert_eq!(Surprise::new(3.0).unwrap(), Surprise::UNIFORM);
}

#[test]
fn test_empty_vocabulary_unresolvable() {
    let key = c_major();
    let vocabulary = Vocabulary::from_entries(Vec::new());
    let windows = segment(&arpeggio_melody(), 4);
    let result = HarmonicAnalyzer::new(&key, &vocabulary, ConsonanceWeights::default())
        .analyze(&windows);
    assert!(matches!(
        result,
        Err(HarmonizeError::UnresolvableWindow { .. })
    ));
}

#[test]
fn test_invalid_pitch_input_rejected() {
    assert!(matches!(
        PitchClass::from_index(12),
        Err(HarmonizeError::InvalidPitchClass(12))
    ));
    assert!(MelodyNote::parse("H4", 0.0, 1.0).is_err());
    assert!(MelodyNote::parse("C4", -1.0, 1.0).is_err());
    assert!(MelodyNote::parse("C4", 0.0, 0.0).is_err());
}
