// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The chord vocabulary a key makes available to the analyzer.

use serde::Serialize;

use crate::music::{
    diatonic_sevenths, ChordSource, ChordTemplate, FunctionalRole, Key,
};

/// Which chords beyond the diatonic sevenths are offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabularyOptions {
    /// V7 of each non-diminished diatonic chord on degrees 2-6
    pub secondary_dominants: bool,
    /// Seventh chords of the parallel mode
    pub borrowed_chords: bool,
}

impl Default for VocabularyOptions {
    fn default() -> Self {
        Self {
            secondary_dominants: true,
            borrowed_chords: true,
        }
    }
}

/// A chord the analyzer may propose, with its function in the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    pub chord: ChordTemplate,
    pub role: FunctionalRole,
    pub source: ChordSource,
}

impl VocabularyEntry {
    /// Create an entry whose role follows from its source
    pub fn new(chord: ChordTemplate, source: ChordSource) -> Self {
        Self {
            chord,
            role: source.role(),
            source,
        }
    }
}

/// Ordered, duplicate-free list of candidate chords
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    /// Build the vocabulary for a key: diatonic sevenths first, then
    /// secondary dominants, then borrowed chords
    pub fn for_key(key: &Key, options: VocabularyOptions) -> Self {
        let diatonic = diatonic_sevenths(key.scale());
        let mut vocabulary = Self::default();

        for &(degree, chord) in &diatonic {
            vocabulary.push(VocabularyEntry::new(
                chord,
                ChordSource::Diatonic {
                    degree: degree as u8,
                },
            ));
        }

        if options.secondary_dominants {
            for &(degree, target) in diatonic.iter().filter(|(d, _)| (2..=6).contains(d)) {
                if target.quality().is_diminished() {
                    continue;
                }
                vocabulary.push(VocabularyEntry::new(
                    ChordTemplate::dominant_of(target.root()),
                    ChordSource::SecondaryDominant {
                        target_degree: degree as u8,
                    },
                ));
            }
        }

        if options.borrowed_chords {
            for (degree, chord) in diatonic_sevenths(key.parallel().scale()) {
                vocabulary.push(VocabularyEntry::new(
                    chord,
                    ChordSource::Borrowed {
                        degree: degree as u8,
                    },
                ));
            }
        }

        vocabulary
    }

    /// Build a vocabulary from explicit entries (duplicates dropped)
    pub fn from_entries(entries: impl IntoIterator<Item = VocabularyEntry>) -> Self {
        let mut vocabulary = Self::default();
        for entry in entries {
            vocabulary.push(entry);
        }
        vocabulary
    }

    fn push(&mut self, entry: VocabularyEntry) {
        if !self.entries.iter().any(|e| e.chord == entry.chord) {
            self.entries.push(entry);
        }
    }

    /// Get the entries in vocabulary order
    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// Number of chords
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no chord is available
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The tonic chord (diatonic degree 1), if present
    pub fn tonic(&self) -> Option<&VocabularyEntry> {
        self.entries
            .iter()
            .find(|e| e.source == ChordSource::Diatonic { degree: 1 })
    }

    /// Find the entry for a chord
    pub fn find(&self, chord: &ChordTemplate) -> Option<&VocabularyEntry> {
        self.entries.iter().find(|e| &e.chord == chord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{ChordQuality, Mode, PitchClass};

    fn c_major() -> Key {
        Key::new(PitchClass::C, Mode::Major)
    }

    fn symbols(vocabulary: &Vocabulary) -> Vec<String> {
        vocabulary.entries().iter().map(|e| e.chord.symbol()).collect()
    }

    #[test]
    fn test_diatonic_only() {
        let options = VocabularyOptions {
            secondary_dominants: false,
            borrowed_chords: false,
        };
        let vocabulary = Vocabulary::for_key(&c_major(), options);
        assert_eq!(
            symbols(&vocabulary),
            vec!["Cmaj7", "Dm7", "Em7", "Fmaj7", "G7", "Am7", "Bm7b5"]
        );
        assert!(vocabulary.entries().iter().all(|e| e.source.is_diatonic()));
        assert_eq!(vocabulary.tonic().unwrap().chord.symbol(), "Cmaj7");
    }

    #[test]
    fn test_secondary_dominants() {
        let options = VocabularyOptions {
            secondary_dominants: true,
            borrowed_chords: false,
        };
        let vocabulary = Vocabulary::for_key(&c_major(), options);
        assert_eq!(&symbols(&vocabulary)[7..], &["A7", "B7", "C7", "D7", "E7"]);

        let d7 = vocabulary
            .find(&ChordTemplate::new(PitchClass::D, ChordQuality::Dominant7))
            .unwrap();
        assert_eq!(d7.role, FunctionalRole::SecondaryDominant);
        assert_eq!(d7.source, ChordSource::SecondaryDominant { target_degree: 5 });
    }

    #[test]
    fn test_borrowed_chords_skip_duplicates() {
        let vocabulary = Vocabulary::for_key(&c_major(), VocabularyOptions::default());
        // C minor sevenths: Cm7 Dm7b5 Ebmaj7 Fm7 Gm7 Abmaj7 Bb7, none already present
        assert_eq!(vocabulary.len(), 7 + 5 + 7);

        let fm7 = vocabulary
            .find(&ChordTemplate::new(PitchClass::F, ChordQuality::Minor7))
            .unwrap();
        assert_eq!(fm7.source, ChordSource::Borrowed { degree: 4 });
        assert_eq!(fm7.role, FunctionalRole::Subdominant);
    }

    #[test]
    fn test_minor_key_dominant_not_duplicated() {
        // A harmonic minor already has E7 on degree 5
        let key = Key::new(PitchClass::A, Mode::HarmonicMinor);
        let vocabulary = Vocabulary::for_key(&key, VocabularyOptions::default());
        let e7 = ChordTemplate::new(PitchClass::E, ChordQuality::Dominant7);
        let matches = vocabulary.entries().iter().filter(|e| e.chord == e7).count();
        assert_eq!(matches, 1);
        assert_eq!(
            vocabulary.find(&e7).unwrap().source,
            ChordSource::Diatonic { degree: 5 }
        );
    }

    #[test]
    fn test_empty_vocabulary() {
        let vocabulary = Vocabulary::from_entries(Vec::new());
        assert!(vocabulary.is_empty());
        assert!(vocabulary.tonic().is_none());
    }
}
