use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::tokenizer;
use crate::exercise::cloze;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceUnit {
    pub target: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub distractors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClozeUnit {
    pub text: String,
    #[serde(default)]
    pub distractors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingUnit {
    pub pairs: Vec<MatchingPair>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unit {
    Sentence(SentenceUnit),
    Cloze(ClozeUnit),
    Matching(MatchingUnit),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Sentence,
    Cloze,
    Matching,
}

impl UnitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Sentence => "sentence",
            UnitKind::Cloze => "cloze",
            UnitKind::Matching => "matching",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("sentence has no words to type")]
    EmptySentence,
    #[error("unterminated '[' at byte {0}")]
    UnterminatedBracket(usize),
    #[error("unexpected ']' at byte {0}")]
    UnexpectedClosingBracket(usize),
    #[error("empty blank '[]' at byte {0}")]
    EmptyBlank(usize),
    #[error("nested '[' at byte {0}")]
    NestedBracket(usize),
    #[error("cloze text has no blanks")]
    NoBlanks,
    #[error("matching group has no pairs")]
    NoPairs,
}

impl Unit {
    pub fn sentence(target: &str, source: &str) -> Self {
        Unit::Sentence(SentenceUnit {
            target: target.to_string(),
            source: source.to_string(),
            distractors: Vec::new(),
        })
    }

    pub fn cloze(text: &str, distractors: &[&str]) -> Self {
        Unit::Cloze(ClozeUnit {
            text: text.to_string(),
            distractors: distractors.iter().map(|d| d.to_string()).collect(),
        })
    }

    pub fn matching(pairs: &[(&str, &str)]) -> Self {
        Unit::Matching(MatchingUnit {
            pairs: pairs
                .iter()
                .map(|(source, target)| MatchingPair {
                    source: source.to_string(),
                    target: target.to_string(),
                })
                .collect(),
        })
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Sentence(_) => UnitKind::Sentence,
            Unit::Cloze(_) => UnitKind::Cloze,
            Unit::Matching(_) => UnitKind::Matching,
        }
    }

    /// Strict check for callers that want to reject content up front. The
    /// exercises themselves accept anything and degrade to an empty round.
    pub fn validate(&self) -> Result<(), UnitError> {
        match self {
            Unit::Sentence(s) => {
                if tokenizer::tokenize(&s.target).iter().any(|t| t.is_word()) {
                    Ok(())
                } else {
                    Err(UnitError::EmptySentence)
                }
            }
            Unit::Cloze(c) => {
                let parsed = cloze::parse_cloze(&c.text)?;
                if parsed.answers().next().is_none() {
                    return Err(UnitError::NoBlanks);
                }
                Ok(())
            }
            Unit::Matching(m) => {
                if m.pairs.is_empty() {
                    Err(UnitError::NoPairs)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A titled list of units, as stored in lesson files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default)]
    pub title: String,
    pub units: Vec<Unit>,
}

impl Lesson {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_units() {
        let json = r#"{
            "title": "Basics",
            "units": [
                {"kind": "sentence", "target": "Dobrý deň", "source": "Good day"},
                {"kind": "cloze", "text": "The [cat] sat", "distractors": ["dog"]},
                {"kind": "matching", "pairs": [{"source": "a", "target": "b"}]}
            ]
        }"#;
        let lesson = Lesson::from_json(json).unwrap();
        assert_eq!(lesson.title, "Basics");
        let kinds: Vec<UnitKind> = lesson.units.iter().map(Unit::kind).collect();
        assert_eq!(
            kinds,
            vec![UnitKind::Sentence, UnitKind::Cloze, UnitKind::Matching]
        );
        assert_eq!(lesson.units[1], Unit::cloze("The [cat] sat", &["dog"]));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let json = r#"{"units": [{"kind": "essay", "text": "x"}]}"#;
        assert!(Lesson::from_json(json).is_err());
    }

    #[test]
    fn test_validate_sentence() {
        assert!(Unit::sentence("Hi", "Ahoj").validate().is_ok());
        assert_eq!(
            Unit::sentence("?!", "").validate(),
            Err(UnitError::EmptySentence)
        );
        assert_eq!(
            Unit::sentence("", "").validate(),
            Err(UnitError::EmptySentence)
        );
    }

    #[test]
    fn test_validate_cloze() {
        assert!(Unit::cloze("The [cat] sat", &[]).validate().is_ok());
        assert_eq!(
            Unit::cloze("The [cat sat", &[]).validate(),
            Err(UnitError::UnterminatedBracket(4))
        );
        assert_eq!(
            Unit::cloze("no blanks here", &[]).validate(),
            Err(UnitError::NoBlanks)
        );
    }

    #[test]
    fn test_validate_matching() {
        assert!(Unit::matching(&[("pes", "dog")]).validate().is_ok());
        assert_eq!(Unit::matching(&[]).validate(), Err(UnitError::NoPairs));
    }
}
