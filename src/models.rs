//! Data models
//!
//! Lesson artifacts returned to callers. Field names are camelCase on the
//! wire to match the mobile client.

use serde::{Deserialize, Serialize};

/// Source and target language of a request. Both are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageContext {
    pub source_language: String,
    pub target_language: String,
}

impl LanguageContext {
    pub fn new(source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyTerm {
    pub term: String,
    pub transliteration: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub phrase: String,
    pub transliteration: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TinyLesson {
    pub vocabulary: Vec<VocabularyTerm>,
    pub phrases: Vec<Phrase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarExample {
    pub sentence: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarTopic {
    pub topic: String,
    pub description: String,
    pub examples: Vec<GrammarExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarLesson {
    pub relevant_grammar: Vec<GrammarTopic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub message: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlangConversation {
    pub context: String,
    pub dialogue: Vec<DialogueLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub descriptor: String,
    pub example_sentence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptors {
    pub descriptors: Vec<Descriptor>,
}

/// An object found in an image, with its box as `[x1, y1, x2, y2]` in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub name: String,
    pub pronunciation: String,
    pub translation: String,
    pub coordinates: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObjects {
    pub objects: Vec<DetectedObject>,
}
