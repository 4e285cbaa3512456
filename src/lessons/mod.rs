//! Lesson generators
//!
//! Every generator follows the same pipeline: build a function declaration
//! and an instruction, call the [`ModelAdapter`] once, check the reply names
//! the requested function, then decode its arguments into an artifact.
//! Any failure is logged and surfaced as [`Error::GenerationFailed`].

mod decode;
pub mod grammar;
pub mod slang_hang;
pub mod tiny_lesson;
pub mod word_cam;

pub use grammar::GrammarGenerator;
pub use slang_hang::SlangHangGenerator;
pub use tiny_lesson::TinyLessonGenerator;
pub use word_cam::WordCamGenerator;

use crate::ai::{FunctionCall, ModelAdapter};
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    TinyLesson,
    Grammar,
    SlangHang,
    ObjectDescriptors,
    DetectObjects,
}

impl Feature {
    /// Name of the function the model is asked to call.
    pub fn function_name(self) -> &'static str {
        match self {
            Self::TinyLesson => "generate_tiny_lesson",
            Self::Grammar => "generate_grammar_lesson",
            Self::SlangHang => "generate_slang_conversation",
            Self::ObjectDescriptors => "generate_object_descriptors",
            Self::DetectObjects => "detect_objects",
        }
    }

    /// Message shown to callers when generation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::TinyLesson => "Failed to generate tiny lesson",
            Self::Grammar => "Failed to generate grammar lesson",
            Self::SlangHang => "Failed to generate slang conversation",
            Self::ObjectDescriptors => "Failed to generate object descriptors",
            Self::DetectObjects => "Failed to detect objects",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TinyLesson => "tiny lesson",
            Self::Grammar => "grammar lesson",
            Self::SlangHang => "slang conversation",
            Self::ObjectDescriptors => "object descriptors",
            Self::DetectObjects => "object detections",
        };
        f.write_str(name)
    }
}

/// All generators, sharing one adapter.
#[derive(Clone)]
pub struct Lessons {
    pub tiny_lesson: TinyLessonGenerator,
    pub grammar: GrammarGenerator,
    pub slang_hang: SlangHangGenerator,
    pub word_cam: WordCamGenerator,
}

impl Lessons {
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self {
            tiny_lesson: TinyLessonGenerator::new(adapter.clone()),
            grammar: GrammarGenerator::new(adapter.clone()),
            slang_hang: SlangHangGenerator::new(adapter.clone()),
            word_cam: WordCamGenerator::new(adapter),
        }
    }
}

/// Arguments of `call`, provided it invoked the function `feature` asked for.
fn expect_call(call: &FunctionCall, feature: Feature) -> Result<&Map<String, Value>> {
    if call.name != feature.function_name() {
        return Err(Error::SchemaMismatch(format!(
            "expected a call to {}, got {}",
            feature.function_name(),
            call.name
        )));
    }
    Ok(&call.args)
}

fn fail(feature: Feature, e: Error) -> Error {
    tracing::error!("Error generating {}: {}", feature, e);
    Error::generation_failed(feature, e)
}
