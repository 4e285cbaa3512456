//! Vocabulary and phrases for a learning purpose.

use super::{decode, expect_call, fail, Feature};
use crate::ai::{FunctionDeclaration, ModelAdapter};
use crate::models::{LanguageContext, Phrase, TinyLesson, VocabularyTerm};
use crate::schema::Schema;
use crate::{prompts, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct TinyLessonGenerator {
    adapter: Arc<dyn ModelAdapter>,
}

impl TinyLessonGenerator {
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn generate(&self, languages: &LanguageContext, purpose: &str) -> Result<TinyLesson> {
        self.try_generate(languages, purpose)
            .await
            .map_err(|e| fail(Feature::TinyLesson, e))
    }

    async fn try_generate(&self, languages: &LanguageContext, purpose: &str) -> Result<TinyLesson> {
        let declaration = declaration()?;
        let instruction = prompts::render(
            prompts::TINY_LESSON,
            &[
                ("source_language", languages.source_language.as_str()),
                ("target_language", languages.target_language.as_str()),
                ("purpose", purpose),
            ],
        );

        let call = self.adapter.generate(&instruction, &declaration, None).await?;
        let args = expect_call(&call, Feature::TinyLesson)?;
        Ok(decode_lesson(args))
    }
}

fn declaration() -> Result<FunctionDeclaration> {
    let term = Schema::object(
        [
            (
                "term",
                Schema::string().describe("The vocabulary term in the target language"),
            ),
            (
                "transliteration",
                Schema::string().describe("Transliteration of the term (for non-Latin scripts)"),
            ),
            (
                "translation",
                Schema::string().describe("Translation or explanation of the term"),
            ),
        ],
        &["term", "translation"],
    )?;

    let phrase = Schema::object(
        [
            (
                "phrase",
                Schema::string().describe("The phrase in the target language"),
            ),
            (
                "transliteration",
                Schema::string().describe("Transliteration of the phrase (for non-Latin scripts)"),
            ),
            (
                "translation",
                Schema::string().describe("Translation or explanation of the phrase"),
            ),
        ],
        &["phrase", "translation"],
    )?;

    let parameters = Schema::object(
        [
            (
                "vocabulary",
                Schema::array(term).describe("Vocabulary terms relevant to the purpose"),
            ),
            (
                "phrases",
                Schema::array(phrase).describe("Useful phrases for the given context"),
            ),
        ],
        &["vocabulary", "phrases"],
    )?;

    Ok(FunctionDeclaration::new(
        Feature::TinyLesson.function_name(),
        "Generate vocabulary and phrases for a specific language learning context",
        parameters,
    ))
}

fn decode_lesson(args: &Map<String, Value>) -> TinyLesson {
    TinyLesson {
        vocabulary: decode::objects(args, "vocabulary")
            .map(|item| VocabularyTerm {
                term: decode::text(item, "term"),
                transliteration: decode::text(item, "transliteration"),
                translation: decode::text(item, "translation"),
            })
            .collect(),
        phrases: decode::objects(args, "phrases")
            .map(|item| Phrase {
                phrase: decode::text(item, "phrase"),
                transliteration: decode::text(item, "transliteration"),
                translation: decode::text(item, "translation"),
            })
            .collect(),
    }
}
