//! Grammar topics with worked examples for a learning purpose.

use super::{decode, expect_call, fail, Feature};
use crate::ai::{FunctionDeclaration, ModelAdapter};
use crate::models::{GrammarExample, GrammarLesson, GrammarTopic, LanguageContext};
use crate::schema::Schema;
use crate::{prompts, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct GrammarGenerator {
    adapter: Arc<dyn ModelAdapter>,
}

impl GrammarGenerator {
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn generate(
        &self,
        languages: &LanguageContext,
        purpose: &str,
    ) -> Result<GrammarLesson> {
        self.try_generate(languages, purpose)
            .await
            .map_err(|e| fail(Feature::Grammar, e))
    }

    async fn try_generate(
        &self,
        languages: &LanguageContext,
        purpose: &str,
    ) -> Result<GrammarLesson> {
        let declaration = declaration()?;
        let instruction = prompts::render(
            prompts::GRAMMAR,
            &[
                ("source_language", languages.source_language.as_str()),
                ("target_language", languages.target_language.as_str()),
                ("purpose", purpose),
            ],
        );

        let call = self.adapter.generate(&instruction, &declaration, None).await?;
        let args = expect_call(&call, Feature::Grammar)?;
        Ok(decode_lesson(args))
    }
}

fn declaration() -> Result<FunctionDeclaration> {
    let example = Schema::object(
        [
            (
                "sentence",
                Schema::string().describe("An example sentence demonstrating the grammar rule"),
            ),
            (
                "explanation",
                Schema::string()
                    .describe("Explanation of how the grammar rule is applied in the sentence"),
            ),
        ],
        &["sentence", "explanation"],
    )?;

    let topic = Schema::object(
        [
            (
                "topic",
                Schema::string().describe("The grammar topic relevant to the context"),
            ),
            (
                "description",
                Schema::string().describe("Description of the grammar rule"),
            ),
            (
                "examples",
                Schema::array(example).describe("Examples of the grammar rule in use"),
            ),
        ],
        &["topic", "description", "examples"],
    )?;

    let parameters = Schema::object(
        [(
            "relevantGrammar",
            Schema::array(topic).describe("Grammar topics relevant to the purpose"),
        )],
        &["relevantGrammar"],
    )?;

    Ok(FunctionDeclaration::new(
        Feature::Grammar.function_name(),
        "Generate grammar topics and examples for a specific language learning context",
        parameters,
    ))
}

fn decode_lesson(args: &Map<String, Value>) -> GrammarLesson {
    GrammarLesson {
        relevant_grammar: decode::objects(args, "relevantGrammar")
            .map(|topic| GrammarTopic {
                topic: decode::text(topic, "topic"),
                description: decode::text(topic, "description"),
                examples: decode::objects(topic, "examples")
                    .map(|example| GrammarExample {
                        sentence: decode::text(example, "sentence"),
                        explanation: decode::text(example, "explanation"),
                    })
                    .collect(),
            })
            .collect(),
    }
}
