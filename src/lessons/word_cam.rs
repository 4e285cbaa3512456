//! Image-grounded vocabulary: object detection and object descriptors.

use super::{decode, expect_call, fail, Feature};
use crate::ai::{FunctionDeclaration, ModelAdapter};
use crate::media::MediaAttachment;
use crate::models::{
    Descriptor, DetectedObject, DetectedObjects, ImageDimensions, LanguageContext,
    ObjectDescriptors,
};
use crate::schema::Schema;
use crate::{prompts, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct WordCamGenerator {
    adapter: Arc<dyn ModelAdapter>,
}

impl WordCamGenerator {
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self { adapter }
    }

    /// Descriptive words for one object visible in `image`.
    pub async fn describe_object(
        &self,
        languages: &LanguageContext,
        object: &str,
        image: &MediaAttachment,
    ) -> Result<ObjectDescriptors> {
        self.try_describe_object(languages, object, image)
            .await
            .map_err(|e| fail(Feature::ObjectDescriptors, e))
    }

    /// Objects found in `image`, boxed in the pixel space of `dimensions`.
    pub async fn detect_objects(
        &self,
        languages: &LanguageContext,
        image: &MediaAttachment,
        dimensions: ImageDimensions,
    ) -> Result<DetectedObjects> {
        self.try_detect_objects(languages, image, dimensions)
            .await
            .map_err(|e| fail(Feature::DetectObjects, e))
    }

    async fn try_describe_object(
        &self,
        languages: &LanguageContext,
        object: &str,
        image: &MediaAttachment,
    ) -> Result<ObjectDescriptors> {
        let declaration = descriptors_declaration()?;
        let instruction = prompts::render(
            prompts::OBJECT_DESCRIPTORS,
            &[
                ("source_language", languages.source_language.as_str()),
                ("target_language", languages.target_language.as_str()),
                ("object", object),
            ],
        );

        let call = self
            .adapter
            .generate(&instruction, &declaration, Some(image))
            .await?;
        let args = expect_call(&call, Feature::ObjectDescriptors)?;
        Ok(decode_descriptors(args))
    }

    async fn try_detect_objects(
        &self,
        languages: &LanguageContext,
        image: &MediaAttachment,
        dimensions: ImageDimensions,
    ) -> Result<DetectedObjects> {
        let declaration = detection_declaration()?;
        let width = dimensions.width.to_string();
        let height = dimensions.height.to_string();
        let instruction = prompts::render(
            prompts::DETECT_OBJECTS,
            &[
                ("source_language", languages.source_language.as_str()),
                ("target_language", languages.target_language.as_str()),
                ("width", width.as_str()),
                ("height", height.as_str()),
            ],
        );

        let call = self
            .adapter
            .generate(&instruction, &declaration, Some(image))
            .await?;
        let args = expect_call(&call, Feature::DetectObjects)?;
        decode_detections(args)
    }
}

fn descriptors_declaration() -> Result<FunctionDeclaration> {
    let descriptor = Schema::object(
        [
            (
                "descriptor",
                Schema::string().describe("A descriptive word or phrase in the target language"),
            ),
            (
                "exampleSentence",
                Schema::string().describe("An example sentence using the descriptor"),
            ),
        ],
        &["descriptor", "exampleSentence"],
    )?;

    let parameters = Schema::object(
        [(
            "descriptors",
            Schema::array(descriptor).describe("Descriptors for the object"),
        )],
        &["descriptors"],
    )?;

    Ok(FunctionDeclaration::new(
        Feature::ObjectDescriptors.function_name(),
        "Generate descriptive words and example sentences for an object in an image",
        parameters,
    ))
}

fn detection_declaration() -> Result<FunctionDeclaration> {
    let coordinates = Schema::array(Schema::number())
        .describe("Bounding box as [x1, y1, x2, y2] in pixels")
        .item_bounds(4, 4)?;

    let object = Schema::object(
        [
            (
                "name",
                Schema::string().describe("Name of the object in the target language"),
            ),
            (
                "pronunciation",
                Schema::string().describe("Pronunciation guide for non-Latin scripts"),
            ),
            (
                "translation",
                Schema::string().describe("Translation of the object name in the source language"),
            ),
            ("coordinates", coordinates),
        ],
        &["name", "translation", "coordinates"],
    )?;

    let parameters = Schema::object(
        [(
            "objects",
            Schema::array(object).describe("Objects detected in the image"),
        )],
        &["objects"],
    )?;

    Ok(FunctionDeclaration::new(
        Feature::DetectObjects.function_name(),
        "Detect objects in an image and name them in the target language",
        parameters,
    ))
}

fn decode_descriptors(args: &Map<String, Value>) -> ObjectDescriptors {
    ObjectDescriptors {
        descriptors: decode::objects(args, "descriptors")
            .map(|item| Descriptor {
                descriptor: decode::text(item, "descriptor"),
                example_sentence: decode::text(item, "exampleSentence"),
            })
            .collect(),
    }
}

fn decode_detections(args: &Map<String, Value>) -> Result<DetectedObjects> {
    let objects = decode::objects(args, "objects")
        .map(|item| {
            Ok(DetectedObject {
                name: decode::text(item, "name"),
                pronunciation: decode::text(item, "pronunciation"),
                translation: decode::text(item, "translation"),
                coordinates: decode::bounding_box(item, "coordinates")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DetectedObjects { objects })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockModelAdapter;
    use crate::media::MediaPolicy;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn jpeg() -> MediaAttachment {
        MediaPolicy::new(vec!["image/jpeg".to_string()], 5)
            .decode("aGVsbG8gd29ybGQ=", "image/jpeg")
            .unwrap()
    }

    fn english_spanish() -> LanguageContext {
        LanguageContext::new("English", "Spanish")
    }

    #[test]
    fn test_detection_declaration_bounds_coordinates() {
        let declaration = detection_declaration().unwrap();
        let value = serde_json::to_value(&declaration.parameters).unwrap();
        let coordinates = &value["properties"]["objects"]["items"]["properties"]["coordinates"];
        assert_eq!(coordinates["minItems"], json!(4));
        assert_eq!(coordinates["maxItems"], json!(4));
    }

    #[tokio::test]
    async fn test_detect_objects_passes_coordinates_through() {
        let mock = Arc::new(MockModelAdapter::new().with_call(
            "detect_objects",
            json!({
                "objects": [
                    { "name": "taza", "translation": "cup", "coordinates": [120, 80, 340, 310] },
                    { "name": "mesa", "pronunciation": "", "translation": "table", "coordinates": [0, 300.5, 800, 600] }
                ]
            }),
        ));
        let generator = WordCamGenerator::new(mock.clone());

        let detected = generator
            .detect_objects(
                &english_spanish(),
                &jpeg(),
                ImageDimensions {
                    width: 800,
                    height: 600,
                },
            )
            .await
            .unwrap();

        assert_eq!(
            detected.objects[0],
            DetectedObject {
                name: "taza".to_string(),
                pronunciation: String::new(),
                translation: "cup".to_string(),
                coordinates: [120.0, 80.0, 340.0, 310.0],
            }
        );
        assert_eq!(detected.objects[1].coordinates, [0.0, 300.5, 800.0, 600.0]);

        let calls = mock.calls();
        assert_eq!(calls[0].media_mime_type.as_deref(), Some("image/jpeg"));
        assert!(calls[0].instruction.contains("800 pixels wide"));
        assert!(calls[0].instruction.contains("600 pixels high"));
    }

    #[tokio::test]
    async fn test_short_coordinates_fail_detection() {
        let mock = Arc::new(MockModelAdapter::new().with_call(
            "detect_objects",
            json!({ "objects": [{ "name": "taza", "translation": "cup", "coordinates": [1, 2, 3] }] }),
        ));

        let err = WordCamGenerator::new(mock)
            .detect_objects(
                &english_spanish(),
                &jpeg(),
                ImageDimensions {
                    width: 800,
                    height: 600,
                },
            )
            .await
            .unwrap_err();

        match err {
            Error::GenerationFailed { feature, source } => {
                assert_eq!(feature, Feature::DetectObjects);
                assert!(matches!(*source, Error::SchemaMismatch(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_numeric_coordinate_fails_detection() {
        let mock = Arc::new(MockModelAdapter::new().with_call(
            "detect_objects",
            json!({ "objects": [{ "name": "taza", "translation": "cup", "coordinates": [1, "oops", 2, 3, 4] }] }),
        ));

        let result = WordCamGenerator::new(mock)
            .detect_objects(
                &english_spanish(),
                &jpeg(),
                ImageDimensions {
                    width: 800,
                    height: 600,
                },
            )
            .await;

        match result {
            Err(Error::GenerationFailed { feature, source }) => {
                assert_eq!(feature, Feature::DetectObjects);
                assert!(matches!(*source, Error::SchemaMismatch(_)));
            }
            other => panic!("expected a detection failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_describe_object_sends_image_and_object() {
        let mock = Arc::new(MockModelAdapter::new().with_call(
            "generate_object_descriptors",
            json!({
                "descriptors": [
                    { "descriptor": "humeante", "exampleSentence": "La taza está humeante." },
                    { "descriptor": "blanca" }
                ]
            }),
        ));

        let descriptors = WordCamGenerator::new(mock.clone())
            .describe_object(&english_spanish(), "coffee cup", &jpeg())
            .await
            .unwrap();

        assert_eq!(
            descriptors.descriptors,
            vec![
                Descriptor {
                    descriptor: "humeante".to_string(),
                    example_sentence: "La taza está humeante.".to_string(),
                },
                Descriptor {
                    descriptor: "blanca".to_string(),
                    example_sentence: String::new(),
                },
            ]
        );

        let calls = mock.calls();
        assert_eq!(calls[0].function_name, "generate_object_descriptors");
        assert_eq!(calls[0].media_mime_type.as_deref(), Some("image/jpeg"));
        assert!(calls[0].instruction.contains("coffee cup"));
    }
}
