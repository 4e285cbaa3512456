//! Request bodies and their validation.

use crate::media::{MediaAttachment, MediaPolicy};
use crate::models::{ImageDimensions, LanguageContext};
use crate::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRequest {
    pub source_language: String,
    pub target_language: String,
    pub purpose: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest {
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub inline_data: InlineImage,
}

impl ImagePayload {
    pub fn decode(&self, policy: &MediaPolicy) -> Result<MediaAttachment> {
        policy.decode(&self.inline_data.data, &self.inline_data.mime_type)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescriptorsRequest {
    pub source_language: String,
    pub target_language: String,
    pub object: String,
    pub image: ImagePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectObjectsRequest {
    pub source_language: String,
    pub target_language: String,
    pub image: ImagePayload,
    pub image_dimensions: ImageDimensions,
}

/// Trimmed `value`, rejecting blanks.
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", field)));
    }
    Ok(value)
}

pub fn languages(source: &str, target: &str) -> Result<LanguageContext> {
    Ok(LanguageContext::new(
        required("sourceLanguage", source)?,
        required("targetLanguage", target)?,
    ))
}

pub fn dimensions(dimensions: ImageDimensions) -> Result<ImageDimensions> {
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(Error::Validation(
            "imageDimensions must be positive".to_string(),
        ));
    }
    Ok(dimensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("purpose", "  ordering coffee ").unwrap(), "ordering coffee");
        assert!(matches!(
            required("purpose", "   "),
            Err(Error::Validation(msg)) if msg == "purpose must not be empty"
        ));
    }

    #[test]
    fn test_languages_builds_context() {
        let context = languages("English", "Spanish").unwrap();
        assert_eq!(context, LanguageContext::new("English", "Spanish"));
        assert!(languages("", "Spanish").is_err());
    }

    #[test]
    fn test_zero_dimension_is_rejected() {
        assert!(dimensions(ImageDimensions {
            width: 800,
            height: 600
        })
        .is_ok());
        assert!(matches!(
            dimensions(ImageDimensions {
                width: 0,
                height: 600
            }),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_detect_objects_body_shape() {
        let request: DetectObjectsRequest = serde_json::from_value(json!({
            "sourceLanguage": "English",
            "targetLanguage": "Japanese",
            "image": { "inlineData": { "data": "aGVsbG8=", "mimeType": "image/png" } },
            "imageDimensions": { "width": 800, "height": 600 }
        }))
        .unwrap();

        assert_eq!(request.image.inline_data.mime_type, "image/png");
        assert_eq!(request.image_dimensions.width, 800);

        let policy = MediaPolicy::new(vec!["image/png".to_string()], 5);
        let media = request.image.decode(&policy).unwrap();
        assert_eq!(media.bytes(), b"hello");
    }
}
