use super::requests::{
    dimensions, languages, required, ConversationRequest, DetectObjectsRequest, LessonRequest,
    ObjectDescriptorsRequest,
};
use super::response::ApiResult;
use super::AppState;
use crate::models::{
    DetectedObjects, GrammarLesson, ObjectDescriptors, SlangConversation, TinyLesson,
};
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Little Language Lessons API is running",
    }))
}

pub async fn terms(
    State(state): State<AppState>,
    Json(request): Json<LessonRequest>,
) -> ApiResult<Json<TinyLesson>> {
    let languages = languages(&request.source_language, &request.target_language)?;
    let purpose = required("purpose", &request.purpose)?;
    info!(
        "Generating tiny lesson: {} -> {}",
        languages.source_language, languages.target_language
    );

    let lesson = state.lessons.tiny_lesson.generate(&languages, purpose).await?;
    Ok(Json(lesson))
}

pub async fn grammar(
    State(state): State<AppState>,
    Json(request): Json<LessonRequest>,
) -> ApiResult<Json<GrammarLesson>> {
    let languages = languages(&request.source_language, &request.target_language)?;
    let purpose = required("purpose", &request.purpose)?;
    info!(
        "Generating grammar lesson: {} -> {}",
        languages.source_language, languages.target_language
    );

    let lesson = state.lessons.grammar.generate(&languages, purpose).await?;
    Ok(Json(lesson))
}

pub async fn conversation(
    State(state): State<AppState>,
    Json(request): Json<ConversationRequest>,
) -> ApiResult<Json<SlangConversation>> {
    let languages = languages(&request.source_language, &request.target_language)?;
    info!(
        "Generating slang conversation: {} -> {}",
        languages.source_language, languages.target_language
    );

    let conversation = state.lessons.slang_hang.generate(&languages).await?;
    Ok(Json(conversation))
}

pub async fn object_descriptors(
    State(state): State<AppState>,
    Json(request): Json<ObjectDescriptorsRequest>,
) -> ApiResult<Json<ObjectDescriptors>> {
    let languages = languages(&request.source_language, &request.target_language)?;
    let object = required("object", &request.object)?;
    let image = request.image.decode(&state.media)?;
    info!("Generating descriptors for '{}'", object);

    let descriptors = state
        .lessons
        .word_cam
        .describe_object(&languages, object, &image)
        .await?;
    Ok(Json(descriptors))
}

pub async fn detect_objects(
    State(state): State<AppState>,
    Json(request): Json<DetectObjectsRequest>,
) -> ApiResult<Json<DetectedObjects>> {
    let languages = languages(&request.source_language, &request.target_language)?;
    let dimensions = dimensions(request.image_dimensions)?;
    let image = request.image.decode(&state.media)?;
    info!(
        "Detecting objects in {}x{} image",
        dimensions.width, dimensions.height
    );

    let detected = state
        .lessons
        .word_cam
        .detect_objects(&languages, &image, dimensions)
        .await?;
    Ok(Json(detected))
}
