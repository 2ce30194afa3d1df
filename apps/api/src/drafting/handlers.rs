//! Axum route handlers for the Drafting API.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::drafting::generator::GenerationContext;
use crate::drafting::header::{generate_headers, HeaderPair};
use crate::drafting::modules::{Language, Module, Spelling};
use crate::drafting::reviser::{has_instructions, revise};
use crate::drafting::session::{self, Session};
use crate::drafting::translator::translate_text;
use crate::errors::AppError;
use crate::export;
use crate::extract::{extract, is_diagnostic, DocumentKind};
use crate::llm_client::{is_error_text, is_valid_model_name, MediaAttachment, ModelSettings};
use crate::state::AppState;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF_MIME: &str = "application/pdf";
const DEFAULT_IMAGE_MIME: &str = "image/png";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Optional model selection carried by JSON requests.
#[derive(Debug, Default, Deserialize)]
pub struct ModelOptions {
    pub model_name: Option<String>,
    pub api_key: Option<String>,
}

impl ModelOptions {
    fn settings(self, config: &Config) -> Result<ModelSettings, AppError> {
        let model = self
            .model_name
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| config.default_model.clone());
        if !is_valid_model_name(&model) {
            return Err(AppError::Validation(format!(
                "model_name '{model}' may only contain letters, digits, '.', '_' and '-'"
            )));
        }

        Ok(ModelSettings {
            model,
            credential: self.api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DraftEdit {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default)]
    pub spelling_preference: Option<String>,
    #[serde(flatten)]
    pub model: ModelOptions,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translation: String,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub text: String,
    pub language: Language,
    #[serde(flatten)]
    pub model: ModelOptions,
}

#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub revised: String,
}

#[derive(Debug, Deserialize)]
pub struct HeadersRequest {
    pub target_school_name: String,
    #[serde(flatten)]
    pub model: ModelOptions,
}

#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub content: String,
    #[serde(default)]
    pub header: String,
    pub language: Language,
    /// Overrides the language's default font.
    #[serde(default)]
    pub font_name: Option<String>,
}

/// Everything a generation form can carry, collected before validation.
#[derive(Default)]
struct GenerationForm {
    context: GenerationContext,
    selected: Vec<Module>,
    model: ModelOptions,
}

// ────────────────────────────────────────────────────────────────────────────
// Session handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Multipart form → Section Generator → assembled source draft.
pub async fn handle_create_session(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let form = read_generation_form(multipart).await?;
    let settings = form.model.settings(&state.config)?;

    info!(
        "Generating {} module(s) for '{}' with {}",
        form.selected.len(),
        form.context.target.trim(),
        settings.model
    );

    let session =
        session::run_generation(state.llm.as_ref(), settings, &form.selected, &form.context)
            .await?;
    state.sessions.insert(session.clone()).await;

    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.get(id).await?))
}

/// PUT /api/v1/sessions/:id/draft/:language
///
/// Stores user-edited draft text verbatim.
pub async fn handle_replace_draft(
    State(state): State<AppState>,
    Path((id, language)): Path<(Uuid, Language)>,
    Json(edit): Json<DraftEdit>,
) -> Result<Json<Session>, AppError> {
    let mut session = state.sessions.lock(id).await?;
    session.replace_draft(language, edit.text);
    Ok(Json(session.clone()))
}

/// POST /api/v1/sessions/:id/revise/:language
pub async fn handle_revise_draft(
    State(state): State<AppState>,
    Path((id, language)): Path<(Uuid, Language)>,
) -> Result<Json<Session>, AppError> {
    let mut session = state.sessions.lock(id).await?;
    session::revise_draft(state.llm.as_ref(), &mut session, language).await?;
    Ok(Json(session.clone()))
}

/// POST /api/v1/sessions/:id/translate
pub async fn handle_translate_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    let mut session = state.sessions.lock(id).await?;
    session::translate_draft(state.llm.as_ref(), &mut session).await?;
    Ok(Json(session.clone()))
}

/// GET /api/v1/sessions/:id/export/:language
///
/// Returns the draft as a .docx attachment. The header pair is generated on
/// the first export and kept on the session.
pub async fn handle_export(
    State(state): State<AppState>,
    Path((id, language)): Path<(Uuid, Language)>,
) -> Result<Response, AppError> {
    let mut session = state.sessions.lock(id).await?;
    let bytes = session::export_draft(state.llm.as_ref(), &mut session, language).await?;

    Ok(docx_response(bytes, language))
}

// ────────────────────────────────────────────────────────────────────────────
// Stateless handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/translate
pub async fn handle_translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let spelling = request
        .spelling_preference
        .as_deref()
        .map(Spelling::from_preference)
        .unwrap_or_default();
    let settings = request.model.settings(&state.config)?;

    let translation = translate_text(state.llm.as_ref(), &settings, &request.text, spelling).await;
    if is_error_text(&translation) {
        return Err(AppError::Llm(translation));
    }
    Ok(Json(TranslateResponse { translation }))
}

/// POST /api/v1/edit
pub async fn handle_edit(
    State(state): State<AppState>,
    Json(request): Json<EditRequest>,
) -> Result<Json<EditResponse>, AppError> {
    if !has_instructions(&request.text, request.language) {
        return Err(AppError::NothingToRevise(
            "No 【instructions】 found in the text.".to_string(),
        ));
    }
    let settings = request.model.settings(&state.config)?;

    let revised = revise(state.llm.as_ref(), &settings, &request.text, request.language).await;
    if is_error_text(&revised) {
        return Err(AppError::Llm(revised));
    }
    Ok(Json(EditResponse { revised }))
}

/// POST /api/v1/headers
pub async fn handle_headers(
    State(state): State<AppState>,
    Json(request): Json<HeadersRequest>,
) -> Result<Json<HeaderPair>, AppError> {
    let settings = request.model.settings(&state.config)?;
    let pair = generate_headers(state.llm.as_ref(), &settings, &request.target_school_name).await;
    Ok(Json(pair))
}

/// POST /api/v1/documents
///
/// Renders arbitrary content under a header; no model call.
pub async fn handle_render_document(
    Json(request): Json<DocumentRequest>,
) -> Result<Response, AppError> {
    let font = request
        .font_name
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(request.language.default_font());
    let bytes = export::render(
        &request.content,
        &request.header,
        font,
        request.language.is_host(),
    )?;
    Ok(docx_response(bytes, request.language))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn docx_response(bytes: Vec<u8>, language: Language) -> Response {
    let disposition = format!(
        "attachment; filename=personal_statement_{}.docx",
        language.tag()
    );
    (
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

async fn read_generation_form(mut multipart: Multipart) -> Result<GenerationForm, AppError> {
    let mut form = GenerationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;

        match name.as_str() {
            "target_school_name" => form.context.target = text(&data)?,
            "counselor_strategy" => form.context.strategy = text(&data)?,
            "spelling_preference" => form.context.spelling = Spelling::from_preference(&text(&data)?),
            "selected_modules" => form.selected = parse_modules(&text(&data)?)?,
            "model_name" => form.model.model_name = Some(text(&data)?),
            "api_key" => form.model.api_key = Some(text(&data)?),
            "curriculum_text" => form.context.curriculum_text = Some(text(&data)?),
            "material_file" if !data.is_empty() => {
                form.context.background = read_material(file_name.as_deref(), data).await?;
            }
            "transcript_file" if !data.is_empty() => {
                form.context.transcript.push(transcript_attachment(
                    file_name.as_deref(),
                    content_type.as_deref(),
                    data,
                ));
            }
            "curriculum_files" if !data.is_empty() => {
                form.context.curriculum_images.push(MediaAttachment::Image {
                    mime_type: image_mime(content_type.as_deref()),
                    data,
                });
            }
            "material_file" | "transcript_file" | "curriculum_files" => {}
            other => warn!("Ignoring unknown form field '{other}'"),
        }
    }

    Ok(form)
}

fn text(data: &Bytes) -> Result<String, AppError> {
    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::Validation("Form fields must be UTF-8 text".to_string()))
}

/// `selected_modules` is a JSON array of module keys, e.g. `["Motivation","Why_School"]`.
fn parse_modules(raw: &str) -> Result<Vec<Module>, AppError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid selected_modules: {e}")))
}

/// PDF when either the declared type or the file name says so; image otherwise.
fn transcript_attachment(
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: Bytes,
) -> MediaAttachment {
    let is_pdf = content_type == Some(PDF_MIME)
        || file_name.is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"));
    if is_pdf {
        MediaAttachment::Pdf(data)
    } else {
        MediaAttachment::Image {
            mime_type: image_mime(content_type),
            data,
        }
    }
}

fn image_mime(content_type: Option<&str>) -> String {
    content_type
        .filter(|c| c.starts_with("image/"))
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_string()
}

/// Runs the Content Extractor off the async runtime.
async fn read_material(file_name: Option<&str>, data: Bytes) -> Result<Option<String>, AppError> {
    let Some(kind) = file_name.and_then(DocumentKind::from_filename) else {
        warn!("Material file {file_name:?} is neither .docx nor .pdf; ignoring it");
        return Ok(None);
    };

    let text = tokio::task::spawn_blocking(move || extract(&data, kind))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    if is_diagnostic(&text) {
        warn!("{text}");
    } else {
        info!("Extracted {} chars of background material", text.chars().count());
    }
    Ok(Some(text))
}
