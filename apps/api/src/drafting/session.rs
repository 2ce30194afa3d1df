//! Drafting session: the explicit state one counselor works on, from the
//! first generation run to the exported documents.
//!
//! Every step takes the session by `&mut` and returns; nothing here touches
//! the store. Handlers lock one session in `SessionStore` for the whole step,
//! so two steps on the same session run one after the other while other
//! sessions stay free.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::drafting::assembler::{assemble, split};
use crate::drafting::generator::{generate_sections, GenerationContext};
use crate::drafting::header::{generate_headers, HeaderPair};
use crate::drafting::modules::{Language, Module, Sections, Spelling, DISPLAY_ORDER};
use crate::drafting::reviser::{has_instructions, revise};
use crate::drafting::translator::{translate, translate_text};
use crate::errors::AppError;
use crate::export;
use crate::llm_client::{is_error_text, ModelGateway, ModelSettings};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub target: String,
    pub strategy: String,
    pub spelling: Spelling,
    pub sections: Sections,
    /// Modules whose section holds gateway error text.
    pub failed_modules: Vec<Module>,
    pub trend_note: Option<String>,
    pub source_draft: String,
    pub translated_draft: Option<String>,
    /// Export titles, computed on first export.
    pub headers: Option<HeaderPair>,
    #[serde(skip)]
    pub settings: ModelSettings,
}

impl Session {
    pub fn new(settings: ModelSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            target: String::new(),
            strategy: String::new(),
            spelling: Spelling::default(),
            sections: Sections::new(),
            failed_modules: Vec::new(),
            trend_note: None,
            source_draft: String::new(),
            translated_draft: None,
            headers: None,
            settings,
        }
    }

    /// Clears everything a previous run produced and records the new inputs.
    pub fn begin_generation(&mut self, context: &GenerationContext) {
        self.target = context.target.trim().to_string();
        self.strategy = context.strategy.clone();
        self.spelling = context.spelling;
        self.sections.clear();
        self.failed_modules.clear();
        self.trend_note = None;
        self.source_draft.clear();
        self.translated_draft = None;
        self.headers = None;
    }

    pub fn draft(&self, language: Language) -> Option<&str> {
        match language {
            Language::Chinese if !self.source_draft.trim().is_empty() => Some(&self.source_draft),
            Language::Chinese => None,
            Language::English => self.translated_draft.as_deref(),
        }
    }

    /// Replaces one draft. A new source draft voids its translation.
    pub fn replace_draft(&mut self, language: Language, text: String) {
        match language {
            Language::Chinese => {
                self.source_draft = text;
                self.translated_draft = None;
            }
            Language::English => self.translated_draft = Some(text),
        }
    }
}

/// Starts a session and fills it with a generation run.
pub async fn run_generation(
    gateway: &dyn ModelGateway,
    settings: ModelSettings,
    selected: &[Module],
    context: &GenerationContext,
) -> Result<Session, AppError> {
    let mut session = Session::new(settings);
    session.begin_generation(context);

    let outcome = generate_sections(gateway, &session.settings, selected, context).await?;

    session.source_draft = assemble(&outcome.sections, &DISPLAY_ORDER, Language::Chinese);
    session.sections = outcome.sections;
    session.trend_note = outcome.trend_note;
    session.failed_modules = outcome.failed;

    info!(
        "Session {} generated {} sections ({} failed)",
        session.id,
        session.sections.len(),
        session.failed_modules.len()
    );
    Ok(session)
}

/// Applies the user's inline instructions to one stored draft.
///
/// Gateway error text is never stored as a draft; it comes back as `Llm`.
pub async fn revise_draft(
    gateway: &dyn ModelGateway,
    session: &mut Session,
    language: Language,
) -> Result<(), AppError> {
    let document = session
        .draft(language)
        .ok_or_else(|| missing_draft(language))?;

    if !has_instructions(document, language) {
        return Err(AppError::NothingToRevise(match language {
            Language::Chinese => "Add 【instructions】 to the draft before revising.".to_string(),
            Language::English => {
                "Add 【instructions】 or Chinese notes to the draft before revising.".to_string()
            }
        }));
    }

    let revised = revise(gateway, &session.settings, document, language).await;
    if is_error_text(&revised) {
        return Err(AppError::Llm(revised));
    }

    session.replace_draft(language, revised);
    Ok(())
}

/// Re-partitions the source draft and stores its English translation.
///
/// A draft whose markers were all edited away is translated as one block.
pub async fn translate_draft(
    gateway: &dyn ModelGateway,
    session: &mut Session,
) -> Result<(), AppError> {
    if session.source_draft.trim().is_empty() {
        return Err(missing_draft(Language::Chinese));
    }

    let sections = split(&session.source_draft);
    let english = if sections.is_empty() {
        info!("Session {} draft has no markers; translating it whole", session.id);
        translate_text(
            gateway,
            &session.settings,
            &session.source_draft,
            session.spelling,
        )
        .await
    } else {
        translate(
            gateway,
            &session.settings,
            &sections,
            &DISPLAY_ORDER,
            session.spelling,
        )
        .await
    };
    session.translated_draft = Some(english);
    Ok(())
}

/// Cached header pair, generated on first use.
pub async fn ensure_headers(gateway: &dyn ModelGateway, session: &mut Session) -> HeaderPair {
    if let Some(headers) = &session.headers {
        return headers.clone();
    }
    let headers = generate_headers(gateway, &session.settings, &session.target).await;
    session.headers = Some(headers.clone());
    headers
}

/// Renders one draft as a .docx file.
pub async fn export_draft(
    gateway: &dyn ModelGateway,
    session: &mut Session,
    language: Language,
) -> Result<Vec<u8>, AppError> {
    if session.draft(language).is_none() {
        return Err(missing_draft(language));
    }
    let headers = ensure_headers(gateway, session).await;
    let body = session.draft(language).unwrap_or_default();

    let bytes = export::render(
        body,
        headers.for_language(language),
        language.default_font(),
        language.is_host(),
    )?;
    Ok(bytes)
}

fn missing_draft(language: Language) -> AppError {
    match language {
        Language::Chinese => AppError::Validation("The session has no source draft.".to_string()),
        Language::English => {
            AppError::Validation("The session has no English draft; translate it first.".to_string())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

/// In-memory session registry. Sessions live as long as the process.
///
/// The map lock is only held to find an entry; each session has its own
/// mutex, held for the whole step that works on it.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub async fn insert(&self, session: Session) {
        self.inner
            .write()
            .await
            .insert(session.id, Arc::new(Mutex::new(session)));
    }

    /// Exclusive access to one session until the guard drops.
    pub async fn lock(&self, id: Uuid) -> Result<OwnedMutexGuard<Session>, AppError> {
        Ok(self.entry(id).await?.lock_owned().await)
    }

    /// Snapshot of one session. Waits for a running step to finish.
    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        Ok(self.lock(id).await?.clone())
    }

    async fn entry(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, AppError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }
}
