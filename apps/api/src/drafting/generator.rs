//! Section Generator — runs each selected module's prompt through the gateway
//! and stores one text body per module.
//!
//! Flow: check preconditions → for each module in display order:
//!       build prompt → pick media → invoke gateway → post-process.
//!
//! Modules run strictly one at a time. A gateway failure on one module becomes
//! that module's body and never stops the others.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::drafting::markers::{parse_motivation, strip_boundary_lines};
use crate::drafting::modules::{Module, Sections, Spelling};
use crate::drafting::prompts;
use crate::errors::AppError;
use crate::llm_client::{is_error_text, MediaAttachment, ModelCall, ModelGateway, ModelSettings};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Inputs of one generation run. Read-only to every component.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    /// Target institution and programme, as typed by the counselor.
    pub target: String,
    pub strategy: String,
    pub spelling: Spelling,
    /// Extracted resume or material sheet. Shared by every module.
    pub background: Option<String>,
    /// Transcript pages (PDF or images). Used by Academic only.
    pub transcript: Vec<MediaAttachment>,
    pub curriculum_text: Option<String>,
    /// Curriculum screenshots. Used by Why_School only.
    pub curriculum_images: Vec<MediaAttachment>,
}

impl GenerationContext {
    fn has_curriculum(&self) -> bool {
        self.curriculum_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
            || !self.curriculum_images.is_empty()
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    pub sections: Sections,
    /// Research portion of the Motivation reply, when it was well-formed.
    pub trend_note: Option<String>,
    /// Modules whose body is gateway error text.
    pub failed: Vec<Module>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Rejects a run before any model call when inputs cannot produce a draft.
///
/// Returns the selection deduplicated and ordered for display.
pub fn check_preconditions(
    selected: &[Module],
    context: &GenerationContext,
) -> Result<BTreeSet<Module>, AppError> {
    if context.target.trim().is_empty() {
        return Err(AppError::Validation(
            "target_school_name cannot be empty".to_string(),
        ));
    }

    let modules: BTreeSet<Module> = selected.iter().copied().collect();
    if modules.is_empty() {
        return Err(AppError::Validation(
            "Select at least one module to generate.".to_string(),
        ));
    }

    if modules.contains(&Module::Academic) && context.transcript.is_empty() {
        return Err(AppError::Validation(
            "The Academic module needs a transcript (PDF or image).".to_string(),
        ));
    }

    if modules.contains(&Module::WhySchool) && !context.has_curriculum() {
        return Err(AppError::Validation(
            "The Why_School module needs curriculum text or curriculum images.".to_string(),
        ));
    }

    Ok(modules)
}

/// Generates one section per selected module.
pub async fn generate_sections(
    gateway: &dyn ModelGateway,
    settings: &ModelSettings,
    selected: &[Module],
    context: &GenerationContext,
) -> Result<GenerationOutcome, AppError> {
    let modules = check_preconditions(selected, context)?;
    let total = modules.len();
    let mut outcome = GenerationOutcome::default();

    for (step, module) in modules.into_iter().enumerate() {
        let prompt = build_prompt(module, context);
        let call = ModelCall {
            prompt: &prompt,
            media: media_for(module, context),
            context: context.background.as_deref(),
            model: &settings.model,
            credential: settings.credential.as_deref(),
        };

        let raw = gateway.invoke(call).await;

        if is_error_text(&raw) {
            warn!("Module {module} failed; surfacing gateway text as its body");
            outcome.failed.push(module);
        }

        let body = match module {
            Module::Motivation => {
                let reply = parse_motivation(&raw);
                if reply.trend_note.is_none() && !is_error_text(&raw) {
                    warn!("Motivation reply lacked region tokens; keeping the full reply");
                }
                outcome.trend_note = reply.trend_note;
                reply.body
            }
            _ => raw.trim().to_string(),
        };

        outcome
            .sections
            .insert(module, strip_boundary_lines(&body).trim().to_string());
        info!("[{}/{}] {} done", step + 1, total, module);
    }

    Ok(outcome)
}

fn build_prompt(module: Module, context: &GenerationContext) -> String {
    let target = context.target.trim();
    match module {
        Module::Motivation => prompts::motivation(target),
        Module::Academic => prompts::academic(target),
        Module::Internship => prompts::internship(target),
        Module::WhySchool => prompts::why_school(
            target,
            &context.strategy,
            context.curriculum_text.as_deref(),
        ),
        Module::CareerGoal => prompts::career_goal(target, &context.strategy),
    }
}

/// Only Academic and Why_School see media; everything else is text-only.
fn media_for(module: Module, context: &GenerationContext) -> &[MediaAttachment] {
    match module {
        Module::Academic => context.transcript.as_slice(),
        Module::WhySchool => context.curriculum_images.as_slice(),
        Module::Motivation | Module::Internship | Module::CareerGoal => &[],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
