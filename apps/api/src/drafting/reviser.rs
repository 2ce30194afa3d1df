//! Annotation Reviser — rewrites a draft wherever the user left
//! `【instruction】` notes, leaving the rest of the text alone.

use tracing::info;

use crate::drafting::modules::Language;
use crate::drafting::prompts;
use crate::llm_client::{ModelGateway, ModelSettings};

/// Opening bracket of an inline revision instruction.
pub const INSTRUCTION_OPEN: char = '【';

/// True when the document carries something for the reviser to act on.
///
/// English drafts also count any stray Chinese text as an instruction, since
/// that is how users annotate a translated draft.
pub fn has_instructions(document: &str, language: Language) -> bool {
    match language {
        Language::Chinese => document.contains(INSTRUCTION_OPEN),
        Language::English => document.contains(INSTRUCTION_OPEN) || document.chars().any(is_cjk),
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}

/// Sends the whole document for annotation-driven revision.
///
/// Callers check `has_instructions` first; this function always makes one
/// call. Returns the trimmed reply, which may be gateway error text.
pub async fn revise(
    gateway: &dyn ModelGateway,
    settings: &ModelSettings,
    document: &str,
    language: Language,
) -> String {
    let prompt = prompts::revision(document, language);
    info!(
        "Revising {:?} draft ({} chars) with model {}",
        language,
        document.chars().count(),
        settings.model
    );
    gateway.invoke(settings.call(&prompt)).await.trim().to_string()
}
