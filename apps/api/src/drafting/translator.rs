//! Translator — renders Chinese sections into English one module at a time,
//! then reassembles them under English markers.

use tracing::{info, warn};

use crate::drafting::assembler::assemble;
use crate::drafting::markers::strip_boundary_lines;
use crate::drafting::modules::{Language, Module, Sections, Spelling};
use crate::drafting::prompts;
use crate::llm_client::{is_error_text, ModelGateway, ModelSettings};

/// Translates one piece of text. Returns the trimmed reply, or error text.
pub async fn translate_text(
    gateway: &dyn ModelGateway,
    settings: &ModelSettings,
    text: &str,
    spelling: Spelling,
) -> String {
    let prompt = prompts::translation(text, spelling);
    gateway.invoke(settings.call(&prompt)).await.trim().to_string()
}

/// Translates every non-empty section in `order` and assembles the result.
///
/// Translation is per module so the English draft keeps its boundaries even
/// when the model would have merged paragraphs. A failed module keeps the
/// gateway error text in its slot.
pub async fn translate(
    gateway: &dyn ModelGateway,
    settings: &ModelSettings,
    sections: &Sections,
    order: &[Module],
    spelling: Spelling,
) -> String {
    let mut translated = Sections::new();

    for module in order {
        let Some(body) = sections.get(module) else {
            continue;
        };
        if body.trim().is_empty() {
            continue;
        }

        let english = translate_text(gateway, settings, body, spelling).await;
        if is_error_text(&english) {
            warn!("Translation of {module} failed; keeping gateway text in place");
        } else {
            info!("Translated {module} ({} chars)", english.chars().count());
        }
        translated.insert(*module, strip_boundary_lines(&english).trim().to_string());
    }

    assemble(&translated, order, Language::English)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafting::markers::parse_boundary_line;
    use crate::drafting::modules::DISPLAY_ORDER;
    use crate::llm_client::testing::ScriptedGateway;

    fn settings() -> ModelSettings {
        ModelSettings {
            model: "gemini-test".to_string(),
            credential: None,
        }
    }

    #[tokio::test]
    async fn test_empty_sections_are_skipped() {
        let mut sections = Sections::new();
        sections.insert(Module::Academic, "   ".to_string());
        sections.insert(Module::CareerGoal, "x".to_string());

        let gateway = ScriptedGateway::replying("I plan to become an analyst.");
        let english = translate(&gateway, &settings(), &sections, &DISPLAY_ORDER, Spelling::British).await;

        let markers: Vec<&str> = english.lines().filter_map(parse_boundary_line).collect();
        assert_eq!(markers, vec!["Career Goal"]);
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(english, "--- Career Goal ---\nI plan to become an analyst.");
    }

    #[tokio::test]
    async fn test_one_call_per_module_in_order() {
        let mut sections = Sections::new();
        sections.insert(Module::WhySchool, "选校".to_string());
        sections.insert(Module::Motivation, "动机".to_string());

        let gateway = ScriptedGateway::with_replies(&["Motivation text", "School text"], "unused");
        let english = translate(&gateway, &settings(), &sections, &DISPLAY_ORDER, Spelling::American).await;

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].prompt.ends_with("动机"));
        assert!(calls[0].prompt.contains("American English spelling"));
        assert!(calls[1].prompt.ends_with("选校"));
        assert_eq!(
            english,
            "--- Motivation ---\nMotivation text\n\n--- Why School ---\nSchool text"
        );
    }

    #[tokio::test]
    async fn test_failed_module_keeps_error_text() {
        let mut sections = Sections::new();
        sections.insert(Module::Internship, "实习".to_string());
        let gateway = ScriptedGateway::replying("Error: request timed out");

        let english = translate(&gateway, &settings(), &sections, &DISPLAY_ORDER, Spelling::British).await;
        assert_eq!(
            english,
            "--- Professional Experience ---\nError: request timed out"
        );
    }

    #[tokio::test]
    async fn test_markers_echoed_by_the_model_are_dropped() {
        let mut sections = Sections::new();
        sections.insert(Module::Academic, "学习".to_string());
        let gateway = ScriptedGateway::replying("--- Academic Background ---\n\nI studied.");

        let english = translate(&gateway, &settings(), &sections, &DISPLAY_ORDER, Spelling::British).await;
        assert_eq!(english, "--- Academic Background ---\nI studied.");
    }
}
