//! Header-pair generation: one short model call producing the Chinese and
//! English document titles for the exported files.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::drafting::modules::Language;
use crate::drafting::prompts;
use crate::llm_client::{is_error_text, ModelGateway, ModelSettings};

const PIPE: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPair {
    pub chinese: String,
    pub english: String,
}

impl HeaderPair {
    /// Deterministic titles built from the raw target string.
    pub fn fallback(target: &str) -> Self {
        let target = target.trim();
        if target.is_empty() {
            return Self {
                chinese: "个人陈述".to_string(),
                english: "Personal Statement".to_string(),
            };
        }
        Self {
            chinese: format!("{target} 个人陈述"),
            english: format!("Personal Statement for {target}"),
        }
    }

    /// Parses `<chinese>|<english>`. Anything else yields `None`.
    pub fn parse(reply: &str) -> Option<Self> {
        if is_error_text(reply) {
            return None;
        }
        let mut parts = reply.trim().split(PIPE);
        let chinese = parts.next()?.trim();
        let english = parts.next()?.trim();
        if chinese.is_empty() || english.is_empty() {
            return None;
        }
        Some(Self {
            chinese: chinese.to_string(),
            english: english.to_string(),
        })
    }

    pub fn for_language(&self, language: Language) -> &str {
        match language {
            Language::Chinese => &self.chinese,
            Language::English => &self.english,
        }
    }
}

/// Asks the model for both titles, falling back when the reply is unusable.
/// An empty target never reaches the model.
pub async fn generate_headers(
    gateway: &dyn ModelGateway,
    settings: &ModelSettings,
    target: &str,
) -> HeaderPair {
    let target = target.trim();
    if target.is_empty() {
        return HeaderPair::fallback(target);
    }

    let prompt = prompts::header(target);
    let reply = gateway.invoke(settings.call(&prompt)).await;

    HeaderPair::parse(&reply).unwrap_or_else(|| {
        warn!("Header reply was not a pipe-separated pair; using fallback titles");
        HeaderPair::fallback(target)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGateway;

    fn settings() -> ModelSettings {
        ModelSettings {
            model: "gemini-test".to_string(),
            credential: None,
        }
    }

    #[test]
    fn test_parse_pipe_pair() {
        let pair = HeaderPair::parse(" 伦敦大学学院个人陈述 | Personal Statement for UCL \n").unwrap();
        assert_eq!(pair.chinese, "伦敦大学学院个人陈述");
        assert_eq!(pair.english, "Personal Statement for UCL");
        assert_eq!(pair.for_language(Language::English), "Personal Statement for UCL");
    }

    #[test]
    fn test_parse_rejects_unusable_replies() {
        assert!(HeaderPair::parse("No pipe here").is_none());
        assert!(HeaderPair::parse("中文|").is_none());
        assert!(HeaderPair::parse("Error: quota | exceeded").is_none());
    }

    #[test]
    fn test_fallback_uses_raw_target() {
        let pair = HeaderPair::fallback("UCL MSc BA");
        assert_eq!(pair.chinese, "UCL MSc BA 个人陈述");
        assert_eq!(pair.english, "Personal Statement for UCL MSc BA");
    }

    #[tokio::test]
    async fn test_reply_without_pipe_falls_back() {
        let gateway = ScriptedGateway::replying("Personal Statement");
        let pair = generate_headers(&gateway, &settings(), "UCL MSc BA").await;
        assert_eq!(pair, HeaderPair::fallback("UCL MSc BA"));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_target_makes_no_call() {
        let gateway = ScriptedGateway::replying("a|b");
        let pair = generate_headers(&gateway, &settings(), "  ").await;
        assert_eq!(pair.english, "Personal Statement");
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_carries_target() {
        let gateway = ScriptedGateway::replying("甲|A");
        let pair = generate_headers(&gateway, &settings(), "卡内基梅隆 MSc").await;
        assert_eq!(pair.chinese, "甲");
        assert!(gateway.calls()[0].prompt.contains("卡内基梅隆 MSc"));
    }
}
