//! Module catalogue — the five fixed sections of a personal statement.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named section of the statement.
///
/// Variant order IS the display order, so `BTreeMap<Module, _>` iterates in
/// the same order the draft is assembled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Module {
    Motivation,
    Academic,
    Internship,
    #[serde(rename = "Why_School")]
    WhySchool,
    #[serde(rename = "Career_Goal")]
    CareerGoal,
}

/// Fixed draft order, regardless of the order modules were selected in.
pub const DISPLAY_ORDER: [Module; 5] = [
    Module::Motivation,
    Module::Academic,
    Module::Internship,
    Module::WhySchool,
    Module::CareerGoal,
];

/// Generated text body per module. Populated once per module per run.
pub type Sections = BTreeMap<Module, String>;

impl Module {
    /// Wire key, as sent by clients in `selected_modules`.
    pub fn key(self) -> &'static str {
        match self {
            Module::Motivation => "Motivation",
            Module::Academic => "Academic",
            Module::Internship => "Internship",
            Module::WhySchool => "Why_School",
            Module::CareerGoal => "Career_Goal",
        }
    }

    /// Human-readable label used in boundary markers.
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (Module::Motivation, Language::Chinese) => "申请动机",
            (Module::Academic, Language::Chinese) => "本科学习",
            (Module::Internship, Language::Chinese) => "实习/工作",
            (Module::WhySchool, Language::Chinese) => "选校理由",
            (Module::CareerGoal, Language::Chinese) => "职业规划",
            (Module::Motivation, Language::English) => "Motivation",
            (Module::Academic, Language::English) => "Academic Background",
            (Module::Internship, Language::English) => "Professional Experience",
            (Module::WhySchool, Language::English) => "Why School",
            (Module::CareerGoal, Language::English) => "Career Goal",
        }
    }

    /// Resolves a marker label in either language.
    pub fn from_label(label: &str) -> Option<Module> {
        let label = label.trim();
        DISPLAY_ORDER.into_iter().find(|m| {
            m.label(Language::Chinese) == label || m.label(Language::English) == label
        })
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Module {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DISPLAY_ORDER
            .into_iter()
            .find(|m| m.key() == s.trim())
            .ok_or_else(|| format!("unknown module '{s}'"))
    }
}

/// Language of a draft. Chinese is the host (source) language; English is
/// the translation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "cn", alias = "zh")]
    Chinese,
    #[serde(alias = "en")]
    English,
}

impl Language {
    pub fn is_host(self) -> bool {
        matches!(self, Language::Chinese)
    }

    /// Short tag used in export filenames.
    pub fn tag(self) -> &'static str {
        match self {
            Language::Chinese => "cn",
            Language::English => "en",
        }
    }

    pub fn default_font(self) -> &'static str {
        match self {
            Language::Chinese => "宋体",
            Language::English => "Times New Roman",
        }
    }
}

/// English spelling convention for translations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spelling {
    #[default]
    British,
    American,
}

impl Spelling {
    /// Lenient parse of a free-form preference ("American English", "British").
    pub fn from_preference(raw: &str) -> Spelling {
        if raw.contains("American") {
            Spelling::American
        } else {
            Spelling::British
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_keys_round_trip_through_serde() {
        for module in DISPLAY_ORDER {
            let json = serde_json::to_string(&module).unwrap();
            assert_eq!(json, format!("\"{}\"", module.key()));
            let back: Module = serde_json::from_str(&json).unwrap();
            assert_eq!(back, module);
        }
    }

    #[test]
    fn test_unknown_module_key_rejected() {
        assert!("WhySchool".parse::<Module>().is_err());
        assert!(serde_json::from_str::<Module>("\"Research\"").is_err());
        assert_eq!("Why_School".parse::<Module>().unwrap(), Module::WhySchool);
    }

    #[test]
    fn test_ord_matches_display_order() {
        let mut shuffled = vec![
            Module::CareerGoal,
            Module::Academic,
            Module::WhySchool,
            Module::Motivation,
            Module::Internship,
        ];
        shuffled.sort();
        assert_eq!(shuffled, DISPLAY_ORDER.to_vec());
    }

    #[test]
    fn test_from_label_accepts_both_languages() {
        assert_eq!(Module::from_label("实习/工作"), Some(Module::Internship));
        assert_eq!(Module::from_label("Career Goal"), Some(Module::CareerGoal));
        assert_eq!(Module::from_label(" Why School "), Some(Module::WhySchool));
        assert_eq!(Module::from_label("Conclusion"), None);
    }

    #[test]
    fn test_language_aliases() {
        let lang: Language = serde_json::from_str("\"cn\"").unwrap();
        assert_eq!(lang, Language::Chinese);
        let lang: Language = serde_json::from_str("\"english\"").unwrap();
        assert_eq!(lang, Language::English);
    }

    #[test]
    fn test_spelling_preference_defaults_to_british() {
        assert_eq!(Spelling::from_preference("American"), Spelling::American);
        assert_eq!(Spelling::from_preference("American English"), Spelling::American);
        assert_eq!(Spelling::from_preference("British"), Spelling::British);
        assert_eq!(Spelling::from_preference(""), Spelling::British);
    }
}
