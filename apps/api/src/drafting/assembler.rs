//! Draft Assembler — merges sections into one linear document and
//! re-partitions an (edited) document back into sections.

use tracing::warn;

use crate::drafting::markers::{boundary_line, parse_boundary_line};
use crate::drafting::modules::{Language, Module, Sections};

/// Joins sections in `order`, each preceded by its boundary line.
///
/// Modules missing from `sections` are skipped entirely; no empty markers are
/// emitted. Output is deterministic for the same inputs.
pub fn assemble(sections: &Sections, order: &[Module], language: Language) -> String {
    let mut draft = String::new();
    for module in order {
        if let Some(body) = sections.get(module) {
            draft.push_str(&boundary_line(module.label(language)));
            draft.push('\n');
            draft.push_str(body);
            draft.push_str("\n\n");
        }
    }
    draft.trim_end().to_string()
}

/// Best-effort inverse of `assemble`, in either language.
///
/// Text before the first boundary line is dropped, as is text under a
/// boundary line whose label is not a known module. A module whose marker
/// appears twice gets both bodies, joined by a blank line.
pub fn split(text: &str) -> Sections {
    let mut sections = Sections::new();
    let mut current: Option<Module> = None;
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(label) = parse_boundary_line(line) {
            flush(&mut sections, current, &lines);
            lines.clear();
            current = Module::from_label(label);
            if current.is_none() {
                warn!("Ignoring text under unknown section marker '{label}'");
            }
        } else if current.is_some() {
            lines.push(line);
        }
    }
    flush(&mut sections, current, &lines);

    sections
}

fn flush(sections: &mut Sections, module: Option<Module>, lines: &[&str]) {
    let Some(module) = module else {
        return;
    };
    let body = lines.join("\n").trim().to_string();

    match sections.get_mut(&module) {
        Some(existing) if existing.is_empty() => *existing = body,
        Some(existing) => {
            if !body.is_empty() {
                existing.push_str("\n\n");
                existing.push_str(&body);
            }
        }
        None => {
            sections.insert(module, body);
        }
    }
}
