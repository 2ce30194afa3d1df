//! Document Exporter — writes a cleaned draft into a minimal .docx package.
//!
//! The package holds exactly what Word needs to open the file: content types,
//! package relationships, the main document, its relationships and one
//! default header. Every entry carries a fixed timestamp, so the same input
//! always produces the same bytes.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::drafting::markers::is_rule_line;

/// Half-points, as WordprocessingML measures font size.
const BODY_SIZE: u32 = 22;
const HEADER_SIZE: u32 = 24;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/></Relationships>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A4 with one-inch margins, in twentieths of a point.
const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:headerReference w:type="default" r:id="rId1"/><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("zip writer failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Paragraphs that survive cleaning: emphasis markers removed, blank lines and
/// `---`-delimited rule lines dropped, every line trimmed.
pub fn clean_paragraphs(body: &str) -> Vec<String> {
    body.replace("**", "")
        .replace('*', "")
        .lines()
        .map(|line| xml_safe(line).trim().to_string())
        .filter(|line| !line.is_empty() && !is_rule_line(line))
        .collect()
}

/// Drops C0 control characters, which XML 1.0 cannot carry even escaped.
/// Tab stays; line breaks are split on before this runs.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\t' || *c >= '\u{20}')
        .collect()
}

/// Renders `body` under `header` as .docx bytes.
///
/// `is_host_language` adds the east-Asian font mapping so CJK glyphs use
/// `font` too.
pub fn render(
    body: &str,
    header: &str,
    font: &str,
    is_host_language: bool,
) -> Result<Vec<u8>, ExportError> {
    let font = xml_safe(font);
    let fonts = RunFonts {
        name: &font,
        east_asian: is_host_language,
    };

    let document = document_xml(&clean_paragraphs(body), &fonts);
    let header_part = header_xml(xml_safe(header).trim(), &fonts);

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document.as_str()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/header1.xml", header_part.as_str()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

struct RunFonts<'a> {
    name: &'a str,
    east_asian: bool,
}

impl RunFonts<'_> {
    fn xml(&self) -> String {
        let name = escape(self.name);
        if self.east_asian {
            format!(r#"<w:rFonts w:ascii="{name}" w:hAnsi="{name}" w:eastAsia="{name}"/>"#)
        } else {
            format!(r#"<w:rFonts w:ascii="{name}" w:hAnsi="{name}"/>"#)
        }
    }
}

fn run_xml(text: &str, fonts: &RunFonts<'_>, italic: bool, size: u32) -> String {
    let italic = if italic { "<w:i/>" } else { "" };
    format!(
        r#"<w:r><w:rPr>{}{italic}<w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        fonts.xml(),
        escape(text)
    )
}

fn document_xml(paragraphs: &[String], fonts: &RunFonts<'_>) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p>{}</w:p>", run_xml(p, fonts, false, BODY_SIZE)))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>{body}{SECTION_PROPERTIES}</w:body></w:document>"#
    )
}

fn header_xml(header: &str, fonts: &RunFonts<'_>) -> String {
    let run = if header.is_empty() {
        String::new()
    } else {
        run_xml(header, fonts, true, HEADER_SIZE)
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:hdr xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:p><w:pPr><w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="000000"/></w:pBdr><w:jc w:val="left"/></w:pPr>{run}</w:p></w:hdr>"#
    )
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::extract::{extract, DocumentKind};

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_cleaning_drops_markers_and_emphasis() {
        assert_eq!(
            clean_paragraphs("**Hello** World\n--- Motivation ---\nBody text"),
            vec!["Hello World", "Body text"]
        );
        assert_eq!(
            clean_paragraphs("  *list item*  \n\n---\n--- 申请动机 ---\n正文"),
            vec!["list item", "正文"]
        );
    }

    #[test]
    fn test_exported_body_reads_back_as_clean_paragraphs() {
        let bytes = render(
            "**Hello** World\n--- Motivation ---\nBody text",
            "Personal Statement for UCL",
            "Times New Roman",
            false,
        )
        .unwrap();

        assert_eq!(extract(&bytes, DocumentKind::Word), "Hello World\nBody text");
    }

    #[test]
    fn test_control_characters_are_dropped() {
        assert_eq!(clean_paragraphs("Hello\u{0C}World\u{0}"), vec!["HelloWorld"]);
        assert_eq!(clean_paragraphs("a\tb\u{1B}"), vec!["a\tb"]);
    }

    #[test]
    fn test_control_characters_never_reach_the_package() {
        let bytes = render(
            "Hello\u{0C}World\u{8}",
            "Title\u{1}",
            "Times\u{0B} New Roman",
            false,
        )
        .unwrap();

        let document = part(&bytes, "word/document.xml");
        let header = part(&bytes, "word/header1.xml");
        for xml in [&document, &header] {
            assert!(!xml.chars().any(|c| c < '\u{20}' && c != '\n' && c != '\t'));
        }
        assert!(header.contains(">Title<"));
        assert!(document.contains(r#"w:ascii="Times New Roman""#));
        assert_eq!(extract(&bytes, DocumentKind::Word), "HelloWorld");
    }

    #[test]
    fn test_render_is_byte_identical_across_calls() {
        let first = render("第一段\n第二段", "UCL 个人陈述", "宋体", true).unwrap();
        let second = render("第一段\n第二段", "UCL 个人陈述", "宋体", true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_header_styling() {
        let bytes = render("Body", "Personal Statement & Co", "Times New Roman", false).unwrap();
        let header = part(&bytes, "word/header1.xml");

        assert!(header.contains(r#"<w:bottom w:val="single" w:sz="6" w:space="1" w:color="000000"/>"#));
        assert!(header.contains(r#"<w:jc w:val="left"/>"#));
        assert!(header.contains(r#"<w:i/><w:sz w:val="24"/>"#));
        assert!(header.contains("Personal Statement &amp; Co"));
    }

    #[test]
    fn test_host_language_maps_east_asian_font() {
        let chinese = part(&render("正文", "标题", "宋体", true).unwrap(), "word/document.xml");
        assert!(chinese.contains(r#"w:eastAsia="宋体""#));
        assert!(chinese.contains(r#"<w:sz w:val="22"/>"#));

        let english = part(
            &render("Body", "Title", "Times New Roman", false).unwrap(),
            "word/document.xml",
        );
        assert!(!english.contains("w:eastAsia"));
        assert!(english.contains(r#"w:ascii="Times New Roman""#));
    }

    #[test]
    fn test_package_declares_header_part() {
        let bytes = render("Body", "", "Times New Roman", false).unwrap();
        assert!(part(&bytes, "[Content_Types].xml").contains("/word/header1.xml"));
        assert!(part(&bytes, "word/_rels/document.xml.rels").contains("header1.xml"));
        assert!(part(&bytes, "word/document.xml").contains(r#"r:id="rId1""#));
    }
}
