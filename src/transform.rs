//! The APA formatting pass: margins, header title, font and spacing
//! normalization, bibliography detection and rebuild.

use crate::model::{Alignment, Block, Document, LineSpacing, Paragraph, Run};
use crate::refs;

const FONT_NAME: &str = "Times New Roman";
const FONT_SIZE_HALF_POINTS: u32 = 24; // 12 pt
const MARGIN_TWIPS: u32 = 1440; // 1 inch
const REFERENCE_INDENT_TWIPS: u32 = 720; // 1.27 cm
const HEADER_TITLE: &str = "Título del documento";
const BIBLIOGRAPHY_HEADINGS: &[&str] = &["referencias", "bibliografía"];

/// Applies the full pass to a parsed document. `progress` receives a 0-100
/// percentage once per body paragraph, before that paragraph is processed.
pub fn apply(doc: &mut Document, mut progress: impl FnMut(f32)) {
    doc.for_each_section(|sect| sect.set_margins(MARGIN_TWIPS));

    let title = HEADER_TITLE.to_uppercase();
    for header in &mut doc.headers {
        let paragraph = header.first_paragraph_mut();
        paragraph.clear();
        paragraph.push_run(Run::new(&title));
        paragraph.set_alignment(Alignment::Right);
    }

    let total = doc.paragraph_count();
    let mut in_bibliography = false;
    let mut pending: Vec<String> = Vec::new();

    let mut index = 0usize;
    for block in &mut doc.body {
        let Block::Paragraph(paragraph) = block else {
            continue;
        };
        progress(index as f32 / total as f32 * 100.0);
        index += 1;

        let text = paragraph.text();
        if BIBLIOGRAPHY_HEADINGS.contains(&text.trim().to_lowercase().as_str()) {
            in_bibliography = true;
            paragraph.set_alignment(Alignment::Left);
            continue;
        }

        for run in paragraph.runs_mut() {
            run.set_font(FONT_NAME);
            run.set_east_asian_font(FONT_NAME);
            run.set_size(FONT_SIZE_HALF_POINTS);
        }
        paragraph.set_line_spacing(LineSpacing::Auto(2.0));

        // Any explicitly bold run marks the paragraph as a heading. This is a
        // heuristic and centers paragraphs with mid-text emphasis too.
        if paragraph.runs().any(|run| run.bold) {
            paragraph.set_alignment(Alignment::Center);
        }

        if in_bibliography {
            pending.push(text);
            paragraph.clear();
        }
    }

    if !pending.is_empty() {
        log::debug!("rebuilding bibliography from {} lines", pending.len());
        for display in refs::sort_references(&pending) {
            let mut paragraph = Paragraph::with_text(&display);
            paragraph.set_line_spacing(LineSpacing::Auto(2.0));
            paragraph.clear_first_line_indent();
            paragraph.set_left_indent(REFERENCE_INDENT_TWIPS);
            doc.append_paragraph(paragraph);
        }
    }
}
