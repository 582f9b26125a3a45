//! Serializes the model back into a DOCX package.
//!
//! Only `word/document.xml` and the rewritten header parts are regenerated;
//! every other entry of the source archive is streamed through unchanged.

use std::collections::HashMap;
use std::io::{Cursor, Write as _};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::model::{
    Attrs, Block, Document, HeaderPart, Inline, Paragraph, Prop, Run, RunContent, SectProp,
    SectionProperties,
};

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";

pub(crate) fn write(doc: &Document) -> Result<Vec<u8>, Error> {
    let mut replacements: HashMap<&str, String> = HashMap::new();
    replacements.insert("word/document.xml", document_xml(doc));
    for header in &doc.headers {
        replacements.insert(header.path.as_str(), header_xml(header));
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(doc.source.as_slice()))
        .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;
    let mut out = zip::ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if entry.is_dir() {
            out.add_directory(name.as_str(), SimpleFileOptions::default())?;
            continue;
        }
        out.start_file(name.as_str(), SimpleFileOptions::default())?;
        match replacements.get(name.as_str()) {
            Some(xml) => out.write_all(xml.as_bytes())?,
            None => {
                std::io::copy(&mut entry, &mut out)?;
            }
        }
    }

    Ok(out.finish()?.into_inner())
}

fn document_xml(doc: &Document) -> String {
    let mut out = String::with_capacity(doc.source.len());
    out.push_str(XML_DECL);
    out.push_str(&doc.root_tag);
    for chunk in &doc.prelude {
        out.push_str(chunk);
    }
    out.push_str("<w:body>");
    for block in &doc.body {
        push_block(&mut out, block);
    }
    if let Some(sect) = &doc.body_section {
        push_sect_pr(&mut out, sect);
    }
    out.push_str("</w:body></w:document>");
    out
}

fn header_xml(header: &HeaderPart) -> String {
    let mut out = String::new();
    out.push_str(XML_DECL);
    out.push_str(&header.root_tag);
    for block in &header.blocks {
        push_block(&mut out, block);
    }
    out.push_str("</w:hdr>");
    out
}

fn push_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph(paragraph) => push_paragraph(out, paragraph),
        Block::Raw(xml) => out.push_str(xml),
    }
}

fn push_paragraph(out: &mut String, paragraph: &Paragraph) {
    out.push_str(&paragraph.start_tag);
    if !paragraph.props.is_empty() {
        out.push_str("<w:pPr>");
        for prop in &paragraph.props {
            push_prop(out, prop);
        }
        out.push_str("</w:pPr>");
    }
    for child in &paragraph.children {
        match child {
            Inline::Run(run) => push_run(out, run),
            Inline::Raw(xml) => out.push_str(xml),
        }
    }
    out.push_str("</w:p>");
}

fn push_run(out: &mut String, run: &Run) {
    out.push_str(&run.start_tag);
    if !run.props.is_empty() {
        out.push_str("<w:rPr>");
        for prop in &run.props {
            push_prop(out, prop);
        }
        out.push_str("</w:rPr>");
    }
    for item in &run.content {
        match item {
            RunContent::Text {
                text,
                preserve_space,
            } => {
                if *preserve_space || text.trim().len() != text.len() {
                    out.push_str("<w:t xml:space=\"preserve\">");
                } else {
                    out.push_str("<w:t>");
                }
                out.push_str(&escape(text.as_str()));
                out.push_str("</w:t>");
            }
            RunContent::Raw(xml) => out.push_str(xml),
        }
    }
    out.push_str("</w:r>");
}

fn push_prop(out: &mut String, prop: &Prop) {
    match prop {
        Prop::Spacing(attrs) => push_elem(out, "w:spacing", attrs),
        Prop::Jc(val) => push_val_elem(out, "w:jc", val),
        Prop::Ind(attrs) => push_elem(out, "w:ind", attrs),
        Prop::Fonts(attrs) => push_elem(out, "w:rFonts", attrs),
        Prop::Sz(val) => push_val_elem(out, "w:sz", val),
        Prop::SectPr(sect) => push_sect_pr(out, sect),
        Prop::Raw { xml, .. } => out.push_str(xml),
    }
}

fn push_sect_pr(out: &mut String, sect: &SectionProperties) {
    out.push_str(&sect.start_tag);
    for prop in &sect.props {
        match prop {
            SectProp::HeaderReference { hf_type, rel_id } => {
                out.push_str("<w:headerReference w:type=\"");
                out.push_str(&escape(hf_type.as_str()));
                out.push_str("\" r:id=\"");
                out.push_str(&escape(rel_id.as_str()));
                out.push_str("\"/>");
            }
            SectProp::PgMar(attrs) => push_elem(out, "w:pgMar", attrs),
            SectProp::Raw { xml, .. } => out.push_str(xml),
        }
    }
    out.push_str("</w:sectPr>");
}

fn push_elem(out: &mut String, name: &str, attrs: &Attrs) {
    out.push('<');
    out.push_str(name);
    for (attr, value) in attrs {
        out.push_str(" w:");
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    out.push_str("/>");
}

fn push_val_elem(out: &mut String, name: &str, val: &str) {
    out.push('<');
    out.push_str(name);
    out.push_str(" w:val=\"");
    out.push_str(&escape(val));
    out.push_str("\"/>");
}
