//! In-memory DOCX fixtures and output inspection helpers.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;

pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
    "</Types>",
);

const CONTENT_TYPES_WITH_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
    "<Override PartName=\"/word/header1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml\"/>",
    "</Types>",
);

const ROOT_RELS: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>",
    "</Relationships>",
);

const DOC_RELS_EMPTY: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"/>",
);

const DOC_RELS_WITH_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId4\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/header\" Target=\"header1.xml\"/>",
    "</Relationships>",
);

/// Wraps body XML into a minimal word/document.xml part.
pub fn document_part(body: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
            "<w:document",
            " xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"",
            " xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">",
            "<w:body>{}</w:body></w:document>",
        ),
        body
    )
}

pub fn build_package(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(content.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// A minimal single-part DOCX around the given body XML.
pub fn build_docx(body: &str) -> Vec<u8> {
    let document = document_part(body);
    build_package(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/_rels/document.xml.rels", DOC_RELS_EMPTY),
        ("word/document.xml", document.as_str()),
    ])
}

/// Like [`build_docx`], with a default header part wired through
/// relationships. The body is expected to reference it via
/// `<w:headerReference w:type="default" r:id="rId4"/>` in its sectPr.
pub fn build_docx_with_header(body: &str, header: &str) -> Vec<u8> {
    let document = document_part(body);
    build_package(&[
        ("[Content_Types].xml", CONTENT_TYPES_WITH_HEADER),
        ("_rels/.rels", ROOT_RELS),
        ("word/_rels/document.xml.rels", DOC_RELS_WITH_HEADER),
        ("word/document.xml", document.as_str()),
        ("word/header1.xml", header),
    ])
}

pub fn format(bytes: &[u8]) -> Vec<u8> {
    apaforma::format_docx_bytes(bytes, |_| {}).expect("formatting succeeds")
}

pub fn extract(bytes: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("open zip");
    let mut content = String::new();
    zip.by_name(name)
        .expect("entry exists")
        .read_to_string(&mut content)
        .expect("read entry");
    content
}

/// Entry names of the package, sorted (the archive iteration order is not
/// specified).
pub fn entry_names(bytes: &[u8]) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("open zip");
    let mut names: Vec<String> = zip.file_names().map(|n| n.to_string()).collect();
    names.sort();
    names
}

// --- roxmltree inspection helpers ---

pub fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

pub fn body<'a>(doc: &'a roxmltree::Document<'a>) -> roxmltree::Node<'a, 'a> {
    wml(doc.root_element(), "body").expect("w:body present")
}

pub fn paragraphs<'a>(parent: roxmltree::Node<'a, 'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    parent
        .children()
        .filter(|n| n.tag_name().name() == "p" && n.tag_name().namespace() == Some(WML_NS))
        .collect()
}

pub fn runs<'a>(paragraph: roxmltree::Node<'a, 'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    paragraph
        .children()
        .filter(|n| n.tag_name().name() == "r" && n.tag_name().namespace() == Some(WML_NS))
        .collect()
}

/// Concatenated w:t text of the paragraph's direct runs.
pub fn para_text(paragraph: roxmltree::Node) -> String {
    let mut out = String::new();
    for run in runs(paragraph) {
        for t in run
            .children()
            .filter(|n| n.tag_name().name() == "t" && n.tag_name().namespace() == Some(WML_NS))
        {
            out.push_str(t.text().unwrap_or(""));
        }
    }
    out
}

/// Value of `w:{attr}` on `w:pPr/w:{elem}`.
pub fn ppr_attr(paragraph: roxmltree::Node, elem: &str, attr: &str) -> Option<String> {
    let ppr = wml(paragraph, "pPr")?;
    let child = wml(ppr, elem)?;
    child.attribute((WML_NS, attr)).map(|v| v.to_string())
}

/// Value of `w:{attr}` on `w:rPr/w:{elem}` of a run.
pub fn rpr_attr(run: roxmltree::Node, elem: &str, attr: &str) -> Option<String> {
    let rpr = wml(run, "rPr")?;
    let child = wml(rpr, elem)?;
    child.attribute((WML_NS, attr)).map(|v| v.to_string())
}
