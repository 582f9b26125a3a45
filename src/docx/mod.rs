mod write;

pub(crate) use write::write;

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::error::Error;
use crate::model::{
    Attrs, Block, Document, HeaderPart, Inline, Paragraph, Prop, Run, RunContent, SectProp,
    SectionProperties,
};

pub(super) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

type Zip<'a> = zip::ZipArchive<Cursor<&'a [u8]>>;

fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

/// Parse a WML boolean toggle element (e.g., w:b, w:i, w:strike).
/// Present with no val or val != "0"/"false" means true.
fn wml_bool(parent: roxmltree::Node, name: &str) -> Option<bool> {
    wml(parent, name).map(|n| {
        n.attribute((WML_NS, "val"))
            .is_none_or(|v| v != "0" && v != "false")
    })
}

fn read_zip_text(zip: &mut Zip, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

fn parse_rels_xml(xml_content: &str) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(id.to_string(), target.to_string());
        }
    }
    rels
}

fn parse_relationships(zip: &mut Zip) -> HashMap<String, String> {
    match read_zip_text(zip, "word/_rels/document.xml.rels") {
        Some(content) => parse_rels_xml(&content),
        None => HashMap::new(),
    }
}

/// The node's source text, verbatim.
fn raw_slice(src: &str, node: roxmltree::Node) -> String {
    src[node.range()].to_string()
}

/// The node's start tag, verbatim (attributes included). A self-closing tag
/// is normalized to an open tag so content can be emitted into it.
fn start_tag(src: &str, node: roxmltree::Node) -> String {
    let slice = &src[node.range()];
    let end = slice.find('>').map(|i| i + 1).unwrap_or(slice.len());
    let mut tag = slice[..end].to_string();
    if tag.ends_with("/>") {
        tag.truncate(tag.len() - 2);
        tag.push('>');
    }
    tag
}

/// WML-namespace attributes of a structural element, local names only.
fn parse_attrs(node: roxmltree::Node) -> Attrs {
    node.attributes()
        .filter(|a| a.namespace() == Some(WML_NS))
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect()
}

fn parse_paragraph_props(ppr: roxmltree::Node, src: &str) -> Vec<Prop> {
    let mut props = Vec::new();
    for child in ppr.children() {
        if !child.is_element() {
            continue;
        }
        if child.tag_name().namespace() == Some(WML_NS) {
            match child.tag_name().name() {
                "spacing" => {
                    props.push(Prop::Spacing(parse_attrs(child)));
                    continue;
                }
                "jc" => {
                    if let Some(val) = child.attribute((WML_NS, "val")) {
                        props.push(Prop::Jc(val.to_string()));
                        continue;
                    }
                }
                "ind" => {
                    props.push(Prop::Ind(parse_attrs(child)));
                    continue;
                }
                "sectPr" => {
                    props.push(Prop::SectPr(parse_section_properties(child, src)));
                    continue;
                }
                _ => {}
            }
        }
        props.push(Prop::Raw {
            name: child.tag_name().name().to_string(),
            xml: raw_slice(src, child),
        });
    }
    props
}

fn parse_run_props(rpr: roxmltree::Node, src: &str) -> Vec<Prop> {
    let mut props = Vec::new();
    for child in rpr.children() {
        if !child.is_element() {
            continue;
        }
        if child.tag_name().namespace() == Some(WML_NS) {
            match child.tag_name().name() {
                "rFonts" => {
                    props.push(Prop::Fonts(parse_attrs(child)));
                    continue;
                }
                "sz" => {
                    if let Some(val) = child.attribute((WML_NS, "val")) {
                        props.push(Prop::Sz(val.to_string()));
                        continue;
                    }
                }
                _ => {}
            }
        }
        props.push(Prop::Raw {
            name: child.tag_name().name().to_string(),
            xml: raw_slice(src, child),
        });
    }
    props
}

fn parse_run(node: roxmltree::Node, src: &str) -> Run {
    let mut props = Vec::new();
    let mut bold = false;
    if let Some(rpr) = wml(node, "rPr") {
        bold = wml_bool(rpr, "b").unwrap_or(false);
        props = parse_run_props(rpr, src);
    }

    let mut content = Vec::new();
    for child in node.children() {
        if !child.is_element() {
            continue;
        }
        if child.tag_name().namespace() == Some(WML_NS) {
            match child.tag_name().name() {
                "rPr" => continue,
                "t" => {
                    content.push(RunContent::Text {
                        text: child.text().unwrap_or("").to_string(),
                        preserve_space: child.attribute((XML_NS, "space")) == Some("preserve"),
                    });
                    continue;
                }
                _ => {}
            }
        }
        content.push(RunContent::Raw(raw_slice(src, child)));
    }

    Run {
        start_tag: start_tag(src, node),
        props,
        content,
        bold,
    }
}

fn parse_paragraph(node: roxmltree::Node, src: &str) -> Paragraph {
    let props = match wml(node, "pPr") {
        Some(ppr) => parse_paragraph_props(ppr, src),
        None => Vec::new(),
    };

    let mut children = Vec::new();
    for child in node.children() {
        if !child.is_element() {
            continue;
        }
        if child.tag_name().namespace() == Some(WML_NS) {
            match child.tag_name().name() {
                "pPr" => continue,
                "r" => {
                    children.push(Inline::Run(parse_run(child, src)));
                    continue;
                }
                _ => {}
            }
        }
        children.push(Inline::Raw(raw_slice(src, child)));
    }

    Paragraph {
        start_tag: start_tag(src, node),
        props,
        children,
    }
}

fn parse_section_properties(node: roxmltree::Node, src: &str) -> SectionProperties {
    let mut props = Vec::new();
    for child in node.children() {
        if !child.is_element() {
            continue;
        }
        if child.tag_name().namespace() == Some(WML_NS) {
            match child.tag_name().name() {
                "headerReference" => {
                    if let (Some(hf_type), Some(rel_id)) = (
                        child.attribute((WML_NS, "type")),
                        child.attribute((REL_NS, "id")),
                    ) {
                        props.push(SectProp::HeaderReference {
                            hf_type: hf_type.to_string(),
                            rel_id: rel_id.to_string(),
                        });
                        continue;
                    }
                }
                "pgMar" => {
                    props.push(SectProp::PgMar(parse_attrs(child)));
                    continue;
                }
                _ => {}
            }
        }
        props.push(SectProp::Raw {
            name: child.tag_name().name().to_string(),
            xml: raw_slice(src, child),
        });
    }
    SectionProperties {
        start_tag: start_tag(src, node),
        props,
    }
}

/// Direct block children of a body-like element: paragraphs become model
/// paragraphs, a trailing w:sectPr becomes the section, everything else
/// (tables, SDT wrappers) passes through verbatim.
fn parse_blocks(parent: roxmltree::Node, src: &str) -> (Vec<Block>, Option<SectionProperties>) {
    let mut blocks = Vec::new();
    let mut section = None;
    for node in parent.children() {
        if !node.is_element() {
            continue;
        }
        if node.tag_name().namespace() == Some(WML_NS) {
            match node.tag_name().name() {
                "p" => {
                    blocks.push(Block::Paragraph(parse_paragraph(node, src)));
                    continue;
                }
                "sectPr" => {
                    section = Some(parse_section_properties(node, src));
                    continue;
                }
                _ => {}
            }
        }
        blocks.push(Block::Raw(raw_slice(src, node)));
    }
    (blocks, section)
}

fn parse_header_part(xml_text: &str, path: String) -> Result<HeaderPart, Error> {
    let xml = roxmltree::Document::parse(xml_text)?;
    let root = xml.root_element();
    let (blocks, _) = parse_blocks(root, xml_text);
    Ok(HeaderPart {
        path,
        root_tag: start_tag(xml_text, root),
        blocks,
    })
}

pub fn parse(path: &Path) -> Result<Document, Error> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_bytes(bytes)
}

pub fn parse_bytes(bytes: Vec<u8>) -> Result<Document, Error> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes.as_slice()))
        .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;

    let rels = parse_relationships(&mut zip);

    let mut xml_content = String::new();
    zip.by_name("word/document.xml")
        .map_err(|_| Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into()))?
        .read_to_string(&mut xml_content)?;

    let xml = roxmltree::Document::parse(&xml_content)?;
    let root = xml.root_element();
    let body = wml(root, "body").ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let root_tag = start_tag(&xml_content, root);
    let mut prelude = Vec::new();
    for child in root.children() {
        if child.is_element() && child != body {
            prelude.push(raw_slice(&xml_content, child));
        }
    }

    let (blocks, body_section) = parse_blocks(body, &xml_content);

    // Default headers referenced by any section. Sections without their own
    // headerReference inherit from the previous section and own no part.
    let mut header_rids: Vec<&str> = Vec::new();
    for block in &blocks {
        if let Block::Paragraph(paragraph) = block {
            for prop in &paragraph.props {
                if let Prop::SectPr(sect) = prop
                    && let Some(rid) = sect.default_header_rid()
                {
                    header_rids.push(rid);
                }
            }
        }
    }
    if let Some(sect) = &body_section
        && let Some(rid) = sect.default_header_rid()
    {
        header_rids.push(rid);
    }

    let mut headers: Vec<HeaderPart> = Vec::new();
    for rid in header_rids {
        let Some(target) = rels.get(rid) else {
            continue;
        };
        let zip_path = target
            .strip_prefix('/')
            .map(String::from)
            .unwrap_or_else(|| format!("word/{}", target));
        if headers.iter().any(|h| h.path == zip_path) {
            continue;
        }
        let Some(part_xml) = read_zip_text(&mut zip, &zip_path) else {
            continue;
        };
        headers.push(parse_header_part(&part_xml, zip_path)?);
    }

    drop(zip);

    log::debug!(
        "parsed document: {} blocks, {} header part(s)",
        blocks.len(),
        headers.len()
    );

    Ok(Document {
        source: bytes,
        root_tag,
        prelude,
        body: blocks,
        body_section,
        headers,
    })
}
