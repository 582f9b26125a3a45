//! In-memory DOCX model.
//!
//! Only the elements the formatter rewrites are parsed into structure
//! (`w:spacing`, `w:jc`, `w:ind`, `w:rFonts`, `w:sz`, `w:pgMar`,
//! `w:headerReference`); everything else is carried as a verbatim XML slice
//! of the source part so it survives the round trip untouched.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_val(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum LineSpacing {
    Auto(f32),    // multiplier (e.g. 2.0 = double)
    Exact(f32),   // fixed height in points
    AtLeast(f32), // minimum height in points
}

/// Attributes of a structural element, local names only (all `w:`),
/// in source order.
pub type Attrs = Vec<(String, String)>;

pub fn attr_set(attrs: &mut Attrs, name: &str, value: &str) {
    if let Some(slot) = attrs.iter_mut().find(|(n, _)| n == name) {
        slot.1 = value.to_string();
    } else {
        attrs.push((name.to_string(), value.to_string()));
    }
}

pub fn attr_remove(attrs: &mut Attrs, name: &str) {
    attrs.retain(|(n, _)| n != name);
}

/// One child of a `w:pPr` or `w:rPr` block.
#[derive(Clone, Debug)]
pub enum Prop {
    Spacing(Attrs),
    Jc(String),
    Ind(Attrs),
    Fonts(Attrs),
    Sz(String),
    SectPr(SectionProperties),
    Raw { name: String, xml: String },
}

impl Prop {
    pub fn name(&self) -> &str {
        match self {
            Prop::Spacing(_) => "spacing",
            Prop::Jc(_) => "jc",
            Prop::Ind(_) => "ind",
            Prop::Fonts(_) => "rFonts",
            Prop::Sz(_) => "sz",
            Prop::SectPr(_) => "sectPr",
            Prop::Raw { name, .. } => name,
        }
    }
}

/// Child order of w:pPr per the WML schema. A property inserted into an
/// existing list must land where the schema expects it or Word rejects the
/// part.
const PPR_ORDER: &[&str] = &[
    "pStyle",
    "keepNext",
    "keepLines",
    "pageBreakBefore",
    "framePr",
    "widowControl",
    "numPr",
    "suppressLineNumbers",
    "pBdr",
    "shd",
    "tabs",
    "suppressAutoHyphens",
    "kinsoku",
    "wordWrap",
    "overflowPunct",
    "topLinePunct",
    "autoSpaceDE",
    "autoSpaceDN",
    "bidi",
    "adjustRightInd",
    "snapToGrid",
    "spacing",
    "ind",
    "contextualSpacing",
    "mirrorIndents",
    "suppressOverlap",
    "jc",
    "textDirection",
    "textAlignment",
    "textboxTightWrap",
    "outlineLvl",
    "divId",
    "cnfStyle",
    "rPr",
    "sectPr",
    "pPrChange",
];

/// Child order of w:rPr.
const RPR_ORDER: &[&str] = &[
    "rStyle",
    "rFonts",
    "b",
    "bCs",
    "i",
    "iCs",
    "caps",
    "smallCaps",
    "strike",
    "dstrike",
    "outline",
    "shadow",
    "emboss",
    "imprint",
    "noProof",
    "snapToGrid",
    "vanish",
    "webHidden",
    "color",
    "spacing",
    "w",
    "kern",
    "position",
    "sz",
    "szCs",
    "highlight",
    "u",
    "effect",
    "bdr",
    "shd",
    "fitText",
    "vertAlign",
    "rtl",
    "cs",
    "em",
    "lang",
    "eastAsianLayout",
    "specVanish",
];

/// Child order of w:sectPr.
const SECTPR_ORDER: &[&str] = &[
    "headerReference",
    "footerReference",
    "footnotePr",
    "endnotePr",
    "type",
    "pgSz",
    "pgMar",
    "paperSrc",
    "pgBorders",
    "lnNumType",
    "pgNumType",
    "cols",
    "formProt",
    "vAlign",
    "noEndnote",
    "titlePg",
    "textDirection",
    "bidi",
    "rtlGutter",
    "docGrid",
    "printerSettings",
];

fn rank(order: &[&str], name: &str) -> usize {
    order.iter().position(|n| *n == name).unwrap_or(order.len())
}

fn insert_ordered(props: &mut Vec<Prop>, order: &[&str], prop: Prop) {
    let new_rank = rank(order, prop.name());
    let at = props
        .iter()
        .position(|p| rank(order, p.name()) > new_rank)
        .unwrap_or(props.len());
    props.insert(at, prop);
}

fn set_prop(props: &mut Vec<Prop>, order: &[&str], prop: Prop) {
    match props.iter_mut().find(|p| p.name() == prop.name()) {
        Some(slot) => *slot = prop,
        None => insert_ordered(props, order, prop),
    }
}

#[derive(Clone, Debug)]
pub enum RunContent {
    Text { text: String, preserve_space: bool },
    Raw(String),
}

#[derive(Clone, Debug)]
pub struct Run {
    pub start_tag: String,
    pub props: Vec<Prop>,
    pub content: Vec<RunContent>,
    /// Explicit w:b on this run. Style inheritance is not consulted.
    pub bold: bool,
}

impl Run {
    pub fn new(text: &str) -> Run {
        Run {
            start_tag: "<w:r>".to_string(),
            props: Vec::new(),
            content: vec![RunContent::Text {
                text: text.to_string(),
                preserve_space: false,
            }],
            bold: false,
        }
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            if let RunContent::Text { text, .. } = item {
                out.push_str(text);
            }
        }
        out
    }

    fn fonts_mut(&mut self) -> &mut Attrs {
        if !self.props.iter().any(|p| matches!(p, Prop::Fonts(_))) {
            insert_ordered(&mut self.props, RPR_ORDER, Prop::Fonts(Attrs::new()));
        }
        match self.props.iter_mut().find(|p| matches!(p, Prop::Fonts(_))) {
            Some(Prop::Fonts(attrs)) => attrs,
            _ => unreachable!(),
        }
    }

    /// Sets the Latin font family (w:ascii + w:hAnsi). Other rFonts
    /// attributes are left alone.
    pub fn set_font(&mut self, family: &str) {
        let attrs = self.fonts_mut();
        attr_set(attrs, "ascii", family);
        attr_set(attrs, "hAnsi", family);
    }

    /// w:eastAsia is a separate attribute; without it CJK text keeps the
    /// inherited family.
    pub fn set_east_asian_font(&mut self, family: &str) {
        attr_set(self.fonts_mut(), "eastAsia", family);
    }

    pub fn set_size(&mut self, half_points: u32) {
        set_prop(&mut self.props, RPR_ORDER, Prop::Sz(half_points.to_string()));
    }
}

#[derive(Clone, Debug)]
pub enum Inline {
    Run(Run),
    /// Hyperlinks, bookmarks, proofing marks and the like, verbatim.
    Raw(String),
}

#[derive(Clone, Debug)]
pub struct Paragraph {
    pub start_tag: String,
    pub props: Vec<Prop>,
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn new() -> Paragraph {
        Paragraph {
            start_tag: "<w:p>".to_string(),
            props: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_text(text: &str) -> Paragraph {
        let mut paragraph = Paragraph::new();
        paragraph.children.push(Inline::Run(Run::new(text)));
        paragraph
    }

    /// Concatenated text of the direct runs. Text inside hyperlinks or other
    /// wrappers is not included.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let Inline::Run(run) = child {
                out.push_str(&run.text());
            }
        }
        out
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.children.iter().filter_map(|child| match child {
            Inline::Run(run) => Some(run),
            _ => None,
        })
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.children.iter_mut().filter_map(|child| match child {
            Inline::Run(run) => Some(run),
            _ => None,
        })
    }

    pub fn push_run(&mut self, run: Run) {
        self.children.push(Inline::Run(run));
    }

    /// Removes all inline content; paragraph properties stay in place.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        set_prop(
            &mut self.props,
            PPR_ORDER,
            Prop::Jc(alignment.as_val().to_string()),
        );
    }

    fn spacing_mut(&mut self) -> &mut Attrs {
        if !self.props.iter().any(|p| matches!(p, Prop::Spacing(_))) {
            insert_ordered(&mut self.props, PPR_ORDER, Prop::Spacing(Attrs::new()));
        }
        match self.props.iter_mut().find(|p| matches!(p, Prop::Spacing(_))) {
            Some(Prop::Spacing(attrs)) => attrs,
            _ => unreachable!(),
        }
    }

    /// Rewrites w:line / w:lineRule, keeping before/after spacing intact.
    pub fn set_line_spacing(&mut self, spacing: LineSpacing) {
        let (line, rule) = match spacing {
            LineSpacing::Auto(mult) => ((mult * 240.0).round() as i64, "auto"),
            LineSpacing::Exact(points) => ((points * 20.0).round() as i64, "exact"),
            LineSpacing::AtLeast(points) => ((points * 20.0).round() as i64, "atLeast"),
        };
        let attrs = self.spacing_mut();
        attr_set(attrs, "line", &line.to_string());
        attr_set(attrs, "lineRule", rule);
    }

    fn ind_mut(&mut self) -> &mut Attrs {
        if !self.props.iter().any(|p| matches!(p, Prop::Ind(_))) {
            insert_ordered(&mut self.props, PPR_ORDER, Prop::Ind(Attrs::new()));
        }
        match self.props.iter_mut().find(|p| matches!(p, Prop::Ind(_))) {
            Some(Prop::Ind(attrs)) => attrs,
            _ => unreachable!(),
        }
    }

    pub fn set_left_indent(&mut self, twips: u32) {
        attr_set(self.ind_mut(), "left", &twips.to_string());
    }

    /// Drops any first-line or hanging offset. Does not create a w:ind
    /// element where none exists.
    pub fn clear_first_line_indent(&mut self) {
        if let Some(Prop::Ind(attrs)) = self.props.iter_mut().find(|p| matches!(p, Prop::Ind(_))) {
            attr_remove(attrs, "firstLine");
            attr_remove(attrs, "hanging");
        }
    }

    pub fn section_mut(&mut self) -> Option<&mut SectionProperties> {
        self.props.iter_mut().find_map(|prop| match prop {
            Prop::SectPr(sect) => Some(sect),
            _ => None,
        })
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Paragraph::new()
    }
}

/// One child of a w:sectPr block.
#[derive(Clone, Debug)]
pub enum SectProp {
    HeaderReference { hf_type: String, rel_id: String },
    PgMar(Attrs),
    Raw { name: String, xml: String },
}

impl SectProp {
    pub fn name(&self) -> &str {
        match self {
            SectProp::HeaderReference { .. } => "headerReference",
            SectProp::PgMar(_) => "pgMar",
            SectProp::Raw { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SectionProperties {
    pub start_tag: String,
    pub props: Vec<SectProp>,
}

impl SectionProperties {
    fn pg_mar_mut(&mut self) -> &mut Attrs {
        if !self.props.iter().any(|p| matches!(p, SectProp::PgMar(_))) {
            let new_rank = rank(SECTPR_ORDER, "pgMar");
            let at = self
                .props
                .iter()
                .position(|p| rank(SECTPR_ORDER, p.name()) > new_rank)
                .unwrap_or(self.props.len());
            self.props.insert(at, SectProp::PgMar(Attrs::new()));
        }
        match self
            .props
            .iter_mut()
            .find(|p| matches!(p, SectProp::PgMar(_)))
        {
            Some(SectProp::PgMar(attrs)) => attrs,
            _ => unreachable!(),
        }
    }

    /// Sets all four page margins; header/footer/gutter distances are kept.
    pub fn set_margins(&mut self, twips: u32) {
        let value = twips.to_string();
        let attrs = self.pg_mar_mut();
        for side in ["top", "right", "bottom", "left"] {
            attr_set(attrs, side, &value);
        }
    }

    pub fn default_header_rid(&self) -> Option<&str> {
        self.props.iter().find_map(|prop| match prop {
            SectProp::HeaderReference { hf_type, rel_id } if hf_type == "default" => {
                Some(rel_id.as_str())
            }
            _ => None,
        })
    }
}

#[derive(Clone, Debug)]
pub enum Block {
    Paragraph(Paragraph),
    /// Tables, SDT blocks and anything else the formatter leaves alone.
    Raw(String),
}

/// A header part loaded because some section references it as its default
/// header.
#[derive(Clone, Debug)]
pub struct HeaderPart {
    /// Archive entry name, e.g. "word/header1.xml".
    pub path: String,
    pub root_tag: String,
    pub blocks: Vec<Block>,
}

impl HeaderPart {
    pub fn first_paragraph_mut(&mut self) -> &mut Paragraph {
        let idx = match self
            .blocks
            .iter()
            .position(|b| matches!(b, Block::Paragraph(_)))
        {
            Some(i) => i,
            None => {
                self.blocks.insert(0, Block::Paragraph(Paragraph::new()));
                0
            }
        };
        match &mut self.blocks[idx] {
            Block::Paragraph(paragraph) => paragraph,
            _ => unreachable!(),
        }
    }
}

pub struct Document {
    /// The original package bytes; untouched entries are copied from here on
    /// save.
    pub source: Vec<u8>,
    /// Verbatim w:document start tag, namespace declarations included.
    pub root_tag: String,
    /// Element children of w:document preceding w:body (e.g. w:background),
    /// verbatim.
    pub prelude: Vec<String>,
    pub body: Vec<Block>,
    /// The body-final w:sectPr, emitted after all blocks.
    pub body_section: Option<SectionProperties>,
    pub headers: Vec<HeaderPart>,
}

impl Document {
    pub fn paragraph_count(&self) -> usize {
        self.body
            .iter()
            .filter(|b| matches!(b, Block::Paragraph(_)))
            .count()
    }

    pub fn append_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Visits every w:sectPr in the document: paragraph-level section breaks
    /// first, the body-final one last.
    pub fn for_each_section(&mut self, mut f: impl FnMut(&mut SectionProperties)) {
        for block in &mut self.body {
            if let Block::Paragraph(paragraph) = block {
                if let Some(sect) = paragraph.section_mut() {
                    f(sect);
                }
            }
        }
        if let Some(sect) = &mut self.body_section {
            f(sect);
        }
    }
}
