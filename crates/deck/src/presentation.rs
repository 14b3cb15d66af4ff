//! In-memory model of a presentation package.
//!
//! Only slide parts are parsed. Every other part (layouts, masters, media,
//! relationships) is carried as opaque bytes, so a saved package stays
//! faithful to its source template. The model exposes the hierarchy text
//! substitution works on: slides, then shapes with a text body, then
//! paragraphs, then runs.

use std::fs;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;

use crate::package::{self, PartWriter};
use crate::xml::{XmlDocument, XmlElement, XmlNode};
use crate::DeckError;

const SLIDE_PREFIX: &str = "ppt/slides/";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PRESENTATION_PART: &str = "ppt/presentation.xml";

const SHAPE: &str = "p:sp";
const TEXT_BODY: &str = "p:txBody";
const PARAGRAPH: &str = "a:p";
const RUN: &str = "a:r";
const RUN_TEXT: &str = "a:t";

/// A slide part sits directly under `ppt/slides/`; its relationship files
/// live one level deeper and stay opaque.
fn is_slide_part(name: &str) -> bool {
    match name.strip_prefix(SLIDE_PREFIX) {
        Some(rest) => rest.ends_with(".xml") && !rest.contains('/'),
        None => false,
    }
}

#[derive(Debug, Clone)]
enum Part {
    Opaque { name: String, data: Vec<u8> },
    Slide { name: String, document: XmlDocument },
}

/// A loaded `.pptx` package.
#[derive(Debug, Clone)]
pub struct Presentation {
    parts: Vec<Part>,
}

impl Presentation {
    /// Reads a presentation from disk.
    pub fn open(path: &Path) -> Result<Self, DeckError> {
        let data = fs::read(path)?;
        Self::from_reader(Cursor::new(data))
    }

    /// Reads a presentation from any seekable byte source.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DeckError> {
        let mut parts = Vec::new();
        for (name, data) in package::read_parts(reader)? {
            if is_slide_part(&name) {
                let text = std::str::from_utf8(&data).map_err(|e| DeckError::Xml {
                    part: name.clone(),
                    message: e.to_string(),
                })?;
                let document = XmlDocument::parse(text).map_err(|e| DeckError::Xml {
                    part: name.clone(),
                    message: e.to_string(),
                })?;
                parts.push(Part::Slide { name, document });
            } else {
                parts.push(Part::Opaque { name, data });
            }
        }

        let loaded = Self { parts };
        for required in [CONTENT_TYPES_PART, PRESENTATION_PART] {
            if !loaded.has_part(required) {
                return Err(DeckError::MissingPart(required));
            }
        }
        Ok(loaded)
    }

    fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|part| match part {
            Part::Opaque { name: n, .. } | Part::Slide { name: n, .. } => n == name,
        })
    }

    /// Current bytes of one part, if present. Opaque parts return their
    /// stored bytes, slide parts are serialized from their tree.
    pub fn part_bytes(&self, name: &str) -> Result<Option<Vec<u8>>, DeckError> {
        for part in &self.parts {
            match part {
                Part::Opaque { name: n, data } if n == name => {
                    return Ok(Some(data.clone()));
                }
                Part::Slide { name: n, document } if n == name => {
                    let data = document.to_bytes().map_err(|e| DeckError::Xml {
                        part: n.clone(),
                        message: e.to_string(),
                    })?;
                    return Ok(Some(data));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    pub fn slide_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, Part::Slide { .. }))
            .count()
    }

    pub fn slides(&self) -> Vec<Slide<'_>> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Slide { name, document } => Some(Slide {
                    name: name.as_str(),
                    document,
                }),
                Part::Opaque { .. } => None,
            })
            .collect()
    }

    pub fn slides_mut(&mut self) -> Vec<SlideMut<'_>> {
        self.parts
            .iter_mut()
            .filter_map(|part| match part {
                Part::Slide { name, document } => Some(SlideMut {
                    name: name.as_str(),
                    document,
                }),
                Part::Opaque { .. } => None,
            })
            .collect()
    }

    /// Writes the package to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), DeckError> {
        let file = fs::File::create(path)?;
        let mut writer = self.write_to(io::BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }

    /// Serializes the package into `writer`, preserving part order.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W, DeckError> {
        let mut out = PartWriter::new(writer);
        for part in &self.parts {
            match part {
                Part::Opaque { name, data } => out.write_part(name, data)?,
                Part::Slide { name, document } => {
                    let data = document.to_bytes().map_err(|e| DeckError::Xml {
                        part: name.clone(),
                        message: e.to_string(),
                    })?;
                    out.write_part(name, &data)?;
                }
            }
        }
        out.finish()
    }
}

/// Read-only view of one slide part.
pub struct Slide<'a> {
    name: &'a str,
    document: &'a XmlDocument,
}

impl Slide<'_> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DeckError> {
        self.document.to_bytes().map_err(|e| DeckError::Xml {
            part: self.name.to_string(),
            message: e.to_string(),
        })
    }

    /// Text of every run in the slide, in document order.
    pub fn text_runs(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut shapes = Vec::new();
        if let Some(root) = self.document.root() {
            root.descendants_named(SHAPE, &mut shapes);
        }
        for sp in shapes {
            if !sp.has_element(TEXT_BODY) {
                continue;
            }
            let mut paragraphs = Vec::new();
            sp.descendants_named(PARAGRAPH, &mut paragraphs);
            for p in paragraphs {
                let mut runs = Vec::new();
                p.descendants_named(RUN, &mut runs);
                for r in runs {
                    let mut texts = Vec::new();
                    r.descendants_named(RUN_TEXT, &mut texts);
                    out.push(texts.first().map(|t| t.text()).unwrap_or_default());
                }
            }
        }
        out
    }
}

/// Mutable view of one slide part.
pub struct SlideMut<'a> {
    name: &'a str,
    document: &'a mut XmlDocument,
}

impl SlideMut<'_> {
    pub fn name(&self) -> &str {
        self.name
    }

    /// Shapes carrying a text body, including shapes nested in groups.
    pub fn shapes(&mut self) -> Vec<ShapeMut<'_>> {
        let mut found = Vec::new();
        for node in self.document.nodes_mut() {
            if let XmlNode::Element(el) = node {
                el.descendants_named_mut(SHAPE, &mut found);
            }
        }
        found.retain(|sp| sp.has_element(TEXT_BODY));
        found.into_iter().map(|sp| ShapeMut { sp }).collect()
    }
}

pub struct ShapeMut<'a> {
    sp: &'a mut XmlElement,
}

impl ShapeMut<'_> {
    pub fn paragraphs(&mut self) -> Vec<ParagraphMut<'_>> {
        let mut found = Vec::new();
        self.sp.descendants_named_mut(PARAGRAPH, &mut found);
        found.into_iter().map(|p| ParagraphMut { p }).collect()
    }
}

pub struct ParagraphMut<'a> {
    p: &'a mut XmlElement,
}

impl ParagraphMut<'_> {
    pub fn runs(&mut self) -> Vec<RunMut<'_>> {
        let mut found = Vec::new();
        self.p.descendants_named_mut(RUN, &mut found);
        found.into_iter().map(|r| RunMut { r }).collect()
    }
}

pub struct RunMut<'a> {
    r: &'a mut XmlElement,
}

impl RunMut<'_> {
    /// The run's text, or empty if it carries no text element.
    pub fn text(&self) -> String {
        let mut texts = Vec::new();
        self.r.descendants_named(RUN_TEXT, &mut texts);
        texts.first().map(|t| t.text()).unwrap_or_default()
    }

    /// Overwrites the run text, keeping sibling formatting nodes intact.
    /// Runs without a text element get one appended.
    pub fn set_text(&mut self, text: &str) {
        let mut texts = Vec::new();
        self.r.descendants_named_mut(RUN_TEXT, &mut texts);
        match texts.into_iter().next() {
            Some(t) => t.set_text(text),
            None => {
                let mut t = XmlElement::new(RUN_TEXT);
                t.set_text(text);
                self.r.children_mut().push(XmlNode::Element(t));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use zip::write::SimpleFileOptions;
    use zip::{ZipArchive, ZipWriter};

    use super::*;

    const MIN_CONTENT_TYPES: &str = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
        "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
        "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
        "</Types>"
    );

    fn slide_xml(run_texts: &[&str]) -> String {
        let mut runs = String::new();
        for text in run_texts {
            runs.push_str(&format!("<a:r><a:rPr lang=\"pt-BR\"/><a:t>{text}</a:t></a:r>"));
        }
        format!(
            "<?xml version=\"1.0\"?><p:sld><p:cSld><p:spTree>\
             <p:sp><p:spPr/><p:txBody><a:p>{runs}</a:p></p:txBody></p:sp>\
             </p:spTree></p:cSld></p:sld>"
        )
    }

    fn deck_bytes(extra_parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut base = vec![
            ("[Content_Types].xml", MIN_CONTENT_TYPES.to_string()),
            ("_rels/.rels", "<Relationships/>".to_string()),
            ("ppt/presentation.xml", "<p:presentation/>".to_string()),
        ];
        for (name, data) in extra_parts {
            base.push((name, data.to_string()));
        }
        for (name, data) in &base {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn single_slide_deck(run_texts: &[&str]) -> Vec<u8> {
        deck_bytes(&[("ppt/slides/slide1.xml", &slide_xml(run_texts))])
    }

    #[test]
    fn loads_slides_and_lists_their_runs() {
        let bytes = single_slide_deck(&["Certificado de {NOME}", "nr. {NUMERO}"]);
        let deck = Presentation::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(deck.slide_count(), 1);

        let slides = deck.slides();
        assert_eq!(slides[0].name(), "ppt/slides/slide1.xml");
        assert_eq!(
            slides[0].text_runs(),
            vec!["Certificado de {NOME}".to_string(), "nr. {NUMERO}".to_string()]
        );
    }

    #[test]
    fn relationship_files_under_slides_are_not_slides() {
        let bytes = deck_bytes(&[
            ("ppt/slides/slide1.xml", &slide_xml(&["a"])),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ("ppt/slideLayouts/slideLayout1.xml", "<p:sldLayout/>"),
        ]);
        let deck = Presentation::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(deck.slide_count(), 1);
    }

    #[test]
    fn package_without_presentation_part_is_rejected() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(MIN_CONTENT_TYPES.as_bytes()).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let result = Presentation::from_reader(Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(DeckError::MissingPart("ppt/presentation.xml"))
        ));
    }

    #[test]
    fn package_without_content_types_is_rejected() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("ppt/presentation.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<p:presentation/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let result = Presentation::from_reader(Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(DeckError::MissingPart("[Content_Types].xml"))
        ));
    }

    #[test]
    fn malformed_slide_reports_the_part_name() {
        let bytes = deck_bytes(&[("ppt/slides/slide1.xml", "<p:sld><unclosed></p:sld>")]);
        match Presentation::from_reader(Cursor::new(bytes)) {
            Err(DeckError::Xml { part, .. }) => assert_eq!(part, "ppt/slides/slide1.xml"),
            other => panic!("expected Xml error, got {other:?}"),
        }
    }

    #[test]
    fn edits_survive_save_and_reload() {
        let bytes = single_slide_deck(&["{NOME}", "fixed"]);
        let mut deck = Presentation::from_reader(Cursor::new(bytes)).unwrap();

        for mut slide in deck.slides_mut() {
            for mut shape in slide.shapes() {
                for mut paragraph in shape.paragraphs() {
                    for mut run in paragraph.runs() {
                        if run.text() == "{NOME}" {
                            run.set_text("Maria Silva");
                        }
                    }
                }
            }
        }

        let saved = deck.write_to(Cursor::new(Vec::new())).unwrap().into_inner();
        let reloaded = Presentation::from_reader(Cursor::new(saved)).unwrap();
        assert_eq!(
            reloaded.slides()[0].text_runs(),
            vec!["Maria Silva".to_string(), "fixed".to_string()]
        );
    }

    #[test]
    fn unedited_package_round_trips_every_part_byte_for_byte() {
        let bytes = deck_bytes(&[
            ("ppt/slides/slide1.xml", &slide_xml(&["keep me"])),
            ("ppt/media/image1.bin", "\u{1}\u{2}\u{3}raw"),
        ]);
        let deck = Presentation::from_reader(Cursor::new(bytes.clone())).unwrap();
        let saved = deck.write_to(Cursor::new(Vec::new())).unwrap().into_inner();

        let mut original = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut written = ZipArchive::new(Cursor::new(saved)).unwrap();
        assert_eq!(original.len(), written.len());

        for index in 0..original.len() {
            let mut a = original.by_index(index).unwrap();
            let mut b = written.by_index(index).unwrap();
            assert_eq!(a.name(), b.name());

            let mut a_data = Vec::new();
            let mut b_data = Vec::new();
            a.read_to_end(&mut a_data).unwrap();
            b.read_to_end(&mut b_data).unwrap();
            assert_eq!(a_data, b_data, "part {} changed", a.name());
        }
    }

    #[test]
    fn shapes_nested_in_groups_are_reachable() {
        let grouped = "<?xml version=\"1.0\"?><p:sld><p:cSld><p:spTree>\
             <p:grpSp><p:sp><p:txBody><a:p><a:r><a:t>inner</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp>\
             <p:sp><p:spPr/></p:sp>\
             </p:spTree></p:cSld></p:sld>";
        let bytes = deck_bytes(&[("ppt/slides/slide1.xml", grouped)]);
        let mut deck = Presentation::from_reader(Cursor::new(bytes)).unwrap();

        let mut slides = deck.slides_mut();
        assert_eq!(slides[0].name(), "ppt/slides/slide1.xml");
        let shapes = slides[0].shapes();
        // The shape without a text body is not part of the text hierarchy.
        assert_eq!(shapes.len(), 1);
        assert_eq!(deck.slides()[0].text_runs(), vec!["inner".to_string()]);
    }

    #[test]
    fn runs_without_text_element_gain_one_when_set() {
        let bare_run = "<?xml version=\"1.0\"?><p:sld><p:cSld><p:spTree>\
             <p:sp><p:txBody><a:p><a:r><a:rPr/></a:r></a:p></p:txBody></p:sp>\
             </p:spTree></p:cSld></p:sld>";
        let bytes = deck_bytes(&[("ppt/slides/slide1.xml", bare_run)]);
        let mut deck = Presentation::from_reader(Cursor::new(bytes)).unwrap();

        assert_eq!(deck.slides()[0].text_runs(), vec![String::new()]);
        for mut slide in deck.slides_mut() {
            for mut shape in slide.shapes() {
                for mut paragraph in shape.paragraphs() {
                    for mut run in paragraph.runs() {
                        run.set_text("filled");
                    }
                }
            }
        }
        assert_eq!(deck.slides()[0].text_runs(), vec!["filled".to_string()]);
    }

    #[test]
    fn part_bytes_reads_opaque_and_slide_parts() {
        let slide = slide_xml(&["hello"]);
        let bytes = deck_bytes(&[("ppt/slides/slide1.xml", &slide)]);
        let deck = Presentation::from_reader(Cursor::new(bytes)).unwrap();

        assert_eq!(
            deck.part_bytes("_rels/.rels").unwrap(),
            Some(b"<Relationships/>".to_vec())
        );
        assert_eq!(
            deck.part_bytes("ppt/slides/slide1.xml").unwrap(),
            Some(slide.into_bytes())
        );
        assert_eq!(deck.part_bytes("ppt/slides/slide2.xml").unwrap(), None);
    }

    #[test]
    fn open_reports_missing_file_as_io() {
        let dir = tempfile::tempdir().unwrap();
        let result = Presentation::open(&dir.path().join("absent.pptx"));
        assert!(matches!(result, Err(DeckError::Io(_))));
    }
}
