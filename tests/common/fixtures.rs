//! Builders for tiny template decks and stand-in converters.

use std::fs;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use certmill::convert::{ConvertError, Converter};

const CONTENT_TYPES: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "</Types>"
);

/// One slide with a single shape and paragraph; each entry becomes one run.
/// Run texts are embedded as-is, so markup characters must arrive escaped.
pub fn slide_xml(run_texts: &[&str]) -> String {
    let mut runs = String::new();
    for text in run_texts {
        runs.push_str(&format!(
            "<a:r><a:rPr lang=\"pt-BR\" b=\"1\"/><a:t>{text}</a:t></a:r>"
        ));
    }
    format!(
        "<?xml version=\"1.0\"?><p:sld><p:cSld><p:spTree>\
         <p:sp><p:spPr/><p:txBody><a:p>{runs}</a:p></p:txBody></p:sp>\
         </p:spTree></p:cSld></p:sld>"
    )
}

/// Writes a minimal template deck with one slide.
pub fn write_template(path: &Path, run_texts: &[&str]) -> std::io::Result<()> {
    write_template_slides(path, &[run_texts])
}

/// Writes a template deck with one slide per entry.
pub fn write_template_slides(path: &Path, slides: &[&[&str]]) -> std::io::Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), CONTENT_TYPES.to_string()),
        ("_rels/.rels".to_string(), "<Relationships/>".to_string()),
        (
            "ppt/presentation.xml".to_string(),
            "<p:presentation/>".to_string(),
        ),
    ];
    for (index, runs) in slides.iter().enumerate() {
        parts.push((format!("ppt/slides/slide{}.xml", index + 1), slide_xml(runs)));
    }

    for (name, data) in parts {
        writer.start_file(name, options)?;
        writer.write_all(data.as_bytes())?;
    }
    writer.finish()?;
    Ok(())
}

/// Converts by prefixing the input bytes; no external tools involved.
#[derive(Debug, Default)]
pub struct FakeConverter;

impl Converter for FakeConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let data = fs::read(input)?;
        let mut converted = b"%FAKEPDF\n".to_vec();
        converted.extend_from_slice(&data);
        fs::write(output, converted)?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn name(&self) -> &'static str {
        "FakeConverter"
    }
}

/// Reports the renderer as missing on every call.
#[derive(Debug, Default)]
pub struct UnavailableConverter;

impl Converter for UnavailableConverter {
    fn convert(&self, _input: &Path, _output: &Path) -> Result<(), ConvertError> {
        Err(ConvertError::RendererNotFound)
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn name(&self) -> &'static str {
        "UnavailableConverter"
    }
}
