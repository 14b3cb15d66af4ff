//! # certmill-deck
//!
//! A deliberately small PresentationML (`.pptx`) engine. It understands just
//! enough of the format to support placeholder substitution: the package is
//! opened as an OPC container, slide parts are parsed into a writable XML
//! tree, and everything else is carried through untouched.
//!
//! ## Design
//!
//! - **Fidelity first.** Parts that are not edited are written back byte for
//!   byte, including slide XML whose runs were never touched. Layouts,
//!   masters, themes, media and relationship data are never interpreted.
//! - **Run granularity.** Text is only ever replaced inside an `a:t`
//!   element, so fonts, sizes and colors attached to the run survive.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use certmill_deck::Presentation;
//!
//! # fn main() -> Result<(), certmill_deck::DeckError> {
//! let mut deck = Presentation::open(Path::new("template.pptx"))?;
//! for mut slide in deck.slides_mut() {
//!     for mut shape in slide.shapes() {
//!         for mut paragraph in shape.paragraphs() {
//!             for mut run in paragraph.runs() {
//!                 let text = run.text();
//!                 if text.contains("{NOME}") {
//!                     run.set_text(&text.replace("{NOME}", "Maria"));
//!                 }
//!             }
//!         }
//!     }
//! }
//! deck.save(Path::new("out.pptx"))?;
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

mod package;
pub mod presentation;
pub mod xml;

pub use presentation::{ParagraphMut, Presentation, RunMut, ShapeMut, Slide, SlideMut};

/// Errors reading, editing or writing a presentation package.
#[derive(Error, Debug)]
pub enum DeckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid presentation package: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("required part '{0}' is missing")]
    MissingPart(&'static str),

    #[error("malformed XML in part '{part}': {message}")]
    Xml { part: String, message: String },
}
