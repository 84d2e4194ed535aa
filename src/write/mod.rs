//! Nitro intermediate files (`.imd`, `.ica`, `.ita`, `.itp`).
//!
//! Each writer builds an element tree; `xml` turns it into text.

pub mod ica;
pub mod imd;
pub mod ita;
pub mod itp;
pub mod xml;

use errors::{ErrorKind, Result};
use nitro::Model;
use self::xml::Element;
use version;

pub static FORMAT_VERSION: &str = "1.6.0";

/// `<kind version="1.6.0">` with the standard `head` and the given `body`.
pub fn document(kind: &'static str, title: &str, body: Element) -> Element {
    let head = Element::new("head")
        .child(Element::new("title").text(title))
        .child(Element::new("generator")
            .attr("name", version::NAME)
            .attr("version", version::VERSION));
    Element::new(kind)
        .attr("version", FORMAT_VERSION)
        .child(head)
        .child(body)
}

/// Fails if a texture the model refers to couldn't be loaded.
pub fn check_textures(model: &Model) -> Result<()> {
    if let Some((ref path, ref msg)) = model.texture_error {
        bail!(ErrorKind::Resource(path.clone(), msg.clone()));
    }
    Ok(())
}
