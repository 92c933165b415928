//! Word-processing documents → sanitized HTML fragment.
//!
//! A `.docx` file is a zip package; the body lives in `word/document.xml`
//! as WordprocessingML. We stream that XML once with `quick-xml` and emit
//! an approximation of the layout from a fixed tag whitelist:
//!
//! * paragraphs → `<p>`, with `Heading1`..`Heading3` styles → `<h1>`..`<h3>`
//! * bold runs → `<strong>`
//! * explicit line breaks → `<br>`
//! * tables → `<table>/<tr>/<td>`
//!
//! Everything else (images, footnotes, fields) is dropped: this is a
//! print preview, not a converter of record. All text is escaped on the
//! way out, so the fragment is safe to inject into a host page.
//!
//! Legacy binary `.doc` files are classified here too but fail the zip
//! open, which surfaces as the recoverable download-fallback failure.

use super::html;
use crate::error::ConvertError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

/// Render the document body to an HTML fragment.
pub fn to_html(bytes: &[u8]) -> Result<String, ConvertError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| ConvertError::Document {
        detail: format!("not a document package: {e}"),
    })?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ConvertError::Document {
            detail: format!("package has no document body: {e}"),
        })?
        .read_to_string(&mut xml)
        .map_err(|e| ConvertError::Document {
            detail: format!("unreadable document body: {e}"),
        })?;

    let fragment = body_to_fragment(&xml)?;
    debug!(
        input_len = bytes.len(),
        fragment_len = fragment.len(),
        "document rendered"
    );
    Ok(fragment)
}

/// Streaming WordprocessingML → fragment conversion.
fn body_to_fragment(xml: &str) -> Result<String, ConvertError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out = String::new();
    // Paragraph content is buffered because the heading style (w:pStyle)
    // arrives after the paragraph start tag but before its runs.
    let mut para_buf = String::new();
    let mut para_tag = "p";
    let mut in_paragraph = false;
    let mut run_bold = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"p" => {
                        in_paragraph = true;
                        para_buf.clear();
                        para_tag = "p";
                    }
                    b"pStyle" => {
                        para_tag = heading_tag(style_val(e)).unwrap_or("p");
                    }
                    b"r" => run_bold = false,
                    b"b" => {
                        // w:b without w:val (or with a truthy one) means bold
                        run_bold = !matches!(style_val(e).as_deref(), Some("false") | Some("0"));
                    }
                    b"t" => in_text = true,
                    b"br" => {
                        if in_paragraph {
                            para_buf.push_str("<br>");
                        }
                    }
                    b"tbl" => out.push_str("<table>"),
                    b"tr" => out.push_str("<tr>"),
                    b"tc" => out.push_str("<td>"),
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if in_text && in_paragraph {
                    let text = t.unescape().map_err(|e| ConvertError::Document {
                        detail: format!("malformed text node: {e}"),
                    })?;
                    if run_bold {
                        para_buf.push_str("<strong>");
                        html::escape_into(&mut para_buf, &text);
                        para_buf.push_str("</strong>");
                    } else {
                        html::escape_into(&mut para_buf, &text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    if in_paragraph {
                        out.push('<');
                        out.push_str(para_tag);
                        out.push('>');
                        out.push_str(&para_buf);
                        out.push_str("</");
                        out.push_str(para_tag);
                        out.push('>');
                        in_paragraph = false;
                    }
                }
                b"t" => in_text = false,
                b"tbl" => out.push_str("</table>"),
                b"tr" => out.push_str("</tr>"),
                b"tc" => out.push_str("</td>"),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ConvertError::Document {
                    detail: format!("malformed document xml: {e}"),
                })
            }
        }
    }

    Ok(out)
}

/// Read the `w:val` attribute of a style-ish element, ignoring namespaces.
fn style_val(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.local_name().as_ref() == b"val" {
            a.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}

/// Map a paragraph style id to a heading tag, if it is one we render.
fn heading_tag(style: Option<String>) -> Option<&'static str> {
    match style.as_deref() {
        Some("Heading1") => Some("h1"),
        Some("Heading2") => Some("h2"),
        Some("Heading3") => Some("h3"),
        _ => None,
    }
}
