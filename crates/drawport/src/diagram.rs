//! Page metadata extracted from `.drawio` files.
//!
//! Only what the placeholder renderer needs is read: page names and their
//! declared sizes. Shapes are never interpreted.
//!
//! A draw.io file is an `mxfile` element with one `diagram` child per page.
//! Each page holds either an inline `mxGraphModel` or, in compressed files,
//! text that is base64 of raw-deflated, percent-encoded XML.

use std::io::Read;

use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::read::DeflateDecoder;
use log::{debug, trace};
use roxmltree::{Document, Node};

use crate::DrawportError;

/// Page width used by draw.io when `pageWidth` is absent.
pub const DEFAULT_PAGE_WIDTH: f32 = 850.0;
/// Page height used by draw.io when `pageHeight` is absent.
pub const DEFAULT_PAGE_HEIGHT: f32 = 1100.0;

/// A single diagram page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub name: String,
    pub width: f32,
    pub height: f32,
}

/// Pages declared by a `.drawio` document.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramInfo {
    pages: Vec<PageInfo>,
}

impl DiagramInfo {
    /// Parse the page list out of draw.io XML.
    ///
    /// # Errors
    ///
    /// Returns [`DrawportError::InvalidDiagram`] if the document is not
    /// well-formed, is not a draw.io file, declares no pages, or holds a
    /// compressed page that cannot be decoded.
    pub fn parse(xml: &str) -> Result<Self, DrawportError> {
        let doc = Document::parse(xml).map_err(|err| invalid(format!("malformed XML: {err}")))?;
        let root = doc.root_element();

        let pages = match root.tag_name().name() {
            "mxfile" => root
                .children()
                .filter(|n| n.has_tag_name("diagram"))
                .enumerate()
                .map(|(index, node)| page_from_diagram(node, index))
                .collect::<Result<Vec<_>, _>>()?,
            "mxGraphModel" => vec![page_from_model(root, default_page_name(0))],
            other => return Err(invalid(format!("unexpected root element <{other}>"))),
        };

        if pages.is_empty() {
            return Err(invalid("document declares no pages"));
        }

        debug!(pages = pages.len(); "Diagram metadata parsed");
        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[PageInfo] {
        &self.pages
    }

    /// The first page; a parsed diagram always has one.
    pub fn first_page(&self) -> &PageInfo {
        &self.pages[0]
    }
}

fn page_from_diagram(node: Node<'_, '_>, index: usize) -> Result<PageInfo, DrawportError> {
    let name = node
        .attribute("name")
        .map(str::to_string)
        .unwrap_or_else(|| default_page_name(index));

    if let Some(model) = node.children().find(|n| n.has_tag_name("mxGraphModel")) {
        return Ok(page_from_model(model, name));
    }

    let payload: String = node
        .children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let payload = payload.trim();

    if payload.is_empty() {
        trace!(page = name; "Empty page, using default size");
        return Ok(PageInfo {
            name,
            width: DEFAULT_PAGE_WIDTH,
            height: DEFAULT_PAGE_HEIGHT,
        });
    }

    let xml = decompress(payload)?;
    let doc = Document::parse(&xml)
        .map_err(|err| invalid(format!("page '{name}' decompressed to malformed XML: {err}")))?;
    let model = doc.root_element();
    if !model.has_tag_name("mxGraphModel") {
        return Err(invalid(format!("page '{name}' does not contain an mxGraphModel")));
    }

    Ok(page_from_model(model, name))
}

fn page_from_model(model: Node<'_, '_>, name: String) -> PageInfo {
    PageInfo {
        width: dimension(model, "pageWidth").unwrap_or(DEFAULT_PAGE_WIDTH),
        height: dimension(model, "pageHeight").unwrap_or(DEFAULT_PAGE_HEIGHT),
        name,
    }
}

fn dimension(model: Node<'_, '_>, attr: &str) -> Option<f32> {
    model
        .attribute(attr)
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn default_page_name(index: usize) -> String {
    format!("Page-{}", index + 1)
}

/// Decode a compressed draw.io page: base64, raw deflate, then percent-encoding.
///
/// Some exports wrap the base64 text over several lines.
fn decompress(payload: &str) -> Result<String, DrawportError> {
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let deflated = STANDARD
        .decode(compact)
        .map_err(|err| invalid(format!("compressed page is not base64: {err}")))?;

    let mut encoded = String::new();
    DeflateDecoder::new(deflated.as_slice())
        .read_to_string(&mut encoded)
        .map_err(|err| invalid(format!("compressed page failed to inflate: {err}")))?;

    percent_decode(&encoded)
}

fn percent_decode(input: &str) -> Result<String, DrawportError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).copied().and_then(hex_value);
            let lo = bytes.get(i + 2).copied().and_then(hex_value);
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 3;
                    continue;
                }
                _ => return Err(invalid("compressed page has a bad percent escape")),
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).map_err(|_| invalid("compressed page is not valid UTF-8"))
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn invalid(msg: impl Into<String>) -> DrawportError {
    DrawportError::InvalidDiagram(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Page "Gateway" with `pageWidth="1169" pageHeight="827"`, as draw.io compresses it.
    const COMPRESSED_GATEWAY: &str = "jZHNDoIwEISfpvfSGtSriHjx7LlJN0BSqClFyttb3OXHA4knut8wu90pk1kTCqde1cNqMExwHZi8MiESznn8TGREks6gdLWmnxC8VAnPWvuKaJKeV+EOdVl5VE7iOAkyZzJz1no8NSEDM82e2+Kc2466DHXQ+n8MAg1vZXpAUigPgxqRd340xJ3tWw2TLWHyQjZwHsLu6GRZKAYJtgHvYl9OhgNFNv6WwyYsujyvNjmlxFSHdbk0XteMB9p0LtdEv9rmWWX+AQ==";

    #[test]
    fn test_inline_pages() {
        let info = DiagramInfo::parse(
            r#"<mxfile>
                <diagram name="Overview"><mxGraphModel pageWidth="1169" pageHeight="827"/></diagram>
                <diagram><mxGraphModel/></diagram>
            </mxfile>"#,
        )
        .unwrap();

        assert_eq!(info.pages().len(), 2);
        assert_eq!(
            info.first_page(),
            &PageInfo {
                name: "Overview".to_string(),
                width: 1169.0,
                height: 827.0,
            }
        );
        assert_eq!(info.pages()[1].name, "Page-2");
        assert_eq!(info.pages()[1].width, DEFAULT_PAGE_WIDTH);
        assert_eq!(info.pages()[1].height, DEFAULT_PAGE_HEIGHT);
    }

    #[test]
    fn test_bare_model_root() {
        let info = DiagramInfo::parse(r#"<mxGraphModel pageWidth="640" pageHeight="480"/>"#).unwrap();
        assert_eq!(info.first_page().name, "Page-1");
        assert_eq!(info.first_page().width, 640.0);
        assert_eq!(info.first_page().height, 480.0);
    }

    #[test]
    fn test_bad_dimensions_fall_back_to_defaults() {
        let info =
            DiagramInfo::parse(r#"<mxGraphModel pageWidth="wide" pageHeight="-4"/>"#).unwrap();
        assert_eq!(info.first_page().width, DEFAULT_PAGE_WIDTH);
        assert_eq!(info.first_page().height, DEFAULT_PAGE_HEIGHT);
    }

    #[test]
    fn test_compressed_page() {
        let payload = COMPRESSED_GATEWAY;
        let xml = format!(r#"<mxfile compressed="true"><diagram name="Gateway">{payload}</diagram></mxfile>"#);

        let info = DiagramInfo::parse(&xml).unwrap();
        assert_eq!(info.first_page().name, "Gateway");
        assert_eq!(info.first_page().width, 1169.0);
        assert_eq!(info.first_page().height, 827.0);
    }

    #[test]
    fn test_line_wrapped_compressed_page() {
        let wrapped: String = COMPRESSED_GATEWAY
            .as_bytes()
            .chunks(76)
            .map(|line| format!("\n      {}", std::str::from_utf8(line).unwrap()))
            .collect();
        let xml = format!(r#"<mxfile><diagram name="Gateway">{wrapped}
    </diagram></mxfile>"#);

        let info = DiagramInfo::parse(&xml).unwrap();
        assert_eq!(info.first_page().width, 1169.0);
        assert_eq!(info.first_page().height, 827.0);
    }

    #[test]
    fn test_garbage_compressed_page() {
        let err = DiagramInfo::parse(r#"<mxfile><diagram>!!not base64!!</diagram></mxfile>"#)
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_rejects_non_drawio_documents() {
        assert!(DiagramInfo::parse("<svg/>").is_err());
        assert!(DiagramInfo::parse("<mxfile></mxfile>").is_err());
        assert!(DiagramInfo::parse("<mxfile><diagram>").is_err());
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(
            percent_decode("%3Ca%20b%3D%22c%22%2F%3E").unwrap(),
            r#"<a b="c"/>"#
        );
        assert_eq!(percent_decode("%C3%A9t%C3%A9").unwrap(), "été");
        assert!(percent_decode("%4").is_err());
        assert!(percent_decode("%zz").is_err());
    }
}
