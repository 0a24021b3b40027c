//! WMS capabilities document parsing.

use roxmltree::{Document, Node, ParsingOptions};

use super::interval::expand_interval;
use super::CapabilitiesError;

/// WMS 1.3.0 XML namespace.
pub const WMS_NS: &str = "http://www.opengis.net/wms";

/// How element names are matched against the document.
///
/// Conformant servers qualify every element with [`WMS_NS`]; some omit the
/// namespace entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagForm {
    Namespaced,
    Bare,
}

impl TagForm {
    fn matches(self, node: Node<'_, '_>, local_name: &str) -> bool {
        if !node.is_element() || node.tag_name().name() != local_name {
            return false;
        }
        match self {
            TagForm::Namespaced => node.tag_name().namespace() == Some(WMS_NS),
            TagForm::Bare => node.tag_name().namespace().is_none(),
        }
    }
}

/// Parse a capabilities document and return the time identifiers advertised
/// for `layer_name`.
///
/// Interval-encoded dimensions are expanded and bounded to `max_frames`.
/// A missing layer or time dimension is not an error: it yields an empty list.
pub fn parse_capabilities(
    xml: &str,
    layer_name: &str,
    max_frames: usize,
) -> Result<Vec<String>, CapabilitiesError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)?;

    let times = find_layer(&doc, layer_name)
        .map(|(layer, form)| extract_times(layer, form, max_frames))
        .unwrap_or_default();
    Ok(times)
}

/// Locate the `Layer` element whose own `Name` equals `layer_name`.
fn find_layer<'a, 'input>(
    doc: &'a Document<'input>,
    layer_name: &str,
) -> Option<(Node<'a, 'input>, TagForm)> {
    [TagForm::Namespaced, TagForm::Bare].into_iter().find_map(|form| {
        doc.descendants()
            .filter(|node| form.matches(*node, "Layer"))
            .find(|layer| {
                layer
                    .children()
                    .find(|child| form.matches(*child, "Name"))
                    .map(|name| text_content(name) == layer_name)
                    .unwrap_or(false)
            })
            .map(|layer| (layer, form))
    })
}

/// Extract times from `<Dimension name="time">`, falling back to the legacy
/// `<Extent name="time">`.
fn extract_times(layer: Node<'_, '_>, form: TagForm, max_frames: usize) -> Vec<String> {
    ["Dimension", "Extent"]
        .iter()
        .find_map(|element| {
            layer.descendants().find(|node| {
                form.matches(*node, element)
                    && node
                        .attribute("name")
                        .is_some_and(|name| name.eq_ignore_ascii_case("time"))
            })
        })
        .map(|node| parse_times_from_text(&text_content(node), max_frames))
        .unwrap_or_default()
}

/// Interpret the body of a time dimension.
///
/// A comma-separated list is returned trimmed and in order. Items of the form
/// `start/end/period` are expanded, and the expanded result is bounded to the
/// last `max_frames`.
pub fn parse_times_from_text(text: &str, max_frames: usize) -> Vec<String> {
    let items: Vec<&str> = text
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();

    if !items.iter().any(|item| item.contains('/')) {
        return items.into_iter().map(str::to_string).collect();
    }

    let mut times: Vec<String> = items
        .into_iter()
        .flat_map(|item| {
            if item.contains('/') {
                expand_interval(item, max_frames)
            } else {
                vec![item.to_string()]
            }
        })
        .collect();

    if times.len() > max_frames {
        times.drain(..times.len() - max_frames);
    }
    times
}

fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
