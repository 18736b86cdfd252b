//! XML event payload decoder.
//!
//! Decodes the provider's embedded XML payload into a structured
//! `serde_json::Value` with the normalization rules downstream consumers
//! expect:
//!
//! - leading/trailing whitespace is trimmed and whitespace-only text nodes
//!   are dropped
//! - no synthetic root wrapper: the root element's children become the
//!   top-level mapping (a text-only root decodes to a bare string)
//! - attributes are ignored, element names use their local part so
//!   namespaced payloads decode the same as plain ones
//! - a single child element folds to a scalar string; repeated siblings
//!   fold to an array
//!
//! An XML prolog with a declared encoding is tolerated. Malformed input
//! fails with [`GateError::MalformedPayload`] so the pipeline can absorb
//! the error without forwarding anything.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::GateError;

/// Decodes a raw XML payload into its structured representation.
///
/// # Errors
///
/// Returns [`GateError::MalformedPayload`] when the input is not
/// well-formed XML, lacks a root element, or carries content outside a
/// single root (a second root element, stray top-level text).
pub fn decode_event_xml(xml: &str) -> Result<Value, GateError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Each frame is an open element: accumulated child elements plus any
    // text content seen so far.
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = local_name(start.local_name().as_ref());
                stack.push(Frame { name, children: Map::new(), text: String::new() });
            },
            Ok(Event::Empty(start)) => {
                let name = local_name(start.local_name().as_ref());
                attach(&mut stack, &mut root, name, Value::String(String::new()))?;
            },
            Ok(Event::Text(text)) => {
                let decoded = text
                    .unescape()
                    .map_err(|e| GateError::MalformedPayload(e.to_string()))?;
                append_text(&mut stack, decoded.trim())?;
            },
            Ok(Event::CData(cdata)) => {
                let decoded = String::from_utf8_lossy(&cdata).into_owned();
                append_text(&mut stack, decoded.trim())?;
            },
            Ok(Event::End(_)) => {
                // Mismatched end tags are rejected by the reader itself.
                let Some(frame) = stack.pop() else {
                    return Err(GateError::MalformedPayload("unexpected closing tag".into()));
                };
                let (name, value) = frame.into_value();
                attach(&mut stack, &mut root, name, value)?;
            },
            Ok(Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_)) => {},
            Ok(Event::Eof) => break,
            Err(e) => return Err(GateError::MalformedPayload(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(GateError::MalformedPayload("unclosed element".into()));
    }

    root.ok_or_else(|| GateError::MalformedPayload("no root element".into()))
}

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    /// Children win over mixed text content; a leaf element decodes to its
    /// trimmed text, which may be empty.
    fn into_value(self) -> (String, Value) {
        if self.children.is_empty() {
            (self.name, Value::String(self.text))
        } else {
            (self.name, Value::Object(self.children))
        }
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn append_text(stack: &mut [Frame], text: &str) -> Result<(), GateError> {
    if text.is_empty() {
        return Ok(());
    }
    let Some(frame) = stack.last_mut() else {
        return Err(GateError::MalformedPayload("text outside the root element".into()));
    };
    if !frame.text.is_empty() {
        frame.text.push(' ');
    }
    frame.text.push_str(text);
    Ok(())
}

/// Inserts a completed element into its parent, folding repeated sibling
/// names into arrays. A completed element with no parent is the document
/// root: its children (or text) become the decoded value directly, and a
/// second root is rejected.
fn attach(
    stack: &mut [Frame],
    root: &mut Option<Value>,
    name: String,
    value: Value,
) -> Result<(), GateError> {
    match stack.last_mut() {
        Some(parent) => match parent.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            },
            None => {
                parent.children.insert(name, value);
            },
        },
        None => {
            if root.is_some() {
                return Err(GateError::MalformedPayload("multiple root elements".into()));
            }
            *root = Some(value);
        },
    }
    Ok(())
}
