//! # Layout Markup
//!
//! Loads a [`Document`] from XML:
//!
//! ```xml
//! <report paper="A4" margin="15m">
//!   <meta title="Invoice"/>
//!   <font name="bold" face="Helvetica" size="12" bold="yes"/>
//!   <text x="0" y="0" font="bold">Invoice {number}</text>
//!   <table list="1" rows="20" y="+2l">
//!     <body><text>{list.item}</text></body>
//!   </table>
//! </report>
//! ```
//!
//! `font` and `meta` elements may appear anywhere and are not rendered.
//! Unknown elements are skipped together with their content.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;

use crate::error::ReportError;
use crate::model::{Document, FontDef, Metadata, Node, Tag};

/// An element whose children are still being read.
struct Frame {
    tag: Tag,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<Node>,
}

pub fn parse_document(xml: &str) -> Result<Document, ReportError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Node> = None;
    let mut fonts = Vec::new();
    let mut metadata = Metadata::default();
    // Depth inside an element whose content is ignored.
    let mut skip = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let has_content = matches!(event, Event::Start(_));
                if skip > 0 {
                    if has_content {
                        skip += 1;
                    }
                } else {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                    let attrs = attributes(e)?;
                    let rendered = match name.as_str() {
                        "font" => {
                            fonts.push(FontDef::from_attrs(&attrs));
                            false
                        }
                        "meta" => {
                            let get = |k: &str| attrs.get(k).cloned();
                            metadata.title = get("title").or(metadata.title.take());
                            metadata.author = get("author").or(metadata.author.take());
                            metadata.subject = get("subject").or(metadata.subject.take());
                            false
                        }
                        _ => match Tag::from_name(&name) {
                            Some(tag) if root.is_none() => {
                                let frame = Frame {
                                    tag,
                                    attrs,
                                    text: String::new(),
                                    children: Vec::new(),
                                };
                                if has_content {
                                    stack.push(frame);
                                } else {
                                    close(frame, &mut stack, &mut root);
                                }
                                true
                            }
                            Some(_) => {
                                warn!(element = %name, "element after the page root ignored");
                                false
                            }
                            None => {
                                warn!(element = %name, "unknown element skipped");
                                false
                            }
                        },
                    };
                    if has_content && !rendered {
                        skip = 1;
                    }
                }
            }
            Event::End(_) => {
                if skip > 0 {
                    skip -= 1;
                } else if let Some(frame) = stack.pop() {
                    close(frame, &mut stack, &mut root);
                }
            }
            Event::Text(e) => {
                if skip == 0 {
                    if let Some(top) = stack.last_mut() {
                        let text = e.unescape().map_err(|e| ReportError::Xml(e.to_string()))?;
                        top.text.push_str(&text);
                    }
                }
            }
            Event::CData(e) => {
                if skip == 0 {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(e));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(frame) = stack.last() {
        return Err(ReportError::Xml(format!(
            "unclosed <{}> element",
            frame.tag.name()
        )));
    }
    let root = root.ok_or_else(|| ReportError::InvalidDocument("no page element".to_string()))?;
    Ok(Document {
        root,
        fonts,
        metadata,
    })
}

fn close(frame: Frame, stack: &mut [Frame], root: &mut Option<Node>) {
    let node = Node::new(frame.tag, frame.attrs, frame.text.trim(), frame.children);
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

/// Attributes with lowercased names and unescaped values.
fn attributes(e: &BytesStart) -> Result<BTreeMap<String, String>, ReportError> {
    let mut attrs = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ReportError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = attr
            .unescape_value()
            .map_err(|e| ReportError::Xml(e.to_string()))?;
        attrs.insert(key, value.into_owned());
    }
    Ok(attrs)
}
