//! Parse XML text into an [`XmlElement`] tree

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::XmlElement;
use crate::error::{MetadataError, Result};

/// Maps byte offsets in the source to 1-based line and column numbers
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}

/// Parse a document and return its root element.
pub fn parse_str(source: &str) -> Result<XmlElement> {
    let index = LineIndex::new(source);
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            let (line, column) = index.locate(reader.error_position() as usize);
            MetadataError::Xml {
                line,
                column,
                message: e.to_string(),
            }
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                // The tag starts at the first '<' after the previous event.
                let tag_offset = source[before..]
                    .find('<')
                    .map_or(before, |relative| before + relative);
                let (line, column) = index.locate(tag_offset);
                let mut element = start_element(e, &index, tag_offset)?;
                element.line = line;
                element.column = column;

                if matches!(event, Event::Start(_)) {
                    stack.push(element);
                } else {
                    attach(&mut stack, &mut root, element, &index, tag_offset)?;
                }
            }
            Event::End(_) => {
                let offset = reader.buffer_position() as usize;
                let element = stack.pop().ok_or_else(|| {
                    let (line, column) = index.locate(offset);
                    MetadataError::Xml {
                        line,
                        column,
                        message: "closing tag without matching start tag".to_string(),
                    }
                })?;
                attach(&mut stack, &mut root, element, &index, offset)?;
            }
            Event::Text(ref t) => {
                if let Some(current) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| {
                        let (line, column) = index.locate(before);
                        MetadataError::Xml {
                            line,
                            column,
                            message: e.to_string(),
                        }
                    })?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        let (line, column) = index.locate(source.len());
        return Err(MetadataError::Xml {
            line,
            column,
            message: format!("unexpected end of document inside <{}>", open.name),
        });
    }

    root.ok_or_else(|| MetadataError::Xml {
        line: 1,
        column: 1,
        message: "document has no root element".to_string(),
    })
}

fn start_element(e: &BytesStart<'_>, index: &LineIndex, offset: usize) -> Result<XmlElement> {
    let xml_error = |message: String| {
        let (line, column) = index.locate(offset);
        MetadataError::Xml {
            line,
            column,
            message,
        }
    };

    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
    let mut element = XmlElement::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| xml_error(err.to_string()))?;
        element.attributes.push((key, value.to_string()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    index: &LineIndex,
    offset: usize,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        let (line, column) = index.locate(offset);
        return Err(MetadataError::Xml {
            line,
            column,
            message: format!("second root element <{}>", element.name),
        });
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree_with_positions() {
        let xml = "<?xml version=\"1.0\"?>\n<Metadata>\n  <Keyword name=\"ctd &amp; rosette\"/>\n  <description>cast 12</description>\n</Metadata>\n";
        let root = parse_str(xml).unwrap();
        assert_eq!(root.name, "Metadata");
        assert_eq!((root.line, root.column), (2, 1));
        assert_eq!(root.children.len(), 2);

        let keyword = &root.children[0];
        assert_eq!(keyword.attribute("name"), Some("ctd & rosette"));
        assert_eq!((keyword.line, keyword.column), (3, 3));
        assert_eq!(root.children[1].text_content(), "cast 12");
    }

    #[test]
    fn test_namespace_prefix_stripped_from_tags() {
        let xml = r#"<ssds:Metadata xmlns:ssds="urn:ssds"><ssds:Device uuid="u1"/></ssds:Metadata>"#;
        let root = parse_str(xml).unwrap();
        assert_eq!(root.name, "Metadata");
        assert_eq!(root.children[0].name, "Device");
        assert_eq!(root.attribute("xmlns:ssds"), Some("urn:ssds"));
    }

    #[test]
    fn test_mismatched_close_tag_is_error() {
        let err = parse_str("<Metadata>\n<Device></Keyword>\n</Metadata>").unwrap_err();
        match err {
            MetadataError::Xml { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_document_is_error() {
        assert!(matches!(
            parse_str("<Metadata><Device>"),
            Err(MetadataError::Xml { .. })
        ));
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(parse_str("   ").is_err());
    }
}
