//! Serialize an [`XmlElement`] tree to XML text

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

use super::XmlElement;
use crate::error::{MetadataError, Result};

#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Indent nested elements by four spaces
    pub pretty: bool,
    /// Emit the `<?xml ...?>` declaration
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            declaration: true,
        }
    }
}

pub fn write_string(root: &XmlElement, options: WriteOptions) -> Result<String> {
    let bytes = if options.pretty {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        write_document(&mut writer, root, options)?;
        writer.into_inner()
    } else {
        let mut writer = Writer::new(Vec::new());
        write_document(&mut writer, root, options)?;
        writer.into_inner()
    };
    String::from_utf8(bytes).map_err(|e| MetadataError::Io(e.to_string()))
}

fn write_document<W: Write>(
    writer: &mut Writer<W>,
    root: &XmlElement,
    options: WriteOptions,
) -> Result<()> {
    if options.declaration {
        emit(writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }
    write_element(writer, root)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = element.text.trim();
    if element.children.is_empty() && text.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    if !text.is_empty() {
        emit(writer, Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| MetadataError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn sample() -> XmlElement {
        let mut root = XmlElement::new("Metadata");
        let mut keyword = XmlElement::new("Keyword");
        keyword.set_attribute("name", "T & S");
        root.push_child(keyword);
        root.push_child(XmlElement::with_text("description", "a <b> c"));
        root
    }

    #[test]
    fn test_escapes_and_reparses() {
        let xml = write_string(&sample(), WriteOptions::default()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("T &amp; S"));

        let root = parse_str(&xml).unwrap();
        assert_eq!(root.children[0].attribute("name"), Some("T & S"));
        assert_eq!(root.children[1].text_content(), "a <b> c");
    }

    #[test]
    fn test_pretty_indents_four_spaces() {
        let xml = write_string(&sample(), WriteOptions::default()).unwrap();
        assert!(xml.contains("\n    <Keyword name="));
    }

    #[test]
    fn test_compact_output() {
        let options = WriteOptions {
            pretty: false,
            declaration: false,
        };
        let xml = write_string(&sample(), options).unwrap();
        assert_eq!(
            xml,
            "<Metadata><Keyword name=\"T &amp; S\"/><description>a &lt;b&gt; c</description></Metadata>"
        );
    }
}
