//! Minimal owned XML element tree
//!
//! Builders work on a small in-memory tree rather than on the event stream so that
//! the document orchestrator can restructure the tree before dispatch. Every parsed
//! element remembers the line and column of its start tag for validity reports.

pub mod reader;
pub mod writer;

pub use reader::parse_str;
pub use writer::{WriteOptions, write_string};

/// One XML element with its attributes, child elements and text content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Element with text content only, e.g. `<description>...</description>`
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Case-insensitive tag comparison
    pub fn has_tag(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    /// Attribute value by case-insensitive name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing one with the same name
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self
            .attributes
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(index).1)
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// First child element whose tag matches one of `tags`
    pub fn first_child_of(&self, tags: &[&str]) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|child| tags.iter().any(|tag| child.has_tag(tag)))
    }

    /// Text content with leading and trailing whitespace removed.
    ///
    /// The reader already trims text nodes and the writer trims again on output, so
    /// a `description` only keeps its inner whitespace across a round trip.
    pub fn text_content(&self) -> &str {
        self.text.trim()
    }

    /// An element with no attributes, no child elements and no text would be
    /// schema-invalid; serializers drop such elements instead of emitting them.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup_ignores_case() {
        let mut element = XmlElement::new("DataContainer");
        element.set_attribute("uriString", "http://ssds/1");
        assert_eq!(element.attribute("URISTRING"), Some("http://ssds/1"));
        assert_eq!(element.attribute("url"), None);
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut element = XmlElement::new("Keyword");
        element.set_attribute("name", "a");
        element.set_attribute("name", "b");
        assert_eq!(element.attributes, vec![("name".to_string(), "b".to_string())]);
        assert_eq!(element.remove_attribute("NAME"), Some("b".to_string()));
        assert!(element.attributes.is_empty());
    }

    #[test]
    fn test_emptiness() {
        assert!(XmlElement::new("Person").is_empty());
        assert!(XmlElement::with_text("description", "  ").is_empty());
        assert!(!XmlElement::with_text("description", "CTD cast").is_empty());

        let mut wrapper = XmlElement::new("output");
        wrapper.push_child(XmlElement::new("DataContainer"));
        assert!(!wrapper.is_empty());
    }
}
