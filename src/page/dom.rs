use std::collections::BTreeMap;

/// Tags rendered without a closing tag
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

/// A node in the page tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Plain text, escaped on render
    Text(String),
    /// An opaque markup fragment, rendered verbatim
    Markup(String),
}

/// An element node: tag, attributes, children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The `id` attribute, if any
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Whether the space-separated `class` attribute contains `class_name`
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
            .unwrap_or(false)
    }

    /// Depth-first search for the element with the given `id` attribute
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        for child in &self.children {
            if let Node::Element(el) = child {
                if let Some(found) = el.find_by_id(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Node::Element(el) = child {
                if let Some(found) = el.find_by_id_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// First descendant (document order, excluding `self`) carrying the class
    pub fn first_descendant_by_class(&self, class_name: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.has_class(class_name) {
                    return Some(el);
                }
                if let Some(found) = el.first_descendant_by_class(class_name) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn first_descendant_by_class_mut(&mut self, class_name: &str) -> Option<&mut Element> {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                if el.has_class(class_name) {
                    return Some(el);
                }
                if let Some(found) = el.first_descendant_by_class_mut(class_name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Collect all elements (including `self`) carrying the class
    pub fn select_by_class<'a>(&'a self, class_name: &str, out: &mut Vec<&'a Element>) {
        if self.has_class(class_name) {
            out.push(self);
        }
        for child in &self.children {
            if let Node::Element(el) = child {
                el.select_by_class(class_name, out);
            }
        }
    }

    /// Render this element and its subtree as markup
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        render_children(&self.children, out);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// Render a child list as markup
pub fn render_children(children: &[Node], out: &mut String) {
    for child in children {
        match child {
            Node::Element(el) => el.render_into(out),
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Markup(markup) => out.push_str(markup),
        }
    }
}

fn escape_text(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attr(raw: &str) -> String {
    escape_text(raw).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Element {
        Element::new("body")
            .with_child(Node::Element(
                Element::new("div")
                    .with_attr("class", "widget stale")
                    .with_attr("id", "widget-7")
                    .with_child(Node::Element(
                        Element::new("div").with_attr("class", "widget-content"),
                    )),
            ))
            .with_child(Node::Element(
                Element::new("div")
                    .with_attr("class", "widget")
                    .with_attr("id", "widget-42")
                    .with_child(Node::Element(
                        Element::new("div").with_attr("class", "widget-content"),
                    )),
            ))
    }

    #[test]
    fn finds_element_by_id() {
        let tree = sample_tree();
        let el = tree.find_by_id("widget-42").unwrap();
        assert_eq!(el.attr("id"), Some("widget-42"));
        assert!(tree.find_by_id("widget-9").is_none());
    }

    #[test]
    fn class_matching_is_token_based() {
        let tree = sample_tree();
        let el = tree.find_by_id("widget-7").unwrap();
        assert!(el.has_class("widget"));
        assert!(el.has_class("stale"));
        assert!(!el.has_class("wid"));
    }

    #[test]
    fn selects_all_by_class() {
        let tree = sample_tree();
        let mut found = Vec::new();
        tree.select_by_class("widget", &mut found);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn first_descendant_excludes_self() {
        let el = Element::new("div")
            .with_attr("class", "widget-content")
            .with_child(Node::Element(
                Element::new("span").with_attr("class", "widget-content"),
            ));
        let found = el.first_descendant_by_class("widget-content").unwrap();
        assert_eq!(found.tag, "span");
    }

    #[test]
    fn render_escapes_text_but_not_markup() {
        let el = Element::new("div")
            .with_child(Node::Text("a < b".to_string()))
            .with_child(Node::Markup("<b>hi</b>".to_string()));
        assert_eq!(el.render(), "<div>a &lt; b<b>hi</b></div>");
    }

    #[test]
    fn render_escapes_attribute_values() {
        let el = Element::new("div").with_attr("title", "say \"hi\"");
        assert_eq!(el.render(), "<div title=\"say &quot;hi&quot;\"></div>");
    }

    #[test]
    fn void_tags_have_no_closing_tag() {
        let el = Element::new("br");
        assert_eq!(el.render(), "<br>");
    }
}
