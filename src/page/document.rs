use super::dom::{render_children, Element, Node};
use crate::error::{RefresherError, Result};
use crate::widget::WidgetId;

/// Marker class carried by every widget container element
pub const CONTAINER_CLASS: &str = "widget";

/// Marker class carried by the content slot nested in each container
pub const CONTENT_SLOT_CLASS: &str = "widget-content";

/// The page document the refresher keeps fresh.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// An empty page
    pub fn new() -> Self {
        Self {
            root: Element::new("body"),
        }
    }

    /// Wrap an existing element tree
    pub fn from_root(root: Element) -> Self {
        Self { root }
    }

    /// Build a page skeleton with one empty container per widget id
    pub fn with_widgets<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a WidgetId>,
    {
        let mut root = Element::new("body");
        for id in ids {
            root.children.push(Node::Element(
                Element::new("div")
                    .with_attr("class", CONTAINER_CLASS)
                    .with_attr("id", &id.element_id())
                    .with_child(Node::Element(
                        Element::new("div").with_attr("class", CONTENT_SLOT_CLASS),
                    )),
            ));
        }
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Element ids of all widget containers currently in the page.
    ///
    /// Containers without an `id` attribute are reported as an empty string
    /// so the caller can surface them as parse diagnostics.
    pub fn container_element_ids(&self) -> Vec<String> {
        let mut containers = Vec::new();
        self.root.select_by_class(CONTAINER_CLASS, &mut containers);
        containers
            .into_iter()
            .map(|el| el.id().unwrap_or_default().to_string())
            .collect()
    }

    /// Replace the content slot of the given container with a markup fragment
    pub fn replace_content(&mut self, element_id: &str, markup: String) -> Result<()> {
        let container = self.root.find_by_id_mut(element_id).ok_or_else(|| {
            RefresherError::ContainerMissing {
                element_id: element_id.to_string(),
            }
        })?;
        let slot = container
            .first_descendant_by_class_mut(CONTENT_SLOT_CLASS)
            .ok_or_else(|| RefresherError::ContentSlotMissing {
                element_id: element_id.to_string(),
            })?;
        slot.children = vec![Node::Markup(markup)];
        Ok(())
    }

    /// Current markup of a container's content slot, if the container and
    /// slot both exist
    pub fn content_markup(&self, element_id: &str) -> Option<String> {
        let slot = self
            .root
            .find_by_id(element_id)?
            .first_descendant_by_class(CONTENT_SLOT_CLASS)?;
        let mut out = String::new();
        render_children(&slot.children, &mut out);
        Some(out)
    }

    /// Render the whole page as markup
    pub fn render(&self) -> String {
        self.root.render()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
