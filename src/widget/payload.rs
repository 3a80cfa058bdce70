use serde::{Deserialize, Serialize};

/// Fragment payload returned by the fragment server for one widget.
///
/// The body must carry at least a `content` field with the replacement
/// markup; extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetPayload {
    pub content: String,
}
