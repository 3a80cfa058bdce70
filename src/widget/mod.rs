//! Widget identity and payload types.

mod id;
mod payload;

pub use id::{WidgetId, WidgetIdError, ELEMENT_ID_PREFIX};
pub use payload::WidgetPayload;
