use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix every widget container's element id must carry.
pub const ELEMENT_ID_PREFIX: &str = "widget-";

/// Errors produced when parsing a widget identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetIdError {
    #[error("element id `{0}` does not start with `widget-`")]
    MissingPrefix(String),

    #[error("element id `{0}` has an empty widget token")]
    EmptyToken(String),

    #[error("widget token `{0}` contains unsupported characters")]
    InvalidToken(String),
}

/// Validated widget identifier.
///
/// The token is restricted to ASCII alphanumerics and underscores, so an id
/// like `widget-7-preview` is rejected outright instead of being silently
/// truncated to `7`, and a parsed token can be embedded in a request path
/// without further escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WidgetId(String);

impl WidgetId {
    /// Validate a bare token (the `<id>` part of `widget-<id>`)
    pub fn new(token: &str) -> Result<Self, WidgetIdError> {
        if token.is_empty() {
            return Err(WidgetIdError::EmptyToken(format!(
                "{ELEMENT_ID_PREFIX}{token}"
            )));
        }
        if !token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(WidgetIdError::InvalidToken(token.to_string()));
        }
        Ok(Self(token.to_string()))
    }

    /// Parse a container's element id of the form `widget-<token>`
    pub fn from_element_id(element_id: &str) -> Result<Self, WidgetIdError> {
        let token = element_id
            .strip_prefix(ELEMENT_ID_PREFIX)
            .ok_or_else(|| WidgetIdError::MissingPrefix(element_id.to_string()))?;
        if token.is_empty() {
            return Err(WidgetIdError::EmptyToken(element_id.to_string()));
        }
        Self::new(token)
    }

    /// The bare token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The container element id this widget is keyed by (`widget-<token>`)
    pub fn element_id(&self) -> String {
        format!("{ELEMENT_ID_PREFIX}{}", self.0)
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WidgetId {
    type Err = WidgetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for WidgetId {
    type Error = WidgetIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<WidgetId> for String {
    fn from(id: WidgetId) -> Self {
        id.0
    }
}
