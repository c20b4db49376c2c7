use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
pub enum HttpRequestMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

/// A value to pick out of a JSON response and the label it is shown under.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SummarizeField {
    pub name: String,
    /// dot separated path, `#` maps over arrays, numbers index them
    pub path: String,
}

impl SummarizeField {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Text placed between a field name and its value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Separator(String);

impl Separator {
    pub fn new(separator: impl Into<String>) -> Self {
        Self(separator.into())
    }

    /// `Name: value`
    pub fn colon() -> Self {
        Self::new(": ")
    }

    /// `Name value`
    pub fn space() -> Self {
        Self::new(" ")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self::colon()
    }
}
