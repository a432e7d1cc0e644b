use serde::{Deserialize, Serialize};

/// A single command-line flag, optionally followed by a value.
///
/// Names are stored without the leading `--`; neither names nor values are
/// validated here. wkhtmltopdf rejects what it doesn't understand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Param {
    /// A bare flag such as `--grayscale`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// A flag followed by a value, such as `--page-size A4`.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    fn push_tokens(&self, out: &mut Vec<String>) {
        out.push(format!("--{}", self.name));
        if let Some(value) = &self.value {
            out.push(value.clone());
        }
    }
}

/// Ordered, possibly repeated collection of flags.
///
/// Insertion order is the order on the command line. Duplicates are kept,
/// since some flags (`--custom-header`, `--cookie`) may legitimately repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    params: Vec<Param>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, param: Param) {
        self.params.push(param);
    }

    pub fn add_all(&mut self, params: impl IntoIterator<Item = Param>) {
        self.params.extend(params);
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    /// Render as command-line tokens: `--name` then `value` when present.
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.params.len() * 2);
        for param in &self.params {
            param.push_tokens(&mut out);
        }
        out
    }
}

impl FromIterator<Param> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}
