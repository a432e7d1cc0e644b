//! Document objects: the page, cover, and table-of-contents units that make
//! up a wkhtmltopdf invocation.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::params::{Param, ParameterSet};

/// Where an object's content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Url,
    File,
    /// Literal HTML that must be staged to disk before it can be referenced.
    InlineMarkup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Page,
    Cover,
    TableOfContents,
}

impl ObjectKind {
    /// The token wkhtmltopdf uses to introduce an object of this kind.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Cover => "cover",
            Self::TableOfContents => "toc",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// A page or cover: something with a source and its own page options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedObject {
    source: String,
    source_type: SourceType,
    params: ParameterSet,
    resolved_path: Option<PathBuf>,
}

impl SourcedObject {
    pub fn new(source: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            source: source.into(),
            source_type,
            params: ParameterSet::new(),
            resolved_path: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Path of the staged temp file. Only set for inline markup.
    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved_path.as_deref()
    }

    /// The string that goes on the command line for this source.
    fn command_source(&self, kind: ObjectKind) -> Result<String, CoreError> {
        match self.source_type {
            SourceType::Url | SourceType::File => Ok(self.source.clone()),
            SourceType::InlineMarkup => self
                .resolved_path
                .as_ref()
                .map(|p| p.display().to_string())
                .ok_or(CoreError::UnstagedSource {
                    kind: kind.identifier(),
                }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOfContents {
    params: ParameterSet,
}

impl TableOfContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }
}

/// One renderable unit of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentObject {
    Page(SourcedObject),
    Cover(SourcedObject),
    TableOfContents(TableOfContents),
}

impl DocumentObject {
    /// Build an object of any kind. A table of contents has no source, so
    /// `source` and `source_type` are ignored for it.
    pub fn new(kind: ObjectKind, source: impl Into<String>, source_type: SourceType) -> Self {
        match kind {
            ObjectKind::Page => Self::page(source, source_type),
            ObjectKind::Cover => Self::cover(source, source_type),
            ObjectKind::TableOfContents => Self::toc(),
        }
    }

    pub fn page(source: impl Into<String>, source_type: SourceType) -> Self {
        Self::Page(SourcedObject::new(source, source_type))
    }

    pub fn cover(source: impl Into<String>, source_type: SourceType) -> Self {
        Self::Cover(SourcedObject::new(source, source_type))
    }

    pub fn toc() -> Self {
        Self::TableOfContents(TableOfContents::new())
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Page(_) => ObjectKind::Page,
            Self::Cover(_) => ObjectKind::Cover,
            Self::TableOfContents(_) => ObjectKind::TableOfContents,
        }
    }

    pub fn is_toc(&self) -> bool {
        matches!(self, Self::TableOfContents(_))
    }

    /// Source details for pages and covers; `None` for a table of contents.
    pub fn sourced(&self) -> Option<&SourcedObject> {
        match self {
            Self::Page(o) | Self::Cover(o) => Some(o),
            Self::TableOfContents(_) => None,
        }
    }

    pub fn source_type(&self) -> Option<SourceType> {
        self.sourced().map(SourcedObject::source_type)
    }

    pub fn needs_staging(&self) -> bool {
        self.source_type() == Some(SourceType::InlineMarkup)
    }

    pub fn params(&self) -> &ParameterSet {
        match self {
            Self::Page(o) | Self::Cover(o) => &o.params,
            Self::TableOfContents(t) => &t.params,
        }
    }

    pub fn params_mut(&mut self) -> &mut ParameterSet {
        match self {
            Self::Page(o) | Self::Cover(o) => &mut o.params,
            Self::TableOfContents(t) => &mut t.params,
        }
    }

    pub fn add_param(&mut self, param: Param) -> &mut Self {
        self.params_mut().add(param);
        self
    }

    pub fn add_params(&mut self, params: impl IntoIterator<Item = Param>) -> &mut Self {
        self.params_mut().add_all(params);
        self
    }

    /// A copy of this object pointing at a staged file. Tables of contents
    /// have no source and come back unchanged.
    pub fn with_resolved_path(&self, path: PathBuf) -> Self {
        let mut staged = self.clone();
        if let Self::Page(o) | Self::Cover(o) = &mut staged {
            o.resolved_path = Some(path);
        }
        staged
    }

    /// Tokens this object adds to the command line.
    ///
    /// Pages and covers emit their options, the kind token, then the source
    /// (the staged path for inline markup). A table of contents emits `toc`
    /// followed by its options.
    pub fn contribute(&self) -> Result<Vec<String>, CoreError> {
        let kind = self.kind();
        match self {
            Self::Page(o) | Self::Cover(o) => {
                let mut tokens = o.params.render();
                tokens.push(kind.identifier().to_string());
                tokens.push(o.command_source(kind)?);
                Ok(tokens)
            }
            Self::TableOfContents(t) => {
                let mut tokens = vec![kind.identifier().to_string()];
                tokens.extend(t.params.render());
                Ok(tokens)
            }
        }
    }
}
