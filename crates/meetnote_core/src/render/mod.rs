//! Meeting reference resolution and Markdown rendering.
//!
//! # Responsibility
//! - Flatten a meeting's ordered tops into one Markdown document.
//! - Surface dangling or malformed references as typed errors.
//!
//! # Invariants
//! - Pure: no I/O, no mutation, no clock or locale dependency.
//! - Output follows top order, and template order inside a template.
//! - A missing reference is an error; it is never rendered as empty content.
//! - Every reference error names the meeting it was found in.

pub mod document;

use crate::model::collection::NotesCollection;
use crate::model::meeting::{Meeting, Top};
use crate::model::module::{Module, Template};
use log::{info, warn};
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use document::ProjectDocument;

pub type RenderResult<T> = Result<T, RenderError>;

/// Entity kind named in reference errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Meeting,
    Template,
    Module,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meeting => "meeting",
            Self::Template => "template",
            Self::Module => "module",
        }
    }

    fn capitalized(self) -> &'static str {
        match self {
            Self::Meeting => "Meeting",
            Self::Template => "Template",
            Self::Module => "Module",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A referenced meeting, template or module does not exist.
    ItemNotFound {
        item_type: ItemKind,
        name: String,
        referenced_in: Option<String>,
    },
    /// A `tops` or `modules` field exists but does not have the expected
    /// shape.
    InvalidReference { message: String },
    /// The source document itself is unusable.
    InvalidDocument(String),
}

impl RenderError {
    pub fn item_not_found(
        item_type: ItemKind,
        name: impl Into<String>,
        referenced_in: Option<String>,
    ) -> Self {
        Self::ItemNotFound {
            item_type,
            name: name.into(),
            referenced_in,
        }
    }

    /// Adds the enclosing context when the error does not carry one yet.
    fn within(self, context: &str) -> Self {
        match self {
            Self::ItemNotFound {
                item_type,
                name,
                referenced_in: None,
            } => Self::ItemNotFound {
                item_type,
                name,
                referenced_in: Some(context.to_string()),
            },
            Self::InvalidReference { message } if !message.contains(context) => {
                Self::InvalidReference {
                    message: format!("{message} (within {context})"),
                }
            }
            other => other,
        }
    }
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound {
                item_type,
                name,
                referenced_in,
            } => {
                write!(f, "{} '{name}' not found", item_type.capitalized())?;
                if let Some(context) = referenced_in {
                    write!(f, " (referenced in {context})")?;
                }
                Ok(())
            }
            Self::InvalidReference { message } => f.write_str(message),
            Self::InvalidDocument(message) => write!(f, "invalid project document: {message}"),
        }
    }
}

impl Error for RenderError {}

/// Lookup seam used by the renderer.
///
/// `Ok(None)` means the id does not exist; `Err` means the stored entity
/// exists but cannot be decoded.
pub trait ReferenceSource {
    fn meeting(&self, id: &str) -> RenderResult<Option<Cow<'_, Meeting>>>;
    fn template(&self, id: &str) -> RenderResult<Option<Cow<'_, Template>>>;
    fn module(&self, id: &str) -> RenderResult<Option<Cow<'_, Module>>>;
}

impl ReferenceSource for NotesCollection {
    fn meeting(&self, id: &str) -> RenderResult<Option<Cow<'_, Meeting>>> {
        Ok(self.get_meeting(id).map(Cow::Borrowed))
    }

    fn template(&self, id: &str) -> RenderResult<Option<Cow<'_, Template>>> {
        Ok(self.get_template(id).map(Cow::Borrowed))
    }

    fn module(&self, id: &str) -> RenderResult<Option<Cow<'_, Module>>> {
        Ok(self.get_module(id).map(Cow::Borrowed))
    }
}

/// Renders meeting `meeting_id` from `source` into Markdown.
///
/// Layout: `# <kind> - <name>`, then one block per top. Text tops become a
/// heading, modules become `# <headline>` followed by their content, and
/// templates expand to their modules. Trailing whitespace is trimmed.
pub fn render_meeting<S>(source: &S, meeting_id: &str) -> RenderResult<String>
where
    S: ReferenceSource + ?Sized,
{
    let result = render_inner(source, meeting_id);
    match &result {
        Ok(output) => info!(
            "event=meeting_render module=render status=ok meeting_id={} bytes={}",
            meeting_id,
            output.len()
        ),
        Err(err) => warn!(
            "event=meeting_render module=render status=error meeting_id={} error={}",
            meeting_id, err
        ),
    }
    result
}

/// Renders the first meeting named `name` in a project document.
///
/// # Errors
/// - `ItemNotFound` for the meeting when no meeting carries that name.
pub fn render_meeting_by_name(document: &ProjectDocument, name: &str) -> RenderResult<String> {
    let meeting_id = document
        .meeting_id_by_name(name)?
        .ok_or_else(|| RenderError::item_not_found(ItemKind::Meeting, name, None))?;
    render_meeting(document, &meeting_id)
}

fn render_inner<S>(source: &S, meeting_id: &str) -> RenderResult<String>
where
    S: ReferenceSource + ?Sized,
{
    let meeting = source
        .meeting(meeting_id)?
        .ok_or_else(|| RenderError::item_not_found(ItemKind::Meeting, meeting_id, None))?;
    let context = format!("meeting '{}'", meeting.name);

    let mut output = format!("# {} - {}\n\n", meeting.kind, meeting.name);
    for top in &meeting.tops {
        match top {
            Top::Text { value } => {
                output.push_str(&format!("# {value}\n\n"));
            }
            Top::ModuleRef { id } => {
                let module = resolve_module(source, id, &context)?;
                push_module(&mut output, &module);
            }
            Top::TemplateRef { id } => {
                let template = source
                    .template(id)
                    .map_err(|err| err.within(&context))?
                    .ok_or_else(|| {
                        RenderError::item_not_found(ItemKind::Template, id, Some(context.clone()))
                    })?;
                let template_context = format!("template '{}' in {context}", template.name);
                for module_id in &template.modules {
                    let module = resolve_module(source, module_id, &template_context)?;
                    push_module(&mut output, &module);
                }
            }
        }
    }

    Ok(output.trim_end().to_string())
}

fn resolve_module<'s, S>(source: &'s S, id: &str, context: &str) -> RenderResult<Cow<'s, Module>>
where
    S: ReferenceSource + ?Sized,
{
    source
        .module(id)
        .map_err(|err| err.within(context))?
        .ok_or_else(|| RenderError::item_not_found(ItemKind::Module, id, Some(context.to_string())))
}

fn push_module(output: &mut String, module: &Module) {
    output.push_str(&format!("# {}\n\n{}\n\n", module.headline, module.content));
}
