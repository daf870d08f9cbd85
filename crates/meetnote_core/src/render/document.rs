//! Raw JSON project document used as a render source.
//!
//! Entities are decoded lazily, on lookup, so a malformed entry only fails
//! renders that actually reach it.

use super::{ReferenceSource, RenderError, RenderResult};
use crate::model::meeting::{default_meeting_kind, default_meeting_name, Meeting, Top};
use crate::model::module::{default_headline, Module, Template};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::borrow::Cow;

const REQUIRED_SECTIONS: &[&str] = &["meetings", "templates", "modules"];

/// Project document holding `meetings`, `templates` and `modules` arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDocument {
    root: Map<String, Value>,
}

impl ProjectDocument {
    /// Parses a project document from JSON text.
    pub fn from_json_str(raw: &str) -> RenderResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| RenderError::InvalidDocument(format!("malformed JSON: {err}")))?;
        Self::from_value(value)
    }

    /// Wraps an already parsed document.
    ///
    /// # Errors
    /// - `InvalidDocument` when the value is not an object or one of the
    ///   `meetings`, `templates`, `modules` keys is missing.
    pub fn from_value(value: Value) -> RenderResult<Self> {
        let Value::Object(root) = value else {
            return Err(RenderError::InvalidDocument(
                "top-level value must be an object".to_string(),
            ));
        };
        if let Some(missing) = REQUIRED_SECTIONS.iter().find(|key| !root.contains_key(**key)) {
            return Err(RenderError::InvalidDocument(format!(
                "missing top-level key '{missing}' (expected 'meetings', 'templates' and 'modules')"
            )));
        }
        Ok(Self { root })
    }

    /// Finds the id of the first meeting named `name`.
    pub fn meeting_id_by_name(&self, name: &str) -> RenderResult<Option<String>> {
        let found = self.section("meetings")?.iter().find_map(|item| {
            let object = item.as_object()?;
            (object.get("name").and_then(Value::as_str) == Some(name))
                .then(|| object.get("id").and_then(id_string))
                .flatten()
        });
        Ok(found)
    }

    fn section(&self, key: &str) -> RenderResult<&Vec<Value>> {
        match self.root.get(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(RenderError::InvalidReference {
                message: format!("Project section '{key}' is not a list"),
            }),
        }
    }

    fn find(&self, key: &str, id: &str) -> RenderResult<Option<&Map<String, Value>>> {
        Ok(self.section(key)?.iter().find_map(|item| {
            let object = item.as_object()?;
            let item_id = object.get("id").and_then(id_string)?;
            (item_id == id).then_some(object)
        }))
    }
}

impl ReferenceSource for ProjectDocument {
    fn meeting(&self, id: &str) -> RenderResult<Option<Cow<'_, Meeting>>> {
        self.find("meetings", id)?
            .map(|object| decode_meeting(id, object).map(Cow::Owned))
            .transpose()
    }

    fn template(&self, id: &str) -> RenderResult<Option<Cow<'_, Template>>> {
        self.find("templates", id)?
            .map(|object| decode_template(id, object).map(Cow::Owned))
            .transpose()
    }

    fn module(&self, id: &str) -> RenderResult<Option<Cow<'_, Module>>> {
        Ok(self
            .find("modules", id)?
            .map(|object| Cow::Owned(decode_module(id, object))))
    }
}

fn decode_meeting(id: &str, object: &Map<String, Value>) -> RenderResult<Meeting> {
    let name = string_field(object, "name").unwrap_or_else(default_meeting_name);
    let tops = match object.get("tops") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| decode_top(item, &name))
            .collect::<RenderResult<Vec<_>>>()?,
        Some(_) => {
            return Err(RenderError::InvalidReference {
                message: format!("Meeting '{name}' has invalid 'tops' structure (expected a list)"),
            })
        }
    };

    Ok(Meeting {
        id: id.to_string(),
        kind: string_field(object, "kind").unwrap_or_else(default_meeting_kind),
        description: string_field(object, "description").unwrap_or_default(),
        date: object
            .get("date")
            .and_then(Value::as_str)
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()),
        name,
        tops,
    })
}

fn decode_top(item: &Value, meeting_name: &str) -> RenderResult<Top> {
    let invalid = |detail: String| RenderError::InvalidReference {
        message: format!("Meeting '{meeting_name}' has an invalid top: {detail}"),
    };
    let object = item
        .as_object()
        .ok_or_else(|| invalid("expected an object".to_string()))?;
    let type_tag = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing 'type'".to_string()))?;

    match type_tag {
        "text" => object
            .get("value")
            .and_then(Value::as_str)
            .map(Top::text)
            .ok_or_else(|| invalid("text top without 'value'".to_string())),
        "modules" | "templates" => {
            let id = object
                .get("id")
                .and_then(id_string)
                .ok_or_else(|| invalid(format!("{type_tag} top without 'id'")))?;
            Ok(if type_tag == "modules" {
                Top::module(id)
            } else {
                Top::template(id)
            })
        }
        other => Err(invalid(format!("unknown type '{other}'"))),
    }
}

fn decode_template(id: &str, object: &Map<String, Value>) -> RenderResult<Template> {
    let name = string_field(object, "name").unwrap_or_else(|| "Unnamed Template".to_string());
    let modules = match object.get("modules") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                id_string(item).ok_or_else(|| RenderError::InvalidReference {
                    message: format!("Template '{name}' lists a module reference that is not an id"),
                })
            })
            .collect::<RenderResult<Vec<_>>>()?,
        Some(_) => {
            return Err(RenderError::InvalidReference {
                message: format!(
                    "Template '{name}' has invalid 'modules' structure (expected a list)"
                ),
            })
        }
    };

    Ok(Template {
        id: id.to_string(),
        description: string_field(object, "description").unwrap_or_default(),
        name,
        modules,
    })
}

fn decode_module(id: &str, object: &Map<String, Value>) -> Module {
    let content = match object.get("content") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(lines)) => lines
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    };
    Module {
        id: id.to_string(),
        name: string_field(object, "name").unwrap_or_default(),
        headline: string_field(object, "headline").unwrap_or_else(default_headline),
        content,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Ids are strings on the wire; hand-edited files sometimes use numbers.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
