//! Diffing of prior state against proposed configuration.

use super::attributes::{resource_schema, Attribute, AttributeKind};
use super::data::ResourceData;
use crate::azure::tags::tag_value_to_string;
use serde::Serialize;
use serde_json::{Map, Value};

const REDACTED: &str = "(sensitive)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    Create,
    Update,
    Replace,
    NoChange,
}

/// One attribute whose value differs meaningfully
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    pub name: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
    pub requires_replace: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub action: PlanAction,
    pub changes: Vec<AttributeChange>,
}

impl Plan {
    #[must_use]
    pub fn requires_replace(&self) -> bool {
        self.changes.iter().any(|c| c.requires_replace)
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.action != PlanAction::NoChange
    }
}

/// Compute the changes needed to move `prior` state to `proposed` configuration
///
/// Formatting-only differences are suppressed through each attribute's
/// diff-suppress function. Changes to force-new attributes of an existing
/// extension require replacement.
#[must_use]
pub fn plan(prior: &ResourceData, proposed: &ResourceData) -> Plan {
    let exists = prior.id().is_some();
    let mut changes = Vec::new();

    for attr in resource_schema() {
        let old = normalized(attr, prior.get(attr.name));
        let new = normalized(attr, proposed.get(attr.name));

        // Computed attributes keep their remote value when left unconfigured
        if attr.computed && new.is_none() {
            continue;
        }
        if !differs(attr, old.as_ref(), new.as_ref()) {
            continue;
        }

        changes.push(AttributeChange {
            name: attr.name.to_string(),
            old: redact(attr, old),
            new: redact(attr, new),
            requires_replace: exists && attr.force_new,
        });
    }

    let action = if !exists {
        PlanAction::Create
    } else if changes.is_empty() {
        PlanAction::NoChange
    } else if changes.iter().any(|c| c.requires_replace) {
        PlanAction::Replace
    } else {
        PlanAction::Update
    };

    Plan { action, changes }
}

/// Map unset-equivalent values to `None` and stringify map values
fn normalized(attr: &Attribute, value: Option<&Value>) -> Option<Value> {
    let value = value?;
    match (attr.kind, value) {
        (AttributeKind::String, Value::String(s)) if s.is_empty() => None,
        (AttributeKind::Bool, Value::Bool(false)) => None,
        (AttributeKind::Map, Value::Object(map)) if map.is_empty() => None,
        (AttributeKind::Map, Value::Object(map)) => {
            let stringified: Map<String, Value> = map
                .iter()
                .map(|(k, v)| {
                    let v = tag_value_to_string(v).map_or_else(|_| v.clone(), Value::String);
                    (k.clone(), v)
                })
                .collect();
            Some(Value::Object(stringified))
        }
        _ => Some(value.clone()),
    }
}

fn differs(attr: &Attribute, old: Option<&Value>, new: Option<&Value>) -> bool {
    match (old, new) {
        (None, None) => false,
        (Some(Value::String(o)), Some(Value::String(n))) => match attr.diff_suppress {
            Some(suppress) if suppress(o, n) => false,
            _ => o != n,
        },
        (o, n) => o != n,
    }
}

fn redact(attr: &Attribute, value: Option<Value>) -> Option<Value> {
    if attr.sensitive {
        value.map(|_| Value::from(REDACTED))
    } else {
        value
    }
}
