//! Content type registry: the applications known to the service and the
//! model kinds each one exposes.
//!
//! The registry is built once at startup (from the built-in kinds plus an
//! optional JSON file) and shared read-only. It drives three things:
//! - the `content_types` table sync, which assigns each kind a persistent id
//! - the admin `content_app` choices and the dependent model dropdown
//! - the polymorphic resolver, which loads records from each kind's table

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Identifiers that end up interpolated into SQL (table and column names)
/// must match this pattern.
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Registry entries
// ---------------------------------------------------------------------------

/// One model kind registered under an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelKind {
    /// Short model name, stored lowercase (e.g. `article`).
    pub model: String,
    /// Table holding the records of this kind. Kinds without a table can be
    /// linked at whole-model granularity but never resolve to a record.
    #[serde(default)]
    pub table: Option<String>,
    /// Column rendered as the record label in admin listings.
    #[serde(default)]
    pub label_column: Option<String>,
}

impl ModelKind {
    pub fn new(model: &str, table: Option<&str>, label_column: Option<&str>) -> Self {
        Self {
            model: model.to_lowercase(),
            table: table.map(str::to_string),
            label_column: label_column.map(str::to_string),
        }
    }
}

/// An application label and the model kinds it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppModels {
    pub label: String,
    pub models: Vec<ModelKind>,
}

/// Typed reference to one record of a registered model kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub app_label: String,
    pub model: String,
    pub object_id: DbId,
}

/// Implemented by record types that changes can be linked to.
///
/// ```ignore
/// impl Linkable for Article {
///     const APP_LABEL: &'static str = "newsroom";
///     const MODEL: &'static str = "article";
///     fn object_id(&self) -> DbId { self.id }
/// }
/// ```
pub trait Linkable {
    const APP_LABEL: &'static str;
    const MODEL: &'static str;

    fn object_id(&self) -> DbId;

    fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            app_label: Self::APP_LABEL.to_string(),
            model: Self::MODEL.to_lowercase(),
            object_id: self.object_id(),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable set of registered applications, sorted by label.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeRegistry {
    apps: Vec<AppModels>,
}

impl ContentTypeRegistry {
    /// Build a registry, normalising model names to lowercase.
    ///
    /// Rejects malformed identifiers and duplicate applications or models.
    pub fn new(apps: Vec<AppModels>) -> Result<Self, CoreError> {
        let mut seen_apps = HashSet::new();
        let mut normalized = Vec::with_capacity(apps.len());

        for mut app in apps {
            validate_identifier("application label", &app.label)?;
            if !seen_apps.insert(app.label.clone()) {
                return Err(CoreError::Validation(format!(
                    "Application '{}' is registered more than once",
                    app.label
                )));
            }

            let mut seen_models = HashSet::new();
            for kind in &mut app.models {
                kind.model = kind.model.to_lowercase();
                validate_identifier("model name", &kind.model)?;
                if let Some(table) = &kind.table {
                    validate_identifier("table name", table)?;
                }
                if let Some(column) = &kind.label_column {
                    validate_identifier("label column", column)?;
                }
                if !seen_models.insert(kind.model.clone()) {
                    return Err(CoreError::Validation(format!(
                        "Model '{}.{}' is registered more than once",
                        app.label, kind.model
                    )));
                }
            }
            app.models.sort_by(|a, b| a.model.cmp(&b.model));
            normalized.push(app);
        }

        normalized.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(Self { apps: normalized })
    }

    /// The kinds this service always knows about: its own change records and
    /// the user and site tables it references.
    pub fn builtin() -> Self {
        Self {
            apps: builtin_apps(),
        }
    }

    /// Built-in kinds plus the applications described by a JSON array of
    /// `{"label": ..., "models": [{"model": ..., "table": ..., "label_column": ...}]}`.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let extra: Vec<AppModels> = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("Invalid content registry JSON: {e}")))?;
        let mut apps = builtin_apps();
        apps.extend(extra);
        Self::new(apps)
    }

    /// Read and parse a registry file (see [`Self::from_json`]).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Internal(format!(
                "Failed to read content registry {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&json)
    }

    /// Application labels, sorted.
    pub fn app_labels(&self) -> Vec<&str> {
        self.apps.iter().map(|a| a.label.as_str()).collect()
    }

    pub fn has_app(&self, app_label: &str) -> bool {
        self.apps.iter().any(|a| a.label == app_label)
    }

    /// Models registered under `app_label`; empty for unknown applications.
    pub fn models_for_app(&self, app_label: &str) -> &[ModelKind] {
        self.apps
            .iter()
            .find(|a| a.label == app_label)
            .map(|a| a.models.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a model kind. The model name is matched case-insensitively.
    pub fn find(&self, app_label: &str, model: &str) -> Option<&ModelKind> {
        let model = model.to_lowercase();
        self.models_for_app(app_label)
            .iter()
            .find(|k| k.model == model)
    }

    /// Resolve an `app.Model` reference to its registered kind.
    pub fn resolve_reference(&self, reference: &str) -> Result<(&str, &ModelKind), CoreError> {
        let (app_label, model) = parse_model_reference(reference)?;
        let app = self
            .apps
            .iter()
            .find(|a| a.label == app_label)
            .ok_or_else(|| CoreError::UnknownReference {
                entity: "Model",
                key: reference.to_string(),
            })?;
        let kind = self
            .find(app_label, model)
            .ok_or_else(|| CoreError::UnknownReference {
                entity: "Model",
                key: reference.to_string(),
            })?;
        Ok((app.label.as_str(), kind))
    }

    /// Every `(app_label, kind)` pair in the registry.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelKind)> {
        self.apps
            .iter()
            .flat_map(|app| app.models.iter().map(move |k| (app.label.as_str(), k)))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split an `app.Model` reference into its two parts.
pub fn parse_model_reference(reference: &str) -> Result<(&str, &str), CoreError> {
    match reference.split_once('.') {
        Some((app, model)) if !app.is_empty() && !model.is_empty() && !model.contains('.') => {
            Ok((app, model))
        }
        _ => Err(CoreError::Validation(format!(
            "Model reference '{reference}' must have the form app_label.ModelName"
        ))),
    }
}

fn validate_identifier(what: &str, value: &str) -> Result<(), CoreError> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {what} '{value}': use lowercase letters, digits and underscores"
        )))
    }
}

fn builtin_apps() -> Vec<AppModels> {
    vec![
        AppModels {
            label: "auth".to_string(),
            models: vec![ModelKind::new("user", Some("users"), Some("username"))],
        },
        AppModels {
            label: "correx".to_string(),
            models: vec![ModelKind::new("change", Some("changes"), Some("description"))],
        },
        AppModels {
            label: "sites".to_string(),
            models: vec![ModelKind::new("site", Some("sites"), Some("name"))],
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
