//! Structural and semantic argument validation.
//!
//! # Responsibility
//! - Define the argument shapes accepted by mutation operations.
//! - Normalize titles/descriptions before any storage access.
//!
//! # Invariants
//! - Validation never touches storage.
//! - Titles are trimmed, non-blank, bounded and free of control characters.

use crate::context::RequestContext;
use crate::model::entity::CollectionId;
use crate::service::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 4_000;
pub const MAX_ENTRY_NAME_CHARS: usize = 200;

static CONTROL_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Cc}").expect("valid control char regex"));
static ENTRY_SCOPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("valid entry scope regex"));

/// Arguments of `create_workbook`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateWorkbookArgs {
    /// `None` files the workbook at root level.
    pub collection_id: Option<CollectionId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Opaque object; defaults to `{}`.
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl CreateWorkbookArgs {
    pub fn new(collection_id: Option<CollectionId>, title: impl Into<String>) -> Self {
        Self {
            collection_id,
            title: title.into(),
            description: None,
            meta: None,
        }
    }
}

/// Arguments of `create_collection`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateCollectionArgs {
    pub parent_id: Option<CollectionId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateCollectionArgs {
    pub fn new(parent_id: Option<CollectionId>, title: impl Into<String>) -> Self {
        Self {
            parent_id,
            title: title.into(),
            description: None,
        }
    }
}

/// Arguments of `update_workbook` / `update_collection`.
///
/// A blank `description` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateEntityArgs {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateEntityArgs {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }
}

/// Arguments of `add_workbook_entry`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateEntryArgs {
    pub name: String,
    pub scope: String,
}

/// Decodes untyped request input into an argument struct.
pub fn parse_args<T: DeserializeOwned>(value: serde_json::Value) -> CoreResult<T> {
    serde_json::from_value(value).map_err(|err| CoreError::Validation(err.to_string()))
}

pub(crate) fn validate_context(ctx: &RequestContext) -> CoreResult<()> {
    if ctx.tenant_id.trim().is_empty() {
        return Err(CoreError::Validation("tenant id must not be blank".to_string()));
    }
    if ctx.user_id.trim().is_empty() {
        return Err(CoreError::Validation("user id must not be blank".to_string()));
    }
    Ok(())
}

pub(crate) fn normalize_title(value: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("title must not be blank".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(CoreError::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    if CONTROL_CHAR_RE.is_match(trimmed) {
        return Err(CoreError::Validation(
            "title must not contain control characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_description(value: Option<String>) -> CoreResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(CoreError::Validation(format!(
            "description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

pub(crate) fn normalize_meta(value: Option<serde_json::Value>) -> CoreResult<serde_json::Value> {
    match value {
        None => Ok(serde_json::Value::Object(serde_json::Map::new())),
        Some(meta @ serde_json::Value::Object(_)) => Ok(meta),
        Some(_) => Err(CoreError::Validation("meta must be a JSON object".to_string())),
    }
}

pub(crate) fn normalize_entry(args: CreateEntryArgs) -> CoreResult<CreateEntryArgs> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("entry name must not be blank".to_string()));
    }
    if name.chars().count() > MAX_ENTRY_NAME_CHARS || CONTROL_CHAR_RE.is_match(name) {
        return Err(CoreError::Validation(format!(
            "entry name must be at most {MAX_ENTRY_NAME_CHARS} printable characters"
        )));
    }
    if !ENTRY_SCOPE_RE.is_match(&args.scope) {
        return Err(CoreError::Validation(format!(
            "invalid entry scope `{}`",
            args.scope
        )));
    }
    Ok(CreateEntryArgs {
        name: name.to_string(),
        scope: args.scope,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_description, normalize_entry, normalize_meta, normalize_title, parse_args,
        CreateEntryArgs, CreateWorkbookArgs, MAX_TITLE_CHARS,
    };
    use crate::model::entity::CollectionId;
    use crate::service::error::CoreError;
    use serde_json::json;

    #[test]
    fn parse_args_accepts_null_collection() {
        let args: CreateWorkbookArgs =
            parse_args(json!({"collectionId": null, "title": "Sales"})).expect("valid args");
        assert_eq!(args.collection_id, None);
        assert_eq!(args.title, "Sales");

        let args: CreateWorkbookArgs =
            parse_args(json!({"collectionId": 4, "title": "Sales", "description": "q3"}))
                .expect("valid args");
        assert_eq!(args.collection_id, Some(CollectionId(4)));
    }

    #[test]
    fn parse_args_rejects_wrong_types_and_unknown_fields() {
        let err = parse_args::<CreateWorkbookArgs>(json!({"collectionId": null, "title": 7}))
            .expect_err("numeric title must fail");
        assert!(matches!(err, CoreError::Validation(_)));

        let err = parse_args::<CreateWorkbookArgs>(
            json!({"collectionId": null, "title": "x", "tenantId": "other"}),
        )
        .expect_err("unknown field must fail");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn normalize_title_trims_and_bounds() {
        assert_eq!(normalize_title("  Sales  ").expect("valid"), "Sales");
        assert!(normalize_title("   ").is_err());
        assert!(normalize_title("a\u{0007}b").is_err());
        assert!(normalize_title(&"x".repeat(MAX_TITLE_CHARS)).is_ok());
        assert!(normalize_title(&"x".repeat(MAX_TITLE_CHARS + 1)).is_err());
    }

    #[test]
    fn blank_description_clears() {
        assert_eq!(normalize_description(Some("  ".to_string())).expect("valid"), None);
        assert_eq!(
            normalize_description(Some(" notes ".to_string())).expect("valid"),
            Some("notes".to_string())
        );
    }

    #[test]
    fn meta_must_be_object() {
        assert_eq!(normalize_meta(None).expect("default"), json!({}));
        assert!(normalize_meta(Some(json!([1, 2]))).is_err());
        assert_eq!(
            normalize_meta(Some(json!({"theme": "dark"}))).expect("object"),
            json!({"theme": "dark"})
        );
    }

    #[test]
    fn entry_scope_is_restricted() {
        let ok = normalize_entry(CreateEntryArgs {
            name: " Revenue ".to_string(),
            scope: "widget".to_string(),
        })
        .expect("valid entry");
        assert_eq!(ok.name, "Revenue");

        assert!(normalize_entry(CreateEntryArgs {
            name: "Revenue".to_string(),
            scope: "Widget!".to_string(),
        })
        .is_err());
    }
}
