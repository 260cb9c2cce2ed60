//! Workbook domain record and its owned entries.

use crate::model::entity::{CollectionId, Entity, EntityKind, EntityRef, WorkbookId};
use serde::{Deserialize, Serialize};

/// User document/dashboard, optionally filed under a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub workbook_id: WorkbookId,
    /// `None` means root-level.
    pub collection_id: Option<CollectionId>,
    pub title: String,
    pub title_lower: String,
    pub description: Option<String>,
    pub tenant_id: String,
    pub project_id: Option<String>,
    /// Opaque payload; the core only checks that it is a JSON object.
    pub meta: serde_json::Value,
    pub is_template: bool,
    pub created_by: String,
    pub created_at: i64,
    pub updated_by: String,
    pub updated_at: i64,
    pub deleted_by: Option<String>,
    pub deleted_at: Option<i64>,
    /// Loaded only when the caller asks for relations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<WorkbookEntry>>,
}

impl Entity for Workbook {
    const KIND: EntityKind = EntityKind::Workbook;

    fn entity_ref(&self) -> EntityRef {
        self.workbook_id.into()
    }

    fn parent_id(&self) -> Option<CollectionId> {
        self.collection_id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Sub-resource owned by one workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookEntry {
    pub entry_id: i64,
    pub workbook_id: WorkbookId,
    pub tenant_id: String,
    pub name: String,
    pub scope: String,
    pub created_by: String,
    pub created_at: i64,
}
