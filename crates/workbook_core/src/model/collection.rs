//! Collection domain record.

use crate::model::entity::{CollectionId, Entity, EntityKind, EntityRef};
use serde::{Deserialize, Serialize};

/// Folder-like container for workbooks and other collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub collection_id: CollectionId,
    /// `None` means root-level.
    pub parent_id: Option<CollectionId>,
    pub title: String,
    pub title_lower: String,
    pub description: Option<String>,
    pub tenant_id: String,
    pub project_id: Option<String>,
    pub created_by: String,
    /// Epoch ms, assigned by storage.
    pub created_at: i64,
    pub updated_by: String,
    pub updated_at: i64,
    pub deleted_by: Option<String>,
    pub deleted_at: Option<i64>,
}

impl Entity for Collection {
    const KIND: EntityKind = EntityKind::Collection;

    fn entity_ref(&self) -> EntityRef {
        self.collection_id.into()
    }

    fn parent_id(&self) -> Option<CollectionId> {
        self.parent_id
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
