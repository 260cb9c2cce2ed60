//! Capabilities shared by every hierarchical entity.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Collection identifier generated by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub i64);

/// Workbook identifier generated by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkbookId(pub i64);

impl CollectionId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl WorkbookId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for CollectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for WorkbookId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity category. Uniqueness and bindings are scoped per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Workbook,
    Collection,
}

impl EntityKind {
    /// Stable string id used in storage and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workbook => "workbook",
            Self::Collection => "collection",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "workbook" => Some(Self::Workbook),
            "collection" => Some(Self::Collection),
            _ => None,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-tagged reference to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: i64,
}

impl From<WorkbookId> for EntityRef {
    fn from(value: WorkbookId) -> Self {
        Self {
            kind: EntityKind::Workbook,
            id: value.0,
        }
    }
}

impl From<CollectionId> for EntityRef {
    fn from(value: CollectionId) -> Self {
        Self {
            kind: EntityKind::Collection,
            id: value.0,
        }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Where an entity is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentScope {
    /// Root level (`parent_id IS NULL`).
    Root,
    Collection(CollectionId),
}

impl ParentScope {
    pub fn collection_id(self) -> Option<CollectionId> {
        match self {
            Self::Root => None,
            Self::Collection(id) => Some(id),
        }
    }
}

impl From<Option<CollectionId>> for ParentScope {
    fn from(value: Option<CollectionId>) -> Self {
        value.map_or(Self::Root, Self::Collection)
    }
}

/// Read access shared by workbooks and collections.
pub trait Entity {
    const KIND: EntityKind;

    fn entity_ref(&self) -> EntityRef;
    fn parent_id(&self) -> Option<CollectionId>;
    fn title(&self) -> &str;
    fn tenant_id(&self) -> &str;
    fn is_deleted(&self) -> bool;
}

/// Case-insensitive uniqueness key. No locale folding beyond Unicode lowercase.
pub fn lower_title(title: &str) -> String {
    title.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{lower_title, CollectionId, EntityKind, ParentScope};

    #[test]
    fn lower_title_keeps_accents() {
        assert_eq!(lower_title("Sales"), "sales");
        assert_eq!(lower_title("ÉTÉ"), "été");
        assert_ne!(lower_title("Été"), lower_title("Ete"));
    }

    #[test]
    fn kind_strings_roundtrip() {
        for kind in [EntityKind::Workbook, EntityKind::Collection] {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::parse("folder"), None);
    }

    #[test]
    fn parent_scope_from_option() {
        assert_eq!(ParentScope::from(None), ParentScope::Root);
        assert_eq!(
            ParentScope::from(Some(CollectionId(7))),
            ParentScope::Collection(CollectionId(7))
        );
    }
}
