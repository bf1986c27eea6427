use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A top-level container (document library) on the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    pub name: String,
    /// Server-relative path of the container root.
    pub root: String,
}

impl ContainerRef {
    /// Folder backing an item of this container.
    pub fn folder_for(&self, item_name: &str) -> FolderRef {
        FolderRef(format!("{}/{}", self.root.trim_end_matches('/'), item_name))
    }
}

/// Server-relative path of a folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderRef(pub String);

impl std::fmt::Display for FolderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque continuation token returned by a paged listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken(pub String);

/// Site-level information fetched once per run.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    /// Regional-settings time zone description, e.g.
    /// "(UTC-08:00) Pacific Time (US and Canada)".
    pub time_zone: String,
    pub containers: Vec<ContainerRef>,
}

/// An item as delivered by the source, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    /// RFC 3339 timestamp in UTC.
    #[serde(default)]
    pub modified: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ItemPage {
    pub items: Vec<ItemRecord>,
    pub next_page: Option<PageToken>,
}

/// Direct contents of one folder.
#[derive(Debug, Clone, Default)]
pub struct FolderListing {
    pub files: Vec<String>,
    pub subfolders: Vec<FolderRef>,
}

/// Why an [`ItemRecord`] could not become a [`ContentItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemDefect {
    MissingStatus,
    MissingModified,
    UnreadableModified(String),
}

impl std::fmt::Display for ItemDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemDefect::MissingStatus => write!(f, "status field is missing"),
            ItemDefect::MissingModified => write!(f, "modified field is missing"),
            ItemDefect::UnreadableModified(raw) => {
                write!(f, "modified field is unreadable: {raw:?}")
            }
        }
    }
}

/// A validated, read-only snapshot of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub container: String,
    pub name: String,
    pub status: String,
    pub modified_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn from_record(container: &str, record: &ItemRecord) -> Result<Self, ItemDefect> {
        let status = record.status.clone().ok_or(ItemDefect::MissingStatus)?;
        let raw = record
            .modified
            .as_deref()
            .ok_or(ItemDefect::MissingModified)?;
        let modified_at = DateTime::parse_from_rfc3339(raw)
            .map_err(|_| ItemDefect::UnreadableModified(raw.to_string()))?
            .with_timezone(&Utc);

        Ok(Self {
            container: container.to_string(),
            name: record.name.clone(),
            status,
            modified_at,
        })
    }
}
