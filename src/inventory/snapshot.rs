//! Item source backed by a JSON inventory export.
//!
//! The export mirrors what the content store returns: the site time zone
//! description, then each container with its tagged items and its folder
//! tree. Pages are cut from the item list with a fixed row limit so the
//! paging loop behaves as it does against the live store.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ReconcileError, SourceError};

use super::source::{FolderLister, ItemSource};
use super::types::{
    ContainerRef, FolderListing, FolderRef, ItemPage, ItemRecord, PageToken, SiteInfo,
};

/// Row limit per page on the content store.
pub const DEFAULT_PAGE_SIZE: usize = 5000;

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    time_zone: String,
    #[serde(default)]
    containers: Vec<SnapshotContainer>,
}

#[derive(Debug, Deserialize)]
struct SnapshotContainer {
    name: String,
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    items: Vec<ItemRecord>,
    #[serde(default)]
    folders: Vec<SnapshotFolder>,
}

#[derive(Debug, Deserialize)]
struct SnapshotFolder {
    name: String,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    folders: Vec<SnapshotFolder>,
}

pub struct SnapshotSource {
    time_zone: String,
    containers: Vec<ContainerRef>,
    items: HashMap<String, Vec<ItemRecord>>,
    folders: HashMap<FolderRef, FolderListing>,
    page_size: usize,
}

impl SnapshotSource {
    pub fn load(path: &Path, page_size: usize) -> Result<Self, ReconcileError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents, page_size)
    }

    pub fn from_json(json: &str, page_size: usize) -> Result<Self, ReconcileError> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        if page_size == 0 {
            return Err(ReconcileError::Config("page size must be positive".into()));
        }

        let mut containers = Vec::with_capacity(file.containers.len());
        let mut items = HashMap::new();
        let mut folders = HashMap::new();

        for c in file.containers {
            let container = ContainerRef {
                root: c.root.unwrap_or_else(|| format!("/{}", c.name)),
                name: c.name,
            };
            for folder in &c.folders {
                flatten(&container.root, folder, &mut folders);
            }
            items.insert(container.name.clone(), c.items);
            containers.push(container);
        }

        Ok(Self {
            time_zone: file.time_zone,
            containers,
            items,
            folders,
            page_size,
        })
    }
}

fn flatten(parent: &str, folder: &SnapshotFolder, out: &mut HashMap<FolderRef, FolderListing>) {
    let path = format!("{}/{}", parent.trim_end_matches('/'), folder.name);
    let subfolders = folder
        .folders
        .iter()
        .map(|sub| FolderRef(format!("{path}/{}", sub.name)))
        .collect();
    for sub in &folder.folders {
        flatten(&path, sub, out);
    }
    out.insert(
        FolderRef(path),
        FolderListing {
            files: folder.files.clone(),
            subfolders,
        },
    );
}

impl ItemSource for SnapshotSource {
    async fn site(&self) -> Result<SiteInfo, SourceError> {
        Ok(SiteInfo {
            time_zone: self.time_zone.clone(),
            containers: self.containers.clone(),
        })
    }

    async fn list_items(
        &self,
        container: &ContainerRef,
        page: Option<&PageToken>,
    ) -> Result<ItemPage, SourceError> {
        let all = self
            .items
            .get(&container.name)
            .ok_or_else(|| SourceError::NotFound(container.name.clone()))?;

        let offset = match page {
            Some(token) => token
                .0
                .parse::<usize>()
                .map_err(|_| SourceError::Transient(format!("bad page token {:?}", token.0)))?,
            None => 0,
        };
        let end = offset.saturating_add(self.page_size).min(all.len());
        let items = all.get(offset..end).unwrap_or_default().to_vec();
        let next_page = (end < all.len()).then(|| PageToken(end.to_string()));

        Ok(ItemPage { items, next_page })
    }
}

impl FolderLister for SnapshotSource {
    async fn list_folder(&self, folder: &FolderRef) -> Result<FolderListing, SourceError> {
        self.folders
            .get(folder)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(folder.0.clone()))
    }
}
