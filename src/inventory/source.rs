use crate::error::SourceError;

use super::types::{ContainerRef, FolderListing, FolderRef, ItemPage, PageToken, SiteInfo};

/// Paged enumeration of tagged items on the content store.
#[allow(async_fn_in_trait)]
pub trait ItemSource {
    /// Regional settings and the containers eligible for the run.
    async fn site(&self) -> Result<SiteInfo, SourceError>;

    /// One page of items under `container`. Callers keep requesting with the
    /// returned token until `next_page` is `None`.
    async fn list_items(
        &self,
        container: &ContainerRef,
        page: Option<&PageToken>,
    ) -> Result<ItemPage, SourceError>;
}

/// Listing of a single folder's direct files and subfolders.
#[allow(async_fn_in_trait)]
pub trait FolderLister {
    async fn list_folder(&self, folder: &FolderRef) -> Result<FolderListing, SourceError>;
}
