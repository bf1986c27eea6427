pub mod snapshot;
pub mod source;
pub mod types;

pub use snapshot::{DEFAULT_PAGE_SIZE, SnapshotSource};
pub use source::{FolderLister, ItemSource};
pub use types::{ContainerRef, ContentItem, FolderListing, FolderRef, ItemPage, PageToken, SiteInfo};
