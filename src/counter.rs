//! Recursive file counting over a folder tree with bounded retries.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::ReconcileError;
use crate::inventory::{FolderListing, FolderLister, FolderRef};
use crate::retry::{RetryPolicy, RetryState, Transition};

/// Best-effort file count for a folder tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCount {
    pub files: u64,
    /// Folders whose listing never succeeded; their files are not counted.
    pub unlisted: Vec<FolderRef>,
}

impl FileCount {
    pub fn is_complete(&self) -> bool {
        self.unlisted.is_empty()
    }
}

/// Count leaf files under `root`, recursing into every subfolder.
///
/// A subfolder is only visited once its parent listed successfully. A folder
/// whose listing exhausts the retry policy contributes nothing, and the
/// count accumulated from every other folder is still returned.
pub async fn count_files<L, C>(
    lister: &L,
    clock: &C,
    policy: &RetryPolicy,
    root: &FolderRef,
    cancel: &CancellationToken,
) -> Result<FileCount, ReconcileError>
where
    L: FolderLister,
    C: Clock,
{
    let mut count = FileCount::default();
    let mut stack = vec![root.clone()];

    while let Some(folder) = stack.pop() {
        match list_with_retry(lister, clock, policy, &folder, cancel).await? {
            Some(listing) => {
                count.files += listing.files.len() as u64;
                // Reverse so folders are visited in listing order.
                stack.extend(listing.subfolders.into_iter().rev());
            }
            None => count.unlisted.push(folder),
        }
    }

    debug!(folder = %root, files = count.files, complete = count.is_complete(), "counted files");
    Ok(count)
}

async fn list_with_retry<L, C>(
    lister: &L,
    clock: &C,
    policy: &RetryPolicy,
    folder: &FolderRef,
    cancel: &CancellationToken,
) -> Result<Option<FolderListing>, ReconcileError>
where
    L: FolderLister,
    C: Clock,
{
    let mut state = RetryState::new(policy);
    let mut attempt = 1;

    loop {
        if cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }

        let error = match lister.list_folder(folder).await {
            Ok(listing) => {
                state.succeed();
                return Ok(Some(listing));
            }
            Err(e) => e,
        };

        if error.is_rate_limit() {
            warn!(%folder, attempt, max = state.max_attempts(), "rate limited while listing folder");
        } else {
            warn!(%folder, attempt, max = state.max_attempts(), %error, "folder listing failed");
        }

        match state.fail(error) {
            Transition::Retry { attempt: next, delay } => {
                debug!(%folder, state = %state.state(), delay_secs = delay.as_secs(), "waiting before retry");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ReconcileError::Cancelled),
                    _ = clock.sleep(delay) => {}
                }
                attempt = next;
            }
            Transition::GiveUp => {
                warn!(
                    %folder,
                    attempts = attempt,
                    last_error = ?state.last_error(),
                    "max retries reached, folder not counted"
                );
                return Ok(None);
            }
        }
    }
}
