use chrono::DateTime;
use chrono_tz::Tz;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classify::{Verdict, classify};
use crate::clock::Clock;
use crate::config::RunConfig;
use crate::counter::count_files;
use crate::enrichment::{Enricher, OutputFetcher};
use crate::error::ReconcileError;
use crate::inventory::{ContainerRef, ContentItem, FolderLister, ItemSource, PageToken};
use crate::model::{Classification, PendingTransfer, SuccessfulTransfer};
use crate::timezone::{elapsed_hours, normalize, resolve_zone};

/// Everything a single pass produced, before aggregation.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    pub zone: Tz,
    /// "Now" in the reference zone, fixed at the start of the run.
    pub started_at: DateTime<Tz>,
    pub classifications: Vec<Classification>,
    /// Items dropped for missing or unreadable fields.
    pub skipped_items: usize,
    /// Containers abandoned after an error.
    pub failed_containers: Vec<String>,
}

#[derive(Default)]
struct ContainerResult {
    classifications: Vec<Classification>,
    skipped_items: usize,
}

/// Drives one sequential reconciliation pass over every container.
pub struct Reconciler<'a, S, L, F, C> {
    config: &'a RunConfig,
    source: &'a S,
    lister: &'a L,
    enricher: &'a Enricher<F>,
    clock: &'a C,
    on_container: Option<Box<dyn Fn(&str) + 'a>>,
}

impl<'a, S, L, F, C> Reconciler<'a, S, L, F, C>
where
    S: ItemSource,
    L: FolderLister,
    F: OutputFetcher,
    C: Clock,
{
    pub fn new(
        config: &'a RunConfig,
        source: &'a S,
        lister: &'a L,
        enricher: &'a Enricher<F>,
        clock: &'a C,
    ) -> Self {
        Self {
            config,
            source,
            lister,
            enricher,
            clock,
            on_container: None,
        }
    }

    /// Callback invoked with each container name as processing starts.
    pub fn with_progress(mut self, f: impl Fn(&str) + 'a) -> Self {
        self.on_container = Some(Box::new(f));
        self
    }

    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunOutcome, ReconcileError> {
        let run_id = Uuid::new_v4().to_string();
        let site = self.source.site().await?;
        let zone = resolve_zone(&site.time_zone)?;
        let started_at = normalize(self.clock.now(), zone);

        info!(
            run_id = %run_id,
            zone = %zone,
            containers = site.containers.len(),
            "starting reconciliation"
        );

        let mut outcome = RunOutcome {
            run_id,
            zone,
            started_at,
            classifications: Vec::new(),
            skipped_items: 0,
            failed_containers: Vec::new(),
        };

        for container in &site.containers {
            if cancel.is_cancelled() {
                return Err(ReconcileError::Cancelled);
            }
            if !self.config.includes_container(&container.name) {
                debug!(container = %container.name, "not the debug container, skipping");
                continue;
            }
            if let Some(f) = &self.on_container {
                f(&container.name);
            }

            let mut result = ContainerResult::default();
            let processed = self
                .process_container(container, zone, started_at, cancel, &mut result)
                .await;
            let reported = result.classifications.len();
            outcome.skipped_items += result.skipped_items;
            outcome.classifications.append(&mut result.classifications);

            match processed {
                Ok(()) => info!(
                    container = %container.name,
                    reported,
                    skipped = result.skipped_items,
                    "container processed"
                ),
                Err(ReconcileError::Cancelled) => return Err(ReconcileError::Cancelled),
                Err(e) => {
                    warn!(
                        container = %container.name,
                        kept = reported,
                        error = %e,
                        "error processing container, remaining items not reported"
                    );
                    outcome.failed_containers.push(container.name.clone());
                }
            }
        }

        Ok(outcome)
    }

    /// Items reported before an error stay in `result`.
    async fn process_container(
        &self,
        container: &ContainerRef,
        zone: Tz,
        now: DateTime<Tz>,
        cancel: &CancellationToken,
        result: &mut ContainerResult,
    ) -> Result<(), ReconcileError> {
        let mut token: Option<PageToken> = None;
        let mut batch = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(ReconcileError::Cancelled);
            }
            let page = self.source.list_items(container, token.as_ref()).await?;
            debug!(container = %container.name, batch, items = page.items.len(), "fetched page");

            for record in &page.items {
                let item = match ContentItem::from_record(&container.name, record) {
                    Ok(item) => item,
                    Err(defect) => {
                        warn!(
                            container = %container.name,
                            item = %record.name,
                            %defect,
                            "skipping item with unusable fields"
                        );
                        result.skipped_items += 1;
                        continue;
                    }
                };
                if let Some(c) = self.reconcile_item(container, &item, zone, now, cancel).await? {
                    result.classifications.push(c);
                }
            }

            match page.next_page {
                Some(next) => {
                    token = Some(next);
                    batch += 1;
                }
                None => break,
            }
        }

        Ok(())
    }

    async fn reconcile_item(
        &self,
        container: &ContainerRef,
        item: &ContentItem,
        zone: Tz,
        now: DateTime<Tz>,
        cancel: &CancellationToken,
    ) -> Result<Option<Classification>, ReconcileError> {
        let modified = normalize(item.modified_at, zone);
        let age = elapsed_hours(now, modified);
        let verdict = classify(&item.status, age, self.config.success_hours_threshold);
        debug!(
            container = %item.container,
            item = %item.name,
            status = %item.status,
            age_hours = age,
            ?verdict,
            "classified"
        );

        if verdict == Verdict::Excluded {
            return Ok(None);
        }

        let lookup = self.enricher.lookup(&item.name).await;
        let folder = container.folder_for(&item.name);
        let count = count_files(self.lister, self.clock, &self.config.retry, &folder, cancel).await?;
        if !count.is_complete() {
            warn!(
                item = %item.name,
                unlisted = count.unlisted.len(),
                "file count is partial"
            );
        }

        let classification = match verdict {
            Verdict::Successful => Classification::Successful(SuccessfulTransfer {
                library_name: item.container.clone(),
                folder_name: item.name.clone(),
                workspace_id: lookup.workspace_label(),
                final_planning_pkg_count: lookup.planning_packages(),
                final_wo_pkg_count: lookup.work_order_packages(),
                file_count: count.files,
                extraction_date: modified,
            }),
            Verdict::Pending(category) => Classification::Pending(PendingTransfer {
                library_name: item.container.clone(),
                folder_name: item.name.clone(),
                last_modified: modified,
                pending_hours: age,
                source_category: item.status.clone(),
                category,
                enriched_category: self.config.enriched_category().to_string(),
                file_count: count.files,
                workspace_info: lookup.workspace_label(),
            }),
            Verdict::Excluded => return Ok(None),
        };
        Ok(Some(classification))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::aggregate::summarize;
    use crate::classify::PendingCategory;
    use crate::clock::ManualClock;
    use crate::enrichment::types::OutputEnvelope;
    use crate::enrichment::CaseError;
    use crate::error::SourceError;
    use crate::inventory::{FolderListing, FolderRef, ItemPage, SiteInfo, SnapshotSource};

    const PACIFIC: &str = "(UTC-08:00) Pacific Time (US and Canada)";

    fn snapshot(time_zone: &str) -> String {
        json!({
            "time_zone": time_zone,
            "containers": [
                {
                    "name": "Library A",
                    "items": [
                        {"name": "WO-1", "status": "ASSEMBLED", "modified": "2026-06-01T02:00:00Z"},
                        {"name": "WO-2", "status": "Extraction Success", "modified": "2026-06-01T10:00:00Z"},
                        {"name": "WO-3", "status": "extraction success", "modified": "2026-05-28T12:00:00Z"},
                        {"name": "WO-4", "status": "Draft", "modified": "2026-06-01T10:00:00Z"},
                        {"name": "WO-5", "modified": "2026-06-01T10:00:00Z"},
                        {"name": "WO-6", "status": "Sent to FAO", "modified": "not a date"}
                    ],
                    "folders": [
                        {"name": "WO-1", "files": ["a", "b", "c"], "folders": [{"name": "x", "files": ["d", "e"]}]},
                        {"name": "WO-2", "files": ["a"]},
                        {"name": "WO-3", "files": []}
                    ]
                },
                {
                    "name": "Library B",
                    "items": [
                        {"name": "WO-7", "status": "CLSD WO Status Set", "modified": "2026-05-31T12:00:00Z"}
                    ],
                    "folders": [{"name": "WO-7", "files": ["a", "b"]}]
                }
            ]
        })
        .to_string()
    }

    // 2026-06-01T12:00:00Z
    fn clock() -> ManualClock {
        ManualClock::at(Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap())
    }

    fn config() -> RunConfig {
        RunConfig::default()
    }

    struct FixedFetcher;

    impl OutputFetcher for FixedFetcher {
        async fn fetch_output(&self, item_name: &str) -> Result<OutputEnvelope, CaseError> {
            match item_name {
                "WO-2" => Ok(OutputEnvelope {
                    data: Some(json!({"dataid": 900, "fpp": 2, "fwop": 3})),
                }),
                _ => Ok(OutputEnvelope::default()),
            }
        }
    }

    fn pending(outcome: &RunOutcome) -> Vec<&PendingTransfer> {
        outcome
            .classifications
            .iter()
            .filter_map(|c| match c {
                Classification::Pending(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn successful(outcome: &RunOutcome) -> Vec<&SuccessfulTransfer> {
        outcome
            .classifications
            .iter()
            .filter_map(|c| match c {
                Classification::Successful(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn full_pass_classifies_counts_and_enriches() {
        let source = SnapshotSource::from_json(&snapshot(PACIFIC), 2).unwrap();
        let enricher = Enricher::Enabled(FixedFetcher);
        let config = config();
        let clock = clock();
        let outcome = Reconciler::new(&config, &source, &source, &enricher, &clock)
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.zone, chrono_tz::America::Los_Angeles);
        assert_eq!(outcome.skipped_items, 2);
        assert!(outcome.failed_containers.is_empty());

        let ok = successful(&outcome);
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].folder_name, "WO-2");
        assert_eq!(ok[0].workspace_id, "900");
        assert_eq!(ok[0].final_planning_pkg_count, 2);
        assert_eq!(ok[0].final_wo_pkg_count, 3);
        assert_eq!(ok[0].file_count, 1);

        let waiting = pending(&outcome);
        let names: Vec<_> = waiting.iter().map(|p| p.folder_name.as_str()).collect();
        assert_eq!(names, ["WO-1", "WO-3", "WO-7"]);

        assert_eq!(waiting[0].category, PendingCategory::Assembled);
        assert_eq!(waiting[0].file_count, 5);
        assert!((waiting[0].pending_hours - 10.0).abs() < 1e-9);
        assert_eq!(waiting[0].workspace_info, "No workspace");
        assert_eq!(waiting[0].enriched_category, "Final Planning Package");

        assert_eq!(waiting[1].category, PendingCategory::OverdueExtraction);
        assert_eq!(waiting[1].source_category, "extraction success");
        assert!((waiting[1].pending_hours - 96.0).abs() < 1e-9);

        assert_eq!(waiting[2].library_name, "Library B");
        assert_eq!(waiting[2].category, PendingCategory::ClsdSet);

        let stats = summarize(&outcome.classifications);
        assert_eq!(stats.total_successful, 1);
        assert_eq!(stats.total_pending, 2);
        assert!((stats.average_pending_hours - 17.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn timestamps_are_in_reference_zone() {
        let source = SnapshotSource::from_json(&snapshot(PACIFIC), 100).unwrap();
        let enricher: Enricher<FixedFetcher> = Enricher::Disabled;
        let config = config();
        let clock = clock();
        let outcome = Reconciler::new(&config, &source, &source, &enricher, &clock)
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            crate::timezone::display(&outcome.started_at),
            "2026-06-01 05:00"
        );
        let ok = successful(&outcome);
        assert_eq!(crate::timezone::display(&ok[0].extraction_date), "2026-06-01 03:00");
        assert_eq!(ok[0].workspace_id, "Debug Mode");
        assert_eq!(ok[0].final_planning_pkg_count, 0);
    }

    #[tokio::test]
    async fn unknown_time_zone_is_fatal() {
        let source = SnapshotSource::from_json(&snapshot("(UTC+09:00) Osaka, Sapporo, Tokyo"), 100)
            .unwrap();
        let enricher: Enricher<FixedFetcher> = Enricher::Disabled;
        let config = config();
        let clock = clock();
        let err = Reconciler::new(&config, &source, &source, &enricher, &clock)
            .run(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownTimeZone(_)));
    }

    #[tokio::test]
    async fn debug_mode_processes_only_debug_container() {
        let source = SnapshotSource::from_json(&snapshot(PACIFIC), 100).unwrap();
        let enricher: Enricher<FixedFetcher> = Enricher::Disabled;
        let config = RunConfig {
            debug: true,
            debug_container: Some("library b".into()),
            ..RunConfig::default()
        };
        let clock = clock();
        let seen = RefCell::new(Vec::new());
        let outcome = Reconciler::new(&config, &source, &source, &enricher, &clock)
            .with_progress(|name| seen.borrow_mut().push(name.to_string()))
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(seen.into_inner(), vec!["Library B".to_string()]);
        let waiting = pending(&outcome);
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].enriched_category, "Debug Mode");
        assert_eq!(waiting[0].workspace_info, "Debug Mode");
    }

    /// Snapshot wrapper whose item listing fails for one container.
    struct FlakySource {
        inner: SnapshotSource,
        broken: &'static str,
    }

    impl ItemSource for FlakySource {
        async fn site(&self) -> Result<SiteInfo, SourceError> {
            self.inner.site().await
        }

        async fn list_items(
            &self,
            container: &ContainerRef,
            page: Option<&PageToken>,
        ) -> Result<ItemPage, SourceError> {
            if container.name == self.broken {
                return Err(SourceError::Transient("list view threshold exceeded".into()));
            }
            self.inner.list_items(container, page).await
        }
    }

    impl FolderLister for FlakySource {
        async fn list_folder(&self, folder: &FolderRef) -> Result<FolderListing, SourceError> {
            self.inner.list_folder(folder).await
        }
    }

    #[tokio::test]
    async fn failing_container_does_not_stop_the_run() {
        let source = FlakySource {
            inner: SnapshotSource::from_json(&snapshot(PACIFIC), 100).unwrap(),
            broken: "Library A",
        };
        let enricher: Enricher<FixedFetcher> = Enricher::Disabled;
        let config = config();
        let clock = clock();
        let outcome = Reconciler::new(&config, &source, &source, &enricher, &clock)
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.failed_containers, vec!["Library A".to_string()]);
        let waiting = pending(&outcome);
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].folder_name, "WO-7");
    }

    #[tokio::test]
    async fn missing_folder_counts_zero_after_retries() {
        let source = SnapshotSource::from_json(
            &json!({
                "time_zone": PACIFIC,
                "containers": [{
                    "name": "Library C",
                    "items": [{"name": "WO-9", "status": "ASSEMBLED", "modified": "2026-06-01T00:00:00Z"}]
                }]
            })
            .to_string(),
            100,
        )
        .unwrap();
        let enricher: Enricher<FixedFetcher> = Enricher::Disabled;
        let config = RunConfig {
            retry: crate::retry::RetryPolicy::new(3, std::time::Duration::from_secs(60)),
            ..RunConfig::default()
        };
        let clock = clock();
        let outcome = Reconciler::new(&config, &source, &source, &enricher, &clock)
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(pending(&outcome)[0].file_count, 0);
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn cancellation_between_containers() {
        let source = SnapshotSource::from_json(&snapshot(PACIFIC), 100).unwrap();
        let enricher: Enricher<FixedFetcher> = Enricher::Disabled;
        let config = config();
        let clock = clock();
        let cancel = CancellationToken::new();
        let err = Reconciler::new(&config, &source, &source, &enricher, &clock)
            .with_progress(|_| cancel.cancel())
            .run(&cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Cancelled));
    }

    /// Snapshot wrapper acting once the first page of a container is served:
    /// cancels `cancel` if set, otherwise fails every later page.
    struct AfterFirstPage {
        inner: SnapshotSource,
        cancel: Option<CancellationToken>,
        calls: Cell<usize>,
    }

    impl AfterFirstPage {
        fn new(inner: SnapshotSource, cancel: Option<CancellationToken>) -> Self {
            Self {
                inner,
                cancel,
                calls: Cell::new(0),
            }
        }
    }

    impl ItemSource for AfterFirstPage {
        async fn site(&self) -> Result<SiteInfo, SourceError> {
            self.inner.site().await
        }

        async fn list_items(
            &self,
            container: &ContainerRef,
            page: Option<&PageToken>,
        ) -> Result<ItemPage, SourceError> {
            self.calls.set(self.calls.get() + 1);
            if page.is_some() && self.cancel.is_none() {
                return Err(SourceError::Transient("connection reset".into()));
            }
            let result = self.inner.list_items(container, page).await;
            if let Some(cancel) = &self.cancel {
                cancel.cancel();
            }
            result
        }
    }

    impl FolderLister for AfterFirstPage {
        async fn list_folder(&self, folder: &FolderRef) -> Result<FolderListing, SourceError> {
            self.inner.list_folder(folder).await
        }
    }

    #[tokio::test]
    async fn page_failure_keeps_items_already_reported() {
        let inner = SnapshotSource::from_json(&snapshot(PACIFIC), 2).unwrap();
        let source = AfterFirstPage::new(inner, None);
        let enricher = Enricher::Enabled(FixedFetcher);
        let config = config();
        let clock = clock();
        let outcome = Reconciler::new(&config, &source, &source, &enricher, &clock)
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.failed_containers, vec!["Library A".to_string()]);
        let names: Vec<_> = pending(&outcome)
            .iter()
            .map(|p| p.folder_name.clone())
            .collect();
        assert_eq!(names, ["WO-1", "WO-7"]);
        assert_eq!(pending(&outcome)[0].file_count, 5);

        let ok = successful(&outcome);
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].folder_name, "WO-2");
        assert_eq!(ok[0].workspace_id, "900");
    }

    #[tokio::test]
    async fn cancellation_before_next_page() {
        let inner = SnapshotSource::from_json(
            &json!({
                "time_zone": PACIFIC,
                "containers": [{
                    "name": "Library A",
                    "items": [
                        {"name": "WO-1", "status": "Draft", "modified": "2026-06-01T00:00:00Z"},
                        {"name": "WO-2", "status": "ASSEMBLED", "modified": "2026-06-01T00:00:00Z"}
                    ]
                }]
            })
            .to_string(),
            1,
        )
        .unwrap();
        let cancel = CancellationToken::new();
        let source = AfterFirstPage::new(inner, Some(cancel.clone()));
        let enricher: Enricher<FixedFetcher> = Enricher::Disabled;
        let config = config();
        let clock = clock();
        let err = Reconciler::new(&config, &source, &source, &enricher, &clock)
            .run(&cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Cancelled));
        assert_eq!(source.calls.get(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn identical_inputs_give_identical_summaries() {
        let source = SnapshotSource::from_json(&snapshot(PACIFIC), 3).unwrap();
        let enricher = Enricher::Enabled(FixedFetcher);
        let config = config();

        let first = Reconciler::new(&config, &source, &source, &enricher, &clock())
            .run(&CancellationToken::new())
            .await
            .unwrap();
        let second = Reconciler::new(&config, &source, &source, &enricher, &clock())
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summarize(&first.classifications), summarize(&second.classifications));
        assert_eq!(first.classifications, second.classifications);
    }
}
