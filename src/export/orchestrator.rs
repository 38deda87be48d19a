//! Per-kind export pipeline
//!
//! `Authenticating → Listing → Hydrating → Transforming → Writing`. A fatal
//! error at any stage turns into a failed [`ExportOutcome`]; in an export-all
//! run the remaining kinds still run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::Serialize;

use super::{
    AuxData, AuxRequest, Collected, DEVICES, PREVENTION_MEMBERS, PREVENTION_MEMBERS_PAGE_SIZE,
    ResourceKind, SourceRecords,
};
use crate::client::{Connector, FalconApi, PageStrategy, fetch_all, fetch_total, hydrate, ids_of};
use crate::config::Credential;
use crate::error::Error;
use crate::output::SheetBundle;
use crate::output::xlsx::{output_path, write_bundle};

/// Everything one run needs besides the API handle
#[derive(Debug, Clone)]
pub struct RunContext {
    pub credential: Credential,
    pub output_dir: PathBuf,
    /// Draw a spinner per kind on stderr
    pub progress: bool,
}

/// Pipeline step, reported when an export fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Authenticating,
    Listing,
    Hydrating,
    Transforming,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Authenticating => "authenticating",
            Stage::Listing => "listing",
            Stage::Hydrating => "hydrating",
            Stage::Transforming => "transforming",
            Stage::Writing => "writing",
        };
        write!(f, "{}", s)
    }
}

/// Terminal state of one kind's export
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExportStatus {
    Written { path: PathBuf, sheets: usize },
    /// Nothing to export; no file written
    Empty,
    Failed { stage: Stage, error: String },
}

/// Result of exporting one kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportOutcome {
    pub kind: ResourceKind,
    #[serde(flatten)]
    pub status: ExportStatus,
    /// Items returned by the listing endpoints
    pub listed: usize,
    /// Identifiers sent for hydration
    pub requested: usize,
    /// Records hydration returned
    pub hydrated: usize,
    /// Identifiers lost to failed hydration batches
    pub failed_ids: usize,
}

impl ExportOutcome {
    fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            status: ExportStatus::Empty,
            listed: 0,
            requested: 0,
            hydrated: 0,
            failed_ids: 0,
        }
    }

    fn failed(kind: ResourceKind, stage: Stage, error: impl Into<String>) -> Self {
        Self {
            status: ExportStatus::Failed {
                stage,
                error: error.into(),
            },
            ..Self::new(kind)
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, ExportStatus::Failed { .. })
    }
}

type StageResult<T> = std::result::Result<T, (Stage, Error)>;

/// Runs kinds one after another against an authenticated API
pub struct Exporter<'a, A: FalconApi + ?Sized> {
    api: &'a A,
    ctx: &'a RunContext,
}

impl<'a, A: FalconApi + ?Sized> Exporter<'a, A> {
    pub fn new(api: &'a A, ctx: &'a RunContext) -> Self {
        Self { api, ctx }
    }

    /// Destination workbook for `kind`
    pub fn destination(&self, kind: ResourceKind) -> PathBuf {
        output_path(
            &self.ctx.output_dir,
            kind.prefix(),
            &self.ctx.credential.file_slug(),
        )
    }

    /// Export one kind. Never returns an error; failures land in the outcome.
    pub async fn export(&self, kind: ResourceKind) -> ExportOutcome {
        let spinner = self.spinner(kind);
        let mut outcome = ExportOutcome::new(kind);

        outcome.status = match self.run_stages(kind, &mut outcome, &spinner).await {
            Ok(status) => status,
            Err((stage, e)) => {
                error!("Export of {} failed while {}: {}", kind, stage, e);
                ExportStatus::Failed {
                    stage,
                    error: e.to_string(),
                }
            }
        };

        spinner.finish_and_clear();
        outcome
    }

    async fn run_stages(
        &self,
        kind: ResourceKind,
        outcome: &mut ExportOutcome,
        spinner: &ProgressBar,
    ) -> StageResult<ExportStatus> {
        let collected = self.collect(kind, outcome, spinner).await?;

        debug!("Transforming {} records for {}", collected.record_count(), kind);
        spinner.set_message(Stage::Transforming.to_string());
        let bundle = kind.transform(&collected);

        if bundle.is_empty() {
            info!("No {} data to export", kind);
            return Ok(ExportStatus::Empty);
        }

        spinner.set_message(Stage::Writing.to_string());
        let path = self.write(kind, &bundle)?;
        info!("Wrote {} sheets to {}", bundle.len(), path.display());

        Ok(ExportStatus::Written {
            path,
            sheets: bundle.len(),
        })
    }

    /// List, hydrate and fetch auxiliary data for `kind`.
    pub async fn collect(
        &self,
        kind: ResourceKind,
        outcome: &mut ExportOutcome,
        spinner: &ProgressBar,
    ) -> StageResult<Collected> {
        let mut sections = Vec::with_capacity(kind.sources().len());

        for source in kind.sources() {
            spinner.set_message(format!("listing {}", source.name));
            let listing = fetch_all(self.api, source.endpoint, source.page_size, source.strategy)
                .await
                .map_err(|e| (Stage::Listing, e))?;
            let listed = listing.len();
            outcome.listed += listed;

            let records = match source.details {
                None => listing,
                Some(details) => {
                    spinner.set_message(format!("hydrating {} {}", listed, source.name));
                    let ids = ids_of(listing);
                    let hydrated = hydrate(self.api, &ids, details.endpoint, details.batch_size).await;

                    outcome.requested += hydrated.requested;
                    outcome.hydrated += hydrated.resources.len();
                    outcome.failed_ids += hydrated.failed_ids();
                    if !hydrated.failures.is_empty() {
                        warn!(
                            "{}: {} of {} ids could not be hydrated",
                            source.name,
                            hydrated.failed_ids(),
                            hydrated.requested
                        );
                    }
                    hydrated.resources
                }
            };

            sections.push(SourceRecords {
                source: *source,
                listed,
                records,
            });
        }

        let aux = if outcome.listed == 0 {
            AuxData::None
        } else {
            self.aux(kind.aux(), spinner).await?
        };

        Ok(Collected { sections, aux })
    }

    async fn aux(&self, request: AuxRequest, spinner: &ProgressBar) -> StageResult<AuxData> {
        match request {
            AuxRequest::None => Ok(AuxData::None),
            AuxRequest::PreventionMembers => {
                spinner.set_message("counting hosts per policy");
                let members = fetch_all(
                    self.api,
                    PREVENTION_MEMBERS,
                    PREVENTION_MEMBERS_PAGE_SIZE,
                    PageStrategy::ShortPage,
                )
                .await;
                match members {
                    Ok(members) => Ok(AuxData::PreventionMembers(Some(members))),
                    Err(e) => {
                        warn!("Host counts unavailable, leaving them blank: {}", e);
                        Ok(AuxData::PreventionMembers(None))
                    }
                }
            }
            AuxRequest::InstalledHosts => {
                spinner.set_message("counting installed hosts");
                let total = fetch_total(self.api, DEVICES)
                    .await
                    .map_err(|e| (Stage::Listing, e))?;
                Ok(AuxData::InstalledHosts(total))
            }
        }
    }

    fn write(&self, kind: ResourceKind, bundle: &SheetBundle) -> StageResult<PathBuf> {
        let dest = self.destination(kind);
        debug!("Writing {} to {}", kind, dest.display());
        write_bundle(bundle, &dest, Utc::now()).map_err(|e| (Stage::Writing, e))
    }

    fn spinner(&self, kind: ResourceKind) -> ProgressBar {
        if !self.ctx.progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        match ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}") {
            Ok(style) => pb.set_style(style),
            Err(e) => debug!("Spinner template rejected: {}", e),
        }
        pb.set_prefix(kind.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Authenticate once, then export each kind in order.
///
/// If authentication fails every kind is reported as failed at that stage.
pub async fn run<C: Connector>(
    connector: &C,
    ctx: &RunContext,
    kinds: &[ResourceKind],
) -> Vec<ExportOutcome> {
    info!(
        "Authenticating client '{}' against {}",
        ctx.credential.client_name, ctx.credential.base_url
    );

    let api = match connector.connect(&ctx.credential).await {
        Ok(api) => api,
        Err(e) => {
            error!("Authentication failed: {}", e);
            let message = e.to_string();
            return kinds
                .iter()
                .map(|kind| ExportOutcome::failed(*kind, Stage::Authenticating, message.clone()))
                .collect();
        }
    };

    let exporter = Exporter::new(&api, ctx);
    let mut outcomes = Vec::with_capacity(kinds.len());
    for kind in kinds {
        outcomes.push(exporter.export(*kind).await);
    }
    outcomes
}

/// Workbooks written by a run, in run order
pub fn written_paths(outcomes: &[ExportOutcome]) -> Vec<&Path> {
    outcomes
        .iter()
        .filter_map(|o| match &o.status {
            ExportStatus::Written { path, .. } => Some(path.as_path()),
            _ => None,
        })
        .collect()
}
