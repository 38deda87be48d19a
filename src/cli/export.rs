//! `csexport export` handler

use colored::Colorize;
use log::info;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::args::GlobalOptions;
use crate::cli::{ExportArgs, OutputFormat, context};
use crate::client::HttpConnector;
use crate::error::{Error, Result};
use crate::export::{self, ExportOutcome, ExportStatus};
use crate::output::json::format_json;
use crate::output::table::format_table;

/// One summary line per exported kind
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct OutcomeRow {
    #[tabled(rename = "KIND")]
    pub kind: String,
    #[tabled(rename = "STATUS")]
    pub status: String,
    #[tabled(rename = "LISTED")]
    pub listed: usize,
    #[tabled(rename = "HYDRATED")]
    pub hydrated: String,
    #[tabled(rename = "RESULT")]
    pub result: String,
}

impl From<&ExportOutcome> for OutcomeRow {
    fn from(outcome: &ExportOutcome) -> Self {
        let (status, result) = match &outcome.status {
            ExportStatus::Written { path, sheets } => (
                "written".to_string(),
                format!("{} ({} sheets)", path.display(), sheets),
            ),
            ExportStatus::Empty => ("empty".to_string(), "no data".to_string()),
            ExportStatus::Failed { stage, error } => {
                (format!("failed ({})", stage), error.clone())
            }
        };

        let hydrated = if outcome.requested == 0 {
            "-".to_string()
        } else {
            format!("{}/{}", outcome.hydrated, outcome.requested)
        };

        Self {
            kind: outcome.kind.to_string(),
            status,
            listed: outcome.listed,
            hydrated,
            result,
        }
    }
}

pub async fn run(args: &ExportArgs, opts: &GlobalOptions) -> Result<()> {
    let ctx = context::run_context(opts, args)?;
    let kinds = args.target.kinds();
    info!(
        "Exporting {} kind(s) for '{}' into {}",
        kinds.len(),
        ctx.credential.client_name,
        ctx.output_dir.display()
    );

    let outcomes = export::run(&HttpConnector, &ctx, &kinds).await;
    print_summary(&outcomes, opts.format)?;

    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    if failed > 0 {
        return Err(Error::Other(format!(
            "{} of {} exports failed",
            failed,
            outcomes.len()
        )));
    }
    Ok(())
}

fn print_summary(outcomes: &[ExportOutcome], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", format_json(outcomes)?),
        OutputFormat::Table => {
            let rows: Vec<OutcomeRow> = outcomes.iter().map(OutcomeRow::from).collect();
            println!("{}", format_table(&rows));

            let written = export::orchestrator::written_paths(outcomes).len();
            let lost: usize = outcomes.iter().map(|o| o.failed_ids).sum();
            println!();
            println!("{} {} workbook(s) written", "✓".green(), written);
            if lost > 0 {
                println!(
                    "{} {} record(s) could not be fetched; see warnings above",
                    "⚠".yellow(),
                    lost
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ResourceKind, Stage};
    use std::path::PathBuf;

    #[test]
    fn test_row_for_written_exclusions() {
        let outcome = ExportOutcome {
            kind: ResourceKind::Exclusions,
            status: ExportStatus::Written {
                path: PathBuf::from("out/crowdstrike_exclusions_Acme.xlsx"),
                sheets: 2,
            },
            listed: 5,
            requested: 5,
            hydrated: 4,
            failed_ids: 1,
        };

        let row = OutcomeRow::from(&outcome);

        assert_eq!(row.kind, "exclusions");
        assert_eq!(row.status, "written");
        assert_eq!(row.hydrated, "4/5");
        assert!(row.result.ends_with("(2 sheets)"));
    }

    #[test]
    fn test_row_for_failure_names_stage() {
        let outcome = ExportOutcome {
            kind: ResourceKind::Iocs,
            status: ExportStatus::Failed {
                stage: Stage::Listing,
                error: "Unexpected status 500".to_string(),
            },
            listed: 0,
            requested: 0,
            hydrated: 0,
            failed_ids: 0,
        };

        let row = OutcomeRow::from(&outcome);

        assert_eq!(row.status, "failed (listing)");
        assert_eq!(row.hydrated, "-");
        assert_eq!(row.result, "Unexpected status 500");
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = ExportOutcome {
            kind: ResourceKind::SensorUpdate,
            status: ExportStatus::Empty,
            listed: 0,
            requested: 0,
            hydrated: 0,
            failed_ids: 0,
        };

        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["kind"], "sensor-update");
        assert_eq!(value["status"], "empty");
    }
}
