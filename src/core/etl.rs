use crate::core::Pipeline;
use crate::domain::model::{Diagnostic, UnresolvedReason};
use crate::utils::error::Result;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output_path: String,
    pub halls: usize,
    pub games: usize,
    pub warnings: usize,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting hall directory run...");

        // Extract
        tracing::info!("Extracting sources...");
        let bundle = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted halls page ({} bytes) and {} schedule rows",
            bundle.halls_html.len(),
            bundle.schedule.len()
        );

        // Transform
        tracing::info!("Building hall directory...");
        let result = self.pipeline.transform(bundle).await?;
        let mut warnings = 0usize;
        for diagnostic in result.warnings() {
            warnings += 1;
            tracing::warn!("{}", describe(diagnostic));
        }
        let halls = result.directory.len();
        let games = result.merged_schedule.len();

        // Load
        tracing::info!("Writing outputs...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(RunReport {
            output_path,
            halls,
            games,
            warnings,
        })
    }
}

pub fn describe(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::StrategyChosen { classified, used } => {
            format!("Page classified as {}, extracted as {}", classified, used)
        }
        Diagnostic::NoRecordsExtracted => "No halls found on the page".to_string(),
        Diagnostic::DuplicateCode { code } => {
            format!("Hall {} listed more than once, later entry kept", code)
        }
        Diagnostic::UnresolvedAlias {
            code,
            target,
            reason,
        } => {
            let why = match reason {
                UnresolvedReason::TargetMissing => "target not in directory",
                UnresolvedReason::SelfReference => "refers to itself",
                UnresolvedReason::TargetIsAlias => "target is itself a reference",
            };
            format!("Reference hall {} -> {} dropped: {}", code, target, why)
        }
        Diagnostic::OverrideSkipped { index, reason } => {
            format!("Override entry {} skipped: {}", index, reason)
        }
        Diagnostic::OverrideFileMissing { path } => format!("Override file {} not found", path),
        Diagnostic::OverrideFileRejected { path, message } => {
            format!("Override file {} ignored: {}", path, message)
        }
    }
}
