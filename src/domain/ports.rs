use crate::core::patterns::{PatternConfig, PatternLibrary};
use crate::core::schedule::ScheduleFilter;
use crate::domain::model::{ContentKind, HallRecord, SourceBundle, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use scraper::Html;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Where written files end up, for reporting.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    /// URL or local path of the halls page.
    fn halls_source(&self) -> &str;
    fn schedule_source(&self) -> Option<&str>;
    fn overrides_path(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn timeout_seconds(&self) -> u64;
    fn patterns(&self) -> &PatternConfig;

    fn schedule_filter(&self) -> ScheduleFilter {
        ScheduleFilter::default()
    }

    fn schedule_delimiter(&self) -> u8 {
        b','
    }

    /// Name of the ZIP archive when outputs are bundled.
    fn bundle_filename(&self) -> Option<&str> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceBundle>;
    async fn transform(&self, data: SourceBundle) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}

/// One way of reading hall records out of a page. Every strategy yields the
/// same record shape and never fails on a page without data.
pub trait ExtractionStrategy {
    fn kind(&self) -> ContentKind;
    fn extract(&self, document: &Html, patterns: &PatternLibrary) -> Vec<HallRecord>;
}
