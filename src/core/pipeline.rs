use crate::adapters::http::SourceFetcher;
use crate::adapters::tabular::{bundle_zip, delimiter_for, read_schedule, render_outputs};
use crate::core::directory::build_directory;
use crate::core::patterns::PatternLibrary;
use crate::core::schedule::join_schedule;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{OverrideSource, SourceBundle, TransformResult};
use crate::utils::error::{HallError, Result};

/// Scrapes the halls page, applies overrides and joins the schedule.
pub struct HallPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    patterns: PatternLibrary,
    fetcher: SourceFetcher,
}

impl<S: Storage, C: ConfigProvider> HallPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let patterns = PatternLibrary::compile(config.patterns())?;
        let fetcher = SourceFetcher::new(config.timeout_seconds())?;
        Ok(Self {
            storage,
            config,
            patterns,
            fetcher,
        })
    }

    async fn read_overrides(&self) -> OverrideSource {
        let Some(path) = self.config.overrides_path() else {
            return OverrideSource::NotConfigured;
        };

        match tokio::fs::read_to_string(path).await {
            Ok(content) => OverrideSource::Loaded {
                path: path.to_string(),
                content,
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => OverrideSource::Missing {
                path: path.to_string(),
            },
            Err(e) => OverrideSource::Unreadable {
                path: path.to_string(),
                message: e.to_string(),
            },
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for HallPipeline<S, C> {
    async fn extract(&self) -> Result<SourceBundle> {
        let halls_source = self.config.halls_source();
        tracing::info!("Fetching halls page from {}", halls_source);
        let halls_html = self.fetcher.fetch_text(halls_source).await?;
        tracing::debug!("Halls page: {} bytes", halls_html.len());

        let schedule = match self.config.schedule_source() {
            Some(source) => {
                tracing::info!("Reading schedule from {}", source);
                let data = self.fetcher.fetch_bytes(source).await?;
                read_schedule(&data, delimiter_for(source, self.config.schedule_delimiter()))?
            }
            None => Vec::new(),
        };

        Ok(SourceBundle {
            halls_html,
            schedule,
            overrides: self.read_overrides().await,
        })
    }

    async fn transform(&self, data: SourceBundle) -> Result<TransformResult> {
        let SourceBundle {
            halls_html,
            schedule,
            overrides,
        } = data;
        let patterns = self.patterns.clone();
        let build = tokio::task::spawn_blocking(move || {
            build_directory(&halls_html, &overrides, &patterns)
        })
        .await
        .map_err(|e| HallError::ProcessingError {
            message: format!("directory build did not finish: {}", e),
        })?;
        tracing::info!("Hall directory has {} entries", build.records.len());

        let schedule = self.config.schedule_filter().apply(schedule);
        let merged_schedule = join_schedule(&schedule, &build.records, &self.patterns);

        Ok(TransformResult {
            directory: build.records,
            merged_schedule,
            diagnostics: build.diagnostics,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let include_schedule = self.config.schedule_source().is_some();
        let files = render_outputs(&result, self.config.output_formats(), include_schedule)?;

        if let Some(bundle) = self.config.bundle_filename() {
            tracing::debug!("Creating ZIP file with {} files", files.len());
            let zip_data = bundle_zip(&files)?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(bundle, &zip_data).await?;
            return Ok(self.storage.location(bundle));
        }

        for file in &files {
            self.storage.write_file(&file.name, &file.data).await?;
            tracing::info!("Wrote {}", self.storage.location(&file.name));
        }
        Ok(self.storage.location(""))
    }
}
