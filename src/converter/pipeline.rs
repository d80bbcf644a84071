use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::{Converter, PandocConverter, Pdf2DocxConverter};
use crate::config::{ConverterConfig, SecondaryMode, SecondaryPolicy};
use crate::models::{ConversionReport, SecondaryOutcome, StagedUpload};
use crate::types::ConvertError;

/// Primary converter followed by an optional secondary pass.
#[derive(Clone)]
pub struct ConversionPipeline {
    primary: Arc<dyn Converter>,
    secondary: Option<Arc<dyn Converter>>,
    mode: SecondaryMode,
    policy: SecondaryPolicy,
}

impl ConversionPipeline {
    /// A pipeline that only runs `primary`.
    pub fn new(primary: Arc<dyn Converter>) -> Self {
        Self {
            primary,
            secondary: None,
            mode: SecondaryMode::Disabled,
            policy: SecondaryPolicy::BestEffort,
        }
    }

    pub fn with_secondary(
        mut self,
        secondary: Arc<dyn Converter>,
        mode: SecondaryMode,
        policy: SecondaryPolicy,
    ) -> Self {
        self.secondary = Some(secondary);
        self.mode = mode;
        self.policy = policy;
        self
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        let timeout = config.timeout();
        let primary = Arc::new(Pdf2DocxConverter::new(&config.pdf2docx_bin, timeout));
        let pipeline = Self::new(primary);

        if config.secondary_mode == SecondaryMode::Disabled {
            return pipeline;
        }

        pipeline.with_secondary(
            Arc::new(PandocConverter::new(&config.pandoc_bin, timeout)),
            config.secondary_mode,
            config.secondary_policy,
        )
    }

    pub fn mode(&self) -> SecondaryMode {
        self.mode
    }

    pub fn policy(&self) -> SecondaryPolicy {
        self.policy
    }

    /// Convert a staged upload. The returned report's `output_path` is the
    /// file to serve.
    pub async fn run(&self, staged: &StagedUpload) -> Result<ConversionReport, ConvertError> {
        let start = Instant::now();
        info!(
            conversion_id = %staged.id,
            filename = %staged.original_filename,
            primary = self.primary.name(),
            mode = %self.mode,
            "Starting conversion"
        );

        self.primary
            .convert(&staged.input_path, &staged.output_path)
            .await?;

        let secondary = self.run_secondary(staged).await?;

        let report = ConversionReport {
            conversion_id: staged.id,
            primary: self.primary.name().to_string(),
            output_path: staged.output_path.clone(),
            secondary,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            conversion_id = %staged.id,
            secondary = report.secondary.label(),
            duration_ms = report.duration_ms,
            "Conversion finished"
        );
        Ok(report)
    }

    async fn run_secondary(&self, staged: &StagedUpload) -> Result<SecondaryOutcome, ConvertError> {
        let secondary = match (&self.secondary, self.mode) {
            (Some(secondary), SecondaryMode::Overwrite | SecondaryMode::Sibling) => secondary,
            _ => return Ok(SecondaryOutcome::Skipped),
        };

        let target = match self.mode {
            SecondaryMode::Sibling => staged.sibling_output_path(),
            _ => staged.output_path.clone(),
        };

        match secondary.convert(&staged.input_path, &target).await {
            Ok(()) => Ok(SecondaryOutcome::Succeeded { path: target }),
            Err(e) => match self.policy {
                SecondaryPolicy::Required => Err(e),
                SecondaryPolicy::BestEffort => {
                    // In overwrite mode the primary output may already be
                    // truncated; the outcome is reported to the client.
                    warn!(
                        conversion_id = %staged.id,
                        tool = secondary.name(),
                        error = %e,
                        "Secondary conversion failed, serving primary output"
                    );
                    Ok(SecondaryOutcome::Failed {
                        message: e.to_string(),
                    })
                }
            },
        }
    }
}
