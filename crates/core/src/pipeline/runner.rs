//! Pipeline runner implementation.
//!
//! The run is a straight-line four-step chain with one binary branch
//! (reuse-or-compute) at each of the first two steps. There is no retry, no
//! rollback, and no partial result: the first failure aborts everything.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::apdb::Apdb;
use crate::config::{validate_config, PipelineConfig};
use crate::exposure::ExposureRef;
use crate::metrics;
use crate::repository::{Artifact, DatasetKind, DatasetRef, Repository};
use crate::stages::{
    AssociationResult, Associator, CcdProcessor, DifferenceResult, Differencer,
    ForcedPhotometer, ForcedSourceCatalog, ProcessedExposure, RawExposure, StageError,
};

use super::types::{PipelineError, RunResult, StageKind, StageOutcome};

/// The pipeline orchestrator.
///
/// Holds the validated run configuration and the five collaborators it
/// drives: the artifact repository and the four stage capabilities. It keeps
/// no state between runs; `run` may be invoked concurrently for distinct
/// exposures.
pub struct DiaPipeline {
    config: PipelineConfig,
    repository: Arc<dyn Repository>,
    ccd_processor: Arc<dyn CcdProcessor>,
    differencer: Arc<dyn Differencer>,
    associator: Arc<dyn Associator>,
    forced_photometer: Arc<dyn ForcedPhotometer>,
}

impl DiaPipeline {
    /// Creates a pipeline over the given collaborators.
    ///
    /// Validates `config` up front, so a malformed configuration is rejected
    /// before any run can start.
    pub fn new(
        config: PipelineConfig,
        repository: Arc<dyn Repository>,
        ccd_processor: Arc<dyn CcdProcessor>,
        differencer: Arc<dyn Differencer>,
        associator: Arc<dyn Associator>,
        forced_photometer: Arc<dyn ForcedPhotometer>,
    ) -> Result<Self, PipelineError> {
        validate_config(&config)?;

        Ok(Self {
            config,
            repository,
            ccd_processor,
            differencer,
            associator,
            forced_photometer,
        })
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the full pipeline over one exposure.
    ///
    /// With `reuse` set, the instrumental-processing and differencing stages
    /// are skipped when their persisted outputs already exist; the loaded
    /// outputs are flagged [`Provenance::Reused`](super::Provenance) in the
    /// result. Association and forced photometry always execute once
    /// reached, regardless of `reuse`.
    pub async fn run(
        &self,
        exposure: ExposureRef,
        reuse: bool,
    ) -> Result<RunResult, PipelineError> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let start = Instant::now();

        metrics::RUNS_STARTED.inc();
        info!("Run {} started for {} (reuse={})", run_id, exposure, reuse);

        let result = self.run_stages(&run_id, exposure, reuse).await;
        let duration = start.elapsed();

        match result {
            Ok((processed, difference, association, forced)) => {
                metrics::RUNS_TOTAL.with_label_values(&["success"]).inc();
                metrics::RUN_DURATION
                    .with_label_values(&["success"])
                    .observe(duration.as_secs_f64());
                info!(
                    "Run {} completed for {} in {} ms",
                    run_id,
                    exposure,
                    duration.as_millis()
                );

                Ok(RunResult {
                    run_id,
                    exposure,
                    started_at,
                    duration_ms: duration.as_millis() as u64,
                    processed: Some(processed),
                    difference: Some(difference),
                    association: Some(association),
                    forced: Some(forced),
                })
            }
            Err(e) => {
                metrics::RUNS_TOTAL.with_label_values(&["failed"]).inc();
                metrics::RUN_DURATION
                    .with_label_values(&["failed"])
                    .observe(duration.as_secs_f64());
                error!("Run {} failed for {}: {}", run_id, exposure, e);

                Err(e)
            }
        }
    }

    /// Executes the four-stage chain, returning the per-stage outcomes.
    #[allow(clippy::type_complexity)]
    async fn run_stages(
        &self,
        run_id: &str,
        exposure: ExposureRef,
        reuse: bool,
    ) -> Result<
        (
            StageOutcome<ProcessedExposure>,
            StageOutcome<DifferenceResult>,
            StageOutcome<AssociationResult>,
            StageOutcome<ForcedSourceCatalog>,
        ),
        PipelineError,
    > {
        // Resolve the raw input before any stage runs.
        let raw_ref = DatasetRef::new(DatasetKind::Raw, exposure);
        let raw: RawExposure = self
            .repository
            .resolve(&raw_ref)
            .await
            .and_then(|artifact| artifact.decode())
            .map_err(|source| PipelineError::Resolution { exposure, source })?;

        // Stage 1: instrumental processing (reuse-or-compute).
        let calexp_ref = DatasetRef::new(DatasetKind::Calexp, exposure);
        let processed = if reuse && self.repository.exists(&calexp_ref).await {
            debug!("Run {}: reusing existing {}", run_id, calexp_ref);
            self.load_reused(run_id, StageKind::CcdProcessing, &calexp_ref)
                .await?
        } else {
            let stage_start = Instant::now();
            let output = self
                .ccd_processor
                .process(&raw, &self.config.ccd_processing)
                .await
                .map_err(|e| self.stage_failed(StageKind::CcdProcessing, exposure, e))?;
            self.finish_stage(run_id, StageKind::CcdProcessing, stage_start);
            self.persist(StageKind::CcdProcessing, &calexp_ref, &output)
                .await?;
            StageOutcome::computed(output)
        };

        // Stage 2: differencing (reuse-or-compute).
        let difference_ref = DatasetRef::new(DatasetKind::Difference, exposure);
        let difference = if reuse && self.repository.exists(&difference_ref).await {
            debug!("Run {}: reusing existing {}", run_id, difference_ref);
            self.load_reused(run_id, StageKind::Differencing, &difference_ref)
                .await?
        } else {
            let stage_start = Instant::now();
            let output = self
                .differencer
                .difference(&processed.output, &self.config.differencing)
                .await
                .map_err(|e| self.stage_failed(StageKind::Differencing, exposure, e))?;
            self.finish_stage(run_id, StageKind::Differencing, stage_start);
            self.persist(StageKind::Differencing, &difference_ref, &output)
                .await?;
            StageOutcome::computed(output)
        };

        // Stage 3: association. Never reused: it mutates the APDB, so the
        // call is made on every run that reaches it.
        let stage_start = Instant::now();
        let apdb = Apdb::connect(&self.config.apdb)
            .and_then(|apdb| {
                apdb.verify()?;
                Ok(apdb)
            })
            .map_err(|e| self.stage_failed(StageKind::Association, exposure, e.into()))?;
        let association = self
            .associator
            .associate(&difference.output.sources, &apdb, &self.config.association)
            .await
            .map_err(|e| self.stage_failed(StageKind::Association, exposure, e))?;
        self.finish_stage(run_id, StageKind::Association, stage_start);
        let objects_ref = DatasetRef::new(DatasetKind::DiaObjects, exposure);
        self.persist(StageKind::Association, &objects_ref, &association)
            .await?;
        let association = StageOutcome::computed(association);

        // Stage 4: forced photometry. Always a fresh measurement.
        let stage_start = Instant::now();
        let forced = self
            .forced_photometer
            .measure(
                &association.output.objects,
                &difference.output.image,
                &self.config.forced_photometry,
            )
            .await
            .map_err(|e| self.stage_failed(StageKind::ForcedPhotometry, exposure, e))?;
        self.finish_stage(run_id, StageKind::ForcedPhotometry, stage_start);
        let forced_ref = DatasetRef::new(DatasetKind::ForcedSources, exposure);
        self.persist(StageKind::ForcedPhotometry, &forced_ref, &forced)
            .await?;

        Ok((
            processed,
            difference,
            association,
            StageOutcome::computed(forced),
        ))
    }

    /// Loads a previously persisted stage output under reuse mode.
    async fn load_reused<T: DeserializeOwned>(
        &self,
        run_id: &str,
        stage: StageKind,
        dataset: &DatasetRef,
    ) -> Result<StageOutcome<T>, PipelineError> {
        let output = self
            .repository
            .resolve(dataset)
            .await
            .and_then(|artifact| artifact.decode())
            .map_err(|e| self.stage_failed(stage, dataset.exposure, StageError::Repository(e)))?;

        metrics::STAGE_REUSES.with_label_values(&[stage.as_str()]).inc();
        info!("Run {}: {} reused persisted output", run_id, stage);

        Ok(StageOutcome::reused(output))
    }

    /// Persists a stage output to the repository under its dataset reference.
    async fn persist<T: Serialize>(
        &self,
        stage: StageKind,
        dataset: &DatasetRef,
        output: &T,
    ) -> Result<(), PipelineError> {
        let artifact = Artifact::from_payload(*dataset, output)
            .map_err(|e| self.stage_failed(stage, dataset.exposure, StageError::Repository(e)))?;
        self.repository
            .persist(dataset, &artifact)
            .await
            .map_err(|e| self.stage_failed(stage, dataset.exposure, StageError::Repository(e)))
    }

    /// Records metrics and logging for a completed stage execution.
    fn finish_stage(&self, run_id: &str, stage: StageKind, started: Instant) {
        let elapsed = started.elapsed();
        metrics::STAGE_EXECUTIONS
            .with_label_values(&[stage.as_str()])
            .inc();
        metrics::STAGE_DURATION
            .with_label_values(&[stage.as_str()])
            .observe(elapsed.as_secs_f64());
        info!(
            "Run {}: {} completed in {} ms",
            run_id,
            stage,
            elapsed.as_millis()
        );
    }

    /// Records a stage failure and builds the attributed error.
    fn stage_failed(
        &self,
        stage: StageKind,
        exposure: ExposureRef,
        source: StageError,
    ) -> PipelineError {
        metrics::STAGE_FAILURES
            .with_label_values(&[stage.as_str()])
            .inc();
        PipelineError::stage(stage, exposure, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        MockAssociator, MockCcdProcessor, MockDifferencer, MockForcedPhotometer, MockRepository,
    };

    fn build_pipeline(config: PipelineConfig) -> Result<DiaPipeline, PipelineError> {
        DiaPipeline::new(
            config,
            Arc::new(MockRepository::new()),
            Arc::new(MockCcdProcessor::new()),
            Arc::new(MockDifferencer::new()),
            Arc::new(MockAssociator::new()),
            Arc::new(MockForcedPhotometer::new()),
        )
    }

    #[test]
    fn test_new_validates_config() {
        assert!(build_pipeline(PipelineConfig::default()).is_ok());

        let mut config = PipelineConfig::default();
        config.apdb.url = "postgresql://localhost/apdb".to_string();
        let result = build_pipeline(config);
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_run_fails_on_unresolvable_exposure() {
        let pipeline = build_pipeline(PipelineConfig::default()).unwrap();

        // Empty repository: the raw artifact cannot be resolved.
        let result = pipeline.run(ExposureRef::new(413635, 42), false).await;
        assert!(matches!(result, Err(PipelineError::Resolution { .. })));
    }
}
