//! Pipeline driver
//!
//! Assembles the stage chain and serializer, spawns one task per stage, and
//! connects them with bounded channels. The channel capacity is the whole
//! backpressure story: with the default capacity of one, no stage accepts a
//! new record until its previous output has been taken downstream.

use std::sync::Arc;

use sift_record::EventRecord;
use sift_stage::{
    Chain, FilterConfig, FilterStage, RenderConfig, SafeJson, Stage, StageConfig, StageRegistry,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::metrics::{PipelineMetrics, PipelineMetricsHandle, PipelineSnapshot};
use crate::Result;

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;

/// Default capacity of the channels between stages
///
/// One slot per hop is the one-in-one-out flow-control discipline: it keeps
/// a slow sink from growing an unbounded buffer inside the pipeline.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

/// An assembled, not-yet-running pipeline
pub struct Pipeline {
    chain: Chain,
    render: SafeJson,
    capacity: usize,
    metrics: Arc<PipelineMetrics>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Start building a pipeline
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Build a pipeline from declarative stage configuration
    ///
    /// Each entry names a registered stage type and its configuration map.
    /// Construction fails on the first misconfigured stage.
    pub fn from_stage_configs(
        stages: &[(String, StageConfig)],
        registry: &StageRegistry,
        render: RenderConfig,
    ) -> Result<Self> {
        let mut built: Vec<Box<dyn Stage>> = Vec::with_capacity(stages.len());
        for (type_name, config) in stages {
            built.push(registry.build(type_name, config)?);
        }
        Ok(Self::builder().stages(built).render(render).build())
    }

    /// Get a metrics handle that stays valid after `spawn()`
    pub fn metrics_handle(&self) -> PipelineMetricsHandle {
        PipelineMetricsHandle::new(Arc::clone(&self.metrics))
    }

    /// Spawn the stage tasks and start consuming `input`
    ///
    /// Records flow until the producer drops its sender; the output stream
    /// then ends once in-flight records have drained. A dropped record never
    /// ends the stream early.
    pub fn spawn(self, input: mpsc::Receiver<EventRecord>) -> PipelineHandle {
        let (forwarded_tx, forwarded_rx) = mpsc::channel::<EventRecord>(self.capacity);
        let (chunk_tx, chunk_rx) = mpsc::channel::<String>(self.capacity);

        tracing::info!(
            stages = ?self.chain.names(),
            capacity = self.capacity,
            "pipeline starting"
        );

        let chain = self.chain;
        let chain_metrics = Arc::clone(&self.metrics);
        let chain_task = tokio::spawn(async move {
            let mut input = input;
            while let Some(record) = input.recv().await {
                chain_metrics.record_received();
                match chain.apply(record).await {
                    Ok(Some(forwarded)) => {
                        chain_metrics.record_forwarded();
                        if forwarded_tx.send(forwarded).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => chain_metrics.record_dropped(),
                    Err(error) => {
                        // Stages are designed not to fail mid-stream; if one
                        // does, the record is dropped and the stream lives on
                        tracing::warn!(%error, "stage failed, record dropped");
                        chain_metrics.record_dropped();
                    }
                }
            }
        });

        let render = self.render;
        let render_metrics = Arc::clone(&self.metrics);
        let render_task = tokio::spawn(async move {
            let mut forwarded_rx = forwarded_rx;
            while let Some(record) = forwarded_rx.recv().await {
                let chunk = render.render_record(&record);
                render_metrics.record_chunk(chunk.len() as u64);
                if chunk_tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });

        PipelineHandle {
            output: chunk_rx,
            metrics: self.metrics,
            tasks: vec![chain_task, render_task],
        }
    }
}

/// Builder for [`Pipeline`]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
    render: RenderConfig,
    capacity: usize,
}

impl PipelineBuilder {
    fn new() -> Self {
        Self {
            stages: Vec::new(),
            render: RenderConfig::default(),
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Append a stage to the chain
    pub fn stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append several stages to the chain
    pub fn stages(mut self, stages: Vec<Box<dyn Stage>>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Append a filter stage built from the given subscription config
    pub fn filter(self, config: FilterConfig) -> Self {
        self.stage(Box::new(FilterStage::new(config)))
    }

    /// Configure the serializer
    pub fn render(mut self, config: RenderConfig) -> Self {
        self.render = config;
        self
    }

    /// Set the capacity of the channels between stages (minimum 1)
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Assemble the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            chain: Chain::new(self.stages),
            render: SafeJson::new(self.render),
            capacity: self.capacity,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running pipeline
///
/// Receives the serialized chunks and owns the stage tasks.
pub struct PipelineHandle {
    output: mpsc::Receiver<String>,
    metrics: Arc<PipelineMetrics>,
    tasks: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Receive the next chunk
    ///
    /// Returns `None` once the producer has closed the input and every
    /// in-flight record has drained.
    pub async fn recv(&mut self) -> Option<String> {
        self.output.recv().await
    }

    /// Get a point-in-time metrics snapshot
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.metrics.snapshot()
    }

    /// Wait for the stage tasks to finish and return the final metrics
    ///
    /// Call after the input is closed. Unconsumed chunks are discarded.
    pub async fn join(self) -> PipelineSnapshot {
        drop(self.output);
        for task in self.tasks {
            let _ = task.await;
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            records = snapshot.records_received,
            forwarded = snapshot.records_forwarded,
            dropped = snapshot.records_dropped,
            chunks = snapshot.chunks_emitted,
            "pipeline shut down"
        );
        snapshot
    }
}
