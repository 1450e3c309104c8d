//! Backend execution orchestrator.
//!
//! Spawns one external AI backend process per run, wires its stdout
//! through the streaming pipeline (`maestro-stream`), and composes the
//! single-task primitive into three higher-order strategies:
//!
//! - [`BackendOrchestrator::run_fallback`]: try backends in order until
//!   one succeeds
//! - [`BackendOrchestrator::run_parallel`]: fan the same prompt out to
//!   several backends concurrently
//! - [`BackendOrchestrator::run_pipeline`]: run stages sequentially,
//!   optionally feeding each stage's output into the next prompt
//!
//! Task results carry metadata only; observable bytes flow through the
//! caller's sink, never through the result (the pipeline capture sink is
//! the single sanctioned exception).

pub mod orchestrator;
pub mod result;

mod spawn;

pub use orchestrator::BackendOrchestrator;
pub use orchestrator::PipelineStage;
pub use orchestrator::SinkFactory;
pub use orchestrator::TaskOptions;
pub use result::ParallelResult;
pub use result::PipelineResult;
pub use result::TaskResult;
