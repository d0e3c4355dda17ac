// storelink/core/src/lib.rs

//! storelink-flow: small async step pipelines with shared, lockable context.
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step can carry
//! `before`, `on` and `after` hooks, may be optional, and may be skipped by a
//! predicate evaluated against the context right before it runs. Hooks return
//! [`PipelineControl::Continue`] to move on or [`PipelineControl::Stop`] to end
//! the run early with [`PipelineResult::Stopped`]; an `Err` aborts the run and is
//! returned to the caller unchanged.
//!
//! The [`Registry`] stores pipelines keyed by the type of data they operate on,
//! so callers only need to build a [`ContextData`] and hand it over.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

// --- Public API ---

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{Handler, Phase, SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Registry;
