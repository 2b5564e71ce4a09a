// src/lib.rs

//! stepflow: small, typed, asynchronous step pipelines.
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step may carry `before`,
//! `on` and `after` handlers and an optional skip condition. Handlers receive a
//! shared [`ContextData`] and answer with a [`PipelineControl`]; a run ends
//! [`PipelineResult::Completed`], [`PipelineResult::Stopped`], or with the
//! pipeline's error type.
//!
//! Pipelines are usually registered once in a [`Registry`] keyed by their context
//! type and dispatched from request handlers:
//!
//! ```ignore
//! let registry = Registry::<AppError>::new();
//! registry.register_pipeline(checkout_pipeline());
//! let ctx = ContextData::new(CheckoutCtx::new(..));
//! match registry.run(ctx.clone()).await? {
//!   PipelineResult::Completed => { /* read results from ctx */ }
//!   PipelineResult::Stopped => { /* a handler halted the flow */ }
//! }
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Registry;
