// src/core/context.rs

//! The boxed handler type stored for every step phase.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// A step handler: takes a clone of the shared context and resolves to a control
/// signal or the pipeline's error.
///
/// Lock guards taken on the context must be dropped before the handler awaits.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;
