//! Indexing pipeline around the motif extractor: upstream game source,
//! job queue, stores, the worker and the request controllers.

pub mod config;
pub mod controllers;
pub mod error;
pub mod model;
pub mod queue;
pub mod result_mapper;
pub mod retention;
pub mod source;
pub mod store;
pub mod worker;

pub use error::{ControllerError, WorkerError};
pub use worker::{IndexWorker, ProcessOutcome};
