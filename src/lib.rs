//! Translator Client - Async Rust client for a cloud machine-translation service
//!
//! This library marshals translate and batch-translation calls into JSON/HTTP
//! requests, attaches authentication, and exposes a long-running-operation
//! handle plus lazy pagination over the service's list routes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core;

// Re-export key types for convenience
pub use crate::core::{
    client::TranslatorClient,
    config::{ApiVersion, Credential, TranslatorConfig},
    errors::TranslatorError,
    models::{
        BatchInput, BatchJobState, BatchSubmissionRequest, DocumentFilter, DocumentStatus,
        Glossary, JobStatus, SourceInput, StatusSummary, StorageSource, StorageType,
        TargetInput, TranslateOptions, TranslateResult,
    },
    operation::{BatchOperation, PollOptions},
    paging::{Page, PageCursor, PageFetcher, Paginator},
    transport::{HttpRequest, HttpResponse, Method, Pipeline, Transport},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
