//! Reporting channel for values the converter could not cast.
//!
//! Conversion failures never propagate as errors. Each one is handed to a
//! [`DiagnosticSink`] and the raw string is kept in its place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::type_tag::TypeTag;
use crate::error::ConversionError;

/// One value that fell back to its raw string.
#[derive(Debug)]
pub struct ConversionFailure {
    pub type_tag: TypeTag,
    pub value: String,
    pub error: ConversionError,
}

pub trait DiagnosticSink: Send + Sync {
    fn conversion_failed(&self, failure: &ConversionFailure);
}

/// Emits a `warn` event per failure. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn conversion_failed(&self, failure: &ConversionFailure) {
        warn!(
            type_tag = %failure.type_tag,
            value = %failure.value,
            error = %failure.error,
            "Could not convert cell, keeping raw value"
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn conversion_failed(&self, _failure: &ConversionFailure) {}
}

/// Keeps every failure in memory for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    failures: Mutex<Vec<(TypeTag, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(type_tag, value)` of every failure seen so far, in arrival order.
    pub fn failures(&self) -> Vec<(TypeTag, String)> {
        match self.failures.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.failures().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn conversion_failed(&self, failure: &ConversionFailure) {
        let entry = (failure.type_tag.clone(), failure.value.clone());
        match self.failures.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

/// Counts failures, then forwards them to an inner sink.
pub struct CountingSink {
    count: AtomicU64,
    inner: Arc<dyn DiagnosticSink>,
}

impl CountingSink {
    pub fn new(inner: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            count: AtomicU64::new(0),
            inner,
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl DiagnosticSink for CountingSink {
    fn conversion_failed(&self, failure: &ConversionFailure) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.inner.conversion_failed(failure);
    }
}
