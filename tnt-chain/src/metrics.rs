//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring operation
//! evaluation.
//!
//! # Metrics
//!
//! - `tnt_operations_applied_total` - Operations applied, by operation
//! - `tnt_operations_rejected_total` - Operations rejected, by operation
//! - `tnt_sink_chains_resolved_total` - Sink chains resolved during validation
//! - `tnt_sink_chain_length` - Histogram of resolved chain lengths

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use tnt_protocol::OperationTag;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Applied operations by tag
    pub operations_applied: IntCounterVec,

    /// Rejected operations by tag
    pub operations_rejected: IntCounterVec,

    /// Sink chains resolved
    pub sink_chains_resolved: IntCounter,

    /// Chain length histogram
    pub sink_chain_length: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector on a private registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let operations_applied = IntCounterVec::new(
            Opts::new("tnt_operations_applied_total", "Operations applied"),
            &["operation"],
        )?;
        registry.register(Box::new(operations_applied.clone()))?;

        let operations_rejected = IntCounterVec::new(
            Opts::new("tnt_operations_rejected_total", "Operations rejected"),
            &["operation"],
        )?;
        registry.register(Box::new(operations_rejected.clone()))?;

        let sink_chains_resolved = IntCounter::new(
            "tnt_sink_chains_resolved_total",
            "Sink chains resolved during validation",
        )?;
        registry.register(Box::new(sink_chains_resolved.clone()))?;

        let sink_chain_length = Histogram::with_opts(
            HistogramOpts::new("tnt_sink_chain_length", "Histogram of resolved chain lengths")
                .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 25.0, 50.0]),
        )?;
        registry.register(Box::new(sink_chain_length.clone()))?;

        Ok(Self {
            operations_applied,
            operations_rejected,
            sink_chains_resolved,
            sink_chain_length,
            registry,
        })
    }

    /// Record an applied operation
    pub fn record_applied(&self, tag: OperationTag) {
        self.operations_applied
            .with_label_values(&[&tag.to_string()])
            .inc();
    }

    /// Record a rejected operation
    pub fn record_rejected(&self, tag: OperationTag) {
        self.operations_rejected
            .with_label_values(&[&tag.to_string()])
            .inc();
    }

    /// Record a resolved sink chain
    pub fn record_sink_chain(&self, length: usize) {
        self.sink_chains_resolved.inc();
        self.sink_chain_length.observe(length as f64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("sink_chains_resolved", &self.sink_chains_resolved.get())
            .finish()
    }
}
