use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

// ============================================================================
// Metrics Module - Prometheus metrics for storage bootstrap
// ============================================================================
//
// Provides metrics for:
// - Provisioning calls against the document database (outcome, latency)
// - Event store registrations per bounded context
//
// The registry is owned here; the host application decides how to expose it.
// ============================================================================

pub struct StoreMetrics {
    registry: Registry,

    pub provisioning_requests: IntCounterVec,
    pub provisioning_duration: HistogramVec,
    pub stores_registered: IntCounterVec,
}

impl StoreMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let provisioning_requests = IntCounterVec::new(
            Opts::new(
                "event_store_provisioning_requests_total",
                "Create-if-not-exists calls made while provisioning storage",
            ),
            &["resource", "outcome"],
        )?;
        registry.register(Box::new(provisioning_requests.clone()))?;

        let provisioning_duration = HistogramVec::new(
            HistogramOpts::new(
                "event_store_provisioning_duration_seconds",
                "Latency of provisioning calls",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0]),
            &["resource"],
        )?;
        registry.register(Box::new(provisioning_duration.clone()))?;

        let stores_registered = IntCounterVec::new(
            Opts::new(
                "event_store_registrations_total",
                "Event stores registered per bounded context",
            ),
            &["bounded_context"],
        )?;
        registry.register(Box::new(stores_registered.clone()))?;

        Ok(Self {
            registry,
            provisioning_requests,
            provisioning_duration,
            stores_registered,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// `outcome` is `created`, `already_exists` or `failed`.
    pub fn record_provisioning(&self, resource: &str, outcome: &str, duration_secs: f64) {
        self.provisioning_requests.with_label_values(&[resource, outcome]).inc();
        self.provisioning_duration.with_label_values(&[resource]).observe(duration_secs);
    }

    pub fn record_registration(&self, bounded_context: &str) {
        self.stores_registered.with_label_values(&[bounded_context]).inc();
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for StoreMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreMetrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_provisioning() {
        let metrics = StoreMetrics::new().unwrap();
        metrics.record_provisioning("database", "created", 0.02);
        metrics.record_provisioning("collection", "already_exists", 0.01);

        let gathered = metrics.registry().gather();
        let requests = gathered
            .iter()
            .find(|m| m.name() == "event_store_provisioning_requests_total")
            .unwrap();
        assert_eq!(requests.metric.len(), 2); // Two label combinations
    }

    #[test]
    fn test_record_registration() {
        let metrics = StoreMetrics::new().unwrap();
        metrics.record_registration("Orders");
        metrics.record_registration("Orders");

        let gathered = metrics.registry().gather();
        let registered = gathered
            .iter()
            .find(|m| m.name() == "event_store_registrations_total")
            .unwrap();
        assert_eq!(registered.metric[0].counter.value, Some(2.0));
    }

    #[test]
    fn test_encode_text() {
        let metrics = StoreMetrics::new().unwrap();
        metrics.record_registration("Billing");

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("event_store_registrations_total{bounded_context=\"Billing\"} 1"));
    }
}
