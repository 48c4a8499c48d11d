//! Operational counters, mirroring `apps/twzrd-aggregator-rs`'s
//! `install_metrics` pattern.

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub fn install() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("install metrics recorder");

    describe_counter!("relayer_batches_submitted_total", "Claim batches submitted to the chain");
    describe_counter!("relayer_claims_confirmed_total", "Claims that reached the confirmed state");
    describe_counter!("relayer_claims_failed_total", "Claims that reached the failed state");
    describe_counter!(
        "relayer_reconciliation_hits_total",
        "Claims found already-claimed on-chain during reconciliation"
    );

    handle
}

pub fn batch_submitted() {
    counter!("relayer_batches_submitted_total").increment(1);
}

pub fn claims_confirmed(n: u64) {
    counter!("relayer_claims_confirmed_total").increment(n);
}

pub fn claims_failed(n: u64) {
    counter!("relayer_claims_failed_total").increment(n);
}

pub fn reconciliation_hit() {
    counter!("relayer_reconciliation_hits_total").increment(1);
}
