use crate::monitor::{DriftOutcome, MonitorContext, SkipReason};

pub async fn run(monitor: &MonitorContext) {
    match monitor.drift_tick().await {
        DriftOutcome::Drifted {
            score,
            wilting_alert,
        } => tracing::debug!(score, wilting_alert, "drift_tick: drifted"),
        DriftOutcome::Skipped(SkipReason::LiveFeed) => {
            tracing::trace!("drift_tick: live feed active, skipped")
        }
        DriftOutcome::Skipped(reason) => tracing::trace!(?reason, "drift_tick: skipped"),
    }
}
