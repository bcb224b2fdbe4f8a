use debtclear::payoff::DebtPlanner;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) use debtclear::payoff::calendar::parse_date;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) planner: Arc<DebtPlanner>,
}

/// Clap value parser for money amounts given on the command line.
pub(crate) fn parse_amount(raw: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .trim_start_matches(['£', '$'])
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{raw}' as an amount ({err})"))?;

    if !value.is_finite() || value < 0.0 {
        return Err(format!("'{raw}' must be a non-negative amount"));
    }
    Ok(value)
}

#[cfg(test)]
pub(crate) fn test_state(ready: bool) -> AppState {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let recorder = PrometheusBuilder::new().build_recorder();
    AppState {
        readiness: Arc::new(AtomicBool::new(ready)),
        metrics: Arc::new(recorder.handle()),
        planner: Arc::new(DebtPlanner::default()),
    }
}
