//! Session counters and summary reporting for screening runs

use std::collections::HashMap;

use tracing::info;

use crate::types::FraudSignal;

/// Counters accumulated over one screening session
#[derive(Debug, Default)]
pub struct SessionMetrics {
    /// History records ingested
    pub ingested: u64,
    /// Alerts raised by the heuristics pass
    pub alerts: u64,
    /// Alert counts by signal
    signal_counts: HashMap<String, u64>,
    /// Candidates scored by the classifier
    classified: u64,
    /// Candidates the classifier called fraud
    classified_fraud: u64,
    /// Candidates screened by the rule fallback
    screened: u64,
    /// Fallback candidates with at least one signal
    screened_suspicious: u64,
    /// Fraud probability distribution buckets
    probability_buckets: [u64; 10],
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one ingested history record
    pub fn record_ingested(&mut self) {
        self.ingested += 1;
    }

    /// Record an alert and the signals behind it
    pub fn record_alert(&mut self, signals: &[FraudSignal]) {
        self.alerts += 1;
        for signal in signals {
            *self
                .signal_counts
                .entry(signal.name().to_string())
                .or_insert(0) += 1;
        }
    }

    /// Record a classifier verdict on a candidate
    pub fn record_prediction(&mut self, fraud_probability: f64, is_fraud: bool) {
        self.classified += 1;
        if is_fraud {
            self.classified_fraud += 1;
        }
        let bucket = (fraud_probability * 10.0).min(9.0) as usize;
        self.probability_buckets[bucket] += 1;
    }

    /// Record a fallback screen verdict on a candidate
    pub fn record_screen(&mut self, suspicious: bool) {
        self.screened += 1;
        if suspicious {
            self.screened_suspicious += 1;
        }
    }

    /// Share of ingested records that raised an alert
    pub fn alert_rate(&self) -> f64 {
        if self.ingested > 0 {
            self.alerts as f64 / self.ingested as f64
        } else {
            0.0
        }
    }

    /// Log the end-of-session summary
    pub fn print_summary(&self) {
        info!("══════════ SCREENING SESSION SUMMARY ══════════");
        info!(
            "History: {} records ingested, {} alerts ({:.1}%)",
            self.ingested,
            self.alerts,
            self.alert_rate() * 100.0
        );
        if !self.signal_counts.is_empty() {
            info!("Alerts by signal:");
            for (signal, count) in &self.signal_counts {
                let pct = (*count as f64 / self.alerts as f64) * 100.0;
                info!("  {:18}: {:>4} ({:>5.1}%)", signal, count, pct);
            }
        }
        if self.classified > 0 {
            info!(
                "Classifier: {} candidates scored, {} called fraud",
                self.classified, self.classified_fraud
            );
            info!("Fraud probability distribution:");
            for (i, &count) in self.probability_buckets.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let pct = (count as f64 / self.classified as f64) * 100.0;
                let bar = "█".repeat(((pct / 5.0) as usize).min(20));
                info!(
                    "  {:.1}-{:.1}: {:>4} ({:>5.1}%) {}",
                    i as f64 / 10.0,
                    (i + 1) as f64 / 10.0,
                    count,
                    pct,
                    bar
                );
            }
        }
        if self.screened > 0 {
            info!(
                "Fallback screen: {} candidates, {} suspicious",
                self.screened, self.screened_suspicious
            );
        }
        info!("═══════════════════════════════════════════════");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let mut metrics = SessionMetrics::new();

        metrics.record_ingested();
        metrics.record_ingested();
        metrics.record_alert(&[FraudSignal::OddHour, FraudSignal::BurstFrequency]);
        metrics.record_prediction(0.82, true);
        metrics.record_prediction(0.1, false);

        assert_eq!(metrics.ingested, 2);
        assert_eq!(metrics.alerts, 1);
        assert!((metrics.alert_rate() - 0.5).abs() < 1e-9);
        assert_eq!(metrics.signal_counts.get("odd_hour"), Some(&1));
        assert_eq!(metrics.probability_buckets[8], 1);
        assert_eq!(metrics.probability_buckets[1], 1);
        assert_eq!(metrics.classified_fraud, 1);
    }

    #[test]
    fn test_alert_rate_with_no_history() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.alert_rate(), 0.0);
    }
}
