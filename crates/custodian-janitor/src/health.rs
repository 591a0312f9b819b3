//! Health check derived from a cleaner's recent delete errors

use crate::format::human_duration;
use crate::DirectoryCleaner;
use chrono::{SecondsFormat, Utc};
use custodian_health::{BoxError, HealthCheck, HealthResult};
use std::sync::Arc;
use std::time::Duration;

/// Unhealthy while any retained delete error falls inside the warning window
///
/// Only reads state the cleaner has already collected, so evaluation is
/// cheap and does no I/O.
///
/// Messages look like:
///
/// ```text
/// No delete errors in last 1 hour (12 total errors since 2026-10-19T08:00:00.000Z)
/// 3 delete error(s) in last 1 hour (12 total errors since 2026-10-19T08:00:00.000Z)
/// ```
pub struct CleanerHealthCheck {
    cleaner: Arc<DirectoryCleaner>,
    warning_window: Duration,
}

impl CleanerHealthCheck {
    /// Check `cleaner`, looking back over `warning_window`
    pub fn new(cleaner: Arc<DirectoryCleaner>, warning_window: Duration) -> Self {
        Self {
            cleaner,
            warning_window,
        }
    }

    /// Look-back window
    pub fn warning_window(&self) -> Duration {
        self.warning_window
    }

    /// Evaluate the cleaner's recent errors into a verdict
    pub fn evaluate(&self) -> HealthResult {
        let window = chrono::Duration::from_std(self.warning_window)
            .unwrap_or(chrono::Duration::MAX);
        let cutoff = Utc::now()
            .checked_sub_signed(window)
            .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);

        let recent = self
            .cleaner
            .recent_errors()
            .iter()
            .filter(|e| e.timestamp() >= cutoff)
            .count();

        let totals = format!(
            "({} total errors since {})",
            self.cleaner.total_error_count(),
            self.cleaner
                .started_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        let window = human_duration(self.warning_window);

        if recent == 0 {
            HealthResult::healthy_with_message(format!(
                "No delete errors in last {} {}",
                window, totals
            ))
        } else {
            HealthResult::unhealthy(format!(
                "{} delete error(s) in last {} {}",
                recent, window, totals
            ))
        }
    }
}

impl HealthCheck for CleanerHealthCheck {
    fn check(&self) -> Result<HealthResult, BoxError> {
        Ok(self.evaluate())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::DeleteError;
    use proptest::prelude::*;

    proptest! {
        /// Property: healthy iff no retained error falls inside the window
        #[test]
        fn test_verdict_matches_errors_in_window(
            window_secs in 1u64..100_000,
            ages in prop::collection::vec(0u64..200_000, 0..40),
        ) {
            // the clock moves between recording and evaluating
            prop_assume!(ages.iter().all(|age| age.abs_diff(window_secs) > 2));

            let cleaner = Arc::new(
                DirectoryCleaner::new("/var/tmp/uploads", Duration::ZERO)
                    .unwrap()
                    .with_max_recent_errors(64),
            );
            let now = Utc::now();
            for age in &ages {
                let age = chrono::Duration::seconds(*age as i64);
                cleaner.record_error(DeleteError::from_path("/var/tmp/uploads/locked").with_timestamp(now - age));
            }

            let result = CleanerHealthCheck::new(cleaner, Duration::from_secs(window_secs)).evaluate();
            let in_window = ages.iter().filter(|age| **age < window_secs).count();
            let message = result.message().unwrap();

            prop_assert_eq!(result.is_healthy(), in_window == 0);
            if in_window == 0 {
                prop_assert!(message.starts_with("No delete errors in last"), "{}", message);
            } else {
                let prefix = format!("{} delete error(s) in last", in_window);
                prop_assert!(message.starts_with(&prefix), "{}", message);
            }
            let totals = format!("({} total errors since", ages.len());
            prop_assert!(message.contains(&totals), "{}", message);
        }
    }
}
