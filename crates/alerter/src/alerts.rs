use events::{AlertRecord, ItemAssessment};

/// Decides whether an assessment deserves an alert.
///
/// An alert is raised when the severity moved since the previous cycle or a
/// trend was detected this cycle. The very first assessment of an item only
/// alerts when it already needs attention, so a fresh watch list of healthy
/// items stays quiet.
pub fn alert_for(assessment: &ItemAssessment) -> Option<AlertRecord> {
    let new_trend = assessment.trend.as_ref().filter(|_| assessment.trend_is_new);

    let message = match assessment.previous_severity {
        None if !assessment.severity.needs_attention() && new_trend.is_none() => return None,
        None => format!(
            "{} on first check: {}",
            assessment.severity,
            assessment.reason.describe()
        ),
        Some(previous) if previous != assessment.severity => format!(
            "{previous} -> {}: {}",
            assessment.severity,
            assessment.reason.describe()
        ),
        Some(_) if new_trend.is_some() => format!(
            "still {}: {}",
            assessment.severity,
            assessment.reason.describe()
        ),
        Some(_) => return None,
    };

    let message = match new_trend {
        Some(trend) => format!("{message} ({}: {})", trend.kind, trend.message),
        None => message,
    };

    Some(AlertRecord {
        item_id: assessment.item_id.clone(),
        severity: assessment.severity,
        previous_severity: assessment.previous_severity,
        reason: assessment.reason,
        message,
        event_time: assessment.event_time,
        raised_at: assessment.assessed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assessment, at};
    use core_types::{SeverityLevel, TrendKind, TrendSignal};

    fn with_trend(mut a: ItemAssessment, is_new: bool) -> ItemAssessment {
        a.trend = Some(TrendSignal {
            item_id: a.item_id.clone(),
            kind: TrendKind::CompetitorSurge,
            message: "competitors rose from 2 to 6".to_string(),
            timestamp: at(0),
        });
        a.trend_is_new = is_new;
        a
    }

    #[test]
    fn healthy_first_check_is_quiet() {
        assert!(alert_for(&assessment("A", SeverityLevel::Good, 0)).is_none());
    }

    #[test]
    fn troubled_first_check_alerts() {
        let alert = alert_for(&assessment("A", SeverityLevel::High, 0)).unwrap();
        assert_eq!(alert.severity, SeverityLevel::High);
        assert_eq!(alert.previous_severity, None);
        assert!(alert.message.starts_with("high on first check"));
    }

    #[test]
    fn severity_change_alerts() {
        let mut a = assessment("A", SeverityLevel::Warning, 0);
        a.previous_severity = Some(SeverityLevel::Good);
        let alert = alert_for(&a).unwrap();
        assert!(alert.message.starts_with("good -> warning"));
    }

    #[test]
    fn unchanged_severity_is_quiet() {
        let mut a = assessment("A", SeverityLevel::Critical, 0);
        a.previous_severity = Some(SeverityLevel::Critical);
        assert!(alert_for(&a).is_none());
    }

    #[test]
    fn fresh_trend_alerts_without_a_level_change() {
        let mut a = assessment("A", SeverityLevel::High, 0);
        a.previous_severity = Some(SeverityLevel::High);

        let alert = alert_for(&with_trend(a.clone(), true)).unwrap();
        assert!(alert.message.contains("competitor_surge"));

        assert!(alert_for(&with_trend(a, false)).is_none());
    }
}
