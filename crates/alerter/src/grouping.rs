use core_types::SeverityLevel;
use events::ItemAssessment;
use serde::Serialize;
use std::collections::BTreeMap;

/// All items currently at one severity level, newest event first.
#[derive(Debug, Clone, Serialize)]
pub struct SeverityGroup<'a> {
    pub severity: SeverityLevel,
    pub items: Vec<&'a ItemAssessment>,
}

/// Groups assessments by severity, critical first.
///
/// Levels with no items are omitted, so empty input yields no groups. Within
/// a group items are ordered by event time descending, then by item id so the
/// output is deterministic.
pub fn group_by_severity<'a, I>(assessments: I) -> Vec<SeverityGroup<'a>>
where
    I: IntoIterator<Item = &'a ItemAssessment>,
{
    let mut buckets: BTreeMap<SeverityLevel, Vec<&'a ItemAssessment>> = BTreeMap::new();
    for assessment in assessments {
        buckets.entry(assessment.severity).or_default().push(assessment);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(severity, mut items)| {
            items.sort_by(|a, b| {
                b.event_time
                    .cmp(&a.event_time)
                    .then_with(|| a.item_id.cmp(&b.item_id))
            });
            SeverityGroup { severity, items }
        })
        .collect()
}

/// Item counts per severity level for summary display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub high: usize,
    pub warning: usize,
    pub stable: usize,
    pub good: usize,
}

impl SeveritySummary {
    pub fn from_assessments<'a, I>(assessments: I) -> Self
    where
        I: IntoIterator<Item = &'a ItemAssessment>,
    {
        let mut summary = Self::default();
        for assessment in assessments {
            *summary.slot(assessment.severity) += 1;
        }
        summary
    }

    pub fn count(&self, level: SeverityLevel) -> usize {
        match level {
            SeverityLevel::Critical => self.critical,
            SeverityLevel::High => self.high,
            SeverityLevel::Warning => self.warning,
            SeverityLevel::Stable => self.stable,
            SeverityLevel::Good => self.good,
        }
    }

    pub fn total(&self) -> usize {
        SeverityLevel::BY_PRIORITY.iter().map(|l| self.count(*l)).sum()
    }

    /// Items at warning or above.
    pub fn needing_attention(&self) -> usize {
        self.critical + self.high + self.warning
    }

    fn slot(&mut self, level: SeverityLevel) -> &mut usize {
        match level {
            SeverityLevel::Critical => &mut self.critical,
            SeverityLevel::High => &mut self.high,
            SeverityLevel::Warning => &mut self.warning,
            SeverityLevel::Stable => &mut self.stable,
            SeverityLevel::Good => &mut self.good,
        }
    }
}
