//! Dashboard buckets derived from workflow state and event end date.
//!
//! [`BUCKET_RULES`] is the single source of truth. [`classify`] walks it in
//! priority order for one snapshot and [`query_filter`] compiles it into an
//! [`EventPredicate`] for listing, so badge counts and paginated tabs agree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EventPredicate;
use crate::domains::calendar::models::{Event, EventSnapshot, WorkflowState};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DashboardBucket {
    RequiresAction,
    Pending,
    Published,
    Historic,
}

impl DashboardBucket {
    pub const ALL: [DashboardBucket; 4] = [
        DashboardBucket::RequiresAction,
        DashboardBucket::Pending,
        DashboardBucket::Published,
        DashboardBucket::Historic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardBucket::RequiresAction => "requires-action",
            DashboardBucket::Pending => "pending",
            DashboardBucket::Published => "published",
            DashboardBucket::Historic => "historic",
        }
    }
}

impl std::fmt::Display for DashboardBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DashboardBucket {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        DashboardBucket::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid dashboard bucket: {}", s))
    }
}

/// Condition half of a bucket rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCondition {
    /// The event ended before `now`.
    Ended,
    StateIn(&'static [WorkflowState]),
}

impl RuleCondition {
    fn matches(&self, snapshot: &EventSnapshot, now: DateTime<Utc>) -> bool {
        match self {
            RuleCondition::Ended => snapshot.end_date < now,
            RuleCondition::StateIn(states) => states.contains(&snapshot.workflow_state),
        }
    }

    fn to_predicate(self, now: DateTime<Utc>) -> EventPredicate {
        match self {
            RuleCondition::Ended => EventPredicate::EndedBefore(now),
            RuleCondition::StateIn(states) => EventPredicate::state_in(states),
        }
    }
}

/// Priority-ordered rules; the first match wins.
pub const BUCKET_RULES: [(RuleCondition, DashboardBucket); 5] = [
    (RuleCondition::Ended, DashboardBucket::Historic),
    (
        RuleCondition::StateIn(&[WorkflowState::Rejected, WorkflowState::Cancelled]),
        DashboardBucket::Historic,
    ),
    (
        RuleCondition::StateIn(&[
            WorkflowState::PendingInternalApproval,
            WorkflowState::PendingPublicApproval,
            WorkflowState::RequiresChanges,
        ]),
        DashboardBucket::RequiresAction,
    ),
    (
        RuleCondition::StateIn(&[WorkflowState::ApprovedInternal, WorkflowState::Draft]),
        DashboardBucket::Pending,
    ),
    (
        RuleCondition::StateIn(&[WorkflowState::Published]),
        DashboardBucket::Published,
    ),
];

/// Bucket for snapshots no rule matches.
pub const DEFAULT_BUCKET: DashboardBucket = DashboardBucket::Pending;

pub fn classify(snapshot: &EventSnapshot, now: DateTime<Utc>) -> DashboardBucket {
    BUCKET_RULES
        .iter()
        .find(|(condition, _)| condition.matches(snapshot, now))
        .map(|(_, bucket)| *bucket)
        .unwrap_or(DEFAULT_BUCKET)
}

/// Classify an event from one snapshot of its state and end date.
pub fn categorize(event: &Event, now: DateTime<Utc>) -> DashboardBucket {
    classify(&event.snapshot(), now)
}

/// Predicate selecting exactly the events [`classify`] puts in `bucket`.
///
/// Rule `i` contributes `cond_i AND NOT cond_j` for every earlier `j`; the
/// default bucket also takes the negation of every condition.
pub fn query_filter(bucket: DashboardBucket, now: DateTime<Utc>) -> EventPredicate {
    let mut branches = Vec::new();

    for (i, (condition, target)) in BUCKET_RULES.iter().enumerate() {
        if *target != bucket {
            continue;
        }
        let mut clause = earlier_negated(i, now);
        clause.push(condition.to_predicate(now));
        branches.push(EventPredicate::All(clause));
    }

    if bucket == DEFAULT_BUCKET {
        branches.push(EventPredicate::All(earlier_negated(BUCKET_RULES.len(), now)));
    }

    EventPredicate::Any(branches).simplify()
}

fn earlier_negated(index: usize, now: DateTime<Utc>) -> Vec<EventPredicate> {
    BUCKET_RULES[..index]
        .iter()
        .map(|(condition, _)| condition.to_predicate(now).negate())
        .collect()
}

/// Per-bucket tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    #[serde(rename = "requires-action")]
    pub requires_action: i64,
    pub pending: i64,
    pub published: i64,
    pub historic: i64,
}

impl BucketCounts {
    pub fn get(&self, bucket: DashboardBucket) -> i64 {
        match bucket {
            DashboardBucket::RequiresAction => self.requires_action,
            DashboardBucket::Pending => self.pending,
            DashboardBucket::Published => self.published,
            DashboardBucket::Historic => self.historic,
        }
    }

    pub fn increment(&mut self, bucket: DashboardBucket) {
        match bucket {
            DashboardBucket::RequiresAction => self.requires_action += 1,
            DashboardBucket::Pending => self.pending += 1,
            DashboardBucket::Published => self.published += 1,
            DashboardBucket::Historic => self.historic += 1,
        }
    }

    pub fn total(&self) -> i64 {
        self.requires_action + self.pending + self.published + self.historic
    }
}

pub fn build_summary_counts<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    now: DateTime<Utc>,
) -> BucketCounts {
    let mut counts = BucketCounts::default();
    for event in events {
        counts.increment(categorize(event, now));
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot(state: WorkflowState, end_date: DateTime<Utc>) -> EventSnapshot {
        EventSnapshot {
            workflow_state: state,
            end_date,
        }
    }

    #[test]
    fn test_ended_overrides_active_state() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        assert_eq!(
            classify(&snapshot(WorkflowState::ApprovedInternal, yesterday), now),
            DashboardBucket::Historic
        );
    }

    #[test]
    fn test_terminal_negative_overrides_future_date() {
        let now = Utc::now();
        let tomorrow = now + Duration::days(1);
        assert_eq!(
            classify(&snapshot(WorkflowState::Rejected, tomorrow), now),
            DashboardBucket::Historic
        );
        assert_eq!(
            classify(&snapshot(WorkflowState::Cancelled, tomorrow), now),
            DashboardBucket::Historic
        );
    }

    #[test]
    fn test_active_buckets() {
        let now = Utc::now();
        let later = now + Duration::days(7);
        let cases = [
            (WorkflowState::Draft, DashboardBucket::Pending),
            (WorkflowState::PendingInternalApproval, DashboardBucket::RequiresAction),
            (WorkflowState::ApprovedInternal, DashboardBucket::Pending),
            (WorkflowState::PendingPublicApproval, DashboardBucket::RequiresAction),
            (WorkflowState::Published, DashboardBucket::Published),
            (WorkflowState::RequiresChanges, DashboardBucket::RequiresAction),
        ];
        for (state, expected) in cases {
            assert_eq!(classify(&snapshot(state, later), now), expected, "{}", state);
        }
    }

    #[test]
    fn test_end_date_equal_to_now_is_not_ended() {
        let now = Utc::now();
        assert_eq!(
            classify(&snapshot(WorkflowState::Published, now), now),
            DashboardBucket::Published
        );
    }

    #[test]
    fn test_query_filter_agrees_with_classify() {
        let now = Utc::now();
        let dates = [now - Duration::days(1), now, now + Duration::days(1)];
        let filters: Vec<_> = DashboardBucket::ALL
            .into_iter()
            .map(|b| (b, query_filter(b, now)))
            .collect();

        for state in WorkflowState::ALL {
            for end_date in dates {
                let s = snapshot(state, end_date);
                let bucket = classify(&s, now);
                let matching: Vec<_> = filters
                    .iter()
                    .filter(|(_, filter)| filter.matches(&s))
                    .map(|(b, _)| *b)
                    .collect();
                assert_eq!(matching, vec![bucket], "{} ending {}", state, end_date);
            }
        }
    }

    #[test]
    fn test_query_filter_shapes() {
        let now = Utc::now();
        assert_eq!(
            query_filter(DashboardBucket::Published, now),
            EventPredicate::All(vec![
                EventPredicate::state_in(&[WorkflowState::Published]),
                EventPredicate::EndedBefore(now).negate(),
            ])
        );
        assert_eq!(
            query_filter(DashboardBucket::Historic, now),
            EventPredicate::Any(vec![
                EventPredicate::EndedBefore(now),
                EventPredicate::All(vec![
                    EventPredicate::state_in(&[WorkflowState::Rejected, WorkflowState::Cancelled]),
                    EventPredicate::EndedBefore(now).negate(),
                ]),
            ])
        );
    }

    #[test]
    fn test_bucket_names() {
        assert_eq!(DashboardBucket::RequiresAction.to_string(), "requires-action");
        assert_eq!(
            "historic".parse::<DashboardBucket>().unwrap(),
            DashboardBucket::Historic
        );
        assert!("archive".parse::<DashboardBucket>().is_err());
        assert_eq!(
            serde_json::to_string(&DashboardBucket::RequiresAction).unwrap(),
            "\"requires-action\""
        );
    }

    #[test]
    fn test_counts_serialize_with_bucket_keys() {
        let counts = BucketCounts {
            requires_action: 2,
            pending: 1,
            published: 0,
            historic: 3,
        };
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["requires-action"], 2);
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.get(DashboardBucket::Historic), 3);
    }
}
