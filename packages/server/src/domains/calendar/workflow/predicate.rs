//! Boolean filters over `(workflow_state, end_date)`.
//!
//! A predicate is evaluated in memory against an [`EventSnapshot`] and also
//! rendered into a SQL `WHERE` fragment, so both paths share one definition.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::domains::calendar::models::{EventSnapshot, WorkflowState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPredicate {
    Always,
    Never,
    /// `end_date < instant`
    EndedBefore(DateTime<Utc>),
    StateIn(Vec<WorkflowState>),
    Not(Box<EventPredicate>),
    All(Vec<EventPredicate>),
    Any(Vec<EventPredicate>),
}

impl EventPredicate {
    pub fn state_in(states: &[WorkflowState]) -> Self {
        Self::StateIn(states.to_vec())
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn matches(&self, snapshot: &EventSnapshot) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::EndedBefore(instant) => snapshot.end_date < *instant,
            Self::StateIn(states) => states.contains(&snapshot.workflow_state),
            Self::Not(inner) => !inner.matches(snapshot),
            Self::All(children) => children.iter().all(|c| c.matches(snapshot)),
            Self::Any(children) => children.iter().any(|c| c.matches(snapshot)),
        }
    }

    /// Fold constants and merge state sets. The result matches exactly the
    /// same snapshots as the input.
    pub fn simplify(self) -> Self {
        match self {
            Self::StateIn(states) => state_set(states),
            Self::Not(inner) => match (*inner).simplify() {
                Self::Always => Self::Never,
                Self::Never => Self::Always,
                Self::Not(inner) => *inner,
                Self::StateIn(states) => state_set(
                    WorkflowState::ALL
                        .into_iter()
                        .filter(|s| !states.contains(s))
                        .collect(),
                ),
                other => other.negate(),
            },
            Self::All(children) => simplify_all(children),
            Self::Any(children) => simplify_any(children),
            other => other,
        }
    }

    /// Append this predicate as SQL over the `events` table.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        match self {
            Self::Always => {
                qb.push("TRUE");
            }
            Self::Never => {
                qb.push("FALSE");
            }
            Self::EndedBefore(instant) => {
                qb.push("end_date < ").push_bind(*instant);
            }
            Self::StateIn(states) => {
                let states: Vec<String> = states.iter().map(|s| s.as_str().to_string()).collect();
                qb.push("workflow_state = ANY(").push_bind(states).push(")");
            }
            Self::Not(inner) => {
                qb.push("NOT (");
                inner.push_sql(qb);
                qb.push(")");
            }
            Self::All(children) => push_joined(qb, children, " AND ", "TRUE"),
            Self::Any(children) => push_joined(qb, children, " OR ", "FALSE"),
        }
    }
}

fn push_joined(
    qb: &mut QueryBuilder<'static, Postgres>,
    children: &[EventPredicate],
    separator: &str,
    empty: &str,
) {
    if children.is_empty() {
        qb.push(empty);
        return;
    }
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        qb.push("(");
        child.push_sql(qb);
        qb.push(")");
    }
}

fn state_set(mut states: Vec<WorkflowState>) -> EventPredicate {
    states.sort();
    states.dedup();
    if states.is_empty() {
        EventPredicate::Never
    } else if states.len() == WorkflowState::ALL.len() {
        EventPredicate::Always
    } else {
        EventPredicate::StateIn(states)
    }
}

fn simplify_all(children: Vec<EventPredicate>) -> EventPredicate {
    let mut states: Option<Vec<WorkflowState>> = None;
    let mut rest = Vec::new();

    for child in flatten(children, |p| match p {
        EventPredicate::All(inner) => Ok(inner),
        other => Err(other),
    }) {
        match child.simplify() {
            EventPredicate::Always => {}
            EventPredicate::Never => return EventPredicate::Never,
            EventPredicate::StateIn(set) => {
                states = Some(match states {
                    None => set,
                    Some(acc) => acc.into_iter().filter(|s| set.contains(s)).collect(),
                });
            }
            other => rest.push(other),
        }
    }

    if let Some(states) = states {
        match state_set(states) {
            EventPredicate::Never => return EventPredicate::Never,
            EventPredicate::Always => {}
            set => rest.insert(0, set),
        }
    }
    match rest.len() {
        0 => EventPredicate::Always,
        1 => rest.remove(0),
        _ => EventPredicate::All(rest),
    }
}

fn simplify_any(children: Vec<EventPredicate>) -> EventPredicate {
    let mut states: Vec<WorkflowState> = Vec::new();
    let mut rest = Vec::new();

    for child in flatten(children, |p| match p {
        EventPredicate::Any(inner) => Ok(inner),
        other => Err(other),
    }) {
        match child.simplify() {
            EventPredicate::Never => {}
            EventPredicate::Always => return EventPredicate::Always,
            EventPredicate::StateIn(set) => states.extend(set),
            other => rest.push(other),
        }
    }

    match state_set(states) {
        EventPredicate::Always => return EventPredicate::Always,
        EventPredicate::Never => {}
        set => rest.insert(0, set),
    }
    match rest.len() {
        0 => EventPredicate::Never,
        1 => rest.remove(0),
        _ => EventPredicate::Any(rest),
    }
}

/// Splice nested children of the same combinator into one list.
fn flatten(
    children: Vec<EventPredicate>,
    unwrap: fn(EventPredicate) -> Result<Vec<EventPredicate>, EventPredicate>,
) -> Vec<EventPredicate> {
    let mut out = Vec::with_capacity(children.len());
    let mut stack: Vec<EventPredicate> = children.into_iter().rev().collect();
    while let Some(child) = stack.pop() {
        match unwrap(child) {
            Ok(inner) => stack.extend(inner.into_iter().rev()),
            Err(leaf) => out.push(leaf),
        }
    }
    out
}
