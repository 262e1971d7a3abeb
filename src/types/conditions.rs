//! Status-condition list helpers shared by every kind's status.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "lastTransitionTime")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

pub fn find_condition<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

/// Upserts a condition by `type`, bumping `lastTransitionTime` only when the
/// status actually changes, per the standard Kubernetes condition-list
/// convention assumed but not detailed by the source spec.
pub fn set_condition(
    conditions: &mut Vec<Condition>,
    type_: impl Into<String>,
    status: impl Into<String>,
    reason: Option<String>,
    message: Option<String>,
    now: DateTime<Utc>,
) {
    let type_ = type_.into();
    let status = status.into();
    if let Some(existing) = conditions.iter_mut().find(|c| c.type_ == type_) {
        if existing.status != status {
            existing.status = status;
            existing.last_transition_time = Some(now);
        }
        existing.reason = reason;
        existing.message = message;
    } else {
        conditions.push(Condition {
            type_,
            status,
            reason,
            message,
            last_transition_time: Some(now),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_condition_inserts_new() {
        let mut conditions = Vec::new();
        let now = Utc::now();
        set_condition(&mut conditions, "Ready", "True", None, None, now);
        assert_eq!(conditions.len(), 1);
        assert_eq!(find_condition(&conditions, "Ready").unwrap().status, "True");
    }

    #[test]
    fn set_condition_bumps_transition_time_only_on_status_change() {
        let mut conditions = Vec::new();
        let t0 = Utc::now();
        set_condition(&mut conditions, "Ready", "False", Some("Init".into()), None, t0);
        let t1 = t0 + chrono::Duration::seconds(5);
        set_condition(&mut conditions, "Ready", "False", Some("StillInit".into()), None, t1);
        let cond = find_condition(&conditions, "Ready").unwrap();
        assert_eq!(cond.last_transition_time, Some(t0));
        assert_eq!(cond.reason.as_deref(), Some("StillInit"));

        let t2 = t1 + chrono::Duration::seconds(5);
        set_condition(&mut conditions, "Ready", "True", Some("Done".into()), None, t2);
        let cond = find_condition(&conditions, "Ready").unwrap();
        assert_eq!(cond.last_transition_time, Some(t2));
    }
}
