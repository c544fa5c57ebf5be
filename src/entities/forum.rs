use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TrackingType {
    Off,
    Optional,
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SubscriptionMode {
    Choose,
    Force,
    Initial,
    Disallow,
}

/// What the store has to do when a forum changes mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    Unchanged,
    Set,
    SetAndSubscribeAll,
}

impl SubscriptionMode {
    /// Self-service subscription changes are possible.
    pub fn is_subscribable(&self) -> bool {
        matches!(self, SubscriptionMode::Choose | SubscriptionMode::Initial)
    }

    pub fn is_forced(&self) -> bool {
        *self == SubscriptionMode::Force
    }

    /// Stored subscriptions are kept but nobody is effectively subscribed.
    pub fn is_disallowed(&self) -> bool {
        *self == SubscriptionMode::Disallow
    }

    pub fn transition_to(&self, next: SubscriptionMode) -> ModeTransition {
        match (self, next) {
            (current, next) if *current == next => ModeTransition::Unchanged,
            (_, SubscriptionMode::Initial) => ModeTransition::SetAndSubscribeAll,
            _ => ModeTransition::Set,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forum {
    pub id: Thing,
    pub course: String,
    pub name: String,
    pub tracking_type: TrackingType,
    pub subscription_mode: SubscriptionMode,
    pub completion_discussions: i64,
    pub completion_replies: i64,
    pub completion_posts: i64,
    pub time_modified: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateForum {
    pub course: String,
    pub name: String,
    pub tracking_type: TrackingType,
    pub subscription_mode: SubscriptionMode,
    pub completion_discussions: i64,
    pub completion_replies: i64,
    pub completion_posts: i64,
    pub time_modified: i64,
}

impl CreateForum {
    pub fn new(course: &str, name: &str, tracking_type: TrackingType, time: i64) -> Self {
        Self {
            course: course.to_string(),
            name: name.to_string(),
            tracking_type,
            subscription_mode: SubscriptionMode::Choose,
            completion_discussions: 0,
            completion_replies: 0,
            completion_posts: 0,
            time_modified: time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionMode::*;
    use super::*;

    #[test]
    fn entering_initial_subscribes_everyone() {
        for from in [Choose, Force, Disallow] {
            assert_eq!(from.transition_to(Initial), ModeTransition::SetAndSubscribeAll);
        }
    }

    #[test]
    fn same_mode_is_a_no_op() {
        for mode in [Choose, Force, Initial, Disallow] {
            assert_eq!(mode.transition_to(mode), ModeTransition::Unchanged);
        }
    }

    #[test]
    fn other_transitions_only_set_the_mode() {
        assert_eq!(Initial.transition_to(Choose), ModeTransition::Set);
        assert_eq!(Choose.transition_to(Force), ModeTransition::Set);
        assert_eq!(Force.transition_to(Disallow), ModeTransition::Set);
    }

    #[test]
    fn subscribable_modes() {
        assert!(Choose.is_subscribable());
        assert!(Initial.is_subscribable());
        assert!(!Force.is_subscribable());
        assert!(!Disallow.is_subscribable());
    }

    #[test]
    fn modes_parse_from_requests() {
        assert_eq!("initial".parse::<SubscriptionMode>().unwrap(), Initial);
        assert_eq!("FORCE".parse::<SubscriptionMode>().unwrap(), Force);
        assert!("sometimes".parse::<SubscriptionMode>().is_err());
    }
}
