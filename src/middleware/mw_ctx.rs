use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use surrealdb::sql::Thing;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::{AppConfig, TrackingConfig};
use crate::database::client::Database;
use crate::interfaces::clock::Clock;
use crate::utils::jwt::JWT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppEventType {
    DiscussionCreated,
    PostCreated,
    DiscussionDeleted,
    TrackingEnabled,
    TrackingDisabled,
    Subscribed,
    Unsubscribed,
    DiscussionSubscribed,
    DiscussionUnsubscribed,
    SubscriptionModeChanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppEvent {
    /// Who the event is about.
    pub user_id: Thing,
    pub forum_id: Thing,
    pub discussion_id: Option<Thing>,
    pub post_id: Option<Thing>,
    pub event: AppEventType,
}

impl AppEvent {
    pub fn forum(event: AppEventType, user_id: &Thing, forum_id: &Thing) -> Self {
        Self {
            user_id: user_id.clone(),
            forum_id: forum_id.clone(),
            discussion_id: None,
            post_id: None,
            event,
        }
    }

    pub fn discussion(event: AppEventType, user_id: &Thing, forum_id: &Thing, discussion_id: &Thing) -> Self {
        Self {
            discussion_id: Some(discussion_id.clone()),
            ..Self::forum(event, user_id, forum_id)
        }
    }

    pub fn with_post(mut self, post_id: &Thing) -> Self {
        self.post_id = Some(post_id.clone());
        self
    }
}

/// Publishes an event. Having no subscriber is not an error.
pub fn emit(sender: &broadcast::Sender<AppEvent>, event: AppEvent) {
    if sender.send(event).is_err() {
        debug!("no event receivers");
    }
}

pub struct CtxState {
    pub db: Database,
    pub jwt: JWT,
    pub clock: Arc<dyn Clock>,
    pub event_sender: broadcast::Sender<AppEvent>,
    pub tracking: TrackingConfig,
}

impl Debug for CtxState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtxState")
            .field("tracking", &self.tracking)
            .finish()
    }
}

pub fn create_ctx_state(db: Database, config: &AppConfig, clock: Arc<dyn Clock>) -> Arc<CtxState> {
    let (event_sender, _) = broadcast::channel(config.event_capacity.max(1));
    let ctx_state = CtxState {
        db,
        jwt: JWT::new(config.jwt_secret.clone(), Duration::days(1)),
        clock,
        event_sender,
        tracking: config.tracking,
    };
    Arc::new(ctx_state)
}
