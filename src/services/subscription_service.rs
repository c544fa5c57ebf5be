use surrealdb::sql::Thing;
use tracing::info;

use crate::access::capability::Capability;
use crate::access::discussion::DiscussionAccess;
use crate::entities::forum::{Forum, ModeTransition, SubscriptionMode};
use crate::entities::subscription::{DiscussionPreference, MailDigest};
use crate::interfaces::capability::CapabilityOracle;
use crate::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use crate::interfaces::repositories::forum::ForumRepositoryInterface;
use crate::interfaces::repositories::subscription::SubscriptionRepositoryInterface;
use crate::middleware::error::{AppError, AppResult, ErrorCode};
use crate::middleware::mw_ctx::{emit, AppEvent, AppEventType, CtxState};

fn unsubscribable(forum: &Forum) -> AppError {
    AppError::PermissionDenied {
        code: ErrorCode::Unsubscribable,
        required: format!("subscription mode {}", forum.subscription_mode),
    }
}

pub struct SubscriptionService<'a, S, C>
where
    S: SubscriptionRepositoryInterface,
    C: CapabilityOracle,
{
    state: &'a CtxState,
    subscriptions: &'a S,
    oracle: &'a C,
    access: DiscussionAccess<'a, C>,
}

impl<'a, S, C> SubscriptionService<'a, S, C>
where
    S: SubscriptionRepositoryInterface,
    C: CapabilityOracle,
{
    pub fn new(state: &'a CtxState, subscriptions: &'a S, oracle: &'a C) -> Self {
        Self {
            state,
            subscriptions,
            oracle,
            access: DiscussionAccess::new(oracle),
        }
    }

    pub fn is_subscribable(&self, forum: &Forum) -> bool {
        forum.subscription_mode.is_subscribable()
    }

    /// An explicit discussion preference wins over the forum level state.
    /// DISALLOW unsubscribes everyone.
    pub async fn is_subscribed(
        &self,
        user: &Thing,
        forum: &Forum,
        discussion: Option<&Thing>,
    ) -> AppResult<bool> {
        if forum.subscription_mode.is_disallowed() {
            return Ok(false);
        }
        if let Some(discussion) = discussion {
            if let Some(pref) = self
                .subscriptions
                .discussion_preference(user, discussion)
                .await?
            {
                return Ok(pref.is_subscribed());
            }
        }
        if forum.subscription_mode.is_forced() {
            return Ok(true);
        }
        self.subscriptions.is_forum_subscribed(user, &forum.id).await
    }

    async fn check_self_service(&self, actor: &Thing, user: &Thing, forum: &Forum) -> AppResult<()> {
        let manages = self
            .access
            .can(actor, Capability::ManageSubscriptions, forum)
            .await?;
        if actor != user && !manages {
            return Err(AppError::no_permission(
                Capability::ManageSubscriptions.to_string(),
            ));
        }
        match forum.subscription_mode {
            SubscriptionMode::Force => Err(unsubscribable(forum)),
            SubscriptionMode::Disallow if !manages => Err(unsubscribable(forum)),
            _ => Ok(()),
        }
    }

    /// Returns whether a subscription was added.
    pub async fn subscribe_user(&self, actor: &Thing, user: &Thing, forum_id: &Thing) -> AppResult<bool> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.check_self_service(actor, user, &forum).await?;
        self.access
            .require(user, Capability::ViewDiscussion, &forum)
            .await?;
        let changed = self
            .subscriptions
            .subscribe_forum(user, forum_id, self.state.clock.now())
            .await?;
        if changed {
            emit(
                &self.state.event_sender,
                AppEvent::forum(AppEventType::Subscribed, user, forum_id),
            );
        }
        Ok(changed)
    }

    /// Discussion level preferences are kept.
    pub async fn unsubscribe_user(&self, actor: &Thing, user: &Thing, forum_id: &Thing) -> AppResult<bool> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.check_self_service(actor, user, &forum).await?;
        let changed = self.subscriptions.unsubscribe_forum(user, forum_id).await?;
        if changed {
            emit(
                &self.state.event_sender,
                AppEvent::forum(AppEventType::Unsubscribed, user, forum_id),
            );
        }
        Ok(changed)
    }

    pub async fn subscribe_user_to_discussion(&self, user: &Thing, discussion_id: &Thing) -> AppResult<bool> {
        self.set_discussion_subscription(user, discussion_id, true).await
    }

    pub async fn unsubscribe_user_from_discussion(&self, user: &Thing, discussion_id: &Thing) -> AppResult<bool> {
        self.set_discussion_subscription(user, discussion_id, false).await
    }

    /// Always stores an explicit preference. Returns whether the effective state changed.
    async fn set_discussion_subscription(
        &self,
        user: &Thing,
        discussion_id: &Thing,
        subscribed: bool,
    ) -> AppResult<bool> {
        let discussion = self.state.db.discussions.get_by_id(discussion_id).await?;
        let forum = self.state.db.forums.get_by_id(&discussion.forum).await?;
        let now = self.state.clock.now();
        self.access.require_view(user, &forum, &discussion, now).await?;

        let before = self.is_subscribed(user, &forum, Some(discussion_id)).await?;
        self.subscriptions
            .set_discussion_preference(
                user,
                &forum.id,
                discussion_id,
                DiscussionPreference::from_flag(subscribed),
                now,
            )
            .await?;

        let after = self.is_subscribed(user, &forum, Some(discussion_id)).await?;
        let changed = before != after;
        if changed {
            let event = if subscribed {
                AppEventType::DiscussionSubscribed
            } else {
                AppEventType::DiscussionUnsubscribed
            };
            emit(
                &self.state.event_sender,
                AppEvent::discussion(event, user, &forum.id, discussion_id),
            );
        }
        Ok(changed)
    }

    /// Entering INITIAL subscribes every potential subscriber in the same transaction.
    pub async fn set_subscription_mode(
        &self,
        actor: &Thing,
        forum_id: &Thing,
        mode: SubscriptionMode,
    ) -> AppResult<bool> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.access
            .require(actor, Capability::ManageSubscriptions, &forum)
            .await?;

        let users = match forum.subscription_mode.transition_to(mode) {
            ModeTransition::Unchanged => return Ok(false),
            ModeTransition::Set => vec![],
            ModeTransition::SetAndSubscribeAll => {
                self.oracle
                    .users_with(Capability::AllowForceSubscribe, &forum.course)
                    .await?
            }
        };
        self.state
            .db
            .forums
            .set_subscription_mode(forum_id, mode, users, self.state.clock.now())
            .await?;
        info!(forum = %forum_id, from = %forum.subscription_mode, to = %mode, "forum subscription mode set");
        emit(
            &self.state.event_sender,
            AppEvent::forum(AppEventType::SubscriptionModeChanged, actor, forum_id),
        );
        Ok(true)
    }

    /// Notification recipients, sorted by user id.
    pub async fn subscribed_users(
        &self,
        actor: &Thing,
        forum_id: &Thing,
        discussion_id: Option<&Thing>,
    ) -> AppResult<Vec<Thing>> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.access
            .require(actor, Capability::ViewSubscribers, &forum)
            .await?;
        if forum.subscription_mode.is_disallowed() {
            return Ok(vec![]);
        }

        let mut users = if forum.subscription_mode.is_forced() {
            self.oracle
                .users_with(Capability::AllowForceSubscribe, &forum.course)
                .await?
        } else {
            self.subscriptions.forum_subscribers(forum_id).await?
        };

        if let Some(discussion_id) = discussion_id {
            let discussion = self.state.db.discussions.get_by_id(discussion_id).await?;
            if discussion.forum != forum.id {
                return Err(AppError::not_found(discussion_id.to_raw()));
            }
            for pref in self.subscriptions.discussion_preferences(discussion_id).await? {
                if pref.preference.is_subscribed() {
                    users.push(pref.user);
                } else {
                    users.retain(|u| u != &pref.user);
                }
            }
        }

        users.sort_by(|a, b| a.to_raw().cmp(&b.to_raw()));
        users.dedup();
        Ok(users)
    }

    pub async fn get_digest(&self, user: &Thing, forum_id: &Thing) -> AppResult<Option<MailDigest>> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.access
            .require(user, Capability::ViewDiscussion, &forum)
            .await?;
        self.subscriptions.get_digest(user, forum_id).await
    }

    /// `None` falls back to the user's default.
    pub async fn set_digest(&self, user: &Thing, forum_id: &Thing, digest: Option<MailDigest>) -> AppResult<()> {
        let forum = self.state.db.forums.get_by_id(forum_id).await?;
        self.access
            .require(user, Capability::ViewDiscussion, &forum)
            .await?;
        self.subscriptions.set_digest(user, forum_id, digest).await
    }
}
