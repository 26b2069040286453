use std::sync::Arc;

use uuid::Uuid;

use crate::{
    configs::RedisCache,
    constants::FRIEND_IDS_CACHE_PREFIX,
    modules::{
        friend::{
            error::RelationError,
            model::{FriendRequestResponse, FriendResponse, FriendshipStatus, IdOrInfo},
            repository::FriendRepository,
            schema::canonical_pair,
        },
        notification::{
            model::{NewNotification, NotificationResponse},
            repository::NotificationRepository,
            schema::{NotificationEntity, NotificationKind, RequestStatus},
            service::with_senders,
        },
        user::repository::UserRepository,
        websocket::notifier::{ChangeEvent, ChangeNotifier, NotificationEvent, RelationshipEvent},
    },
};

/// Which side of a friend request may act on it.
#[derive(Clone, Copy)]
enum Party {
    Sender,
    Recipient,
}

/// Coordinates the friend store, the notification store and the realtime feed.
/// The pending -> resolved transition on the request row decides which caller
/// performs a resolution; everything after it runs at most once per request.
#[derive(Clone)]
pub struct FriendService {
    friend_repo: Arc<dyn FriendRepository + Send + Sync>,
    notification_repo: Arc<dyn NotificationRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    notifier: Arc<dyn ChangeNotifier>,
    cache: Option<Arc<RedisCache>>,
    cache_ttl: usize,
}

impl FriendService {
    pub fn with_dependencies(
        friend_repo: Arc<dyn FriendRepository + Send + Sync>,
        notification_repo: Arc<dyn NotificationRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        log::info!("FriendService initialized with dependencies");
        FriendService {
            friend_repo,
            notification_repo,
            user_repo,
            notifier,
            cache: None,
            cache_ttl: 0,
        }
    }

    /// Read-through cache for friend id lists.
    pub fn with_cache(mut self, cache: Arc<RedisCache>, ttl: usize) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    fn cache_key(user_id: &Uuid) -> String {
        format!("{}:{}", FRIEND_IDS_CACHE_PREFIX, user_id)
    }

    async fn invalidate_friend_ids(&self, user_ids: &[Uuid]) {
        let Some(cache) = &self.cache else {
            return;
        };
        let keys: Vec<String> = user_ids.iter().map(Self::cache_key).collect();
        if let Err(e) = cache.delete(&keys).await {
            log::warn!("Failed to invalidate friend cache for {:?}: {}", user_ids, e);
        }
    }

    #[cfg(test)]
    pub async fn is_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<bool, RelationError> {
        Ok(self.friend_repo.exists(&user_id, &friend_id).await?)
    }

    pub async fn friend_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RelationError> {
        let key = Self::cache_key(&user_id);

        if let Some(cache) = &self.cache {
            match cache.get::<Vec<Uuid>>(&key).await {
                Ok(Some(ids)) => return Ok(ids),
                Ok(None) => {}
                Err(e) => log::warn!("Friend cache read failed for {}: {}", user_id, e),
            }
        }

        let ids = self.friend_repo.find_friend_ids(&user_id).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &ids, self.cache_ttl).await {
                log::warn!("Friend cache write failed for {}: {}", user_id, e);
            }
        }
        Ok(ids)
    }

    pub async fn get_friends(&self, user_id: Uuid) -> Result<Vec<FriendResponse>, RelationError> {
        let ids = self.friend_ids(user_id).await?;
        let mut profiles = self.user_repo.find_profiles(&ids).await?;

        Ok(ids
            .iter()
            .filter_map(|id| profiles.remove(id))
            .map(FriendResponse::from)
            .collect())
    }

    pub async fn count_friends(&self, user_id: Uuid) -> Result<i64, RelationError> {
        Ok(self.friend_repo.count_friends(&user_id).await?)
    }

    pub async fn friendship_status(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<FriendshipStatus, RelationError> {
        if user_id == other_id {
            return Ok(FriendshipStatus::Myself);
        }

        let (friends, pending) = tokio::try_join!(
            self.friend_repo.exists(&user_id, &other_id),
            self.notification_repo.find_pending_request_between(&user_id, &other_id),
        )?;

        if friends {
            return Ok(FriendshipStatus::Friends);
        }

        Ok(match pending {
            Some(request) if request.sender_id == user_id => {
                FriendshipStatus::OutgoingPending { request_id: request.id }
            }
            Some(request) => FriendshipStatus::IncomingPending { request_id: request.id },
            None => FriendshipStatus::None,
        })
    }

    pub async fn remove_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<(), RelationError> {
        if !self.friend_repo.delete_friendship(&user_id, &friend_id).await? {
            return Err(RelationError::not_found("Friendship not found"));
        }
        log::info!("Friendship between {} and {} removed", user_id, friend_id);

        self.invalidate_friend_ids(&[user_id, friend_id]).await;

        let (user_a, user_b) = canonical_pair(&user_id, &friend_id);
        self.notifier.publish(
            ChangeEvent::Relationship(RelationshipEvent::Removed { user_a, user_b }),
            &[user_id, friend_id],
        );
        Ok(())
    }

    pub async fn send_friend_request(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        message: Option<String>,
    ) -> Result<FriendRequestResponse, RelationError> {
        if recipient_id == sender_id {
            return Err(RelationError::InvalidRecipient(
                "Cannot send friend request to yourself".into(),
            ));
        }

        let profiles = self.user_repo.find_profiles(&[sender_id, recipient_id]).await?;
        if !profiles.contains_key(&recipient_id) {
            return Err(RelationError::not_found("Recipient user not found"));
        }
        if !profiles.contains_key(&sender_id) {
            return Err(RelationError::not_found("Sender profile not found"));
        }

        let (friends, pending) = tokio::try_join!(
            self.friend_repo.exists(&sender_id, &recipient_id),
            self.notification_repo.find_pending_request_between(&sender_id, &recipient_id),
        )?;

        if friends {
            return Err(RelationError::AlreadyFriends);
        }
        if pending.is_some() {
            return Err(RelationError::RequestAlreadyPending);
        }

        let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
        let request = match self
            .notification_repo
            .create(&NewNotification::friend_request(sender_id, recipient_id, message))
            .await
        {
            Ok(request) => request,
            // lost the race against a concurrent request for the same pair
            Err(e) if e.is_conflict() => return Err(RelationError::RequestAlreadyPending),
            Err(e) => return Err(e.into()),
        };

        // an accept of the reverse request may have written the edge since the pre-check
        if self.friend_repo.exists(&sender_id, &recipient_id).await? {
            self.supersede_request(&request).await;
            return Err(RelationError::AlreadyFriends);
        }
        log::info!("Friend request {} sent from {} to {}", request.id, sender_id, recipient_id);

        let from = IdOrInfo::from_profiles(&profiles, sender_id);
        let to = IdOrInfo::from_profiles(&profiles, recipient_id);

        self.notifier.publish(
            ChangeEvent::Notification(NotificationEvent::Created {
                notification: NotificationResponse::new(request.clone(), from.clone()),
            }),
            &[recipient_id],
        );

        Ok(FriendRequestResponse::new(request, from, to))
    }

    async fn load_pending_request(
        &self,
        request_id: Uuid,
        user_id: Uuid,
        party: Party,
    ) -> Result<NotificationEntity, RelationError> {
        let request = self
            .notification_repo
            .find_by_id(&request_id)
            .await?
            .filter(|n| n.kind == NotificationKind::FriendRequest)
            .ok_or_else(|| RelationError::not_found("Friend request not found"))?;

        let allowed = match party {
            Party::Recipient => request.recipient_id == user_id,
            Party::Sender => request.sender_id == user_id,
        };
        if !allowed {
            return Err(RelationError::unauthorized(
                "You are not allowed to act on this friend request",
            ));
        }

        if request.status != Some(RequestStatus::Pending) {
            return Err(RelationError::not_found("Friend request already resolved"));
        }
        Ok(request)
    }

    async fn resolve_request(
        &self,
        request_id: &Uuid,
        status: RequestStatus,
    ) -> Result<NotificationEntity, RelationError> {
        self.notification_repo
            .transition_request(request_id, RequestStatus::Pending, status)
            .await?
            .ok_or_else(|| RelationError::not_found("Friend request already resolved"))
    }

    /// The request row has served its purpose once resolved.
    async fn archive_request(&self, request_id: &Uuid) {
        match self.notification_repo.delete(request_id).await {
            Ok(true) => {}
            Ok(false) => log::debug!("Friend request {} was already removed", request_id),
            Err(e) => log::warn!("Failed to remove resolved friend request {}: {}", request_id, e),
        }
    }

    /// Retires a pending request that a new friendship made moot. Returns whether
    /// this caller performed the transition.
    async fn supersede_request(&self, request: &NotificationEntity) -> bool {
        match self
            .notification_repo
            .transition_request(&request.id, RequestStatus::Pending, RequestStatus::Declined)
            .await
        {
            Ok(Some(_)) => {
                self.archive_request(&request.id).await;
                log::info!("Friend request {} superseded by friendship", request.id);
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::error!("Failed to retire superseded friend request {}: {}", request.id, e);
                false
            }
        }
    }

    async fn notify_outcome(
        &self,
        request: &NotificationEntity,
        kind: NotificationKind,
    ) -> Option<NotificationEntity> {
        match self.notification_repo.create(&NewNotification::request_outcome(request, kind)).await {
            Ok(notice) => Some(notice),
            Err(e) => {
                log::error!("Failed to record {:?} for request {}: {}", kind, request.id, e);
                None
            }
        }
    }

    async fn publish_notice(&self, notice: Option<NotificationEntity>) {
        let Some(notice) = notice else {
            return;
        };
        let target = notice.recipient_id;
        for notification in with_senders(self.user_repo.as_ref(), vec![notice]).await {
            self.notifier.publish(
                ChangeEvent::Notification(NotificationEvent::Created { notification }),
                &[target],
            );
        }
    }

    pub async fn accept_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<IdOrInfo, RelationError> {
        self.load_pending_request(request_id, user_id, Party::Recipient).await?;
        let request = self.resolve_request(&request_id, RequestStatus::Accepted).await?;
        let (sender_id, recipient_id) = (request.sender_id, request.recipient_id);

        let created = match self.friend_repo.create_friendship(&sender_id, &recipient_id).await {
            Ok(_) => true,
            Err(e) if e.is_conflict() => false,
            Err(e) => {
                // put the request back so the recipient can retry
                if let Err(revert) = self
                    .notification_repo
                    .transition_request(&request_id, RequestStatus::Accepted, RequestStatus::Pending)
                    .await
                {
                    log::error!("Failed to reopen friend request {}: {}", request_id, revert);
                }
                return Err(e.into());
            }
        };
        log::info!("Friend request {} accepted by {}", request_id, user_id);

        self.invalidate_friend_ids(&[sender_id, recipient_id]).await;
        self.archive_request(&request_id).await;

        // a reverse request written while the edge was pending is moot now
        let superseded = match self
            .notification_repo
            .find_pending_request_between(&sender_id, &recipient_id)
            .await
        {
            Ok(Some(stray)) if self.supersede_request(&stray).await => Some(stray.id),
            Ok(_) => None,
            Err(e) => {
                log::error!("Failed to look up stray requests for {}: {}", request_id, e);
                None
            }
        };

        let notice = self.notify_outcome(&request, NotificationKind::FriendAccepted).await;

        let parties = [sender_id, recipient_id];
        if created {
            let (user_a, user_b) = canonical_pair(&sender_id, &recipient_id);
            self.notifier.publish(
                ChangeEvent::Relationship(RelationshipEvent::Created { user_a, user_b }),
                &parties,
            );
        }
        self.notifier.publish(
            ChangeEvent::Notification(NotificationEvent::Resolved {
                notification_id: request_id,
                status: RequestStatus::Accepted,
            }),
            &parties,
        );
        if let Some(notification_id) = superseded {
            self.notifier.publish(
                ChangeEvent::Notification(NotificationEvent::Resolved {
                    notification_id,
                    status: RequestStatus::Declined,
                }),
                &parties,
            );
        }
        self.publish_notice(notice).await;

        let profiles = self.user_repo.find_profiles(&[sender_id]).await.unwrap_or_default();
        Ok(IdOrInfo::from_profiles(&profiles, sender_id))
    }

    pub async fn decline_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), RelationError> {
        self.load_pending_request(request_id, user_id, Party::Recipient).await?;
        let request = self.resolve_request(&request_id, RequestStatus::Declined).await?;
        log::info!("Friend request {} declined by {}", request_id, user_id);

        self.archive_request(&request_id).await;
        let notice = self.notify_outcome(&request, NotificationKind::FriendRejected).await;

        self.notifier.publish(
            ChangeEvent::Notification(NotificationEvent::Resolved {
                notification_id: request_id,
                status: RequestStatus::Declined,
            }),
            &[request.sender_id, request.recipient_id],
        );
        self.publish_notice(notice).await;
        Ok(())
    }

    /// Withdraws a request the caller sent. The recipient gets no notice.
    pub async fn cancel_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), RelationError> {
        self.load_pending_request(request_id, user_id, Party::Sender).await?;
        let request = self.resolve_request(&request_id, RequestStatus::Declined).await?;
        log::info!("Friend request {} cancelled by {}", request_id, user_id);

        self.archive_request(&request_id).await;

        self.notifier.publish(
            ChangeEvent::Notification(NotificationEvent::Resolved {
                notification_id: request_id,
                status: RequestStatus::Declined,
            }),
            &[request.sender_id, request.recipient_id],
        );
        Ok(())
    }

    /// Pending requests involving the user, incoming first.
    pub async fn get_friend_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestResponse>, RelationError> {
        let (received, sent) = tokio::try_join!(
            self.notification_repo.find_by_recipient(&user_id),
            self.notification_repo.find_pending_requests_from(&user_id),
        )?;

        let requests: Vec<NotificationEntity> =
            received.into_iter().filter(|n| n.is_pending_request()).chain(sent).collect();

        let mut user_ids: Vec<Uuid> =
            requests.iter().flat_map(|r| [r.sender_id, r.recipient_id]).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let profiles = self.user_repo.find_profiles(&user_ids).await?;

        Ok(requests
            .into_iter()
            .map(|r| {
                let from = IdOrInfo::from_profiles(&profiles, r.sender_id);
                let to = IdOrInfo::from_profiles(&profiles, r.recipient_id);
                FriendRequestResponse::new(r, from, to)
            })
            .collect())
    }
}
