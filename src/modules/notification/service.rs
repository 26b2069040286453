use std::sync::Arc;

use uuid::Uuid;

use crate::modules::{
    friend::{error::RelationError, model::IdOrInfo},
    notification::{
        model::NotificationResponse,
        repository::NotificationRepository,
        schema::{NotificationEntity, RequestStatus},
    },
    user::repository::UserRepository,
    websocket::notifier::{ChangeEvent, ChangeNotifier, NotificationEvent},
};

/// Attaches sender profiles to notifications. A failed profile lookup degrades
/// to bare ids rather than failing the read.
pub async fn with_senders(
    user_repo: &(dyn UserRepository + Send + Sync),
    notifications: Vec<NotificationEntity>,
) -> Vec<NotificationResponse> {
    let mut sender_ids: Vec<Uuid> = notifications.iter().map(|n| n.sender_id).collect();
    sender_ids.sort_unstable();
    sender_ids.dedup();

    let profiles = match user_repo.find_profiles(&sender_ids).await {
        Ok(profiles) => profiles,
        Err(e) => {
            log::warn!("Failed to load sender profiles: {}", e);
            Default::default()
        }
    };

    notifications
        .into_iter()
        .map(|n| {
            let sender = IdOrInfo::from_profiles(&profiles, n.sender_id);
            NotificationResponse::new(n, sender)
        })
        .collect()
}

#[derive(Clone)]
pub struct NotificationService {
    notification_repo: Arc<dyn NotificationRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl NotificationService {
    pub fn with_dependencies(
        notification_repo: Arc<dyn NotificationRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        log::info!("NotificationService initialized with dependencies");
        NotificationService { notification_repo, user_repo, notifier }
    }

    pub async fn list_notifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<NotificationResponse>, RelationError> {
        let notifications = self.notification_repo.find_by_recipient(&user_id).await?;
        Ok(with_senders(self.user_repo.as_ref(), notifications).await)
    }

    /// Notifications still asking for attention: open friend requests and
    /// anything unread.
    pub async fn list_pending_notifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<NotificationResponse>, RelationError> {
        let notifications: Vec<NotificationEntity> = self
            .notification_repo
            .find_by_recipient(&user_id)
            .await?
            .into_iter()
            .filter(|n| n.is_pending_request() || !n.is_read)
            .collect();
        Ok(with_senders(self.user_repo.as_ref(), notifications).await)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<usize, RelationError> {
        let notifications = self.notification_repo.find_by_recipient(&user_id).await?;
        Ok(notifications.iter().filter(|n| !n.is_read).count())
    }

    async fn find_owned(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<NotificationEntity, RelationError> {
        let notification = self
            .notification_repo
            .find_by_id(&notification_id)
            .await?
            .ok_or_else(|| RelationError::not_found("Notification not found"))?;

        if notification.recipient_id != user_id {
            return Err(RelationError::unauthorized(
                "You are not allowed to modify this notification",
            ));
        }
        Ok(notification)
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<(), RelationError> {
        let notification = self.find_owned(user_id, notification_id).await?;
        if notification.is_read {
            return Ok(());
        }

        if self.notification_repo.mark_read(&notification_id, &user_id).await? {
            self.notifier.publish(
                ChangeEvent::Notification(NotificationEvent::Read { notification_id }),
                &[user_id],
            );
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, RelationError> {
        let updated = self.notification_repo.mark_all_read(&user_id).await?;
        if updated > 0 {
            self.notifier.publish(ChangeEvent::Notification(NotificationEvent::AllRead), &[user_id]);
        }
        Ok(updated)
    }

    /// Deleting a pending friend request also withdraws it for the sender.
    pub async fn delete_notification(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), RelationError> {
        let notification = self.find_owned(user_id, notification_id).await?;

        if !self.notification_repo.delete(&notification_id).await? {
            return Err(RelationError::not_found("Notification not found"));
        }
        log::info!("Notification {} deleted by {}", notification_id, user_id);

        self.notifier.publish(
            ChangeEvent::Notification(NotificationEvent::Deleted { notification_id }),
            &[user_id],
        );
        if notification.is_pending_request() {
            self.notifier.publish(
                ChangeEvent::Notification(NotificationEvent::Resolved {
                    notification_id,
                    status: RequestStatus::Declined,
                }),
                &[notification.sender_id],
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::notification::{model::NewNotification, schema::NotificationKind};
    use crate::test::Fixture;

    #[actix_web::test]
    async fn test_delete_notification_requires_recipient() {
        let fx = Fixture::new().await;
        let (alice, bob, carol) =
            (fx.user("alice").await, fx.user("bob").await, fx.user("carol").await);
        let request = fx.friend_service.send_friend_request(alice, bob, None).await.unwrap();

        let err = fx.notification_service.delete_notification(request.id, carol).await.unwrap_err();
        assert!(matches!(err, RelationError::Unauthorized(_)));

        let err = fx.notification_service.delete_notification(request.id, alice).await.unwrap_err();
        assert!(matches!(err, RelationError::Unauthorized(_)));

        let err =
            fx.notification_service.delete_notification(Uuid::now_v7(), bob).await.unwrap_err();
        assert!(matches!(err, RelationError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_deleting_pending_request_withdraws_it_for_sender() {
        let fx = Fixture::new().await;
        let (alice, bob) = (fx.user("alice").await, fx.user("bob").await);
        let request = fx.friend_service.send_friend_request(alice, bob, None).await.unwrap();
        fx.notifier.clear();

        fx.notification_service.delete_notification(request.id, bob).await.unwrap();

        assert!(fx.notification_service.list_notifications(bob).await.unwrap().is_empty());
        let sender_events = fx.notifier.events_for(alice);
        assert!(matches!(
            sender_events.as_slice(),
            [ChangeEvent::Notification(NotificationEvent::Resolved {
                status: RequestStatus::Declined,
                ..
            })]
        ));

        // the pair is free for a new request
        fx.friend_service.send_friend_request(alice, bob, None).await.unwrap();
    }

    #[actix_web::test]
    async fn test_pending_and_unread_views() {
        let fx = Fixture::new().await;
        let (alice, bob, carol) =
            (fx.user("alice").await, fx.user("bob").await, fx.user("carol").await);

        fx.friend_service.send_friend_request(alice, bob, None).await.unwrap();
        let accepted = fx
            .notifications
            .create(&NewNotification {
                recipient_id: bob,
                sender_id: carol,
                kind: NotificationKind::FriendAccepted,
                message: None,
            })
            .await
            .unwrap();

        assert_eq!(fx.notification_service.unread_count(bob).await.unwrap(), 2);
        fx.notification_service.mark_read(bob, accepted.id).await.unwrap();
        assert_eq!(fx.notification_service.unread_count(bob).await.unwrap(), 1);

        let pending = fx.notification_service.list_pending_notifications(bob).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, NotificationKind::FriendRequest);
        assert_eq!(pending[0].sender.id(), alice);
        assert!(matches!(pending[0].sender, IdOrInfo::Info(_)));

        let all = fx.notification_service.list_notifications(bob).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[actix_web::test]
    async fn test_mark_all_read_publishes_once() {
        let fx = Fixture::new().await;
        let (alice, bob, carol) =
            (fx.user("alice").await, fx.user("bob").await, fx.user("carol").await);
        fx.friend_service.send_friend_request(alice, carol, None).await.unwrap();
        fx.friend_service.send_friend_request(bob, carol, None).await.unwrap();
        fx.notifier.clear();

        assert_eq!(fx.notification_service.mark_all_read(carol).await.unwrap(), 2);
        assert_eq!(fx.notification_service.mark_all_read(carol).await.unwrap(), 0);
        assert_eq!(fx.notifier.events_for(carol).len(), 1);
        assert_eq!(fx.notification_service.unread_count(carol).await.unwrap(), 0);

        // read requests are still pending
        let pending = fx.notification_service.list_pending_notifications(carol).await.unwrap();
        assert_eq!(pending.len(), 2);
    }

    #[actix_web::test]
    async fn test_mark_read_on_foreign_notification_is_rejected() {
        let fx = Fixture::new().await;
        let (alice, bob) = (fx.user("alice").await, fx.user("bob").await);
        let request = fx.friend_service.send_friend_request(alice, bob, None).await.unwrap();

        let err = fx.notification_service.mark_read(alice, request.id).await.unwrap_err();
        assert!(matches!(err, RelationError::Unauthorized(_)));
    }
}
