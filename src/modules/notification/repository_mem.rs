use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::{
    api::error,
    modules::notification::{
        model::NewNotification,
        repository::NotificationRepository,
        schema::{NotificationEntity, RequestStatus},
    },
};

/// In-process notification store. Every check-and-write runs under one lock, which
/// gives the same guarantees as the partial unique index and conditional updates in
/// the Postgres schema.
#[derive(Default)]
pub struct NotificationRepositoryMem {
    rows: Mutex<Vec<NotificationEntity>>,
}

impl NotificationRepositoryMem {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, Vec<NotificationEntity>>, error::SystemError> {
        self.rows
            .lock()
            .map_err(|_| error::SystemError::internal("notification store lock poisoned"))
    }
}

#[async_trait::async_trait]
impl NotificationRepository for NotificationRepositoryMem {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<NotificationEntity>, error::SystemError> {
        Ok(self.rows()?.iter().find(|n| n.id == *id).cloned())
    }

    async fn find_pending_request_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<NotificationEntity>, error::SystemError> {
        Ok(self
            .rows()?
            .iter()
            .find(|n| n.is_pending_request() && n.involves_pair(user_id_a, user_id_b))
            .cloned())
    }

    async fn find_by_recipient(
        &self,
        recipient_id: &Uuid,
    ) -> Result<Vec<NotificationEntity>, error::SystemError> {
        // ids are v7, so reverse insertion order is newest first
        Ok(self.rows()?.iter().rev().filter(|n| n.recipient_id == *recipient_id).cloned().collect())
    }

    async fn find_pending_requests_from(
        &self,
        sender_id: &Uuid,
    ) -> Result<Vec<NotificationEntity>, error::SystemError> {
        Ok(self
            .rows()?
            .iter()
            .rev()
            .filter(|n| n.sender_id == *sender_id && n.is_pending_request())
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationEntity, error::SystemError> {
        if notification.sender_id == notification.recipient_id {
            return Err(error::SystemError::bad_request("Sender and recipient must differ"));
        }

        let mut rows = self.rows()?;

        let entity = NotificationEntity {
            id: Uuid::now_v7(),
            recipient_id: notification.recipient_id,
            sender_id: notification.sender_id,
            kind: notification.kind,
            status: notification.initial_status(),
            message: notification.message.clone(),
            is_read: false,
            created_at: chrono::Utc::now(),
        };

        if entity.is_pending_request()
            && rows.iter().any(|n| {
                n.is_pending_request() && n.involves_pair(&entity.sender_id, &entity.recipient_id)
            })
        {
            return Err(error::SystemError::conflict());
        }

        rows.push(entity.clone());
        Ok(entity)
    }

    async fn transition_request(
        &self,
        id: &Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<Option<NotificationEntity>, error::SystemError> {
        let mut rows = self.rows()?;

        let Some(idx) = rows.iter().position(|n| n.id == *id && n.status == Some(from)) else {
            return Ok(None);
        };

        // a reopened request must not collide with a newer pending one for the pair
        if to == RequestStatus::Pending {
            let (sender, recipient) = (rows[idx].sender_id, rows[idx].recipient_id);
            let clash = rows
                .iter()
                .any(|n| n.id != *id && n.is_pending_request() && n.involves_pair(&sender, &recipient));
            if clash {
                return Err(error::SystemError::conflict());
            }
        }

        rows[idx].status = Some(to);
        Ok(Some(rows[idx].clone()))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows()?;
        let before = rows.len();
        rows.retain(|n| n.id != *id);
        Ok(rows.len() < before)
    }

    async fn mark_read(&self, id: &Uuid, recipient_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows()?;
        match rows.iter_mut().find(|n| n.id == *id && n.recipient_id == *recipient_id) {
            Some(row) => {
                row.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, recipient_id: &Uuid) -> Result<u64, error::SystemError> {
        let mut rows = self.rows()?;
        let mut updated = 0;
        for row in rows.iter_mut().filter(|n| n.recipient_id == *recipient_id && !n.is_read) {
            row.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
