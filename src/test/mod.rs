#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use tokio::sync::Notify;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            repository::FriendRepository, repository_mem::FriendRepositoryMem,
            schema::FriendEntity, service::FriendService,
        },
        notification::{repository_mem::NotificationRepositoryMem, service::NotificationService},
        user::{model::UpsertUser, repository::UserRepository, repository_mem::UserRepositoryMem},
        websocket::notifier::{ChangeEvent, ChangeNotifier},
    },
};

/// Captures published events instead of delivering them.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(ChangeEvent, Vec<Uuid>)>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<(ChangeEvent, Vec<Uuid>)> {
        self.events.lock().unwrap().clone()
    }

    /// Events that targeted `user_id`, in publish order.
    pub fn events_for(&self, user_id: Uuid) -> Vec<ChangeEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, targets)| targets.contains(&user_id))
            .map(|(event, _)| event.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn publish(&self, event: ChangeEvent, targets: &[Uuid]) {
        self.events.lock().unwrap().push((event, targets.to_vec()));
    }
}

/// Friend store whose writes always fail, for exercising rollback paths.
pub struct FailingFriendRepo;

#[async_trait::async_trait]
impl FriendRepository for FailingFriendRepo {
    async fn exists(&self, _: &Uuid, _: &Uuid) -> Result<bool, error::SystemError> {
        Ok(false)
    }

    async fn create_friendship(
        &self,
        _: &Uuid,
        _: &Uuid,
    ) -> Result<FriendEntity, error::SystemError> {
        Err(error::SystemError::internal("friend store unavailable"))
    }

    async fn delete_friendship(&self, _: &Uuid, _: &Uuid) -> Result<bool, error::SystemError> {
        Err(error::SystemError::internal("friend store unavailable"))
    }

    async fn find_friend_ids(&self, _: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        Ok(Vec::new())
    }

    async fn count_friends(&self, _: &Uuid) -> Result<i64, error::SystemError> {
        Ok(0)
    }
}

/// Memory friend store that parks inside `create_friendship` until released.
#[derive(Default)]
pub struct GatedFriendRepo {
    inner: FriendRepositoryMem,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedFriendRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FriendRepository for GatedFriendRepo {
    async fn exists(&self, a: &Uuid, b: &Uuid) -> Result<bool, error::SystemError> {
        self.inner.exists(a, b).await
    }

    async fn create_friendship(
        &self,
        a: &Uuid,
        b: &Uuid,
    ) -> Result<FriendEntity, error::SystemError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.create_friendship(a, b).await
    }

    async fn delete_friendship(&self, a: &Uuid, b: &Uuid) -> Result<bool, error::SystemError> {
        self.inner.delete_friendship(a, b).await
    }

    async fn find_friend_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        self.inner.find_friend_ids(user_id).await
    }

    async fn count_friends(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        self.inner.count_friends(user_id).await
    }
}

/// Memory friend store whose first `exists` answer is stale, as if the edge
/// landed right after the read.
#[derive(Default)]
pub struct StaleExistsRepo {
    pub inner: FriendRepositoryMem,
    answered: AtomicBool,
}

impl StaleExistsRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FriendRepository for StaleExistsRepo {
    async fn exists(&self, a: &Uuid, b: &Uuid) -> Result<bool, error::SystemError> {
        if !self.answered.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        self.inner.exists(a, b).await
    }

    async fn create_friendship(
        &self,
        a: &Uuid,
        b: &Uuid,
    ) -> Result<FriendEntity, error::SystemError> {
        self.inner.create_friendship(a, b).await
    }

    async fn delete_friendship(&self, a: &Uuid, b: &Uuid) -> Result<bool, error::SystemError> {
        self.inner.delete_friendship(a, b).await
    }

    async fn find_friend_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        self.inner.find_friend_ids(user_id).await
    }

    async fn count_friends(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        self.inner.count_friends(user_id).await
    }
}

/// Services wired over the in-memory stores.
pub struct Fixture {
    pub users: Arc<UserRepositoryMem>,
    pub notifications: Arc<NotificationRepositoryMem>,
    pub notifier: Arc<RecordingNotifier>,
    pub friend_service: FriendService,
    pub notification_service: NotificationService,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_friend_repo(Arc::new(FriendRepositoryMem::new())).await
    }

    pub async fn with_friend_repo(friend_repo: Arc<dyn FriendRepository + Send + Sync>) -> Self {
        let users = Arc::new(UserRepositoryMem::new());
        let notifications = Arc::new(NotificationRepositoryMem::new());
        let notifier = Arc::new(RecordingNotifier::default());

        let friend_service = FriendService::with_dependencies(
            friend_repo,
            notifications.clone(),
            users.clone(),
            notifier.clone(),
        );
        let notification_service =
            NotificationService::with_dependencies(notifications.clone(), users.clone(), notifier.clone());

        Fixture { users, notifications, notifier, friend_service, notification_service }
    }

    /// Registers a profile and returns its id.
    pub async fn user(&self, username: &str) -> Uuid {
        let id = Uuid::now_v7();
        let profile = UpsertUser {
            username: username.to_string(),
            display_name: username.to_uppercase(),
            avatar_url: None,
        };
        self.users.upsert(&id, &profile).await.unwrap();
        id
    }
}
