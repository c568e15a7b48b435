//! Recipient inbox operations.

use common::{Actor, NotificationId};
use domain::Notification;
use serde::Serialize;
use store::MarketStore;

use crate::{Result, ServiceError};

/// Newest-first page size for the inbox.
pub const INBOX_LIMIT: i64 = 50;

/// An inbox page with its unread counter.
#[derive(Debug, Serialize)]
pub struct Inbox {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
}

/// Inbox operations, all scoped to the authenticated recipient.
pub struct NotificationService<S> {
    store: S,
}

impl<S: MarketStore> NotificationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn inbox(&self, actor: &Actor) -> Result<Inbox> {
        let notifications = self.store.notifications(actor.user_id, INBOX_LIMIT).await?;
        let unread_count = self.store.unread_count(actor.user_id).await?;
        Ok(Inbox {
            notifications,
            unread_count,
        })
    }

    pub async fn mark_read(&self, actor: &Actor, id: NotificationId) -> Result<Notification> {
        self.store
            .mark_notification_read(id, actor.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Notification not found".to_string()))
    }

    pub async fn mark_all_read(&self, actor: &Actor) -> Result<u64> {
        Ok(self.store.mark_all_read(actor.user_id).await?)
    }

    pub async fn delete(&self, actor: &Actor, id: NotificationId) -> Result<()> {
        if self.store.delete_notification(id, actor.user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("Notification not found".to_string()))
        }
    }

    pub async fn clear(&self, actor: &Actor) -> Result<u64> {
        Ok(self.store.clear_notifications(actor.user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use common::{Role, UserId};
    use domain::NotificationKind;
    use store::InMemoryStore;

    use super::*;

    async fn seeded(count: usize) -> (NotificationService<InMemoryStore>, Actor) {
        let store = InMemoryStore::new();
        let actor = Actor::new(UserId::new(), Role::Seller);
        for i in 0..count {
            store
                .insert_notification(&Notification::new(
                    actor.user_id,
                    NotificationKind::System,
                    format!("n{i}"),
                    "m",
                    None,
                ))
                .await
                .unwrap();
        }
        (NotificationService::new(store), actor)
    }

    #[tokio::test]
    async fn inbox_caps_at_fifty_and_counts_unread() {
        let (service, actor) = seeded(55).await;
        let inbox = service.inbox(&actor).await.unwrap();
        assert_eq!(inbox.notifications.len(), 50);
        assert_eq!(inbox.unread_count, 55);
    }

    #[tokio::test]
    async fn read_flags_flip_individually_and_in_bulk() {
        let (service, actor) = seeded(3).await;
        let inbox = service.inbox(&actor).await.unwrap();

        let read = service.mark_read(&actor, inbox.notifications[0].id).await.unwrap();
        assert!(read.is_read);
        assert_eq!(service.inbox(&actor).await.unwrap().unread_count, 2);

        assert_eq!(service.mark_all_read(&actor).await.unwrap(), 2);
        assert_eq!(service.inbox(&actor).await.unwrap().unread_count, 0);
    }

    #[tokio::test]
    async fn foreign_rows_read_as_missing() {
        let (service, actor) = seeded(1).await;
        let other = Actor::new(UserId::new(), Role::Seller);
        let id = service.inbox(&actor).await.unwrap().notifications[0].id;

        let err = service.mark_read(&other, id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = service.delete(&other, id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let (service, actor) = seeded(3).await;
        let inbox = service.inbox(&actor).await.unwrap();

        service.delete(&actor, inbox.notifications[0].id).await.unwrap();
        assert_eq!(service.clear(&actor).await.unwrap(), 2);
        assert!(service.inbox(&actor).await.unwrap().notifications.is_empty());
    }
}
