use super::INotificationRepo;
use crate::repos::shared::inmemory_repo::*;
use slotbook_domain::Notification;

pub struct InMemoryNotificationRepo {
    notifications: std::sync::Mutex<Vec<Notification>>,
}

impl InMemoryNotificationRepo {
    pub fn new() -> Self {
        Self {
            notifications: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for InMemoryNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        insert(notification, &self.notifications);
        Ok(())
    }

    async fn find_unread(&self) -> anyhow::Result<Vec<Notification>> {
        let mut unread = find_by(&self.notifications, |n| !n.read);
        unread.sort_by_key(|n| n.created);
        Ok(unread)
    }
}
