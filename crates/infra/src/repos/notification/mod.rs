mod inmemory;
mod postgres;

pub use inmemory::InMemoryNotificationRepo;
pub use postgres::PostgresNotificationRepo;
use slotbook_domain::Notification;

#[async_trait::async_trait]
pub trait INotificationRepo: Send + Sync {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()>;
    /// Unread notifications, oldest first
    async fn find_unread(&self) -> anyhow::Result<Vec<Notification>>;
}
