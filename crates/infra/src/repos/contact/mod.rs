mod inmemory;
mod postgres;

pub use inmemory::InMemoryContactRepo;
pub use postgres::PostgresContactRepo;
use slotbook_domain::Contact;

#[async_trait::async_trait]
pub trait IContactRepo: Send + Sync {
    async fn insert(&self, contact: &Contact) -> anyhow::Result<()>;
    /// Looks up by the normalized form of the email
    async fn find_by_email(&self, email: &str) -> Option<Contact>;
}
