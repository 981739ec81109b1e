use super::IContactRepo;
use crate::repos::shared::inmemory_repo::*;
use slotbook_domain::{normalize_email, Contact};

pub struct InMemoryContactRepo {
    contacts: std::sync::Mutex<Vec<Contact>>,
}

impl InMemoryContactRepo {
    pub fn new() -> Self {
        Self {
            contacts: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IContactRepo for InMemoryContactRepo {
    async fn insert(&self, contact: &Contact) -> anyhow::Result<()> {
        insert(contact, &self.contacts);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Option<Contact> {
        let email = normalize_email(email);
        find_by(&self.contacts, |c| c.email == email).into_iter().next()
    }
}
