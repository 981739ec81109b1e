use crate::shared::entity::{Entity, ID};

/// Someone who has booked with the owner, identified by email
#[derive(Debug, Clone)]
pub struct Contact {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub created: i64,
}

impl Contact {
    pub fn new(name: String, email: String, created: i64) -> Self {
        Self {
            id: Default::default(),
            name,
            email: normalize_email(&email),
            created,
        }
    }
}

impl Entity for Contact {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Emails are matched case insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Shape check only: a single `@` with something on both sides and a dot in the domain
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() > 255 || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
                    .unwrap_or(false)
        }
        None => false,
    }
}
