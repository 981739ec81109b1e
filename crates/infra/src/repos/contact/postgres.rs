use super::IContactRepo;
use slotbook_domain::{normalize_email, Contact};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresContactRepo {
    pool: PgPool,
}

impl PostgresContactRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ContactRaw {
    contact_uid: Uuid,
    name: String,
    email: String,
    created: i64,
}

impl From<ContactRaw> for Contact {
    fn from(c: ContactRaw) -> Self {
        Self {
            id: c.contact_uid.into(),
            name: c.name,
            email: c.email,
            created: c.created,
        }
    }
}

#[async_trait::async_trait]
impl IContactRepo for PostgresContactRepo {
    async fn insert(&self, contact: &Contact) -> anyhow::Result<()> {
        // Two bookings by a new contact may race, the first one wins
        sqlx::query(
            r#"
            INSERT INTO contacts(contact_uid, name, email, created)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(contact.id.inner_ref())
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(contact.created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Option<Contact> {
        let res = sqlx::query_as::<_, ContactRaw>(
            r#"
            SELECT * FROM contacts AS c
            WHERE c.email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await;

        match res {
            Ok(contact) => contact.map(|c| c.into()),
            Err(e) => {
                error!("Unable to find contact by email. DB returned error: {:?}", e);
                None
            }
        }
    }
}
