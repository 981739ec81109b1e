use super::INotificationRepo;
use slotbook_domain::{Notification, NotificationKind};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRaw {
    notification_uid: Uuid,
    related_uid: Uuid,
    read: bool,
    created: i64,
}

impl From<NotificationRaw> for Notification {
    fn from(n: NotificationRaw) -> Self {
        Self {
            id: n.notification_uid.into(),
            kind: NotificationKind::BookingRequest,
            related_id: n.related_uid.into(),
            read: n.read,
            created: n.created,
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications(notification_uid, kind, related_uid, read, created)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(notification.kind.as_str())
        .bind(notification.related_id.inner_ref())
        .bind(notification.read)
        .bind(notification.created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_unread(&self) -> anyhow::Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT notification_uid, related_uid, read, created FROM notifications AS n
            WHERE n.read = FALSE
            ORDER BY n.created
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications.into_iter().map(|n| n.into()).collect())
    }
}
