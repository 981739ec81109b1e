use super::IEventRepo;
use crate::repos::shared::repo::DeleteResult;
use slotbook_domain::{CalendarEvent, EventStatus, RecurrenceRule, TimeSpan, Tz, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::error;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    event_uid: Uuid,
    owner_uid: Uuid,
    title: String,
    agenda: Option<String>,
    notes: Option<String>,
    start_ts: i64,
    end_ts: i64,
    timezone: String,
    status: String,
    visibility: String,
    recurrence: Option<Json<RecurrenceRule>>,
    recurrence_parent_uid: Option<Uuid>,
    exdates: Vec<i64>,
    color: Option<String>,
    created: i64,
    updated: i64,
}

impl TryFrom<EventRaw> for CalendarEvent {
    type Error = anyhow::Error;

    fn try_from(e: EventRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: e.event_uid.into(),
            owner_id: e.owner_uid.into(),
            title: e.title,
            agenda: e.agenda,
            notes: e.notes,
            start_ts: e.start_ts,
            end_ts: e.end_ts,
            timezone: e
                .timezone
                .parse::<Tz>()
                .map_err(|err| anyhow::anyhow!("Stored timezone is invalid: {}", err))?,
            status: e.status.parse()?,
            visibility: e.visibility.parse()?,
            recurrence: e.recurrence.map(|rule| rule.0),
            recurrence_parent_id: e.recurrence_parent_uid.map(ID::from),
            exdates: e.exdates,
            color: e.color,
            created: e.created,
            updated: e.updated,
        })
    }
}

fn into_events(rows: Vec<EventRaw>) -> anyhow::Result<Vec<CalendarEvent>> {
    rows.into_iter().map(CalendarEvent::try_from).collect()
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn insert(&self, e: &CalendarEvent) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO calendar_events(
                event_uid,
                owner_uid,
                title,
                agenda,
                notes,
                start_ts,
                end_ts,
                timezone,
                status,
                visibility,
                recurrence,
                recurrence_parent_uid,
                exdates,
                color,
                created,
                updated
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(e.id.inner_ref())
        .bind(e.owner_id.inner_ref())
        .bind(&e.title)
        .bind(&e.agenda)
        .bind(&e.notes)
        .bind(e.start_ts)
        .bind(e.end_ts)
        .bind(e.timezone.name())
        .bind(e.status.as_str())
        .bind(e.visibility.as_str())
        .bind(e.recurrence.as_ref().map(Json))
        .bind(e.recurrence_parent_id.as_ref().map(|id| *id.inner_ref()))
        .bind(&e.exdates)
        .bind(&e.color)
        .bind(e.created)
        .bind(e.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_if_unchanged(
        &self,
        e: &CalendarEvent,
        seen: &CalendarEvent,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE calendar_events SET
                owner_uid = $2,
                title = $3,
                agenda = $4,
                notes = $5,
                start_ts = $6,
                end_ts = $7,
                timezone = $8,
                status = $9,
                visibility = $10,
                recurrence = $11,
                recurrence_parent_uid = $12,
                exdates = $13,
                color = $14,
                created = $15,
                updated = $16
            WHERE event_uid = $1 AND status = $17 AND exdates = $18
            "#,
        )
        .bind(e.id.inner_ref())
        .bind(e.owner_id.inner_ref())
        .bind(&e.title)
        .bind(&e.agenda)
        .bind(&e.notes)
        .bind(e.start_ts)
        .bind(e.end_ts)
        .bind(e.timezone.name())
        .bind(e.status.as_str())
        .bind(e.visibility.as_str())
        .bind(e.recurrence.as_ref().map(Json))
        .bind(e.recurrence_parent_id.as_ref().map(|id| *id.inner_ref()))
        .bind(&e.exdates)
        .bind(&e.color)
        .bind(e.created)
        .bind(e.updated)
        .bind(seen.status.as_str())
        .bind(&seen.exdates)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn find(&self, event_id: &ID) -> Option<CalendarEvent> {
        let res = sqlx::query_as::<_, EventRaw>(
            r#"
            SELECT * FROM calendar_events AS e
            WHERE e.event_uid = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await;

        match res {
            Ok(Some(event)) => match CalendarEvent::try_from(event) {
                Ok(event) => Some(event),
                Err(e) => {
                    error!("Unable to read stored event: {:?}. Error: {:?}", event_id, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!("Unable to find event: {:?}. DB returned error: {:?}", event_id, e);
                None
            }
        }
    }

    async fn find_by_owner(
        &self,
        owner_id: &ID,
        timespan: &TimeSpan,
    ) -> anyhow::Result<Vec<CalendarEvent>> {
        let events = sqlx::query_as::<_, EventRaw>(
            r#"
            SELECT * FROM calendar_events AS e
            WHERE e.owner_uid = $1 AND
            e.start_ts <= $2 AND (e.end_ts >= $3 OR e.recurrence IS NOT NULL)
            "#,
        )
        .bind(owner_id.inner_ref())
        .bind(timespan.end())
        .bind(timespan.start())
        .fetch_all(&self.pool)
        .await?;
        into_events(events)
    }

    async fn find_by_timespan(&self, timespan: &TimeSpan) -> anyhow::Result<Vec<CalendarEvent>> {
        let events = sqlx::query_as::<_, EventRaw>(
            r#"
            SELECT * FROM calendar_events AS e
            WHERE e.start_ts <= $1 AND (e.end_ts >= $2 OR e.recurrence IS NOT NULL)
            "#,
        )
        .bind(timespan.end())
        .bind(timespan.start())
        .fetch_all(&self.pool)
        .await?;
        into_events(events)
    }

    async fn find_by_parent(&self, parent_id: &ID) -> anyhow::Result<Vec<CalendarEvent>> {
        let events = sqlx::query_as::<_, EventRaw>(
            r#"
            SELECT * FROM calendar_events AS e
            WHERE e.recurrence_parent_uid = $1
            "#,
        )
        .bind(parent_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        into_events(events)
    }

    async fn delete(&self, event_id: &ID) -> Option<CalendarEvent> {
        let res = sqlx::query_as::<_, EventRaw>(
            r#"
            DELETE FROM calendar_events AS e
            WHERE e.event_uid = $1
            RETURNING *
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await;

        match res {
            Ok(event) => event.and_then(|e| CalendarEvent::try_from(e).ok()),
            Err(e) => {
                error!("Unable to delete event: {:?}. DB returned error: {:?}", event_id, e);
                None
            }
        }
    }

    async fn delete_by_parent(&self, parent_id: &ID) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM calendar_events AS e
            WHERE e.recurrence_parent_uid = $1
            "#,
        )
        .bind(parent_id.inner_ref())
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }

    async fn transition_status(
        &self,
        event_id: &ID,
        from: EventStatus,
        to: EventStatus,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE calendar_events SET status = $3
            WHERE event_uid = $1 AND status = $2
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn add_exdate(&self, event_id: &ID, exdate: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE calendar_events SET exdates = array_append(exdates, $2)
            WHERE event_uid = $1 AND NOT ($2 = ANY(exdates))
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(exdate)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn remove_exdate(&self, event_id: &ID, exdate: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE calendar_events SET exdates = array_remove(exdates, $2)
            WHERE event_uid = $1 AND $2 = ANY(exdates)
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(exdate)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }
}
