use super::IBookingRequestRepo;
use slotbook_domain::{BookingRequest, BookingStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresBookingRequestRepo {
    pool: PgPool,
}

impl PostgresBookingRequestRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BookingRequestRaw {
    booking_uid: Uuid,
    event_uid: Uuid,
    name: String,
    email: String,
    message: Option<String>,
    timezone_at_booking: Option<String>,
    created: i64,
}

impl From<BookingRequestRaw> for BookingRequest {
    fn from(b: BookingRequestRaw) -> Self {
        Self {
            id: b.booking_uid.into(),
            event_id: b.event_uid.into(),
            name: b.name,
            email: b.email,
            message: b.message,
            timezone_at_booking: b.timezone_at_booking,
            // Confirmed is the only status a stored booking can have
            status: BookingStatus::Confirmed,
            created: b.created,
        }
    }
}

#[async_trait::async_trait]
impl IBookingRequestRepo for PostgresBookingRequestRepo {
    async fn insert(&self, booking: &BookingRequest) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO booking_requests(
                booking_uid,
                event_uid,
                name,
                email,
                message,
                timezone_at_booking,
                status,
                created
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking.id.inner_ref())
        .bind(booking.event_id.inner_ref())
        .bind(&booking.name)
        .bind(&booking.email)
        .bind(&booking.message)
        .bind(&booking.timezone_at_booking)
        .bind(booking.status.as_str())
        .bind(booking.created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, booking_id: &ID) -> Option<BookingRequest> {
        let res = sqlx::query_as::<_, BookingRequestRaw>(
            r#"
            SELECT * FROM booking_requests AS b
            WHERE b.booking_uid = $1
            "#,
        )
        .bind(booking_id.inner_ref())
        .fetch_optional(&self.pool)
        .await;

        match res {
            Ok(booking) => booking.map(|b| b.into()),
            Err(e) => {
                error!("Unable to find booking: {:?}. DB returned error: {:?}", booking_id, e);
                None
            }
        }
    }

    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<BookingRequest>> {
        let bookings = sqlx::query_as::<_, BookingRequestRaw>(
            r#"
            SELECT * FROM booking_requests AS b
            WHERE b.event_uid = $1
            ORDER BY b.created
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings.into_iter().map(|b| b.into()).collect())
    }
}
