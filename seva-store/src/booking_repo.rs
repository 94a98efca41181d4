use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use seva_core::{
    Booking, BookingFilter, BookingRepository, PaymentStatus, RepoError,
};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    receipt_number: String,
    order_id: String,
    offering_id: i32,
    devotee_name: String,
    star_sign: String,
    payment_method: String,
    requested_date: Option<NaiveDate>,
    sequence_number: i32,
    payment_status: String,
    amount: i32,
    transaction_id: Option<String>,
    failure_reason: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepoError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let payment_status = PaymentStatus::parse(&row.payment_status)
            .ok_or_else(|| format!("unknown payment status '{}'", row.payment_status))?;
        Ok(Booking {
            id: row.id,
            receipt_number: row.receipt_number,
            order_id: row.order_id,
            offering_id: row.offering_id,
            devotee_name: row.devotee_name,
            star_sign: row.star_sign,
            payment_method: row.payment_method,
            requested_date: row.requested_date,
            sequence_number: row.sequence_number as u32,
            payment_status,
            amount: row.amount,
            transaction_id: row.transaction_id,
            failure_reason: row.failure_reason,
            completed_at: row.completed_at,
            created_at: row.created_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, receipt_number, order_id, offering_id, devotee_name, \
     star_sign, payment_method, requested_date, sequence_number, payment_status, amount, \
     transaction_id, failure_reason, completed_at, created_at";

fn rows_to_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, RepoError> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn count(
        &self,
        offering_id: i32,
        date: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> Result<u32, RepoError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings \
             WHERE offering_id = $1 \
               AND ($2::date IS NULL OR requested_date = $2) \
               AND ($3::text IS NULL OR payment_status = $3)",
        )
        .bind(offering_id)
        .bind(date)
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u32)
    }

    async fn count_all(&self, status: Option<PaymentStatus>) -> Result<u32, RepoError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE ($1::text IS NULL OR payment_status = $1)",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u32)
    }

    async fn completed_revenue(&self) -> Result<i64, RepoError> {
        let (revenue,): (Option<i64>,) = sqlx::query_as(
            "SELECT SUM(amount)::bigint FROM bookings WHERE payment_status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(revenue.unwrap_or(0))
    }

    async fn insert(&self, booking: &Booking) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO bookings (id, receipt_number, order_id, offering_id, devotee_name, \
             star_sign, payment_method, requested_date, sequence_number, payment_status, \
             amount, transaction_id, failure_reason, completed_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(booking.id)
        .bind(&booking.receipt_number)
        .bind(&booking.order_id)
        .bind(booking.offering_id)
        .bind(&booking.devotee_name)
        .bind(&booking.star_sign)
        .bind(&booking.payment_method)
        .bind(booking.requested_date)
        .bind(booking.sequence_number as i32)
        .bind(booking.payment_status.as_str())
        .bind(booking.amount)
        .bind(&booking.transaction_id)
        .bind(&booking.failure_reason)
        .bind(booking.completed_at)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Booking>, RepoError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn update(&self, booking: &Booking) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE bookings SET sequence_number = $2, payment_status = $3, \
             transaction_id = $4, failure_reason = $5, completed_at = $6 \
             WHERE id = $1",
        )
        .bind(booking.id)
        .bind(booking.sequence_number as i32)
        .bind(booking.payment_status.as_str())
        .bind(&booking.transaction_id)
        .bind(&booking.failure_reason)
        .bind(booking.completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(format!("booking {} does not exist", booking.id).into());
        }
        Ok(())
    }

    async fn list_completed(&self, offering_id: i32) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE offering_id = $1 AND payment_status = 'completed' \
             ORDER BY sequence_number"
        ))
        .bind(offering_id)
        .fetch_all(&self.pool)
        .await?;
        rows_to_bookings(rows)
    }

    async fn list_recent_completed(&self, limit: u32) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE payment_status = 'completed' \
             ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows_to_bookings(rows)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<(Vec<Booking>, u32), RepoError> {
        let limit = filter.limit.max(1) as i64;
        let offset = (filter.page.max(1) as i64 - 1) * limit;

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE ($1::int IS NULL OR offering_id = $1) \
               AND ($2::text IS NULL OR payment_status = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(filter.offering_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings \
             WHERE ($1::int IS NULL OR offering_id = $1) \
               AND ($2::text IS NULL OR payment_status = $2)",
        )
        .bind(filter.offering_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;

        Ok((rows_to_bookings(rows)?, total as u32))
    }
}
