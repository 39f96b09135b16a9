use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Deserialize)]
pub struct BookingCountQuery {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// 时间段内每个用户的预定次数
#[derive(Debug, Serialize, FromRow)]
pub struct UserBookingCount {
    pub user_id: i64,
    pub username: String,
    pub booking_count: i64,
}

pub async fn user_booking_count(
    pool: &PgPool,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<Vec<UserBookingCount>, sqlx::Error> {
    sqlx::query_as::<_, UserBookingCount>(
        r#"
        SELECT u.id AS user_id, u.username, COUNT(b.id) AS booking_count
        FROM bookings b
        JOIN users u ON b.user_id = u.id
        WHERE b.start_time BETWEEN $1 AND $2
        GROUP BY u.id, u.username
        ORDER BY booking_count DESC
        "#,
    )
    .bind(start_time)
    .bind(end_time)
    .fetch_all(pool)
    .await
}
