use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// 预定状态
pub mod status {
    pub const APPLYING: &str = "applying";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
    pub const RELEASED: &str = "released";
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub note: String,
    pub user_id: i64,
    pub room_id: i64,
    pub create_time: DateTime<Utc>,
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub meeting_room_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplyQuery {
    pub id: i64,
    pub status: String,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub username: Option<String>,
    pub room_name: Option<String>,
    pub position: Option<String>,
    pub time_range_start: Option<DateTime<Utc>>,
    pub time_range_end: Option<DateTime<Utc>>,
}

/// 预定列表项，带预定人和会议室摘要
#[derive(Debug, Serialize)]
pub struct BookingDetail {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub note: String,
    pub create_time: DateTime<Utc>,
    pub user: BookingUser,
    pub room: BookingRoom,
}

#[derive(Debug, Serialize)]
pub struct BookingUser {
    pub id: i64,
    pub username: String,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
pub struct BookingRoom {
    pub id: i64,
    pub name: String,
    pub location: String,
}

#[derive(Debug, FromRow)]
struct BookingListRow {
    id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
    note: String,
    create_time: DateTime<Utc>,
    user_id: i64,
    username: String,
    nickname: String,
    room_id: i64,
    room_name: String,
    room_location: String,
}

impl From<BookingListRow> for BookingDetail {
    fn from(row: BookingListRow) -> Self {
        BookingDetail {
            id: row.id,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status,
            note: row.note,
            create_time: row.create_time,
            user: BookingUser {
                id: row.user_id,
                username: row.username,
                nickname: row.nickname,
            },
            room: BookingRoom {
                id: row.room_id,
                name: row.room_name,
                location: row.room_location,
            },
        }
    }
}

#[derive(Debug)]
pub enum CreateBookingError {
    RoomNotFound,
    SlotConflict,
    Database(sqlx::Error),
}

impl From<sqlx::Error> for CreateBookingError {
    fn from(e: sqlx::Error) -> Self {
        CreateBookingError::Database(e)
    }
}

/// 半开区间 [start, end) 的重叠判断
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

impl Booking {
    /// 创建预定。同一会议室内与未驳回、未解除的预定时间段重叠时拒绝。
    /// 事务内先锁定会议室行再检查并写入，避免并发请求同时通过检查。
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        req: &CreateBookingRequest,
    ) -> Result<Self, CreateBookingError> {
        let mut tx = pool.begin().await?;

        let room_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM meeting_rooms WHERE id = $1 FOR UPDATE")
                .bind(req.meeting_room_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(room_id) = room_id else {
            return Err(CreateBookingError::RoomNotFound);
        };

        // 预定人来自已验证的 token，这里只确认记录仍然存在
        let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CreateBookingError::Database(sqlx::Error::RowNotFound))?;

        let active: Vec<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT start_time, end_time
            FROM bookings
            WHERE room_id = $1 AND status NOT IN ($2, $3)
            "#,
        )
        .bind(room_id)
        .bind(status::REJECTED)
        .bind(status::RELEASED)
        .fetch_all(&mut *tx)
        .await?;

        if active
            .iter()
            .any(|&(start, end)| overlaps(start, end, req.start_time, req.end_time))
        {
            return Err(CreateBookingError::SlotConflict);
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (start_time, end_time, status, note, user_id, room_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, start_time, end_time, status, note, user_id, room_id,
                      create_time, update_time
            "#,
        )
        .bind(req.start_time)
        .bind(req.end_time)
        .bind(status::APPLYING)
        .bind(&req.note)
        .bind(user_id)
        .bind(room_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(booking)
    }

    /// 无条件更新预定状态
    pub async fn update_status(
        pool: &PgPool,
        booking_id: i64,
        status: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE bookings SET status = $1, update_time = now() WHERE id = $2")
                .bind(status)
                .bind(booking_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// 分页查询预定，预定人、会议室名称和位置支持模糊匹配，
    /// 开始时间支持范围过滤（未传范围结束时默认开始后一小时）
    pub async fn find_by_page(
        pool: &PgPool,
        query: &BookingListQuery,
    ) -> Result<(Vec<BookingDetail>, i64), sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut bindings: Vec<String> = Vec::new();

        if let Some(username) = query.username.as_deref().filter(|s| !s.is_empty()) {
            bindings.push(format!("%{}%", username));
            conditions.push(format!("u.username LIKE ${}", bindings.len()));
        }
        if let Some(room_name) = query.room_name.as_deref().filter(|s| !s.is_empty()) {
            bindings.push(format!("%{}%", room_name));
            conditions.push(format!("m.name LIKE ${}", bindings.len()));
        }
        if let Some(position) = query.position.as_deref().filter(|s| !s.is_empty()) {
            bindings.push(format!("%{}%", position));
            conditions.push(format!("m.location LIKE ${}", bindings.len()));
        }

        let mut next_index = bindings.len() + 1;
        let time_range = query.time_range_start.map(|start| {
            let end = query
                .time_range_end
                .unwrap_or_else(|| start + Duration::hours(1));
            conditions.push(format!(
                "b.start_time BETWEEN ${} AND ${}",
                next_index,
                next_index + 1
            ));
            next_index += 2;
            (start, end)
        });

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM bookings b \
             JOIN users u ON b.user_id = u.id \
             JOIN meeting_rooms m ON b.room_id = m.id {}",
            where_clause
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for binding in &bindings {
            count_query = count_query.bind(binding);
        }
        if let Some((start, end)) = time_range {
            count_query = count_query.bind(start).bind(end);
        }
        let total = count_query.fetch_one(pool).await?;

        let sql = format!(
            "SELECT b.id, b.start_time, b.end_time, b.status, b.note, b.create_time, \
             u.id AS user_id, u.username, u.nickname, \
             m.id AS room_id, m.name AS room_name, m.location AS room_location \
             FROM bookings b \
             JOIN users u ON b.user_id = u.id \
             JOIN meeting_rooms m ON b.room_id = m.id \
             {} ORDER BY b.start_time DESC LIMIT ${} OFFSET ${}",
            where_clause,
            next_index,
            next_index + 1,
        );
        let mut list_query = sqlx::query_as::<_, BookingListRow>(&sql);
        for binding in &bindings {
            list_query = list_query.bind(binding);
        }
        if let Some((start, end)) = time_range {
            list_query = list_query.bind(start).bind(end);
        }
        let rows = list_query
            .bind(query.page_size as i64)
            .bind(((query.page - 1) * query.page_size) as i64)
            .fetch_all(pool)
            .await?;

        Ok((rows.into_iter().map(BookingDetail::from).collect(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, hour, min, 0).unwrap()
    }

    #[test]
    fn partial_overlap_at_tail_conflicts() {
        // 已有 10:00-11:00，新预定 10:30-11:30
        assert!(overlaps(at(10, 0), at(11, 0), at(10, 30), at(11, 30)));
    }

    #[test]
    fn back_to_back_does_not_conflict() {
        // 半开区间，11:00-12:00 紧接 10:00-11:00 不算重叠
        assert!(!overlaps(at(10, 0), at(11, 0), at(11, 0), at(12, 0)));
        assert!(!overlaps(at(11, 0), at(12, 0), at(10, 0), at(11, 0)));
    }

    #[test]
    fn new_interval_containing_existing_conflicts() {
        // 旧的包含式检查漏掉的方向：新预定完全覆盖已有预定
        assert!(overlaps(at(10, 0), at(11, 0), at(9, 0), at(12, 0)));
    }

    #[test]
    fn existing_interval_containing_new_conflicts() {
        assert!(overlaps(at(9, 0), at(12, 0), at(10, 0), at(11, 0)));
    }

    #[test]
    fn partial_overlap_at_head_conflicts() {
        assert!(overlaps(at(10, 0), at(11, 0), at(9, 30), at(10, 30)));
    }

    #[test]
    fn identical_interval_conflicts() {
        assert!(overlaps(at(10, 0), at(11, 0), at(10, 0), at(11, 0)));
    }

    #[test]
    fn disjoint_intervals_do_not_conflict() {
        assert!(!overlaps(at(10, 0), at(11, 0), at(14, 0), at(15, 0)));
    }
}
