use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct MeetingRoom {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub location: String,
    pub equipment: String,
    pub description: String,
    pub is_booked: bool,
    pub create_time: DateTime<Utc>,
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMeetingRoomRequest {
    pub name: String,
    pub capacity: i32,
    pub location: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeetingRoomRequest {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub location: String,
    pub equipment: Option<String>,
    pub description: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct MeetingRoomListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub name: Option<String>,
    pub location: Option<String>,
}

const ROOM_COLUMNS: &str =
    "id, name, capacity, location, equipment, description, is_booked, create_time, update_time";

impl MeetingRoom {
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM meeting_rooms WHERE id = $1", ROOM_COLUMNS);
        sqlx::query_as::<_, MeetingRoom>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM meeting_rooms WHERE name = $1", ROOM_COLUMNS);
        sqlx::query_as::<_, MeetingRoom>(&sql)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        req: &CreateMeetingRoomRequest,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO meeting_rooms (name, capacity, location, equipment, description) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            ROOM_COLUMNS
        );
        sqlx::query_as::<_, MeetingRoom>(&sql)
            .bind(&req.name)
            .bind(req.capacity)
            .bind(&req.location)
            .bind(&req.equipment)
            .bind(&req.description)
            .fetch_one(pool)
            .await
    }

    /// 更新会议室信息，设备和描述缺省时保留原值
    pub async fn update(
        pool: &PgPool,
        req: &UpdateMeetingRoomRequest,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE meeting_rooms
            SET name = $1,
                capacity = $2,
                location = $3,
                equipment = COALESCE($4, equipment),
                description = COALESCE($5, description),
                update_time = now()
            WHERE id = $6
            "#,
        )
        .bind(&req.name)
        .bind(req.capacity)
        .bind(&req.location)
        .bind(req.equipment.as_deref())
        .bind(req.description.as_deref())
        .bind(req.id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM meeting_rooms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// 分页查询会议室，名称和位置支持模糊匹配
    pub async fn find_by_page(
        pool: &PgPool,
        name: Option<&str>,
        location: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut bindings: Vec<String> = Vec::new();

        if let Some(name) = name.filter(|s| !s.is_empty()) {
            bindings.push(format!("%{}%", name));
            conditions.push(format!("name LIKE ${}", bindings.len()));
        }
        if let Some(location) = location.filter(|s| !s.is_empty()) {
            bindings.push(format!("%{}%", location));
            conditions.push(format!("location LIKE ${}", bindings.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM meeting_rooms {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for binding in &bindings {
            count_query = count_query.bind(binding);
        }
        let total = count_query.fetch_one(pool).await?;

        let sql = format!(
            "SELECT {} FROM meeting_rooms {} ORDER BY id LIMIT ${} OFFSET ${}",
            ROOM_COLUMNS,
            where_clause,
            bindings.len() + 1,
            bindings.len() + 2,
        );
        let mut query = sqlx::query_as::<_, MeetingRoom>(&sql);
        for binding in &bindings {
            query = query.bind(binding);
        }
        let list = query
            .bind(page_size as i64)
            .bind(((page - 1) * page_size) as i64)
            .fetch_all(pool)
            .await?;

        Ok((list, total))
    }
}
