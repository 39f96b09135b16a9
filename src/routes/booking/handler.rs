use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    cache::BookingCacheOperations,
    models::common::{PaginatedResponse, Pagination},
    routes::user::model::User,
    utils::{UserClaims, error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{ApplyQuery, Booking, BookingListQuery, CreateBookingError, CreateBookingRequest};

#[axum::debug_handler]
pub async fn add(
    Extension(claims): Extension<UserClaims>,
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    if req.start_time >= req.end_time {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "开始时间必须早于结束时间".to_string(),
            ),
        );
    }

    match Booking::create(&state.pool, claims.user_id, &req).await {
        Ok(booking) => {
            tracing::info!(
                "user {} booked room {} from {} to {}",
                claims.user_id,
                booking.room_id,
                booking.start_time,
                booking.end_time
            );
            (
                StatusCode::OK,
                success_to_api_response("success".to_string()),
            )
        }
        Err(CreateBookingError::RoomNotFound) => (
            StatusCode::OK,
            error_to_api_response(error_codes::NOT_FOUND, "会议室不存在".to_string()),
        ),
        Err(CreateBookingError::SlotConflict) => (
            StatusCode::OK,
            error_to_api_response(error_codes::BOOKING_CONFLICT, "该时间段已被预约".to_string()),
        ),
        Err(CreateBookingError::Database(e)) => {
            tracing::error!("failed to create booking: {:?}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> impl IntoResponse {
    if query.page < 1 {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::VALIDATION_ERROR, "page页码不能小于1".to_string()),
        );
    }

    match Booking::find_by_page(&state.pool, &query).await {
        Ok((list, total)) => (
            StatusCode::OK,
            success_to_api_response(PaginatedResponse {
                list,
                pagination: Pagination {
                    page: query.page,
                    page_size: query.page_size,
                    total: total as u64,
                },
            }),
        ),
        Err(e) => {
            tracing::error!("failed to list bookings: {:?}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            )
        }
    }
}

/// 审批接口：无条件更新状态，持久层失败也只返回错误响应，不中断请求
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Query(query): Query<ApplyQuery>,
) -> impl IntoResponse {
    match Booking::update_status(&state.pool, query.id, &query.status).await {
        Ok(_) => (
            StatusCode::OK,
            success_to_api_response("success".to_string()),
        ),
        Err(e) => {
            tracing::error!("failed to update booking {} status: {:?}", query.id, e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "更新状态失败".to_string()),
            )
        }
    }
}

/// 催办：半小时内同一预定只发一次提醒邮件
#[axum::debug_handler]
pub async fn urge(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match BookingCacheOperations::urge_flag_set(&state.redis, id).await {
        Ok(true) => {
            return (
                StatusCode::OK,
                success_to_api_response("半小时内只能催促一次，请耐心等待".to_string()),
            );
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!("failed to check urge flag: {:?}", e);
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "缓存服务异常".to_string()),
            );
        }
    }

    // 管理员邮箱优先取缓存，未命中时查库并长期缓存
    let email = match BookingCacheOperations::get_admin_email(&state.redis).await {
        Ok(Some(email)) => email,
        Ok(None) => match User::find_admin_email(&state.pool).await {
            Ok(Some(email)) => {
                if let Err(e) = BookingCacheOperations::cache_admin_email(&state.redis, &email).await
                {
                    tracing::warn!("failed to cache admin email: {:?}", e);
                }
                email
            }
            Ok(None) => {
                return (
                    StatusCode::OK,
                    error_to_api_response(error_codes::NOT_FOUND, "管理员不存在".to_string()),
                );
            }
            Err(e) => {
                tracing::error!("failed to look up admin email: {:?}", e);
                return (
                    StatusCode::OK,
                    error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
                );
            }
        },
        Err(e) => {
            tracing::error!("failed to read cached admin email: {:?}", e);
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "缓存服务异常".to_string()),
            );
        }
    };

    // 发送失败时冷却标记照常设置
    if let Err(e) = state
        .email
        .send_mail(
            &email,
            "催促管理员审批预定",
            &format!("id 为 {} 的预定申请正在等待审批", id),
        )
        .await
    {
        tracing::error!("failed to send urge mail for booking {}: {:#}", id, e);
    }

    if let Err(e) =
        BookingCacheOperations::set_urge_flag(&state.redis, id, state.config.urge_cooldown_secs)
            .await
    {
        tracing::error!("failed to set urge flag for booking {}: {:?}", id, e);
    }

    (
        StatusCode::OK,
        success_to_api_response("success".to_string()),
    )
}
