use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    models::common::{PaginatedResponse, Pagination},
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{
    CreateMeetingRoomRequest, MeetingRoom, MeetingRoomListQuery, UpdateMeetingRoomRequest,
};

#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<MeetingRoomListQuery>,
) -> impl IntoResponse {
    if query.page < 1 {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::VALIDATION_ERROR, "page 必须大于 1".to_string()),
        );
    }

    match MeetingRoom::find_by_page(
        &state.pool,
        query.name.as_deref(),
        query.location.as_deref(),
        query.page,
        query.page_size,
    )
    .await
    {
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
            tracing::error!("failed to list meeting rooms: {:?}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateMeetingRoomRequest>,
) -> impl IntoResponse {
    // 会议室名称唯一
    match MeetingRoom::find_by_name(&state.pool, &req.name).await {
        Ok(Some(_)) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::VALIDATION_ERROR, "该会议室已存在".to_string()),
            );
        }
        Ok(None) => {}
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            );
        }
    }

    match MeetingRoom::create(&state.pool, &req).await {
        Ok(room) => (StatusCode::OK, success_to_api_response(room)),
        Err(e) => {
            tracing::error!("failed to create meeting room: {:?}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "创建会议室失败".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateMeetingRoomRequest>,
) -> impl IntoResponse {
    match MeetingRoom::update(&state.pool, &req).await {
        Ok(0) => (
            StatusCode::OK,
            error_to_api_response(error_codes::NOT_FOUND, "会议室不存在".to_string()),
        ),
        Ok(_) => (
            StatusCode::OK,
            success_to_api_response("success".to_string()),
        ),
        Err(e) => {
            tracing::error!("failed to update meeting room {}: {:?}", req.id, e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "更新会议室失败".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match MeetingRoom::find_by_id(&state.pool, id).await {
        Ok(Some(room)) => (StatusCode::OK, success_to_api_response(room)),
        Ok(None) => (
            StatusCode::OK,
            error_to_api_response(error_codes::NOT_FOUND, "该会议室不存在".to_string()),
        ),
        Err(_) => (
            StatusCode::OK,
            error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match MeetingRoom::delete(&state.pool, id).await {
        Ok(0) => (
            StatusCode::OK,
            error_to_api_response(error_codes::NOT_FOUND, "该会议室不存在".to_string()),
        ),
        Ok(_) => (
            StatusCode::OK,
            success_to_api_response("success".to_string()),
        ),
        Err(e) => {
            tracing::error!("failed to delete meeting room {}: {:?}", id, e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "删除会议室失败".to_string()),
            )
        }
    }
}
