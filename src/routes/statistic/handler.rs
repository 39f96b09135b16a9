use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{self, BookingCountQuery};

#[axum::debug_handler]
pub async fn user_booking_count(
    State(state): State<AppState>,
    Query(query): Query<BookingCountQuery>,
) -> impl IntoResponse {
    match model::user_booking_count(&state.pool, query.start_time, query.end_time).await {
        Ok(list) => (StatusCode::OK, success_to_api_response(list)),
        Err(e) => {
            tracing::error!("failed to count bookings per user: {:?}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            )
        }
    }
}
