//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::http::{
        CreateRoomRequest, CreateRoomResponse, ErrorResponseDto, HealthDto, JoinRoomRequest,
        JoinRoomResponse, MessageDetailDto, RoomDetailDto, RoomMessagesDto, RoomSummaryDto,
    },
    ui::state::AppState,
    usecase::{CreateRoomError, GetRoomDetailError, GetRoomMessagesError, JoinRoomError},
};
use chatrelay_shared::time::{get_timestamp_millis, timestamp_to_rfc3339};

/// Error response with a `{ "error": ... }` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponseDto {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<CreateRoomError> for ApiError {
    fn from(e: CreateRoomError) -> Self {
        let status = match e {
            CreateRoomError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CreateRoomError::Repository(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, e.to_string())
    }
}

impl From<JoinRoomError> for ApiError {
    fn from(e: JoinRoomError) -> Self {
        let status = match e {
            JoinRoomError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            JoinRoomError::RoomNotFound => StatusCode::NOT_FOUND,
            JoinRoomError::UsernameTaken(_) => StatusCode::CONFLICT,
            JoinRoomError::IdAllocationExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, e.to_string())
    }
}

impl From<GetRoomDetailError> for ApiError {
    fn from(e: GetRoomDetailError) -> Self {
        Self::new(StatusCode::NOT_FOUND, e.to_string())
    }
}

impl From<GetRoomMessagesError> for ApiError {
    fn from(e: GetRoomMessagesError) -> Self {
        Self::new(StatusCode::NOT_FOUND, e.to_string())
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let stats = state.get_relay_stats_usecase.execute().await;
    Json(HealthDto {
        status: "healthy".to_string(),
        active_rooms: stats.active_rooms,
        active_connections: stats.active_connections,
        timestamp: timestamp_to_rfc3339(get_timestamp_millis()),
    })
}

/// Create a room with the caller as its creator
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    let Json(request) = payload?;
    let (room, creator) = state
        .create_room_usecase
        .execute(request.room_name, request.username)
        .await?;

    // Domain Model から DTO への変換
    let response = CreateRoomResponse {
        invite_link: state.config.invite_link(room.id.as_str()),
        room_id: room.id.into_string(),
        room_name: room.name.into_string(),
        member_id: creator.id.into_string(),
        username: creator.username.into_string(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let room = state.get_room_detail_usecase.execute(room_id).await?;
    Ok(Json(RoomDetailDto::from(&room)))
}

/// Join an existing room
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<JoinRoomRequest>, JsonRejection>,
) -> Result<Json<JoinRoomResponse>, ApiError> {
    let Json(request) = payload?;
    let (room, member) = state
        .join_room_usecase
        .execute(room_id, request.username)
        .await?;

    Ok(Json(JoinRoomResponse {
        member_id: member.id.into_string(),
        username: member.username.into_string(),
        room_id: room.id.into_string(),
        room_name: room.name.into_string(),
    }))
}

/// Get the retained message history of a room
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomMessagesDto>, ApiError> {
    let messages = state
        .get_room_messages_usecase
        .execute(room_id.clone())
        .await?;

    Ok(Json(RoomMessagesDto {
        room_id,
        messages: messages.iter().map(MessageDetailDto::from).collect(),
    }))
}
