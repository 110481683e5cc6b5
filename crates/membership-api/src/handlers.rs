use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use sea_orm::{EntityTrait, PaginatorTrait};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use membership_core::ValidationError;

use crate::models::*;
use crate::services::ServiceError;
use crate::AppState;

/// Translate a service failure into the fixed HTTP mapping: 404 for
/// unknown-resource kinds, 400 for state conflicts, 500 for storage errors.
fn service_error(err: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &err {
        ServiceError::UnknownTeam(_) => (StatusCode::NOT_FOUND, "TEAM_NOT_FOUND"),
        ServiceError::UnknownUser(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        ServiceError::TeamAlreadyComplete(_) => (StatusCode::BAD_REQUEST, "TEAM_ALREADY_COMPLETE"),
        ServiceError::UserAlreadyInATeam { .. } => {
            (StatusCode::BAD_REQUEST, "USER_ALREADY_IN_A_TEAM")
        }
        ServiceError::UserNotAMemberOfTheTeam { .. } => {
            (StatusCode::BAD_REQUEST, "USER_NOT_A_MEMBER_OF_THE_TEAM")
        }
        ServiceError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: Some(code.to_string()),
        }),
    )
}

/// Reject a malformed body before any service method runs.
fn validation_error(err: ValidationError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
            code: Some("VALIDATION_ERROR".to_string()),
        }),
    )
}

/// List all teams, optionally filtered by completeness
#[utoipa::path(
    get,
    path = "/api/teams",
    params(
        ("isComplete" = Option<bool>, Query, description = "Keep only teams whose completeness matches exactly")
    ),
    responses(
        (status = 200, description = "List of teams", body = [TeamDto]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetTeamsQuery>,
) -> Result<Json<Vec<TeamDto>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Listing teams with filter: {:?}", query);

    let teams = state.teams.get_teams(query).await.map_err(service_error)?;

    Ok(Json(teams.into_iter().map(TeamDto::from).collect()))
}

/// Get a specific team by id
#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the queried team")
    ),
    responses(
        (status = 200, description = "Team information", body = TeamDto),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamDto>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Getting team: {}", id);

    let team = state.teams.get_team(id).await.map_err(service_error)?;

    Ok(Json(TeamDto::from(team)))
}

/// Create a new team with no member
#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamCommand,
    responses(
        (status = 201, description = "Team successfully created", body = TeamDto),
        (status = 400, description = "Malformed body", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Json(command): Json<CreateTeamCommand>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    command.validate().map_err(validation_error)?;

    let team = state
        .teams
        .create_team(command)
        .await
        .map_err(service_error)?;
    let location = format!("/api/teams/{}", team.id);

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::LOCATION, location)]),
        Json(TeamDto::from(team)),
    ))
}

/// Rename an existing team; the creation date cannot be updated, hence this
/// endpoint being a PATCH and not a PUT
#[utoipa::path(
    patch,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the targeted team")
    ),
    request_body = PatchTeamCommand,
    responses(
        (status = 200, description = "Team successfully updated", body = TeamDto),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn patch_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(command): Json<PatchTeamCommand>,
) -> Result<Json<TeamDto>, (StatusCode, Json<ErrorResponse>)> {
    command.validate().map_err(validation_error)?;

    let team = state
        .teams
        .patch_team(id, command)
        .await
        .map_err(service_error)?;

    Ok(Json(TeamDto::from(team)))
}

/// Delete a team, detaching all of its members
#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the team to delete")
    ),
    responses(
        (status = 204, description = "Team successfully deleted"),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.teams.delete_team(id).await.map_err(service_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Given its id, retrieve the members of a team
#[utoipa::path(
    get,
    path = "/api/teams/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Id of the queried team")
    ),
    responses(
        (status = 200, description = "Members of the team", body = [UserDto]),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn get_team_members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UserDto>>, (StatusCode, Json<ErrorResponse>)> {
    let members = state
        .teams
        .get_team_members(id)
        .await
        .map_err(service_error)?;

    Ok(Json(members.into_iter().map(UserDto::from).collect()))
}

/// Create a new member in the team from an existing user
#[utoipa::path(
    post,
    path = "/api/teams/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Id of the team in which the user will be added as a member")
    ),
    request_body = CreateTeamMemberCommand,
    responses(
        (status = 201, description = "User successfully added", body = [UserDto]),
        (status = 400, description = "Team complete or user already in a team", body = ErrorResponse),
        (status = 404, description = "Team or user not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn post_team_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(command): Json<CreateTeamMemberCommand>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let team = state
        .teams
        .add_team_member(id, command)
        .await
        .map_err(service_error)?;
    let members = state
        .teams
        .get_team_members(team.id)
        .await
        .map_err(service_error)?;
    let location = format!("/api/teams/{}/members", team.id);

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::LOCATION, location)]),
        Json(members.into_iter().map(UserDto::from).collect::<Vec<_>>()),
    ))
}

/// Remove a user from the team's members
#[utoipa::path(
    delete,
    path = "/api/teams/{id}/members/{member_id}",
    params(
        ("id" = Uuid, Path, description = "Id of the team in which the member will be removed"),
        ("member_id" = Uuid, Path, description = "Id of the user to be removed from the team")
    ),
    responses(
        (status = 204, description = "User successfully removed from the team"),
        (status = 400, description = "This user does not belong to the team", body = ErrorResponse),
        (status = 404, description = "Team or user not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn delete_team_member(
    State(state): State<Arc<AppState>>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .teams
        .remove_team_member(id, member_id)
        .await
        .map_err(service_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// List all users, optionally filtered by team membership
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("hasTeam" = Option<bool>, Query, description = "Keep only users that do (or do not) have a team")
    ),
    responses(
        (status = 200, description = "List of users", body = [UserDto]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetUsersQuery>,
) -> Result<Json<Vec<UserDto>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Listing users with filter: {:?}", query);

    let users = state.users.get_users(query).await.map_err(service_error)?;

    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// Get a specific user by id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the queried user")
    ),
    responses(
        (status = 200, description = "User information", body = UserDto),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDto>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Getting user: {}", id);

    let user = state.users.get_user(id).await.map_err(service_error)?;

    Ok(Json(UserDto::from(user)))
}

/// Create a new user with no team
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserCommand,
    responses(
        (status = 201, description = "User successfully created", body = UserDto),
        (status = 400, description = "Malformed body", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(command): Json<CreateUserCommand>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    command.validate().map_err(validation_error)?;

    let user = state
        .users
        .create_user(command)
        .await
        .map_err(service_error)?;
    let location = format!("/api/users/{}", user.id);

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::LOCATION, location)]),
        Json(UserDto::from(user)),
    ))
}

/// Replace an existing user by its id; team membership is untouched
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the targeted user")
    ),
    request_body = UpdateUserCommand,
    responses(
        (status = 200, description = "User successfully updated", body = UserDto),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(command): Json<UpdateUserCommand>,
) -> Result<Json<UserDto>, (StatusCode, Json<ErrorResponse>)> {
    command.validate().map_err(validation_error)?;

    let user = state
        .users
        .update_user(id, command)
        .await
        .map_err(service_error)?;

    Ok(Json(UserDto::from(user)))
}

/// Partially update a user; missing fields are ignored
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the targeted user")
    ),
    request_body = PatchUserCommand,
    responses(
        (status = 200, description = "User successfully updated", body = UserDto),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn patch_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(command): Json<PatchUserCommand>,
) -> Result<Json<UserDto>, (StatusCode, Json<ErrorResponse>)> {
    command.validate().map_err(validation_error)?;

    let user = state
        .users
        .patch_user(id, command)
        .await
        .map_err(service_error)?;

    Ok(Json(UserDto::from(user)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the user to delete")
    ),
    responses(
        (status = 204, description = "User successfully deleted"),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.users.delete_user(id).await.map_err(service_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ErrorResponse>)> {
    use membership_db::entities::prelude::*;

    let teams = Team::find()
        .count(&state.db)
        .await
        .map_err(|e| service_error(ServiceError::Database(e)))?;
    let users = User::find()
        .count(&state.db)
        .await
        .map_err(|e| service_error(ServiceError::Database(e)))?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        teams,
        users,
    }))
}
