//! REST layer for the membership-management API
//!
//! Controllers map HTTP verbs to command/query objects and hand them to the
//! services; the services run the membership invariant checks around the
//! persistence calls and dispatch one notification per successful write.

pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    http::{header, Method, StatusCode},
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use membership_core::TeamCapacity;
use membership_notify::NotificationPublisher;
use sea_orm::DatabaseConnection;
use services::{TeamService, UserService};

/// Application state shared across handlers
pub struct AppState {
    pub teams: TeamService,
    pub users: UserService,
    pub db: DatabaseConnection,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Membership Management API",
        version = "0.1.0",
        description = "REST API for managing teams and their member users"
    ),
    paths(
        handlers::list_teams,
        handlers::get_team,
        handlers::create_team,
        handlers::patch_team,
        handlers::delete_team,
        handlers::get_team_members,
        handlers::post_team_member,
        handlers::delete_team_member,
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::patch_user,
        handlers::delete_user,
        handlers::health_check,
    ),
    components(
        schemas(
            models::TeamDto,
            models::UserDto,
            models::CreateTeamCommand,
            models::PatchTeamCommand,
            models::CreateTeamMemberCommand,
            models::CreateUserCommand,
            models::UpdateUserCommand,
            models::PatchUserCommand,
            models::GetTeamsQuery,
            models::GetUsersQuery,
            models::HealthResponse,
            models::ErrorResponse,
        )
    ),
    tags(
        (name = "teams", description = "Team management endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
    /// Member count at which a team is complete
    pub team_capacity: TeamCapacity,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
            team_capacity: TeamCapacity::default(),
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        config: ApiServerConfig,
        db: DatabaseConnection,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        let users = UserService::new(db.clone(), publisher.clone());
        let teams = TeamService::new(
            db.clone(),
            publisher,
            config.team_capacity,
            users.clone(),
        );

        let state = Arc::new(AppState { teams, users, db });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        // Get the OpenAPI spec
        let api_doc = ApiDoc::openapi();

        let api_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route(
                "/api/teams",
                get(handlers::list_teams).post(handlers::create_team),
            )
            .route(
                "/api/teams/{id}",
                get(handlers::get_team)
                    .patch(handlers::patch_team)
                    .delete(handlers::delete_team),
            )
            .route(
                "/api/teams/{id}/members",
                get(handlers::get_team_members).post(handlers::post_team_member),
            )
            .route(
                "/api/teams/{id}/members/{member_id}",
                axum::routing::delete(handlers::delete_team_member),
            )
            .route(
                "/api/users",
                get(handlers::list_users).post(handlers::create_user),
            )
            .route(
                "/api/users/{id}",
                get(handlers::get_user)
                    .put(handlers::update_user)
                    .patch(handlers::patch_user)
                    .delete(handlers::delete_user),
            )
            .with_state(self.state.clone());

        // Merge with Swagger UI
        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router)
            .fallback(|| async { StatusCode::NOT_FOUND });

        // Build middleware stack
        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                ])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(Any);

            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        // Ensure OpenAPI spec can be generated without panics
        let _api_doc = ApiDoc::openapi();
    }
}
