//! Service layer: orchestrates invariant checks around persistence calls
//! and notification dispatch
//!
//! Every failure is detected before any persistent mutation (fail-fast, no
//! partial writes), and every successful mutating operation publishes
//! exactly one notification after the write.

mod team;
mod user;

pub use team::TeamService;
pub use user::UserService;

use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Typed failures surfaced by the team and user services.
///
/// The handlers translate unknown-resource kinds to HTTP 404 and
/// state-conflict kinds to HTTP 400; no retries anywhere, every failure is
/// terminal for the current request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no team found for id {0}")]
    UnknownTeam(Uuid),

    #[error("no user found for id {0}")]
    UnknownUser(Uuid),

    #[error("team {0} is complete and can't have any other member")]
    TeamAlreadyComplete(Uuid),

    #[error("user {user} already has a team and can't join team {team}")]
    UserAlreadyInATeam { user: Uuid, team: Uuid },

    #[error("user {user} does not belong to team {team}")]
    UserNotAMemberOfTheTeam { user: Uuid, team: Uuid },

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}
