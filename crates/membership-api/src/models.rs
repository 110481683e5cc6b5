use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use membership_core::{validate_age, validate_name, ValidationError};
use membership_db::entities::{team, user};

/// Team resource as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamDto {
    /// Unique team identifier
    pub id: Uuid,
    /// Team name
    pub name: String,
    /// Creation timestamp; never changes, renames preserve it
    pub created_at: DateTime<Utc>,
    /// Whether the team has reached its member capacity
    pub is_complete: bool,
}

impl From<team::Model> for TeamDto {
    fn from(model: team::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at,
            is_complete: model.is_complete,
        }
    }
}

/// User resource as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    /// Unique user identifier
    pub id: Uuid,
    /// Firstname of the user
    pub firstname: String,
    /// Last name of the user
    pub name: String,
    /// Age of the user
    pub age: i32,
    /// Team the user belongs to, absent when the user has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
}

impl From<user::Model> for UserDto {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            firstname: model.firstname,
            name: model.name,
            age: model.age,
            team_id: model.team_id,
        }
    }
}

/// Command to create a new team with no member
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTeamCommand {
    /// Name of the team to create
    pub name: String,
}

impl CreateTeamCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)
    }
}

/// Command to rename an existing team
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PatchTeamCommand {
    /// New name of the team
    pub name: String,
}

impl PatchTeamCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)
    }
}

/// Command to add an existing user to a team's members
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberCommand {
    /// Id of the user to add to the team
    pub member_to_add_id: Uuid,
}

/// Command to create a new user with no team
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserCommand {
    /// Firstname of the user
    pub firstname: String,
    /// Last name of the user
    pub name: String,
    /// Age of the user
    pub age: i32,
}

impl CreateUserCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("firstname", &self.firstname)?;
        validate_name("name", &self.name)?;
        validate_age(self.age)
    }
}

/// Command to replace a user in full; team membership is untouched
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserCommand {
    /// Firstname of the user
    pub firstname: String,
    /// Last name of the user
    pub name: String,
    /// Age of the user
    pub age: i32,
}

impl UpdateUserCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("firstname", &self.firstname)?;
        validate_name("name", &self.name)?;
        validate_age(self.age)
    }
}

/// Command to partially update a user; missing fields are ignored
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PatchUserCommand {
    /// New firstname, if supplied
    pub firstname: Option<String>,
    /// New last name, if supplied
    pub name: Option<String>,
    /// New age, if supplied
    pub age: Option<i32>,
}

impl PatchUserCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(firstname) = &self.firstname {
            validate_name("firstname", firstname)?;
        }
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        Ok(())
    }
}

/// Query parameters for listing teams
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GetTeamsQuery {
    /// When present, keep only teams whose completeness matches exactly
    #[serde(rename = "isComplete")]
    pub is_complete: Option<bool>,
}

/// Query parameters for listing users
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GetUsersQuery {
    /// When present, keep only users that do (or do not) have a team
    #[serde(rename = "hasTeam")]
    pub has_team: Option<bool>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Number of stored teams
    pub teams: u64,
    /// Number of stored users
    pub users: u64,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
