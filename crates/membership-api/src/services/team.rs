//! Team service: command and query operations over the Team resource
//!
//! Membership changes go through the user service's internal operations so
//! the user→team reference stays consistent, then the team's completeness
//! flag is recomputed before the notification fires.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use membership_core::TeamCapacity;
use membership_db::entities::{team, user};
use membership_notify::{Notification, NotificationPublisher, Operation, Resource};

use crate::models::{CreateTeamCommand, CreateTeamMemberCommand, GetTeamsQuery, PatchTeamCommand};
use crate::services::{ServiceError, UserService};

/// Handles Team-related operations.
#[derive(Clone)]
pub struct TeamService {
    db: DatabaseConnection,
    publisher: Arc<dyn NotificationPublisher>,
    capacity: TeamCapacity,
    users: UserService,
}

impl TeamService {
    pub fn new(
        db: DatabaseConnection,
        publisher: Arc<dyn NotificationPublisher>,
        capacity: TeamCapacity,
        users: UserService,
    ) -> Self {
        Self {
            db,
            publisher,
            capacity,
            users,
        }
    }

    /// The member capacity shared by every team.
    pub fn capacity(&self) -> TeamCapacity {
        self.capacity
    }

    /// Try to retrieve a team by its id.
    pub async fn retrieve_team_by_id(&self, team_id: Uuid) -> Result<team::Model, ServiceError> {
        team::Entity::find_by_id(team_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                error!("Unknown team of id {}", team_id);
                ServiceError::UnknownTeam(team_id)
            })
    }

    async fn member_count(&self, team_id: Uuid) -> Result<u64, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::TeamId.eq(team_id))
            .count(&self.db)
            .await?)
    }

    /// Create a new team with no member.
    pub async fn create_team(&self, command: CreateTeamCommand) -> Result<team::Model, ServiceError> {
        let created = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(command.name),
            created_at: Set(Utc::now()),
            is_complete: Set(false),
        }
        .insert(&self.db)
        .await?;

        info!("New team created: {} ({})", created.name, created.id);

        self.publisher
            .publish(Notification::created(Resource::Team, created.id));

        Ok(created)
    }

    /// Delete a team, detaching every current member first so no user is
    /// left referencing a missing team.
    pub async fn delete_team(&self, team_id: Uuid) -> Result<(), ServiceError> {
        let to_delete = self.retrieve_team_by_id(team_id).await?;

        let members = to_delete.find_related(user::Entity).all(&self.db).await?;
        for member in &members {
            self.users.leave_team(member.id).await?;
        }

        to_delete.delete(&self.db).await?;

        info!("Successfully deleted team {}", team_id);

        self.publisher
            .publish(Notification::deleted(Resource::Team, team_id));

        Ok(())
    }

    /// Add an existing user to the team's members and recompute the
    /// completeness flag.
    pub async fn add_team_member(
        &self,
        team_id: Uuid,
        command: CreateTeamMemberCommand,
    ) -> Result<team::Model, ServiceError> {
        let team = self.retrieve_team_by_id(team_id).await?;

        let member_count = self.member_count(team.id).await?;
        if !self.capacity.can_accept_member(member_count) {
            error!(
                "Team {} is full and can't have any other member",
                team.id
            );
            return Err(ServiceError::TeamAlreadyComplete(team.id));
        }

        let user = self.users.add_to_team(command.member_to_add_id, &team).await?;

        // Completeness changes only through membership operations, so the
        // new count is the resolved one plus this member.
        let mut active: team::ActiveModel = team.into();
        active.is_complete = Set(self.capacity.is_complete(member_count + 1));
        let team = active.update(&self.db).await?;

        info!(
            "User {} successfully added to the members of team {}",
            user.id, team.id
        );

        self.publisher.publish(Notification::operation(
            Resource::Team,
            Operation::MemberAdded,
            team.id,
        ));

        Ok(team)
    }

    /// Remove a user from the team's members. Removing a member from a
    /// complete team always makes it incomplete again.
    pub async fn remove_team_member(
        &self,
        team_id: Uuid,
        member_id: Uuid,
    ) -> Result<(), ServiceError> {
        let team = self.retrieve_team_by_id(team_id).await?;
        let member = self.users.retrieve_user_by_id(member_id).await?;

        if member.team_id != Some(team.id) {
            error!(
                "Unable to remove user {} from team {}: not a member",
                member_id, team.id
            );
            return Err(ServiceError::UserNotAMemberOfTheTeam {
                user: member_id,
                team: team.id,
            });
        }

        self.users.leave_team(member_id).await?;

        // A single-step removal from a complete team flips the flag
        // directly, no recount needed.
        if team.is_complete {
            let mut active: team::ActiveModel = team.into();
            active.is_complete = Set(false);
            active.update(&self.db).await?;
        }

        info!(
            "User {} successfully removed from the members of team {}",
            member_id, team_id
        );

        self.publisher.publish(Notification::operation(
            Resource::Team,
            Operation::MemberRemoved,
            team_id,
        ));

        Ok(())
    }

    /// Rename a team; the creation timestamp is immutable under rename.
    pub async fn patch_team(
        &self,
        team_id: Uuid,
        command: PatchTeamCommand,
    ) -> Result<team::Model, ServiceError> {
        let target = self.retrieve_team_by_id(team_id).await?;

        let mut active: team::ActiveModel = target.into();
        active.name = Set(command.name);
        let updated = active.update(&self.db).await?;

        info!("Updated team: {} ({})", updated.name, updated.id);

        self.publisher.publish(Notification::operation(
            Resource::Team,
            Operation::TeamRenamed,
            updated.id,
        ));

        Ok(updated)
    }

    /// Retrieve a team by its id.
    pub async fn get_team(&self, team_id: Uuid) -> Result<team::Model, ServiceError> {
        self.retrieve_team_by_id(team_id).await
    }

    /// Given its id, retrieve the members of a team.
    pub async fn get_team_members(&self, team_id: Uuid) -> Result<Vec<user::Model>, ServiceError> {
        let team = self.retrieve_team_by_id(team_id).await?;
        Ok(team.find_related(user::Entity).all(&self.db).await?)
    }

    /// Retrieve all teams, optionally filtered by completeness.
    pub async fn get_teams(&self, query: GetTeamsQuery) -> Result<Vec<team::Model>, ServiceError> {
        let teams = match query.is_complete {
            Some(filter) => {
                team::Entity::find()
                    .filter(team::Column::IsComplete.eq(filter))
                    .all(&self.db)
                    .await?
            }
            None => team::Entity::find().all(&self.db).await?,
        };

        info!("Retrieved {} teams", teams.len());

        Ok(teams)
    }
}
