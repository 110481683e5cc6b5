//! User service: command and query operations over the User resource

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use membership_db::entities::{team, user};
use membership_notify::{Notification, NotificationPublisher, Operation, Resource};

use crate::models::{CreateUserCommand, GetUsersQuery, PatchUserCommand, UpdateUserCommand};
use crate::services::ServiceError;

/// Handles User-related operations.
///
/// Also exposes the two internal membership operations (`add_to_team`,
/// `leave_team`) the team service uses to keep the user→team reference
/// consistent; those never notify, notification is the caller's
/// responsibility once per logical operation.
#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    publisher: Arc<dyn NotificationPublisher>,
}

impl UserService {
    pub fn new(db: DatabaseConnection, publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self { db, publisher }
    }

    /// Try to retrieve a user by its id.
    pub async fn retrieve_user_by_id(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                error!("Unknown user of id {}", user_id);
                ServiceError::UnknownUser(user_id)
            })
    }

    /// Create a new user with no team.
    pub async fn create_user(&self, command: CreateUserCommand) -> Result<user::Model, ServiceError> {
        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            firstname: Set(command.firstname),
            name: Set(command.name),
            age: Set(command.age),
            team_id: Set(None),
        }
        .insert(&self.db)
        .await?;

        info!("New user created: {} {} ({})", created.firstname, created.name, created.id);

        self.publisher
            .publish(Notification::created(Resource::User, created.id));

        Ok(created)
    }

    /// Delete a user. If the user was a member of a complete team, the team
    /// is no longer complete once the row is gone.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let to_delete = self.retrieve_user_by_id(user_id).await?;
        let team_id = to_delete.team_id;

        to_delete.delete(&self.db).await?;

        if let Some(team_id) = team_id {
            if let Some(former_team) = team::Entity::find_by_id(team_id).one(&self.db).await? {
                if former_team.is_complete {
                    let mut active: team::ActiveModel = former_team.into();
                    active.is_complete = Set(false);
                    active.update(&self.db).await?;
                }
            }
        }

        info!("User of id {} successfully deleted", user_id);

        self.publisher
            .publish(Notification::deleted(Resource::User, user_id));

        Ok(())
    }

    /// Replace a user in full; the team membership is untouched.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        command: UpdateUserCommand,
    ) -> Result<user::Model, ServiceError> {
        let target = self.retrieve_user_by_id(user_id).await?;

        let mut active: user::ActiveModel = target.into();
        active.firstname = Set(command.firstname);
        active.name = Set(command.name);
        active.age = Set(command.age);
        let updated = active.update(&self.db).await?;

        info!("Updated user: {} {} ({})", updated.firstname, updated.name, updated.id);

        self.publisher.publish(Notification::operation(
            Resource::User,
            Operation::UserReplaced,
            updated.id,
        ));

        Ok(updated)
    }

    /// Partially update a user; only the supplied fields change.
    pub async fn patch_user(
        &self,
        user_id: Uuid,
        command: PatchUserCommand,
    ) -> Result<user::Model, ServiceError> {
        let target = self.retrieve_user_by_id(user_id).await?;

        let mut active: user::ActiveModel = target.into();
        if let Some(firstname) = command.firstname {
            active.firstname = Set(firstname);
        }
        if let Some(name) = command.name {
            active.name = Set(name);
        }
        if let Some(age) = command.age {
            active.age = Set(age);
        }
        let patched = active.update(&self.db).await?;

        info!("Patched user: {} {} ({})", patched.firstname, patched.name, patched.id);

        self.publisher.publish(Notification::operation(
            Resource::User,
            Operation::UserPatched,
            patched.id,
        ));

        Ok(patched)
    }

    /// Retrieve a user by its id.
    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        self.retrieve_user_by_id(user_id).await
    }

    /// Retrieve all users, optionally filtered by team membership.
    pub async fn get_users(&self, query: GetUsersQuery) -> Result<Vec<user::Model>, ServiceError> {
        let users = match query.has_team {
            Some(true) => {
                user::Entity::find()
                    .filter(user::Column::TeamId.is_not_null())
                    .all(&self.db)
                    .await?
            }
            Some(false) => {
                user::Entity::find()
                    .filter(user::Column::TeamId.is_null())
                    .all(&self.db)
                    .await?
            }
            None => user::Entity::find().all(&self.db).await?,
        };

        info!("Retrieved {} users", users.len());

        Ok(users)
    }

    /// Attach a user to a team. Internal operation used by the team service;
    /// does not notify.
    pub(crate) async fn add_to_team(
        &self,
        user_id: Uuid,
        team: &team::Model,
    ) -> Result<user::Model, ServiceError> {
        let user = self.retrieve_user_by_id(user_id).await?;

        if user.team_id.is_some() {
            error!(
                "User {} already has a team and can't join team {}",
                user.id, team.id
            );
            return Err(ServiceError::UserAlreadyInATeam {
                user: user.id,
                team: team.id,
            });
        }

        let mut active: user::ActiveModel = user.into();
        active.team_id = Set(Some(team.id));
        Ok(active.update(&self.db).await?)
    }

    /// Detach a user from its team. Internal operation used by the team
    /// service; does not notify.
    pub(crate) async fn leave_team(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        let user = self.retrieve_user_by_id(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.team_id = Set(None);
        let user = active.update(&self.db).await?;

        info!("User {} left their team", user.id);

        Ok(user)
    }
}
