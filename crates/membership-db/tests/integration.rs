//! Integration tests for membership-db
//!
//! Tests database operations with a real SQLite in-memory database

use chrono::Utc;
use membership_db::{
    connect,
    entities::{team, user},
    migrate,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

/// Helper to create a test database
async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

async fn insert_team(db: &sea_orm::DatabaseConnection, name: &str) -> team::Model {
    team::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
        is_complete: Set(false),
    }
    .insert(db)
    .await
    .expect("Failed to insert team")
}

async fn insert_user(
    db: &sea_orm::DatabaseConnection,
    firstname: &str,
    name: &str,
    team_id: Option<Uuid>,
) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        firstname: Set(firstname.to_string()),
        name: Set(name.to_string()),
        age: Set(30),
        team_id: Set(team_id),
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_team() {
    let db = setup_test_db().await;

    let created = insert_team(&db, "Rocket").await;

    assert_eq!(created.name, "Rocket");
    assert!(!created.is_complete);

    let found = team::Entity::find_by_id(created.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Team not found");

    assert_eq!(found.id, created.id);
    assert_eq!(found.created_at, created.created_at);
}

#[tokio::test]
async fn test_create_user_without_team() {
    let db = setup_test_db().await;

    let created = insert_user(&db, "Ada", "Lovelace", None).await;

    let found = user::Entity::find_by_id(created.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("User not found");

    assert_eq!(found.firstname, "Ada");
    assert_eq!(found.name, "Lovelace");
    assert_eq!(found.team_id, None);
}

#[tokio::test]
async fn test_attach_and_detach_user() {
    let db = setup_test_db().await;

    let team = insert_team(&db, "Rocket").await;
    let created = insert_user(&db, "Ada", "Lovelace", None).await;

    // Attach
    let mut active: user::ActiveModel = created.into();
    active.team_id = Set(Some(team.id));
    let attached = active.update(&db).await.expect("Failed to attach");
    assert_eq!(attached.team_id, Some(team.id));

    // Detach
    let mut active: user::ActiveModel = attached.into();
    active.team_id = Set(None);
    let detached = active.update(&db).await.expect("Failed to detach");
    assert_eq!(detached.team_id, None);
}

#[tokio::test]
async fn test_team_members_derived_by_query() {
    let db = setup_test_db().await;

    let team = insert_team(&db, "Rocket").await;
    let other = insert_team(&db, "Nimbus").await;

    insert_user(&db, "Ada", "Lovelace", Some(team.id)).await;
    insert_user(&db, "Grace", "Hopper", Some(team.id)).await;
    insert_user(&db, "Alan", "Turing", Some(other.id)).await;
    insert_user(&db, "Edsger", "Dijkstra", None).await;

    let member_count = user::Entity::find()
        .filter(user::Column::TeamId.eq(team.id))
        .count(&db)
        .await
        .expect("Failed to count");
    assert_eq!(member_count, 2);

    let members = team
        .find_related(user::Entity)
        .all(&db)
        .await
        .expect("Failed to query members");
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_filter_users_by_team_presence() {
    let db = setup_test_db().await;

    let team = insert_team(&db, "Rocket").await;
    insert_user(&db, "Ada", "Lovelace", Some(team.id)).await;
    insert_user(&db, "Edsger", "Dijkstra", None).await;

    let with_team = user::Entity::find()
        .filter(user::Column::TeamId.is_not_null())
        .all(&db)
        .await
        .expect("Failed to query");
    assert_eq!(with_team.len(), 1);
    assert_eq!(with_team[0].firstname, "Ada");

    let without_team = user::Entity::find()
        .filter(user::Column::TeamId.is_null())
        .all(&db)
        .await
        .expect("Failed to query");
    assert_eq!(without_team.len(), 1);
    assert_eq!(without_team[0].firstname, "Edsger");
}

#[tokio::test]
async fn test_filter_teams_by_completeness() {
    let db = setup_test_db().await;

    let complete = insert_team(&db, "Full").await;
    let mut active: team::ActiveModel = complete.into();
    active.is_complete = Set(true);
    active.update(&db).await.expect("Failed to update");

    insert_team(&db, "Open").await;

    let complete_teams = team::Entity::find()
        .filter(team::Column::IsComplete.eq(true))
        .all(&db)
        .await
        .expect("Failed to query");
    assert_eq!(complete_teams.len(), 1);
    assert_eq!(complete_teams[0].name, "Full");
}

#[tokio::test]
async fn test_delete_user() {
    let db = setup_test_db().await;

    let created = insert_user(&db, "Ada", "Lovelace", None).await;
    let id = created.id;

    created.delete(&db).await.expect("Failed to delete");

    let found = user::Entity::find_by_id(id)
        .one(&db)
        .await
        .expect("Failed to query");
    assert!(found.is_none());
}
