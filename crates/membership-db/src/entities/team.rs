//! Team entity: a named, bounded set of member users

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    /// Team UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// When the team was created; set once, renames preserve it
    pub created_at: ChronoDateTimeUtc,

    /// Whether the member count has reached the team capacity.
    /// Stored redundantly; recomputed after every membership change.
    pub is_complete: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Users currently belonging to the team
    #[sea_orm(has_many = "super::user::Entity")]
    Members,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
