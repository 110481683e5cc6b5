//! Message shapes published on the broker channel

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource kind a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Team,
    User,
}

/// Structural change in the total resource count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentAction {
    Created,
    Deleted,
}

/// Mutation that leaves the total resource count unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    MemberAdded,
    MemberRemoved,
    TeamRenamed,
    UserReplaced,
    UserPatched,
}

/// Message published after each successful mutating call.
///
/// JSON on the wire, tagged by `kind` so consumers can classify what changed
/// without knowing every payload field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A create or delete changed the total resource count.
    ContentUpdated {
        resource: Resource,
        action: ContentAction,
        id: Uuid,
    },

    /// Any other mutation: membership add/remove, rename, patch, replace.
    OperationPerformed {
        resource: Resource,
        operation: Operation,
        id: Uuid,
    },
}

impl Notification {
    /// Content-updated message for a newly created resource.
    pub fn created(resource: Resource, id: Uuid) -> Self {
        Self::ContentUpdated {
            resource,
            action: ContentAction::Created,
            id,
        }
    }

    /// Content-updated message for a deleted resource.
    pub fn deleted(resource: Resource, id: Uuid) -> Self {
        Self::ContentUpdated {
            resource,
            action: ContentAction::Deleted,
            id,
        }
    }

    /// Operation-performed message for a non-structural mutation.
    pub fn operation(resource: Resource, operation: Operation, id: Uuid) -> Self {
        Self::OperationPerformed {
            resource,
            operation,
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_updated_round_trips_as_tagged_json() {
        let id = Uuid::new_v4();
        let notification = Notification::created(Resource::Team, id);

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["kind"], "content_updated");
        assert_eq!(json["resource"], "team");
        assert_eq!(json["action"], "created");

        let decoded: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, notification);
    }

    #[test]
    fn operation_performed_carries_the_operation() {
        let id = Uuid::new_v4();
        let notification = Notification::operation(Resource::User, Operation::UserPatched, id);

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["kind"], "operation_performed");
        assert_eq!(json["operation"], "user_patched");
    }
}
