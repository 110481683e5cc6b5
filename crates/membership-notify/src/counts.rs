//! Aggregate resource counts maintained by the counting consumer
//!
//! Process-local state: updated only inside the consumer's own message
//! handler, never shared with the API process.

use std::fmt;

use crate::{ContentAction, Notification, Resource};

/// Running totals derived from the notification stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    /// Teams currently known to the API.
    pub teams: i64,
    /// Users currently known to the API.
    pub users: i64,
    /// Non-structural mutations observed since startup.
    pub operations: u64,
}

impl ResourceCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one notification into the totals.
    pub fn apply(&mut self, notification: &Notification) {
        match notification {
            Notification::ContentUpdated {
                resource, action, ..
            } => {
                let delta = match action {
                    ContentAction::Created => 1,
                    ContentAction::Deleted => -1,
                };
                match resource {
                    Resource::Team => self.teams += delta,
                    Resource::User => self.users += delta,
                }
            }
            Notification::OperationPerformed { .. } => self.operations += 1,
        }
    }
}

impl fmt::Display for ResourceCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} team(s), {} user(s), {} operation(s) observed",
            self.teams, self.users, self.operations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operation;
    use uuid::Uuid;

    #[test]
    fn creates_and_deletes_move_the_totals() {
        let mut counts = ResourceCounts::new();

        counts.apply(&Notification::created(Resource::Team, Uuid::new_v4()));
        counts.apply(&Notification::created(Resource::User, Uuid::new_v4()));
        counts.apply(&Notification::created(Resource::User, Uuid::new_v4()));
        assert_eq!(counts.teams, 1);
        assert_eq!(counts.users, 2);

        counts.apply(&Notification::deleted(Resource::User, Uuid::new_v4()));
        assert_eq!(counts.users, 1);
        assert_eq!(counts.operations, 0);
    }

    #[test]
    fn operations_only_bump_the_tally() {
        let mut counts = ResourceCounts::new();

        counts.apply(&Notification::operation(
            Resource::Team,
            Operation::MemberAdded,
            Uuid::new_v4(),
        ));
        counts.apply(&Notification::operation(
            Resource::User,
            Operation::UserPatched,
            Uuid::new_v4(),
        ));

        assert_eq!(counts.teams, 0);
        assert_eq!(counts.users, 0);
        assert_eq!(counts.operations, 2);
    }
}
