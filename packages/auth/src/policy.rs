// ABOUTME: Declarative authorization policy for workflow operations
// ABOUTME: One table mapping operation -> allowed roles + row-level ownership rule

use crate::types::Role;

/// Operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    PlanningCreate,
    PlanningRead,
    PlanningList,
    PlanningUpdate,
    PlanningReview,
    PlanningDelete,
    EvidenceCreate,
    EvidenceRead,
    EvidenceList,
    EvidenceUpdate,
    EvidenceReview,
    EvidenceDelete,
    ProgressCreate,
    ProgressRead,
    ProgressUpdate,
    ProgressDelete,
    ProgressStats,
    UserCreate,
    UserList,
    UserRead,
    UserUpdate,
    UserDelete,
    ReportRead,
    CalendarRead,
}

/// Row-level requirement layered on top of the role allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// No row-level restriction beyond the role check
    Any,
    /// Reviewers pass; professors only for rows they own
    OwnerOrReviewer,
    /// Only the owning principal, regardless of role
    OwnerOnly,
}

/// A single policy entry
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub roles: &'static [Role],
    pub ownership: Ownership,
}

const ALL: &[Role] = &[Role::Admin, Role::Coordinator, Role::Professor];
const REVIEWERS: &[Role] = &[Role::Admin, Role::Coordinator];
const PROFESSOR_ONLY: &[Role] = &[Role::Professor];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Look up the policy entry for an operation
pub fn policy(op: Operation) -> Policy {
    use Operation::*;
    use Ownership::{Any, OwnerOnly, OwnerOrReviewer};

    match op {
        PlanningCreate => Policy { roles: PROFESSOR_ONLY, ownership: Any },
        PlanningRead => Policy { roles: ALL, ownership: OwnerOrReviewer },
        PlanningList => Policy { roles: ALL, ownership: OwnerOrReviewer },
        PlanningUpdate => Policy { roles: PROFESSOR_ONLY, ownership: OwnerOnly },
        PlanningReview => Policy { roles: REVIEWERS, ownership: Any },
        PlanningDelete => Policy { roles: ALL, ownership: OwnerOrReviewer },

        EvidenceCreate => Policy { roles: PROFESSOR_ONLY, ownership: Any },
        EvidenceRead => Policy { roles: ALL, ownership: OwnerOrReviewer },
        EvidenceList => Policy { roles: ALL, ownership: OwnerOrReviewer },
        EvidenceUpdate => Policy { roles: PROFESSOR_ONLY, ownership: OwnerOnly },
        EvidenceReview => Policy { roles: REVIEWERS, ownership: Any },
        EvidenceDelete => Policy { roles: ALL, ownership: OwnerOrReviewer },

        ProgressCreate => Policy { roles: ALL, ownership: OwnerOrReviewer },
        ProgressRead => Policy { roles: ALL, ownership: OwnerOrReviewer },
        ProgressUpdate => Policy { roles: ALL, ownership: OwnerOrReviewer },
        ProgressDelete => Policy { roles: ALL, ownership: OwnerOrReviewer },
        ProgressStats => Policy { roles: REVIEWERS, ownership: Any },

        UserCreate => Policy { roles: ADMIN_ONLY, ownership: Any },
        UserList => Policy { roles: REVIEWERS, ownership: Any },
        UserRead => Policy { roles: ALL, ownership: OwnerOrReviewer },
        UserUpdate => Policy { roles: ALL, ownership: OwnerOrReviewer },
        UserDelete => Policy { roles: ADMIN_ONLY, ownership: Any },

        ReportRead => Policy { roles: REVIEWERS, ownership: Any },
        CalendarRead => Policy { roles: ALL, ownership: Any },
    }
}

/// Role-level check: is the role in the operation's allow-list?
pub fn role_allowed(op: Operation, role: Role) -> bool {
    policy(op).roles.contains(&role)
}

/// Row-level check applied after `role_allowed`
pub fn row_allowed(op: Operation, role: Role, owner_id: &str, requester_id: &str) -> bool {
    match policy(op).ownership {
        Ownership::Any => true,
        Ownership::OwnerOrReviewer => role.is_reviewer() || owner_id == requester_id,
        Ownership::OwnerOnly => owner_id == requester_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_professor_never_reviews() {
        assert!(!role_allowed(Operation::PlanningReview, Role::Professor));
        assert!(!role_allowed(Operation::EvidenceReview, Role::Professor));
        assert!(role_allowed(Operation::PlanningReview, Role::Coordinator));
        assert!(role_allowed(Operation::PlanningReview, Role::Admin));
    }

    #[test]
    fn test_only_professors_create_plannings() {
        assert!(role_allowed(Operation::PlanningCreate, Role::Professor));
        assert!(!role_allowed(Operation::PlanningCreate, Role::Coordinator));
        assert!(!role_allowed(Operation::PlanningCreate, Role::Admin));
    }

    #[test]
    fn test_update_is_owner_only_even_for_reviewers() {
        // Review is a separate operation; reviewers do not edit content
        assert!(!role_allowed(Operation::PlanningUpdate, Role::Admin));
        assert!(!row_allowed(Operation::PlanningUpdate, Role::Professor, "owner", "other"));
        assert!(row_allowed(Operation::PlanningUpdate, Role::Professor, "owner", "owner"));
    }

    #[test]
    fn test_reviewers_bypass_row_ownership_on_reads() {
        assert!(row_allowed(Operation::PlanningRead, Role::Coordinator, "owner", "someone-else"));
        assert!(!row_allowed(Operation::PlanningRead, Role::Professor, "owner", "someone-else"));
        assert!(row_allowed(Operation::PlanningRead, Role::Professor, "owner", "owner"));
    }

    #[test]
    fn test_user_management_gates() {
        assert!(role_allowed(Operation::UserCreate, Role::Admin));
        assert!(!role_allowed(Operation::UserCreate, Role::Coordinator));
        assert!(!role_allowed(Operation::UserList, Role::Professor));
        assert!(!role_allowed(Operation::UserDelete, Role::Coordinator));
    }
}
