use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::models::UserRole;

/// The caller on whose behalf repository and aggregation calls run.
///
/// Passed explicitly into every user-scoped operation; there is no ambient
/// "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: RecordId,
    pub role: UserRole,
}

impl Session {
    pub fn new(user_id: RecordId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn job_seeker(user_id: RecordId) -> Self {
        Self::new(user_id, UserRole::JobSeeker)
    }

    pub fn employer(user_id: RecordId) -> Self {
        Self::new(user_id, UserRole::Employer)
    }
}
