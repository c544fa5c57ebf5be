use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::access::role::Role;

/// Enrolment of a user in a course, with the groups they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseAccess {
    pub user: Thing,
    pub course: String,
    pub role: Role,
    #[serde(default)]
    pub groups: Vec<String>,
}
