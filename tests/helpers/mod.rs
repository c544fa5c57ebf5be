pub mod forum_helpers;
pub mod test_with_server;

use forumx_server::access::role::Role;
use forumx_server::interfaces::repositories::access::AccessRepositoryInterface;
use forumx_server::middleware::mw_ctx::CtxState;
use surrealdb::sql::Thing;
use uuid::Uuid;

pub const COURSE: &str = "course-101";

/// A course member and a token the router accepts for them.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user: Thing,
    pub key: String,
    pub token: String,
}

#[allow(dead_code)]
pub async fn create_user(state: &CtxState, role: Role, groups: Vec<&str>) -> TestUser {
    let key = Uuid::new_v4().simple().to_string();
    let user = Thing::from(("user", key.as_str()));
    state
        .db
        .access
        .add(
            user.clone(),
            COURSE,
            role,
            groups.into_iter().map(|g| g.to_string()).collect(),
        )
        .await
        .expect("course access added");
    let token = state.jwt.create_by_login(&key).expect("token created");
    TestUser { user, key, token }
}

/// Valid token, no enrolment in the course.
#[allow(dead_code)]
pub fn create_outsider(state: &CtxState) -> TestUser {
    let key = Uuid::new_v4().simple().to_string();
    let user = Thing::from(("user", key.as_str()));
    let token = state.jwt.create_by_login(&key).expect("token created");
    TestUser { user, key, token }
}
