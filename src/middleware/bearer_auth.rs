use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use surrealdb::sql::Thing;

use crate::database::table_names::USER_TABLE_NAME;
use crate::middleware::{
    error::{AppError, CtxError},
    mw_ctx::CtxState,
    utils::string_utils::get_str_thing,
};

/// Caller identity taken from a bearer JWT; the `auth` claim is the user key.
pub struct BearerAuth {
    pub user: Thing,
}

#[async_trait]
impl FromRequestParts<Arc<CtxState>> for BearerAuth {
    type Rejection = CtxError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<CtxState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(AppError::AuthenticationFail)?;
        let claims = state.jwt.decode(token.token())?;
        let user = get_str_thing(USER_TABLE_NAME, &claims.auth)
            .map_err(|_| AppError::AuthenticationFail)?;

        Ok(BearerAuth { user })
    }
}
