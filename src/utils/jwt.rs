use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::middleware::error::AppResult;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub auth: String,
    pub exp: usize,
    pub iat: usize,
}

/// Verifies tokens issued by the host platform. Issuing is kept for tooling and tests.
pub struct JWT {
    key_enc: EncodingKey,
    key_dec: DecodingKey,
    duration: TimeDelta,
}

impl JWT {
    pub fn new(secret: String, duration: TimeDelta) -> Self {
        Self {
            duration,
            key_enc: EncodingKey::from_secret(secret.as_ref()),
            key_dec: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn create_by_login(&self, user_id: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            auth: user_id.to_string(),
            exp: (now + self.duration).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.key_enc)?)
    }

    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.key_dec, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::error::AppError;

    const SECRET: &str = "some-secret";

    #[test]
    fn round_trips_the_user() {
        let jwt = JWT::new(SECRET.to_string(), TimeDelta::days(1));
        let token = jwt.create_by_login("alice").unwrap();
        let claims = jwt.decode(&token).unwrap();
        assert_eq!(claims.auth, "alice");
    }

    #[test]
    fn rejects_foreign_signature() {
        let token = JWT::new("other".to_string(), TimeDelta::days(1))
            .create_by_login("alice")
            .unwrap();
        let res = JWT::new(SECRET.to_string(), TimeDelta::days(1)).decode(&token);
        assert_eq!(res.unwrap_err(), AppError::AuthenticationFail);
    }

    #[test]
    fn rejects_expired() {
        let jwt = JWT::new(SECRET.to_string(), TimeDelta::days(-1));
        let token = jwt.create_by_login("alice").unwrap();
        assert!(jwt.decode(&token).is_err());
    }
}
