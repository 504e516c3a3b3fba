use actix_web::{Error as ActixError, FromRequest, HttpRequest, dev::Payload, web::Data};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// Token issued by the external identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // staff or member id
    pub role: Role,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn new(sub: Uuid, role: Role, ttl: Duration) -> Self {
        Claims {
            sub,
            role,
            exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        }
    }

    pub fn encode(&self, secret: &str) -> Result<String, AppError> {
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .map_err(|e| AppError::internal_server_error_message(format!("token encoding failed: {}", e)))
    }

    pub fn decode(token: &str, secret: &str) -> Result<Self, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            log::warn!("Rejected bearer token: {}", e);
            AppError::Unauthorized
        })
    }
}

/// Who is invoking an engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Admin { id: Uuid },
    Member { id: Uuid },
}

impl Caller {
    pub fn id(&self) -> Uuid {
        match *self {
            Caller::Admin { id } | Caller::Member { id } => id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Caller::Admin { .. })
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(
                "administrator access required".to_string(),
            ))
        }
    }

    /// Members may act on their own records only.
    pub fn require_self_or_admin(&self, member_id: Uuid) -> Result<(), AppError> {
        match *self {
            Caller::Admin { .. } => Ok(()),
            Caller::Member { id } if id == member_id => Ok(()),
            Caller::Member { .. } => Err(AppError::PermissionDenied(
                "members may only access their own records".to_string(),
            )),
        }
    }
}

impl From<&Claims> for Caller {
    fn from(claims: &Claims) -> Self {
        match claims.role {
            Role::Admin => Caller::Admin { id: claims.sub },
            Role::Member => Caller::Member { id: claims.sub },
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(token) = bearer_token(req) else {
            return ready(Err(AppError::Unauthorized.into()));
        };
        let Some(config) = req.app_data::<Data<Config>>() else {
            log::error!("Config missing from app data; cannot verify tokens");
            return ready(Err(AppError::internal_server_error().into()));
        };

        ready(Claims::decode(token, &config.jwt_secret).map_err(ActixError::from))
    }
}

impl FromRequest for Caller {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        match Claims::from_request(req, payload).into_inner() {
            Ok(claims) => ready(Ok(Caller::from(&claims))),
            Err(err) => ready(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SECRET: &str = "test-jwt-secret-key-that-is-long-enough";

    #[test]
    fn test_token_round_trip_yields_caller() {
        let id = Uuid::new_v4();
        let token = Claims::new(id, Role::Member, Duration::hours(1))
            .encode(SECRET)
            .unwrap();

        let claims = Claims::decode(&token, SECRET).unwrap();
        assert_eq!(Caller::from(&claims), Caller::Member { id });
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = Claims::new(Uuid::new_v4(), Role::Admin, Duration::hours(1))
            .encode("another-secret")
            .unwrap();

        assert!(matches!(
            Claims::decode(&token, SECRET),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_member_scope_checks() {
        let me = Uuid::new_v4();
        let member = Caller::Member { id: me };
        let admin = Caller::Admin { id: Uuid::new_v4() };

        assert!(member.require_self_or_admin(me).is_ok());
        assert!(matches!(
            member.require_self_or_admin(Uuid::new_v4()),
            Err(AppError::PermissionDenied(_))
        ));
        assert!(matches!(
            member.require_admin(),
            Err(AppError::PermissionDenied(_))
        ));
        assert!(admin.require_admin().is_ok());
        assert!(admin.require_self_or_admin(me).is_ok());
    }
}
