/*!
 * # Authentication and Authorization Module
 *
 * JWT-based authentication for the two principal kinds the platform serves:
 *
 * - Staff users (admin, store manager, pharmacist) with an optional store binding
 * - Vendors (external suppliers), authenticated separately from staff
 *
 * Authorization is enforced through guard methods on [`AuthContext`], which
 * handlers obtain through the axum extractor implemented below.
 */

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::entities::users::StaffRole;
use crate::errors::ServiceError;
use crate::AppState;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Principal kind: "staff" or "vendor"
    pub actor: String,
    pub role: Option<StaffRole>,
    pub store_id: Option<i32>,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated principal attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Staff {
        user_id: i32,
        store_id: Option<i32>,
        role: StaffRole,
    },
    Vendor {
        vendor_id: i32,
    },
}

impl AuthContext {
    /// Any authenticated staff user. Vendors are rejected.
    pub fn require_user(&self) -> Result<i32, ServiceError> {
        match self {
            Self::Staff { user_id, .. } => Ok(*user_id),
            Self::Vendor { .. } => Err(ServiceError::Unauthorized(
                "Staff credentials required".to_string(),
            )),
        }
    }

    /// Staff user with exactly the given role.
    pub fn require_role(&self, role: StaffRole) -> Result<i32, ServiceError> {
        match self {
            Self::Staff {
                user_id,
                role: actual,
                ..
            } if *actual == role => Ok(*user_id),
            Self::Staff { .. } => Err(ServiceError::Unauthorized(format!(
                "{} role required",
                role
            ))),
            Self::Vendor { .. } => Err(ServiceError::Unauthorized(
                "Staff credentials required".to_string(),
            )),
        }
    }

    /// Staff user with any of the given roles.
    pub fn require_role_in(&self, roles: &[StaffRole]) -> Result<i32, ServiceError> {
        match self {
            Self::Staff {
                user_id,
                role: actual,
                ..
            } if roles.contains(actual) => Ok(*user_id),
            Self::Staff { .. } => Err(ServiceError::Unauthorized(
                "Insufficient role".to_string(),
            )),
            Self::Vendor { .. } => Err(ServiceError::Unauthorized(
                "Staff credentials required".to_string(),
            )),
        }
    }

    /// Staff user with the given role AND a store binding. Returns
    /// `(user_id, store_id)` so handlers can scope queries to the store.
    pub fn require_store_role(&self, role: StaffRole) -> Result<(i32, i32), ServiceError> {
        let user_id = self.require_role(role)?;
        match self {
            Self::Staff {
                store_id: Some(store_id),
                ..
            } => Ok((user_id, *store_id)),
            _ => Err(ServiceError::Unauthorized(
                "No store assigned to this account".to_string(),
            )),
        }
    }

    /// Staff user with any of the given roles AND a store binding.
    pub fn require_store_role_in(
        &self,
        roles: &[StaffRole],
    ) -> Result<(i32, i32), ServiceError> {
        let user_id = self.require_role_in(roles)?;
        match self {
            Self::Staff {
                store_id: Some(store_id),
                ..
            } => Ok((user_id, *store_id)),
            _ => Err(ServiceError::Unauthorized(
                "No store assigned to this account".to_string(),
            )),
        }
    }

    /// Authenticated vendor. Staff users are rejected.
    pub fn require_vendor(&self) -> Result<i32, ServiceError> {
        match self {
            Self::Vendor { vendor_id } => Ok(*vendor_id),
            Self::Staff { .. } => Err(ServiceError::Unauthorized(
                "Vendor credentials required".to_string(),
            )),
        }
    }
}

/// Authentication service that handles password hashing and token
/// issuance/validation.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: u64,
}

impl AuthService {
    pub fn new(jwt_secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            expiration_secs,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::InternalError(format!("Password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| ServiceError::InternalError(format!("Malformed password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn issue_staff_token(
        &self,
        user_id: i32,
        role: StaffRole,
        store_id: Option<i32>,
    ) -> Result<String, ServiceError> {
        self.issue(Claims {
            sub: user_id.to_string(),
            actor: "staff".to_string(),
            role: Some(role),
            store_id,
            iat: 0,
            exp: 0,
        })
    }

    pub fn issue_vendor_token(&self, vendor_id: i32) -> Result<String, ServiceError> {
        self.issue(Claims {
            sub: vendor_id.to_string(),
            actor: "vendor".to_string(),
            role: None,
            store_id: None,
            iat: 0,
            exp: 0,
        })
    }

    fn issue(&self, mut claims: Claims) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        claims.iat = now;
        claims.exp = now + self.expiration_secs as i64;
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::InternalError(format!("Token encoding failed: {}", e)))
    }

    /// Validates the token signature and expiry, then rebuilds the principal.
    pub fn verify_token(&self, token: &str) -> Result<AuthContext, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| {
                debug!("Token validation failed: {}", e);
                ServiceError::Unauthorized("Invalid or expired token".to_string())
            })?;
        let claims = data.claims;
        let id: i32 = claims
            .sub
            .parse()
            .map_err(|_| ServiceError::Unauthorized("Malformed token subject".to_string()))?;
        match claims.actor.as_str() {
            "staff" => {
                let role = claims.role.ok_or_else(|| {
                    ServiceError::Unauthorized("Staff token missing role".to_string())
                })?;
                Ok(AuthContext::Staff {
                    user_id: id,
                    store_id: claims.store_id,
                    role,
                })
            }
            "vendor" => Ok(AuthContext::Vendor { vendor_id: id }),
            _ => Err(ServiceError::Unauthorized(
                "Unknown token principal".to_string(),
            )),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthContext {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized("Missing Authorization header".to_string())
            })?;
        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            ServiceError::Unauthorized("Authorization header must use Bearer scheme".to_string())
        })?;
        state.auth.verify_token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("test-secret-key-which-is-long-enough", 3600)
    }

    #[test]
    fn staff_token_round_trips() {
        let auth = service();
        let token = auth
            .issue_staff_token(7, StaffRole::Manager, Some(3))
            .unwrap();
        let ctx = auth.verify_token(&token).unwrap();
        assert_eq!(
            ctx,
            AuthContext::Staff {
                user_id: 7,
                store_id: Some(3),
                role: StaffRole::Manager,
            }
        );
    }

    #[test]
    fn vendor_token_round_trips() {
        let auth = service();
        let token = auth.issue_vendor_token(42).unwrap();
        let ctx = auth.verify_token(&token).unwrap();
        assert_eq!(ctx, AuthContext::Vendor { vendor_id: 42 });
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = service();
        let other = AuthService::new("a-different-secret-also-long-enough!", 3600);
        let token = other.issue_vendor_token(1).unwrap();
        assert!(matches!(
            auth.verify_token(&token),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let auth = service();
        let hash = auth.hash_password("s3cret").unwrap();
        assert!(auth.verify_password("s3cret", &hash).unwrap());
        assert!(!auth.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn role_guards() {
        let manager = AuthContext::Staff {
            user_id: 1,
            store_id: Some(2),
            role: StaffRole::Manager,
        };
        let vendor = AuthContext::Vendor { vendor_id: 9 };

        assert_eq!(manager.require_user().unwrap(), 1);
        assert_eq!(manager.require_role(StaffRole::Manager).unwrap(), 1);
        assert!(manager.require_role(StaffRole::Admin).is_err());
        assert_eq!(
            manager
                .require_role_in(&[StaffRole::Admin, StaffRole::Manager])
                .unwrap(),
            1
        );
        assert_eq!(
            manager.require_store_role(StaffRole::Manager).unwrap(),
            (1, 2)
        );
        assert!(vendor.require_user().is_err());
        assert_eq!(vendor.require_vendor().unwrap(), 9);
        assert!(manager.require_vendor().is_err());
    }

    #[test]
    fn store_role_requires_assignment() {
        let unassigned = AuthContext::Staff {
            user_id: 5,
            store_id: None,
            role: StaffRole::Pharmacist,
        };
        assert!(matches!(
            unassigned.require_store_role(StaffRole::Pharmacist),
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
