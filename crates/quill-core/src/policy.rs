//! Route-level access classes and the verified caller identity.

use chrono::Utc;

use crate::domain::Role;
use crate::error::{DomainError, DomainResult};
use crate::ports::{AuthError, TokenClaims, TokenService};

/// Verified identity of the caller, built only from token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_role(&self, role: Role) -> DomainResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// Owners manage their own records; admins manage everyone's.
    pub fn can_manage(&self, owner_id: i64) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

impl From<TokenClaims> for Actor {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Access class a route requires before any service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// No live session may be present (login, register).
    GuestOnly,
    /// Any live session.
    AuthRequired,
    /// A live session with exactly this role.
    RoleOnly(Role),
}

impl AccessPolicy {
    /// Evaluate the policy against the raw session token, failing closed.
    ///
    /// Returns the actor for authenticated classes and `None` for guests.
    pub fn evaluate(
        &self,
        token: Option<&str>,
        tokens: &dyn TokenService,
    ) -> DomainResult<Option<Actor>> {
        let token = token.filter(|t| !t.is_empty());

        match self {
            AccessPolicy::GuestOnly => match token.map(|t| tokens.validate_token(t)) {
                Some(Ok(claims)) if !claims.is_expired_at(Utc::now()) => {
                    Err(DomainError::Forbidden)
                }
                _ => Ok(None),
            },
            AccessPolicy::AuthRequired => Self::authenticate(token, tokens).map(Some),
            AccessPolicy::RoleOnly(role) => {
                let actor = Self::authenticate(token, tokens)?;
                actor.require_role(*role)?;
                Ok(Some(actor))
            }
        }
    }

    fn authenticate(token: Option<&str>, tokens: &dyn TokenService) -> DomainResult<Actor> {
        let token = token.ok_or(AuthError::MissingAuth)?;
        let claims = tokens.validate_token(token)?;
        if claims.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenExpired.into());
        }
        Ok(Actor::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;

    /// Accepts tokens of the form `<id>:<role>`; `expired` yields an expired token.
    struct StubTokens;

    impl TokenService for StubTokens {
        fn issue_token(&self, claims: &TokenClaims) -> Result<String, AuthError> {
            Ok(format!("{}:{}", claims.user_id, claims.role))
        }

        fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
            if token == "expired" {
                return Err(AuthError::TokenExpired);
            }
            let (id, role) = token
                .split_once(':')
                .ok_or_else(|| AuthError::InvalidToken("malformed".into()))?;
            let user_id = id
                .parse()
                .map_err(|_| AuthError::InvalidToken("subject".into()))?;
            let role = role
                .parse()
                .map_err(|_| AuthError::InvalidToken("role".into()))?;
            Ok(TokenClaims::new(
                user_id,
                format!("user{user_id}"),
                role,
                Utc::now() + TimeDelta::hours(1),
            ))
        }

        fn expiration(&self) -> TimeDelta {
            TimeDelta::hours(1)
        }
    }

    #[test]
    fn guest_only_accepts_anonymous_and_stale_sessions() {
        let policy = AccessPolicy::GuestOnly;
        assert_eq!(policy.evaluate(None, &StubTokens).unwrap(), None);
        assert_eq!(policy.evaluate(Some(""), &StubTokens).unwrap(), None);
        assert_eq!(policy.evaluate(Some("expired"), &StubTokens).unwrap(), None);
        assert_eq!(policy.evaluate(Some("garbage"), &StubTokens).unwrap(), None);
    }

    #[test]
    fn guest_only_rejects_live_session() {
        let err = AccessPolicy::GuestOnly
            .evaluate(Some("4:user"), &StubTokens)
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[test]
    fn auth_required_yields_actor_from_claims() {
        let actor = AccessPolicy::AuthRequired
            .evaluate(Some("4:user"), &StubTokens)
            .unwrap()
            .unwrap();
        assert_eq!(actor.user_id, 4);
        assert_eq!(actor.role, Role::User);
    }

    #[test]
    fn auth_required_fails_closed() {
        for token in [None, Some("expired"), Some("garbage"), Some("4:root")] {
            let err = AccessPolicy::AuthRequired
                .evaluate(token, &StubTokens)
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidCredentials(_)), "{token:?}");
        }
    }

    #[test]
    fn role_only_checks_role_after_authentication() {
        let admin_only = AccessPolicy::RoleOnly(Role::Admin);
        assert!(admin_only.evaluate(Some("1:admin"), &StubTokens).is_ok());
        assert!(matches!(
            admin_only.evaluate(Some("2:user"), &StubTokens),
            Err(DomainError::Forbidden)
        ));
        assert!(matches!(
            admin_only.evaluate(None, &StubTokens),
            Err(DomainError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn owners_and_admins_can_manage() {
        let owner = Actor {
            user_id: 3,
            username: "writer".into(),
            role: Role::User,
        };
        let admin = Actor {
            user_id: 1,
            username: "admin".into(),
            role: Role::Admin,
        };
        assert!(owner.can_manage(3));
        assert!(!owner.can_manage(4));
        assert!(admin.can_manage(4));
    }
}
