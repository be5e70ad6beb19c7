//! Session state and role gate.
//!
//! A [`Session`] is always owned by one client context. The HTTP layer keeps
//! one per session token in a [`SessionRegistry`] and hands each handler a copy
//! of the caller's own session only; there is no process-wide current user.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, models::user::Role};

/// User id carried by the built-in admin identity.
pub const ADMIN_BYPASS_USER_ID: i64 = 0;

/// An authenticated identity. Only the authenticator can mint one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    role: Role,
    user_id: i64,
}

impl Identity {
    pub(crate) fn new(role: Role, user_id: i64) -> Self {
        Self { role, user_id }
    }

    pub(crate) fn admin_bypass() -> Self {
        Self::new(Role::Admin, ADMIN_BYPASS_USER_ID)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn is_bypass(&self) -> bool {
        self.role == Role::Admin && self.user_id == ADMIN_BYPASS_USER_ID
    }

    /// Console this identity is allowed to mount
    pub fn surface(&self) -> Surface {
        match self.role {
            Role::Admin => Surface::AdminConsole,
            Role::Doctor => Surface::DoctorConsole {
                doctor_id: self.user_id,
            },
            Role::Patient => Surface::PatientConsole {
                patient_id: self.user_id,
            },
        }
    }
}

/// UI surface selected by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "console", rename_all = "snake_case")]
pub enum Surface {
    AdminConsole,
    DoctorConsole { doctor_id: i64 },
    PatientConsole { patient_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session already authenticated as user {user_id}")]
pub struct AlreadyAuthenticated {
    pub user_id: i64,
}

/// Login state of one client context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    pub fn new() -> Self {
        Session::Anonymous
    }

    /// Anonymous -> Authenticated. A session that is already logged in must
    /// log out first; the current identity is left untouched.
    pub fn establish(&mut self, identity: Identity) -> Result<(), AlreadyAuthenticated> {
        if let Session::Authenticated(current) = self {
            return Err(AlreadyAuthenticated {
                user_id: current.user_id(),
            });
        }
        *self = Session::Authenticated(identity);
        Ok(())
    }

    /// Authenticated -> Anonymous
    pub fn logout(&mut self) {
        *self = Session::Anonymous;
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            Session::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.identity().map(Identity::role)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.identity().map(Identity::user_id)
    }

    pub fn surface(&self) -> Result<Surface, AppError> {
        self.identity()
            .map(Identity::surface)
            .ok_or(AppError::Unauthorized)
    }

    /// Gate for role-specific consoles
    pub fn require(&self, role: Role) -> Result<&Identity, AppError> {
        let identity = self.identity().ok_or(AppError::Unauthorized)?;
        if identity.role() != role {
            tracing::warn!(
                user_id = identity.user_id(),
                role = %identity.role(),
                required = %role,
                "Console access denied"
            );
            return Err(AppError::Forbidden);
        }
        Ok(identity)
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

/// Authenticated sessions keyed by opaque token.
///
/// Tokens absent from the map (never issued, logged out, or expired) resolve
/// to [`Session::Anonymous`].
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionEntry>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl.num_seconds().max(0) as u64
    }

    /// Start a session for a freshly authenticated identity
    pub fn open(&self, identity: Identity) -> Uuid {
        let token = Uuid::new_v4();
        let entry = SessionEntry {
            identity,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.insert(token, entry);

        metrics::gauge!("auth_sessions_active").set(self.sessions.len() as f64);
        token
    }

    /// The caller's session for `token`
    pub fn resolve(&self, token: &Uuid) -> Session {
        let now = Utc::now();
        let live = self
            .sessions
            .get(token)
            .map(|entry| (entry.expires_at > now).then_some(entry.identity));

        match live {
            Some(Some(identity)) => Session::Authenticated(identity),
            Some(None) => {
                self.sessions.remove(token);
                tracing::debug!("Session expired");
                Session::Anonymous
            }
            None => Session::Anonymous,
        }
    }

    /// End the session; returns whether it existed
    pub fn close(&self, token: &Uuid) -> bool {
        let removed = self.sessions.remove(token).is_some();
        metrics::gauge!("auth_sessions_active").set(self.sessions.len() as f64);
        removed
    }

    /// Drop every expired session; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        let purged = before.saturating_sub(self.sessions.len());

        metrics::gauge!("auth_sessions_active").set(self.sessions.len() as f64);
        purged
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
