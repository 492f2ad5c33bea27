// ABOUTME: User account lifecycle and bearer-session issuance
// ABOUTME: Admin-managed accounts; self-service password changes; soft deactivation

use chrono::{Duration, Utc};
use planea_auth::{hash_password, policy, verify_password, AuthUser, Operation, Role};
use tracing::{info, warn};

use super::{WorkflowError, WorkflowResult};
use crate::db::DbState;
use crate::types::{LoginSession, User, UserCreateInput, UserUpdateInput};
use crate::validator::{validate_user_create, validate_user_update};

pub struct UserWorkflow {
    db: DbState,
    session_ttl: Duration,
}

impl UserWorkflow {
    pub fn new(db: DbState, session_ttl: Duration) -> Self {
        Self { db, session_ttl }
    }

    pub async fn create(&self, user: &AuthUser, input: UserCreateInput) -> WorkflowResult<User> {
        if !policy::role_allowed(Operation::UserCreate, user.role) {
            return Err(WorkflowError::Forbidden("Not authorized to create users"));
        }

        let errors = validate_user_create(&input);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        let email = planea_core::normalize_email(&input.email);
        if self.db.users.get_by_email(&email).await?.is_some() {
            return Err(WorkflowError::Conflict(format!(
                "A user with email '{}' already exists",
                email
            )));
        }

        let password_hash = hash_password(&input.password)?;
        let created = self
            .db
            .users
            .create(input.name.trim(), &email, &password_hash, input.role)
            .await?;

        info!("User {} ({}) created by {}", created.email, created.role, user.email);
        Ok(created)
    }

    pub async fn list(&self, user: &AuthUser) -> WorkflowResult<Vec<User>> {
        if !policy::role_allowed(Operation::UserList, user.role) {
            return Err(WorkflowError::Forbidden("Not authorized to list users"));
        }
        Ok(self.db.users.list_active().await?)
    }

    pub async fn list_professors(&self, user: &AuthUser) -> WorkflowResult<Vec<User>> {
        if !policy::role_allowed(Operation::UserList, user.role) {
            return Err(WorkflowError::Forbidden("Not authorized to list users"));
        }
        Ok(self.db.users.list_professors().await?)
    }

    pub async fn get(&self, user: &AuthUser, id: &str) -> WorkflowResult<User> {
        if !policy::row_allowed(Operation::UserRead, user.role, id, &user.id) {
            return Err(WorkflowError::Forbidden("Not authorized to view this user"));
        }
        self.db
            .users
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("User"))
    }

    /// Admins may change name, role and activation; any user may change
    /// their own name and password.
    pub async fn update(
        &self,
        user: &AuthUser,
        id: &str,
        input: UserUpdateInput,
    ) -> WorkflowResult<User> {
        let target = self
            .db
            .users
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("User"))?;

        let is_admin = user.role == Role::Admin;
        if !is_admin && user.id != target.id {
            return Err(WorkflowError::Forbidden("Not authorized to update this user"));
        }
        if (input.role.is_some() || input.is_active.is_some()) && !is_admin {
            return Err(WorkflowError::Forbidden("Not authorized to update roles"));
        }

        let errors = validate_user_update(&input);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        let password_hash = match &input.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let updated = self
            .db
            .users
            .update(id, input.name.as_deref(), password_hash.as_deref(), input.role)
            .await?
            .ok_or(WorkflowError::NotFound("User"))?;

        if let Some(active) = input.is_active {
            self.db.users.set_active(id, active).await?;
            if !active {
                self.db.sessions.revoke_for_user(id).await?;
                info!("User {} deactivated by {}", target.email, user.email);
                let mut deactivated = updated;
                deactivated.is_active = false;
                return Ok(deactivated);
            }
        }

        info!("User {} updated by {}", updated.email, user.email);
        Ok(updated)
    }

    /// Soft deletion: flips is_active and revokes every open session
    pub async fn delete(&self, user: &AuthUser, id: &str) -> WorkflowResult<()> {
        if !policy::role_allowed(Operation::UserDelete, user.role) {
            return Err(WorkflowError::Forbidden("Not authorized to delete users"));
        }

        let target = self
            .db
            .users
            .get(id)
            .await?
            .ok_or(WorkflowError::NotFound("User"))?;

        self.db.users.set_active(id, false).await?;
        self.db.sessions.revoke_for_user(id).await?;

        info!("User {} deleted by {}", target.email, user.email);
        Ok(())
    }

    /// Verify credentials and issue a bearer session.
    /// Returns None for unknown email, wrong password, or inactive account.
    pub async fn login(&self, email: &str, password: &str) -> WorkflowResult<Option<LoginSession>> {
        let email = planea_core::normalize_email(email);
        let Some(user) = self.db.users.get_by_email(&email).await? else {
            return Ok(None);
        };
        if !verify_password(password, &user.password_hash) {
            warn!("Failed login attempt for {}", email);
            return Ok(None);
        }

        let token = planea_auth::generate_token();
        let token_hash = planea_auth::hash_token(&token);
        let expires_at = Utc::now() + self.session_ttl;

        self.db.sessions.create(&user.id, &token_hash, expires_at).await?;

        info!("User {} logged in", user.email);
        Ok(Some(LoginSession {
            token,
            token_type: "Bearer",
            expires_at,
            user,
        }))
    }

    /// Revoke the session belonging to the presented token
    pub async fn logout(&self, token: &str) -> WorkflowResult<bool> {
        let token_hash = planea_auth::hash_token(token);
        Ok(self.db.sessions.revoke(&token_hash).await?)
    }

    /// Resolve a bearer token into an identity. None means unauthenticated:
    /// unknown or revoked session, expired session, or deactivated user.
    pub async fn resolve(&self, token: &str) -> WorkflowResult<Option<AuthUser>> {
        let token_hash = planea_auth::hash_token(token);
        let Some(session) = self.db.sessions.find_active(&token_hash).await? else {
            return Ok(None);
        };
        if session.expires_at <= Utc::now() {
            return Ok(None);
        }
        let Some(user) = self.db.users.get(&session.user_id).await? else {
            return Ok(None);
        };

        // Best-effort usage timestamp; never fails the request
        if let Err(e) = self.db.sessions.touch(&token_hash).await {
            warn!("Failed to update session last_used_at: {}", e);
        }

        Ok(Some(AuthUser {
            id: user.id,
            role: user.role,
            email: user.email,
            name: user.name,
        }))
    }
}
