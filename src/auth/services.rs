use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{
    dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
    extractors::AuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_dummy, verify_password},
    repo_types::{NewUser, Role, User},
};
use crate::error::AppError;
use crate::store::Store;

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Create a parent (anonymous) or a child (only by an authenticated parent).
pub async fn signup(
    store: &dyn Store,
    caller: Option<AuthUser>,
    req: SignupRequest,
) -> Result<User, AppError> {
    let role: Role = req.role.parse()?;

    let (email, parent_id) = match role {
        Role::Child => {
            let caller = caller.ok_or(AppError::Unauthorized(
                "Only an authenticated parent can create child accounts",
            ))?;
            if !caller.is_parent() {
                warn!(user_id = %caller.user_id, "non-parent tried to create a child account");
                return Err(AppError::Forbidden("Only parents can create child accounts"));
            }
            (None, Some(caller.user_id))
        }
        Role::Parent => {
            let email = req
                .email
                .as_deref()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .ok_or_else(|| AppError::Validation("Email required for parent signup".into()))?;
            if !is_valid_email(&email) {
                warn!(%email, "invalid email");
                return Err(AppError::Validation("Invalid email".into()));
            }
            (Some(email), None)
        }
    };

    let username = req.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if store.find_user_by_username(&username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(AppError::DuplicateUsername);
    }
    if let Some(email) = email.as_deref() {
        if store.parent_email_exists(email).await? {
            warn!(%email, "parent email already registered");
            return Err(AppError::DuplicateEmail);
        }
    }

    let password_hash = hash_password(&req.password)?;
    let user = store
        .create_user(NewUser {
            username,
            password_hash,
            role,
            email,
            parent_id,
        })
        .await
        .map_err(AppError::from_store)?;

    info!(user_id = %user.id, %role, parent_id = ?user.parent_id, "user signed up");
    Ok(user)
}

/// Verify credentials. Unknown usernames and wrong passwords fail identically.
pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<AuthResponse, AppError> {
    let username = req.username.trim();

    let Some(user) = store.find_user_by_username(username).await? else {
        verify_dummy(&req.password);
        warn!(%username, "login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let response = issue_tokens(keys, &user)?;
    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(response)
}

/// Exchange a refresh token for a new token pair.
pub async fn refresh(
    store: &dyn Store,
    keys: &JwtKeys,
    refresh_token: &str,
) -> Result<AuthResponse, AppError> {
    let claims = keys.verify_refresh(refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::Unauthorized("Invalid or expired refresh token")
    })?;

    let user = store
        .find_user_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized("User not found"))?;

    issue_tokens(keys, &user)
}

/// Profile of the authenticated caller.
pub async fn me(store: &dyn Store, caller: AuthUser) -> Result<User, AppError> {
    store
        .find_user_by_id(caller.user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found"))
}

fn issue_tokens(keys: &JwtKeys, user: &User) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id, user.role)?,
        refresh_token: keys.sign_refresh(user.id, user.role)?,
        token_type: "bearer",
        user: PublicUser::from(user),
    })
}
