use uuid::Uuid;

use crate::config::Config;
use crate::database::{Datastore, NewUser, Role, UserEntity};
use crate::error::AppError;
use crate::utils::{generate_token, hash_password, verify_password};

use super::types::{
    Credentials, Flow, INCORRECT_PASSWORD, NewAccount, Outcome, Rejection, Session,
    USER_NOT_FOUND, UserContext, Users,
};

/// 用户账户相关的请求处理
///
/// Each operation takes the request's [`UserContext`] and either passes it on
/// ([`Flow::Next`]), ends the request ([`Flow::Halt`]), or fails with an
/// [`AppError`] that has already been logged.
pub struct UserService<'a> {
    store: &'a dyn Datastore,
    config: &'a Config,
}

impl<'a> UserService<'a> {
    pub fn new(store: &'a dyn Datastore, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Checks the credentials and, on success, records a freshly issued
    /// session token in the context.
    ///
    /// Unknown emails and wrong passwords end the request with a 401.
    pub async fn authenticate_user(
        &self,
        ctx: UserContext,
        email: &str,
        password: &str,
    ) -> Outcome {
        self.authenticate(ctx, email, password)
            .await
            .inspect_err(|e| tracing::error!("Error authenticating user: {}", e))
    }

    async fn authenticate(&self, mut ctx: UserContext, email: &str, password: &str) -> Outcome {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            tracing::warn!("User not found");
            return Ok(Flow::Halt(Rejection::unauthorized(USER_NOT_FOUND)));
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!("Incorrect password for user");
            return Ok(Flow::Halt(Rejection::unauthorized(INCORRECT_PASSWORD)));
        }

        let (token, expires_at) = generate_token(user.id, user.role, self.config)?;
        ctx.session = Some(Session {
            token,
            user_id: user.id,
            role: user.role,
            expires_at,
        });

        tracing::info!("User with email {} authenticated successfully", email);
        Ok(Flow::Next(ctx))
    }

    pub async fn get_all_users(&self, mut ctx: UserContext) -> Outcome {
        let users = self
            .store
            .find_users()
            .await
            .map_err(AppError::from)
            .inspect_err(|e| tracing::error!("Error retrieving all users: {}", e))?;

        ctx.users = Some(Users::Many(users));
        tracing::info!("Retrieved all users successfully");
        Ok(Flow::Next(ctx))
    }

    /// Registers a user with the `user` role and logs them in right away.
    ///
    /// The account is not rolled back if the login step fails.
    pub async fn create_user(&self, mut ctx: UserContext, account: NewAccount) -> Outcome {
        let user = self
            .register(&account)
            .await
            .inspect_err(|e| tracing::error!("Error creating user: {}", e))?;

        ctx.users = Some(Users::One(user));
        tracing::info!("User created successfully");

        self.authenticate_user(ctx, &account.email, &account.password)
            .await
    }

    async fn register(&self, account: &NewAccount) -> Result<UserEntity, AppError> {
        let password_hash = hash_password(&account.password, self.config.bcrypt_cost)?;

        let user = self
            .store
            .create_user(NewUser {
                email: account.email.clone(),
                username: account.username.clone(),
                password_hash,
                role: Role::User,
            })
            .await?;

        Ok(user)
    }

    /// Deletes the user together with its posts and comments.
    pub async fn delete_user(&self, mut ctx: UserContext, user_id: Uuid) -> Outcome {
        let summary = self
            .store
            .delete_user_cascade(user_id)
            .await
            .map_err(AppError::from)
            .and_then(|deleted| deleted.ok_or_else(|| AppError::NotFound(format!("user {user_id}"))))
            .inspect_err(|e| tracing::error!("Error deleting user: {}", e))?;

        ctx.deleted = Some(summary);
        tracing::info!("User with ID {} deleted successfully", user_id);
        Ok(Flow::Next(ctx))
    }

    /// Login entry point. Failures are logged by [`Self::authenticate_user`].
    pub async fn find_user(&self, ctx: UserContext, credentials: &Credentials) -> Outcome {
        self.authenticate_user(ctx, &credentials.email, &credentials.password)
            .await
    }
}
