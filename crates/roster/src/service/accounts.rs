use crate::{
    credential::TokenCodec,
    domain::User,
    error::{Error, Result},
    password::PasswordHasher,
    repository::UserRepository,
    validate,
};
use std::sync::Arc;

/// Reported for an unknown email and for a wrong password alike.
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Registration and login.
#[derive(Clone, Debug)]
pub struct Accounts {
    users: Arc<dyn UserRepository>,
    codec: Arc<TokenCodec>,
    hasher: PasswordHasher,
}

impl Accounts {
    pub fn new(users: Arc<dyn UserRepository>, codec: Arc<TokenCodec>) -> Self {
        Self::with_hasher(users, codec, PasswordHasher::default())
    }

    pub fn with_hasher(
        users: Arc<dyn UserRepository>,
        codec: Arc<TokenCodec>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            codec,
            hasher,
        }
    }

    /// Creates an account for `email`.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a bad email or password.
    /// - [`Error::Conflict`] if the email is already registered.
    /// - [`Error::Internal`] if hashing or storage fails.
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim();
        validate::email(email)?;
        validate::new_password(password)?;

        if self.users.exists_by_email(email).await? {
            return Err(Error::conflict("email already registered"));
        }

        let hash = self.blocking_hash(password.to_owned()).await?;
        let user = User::new(email, hash);
        self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Checks `email`/`password` and issues a token.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a bad email or empty password.
    /// - [`Error::Unauthorized`] if the email is unknown or the password is
    ///   wrong; both report the same message.
    /// - [`Error::Internal`] if lookup, verification or signing fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let email = email.trim();
        validate::email(email)?;
        if password.is_empty() {
            return Err(Error::validation("password is required"));
        }

        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(err) if err.is_not_found() => return Err(Error::unauthorized(INVALID_CREDENTIALS)),
            Err(err) => return Err(err),
        };

        if !self
            .blocking_verify(password.to_owned(), user.password_hash.clone())
            .await?
        {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        self.codec.issue(user.id, &user.email)
    }

    // Argon2 blocks for tens of milliseconds; run it on the blocking pool.
    async fn blocking_hash(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(Error::internal)?
    }

    async fn blocking_verify(&self, password: String, stored: String) -> Result<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(Error::internal)?
    }
}
