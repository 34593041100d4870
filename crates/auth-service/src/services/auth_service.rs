//! Registration and login business logic.
//!
//! Register runs `validate -> hash -> persist -> provision profile -> issue
//! token`. If provisioning fails, the just-created user row is deleted before
//! the error is returned, so a failed registration never leaves a user
//! without a profile.

use crate::errors::AuthError;
use crate::models::{LoginRequest, NewUser, RegisterRequest, User};
use crate::repositories::UserRepository;
use crate::services::profile_client::ProfileProvisioner;
use common::jwt::TokenSigner;
use common::observability::metrics::record_compensation;
use common::password;
use common::secret::{ExposeSecret, SecretString};
use common::store::StoreError;
use std::sync::Arc;
use tracing::{error, info, instrument, warn, Instrument};
use uuid::Uuid;

const MIN_USERNAME_CHARS: usize = 3;
const MAX_USERNAME_CHARS: usize = 30;
const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileProvisioner>,
    tokens: Arc<TokenSigner>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileProvisioner>,
        tokens: Arc<TokenSigner>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            profiles,
            tokens,
            bcrypt_cost,
        }
    }

    /// Register a user and return a session token for them.
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` before any side effect
    /// - `AuthError::EmailOrUsernameTaken` if the store reports a duplicate;
    ///   the profile service is not called
    /// - `AuthError::ProfileProvisioningFailed` if the profile call fails; the
    ///   user row has been deleted by then
    #[instrument(skip_all, name = "auth.service.register")]
    pub async fn register(&self, request: RegisterRequest) -> Result<String, AuthError> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();
        validate_registration(&username, &email, request.password.expose_secret())?;

        let password_hash = self.hash(request.password).await?;
        let new_user = NewUser {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
        };

        // Detached from the request: a dropped client or an expired timeout
        // must not interrupt a rollback.
        let this = self.clone();
        let task = async move { this.persist_with_profile(new_user).await };
        let user_id = tokio::spawn(task.in_current_span())
            .await
            .map_err(|e| AuthError::Internal(format!("Registration task failed: {}", e)))??;

        let token = self
            .tokens
            .issue(&user_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!(target: "auth.service", user_id = %user_id, "User registered");
        Ok(token)
    }

    async fn persist_with_profile(&self, new_user: NewUser) -> Result<String, AuthError> {
        let user = self.users.create(new_user).await?;
        let user_id = user.id.to_string();

        if let Err(e) = self.profiles.provision(&user_id, &user.username).await {
            warn!(target: "auth.service", user_id = %user_id, error = %e, "Rolling back user after profile provisioning failure");
            self.roll_back(user.id).await;
            return Err(AuthError::ProfileProvisioningFailed);
        }

        Ok(user_id)
    }

    async fn roll_back(&self, id: Uuid) {
        match self.users.delete(id).await {
            Ok(()) => record_compensation("register_rollback", "success"),
            Err(e) => {
                // The user row now has no profile; nothing else will remove it.
                error!(target: "auth.service", user_id = %id, error = %e, "Registration rollback failed");
                record_compensation("register_rollback", "failed");
            }
        }
    }

    /// Verify credentials and return a session token.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// `AuthError::InvalidCredentials` after the same bcrypt work.
    #[instrument(skip_all, name = "auth.service.login")]
    pub async fn login(&self, request: LoginRequest) -> Result<String, AuthError> {
        let user = match self.users.find_by_username(request.username.trim()).await {
            Ok(user) => Some(user),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let Some(user) = user else {
            let password = request.password;
            tokio::task::spawn_blocking(move || {
                password::verify_against_dummy(password.expose_secret());
            })
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))?;
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify(request.password, user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }

        self.tokens
            .issue(&user.id.to_string())
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Look up a user by id. Ids that are not UUIDs cannot exist.
    #[instrument(skip_all, name = "auth.service.find_user")]
    pub async fn find_user(&self, id: &str) -> Result<User, AuthError> {
        let id = Uuid::parse_str(id).map_err(|_| AuthError::UserNotFound)?;
        Ok(self.users.find_by_id(id).await?)
    }

    #[instrument(skip_all, name = "auth.service.delete_user")]
    pub async fn delete_user(&self, id: &str) -> Result<(), AuthError> {
        let id = Uuid::parse_str(id).map_err(|_| AuthError::UserNotFound)?;
        self.users.delete(id).await?;
        info!(target: "auth.service", user_id = %id, "User deleted");
        Ok(())
    }

    pub async fn health(&self) -> Result<(), AuthError> {
        self.users
            .health()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))
    }

    async fn hash(&self, password: SecretString) -> Result<String, AuthError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || password::hash_password(password.expose_secret(), cost))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn verify(&self, password: SecretString, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || password::verify_password(password.expose_secret(), &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

/// Check registration input. Runs before any side effect.
pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), AuthError> {
    let username_chars = username.chars().count();
    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&username_chars) {
        return Err(AuthError::Validation(
            "username must be between 3 and 30 characters".to_string(),
        ));
    }

    // The username seeds the profile display name, which only allows this set.
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(AuthError::Validation(
            "username may only contain letters, digits, '_', '-' and '.'".to_string(),
        ));
    }

    if !is_valid_email(email) {
        return Err(AuthError::Validation("invalid email format".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    Ok(())
}

/// `local@domain.tld`: local part from `[A-Za-z0-9._%+-]`, domain from
/// `[A-Za-z0-9.-]`, and an alphabetic TLD of at least two letters.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'));

    let domain_ok = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'));

    let tld_ok = match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    };

    local_ok && domain_ok && tld_ok
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryUserRepository;
    use crate::services::profile_client::mock::MockProfileProvisioner;
    use common::password::MIN_BCRYPT_COST;

    struct Fixture {
        service: AuthService,
        users: Arc<InMemoryUserRepository>,
        profiles: Arc<MockProfileProvisioner>,
        tokens: Arc<TokenSigner>,
    }

    fn fixture(profiles: MockProfileProvisioner) -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let profiles = Arc::new(profiles);
        let tokens = Arc::new(TokenSigner::new(&SecretString::from(
            "unit-test-secret-of-at-least-32-bytes!!",
        )));
        let service = AuthService::new(
            users.clone(),
            profiles.clone(),
            tokens.clone(),
            MIN_BCRYPT_COST,
        );

        Fixture {
            service,
            users,
            profiles,
            tokens,
        }
    }

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: SecretString::from(password),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: SecretString::from(password),
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_profile_and_token() {
        let f = fixture(MockProfileProvisioner::accepting());

        let token = f
            .service
            .register(register_request("alice", "alice@example.com", "password123"))
            .await
            .unwrap();

        let claims = f.tokens.verify(&token).unwrap();
        let user = f.service.find_user(&claims.sub).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(f.profiles.call_count(), 1);
    }

    #[tokio::test]
    async fn test_register_rolls_back_when_provisioning_fails() {
        let f = fixture(MockProfileProvisioner::failing(500));

        let result = f
            .service
            .register(register_request("alice", "alice@example.com", "password123"))
            .await;

        assert!(matches!(result, Err(AuthError::ProfileProvisioningFailed)));
        assert!(f.users.is_empty().await);
        assert!(matches!(
            f.users.find_by_username("alice").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_skips_profile_call() {
        let f = fixture(MockProfileProvisioner::accepting());
        f.service
            .register(register_request("alice", "alice@example.com", "password123"))
            .await
            .unwrap();

        let same_username = f
            .service
            .register(register_request("alice", "other@example.com", "password123"))
            .await;
        let same_email = f
            .service
            .register(register_request("bob", "alice@example.com", "password123"))
            .await;

        assert!(matches!(same_username, Err(AuthError::EmailOrUsernameTaken)));
        assert!(matches!(same_email, Err(AuthError::EmailOrUsernameTaken)));
        assert_eq!(f.profiles.call_count(), 1);
    }

    #[tokio::test]
    async fn test_register_validation_has_no_side_effects() {
        let f = fixture(MockProfileProvisioner::accepting());

        let result = f
            .service
            .register(register_request("al", "alice@example.com", "password123"))
            .await;

        assert!(matches!(result, Err(AuthError::Validation(_))));
        assert!(f.users.is_empty().await);
        assert_eq!(f.profiles.call_count(), 0);
    }

    #[tokio::test]
    async fn test_register_rollback_survives_dropped_request() {
        let f = fixture(
            MockProfileProvisioner::failing(500).with_delay(std::time::Duration::from_millis(500)),
        );

        let cancelled = tokio::time::timeout(
            std::time::Duration::from_millis(250),
            f.service
                .register(register_request("alice", "alice@example.com", "password123")),
        )
        .await;
        assert!(cancelled.is_err());
        assert_eq!(f.profiles.call_count(), 1);

        tokio::time::sleep(std::time::Duration::from_millis(750)).await;

        assert!(f.users.is_empty().await);
    }

    #[tokio::test]
    async fn test_login_success_issues_token_for_user() {
        let f = fixture(MockProfileProvisioner::accepting());
        let registered = f
            .service
            .register(register_request("alice", "alice@example.com", "password123"))
            .await
            .unwrap();

        let token = f
            .service
            .login(login_request("alice", "password123"))
            .await
            .unwrap();

        assert_eq!(
            f.tokens.verify(&token).unwrap().sub,
            f.tokens.verify(&registered).unwrap().sub
        );
    }

    #[tokio::test]
    async fn test_login_unknown_user_and_wrong_password_are_identical() {
        let f = fixture(MockProfileProvisioner::accepting());
        f.service
            .register(register_request("alice", "alice@example.com", "password123"))
            .await
            .unwrap();

        let unknown = f
            .service
            .login(login_request("mallory", "password123"))
            .await
            .unwrap_err();
        let wrong = f
            .service
            .login(login_request("alice", "wrong-password"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_find_user_with_non_uuid_is_not_found() {
        let f = fixture(MockProfileProvisioner::accepting());

        let result = f.service.find_user("not-a-uuid").await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_delete_user_then_find_is_not_found() {
        let f = fixture(MockProfileProvisioner::accepting());
        let token = f
            .service
            .register(register_request("alice", "alice@example.com", "password123"))
            .await
            .unwrap();
        let id = f.tokens.verify(&token).unwrap().sub;

        f.service.delete_user(&id).await.unwrap();

        assert!(matches!(
            f.service.find_user(&id).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            f.service.delete_user(&id).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_health_reports_store_outage() {
        let f = fixture(MockProfileProvisioner::accepting());
        assert!(f.service.health().await.is_ok());

        f.users.set_healthy(false);
        assert!(matches!(
            f.service.health().await,
            Err(AuthError::Unavailable(_))
        ));
    }

    #[test]
    fn test_validate_registration_rules() {
        assert!(validate_registration("alice", "alice@example.com", "password123").is_ok());
        assert!(validate_registration("a.b-c_d", "a@b.io", "12345678").is_ok());

        assert!(validate_registration("al", "alice@example.com", "password123").is_err());
        assert!(validate_registration(&"a".repeat(31), "alice@example.com", "password123").is_err());
        assert!(validate_registration("alice smith", "alice@example.com", "password123").is_err());
        assert!(validate_registration("alice", "alice@example.com", "short").is_err());
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(is_valid_email("a_b%c@host-name.org"));

        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@example.c"));
        assert!(!is_valid_email("user@example.c0m"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("user@.com"));
    }
}
