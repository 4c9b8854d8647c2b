use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use notely_shared::errors::{AppError, AppResult, ErrorCode};
use notely_shared::session::SessionIssuer;

use super::identity::IdentityVerifier;
use super::notifier::Notifier;
use super::password::{generate_otp_code, CredentialHasher};
use crate::clock::Clock;
use crate::models::{AuthMethod, OtpEntry, User, UserProfile};
use crate::store::{OtpStore, UserStore};

pub const OTP_SENT_MESSAGE: &str = "OTP sent successfully to your email";
const INVALID_CREDENTIALS: &str = "invalid email or password";
const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(15);
const DUMMY_PASSWORD: &str = "notely-dummy-password";

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupInput {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginInput {
    #[validate(custom = "not_blank")]
    pub email: String,
    #[validate(custom = "not_blank")]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SendOtpInput {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct VerifyOtpInput {
    #[validate(custom = "not_blank")]
    pub email: String,
    #[validate(custom = "not_blank")]
    pub otp: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct GoogleLoginInput {
    #[validate(custom = "not_blank")]
    pub token: String,
}

/// A freshly issued session and the user it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    otps: Arc<dyn OtpStore>,
    sessions: SessionIssuer,
    hasher: CredentialHasher,
    notifier: Arc<dyn Notifier>,
    identity: Arc<dyn IdentityVerifier>,
    clock: Arc<dyn Clock>,
    otp_ttl: chrono::Duration,
    otp_max_attempts: i32,
    delivery_timeout: Duration,
    /// Verified against when the account has no password, so unknown
    /// emails cost the same Argon2 work as wrong passwords.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        otps: Arc<dyn OtpStore>,
        sessions: SessionIssuer,
        hasher: CredentialHasher,
        notifier: Arc<dyn Notifier>,
        identity: Arc<dyn IdentityVerifier>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            users,
            otps,
            sessions,
            hasher,
            notifier,
            identity,
            clock,
            otp_ttl: chrono::Duration::minutes(10),
            otp_max_attempts: 5,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            dummy_hash,
        })
    }

    pub fn with_otp_policy(mut self, ttl_secs: i64, max_attempts: i32) -> Self {
        self.otp_ttl = chrono::Duration::seconds(ttl_secs);
        self.otp_max_attempts = max_attempts;
        self
    }

    /// Upper bound on waiting for an OTP email before falling back to the log.
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub async fn signup(&self, mut input: SignupInput) -> AppResult<AuthSession> {
        input.email = normalize_email(&input.email);
        input.validate()?;
        let email = input.email;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::new(ErrorCode::EmailAlreadyExists, "user already exists with this email"));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let mut user = User::new(email, input.name.trim().to_string(), AuthMethod::Password, self.clock.now());
        user.password_hash = Some(password_hash);
        user.email_verified = true;
        let user = self.users.create(user).await?;

        self.send_welcome_detached(&user);

        counter!("auth_signups_total").increment(1);
        tracing::info!(user_id = %user.id, email = %user.email, "user signed up");

        self.session_for(&user)
    }

    pub async fn login(&self, input: LoginInput) -> AppResult<AuthSession> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let user = self.users.find_by_email(&email).await?;

        // Unknown emails and accounts created through OTP or Google have no
        // password; they still pay for one verification.
        let stored = user.as_ref().and_then(|u| u.password_hash.as_deref());
        let has_password = stored.is_some();
        let matched = self
            .hasher
            .verify(&input.password, stored.unwrap_or(self.dummy_hash.as_str()))?;

        let user = match user {
            Some(user) if matched && has_password => user,
            _ => {
                tracing::debug!(email = %email, "login rejected");
                return Err(AppError::new(ErrorCode::InvalidCredentials, INVALID_CREDENTIALS));
            }
        };

        counter!("auth_logins_total", "method" => "password").increment(1);
        tracing::info!(user_id = %user.id, "user logged in");

        self.session_for(&user)
    }

    /// Issue a fresh code, replacing any earlier one for the address.
    /// Delivery failures are logged and never reported to the caller.
    pub async fn send_otp(&self, input: SendOtpInput) -> AppResult<&'static str> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let now = self.clock.now();
        let code = generate_otp_code();
        self.otps
            .replace(OtpEntry {
                id: Uuid::now_v7(),
                email: email.clone(),
                code: code.clone(),
                expires_at: now + self.otp_ttl,
                attempts: 0,
                used: false,
                created_at: now,
            })
            .await?;

        let ttl_minutes = self.otp_ttl.num_minutes();
        let sending = self.notifier.send_otp(&email, &code, ttl_minutes);
        let outcome = match tokio::time::timeout(self.delivery_timeout, sending).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!("no response within {:?}", self.delivery_timeout)),
        };
        let delivered = match outcome {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    diagnostic = true,
                    email = %email,
                    otp = %code,
                    expires_in_minutes = ttl_minutes,
                    error = %e,
                    "otp email not delivered"
                );
                false
            }
        };

        let delivered_label = if delivered { "true" } else { "false" };
        counter!("otp_sent_total", "delivered" => delivered_label).increment(1);
        tracing::info!(email = %email, delivered, "otp issued");

        Ok(OTP_SENT_MESSAGE)
    }

    pub async fn verify_otp(&self, input: VerifyOtpInput) -> AppResult<AuthSession> {
        input.validate()?;
        let email = normalize_email(&input.email);
        let now = self.clock.now();

        let Some(entry) = self.otps.find_valid(&email, input.otp.trim(), now).await? else {
            self.otps.record_failed_attempt(&email, now).await?;
            return Err(invalid_otp());
        };

        if entry.attempts >= self.otp_max_attempts {
            return Err(AppError::new(
                ErrorCode::OtpTooManyAttempts,
                "too many attempts, please request a new OTP",
            ));
        }

        if !self.otps.mark_used(entry.id).await? {
            return Err(invalid_otp());
        }

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let mut user = User::new(email.clone(), local_part(&email), AuthMethod::Otp, now);
                user.email_verified = true;
                let user = self.create_or_fetch(user).await?;
                tracing::info!(user_id = %user.id, "user created from otp");
                user
            }
        };

        counter!("auth_logins_total", "method" => "otp").increment(1);
        tracing::info!(user_id = %user.id, "otp verified");

        self.session_for(&user)
    }

    pub async fn google_login(&self, input: GoogleLoginInput) -> AppResult<AuthSession> {
        input.validate()?;

        let identity = self.identity.verify(input.token.trim()).await.map_err(|e| {
            tracing::warn!(error = %e, "google token rejected");
            AppError::new(ErrorCode::OAuthError, "invalid Google token")
        })?;

        if !identity.email_verified {
            return Err(AppError::new(ErrorCode::OAuthError, "Google email not verified"));
        }

        let email = normalize_email(&identity.email);
        let existing = match self.users.find_by_email(&email).await? {
            Some(user) => Some(user),
            None => self.users.find_by_google_id(&identity.id).await?,
        };

        let now = self.clock.now();
        let user = match existing {
            None => {
                let name = identity.name.clone().unwrap_or_else(|| local_part(&email));
                let mut user = User::new(email, name, AuthMethod::Google, now);
                user.google_id = Some(identity.id);
                user.avatar = identity.avatar;
                user.email_verified = true;
                let user = self.create_or_fetch(user).await?;

                self.send_welcome_detached(&user);
                tracing::info!(user_id = %user.id, "user created from google");
                user
            }
            Some(mut user) if user.google_id.is_none() => {
                user.google_id = Some(identity.id);
                if user.avatar.is_none() {
                    user.avatar = identity.avatar;
                }
                user.updated_at = now;
                let user = self.users.save(&user).await?;
                tracing::info!(user_id = %user.id, "google account linked");
                user
            }
            Some(user) => user,
        };

        counter!("auth_logins_total", "method" => "google").increment(1);
        self.session_for(&user)
    }

    pub async fn current_user(&self, user_id: Uuid) -> AppResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| UserProfile::from(&user))
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
    }

    fn session_for(&self, user: &User) -> AppResult<AuthSession> {
        Ok(AuthSession {
            token: self.sessions.issue(user.id)?,
            user: UserProfile::from(user),
        })
    }

    /// Create, or return the row a concurrent request created first.
    async fn create_or_fetch(&self, user: User) -> AppResult<User> {
        let email = user.email.clone();
        match self.users.create(user).await {
            Err(e) if e.is(ErrorCode::EmailAlreadyExists) => self
                .users
                .find_by_email(&email)
                .await?
                .ok_or(e),
            other => other,
        }
    }

    fn send_welcome_detached(&self, user: &User) {
        let notifier = self.notifier.clone();
        let (email, name) = (user.email.clone(), user.name.clone());
        tokio::spawn(async move {
            if let Err(e) = notifier.send_welcome(&email, &name).await {
                tracing::warn!(error = %e, email = %email, "welcome email not delivered");
            }
        });
    }
}

fn invalid_otp() -> AppError {
    AppError::new(ErrorCode::OtpInvalidOrExpired, "invalid or expired OTP")
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity::ExternalIdentity;
    use crate::store::Stores;
    use crate::testing::{harness, Harness, ManualClock, StalledNotifier, StubVerifier};

    fn signup_input(email: &str) -> SignupInput {
        SignupInput {
            email: email.into(),
            name: "Ada".into(),
            password: "secret1".into(),
        }
    }

    async fn send_code(h: &Harness, email: &str) -> String {
        h.state
            .auth
            .send_otp(SendOtpInput { email: email.into() })
            .await
            .unwrap();
        h.notifier.last_code(&email.to_lowercase()).unwrap()
    }

    fn verify(email: &str, otp: &str) -> VerifyOtpInput {
        VerifyOtpInput { email: email.into(), otp: otp.into() }
    }

    #[tokio::test]
    async fn signup_conflicts_on_any_case_variant() {
        let h = harness();
        h.state.auth.signup(signup_input("ada@example.com")).await.unwrap();

        let err = h.state.auth.signup(signup_input("ADA@Example.COM")).await.unwrap_err();
        assert!(err.is(ErrorCode::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn signup_validates_fields() {
        let h = harness();
        let auth = &h.state.auth;

        let short = SignupInput { password: "12345".into(), ..signup_input("a@x.com") };
        assert!(auth.signup(short).await.unwrap_err().is(ErrorCode::ValidationError));

        let blank_name = SignupInput { name: "  ".into(), ..signup_input("a@x.com") };
        assert!(auth.signup(blank_name).await.unwrap_err().is(ErrorCode::ValidationError));

        let bad_email = signup_input("not-an-email");
        assert!(auth.signup(bad_email).await.unwrap_err().is(ErrorCode::ValidationError));
    }

    #[tokio::test]
    async fn signup_trims_email_like_login() {
        let h = harness();
        let session = h.state.auth.signup(signup_input("  Ada@Example.com ")).await.unwrap();
        assert_eq!(session.user.email, "ada@example.com");

        h.state
            .auth
            .login(LoginInput { email: " ada@example.com".into(), password: "secret1".into() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn signup_creates_verified_password_account() {
        let h = harness();
        let session = h.state.auth.signup(signup_input("Ada@Example.com")).await.unwrap();

        assert_eq!(session.user.email, "ada@example.com");
        assert_eq!(session.user.auth_method, AuthMethod::Password);
        assert!(session.user.email_verified);
        assert_eq!(h.state.sessions.resolve(&session.token).unwrap(), session.user.id);
    }

    #[tokio::test]
    async fn signup_sends_welcome_in_background() {
        let h = harness();
        h.state.auth.signup(signup_input("ada@example.com")).await.unwrap();

        for _ in 0..10 {
            if !h.notifier.welcomes().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(h.notifier.welcomes(), vec!["ada@example.com".to_string()]);
    }

    #[tokio::test]
    async fn login_token_resolves_to_signed_up_user() {
        let h = harness();
        let signed_up = h.state.auth.signup(signup_input("ada@example.com")).await.unwrap();

        let session = h
            .state
            .auth
            .login(LoginInput { email: "ADA@example.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        assert_eq!(h.state.sessions.resolve(&session.token).unwrap(), signed_up.user.id);
    }

    #[tokio::test]
    async fn login_failures_share_one_message() {
        let h = harness();
        h.state.auth.signup(signup_input("ada@example.com")).await.unwrap();
        let code = send_code(&h, "otp@example.com").await;
        h.state.auth.verify_otp(verify("otp@example.com", &code)).await.unwrap();

        let attempts = [
            ("ada@example.com", "wrong-password"),
            ("nobody@example.com", "secret1"),
            ("otp@example.com", "secret1"),
        ];
        for (email, password) in attempts {
            let err = h
                .state
                .auth
                .login(LoginInput { email: email.into(), password: password.into() })
                .await
                .unwrap_err();
            assert!(err.is(ErrorCode::InvalidCredentials));
            assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        }
    }

    #[tokio::test]
    async fn passwordless_account_rejects_every_password() {
        let h = harness();
        let code = send_code(&h, "otp@example.com").await;
        h.state.auth.verify_otp(verify("otp@example.com", &code)).await.unwrap();

        let err = h
            .state
            .auth
            .login(LoginInput { email: "otp@example.com".into(), password: DUMMY_PASSWORD.into() })
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::InvalidCredentials));

        let err = h
            .state
            .auth
            .login(LoginInput { email: "nobody@example.com".into(), password: DUMMY_PASSWORD.into() })
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let h = harness();
        let err = h.state.auth.login(LoginInput::default()).await.unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
    }

    #[tokio::test]
    async fn reissued_code_invalidates_previous() {
        let h = harness();
        let first = send_code(&h, "a@x.com").await;
        let mut second = send_code(&h, "a@x.com").await;
        while second == first {
            second = send_code(&h, "a@x.com").await;
        }

        let err = h.state.auth.verify_otp(verify("a@x.com", &first)).await.unwrap_err();
        assert!(err.is(ErrorCode::OtpInvalidOrExpired));
        h.state.auth.verify_otp(verify("a@x.com", &second)).await.unwrap();
    }

    #[tokio::test]
    async fn code_expiry_boundary() {
        let h = harness();
        let code = send_code(&h, "a@x.com").await;
        h.clock.advance(chrono::Duration::seconds(599));
        h.state.auth.verify_otp(verify("a@x.com", &code)).await.unwrap();

        let code = send_code(&h, "b@x.com").await;
        h.clock.advance(chrono::Duration::seconds(601));
        let err = h.state.auth.verify_otp(verify("b@x.com", &code)).await.unwrap_err();
        assert!(err.is(ErrorCode::OtpInvalidOrExpired));
    }

    #[tokio::test]
    async fn consumed_code_cannot_be_reused() {
        let h = harness();
        let code = send_code(&h, "a@x.com").await;
        h.state.auth.verify_otp(verify("a@x.com", &code)).await.unwrap();

        let err = h.state.auth.verify_otp(verify("a@x.com", &code)).await.unwrap_err();
        assert!(err.is(ErrorCode::OtpInvalidOrExpired));
    }

    #[tokio::test]
    async fn five_wrong_codes_lock_the_entry() {
        let h = harness();
        let code = send_code(&h, "a@x.com").await;
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..5 {
            let err = h.state.auth.verify_otp(verify("a@x.com", wrong)).await.unwrap_err();
            assert!(err.is(ErrorCode::OtpInvalidOrExpired));
        }

        let err = h.state.auth.verify_otp(verify("a@x.com", &code)).await.unwrap_err();
        assert!(err.is(ErrorCode::OtpTooManyAttempts));
    }

    #[tokio::test]
    async fn otp_creates_user_named_after_local_part() {
        let h = harness();
        let code = send_code(&h, "Grace.Hopper@Navy.mil").await;
        let session = h
            .state
            .auth
            .verify_otp(verify("grace.hopper@navy.mil", &code))
            .await
            .unwrap();

        assert_eq!(session.user.name, "grace.hopper");
        assert_eq!(session.user.auth_method, AuthMethod::Otp);
        assert!(session.user.email_verified);
    }

    #[tokio::test]
    async fn otp_reuses_existing_account() {
        let h = harness();
        let signed_up = h.state.auth.signup(signup_input("ada@example.com")).await.unwrap();
        let code = send_code(&h, "ada@example.com").await;

        let session = h.state.auth.verify_otp(verify("ada@example.com", &code)).await.unwrap();
        assert_eq!(session.user.id, signed_up.user.id);
        assert_eq!(session.user.auth_method, AuthMethod::Password);
    }

    #[tokio::test]
    async fn send_otp_succeeds_when_delivery_fails() {
        let h = harness();
        h.notifier.fail_deliveries();

        let message = h
            .state
            .auth
            .send_otp(SendOtpInput { email: "a@x.com".into() })
            .await
            .unwrap();
        assert_eq!(message, OTP_SENT_MESSAGE);
    }

    #[tokio::test]
    async fn send_otp_returns_when_delivery_stalls() {
        let stores = Stores::in_memory();
        let auth = AuthService::new(
            stores.users.clone(),
            stores.otps.clone(),
            SessionIssuer::new("test-secret", 60),
            CredentialHasher::new(8, 1, 1).unwrap(),
            Arc::new(StalledNotifier),
            Arc::new(StubVerifier::default()),
            Arc::new(ManualClock::new(chrono::Utc::now())),
        )
        .unwrap()
        .with_delivery_timeout(Duration::from_millis(50));

        let sending = auth.send_otp(SendOtpInput { email: "a@x.com".into() });
        let message = tokio::time::timeout(Duration::from_secs(3), sending)
            .await
            .expect("send_otp kept waiting on the notifier")
            .unwrap();
        assert_eq!(message, OTP_SENT_MESSAGE);
    }

    #[tokio::test]
    async fn send_otp_rejects_invalid_email() {
        let h = harness();
        let err = h
            .state
            .auth
            .send_otp(SendOtpInput { email: "nope".into() })
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
    }

    fn google_identity(id: &str, email: &str, verified: bool) -> ExternalIdentity {
        ExternalIdentity {
            id: id.into(),
            email: email.into(),
            name: None,
            avatar: Some("https://img/avatar.png".into()),
            email_verified: verified,
        }
    }

    #[tokio::test]
    async fn google_login_creates_account() {
        let h = harness();
        h.identity.register("tok", google_identity("g-1", "Ada@Example.com", true));

        let session = h
            .state
            .auth
            .google_login(GoogleLoginInput { token: "tok".into() })
            .await
            .unwrap();
        assert_eq!(session.user.email, "ada@example.com");
        assert_eq!(session.user.name, "ada");
        assert_eq!(session.user.auth_method, AuthMethod::Google);
        assert_eq!(session.user.avatar.as_deref(), Some("https://img/avatar.png"));

        let again = h
            .state
            .auth
            .google_login(GoogleLoginInput { token: "tok".into() })
            .await
            .unwrap();
        assert_eq!(again.user.id, session.user.id);
    }

    #[tokio::test]
    async fn google_login_links_password_account() {
        let h = harness();
        let signed_up = h.state.auth.signup(signup_input("ada@example.com")).await.unwrap();
        h.identity.register("tok", google_identity("g-1", "ada@example.com", true));

        let session = h
            .state
            .auth
            .google_login(GoogleLoginInput { token: "tok".into() })
            .await
            .unwrap();
        assert_eq!(session.user.id, signed_up.user.id);
        assert_eq!(session.user.auth_method, AuthMethod::Password);
        assert_eq!(session.user.avatar.as_deref(), Some("https://img/avatar.png"));

        // Password still works after linking.
        h.state
            .auth
            .login(LoginInput { email: "ada@example.com".into(), password: "secret1".into() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn google_link_keeps_existing_avatar() {
        let h = harness();
        let signed_up = h.state.auth.signup(signup_input("ada@example.com")).await.unwrap();
        let mut user = h.stores.users.find_by_id(signed_up.user.id).await.unwrap().unwrap();
        user.avatar = Some("https://img/own.png".into());
        h.stores.users.save(&user).await.unwrap();
        h.identity.register("tok", google_identity("g-1", "ada@example.com", true));

        let session = h
            .state
            .auth
            .google_login(GoogleLoginInput { token: "tok".into() })
            .await
            .unwrap();
        assert_eq!(session.user.id, signed_up.user.id);
        assert_eq!(session.user.avatar.as_deref(), Some("https://img/own.png"));

        let linked = h.stores.users.find_by_google_id("g-1").await.unwrap().unwrap();
        assert_eq!(linked.id, signed_up.user.id);
    }

    #[tokio::test]
    async fn google_id_held_elsewhere_is_not_relinked() {
        let h = harness();
        h.identity.register("first", google_identity("g-1", "a@x.com", true));
        h.state
            .auth
            .google_login(GoogleLoginInput { token: "first".into() })
            .await
            .unwrap();

        h.state.auth.signup(signup_input("b@x.com")).await.unwrap();
        h.identity.register("moved", google_identity("g-1", "b@x.com", true));
        let err = h
            .state
            .auth
            .google_login(GoogleLoginInput { token: "moved".into() })
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::OAuthError));
    }

    #[tokio::test]
    async fn google_login_rejects_bad_or_unverified_tokens() {
        let h = harness();
        h.identity.register("unverified", google_identity("g-2", "b@x.com", false));

        for token in ["unknown", "unverified"] {
            let err = h
                .state
                .auth
                .google_login(GoogleLoginInput { token: token.into() })
                .await
                .unwrap_err();
            assert!(err.is(ErrorCode::OAuthError));
        }

        let err = h.state.auth.google_login(GoogleLoginInput::default()).await.unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
    }

    #[tokio::test]
    async fn current_user_missing_is_not_found() {
        let h = harness();
        let err = h.state.auth.current_user(Uuid::now_v7()).await.unwrap_err();
        assert!(err.is(ErrorCode::UserNotFound));
    }
}
