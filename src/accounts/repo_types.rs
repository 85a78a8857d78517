use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use time::{Date, Duration, OffsetDateTime};

/// Every account carries this role even when the stored set omits it.
pub const BASE_ROLE: &str = "ROLE_USER";
pub const DEFAULT_LOCALE: &str = "fr";
pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";

const TOKEN_BYTES: usize = 32;
const API_TOKEN_TTL: Duration = Duration::days(30);
const REFRESH_TOKEN_TTL: Duration = Duration::days(180);
const RESET_PASSWORD_TOKEN_TTL: Duration = Duration::hours(1);

/// Account record in the database.
///
/// Credentials and token strings are never serialized; callers that need
/// an outward representation go through [`Account::profile`].
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: Option<i64>, // assigned by the store on first save
    pub email: String,
    pub username: String,
    pub roles: Json<Vec<String>>,
    #[sqlx(rename = "password")]
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub birth_date: Option<Date>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub api_token_expires_at: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub refresh_token_expires_at: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    pub reset_password_token_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub preferences: Option<Json<Map<String, Value>>>,
}

impl Account {
    pub fn new(email: &str, username: &str, password_hash: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: None,
            email: email.to_string(),
            username: username.to_string(),
            roles: Json(vec![BASE_ROLE.to_string()]),
            password_hash: password_hash.to_string(),
            first_name: None,
            last_name: None,
            phone_number: None,
            birth_date: None,
            profile_picture: None,
            bio: None,
            is_active: true,
            is_verified: false,
            api_token: None,
            api_token_expires_at: None,
            refresh_token: None,
            refresh_token_expires_at: None,
            reset_password_token: None,
            reset_password_token_expires_at: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
            locale: Some(DEFAULT_LOCALE.to_string()),
            timezone: Some(DEFAULT_TIMEZONE.to_string()),
            preferences: Some(Json(Map::new())),
        }
    }

    /// Effective role set: stored roles plus the base role, deduplicated.
    pub fn roles(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.roles.0.len() + 1);
        for role in &self.roles.0 {
            if !out.contains(role) {
                out.push(role.clone());
            }
        }
        if !out.iter().any(|r| r == BASE_ROLE) {
            out.push(BASE_ROLE.to_string());
        }
        out
    }

    /// "first last" trimmed; falls back to the username when both are empty.
    pub fn full_name(&self) -> String {
        let joined = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            self.username.clone()
        } else {
            trimmed.to_string()
        }
    }

    /// Whole years since the birth date, or None when it is unset.
    pub fn age(&self) -> Option<i32> {
        self.age_on(OffsetDateTime::now_utc().date())
    }

    pub(crate) fn age_on(&self, today: Date) -> Option<i32> {
        let birth = self.birth_date?;
        let mut years = today.year() - birth.year();
        if (today.month() as u8, today.day()) < (birth.month() as u8, birth.day()) {
            years -= 1;
        }
        Some(years.max(0))
    }

    pub fn is_api_token_valid(&self) -> bool {
        token_valid(&self.api_token, self.api_token_expires_at)
    }

    pub fn is_refresh_token_valid(&self) -> bool {
        token_valid(&self.refresh_token, self.refresh_token_expires_at)
    }

    pub fn is_reset_password_token_valid(&self) -> bool {
        token_valid(&self.reset_password_token, self.reset_password_token_expires_at)
    }

    /// Issue a new API token, replacing the previous pair.
    pub fn generate_api_token(&mut self) {
        self.api_token = Some(random_token());
        self.api_token_expires_at = Some(OffsetDateTime::now_utc() + API_TOKEN_TTL);
    }

    pub fn generate_refresh_token(&mut self) {
        self.refresh_token = Some(random_token());
        self.refresh_token_expires_at = Some(OffsetDateTime::now_utc() + REFRESH_TOKEN_TTL);
    }

    pub fn generate_reset_password_token(&mut self) {
        self.reset_password_token = Some(random_token());
        self.reset_password_token_expires_at =
            Some(OffsetDateTime::now_utc() + RESET_PASSWORD_TOKEN_TTL);
    }

    pub fn preference(&self, key: &str) -> Option<&Value> {
        self.preferences.as_ref().and_then(|p| p.0.get(key))
    }

    pub fn set_preference(&mut self, key: &str, value: Value) {
        self.preferences
            .get_or_insert_with(|| Json(Map::new()))
            .0
            .insert(key.to_string(), value);
    }

    /// Refreshed by the save path on every persisted write.
    pub fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }
}

/// Valid iff the token is present, non-empty, and its expiry is strictly
/// in the future at call time.
fn token_valid(token: &Option<String>, expires_at: Option<OffsetDateTime>) -> bool {
    let has_token = token.as_deref().is_some_and(|t| !t.is_empty());
    has_token && expires_at.is_some_and(|e| e > OffsetDateTime::now_utc())
}

fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Narrow identity capability for authentication code: a stable login
/// identifier and the opaque credential hash, nothing else.
pub trait AuthIdentity {
    fn identifier(&self) -> &str;
    fn credential_hash(&self) -> &str;
}

impl AuthIdentity for Account {
    fn identifier(&self) -> &str {
        &self.email
    }

    fn credential_hash(&self) -> &str {
        &self.password_hash
    }
}
