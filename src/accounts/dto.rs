use serde::Serialize;
use serde_json::{Map, Value};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::accounts::repo_types::Account;

const DATE_ONLY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Public projection of an account, safe to hand to any caller.
///
/// Carries the computed full name and age alongside the stored fields.
/// The password hash and the three credential tokens are structurally
/// absent, not merely skipped.
#[derive(Debug, Serialize)]
pub struct AccountProfile {
    pub id: Option<i64>,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub birth_date: Option<String>, // date-only ISO 8601
    pub age: Option<i32>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub roles: Vec<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub preferences: Option<Map<String, Value>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
}

impl Account {
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name(),
            phone_number: self.phone_number.clone(),
            birth_date: self
                .birth_date
                .and_then(|d| d.format(&DATE_ONLY).ok()),
            age: self.age(),
            profile_picture: self.profile_picture.clone(),
            bio: self.bio.clone(),
            is_active: self.is_active,
            is_verified: self.is_verified,
            roles: self.roles(),
            locale: self.locale.clone(),
            timezone: self.timezone.clone(),
            preferences: self.preferences.as_ref().map(|p| p.0.clone()),
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        }
    }
}
