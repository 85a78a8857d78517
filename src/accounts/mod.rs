mod dto;
mod error;
mod repo;
mod repo_types;
mod services;

pub use dto::AccountProfile;
pub use error::{StoreError, Violation};
pub use repo_types::{Account, AuthIdentity, BASE_ROLE, DEFAULT_LOCALE, DEFAULT_TIMEZONE};
pub use services::validate;
