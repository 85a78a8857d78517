//! Data layer for user accounts: the persisted account record with its
//! validation rules and credential tokens, and the Postgres store behind it.

pub mod accounts;
pub mod config;
pub mod db;
