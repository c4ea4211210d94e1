//! Business onboarding: a multi-step wizard engine and the wellness
//! business onboarding flow built on it.

pub mod business;
pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod store;
pub mod wizard;
