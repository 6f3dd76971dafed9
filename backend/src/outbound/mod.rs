//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories used when no database is configured
//! - **token**: HS256 bearer credentials
//! - **password**: Argon2id password hashing
//! - **mail**: HTTP mail relay and a log-only fallback
//! - **blob**: local directory image store
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod blob;
pub mod mail;
pub mod memory;
pub mod password;
pub mod persistence;
pub mod token;
