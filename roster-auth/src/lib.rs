//! Roster Auth - session lifecycle and capability-based access control
//!
//! This crate owns the authenticated-identity lifecycle for the Roster
//! admin tools:
//!
//! - [`SessionStore`]: single source of truth for the current session,
//!   with write-through persistence and startup rehydration
//! - [`AuthClient`]: login/register against the identity endpoint,
//!   purely local logout
//! - [`Permission`] evaluation: pure checks against the current session,
//!   with `Admin` as the wildcard override
//! - access gates: inline visibility gating, handler wrapping, and
//!   navigation guarding
//!
//! ## Architecture
//!
//! The store is constructed once per process and passed explicitly to
//! every consumer. Gates and evaluators only read; the client is the only
//! writer besides startup rehydration.

pub mod client;
pub mod gates;
pub mod permissions;
pub mod session;
pub mod storage;

pub use client::{AuthClient, AuthError};
pub use gates::{guard_with_permission, require_login, when_permitted, Access, Redirect};
pub use permissions::Permission;
pub use session::{Session, SessionStore, User};
pub use storage::CredentialStorage;
