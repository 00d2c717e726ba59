//! Session-authentication core: accounts, cookie-backed sessions, expiry.
//!
//! Provides:
//! - Account signup with bcrypt password hashing (per-hash salt and cost
//!   embedded in the encoded string)
//! - Opaque session identifiers (UUID v4) mapped to an identity snapshot,
//!   persisted in SQLite with an absolute expiry
//! - Login/logout orchestration and per-request verification
//!
//! ## Design Decisions
//! - Sessions are opaque random ids with server-side lookup; no JWT. The
//!   cookie holds only the sid, never the identity payload.
//! - Expiry is lazy: reads filter on `expire > now`, no background reaper.
//! - "Absent" is a normal value (`Ok(None)`) at the store layer; errors are
//!   reserved for real faults such as storage being unavailable.

pub mod error;
pub mod password;
pub mod service;
pub mod store;

pub use error::{AuthError, AuthResult};
pub use service::{AuthService, AuthStatus, DEFAULT_ROLE, DEFAULT_SESSION_TTL_SECS};
pub use store::{Account, AuthStore, Identity};
