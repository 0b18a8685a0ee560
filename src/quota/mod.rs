//! Usage quota
//!
//! Signed-in users get a small credit balance that refills a day after it
//! runs out; guests get a single use per IP address.

mod gate;
mod ledger;

pub use gate::{AccessDecision, AccessGate};
pub use ledger::QuotaLedger;

/// Credits granted to a signed-in user
pub const AUTHENTICATED_CREDITS: i64 = 3;

/// Hours until an exhausted balance refills
pub const CREDIT_RESET_HOURS: i64 = 24;
