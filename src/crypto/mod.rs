//! Key schedule and cipher-state construction.
//!
//! Everything here is deterministic: two peers deriving from identical
//! inputs must produce byte-identical key material or they cannot
//! communicate. Failures are hard errors that abort the handshake, never
//! retried, since retrying with the same inputs cannot succeed.

mod encryption;
mod key_schedule;
mod prf;

pub use encryption::{AesGcm, Cipher};
pub use key_schedule::{KeyBlock, MasterSecret};
pub use prf::{calculate_master_secret, key_expansion, prf_tls12, MASTER_SECRET_LEN};
