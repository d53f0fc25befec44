//! Wire-level message types shared by the handshake core.
//!
//! Concrete handshake message bodies (ClientHello, key exchange payloads
//! and so on) are produced and consumed by collaborators outside this
//! crate. The types here cover what the core itself needs: the record
//! layer, the fragment variants it dispatches on, handshake randoms and
//! the negotiated algorithm identifiers.

mod cipher_suite;
mod fragment;
mod random;
mod record;
mod util;

pub use cipher_suite::{CipherSuite, CompressionMethod, HashAlgorithm};
pub use fragment::{Alert, AlertLevel, ChangeCipherSpec, Fragment, HandshakeFragment};
pub use random::Random;
pub use record::{ContentType, DTLSRecord, ProtocolVersion, Record};
