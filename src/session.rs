//! Per-association session state: negotiated parameters, epoch and
//! sequence counters, and the active directional cipher states.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::message::{CipherSuite, CompressionMethod};
use crate::Error;

/// The cipher parameters active for one direction at one epoch.
///
/// Immutable once built. Exactly two instances are current at a time,
/// one per direction; an epoch transition replaces the slot, it never
/// mutates the state in place.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ConnectionState {
    #[zeroize(skip)]
    cipher_suite: CipherSuite,
    #[zeroize(skip)]
    compression_method: CompressionMethod,
    key: Vec<u8>,
    iv: Vec<u8>,
    mac_key: Vec<u8>,
}

impl ConnectionState {
    pub fn new(
        cipher_suite: CipherSuite,
        compression_method: CompressionMethod,
        key: Vec<u8>,
        iv: Vec<u8>,
        mac_key: Vec<u8>,
    ) -> Self {
        ConnectionState {
            cipher_suite,
            compression_method,
            key,
            iv,
            mac_key,
        }
    }

    pub fn cipher_suite(&self) -> CipherSuite {
        self.cipher_suite
    }

    pub fn compression_method(&self) -> CompressionMethod {
        self.compression_method
    }

    /// Bulk cipher key, handed to the record-protection collaborator.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Implicit write IV (nonce salt for AEAD suites).
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// MAC key. Empty for AEAD suites.
    pub fn mac_key(&self) -> &[u8] {
        &self.mac_key
    }
}

// Debug shows metadata only, never key material.
impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionState")
            .field("cipher_suite", &self.cipher_suite)
            .field("compression_method", &self.compression_method)
            .finish_non_exhaustive()
    }
}

/// State of one secure peer association.
///
/// Outlives any single handshake: a renegotiation mutates the epochs and
/// states of the same session. Owned by the association manager outside
/// the handshake core.
#[derive(Debug)]
pub struct Session {
    cipher_suite: CipherSuite,
    compression_method: CompressionMethod,

    read_epoch: u16,
    write_epoch: u16,

    /// Record sequence numbers for the current epochs. Reset to 0 on
    /// every epoch change.
    read_sequence_number: u64,
    write_sequence_number: u64,

    /// Active cipher states. `None` means epoch-0 plaintext.
    read_state: Option<ConnectionState>,
    write_state: Option<ConnectionState>,

    /// States of the previous epoch, kept until the peer is known to
    /// have moved on, for in-flight retransmissions.
    previous_read_state: Option<ConnectionState>,
    previous_write_state: Option<ConnectionState>,
}

impl Session {
    pub fn new(cipher_suite: CipherSuite, compression_method: CompressionMethod) -> Self {
        Session {
            cipher_suite,
            compression_method,
            read_epoch: 0,
            write_epoch: 0,
            read_sequence_number: 0,
            write_sequence_number: 0,
            read_state: None,
            write_state: None,
            previous_read_state: None,
            previous_write_state: None,
        }
    }

    pub fn cipher_suite(&self) -> CipherSuite {
        self.cipher_suite
    }

    /// Update the negotiated cipher suite. Set by the hello exchange.
    pub fn set_cipher_suite(&mut self, cipher_suite: CipherSuite) {
        self.cipher_suite = cipher_suite;
    }

    pub fn compression_method(&self) -> CompressionMethod {
        self.compression_method
    }

    pub fn set_compression_method(&mut self, compression_method: CompressionMethod) {
        self.compression_method = compression_method;
    }

    pub fn read_epoch(&self) -> u16 {
        self.read_epoch
    }

    pub fn write_epoch(&self) -> u16 {
        self.write_epoch
    }

    pub fn read_sequence_number(&self) -> u64 {
        self.read_sequence_number
    }

    pub fn write_sequence_number(&self) -> u64 {
        self.write_sequence_number
    }

    /// Note that a record was consumed at the current read epoch.
    pub fn bump_read_sequence(&mut self, sequence_number: u64) {
        if sequence_number >= self.read_sequence_number {
            self.read_sequence_number = sequence_number + 1;
        }
    }

    /// Claim the next outgoing record sequence number.
    pub(crate) fn next_write_sequence(&mut self) -> u64 {
        let sequence_number = self.write_sequence_number;
        self.write_sequence_number += 1;
        sequence_number
    }

    pub fn read_state(&self) -> Option<&ConnectionState> {
        self.read_state.as_ref()
    }

    pub fn write_state(&self) -> Option<&ConnectionState> {
        self.write_state.as_ref()
    }

    /// The read state of the previous epoch, if any.
    pub fn previous_read_state(&self) -> Option<&ConnectionState> {
        self.previous_read_state.as_ref()
    }

    /// The write state of the previous epoch, if any.
    pub fn previous_write_state(&self) -> Option<&ConnectionState> {
        self.previous_write_state.as_ref()
    }

    /// Install a new read state, advancing the read epoch and resetting
    /// the read sequence counter.
    ///
    /// The displaced state is retained as the previous-epoch state so
    /// retransmissions from the old epoch can still be decoded.
    pub fn set_read_state(&mut self, state: ConnectionState) -> Result<(), Error> {
        self.read_epoch = self.read_epoch.checked_add(1).ok_or(Error::WrappedEpoch)?;
        self.read_sequence_number = 0;
        self.previous_read_state = self.read_state.replace(state);
        Ok(())
    }

    /// Install a new write state, advancing the write epoch and
    /// resetting the write sequence counter.
    pub fn set_write_state(&mut self, state: ConnectionState) -> Result<(), Error> {
        self.write_epoch = self.write_epoch.checked_add(1).ok_or(Error::WrappedEpoch)?;
        self.write_sequence_number = 0;
        self.previous_write_state = self.write_state.replace(state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> ConnectionState {
        ConnectionState::new(
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256,
            CompressionMethod::Null,
            vec![0x11; 16],
            vec![0x22; 4],
            vec![],
        )
    }

    #[test]
    fn new_session_is_plaintext_epoch_0() {
        let session = Session::new(
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256,
            CompressionMethod::Null,
        );

        assert_eq!(session.read_epoch(), 0);
        assert_eq!(session.write_epoch(), 0);
        assert!(session.read_state().is_none());
        assert!(session.write_state().is_none());
    }

    #[test]
    fn epoch_transition_resets_sequence_numbers() {
        let mut session = Session::new(
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256,
            CompressionMethod::Null,
        );

        for _ in 0..5 {
            session.next_write_sequence();
        }
        session.bump_read_sequence(7);
        assert_eq!(session.write_sequence_number(), 5);
        assert_eq!(session.read_sequence_number(), 8);

        session.set_write_state(test_state()).unwrap();
        session.set_read_state(test_state()).unwrap();

        assert_eq!(session.write_epoch(), 1);
        assert_eq!(session.read_epoch(), 1);
        assert_eq!(session.write_sequence_number(), 0);
        assert_eq!(session.read_sequence_number(), 0);
    }

    #[test]
    fn epoch_transition_retains_previous_state() {
        let mut session = Session::new(
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256,
            CompressionMethod::Null,
        );

        session.set_read_state(test_state()).unwrap();
        assert!(session.previous_read_state().is_none());

        let second = ConnectionState::new(
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256,
            CompressionMethod::Null,
            vec![0x33; 16],
            vec![0x44; 4],
            vec![],
        );
        session.set_read_state(second).unwrap();

        assert_eq!(session.read_epoch(), 2);
        let previous = session.previous_read_state().unwrap();
        assert_eq!(previous.key(), &[0x11; 16]);
        assert_eq!(session.read_state().unwrap().key(), &[0x33; 16]);

        // The write direction keeps its own previous state.
        session.set_write_state(test_state()).unwrap();
        assert!(session.previous_write_state().is_none());
        session.set_write_state(test_state()).unwrap();
        assert!(session.previous_write_state().is_some());
    }

    #[test]
    fn debug_does_not_leak_key_material() {
        let state = test_state();
        let output = format!("{:?}", state);

        // Metadata only, elided fields for the key material.
        assert!(output.contains("cipher_suite"));
        assert!(output.ends_with(".. }"));
        assert!(!output.contains("17")); // 0x11 in decimal
    }
}
