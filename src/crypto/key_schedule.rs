use std::fmt;
use std::ops::Deref;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::prf::{calculate_master_secret, key_expansion, MASTER_SECRET_LEN};
use crate::message::{CipherSuite, CompressionMethod, HashAlgorithm, Random};
use crate::session::ConnectionState;

/// The PRF-derived master secret, seed for all subsequent key material.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret([u8; MASTER_SECRET_LEN]);

impl MasterSecret {
    /// Derive the master secret from the premaster secret and both
    /// handshake randoms (RFC 5246 Section 8.1).
    pub fn derive(
        premaster_secret: &[u8],
        client_random: &Random,
        server_random: &Random,
        hash: HashAlgorithm,
    ) -> Result<MasterSecret, String> {
        let mut expanded = calculate_master_secret(
            premaster_secret,
            &client_random.as_bytes(),
            &server_random.as_bytes(),
            hash,
        )?;

        let mut bytes = [0u8; MASTER_SECRET_LEN];
        bytes.copy_from_slice(&expanded);
        expanded.as_mut_slice().zeroize();

        Ok(MasterSecret(bytes))
    }
}

impl Deref for MasterSecret {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterSecret")
    }
}

/// The expanded key block, sliced into both directions of MAC key,
/// cipher key and IV (RFC 5246 Section 6.3).
///
/// Slice order is fixed: client-MAC, server-MAC, client-key, server-key,
/// client-IV, server-IV. Each side writes with its own slice and reads
/// with the peer's.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyBlock {
    client_write_mac_key: Vec<u8>,
    server_write_mac_key: Vec<u8>,
    client_write_key: Vec<u8>,
    server_write_key: Vec<u8>,
    client_write_iv: Vec<u8>,
    server_write_iv: Vec<u8>,
}

impl KeyBlock {
    /// Expand the master secret into a key block for the given suite.
    pub fn derive(
        master_secret: &MasterSecret,
        client_random: &Random,
        server_random: &Random,
        suite: CipherSuite,
    ) -> Result<KeyBlock, String> {
        if !suite.is_supported() {
            return Err(format!("Unsupported cipher suite: {:?}", suite));
        }

        let mut expanded = key_expansion(
            master_secret,
            &client_random.as_bytes(),
            &server_random.as_bytes(),
            suite.key_material_length(),
            suite.hash_algorithm(),
        )?;

        let mac_key_length = suite.mac_key_length();
        let key_length = suite.key_length();
        let iv_length = suite.iv_length();

        let mut at = 0;
        let mut next = |len: usize| {
            let slice = expanded[at..at + len].to_vec();
            at += len;
            slice
        };

        let key_block = KeyBlock {
            client_write_mac_key: next(mac_key_length),
            server_write_mac_key: next(mac_key_length),
            client_write_key: next(key_length),
            server_write_key: next(key_length),
            client_write_iv: next(iv_length),
            server_write_iv: next(iv_length),
        };

        expanded.as_mut_slice().zeroize();

        Ok(key_block)
    }

    /// Build the read-direction cipher state for the given role.
    ///
    /// Each side reads what the other side writes: a client reads with
    /// the server slice and vice versa.
    pub fn read_state(
        &self,
        cipher_suite: CipherSuite,
        compression_method: CompressionMethod,
        is_client: bool,
    ) -> ConnectionState {
        if is_client {
            ConnectionState::new(
                cipher_suite,
                compression_method,
                self.server_write_key.clone(),
                self.server_write_iv.clone(),
                self.server_write_mac_key.clone(),
            )
        } else {
            ConnectionState::new(
                cipher_suite,
                compression_method,
                self.client_write_key.clone(),
                self.client_write_iv.clone(),
                self.client_write_mac_key.clone(),
            )
        }
    }

    /// Build the write-direction cipher state for the given role.
    pub fn write_state(
        &self,
        cipher_suite: CipherSuite,
        compression_method: CompressionMethod,
        is_client: bool,
    ) -> ConnectionState {
        if is_client {
            ConnectionState::new(
                cipher_suite,
                compression_method,
                self.client_write_key.clone(),
                self.client_write_iv.clone(),
                self.client_write_mac_key.clone(),
            )
        } else {
            ConnectionState::new(
                cipher_suite,
                compression_method,
                self.server_write_key.clone(),
                self.server_write_iv.clone(),
                self.server_write_mac_key.clone(),
            )
        }
    }

    pub fn client_write_mac_key(&self) -> &[u8] {
        &self.client_write_mac_key
    }

    pub fn server_write_mac_key(&self) -> &[u8] {
        &self.server_write_mac_key
    }

    pub fn client_write_key(&self) -> &[u8] {
        &self.client_write_key
    }

    pub fn server_write_key(&self) -> &[u8] {
        &self.server_write_key
    }

    pub fn client_write_iv(&self) -> &[u8] {
        &self.client_write_iv
    }

    pub fn server_write_iv(&self) -> &[u8] {
        &self.server_write_iv
    }
}

// Debug shows nothing but the type name, never key material.
impl fmt::Debug for KeyBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyBlock")
    }
}
