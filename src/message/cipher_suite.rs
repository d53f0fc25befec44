//! Negotiated algorithm identifiers and their key-material layout.

use nom::number::complete::{be_u16, be_u8};
use nom::IResult;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherSuite {
    ECDHE_ECDSA_AES256_GCM_SHA384,
    ECDHE_ECDSA_AES128_GCM_SHA256,
    Unknown(u16),
}

impl CipherSuite {
    /// Convert the 16-bit IANA value to a `CipherSuite`.
    pub fn from_u16(value: u16) -> Self {
        match value {
            // ECDHE with AES-GCM
            0xC02C => CipherSuite::ECDHE_ECDSA_AES256_GCM_SHA384,
            0xC02B => CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256,

            _ => CipherSuite::Unknown(value),
        }
    }

    /// Return the 16-bit IANA value for this cipher suite.
    pub fn as_u16(&self) -> u16 {
        match self {
            // ECDHE with AES-GCM
            CipherSuite::ECDHE_ECDSA_AES256_GCM_SHA384 => 0xC02C,
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256 => 0xC02B,

            CipherSuite::Unknown(value) => *value,
        }
    }

    /// Parse a `CipherSuite` from network byte order.
    pub fn parse(input: &[u8]) -> IResult<&[u8], CipherSuite> {
        let (input, value) = be_u16(input)?;
        Ok((input, CipherSuite::from_u16(value)))
    }

    /// The hash algorithm driving this suite's PRF.
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        match self {
            CipherSuite::ECDHE_ECDSA_AES256_GCM_SHA384 => HashAlgorithm::SHA384,
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256 => HashAlgorithm::SHA256,
            CipherSuite::Unknown(_) => HashAlgorithm::Unknown(0),
        }
    }

    /// Bulk cipher key length in bytes.
    pub fn key_length(&self) -> usize {
        match self {
            CipherSuite::ECDHE_ECDSA_AES256_GCM_SHA384 => 32,
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256 => 16,
            CipherSuite::Unknown(_) => 0,
        }
    }

    /// Implicit write IV length in bytes.
    ///
    /// GCM suites use a 4-byte implicit salt; the remaining 8 nonce bytes
    /// are explicit per record.
    pub fn iv_length(&self) -> usize {
        match self {
            CipherSuite::ECDHE_ECDSA_AES256_GCM_SHA384
            | CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256 => 4,
            CipherSuite::Unknown(_) => 0,
        }
    }

    /// MAC key length in bytes. Zero for AEAD suites.
    pub fn mac_key_length(&self) -> usize {
        match self {
            CipherSuite::ECDHE_ECDSA_AES256_GCM_SHA384
            | CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256 => 0,
            CipherSuite::Unknown(_) => 0,
        }
    }

    /// Total key block length: both directions of MAC key, cipher key and IV.
    pub fn key_material_length(&self) -> usize {
        2 * (self.mac_key_length() + self.key_length() + self.iv_length())
    }

    /// Returns true if this cipher suite is supported by this implementation.
    pub fn is_supported(&self) -> bool {
        Self::supported().contains(self)
    }

    /// Supported cipher suites in server preference order.
    pub const fn supported() -> &'static [CipherSuite; 2] {
        &[
            CipherSuite::ECDHE_ECDSA_AES256_GCM_SHA384,
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Null,
    Deflate,
    Unknown(u8),
}

impl CompressionMethod {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => CompressionMethod::Null,
            0x01 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            CompressionMethod::Null => 0x00,
            CompressionMethod::Deflate => 0x01,
            CompressionMethod::Unknown(value) => *value,
        }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], CompressionMethod> {
        let (input, value) = be_u8(input)?;
        Ok((input, CompressionMethod::from_u8(value)))
    }

    /// Returns true if this compression method is supported by this implementation.
    pub fn is_supported(&self) -> bool {
        matches!(self, CompressionMethod::Null)
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    SHA256,
    SHA384,
    Unknown(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cipher_suite_u16_roundtrip() {
        for suite in CipherSuite::supported() {
            assert_eq!(CipherSuite::from_u16(suite.as_u16()), *suite);
        }

        assert_eq!(CipherSuite::from_u16(0x1301), CipherSuite::Unknown(0x1301));
    }

    #[test]
    fn gcm_key_material_layout() {
        let suite = CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256;
        assert_eq!(suite.mac_key_length(), 0);
        assert_eq!(suite.key_length(), 16);
        assert_eq!(suite.iv_length(), 4);
        assert_eq!(suite.key_material_length(), 40);
        assert_eq!(suite.hash_algorithm(), HashAlgorithm::SHA256);

        let suite = CipherSuite::ECDHE_ECDSA_AES256_GCM_SHA384;
        assert_eq!(suite.key_material_length(), 72);
        assert_eq!(suite.hash_algorithm(), HashAlgorithm::SHA384);
    }

    #[test]
    fn only_null_compression_is_supported() {
        assert!(CompressionMethod::Null.is_supported());
        assert!(!CompressionMethod::Deflate.is_supported());
        assert!(!CompressionMethod::Unknown(0x40).is_supported());
    }
}
