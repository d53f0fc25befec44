use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Epoch is not allowed to wrap")]
    WrappedEpoch,

    #[error("Too big length field (> 16_384) {0}")]
    TooBigLength(usize),

    #[error("Too big dtls sequence field (max 48 bits) {0}")]
    TooBigDtlsSeq(u64),

    #[error("Unsupported TLS version {0}, {1}")]
    UnsupportedTlsVersion(u8, u8),

    #[error("Crypto error: {0}")]
    CryptoError(String),
}
