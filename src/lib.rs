//! Sans-IO DTLS 1.2 handshake core.
//!
//! This crate implements the part of a DTLS handshake that survives an
//! unreliable transport: admitting and reordering handshake records by
//! epoch and sequence number, the TLS 1.2 key schedule, and the
//! construction of the per-direction cipher states that move a session
//! into its next epoch.
//!
//! It is deliberately not a full DTLS stack. Message encoding, sockets,
//! retransmission timers, certificates and bulk record protection are
//! collaborators; concrete client/server role machines implement
//! [`Handshaker`] on top of an [`Engine`] and a [`Session`].

#![forbid(unsafe_code)]
#![warn(clippy::all)]

#[macro_use]
extern crate log;

mod config;
pub use config::{Config, ConfigBuilder};

mod engine;
pub use engine::{Admitted, Engine, Flight, HandshakeKind, Handshaker};

mod error;
pub use error::Error;

mod session;
pub use session::{ConnectionState, Session};

pub mod crypto;
pub mod message;

pub mod rng;
