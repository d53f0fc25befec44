//! The shared handshake substrate: record admission and reordering,
//! outgoing sequence assignment, flight bookkeeping, and the key
//! schedule hookup that moves a session into its next epoch.
//!
//! Concrete role state machines (client or server, full handshake or
//! resumption) implement [`Handshaker`] on top of an [`Engine`]. The
//! engine owns the counters and queues so the monotonicity invariants
//! are enforced in one place; role logic never touches them directly.

use std::mem;
use std::sync::Arc;

use crate::config::Config;
use crate::crypto::{KeyBlock, MasterSecret};
use crate::message::{Fragment, Random, Record};
use crate::rng::SeededRng;
use crate::session::Session;
use crate::Error;

/// An ordered batch of records sent together during one handshake
/// round, retransmitted as a unit on an external trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flight {
    records: Vec<Record>,
}

impl Flight {
    pub fn new() -> Self {
        Flight {
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Outcome of record admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admitted {
    /// The record is next in line; process it now.
    Accept(Record),
    /// Stale epoch, out-of-order handshake message, or content the
    /// handshake does not consume. Dropped without error; a lossy
    /// transport makes these routine.
    Discard,
    /// The record belongs to an epoch we have not reached. Held in the
    /// engine until the read epoch advances, then re-admitted.
    Queued,
}

/// Which handshake variant a role implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeKind {
    /// Full handshake with key exchange.
    Full,
    /// Abbreviated handshake resuming an earlier session.
    Resumption,
}

/// Role capability interface.
///
/// Implemented by each concrete handshake role (client or server, full
/// or resuming). The engine supplies admission, sequencing and key
/// installation; the role supplies the message choreography.
pub trait Handshaker {
    /// Produce the flight that initiates the handshake for this role.
    /// Called exactly once at handshake start.
    fn start_flight(&mut self) -> Result<Flight, Error>;

    /// Consume one record already accepted by [`Engine::admit`] and
    /// produce the response flight, possibly empty.
    fn process_message(&mut self, record: Record) -> Result<Flight, Error>;
}

/// Shared per-handshake state.
///
/// Created when a handshake begins (fresh session or renegotiation) and
/// discarded once the session's read/write states are finalized for the
/// new epoch.
pub struct Engine {
    config: Arc<Config>,

    /// Seedable random number generator for deterministic testing
    rng: SeededRng,

    /// Whether this engine is for a client (true) or server (false)
    is_client: bool,

    kind: HandshakeKind,

    /// The message_seq for the next outgoing handshake message.
    sequence_number: u16,

    /// The next expected incoming handshake message_seq.
    next_receive_seq: u16,

    client_random: Option<Random>,
    server_random: Option<Random>,

    /// Records from a future epoch, re-admitted after the next epoch
    /// transition. No ordering is kept; re-admission sorts it out.
    queued: Vec<Record>,

    /// The last flight sent during this handshake. Only resent when an
    /// external trigger (timeout, peer retransmission) asks for it.
    last_flight: Option<Flight>,

    master_secret: Option<MasterSecret>,
    key_block: Option<KeyBlock>,
}

impl Engine {
    pub fn new(config: Arc<Config>, is_client: bool, kind: HandshakeKind) -> Self {
        let rng = SeededRng::new(config.rng_seed());

        Self {
            config,
            rng,
            is_client,
            kind,
            sequence_number: 0,
            next_receive_seq: 0,
            client_random: None,
            server_random: None,
            queued: Vec::new(),
            last_flight: None,
            master_secret: None,
            key_block: None,
        }
    }

    pub fn is_client(&self) -> bool {
        self.is_client
    }

    pub fn kind(&self) -> HandshakeKind {
        self.kind
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate a fresh handshake random for this side.
    pub fn generate_random(&mut self, gmt_unix_time: u32) -> Random {
        Random::new(gmt_unix_time, &mut self.rng)
    }

    pub fn client_random(&self) -> Option<&Random> {
        self.client_random.as_ref()
    }

    pub fn set_client_random(&mut self, random: Random) {
        self.client_random = Some(random);
    }

    pub fn server_random(&self) -> Option<&Random> {
        self.server_random.as_ref()
    }

    pub fn set_server_random(&mut self, random: Random) {
        self.server_random = Some(random);
    }

    /// Decide whether a record is next in line for the handshake.
    ///
    /// Alerts and ChangeCipherSpec at the current read epoch are always
    /// accepted: an alert can abort at any point and CCS moves the epoch
    /// regardless of handshake ordering. Handshake messages are accepted
    /// strictly in `message_seq` order; this is the only place the
    /// expected sequence advances. Anything from an older epoch is
    /// superseded and dropped, anything from a newer epoch is queued
    /// until [`Engine::take_queued`] replays it.
    pub fn admit(&mut self, record: Record, session: &Session) -> Admitted {
        let read_epoch = session.read_epoch();

        if record.epoch < read_epoch {
            debug!(
                "Discard record from older epoch {} (current {})",
                record.epoch, read_epoch
            );
            return Admitted::Discard;
        }

        if record.epoch > read_epoch {
            if self.queued.len() >= self.config.max_queued_records() {
                warn!(
                    "Future-epoch queue full (max {}), discarding record",
                    self.config.max_queued_records()
                );
                return Admitted::Discard;
            }

            trace!(
                "Queue record for future epoch {} (current {})",
                record.epoch,
                read_epoch
            );
            self.queued.push(record);
            return Admitted::Queued;
        }

        match &record.fragment {
            // Alerts must be processed immediately
            Fragment::Alert(_) => Admitted::Accept(record),
            // CCS must be processed immediately
            Fragment::ChangeCipherSpec(_) => Admitted::Accept(record),
            Fragment::Handshake(handshake) => {
                if handshake.message_seq == self.next_receive_seq {
                    self.next_receive_seq += 1;
                    Admitted::Accept(record)
                } else {
                    debug!(
                        "Discard handshake with message_seq {} (expected {})",
                        handshake.message_seq, self.next_receive_seq
                    );
                    Admitted::Discard
                }
            }
            Fragment::ApplicationData(_) => Admitted::Discard,
        }
    }

    /// The next expected incoming handshake message_seq.
    pub fn next_receive_seq(&self) -> u16 {
        self.next_receive_seq
    }

    /// Drain the future-epoch queue for re-admission.
    ///
    /// Call after every epoch transition and feed each record back into
    /// [`Engine::admit`]. Records of a flight may come back in any
    /// order; admission handles that.
    pub fn take_queued(&mut self) -> Vec<Record> {
        mem::take(&mut self.queued)
    }

    /// Number of records currently queued for a future epoch.
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Wrap a fragment into a record at the session's current write
    /// epoch, claiming the next record sequence number.
    pub fn wrap(&self, fragment: Fragment, session: &mut Session) -> Record {
        let epoch = session.write_epoch();
        let sequence_number = session.next_write_sequence();

        trace!(
            "Wrap {:?} record {}:{}",
            fragment.content_type(),
            epoch,
            sequence_number
        );

        Record::new(epoch, sequence_number, fragment)
    }

    /// Claim the next outgoing handshake message_seq.
    ///
    /// Strictly increasing from 0. A retransmitted flight reuses the
    /// numbers it was built with; it must not come back here.
    pub fn next_send_seq(&mut self) -> u16 {
        let seq = self.sequence_number;
        self.sequence_number += 1;
        seq
    }

    /// Remember the flight most recently sent, for an external
    /// retransmission trigger to resend as-is.
    pub fn set_last_flight(&mut self, flight: Flight) {
        self.last_flight = Some(flight);
    }

    pub fn last_flight(&self) -> Option<&Flight> {
        self.last_flight.as_ref()
    }

    /// Run the key schedule: derive the master secret and key block
    /// from the premaster secret and the recorded randoms.
    ///
    /// Fatal on failure; the same inputs can never succeed on retry.
    pub fn generate_keys(&mut self, premaster_secret: &[u8], session: &Session) -> Result<(), Error> {
        let client_random = self
            .client_random
            .ok_or_else(|| Error::CryptoError("Client random not set".to_string()))?;
        let server_random = self
            .server_random
            .ok_or_else(|| Error::CryptoError("Server random not set".to_string()))?;

        if client_random == server_random {
            return Err(Error::CryptoError(
                "Client and server randoms coincide".to_string(),
            ));
        }

        let suite = session.cipher_suite();
        let hash = suite.hash_algorithm();

        let master_secret =
            MasterSecret::derive(premaster_secret, &client_random, &server_random, hash)
                .map_err(Error::CryptoError)?;
        let key_block = KeyBlock::derive(&master_secret, &client_random, &server_random, suite)
            .map_err(Error::CryptoError)?;

        debug!("Derived key block for {:?}", suite);

        self.master_secret = Some(master_secret);
        self.key_block = Some(key_block);

        Ok(())
    }

    /// The negotiated master secret, for session resumption or key
    /// export. Not re-derivable once the premaster secret is gone.
    pub fn master_secret(&self) -> Option<&MasterSecret> {
        self.master_secret.as_ref()
    }

    pub fn key_block(&self) -> Option<&KeyBlock> {
        self.key_block.as_ref()
    }

    /// Install the read state for the derived key block, moving the
    /// session into the next read epoch.
    pub fn set_current_read_state(&self, session: &mut Session) -> Result<(), Error> {
        let key_block = self
            .key_block
            .as_ref()
            .ok_or_else(|| Error::CryptoError("No key block derived".to_string()))?;

        let state = key_block.read_state(
            session.cipher_suite(),
            session.compression_method(),
            self.is_client,
        );

        session.set_read_state(state)
    }

    /// Install the write state for the derived key block, moving the
    /// session into the next write epoch.
    pub fn set_current_write_state(&self, session: &mut Session) -> Result<(), Error> {
        let key_block = self
            .key_block
            .as_ref()
            .ok_or_else(|| Error::CryptoError("No key block derived".to_string()))?;

        let state = key_block.write_state(
            session.cipher_suite(),
            session.compression_method(),
            self.is_client,
        );

        session.set_write_state(state)
    }

    /// Restart the handshake for a renegotiation: counters back to 0,
    /// queue, flight and key material gone.
    pub fn restart(&mut self) {
        debug!("Restart handshake");

        self.sequence_number = 0;
        self.next_receive_seq = 0;
        self.abort();
    }

    /// Abandon the in-progress handshake.
    ///
    /// Drops the last flight, all queued records and any partially
    /// derived key material. Nothing is installed into the session.
    pub fn abort(&mut self) {
        self.queued.clear();
        self.last_flight = None;
        self.master_secret = None;
        self.key_block = None;
        self.client_random = None;
        self.server_random = None;
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("is_client", &self.is_client)
            .field("kind", &self.kind)
            .field("sequence_number", &self.sequence_number)
            .field("next_receive_seq", &self.next_receive_seq)
            .field("queued", &self.queued.len())
            .field("has_key_block", &self.key_block.is_some())
            .finish()
    }
}
