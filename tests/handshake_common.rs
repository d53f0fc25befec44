//! Shared helpers: minimal client/server roles driving the handshake
//! core the way concrete role machines would.
//!
//! The choreography is deliberately small: hello messages carry only the
//! handshake random, the finished message a fixed-size placeholder. The
//! premaster secret is pre-shared so no key-exchange collaborator is
//! needed.
//!
//! This file has no `#[test]` functions; Cargo compiles it as a no-op
//! binary. Import it from other test files via `mod handshake_common;`.

#![allow(unused)]

use std::collections::VecDeque;
use std::sync::Arc;

use dshake::message::{
    ChangeCipherSpec, CipherSuite, CompressionMethod, Fragment, HandshakeFragment, Random, Record,
};
use dshake::{Admitted, Config, Engine, Error, Flight, HandshakeKind, Handshaker, Session};

pub const PREMASTER: &[u8] = &[0x5A; 32];
pub const CLIENT_TIME: u32 = 0x5F37A94B;
pub const SERVER_TIME: u32 = 0x5F37A94C;

pub fn test_config(rng_seed: u64) -> Arc<Config> {
    Arc::new(Config::builder().rng_seed(rng_seed).build())
}

pub fn test_session() -> Session {
    Session::new(
        CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256,
        CompressionMethod::Null,
    )
}

fn hello_fragment(engine: &mut Engine, random: &Random) -> Fragment {
    let mut body = Vec::new();
    random.serialize(&mut body);
    Fragment::Handshake(HandshakeFragment::new(engine.next_send_seq(), body))
}

fn finished_fragment(engine: &mut Engine) -> Fragment {
    Fragment::Handshake(HandshakeFragment::new(engine.next_send_seq(), vec![0; 12]))
}

fn parse_random(body: &[u8]) -> Random {
    let (_, random) = Random::parse(body).expect("random in hello body");
    random
}

/// Role glue the test driver needs on top of `Handshaker`.
pub trait TestRole: Handshaker {
    fn admit(&mut self, record: Record) -> Admitted;
    fn take_queued(&mut self) -> Vec<Record>;
    fn session(&self) -> &Session;
    fn engine(&self) -> &Engine;
    fn is_established(&self) -> bool;
}

/// Push records through admission and processing, collecting response
/// flights. Queued records are replayed after every accepted message so
/// epoch transitions release them.
pub fn deliver_records(records: Vec<Record>, role: &mut impl TestRole) -> Vec<Flight> {
    let mut responses = Vec::new();
    let mut pending: VecDeque<Record> = records.into();

    while let Some(record) = pending.pop_front() {
        match role.admit(record) {
            Admitted::Accept(record) => {
                let flight = role.process_message(record).expect("process message");
                if !flight.is_empty() {
                    responses.push(flight);
                }
                for queued in role.take_queued() {
                    pending.push_back(queued);
                }
            }
            Admitted::Queued | Admitted::Discard => {}
        }
    }

    responses
}

pub fn deliver_flights(flights: Vec<Flight>, role: &mut impl TestRole) -> Vec<Flight> {
    let records: Vec<Record> = flights
        .iter()
        .flat_map(|f| f.records().iter().cloned())
        .collect();
    deliver_records(records, role)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClientState {
    Start,
    AwaitServerHello,
    AwaitChangeCipherSpec,
    AwaitFinished,
    Established,
}

pub struct TestClient {
    pub engine: Engine,
    pub session: Session,
    state: ClientState,
}

impl TestClient {
    pub fn new(config: Arc<Config>) -> Self {
        TestClient {
            engine: Engine::new(config, true, HandshakeKind::Full),
            session: test_session(),
            state: ClientState::Start,
        }
    }
}

impl Handshaker for TestClient {
    fn start_flight(&mut self) -> Result<Flight, Error> {
        assert_eq!(self.state, ClientState::Start);

        let random = self.engine.generate_random(CLIENT_TIME);
        self.engine.set_client_random(random);

        let hello = hello_fragment(&mut self.engine, &random);

        let mut flight = Flight::new();
        flight.push(self.engine.wrap(hello, &mut self.session));

        self.engine.set_last_flight(flight.clone());
        self.state = ClientState::AwaitServerHello;

        Ok(flight)
    }

    fn process_message(&mut self, record: Record) -> Result<Flight, Error> {
        match (self.state, record.fragment) {
            (ClientState::AwaitServerHello, Fragment::Handshake(hello)) => {
                self.engine.set_server_random(parse_random(&hello.body));
                self.engine.generate_keys(PREMASTER, &self.session)?;

                // CCS still goes out at the old epoch; everything after
                // it under the new write state.
                let mut flight = Flight::new();
                flight.push(
                    self.engine
                        .wrap(Fragment::ChangeCipherSpec(ChangeCipherSpec), &mut self.session),
                );
                self.engine.set_current_write_state(&mut self.session)?;

                let finished = finished_fragment(&mut self.engine);
                flight.push(self.engine.wrap(finished, &mut self.session));

                self.engine.set_last_flight(flight.clone());
                self.state = ClientState::AwaitChangeCipherSpec;

                Ok(flight)
            }
            (ClientState::AwaitChangeCipherSpec, Fragment::ChangeCipherSpec(_)) => {
                self.engine.set_current_read_state(&mut self.session)?;
                self.state = ClientState::AwaitFinished;
                Ok(Flight::new())
            }
            (ClientState::AwaitFinished, Fragment::Handshake(_)) => {
                self.state = ClientState::Established;
                Ok(Flight::new())
            }
            (state, fragment) => panic!("client got {:?} in state {:?}", fragment, state),
        }
    }
}

impl TestRole for TestClient {
    fn admit(&mut self, record: Record) -> Admitted {
        self.engine.admit(record, &self.session)
    }

    fn take_queued(&mut self) -> Vec<Record> {
        self.engine.take_queued()
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn engine(&self) -> &Engine {
        &self.engine
    }

    fn is_established(&self) -> bool {
        self.state == ClientState::Established
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServerState {
    AwaitClientHello,
    AwaitChangeCipherSpec,
    AwaitFinished,
    Established,
}

pub struct TestServer {
    pub engine: Engine,
    pub session: Session,
    state: ServerState,
}

impl TestServer {
    pub fn new(config: Arc<Config>) -> Self {
        TestServer {
            engine: Engine::new(config, false, HandshakeKind::Full),
            session: test_session(),
            state: ServerState::AwaitClientHello,
        }
    }
}

impl Handshaker for TestServer {
    fn start_flight(&mut self) -> Result<Flight, Error> {
        // The server waits for the first client flight.
        Ok(Flight::new())
    }

    fn process_message(&mut self, record: Record) -> Result<Flight, Error> {
        match (self.state, record.fragment) {
            (ServerState::AwaitClientHello, Fragment::Handshake(hello)) => {
                self.engine.set_client_random(parse_random(&hello.body));

                // Negotiation result: the server picks the suite the
                // session was configured to prefer.
                self.session
                    .set_cipher_suite(CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256);
                self.session.set_compression_method(CompressionMethod::Null);

                let random = self.engine.generate_random(SERVER_TIME);
                self.engine.set_server_random(random);
                self.engine.generate_keys(PREMASTER, &self.session)?;

                let mut flight = Flight::new();

                let server_hello = hello_fragment(&mut self.engine, &random);
                flight.push(self.engine.wrap(server_hello, &mut self.session));

                flight.push(
                    self.engine
                        .wrap(Fragment::ChangeCipherSpec(ChangeCipherSpec), &mut self.session),
                );
                self.engine.set_current_write_state(&mut self.session)?;

                let finished = finished_fragment(&mut self.engine);
                flight.push(self.engine.wrap(finished, &mut self.session));

                self.engine.set_last_flight(flight.clone());
                self.state = ServerState::AwaitChangeCipherSpec;

                Ok(flight)
            }
            (ServerState::AwaitChangeCipherSpec, Fragment::ChangeCipherSpec(_)) => {
                self.engine.set_current_read_state(&mut self.session)?;
                self.state = ServerState::AwaitFinished;
                Ok(Flight::new())
            }
            (ServerState::AwaitFinished, Fragment::Handshake(_)) => {
                self.state = ServerState::Established;
                Ok(Flight::new())
            }
            (state, fragment) => panic!("server got {:?} in state {:?}", fragment, state),
        }
    }
}

impl TestRole for TestServer {
    fn admit(&mut self, record: Record) -> Admitted {
        self.engine.admit(record, &self.session)
    }

    fn take_queued(&mut self) -> Vec<Record> {
        self.engine.take_queued()
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn engine(&self) -> &Engine {
        &self.engine
    }

    fn is_established(&self) -> bool {
        self.state == ServerState::Established
    }
}
