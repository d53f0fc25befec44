use nom::number::complete::be_u8;
use nom::IResult;

use super::ContentType;

/// The payload of a [`Record`], dispatched on by the handshake core.
///
/// Handshake and application bodies are opaque bytes owned by the
/// collaborators that encode and decode them. The core only looks at the
/// variant and, for handshakes, the `message_seq` header field.
///
/// [`Record`]: super::Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Handshake(HandshakeFragment),
    ChangeCipherSpec(ChangeCipherSpec),
    Alert(Alert),
    ApplicationData(Vec<u8>),
}

impl Fragment {
    /// The record-layer content type for this fragment.
    pub fn content_type(&self) -> ContentType {
        match self {
            Fragment::Handshake(_) => ContentType::Handshake,
            Fragment::ChangeCipherSpec(_) => ContentType::ChangeCipherSpec,
            Fragment::Alert(_) => ContentType::Alert,
            Fragment::ApplicationData(_) => ContentType::ApplicationData,
        }
    }
}

/// A handshake message fragment.
///
/// `message_seq` is the in-order handshake sequence number used for
/// admission. The body, including the message type, is opaque here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeFragment {
    pub message_seq: u16,
    pub body: Vec<u8>,
}

impl HandshakeFragment {
    pub fn new(message_seq: u16, body: Vec<u8>) -> Self {
        HandshakeFragment { message_seq, body }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeCipherSpec;

impl ChangeCipherSpec {
    pub fn parse(data: &[u8]) -> Option<(usize, ChangeCipherSpec)> {
        if data.is_empty() || data[0] != 1 {
            return None;
        }

        Some((1, ChangeCipherSpec))
    }

    pub fn serialize(&self, data: &mut Vec<u8>) {
        data.push(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    /// The alert description code, interpreted by the role logic.
    pub description: u8,
}

impl Alert {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Alert> {
        let (input, level) = be_u8(input)?;
        let (input, description) = be_u8(input)?;

        Ok((
            input,
            Alert {
                level: AlertLevel::from_u8(level),
                description,
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        output.push(self.level.as_u8());
        output.push(self.description);
    }

    pub fn is_fatal(&self) -> bool {
        self.level == AlertLevel::Fatal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Fatal,
    Unknown(u8),
}

impl AlertLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => AlertLevel::Warning,
            2 => AlertLevel::Fatal,
            _ => AlertLevel::Unknown(value),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            AlertLevel::Warning => 1,
            AlertLevel::Fatal => 2,
            AlertLevel::Unknown(value) => *value,
        }
    }
}
