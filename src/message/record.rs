use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u8};
use nom::IResult;

use super::util::be_u48;
use super::Fragment;
use crate::Error;

/// Largest fragment the record layer will carry (RFC 5246 6.2.1).
const MAX_FRAGMENT_LEN: usize = 16_384;

/// Largest value representable in the 48-bit sequence number field.
const MAX_SEQUENCE_NUMBER: u64 = (1 << 48) - 1;

/// A record as it appears on the wire, with the fragment still opaque.
///
/// This is the unit handed to the transport collaborator for
/// bulk-protection and datagram framing. The in-memory counterpart used
/// by the handshake core is [`Record`].
#[derive(Debug, PartialEq, Eq)]
pub struct DTLSRecord<'a> {
    pub content_type: ContentType,
    pub version: ProtocolVersion,
    pub epoch: u16,
    pub sequence_number: u64,
    pub length: u16,
    pub fragment: &'a [u8],
}

impl<'a> DTLSRecord<'a> {
    pub fn parse(input: &'a [u8]) -> IResult<&'a [u8], DTLSRecord<'a>> {
        let (input, content_type) = ContentType::parse(input)?;
        let (input, version) = ProtocolVersion::parse(input)?;
        let (input, epoch) = be_u16(input)?;
        let (input, sequence_number) = be_u48(input)?;
        let (input, length) = be_u16(input)?;
        let (input, fragment) = take(length as usize)(input)?;

        Ok((
            input,
            DTLSRecord {
                content_type,
                version,
                epoch,
                sequence_number,
                length,
                fragment,
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) -> Result<(), Error> {
        if self.fragment.len() > MAX_FRAGMENT_LEN {
            return Err(Error::TooBigLength(self.fragment.len()));
        }
        if self.sequence_number > MAX_SEQUENCE_NUMBER {
            return Err(Error::TooBigDtlsSeq(self.sequence_number));
        }
        if let ProtocolVersion::Unknown(v) = self.version {
            let [major, minor] = v.to_be_bytes();
            return Err(Error::UnsupportedTlsVersion(major, minor));
        }

        output.push(self.content_type.as_u8());
        output.extend_from_slice(&self.version.as_u16().to_be_bytes());
        output.extend_from_slice(&self.epoch.to_be_bytes());
        output.extend_from_slice(&self.sequence_number.to_be_bytes()[2..]);
        output.extend_from_slice(&self.length.to_be_bytes());
        output.extend_from_slice(self.fragment);

        Ok(())
    }
}

/// The record the handshake core operates on.
///
/// Created once, then either consumed by the handshake, held in the
/// future-epoch queue, or dropped. The fragment body stays opaque to the
/// core; only the variant and the handshake `message_seq` are inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub content_type: ContentType,
    pub epoch: u16,
    pub sequence_number: u64,
    pub fragment: Fragment,
}

impl Record {
    /// Create a record, deriving the content type from the fragment variant.
    pub fn new(epoch: u16, sequence_number: u64, fragment: Fragment) -> Self {
        Record {
            content_type: fragment.content_type(),
            epoch,
            sequence_number,
            fragment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    ChangeCipherSpec,
    Alert,
    Handshake,
    ApplicationData,
    Unknown(u8),
}

impl ContentType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            20 => ContentType::ChangeCipherSpec,
            21 => ContentType::Alert,
            22 => ContentType::Handshake,
            23 => ContentType::ApplicationData,
            _ => ContentType::Unknown(value),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            ContentType::ChangeCipherSpec => 20,
            ContentType::Alert => 21,
            ContentType::Handshake => 22,
            ContentType::ApplicationData => 23,
            ContentType::Unknown(value) => *value,
        }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], ContentType> {
        let (input, byte) = be_u8(input)?;
        Ok((input, Self::from_u8(byte)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    DTLS1_0,
    DTLS1_2,
    Unknown(u16),
}

impl ProtocolVersion {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0xFEFF => ProtocolVersion::DTLS1_0,
            0xFEFD => ProtocolVersion::DTLS1_2,
            _ => ProtocolVersion::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            ProtocolVersion::DTLS1_0 => 0xFEFF,
            ProtocolVersion::DTLS1_2 => 0xFEFD,
            ProtocolVersion::Unknown(value) => *value,
        }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], ProtocolVersion> {
        let (input, value) = be_u16(input)?;
        Ok((input, Self::from_u16(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &[u8] = &[
        0x16, // ContentType::Handshake
        0xFE, 0xFD, // ProtocolVersion::DTLS1_2
        0x00, 0x01, // epoch
        0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // sequence_number
        0x00, 0x10, // length
        // fragment
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
        0x10,
    ];

    #[test]
    fn roundtrip() {
        let record = DTLSRecord {
            content_type: ContentType::Handshake,
            version: ProtocolVersion::DTLS1_2,
            epoch: 1,
            sequence_number: 1,
            length: 16,
            fragment: &RECORD[13..],
        };

        // Serialize and compare to RECORD
        let mut serialized = Vec::new();
        record.serialize(&mut serialized).unwrap();
        assert_eq!(serialized, RECORD);

        // Parse and compare with original
        let (rest, parsed) = DTLSRecord::parse(&serialized).unwrap();
        assert_eq!(parsed, record);

        assert!(rest.is_empty());
    }

    #[test]
    fn serialize_rejects_out_of_range_sequence() {
        let record = DTLSRecord {
            content_type: ContentType::ApplicationData,
            version: ProtocolVersion::DTLS1_2,
            epoch: 1,
            sequence_number: 1 << 48,
            length: 0,
            fragment: &[],
        };

        let mut out = Vec::new();
        assert_eq!(
            record.serialize(&mut out),
            Err(Error::TooBigDtlsSeq(1 << 48))
        );
    }

    #[test]
    fn serialize_rejects_unknown_version() {
        let record = DTLSRecord {
            content_type: ContentType::Handshake,
            version: ProtocolVersion::Unknown(0x0303),
            epoch: 0,
            sequence_number: 0,
            length: 0,
            fragment: &[],
        };

        let mut out = Vec::new();
        assert_eq!(
            record.serialize(&mut out),
            Err(Error::UnsupportedTlsVersion(0x03, 0x03))
        );
    }
}
