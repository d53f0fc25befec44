use std::array::from_fn;

use nom::bytes::complete::take;
use nom::number::complete::be_u32;
use nom::IResult;

use crate::rng::SeededRng;

const RANDOM_BYTES: usize = 28;

/// A handshake random: 4 bytes of unix time plus 28 random bytes.
///
/// Generated once per side at handshake start and immutable after that.
/// Client and server randoms feed the key schedule, which is why a
/// collision between them is a protocol violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Random {
    pub gmt_unix_time: u32,
    pub random_bytes: [u8; RANDOM_BYTES],
}

impl Random {
    pub fn new(gmt_unix_time: u32, rng: &mut SeededRng) -> Self {
        Self {
            gmt_unix_time,
            random_bytes: from_fn(|_| rng.random()),
        }
    }

    /// All 32 bytes in wire order, as fed to the PRF.
    pub fn as_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&self.gmt_unix_time.to_be_bytes());
        bytes[4..].copy_from_slice(&self.random_bytes);
        bytes
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], Random> {
        let (input, gmt_unix_time) = be_u32(input)?;
        let (input, input_rand) = take(RANDOM_BYTES)(input)?;
        let mut random_bytes = [0u8; RANDOM_BYTES];
        random_bytes.copy_from_slice(input_rand);

        Ok((
            input,
            Random {
                gmt_unix_time,
                random_bytes,
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(&self.gmt_unix_time.to_be_bytes());
        output.extend_from_slice(&self.random_bytes);
    }
}
