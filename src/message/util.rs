use nom::bytes::complete::take;
use nom::IResult;

/// Parse a big-endian 48-bit integer, as used by the record sequence number.
pub fn be_u48(input: &[u8]) -> IResult<&[u8], u64> {
    let (input, bytes) = take(6usize)(input)?;

    let mut value = 0u64;
    for b in bytes {
        value = (value << 8) | *b as u64;
    }

    Ok((input, value))
}
