//! Minimal ABI encoding for the two contract functions the mint page uses.
//!
//! Only `uint256` arguments and results are needed, so this is not a general
//! purpose ABI codec.

use super::ParseError;

/// `bytes4(keccak256("mint(uint256)"))`
pub const MINT_SELECTOR: [u8; 4] = [0xa0, 0x71, 0x2d, 0x68];
/// `bytes4(keccak256("totalSupply()"))`
pub const TOTAL_SUPPLY_SELECTOR: [u8; 4] = [0x18, 0x16, 0x0d, 0xdd];

const WORD: usize = 32;

fn encode_uint256(value: u128) -> [u8; WORD] {
    let mut word = [0; WORD];
    word[WORD - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn calldata(selector: [u8; 4], words: &[[u8; WORD]]) -> String {
    let mut bytes = Vec::with_capacity(4 + words.len() * WORD);
    bytes.extend_from_slice(&selector);
    for word in words {
        bytes.extend_from_slice(word);
    }
    format!("0x{}", hex::encode(bytes))
}

/// calldata of `mint(quantity)`
pub fn encode_mint(quantity: u32) -> String {
    calldata(MINT_SELECTOR, &[encode_uint256(u128::from(quantity))])
}

/// calldata of `totalSupply()`
pub fn encode_total_supply() -> String {
    calldata(TOTAL_SUPPLY_SELECTOR, &[])
}

/// decode the `uint256` returned by an `eth_call`
///
/// Values that do not fit in 128 bits are rejected rather than truncated.
pub fn decode_uint256(output: &str) -> Result<u128, ParseError> {
    let digits = output
        .strip_prefix("0x")
        .ok_or_else(|| ParseError::MissingPrefix(output.to_owned()))?;
    let bytes = hex::decode(digits).map_err(|_| ParseError::InvalidHex(output.to_owned()))?;
    if bytes.len() != WORD {
        return Err(ParseError::InvalidLength {
            expected: WORD * 2,
            found: digits.len(),
        });
    }
    let (high, low) = bytes.split_at(WORD - 16);
    if high.iter().any(|b| *b != 0) {
        return Err(ParseError::Overflow(output.to_owned()));
    }
    let mut buf = [0; 16];
    buf.copy_from_slice(low);
    Ok(u128::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_calldata() {
        assert_eq!(
            encode_mint(3),
            "0xa0712d68\
             0000000000000000000000000000000000000000000000000000000000000003"
        );
    }

    #[test]
    fn total_supply_calldata() {
        assert_eq!(encode_total_supply(), "0x18160ddd");
    }

    #[test]
    fn decode_supply() {
        let output = format!("0x{}{}", "0".repeat(60), "1a0a");
        assert_eq!(decode_uint256(&output).unwrap(), 6666);
    }

    #[test]
    fn decode_rejects_bad_output() {
        assert!(matches!(
            decode_uint256("0x"),
            Err(ParseError::InvalidLength { .. })
        ));
        assert!(matches!(
            decode_uint256(&format!("0x1{}", "0".repeat(63))),
            Err(ParseError::Overflow(_))
        ));
        assert!(matches!(
            decode_uint256("0xzz"),
            Err(ParseError::InvalidHex(_))
        ));
    }
}
