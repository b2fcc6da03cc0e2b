//! Ethereum primitives: addresses, chain ids, amounts and transaction hashes.

pub mod abi;
pub mod rpc;

pub use self::rpc::TransactionReceipt;
use std::{fmt, str::FromStr};

/// number of decimals of the native token of EVM chains (ETH, MATIC...)
pub const NATIVE_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Expected a `0x' prefixed value, got `{0}'")]
    MissingPrefix(String),
    #[error("Expected {expected} hexadecimal digits, got {found}")]
    InvalidLength { expected: usize, found: usize },
    #[error("Invalid hexadecimal value `{0}'")]
    InvalidHex(String),
    #[error("Invalid decimal value `{0}'")]
    InvalidDecimal(String),
    #[error("Too many decimals in `{value}' (at most {decimals})")]
    TooManyDecimals { value: String, decimals: u32 },
    #[error("Value `{0}' does not fit in 128 bits")]
    Overflow(String),
}

fn strip_0x(s: &str) -> Result<&str, ParseError> {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| ParseError::MissingPrefix(s.to_owned()))
}

fn check_hex(s: &str, expected: usize) -> Result<&str, ParseError> {
    let digits = strip_0x(s)?;
    if digits.len() != expected {
        return Err(ParseError::InvalidLength {
            expected,
            found: digits.len(),
        });
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidHex(s.to_owned()));
    }
    Ok(digits)
}

/// parse a JSON-RPC quantity (`"0x89"`) into a number
pub fn parse_quantity(s: &str) -> Result<u128, ParseError> {
    let digits = strip_0x(s)?;
    if digits.is_empty() {
        return Err(ParseError::InvalidHex(s.to_owned()));
    }
    if digits.len() > 32 {
        return Err(ParseError::Overflow(s.to_owned()));
    }
    u128::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidHex(s.to_owned()))
}

/// encode a number as a JSON-RPC quantity: `0x` followed by the minimal
/// hexadecimal representation (`0x0` for zero).
pub fn to_quantity(value: impl Into<u128>) -> String {
    format!("{:#x}", value.into())
}

/// An account or contract address.
///
/// The original casing is kept (wallets usually hand out EIP-55 checksummed
/// addresses) so what we display is what the wallet displays. Comparison is
/// case insensitive.
#[derive(Clone, Eq)]
pub struct Address(String);

impl Address {
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        check_hex(s, 40)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// the `0xABCD...1234` form: the first 6 and last 4 characters
    pub fn short(&self) -> String {
        let len = self.0.len();
        format!("{}...{}", &self.0[..6], &self.0[len - 4..])
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::hash::Hash for Address {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_ascii_lowercase().hash(state)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.0).finish()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// EIP-155 chain identifier (`1` for Ethereum mainnet, `137` for Polygon...)
///
/// Displayed in decimal, as it is usually configured. Wallets report it as a
/// hexadecimal quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainId(pub u64);

impl ChainId {
    pub fn from_quantity(s: &str) -> Result<Self, ParseError> {
        let value = parse_quantity(s)?;
        u64::try_from(value)
            .map(Self)
            .map_err(|_| ParseError::Overflow(s.to_owned()))
    }

    pub fn to_quantity(self) -> String {
        to_quantity(self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") || s.starts_with("0X") {
            Self::from_quantity(s)
        } else {
            s.parse()
                .map(Self)
                .map_err(|_| ParseError::InvalidDecimal(s.to_owned()))
        }
    }
}

impl<'de> serde::Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;
        impl serde::de::Visitor<'_> for Visitor {
            type Value = ChainId;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "Expecting a chain id (integer, decimal or hex string)")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ChainId(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(ChainId)
                    .map_err(|_| E::custom(format!("negative chain id {v}")))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                // JS numbers come through as floats
                if v.fract() == 0.0 && v >= 0.0 && v <= u64::MAX as f64 {
                    Ok(ChainId(v as u64))
                } else {
                    Err(E::custom(format!("invalid chain id {v}")))
                }
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// Amount of the native token, in wei (10^-18).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Self = Self(0);

    pub fn checked_mul(self, rhs: u128) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    pub fn to_quantity(self) -> String {
        to_quantity(self.0)
    }

    /// parse a decimal amount expressed in units of `10^decimals` wei
    ///
    /// `Wei::parse_units("0.05", 18)` is `50_000_000_000_000_000` wei.
    pub fn parse_units(value: &str, decimals: u32) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidDecimal(value.to_owned());
        let overflow = || ParseError::Overflow(value.to_owned());

        let (int, frac) = value.split_once('.').unwrap_or((value, ""));
        if (int.is_empty() && frac.is_empty())
            || !int.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let frac = frac.trim_end_matches('0');
        if frac.len() > decimals as usize {
            return Err(ParseError::TooManyDecimals {
                value: value.to_owned(),
                decimals,
            });
        }

        let scale = 10u128.checked_pow(decimals).ok_or_else(overflow)?;
        let int: u128 = if int.is_empty() {
            0
        } else {
            int.parse().map_err(|_| overflow())?
        };
        let frac_value: u128 = if frac.is_empty() {
            0
        } else {
            let padding = 10u128
                .checked_pow(decimals - frac.len() as u32)
                .ok_or_else(overflow)?;
            frac.parse::<u128>().map_err(|_| overflow())? * padding
        };

        int.checked_mul(scale)
            .and_then(|v| v.checked_add(frac_value))
            .map(Self)
            .ok_or_else(overflow)
    }

    /// render the amount in units of `10^decimals` wei, without trailing zeros
    pub fn format_units(self, decimals: u32) -> String {
        let Some(scale) = 10u128.checked_pow(decimals) else {
            return self.0.to_string();
        };
        let int = self.0 / scale;
        let frac = self.0 % scale;
        if frac == 0 {
            return int.to_string();
        }
        let frac = format!("{frac:0width$}", width = decimals as usize);
        format!("{int}.{}", frac.trim_end_matches('0'))
    }

    /// amount in ether (or whatever the chain's native token is)
    pub fn to_ether(self) -> String {
        self.format_units(NATIVE_DECIMALS)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Wei {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;
        impl serde::de::Visitor<'_> for Visitor {
            type Value = Wei;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "Expecting an amount of wei (integer or string)")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Wei(u128::from(v)))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u128::try_from(v)
                    .map(Wei)
                    .map_err(|_| E::custom(format!("negative amount {v}")))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.fract() == 0.0 && v >= 0.0 && v < u128::MAX as f64 {
                    Ok(Wei(v as u128))
                } else {
                    Err(E::custom(format!("invalid amount {v}")))
                }
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.starts_with("0x") {
                    parse_quantity(v).map(Wei).map_err(E::custom)
                } else {
                    Wei::parse_units(v, 0).map_err(E::custom)
                }
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// Hash of a submitted transaction
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TxHash(String);

impl TxHash {
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        check_hex(s, 64)?;
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TxHash").field(&self.0).finish()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for TxHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TxHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for TxHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn address_short_keeps_casing() {
        let address =
            Address::from_hex("0xABCD00000000000000000000000000000000001234").unwrap_err();
        assert_eq!(
            address,
            ParseError::InvalidLength {
                expected: 40,
                found: 42
            }
        );

        let address = Address::from_hex("0xABCDef0000000000000000000000000000001234").unwrap();
        assert_eq!(address.short(), "0xABCD...1234");
    }

    #[test]
    fn address_compares_case_insensitive() {
        let upper = Address::from_hex("0xABCDEF0000000000000000000000000000001234").unwrap();
        let lower = Address::from_hex("0xabcdef0000000000000000000000000000001234").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.to_string(), "0xABCDEF0000000000000000000000000000001234");
    }

    #[test]
    fn address_rejects_garbage() {
        assert!(matches!(
            Address::from_hex("abcdef0000000000000000000000000000001234"),
            Err(ParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            Address::from_hex("0xzzcdef0000000000000000000000000000001234"),
            Err(ParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn chain_id_parsing() {
        assert_eq!(ChainId::from_quantity("0x89").unwrap(), ChainId(137));
        assert_eq!("137".parse::<ChainId>().unwrap(), ChainId(137));
        assert_eq!("0x1".parse::<ChainId>().unwrap(), ChainId(1));
        assert!("polygon".parse::<ChainId>().is_err());
        assert_eq!(ChainId(137).to_quantity(), "0x89");
        assert_eq!(ChainId(137).to_string(), "137");
    }

    #[test]
    fn chain_id_json() {
        assert_eq!(
            serde_json::from_value::<ChainId>(json! { 137 }).unwrap(),
            ChainId(137)
        );
        assert_eq!(
            serde_json::from_value::<ChainId>(json! { "137" }).unwrap(),
            ChainId(137)
        );
        assert_eq!(
            serde_json::from_value::<ChainId>(json! { "0x89" }).unwrap(),
            ChainId(137)
        );
        assert!(serde_json::from_value::<ChainId>(json! { -1 }).is_err());
    }

    #[test]
    fn quantities() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x45948").unwrap(), 285_000);
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("12").is_err());
        assert_eq!(to_quantity(0u64), "0x0");
        assert_eq!(to_quantity(285_000u64), "0x45948");
    }

    #[test]
    fn wei_units() {
        let unit = Wei::parse_units("0.05", NATIVE_DECIMALS).unwrap();
        assert_eq!(unit, Wei(50_000_000_000_000_000));

        let total = unit.checked_mul(3).unwrap();
        assert_eq!(total, Wei::parse_units("0.15", NATIVE_DECIMALS).unwrap());
        assert_eq!(total.to_ether(), "0.15");

        assert_eq!(Wei::parse_units("2", NATIVE_DECIMALS).unwrap().to_ether(), "2");
        assert_eq!(Wei::parse_units(".5", 1).unwrap(), Wei(5));
        assert_eq!(Wei(1).to_ether(), "0.000000000000000001");
    }

    #[test]
    fn wei_units_errors() {
        assert!(matches!(
            Wei::parse_units("0.123", 2),
            Err(ParseError::TooManyDecimals { .. })
        ));
        assert!(matches!(
            Wei::parse_units("1,5", 18),
            Err(ParseError::InvalidDecimal(_))
        ));
        assert!(matches!(
            Wei::parse_units(".", 18),
            Err(ParseError::InvalidDecimal(_))
        ));
        assert!(Wei(u128::MAX).checked_mul(2).is_none());
    }

    #[test]
    fn wei_json() {
        assert_eq!(
            serde_json::from_value::<Wei>(json! { "50000000000000000" }).unwrap(),
            Wei(50_000_000_000_000_000)
        );
        assert_eq!(
            serde_json::from_value::<Wei>(json! { 1_000 }).unwrap(),
            Wei(1_000)
        );
        assert_eq!(
            serde_json::from_value::<Wei>(json! { "0x3e8" }).unwrap(),
            Wei(1_000)
        );
        assert!(serde_json::from_value::<Wei>(json! { "0.05" }).is_err());
    }

    #[test]
    fn wei_from_js_numbers() {
        use serde::{
            Deserialize as _,
            de::{
                IntoDeserializer as _,
                value::{Error, F64Deserializer, I64Deserializer},
            },
        };

        // JS numbers come in as `i64` when they are safe integers
        let safe: I64Deserializer<Error> = 1_000i64.into_deserializer();
        assert_eq!(Wei::deserialize(safe).unwrap(), Wei(1_000));

        let large: F64Deserializer<Error> = 5e16f64.into_deserializer();
        assert_eq!(Wei::deserialize(large).unwrap(), Wei(50_000_000_000_000_000));

        let negative: I64Deserializer<Error> = (-1i64).into_deserializer();
        assert!(Wei::deserialize(negative).is_err());

        let fraction: F64Deserializer<Error> = 0.5f64.into_deserializer();
        assert!(Wei::deserialize(fraction).is_err());
    }

    #[test]
    fn tx_hash() {
        let raw = format!("0x{}", "AB".repeat(32));
        let hash = TxHash::from_hex(&raw).unwrap();
        assert_eq!(hash.as_str(), format!("0x{}", "ab".repeat(32)));
        assert!(TxHash::from_hex("0x1234").is_err());
    }
}
