//! Serde adapter that carries `BigDecimal` amounts as JSON numbers.
//!
//! Incoming numbers are read through their shortest decimal form, so `9.99`
//! is stored as exactly `9.99`. Quoted amounts are accepted as well.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serializer, de, ser};

#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    let number = value
        .to_string()
        .parse::<f64>()
        .map_err(|e| ser::Error::custom(format!("amount {value} is not representable: {e}")))?;
    serializer.serialize_f64(number)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
    let text = match Amount::deserialize(deserializer)? {
        Amount::Number(number) if number.is_finite() => number.to_string(),
        Amount::Number(number) => return Err(de::Error::custom(format!("invalid amount {number}"))),
        Amount::Text(text) => text,
    };
    BigDecimal::from_str(text.trim()).map_err(de::Error::custom)
}
