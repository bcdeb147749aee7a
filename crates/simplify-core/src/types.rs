//! Typed forms of the payload pieces callers usually hand in.
//!
//! The client itself only deals in [`Value`]s; these structs exist so callers
//! do not have to spell out the wire field names.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Card details in the shape the tokenization endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Card {
    pub fn new(
        number: impl Into<String>,
        exp_month: impl Into<String>,
        exp_year: impl Into<String>,
        cvc: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            exp_month: exp_month.into(),
            exp_year: exp_year.into(),
            cvc: cvc.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn to_value(&self) -> Option<Value> {
        Value::from_serialize(self)
    }
}

/// Transaction details that request a 3-D Secure check during tokenization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secure3dRequestData {
    /// Amount in the currency's minor unit.
    pub amount: i64,
    /// ISO 4217 code.
    pub currency: String,
    pub description: String,
}

impl Secure3dRequestData {
    pub fn new(amount: i64, currency: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            description: description.into(),
        }
    }

    pub fn to_value(&self) -> Option<Value> {
        Value::from_serialize(self)
    }
}
