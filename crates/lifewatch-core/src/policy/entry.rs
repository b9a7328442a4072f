//! # Policy Entries
//!
//! One release line ("cycle") of a family with its phase end dates, decoded
//! from the provider payload:
//!
//! | Payload field     | Meaning                         |
//! |-------------------|---------------------------------|
//! | `cycle`           | release identifier (`"8"`, `"2012-R2"`) |
//! | `support`         | end of full/mainstream support  |
//! | `eol`             | end of life                     |
//! | `extendedSupport` | end of the paid extended phase  |
//!
//! A date field is either a `YYYY-MM-DD` string, `false`/`null`/absent
//! (undefined), or `true` (already ended, date unknown). Extra fields are
//! ignored. Serializing an entry produces the same shape back.

use crate::LifewatchError;
use crate::dates::{already_ended, parse_policy_date};
use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle dates for one release line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    /// Release identifier at the provider.
    #[serde(deserialize_with = "deserialize_cycle")]
    pub cycle: String,

    /// End of full support.
    #[serde(
        rename = "support",
        default,
        deserialize_with = "deserialize_milestone",
        serialize_with = "serialize_milestone"
    )]
    pub support_end: Option<NaiveDate>,

    /// End of life.
    #[serde(
        rename = "eol",
        default,
        deserialize_with = "deserialize_milestone",
        serialize_with = "serialize_milestone"
    )]
    pub eol: Option<NaiveDate>,

    /// End of extended support (ELS / ESM).
    #[serde(
        rename = "extendedSupport",
        default,
        deserialize_with = "deserialize_milestone",
        serialize_with = "serialize_milestone"
    )]
    pub extended_support_end: Option<NaiveDate>,
}

impl PolicyEntry {
    /// Create an entry with no dates.
    #[must_use]
    pub fn new(cycle: impl Into<String>) -> Self {
        Self {
            cycle: cycle.into(),
            support_end: None,
            eol: None,
            extended_support_end: None,
        }
    }

    /// Set the end of full support.
    #[must_use]
    pub fn with_support_end(mut self, date: NaiveDate) -> Self {
        self.support_end = Some(date);
        self
    }

    /// Set the end of life.
    #[must_use]
    pub fn with_eol(mut self, date: NaiveDate) -> Self {
        self.eol = Some(date);
        self
    }

    /// Set the end of extended support.
    #[must_use]
    pub fn with_extended_support_end(mut self, date: NaiveDate) -> Self {
        self.extended_support_end = Some(date);
        self
    }

    /// Whether the defined dates break `support ≤ eol ≤ extended`.
    ///
    /// Only pairs where both sides are defined are compared. Entries are
    /// accepted either way; callers decide whether to warn.
    #[must_use]
    pub fn date_order_violation(&self) -> bool {
        let ordered = |a: Option<NaiveDate>, b: Option<NaiveDate>| match (a, b) {
            (Some(a), Some(b)) => a <= b,
            _ => true,
        };
        !(ordered(self.support_end, self.eol)
            && ordered(self.eol, self.extended_support_end)
            && ordered(self.support_end, self.extended_support_end))
    }
}

/// Decode a provider payload (a JSON array of entry objects).
///
/// Entries must be objects: a derived struct decoder would otherwise take a
/// positional array such as `["9", false, "2020-01-01"]`.
pub fn decode_policy_payload(bytes: &[u8]) -> Result<Vec<PolicyEntry>, LifewatchError> {
    let invalid = |e: serde_json::Error| LifewatchError::InvalidPolicy(e.to_string());
    let payload: serde_json::Value = serde_json::from_slice(bytes).map_err(invalid)?;
    let Some(items) = payload.as_array() else {
        return Err(LifewatchError::InvalidPolicy(
            "payload is not a JSON array".to_string(),
        ));
    };
    if let Some(index) = items.iter().position(|item| !item.is_object()) {
        return Err(LifewatchError::InvalidPolicy(format!(
            "entry {} is not a JSON object",
            index
        )));
    }
    serde_json::from_value(payload).map_err(invalid)
}

// =============================================================================
// FIELD CODECS
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCycle {
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMilestone {
    Flag(bool),
    Date(String),
}

fn deserialize_cycle<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawCycle::deserialize(deserializer)? {
        RawCycle::Text(text) => text,
        RawCycle::Number(n) => n.to_string(),
    })
}

fn deserialize_milestone<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<RawMilestone>::deserialize(deserializer)? {
        None | Some(RawMilestone::Flag(false)) => Ok(None),
        Some(RawMilestone::Flag(true)) => Ok(Some(already_ended())),
        Some(RawMilestone::Date(raw)) => {
            parse_policy_date(&raw).map(Some).map_err(D::Error::custom)
        }
    }
}

fn serialize_milestone<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
        None => serializer.serialize_bool(false),
    }
}
