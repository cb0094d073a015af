use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How funds reach the party once a Payment Entry is submitted.
///
/// `Link` sends a payment link to the party's contact instead of moving
/// funds directly, and is the host's default for new documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransferMethod {
    #[serde(rename = "NEFT")]
    Neft,
    #[serde(rename = "IMPS")]
    Imps,
    #[serde(rename = "RTGS")]
    Rtgs,
    #[serde(rename = "UPI")]
    Upi,
    #[default]
    Link,
}

impl TransferMethod {
    pub const ALL: [TransferMethod; 5] = [
        TransferMethod::Neft,
        TransferMethod::Imps,
        TransferMethod::Rtgs,
        TransferMethod::Upi,
        TransferMethod::Link,
    ];

    /// Methods that settle through the party's bank account.
    pub const BANK_METHODS: [TransferMethod; 3] = [
        TransferMethod::Neft,
        TransferMethod::Imps,
        TransferMethod::Rtgs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferMethod::Neft => "NEFT",
            TransferMethod::Imps => "IMPS",
            TransferMethod::Rtgs => "RTGS",
            TransferMethod::Upi => "UPI",
            TransferMethod::Link => "Link",
        }
    }

    pub fn is_bank_method(&self) -> bool {
        Self::BANK_METHODS.contains(self)
    }
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown transfer method: {0}")]
pub struct UnknownTransferMethod(pub String);

impl FromStr for TransferMethod {
    type Err = UnknownTransferMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| UnknownTransferMethod(s.to_string()))
    }
}

/// Select fields on documents created before the field existed arrive as
/// empty strings; treat those like an unset field.
pub(crate) fn de_or_default<'de, D>(deserializer: D) -> Result<TransferMethod, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(TransferMethod::default()),
        Some(raw) => raw.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_host_names() {
        assert_eq!(
            serde_json::to_string(&TransferMethod::Neft).expect("serialize"),
            "\"NEFT\""
        );
        assert_eq!(
            serde_json::to_string(&TransferMethod::Link).expect("serialize"),
            "\"Link\""
        );
    }

    #[test]
    fn parses_every_known_method() {
        for method in TransferMethod::ALL {
            assert_eq!(method.as_str().parse::<TransferMethod>(), Ok(method));
        }
    }

    #[test]
    fn rejects_unknown_methods() {
        assert_eq!(
            "Crypto".parse::<TransferMethod>(),
            Err(UnknownTransferMethod("Crypto".to_string()))
        );
    }

    #[test]
    fn defaults_to_link() {
        assert_eq!(TransferMethod::default(), TransferMethod::Link);
    }

    #[test]
    fn bank_methods_exclude_upi_and_link() {
        assert!(TransferMethod::Neft.is_bank_method());
        assert!(TransferMethod::Imps.is_bank_method());
        assert!(TransferMethod::Rtgs.is_bank_method());
        assert!(!TransferMethod::Upi.is_bank_method());
        assert!(!TransferMethod::Link.is_bank_method());
    }
}
