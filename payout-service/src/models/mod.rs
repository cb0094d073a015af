//! Payment Entry document model as owned by the ERP host.

mod payout_fields;
mod transfer_method;

pub use payout_fields::{PayoutField, PAYOUT_FIELDS};
pub use transfer_method::{TransferMethod, UnknownTransferMethod};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Host document lifecycle state, stored as an integer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DocStatus {
    #[default]
    Draft,
    Submitted,
    Cancelled,
}

impl DocStatus {
    pub fn is_draft(&self) -> bool {
        matches!(self, DocStatus::Draft)
    }
}

impl TryFrom<u8> for DocStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DocStatus::Draft),
            1 => Ok(DocStatus::Submitted),
            2 => Ok(DocStatus::Cancelled),
            other => Err(format!("invalid docstatus: {}", other)),
        }
    }
}

impl From<DocStatus> for u8 {
    fn from(value: DocStatus) -> Self {
        match value {
            DocStatus::Draft => 0,
            DocStatus::Submitted => 1,
            DocStatus::Cancelled => 2,
        }
    }
}

/// Direction of the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentType {
    Pay,
    Receive,
    InternalTransfer,
    Other(String),
}

impl PaymentType {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentType::Pay => "Pay",
            PaymentType::Receive => "Receive",
            PaymentType::InternalTransfer => "Internal Transfer",
            PaymentType::Other(name) => name,
        }
    }
}

impl From<String> for PaymentType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pay" => PaymentType::Pay,
            "Receive" => PaymentType::Receive,
            "Internal Transfer" => PaymentType::InternalTransfer,
            _ => PaymentType::Other(value),
        }
    }
}

impl From<PaymentType> for String {
    fn from(value: PaymentType) -> Self {
        value.as_str().to_string()
    }
}

/// Party doctype on the Payment Entry. The host allows arbitrary party
/// doctypes; only Employee changes how contact details resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartyType {
    Employee,
    Supplier,
    Customer,
    Other(String),
}

impl PartyType {
    pub fn is_employee(&self) -> bool {
        matches!(self, PartyType::Employee)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PartyType::Employee => "Employee",
            PartyType::Supplier => "Supplier",
            PartyType::Customer => "Customer",
            PartyType::Other(name) => name,
        }
    }
}

impl From<String> for PartyType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Employee" => PartyType::Employee,
            "Supplier" => PartyType::Supplier,
            "Customer" => PartyType::Customer,
            _ => PartyType::Other(value),
        }
    }
}

impl From<PartyType> for String {
    fn from(value: PartyType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One Payment Entry as stored by the host. Field names follow the host's
/// snake_case schema so documents round-trip untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub name: String,
    #[serde(default)]
    pub docstatus: DocStatus,
    #[serde(default)]
    pub amended_from: Option<String>,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub party_type: Option<PartyType>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub party_name: Option<String>,
    #[serde(default, with = "int_bool")]
    pub make_bank_online_payment: bool,
    #[serde(default, deserialize_with = "transfer_method::de_or_default")]
    pub payment_transfer_method: TransferMethod,
    #[serde(default)]
    pub party_bank_account: Option<String>,
    #[serde(default)]
    pub party_bank_account_no: Option<String>,
    #[serde(default)]
    pub party_bank_ifsc: Option<String>,
    #[serde(default)]
    pub party_upi_id: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_mobile: Option<String>,
    #[serde(default)]
    pub paid_amount: f64,
    #[serde(default)]
    pub reference_no: Option<String>,
    #[serde(default)]
    pub integration_doctype: Option<String>,
    #[serde(default)]
    pub integration_docname: Option<String>,
    #[serde(default)]
    pub payment_authorized_by: Option<String>,
    /// Host fields outside the fixed schema. Extra payout fields registered
    /// through configuration are compared out of this map.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
    /// Set when the amendment check proved this document was already paid
    /// through its original. Never persisted.
    #[serde(skip)]
    pub already_paid: bool,
}

/// Host boolean columns arrive as `0`/`1`, with tolerance for real JSON
/// booleans.
pub mod int_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Bool(bool),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(value) => value != 0,
            Raw::Bool(value) => value,
        })
    }
}
