use super::{PartyType, PaymentEntry, PaymentType};
use serde_json::{json, Value};

/// Fields that drive a payout and must stay identical between an amended
/// Payment Entry and its original once the original went out as an online
/// payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutField {
    PaymentType,
    Party,
    PartyType,
    PartyName,
    PartyBankAccount,
    PartyBankAccountNo,
    PartyBankIfsc,
    PartyUpiId,
    ContactPerson,
    ContactMobile,
    ContactEmail,
    PaidAmount,
    MakeBankOnlinePayment,
    PaymentTransferMethod,
    ReferenceNo,
    IntegrationDoctype,
    IntegrationDocname,
}

pub const PAYOUT_FIELDS: [PayoutField; 17] = [
    PayoutField::PaymentType,
    PayoutField::Party,
    PayoutField::PartyType,
    PayoutField::PartyName,
    PayoutField::PartyBankAccount,
    PayoutField::PartyBankAccountNo,
    PayoutField::PartyBankIfsc,
    PayoutField::PartyUpiId,
    PayoutField::ContactPerson,
    PayoutField::ContactMobile,
    PayoutField::ContactEmail,
    PayoutField::PaidAmount,
    PayoutField::MakeBankOnlinePayment,
    PayoutField::PaymentTransferMethod,
    PayoutField::ReferenceNo,
    PayoutField::IntegrationDoctype,
    PayoutField::IntegrationDocname,
];

impl PayoutField {
    /// Host column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutField::PaymentType => "payment_type",
            PayoutField::Party => "party",
            PayoutField::PartyType => "party_type",
            PayoutField::PartyName => "party_name",
            PayoutField::PartyBankAccount => "party_bank_account",
            PayoutField::PartyBankAccountNo => "party_bank_account_no",
            PayoutField::PartyBankIfsc => "party_bank_ifsc",
            PayoutField::PartyUpiId => "party_upi_id",
            PayoutField::ContactPerson => "contact_person",
            PayoutField::ContactMobile => "contact_mobile",
            PayoutField::ContactEmail => "contact_email",
            PayoutField::PaidAmount => "paid_amount",
            PayoutField::MakeBankOnlinePayment => "make_bank_online_payment",
            PayoutField::PaymentTransferMethod => "payment_transfer_method",
            PayoutField::ReferenceNo => "reference_no",
            PayoutField::IntegrationDoctype => "integration_doctype",
            PayoutField::IntegrationDocname => "integration_docname",
        }
    }

    /// Current value of this field on the entry, in host JSON terms.
    pub fn value_of(&self, entry: &PaymentEntry) -> Value {
        match self {
            PayoutField::PaymentType => json!(entry.payment_type),
            PayoutField::Party => json!(entry.party),
            PayoutField::PartyType => json!(entry.party_type),
            PayoutField::PartyName => json!(entry.party_name),
            PayoutField::PartyBankAccount => json!(entry.party_bank_account),
            PayoutField::PartyBankAccountNo => json!(entry.party_bank_account_no),
            PayoutField::PartyBankIfsc => json!(entry.party_bank_ifsc),
            PayoutField::PartyUpiId => json!(entry.party_upi_id),
            PayoutField::ContactPerson => json!(entry.contact_person),
            PayoutField::ContactMobile => json!(entry.contact_mobile),
            PayoutField::ContactEmail => json!(entry.contact_email),
            PayoutField::PaidAmount => json!(entry.paid_amount),
            PayoutField::MakeBankOnlinePayment => json!(u8::from(entry.make_bank_online_payment)),
            PayoutField::PaymentTransferMethod => json!(entry.payment_transfer_method),
            PayoutField::ReferenceNo => json!(entry.reference_no),
            PayoutField::IntegrationDoctype => json!(entry.integration_doctype),
            PayoutField::IntegrationDocname => json!(entry.integration_docname),
        }
    }

    /// Write a host JSON value into the matching typed field. Values that do
    /// not fit the field's type leave the field unchanged.
    pub fn apply(&self, entry: &mut PaymentEntry, value: &Value) {
        fn as_text(value: &Value) -> Option<String> {
            value
                .as_str()
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        }

        match self {
            PayoutField::PaymentType => {
                entry.payment_type = as_text(value).map(PaymentType::from);
            }
            PayoutField::Party => entry.party = as_text(value),
            PayoutField::PartyType => entry.party_type = as_text(value).map(PartyType::from),
            PayoutField::PartyName => entry.party_name = as_text(value),
            PayoutField::PartyBankAccount => entry.party_bank_account = as_text(value),
            PayoutField::PartyBankAccountNo => entry.party_bank_account_no = as_text(value),
            PayoutField::PartyBankIfsc => entry.party_bank_ifsc = as_text(value),
            PayoutField::PartyUpiId => entry.party_upi_id = as_text(value),
            PayoutField::ContactPerson => entry.contact_person = as_text(value),
            PayoutField::ContactMobile => entry.contact_mobile = as_text(value),
            PayoutField::ContactEmail => entry.contact_email = as_text(value),
            PayoutField::PaidAmount => {
                if let Some(amount) = value.as_f64() {
                    entry.paid_amount = amount;
                }
            }
            PayoutField::MakeBankOnlinePayment => {
                if let Some(flag) = value.as_bool().or_else(|| value.as_i64().map(|v| v != 0)) {
                    entry.make_bank_online_payment = flag;
                }
            }
            PayoutField::PaymentTransferMethod => {
                if let Some(method) = value.as_str().and_then(|raw| raw.parse().ok()) {
                    entry.payment_transfer_method = method;
                }
            }
            PayoutField::ReferenceNo => entry.reference_no = as_text(value),
            PayoutField::IntegrationDoctype => entry.integration_doctype = as_text(value),
            PayoutField::IntegrationDocname => entry.integration_docname = as_text(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransferMethod;

    #[test]
    fn reads_values_in_host_terms() {
        let entry = PaymentEntry {
            name: "ACC-PAY-2024-00001".to_string(),
            paid_amount: 1_500.0,
            make_bank_online_payment: true,
            payment_transfer_method: TransferMethod::Neft,
            ..PaymentEntry::default()
        };

        assert_eq!(PayoutField::PaidAmount.value_of(&entry), json!(1_500.0));
        assert_eq!(PayoutField::MakeBankOnlinePayment.value_of(&entry), json!(1));
        assert_eq!(
            PayoutField::PaymentTransferMethod.value_of(&entry),
            json!("NEFT")
        );
        assert_eq!(PayoutField::Party.value_of(&entry), Value::Null);
    }

    #[test]
    fn applies_values_back_onto_the_entry() {
        let mut entry = PaymentEntry::default();

        PayoutField::ContactEmail.apply(&mut entry, &json!("person@example.com"));
        PayoutField::PaidAmount.apply(&mut entry, &json!(250.75));
        PayoutField::MakeBankOnlinePayment.apply(&mut entry, &json!(1));
        PayoutField::PaymentTransferMethod.apply(&mut entry, &json!("UPI"));

        assert_eq!(entry.contact_email.as_deref(), Some("person@example.com"));
        assert_eq!(entry.paid_amount, 250.75);
        assert!(entry.make_bank_online_payment);
        assert_eq!(entry.payment_transfer_method, TransferMethod::Upi);
    }

    #[test]
    fn empty_strings_clear_text_fields() {
        let mut entry = PaymentEntry {
            contact_mobile: Some("9000090000".to_string()),
            ..PaymentEntry::default()
        };

        PayoutField::ContactMobile.apply(&mut entry, &json!(""));

        assert_eq!(entry.contact_mobile, None);
    }
}
