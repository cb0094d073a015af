//! Transfer-method validation for Payment Entries.
//!
//! The pipeline runs before any submission: auto-correction, the online
//! payment applicability gate, the amendment check, then one branch per
//! transfer method. The first violation stops the pipeline for that
//! document.

use crate::models::{PartyType, PaymentEntry, PayoutField, TransferMethod, PAYOUT_FIELDS};
use crate::services::contacts::{ContactDetails, ContactDirectory};
use crate::services::documents::PaymentEntryStore;
use crate::services::ifsc::BankCodeDirectory;
use crate::utils::format_inr;
use serde_json::{json, Value};
use service_core::error::AppError;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// IMPS transfers are capped at five lakh rupees.
pub const IMPS_LIMIT: f64 = 500_000.0;
/// RTGS transfers start at two lakh rupees.
pub const RTGS_MINIMUM: f64 = 200_000.0;

/// How a policy failure should be read by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    MandatoryField,
    BusinessRule,
    ExternalLookup,
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Party's Bank Account Details is mandatory to make payment. Please set valid Party Bank Account.")]
    MissingBankDetails,

    #[error("Invalid IFSC Code: {0}")]
    InvalidIfsc(String),

    #[error("IMPS transfer limit is {}. Please use RTGS/NEFT for higher amount.", format_inr(IMPS_LIMIT))]
    ImpsLimitExceeded,

    #[error("RTGS transfer minimum amount is {}. Please use NEFT/IMPS for lower amount.", format_inr(RTGS_MINIMUM))]
    RtgsBelowMinimum,

    #[error("Party's UPI ID is mandatory to make payment. Please set valid Party Bank Account.")]
    MissingUpiDetails,

    #[error("Contact Person is mandatory to make payment with link.")]
    MissingContactPerson,

    #[error("Set Employee's Mobile or Preferred Email to make payment with link.")]
    EmployeeContactDetailsMissing,

    #[error("Set valid Contact to make payment with link.")]
    ContactDetailsMissing,

    #[error("Mobile Number does not match with Party's Mobile Number")]
    MobileMismatch,

    #[error("Email ID does not match with Party's Email ID")]
    EmailMismatch,

    #[error("Cannot change {field} after payment. It must match the original Payment Entry {original}.")]
    PayoutFieldChanged { field: String, original: String },

    #[error(transparent)]
    Lookup(#[from] AppError),
}

impl PolicyError {
    /// Short display title, in the host's message style.
    pub fn title(&self) -> &'static str {
        match self {
            PolicyError::MissingBankDetails | PolicyError::MissingUpiDetails => {
                "Mandatory Fields Missing"
            }
            PolicyError::InvalidIfsc(_) => "Invalid IFSC Code",
            PolicyError::ImpsLimitExceeded => "Payment Limit Exceeded",
            PolicyError::RtgsBelowMinimum => "Insufficient Payment Amount",
            PolicyError::MissingContactPerson => "Mandatory Field Missing",
            PolicyError::EmployeeContactDetailsMissing | PolicyError::ContactDetailsMissing => {
                "Contact Details Missing"
            }
            PolicyError::MobileMismatch => "Invalid Mobile Number",
            PolicyError::EmailMismatch => "Invalid Email ID",
            PolicyError::PayoutFieldChanged { .. } => "Payout Fields Changed",
            PolicyError::Lookup(_) => "External Lookup Failed",
        }
    }

    pub fn kind(&self) -> ViolationKind {
        match self {
            PolicyError::MissingBankDetails
            | PolicyError::MissingUpiDetails
            | PolicyError::MissingContactPerson
            | PolicyError::EmployeeContactDetailsMissing
            | PolicyError::ContactDetailsMissing => ViolationKind::MandatoryField,
            PolicyError::ImpsLimitExceeded
            | PolicyError::RtgsBelowMinimum
            | PolicyError::MobileMismatch
            | PolicyError::EmailMismatch
            | PolicyError::PayoutFieldChanged { .. } => ViolationKind::BusinessRule,
            PolicyError::InvalidIfsc(_) | PolicyError::Lookup(_) => ViolationKind::ExternalLookup,
        }
    }
}

/// Check a raw transfer-method name, optionally failing the caller with a
/// message listing the valid methods.
pub fn validate_payment_mode(payment_mode: &str, throw: bool) -> Result<bool, AppError> {
    if TransferMethod::from_str(payment_mode).is_ok() {
        return Ok(true);
    }

    if throw {
        let valid = TransferMethod::ALL.map(|method| method.as_str()).join(", ");
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid Payment Mode: {}. Must be one of: {}",
            payment_mode,
            valid
        )));
    }

    Ok(false)
}

/// Decides whether a Payment Entry may proceed with its declared transfer
/// method. Mutates the entry only for the documented auto-correction and
/// the contact backfill.
pub struct TransferMethodPolicy {
    store: Arc<dyn PaymentEntryStore>,
    bank_codes: Arc<dyn BankCodeDirectory>,
    contacts: Arc<dyn ContactDirectory>,
    extra_payout_fields: Vec<String>,
}

impl TransferMethodPolicy {
    pub fn new(
        store: Arc<dyn PaymentEntryStore>,
        bank_codes: Arc<dyn BankCodeDirectory>,
        contacts: Arc<dyn ContactDirectory>,
        extra_payout_fields: Vec<String>,
    ) -> Self {
        Self {
            store,
            bank_codes,
            contacts,
            extra_payout_fields,
        }
    }

    /// Run the full validation pipeline against `entry`.
    pub async fn validate(&self, entry: &mut PaymentEntry) -> Result<(), PolicyError> {
        // A duplicated Link document keeps its bank account but loses the
        // online-payment flag; it is really a NEFT instruction. Runs before
        // the applicability gate on purpose.
        if text(&entry.party_bank_account).is_some()
            && !entry.make_bank_online_payment
            && entry.payment_transfer_method == TransferMethod::Link
        {
            entry.payment_transfer_method = TransferMethod::Neft;
        }

        if !entry.make_bank_online_payment
            || text(&entry.integration_doctype).is_none()
            || text(&entry.integration_docname).is_none()
        {
            return Ok(());
        }

        self.check_not_amended_after_payment(entry).await?;
        self.validate_bank_transfer(entry).await?;
        self.validate_upi_transfer(entry)?;
        self.validate_link_transfer(entry).await?;

        Ok(())
    }

    /// Once the original went out as an online payment, an amendment may not
    /// change any payout field. A clean match marks the entry already paid
    /// so no second payout is raised for it.
    async fn check_not_amended_after_payment(
        &self,
        entry: &mut PaymentEntry,
    ) -> Result<(), PolicyError> {
        let Some(original_name) = text(&entry.amended_from).map(str::to_string) else {
            return Ok(());
        };

        let original = match self.store.load(&original_name).await {
            Ok(original) => original,
            // An unreachable original cannot have been paid through us.
            Err(AppError::NotFound(_)) => return Ok(()),
            Err(error) => return Err(error.into()),
        };

        if !original.make_bank_online_payment {
            return Ok(());
        }

        for field in PAYOUT_FIELDS {
            if field.value_of(entry) != field.value_of(&original) {
                return Err(PolicyError::PayoutFieldChanged {
                    field: field.as_str().to_string(),
                    original: original_name,
                });
            }
        }

        for field in &self.extra_payout_fields {
            let amended = entry.extra.get(field).cloned().unwrap_or(Value::Null);
            let prior = original.extra.get(field).cloned().unwrap_or(Value::Null);

            if amended != prior {
                return Err(PolicyError::PayoutFieldChanged {
                    field: field.clone(),
                    original: original_name,
                });
            }
        }

        entry.already_paid = true;

        Ok(())
    }

    async fn validate_bank_transfer(&self, entry: &PaymentEntry) -> Result<(), PolicyError> {
        if !entry.payment_transfer_method.is_bank_method() {
            return Ok(());
        }

        let ifsc = match (
            text(&entry.party_bank_account),
            text(&entry.party_bank_account_no),
            text(&entry.party_bank_ifsc),
        ) {
            (Some(_), Some(_), Some(ifsc)) => ifsc,
            _ => return Err(PolicyError::MissingBankDetails),
        };

        if !self.bank_codes.lookup(ifsc).await? {
            return Err(PolicyError::InvalidIfsc(ifsc.to_string()));
        }

        match entry.payment_transfer_method {
            TransferMethod::Imps if entry.paid_amount > IMPS_LIMIT => {
                Err(PolicyError::ImpsLimitExceeded)
            }
            TransferMethod::Rtgs if entry.paid_amount < RTGS_MINIMUM => {
                Err(PolicyError::RtgsBelowMinimum)
            }
            _ => Ok(()),
        }
    }

    fn validate_upi_transfer(&self, entry: &PaymentEntry) -> Result<(), PolicyError> {
        if entry.payment_transfer_method != TransferMethod::Upi {
            return Ok(());
        }

        if text(&entry.party_upi_id).is_none() || text(&entry.party_bank_account).is_none() {
            return Err(PolicyError::MissingUpiDetails);
        }

        Ok(())
    }

    async fn validate_link_transfer(&self, entry: &mut PaymentEntry) -> Result<(), PolicyError> {
        if entry.payment_transfer_method != TransferMethod::Link {
            return Ok(());
        }

        let is_employee = entry
            .party_type
            .as_ref()
            .is_some_and(PartyType::is_employee);

        if !is_employee && text(&entry.contact_person).is_none() {
            return Err(PolicyError::MissingContactPerson);
        }

        let resolved = self.resolve_party_contact(entry, is_employee).await?;
        let party_mobile = text(&resolved.mobile);
        let party_email = text(&resolved.email);

        // Documents created over the API often omit contact fields even
        // though the party has them; write them back before matching.
        if text(&entry.contact_email).is_none()
            && text(&entry.contact_mobile).is_none()
            && (party_email.is_some() || party_mobile.is_some())
        {
            self.store
                .update_fields(
                    &entry.name,
                    &[
                        (PayoutField::ContactEmail, json!(resolved.email)),
                        (PayoutField::ContactMobile, json!(resolved.mobile)),
                    ],
                )
                .await?;
            entry.contact_email = resolved.email.clone();
            entry.contact_mobile = resolved.mobile.clone();
        }

        if party_mobile.is_none() && party_email.is_none() {
            return Err(if is_employee {
                PolicyError::EmployeeContactDetailsMissing
            } else {
                PolicyError::ContactDetailsMissing
            });
        }

        if let Some(mobile) = text(&entry.contact_mobile) {
            if Some(mobile) != party_mobile {
                return Err(PolicyError::MobileMismatch);
            }
        }

        if let Some(email) = text(&entry.contact_email) {
            if Some(email) != party_email {
                return Err(PolicyError::EmailMismatch);
            }
        }

        Ok(())
    }

    async fn resolve_party_contact(
        &self,
        entry: &PaymentEntry,
        is_employee: bool,
    ) -> Result<ContactDetails, PolicyError> {
        if is_employee {
            match text(&entry.party) {
                Some(party) => Ok(self.contacts.employee_contact(party).await?),
                None => Ok(ContactDetails::default()),
            }
        } else {
            match text(&entry.contact_person) {
                Some(person) => Ok(self.contacts.contact(person).await?),
                None => Ok(ContactDetails::default()),
            }
        }
    }
}

/// Host string fields arrive as missing or empty interchangeably.
fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::contacts::InMemoryContactDirectory;
    use crate::services::documents::InMemoryEntryStore;
    use crate::services::ifsc::InMemoryBankDirectory;

    struct Fixture {
        store: Arc<InMemoryEntryStore>,
        bank_codes: Arc<InMemoryBankDirectory>,
        contacts: Arc<InMemoryContactDirectory>,
        policy: TransferMethodPolicy,
    }

    fn fixture() -> Fixture {
        fixture_with_extras(Vec::new())
    }

    fn fixture_with_extras(extra_payout_fields: Vec<String>) -> Fixture {
        let store = Arc::new(InMemoryEntryStore::new());
        let bank_codes = Arc::new(InMemoryBankDirectory::new());
        let contacts = Arc::new(InMemoryContactDirectory::new());
        bank_codes.put("HDFC0000001");

        let policy = TransferMethodPolicy::new(
            store.clone(),
            bank_codes.clone(),
            contacts.clone(),
            extra_payout_fields,
        );

        Fixture {
            store,
            bank_codes,
            contacts,
            policy,
        }
    }

    fn bank_entry(method: TransferMethod, paid_amount: f64) -> PaymentEntry {
        PaymentEntry {
            name: "ACC-PAY-2024-00001".to_string(),
            make_bank_online_payment: true,
            payment_transfer_method: method,
            party_type: Some(PartyType::Supplier),
            party: Some("SUP-0001".to_string()),
            party_bank_account: Some("Creditor account - SUP-0001".to_string()),
            party_bank_account_no: Some("000111222333".to_string()),
            party_bank_ifsc: Some("HDFC0000001".to_string()),
            paid_amount,
            integration_doctype: Some("Bank Payout".to_string()),
            integration_docname: Some("PO-0001".to_string()),
            ..PaymentEntry::default()
        }
    }

    fn link_entry() -> PaymentEntry {
        PaymentEntry {
            payment_transfer_method: TransferMethod::Link,
            party_bank_account: None,
            party_bank_account_no: None,
            party_bank_ifsc: None,
            ..bank_entry(TransferMethod::Link, 1_000.0)
        }
    }

    #[tokio::test]
    async fn skips_validation_without_the_online_payment_flag() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Imps, 9_999_999.0);
        entry.make_bank_online_payment = false;
        entry.party_bank_account = None;

        fixture.policy.validate(&mut entry).await.expect("no-op");
    }

    #[tokio::test]
    async fn skips_validation_without_integration_references() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Imps, 9_999_999.0);
        entry.integration_docname = None;

        fixture.policy.validate(&mut entry).await.expect("no-op");
    }

    #[tokio::test]
    async fn reclassifies_duplicated_link_documents_as_neft() {
        let fixture = fixture();
        let mut entry = link_entry();
        entry.make_bank_online_payment = false;
        entry.party_bank_account = Some("Creditor account - SUP-0001".to_string());

        fixture.policy.validate(&mut entry).await.expect("no-op");

        assert_eq!(entry.payment_transfer_method, TransferMethod::Neft);
    }

    #[tokio::test]
    async fn bank_transfers_need_account_details() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Neft, 1_000.0);
        entry.party_bank_account_no = None;

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::MissingBankDetails));
        assert_eq!(error.title(), "Mandatory Fields Missing");
        assert_eq!(error.kind(), ViolationKind::MandatoryField);
    }

    #[tokio::test]
    async fn empty_strings_count_as_missing_details() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Neft, 1_000.0);
        entry.party_bank_ifsc = Some(String::new());

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(error, PolicyError::MissingBankDetails));
    }

    #[tokio::test]
    async fn bank_transfers_need_a_known_ifsc() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Neft, 1_000.0);
        entry.party_bank_ifsc = Some("XXXX0000000".to_string());

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::InvalidIfsc(code) if code.as_str() == "XXXX0000000"));
        assert_eq!(error.kind(), ViolationKind::ExternalLookup);

        fixture.bank_codes.put("XXXX0000000");
        fixture
            .policy
            .validate(&mut entry)
            .await
            .expect("valid once the directory knows the code");
    }

    #[tokio::test]
    async fn imps_rejects_amounts_above_the_limit() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Imps, 600_000.0);

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::ImpsLimitExceeded));
        assert_eq!(error.title(), "Payment Limit Exceeded");
        assert!(error.to_string().contains("₹ 5,00,000.00"));
    }

    #[tokio::test]
    async fn imps_allows_amounts_at_the_limit() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Imps, 500_000.0);

        fixture.policy.validate(&mut entry).await.expect("valid");
    }

    #[tokio::test]
    async fn rtgs_rejects_amounts_below_the_minimum() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Rtgs, 150_000.0);

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::RtgsBelowMinimum));
        assert_eq!(error.title(), "Insufficient Payment Amount");
        assert!(error.to_string().contains("₹ 2,00,000.00"));
    }

    #[tokio::test]
    async fn rtgs_allows_amounts_at_the_minimum() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Rtgs, 200_000.0);

        fixture.policy.validate(&mut entry).await.expect("valid");
    }

    #[tokio::test]
    async fn upi_needs_upi_id_and_bank_account() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Upi, 1_000.0);
        entry.party_upi_id = None;

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::MissingUpiDetails));
        assert_eq!(error.title(), "Mandatory Fields Missing");
    }

    #[tokio::test]
    async fn upi_passes_with_full_details() {
        let fixture = fixture();
        let mut entry = bank_entry(TransferMethod::Upi, 1_000.0);
        entry.party_upi_id = Some("supplier@upi".to_string());

        fixture.policy.validate(&mut entry).await.expect("valid");
    }

    #[tokio::test]
    async fn link_needs_a_contact_person_for_non_employees() {
        let fixture = fixture();
        let mut entry = link_entry();

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::MissingContactPerson));
        assert_eq!(error.title(), "Mandatory Field Missing");
    }

    #[tokio::test]
    async fn link_reports_missing_employee_details() {
        let fixture = fixture();
        let mut entry = link_entry();
        entry.party_type = Some(PartyType::Employee);
        entry.party = Some("HR-EMP-00001".to_string());

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::EmployeeContactDetailsMissing));
        assert_eq!(error.title(), "Contact Details Missing");
        assert!(error.to_string().contains("Employee's Mobile or Preferred Email"));
    }

    #[tokio::test]
    async fn link_reports_missing_contact_details() {
        let fixture = fixture();
        let mut entry = link_entry();
        entry.contact_person = Some("Vendor Person".to_string());

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::ContactDetailsMissing));
        assert_eq!(error.title(), "Contact Details Missing");
    }

    #[tokio::test]
    async fn link_backfills_contact_details_from_the_party() {
        let fixture = fixture();
        fixture.store.put(PaymentEntry {
            contact_person: Some("Vendor Person".to_string()),
            ..link_entry()
        });
        fixture.contacts.put_contact(
            "Vendor Person",
            ContactDetails {
                mobile: Some("9000090000".to_string()),
                email: Some("vendor@example.com".to_string()),
            },
        );

        let mut entry = fixture.store.get("ACC-PAY-2024-00001").expect("seeded");
        fixture.policy.validate(&mut entry).await.expect("valid");

        assert_eq!(entry.contact_mobile.as_deref(), Some("9000090000"));
        assert_eq!(entry.contact_email.as_deref(), Some("vendor@example.com"));

        let stored = fixture.store.get("ACC-PAY-2024-00001").expect("stored");
        assert_eq!(stored.contact_mobile.as_deref(), Some("9000090000"));
        assert_eq!(stored.contact_email.as_deref(), Some("vendor@example.com"));
    }

    #[tokio::test]
    async fn link_rejects_a_mobile_number_that_differs_from_the_party() {
        let fixture = fixture();
        fixture.contacts.put_contact(
            "Vendor Person",
            ContactDetails {
                mobile: Some("9000090000".to_string()),
                email: None,
            },
        );
        let mut entry = link_entry();
        entry.contact_person = Some("Vendor Person".to_string());
        entry.contact_mobile = Some("9111191111".to_string());

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::MobileMismatch));
        assert_eq!(error.title(), "Invalid Mobile Number");
    }

    #[tokio::test]
    async fn link_rejects_an_email_that_differs_from_the_party() {
        let fixture = fixture();
        fixture.contacts.put_contact(
            "Vendor Person",
            ContactDetails {
                mobile: None,
                email: Some("vendor@example.com".to_string()),
            },
        );
        let mut entry = link_entry();
        entry.contact_person = Some("Vendor Person".to_string());
        entry.contact_email = Some("other@example.com".to_string());

        let error = fixture
            .policy
            .validate(&mut entry)
            .await
            .expect_err("must fail");

        assert!(matches!(&error, PolicyError::EmailMismatch));
        assert_eq!(error.title(), "Invalid Email ID");
    }

    #[tokio::test]
    async fn link_accepts_matching_employee_details() {
        let fixture = fixture();
        fixture.contacts.put_employee(
            "HR-EMP-00001",
            ContactDetails {
                mobile: Some("9000090000".to_string()),
                email: Some("employee@example.com".to_string()),
            },
        );
        let mut entry = link_entry();
        entry.party_type = Some(PartyType::Employee);
        entry.party = Some("HR-EMP-00001".to_string());
        entry.contact_mobile = Some("9000090000".to_string());
        entry.contact_email = Some("employee@example.com".to_string());

        fixture.policy.validate(&mut entry).await.expect("valid");
    }

    #[tokio::test]
    async fn amendment_with_changed_paid_amount_is_rejected() {
        let fixture = fixture();
        let mut original = bank_entry(TransferMethod::Neft, 1_000.0);
        original.name = "ACC-PAY-2024-00001".to_string();
        fixture.store.put(original);

        let mut amendment = bank_entry(TransferMethod::Neft, 2_000.0);
        amendment.name = "ACC-PAY-2024-00001-1".to_string();
        amendment.amended_from = Some("ACC-PAY-2024-00001".to_string());

        let error = fixture
            .policy
            .validate(&mut amendment)
            .await
            .expect_err("must fail");

        let message = error.to_string();
        assert!(matches!(error, PolicyError::PayoutFieldChanged { .. }));
        assert!(message.contains("paid_amount"));
        assert!(message.contains("ACC-PAY-2024-00001"));
        assert!(!amendment.already_paid);
    }

    #[tokio::test]
    async fn amendment_with_identical_payout_fields_passes() {
        let fixture = fixture();
        fixture.store.put(bank_entry(TransferMethod::Neft, 1_000.0));

        let mut amendment = bank_entry(TransferMethod::Neft, 1_000.0);
        amendment.name = "ACC-PAY-2024-00001-1".to_string();
        amendment.amended_from = Some("ACC-PAY-2024-00001".to_string());

        fixture.policy.validate(&mut amendment).await.expect("valid");

        assert!(amendment.already_paid);
    }

    #[tokio::test]
    async fn amendment_of_an_offline_original_is_unrestricted() {
        let fixture = fixture();
        let mut original = bank_entry(TransferMethod::Neft, 1_000.0);
        original.make_bank_online_payment = false;
        fixture.store.put(original);

        let mut amendment = bank_entry(TransferMethod::Neft, 2_000.0);
        amendment.name = "ACC-PAY-2024-00001-1".to_string();
        amendment.amended_from = Some("ACC-PAY-2024-00001".to_string());

        fixture.policy.validate(&mut amendment).await.expect("valid");

        assert!(!amendment.already_paid);
    }

    #[tokio::test]
    async fn amendment_guard_covers_registered_extra_fields() {
        let fixture = fixture_with_extras(vec!["custom_payout_desc".to_string()]);
        let mut original = bank_entry(TransferMethod::Neft, 1_000.0);
        original
            .extra
            .insert("custom_payout_desc".to_string(), json!("March rent"));
        fixture.store.put(original);

        let mut amendment = bank_entry(TransferMethod::Neft, 1_000.0);
        amendment.name = "ACC-PAY-2024-00001-1".to_string();
        amendment.amended_from = Some("ACC-PAY-2024-00001".to_string());
        amendment
            .extra
            .insert("custom_payout_desc".to_string(), json!("April rent"));

        let error = fixture
            .policy
            .validate(&mut amendment)
            .await
            .expect_err("must fail");

        assert!(error.to_string().contains("custom_payout_desc"));
    }

    #[tokio::test]
    async fn validates_payment_mode_names() {
        for mode in ["NEFT", "IMPS", "RTGS", "UPI", "Link"] {
            assert!(validate_payment_mode(mode, false).expect("known mode"));
        }

        assert!(!validate_payment_mode("Crypto", false).expect("quiet miss"));

        let error = validate_payment_mode("Crypto", true).expect_err("must fail");
        let message = error.to_string();
        assert!(message.contains("Invalid Payment Mode: Crypto"));
        assert!(message.contains("NEFT, IMPS, RTGS, UPI, Link"));
    }
}
