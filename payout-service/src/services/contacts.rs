use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use service_core::error::AppError;

/// Contact details resolved from the host directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactDetails {
    pub mobile: Option<String>,
    pub email: Option<String>,
}

impl ContactDetails {
    pub fn is_empty(&self) -> bool {
        self.mobile.is_none() && self.email.is_none()
    }
}

/// Looks up who to reach when paying by link.
///
/// Employee parties resolve through the employee record, everything else
/// through the linked contact record. A missing record resolves to empty
/// details rather than an error.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn employee_contact(&self, employee: &str) -> Result<ContactDetails, AppError>;

    async fn contact(&self, contact_person: &str) -> Result<ContactDetails, AppError>;
}

/// In-memory directory used in tests and when no ERP host is configured.
#[derive(Default)]
pub struct InMemoryContactDirectory {
    employees: DashMap<String, ContactDetails>,
    contacts: DashMap<String, ContactDetails>,
}

impl InMemoryContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_employee(&self, employee: &str, details: ContactDetails) {
        self.employees.insert(employee.to_string(), details);
    }

    pub fn put_contact(&self, contact_person: &str, details: ContactDetails) {
        self.contacts.insert(contact_person.to_string(), details);
    }
}

#[async_trait]
impl ContactDirectory for InMemoryContactDirectory {
    async fn employee_contact(&self, employee: &str) -> Result<ContactDetails, AppError> {
        Ok(self
            .employees
            .get(employee)
            .map(|details| details.value().clone())
            .unwrap_or_default())
    }

    async fn contact(&self, contact_person: &str) -> Result<ContactDetails, AppError> {
        Ok(self
            .contacts
            .get(contact_person)
            .map(|details| details.value().clone())
            .unwrap_or_default())
    }
}
