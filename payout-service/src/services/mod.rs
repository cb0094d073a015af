pub mod auth;
pub mod bulk;
pub mod contacts;
pub mod documents;
pub mod erp;
pub mod ifsc;
pub mod metrics;
pub mod policy;
pub mod progress;

pub use auth::{ensure_payment_authorized, PaymentAuthorizer, StaticAuthorizer};
pub use bulk::{BulkDispatch, BulkLimits, BulkSubmitJob, BulkSubmitter};
pub use contacts::{ContactDetails, ContactDirectory, InMemoryContactDirectory};
pub use documents::{InMemoryEntryStore, PaymentEntryStore};
pub use erp::ErpClient;
pub use ifsc::{validate_ifsc_code, BankCodeDirectory, IfscClient, InMemoryBankDirectory};
pub use metrics::{get_metrics, init_metrics};
pub use policy::{validate_payment_mode, PolicyError, TransferMethodPolicy, ViolationKind};
pub use progress::{ProgressTracker, TaskProgress};
