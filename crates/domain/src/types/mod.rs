//! Domain types and models

pub mod checkout;
pub mod crm;
pub mod sync;

pub use checkout::{CheckoutRequest, CheckoutSession, PaymentMode, PlanPrice};
pub use crm::{
    Company, CompanyLinkKey, Contact, NewCompany, NewContact, RawFields, RawRecord, RecordKind,
};
pub use sync::{ErrorEnvelope, SyncEnvelope, SyncReport};
