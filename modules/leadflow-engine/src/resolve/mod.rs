//! Find-or-create resolution for companies and leads.

pub mod company;
pub mod lead;

pub use company::{resolve_or_create_company, CompanyResolution};
pub use lead::resolve_existing_lead;
