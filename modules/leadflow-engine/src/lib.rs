//! Entity resolution and progressive enrichment engine.
//!
//! Reconciles person/organization records from independent scraper and
//! validation jobs into a canonical Lead/Company store without duplicating
//! entities and without replacing known data with less certain data.
//!
//! One shared resolve/merge core; one small adapter per upstream shape.

pub mod ingest;
pub mod merge;
pub mod resolve;
pub mod store;
pub mod usage;

pub use ingest::{
    ingest_batch, ingest_validation_results, Adapted, CsvAdapter, EmailDiscoveryAdapter,
    EmployeeAdapter, ProfileAdapter, RecordFragments, SourceAdapter,
};
pub use resolve::{resolve_existing_lead, resolve_or_create_company, CompanyResolution};
pub use store::{
    CompanyLookup, CompanyRow, EntityType, LeadPatch, LeadRow, LeadStore, MemoryStore, PgStore,
    UsageRecord,
};
