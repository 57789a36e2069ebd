//! Multi-tenant careers pages: typed page sections composed into branded
//! public pages, an owner-side editor, job filtering and CSV bulk import.

pub mod config;
pub mod error;
pub mod import;
pub mod jobs;
pub mod pages;
pub mod router;
pub mod service;
pub mod session;
pub mod storage;
pub mod telemetry;

pub use router::{careers_router, CareersState};
pub use service::{CareersError, CareersService};
