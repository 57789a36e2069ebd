//! Job postings and the in-memory filter applied to fetched listings.

pub mod domain;
pub mod filter;

pub use domain::{JobId, JobPosting, NewJobPosting};
pub use filter::{filter_jobs, JobCriteria, JobFacets};
