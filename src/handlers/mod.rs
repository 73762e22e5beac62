//! HTTP request handlers, one module per entity group.

pub mod applicant;
pub mod loan;
pub mod reference;
