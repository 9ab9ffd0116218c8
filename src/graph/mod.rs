//! Link graph construction and representation
//!
//! This module provides incremental graph building and the immutable
//! CSR form every estimator reads from.

pub mod builder;
pub mod csr;
