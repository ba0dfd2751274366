//! azrm Core
//!
//! Core library for a Terraform-style Azure Resource Manager provider:
//! the resource ID codec, attribute schemas, resource state and the
//! provider contract.

pub mod lock;
pub mod provider;
pub mod resource;
pub mod resource_id;
pub mod schema;

#[doc(hidden)]
pub use serde as __serde;
