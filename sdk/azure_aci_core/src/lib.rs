#![doc = include_str!("../README.md")]

pub mod auth;
pub mod client;
pub mod codec;
pub mod error;
pub mod resource;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{AciError, AciResult, ServiceError};
