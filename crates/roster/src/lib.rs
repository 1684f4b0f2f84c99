#![doc = include_str!("../README.md")]

pub mod credential;
pub mod domain;
mod error;
pub mod password;
pub mod repository;
pub mod service;
pub mod validate;

pub use crate::credential::{Claims, INVALID_TOKEN, Identity, TokenCodec};
pub use crate::error::*;
pub use crate::password::PasswordHasher;
