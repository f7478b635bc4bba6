#![doc = include_str!("../README.md")]

mod error;
mod pool;
mod work;

pub use crate::error::*;
pub use crate::pool::*;
pub use crate::work::*;
pub use tokio_util::sync::CancellationToken;
