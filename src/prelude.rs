//! Derive macros shared by the day, range and configuration types.

#[allow(unused_imports)]
pub use derive_more::{Display, From, Into};
