//! Market data handling

pub mod fx;
