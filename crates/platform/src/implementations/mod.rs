//! Platform implementations

pub mod unix;
