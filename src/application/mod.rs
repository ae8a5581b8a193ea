//! Application layer: the settlement engine that orchestrates multi-record
//! operations over a [`GameStore`](crate::domain::ports::GameStore), and the
//! `Game` controller that validates caller input before delegating to it.

pub mod controller;
pub mod engine;
pub mod selection;
