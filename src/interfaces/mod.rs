//! Wire-facing adapters: command scripts in, JSON lines out.

pub mod csv;
pub mod dispatch;
pub mod json;
