//! Domain model: players, tournaments, the operation log and the storage ports
//! the settlement engine is written against.

pub mod ledger;
pub mod player;
pub mod ports;
pub mod tournament;
