//! Domain layer: the three engines, the types they share, and the ports
//! through which the outside world plugs into them.

pub mod ballot;
pub mod event;
pub mod identity;
pub mod ledger;
pub mod ports;
pub mod registry;
pub mod request;
pub mod snapshot;
