//! Application layer containing the request orchestration.
//!
//! This module defines the `Dispatcher`, the single entry point through which
//! requests reach the ledger, registry and ballot engines. It serializes all
//! mutations behind one lock and forwards committed events to the sink.

pub mod dispatcher;
