#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod admin;
pub mod agents;
pub mod artifacts;
pub mod events;
pub mod functions;
pub mod impact;
pub mod profiles;
pub mod queue_processor;
pub mod rewards;
pub mod squads;
