//! Flutter-facing bindings for the shoplist core.

pub mod api;
