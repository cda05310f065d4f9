pub mod controller;
pub mod engine;
pub mod event;
pub mod snapshot;
