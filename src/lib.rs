// Library target exists for the integration tests, which drive the app
// against a scripted backend instead of a live server.
// The binary entry point is main.rs; this file re-declares the module tree
// so tests can import types via `clefdr::app::*` / `clefdr::session::*`.

pub mod api;
pub mod app;
pub mod config;
pub mod event;
pub mod notation;
pub mod session;
pub mod store;
pub mod ui;
