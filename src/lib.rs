// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the interactive CLI.
//
// Module responsibilities:
// - `api`: HTTP interactions with the backend plus the mock-backed sheet
//   families, and the combined document fetch.
// - `mock`: in-memory store for test sheets and wrong-answer notes.
// - `model` / `date`: JSON shapes and the creation-date parsing chain.
// - `library`: list state (filters, bookmarks, saved selection).
// - `config`: environment and session-file configuration.
// - `ui`: terminal flows that tie the above together.
pub mod api;
pub mod config;
pub mod date;
pub mod error;
pub mod library;
pub mod mock;
pub mod model;
pub mod ui;
