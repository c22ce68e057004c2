//! API endpoint integration tests
//!
//! Router-level tests run against in-memory auth fakes. Tests that need
//! Postgres are `#[ignore]`d; run them with `cargo test -- --ignored` and
//! `TEST_DATABASE_URL` pointing at a scratch database.

#![allow(dead_code)]

mod api_keys;
mod auth;
mod boards;
mod check_ins;
mod common;
