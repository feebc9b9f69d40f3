//! Consolidated test modules.
//!
//! End-to-end permission scenarios run against the user fixtures in
//! `tests/fixtures/users`, going through the same normalization path as
//! external data.
