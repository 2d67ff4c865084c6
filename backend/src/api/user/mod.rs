//! Module for user management API endpoints.
//!
//! Administrative CRUD over user records: listing, lookup by id or email,
//! creation, partial updates, and deletion.

pub mod handlers;
pub mod routes;
