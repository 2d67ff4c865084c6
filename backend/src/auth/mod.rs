//! Authentication module for managing user accounts, sessions, and access control.
//!
//! This module provides the public interface for user authentication-related
//! functionalities such as login, registration, the password-recovery flow,
//! the session/CSRF cookie contract, and authorization middleware.

pub mod cookies;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
