//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business
//! operations and orchestrate interactions between the API boundary and
//! the persistence layer.

pub mod user_service;
