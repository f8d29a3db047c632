//! Integration and unit tests for the Leseliste application.
//!
//! This module organizes all test modules for the application, providing
//! comprehensive test coverage for different components and functionality.
//!
//! ## Test Modules
//!
//! - **api_tests**: CRUD and reading-progress endpoint tests
//! - **repository_tests**: Book repository and status-derivation tests
//! - **error_tests**: Error handling and validation tests
//! - **config_tests**: Configuration loading and validation tests
//! - **db_tests**: Database schema bootstrap tests
//! - **health_api_tests**: Health check endpoint tests
//!
//! ## Running Tests
//!
//! Tests can be run using:
//! ```bash
//! cargo test
//! ```
//!
//! Individual test modules can be run with:
//! ```bash
//! cargo test api_tests
//! cargo test repository_tests
//! # etc.
//! ```

pub mod api_tests;
