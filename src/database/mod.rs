//! # Database Operations
//!
//! Connection pooling and tenant schema discovery.
//!
//! ## Key Components
//!
//! - [`connection`] - Database connection management and pooling
//! - [`schema`] - Tenant schema naming and capability discovery
//!
//! Tenant data lives in per-tenant PostgreSQL schemas that this crate does
//! not own or migrate. Schemas differ in which optional tables and columns
//! they carry, so every query is built from capabilities discovered at
//! runtime via `information_schema` probes.

pub mod connection;
pub mod schema;

pub use connection::DatabaseConnection;
pub use schema::{quote_identifier, tenant_schema_name, SchemaCapabilities, VendorPath};
