//! Tenant schema naming and capability discovery
//!
//! Each tenant owns a PostgreSQL schema named `tenant_` plus the
//! normalized tenant id. Schemas are provisioned per tenant and drift
//! over time, so optional tables (`zones`, `vendor_products`) and
//! optional columns (`categories.zone_id`, `products.vendor_id`) may or
//! may not exist. `SchemaCapabilities` probes `information_schema` once
//! per job and the results select which query template runs.

use crate::constants::schema::TENANT_SCHEMA_PREFIX;
use sqlx::PgPool;
use tracing::debug;

const TABLE_EXISTS_SQL: &str = r#"
    SELECT EXISTS (
        SELECT 1 FROM information_schema.tables
        WHERE table_schema = $1 AND table_name = $2
    )
"#;

const COLUMN_EXISTS_SQL: &str = r#"
    SELECT EXISTS (
        SELECT 1 FROM information_schema.columns
        WHERE table_schema = $1 AND table_name = $2 AND column_name = $3
    )
"#;

/// Build the schema name for a tenant id
///
/// Any character outside `[a-zA-Z0-9]` becomes an underscore, so ids
/// arriving as UUIDs, slugs, or numeric strings all map to a stable name.
pub fn tenant_schema_name(tenant_id: &str) -> String {
    let normalized: String = tenant_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{TENANT_SCHEMA_PREFIX}{normalized}")
}

/// Quote a SQL identifier when it needs quoting
///
/// PostgreSQL folds unquoted identifiers to lowercase, so anything with
/// an uppercase letter or a hyphen must be double-quoted to match how
/// it was created. Embedded quotes are doubled.
pub fn quote_identifier(identifier: &str) -> String {
    let needs_quoting = identifier
        .chars()
        .any(|c| c == '-' || c.is_ascii_uppercase());

    if needs_quoting {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    } else {
        identifier.to_string()
    }
}

/// How a tenant schema links products to vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorPath {
    /// `vendor_products` association table joins products to vendors
    AssociationTable,
    /// `products.vendor_id` column references the vendor directly
    DirectColumn,
}

/// What a tenant schema supports, discovered at runtime
///
/// Discovery runs per learn job rather than being cached. Jobs are rare
/// relative to schema migrations, and stale capabilities would build
/// queries against tables that no longer exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaCapabilities {
    /// `zones` table exists
    pub has_zones: bool,
    /// `categories.zone_id` column exists (only probed when zones exist)
    pub has_category_zone_ref: bool,
    /// `vendor_products` association table exists
    pub has_vendor_products: bool,
    /// `products.vendor_id` column exists
    pub products_have_vendor_id: bool,
}

impl SchemaCapabilities {
    /// Probe `information_schema` for the given schema's capabilities
    ///
    /// `schema_name` is the raw (unquoted) name as stored in the catalog.
    pub async fn discover(pool: &PgPool, schema_name: &str) -> Result<Self, sqlx::Error> {
        let has_zones = table_exists(pool, schema_name, "zones").await?;
        let has_vendor_products = table_exists(pool, schema_name, "vendor_products").await?;
        let products_have_vendor_id =
            column_exists(pool, schema_name, "products", "vendor_id").await?;

        let has_category_zone_ref = if has_zones {
            column_exists(pool, schema_name, "categories", "zone_id").await?
        } else {
            false
        };

        let capabilities = Self {
            has_zones,
            has_category_zone_ref,
            has_vendor_products,
            products_have_vendor_id,
        };

        debug!(
            schema = schema_name,
            has_zones = capabilities.has_zones,
            has_category_zone_ref = capabilities.has_category_zone_ref,
            has_vendor_products = capabilities.has_vendor_products,
            products_have_vendor_id = capabilities.products_have_vendor_id,
            "Discovered tenant schema capabilities"
        );

        Ok(capabilities)
    }

    /// The join path from products to vendors, if any exists
    ///
    /// The association table wins when both paths are present.
    pub fn vendor_path(&self) -> Option<VendorPath> {
        if self.has_vendor_products {
            Some(VendorPath::AssociationTable)
        } else if self.products_have_vendor_id {
            Some(VendorPath::DirectColumn)
        } else {
            None
        }
    }

    /// Zone labels can be resolved through categories into zones
    pub fn zones_resolvable(&self) -> bool {
        self.has_zones && self.has_category_zone_ref
    }
}

async fn table_exists(pool: &PgPool, schema: &str, table: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(TABLE_EXISTS_SQL)
        .bind(schema)
        .bind(table)
        .fetch_one(pool)
        .await
}

async fn column_exists(
    pool: &PgPool,
    schema: &str,
    table: &str,
    column: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(COLUMN_EXISTS_SQL)
        .bind(schema)
        .bind(table)
        .bind(column)
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_schema_name_plain() {
        assert_eq!(tenant_schema_name("acme"), "tenant_acme");
        assert_eq!(tenant_schema_name("42"), "tenant_42");
    }

    #[test]
    fn test_tenant_schema_name_normalizes_special_chars() {
        assert_eq!(tenant_schema_name("acme-west"), "tenant_acme_west");
        assert_eq!(
            tenant_schema_name("9f8e7d6c-1a2b-3c4d"),
            "tenant_9f8e7d6c_1a2b_3c4d"
        );
        assert_eq!(tenant_schema_name("a b!c"), "tenant_a_b_c");
    }

    #[test]
    fn test_tenant_schema_name_preserves_case() {
        assert_eq!(tenant_schema_name("Acme"), "tenant_Acme");
    }

    #[test]
    fn test_quote_identifier_lowercase_unquoted() {
        assert_eq!(quote_identifier("tenant_acme"), "tenant_acme");
        assert_eq!(quote_identifier("order_items"), "order_items");
    }

    #[test]
    fn test_quote_identifier_uppercase_quoted() {
        assert_eq!(quote_identifier("tenant_Acme"), "\"tenant_Acme\"");
    }

    #[test]
    fn test_quote_identifier_hyphen_quoted() {
        assert_eq!(quote_identifier("my-schema"), "\"my-schema\"");
    }

    #[test]
    fn test_quote_identifier_escapes_embedded_quotes() {
        assert_eq!(quote_identifier("A\"B"), "\"A\"\"B\"");
    }

    #[test]
    fn test_vendor_path_prefers_association_table() {
        let caps = SchemaCapabilities {
            has_zones: false,
            has_category_zone_ref: false,
            has_vendor_products: true,
            products_have_vendor_id: true,
        };
        assert_eq!(caps.vendor_path(), Some(VendorPath::AssociationTable));
    }

    #[test]
    fn test_vendor_path_direct_column_fallback() {
        let caps = SchemaCapabilities {
            has_zones: false,
            has_category_zone_ref: false,
            has_vendor_products: false,
            products_have_vendor_id: true,
        };
        assert_eq!(caps.vendor_path(), Some(VendorPath::DirectColumn));
    }

    #[test]
    fn test_vendor_path_none_when_unlinked() {
        let caps = SchemaCapabilities {
            has_zones: true,
            has_category_zone_ref: true,
            has_vendor_products: false,
            products_have_vendor_id: false,
        };
        assert_eq!(caps.vendor_path(), None);
    }

    #[test]
    fn test_zones_resolvable_requires_both_flags() {
        let mut caps = SchemaCapabilities {
            has_zones: true,
            has_category_zone_ref: true,
            has_vendor_products: false,
            products_have_vendor_id: false,
        };
        assert!(caps.zones_resolvable());

        caps.has_category_zone_ref = false;
        assert!(!caps.zones_resolvable());

        caps.has_zones = false;
        caps.has_category_zone_ref = true;
        assert!(!caps.zones_resolvable());
    }

    #[tokio::test]
    async fn test_discover_against_provisioned_schema() {
        if std::env::var("TEST_DATABASE_URL").is_err() {
            println!("Skipping schema discovery test - no TEST_DATABASE_URL provided");
            return;
        }

        let database_url = std::env::var("TEST_DATABASE_URL").unwrap();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await
            .expect("Failed to connect");

        let schema = format!("test_caps_{}", uuid::Uuid::new_v4().simple());

        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&pool)
            .await
            .expect("Failed to create schema");
        sqlx::query(&format!(
            "CREATE TABLE {schema}.zones (id bigint PRIMARY KEY, slug text)"
        ))
        .execute(&pool)
        .await
        .expect("Failed to create zones");
        sqlx::query(&format!(
            "CREATE TABLE {schema}.categories (id bigint PRIMARY KEY, zone_id bigint)"
        ))
        .execute(&pool)
        .await
        .expect("Failed to create categories");
        sqlx::query(&format!(
            "CREATE TABLE {schema}.products (id bigint PRIMARY KEY, category_id bigint)"
        ))
        .execute(&pool)
        .await
        .expect("Failed to create products");

        let caps = SchemaCapabilities::discover(&pool, &schema)
            .await
            .expect("Discovery failed");

        assert!(caps.has_zones);
        assert!(caps.has_category_zone_ref);
        assert!(!caps.has_vendor_products);
        assert!(!caps.products_have_vendor_id);
        assert_eq!(caps.vendor_path(), None);
        assert!(caps.zones_resolvable());

        sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
            .execute(&pool)
            .await
            .expect("Failed to drop schema");
    }
}
