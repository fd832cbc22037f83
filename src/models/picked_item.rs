//! Picked order items queried from tenant schemas
//!
//! Queries are assembled from a fixed set of templates selected by the
//! discovered [`SchemaCapabilities`](crate::database::schema::SchemaCapabilities),
//! never from per-request string concatenation. The schema name is the
//! only interpolated fragment and it passes through [`quote_identifier`];
//! tenant, vendor, and order ids are always bound parameters.

use crate::database::schema::{quote_identifier, VendorPath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// One picked item in an order, with its resolved zone label
///
/// Ids are cast to text in SQL because tenant schemas disagree on the
/// underlying column types (bigint, uuid, and text all occur).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PickedItem {
    pub item_id: String,
    pub picked_at: DateTime<Utc>,
    pub product_id: String,
    pub zone_slug: String,
}

/// Vendor filter via the `vendor_products` association table
const VENDOR_JOIN_ASSOCIATION: &str = r#"
INNER JOIN {schema}.vendor_products vp
    ON vp.product_id = oi.product_id
    AND vp.vendor_id::text = $2
    AND vp.tenant_id = oi.tenant_id"#;

/// Vendor filter via the `products.vendor_id` column
const VENDOR_FILTER_DIRECT: &str = "AND p.vendor_id::text = $2";

/// Zone resolution through categories into zones
const ZONE_SELECT_RESOLVED: &str = "COALESCE(z.slug, 'unassigned') AS zone_slug";
const ZONE_JOIN_RESOLVED: &str = r#"
LEFT JOIN {schema}.categories c ON c.id = p.category_id
LEFT JOIN {schema}.zones z ON z.id = c.zone_id"#;

/// Constant zone label when the schema carries no zone layout
const ZONE_SELECT_CONSTANT: &str = "'default' AS zone_slug";

/// Build the picked-items query for one capability combination
///
/// Bind order is fixed across all templates: `$1` tenant id, `$2` vendor
/// record id, `$3` order id.
pub fn picked_items_query(schema_name: &str, vendor_path: VendorPath, zones_resolvable: bool) -> String {
    let schema = quote_identifier(schema_name);

    let zone_select = if zones_resolvable {
        ZONE_SELECT_RESOLVED
    } else {
        ZONE_SELECT_CONSTANT
    };
    let zone_join = if zones_resolvable {
        ZONE_JOIN_RESOLVED.replace("{schema}", &schema)
    } else {
        String::new()
    };
    let (vendor_join, vendor_filter) = match vendor_path {
        VendorPath::AssociationTable => (VENDOR_JOIN_ASSOCIATION.replace("{schema}", &schema), ""),
        VendorPath::DirectColumn => (String::new(), VENDOR_FILTER_DIRECT),
    };

    format!(
        r#"
SELECT
    oi.id::text AS item_id,
    oi.picked_at,
    p.id::text AS product_id,
    {zone_select}
FROM {schema}.order_items oi
INNER JOIN {schema}.products p ON p.id = oi.product_id{vendor_join}{zone_join}
WHERE oi.order_id::text = $3
    AND oi.tenant_id::text = $1
    AND oi.picked_at IS NOT NULL
    {vendor_filter}
ORDER BY oi.picked_at ASC
"#
    )
}

impl PickedItem {
    /// Fetch the picked items for one vendor's slice of an order,
    /// ordered by pick timestamp
    pub async fn in_pick_order(
        pool: &PgPool,
        schema_name: &str,
        vendor_path: VendorPath,
        zones_resolvable: bool,
        tenant_id: &str,
        vendor_record_id: &str,
        order_id: &str,
    ) -> Result<Vec<PickedItem>, sqlx::Error> {
        let sql = picked_items_query(schema_name, vendor_path, zones_resolvable);

        sqlx::query_as::<_, PickedItem>(&sql)
            .bind(tenant_id)
            .bind(vendor_record_id)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_template_joins_vendor_products() {
        let sql = picked_items_query("tenant_acme", VendorPath::AssociationTable, true);

        assert!(sql.contains("INNER JOIN tenant_acme.vendor_products vp"));
        assert!(sql.contains("vp.vendor_id::text = $2"));
        assert!(!sql.contains("p.vendor_id"));
    }

    #[test]
    fn test_direct_template_filters_on_products_column() {
        let sql = picked_items_query("tenant_acme", VendorPath::DirectColumn, true);

        assert!(sql.contains("AND p.vendor_id::text = $2"));
        assert!(!sql.contains("vendor_products"));
    }

    #[test]
    fn test_resolved_zone_template_coalesces_to_unassigned() {
        let sql = picked_items_query("tenant_acme", VendorPath::AssociationTable, true);

        let fallback = format!(
            "COALESCE(z.slug, '{}') AS zone_slug",
            crate::constants::schema::UNASSIGNED_ZONE
        );
        assert!(sql.contains(&fallback));
        assert!(sql.contains("LEFT JOIN tenant_acme.categories c ON c.id = p.category_id"));
        assert!(sql.contains("LEFT JOIN tenant_acme.zones z ON z.id = c.zone_id"));
    }

    #[test]
    fn test_constant_zone_template_uses_default_label() {
        let sql = picked_items_query("tenant_acme", VendorPath::DirectColumn, false);

        let label = format!(
            "'{}' AS zone_slug",
            crate::constants::schema::DEFAULT_ZONE
        );
        assert!(sql.contains(&label));
        assert!(!sql.contains("LEFT JOIN"));
        assert!(!sql.contains("zones"));
    }

    #[test]
    fn test_all_templates_order_by_pick_timestamp() {
        for vendor_path in [VendorPath::AssociationTable, VendorPath::DirectColumn] {
            for zones_resolvable in [true, false] {
                let sql = picked_items_query("tenant_acme", vendor_path, zones_resolvable);
                assert!(sql.contains("ORDER BY oi.picked_at ASC"));
                assert!(sql.contains("oi.picked_at IS NOT NULL"));
                assert!(sql.contains("oi.order_id::text = $3"));
                assert!(sql.contains("oi.tenant_id::text = $1"));
            }
        }
    }

    #[test]
    fn test_schema_name_is_quoted_when_needed() {
        let sql = picked_items_query("tenant_Acme", VendorPath::AssociationTable, true);

        assert!(sql.contains("FROM \"tenant_Acme\".order_items oi"));
        assert!(sql.contains("INNER JOIN \"tenant_Acme\".products p"));
        assert!(sql.contains("INNER JOIN \"tenant_Acme\".vendor_products vp"));
        assert!(sql.contains("LEFT JOIN \"tenant_Acme\".zones z"));
    }
}
