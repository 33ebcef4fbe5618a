use super::{timestamp_column, DatasetStore};
use crate::{
    error::InsightResult,
    fulfillment::FulfillmentRecord,
    retention::CustomerOrder,
    revenue::{DatasetCounts, SaleItem},
    types::{title_case_snake, YearMonth},
};
use rusqlite::params;

#[derive(Debug, Clone, Default)]
pub struct OrderRow {
    pub order_id: String,
    pub customer_id: String,
    pub order_status: String,
    pub purchase_timestamp: Option<String>,
    pub approved_at: Option<String>,
    pub delivered_carrier_date: Option<String>,
    pub delivered_customer_date: Option<String>,
    pub estimated_delivery_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderItemRow {
    pub order_id: String,
    pub order_item_id: i64,
    pub product_id: String,
    pub seller_id: String,
    pub shipping_limit_date: Option<String>,
    pub price: f64,
    pub freight_value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerRow {
    pub customer_id: String,
    pub customer_unique_id: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SellerRow {
    pub seller_id: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

// Helper function for mapping joined fulfillment rows
fn fulfillment_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<FulfillmentRecord> {
    Ok(FulfillmentRecord {
        order_id: row.get(0)?,
        order_status: row.get(1)?,
        purchased_at: timestamp_column(row, 2, "order_purchase_timestamp")?,
        approved_at: timestamp_column(row, 3, "order_approved_at")?,
        delivered_carrier_at: timestamp_column(row, 4, "order_delivered_carrier_date")?,
        delivered_customer_at: timestamp_column(row, 5, "order_delivered_customer_date")?,
        estimated_delivery_at: timestamp_column(row, 6, "order_estimated_delivery_date")?,
        shipping_limit_at: timestamp_column(row, 7, "shipping_limit_date")?,
        customer_region: row.get(8)?,
        product_category: row
            .get::<_, Option<String>>(9)?
            .map(|c| title_case_snake(&c)),
    })
}

impl DatasetStore {
    // ── Orders ─────────────────────────────────────────────────────

    pub fn insert_order(&self, o: &OrderRow) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO orders (
                order_id, customer_id, order_status, order_purchase_timestamp,
                order_approved_at, order_delivered_carrier_date,
                order_delivered_customer_date, order_estimated_delivery_date
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &o.order_id,
                &o.customer_id,
                &o.order_status,
                o.purchase_timestamp.as_deref(),
                o.approved_at.as_deref(),
                o.delivered_carrier_date.as_deref(),
                o.delivered_customer_date.as_deref(),
                o.estimated_delivery_date.as_deref(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_order_item(&self, i: &OrderItemRow) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO order_items (
                order_id, order_item_id, product_id, seller_id,
                shipping_limit_date, price, freight_value
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &i.order_id,
                i.order_item_id,
                &i.product_id,
                &i.seller_id,
                i.shipping_limit_date.as_deref(),
                i.price,
                i.freight_value,
            ],
        )?;
        Ok(())
    }

    pub fn insert_product(&self, product_id: &str, category: Option<&str>) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO products (product_id, product_category_name) VALUES (?1, ?2)",
            params![product_id, category],
        )?;
        Ok(())
    }

    pub fn insert_category_translation(&self, native: &str, english: &str) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO category_translation (product_category_name, product_category_name_english)
             VALUES (?1, ?2)",
            params![native, english],
        )?;
        Ok(())
    }

    pub fn insert_customer(&self, c: &CustomerRow) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO customers (customer_id, customer_unique_id, customer_city, customer_state)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &c.customer_id,
                &c.customer_unique_id,
                c.city.as_deref(),
                c.state.as_deref(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_seller(&self, s: &SellerRow) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO sellers (seller_id, seller_city, seller_state) VALUES (?1, ?2, ?3)",
            params![&s.seller_id, s.city.as_deref(), s.state.as_deref()],
        )?;
        Ok(())
    }

    /// Orders joined with their items, product category (English name,
    /// Title Case) and customer state. One record per order item; orders
    /// without items yield one record with no shipping deadline.
    pub fn fulfillment_records(&self) -> InsightResult<Vec<FulfillmentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT o.order_id, o.order_status, o.order_purchase_timestamp,
                    o.order_approved_at, o.order_delivered_carrier_date,
                    o.order_delivered_customer_date, o.order_estimated_delivery_date,
                    i.shipping_limit_date, c.customer_state,
                    t.product_category_name_english
             FROM orders o
             LEFT JOIN order_items i          ON i.order_id = o.order_id
             LEFT JOIN products p             ON p.product_id = i.product_id
             LEFT JOIN category_translation t ON t.product_category_name = p.product_category_name
             LEFT JOIN customers c            ON c.customer_id = o.customer_id
             ORDER BY o.rowid ASC, i.order_item_id ASC",
        )?;
        let rows = stmt.query_map([], fulfillment_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// (customer, order) pairs for the new-vs-repeat mix.
    pub fn customer_orders(&self) -> InsightResult<Vec<CustomerOrder>> {
        let mut stmt = self
            .conn
            .prepare("SELECT customer_id, order_id FROM orders ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(CustomerOrder {
                customer_id: row.get(0)?,
                order_id: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Order items priced for revenue, with their order's purchase month and
    /// English category.
    pub fn sale_items(&self) -> InsightResult<Vec<SaleItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.order_id, o.order_purchase_timestamp,
                    t.product_category_name_english, i.price
             FROM order_items i
             LEFT JOIN orders o               ON o.order_id = i.order_id
             LEFT JOIN products p             ON p.product_id = i.product_id
             LEFT JOIN category_translation t ON t.product_category_name = p.product_category_name
             ORDER BY i.rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SaleItem {
                order_id: row.get(0)?,
                purchase_month: timestamp_column(row, 1, "order_purchase_timestamp")?
                    .map(|ts| YearMonth::of(&ts)),
                product_category: row
                    .get::<_, Option<String>>(2)?
                    .map(|c| title_case_snake(&c)),
                price: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn dataset_counts(&self) -> InsightResult<DatasetCounts> {
        let counts = self.conn.query_row(
            "SELECT (SELECT COUNT(DISTINCT customer_unique_id) FROM customers),
                    (SELECT COUNT(*) FROM orders),
                    (SELECT COUNT(*) FROM sellers),
                    (SELECT COUNT(*) FROM products)",
            [],
            |row| {
                Ok(DatasetCounts {
                    customers: row.get::<_, i64>(0)? as usize,
                    orders: row.get::<_, i64>(1)? as usize,
                    sellers: row.get::<_, i64>(2)? as usize,
                    products: row.get::<_, i64>(3)? as usize,
                })
            },
        )?;
        Ok(counts)
    }
}
