use crate::DbError;
use crate::listing::OrderListFilter;
use crate::records::NewOrderRecord;
use chrono::{DateTime, Utc};
use core_types::{Address, AddressType, Customer, Fulfillment, LineItem, Order, Payment, Refund};
use metrics::OrderDataset;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgRow, Postgres};
use sqlx::{QueryBuilder, Row};
use std::str::FromStr;

/// The `OrderRepository` provides a high-level, application-specific
/// interface to the database. It encapsulates all SQL queries and data
/// access logic for the order dataset.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

/// One row of the order listing: the order's display columns joined with its
/// customer's name and payment brand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,
    pub order_number: String,
    pub name: String,
    pub email: String,
    pub status_id: String,
    pub fulfillment_status: String,
    pub total_price: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub payment_method: Option<String>,
}

/// A page of the filtered order listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<OrderSummary>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Everything the order-details view needs, loaded in one round trip of
/// concurrent per-table queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: Order,
    pub customer: Option<Customer>,
    pub line_items: Vec<LineItem>,
    pub payment: Option<Payment>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub fulfillments: Vec<Fulfillment>,
    pub refunds: Vec<Refund>,
}

impl OrderRepository {
    /// Creates a new `OrderRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the full dataset snapshot the metrics engine consumes.
    ///
    /// The six per-entity scans are independent, so they run concurrently.
    /// The result is a consistent read of the tables at call time; the
    /// snapshot is owned and never written back.
    pub async fn load_dataset(&self) -> Result<OrderDataset, DbError> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders").fetch_all(&self.pool);
        let line_items = sqlx::query_as::<_, LineItem>("SELECT * FROM order_line_items")
            .fetch_all(&self.pool);
        let payments =
            sqlx::query_as::<_, Payment>("SELECT * FROM order_payments").fetch_all(&self.pool);
        let refunds =
            sqlx::query_as::<_, Refund>("SELECT * FROM order_refunds").fetch_all(&self.pool);
        let addresses = sqlx::query("SELECT * FROM order_addresses")
            .try_map(map_address_row)
            .fetch_all(&self.pool);
        let customers =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers").fetch_all(&self.pool);

        let (orders, line_items, payments, refunds, addresses, customers) =
            tokio::join!(orders, line_items, payments, refunds, addresses, customers);

        let dataset = OrderDataset {
            orders: orders?,
            line_items: line_items?,
            payments: payments?,
            refunds: refunds?,
            addresses: addresses?,
            customers: customers?,
        };

        tracing::debug!(
            orders = dataset.orders.len(),
            line_items = dataset.line_items.len(),
            "Loaded order dataset snapshot."
        );

        Ok(dataset)
    }

    /// Fetches one page of the order listing for the given sanitized filter.
    pub async fn list_orders(&self, filter: &OrderListFilter) -> Result<OrderPage, DbError> {
        let mut count_query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) \
             FROM orders o \
             LEFT JOIN customers c ON c.id = o.customer_id \
             LEFT JOIN order_payments p ON p.order_id = o.id",
        );
        push_list_filters(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar().fetch_one(&self.pool).await?;

        let mut list_query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT o.id, o.order_number, o.name, o.email, o.status_id, \
                    o.fulfillment_status, o.total_price, o.currency, o.created_at, \
                    c.first_name, c.last_name, p.cc_brand \
             FROM orders o \
             LEFT JOIN customers c ON c.id = o.customer_id \
             LEFT JOIN order_payments p ON p.order_id = o.id",
        );
        push_list_filters(&mut list_query, filter);
        // Sort column and direction come from the whitelist enums, never from
        // raw request input.
        list_query
            .push(" ORDER BY ")
            .push(filter.sort.as_column())
            .push(" ")
            .push(filter.direction.as_sql())
            .push(" LIMIT ")
            .push_bind(i64::from(filter.per_page))
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let orders = list_query
            .build()
            .try_map(|row: PgRow| {
                let first_name: Option<String> = row.try_get("first_name")?;
                let last_name: Option<String> = row.try_get("last_name")?;
                let customer_name = first_name
                    .map(|first| match last_name {
                        Some(last) => format!("{first} {last}"),
                        None => first,
                    });
                Ok(OrderSummary {
                    id: row.try_get("id")?,
                    order_number: row.try_get("order_number")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    status_id: row.try_get("status_id")?,
                    fulfillment_status: row.try_get("fulfillment_status")?,
                    total_price: row.try_get("total_price")?,
                    currency: row.try_get("currency")?,
                    created_at: row.try_get("created_at")?,
                    customer_name,
                    payment_method: row.try_get("cc_brand")?,
                })
            })
            .fetch_all(&self.pool)
            .await?;

        let total_pages = if total == 0 {
            0
        } else {
            ((total as u64).div_ceil(u64::from(filter.per_page))) as u32
        };

        Ok(OrderPage {
            orders,
            total,
            page: filter.page,
            per_page: filter.per_page,
            total_pages,
        })
    }

    /// Fetches the full details of one order, or `NotFound`.
    pub async fn order_details(&self, order_id: i64) -> Result<OrderDetails, DbError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)?;

        let line_items = sqlx::query_as::<_, LineItem>(
            "SELECT * FROM order_line_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool);
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM order_payments WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool);
        let addresses = sqlx::query("SELECT * FROM order_addresses WHERE order_id = $1 ORDER BY id")
            .bind(order_id)
            .try_map(map_address_row)
            .fetch_all(&self.pool);
        let fulfillments = sqlx::query_as::<_, Fulfillment>(
            "SELECT * FROM order_fulfillments WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool);
        let refunds =
            sqlx::query_as::<_, Refund>("SELECT * FROM order_refunds WHERE order_id = $1 ORDER BY id")
                .bind(order_id)
                .fetch_all(&self.pool);

        let (line_items, payment, addresses, fulfillments, refunds) =
            tokio::join!(line_items, payment, addresses, fulfillments, refunds);

        let customer = match order.customer_id {
            Some(customer_id) => {
                sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
                    .bind(customer_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let mut billing_address = None;
        let mut shipping_address = None;
        for address in addresses? {
            match address.address_type {
                AddressType::Billing if billing_address.is_none() => {
                    billing_address = Some(address)
                }
                AddressType::Shipping if shipping_address.is_none() => {
                    shipping_address = Some(address)
                }
                _ => {}
            }
        }

        Ok(OrderDetails {
            order,
            customer,
            line_items: line_items?,
            payment: payment?,
            billing_address,
            shipping_address,
            fulfillments: fulfillments?,
            refunds: refunds?,
        })
    }

    /// The distinct order statuses present in the data, for filter dropdowns.
    pub async fn distinct_statuses(&self) -> Result<Vec<String>, DbError> {
        let statuses = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT status_id FROM orders ORDER BY status_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(statuses)
    }

    /// The distinct card brands present in the data, for filter dropdowns.
    pub async fn distinct_payment_methods(&self) -> Result<Vec<String>, DbError> {
        let methods = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT cc_brand FROM order_payments \
             WHERE cc_brand IS NOT NULL AND cc_brand != '' ORDER BY cc_brand",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(methods)
    }

    /// Persists one imported order and all of its child rows atomically.
    ///
    /// Customer and order are upserted by external id; child rows are
    /// replaced wholesale so the local copy always mirrors the latest
    /// payload. An order already persisted as `Cancelled` keeps its
    /// cancellation fields regardless of what the remote now reports.
    pub async fn save_imported_order(&self, record: &NewOrderRecord) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let customer_id: i64 = sqlx::query(
            r#"
            INSERT INTO customers (external_id, email, first_name, last_name, phone, accepts_marketing)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (external_id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = EXCLUDED.phone,
                accepts_marketing = EXCLUDED.accepts_marketing,
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(record.customer.external_id)
        .bind(&record.customer.email)
        .bind(&record.customer.first_name)
        .bind(&record.customer.last_name)
        .bind(&record.customer.phone)
        .bind(record.customer.accepts_marketing)
        .fetch_one(&mut *tx)
        .await?
        .get("id");

        let existing = sqlx::query(
            "SELECT status_id, cancel_reason, cancelled_at FROM orders WHERE external_id = $1",
        )
        .bind(record.order.external_id)
        .fetch_optional(&mut *tx)
        .await?;

        let order = &record.order;
        let (status_id, cancel_reason, cancelled_at) = match existing {
            Some(row) if row.get::<String, _>("status_id") == "Cancelled" => (
                "Cancelled".to_string(),
                row.get::<Option<String>, _>("cancel_reason"),
                row.get::<Option<DateTime<Utc>>, _>("cancelled_at"),
            ),
            _ => (
                order.status_id.clone(),
                order.cancel_reason.clone(),
                order.cancelled_at,
            ),
        };

        let order_id: i64 = sqlx::query(
            r#"
            INSERT INTO orders (
                external_id, order_number, name, customer_id, email, phone,
                status_id, financial_status, fulfillment_status,
                currency, currency_symbol, presentment_currency, local_currency_amount,
                total_price, subtotal_price, current_total_price,
                total_discounts, total_tax, total_shipping,
                cancel_reason, cancelled_at, note, source_name,
                processed_at, closed_at, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27
            )
            ON CONFLICT (external_id) DO UPDATE SET
                order_number = EXCLUDED.order_number,
                name = EXCLUDED.name,
                customer_id = EXCLUDED.customer_id,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                status_id = EXCLUDED.status_id,
                financial_status = EXCLUDED.financial_status,
                fulfillment_status = EXCLUDED.fulfillment_status,
                currency = EXCLUDED.currency,
                currency_symbol = EXCLUDED.currency_symbol,
                presentment_currency = EXCLUDED.presentment_currency,
                local_currency_amount = EXCLUDED.local_currency_amount,
                total_price = EXCLUDED.total_price,
                subtotal_price = EXCLUDED.subtotal_price,
                current_total_price = EXCLUDED.current_total_price,
                total_discounts = EXCLUDED.total_discounts,
                total_tax = EXCLUDED.total_tax,
                total_shipping = EXCLUDED.total_shipping,
                cancel_reason = EXCLUDED.cancel_reason,
                cancelled_at = EXCLUDED.cancelled_at,
                note = EXCLUDED.note,
                source_name = EXCLUDED.source_name,
                processed_at = EXCLUDED.processed_at,
                closed_at = EXCLUDED.closed_at,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            RETURNING id
            "#,
        )
        .bind(order.external_id)
        .bind(&order.order_number)
        .bind(&order.name)
        .bind(customer_id)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(&status_id)
        .bind(order.financial_status)
        .bind(&order.fulfillment_status)
        .bind(&order.currency)
        .bind(&order.currency_symbol)
        .bind(&order.presentment_currency)
        .bind(order.local_currency_amount)
        .bind(order.total_price)
        .bind(order.subtotal_price)
        .bind(order.current_total_price)
        .bind(order.total_discounts)
        .bind(order.total_tax)
        .bind(order.total_shipping)
        .bind(&cancel_reason)
        .bind(cancelled_at)
        .bind(&order.note)
        .bind(&order.source_name)
        .bind(order.processed_at)
        .bind(order.closed_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&mut *tx)
        .await?
        .get("id");

        sqlx::query("DELETE FROM order_line_items WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        for item in &record.line_items {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (
                    order_id, external_id, title, name, sku, price, quantity,
                    variant_title, product_main_image, product_id, variant_id,
                    requires_shipping, is_refunded, refunded_quantity, total_discount
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                "#,
            )
            .bind(order_id)
            .bind(item.external_id)
            .bind(&item.title)
            .bind(&item.name)
            .bind(&item.sku)
            .bind(item.price)
            .bind(item.quantity)
            .bind(&item.variant_title)
            .bind(&item.product_main_image)
            .bind(item.product_id)
            .bind(item.variant_id)
            .bind(item.requires_shipping)
            .bind(item.is_refunded)
            .bind(item.refunded_quantity)
            .bind(item.total_discount)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(payment) = &record.payment {
            sqlx::query(
                r#"
                INSERT INTO order_payments (
                    order_id, external_id, gateway, type, status_id, amount,
                    cc_brand, cc_last_four, cc_name
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (order_id) DO UPDATE SET
                    external_id = EXCLUDED.external_id,
                    gateway = EXCLUDED.gateway,
                    type = EXCLUDED.type,
                    status_id = EXCLUDED.status_id,
                    amount = EXCLUDED.amount,
                    cc_brand = EXCLUDED.cc_brand,
                    cc_last_four = EXCLUDED.cc_last_four,
                    cc_name = EXCLUDED.cc_name,
                    updated_at = NOW()
                "#,
            )
            .bind(order_id)
            .bind(payment.external_id)
            .bind(&payment.gateway)
            .bind(&payment.payment_type)
            .bind(payment.status_id)
            .bind(payment.amount)
            .bind(&payment.cc_brand)
            .bind(&payment.cc_last_four)
            .bind(&payment.cc_name)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM order_addresses WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        for address in &record.addresses {
            sqlx::query(
                r#"
                INSERT INTO order_addresses (
                    order_id, type, first_name, last_name, address1, address2,
                    city, province, province_code, zip, country, country_code,
                    company, phone
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(order_id)
            .bind(address.address_type.as_str())
            .bind(&address.first_name)
            .bind(&address.last_name)
            .bind(&address.address1)
            .bind(&address.address2)
            .bind(&address.city)
            .bind(&address.province)
            .bind(&address.province_code)
            .bind(&address.zip)
            .bind(&address.country)
            .bind(&address.country_code)
            .bind(&address.company)
            .bind(&address.phone)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM order_fulfillments WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        for fulfillment in &record.fulfillments {
            sqlx::query(
                r#"
                INSERT INTO order_fulfillments (
                    order_id, external_id, tracking_company, tracking_number,
                    tracking_url, status, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(order_id)
            .bind(fulfillment.external_id)
            .bind(&fulfillment.tracking_company)
            .bind(&fulfillment.tracking_number)
            .bind(&fulfillment.tracking_url)
            .bind(fulfillment.status)
            .bind(fulfillment.created_at)
            .bind(fulfillment.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM order_refunds WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        for refund in &record.refunds {
            sqlx::query(
                r#"
                INSERT INTO order_refunds (
                    order_id, external_id, note, total_amount, status_id, refunded_at
                ) VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id)
            .bind(refund.external_id)
            .bind(&refund.note)
            .bind(refund.total_amount)
            .bind(refund.status_id)
            .bind(refund.refunded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Maps an `order_addresses` row, decoding the `type` column into the typed
/// enum. Invalid discriminants surface as a column decode error.
fn map_address_row(row: PgRow) -> Result<Address, sqlx::Error> {
    let type_str: String = row.try_get("type")?;
    let address_type = AddressType::from_str(&type_str).map_err(|e| sqlx::Error::ColumnDecode {
        index: "type".to_string(),
        source: Box::new(e),
    })?;

    Ok(Address {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        address_type,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        address1: row.try_get("address1")?,
        address2: row.try_get("address2")?,
        city: row.try_get("city")?,
        province: row.try_get("province")?,
        province_code: row.try_get("province_code")?,
        zip: row.try_get("zip")?,
        country: row.try_get("country")?,
        country_code: row.try_get("country_code")?,
        company: row.try_get("company")?,
        phone: row.try_get("phone")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Appends the listing filter's WHERE clauses. Shared by the count and page
/// queries so their predicates can never drift apart.
fn push_list_filters<'args>(
    query: &mut QueryBuilder<'args, Postgres>,
    filter: &'args OrderListFilter,
) {
    query.push(" WHERE 1 = 1");

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.trim());
        query
            .push(" AND (o.order_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR o.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR o.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.last_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = &filter.status {
        query.push(" AND o.status_id = ").push_bind(status);
    }
    if let Some(date_from) = filter.date_from {
        query.push(" AND o.created_at::date >= ").push_bind(date_from);
    }
    if let Some(date_to) = filter.date_to {
        query.push(" AND o.created_at::date <= ").push_bind(date_to);
    }
    if let Some(payment_method) = &filter.payment_method {
        query.push(" AND p.cc_brand = ").push_bind(payment_method);
    }
}
