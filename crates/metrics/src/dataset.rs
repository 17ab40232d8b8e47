use core_types::{Address, Customer, LineItem, Order, Payment, Refund};
use std::collections::{HashMap, HashSet};

/// An immutable snapshot of the full order dataset at computation time.
///
/// The repository assembles one of these from independent full-table scans;
/// the calculators only ever borrow it. A snapshot is internally consistent:
/// every child row references an order in `orders`.
#[derive(Debug, Clone, Default)]
pub struct OrderDataset {
    pub orders: Vec<Order>,
    pub line_items: Vec<LineItem>,
    pub payments: Vec<Payment>,
    pub refunds: Vec<Refund>,
    pub addresses: Vec<Address>,
    pub customers: Vec<Customer>,
}

impl OrderDataset {
    /// Whether a line-item title names a shipping charge rather than a
    /// product. Case-insensitive substring match, mirroring how the shop
    /// labels protection/insurance lines ("Shipping Protection" etc.).
    pub fn is_shipping_title(title: &str) -> bool {
        title.to_lowercase().contains("shipping")
    }

    /// Line items that participate in product-level analyses: title present,
    /// non-empty, and not a shipping line. Yields the item together with its
    /// title so callers can group without re-unwrapping.
    pub fn product_items(&self) -> impl Iterator<Item = (&LineItem, &str)> {
        self.line_items.iter().filter_map(|item| {
            let title = item.title.as_deref()?;
            if title.is_empty() || Self::is_shipping_title(title) {
                None
            } else {
                Some((item, title))
            }
        })
    }

    /// Product-eligible line items grouped per order.
    pub fn product_items_by_order(&self) -> HashMap<i64, Vec<(&LineItem, &str)>> {
        let mut by_order: HashMap<i64, Vec<(&LineItem, &str)>> = HashMap::new();
        for (item, title) in self.product_items() {
            by_order.entry(item.order_id).or_default().push((item, title));
        }
        by_order
    }

    /// Ids of orders that carry at least one refund.
    pub fn refunded_order_ids(&self) -> HashSet<i64> {
        self.refunds.iter().map(|r| r.order_id).collect()
    }

    /// Ids of orders that carry a payment.
    pub fn paid_order_ids(&self) -> HashSet<i64> {
        self.payments.iter().map(|p| p.order_id).collect()
    }

    /// Orders indexed by id, for join-style lookups from child rows.
    pub fn orders_by_id(&self) -> HashMap<i64, &Order> {
        self.orders.iter().map(|o| (o.id, o)).collect()
    }

    /// Customers indexed by id.
    pub fn customers_by_id(&self) -> HashMap<i64, &Customer> {
        self.customers.iter().map(|c| (c.id, c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_title_match_is_case_insensitive() {
        assert!(OrderDataset::is_shipping_title("Shipping Protection"));
        assert!(OrderDataset::is_shipping_title("FREE SHIPPING"));
        assert!(OrderDataset::is_shipping_title("priority shipping upgrade"));
        assert!(!OrderDataset::is_shipping_title("Ship In A Bottle"));
        assert!(!OrderDataset::is_shipping_title("Blue Shirt"));
    }
}
