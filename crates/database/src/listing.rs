use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// Sortable columns for the order listing. Anything outside this whitelist
/// falls back to `CreatedAt` instead of reaching the SQL layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    OrderNumber,
    Name,
    StatusId,
    TotalPrice,
}

impl SortField {
    pub fn parse(value: &str) -> Self {
        match value {
            "order_number" => SortField::OrderNumber,
            "name" => SortField::Name,
            "status_id" => SortField::StatusId,
            "total_price" => SortField::TotalPrice,
            _ => SortField::CreatedAt,
        }
    }

    /// The column name as it appears in the listing query.
    pub fn as_column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "o.created_at",
            SortField::OrderNumber => "o.order_number",
            SortField::Name => "o.name",
            SortField::StatusId => "o.status_id",
            SortField::TotalPrice => "o.total_price",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::OrderNumber => "order_number",
            SortField::Name => "name",
            SortField::StatusId => "status_id",
            SortField::TotalPrice => "total_price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Anything other than an explicit "asc" sorts descending.
    pub fn parse(value: &str) -> Self {
        if value == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// The sanitized filter set for the order listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub sort: SortField,
    pub direction: SortDirection,
    pub page: u32,
    pub per_page: u32,
}

impl OrderListFilter {
    /// Clamps pagination to sane bounds: page >= 1, per_page in
    /// [1, MAX_PER_PAGE] with the default applied when unset.
    pub fn sanitized(mut self) -> Self {
        if self.page == 0 {
            self.page = 1;
        }
        if self.per_page == 0 {
            self.per_page = DEFAULT_PER_PAGE;
        }
        self.per_page = self.per_page.min(MAX_PER_PAGE);
        self.search = self.search.filter(|s| !s.trim().is_empty());
        self.status = self.status.filter(|s| !s.is_empty());
        self.payment_method = self.payment_method.filter(|s| !s.is_empty());
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_falls_back_to_created_at() {
        assert_eq!(SortField::parse("total_price"), SortField::TotalPrice);
        assert_eq!(SortField::parse("created_at"), SortField::CreatedAt);
        assert_eq!(SortField::parse("email; DROP TABLE orders"), SortField::CreatedAt);
        assert_eq!(SortField::parse(""), SortField::CreatedAt);
    }

    #[test]
    fn direction_defaults_to_desc() {
        assert_eq!(SortDirection::parse("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Desc);
    }

    #[test]
    fn sanitized_clamps_pagination_and_drops_blank_filters() {
        let filter = OrderListFilter {
            search: Some("   ".to_string()),
            status: Some(String::new()),
            per_page: 10_000,
            page: 0,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(filter.page, 1);
        assert_eq!(filter.per_page, MAX_PER_PAGE);
        assert_eq!(filter.search, None);
        assert_eq!(filter.status, None);
        assert_eq!(filter.offset(), 0);

        let defaults = OrderListFilter::default().sanitized();
        assert_eq!(defaults.per_page, DEFAULT_PER_PAGE);
        assert_eq!(defaults.sort, SortField::CreatedAt);
        assert_eq!(defaults.direction, SortDirection::Desc);
    }

    #[test]
    fn offset_advances_by_page() {
        let filter = OrderListFilter {
            page: 3,
            per_page: 10,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(filter.offset(), 20);
    }
}
