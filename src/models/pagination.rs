use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    models::comment::CommentTree,
    utils::pagination::{DEFAULT_LIMIT, MAX_LIMIT, current_page, total_pages},
};

/// Column the comment listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    CreatedAt,
    Id,
}

impl SortBy {
    /// Lenient parse: anything unknown falls back to `created_at`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("id") => SortBy::Id,
            _ => SortBy::CreatedAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "created_at",
            SortBy::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Lenient, case-insensitive parse: anything unknown falls back to `DESC`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("ASC") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Raw query string of `GET /v1/comments`.
///
/// Pagination fields are kept as strings so malformed values can be
/// defaulted instead of rejected.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GetCommentsQuery {
    /// Return this comment together with all of its replies.
    pub parent_id: Option<i64>,
    /// Full-text search over comment content (flat results).
    pub search: Option<String>,
    /// `created_at` (default) or `id`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default), case-insensitive.
    pub order: Option<String>,
    /// Page size in (0, 100], default 20.
    pub limit: Option<String>,
    /// Number of roots to skip, default 0.
    pub offset: Option<String>,
}

/// Normalized listing parameters. Always within bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCommentsParams {
    pub parent_id: Option<i64>,
    pub search: Option<String>,
    pub sort_by: SortBy,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

impl Default for GetCommentsParams {
    fn default() -> Self {
        Self {
            parent_id: None,
            search: None,
            sort_by: SortBy::default(),
            order: SortOrder::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl From<GetCommentsQuery> for GetCommentsParams {
    fn from(query: GetCommentsQuery) -> Self {
        let limit = query
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|limit| *limit > 0 && *limit <= MAX_LIMIT)
            .unwrap_or(DEFAULT_LIMIT);

        let offset = query
            .offset
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|offset| *offset >= 0)
            .unwrap_or(0);

        let search = query.search.filter(|s| !s.is_empty());

        Self {
            parent_id: query.parent_id,
            search,
            sort_by: SortBy::parse_lenient(query.sort_by.as_deref()),
            order: SortOrder::parse_lenient(query.order.as_deref()),
            limit,
            offset,
        }
    }
}

/// One page of comments plus the pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CommentPage {
    pub comments: Vec<CommentTree>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    /// 1-indexed current page.
    pub page: i64,
    pub pages: i64,
}

impl CommentPage {
    pub fn new(comments: Vec<CommentTree>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            comments,
            total,
            limit,
            offset,
            page: current_page(offset, limit),
            pages: total_pages(total, limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: &str, offset: &str, sort_by: &str, order: &str) -> GetCommentsQuery {
        GetCommentsQuery {
            limit: Some(limit.to_string()),
            offset: Some(offset.to_string()),
            sort_by: Some(sort_by.to_string()),
            order: Some(order.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_query_uses_defaults() {
        let params = GetCommentsParams::from(GetCommentsQuery::default());
        assert_eq!(params, GetCommentsParams::default());
        assert_eq!(params.limit, 20);
        assert_eq!(params.sort_by, SortBy::CreatedAt);
        assert_eq!(params.order, SortOrder::Desc);
    }

    #[test]
    fn out_of_range_values_are_defaulted() {
        for bad_limit in ["0", "-5", "101", "abc", ""] {
            let params = GetCommentsParams::from(query(bad_limit, "0", "id", "asc"));
            assert_eq!(params.limit, DEFAULT_LIMIT, "limit {:?}", bad_limit);
        }

        let params = GetCommentsParams::from(query("100", "-1", "name", "sideways"));
        assert_eq!(params.limit, 100);
        assert_eq!(params.offset, 0);
        assert_eq!(params.sort_by, SortBy::CreatedAt);
        assert_eq!(params.order, SortOrder::Desc);
    }

    #[test]
    fn order_is_case_insensitive() {
        let params = GetCommentsParams::from(query("10", "30", "id", "aSc"));
        assert_eq!(params.order, SortOrder::Asc);
        assert_eq!(params.sort_by, SortBy::Id);
        assert_eq!(params.offset, 30);
        assert_eq!(params.order.keyword(), "ASC");
    }

    #[test]
    fn only_an_empty_search_is_no_search() {
        let params = GetCommentsParams::from(GetCommentsQuery {
            search: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(params.search, None);

        let params = GetCommentsParams::from(GetCommentsQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        });
        assert_eq!(params.search.as_deref(), Some("   "));
    }

    #[test]
    fn largest_offset_still_yields_a_page_number() {
        let params = GetCommentsParams::from(query("1", &i64::MAX.to_string(), "id", "asc"));
        assert_eq!(params.offset, i64::MAX);

        let page = CommentPage::new(Vec::new(), 5, params.limit, params.offset);
        assert_eq!(page.page, i64::MAX);
        assert_eq!(page.pages, 5);
    }

    #[test]
    fn page_metadata_is_derived_from_total_limit_offset() {
        let page = CommentPage::new(Vec::new(), 45, 20, 40);
        assert_eq!(page.page, 3);
        assert_eq!(page.pages, 3);

        let empty = CommentPage::new(Vec::new(), 0, 20, 0);
        assert_eq!(empty.pages, 0);
        assert_eq!(empty.page, 1);
    }
}
