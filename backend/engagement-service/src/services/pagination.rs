//! Shared pagination and sort policy.
//!
//! Every list-producing operation resolves its raw page/sort parameters
//! through this policy: pages clamp to >= 1, limits clamp to the configured
//! maximum, and sort fields must come from the view's allow-list. Unknown
//! fields fail `InvalidArgument` instead of being interpolated or ignored.

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::error::{AppError, Result};
use crate::repository::{PageWindow, SortDirection, VideoSortField};

/// Raw page/sort parameters as received from the routing layer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

/// Per-view sort field allow-list
pub trait SortField: Sized + Copy {
    const DEFAULT: Self;

    fn parse(name: &str) -> Option<Self>;
}

impl SortField for VideoSortField {
    const DEFAULT: Self = VideoSortField::CreatedAt;

    fn parse(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(VideoSortField::CreatedAt),
            "view_count" | "views" => Some(VideoSortField::ViewCount),
            "duration_seconds" | "duration" => Some(VideoSortField::DurationSeconds),
            "title" => Some(VideoSortField::Title),
            _ => None,
        }
    }
}

/// Sort contract for views with a fixed recency ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencySort;

impl SortField for RecencySort {
    const DEFAULT: Self = RecencySort;

    fn parse(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(RecencySort),
            _ => None,
        }
    }
}

/// Validated page request
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPage<S> {
    pub page: u32,
    pub limit: u32,
    pub sort_by: S,
    pub sort_dir: SortDirection,
}

impl<S> ResolvedPage<S> {
    pub fn window(&self) -> PageWindow {
        PageWindow {
            limit: i64::from(self.limit),
            offset: i64::from(self.page - 1) * i64::from(self.limit),
        }
    }
}

/// Pagination limits resolved from configuration
#[derive(Debug, Clone)]
pub struct PaginationPolicy {
    default_limit: u32,
    max_limit: u32,
}

impl PaginationPolicy {
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            default_limit: config.default_limit.max(1),
            max_limit: config.max_limit.max(1),
        }
    }

    pub fn resolve<S: SortField>(&self, params: &PageParams) -> Result<ResolvedPage<S>> {
        let page = params.page.unwrap_or(1).max(1);
        let limit = params
            .limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit);

        let sort_by = match params.sort_by.as_deref() {
            Some(name) => S::parse(name)
                .ok_or_else(|| AppError::InvalidArgument(format!("unknown sort field: {name}")))?,
            None => S::DEFAULT,
        };

        let sort_dir = match params.sort_dir.as_deref().map(str::to_lowercase).as_deref() {
            Some("asc") => SortDirection::Asc,
            Some("desc") | None => SortDirection::Desc,
            Some(other) => {
                return Err(AppError::InvalidArgument(format!(
                    "unknown sort direction: {other}"
                )))
            }
        };

        Ok(ResolvedPage {
            page,
            limit,
            sort_by,
            sort_dir,
        })
    }
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self::new(&PaginationConfig::default())
    }
}

/// One page of a collection plus totals
///
/// A page past the end of the collection is an empty `items` list with
/// success status, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub page_count: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, resolved: &ResolvedPage<impl SortField>) -> Self {
        let limit = i64::from(resolved.limit);
        let page_count = if total <= 0 {
            0
        } else {
            ((total + limit - 1) / limit) as u32
        };

        Self {
            items,
            total,
            page: resolved.page,
            limit: resolved.limit,
            page_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PaginationPolicy {
        PaginationPolicy::new(&PaginationConfig {
            default_limit: 10,
            max_limit: 100,
        })
    }

    #[test]
    fn test_defaults() {
        let resolved: ResolvedPage<VideoSortField> = policy().resolve(&PageParams::default()).unwrap();
        assert_eq!(resolved.page, 1);
        assert_eq!(resolved.limit, 10);
        assert_eq!(resolved.sort_by, VideoSortField::CreatedAt);
        assert_eq!(resolved.sort_dir, SortDirection::Desc);
        assert_eq!(resolved.window().offset, 0);
    }

    #[test]
    fn test_page_and_limit_clamp() {
        let params = PageParams {
            page: Some(0),
            limit: Some(100_000),
            ..PageParams::default()
        };
        let resolved: ResolvedPage<VideoSortField> = policy().resolve(&params).unwrap();
        assert_eq!(resolved.page, 1);
        assert_eq!(resolved.limit, 100);
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let params = PageParams {
            sort_by: Some("owner_id; DROP TABLE videos".to_string()),
            ..PageParams::default()
        };
        let err = policy().resolve::<VideoSortField>(&params).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_sort_direction_is_rejected() {
        let params = PageParams {
            sort_dir: Some("sideways".to_string()),
            ..PageParams::default()
        };
        let err = policy().resolve::<VideoSortField>(&params).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_recency_sort_only_allows_created_at() {
        let params = PageParams {
            sort_by: Some("created_at".to_string()),
            sort_dir: Some("ASC".to_string()),
            ..PageParams::default()
        };
        let resolved: ResolvedPage<RecencySort> = policy().resolve(&params).unwrap();
        assert_eq!(resolved.sort_dir, SortDirection::Asc);

        let params = PageParams {
            sort_by: Some("view_count".to_string()),
            ..PageParams::default()
        };
        assert!(policy().resolve::<RecencySort>(&params).is_err());
    }

    #[test]
    fn test_window_offset() {
        let params = PageParams {
            page: Some(3),
            limit: Some(20),
            ..PageParams::default()
        };
        let resolved: ResolvedPage<VideoSortField> = policy().resolve(&params).unwrap();
        let window = resolved.window();
        assert_eq!(window.limit, 20);
        assert_eq!(window.offset, 40);
    }

    #[test]
    fn test_page_count_rounds_up() {
        let resolved: ResolvedPage<VideoSortField> = policy().resolve(&PageParams::default()).unwrap();
        let page = Page::new(vec![1, 2, 3], 23, &resolved);
        assert_eq!(page.page_count, 3);

        let empty: Page<i32> = Page::new(vec![], 0, &resolved);
        assert_eq!(empty.page_count, 0);
    }
}
