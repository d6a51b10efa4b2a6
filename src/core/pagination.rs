use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::ListError;

/// Raw paging parameters as supplied by a caller
///
/// A missing `size` falls back to the configured default page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PageParams {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub page: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub size: Option<i64>,
}

impl PageParams {
    pub const fn new(page: i64, size: i64) -> Self {
        Self {
            page,
            size: Some(size),
        }
    }

    /// Page `page` at the default size
    pub const fn page(page: i64) -> Self {
        Self { page, size: None }
    }
}

/// A validated zero-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub index: u32,
    pub size: u32,
}

impl PageRequest {
    pub const fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    /// Validate caller parameters
    ///
    /// A missing size becomes `default_size`; sizes are clamped to `max_size`.
    /// Indexes beyond `u32::MAX` saturate, which still yields an empty window.
    pub fn from_params(
        params: PageParams,
        default_size: u32,
        max_size: u32,
    ) -> Result<Self, ListError> {
        params.validate()?;

        let index = u32::try_from(params.page).unwrap_or(u32::MAX);
        let size = match params.size {
            Some(size) => u32::try_from(size).unwrap_or(u32::MAX),
            None => default_size,
        };

        Ok(Self {
            index,
            size: size.min(max_size),
        })
    }

    /// Number of records skipped before this page
    #[inline]
    pub fn offset(&self) -> u64 {
        u64::from(self.index) * u64::from(self.size)
    }

    #[inline]
    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Cut this page out of an already filtered and ordered sequence
    pub fn window<T, I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(offset)
            .take(self.size as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_index_times_size() {
        let page = PageRequest::new(3, 20);
        assert_eq!(page.offset(), 60);
        assert_eq!(page.limit(), 20);
    }

    #[test]
    fn test_negative_params_rejected() {
        let err = PageRequest::from_params(PageParams::new(-1, 20), 20, 100).unwrap_err();
        assert!(matches!(err, ListError::InputValidation(_)));

        let err = PageRequest::from_params(PageParams::new(0, -5), 20, 100).unwrap_err();
        assert!(matches!(err, ListError::InputValidation(_)));
    }

    #[test]
    fn test_size_clamped_to_max() {
        let page = PageRequest::from_params(PageParams::new(1, 500), 20, 100).unwrap();
        assert_eq!(page, PageRequest::new(1, 100));
    }

    #[test]
    fn test_zero_size_is_empty() {
        let page = PageRequest::from_params(PageParams::new(4, 0), 20, 100).unwrap();
        assert!(page.is_empty());
        assert!(page.window(0..10).is_empty());
    }

    #[test]
    fn test_window_past_end() {
        let items: Vec<i32> = (0..25).collect();
        assert_eq!(PageRequest::new(0, 20).window(items.clone()).len(), 20);
        assert_eq!(PageRequest::new(1, 20).window(items.clone()), (20..25).collect::<Vec<_>>());
        assert!(PageRequest::new(2, 20).window(items).is_empty());
    }

    #[test]
    fn test_default_params() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, PageParams::page(0));

        let page = PageRequest::from_params(params, 50, 100).unwrap();
        assert_eq!(page, PageRequest::new(0, 50));
    }

    #[test]
    fn test_default_size_respects_max() {
        let page = PageRequest::from_params(PageParams::page(2), 500, 100).unwrap();
        assert_eq!(page, PageRequest::new(2, 100));
    }

    #[test]
    fn test_huge_index_is_an_empty_window() {
        let page = PageRequest::from_params(PageParams::new(5_000_000_000, 20), 20, 100).unwrap();
        assert_eq!(page.index, u32::MAX);
        assert!(!page.is_empty());
        assert!(page.window(0..1000).is_empty());
    }
}
