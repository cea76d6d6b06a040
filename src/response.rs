use axum::Json;
use serde::Serialize;

/// Wire envelope shared by every endpoint: `{success, data?, error?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn error(error: ErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// A page of items plus the derived pagination metadata.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Slice `items` down to the requested page. `page` is 1-based and `limit`
/// is at least 1 (both enforced by query validation); every metadata field
/// is derived from the full item count, nothing is tracked separately.
pub fn paginate<T>(items: Vec<T>, page: u64, limit: u64) -> Paginated<T> {
    let total_items = items.len() as u64;
    let total_pages = total_items.div_ceil(limit);
    let offset = (page - 1) * limit;

    let items: Vec<T> = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    Paginated {
        items,
        pagination: PageMeta {
            page,
            limit,
            total_items,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_page_is_items_11_to_20() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(items, 2, 10);

        assert_eq!(page.items, (11..=20).collect::<Vec<u32>>());
        assert_eq!(page.pagination.total_items, 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next_page);
        assert!(page.pagination.has_previous_page);
    }

    #[test]
    fn last_partial_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(items, 3, 10);

        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert!(!page.pagination.has_next_page);
        assert!(page.pagination.has_previous_page);
    }

    #[test]
    fn empty_dataset() {
        let page = paginate(Vec::<u32>::new(), 1, 10);

        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_next_page);
        assert!(!page.pagination.has_previous_page);
    }

    #[test]
    fn page_past_the_end_is_empty_but_well_formed() {
        let items: Vec<u32> = (1..=5).collect();
        let page = paginate(items, 4, 2);

        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_pages, 3);
        assert!(!page.pagination.has_next_page);
    }
}
