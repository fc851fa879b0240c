use serde::{Deserialize, Serialize};

use crate::users::repo_types::PublicUser;

/// Query string for GET /users. Values arrive as raw strings so that
/// malformed input coerces to the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub keyword: Option<String>,
}

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

impl ListUsersQuery {
    pub fn page(&self) -> i64 {
        coerce_positive(self.page.as_deref(), DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        coerce_positive(self.limit.as_deref(), DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        // Saturate so an absurd page number yields an empty page, not an
        // overflow panic or a negative OFFSET.
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Keyword filter; blank strings count as absent.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn coerce_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>, keyword: Option<&str>) -> ListUsersQuery {
        ListUsersQuery {
            page: page.map(Into::into),
            limit: limit.map(Into::into),
            keyword: keyword.map(Into::into),
        }
    }

    #[test]
    fn absent_page_and_limit_use_defaults() {
        let q = query(None, None, None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn malformed_values_fall_back_instead_of_failing() {
        let q = query(Some("abc"), Some("ten"), None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
    }

    #[test]
    fn non_positive_values_fall_back() {
        let q = query(Some("0"), Some("-5"), None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
    }

    #[test]
    fn valid_values_are_used_and_offset_is_windowed() {
        let q = query(Some("3"), Some("25"), None);
        assert_eq!(q.page(), 3);
        assert_eq!(q.limit(), 25);
        assert_eq!(q.offset(), 50);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let q = query(Some(&i64::MAX.to_string()), Some("10"), None);
        assert_eq!(q.page(), i64::MAX);
        assert_eq!(q.offset(), i64::MAX);
    }

    #[test]
    fn blank_keyword_counts_as_absent() {
        assert_eq!(query(None, None, Some("")).keyword(), None);
        assert_eq!(query(None, None, Some("   ")).keyword(), None);
        assert_eq!(query(None, None, Some(" ali ")).keyword(), Some("ali"));
    }
}
