//! Shared response payload shapes.

use serde::Serialize;
use serde_json::{json, Value};
use voxtutor_access::User;

/// The user object returned by the auth endpoints. Never includes the
/// password hash.
pub fn user_payload(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "university": user.university,
        "course": user.course,
        "voice_enabled": user.voice_enabled,
        "learning_level": user.learning_level,
        "stats": {
            "total_questions": user.total_questions,
            "total_conversations": user.total_conversations,
            "total_uploads": user.total_uploads,
            "total_voice_generated": user.total_voice_generated,
        },
        "last_login_at": user.last_login_at,
        "created_at": user.created_at,
    })
}

/// Pagination envelope for list endpoints. Serialized in the camelCase
/// shape clients consume.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            ((total as u64).div_ceil(limit as u64)) as u32
        };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(!p.has_prev_page);

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);

        let empty = Pagination::new(1, 10, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_prev_page);
    }
}
