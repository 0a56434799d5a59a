//! Repository layer for database operations
//!
//! Each repository is a trait with a PostgreSQL implementation so services can
//! be exercised against mocks.

pub mod assets;
pub mod assignments;
pub mod return_requests;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

/// Main repository struct holding one implementation per aggregate
#[derive(Clone)]
pub struct Repository {
    pub assets: Arc<dyn assets::AssetsRepository>,
    pub users: Arc<dyn users::UsersRepository>,
    pub assignments: Arc<dyn assignments::AssignmentsRepository>,
    pub return_requests: Arc<dyn return_requests::ReturnRequestsRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            assets: Arc::new(assets::PgAssetsRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool.clone())),
            assignments: Arc::new(assignments::PgAssignmentsRepository::new(pool.clone())),
            return_requests: Arc::new(return_requests::PgReturnRequestsRepository::new(pool)),
        }
    }
}

/// Escape `%`, `_` and the escape character itself for use inside a LIKE pattern
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Lower-cased `%term%` pattern for case-insensitive substring search.
/// Blank terms mean no search filter.
pub(crate) fn search_pattern(search: Option<&str>) -> Option<String> {
    let term = search?.trim();
    if term.is_empty() {
        return None;
    }
    Some(format!("%{}%", escape_like(&term.to_lowercase())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("   ")), None);
    }

    #[test]
    fn search_is_lowercased_and_wrapped() {
        assert_eq!(search_pattern(Some(" LapTop ")).as_deref(), Some("%laptop%"));
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(search_pattern(Some("50%_off")).as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }
}
