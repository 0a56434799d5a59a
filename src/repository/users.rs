//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        user::{NewUser, UserFilter},
        User, UserSummary,
    },
    pagination::{push_order_and_page, PaginationFilter, SortColumns, SortSpec},
};

use super::{escape_like, search_pattern};

const SUMMARY_COLUMNS: &str = "SELECT u.id, u.staff_code, u.username, \
     u.first_name || ' ' || u.last_name AS full_name, u.joined_date, u.role, u.location";

pub(crate) const USER_SORT: SortColumns = SortColumns {
    fields: &[
        ("staffCode", "u.staff_code_id"),
        ("fullName", "(u.first_name || ' ' || u.last_name)"),
        ("username", "u.username"),
        ("joinedDate", "u.joined_date"),
        ("role", "u.role"),
    ],
    default: "u.staff_code_id",
    tiebreaker: "u.id",
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Non-deleted user
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Every username (deleted users included) starting with `prefix`
    async fn usernames_starting_with(&self, prefix: &str) -> AppResult<Vec<String>>;

    async fn create(&self, user: &NewUser) -> AppResult<User>;

    async fn filter(
        &self,
        filter: &UserFilter,
        sort: &SortSpec,
        page: &PaginationFilter,
    ) -> AppResult<(Vec<UserSummary>, i64)>;

    /// Returns false when the user was already gone
    async fn soft_delete(&self, id: Uuid) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgUsersRepository {
    pool: Pool<Postgres>,
}

impl PgUsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    builder
        .push(" FROM users u WHERE NOT u.is_deleted AND u.location = ")
        .push_bind(filter.location);

    if let Some(pattern) = search_pattern(filter.search.as_deref()) {
        builder
            .push(" AND (LOWER(u.first_name || ' ' || u.last_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(u.username) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(u.staff_code) LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(role) = filter.role {
        builder.push(" AND u.role = ").push_bind(role);
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn usernames_starting_with(&self, prefix: &str) -> AppResult<Vec<String>> {
        let usernames = sqlx::query_scalar::<_, String>(
            "SELECT username FROM users WHERE username LIKE $1",
        )
        .bind(format!("{}%", escape_like(prefix)))
        .fetch_all(&self.pool)
        .await?;

        Ok(usernames)
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, username, first_name, last_name, date_of_birth, joined_date,
                gender, role, location, password_hash, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.date_of_birth)
        .bind(user.joined_date)
        .bind(user.gender)
        .bind(user.role)
        .bind(user.location)
        .bind(&user.password_hash)
        .bind(&user.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Username is already taken."))?;

        Ok(created)
    }

    async fn filter(
        &self,
        filter: &UserFilter,
        sort: &SortSpec,
        page: &PaginationFilter,
    ) -> AppResult<(Vec<UserSummary>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(SUMMARY_COLUMNS);
        push_filters(&mut select, filter);
        push_order_and_page(&mut select, &USER_SORT, sort, page);

        let rows = select
            .build_query_as::<UserSummary>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_deleted = TRUE, last_modified_on = NOW()
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Role};

    #[test]
    fn search_covers_name_username_and_staff_code() {
        let filter = UserFilter {
            location: Location::HoChiMinh,
            search: Some("SD00".to_string()),
            role: Some(Role::Admin),
        };

        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_filters(&mut builder, &filter);
        let sql = builder.sql();

        assert!(sql.contains("LOWER(u.first_name || ' ' || u.last_name) LIKE $2"));
        assert!(sql.contains("LOWER(u.staff_code) LIKE $4"));
        assert!(sql.contains("u.role = $5"));
    }

    #[test]
    fn staff_code_sorts_numerically() {
        assert_eq!(USER_SORT.resolve(Some("staffCode")), "u.staff_code_id");
        assert_eq!(USER_SORT.resolve(None), "u.staff_code_id");
    }
}
