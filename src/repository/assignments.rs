//! Assignments repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        assignment::{
            Assignment, AssignmentDetails, AssignmentDraft, AssignmentFilter, AssignmentScope,
            NewAssignment,
        },
        AssignmentState,
    },
    pagination::{push_order_and_page, PaginationFilter, SortColumns, SortSpec},
};

use super::search_pattern;

/// An assignment still counts while it is not deleted and no completed return
/// request closes it. Filtered listings and the user-deletion guard use this.
pub(crate) const ACTIVE_ASSIGNMENT: &str = "NOT a.is_deleted AND NOT EXISTS (\
     SELECT 1 FROM return_requests crr \
     WHERE crr.assignment_id = a.id AND NOT crr.is_deleted AND crr.state = 'completed')";

const DETAILS_COLUMNS: &str = "SELECT a.id, a.asset_id, s.asset_code, s.asset_name, s.specification, \
     a.assigned_id_to, ut.username AS assigned_to, a.assigned_id_by, ub.username AS assigned_by, \
     a.assigned_date, a.note, a.location, a.state, rr.state AS return_request_state, a.created_on";

const DETAILS_FROM: &str = " FROM assignments a \
     JOIN assets s ON s.id = a.asset_id \
     JOIN users ut ON ut.id = a.assigned_id_to \
     JOIN users ub ON ub.id = a.assigned_id_by \
     LEFT JOIN return_requests rr ON rr.assignment_id = a.id AND NOT rr.is_deleted \
     AND rr.state <> 'rejected'";

pub(crate) const ASSIGNMENT_SORT: SortColumns = SortColumns {
    fields: &[
        ("assetCode", "s.asset_code"),
        ("assetName", "s.asset_name"),
        ("assignedTo", "ut.username"),
        ("assignedBy", "ub.username"),
        ("assignedDate", "a.assigned_date"),
        ("state", "a.state"),
    ],
    default: "s.asset_code",
    tiebreaker: "a.id",
};

const ASSET_TAKEN: &str = "Asset is not available for assignment.";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentsRepository: Send + Sync {
    /// Non-deleted assignment row
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Assignment>>;

    /// Non-deleted assignment joined with its asset and users
    async fn get_details(&self, id: Uuid) -> AppResult<Option<AssignmentDetails>>;

    /// Every non-deleted assignment of a user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<AssignmentDetails>>;

    /// One page of active assignments plus the count before paging
    async fn filter(
        &self,
        filter: &AssignmentFilter,
        sort: &SortSpec,
        page: &PaginationFilter,
    ) -> AppResult<(Vec<AssignmentDetails>, i64)>;

    /// Reserve the asset and insert the assignment in one transaction
    async fn create(&self, assignment: &NewAssignment) -> AppResult<Assignment>;

    /// Rewrite a waiting assignment, moving the reservation when the asset changes
    async fn update(
        &self,
        id: Uuid,
        previous_asset_id: Uuid,
        draft: &AssignmentDraft,
    ) -> AppResult<Option<Assignment>>;

    /// Move `from` to `to` only if the row is still in `from`.
    /// Declining releases the asset in the same transaction.
    async fn change_state(
        &self,
        id: Uuid,
        from: AssignmentState,
        to: AssignmentState,
    ) -> AppResult<Option<Assignment>>;

    /// Mark deleted and optionally hand the asset back
    async fn soft_delete(&self, id: Uuid, release: bool) -> AppResult<bool>;

    /// Active, non-declined assignments held by a user
    async fn count_active_for_user(&self, user_id: Uuid) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct PgAssignmentsRepository {
    pool: Pool<Postgres>,
}

impl PgAssignmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Append the WHERE clause for a listing
/// Unfiltered view of a user's assignments, closed ones included
fn push_user_listing(builder: &mut QueryBuilder<'_, Postgres>, user_id: Uuid) {
    builder
        .push(DETAILS_FROM)
        .push(" WHERE NOT a.is_deleted AND a.assigned_id_to = ")
        .push_bind(user_id)
        .push(" ORDER BY a.assigned_date DESC, a.id ASC");
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AssignmentFilter) {
    builder.push(" WHERE ").push(ACTIVE_ASSIGNMENT);

    match filter.scope {
        AssignmentScope::Location(location) => {
            builder.push(" AND a.location = ").push_bind(location);
        }
        AssignmentScope::Assignee(user_id) => {
            builder
                .push(" AND a.assigned_id_to = ")
                .push_bind(user_id)
                .push(" AND a.state <> 'declined'");
        }
    }

    if let Some(pattern) = search_pattern(filter.search.as_deref()) {
        builder
            .push(" AND (LOWER(s.asset_code) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(s.asset_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(ut.username) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(ub.username) LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(state) = filter.state {
        builder.push(" AND a.state = ").push_bind(state);
    }

    if let Some(date) = filter.assigned_date {
        builder.push(" AND a.assigned_date = ").push_bind(date);
    }
}

/// Flip an available asset to assigned; false when someone else got there first
async fn reserve_asset(
    conn: &mut sqlx::PgConnection,
    asset_id: Uuid,
    modified_by: &str,
) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE assets
        SET state = 'assigned', last_modified_on = NOW(), last_modified_by = $2
        WHERE id = $1 AND state = 'available' AND NOT is_deleted
        "#,
    )
    .bind(asset_id)
    .bind(modified_by)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

async fn release_asset(conn: &mut sqlx::PgConnection, asset_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE assets
        SET state = 'available', last_modified_on = NOW()
        WHERE id = $1 AND state = 'assigned'
        "#,
    )
    .bind(asset_id)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl AssignmentsRepository for PgAssignmentsRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Assignment>> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    async fn get_details(&self, id: Uuid) -> AppResult<Option<AssignmentDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(DETAILS_COLUMNS);
        builder
            .push(DETAILS_FROM)
            .push(" WHERE NOT a.is_deleted AND a.id = ")
            .push_bind(id);

        let details = builder
            .build_query_as::<AssignmentDetails>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(details)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<AssignmentDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(DETAILS_COLUMNS);
        push_user_listing(&mut builder, user_id);

        let rows = builder
            .build_query_as::<AssignmentDetails>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn filter(
        &self,
        filter: &AssignmentFilter,
        sort: &SortSpec,
        page: &PaginationFilter,
    ) -> AppResult<(Vec<AssignmentDetails>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count.push(DETAILS_FROM);
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(DETAILS_COLUMNS);
        select.push(DETAILS_FROM);
        push_filters(&mut select, filter);
        push_order_and_page(&mut select, &ASSIGNMENT_SORT, sort, page);

        let rows = select
            .build_query_as::<AssignmentDetails>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn create(&self, assignment: &NewAssignment) -> AppResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        if !reserve_asset(&mut tx, assignment.asset_id, &assignment.created_by).await? {
            return Err(AppError::Conflict(ASSET_TAKEN.to_string()));
        }

        let created = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (
                id, asset_id, assigned_id_to, assigned_id_by, assigned_date,
                note, location, state, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'waiting_for_acceptance', $8)
            RETURNING *
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.asset_id)
        .bind(assignment.assigned_id_to)
        .bind(assignment.assigned_id_by)
        .bind(assignment.assigned_date)
        .bind(&assignment.note)
        .bind(assignment.location)
        .bind(&assignment.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::on_unique_violation(e, ASSET_TAKEN))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        previous_asset_id: Uuid,
        draft: &AssignmentDraft,
    ) -> AppResult<Option<Assignment>> {
        let modified_by = draft.assigned_id_by.to_string();
        let mut tx = self.pool.begin().await?;

        if draft.asset_id != previous_asset_id {
            release_asset(&mut tx, previous_asset_id).await?;
            if !reserve_asset(&mut tx, draft.asset_id, &modified_by).await? {
                return Err(AppError::Conflict(ASSET_TAKEN.to_string()));
            }
        }

        let updated = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET asset_id = $2,
                assigned_id_to = $3,
                assigned_id_by = $4,
                assigned_date = $5,
                note = $6,
                location = (SELECT location FROM assets WHERE id = $2),
                last_modified_on = NOW(),
                last_modified_by = $7
            WHERE id = $1 AND NOT is_deleted AND state = 'waiting_for_acceptance'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(draft.asset_id)
        .bind(draft.assigned_id_to)
        .bind(draft.assigned_id_by)
        .bind(draft.assigned_date)
        .bind(&draft.note)
        .bind(&modified_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::on_unique_violation(e, ASSET_TAKEN))?;

        // Rolled back on drop when the row was no longer editable
        if updated.is_some() {
            tx.commit().await?;
        }
        Ok(updated)
    }

    async fn change_state(
        &self,
        id: Uuid,
        from: AssignmentState,
        to: AssignmentState,
    ) -> AppResult<Option<Assignment>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET state = $3, last_modified_on = NOW()
            WHERE id = $1 AND state = $2 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(assignment) = &updated {
            if to == AssignmentState::Declined {
                release_asset(&mut tx, assignment.asset_id).await?;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn soft_delete(&self, id: Uuid, release: bool) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let asset_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE assignments
            SET is_deleted = TRUE, last_modified_on = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING asset_id
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(asset_id) = asset_id else {
            return Ok(false);
        };

        if release {
            release_asset(&mut tx, asset_id).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn count_active_for_user(&self, user_id: Uuid) -> AppResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM assignments a WHERE ");
        builder
            .push(ACTIVE_ASSIGNMENT)
            .push(" AND a.state <> 'declined' AND a.assigned_id_to = ")
            .push_bind(user_id);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }
}
