//! Assets repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{AssetFilter, NewAsset},
        Asset,
    },
    pagination::{push_order_and_page, PaginationFilter, SortColumns, SortSpec},
};

use super::search_pattern;

pub(crate) const ASSET_SORT: SortColumns = SortColumns {
    fields: &[
        ("assetCode", "asset_code"),
        ("assetName", "asset_name"),
        ("category", "category"),
        ("state", "state"),
    ],
    default: "asset_code",
    tiebreaker: "id",
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetsRepository: Send + Sync {
    /// Non-deleted asset
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Asset>>;

    async fn create(&self, asset: &NewAsset) -> AppResult<Asset>;

    async fn filter(
        &self,
        filter: &AssetFilter,
        sort: &SortSpec,
        page: &PaginationFilter,
    ) -> AppResult<(Vec<Asset>, i64)>;
}

#[derive(Clone)]
pub struct PgAssetsRepository {
    pool: Pool<Postgres>,
}

impl PgAssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AssetFilter) {
    builder
        .push(" FROM assets WHERE NOT is_deleted AND location = ")
        .push_bind(filter.location);

    if let Some(pattern) = search_pattern(filter.search.as_deref()) {
        builder
            .push(" AND (LOWER(asset_code) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(asset_name) LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(state) = filter.state {
        builder.push(" AND state = ").push_bind(state);
    }

    if let Some(category) = filter.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        builder
            .push(" AND LOWER(category) = ")
            .push_bind(category.to_lowercase());
    }
}

#[async_trait]
impl AssetsRepository for PgAssetsRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(asset)
    }

    async fn create(&self, asset: &NewAsset) -> AppResult<Asset> {
        let created = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (
                id, asset_code, asset_name, category, specification,
                installed_date, state, location, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(&asset.asset_code)
        .bind(&asset.asset_name)
        .bind(&asset.category)
        .bind(&asset.specification)
        .bind(asset.installed_date)
        .bind(asset.state)
        .bind(asset.location)
        .bind(&asset.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(
                e,
                &format!("Asset code {} already exists.", asset.asset_code),
            )
        })?;

        Ok(created)
    }

    async fn filter(
        &self,
        filter: &AssetFilter,
        sort: &SortSpec,
        page: &PaginationFilter,
    ) -> AppResult<(Vec<Asset>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT *");
        push_filters(&mut select, filter);
        push_order_and_page(&mut select, &ASSET_SORT, sort, page);

        let rows = select.build_query_as::<Asset>().fetch_all(&self.pool).await?;

        Ok((rows, total))
    }
}
