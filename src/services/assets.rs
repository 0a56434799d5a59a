//! Asset catalogue service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{AssetFilter, AssetQuery, CreateAsset, NewAsset},
        Asset, AssetState,
    },
    pagination::{PagedResponse, Paginator, SortSpec},
    repository::Repository,
};

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
    paginator: Paginator,
}

impl AssetsService {
    pub fn new(repository: Repository, paginator: Paginator) -> Self {
        Self {
            repository,
            paginator,
        }
    }

    /// Register a new asset; it starts either available or not available
    pub async fn create(&self, request: CreateAsset) -> AppResult<Asset> {
        request.validate()?;
        let Some(location) = request.location else {
            return Err(AppError::BadRequest("Please select Location.".to_string()));
        };

        let state = request.state.unwrap_or_default();
        if !matches!(state, AssetState::Available | AssetState::NotAvailable) {
            return Err(AppError::Validation(vec![
                "A new asset must be Available or Not Available.".to_string(),
            ]));
        }

        let asset = NewAsset {
            id: Uuid::new_v4(),
            asset_code: request.asset_code.trim().to_string(),
            asset_name: request.asset_name.trim().to_string(),
            category: request.category.trim().to_string(),
            specification: request
                .specification
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            installed_date: request.installed_date,
            state,
            location,
            created_by: request.created_by.map(|id| id.to_string()),
        };

        let created = self.repository.assets.create(&asset).await?;
        tracing::info!("Asset {} created in {}", created.asset_code, created.location);
        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Asset> {
        self.repository
            .assets
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Asset not found.".to_string()))
    }

    pub async fn list(&self, query: AssetQuery, route: &str) -> AppResult<PagedResponse<Asset>> {
        let filter = AssetFilter {
            location: query.location,
            search: query.search,
            state: query.state,
            category: query.category,
        };
        let sort = SortSpec::new(query.order_by, query.is_descending);
        let page = self.paginator.filter(query.page_index, query.page_size);

        let (rows, total) = self.repository.assets.filter(&filter, &sort, &page).await?;
        Ok(self.paginator.page(rows, &page, total, route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::Location,
        services::testing::{self, Mocks},
    };

    fn service(mocks: Mocks) -> AssetsService {
        AssetsService::new(mocks.into_repository(), Paginator::default())
    }

    fn request(state: Option<AssetState>) -> CreateAsset {
        CreateAsset {
            asset_code: " MO000007 ".to_string(),
            asset_name: "Monitor Dell UltraSharp".to_string(),
            category: "Monitor".to_string(),
            specification: Some("   ".to_string()),
            installed_date: None,
            state,
            location: Some(Location::HoChiMinh),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn new_asset_cannot_start_assigned() {
        let err = service(Mocks::default())
            .create(request(Some(AssetState::Assigned)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_trims_fields() {
        let mut mocks = Mocks::default();
        mocks
            .assets
            .expect_create()
            .withf(|asset| {
                asset.asset_code == "MO000007"
                    && asset.specification.is_none()
                    && asset.state == AssetState::Available
            })
            .times(1)
            .returning(|asset| {
                let mut created = testing::asset(asset.id);
                created.asset_code = asset.asset_code.clone();
                created.location = asset.location;
                Ok(created)
            });

        let created = service(mocks).create(request(None)).await.expect("asset created");
        assert_eq!(created.location, Location::HoChiMinh);
    }

    #[tokio::test]
    async fn unknown_asset_is_not_found() {
        let mut mocks = Mocks::default();
        mocks.assets.expect_get_by_id().returning(|_| Ok(None));

        let err = service(mocks).get_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Asset not found."));
    }
}
