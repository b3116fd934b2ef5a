use std::sync::Arc;

use chrono::Utc;
use common::types::MutationResult;
use tracing::{debug, info, instrument};

use super::domain::{ListFilter, NewProduct, ProductChanges, ProductInput, ProductView};
use super::repository::{CategoryRepository, ProductRepository, ReviewRepository};
use super::review::ProductLocks;
use crate::errors::{RepositoryError, ServiceError};

/// Catalog business service independent of web framework.
///
/// Holds no mutable state of its own apart from the per-product review locks;
/// each call validates its input, consults the repositories and maps their
/// outcome to a classified [`ServiceError`].
pub struct CatalogService {
    pub(super) products: Arc<dyn ProductRepository>,
    pub(super) categories: Arc<dyn CategoryRepository>,
    pub(super) reviews: Arc<dyn ReviewRepository>,
    pub(super) review_locks: ProductLocks,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        reviews: Arc<dyn ReviewRepository>,
    ) -> Self {
        Self { products, categories, reviews, review_locks: ProductLocks::default() }
    }

    /// Create a product with rating 0.
    ///
    /// # Examples
    /// ```
    /// use service::catalog::{CatalogService, domain::{CategoryRef, ProductInput}, repository::mock::MockCatalogRepository};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockCatalogRepository::default().with_category(1, "Food"));
    /// let svc = CatalogService::new(repo.clone(), repo.clone(), repo.clone());
    /// let input = ProductInput {
    ///     sku: "IND001".into(), title: "Indomie".into(), description: "Noodles".into(),
    ///     category: CategoryRef { id: 1, name: String::new() },
    ///     image_url: "https://img.example.com/ind001.png".into(), weight: 85, price: 3500,
    /// };
    /// let res = tokio_test::block_on(svc.create_product(input)).unwrap();
    /// assert!(res.success);
    /// assert_eq!(repo.product_by_sku("IND001").unwrap().rating, 0.0);
    /// ```
    #[instrument(skip(self, input), fields(sku = %input.sku, category_id = input.category.id))]
    pub async fn create_product(&self, input: ProductInput) -> Result<MutationResult, ServiceError> {
        input.validate_create().map_err(|e| ServiceError::invalid("invalid request payload", e))?;

        self.ensure_category(input.category.id).await?;

        let existing = self
            .products
            .get_product_by_sku(&input.sku)
            .await
            .map_err(|e| ServiceError::internal("error when get product by sku", e))?;
        if existing.is_some() {
            return Err(ServiceError::Validation("sku already exist".into()));
        }

        self.products
            .insert_product(NewProduct {
                sku: input.sku,
                title: input.title,
                description: input.description,
                category_id: input.category.id,
                image_url: input.image_url,
                weight: input.weight,
                price: input.price,
                rating: 0.0,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| ServiceError::internal("error when insert product", e))?;

        info!("product_created");
        Ok(MutationResult::ok())
    }

    /// Overwrite SKU, title, description and category of product `id`.
    ///
    /// Image URL, weight, price and rating are never written, whatever the
    /// payload carries. The product is not looked up first: updating an id
    /// that matches no row succeeds.
    #[instrument(skip(self, input), fields(sku = %input.sku, category_id = input.category.id))]
    pub async fn update_product(&self, id: i64, input: ProductInput) -> Result<MutationResult, ServiceError> {
        if id <= 0 {
            return Err(ServiceError::Validation("invalid id".into()));
        }
        input.validate_update().map_err(|e| ServiceError::invalid("invalid request payload", e))?;

        self.ensure_category(input.category.id).await?;

        let changes = ProductChanges {
            sku: input.sku,
            title: input.title,
            description: input.description,
            category_id: input.category.id,
        };
        match self.products.update_product(id, changes).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => debug!("update matched no rows"),
            Err(e) => return Err(ServiceError::internal("error when update product", e)),
        }

        info!("product_updated");
        Ok(MutationResult::ok())
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> Result<ProductView, ServiceError> {
        if id <= 0 {
            return Err(ServiceError::Validation("invalid id".into()));
        }

        self.products
            .get_product(id)
            .await
            .map_err(|e| ServiceError::internal("error when get product", e))?
            .map(ProductView::from)
            .ok_or_else(|| ServiceError::not_found("product"))
    }

    /// List products matching `filter`, one page at a time.
    #[instrument(skip(self, filter), fields(search = %filter.search, category_id = filter.category_id))]
    pub async fn get_product_list(&self, mut filter: ListFilter) -> Result<Vec<ProductView>, ServiceError> {
        filter.validate().map_err(|e| ServiceError::invalid("invalid request", e))?;

        let products = self
            .products
            .get_product_list(filter.to_query())
            .await
            .map_err(|e| ServiceError::internal("error when get product list", e))?;

        debug!(count = products.len(), page = filter.page, size = filter.size, "product_list");
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    /// A missing category is the caller's mistake, so it is a validation error.
    async fn ensure_category(&self, id: i64) -> Result<(), ServiceError> {
        let category = self
            .categories
            .get_category(id)
            .await
            .map_err(|e| ServiceError::internal("error when get category", e))?;
        if category.is_none() {
            return Err(ServiceError::Validation("category not found".into()));
        }
        Ok(())
    }
}
