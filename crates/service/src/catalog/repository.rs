use async_trait::async_trait;

use super::domain::{Category, NewProduct, NewReview, Product, ProductChanges, ProductQuery, Statistic};
use crate::errors::RepositoryError;

/// Product persistence. Lookups return `Ok(None)` when no row matches.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_product(&self, id: i64) -> Result<Option<Product>, RepositoryError>;
    async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError>;
    async fn get_product_list(&self, query: ProductQuery) -> Result<Vec<Product>, RepositoryError>;
    async fn insert_product(&self, product: NewProduct) -> Result<(), RepositoryError>;
    /// Overwrite SKU, title, description and category.
    /// May report [`RepositoryError::NotFound`] when no row has `id`.
    async fn update_product(&self, id: i64, changes: ProductChanges) -> Result<(), RepositoryError>;
    async fn update_product_rating(&self, id: i64, rating: f64) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn get_category(&self, id: i64) -> Result<Option<Category>, RepositoryError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert_review(&self, review: NewReview) -> Result<(), RepositoryError>;
    /// `Ok(None)` when the product has no reviews yet.
    async fn get_review_statistic(&self, product_id: i64) -> Result<Option<Statistic>, RepositoryError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::catalog::domain::{SortColumn, SortType};

    /// Implements all three repository traits over shared maps.
    ///
    /// Every call is counted, and any operation can be made to fail by name
    /// (`"get_category"`, `"insert_review"`, ...) to exercise error paths.
    #[derive(Default)]
    pub struct MockCatalogRepository {
        categories: Mutex<BTreeMap<i64, Category>>,
        products: Mutex<BTreeMap<i64, Product>>,
        reviews: Mutex<Vec<NewReview>>,
        failing: Mutex<HashSet<&'static str>>,
        calls: AtomicUsize,
    }

    impl MockCatalogRepository {
        pub fn with_category(self, id: i64, name: &str) -> Self {
            self.categories.lock().unwrap().insert(id, Category { id, name: name.to_string() });
            self
        }

        /// Seed a stored product without going through the service.
        pub fn with_product(self, product: Product) -> Self {
            self.products.lock().unwrap().insert(product.id, product);
            self
        }

        /// Seed existing reviews for a product.
        pub fn with_reviews(self, product_id: i64, ratings: &[i32]) -> Self {
            {
                let mut reviews = self.reviews.lock().unwrap();
                for &rating in ratings {
                    reviews.push(NewReview { author: crate::catalog::domain::AuthorRef(0), product_id, rating, comment: String::new() });
                }
            }
            self
        }

        pub fn fail_on(&self, operation: &'static str) {
            self.failing.lock().unwrap().insert(operation);
        }

        /// Number of repository calls made so far, across all three traits.
        pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

        pub fn product(&self, id: i64) -> Option<Product> {
            self.products.lock().unwrap().get(&id).cloned()
        }

        pub fn product_by_sku(&self, sku: &str) -> Option<Product> {
            self.products.lock().unwrap().values().find(|p| p.sku == sku).cloned()
        }

        pub fn reviews_for(&self, product_id: i64) -> Vec<NewReview> {
            self.reviews.lock().unwrap().iter().filter(|r| r.product_id == product_id).cloned().collect()
        }

        /// Record the call; yield so concurrent callers interleave like real I/O.
        async fn enter(&self, operation: &'static str) -> Result<(), RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.failing.lock().unwrap().contains(operation) {
                return Err(RepositoryError::Db(format!("{operation} failed")));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ProductRepository for MockCatalogRepository {
        async fn get_product(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
            self.enter("get_product").await?;
            Ok(self.product(id))
        }

        async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
            self.enter("get_product_by_sku").await?;
            Ok(self.product_by_sku(sku))
        }

        async fn get_product_list(&self, query: ProductQuery) -> Result<Vec<Product>, RepositoryError> {
            self.enter("get_product_list").await?;
            let products = self.products.lock().unwrap();
            let mut rows: Vec<Product> = products
                .values()
                .filter(|p| query.search.is_empty() || p.sku.contains(&query.search) || p.title.contains(&query.search))
                .filter(|p| query.category_id <= 0 || p.category.id == query.category_id)
                .cloned()
                .collect();
            if let Some(column) = query.sort_column {
                rows.sort_by(|a, b| match column {
                    SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
                    SortColumn::Rating => a.rating.total_cmp(&b.rating),
                });
                if query.sort_type == Some(SortType::Desc) {
                    rows.reverse();
                }
            }
            Ok(rows
                .into_iter()
                .skip(query.offset.max(0) as usize)
                .take(query.limit.max(0) as usize)
                .collect())
        }

        async fn insert_product(&self, product: NewProduct) -> Result<(), RepositoryError> {
            self.enter("insert_product").await?;
            let mut products = self.products.lock().unwrap();
            let category = self
                .categories
                .lock()
                .unwrap()
                .get(&product.category_id)
                .cloned()
                .unwrap_or(Category { id: product.category_id, name: String::new() });
            let id = products.keys().next_back().copied().unwrap_or(0) + 1;
            products.insert(id, Product {
                id,
                sku: product.sku,
                title: product.title,
                description: product.description,
                category,
                image_url: product.image_url,
                weight: product.weight,
                price: product.price,
                rating: product.rating,
                created_at: product.created_at,
            });
            Ok(())
        }

        async fn update_product(&self, id: i64, changes: ProductChanges) -> Result<(), RepositoryError> {
            self.enter("update_product").await?;
            let category_name = self
                .categories
                .lock()
                .unwrap()
                .get(&changes.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            let mut products = self.products.lock().unwrap();
            let p = products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
            p.sku = changes.sku;
            p.title = changes.title;
            p.description = changes.description;
            p.category = Category { id: changes.category_id, name: category_name };
            Ok(())
        }

        async fn update_product_rating(&self, id: i64, rating: f64) -> Result<(), RepositoryError> {
            self.enter("update_product_rating").await?;
            if let Some(p) = self.products.lock().unwrap().get_mut(&id) {
                p.rating = rating;
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CategoryRepository for MockCatalogRepository {
        async fn get_category(&self, id: i64) -> Result<Option<Category>, RepositoryError> {
            self.enter("get_category").await?;
            Ok(self.categories.lock().unwrap().get(&id).cloned())
        }
    }

    #[async_trait]
    impl ReviewRepository for MockCatalogRepository {
        async fn insert_review(&self, review: NewReview) -> Result<(), RepositoryError> {
            self.enter("insert_review").await?;
            self.reviews.lock().unwrap().push(review);
            Ok(())
        }

        async fn get_review_statistic(&self, product_id: i64) -> Result<Option<Statistic>, RepositoryError> {
            self.enter("get_review_statistic").await?;
            let reviews = self.reviews.lock().unwrap();
            let ratings: Vec<i32> = reviews.iter().filter(|r| r.product_id == product_id).map(|r| r.rating).collect();
            if ratings.is_empty() {
                return Ok(None);
            }
            let count = ratings.len() as i64;
            let average = ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / count as f64;
            Ok(Some(Statistic { count, average }))
        }
    }
}
