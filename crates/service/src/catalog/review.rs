//! Review submission and incremental rating aggregation.
//!
//! Reading the statistic, inserting the review and writing the new rating are
//! three separate store calls. Two submissions for the same product running
//! in between each other would both start from the same statistic and the
//! later rating write would drop the earlier review's contribution. Within one
//! process, submissions are therefore serialized per product with
//! [`ProductLocks`]. Several processes sharing one database can still race.

use std::sync::Arc;

use common::types::MutationResult;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, instrument};

use super::domain::{AuthorRef, NewReview, ReviewInput, Statistic};
use super::service::CatalogService;
use crate::errors::ServiceError;

/// One async mutex per product id, created on first use and dropped again
/// once the last holder or waiter releases it.
#[derive(Default)]
pub struct ProductLocks {
    inner: DashMap<i64, Arc<Mutex<()>>>,
}

impl ProductLocks {
    pub async fn acquire(&self, product_id: i64) -> ProductLockGuard<'_> {
        // clone out of the map so no shard lock is held while waiting
        let lock = self.inner.entry(product_id).or_default().clone();
        let guard = lock.lock_owned().await;
        ProductLockGuard { locks: self, product_id, guard: Some(guard) }
    }
}

/// Holds one product's lock; removes the map entry on release when nobody else holds or waits for it.
pub struct ProductLockGuard<'a> {
    locks: &'a ProductLocks,
    product_id: i64,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ProductLockGuard<'_> {
    fn drop(&mut self) {
        // release our Arc first so only the map's reference is left
        drop(self.guard.take());
        self.locks.inner.remove_if(&self.product_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Mean of `count + 1` samples given the mean of the first `count` and one more sample.
pub fn incremental_mean(previous: Statistic, rating: i32) -> f64 {
    let count = previous.count as f64;
    (count * previous.average + f64::from(rating)) / (count + 1.0)
}

impl CatalogService {
    /// Record a review by `author` and fold its rating into the product's rating.
    ///
    /// # Examples
    /// ```
    /// use service::catalog::{CatalogService, domain::{AuthorRef, ReviewInput}, repository::mock::MockCatalogRepository};
    /// # use service::catalog::domain::{Category, Product};
    /// use std::sync::Arc;
    /// # let product = Product { id: 1, sku: "IND001".into(), title: "Indomie".into(), description: "Noodles".into(),
    /// #     category: Category { id: 1, name: "Food".into() }, image_url: String::new(), weight: 85, price: 3500,
    /// #     rating: 0.0, created_at: chrono::Utc::now() };
    /// let repo = Arc::new(MockCatalogRepository::default().with_product(product));
    /// let svc = CatalogService::new(repo.clone(), repo.clone(), repo.clone());
    /// let review = ReviewInput { rating: 5, comment: "enak".into() };
    /// tokio_test::block_on(svc.submit_review(1, AuthorRef(42), review)).unwrap();
    /// assert_eq!(repo.product(1).unwrap().rating, 5.0);
    /// ```
    #[instrument(skip(self, input), fields(author = author.0, rating = input.rating))]
    pub async fn submit_review(&self, product_id: i64, author: AuthorRef, input: ReviewInput) -> Result<MutationResult, ServiceError> {
        if product_id <= 0 {
            return Err(ServiceError::Validation("invalid id".into()));
        }
        input.validate().map_err(|e| ServiceError::invalid("invalid request", e))?;

        self.products
            .get_product(product_id)
            .await
            .map_err(|e| ServiceError::internal("error when get product", e))?
            .ok_or_else(|| ServiceError::not_found("product"))?;

        // products are never deleted, so the lookup may run unlocked
        let _guard = self.review_locks.acquire(product_id).await;

        // before the insert, so the new review is not counted twice
        let statistic = self
            .reviews
            .get_review_statistic(product_id)
            .await
            .map_err(|e| ServiceError::internal("error when get statistic review", e))?
            .unwrap_or_default();

        let rating = input.rating;
        self.reviews
            .insert_review(NewReview { author, product_id, rating, comment: input.comment })
            .await
            .map_err(|e| ServiceError::internal("error when insert review", e))?;

        let new_rating = incremental_mean(statistic, rating);
        self.products
            .update_product_rating(product_id, new_rating)
            .await
            .map_err(|e| ServiceError::internal("error when update product rating", e))?;

        info!(previous_count = statistic.count, new_rating, "review_submitted");
        Ok(MutationResult::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{Category, Product};
    use crate::catalog::repository::mock::MockCatalogRepository;
    use crate::errors::ErrorKind;
    use chrono::Utc;

    fn product(id: i64, rating: f64) -> Product {
        Product {
            id,
            sku: format!("SKU{id}"),
            title: "Rendang".into(),
            description: "Slow-cooked beef".into(),
            category: Category { id: 1, name: "Food".into() },
            image_url: "https://img.example.com/rendang.png".into(),
            weight: 250,
            price: 45_000,
            rating,
            created_at: Utc::now(),
        }
    }

    fn service(repo: &Arc<MockCatalogRepository>) -> CatalogService {
        CatalogService::new(repo.clone(), repo.clone(), repo.clone())
    }

    fn review(rating: i32) -> ReviewInput {
        ReviewInput { rating, comment: "mantap".into() }
    }

    #[test]
    fn incremental_mean_matches_worked_example() {
        let rating = incremental_mean(Statistic { count: 10, average: 3.0 }, 4);
        assert_eq!(rating, 34.0 / 11.0);
        assert!((rating - 3.090_909_090_9).abs() < 1e-9);
    }

    #[test]
    fn incremental_mean_from_nothing_is_the_rating() {
        assert_eq!(incremental_mean(Statistic::default(), 5), 5.0);
        assert_eq!(incremental_mean(Statistic { count: 0, average: 0.0 }, 1), 1.0);
    }

    #[tokio::test]
    async fn first_review_sets_rating() {
        let repo = Arc::new(MockCatalogRepository::default().with_product(product(1, 0.0)));
        let res = service(&repo).submit_review(1, AuthorRef(7), review(5)).await.unwrap();
        assert!(res.success);

        assert_eq!(repo.product(1).unwrap().rating, 5.0);
        let stored = repo.reviews_for(1);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].author, AuthorRef(7));
        assert_eq!(stored[0].rating, 5);
        assert_eq!(stored[0].comment, "mantap");
    }

    #[tokio::test]
    async fn rating_folds_in_existing_reviews() {
        let existing = [3; 10];
        let repo = Arc::new(MockCatalogRepository::default().with_product(product(1, 3.0)).with_reviews(1, &existing));
        service(&repo).submit_review(1, AuthorRef(1), review(4)).await.unwrap();
        assert_eq!(repo.product(1).unwrap().rating, 34.0 / 11.0);
    }

    #[tokio::test]
    async fn rejects_bad_id_and_rating_without_io() {
        let repo = Arc::new(MockCatalogRepository::default().with_product(product(1, 0.0)));
        let svc = service(&repo);

        let err = svc.submit_review(0, AuthorRef(1), review(3)).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid id");
        for rating in [0, 6] {
            let err = svc.submit_review(1, AuthorRef(1), review(rating)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.to_string(), "invalid request: invalid rating range");
        }
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let repo = Arc::new(MockCatalogRepository::default());
        let err = service(&repo).submit_review(5, AuthorRef(1), review(3)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(repo.reviews_for(5).is_empty());
    }

    #[tokio::test]
    async fn store_failures_are_internal() {
        for op in ["get_product", "get_review_statistic", "insert_review", "update_product_rating"] {
            let repo = Arc::new(MockCatalogRepository::default().with_product(product(1, 0.0)));
            repo.fail_on(op);
            let err = service(&repo).submit_review(1, AuthorRef(1), review(4)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Internal, "{op}");
        }
    }

    #[tokio::test]
    async fn failed_rating_write_keeps_the_review() {
        let repo = Arc::new(MockCatalogRepository::default().with_product(product(1, 0.0)));
        repo.fail_on("update_product_rating");
        assert!(service(&repo).submit_review(1, AuthorRef(1), review(4)).await.is_err());
        assert_eq!(repo.reviews_for(1).len(), 1);
        assert_eq!(repo.product(1).unwrap().rating, 0.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_keep_every_contribution() {
        let repo = Arc::new(MockCatalogRepository::default().with_product(product(1, 0.0)).with_product(product(2, 0.0)));
        let svc = Arc::new(service(&repo));

        let ratings: Vec<i32> = (0..40).map(|i| i % 5 + 1).collect();
        let mut handles = Vec::new();
        for (i, &rating) in ratings.iter().enumerate() {
            let svc = svc.clone();
            let product_id = if i % 2 == 0 { 1 } else { 2 };
            handles.push(tokio::spawn(async move {
                svc.submit_review(product_id, AuthorRef(i as i64), review(rating)).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        for product_id in [1, 2] {
            let reviews = repo.reviews_for(product_id);
            assert_eq!(reviews.len(), 20);
            let mean = reviews.iter().map(|r| f64::from(r.rating)).sum::<f64>() / reviews.len() as f64;
            let rating = repo.product(product_id).unwrap().rating;
            assert!((rating - mean).abs() < 1e-9, "product {product_id}: {rating} vs {mean}");
        }
    }

    #[tokio::test]
    async fn lock_map_is_empty_after_submissions() {
        let repo = Arc::new(MockCatalogRepository::default().with_product(product(1, 0.0)));
        let svc = service(&repo);

        for id in 100..1_100 {
            let err = svc.submit_review(id, AuthorRef(1), review(3)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
        assert_eq!(svc.review_locks.inner.len(), 0);

        svc.submit_review(1, AuthorRef(1), review(4)).await.unwrap();
        repo.fail_on("insert_review");
        assert!(svc.submit_review(1, AuthorRef(2), review(2)).await.is_err());
        assert_eq!(svc.review_locks.inner.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn lock_entry_survives_while_contended() {
        let locks = Arc::new(ProductLocks::default());
        let first = locks.acquire(9).await;

        let (release, released) = tokio::sync::oneshot::channel::<()>();
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _second = locks.acquire(9).await;
                let _ = released.await;
            })
        };
        // let the waiter clone the mutex out of the map
        while Arc::strong_count(&locks.inner.get(&9).unwrap()) < 3 {
            tokio::task::yield_now().await;
        }
        drop(first);
        assert!(locks.inner.contains_key(&9));

        release.send(()).unwrap();
        waiter.await.unwrap();
        assert!(locks.inner.is_empty());
    }

    #[test]
    fn placeholder_author_stays_in_range() {
        for _ in 0..1_000 {
            let AuthorRef(id) = AuthorRef::placeholder();
            assert!((0..777_777).contains(&id));
        }
    }
}
