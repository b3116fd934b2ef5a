use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Category reference as it appears on the wire: `{id, name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

/// Product payload accepted by create and update.
///
/// `id` and `rating` are accepted and ignored: identity comes from the path
/// and the rating is derived from reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductInput {
    pub sku: String,
    pub title: String,
    pub description: String,
    pub category: CategoryRef,
    pub image_url: String,
    pub weight: i32,
    pub price: i64,
}

/// Product as returned to callers, with the denormalized category name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i64,
    pub sku: String,
    pub title: String,
    pub description: String,
    pub category: CategoryRef,
    pub image_url: String,
    pub weight: i32,
    pub price: i64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            sku: p.sku,
            title: p.title,
            description: p.description,
            category: CategoryRef { id: p.category.id, name: p.category.name },
            image_url: p.image_url,
            weight: p.weight,
            price: p.price,
            rating: p.rating,
            created_at: p.created_at,
        }
    }
}

/// Listing parameters as received from the caller. Empty strings and zero
/// numbers mean "unspecified"; `validate` fills page and size defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListFilter {
    pub search: String,
    pub category_id: i64,
    pub sort_column: String,
    pub sort_type: String,
    pub page: i64,
    pub size: i64,
}

/// Review payload: `{rating, comment}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewInput {
    pub rating: i32,
    pub comment: String,
}

/// Identity a review is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorRef(pub i64);

impl AuthorRef {
    /// Pseudo-random author id in `[0, 777777)`.
    ///
    /// Stand-in used while no authentication layer supplies a real identity.
    /// Not suitable for production: two submissions by one person get unrelated ids.
    pub fn placeholder() -> Self {
        AuthorRef(rand::thread_rng().gen_range(0..777_777))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Stored product, as read back from a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub image_url: String,
    pub weight: i32,
    pub price: i64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Row to insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub sku: String,
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub image_url: String,
    pub weight: i32,
    pub price: i64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

/// The only columns an update may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChanges {
    pub sku: String,
    pub title: String,
    pub description: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    CreatedAt,
    Rating,
}

impl SortColumn {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created_at" => Some(SortColumn::CreatedAt),
            "rating" => Some(SortColumn::Rating),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortType {
    #[default]
    Asc,
    Desc,
}

impl SortType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortType::Asc),
            "desc" => Some(SortType::Desc),
            _ => None,
        }
    }
}

/// Listing query in repository terms.
///
/// `sort_column: None` leaves the order to the store. `sort_type: None` with a
/// column means the store default, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: String,
    pub category_id: i64,
    pub sort_column: Option<SortColumn>,
    pub sort_type: Option<SortType>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub author: AuthorRef,
    pub product_id: i64,
    pub rating: i32,
    pub comment: String,
}

/// Count and mean of a product's review ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistic {
    pub count: i64,
    pub average: f64,
}
