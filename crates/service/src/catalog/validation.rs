//! Request validators. Pure, no I/O.

use thiserror::Error;

use super::domain::{ListFilter, ProductInput, ProductQuery, ReviewInput, SortColumn, SortType};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Column widths of the `product` table, in characters.
pub const MAX_SKU_LEN: usize = 64;
pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_IMAGE_URL_LEN: usize = 512;

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// First rule a payload broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub &'static str);

impl ListFilter {
    /// Check sort parameters and normalize pagination in place.
    ///
    /// Page and size below 1 are not errors; they fall back to
    /// [`DEFAULT_PAGE`] and [`DEFAULT_PAGE_SIZE`].
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if !self.sort_type.is_empty() && SortType::parse(&self.sort_type).is_none() {
            return Err(ValidationError("invalid sort type"));
        }
        if !self.sort_column.is_empty() && SortColumn::parse(&self.sort_column).is_none() {
            return Err(ValidationError("invalid sort column"));
        }
        if self.page <= 0 {
            self.page = DEFAULT_PAGE;
        }
        if self.size <= 0 {
            self.size = DEFAULT_PAGE_SIZE;
        }
        Ok(())
    }

    /// Translate a validated filter to limit/offset terms.
    pub fn to_query(&self) -> ProductQuery {
        ProductQuery {
            search: self.search.clone(),
            category_id: self.category_id,
            sort_column: SortColumn::parse(&self.sort_column),
            sort_type: SortType::parse(&self.sort_type),
            limit: self.size,
            offset: (self.page - 1).saturating_mul(self.size),
        }
    }
}

impl ReviewInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError("invalid rating range"));
        }
        Ok(())
    }
}

impl ProductInput {
    pub fn validate_create(&self) -> Result<(), ValidationError> {
        self.validate_identity()?;
        if self.image_url.is_empty() {
            return Err(ValidationError("empty image url"));
        }
        if too_long(&self.image_url, MAX_IMAGE_URL_LEN) {
            return Err(ValidationError("image url too long"));
        }
        if self.category.id == 0 {
            return Err(ValidationError("empty category id"));
        }
        if self.price == 0 {
            return Err(ValidationError("empty price"));
        }
        Ok(())
    }

    /// Image URL, weight and price are not checked here: update never writes them.
    pub fn validate_update(&self) -> Result<(), ValidationError> {
        self.validate_identity()?;
        if self.category.id == 0 {
            return Err(ValidationError("empty category id"));
        }
        Ok(())
    }

    fn validate_identity(&self) -> Result<(), ValidationError> {
        if self.sku.is_empty() {
            return Err(ValidationError("empty SKU"));
        }
        if self.title.is_empty() {
            return Err(ValidationError("empty title"));
        }
        if self.description.is_empty() {
            return Err(ValidationError("empty description"));
        }
        if too_long(&self.sku, MAX_SKU_LEN) {
            return Err(ValidationError("SKU too long"));
        }
        if too_long(&self.title, MAX_TITLE_LEN) {
            return Err(ValidationError("title too long"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::CategoryRef;

    fn valid_product() -> ProductInput {
        ProductInput {
            sku: "IND001".into(),
            title: "Indomie Goreng".into(),
            description: "Fried instant noodles".into(),
            category: CategoryRef { id: 1, name: String::new() },
            image_url: "https://img.example.com/ind001.png".into(),
            weight: 85,
            price: 3_500,
        }
    }

    #[test]
    fn overlong_fields_are_rejected_before_the_store() {
        let cases: [(fn(&mut ProductInput), &str); 3] = [
            (|p: &mut ProductInput| p.sku = "S".repeat(MAX_SKU_LEN + 1), "SKU too long"),
            (|p: &mut ProductInput| p.title = "t".repeat(MAX_TITLE_LEN + 1), "title too long"),
            (|p: &mut ProductInput| p.image_url = "u".repeat(MAX_IMAGE_URL_LEN + 1), "image url too long"),
        ];
        for (mutate, msg) in cases {
            let mut p = valid_product();
            mutate(&mut p);
            assert_eq!(p.validate_create(), Err(ValidationError(msg)));
        }

        let mut p = valid_product();
        p.title = "t".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(p.validate_update(), Err(ValidationError("title too long")));

        // widths count characters, not bytes
        let mut p = valid_product();
        p.sku = "é".repeat(MAX_SKU_LEN);
        p.image_url = "u".repeat(MAX_IMAGE_URL_LEN + 1);
        assert!(p.validate_update().is_ok());
    }

    #[test]
    fn filter_rejects_unknown_sort_type() {
        for bad in ["ASC", "ascending", "up", " "] {
            let mut f = ListFilter { sort_type: bad.into(), ..Default::default() };
            assert_eq!(f.validate(), Err(ValidationError("invalid sort type")), "{bad:?}");
        }
    }

    #[test]
    fn filter_rejects_unknown_sort_column() {
        for bad in ["price", "createdAt", "title", "RATING"] {
            let mut f = ListFilter { sort_column: bad.into(), ..Default::default() };
            assert_eq!(f.validate(), Err(ValidationError("invalid sort column")), "{bad:?}");
        }
    }

    #[test]
    fn filter_accepts_every_known_sort() {
        for column in ["", "created_at", "rating"] {
            for sort_type in ["", "asc", "desc"] {
                let mut f = ListFilter { sort_column: column.into(), sort_type: sort_type.into(), ..Default::default() };
                assert!(f.validate().is_ok(), "{column:?} {sort_type:?}");
            }
        }
    }

    #[test]
    fn filter_sort_type_is_checked_before_column() {
        let mut f = ListFilter { sort_column: "price".into(), sort_type: "sideways".into(), ..Default::default() };
        assert_eq!(f.validate(), Err(ValidationError("invalid sort type")));
    }

    #[test]
    fn filter_normalizes_non_positive_paging() {
        for (page, size) in [(0, 0), (-3, -1), (i64::MIN, 0)] {
            let mut f = ListFilter { page, size, ..Default::default() };
            f.validate().unwrap();
            assert_eq!((f.page, f.size), (DEFAULT_PAGE, DEFAULT_PAGE_SIZE));
        }

        let mut f = ListFilter { page: 3, size: 25, ..Default::default() };
        f.validate().unwrap();
        assert_eq!((f.page, f.size), (3, 25));
    }

    #[test]
    fn empty_filter_becomes_first_page_of_ten() {
        let mut f = ListFilter::default();
        f.validate().unwrap();
        let q = f.to_query();
        assert_eq!(q.limit, 10);
        assert_eq!(q.offset, 0);
        assert_eq!(q.search, "");
        assert_eq!(q.category_id, 0);
        assert_eq!(q.sort_column, None);
        assert_eq!(q.sort_type, None);
    }

    #[test]
    fn offset_is_page_minus_one_times_size() {
        let mut f = ListFilter {
            search: "IND".into(),
            category_id: 4,
            sort_column: "rating".into(),
            sort_type: "desc".into(),
            page: 3,
            size: 20,
        };
        f.validate().unwrap();
        let q = f.to_query();
        assert_eq!(q.offset, 40);
        assert_eq!(q.limit, 20);
        assert_eq!(q.sort_column, Some(SortColumn::Rating));
        assert_eq!(q.sort_type, Some(SortType::Desc));
        assert_eq!(q.category_id, 4);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let mut f = ListFilter { page: i64::MAX, size: 10, ..Default::default() };
        f.validate().unwrap();
        let q = f.to_query();
        assert_eq!(q.offset, i64::MAX);
        assert_eq!(q.limit, 10);
    }

    #[test]
    fn review_rating_bounds() {
        for rating in [i32::MIN, -1, 0, 6, 10] {
            let r = ReviewInput { rating, comment: String::new() };
            assert_eq!(r.validate(), Err(ValidationError("invalid rating range")), "{rating}");
        }
        for rating in 1..=5 {
            let r = ReviewInput { rating, comment: String::new() };
            assert!(r.validate().is_ok(), "{rating}");
        }
    }

    #[test]
    fn create_requires_every_field() {
        assert!(valid_product().validate_create().is_ok());

        let cases: [(fn(&mut ProductInput), &str); 6] = [
            (|p: &mut ProductInput| p.sku.clear(), "empty SKU"),
            (|p: &mut ProductInput| p.title.clear(), "empty title"),
            (|p: &mut ProductInput| p.description.clear(), "empty description"),
            (|p: &mut ProductInput| p.image_url.clear(), "empty image url"),
            (|p: &mut ProductInput| p.category.id = 0, "empty category id"),
            (|p: &mut ProductInput| p.price = 0, "empty price"),
        ];
        for (break_it, expected) in cases {
            let mut p = valid_product();
            break_it(&mut p);
            assert_eq!(p.validate_create(), Err(ValidationError(expected)));
        }
    }

    #[test]
    fn update_ignores_image_url_weight_and_price() {
        let p = ProductInput { image_url: String::new(), price: 0, weight: 0, ..valid_product() };
        assert!(p.validate_update().is_ok());
        assert!(p.validate_create().is_err());
    }

    #[test]
    fn update_still_requires_identity_and_category() {
        let cases: [(fn(&mut ProductInput), &str); 4] = [
            (|p: &mut ProductInput| p.sku.clear(), "empty SKU"),
            (|p: &mut ProductInput| p.title.clear(), "empty title"),
            (|p: &mut ProductInput| p.description.clear(), "empty description"),
            (|p: &mut ProductInput| p.category.id = 0, "empty category id"),
        ];
        for (break_it, expected) in cases {
            let mut p = valid_product();
            break_it(&mut p);
            assert_eq!(p.validate_update(), Err(ValidationError(expected)));
        }
    }
}
