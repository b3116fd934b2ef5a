//! Service layer providing the catalog business rules on top of models.
//! - Separates orchestration from data access through repository traits.
//! - Classifies every failure as validation, not-found or internal.
//! - Ships an in-memory repository for tests and a SeaORM one for production.

pub mod errors;
pub mod catalog;
#[cfg(test)]
pub mod test_support;
