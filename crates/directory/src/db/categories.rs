//! Category membership.
//!
//! Businesses are filed under categories only by explicit assignment from a
//! validated [`Category`] list; nothing is inferred from names or free text.

use std::collections::BTreeSet;

use hausbaum_core::{BusinessId, Category};
use tracing::{instrument, warn};

use super::{business_categories_key, parse_business_members};
use crate::error::LookupError;
use crate::store::{KeyValueStore, WriteBatch};

/// Repository for business category assignments.
#[derive(Debug, Clone)]
pub struct CategoryRepository<S> {
    store: S,
}

impl<S: KeyValueStore> CategoryRepository<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Replace the categories a business is listed under.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    #[instrument(skip(self, business, categories), fields(business = %business))]
    pub async fn assign(
        &self,
        business: &BusinessId,
        categories: impl IntoIterator<Item = Category>,
    ) -> Result<(), LookupError> {
        let wanted: BTreeSet<Category> = categories.into_iter().collect();
        let previous: BTreeSet<Category> = self.categories_of(business).await?.into_iter().collect();
        let member = vec![business.as_str().to_owned()];
        let key = business_categories_key(business);

        let mut batch = WriteBatch::new().delete(key.clone()).set_add(
            key,
            wanted.iter().map(|c| c.id().to_owned()).collect(),
        );
        for stale in previous.difference(&wanted) {
            batch = batch.set_remove(stale.index_key(), member.clone());
        }
        for category in &wanted {
            batch = batch.set_add(category.index_key(), member.clone());
        }

        self.store.apply(batch).await?;
        Ok(())
    }

    /// Categories a business is listed under, in taxonomy order.
    ///
    /// Unknown stored IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn categories_of(&self, business: &BusinessId) -> Result<Vec<Category>, LookupError> {
        let key = business_categories_key(business);
        let mut categories: Vec<Category> = self
            .store
            .set_members(&key)
            .await?
            .into_iter()
            .filter_map(|id| {
                let category = Category::from_id(&id);
                if category.is_none() {
                    warn!(key = %key, id = %id, "Skipping unknown category");
                }
                category
            })
            .collect();
        categories.sort();
        Ok(categories)
    }

    /// Businesses listed under `category`, sorted.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn businesses_in(&self, category: Category) -> Result<Vec<BusinessId>, LookupError> {
        let key = category.index_key();
        let mut ids = parse_business_members(&key, self.store.set_members(&key).await?);
        ids.sort();
        Ok(ids)
    }

    /// Whether `business` is listed under `category`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn is_listed(
        &self,
        business: &BusinessId,
        category: Category,
    ) -> Result<bool, LookupError> {
        Ok(self
            .store
            .set_contains(&category.index_key(), business.as_str())
            .await?)
    }

    /// Remove a business from every category.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::StoreUnavailable` if the store fails.
    pub async fn remove(&self, business: &BusinessId) -> Result<(), LookupError> {
        self.assign(business, std::iter::empty()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn business(s: &str) -> BusinessId {
        BusinessId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_assign_supersedes() {
        let repo = CategoryRepository::new(MemoryStore::new());
        let b1 = business("b1");

        repo.assign(&b1, [Category::Lawyers, Category::PetCare])
            .await
            .unwrap();
        assert_eq!(
            repo.categories_of(&b1).await.unwrap(),
            vec![Category::PetCare, Category::Lawyers]
        );

        repo.assign(&b1, [Category::PetCare]).await.unwrap();
        assert!(repo.businesses_in(Category::Lawyers).await.unwrap().is_empty());
        assert!(repo.is_listed(&b1, Category::PetCare).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = CategoryRepository::new(MemoryStore::new());
        let b1 = business("b1");
        repo.assign(&b1, [Category::Music]).await.unwrap();
        repo.remove(&b1).await.unwrap();

        assert!(repo.categories_of(&b1).await.unwrap().is_empty());
        assert!(repo.businesses_in(Category::Music).await.unwrap().is_empty());
    }
}
