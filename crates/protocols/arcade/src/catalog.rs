//! Listings and collection catalog helpers

use arcade_client::{ApiCollection, ApiListing};
use serde::{Deserialize, Serialize};

/// Verified collection entry kept in the collections snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    pub name: String,
}

/// Listings with `listingId >= min_listing_id`, in API order
pub fn filter_listings(listings: Vec<ApiListing>, min_listing_id: u64) -> Vec<ApiListing> {
    listings
        .into_iter()
        .filter(|l| l.listing_id >= min_listing_id)
        .collect()
}

pub fn verified_collections(collections: Vec<ApiCollection>) -> Vec<CollectionEntry> {
    collections
        .into_iter()
        .filter(|c| c.is_verified)
        .map(|c| CollectionEntry {
            id: c.id,
            name: c.name,
        })
        .collect()
}

/// Display name for a collection address (case-insensitive match)
pub fn collection_name<'a>(entries: &'a [CollectionEntry], address: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|e| e.id.eq_ignore_ascii_case(address.trim()))
        .map(|e| e.name.as_str())
}
