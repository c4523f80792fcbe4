//! Source traits.
//!
//! Both collaborators are async and object-free: callers are generic over
//! the implementation so tests can substitute in-memory sources.

use std::future::Future;

use super::types::{AdminUnit, AssetPage, PageRequest, RegionBoundary, RegionLevel, SourceError};

/// A paged listing of emission assets.
pub trait AssetSource: Send + Sync {
    /// Fetch one page. An empty page signals the end of the listing.
    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<AssetPage, SourceError>> + Send;
}

/// Administrative-unit search and boundary lookup.
pub trait RegionSource: Send + Sync {
    /// Search units by name at a level.
    fn search_admins(
        &self,
        name: &str,
        level: RegionLevel,
    ) -> impl Future<Output = Result<Vec<AdminUnit>, SourceError>> + Send;

    /// Fetch and decode the boundary of one unit.
    fn fetch_boundary(
        &self,
        admin_id: &str,
    ) -> impl Future<Output = Result<RegionBoundary, SourceError>> + Send;
}
