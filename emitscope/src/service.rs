//! End-to-end inventory requests.
//!
//! [`InventoryService`] wires the pieces together for one request:
//!
//! 1. Validate the query (before anything is fetched)
//! 2. Resolve the region name to an admin unit (cache, then search)
//! 3. Fetch and decode the admin boundary
//! 4. Collect and aggregate in-region assets under the budget
//! 5. Assemble the [`InventoryResult`]
//!
//! Requests share nothing mutable except the admin cache. Each request owns
//! its classifier and aggregator, and drops them if it fails or is
//! cancelled.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::admin_cache::AdminCache;
use crate::clock::Clock;
use crate::collect::{collect, CollectBudget, CollectError, CollectRequest, ProgressReporter};
use crate::geometry::Region;
use crate::inventory::{InventoryResult, RegionDescriptor, ResultContext, ScopePolicy};
use crate::query::{InventoryQuery, QueryDefaults, QueryError, RawQuery, RegionRef};
use crate::source::{
    parent_gid, pick_candidate, AdminUnit, AssetSource, RegionBoundary, RegionLevel, RegionSource,
    SourceError, DEFAULT_COUNTRY,
};
use crate::taxonomy::Classifier;

/// Errors returned to the caller of an inventory request.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{0}")]
    InvalidQuery(#[from] QueryError),

    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Climate TRACE API unavailable: {0}")]
    Upstream(SourceError),

    #[error("Region boundary is unusable: {0}")]
    InvalidBoundary(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl InventoryError {
    /// HTTP-style status for the error class.
    pub fn status_code(&self) -> u16 {
        match self {
            InventoryError::InvalidQuery(_) => 400,
            InventoryError::RegionNotFound(_) => 404,
            InventoryError::Upstream(_) | InventoryError::InvalidBoundary(_) => 502,
            InventoryError::Cancelled => 499,
        }
    }

    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<SourceError> for InventoryError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidGeometry(e) => InventoryError::InvalidBoundary(e.to_string()),
            other => InventoryError::Upstream(other),
        }
    }
}

impl From<CollectError> for InventoryError {
    fn from(err: CollectError) -> Self {
        match err {
            CollectError::Upstream(e) => InventoryError::Upstream(e),
            CollectError::Cancelled => InventoryError::Cancelled,
        }
    }
}

/// Settings shared by every request of a service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// ISO3 country whose assets are listed.
    pub country: String,
    pub budget: CollectBudget,
    pub policy: ScopePolicy,
    pub defaults: QueryDefaults,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            budget: CollectBudget::default(),
            policy: ScopePolicy::default(),
            defaults: QueryDefaults::default(),
        }
    }
}

/// Runs inventory requests against an asset source and a region source.
pub struct InventoryService<A, R, C>
where
    A: AssetSource,
    R: RegionSource,
    C: Clock + Clone,
{
    assets: A,
    regions: R,
    clock: C,
    cache: Arc<AdminCache<C>>,
    config: ServiceConfig,
}

impl<A, R, C> InventoryService<A, R, C>
where
    A: AssetSource,
    R: RegionSource,
    C: Clock + Clone,
{
    pub fn new(
        assets: A,
        regions: R,
        clock: C,
        cache: Arc<AdminCache<C>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            assets,
            regions,
            clock,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<AdminCache<C>> {
        &self.cache
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn regions(&self) -> &R {
        &self.regions
    }

    /// Validate raw input and run it.
    pub async fn run_raw<P>(
        &self,
        raw: &RawQuery<'_>,
        cancel: &CancellationToken,
        reporter: &P,
    ) -> Result<InventoryResult, InventoryError>
    where
        P: ProgressReporter + ?Sized,
    {
        let query = InventoryQuery::parse(raw, &self.config.defaults)?;
        self.run(&query, cancel, reporter).await
    }

    /// Run a validated query.
    pub async fn run<P>(
        &self,
        query: &InventoryQuery,
        cancel: &CancellationToken,
        reporter: &P,
    ) -> Result<InventoryResult, InventoryError>
    where
        P: ProgressReporter + ?Sized,
    {
        let unit = match &query.region {
            RegionRef::Name(name) => Some(self.resolve(name, query.level, cancel).await?),
            RegionRef::AdminId(_) => None,
        };
        let admin_id = unit
            .as_ref()
            .map(|u| u.id.clone())
            .unwrap_or_else(|| query.region.as_str().to_string());

        let boundary = self.boundary(&admin_id, cancel).await?;
        let region = Region::new(boundary.geometry.clone());
        let descriptor = describe(&admin_id, query.level, unit.as_ref(), &boundary);

        info!(
            admin_id = %descriptor.admin_id,
            region = %descriptor.full_name,
            vertices = region.geometry().vertex_count(),
            "Region resolved"
        );

        let mut classifier = Classifier::new();
        let request = CollectRequest {
            country: self.config.country.clone(),
            year: query.year,
            gas: query.gas,
        };
        let collection = collect(
            &self.assets,
            &request,
            &region,
            &mut classifier,
            &self.config.budget,
            &self.clock,
            cancel,
            reporter,
        )
        .await?;

        let unmapped = classifier.into_unmapped();
        if !unmapped.is_empty() {
            warn!(count = unmapped.len(), "Unmapped sector labels in result");
        }

        let context = ResultContext {
            region: descriptor,
            year: query.year,
            gas: query.gas,
            scope: query.scope,
            policy: self.config.policy,
            generated_at: chrono::Utc::now(),
        };
        Ok(InventoryResult::assemble(
            context,
            &collection.aggregator,
            unmapped,
            collection.report,
        ))
    }

    /// Admin units matching a name, through the cache.
    pub async fn search(
        &self,
        name: &str,
        level: RegionLevel,
        cancel: &CancellationToken,
    ) -> Result<Vec<AdminUnit>, InventoryError> {
        if let Some(units) = self.cache.get(level, name) {
            return Ok(units);
        }
        let units = cancellable(cancel, self.regions.search_admins(name, level)).await?;
        self.cache.insert(level, name, units.clone());
        Ok(units)
    }

    async fn resolve(
        &self,
        name: &str,
        level: RegionLevel,
        cancel: &CancellationToken,
    ) -> Result<AdminUnit, InventoryError> {
        let units = self.search(name, level, cancel).await?;
        pick_candidate(&units, &self.config.country, level)
            .cloned()
            .ok_or_else(|| InventoryError::RegionNotFound(format!("{} ({})", name, level)))
    }

    async fn boundary(
        &self,
        admin_id: &str,
        cancel: &CancellationToken,
    ) -> Result<RegionBoundary, InventoryError> {
        cancellable(cancel, self.regions.fetch_boundary(admin_id))
            .await
            .map_err(|err| match err {
                InventoryError::Upstream(e) if e.is_not_found() => {
                    InventoryError::RegionNotFound(admin_id.to_string())
                }
                other => other,
            })
    }
}

/// Await a source call unless the request is cancelled first.
async fn cancellable<T, F>(cancel: &CancellationToken, call: F) -> Result<T, InventoryError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    tokio::select! {
        biased;

        _ = cancel.cancelled() => Err(InventoryError::Cancelled),
        result = call => result.map_err(InventoryError::from),
    }
}

fn describe(
    admin_id: &str,
    level: RegionLevel,
    unit: Option<&AdminUnit>,
    boundary: &RegionBoundary,
) -> RegionDescriptor {
    let name = unit
        .map(|u| u.name.clone())
        .or_else(|| boundary.name.clone())
        .unwrap_or_else(|| admin_id.to_string());
    let full_name = unit
        .map(|u| u.full_name.clone())
        .or_else(|| boundary.full_name.clone())
        .unwrap_or_else(|| name.clone());
    let country = unit
        .and_then(|u| u.country.clone())
        .or_else(|| boundary.country.clone());
    RegionDescriptor {
        admin_id: admin_id.to_string(),
        name,
        full_name,
        level,
        country,
        parent_code: parent_gid(admin_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            InventoryError::InvalidQuery(QueryError::MissingRegion).status_code(),
            400
        );
        assert_eq!(InventoryError::RegionNotFound("x".into()).status_code(), 404);
        assert_eq!(
            InventoryError::Upstream(SourceError::Transport("down".into())).status_code(),
            502
        );
        assert_eq!(InventoryError::InvalidBoundary("x".into()).status_code(), 502);
        assert_eq!(InventoryError::Cancelled.status_code(), 499);
        assert!(InventoryError::Cancelled.is_client_error());
        assert!(!InventoryError::InvalidBoundary("x".into()).is_client_error());
    }

    #[test]
    fn test_geometry_errors_map_to_invalid_boundary() {
        let err = InventoryError::from(SourceError::InvalidGeometry(
            GeometryError::MissingOuterRing,
        ));
        assert!(matches!(err, InventoryError::InvalidBoundary(_)));
    }

    #[test]
    fn test_collect_errors_map() {
        assert!(matches!(
            InventoryError::from(CollectError::Cancelled),
            InventoryError::Cancelled
        ));
        assert!(matches!(
            InventoryError::from(CollectError::Upstream(SourceError::Decode("bad".into()))),
            InventoryError::Upstream(_)
        ));
    }
}
