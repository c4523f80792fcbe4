//! End-to-end inventory requests against in-memory sources.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use emitscope::admin_cache::AdminCache;
use emitscope::clock::ManualClock;
use emitscope::collect::{CollectBudget, SilentReporter, StopReason};
use emitscope::inventory::{InventoryResult, InventoryScope};
use emitscope::query::RawQuery;
use emitscope::service::{InventoryError, InventoryService, ServiceConfig};
use emitscope::source::{
    AdminUnit, AssetPage, AssetSource, EmissionAsset, GasQuantity, PageRequest, RegionBoundary,
    RegionLevel, RegionSource, SourceError,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

const MISIONES: &str = "ARG.14_1";

fn asset(point: (f64, f64), sector: &str, value: f64) -> EmissionAsset {
    EmissionAsset {
        id: None,
        name: None,
        sector: sector.to_string(),
        centroid: Some(point),
        emissions: vec![GasQuantity {
            gas: "co2e_100yr".to_string(),
            quantity: Some(value),
        }],
    }
}

fn polygon(ring: &[(f64, f64)]) -> Value {
    let coordinates: Vec<Value> = ring.iter().map(|(x, y)| json!([x, y])).collect();
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {
                "Name": "Misiones",
                "FullName": "Misiones, ARG",
                "Gid0": "ARG"
            },
            "geometry": { "type": "Polygon", "coordinates": [coordinates] }
        }]
    })
}

fn unit_square() -> Value {
    polygon(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])
}

/// Asset pages served by offset, then empty pages.
#[derive(Default)]
struct MockAssets {
    pages: Vec<Vec<EmissionAsset>>,
    offsets: Mutex<Vec<usize>>,
    fail_status: Option<u16>,
    advance: Option<(Arc<ManualClock>, Duration)>,
    cancel_on_fetch: Option<CancellationToken>,
}

impl MockAssets {
    fn new(pages: Vec<Vec<EmissionAsset>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    fn fetches(&self) -> usize {
        self.offsets.lock().len()
    }
}

impl AssetSource for MockAssets {
    async fn fetch_page(&self, request: &PageRequest) -> Result<AssetPage, SourceError> {
        self.offsets.lock().push(request.offset);
        if let Some((clock, step)) = &self.advance {
            clock.advance(*step);
        }
        if let Some(token) = &self.cancel_on_fetch {
            token.cancel();
        }
        if let Some(status) = self.fail_status {
            return Err(SourceError::Http {
                status,
                url: "mock://assets".to_string(),
                detail: Some("upstream failure".to_string()),
            });
        }
        let index = request.offset / request.limit;
        Ok(AssetPage {
            assets: self.pages.get(index).cloned().unwrap_or_default(),
        })
    }
}

/// Admin search results and boundaries keyed by id.
struct MockRegions {
    units: Vec<AdminUnit>,
    boundaries: HashMap<String, Value>,
    searches: AtomicUsize,
}

impl MockRegions {
    fn with_boundary(geojson: Value) -> Self {
        let unit = AdminUnit {
            id: MISIONES.to_string(),
            name: "Misiones".to_string(),
            full_name: "Misiones, ARG".to_string(),
            country: Some("ARG".to_string()),
        };
        Self {
            units: vec![unit],
            boundaries: HashMap::from([(MISIONES.to_string(), geojson)]),
            searches: AtomicUsize::new(0),
        }
    }

    fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

impl RegionSource for MockRegions {
    async fn search_admins(
        &self,
        name: &str,
        _level: RegionLevel,
    ) -> Result<Vec<AdminUnit>, SourceError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .units
            .iter()
            .filter(|u| u.name.eq_ignore_ascii_case(name))
            .cloned()
            .collect())
    }

    async fn fetch_boundary(&self, admin_id: &str) -> Result<RegionBoundary, SourceError> {
        let geojson = self
            .boundaries
            .get(admin_id)
            .ok_or_else(|| SourceError::Http {
                status: 404,
                url: format!("mock://admins/{}/geojson", admin_id),
                detail: None,
            })?;
        Ok(RegionBoundary::from_geojson(admin_id, geojson)?)
    }
}

type TestService = InventoryService<MockAssets, MockRegions, Arc<ManualClock>>;

fn service_with(
    assets: MockAssets,
    regions: MockRegions,
    clock: Arc<ManualClock>,
    budget: CollectBudget,
) -> TestService {
    let cache = Arc::new(AdminCache::new(Duration::from_secs(600), clock.clone()));
    let config = ServiceConfig {
        budget,
        ..ServiceConfig::default()
    };
    InventoryService::new(assets, regions, clock, cache, config)
}

fn service(assets: MockAssets, regions: MockRegions) -> TestService {
    service_with(
        assets,
        regions,
        Arc::new(ManualClock::new()),
        CollectBudget::default(),
    )
}

fn by_name(name: &str) -> RawQuery<'_> {
    RawQuery {
        name: Some(name),
        year: Some("2022"),
        ..Default::default()
    }
}

async fn run(
    service: &TestService,
    raw: &RawQuery<'_>,
) -> Result<InventoryResult, InventoryError> {
    service
        .run_raw(raw, &CancellationToken::new(), &SilentReporter)
        .await
}

#[tokio::test]
async fn test_region_filter_and_bunker_exclusion() {
    let assets = MockAssets::new(vec![vec![
        asset((5.0, 5.0), "road-transportation", 100.0),
        asset((50.0, 50.0), "road-transportation", 999.0),
        asset((1.0, 1.0), "international-aviation", 50.0),
    ]]);
    let service = service(assets, MockRegions::with_boundary(unit_square()));

    let result = run(&service, &by_name("Misiones")).await.unwrap();

    assert_eq!(result.diagnostics.collection.in_region, 2);
    assert_eq!(result.totals.restricted, 100.0);
    assert_eq!(result.totals.extended, 100.0);
    assert_eq!(result.totals.stock_change, 0.0);
    assert_eq!(result.totals.international_bunkers, 50.0);
    assert_eq!(result.total, 100.0);
    assert_eq!(result.scope, InventoryScope::Ipcc);

    assert_eq!(result.sectors.len(), 1);
    assert_eq!(result.sectors[0].ipcc_code, "1");
    assert_eq!(result.sectors[0].subsectors[0].ipcc_code, Some("1.A.3.b"));
    assert_eq!(result.memo_items.len(), 1);
    assert_eq!(result.memo_items[0].total, 50.0);

    assert_eq!(result.region.admin_id, MISIONES);
    assert_eq!(result.region.full_name, "Misiones, ARG");
    assert_eq!(result.region.parent_code.as_deref(), Some("ARG"));
    assert!(!result.is_truncated());
}

#[tokio::test]
async fn test_extended_scope_with_bunkers_enabled() {
    let assets = MockAssets::new(vec![vec![
        asset((5.0, 5.0), "road-transportation", 100.0),
        asset((1.0, 1.0), "international-aviation", 50.0),
    ]]);
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(AdminCache::new(Duration::from_secs(600), clock.clone()));
    let mut config = ServiceConfig::default();
    config.policy.extended_includes_bunkers = true;
    let service = InventoryService::new(
        assets,
        MockRegions::with_boundary(unit_square()),
        clock,
        cache,
        config,
    );

    let raw = RawQuery {
        scope: Some("extended"),
        ..by_name("Misiones")
    };
    let result = run(&service, &raw).await.unwrap();

    assert_eq!(result.totals.restricted, 100.0);
    assert_eq!(result.totals.extended, 150.0);
    assert_eq!(result.total, 150.0);
    let sector_sum: f64 = result.sectors.iter().map(|s| s.total).sum();
    assert_eq!(sector_sum, result.total);
}

#[tokio::test]
async fn test_max_assets_truncates() {
    let assets = MockAssets::new(vec![
        vec![
            asset((1.0, 1.0), "road-transportation", 10.0),
            asset((2.0, 2.0), "road-transportation", 20.0),
        ],
        vec![
            asset((3.0, 3.0), "road-transportation", 30.0),
            asset((4.0, 4.0), "road-transportation", 40.0),
        ],
    ]);
    let budget = CollectBudget::unlimited()
        .with_page_size(2)
        .with_max_assets(Some(1));
    let service = service_with(
        assets,
        MockRegions::with_boundary(unit_square()),
        Arc::new(ManualClock::new()),
        budget,
    );

    let result = run(&service, &by_name("Misiones")).await.unwrap();

    let report = &result.diagnostics.collection;
    assert!(report.truncated);
    assert_eq!(report.stopped_by, Some(StopReason::MaxAssets));
    assert_eq!(report.aggregated, 1);
    assert_eq!(result.total, 10.0);
    assert!(result.is_truncated());
}

#[tokio::test]
async fn test_max_pages_stops_paging() {
    let pages = (0..5)
        .map(|i| vec![asset((1.0, 1.0 + i as f64), "cement", 1.0)])
        .collect();
    let budget = CollectBudget::unlimited()
        .with_page_size(1)
        .with_max_pages(Some(3));
    let service = service_with(
        MockAssets::new(pages),
        MockRegions::with_boundary(unit_square()),
        Arc::new(ManualClock::new()),
        budget,
    );

    let result = run(&service, &by_name("Misiones")).await.unwrap();

    let report = &result.diagnostics.collection;
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.stopped_by, Some(StopReason::MaxPages));
    assert_eq!(result.total, 3.0);
}

#[tokio::test]
async fn test_timeout_keeps_partial_totals() {
    let clock = Arc::new(ManualClock::new());
    let pages = (0..4)
        .map(|_| vec![asset((5.0, 5.0), "cement", 2.0)])
        .collect();
    let assets = MockAssets {
        advance: Some((clock.clone(), Duration::from_secs(4))),
        ..MockAssets::new(pages)
    };
    let budget = CollectBudget::unlimited()
        .with_page_size(1)
        .with_timeout(Some(Duration::from_secs(10)));
    let service = service_with(
        assets,
        MockRegions::with_boundary(unit_square()),
        clock,
        budget,
    );

    let result = run(&service, &by_name("Misiones")).await.unwrap();

    let report = &result.diagnostics.collection;
    assert_eq!(report.stopped_by, Some(StopReason::Timeout));
    assert!(report.truncated);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(result.total, 6.0);
    assert_eq!(report.elapsed_ms, 12_000);
}

#[tokio::test]
async fn test_cancel_before_start() {
    let service = service(
        MockAssets::new(vec![vec![asset((5.0, 5.0), "cement", 1.0)]]),
        MockRegions::with_boundary(unit_square()),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = service
        .run_raw(&by_name("Misiones"), &cancel, &SilentReporter)
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::Cancelled));
    assert_eq!(service.regions_searched(), 0);
}

#[tokio::test]
async fn test_cancel_during_collection_discards_results() {
    let cancel = CancellationToken::new();
    let assets = MockAssets {
        cancel_on_fetch: Some(cancel.clone()),
        ..MockAssets::new(vec![
            vec![asset((5.0, 5.0), "cement", 1.0)],
            vec![asset((6.0, 6.0), "cement", 1.0)],
        ])
    };
    let budget = CollectBudget::unlimited().with_page_size(1);
    let service = service_with(
        assets,
        MockRegions::with_boundary(unit_square()),
        Arc::new(ManualClock::new()),
        budget,
    );

    let err = service
        .run_raw(&by_name("Misiones"), &cancel, &SilentReporter)
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::Cancelled));
    assert_eq!(err.status_code(), 499);
}

#[tokio::test]
async fn test_upstream_failure_returns_no_partial_result() {
    let assets = MockAssets {
        fail_status: Some(503),
        ..MockAssets::new(vec![vec![asset((5.0, 5.0), "cement", 1.0)]])
    };
    let service = service(assets, MockRegions::with_boundary(unit_square()));

    let err = run(&service, &by_name("Misiones")).await.unwrap_err();

    assert!(matches!(err, InventoryError::Upstream(ref e) if e.status() == Some(503)));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_unknown_region_name_not_found() {
    let service = service(
        MockAssets::default(),
        MockRegions::with_boundary(unit_square()),
    );

    let err = run(&service, &by_name("Atlantis")).await.unwrap_err();

    assert!(matches!(err, InventoryError::RegionNotFound(ref what) if what.contains("Atlantis")));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_missing_boundary_not_found() {
    let service = service(
        MockAssets::default(),
        MockRegions::with_boundary(unit_square()),
    );
    let raw = RawQuery {
        admin_id: Some("ARG.99_1"),
        year: Some("2022"),
        ..Default::default()
    };

    let err = run(&service, &raw).await.unwrap_err();

    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_unusable_boundary_is_upstream_class() {
    let point = json!({ "type": "Point", "coordinates": [1.0, 2.0] });
    let service = service(MockAssets::default(), MockRegions::with_boundary(point));

    let err = run(&service, &by_name("Misiones")).await.unwrap_err();

    assert!(matches!(err, InventoryError::InvalidBoundary(_)));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_admin_id_skips_search() {
    let service = service(
        MockAssets::new(vec![vec![asset((5.0, 5.0), "cement", 7.0)]]),
        MockRegions::with_boundary(unit_square()),
    );
    let raw = RawQuery {
        admin_id: Some(MISIONES),
        name: Some("ignored"),
        year: Some("2022"),
        ..Default::default()
    };

    let result = run(&service, &raw).await.unwrap();

    assert_eq!(service.regions_searched(), 0);
    assert_eq!(result.region.name, "Misiones");
    assert_eq!(result.region.country.as_deref(), Some("ARG"));
    assert_eq!(result.total, 7.0);
}

#[tokio::test]
async fn test_admin_search_cached_until_ttl() {
    let clock = Arc::new(ManualClock::new());
    let service = service_with(
        MockAssets::default(),
        MockRegions::with_boundary(unit_square()),
        clock.clone(),
        CollectBudget::default(),
    );

    run(&service, &by_name("Misiones")).await.unwrap();
    run(&service, &by_name("  misiones ")).await.unwrap();
    assert_eq!(service.regions_searched(), 1);
    assert_eq!(service.cache().stats().hits, 1);

    clock.advance(Duration::from_secs(601));
    run(&service, &by_name("Misiones")).await.unwrap();
    assert_eq!(service.regions_searched(), 2);
}

#[tokio::test]
async fn test_swapped_coordinates_recovered() {
    let rectangle = polygon(&[
        (0.0, 20.0),
        (0.0, 30.0),
        (10.0, 30.0),
        (10.0, 20.0),
        (0.0, 20.0),
    ]);
    let assets = MockAssets::new(vec![vec![
        asset((5.0, 25.0), "cement", 1.0),
        asset((25.0, 5.0), "cement", 2.0),
        asset((f64::NAN, 5.0), "cement", 4.0),
    ]]);
    let service = service(assets, MockRegions::with_boundary(rectangle));

    let result = run(&service, &by_name("Misiones")).await.unwrap();

    let report = &result.diagnostics.collection;
    assert_eq!(report.in_region, 2);
    assert_eq!(report.swapped_coordinates, 1);
    assert_eq!(report.dropped_coordinates, 1);
    assert_eq!(result.total, 3.0);
}

#[tokio::test]
async fn test_invalid_query_fetches_nothing() {
    let service = service(
        MockAssets::new(vec![vec![asset((5.0, 5.0), "cement", 1.0)]]),
        MockRegions::with_boundary(unit_square()),
    );
    let raw = RawQuery {
        year: Some("2019-2021"),
        ..by_name("Misiones")
    };

    let err = run(&service, &raw).await.unwrap_err();

    assert!(matches!(err, InventoryError::InvalidQuery(_)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(service.regions_searched(), 0);
    assert_eq!(service.assets_fetched(), 0);
}

#[tokio::test]
async fn test_unmapped_labels_reported() {
    let assets = MockAssets::new(vec![vec![
        asset((5.0, 5.0), "mystery-sector", 4.0),
        asset((6.0, 6.0), "cement", 1.0),
    ]]);
    let service = service(assets, MockRegions::with_boundary(unit_square()));

    let result = run(&service, &by_name("Misiones")).await.unwrap();

    assert_eq!(result.diagnostics.unmapped_sectors, vec!["mystery-sector"]);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["region"]["admin_id"], MISIONES);
    assert!(json["metadata"]["generated_at"].is_string());
}

/// Accessors over the mocks behind a service.
trait MockCounts {
    fn regions_searched(&self) -> usize;
    fn assets_fetched(&self) -> usize;
}

impl MockCounts for TestService {
    fn regions_searched(&self) -> usize {
        self.regions().searches()
    }

    fn assets_fetched(&self) -> usize {
        self.assets().fetches()
    }
}
