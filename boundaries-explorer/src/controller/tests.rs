use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::backend::{BackendCall, InMemoryBackend};
use crate::log::{LogLevel, MemoryLogger};
use crate::model::{BoundaryDataset, DemographicYear, EntityKind, GeoFeature};
use crate::surface::{PaintProperty, PaintValue, RecordingSurface};

type TestController = MapController<RecordingSurface, InMemoryBackend>;

const CLICK: LngLat = LngLat::new(-99.73, 43.41);

fn square(name: &str, geo_id: &str, west: f64, south: f64) -> GeoFeature {
    GeoFeature {
        id: geo_id.to_string(),
        name: name.to_string(),
        geo_identifier: geo_id.to_string(),
        geometry: json!({
            "type": "Polygon",
            "coordinates": [[
                [west, south], [west + 1.0, south], [west + 1.0, south + 1.0],
                [west, south + 1.0], [west, south]
            ]]
        }),
        properties: Default::default(),
    }
}

fn counties() -> BoundaryDataset {
    BoundaryDataset::new(
        BoundaryKind::Counties,
        vec![
            square("Hughes", "46065", -100.0, 43.0),
            square("Dewey", "46041", -101.0, 43.0),
        ],
    )
}

fn states() -> BoundaryDataset {
    BoundaryDataset::new(
        BoundaryKind::States,
        vec![square("South Dakota", "46", -101.0, 42.5)],
    )
}

fn record(name: &str) -> DemographicRecord {
    DemographicRecord::new(
        EntityKind::County,
        name,
        [2020, 2021].map(DemographicYear::new),
    )
}

fn place(id: &str, with_geometry: bool) -> NearbyPlace {
    NearbyPlace {
        id: id.to_string(),
        name: format!("Place {}", id),
        lat: 43.5,
        lng: -99.5,
        distance_km: 2.5,
        geometry: with_geometry.then(|| {
            json!({
                "type": "Polygon",
                "coordinates": [[[-99.6, 43.4], [-99.4, 43.4], [-99.4, 43.6], [-99.6, 43.4]]]
            })
        }),
    }
}

fn setup(config: ControllerConfig) -> (TestController, InMemoryBackend, Arc<MemoryLogger>) {
    let backend = InMemoryBackend::new();
    backend.insert_dataset(states());
    backend.insert_dataset(counties());
    let logger = Arc::new(MemoryLogger::new());
    let controller = MapController::new(
        RecordingSurface::new(),
        backend.clone(),
        config,
        logger.clone(),
    );
    (controller, backend, logger)
}

async fn loaded(kind: BoundaryKind) -> (TestController, InMemoryBackend, Arc<MemoryLogger>) {
    let (controller, backend, logger) = setup(ControllerConfig::default());
    controller.set_dataset(kind).await.unwrap();
    (controller, backend, logger)
}

fn fill_color(controller: &TestController, layer: &str) -> Option<PaintValue> {
    controller.with_surface(|s| s.paint(layer, PaintProperty::FillColor).cloned())
}

#[tokio::test]
async fn test_set_dataset_installs_layers_and_publishes_names() {
    let (controller, _, _) = loaded(BoundaryKind::Counties).await;

    let state = controller.state();
    assert_eq!(state.kind, Some(BoundaryKind::Counties));
    assert_eq!(state.names.len(), 2);
    controller.with_surface(|s| {
        assert_eq!(
            s.layer_ids(),
            vec!["boundaries-counties-fill", "boundaries-counties-outline"]
        );
        assert_eq!(s.source_ids(), vec!["boundaries-counties"]);
    });
}

#[tokio::test]
async fn test_failed_dataset_load_keeps_previous() {
    let (controller, backend, logger) = loaded(BoundaryKind::States).await;
    backend.fail_dataset(
        BoundaryKind::Regions,
        NetworkError::Http("connection refused".to_string()),
    );

    let result = controller.set_dataset(BoundaryKind::Regions).await;
    assert!(matches!(result, Err(ControllerError::Network(_))));
    assert_eq!(controller.state().kind, Some(BoundaryKind::States));
    assert!(controller.with_surface(|s| s.has_layer("boundaries-states-fill")));
    assert!(logger.contains(LogLevel::Warn, "regions"));
}

#[tokio::test(start_paused = true)]
async fn test_superseded_dataset_load_is_noop() {
    let (controller, backend, _) = setup(ControllerConfig::default());
    backend.set_dataset_delay(BoundaryKind::States, Duration::from_millis(200));
    backend.set_dataset_delay(BoundaryKind::Counties, Duration::from_millis(20));

    let (first, second) = tokio::join!(
        controller.set_dataset(BoundaryKind::States),
        controller.set_dataset(BoundaryKind::Counties),
    );

    assert!(first.unwrap().is_discarded());
    assert_eq!(second.unwrap(), Outcome::Current(()));
    controller.with_surface(|s| {
        assert_eq!(s.source_ids(), vec!["boundaries-counties"]);
        assert!(!s.has_layer("boundaries-states-fill"));
    });
}

#[tokio::test]
async fn test_click_fetches_and_draws_circle() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;
    backend.set_demographics(Ok(Some(record("Hughes"))));
    backend.set_nearby(Ok(vec![place("a", true), place("b", false)]));

    let report = controller.handle_click(CLICK, None).await.unwrap();
    assert_eq!(
        report,
        ClickReport {
            demographics: FetchStatus::Applied,
            nearby: FetchStatus::Applied,
        }
    );

    let state = controller.state();
    assert_eq!(state.selection, Some(SelectionPoint::new(43.41, -99.73)));
    assert_eq!(state.selected_feature.unwrap().geo_identifier, "46065");
    assert_eq!(state.phase, SelectionPhase::Idle);
    assert_eq!(state.demographics.unwrap().name, "Hughes");
    assert_eq!(state.nearby.len(), 2);

    let circle = state.radius_circle.unwrap();
    assert_eq!(circle.center, CLICK);
    assert_eq!(circle.radius_km, 30.0);
    assert_eq!(circle.polygon.len(), 65);

    assert_eq!(controller.overlay_layer_count(), 2);
    controller.with_surface(|s| {
        assert_eq!(s.markers_with_role(MarkerRole::Selection).len(), 1);
        assert_eq!(s.markers_with_role(MarkerRole::Place).len(), 2);
    });

    let calls = backend.calls();
    assert!(calls.contains(&BackendCall::Demographics(DemographicsTarget {
        point: SelectionPoint::new(43.41, -99.73),
        geo_id: Some("46065".to_string()),
    })));
    assert!(calls.iter().any(|c| matches!(
        c,
        BackendCall::NearbyPlaces(q) if q.radius.meters() == 30_000.0 && q.page == 1 && q.limit == 30
    )));
}

#[tokio::test]
async fn test_selection_marker_is_replaced() {
    let (controller, _, _) = loaded(BoundaryKind::Counties).await;

    controller.handle_click(CLICK, None).await.unwrap();
    controller
        .handle_click(LngLat::new(-100.5, 43.5), None)
        .await
        .unwrap();

    controller.with_surface(|s| {
        let selection = s.markers_with_role(MarkerRole::Selection);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].label.as_deref(), Some("Dewey"));
    });
}

#[tokio::test(start_paused = true)]
async fn test_highlight_resets_after_delay() {
    let (controller, _, _) = loaded(BoundaryKind::Counties).await;

    controller.handle_click(CLICK, None).await.unwrap();
    let highlighted = fill_color(&controller, "boundaries-counties-fill").unwrap();
    assert_eq!(highlighted.resolve_color(Some("46065")), Some("#ff8c00"));
    assert!(controller.highlight_pending());

    tokio::time::sleep(Duration::from_millis(301)).await;
    assert_eq!(
        fill_color(&controller, "boundaries-counties-fill"),
        Some(PaintValue::color("#888888"))
    );
    assert!(!controller.highlight_pending());
}

fn unidentified_regions() -> BoundaryDataset {
    let document = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "NAME": "West", "ALAND": 1000 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "East" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 0.0]]]
                }
            }
        ]
    });
    BoundaryDataset::from_geojson(BoundaryKind::Regions, &document).unwrap()
}

#[tokio::test]
async fn test_click_on_feature_without_identifier() {
    let (controller, backend, _) = setup(ControllerConfig::default());
    backend.insert_dataset(unidentified_regions());
    controller.set_dataset(BoundaryKind::Regions).await.unwrap();
    let position = LngLat::new(0.5, 0.5);

    controller.handle_click(position, None).await.unwrap();

    assert_eq!(controller.state().selected_feature.unwrap().name, "West");
    assert_eq!(
        fill_color(&controller, "boundaries-regions-fill"),
        Some(PaintValue::color("#888888")),
        "no other feature may share the clicked one's highlight"
    );
    assert!(!controller.highlight_pending());
    assert!(controller.with_surface(|s| {
        s.source("boundaries-regions").unwrap()["features"]
            .as_array()
            .unwrap()
            .iter()
            .all(|f| f["properties"].get("GEOID").is_none())
    }));
    assert!(backend.calls().contains(&BackendCall::Demographics(DemographicsTarget {
        point: SelectionPoint::from(position),
        geo_id: None,
    })));
}

#[tokio::test]
async fn test_popup_lists_feature_properties() {
    let (controller, backend, _) = setup(ControllerConfig::default());
    backend.insert_dataset(unidentified_regions());
    controller.set_dataset(BoundaryKind::Regions).await.unwrap();

    controller
        .handle_pointer(PointerEvent::Move {
            layer_id: "boundaries-regions-fill".to_string(),
            position: LngLat::new(0.5, 0.5),
            feature: None,
        })
        .await;

    assert_eq!(
        controller.with_surface(|s| s.popup().map(|(_, text)| text.to_string())),
        Some("West\nLand Area (sq meters): 1000".to_string())
    );
    assert_eq!(controller.state().hovered.as_deref(), Some("West"));
}

#[tokio::test(start_paused = true)]
async fn test_latest_click_reset_is_authoritative() {
    let (controller, _, _) = loaded(BoundaryKind::Counties).await;

    controller.handle_click(CLICK, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    controller
        .handle_click(LngLat::new(-100.5, 43.5), None)
        .await
        .unwrap();

    // The first click's timer would have fired at 300 ms
    tokio::time::sleep(Duration::from_millis(150)).await;
    let fill = fill_color(&controller, "boundaries-counties-fill").unwrap();
    assert_eq!(fill.resolve_color(Some("46041")), Some("#ff8c00"));

    tokio::time::sleep(Duration::from_millis(151)).await;
    assert_eq!(
        fill_color(&controller, "boundaries-counties-fill"),
        Some(PaintValue::color("#888888"))
    );
}

#[tokio::test]
async fn test_click_outside_features_skips_highlight() {
    let (controller, _, _) = loaded(BoundaryKind::Counties).await;

    controller
        .handle_click(LngLat::new(10.0, 10.0), None)
        .await
        .unwrap();

    assert!(!controller.highlight_pending());
    assert!(controller.state().selected_feature.is_none());
    assert_eq!(
        fill_color(&controller, "boundaries-counties-fill"),
        Some(PaintValue::color("#888888"))
    );
}

#[tokio::test]
async fn test_nearby_failure_clears_overlays() {
    let (controller, backend, logger) = loaded(BoundaryKind::Counties).await;
    backend.set_nearby(Ok(vec![place("a", true)]));
    controller.handle_click(CLICK, None).await.unwrap();
    assert_eq!(controller.overlay_layer_count(), 2);

    backend.set_nearby(Err(NetworkError::Status {
        status: 500,
        url: "http://localhost:5002/nearby".to_string(),
    }));
    let report = controller.handle_click(CLICK, None).await.unwrap();

    assert_eq!(report.nearby, FetchStatus::Failed);
    assert_eq!(controller.overlay_layer_count(), 0);
    assert!(controller.state().nearby.is_empty());
    assert!(logger.contains(LogLevel::Warn, "Nearby places fetch failed"));
}

#[tokio::test]
async fn test_nearby_failure_can_keep_previous() {
    let config = ControllerConfig::default().with_nearby_failure(NearbyFailurePolicy::KeepPrevious);
    let (controller, backend, _) = setup(config);
    controller.set_dataset(BoundaryKind::Counties).await.unwrap();
    backend.set_nearby(Ok(vec![place("a", true)]));
    controller.handle_click(CLICK, None).await.unwrap();

    backend.set_nearby(Err(NetworkError::Http("timeout".to_string())));
    let report = controller.handle_click(CLICK, None).await.unwrap();

    assert_eq!(report.nearby, FetchStatus::Failed);
    assert_eq!(controller.overlay_layer_count(), 2);
    assert_eq!(controller.state().nearby.len(), 1);
}

#[tokio::test]
async fn test_demographics_failure_keeps_prior_record() {
    let (controller, backend, logger) = loaded(BoundaryKind::Counties).await;
    backend.set_demographics(Ok(Some(record("Hughes"))));
    controller.handle_click(CLICK, None).await.unwrap();

    backend.set_demographics(Err(NetworkError::Decode("unexpected token".to_string())));
    let report = controller.handle_click(CLICK, None).await.unwrap();

    assert_eq!(report.demographics, FetchStatus::Failed);
    assert_eq!(controller.state().demographics.unwrap().name, "Hughes");
    assert!(logger.contains(LogLevel::Warn, "Demographics fetch failed"));

    // Still responsive after a failure
    backend.set_demographics(Ok(Some(record("Dewey"))));
    controller.handle_click(CLICK, None).await.unwrap();
    assert_eq!(controller.state().demographics.unwrap().name, "Dewey");
}

#[tokio::test]
async fn test_absent_demographics_clear_record() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;
    backend.set_demographics(Ok(Some(record("Hughes"))));
    controller.handle_click(CLICK, None).await.unwrap();

    backend.set_demographics(Ok(None));
    controller.handle_click(CLICK, None).await.unwrap();
    assert!(controller.state().demographics.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_dataset_change_discards_click_fetches() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;
    backend.set_fetch_delay(Duration::from_millis(100));
    backend.set_demographics(Ok(Some(record("Hughes"))));
    backend.set_nearby(Ok(vec![place("a", true)]));

    let switch = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.set_dataset(BoundaryKind::States).await
    };
    let (report, switched) = tokio::join!(controller.handle_click(CLICK, None), switch);

    assert_eq!(switched.unwrap(), Outcome::Current(()));
    let report = report.unwrap();
    assert_eq!(report.demographics, FetchStatus::Discarded);
    assert_eq!(report.nearby, FetchStatus::Discarded);

    let state = controller.state();
    assert!(state.demographics.is_none());
    assert!(state.nearby.is_empty());
    assert_eq!(state.phase, SelectionPhase::Idle);
    assert_eq!(controller.overlay_layer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_older_click_never_overwrites_newer() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;
    backend.push_nearby_response(Duration::from_millis(200), Ok(vec![place("old", true)]));
    backend.push_nearby_response(Duration::from_millis(20), Ok(vec![place("new", false)]));

    let (first, second) = tokio::join!(
        controller.handle_click(CLICK, None),
        controller.handle_click(LngLat::new(-100.5, 43.5), None),
    );

    assert_eq!(first.unwrap().nearby, FetchStatus::Discarded);
    assert_eq!(second.unwrap().nearby, FetchStatus::Applied);
    let state = controller.state();
    assert_eq!(state.nearby[0].id, "new");
    assert_eq!(controller.overlay_layer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_phase_is_pending_until_latest_click_settles() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;
    backend.set_fetch_delay(Duration::from_millis(50));
    let mut updates = controller.subscribe();

    let observe = async {
        updates.changed().await.unwrap();
        updates.borrow_and_update().phase
    };
    let (report, observed) = tokio::join!(controller.handle_click(CLICK, None), observe);

    report.unwrap();
    assert_eq!(observed, SelectionPhase::Pending);
    assert_eq!(controller.state().phase, SelectionPhase::Idle);
}

#[tokio::test]
async fn test_outside_click_clears_overlays_only() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;
    backend.set_demographics(Ok(Some(record("Hughes"))));
    backend.set_nearby(Ok(vec![place("a", true), place("b", true)]));
    controller.handle_click(CLICK, None).await.unwrap();

    controller.handle_outside_click();

    let state = controller.state();
    assert!(state.nearby.is_empty());
    assert!(state.radius_circle.is_none());
    assert!(state.selection.is_some());
    assert!(state.demographics.is_some());
    assert_eq!(controller.overlay_layer_count(), 0);
    controller.with_surface(|s| {
        assert!(!s.has_source(crate::layers::RADIUS_SOURCE_ID));
        assert_eq!(s.markers_with_role(MarkerRole::Selection).len(), 1);
        assert!(s.markers_with_role(MarkerRole::Place).is_empty());
    });
}

#[tokio::test(start_paused = true)]
async fn test_outside_click_drops_in_flight_nearby() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;
    backend.push_nearby_response(Duration::from_millis(100), Ok(vec![place("a", true)]));

    let dismiss = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.handle_outside_click();
    };
    let (report, ()) = tokio::join!(controller.handle_click(CLICK, None), dismiss);

    assert_eq!(report.unwrap().nearby, FetchStatus::Discarded);
    assert_eq!(controller.overlay_layer_count(), 0);
}

#[tokio::test]
async fn test_degenerate_circle_aborts_only_circle() {
    let (controller, backend, logger) = loaded(BoundaryKind::Counties).await;
    backend.set_demographics(Ok(Some(record("Pole"))));
    controller.handle_click(CLICK, None).await.unwrap();

    let report = controller
        .handle_click(LngLat::new(0.0, 90.0), None)
        .await
        .unwrap();

    assert_eq!(report.demographics, FetchStatus::Applied);
    let state = controller.state();
    assert!(state.radius_circle.is_none());
    assert_eq!(state.selection, Some(SelectionPoint::new(90.0, 0.0)));
    assert!(!controller.with_surface(|s| s.has_source(crate::layers::RADIUS_SOURCE_ID)));
    assert!(logger.contains(LogLevel::Warn, "Radius circle skipped"));
}

#[tokio::test]
async fn test_search_radius_setter() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;

    assert!(matches!(
        controller.set_search_radius(0.0),
        Err(ControllerError::InvalidRadius(_))
    ));
    assert!(controller.set_search_radius(f64::NAN).is_err());

    controller.set_search_radius(5_000.0).unwrap();
    controller.handle_click(CLICK, None).await.unwrap();

    assert_eq!(controller.state().search_radius.meters(), 5_000.0);
    assert_eq!(controller.state().radius_circle.unwrap().radius_km, 5.0);
    assert!(backend.calls().iter().any(|c| matches!(
        c,
        BackendCall::NearbyPlaces(q) if q.radius.meters() == 5_000.0
    )));
}

#[tokio::test]
async fn test_hover_tracks_names_and_popup() {
    let (controller, _, _) = loaded(BoundaryKind::Counties).await;
    let layer = "boundaries-counties-fill".to_string();
    let mut updates = controller.subscribe();
    updates.borrow_and_update();

    controller
        .handle_pointer(PointerEvent::Move {
            layer_id: layer.clone(),
            position: CLICK,
            feature: None,
        })
        .await;
    assert_eq!(controller.state().hovered.as_deref(), Some("Hughes"));
    assert!(updates.has_changed().unwrap());
    updates.borrow_and_update();

    // Same feature again publishes nothing
    controller
        .handle_pointer(PointerEvent::Move {
            layer_id: layer.clone(),
            position: LngLat::new(-99.5, 43.5),
            feature: None,
        })
        .await;
    assert!(!updates.has_changed().unwrap());
    assert_eq!(
        controller.with_surface(|s| s.popup().map(|(_, text)| text.to_string())),
        Some("Hughes\nGEOID: 46065".to_string())
    );

    controller
        .handle_pointer(PointerEvent::Leave { layer_id: layer })
        .await;
    assert!(controller.state().hovered.is_none());
    assert!(controller.with_surface(|s| s.popup().is_none()));
}

#[tokio::test]
async fn test_enter_and_leave_set_cursor() {
    let (controller, _, _) = loaded(BoundaryKind::Counties).await;
    let layer = "boundaries-counties-fill".to_string();

    controller
        .handle_pointer(PointerEvent::Enter {
            layer_id: layer.clone(),
        })
        .await;
    assert_eq!(controller.with_surface(|s| s.cursor()), Cursor::Pointer);

    controller
        .handle_pointer(PointerEvent::Leave { layer_id: layer })
        .await;
    assert_eq!(controller.with_surface(|s| s.cursor()), Cursor::Default);
}

#[tokio::test]
async fn test_events_on_foreign_layers_are_ignored() {
    let (controller, _, _) = loaded(BoundaryKind::Counties).await;

    controller
        .handle_pointer(PointerEvent::Enter {
            layer_id: "nearby-0-fill".to_string(),
        })
        .await;
    controller
        .handle_pointer(PointerEvent::Move {
            layer_id: "boundaries-states-fill".to_string(),
            position: CLICK,
            feature: None,
        })
        .await;

    assert_eq!(controller.with_surface(|s| s.cursor()), Cursor::Default);
    assert!(controller.state().hovered.is_none());
}

#[tokio::test]
async fn test_pointer_click_uses_reported_feature() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;
    let reported = FeatureHit {
        id: None,
        name: "Reported".to_string(),
        geo_identifier: "99999".to_string(),
    };

    controller
        .handle_pointer(PointerEvent::Click {
            layer_id: Some("boundaries-counties-fill".to_string()),
            position: CLICK,
            feature: Some(reported.clone()),
        })
        .await;

    assert_eq!(controller.state().selected_feature, Some(reported));
    assert!(backend.calls().iter().any(|c| matches!(
        c,
        BackendCall::Demographics(t) if t.geo_id.as_deref() == Some("99999")
    )));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_removes_everything() {
    let (controller, backend, _) = loaded(BoundaryKind::Counties).await;
    backend.set_nearby(Ok(vec![place("a", true)]));
    controller.handle_click(CLICK, None).await.unwrap();
    assert!(controller.highlight_pending());

    controller.shutdown().unwrap();

    assert!(!controller.highlight_pending());
    controller.with_surface(|s| {
        assert!(s.source_ids().is_empty());
        assert!(s.layer_ids().is_empty());
        assert_eq!(s.marker_count(), 0);
        assert!(s.subscriptions().is_empty());
        assert!(s.popup().is_none());
    });
    let state = controller.state();
    assert!(state.kind.is_none());
    assert!(state.selection.is_none());

    assert!(matches!(
        controller.handle_click(CLICK, None).await,
        Err(ControllerError::ShutDown)
    ));
    assert!(matches!(
        controller.set_dataset(BoundaryKind::States).await,
        Err(ControllerError::ShutDown)
    ));

    // The cancelled reset never touches the torn-down surface
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(controller.with_surface(|s| s.layer_ids().is_empty()));
}
