//! The concurrent `Monitor`: per-item serialization, broadcasting and the
//! alert board listening on the other end.

use alerter::{AlertBoard, run_alert_board};
use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::MonitorConfig;
use core_types::{FulfillmentChannel, ManualClock, Offer, SeverityLevel, Snapshot};
use engine::{IngestInputs, Monitor};
use events::MonitorMessage;
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::RwLock;

const ME: &str = "A1SELLER";

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap()
}

fn monitor() -> (Monitor, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start()));
    let config = MonitorConfig {
        seller_id: ME.to_string(),
        ..Default::default()
    };
    (Monitor::new(config, clock.clone()).unwrap(), clock)
}

fn offer(seller: &str, price: Decimal, featured: bool) -> Offer {
    Offer {
        seller_id: seller.to_string(),
        listing_price: price,
        shipping_price: None,
        fulfillment: FulfillmentChannel::NetworkFulfilled,
        expedited_eligible: true,
        is_featured_offer: featured,
        feedback_rating: Some(dec!(4.8)),
        min_ship_hours: Some(24),
        max_ship_hours: Some(48),
    }
}

/// You hold the featured offer at the market low.
fn winning(item: &str) -> Snapshot {
    Snapshot {
        item_id: item.to_string(),
        event_time: start(),
        offers: vec![offer(ME, dec!(10), true), offer("RIVAL", dec!(11), false)],
        sales_ranks: None,
    }
}

/// You are 60% above a rival holding the featured offer.
fn losing(item: &str) -> Snapshot {
    Snapshot {
        item_id: item.to_string(),
        event_time: start(),
        offers: vec![offer(ME, dec!(16), false), offer("RIVAL", dec!(10), true)],
        sales_ranks: None,
    }
}

#[tokio::test]
async fn clock_drives_stability() {
    let (monitor, clock) = monitor();

    let first = monitor
        .ingest("ITEM-1", &winning("ITEM-1"), IngestInputs::default())
        .await
        .unwrap();
    assert_eq!(first.severity, SeverityLevel::Good);
    assert_eq!(first.assessed_at, start());

    clock.advance(Duration::hours(24));
    let later = monitor
        .ingest("ITEM-1", &winning("ITEM-1"), IngestInputs::default())
        .await
        .unwrap();
    assert_eq!(later.severity, SeverityLevel::Stable);
}

#[tokio::test]
async fn broadcasts_assessment_then_alert() {
    let (monitor, _clock) = monitor();
    let mut rx = monitor.subscribe();

    monitor
        .ingest("ITEM-1", &losing("ITEM-1"), IngestInputs::default())
        .await
        .unwrap();

    match rx.recv().await.unwrap() {
        MonitorMessage::Assessment(a) => assert_eq!(a.severity, SeverityLevel::Critical),
        other => panic!("expected an assessment, got {other:?}"),
    }
    match rx.recv().await.unwrap() {
        MonitorMessage::Alert(alert) => {
            assert_eq!(alert.item_id, "ITEM-1");
            assert_eq!(alert.severity, SeverityLevel::Critical);
            assert_eq!(alert.previous_severity, None);
        }
        other => panic!("expected an alert, got {other:?}"),
    }

    // Unchanged severity on the next cycle: assessment only.
    monitor
        .ingest("ITEM-1", &losing("ITEM-1"), IngestInputs::default())
        .await
        .unwrap();
    assert!(matches!(rx.recv().await.unwrap(), MonitorMessage::Assessment(_)));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn items_are_isolated_and_run_concurrently() {
    let (monitor, _clock) = monitor();
    let items: Vec<String> = (0..20).map(|i| format!("ITEM-{i}")).collect();

    let results = join_all(items.iter().enumerate().map(|(i, item)| {
        let monitor = &monitor;
        async move {
            let snap = if i % 2 == 0 { winning(item) } else { losing(item) };
            monitor.ingest(item, &snap, IngestInputs::default()).await
        }
    }))
    .await;

    for (i, result) in results.into_iter().enumerate() {
        let assessment = result.unwrap();
        let expected = if i % 2 == 0 {
            SeverityLevel::Good
        } else {
            SeverityLevel::Critical
        };
        assert_eq!(assessment.severity, expected, "item {}", assessment.item_id);
        assert_eq!(assessment.previous_severity, None);
    }
    assert_eq!(monitor.items().await.len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cycles_for_one_item_are_serialized() {
    let (monitor, clock) = monitor();
    let monitor = Arc::new(monitor);

    let ticker = {
        let clock = clock.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                clock.advance(Duration::seconds(1));
                tokio::task::yield_now().await;
            }
        })
    };

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move {
                monitor
                    .ingest("ITEM-1", &winning("ITEM-1"), IngestInputs::default())
                    .await
            })
        })
        .collect();

    let mut first_sightings = 0;
    for handle in handles {
        let assessment = handle.await.unwrap().unwrap();
        if assessment.previous_severity.is_none() {
            first_sightings += 1;
        }
    }
    ticker.await.unwrap();

    assert_eq!(first_sightings, 1);
}

#[tokio::test]
async fn forgetting_resets_the_item() {
    let (monitor, clock) = monitor();
    let mut rx = monitor.subscribe();

    monitor
        .ingest("ITEM-1", &winning("ITEM-1"), IngestInputs::default())
        .await
        .unwrap();
    assert!(monitor.forget("ITEM-1").await);
    assert!(!monitor.forget("ITEM-1").await);

    clock.advance(Duration::minutes(5));
    let fresh = monitor
        .ingest("ITEM-1", &winning("ITEM-1"), IngestInputs::default())
        .await
        .unwrap();
    assert_eq!(fresh.previous_severity, None);

    let mut forgotten = 0;
    while let Ok(message) = rx.try_recv() {
        if matches!(message, MonitorMessage::ItemForgotten { .. }) {
            forgotten += 1;
        }
    }
    assert_eq!(forgotten, 1);
}

#[tokio::test]
async fn explicit_time_rejects_rewinds() {
    let (monitor, _clock) = monitor();
    let later = start() + Duration::hours(2);

    monitor
        .ingest_at("ITEM-1", &winning("ITEM-1"), later, IngestInputs::default())
        .await
        .unwrap();
    let err = monitor
        .ingest_at("ITEM-1", &winning("ITEM-1"), start(), IngestInputs::default())
        .await;
    assert!(err.is_err());

    let mismatch = monitor
        .ingest_at("ITEM-1", &winning("ITEM-2"), later, IngestInputs::default())
        .await;
    assert!(matches!(mismatch, Err(engine::EngineError::ItemMismatch { .. })));
}

#[tokio::test]
async fn alert_board_groups_what_the_monitor_broadcasts() {
    let (monitor, clock) = monitor();
    let board = Arc::new(RwLock::new(AlertBoard::new()));
    let listener = tokio::spawn(run_alert_board(board.clone(), monitor.subscribe()));

    for item in ["ITEM-A", "ITEM-B"] {
        monitor
            .ingest(item, &winning(item), IngestInputs::default())
            .await
            .unwrap();
    }
    clock.advance(Duration::minutes(1));
    monitor
        .ingest("ITEM-C", &losing("ITEM-C"), IngestInputs::default())
        .await
        .unwrap();

    drop(monitor);
    listener.await.unwrap();

    let board = board.read().await;
    let summary = board.summary();
    assert_eq!(summary.critical, 1);
    assert_eq!(summary.good, 2);

    let groups = board.grouped();
    assert_eq!(groups[0].severity, SeverityLevel::Critical);
    assert_eq!(groups[0].items[0].item_id, "ITEM-C");
    assert_eq!(groups[1].items.len(), 2);

    let alerts: Vec<_> = board.alerts().collect();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].item_id, "ITEM-C");
}
