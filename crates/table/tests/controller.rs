#![forbid(unsafe_code)]

use std::sync::Arc;

use hrdeck_api::{Gateway, MockGateway, StatusAction, WriteOutcome};
use hrdeck_core::kinds::ResourceKind;
use hrdeck_core::{field_str, Record, SortDirection};
use hrdeck_table::TableController;

fn permission(id: i64, ptype: &str, request_date: &str, status: &str) -> Record {
    serde_json::json!({
        "id": id,
        "permissionType": ptype,
        "requestDate": request_date,
        "startDate": request_date,
        "endDate": request_date,
        "approvalStatus": status,
    })
    .as_object()
    .expect("object")
    .clone()
}

fn seeded(records: Vec<Record>) -> Arc<MockGateway> {
    Arc::new(MockGateway::new().with_collection(ResourceKind::Permissions, records))
}

fn controller(gw: Arc<MockGateway>) -> TableController {
    TableController::new(gw, ResourceKind::Permissions)
}

fn ids(page: &[Record]) -> Vec<i64> {
    page.iter()
        .map(|r| r.get("id").and_then(|v| v.as_i64()).expect("id"))
        .collect()
}

#[tokio::test]
async fn sort_toggle_reverses_order() {
    let gw = seeded(vec![
        permission(1, "Yıllık İzin", "2024-03-01", "Talep Edildi"),
        permission(2, "Anne İzni", "2024-01-15", "Onaylandı"),
        permission(3, "Cenaze İzni", "2024-02-20", "Talep Edildi"),
    ]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");

    ctl.sort_by("requestDate").expect("sortable");
    assert_eq!(ctl.sort_direction(), SortDirection::Ascending);
    let asc = ids(&ctl.view().page);
    assert_eq!(asc, vec![2, 3, 1]);

    ctl.sort_by("requestDate").expect("sortable");
    assert_eq!(ctl.sort_direction(), SortDirection::Descending);
    let desc = ids(&ctl.view().page);
    let mut reversed = asc.clone();
    reversed.reverse();
    assert_eq!(desc, reversed);
}

#[tokio::test]
async fn selecting_new_key_resets_to_ascending() {
    let gw = seeded(vec![
        permission(1, "b", "2024-03-01", "x"),
        permission(2, "a", "2024-01-01", "x"),
    ]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");
    ctl.sort_by("requestDate").expect("sortable");
    ctl.sort_by("requestDate").expect("sortable");
    assert_eq!(ctl.sort_direction(), SortDirection::Descending);
    ctl.sort_by("permissionType").expect("sortable");
    assert_eq!(ctl.sort_key(), Some("permissionType"));
    assert_eq!(ctl.sort_direction(), SortDirection::Ascending);
}

#[tokio::test]
async fn sort_is_stable_for_equal_keys() {
    let gw = seeded(vec![
        permission(1, "Yıllık İzin", "2024-03-01", "x"),
        permission(2, "Yıllık İzin", "2024-03-01", "x"),
        permission(3, "Anne İzni", "2024-03-01", "x"),
        permission(4, "Yıllık İzin", "2024-03-01", "x"),
    ]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");
    ctl.sort_by("permissionType").expect("sortable");
    // Equal permissionType keys keep their gateway-returned relative order.
    assert_eq!(ids(&ctl.view().page), vec![3, 1, 2, 4]);
}

#[tokio::test]
async fn unparsable_dates_sort_last_in_both_directions() {
    let gw = seeded(vec![
        permission(1, "a", "not a date", "x"),
        permission(2, "b", "2024-02-01", "x"),
        permission(3, "c", "2024-01-01", "x"),
    ]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");
    ctl.sort_by("requestDate").expect("sortable");
    assert_eq!(ids(&ctl.view().page), vec![3, 2, 1]);
    ctl.sort_by("requestDate").expect("sortable");
    assert_eq!(ids(&ctl.view().page), vec![2, 3, 1]);
}

#[tokio::test]
async fn sorting_an_undeclared_field_is_a_validation_error() {
    let gw = seeded(vec![permission(1, "a", "2024-01-01", "x")]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");
    assert!(ctl.sort_by("fileName").is_err());
    assert!(ctl.sort_by("nonexistent").is_err());
    assert!(ctl.sort_key().is_none());
}

#[tokio::test]
async fn filter_never_exceeds_collection_and_resets_page() {
    let mut rows = Vec::new();
    for i in 0..30 {
        let ptype = if i % 3 == 0 { "Anne İzni" } else { "Yıllık İzin" };
        rows.push(permission(i, ptype, "2024-01-01", "x"));
    }
    let gw = seeded(rows);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");
    ctl.paginate(3);
    assert_eq!(ctl.page_index(), 3);

    ctl.set_filter(Some("Anne İzni".into()));
    assert_eq!(ctl.page_index(), 1);
    let view = ctl.view();
    assert_eq!(view.total_filtered, 10);
    assert!(view.total_filtered <= ctl.collection_len());
    assert!(view
        .page
        .iter()
        .all(|r| field_str(r, "permissionType") == Some("Anne İzni")));
}

#[tokio::test]
async fn load_is_idempotent_without_mutations() {
    let gw = seeded(vec![
        permission(1, "a", "2024-01-01", "x"),
        permission(2, "b", "2024-02-01", "x"),
    ]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");
    let first = ctl.view();
    ctl.load(None).await.expect("load");
    let second = ctl.view();
    assert_eq!(ids(&first.page), ids(&second.page));
    assert_eq!(first.page_count, second.page_count);
    assert_eq!(first.total_filtered, second.total_filtered);
}

#[tokio::test]
async fn twenty_five_records_paginate_into_three_pages() {
    let rows = (1..=25)
        .map(|i| permission(i, "Yıllık İzin", "2024-01-01", "x"))
        .collect();
    let gw = seeded(rows);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");

    let view = ctl.view();
    assert_eq!(view.page_count, 3);
    assert_eq!(view.page.len(), 10);

    ctl.paginate(3);
    let last = ctl.view();
    assert_eq!(last.page_index, 3);
    assert_eq!(last.page.len(), 5);

    // Requests beyond the valid range clamp instead of erroring.
    ctl.paginate(99);
    assert_eq!(ctl.page_index(), 3);
    ctl.paginate(0);
    assert_eq!(ctl.page_index(), 1);
}

#[tokio::test]
async fn page_length_never_exceeds_page_size() {
    let rows = (0..23)
        .map(|i| permission(i, "x", "2024-01-01", "x"))
        .collect();
    let gw = seeded(rows);
    let mut ctl = controller(gw).with_page_size(7);
    ctl.load(None).await.expect("load");
    let page_count = ctl.view().page_count;
    assert_eq!(page_count, 4);
    for p in 1..=page_count {
        ctl.paginate(p);
        assert!(ctl.view().page.len() <= 7);
    }
}

#[tokio::test]
async fn filter_matching_nothing_yields_one_empty_page() {
    let gw = seeded(vec![permission(1, "Yıllık İzin", "2024-01-01", "x")]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");
    ctl.set_filter(Some("Evlilik İzni".into()));
    let view = ctl.view();
    assert_eq!(view.page_count, 1);
    assert_eq!(view.page_index, 1);
    assert!(view.page.is_empty());
    assert_eq!(view.total_filtered, 0);
}

#[tokio::test]
async fn clearing_the_filter_restores_everything() {
    let gw = seeded(vec![
        permission(1, "a", "2024-01-01", "x"),
        permission(2, "b", "2024-01-01", "x"),
    ]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");
    ctl.set_filter(Some("a".into()));
    assert_eq!(ctl.view().total_filtered, 1);
    ctl.set_filter(None);
    assert_eq!(ctl.view().total_filtered, 2);
}

#[tokio::test]
async fn successful_mutation_reloads_server_truth() {
    let before = vec![
        permission(7, "Yıllık İzin", "2024-01-01", "Talep Edildi"),
        permission(8, "Anne İzni", "2024-01-02", "Talep Edildi"),
    ];
    let after = vec![
        permission(7, "Yıllık İzin", "2024-01-01", "Reddedildi"),
        permission(8, "Anne İzni", "2024-01-02", "Talep Edildi"),
    ];
    let mut gw = MockGateway::new().with_collection(ResourceKind::Permissions, before);
    gw.collections_after_write
        .insert(ResourceKind::Permissions, after);
    let gw = Arc::new(gw);
    let mut ctl = controller(gw.clone());
    ctl.load(None).await.expect("load");

    let outcome = ctl
        .mutate(7, &StatusAction::reject(Some("holiday freeze".into())))
        .await
        .expect("mutate");
    assert!(outcome.success);

    let view = ctl.view();
    let rejected = view
        .page
        .iter()
        .find(|r| r.get("id").and_then(|v| v.as_i64()) == Some(7))
        .expect("record 7");
    assert_eq!(field_str(rejected, "approvalStatus"), Some("Reddedildi"));

    let writes = gw.recorded_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].1, 7);
    assert!(!writes[0].2.approve);
}

#[tokio::test]
async fn mutation_preserves_page_index_across_refresh() {
    let rows: Vec<Record> = (1..=25)
        .map(|i| permission(i, "x", "2024-01-01", "Talep Edildi"))
        .collect();
    let mut gw = MockGateway::new().with_collection(ResourceKind::Permissions, rows.clone());
    gw.collections_after_write
        .insert(ResourceKind::Permissions, rows);
    let mut ctl = controller(Arc::new(gw));
    ctl.load(None).await.expect("load");
    ctl.paginate(3);
    ctl.mutate(12, &StatusAction::approve()).await.expect("mutate");
    assert_eq!(ctl.page_index(), 3);
}

#[tokio::test]
async fn mutating_an_absent_id_is_forwarded_and_surfaced() {
    let mut gw = MockGateway::new()
        .with_collection(ResourceKind::Permissions, vec![permission(1, "a", "2024-01-01", "x")]);
    gw.write = Some(WriteOutcome {
        success: false,
        message: "no such request".into(),
    });
    let gw = Arc::new(gw);
    let mut ctl = controller(gw.clone());
    ctl.load(None).await.expect("load");

    let outcome = ctl
        .mutate(999, &StatusAction::reject(None))
        .await
        .expect("forwarded");
    assert!(!outcome.success);
    assert_eq!(outcome.message, "no such request");
    // The controller did not pre-validate membership.
    assert_eq!(gw.recorded_writes().len(), 1);
    // Failed writes do not refresh; the collection is untouched.
    assert_eq!(ctl.collection_len(), 1);
}

#[tokio::test]
async fn failed_load_keeps_previous_collection() {
    let gw = seeded(vec![permission(1, "a", "2024-01-01", "x")]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");
    assert_eq!(ctl.collection_len(), 1);

    let failing = Arc::new({
        let mut m = MockGateway::new();
        m.fetch_error = Some("connection refused".into());
        m
    });
    let mut ctl2 = TableController::new(failing, ResourceKind::Permissions);
    assert!(ctl2.load(None).await.is_err());
    assert_eq!(ctl2.collection_len(), 0);
}

#[tokio::test]
async fn malformed_payload_is_reported_not_stored() {
    let gw = seeded(vec![permission(1, "a", "2024-01-01", "x")]);
    let mut ctl = controller(gw);
    ctl.load(None).await.expect("load");

    // Swap in a gateway that now reports malformed payloads: the error
    // surfaces and the previously loaded rows would be kept by a caller
    // holding the same controller. Here we assert the typed error.
    let bad = Arc::new({
        let mut m = MockGateway::new();
        m.malformed = true;
        m
    });
    let mut ctl2 = TableController::new(bad.clone(), ResourceKind::Permissions);
    let err = ctl2.load(None).await.unwrap_err();
    assert!(matches!(err, hrdeck_api::ApiError::Malformed(_)));
}

#[tokio::test]
async fn scope_is_remembered_for_post_mutation_refresh() {
    let rows = vec![permission(1, "a", "2024-01-01", "Talep Edildi")];
    let mut gw = MockGateway::new().with_collection(ResourceKind::Permissions, rows.clone());
    gw.collections_after_write
        .insert(ResourceKind::Permissions, rows);
    let gw = Arc::new(gw);
    let mut ctl = controller(gw.clone());
    ctl.load(Some("42")).await.expect("load");
    ctl.mutate(1, &StatusAction::approve()).await.expect("mutate");
    // MockGateway ignores scope, but the direct fetch must agree with the
    // controller's refreshed state.
    let direct = gw
        .fetch_collection(ResourceKind::Permissions, Some("42"))
        .await
        .expect("fetch");
    assert_eq!(direct.len(), ctl.collection_len());
}
