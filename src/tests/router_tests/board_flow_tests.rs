// src/tests/router_tests/board_flow_tests.rs

use crate::domain::board::NoticeKind;
use crate::domain::site::SiteRecord;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{request, test_ctx, wait_for_notices};
use std::io::Read;

fn body_string(resp: &mut astra::Response) -> String {
    let mut bytes = Vec::new();
    resp.body_mut().reader().read_to_end(&mut bytes).unwrap();
    String::from_utf8(bytes).unwrap()
}

fn get_records(ctx: &crate::router::AppContext, path: &str) -> Vec<SiteRecord> {
    let mut resp = handle(request("GET", path), ctx).unwrap();
    assert_eq!(resp.status(), 200);
    serde_json::from_str(&body_string(&mut resp)).unwrap()
}

#[test]
fn add_update_soak_flow_end_to_end() {
    let (ctx, recorder) = test_ctx();

    // Add a record and give it a resolvable site id.
    handle(request("POST", "/rows/add"), &ctx).unwrap();
    let mut resp = handle(
        request("POST", "/rows/0/update?field=site_id&value=045xyz"),
        &ctx,
    )
    .unwrap();
    let updated: SiteRecord = serde_json::from_str(&body_string(&mut resp)).unwrap();
    assert_eq!(updated.market, "SoCal");
    assert_eq!(updated.rsm, "Vivek Kumar");

    // Move it to soak.
    let resp = handle(request("POST", "/rows/0/soak"), &ctx).unwrap();
    assert_eq!(resp.status(), 200);

    let ongoing = get_records(&ctx, "/ongoing");
    let soak = get_records(&ctx, "/soak");
    assert!(ongoing.is_empty());
    assert_eq!(soak.len(), 1);
    assert_eq!(soak[0].site_id, "045xyz");
    assert_eq!(soak[0].market, "SoCal");
    assert!(soak[0].stage_entered_at.is_some());

    // Exactly one notice, of the soak kind.
    wait_for_notices(&recorder, 1);
    assert_eq!(recorder.kinds(), [NoticeKind::SoakStarted]);
}

#[test]
fn cancel_raises_its_own_notice_kind() {
    let (ctx, recorder) = test_ctx();
    handle(request("POST", "/rows/add"), &ctx).unwrap();
    handle(request("POST", "/rows/0/cancel"), &ctx).unwrap();

    assert!(get_records(&ctx, "/ongoing").is_empty());
    assert_eq!(get_records(&ctx, "/cancelled").len(), 1);

    wait_for_notices(&recorder, 1);
    assert_eq!(recorder.kinds(), [NoticeKind::SiteCancelled]);
}

#[test]
fn state_survives_across_requests() {
    let (ctx, _recorder) = test_ctx();
    handle(request("POST", "/rows/add"), &ctx).unwrap();
    handle(request("POST", "/rows/add"), &ctx).unwrap();
    handle(
        request("POST", "/rows/1/update?field=project&value=5G+rollout"),
        &ctx,
    )
    .unwrap();

    let ongoing = get_records(&ctx, "/ongoing");
    assert_eq!(ongoing.len(), 2);
    assert_eq!(ongoing[1].project, "5G rollout");
}

#[test]
fn delete_removes_without_notifying() {
    let (ctx, recorder) = test_ctx();
    handle(request("POST", "/rows/add"), &ctx).unwrap();
    handle(request("POST", "/ongoing/0/delete"), &ctx).unwrap();
    assert!(get_records(&ctx, "/ongoing").is_empty());
    assert!(recorder.notices.lock().unwrap().is_empty());
}

#[test]
fn stale_records_are_not_served() {
    let (ctx, _recorder) = test_ctx();
    handle(request("POST", "/rows/add"), &ctx).unwrap();
    handle(request("POST", "/rows/0/soak"), &ctx).unwrap();

    // Backdate the soak entry past the retention window, straight in the
    // store, as if a day had passed between sessions.
    {
        use crate::db::board_store::{load_board, save_board};
        let mut board = load_board(&ctx.db).unwrap();
        board.soak[0].stage_entered_at =
            Some(chrono::Utc::now() - chrono::Duration::hours(25));
        save_board(&ctx.db, &board).unwrap();
    }

    assert!(get_records(&ctx, "/soak").is_empty());

    // And the cleanup was persisted, not just filtered from the response.
    let mut resp = handle(request("POST", "/expire"), &ctx).unwrap();
    assert_eq!(body_string(&mut resp), r#"{"removed":0}"#);
}

#[test]
fn filters_narrow_the_listing() {
    let (ctx, _recorder) = test_ctx();
    handle(request("POST", "/rows/add"), &ctx).unwrap();
    handle(
        request("POST", "/rows/0/update?field=site_id&value=145-FL"),
        &ctx,
    )
    .unwrap();
    handle(request("POST", "/rows/add"), &ctx).unwrap();
    handle(
        request("POST", "/rows/1/update?field=site_id&value=205-IL"),
        &ctx,
    )
    .unwrap();

    let hits = get_records(&ctx, "/ongoing?search=florida");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].site_id, "145-FL");

    let hits = get_records(&ctx, "/ongoing?market=IL%2FWI");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].site_id, "205-IL");

    assert_eq!(get_records(&ctx, "/ongoing").len(), 2);
}

#[test]
fn bad_indexes_and_stages_are_rejected() {
    let (ctx, _recorder) = test_ctx();

    let err = handle(request("POST", "/rows/0/soak"), &ctx).unwrap_err();
    assert!(matches!(err, ServerError::OutOfRange { .. }));

    let err = handle(request("POST", "/rows/abc/update?field=sa&value=x"), &ctx).unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));

    let err = handle(request("GET", "/finished"), &ctx).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));

    handle(request("POST", "/rows/add"), &ctx).unwrap();
    handle(request("POST", "/rows/0/soak"), &ctx).unwrap();
    let err = handle(
        request("POST", "/soak/0/update?field=comments&value=x"),
        &ctx,
    )
    .unwrap_err();
    assert!(matches!(err, ServerError::InvalidStage(_)));

    let err = handle(
        request("POST", "/rows/0/update?field=market&value=Moon"),
        &ctx,
    )
    .unwrap_err();
    // Index check fires first on an empty board.
    assert!(matches!(
        err,
        ServerError::OutOfRange { .. } | ServerError::UnknownField(_)
    ));
}
