// src/tests/router_tests/export_tests.rs

use crate::router::handle;
use crate::tests::utils::{request, test_ctx};
use std::io::Read;

#[test]
fn export_downloads_a_workbook() {
    let (ctx, _recorder) = test_ctx();
    handle(request("POST", "/rows/add"), &ctx).unwrap();
    handle(
        request("POST", "/rows/0/update?field=site_id&value=045-SD-001"),
        &ctx,
    )
    .unwrap();
    handle(request("POST", "/rows/0/soak"), &ctx).unwrap();

    let mut resp = handle(request("GET", "/export.xlsx"), &ctx).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("site_tracker.xlsx"));

    let mut bytes = Vec::new();
    resp.body_mut().reader().read_to_end(&mut bytes).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}
