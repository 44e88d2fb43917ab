use crate::tests::utils::{body_string, get, test_app};

#[test]
fn listing_detail_page_loads() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/listings/1");
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("Modern villa in Al Olaya"));
}

#[test]
fn listing_detail_page_uses_the_arabic_title() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/listings/1?lang=ar");

    let body = body_string(&mut resp);
    assert!(body.contains("فيلا حديثة في العليا"));
    assert!(body.contains(r#"dir="rtl""#));
}

#[test]
fn unknown_listing_is_not_found() {
    let (_dir, app) = test_app(true);
    assert_eq!(get(&app, "/listings/404").status(), 404);
    assert_eq!(get(&app, "/listings/not-a-number").status(), 404);
}

#[test]
fn health_check_answers() {
    let (_dir, app) = test_app(false);
    let mut resp = get(&app, "/healthz");
    assert_eq!(resp.status(), 200);
    assert!(body_string(&mut resp).contains("ok"));
}
