use crate::tests::utils::{body_string, get, location, publish_listing, test_app};

// Seed order on the map: [7], [5], [3, 2, 1], [4], [6].
// Marker handles are handed out in that order, starting at 1.
const OLAYA_CLUSTER_MARKER: u64 = 3;
const OLAYA_CLUSTER_KEY: &str = "3-2-1";
const JEDDAH_MARKER: u64 = 1;

#[test]
fn root_redirects_to_the_map() {
    let (_dir, app) = test_app(true);
    let resp = get(&app, "/");

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/map");
}

#[test]
fn map_page_renders_markers_and_missing_count() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/map");
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains(r#"id="map""#));
    assert!(body.contains(r#""op":"create_marker""#));
    assert!(body.contains(r#""marker_keys":{"1":"7","2":"5","3":"3-2-1","4":"4","5":"6"}"#));
    assert!(body.contains("2 listings have no location"));
    assert!(body.contains("9 listings"));
    assert!(!body.contains("cluster-panel"));
}

#[test]
fn empty_result_shows_the_empty_state_instead_of_a_map() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/map?q=nothing-matches-this");
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("No listings to show on the map"));
    assert!(!body.contains(r#"id="map""#));
}

#[test]
fn empty_database_shows_the_empty_state() {
    let (_dir, app) = test_app(false);
    let mut resp = get(&app, "/map");

    let body = body_string(&mut resp);
    assert!(body.contains("No listings to show on the map"));
}

#[test]
fn clicking_a_single_listing_marker_navigates_to_it() {
    let (_dir, app) = test_app(true);
    let resp = get(&app, &format!("/map/click?lang=en&marker={JEDDAH_MARKER}&cluster=7"));

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/listings/7?lang=en");
}

#[test]
fn clicking_a_cluster_opens_the_panel_on_its_first_member() {
    let (_dir, app) = test_app(true);
    let mut resp = get(
        &app,
        &format!("/map/click?lang=en&marker={OLAYA_CLUSTER_MARKER}&cluster={OLAYA_CLUSTER_KEY}"),
    );
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains(r#"id="cluster-panel""#));
    assert!(body.contains(r#"<span class="panel-position">1 / 3</span>"#));
    assert!(body.contains(r#"href="/listings/3?lang=en""#));
    assert!(body.contains("cluster=3-2-1&amp;step=next"));
    assert!(body.contains(r#""op":"pan_to""#));
}

#[test]
fn opening_a_cluster_only_raises_the_zoom() {
    let (_dir, app) = test_app(true);
    let mut resp = get(
        &app,
        &format!("/map/click?lang=en&marker={OLAYA_CLUSTER_MARKER}&cluster={OLAYA_CLUSTER_KEY}"),
    );

    let body = body_string(&mut resp);
    assert!(body.contains(r#"{"op":"zoom_at_least","level":17.0}"#));
    assert!(!body.contains(r#""op":"set_zoom""#));
}

#[test]
fn click_rendered_before_new_data_does_not_follow_the_shifted_marker() {
    let (_dir, app) = test_app(true);
    publish_listing(&app, 10, "26.4207", "50.0888", "2024-05-01 10:00:00");

    // Handle 3 now belongs to listing 5, not the Olaya cluster.
    let resp = get(
        &app,
        &format!("/map/click?lang=en&marker={OLAYA_CLUSTER_MARKER}&cluster={OLAYA_CLUSTER_KEY}"),
    );
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/map?lang=en");

    let resp = get(&app, &format!("/map/click?lang=en&marker={JEDDAH_MARKER}&cluster=7"));
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/map?lang=en");

    let mut resp = get(&app, &format!("/map/click?lang=en&marker=4&cluster={OLAYA_CLUSTER_KEY}"));
    assert_eq!(resp.status(), 200);
    assert!(body_string(&mut resp).contains(r#"<span class="panel-position">1 / 3</span>"#));
}

#[test]
fn panel_rendered_before_new_data_closes() {
    let (_dir, app) = test_app(true);
    publish_listing(&app, 10, "26.4207", "50.0888", "2024-05-01 10:00:00");

    let resp = get(&app, "/map/panel?lang=en&open=2&member=1&cluster=3-2-1&step=next");
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/map?lang=en");

    let mut resp = get(&app, "/map/panel?lang=en&open=3&member=1&cluster=3-2-1&step=next");
    assert_eq!(resp.status(), 200);
    assert!(body_string(&mut resp).contains(r#"<span class="panel-position">3 / 3</span>"#));
}

#[test]
fn click_without_a_cluster_key_is_a_bad_request() {
    let (_dir, app) = test_app(true);
    let resp = get(&app, &format!("/map/click?lang=en&marker={JEDDAH_MARKER}"));
    assert_eq!(resp.status(), 400);
}

#[test]
fn stale_marker_falls_back_to_the_current_map() {
    let (_dir, app) = test_app(true);
    let resp = get(&app, "/map/click?lang=en&kind=rent&marker=99&cluster=7");

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/map?lang=en&kind=rent");
}

#[test]
fn panel_next_wraps_to_the_first_member() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/map/panel?lang=en&open=2&member=2&cluster=3-2-1&step=next");
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains(r#"<span class="panel-position">1 / 3</span>"#));
    assert!(body.contains(r#"href="/listings/3?lang=en""#));
}

#[test]
fn panel_prev_wraps_to_the_last_member() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/map/panel?lang=en&open=2&member=0&cluster=3-2-1&step=prev");

    let body = body_string(&mut resp);
    assert!(body.contains(r#"<span class="panel-position">3 / 3</span>"#));
    assert!(body.contains(r#"href="/listings/1?lang=en""#));
}

#[test]
fn panel_close_renders_the_map_without_a_panel() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/map/panel?lang=en&open=2&member=1&cluster=3-2-1&step=close");
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(!body.contains("cluster-panel"));
}

#[test]
fn single_listing_cluster_cannot_be_opened() {
    let (_dir, app) = test_app(true);
    let resp = get(&app, "/map/panel?lang=en&open=0&cluster=7");

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/map?lang=en");
}

#[test]
fn unknown_step_is_a_bad_request() {
    let (_dir, app) = test_app(true);
    let resp = get(&app, "/map/panel?open=2&cluster=3-2-1&step=sideways");
    assert_eq!(resp.status(), 400);
}

#[test]
fn bad_kind_is_a_bad_request() {
    let (_dir, app) = test_app(true);
    let resp = get(&app, "/map?kind=lease");
    assert_eq!(resp.status(), 400);
}

#[test]
fn api_snapshot_reports_clusters_and_viewport() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/api/map");
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = serde_json::from_str(&body_string(&mut resp)).unwrap();
    assert_eq!(json["total"], 9);
    assert_eq!(json["points"], 7);
    assert_eq!(json["missing_coordinates"], 2);
    assert_eq!(json["empty"], false);

    let clusters = json["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 5);
    assert_eq!(clusters[2]["member_ids"], serde_json::json!([3, 2, 1]));
    assert_eq!(clusters[2]["key"], "3-2-1");
    assert_eq!(clusters[2]["is_multiple"], true);
    assert_eq!(json["viewport"]["action"], "fit_bounds");
}

#[test]
fn api_snapshot_for_a_single_point_centers_on_it() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/api/map?q=jeddah");

    let json: serde_json::Value = serde_json::from_str(&body_string(&mut resp)).unwrap();
    assert_eq!(json["points"], 1);
    assert_eq!(json["viewport"]["action"], "center_on");
    assert_eq!(json["viewport"]["zoom"], 15.0);
}

#[test]
fn api_errors_are_json() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, "/api/map?page=two");
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = serde_json::from_str(&body_string(&mut resp)).unwrap();
    assert!(json["error"].as_str().unwrap().contains("page"));
}

#[test]
fn api_hover_scales_a_live_marker() {
    let (_dir, app) = test_app(true);
    let mut resp = get(&app, &format!("/api/map/hover?marker={OLAYA_CLUSTER_MARKER}&entered=1"));
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = serde_json::from_str(&body_string(&mut resp)).unwrap();
    assert_eq!(json["handled"], true);
    assert_eq!(
        json["commands"],
        serde_json::json!([{ "op": "scale_marker", "handle": 3, "scale": 1.2 }])
    );

    let mut resp = get(&app, "/api/map/hover?marker=99&entered=0");
    let json: serde_json::Value = serde_json::from_str(&body_string(&mut resp)).unwrap();
    assert_eq!(json["handled"], false);
    assert_eq!(json["commands"], serde_json::json!([]));

    assert_eq!(get(&app, "/api/map/hover?marker=3&entered=maybe").status(), 400);
}
