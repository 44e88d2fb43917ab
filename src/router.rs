use crate::config::AppConfig;
use crate::db::{count_listings, get_listing, query_listings, Database, ListingQuery};
use crate::domain::listing::{Language, ListingKind, ListingRecord};
use crate::errors::ServerError;
use crate::map::markers::{ReconcileOutcome, HOVER_SCALE, REST_SCALE};
use crate::map::cluster::Cluster;
use crate::map::{MapCapability, MapController, MarkerHandle, ScriptMap};
use crate::responses::{
    error_to_response, html_response, json_error_response, json_response, redirect_response,
    ResultResp,
};
use crate::templates::components::{format_price, ClusterPanelVm};
use crate::templates::pages::{listing_page, map_page, MapPageVm};
use astra::{Request, Response};
use serde_json::json;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};

/// Everything a request handler needs.
#[derive(Clone)]
pub struct App {
    pub db: Database,
    pub config: AppConfig,
}

/// Entry point used by the server: never fails, errors become error pages.
pub fn respond(req: Request, app: &App) -> Response {
    let is_api = req.uri().path().starts_with("/api/");
    match handle(req, app) {
        Ok(resp) => resp,
        Err(err) if is_api => json_error_response(err),
        Err(err) => error_to_response(err),
    }
}

pub fn handle(req: Request, app: &App) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();
    let query = parse_query(&req);

    match (method, path) {
        ("GET", "/") => redirect_response("/map"),
        ("GET", "/healthz") => json_response(&json!({ "status": "ok" })),

        ("GET", "/map") => {
            let params = MapParams::from_query(&query)?;
            map_view(app, &params, MapStep::Show)
        }
        ("GET", "/map/click") => {
            let params = MapParams::from_query(&query)?;
            let marker = required_u64(&query, "marker")?;
            if params.cluster.is_none() {
                return Err(ServerError::BadRequest("missing 'cluster'".into()));
            }
            map_view(app, &params, MapStep::Click(MarkerHandle(marker)))
        }
        ("GET", "/map/panel") => {
            let params = MapParams::from_query(&query)?;
            let step = match query.get("step").map(String::as_str) {
                Some("next") => MapStep::Next,
                Some("prev") => MapStep::Prev,
                Some("close") => MapStep::Close,
                Some(other) => return Err(ServerError::BadRequest(format!("unknown step '{other}'"))),
                None => MapStep::Show,
            };
            map_view(app, &params, step)
        }
        ("GET", "/api/map") => {
            let params = MapParams::from_query(&query)?;
            map_snapshot(app, &params)
        }
        ("GET", "/api/map/hover") => {
            let params = MapParams::from_query(&query)?;
            let marker = required_u64(&query, "marker")?;
            let entered = match query.get("entered").map(String::as_str) {
                Some("1") | Some("true") => true,
                Some("0") | Some("false") => false,
                _ => return Err(ServerError::BadRequest("'entered' must be 1 or 0".into())),
            };
            map_hover(app, &params, MarkerHandle(marker), entered)
        }

        ("GET", p) if p.starts_with("/listings/") => {
            let id: i64 = p["/listings/".len()..]
                .parse()
                .map_err(|_| ServerError::NotFound)?;
            let language = Language::from_param(query.get("lang").map(String::as_str));
            let listing = get_listing(&app.db, id)?.ok_or(ServerError::NotFound)?;
            html_response(listing_page(&listing, language))
        }

        _ => Err(ServerError::NotFound),
    }
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn required_u64(query: &HashMap<String, String>, key: &str) -> Result<u64, ServerError> {
    query
        .get(key)
        .ok_or_else(|| ServerError::BadRequest(format!("missing '{key}'")))?
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("'{key}' must be a number")))
}

/// Map view state carried in the URL: filters plus the open cluster panel.
///
/// `cluster` is the key of the cluster a click or panel link was rendered
/// for; positions alone don't survive a change in the data.
#[derive(Debug, Clone, PartialEq)]
pub struct MapParams {
    pub search: String,
    pub kind: Option<ListingKind>,
    pub page: u32,
    pub language: Language,
    pub open: Option<usize>,
    pub member: usize,
    pub cluster: Option<String>,
}

impl MapParams {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ServerError> {
        let kind = match query.get("kind").map(|k| k.trim()) {
            None | Some("") => None,
            Some("sale") => Some(ListingKind::ForSale),
            Some("rent") => Some(ListingKind::ForRent),
            Some(other) => {
                return Err(ServerError::BadRequest(format!(
                    "kind must be 'sale' or 'rent', got '{other}'"
                )))
            }
        };

        let number = |key: &str| -> Result<Option<usize>, ServerError> {
            match query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
                None => Ok(None),
                Some(v) => v
                    .parse()
                    .map(Some)
                    .map_err(|_| ServerError::BadRequest(format!("'{key}' must be a number"))),
            }
        };

        let page = number("page")?.unwrap_or(1).clamp(1, u32::MAX as usize) as u32;

        Ok(Self {
            search: query.get("q").cloned().unwrap_or_default(),
            kind,
            page,
            language: Language::from_param(query.get("lang").map(String::as_str)),
            open: number("open")?,
            member: number("member")?.unwrap_or(0),
            cluster: query
                .get("cluster")
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }

    /// Query string for the filters only; any panel state is dropped.
    pub fn filter_query(&self) -> String {
        let mut s = url::form_urlencoded::Serializer::new(String::new());
        s.append_pair("lang", self.language.code());
        if !self.search.is_empty() {
            s.append_pair("q", &self.search);
        }
        if let Some(kind) = self.kind {
            s.append_pair("kind", kind.as_db());
        }
        if self.page > 1 {
            s.append_pair("page", &self.page.to_string());
        }
        s.finish()
    }

    fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            open: None,
            member: 0,
            cluster: None,
            ..self.clone()
        }
    }

    fn listing_query(&self, page_size: u32) -> ListingQuery {
        ListingQuery {
            search: Some(self.search.clone()).filter(|s| !s.trim().is_empty()),
            kind: self.kind,
            page: self.page,
            page_size,
        }
    }
}

/// What the user just did to the map.
#[derive(Debug, Clone, Copy, PartialEq)]
enum MapStep {
    Show,
    Click(MarkerHandle),
    Next,
    Prev,
    Close,
}

fn load_page(app: &App, params: &MapParams) -> Result<(Vec<ListingRecord>, i64), ServerError> {
    let query = params.listing_query(app.config.page_size);
    let records = query_listings(&app.db, &query)?;
    let total = count_listings(&app.db, &query)?;
    Ok((records, total))
}

/// Builds the map for one request: the browser map is ready by the time it
/// replays our commands, so readiness is signalled right after the data lands.
fn ready_controller<'a>(
    app: &App,
    params: &MapParams,
    records: &[ListingRecord],
    navigated: &'a Cell<Option<i64>>,
) -> (MapController<ScriptMap, impl FnMut(i64) + 'a>, Option<ReconcileOutcome>) {
    let map = ScriptMap::new(app.config.map.default_zoom);
    let mut ctl = MapController::new(map, app.config.map.viewport.clone(), move |id: i64| {
        navigated.set(Some(id))
    });
    ctl.set_listings(records, params.language);
    let outcome = ctl.on_map_ready();
    (ctl, outcome)
}

fn map_view(app: &App, params: &MapParams, step: MapStep) -> ResultResp {
    let (records, total) = load_page(app, params)?;
    let navigated = Cell::new(None);
    let (mut ctl, outcome) = ready_controller(app, params, &records, &navigated);
    let current_map = || redirect_response(&format!("/map?{}", params.filter_query()));

    if let Some(open) = params.open {
        let key = params.cluster.as_deref().unwrap_or_default();
        if !ctl.restore_selection(open, params.member, key) {
            // Panel from an older result set; show the current one.
            return current_map();
        }
    }

    match step {
        MapStep::Show => {}
        MapStep::Next => ctl.next(),
        MapStep::Prev => ctl.prev(),
        MapStep::Close => ctl.dismiss(),
        MapStep::Click(handle) => {
            let current = ctl.cluster_for(handle).map(Cluster::key);
            if current.is_none() || current != params.cluster {
                // Marker from an older result set; show the current one.
                return current_map();
            }
            ctl.handle_click(handle);
        }
    }

    if let Some(id) = navigated.get() {
        return redirect_response(&format!("/listings/{id}?lang={}", params.language.code()));
    }

    let page_size = app.config.page_size.max(1);
    let total_pages = ((total.max(0) as u64 + page_size as u64 - 1) / page_size as u64) as u32;
    let page_href = |page: u32| format!("/map?{}", params.with_page(page).filter_query());

    let on_map: HashSet<i64> = ctl
        .clusters()
        .iter()
        .flat_map(|c| c.member_ids())
        .collect();

    let marker_keys: serde_json::Map<String, serde_json::Value> = ctl
        .marker_keys()
        .into_iter()
        .map(|(handle, key)| (handle.0.to_string(), key.into()))
        .collect();

    let map_boot = json!({
        "center": { "lat": app.config.map.default_lat, "lng": app.config.map.default_lng },
        "zoom": app.config.map.default_zoom,
        "tiles": { "url": app.config.map.tile_url, "attribution": app.config.map.tile_attribution },
        "click_href": format!("/map/click?{}", params.filter_query()),
        "marker_keys": marker_keys,
        "hover_scale": HOVER_SCALE,
        "rest_scale": REST_SCALE,
        "commands": ctl.map().commands(),
    })
    .to_string();

    let vm = MapPageVm {
        language: params.language,
        search: params.search.clone(),
        kind: params.kind,
        rows: records
            .iter()
            .map(|r| (r.clone(), on_map.contains(&r.id)))
            .collect(),
        total,
        missing_coordinates: ctl.missing_coordinates(),
        empty: outcome.as_ref().map_or(true, ReconcileOutcome::is_empty),
        map_boot,
        panel: panel_vm(&ctl, params),
        prev_page_href: (params.page > 1).then(|| page_href(params.page - 1)),
        next_page_href: (params.page < total_pages).then(|| page_href(params.page + 1)),
    };

    html_response(map_page(&vm))
}

fn panel_vm<M, N>(ctl: &MapController<M, N>, params: &MapParams) -> Option<ClusterPanelVm>
where
    M: MapCapability,
    N: FnMut(i64),
{
    let panel = ctl.panel()?;
    let open = ctl.open_cluster_index()?;
    let key = ctl.clusters().get(open)?.key();
    let member = panel.member;
    let filters = params.filter_query();
    let step_href = |step: &str| {
        format!(
            "/map/panel?{filters}&open={open}&member={}&cluster={key}&step={step}",
            panel.index
        )
    };

    Some(ClusterPanelVm {
        title: member.display_title.clone(),
        image: member.display_image.clone(),
        price: format_price(member.price, &member.currency),
        kind_label: member.listing_kind.label(params.language).to_string(),
        position: panel.position_label(),
        detail_href: format!("/listings/{}?lang={}", member.id, params.language.code()),
        prev_href: step_href("prev"),
        next_href: step_href("next"),
        close_href: step_href("close"),
    })
}

fn map_snapshot(app: &App, params: &MapParams) -> ResultResp {
    let (records, total) = load_page(app, params)?;
    let navigated = Cell::new(None);
    let (ctl, outcome) = ready_controller(app, params, &records, &navigated);

    let clusters: Vec<_> = ctl
        .clusters()
        .iter()
        .map(|c| {
            json!({
                "key": c.key(),
                "anchor": c.anchor(),
                "member_ids": c.member_ids(),
                "is_multiple": c.is_multiple(),
            })
        })
        .collect();

    json_response(&json!({
        "total": total,
        "points": ctl.point_count(),
        "missing_coordinates": ctl.missing_coordinates(),
        "empty": outcome.as_ref().map_or(true, ReconcileOutcome::is_empty),
        "clusters": clusters,
        "viewport": outcome.map(|o| o.viewport),
        "commands": ctl.map().commands(),
    }))
}

/// What a host map should do while the pointer is over a marker.
fn map_hover(app: &App, params: &MapParams, handle: MarkerHandle, entered: bool) -> ResultResp {
    let (records, _) = load_page(app, params)?;
    let navigated = Cell::new(None);
    let (mut ctl, _) = ready_controller(app, params, &records, &navigated);

    let before = ctl.map().commands().len();
    let handled = ctl.handle_hover(handle, entered);
    let commands = &ctl.map().commands()[before..];

    json_response(&json!({
        "handled": handled,
        "commands": commands,
    }))
}
