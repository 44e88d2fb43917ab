use crate::domain::listing::{Language, ListingKind, ListingRecord};
use crate::templates::components::{cluster_panel, listing_card, ClusterPanelVm};
use crate::templates::desktop_layout;
use maud::{html, Markup, PreEscaped};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Replays the server's map command log on a Leaflet map.
/// Marker clicks go back to the server, which decides what they mean.
const MAP_SHIM: &str = r#"
(function () {
  var boot = JSON.parse(document.getElementById('map-boot').textContent);
  var map = L.map('map').setView([boot.center.lat, boot.center.lng], boot.zoom);
  L.tileLayer(boot.tiles.url, { attribution: boot.tiles.attribution }).addTo(map);
  var markers = {};

  function icon(content, scale) {
    var size = Math.round(content.size * (scale || 1));
    return L.divIcon({
      className: 'map-marker map-marker-' + content.kind,
      html: '<span style="display:flex;align-items:center;justify-content:center;width:' + size +
        'px;height:' + size + 'px;border-radius:50%;border:2px solid #fff;background:' + content.color +
        ';color:#fff;font-weight:700">' + (content.label || '') + '</span>',
      iconSize: [size, size]
    });
  }

  function scale(handle, value) {
    var m = markers[handle];
    if (m) { m.setIcon(icon(m.content, value)); }
  }

  var ops = {
    create_marker: function (c) {
      var m = L.marker([c.position.lat, c.position.lng], { icon: icon(c.content), title: c.title }).addTo(map);
      m.content = c.content;
      markers[c.handle] = m;
    },
    remove_marker: function (c) {
      if (markers[c.handle]) { map.removeLayer(markers[c.handle]); delete markers[c.handle]; }
    },
    listen_click: function (c) {
      markers[c.handle].on('click', function () {
        window.location = boot.click_href + '&marker=' + c.handle +
          '&cluster=' + encodeURIComponent(boot.marker_keys[c.handle]);
      });
    },
    listen_hover: function (c) {
      markers[c.handle].on('mouseover', function () { scale(c.handle, boot.hover_scale); });
      markers[c.handle].on('mouseout', function () { scale(c.handle, boot.rest_scale); });
    },
    scale_marker: function (c) { scale(c.handle, c.scale); },
    fit_bounds: function (c) {
      map.fitBounds([[c.bounds.south, c.bounds.west], [c.bounds.north, c.bounds.east]], {
        paddingTopLeft: [c.insets.left, c.insets.top],
        paddingBottomRight: [c.insets.right, c.insets.bottom]
      });
    },
    set_center: function (c) { map.setView([c.point.lat, c.point.lng], map.getZoom()); },
    set_zoom: function (c) { map.setZoom(c.level); },
    zoom_at_least: function (c) { if (map.getZoom() < c.level) { map.setZoom(c.level); } },
    pan_to: function (c) { map.panTo([c.point.lat, c.point.lng]); }
  };

  map.whenReady(function () {
    boot.commands.forEach(function (c) { if (ops[c.op]) { ops[c.op](c); } });
  });
})();
"#;

pub struct MapPageVm {
    pub language: Language,
    pub search: String,
    pub kind: Option<ListingKind>,

    /// Listings on this page, flagged with whether they made it onto the map.
    pub rows: Vec<(ListingRecord, bool)>,
    pub total: i64,
    pub missing_coordinates: usize,
    /// No listing made it onto the map.
    pub empty: bool,

    /// JSON handed to the map shim: command log, defaults, click route.
    pub map_boot: String,
    pub panel: Option<ClusterPanelVm>,

    pub prev_page_href: Option<String>,
    pub next_page_href: Option<String>,
}

pub fn map_page(vm: &MapPageVm) -> Markup {
    let head = html! {
        link rel="stylesheet" href=(LEAFLET_CSS);
        script src=(LEAFLET_JS) defer {};
    };

    desktop_layout(
        "Listings Map",
        vm.language,
        head,
        html! {
            main class="map-view" {
                section class="list-panel" {
                    (filter_form(vm))

                    p class="result-count" { (vm.total) " listings" }
                    @if vm.missing_coordinates > 0 {
                        p class="missing-coordinates" {
                            (vm.missing_coordinates) " listings have no location"
                        }
                    }

                    @for (listing, on_map) in &vm.rows {
                        (listing_card(listing, vm.language, *on_map))
                    }

                    nav class="pager" {
                        @if let Some(href) = &vm.prev_page_href {
                            a href=(href) rel="prev" { "Previous" }
                        }
                        @if let Some(href) = &vm.next_page_href {
                            a href=(href) rel="next" { "Next" }
                        }
                    }
                }

                @if vm.empty {
                    section class="map-empty" {
                        h2 { "No listings to show on the map" }
                        p { "Try a different search or filter." }
                    }
                } @else {
                    div id="map" class="map-canvas" {}
                    script id="map-boot" type="application/json" {
                        (PreEscaped(script_safe(&vm.map_boot)))
                    }
                    script { (PreEscaped(format!("window.addEventListener('load', function () {{{MAP_SHIM}}});"))) }
                }

                @if let Some(panel) = &vm.panel {
                    (cluster_panel(panel))
                }
            }
        },
    )
}

fn filter_form(vm: &MapPageVm) -> Markup {
    html! {
        form class="filters" method="get" action="/map" {
            input type="hidden" name="lang" value=(vm.language.code());
            label class="sr-only" for="q" { "Search" }
            input type="search" id="q" name="q" value=(vm.search) placeholder="Search by title or city";

            label class="sr-only" for="kind" { "Type" }
            select id="kind" name="kind" {
                option value="" selected[vm.kind.is_none()] { "All" }
                @for kind in [ListingKind::ForSale, ListingKind::ForRent] {
                    option value=(kind.as_db()) selected[vm.kind == Some(kind)] { (kind.label(vm.language)) }
                }
            }
            button type="submit" class="primary" { "Search" }
        }
    }
}

/// Keeps embedded JSON from closing its <script> element early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
