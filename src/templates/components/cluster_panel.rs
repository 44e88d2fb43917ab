use maud::{html, Markup};

/// The open cluster, ready to render. Links carry the selection across requests.
pub struct ClusterPanelVm {
    pub title: String,
    pub image: Option<String>,
    pub price: String,
    pub kind_label: String,
    pub position: String,
    pub detail_href: String,
    pub prev_href: String,
    pub next_href: String,
    pub close_href: String,
}

pub fn cluster_panel(vm: &ClusterPanelVm) -> Markup {
    html! {
        aside id="cluster-panel" class="cluster-panel card" {
            a class="panel-close" href=(vm.close_href) aria-label="Close" { "×" }
            @if let Some(image) = &vm.image {
                img src=(image) alt=(vm.title);
            }
            h3 { a href=(vm.detail_href) { (vm.title) } }
            p class="muted" { (vm.kind_label) }
            p class="price" { (vm.price) }
            nav class="panel-pager" {
                a class="panel-prev" href=(vm.prev_href) rel="prev" { "‹" }
                span class="panel-position" { (vm.position) }
                a class="panel-next" href=(vm.next_href) rel="next" { "›" }
            }
        }
    }
}
