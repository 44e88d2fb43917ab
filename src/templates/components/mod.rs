use maud::{html, Markup};

pub mod cluster_panel;
pub mod error;
pub mod listing_card;

pub use cluster_panel::{cluster_panel, ClusterPanelVm};
pub use error::error_page;
pub use listing_card::listing_card;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// "1,250,000 SAR"; listings without a price read "Price on request".
pub fn format_price(price: Option<i64>, currency: &str) -> String {
    let Some(price) = price else {
        return "Price on request".to_string();
    };

    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price < 0 { "-" } else { "" };
    format!("{sign}{grouped} {currency}")
}
