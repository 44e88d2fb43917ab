use crate::domain::listing::{Language, ListingRecord};
use crate::templates::components::format_price;
use maud::{html, Markup};

pub fn listing_card(listing: &ListingRecord, language: Language, on_map: bool) -> Markup {
    let kind = listing.kind();

    html! {
        article class="listing-card" data-listing-id=(listing.id) {
            @if let Some(image) = listing.images.first() {
                img src=(image) alt=(listing.title_for(language)) loading="lazy";
            }
            div class="listing-card-body" {
                h4 {
                    a href=(format!("/listings/{}?lang={}", listing.id, language.code())) {
                        (listing.title_for(language))
                    }
                }
                p class="muted" { (listing.city) " · " (kind.label(language)) }
                p class="price" { (format_price(listing.price, &listing.currency)) }
                @if !on_map {
                    p class="no-location" { "No location on map" }
                }
            }
        }
    }
}
