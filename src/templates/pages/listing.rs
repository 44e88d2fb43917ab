use crate::domain::listing::{Language, ListingRecord};
use crate::templates::components::{card, format_price};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn listing_page(listing: &ListingRecord, language: Language) -> Markup {
    let title = listing.title_for(language);

    desktop_layout(
        title,
        language,
        html! {},
        html! {
            main class="container listing-detail" {
                p { a href=(format!("/map?lang={}", language.code())) { "← Back to the map" } }
                h1 { (title) }
                p class="muted" { (listing.city) " · " (listing.kind().label(language)) }
                p class="price" { (format_price(listing.price, &listing.currency)) }

                @if !listing.images.is_empty() {
                    div class="gallery" {
                        @for image in &listing.images {
                            img src=(image) alt=(title) loading="lazy";
                        }
                    }
                }

                (card("Location", html! {
                    @match (&listing.latitude, &listing.longitude) {
                        (Some(lat), Some(lng)) => p { (lat) ", " (lng) },
                        _ => p { "Location not provided" },
                    }
                }))

                p class="muted" { "Listed " (listing.listed_at.format("%Y-%m-%d")) }
            }
        },
    )
}
