// src/domain/listing.rs

use chrono::NaiveDateTime;
use serde::Serialize;

/// A listing row exactly as the query service hands it out.
/// Coordinates stay as the raw decimal strings stored by the back office;
/// the map layer decides which of them are usable.
#[derive(Debug, Clone, Serialize)]
pub struct ListingRecord {
    pub id: i64,

    pub title: String,
    pub title_ar: Option<String>,

    // "sale" | "rent"
    pub listing_kind: String,
    pub price: Option<i64>,
    pub currency: String,
    pub city: String,

    pub latitude: Option<String>,
    pub longitude: Option<String>,

    pub images: Vec<String>,
    pub listed_at: NaiveDateTime,
}

impl ListingRecord {
    pub fn kind(&self) -> ListingKind {
        ListingKind::from_db(&self.listing_kind)
    }

    /// Title in the requested language, falling back to the default title.
    pub fn title_for(&self, language: Language) -> &str {
        match language {
            Language::Ar => self
                .title_ar
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(&self.title),
            Language::En => &self.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    ForSale,
    ForRent,
}

impl ListingKind {
    /// Anything that isn't explicitly a rental is treated as a sale.
    pub fn from_db(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rent" | "for_rent" | "for-rent" => ListingKind::ForRent,
            _ => ListingKind::ForSale,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            ListingKind::ForSale => "sale",
            ListingKind::ForRent => "rent",
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (ListingKind::ForSale, Language::En) => "For sale",
            (ListingKind::ForRent, Language::En) => "For rent",
            (ListingKind::ForSale, Language::Ar) => "للبيع",
            (ListingKind::ForRent, Language::Ar) => "للإيجار",
        }
    }
}

/// Display language of the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("ar") => Language::Ar,
            _ => Language::En,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn dir(&self) -> &'static str {
        match self {
            Language::En => "ltr",
            Language::Ar => "rtl",
        }
    }
}
