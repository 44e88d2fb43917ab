// src/map/geo_point.rs

use crate::domain::listing::{Language, ListingKind, ListingRecord};
use serde::Serialize;
use tracing::debug;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The minimal geo-referenced projection of a listing used by the map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub listing_kind: ListingKind,
    pub display_title: String,
    pub display_image: Option<String>,

    // Carried for the cluster panel.
    pub price: Option<i64>,
    pub currency: String,
}

impl GeoPoint {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Builds a point only when both coordinates are usable.
    pub fn from_record(record: &ListingRecord, language: Language) -> Option<Self> {
        let latitude = parse_coordinate(record.latitude.as_deref())?;
        let longitude = parse_coordinate(record.longitude.as_deref())?;

        Some(GeoPoint {
            id: record.id,
            latitude,
            longitude,
            listing_kind: record.kind(),
            display_title: record.title_for(language).to_string(),
            display_image: record.images.first().cloned(),
            price: record.price,
            currency: record.currency.clone(),
        })
    }
}

/// Result of projecting a result set onto the map layer.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub points: Vec<GeoPoint>,
    /// Records dropped for null, unparsable or zero coordinates.
    pub missing_coordinates: usize,
}

pub fn extract_geo_points(records: &[ListingRecord], language: Language) -> Extraction {
    let points: Vec<GeoPoint> = records
        .iter()
        .filter_map(|r| GeoPoint::from_record(r, language))
        .collect();

    let missing_coordinates = records.len() - points.len();
    if missing_coordinates > 0 {
        debug!(
            missing = missing_coordinates,
            total = records.len(),
            "listings without usable coordinates left off the map"
        );
    }

    Extraction {
        points,
        missing_coordinates,
    }
}

/// A coordinate must parse to a finite number and must not be exactly zero.
///
/// Stored values are free text, so only the leading number counts:
/// `"24.7136 N"` and `"46.6753°"` are both usable.
fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw.and_then(leading_number)
        .filter(|v| v.is_finite() && *v != 0.0)
}

/// The longest decimal prefix of `raw` after leading whitespace, if any.
fn leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    // An exponent only counts when it has digits: "1e" reads as 1.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn listing(id: i64, lat: Option<&str>, lng: Option<&str>) -> ListingRecord {
        ListingRecord {
            id,
            title: format!("Listing {id}"),
            title_ar: None,
            listing_kind: "sale".to_string(),
            price: Some(900_000),
            currency: "SAR".to_string(),
            city: "Riyadh".to_string(),
            latitude: lat.map(str::to_string),
            longitude: lng.map(str::to_string),
            images: vec![format!("/media/{id}/cover.jpg")],
            listed_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn zero_coordinates_are_dropped() {
        let out = extract_geo_points(&[listing(1, Some("0"), Some("0"))], Language::En);
        assert!(out.points.is_empty());
        assert_eq!(out.missing_coordinates, 1);
    }

    #[test]
    fn a_single_zero_axis_is_enough_to_drop() {
        let records = [
            listing(1, Some("24.7136"), Some("0.0")),
            listing(2, Some("0"), Some("46.6753")),
        ];
        let out = extract_geo_points(&records, Language::En);
        assert!(out.points.is_empty());
        assert_eq!(out.missing_coordinates, 2);
    }

    #[test]
    fn invalid_records_are_counted_not_errors() {
        let records = [
            listing(1, Some("24.7136"), Some("46.6753")),
            listing(2, None, Some("46.6753")),
            listing(3, Some("abc"), Some("46.6")),
            listing(4, Some("NaN"), Some("46.6")),
            listing(5, Some("inf"), Some("46.6")),
            listing(6, Some(""), Some("")),
            listing(7, Some(" 24.8 "), Some(" 46.7 ")),
            listing(8, Some("N 24.8"), Some("46.7")),
        ];
        let out = extract_geo_points(&records, Language::En);

        let ids: Vec<i64> = out.points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 7]);
        assert_eq!(out.missing_coordinates, 6);

        for p in &out.points {
            assert!(p.latitude.is_finite() && p.latitude != 0.0);
            assert!(p.longitude.is_finite() && p.longitude != 0.0);
        }
    }

    #[test]
    fn trailing_text_after_the_number_is_ignored() {
        let records = [
            listing(1, Some("24.7136 N"), Some("46.6753 E")),
            listing(2, Some("24.7136°"), Some("46.6753°")),
            listing(3, Some("  -33.86abc"), Some("151.2093,")),
            listing(4, Some("0abc"), Some("46.6")),
            listing(5, Some("0.0 N"), Some("46.6")),
        ];
        let out = extract_geo_points(&records, Language::En);

        let coords: Vec<(i64, f64, f64)> = out
            .points
            .iter()
            .map(|p| (p.id, p.latitude, p.longitude))
            .collect();
        assert_eq!(
            coords,
            vec![
                (1, 24.7136, 46.6753),
                (2, 24.7136, 46.6753),
                (3, -33.86, 151.2093),
            ]
        );
        assert_eq!(out.missing_coordinates, 2);
    }

    #[test]
    fn leading_number_takes_the_longest_decimal_prefix() {
        assert_eq!(leading_number(".5km"), Some(0.5));
        assert_eq!(leading_number("24."), Some(24.0));
        assert_eq!(leading_number("+24.7"), Some(24.7));
        assert_eq!(leading_number("2.47e1x"), Some(24.7));
        assert_eq!(leading_number("24.7e"), Some(24.7));
        assert_eq!(leading_number("24.7e+"), Some(24.7));
        assert_eq!(leading_number("-"), None);
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number("+.e5"), None);
        assert_eq!(leading_number("Infinity"), None);
    }

    #[test]
    fn point_carries_display_metadata() {
        let mut r = listing(9, Some("24.7"), Some("46.6"));
        r.listing_kind = "rent".to_string();
        r.title_ar = Some("شقة".to_string());

        let p = GeoPoint::from_record(&r, Language::Ar).unwrap();
        assert_eq!(p.listing_kind, ListingKind::ForRent);
        assert_eq!(p.display_title, "شقة");
        assert_eq!(p.display_image.as_deref(), Some("/media/9/cover.jpg"));
        assert_eq!(p.position(), LatLng::new(24.7, 46.6));
    }
}
