// Query-parameter normalization. The query-string shape has evolved
// over time: search bars, deep links and legacy bookmarks all use
// different key names for the same thing, so every entry point runs
// through one canonical table per domain before anything else sees the
// parameters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Search domain a set of query parameters belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDomain {
    Hotels,
    Tours,
    Transport,
}

/// One canonical field with its accepted aliases in priority order.
/// The canonical name itself is always the highest-priority alias.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalField {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub default: &'static str,
}

const HOTEL_FIELDS: &[CanonicalField] = &[
    CanonicalField {
        name: "cityId",
        aliases: &["cityId", "city", "location"],
        default: "",
    },
    CanonicalField {
        name: "checkIn",
        aliases: &["checkIn", "check_in", "from"],
        default: "",
    },
    CanonicalField {
        name: "checkOut",
        aliases: &["checkOut", "check_out", "to"],
        default: "",
    },
    CanonicalField {
        name: "guests",
        aliases: &["guests", "guestCount", "pax"],
        default: "1",
    },
    CanonicalField {
        name: "rooms",
        aliases: &["rooms", "roomCount"],
        default: "1",
    },
];

const TOUR_FIELDS: &[CanonicalField] = &[
    CanonicalField {
        name: "cityId",
        aliases: &["cityId", "city", "location"],
        default: "",
    },
    CanonicalField {
        name: "themeId",
        aliases: &["themeId", "theme", "category"],
        default: "",
    },
    CanonicalField {
        name: "date",
        aliases: &["date", "startDate"],
        default: "",
    },
    CanonicalField {
        name: "travelers",
        aliases: &["travelers", "guests", "pax"],
        default: "1",
    },
];

const TRANSPORT_FIELDS: &[CanonicalField] = &[
    CanonicalField {
        name: "fromCityId",
        aliases: &["fromCityId", "from", "origin"],
        default: "",
    },
    CanonicalField {
        name: "toCityId",
        aliases: &["toCityId", "to", "destination"],
        default: "",
    },
    CanonicalField {
        name: "date",
        aliases: &["date", "travelDate"],
        default: "",
    },
    CanonicalField {
        name: "days",
        aliases: &["days", "duration"],
        default: "1",
    },
    CanonicalField {
        name: "tripType",
        aliases: &["tripType", "trip_type"],
        default: "one-way",
    },
];

/// Canonical field table for a domain, in output order.
pub fn canonical_fields(domain: SearchDomain) -> &'static [CanonicalField] {
    match domain {
        SearchDomain::Hotels => HOTEL_FIELDS,
        SearchDomain::Tours => TOUR_FIELDS,
        SearchDomain::Transport => TRANSPORT_FIELDS,
    }
}

/// Maps raw query parameters onto the canonical parameter set for
/// `domain`. Total: every canonical field is present in the output.
/// Deterministic: the first non-empty alias in the table wins and
/// lower-priority aliases are silently ignored, independent of the
/// input map's iteration order.
pub fn normalize(raw: &HashMap<String, String>, domain: SearchDomain) -> HashMap<String, String> {
    canonical_fields(domain)
        .iter()
        .map(|field| {
            let value = field
                .aliases
                .iter()
                .find_map(|alias| raw.get(*alias).filter(|v| !v.is_empty()))
                .cloned()
                .unwrap_or_else(|| field.default.to_string());
            (field.name.to_string(), value)
        })
        .collect()
}
