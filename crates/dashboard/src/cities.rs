//! City picker helpers.

/// Cities whose name contains `query`, ignoring case. An empty query
/// matches everything.
pub fn filter_cities<'a>(cities: &'a [String], query: &str) -> Vec<&'a str> {
    let query = query.to_lowercase();
    cities
        .iter()
        .filter(|c| c.to_lowercase().contains(&query))
        .map(String::as_str)
        .collect()
}

/// The city to show: `preferred` if the backend lists it (any case),
/// otherwise the first listed city.
pub fn select_city(cities: &[String], preferred: Option<&str>) -> Option<String> {
    if let Some(preferred) = preferred {
        if let Some(city) = cities.iter().find(|c| c.eq_ignore_ascii_case(preferred)) {
            return Some(city.clone());
        }
        tracing::warn!(city = preferred, "Configured city not offered by backend");
    }
    cities.first().cloned()
}
