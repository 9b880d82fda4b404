//! Autocomplete over fixed lists of popular cities and countries.

/// Maximum suggestions shown per field
pub const MAX_SUGGESTIONS: usize = 5;

pub const POPULAR_CITIES: &[&str] = &[
    "Lahore", "Karachi", "Islamabad", "Faisalabad", "Rawalpindi",
    "Mecca", "Medina", "Riyadh", "Jeddah", "Dammam",
    "Dubai", "Abu Dhabi", "Sharjah", "Ajman",
    "Istanbul", "Ankara", "Izmir", "Bursa",
    "Cairo", "Alexandria", "Giza", "Sharm El Sheikh",
    "Jakarta", "Surabaya", "Bandung", "Medan",
    "Kuala Lumpur", "George Town", "Ipoh", "Shah Alam",
    "Singapore", "Manila", "Bangkok", "Ho Chi Minh City",
    "London", "Birmingham", "Manchester", "Leeds",
    "New York", "Los Angeles", "Chicago", "Houston",
    "Toronto", "Vancouver", "Montreal", "Calgary",
];

pub const POPULAR_COUNTRIES: &[&str] = &[
    "Pakistan", "Saudi Arabia", "United Arab Emirates", "Turkey",
    "Egypt", "Indonesia", "Malaysia", "Singapore",
    "Philippines", "Thailand", "Vietnam", "United Kingdom",
    "United States", "Canada", "Australia", "Germany",
    "France", "Italy", "Spain", "Netherlands",
    "Belgium", "Switzerland", "Austria", "Sweden",
    "Norway", "Denmark", "Finland", "Poland",
    "Czech Republic", "Hungary", "Romania", "Bulgaria",
    "Greece", "Portugal", "Ireland", "New Zealand",
    "South Africa", "Nigeria", "Kenya", "Morocco",
    "Algeria", "Tunisia", "Libya", "Sudan",
    "Iran", "Iraq", "Syria", "Lebanon",
    "Jordan", "Palestine", "Yemen", "Oman",
    "Qatar", "Bahrain", "Kuwait",
];

/// Case-insensitive substring matches of `input` in `candidates`, in list
/// order, capped at [`MAX_SUGGESTIONS`]. Empty input suggests nothing.
pub fn filter<'a>(candidates: &[&'a str], input: &str) -> Vec<&'a str> {
    if input.is_empty() {
        return Vec::new();
    }

    let needle = input.to_lowercase();
    candidates
        .iter()
        .copied()
        .filter(|candidate| candidate.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}

pub fn suggest_cities(input: &str) -> Vec<&'static str> {
    filter(POPULAR_CITIES, input)
}

pub fn suggest_countries(input: &str) -> Vec<&'static str> {
    filter(POPULAR_COUNTRIES, input)
}
