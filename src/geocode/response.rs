/// Subset of the BigDataCloud `reverse-geocode-client` response
#[derive(serde::Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReverseGeocodeResponse {
    /// Locality name; often empty for rural coordinates
    #[serde(default)]
    pub city: Option<String>,
    /// English country name, e.g. "Pakistan"
    #[serde(default)]
    pub country_name: Option<String>,
}
