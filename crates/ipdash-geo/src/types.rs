use serde::{Deserialize, Serialize};
use std::fmt;

/// Which geolocation provider produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Primary,
    Fallback,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Primary => f.write_str("primary"),
            Provider::Fallback => f.write_str("fallback"),
        }
    }
}

/// Canonical result of an IP lookup.
///
/// Serializes to the primary provider's wire shape (`zip`, `as`, camelCase)
/// no matter which provider answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationRecord {
    /// The resolved IP address
    pub query: String,
    pub status: String,
    pub country: String,
    pub country_code: String,
    /// Region code, e.g. `CA`
    pub region: String,
    /// Region display name, e.g. `California`
    pub region_name: String,
    pub city: String,
    #[serde(rename = "zip")]
    pub postal_code: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// IANA zone name
    pub timezone: String,
    pub isp: String,
    pub org: String,
    /// `AS<number> <org>`, empty when unknown
    #[serde(rename = "as")]
    pub asn: String,
    /// `None` means the provider did not report it, which is not the same as `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting: Option<bool>,
    #[serde(skip)]
    pub source: Provider,
}

pub const SUCCESS_STATUS: &str = "success";

impl LocationRecord {
    /// Coordinates usable for weather, map and clock lookups.
    ///
    /// Both values must be present, finite and non-zero. Providers report `0`
    /// for an axis they have no fix on.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon))
                if lat.is_finite() && lon.is_finite() && lat != 0.0 && lon != 0.0 =>
            {
                Some((lat, lon))
            }
            _ => None,
        }
    }

    /// Best short place name for widget headers (city, else region name)
    pub fn place_name(&self) -> Option<&str> {
        [self.city.as_str(), self.region_name.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
    }
}

/// Display value for a possibly-empty text field
pub fn text_label(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Display value for a tri-state flag: unknown stays distinguishable from `false`
pub fn flag_label(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "N/A",
    }
}

impl fmt::Display for LocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IP:       {}", text_label(&self.query))?;
        writeln!(f, "Country:  {} ({})", text_label(&self.country), text_label(&self.country_code))?;
        writeln!(f, "Region:   {} ({})", text_label(&self.region_name), text_label(&self.region))?;
        writeln!(f, "City:     {}, {}", text_label(&self.city), text_label(&self.postal_code))?;
        match self.coordinates() {
            Some((lat, lon)) => writeln!(f, "Coords:   {:.4}, {:.4}", lat, lon)?,
            None => writeln!(f, "Coords:   N/A")?,
        }
        writeln!(f, "Timezone: {}", text_label(&self.timezone))?;
        writeln!(f, "ISP:      {}", text_label(&self.isp))?;
        writeln!(f, "Org:      {}", text_label(&self.org))?;
        writeln!(f, "ASN:      {}", text_label(&self.asn))?;
        writeln!(f, "Mobile:   {}", flag_label(self.mobile))?;
        writeln!(f, "Proxy:    {}", flag_label(self.proxy))?;
        write!(f, "Hosting:  {}", flag_label(self.hosting))
    }
}
