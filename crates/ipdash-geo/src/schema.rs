//! Wire schemas of the two geolocation providers and their mapping onto
//! [`LocationRecord`].

use serde::{Deserialize, Deserializer};

use crate::error::{GeoError, UNRESOLVED};
use crate::types::{LocationRecord, Provider, SUCCESS_STATUS};

/// Field allow-list requested from the primary provider
pub const PRIMARY_FIELDS: &str = "status,message,country,countryCode,region,regionName,city,zip,lat,lon,timezone,isp,org,as,query,mobile,proxy,hosting";

/// Treat an explicit `null` the same as a missing field
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// ip-api.com response, tagged by its `status` field
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PrimaryResponse {
    Success(PrimaryRecord),
    Fail {
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryRecord {
    #[serde(default, deserialize_with = "null_default")]
    pub query: String,
    #[serde(default, deserialize_with = "null_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_default")]
    pub country_code: String,
    #[serde(default, deserialize_with = "null_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_default")]
    pub region_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_default")]
    pub zip: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub timezone: String,
    #[serde(default, deserialize_with = "null_default")]
    pub isp: String,
    #[serde(default, deserialize_with = "null_default")]
    pub org: String,
    #[serde(rename = "as", default, deserialize_with = "null_default")]
    pub asn: String,
    #[serde(default)]
    pub mobile: Option<bool>,
    #[serde(default)]
    pub proxy: Option<bool>,
    #[serde(default)]
    pub hosting: Option<bool>,
}

impl PrimaryResponse {
    pub fn into_record(self) -> Result<LocationRecord, GeoError> {
        match self {
            PrimaryResponse::Success(record) => Ok(record.into()),
            PrimaryResponse::Fail { message } => Err(GeoError::ProviderFailure(
                message.unwrap_or_else(|| UNRESOLVED.to_string()),
            )),
        }
    }
}

impl From<PrimaryRecord> for LocationRecord {
    fn from(r: PrimaryRecord) -> Self {
        LocationRecord {
            query: r.query,
            status: SUCCESS_STATUS.to_string(),
            country: r.country,
            country_code: r.country_code,
            region: r.region,
            region_name: r.region_name,
            city: r.city,
            postal_code: r.zip,
            lat: r.lat,
            lon: r.lon,
            timezone: r.timezone,
            isp: r.isp,
            org: r.org,
            asn: r.asn,
            mobile: r.mobile,
            proxy: r.proxy,
            hosting: r.hosting,
            source: Provider::Primary,
        }
    }
}

fn default_success() -> bool {
    true
}

/// ipwho.is response envelope. A missing `success` flag means success.
#[derive(Debug, Deserialize)]
pub struct FallbackResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub record: FallbackRecord,
}

#[derive(Debug, Default, Deserialize)]
pub struct FallbackRecord {
    #[serde(default, deserialize_with = "null_default")]
    pub ip: String,
    #[serde(default, deserialize_with = "null_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_default")]
    pub country_code: String,
    #[serde(default, deserialize_with = "null_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_default")]
    pub region_code: String,
    #[serde(default, deserialize_with = "null_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_default")]
    pub postal: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub timezone: FallbackTimezone,
    #[serde(default, deserialize_with = "null_default")]
    pub connection: FallbackConnection,
}

#[derive(Debug, Default, Deserialize)]
pub struct FallbackTimezone {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FallbackConnection {
    #[serde(default)]
    pub asn: Option<i64>,
    #[serde(default, deserialize_with = "null_default")]
    pub org: String,
    #[serde(default, deserialize_with = "null_default")]
    pub isp: String,
}

impl FallbackResponse {
    pub fn into_record(self) -> Result<LocationRecord, GeoError> {
        if !self.success {
            return Err(GeoError::ProviderFailure(
                self.message.unwrap_or_else(|| UNRESOLVED.to_string()),
            ));
        }
        Ok(self.record.into())
    }
}

/// `AS<n> <org>` for a positive ASN, empty otherwise
fn format_asn(asn: Option<i64>, org: &str) -> String {
    match asn {
        Some(n) if n > 0 => format!("AS{} {}", n, org),
        _ => String::new(),
    }
}

impl From<FallbackRecord> for LocationRecord {
    fn from(r: FallbackRecord) -> Self {
        let asn = format_asn(r.connection.asn, &r.connection.org);
        LocationRecord {
            query: r.ip,
            status: SUCCESS_STATUS.to_string(),
            country: r.country,
            country_code: r.country_code,
            region: r.region_code,
            region_name: r.region,
            city: r.city,
            postal_code: r.postal,
            lat: r.latitude,
            lon: r.longitude,
            timezone: r.timezone.id,
            isp: r.connection.isp,
            org: r.connection.org,
            asn,
            // Not reported by this provider
            mobile: None,
            proxy: None,
            hosting: None,
            source: Provider::Fallback,
        }
    }
}
