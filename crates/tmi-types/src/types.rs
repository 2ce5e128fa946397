//! Core types for gateway telemetry.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Cellular radio generation reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Generation {
    /// LTE.
    #[serde(rename = "4g")]
    FourG,
    /// 5G NR.
    #[serde(rename = "5g")]
    FiveG,
}

impl Generation {
    /// All generations, in the order the gateway lists them.
    pub const ALL: [Generation; 2] = [Generation::FourG, Generation::FiveG];

    /// The key used for this generation in gateway payloads and the store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::FourG => "4g",
            Generation::FiveG => "5g",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Generation {
    type Err = ParseError;

    /// Parse a generation key.
    ///
    /// ```
    /// use tmi_types::Generation;
    ///
    /// assert_eq!("4g".parse::<Generation>().unwrap(), Generation::FourG);
    /// assert_eq!("5G".parse::<Generation>().unwrap(), Generation::FiveG);
    /// assert!("3g".parse::<Generation>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "4g" => Ok(Generation::FourG),
            "5g" => Ok(Generation::FiveG),
            other => Err(ParseError::InvalidData(format!(
                "unknown generation '{other}'"
            ))),
        }
    }
}

/// One radio generation's reading at poll time.
///
/// The scalar metrics describe the generation as a whole; `bands` lists every
/// carrier band it was aggregating when the reading was taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Active carrier bands (e.g. `b2`, `b66`, `n41`). Never empty.
    pub bands: Vec<String>,
    /// Signal bars shown on the gateway display.
    #[serde(with = "integral")]
    pub bars: i64,
    /// Cell ID.
    #[serde(with = "integral")]
    pub cid: i64,
    /// LTE eNodeB ID.
    #[serde(
        rename = "eNBID",
        default,
        with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub enbid: Option<i64>,
    /// 5G gNodeB ID.
    #[serde(
        rename = "gNBID",
        default,
        with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub gnbid: Option<i64>,
    /// Reference signal received power (dBm).
    #[serde(with = "integral")]
    pub rsrp: i64,
    /// Reference signal received quality (dB).
    #[serde(with = "integral")]
    pub rsrq: i64,
    /// Received signal strength indicator (dBm).
    #[serde(with = "integral")]
    pub rssi: i64,
    /// Signal to interference plus noise ratio (dB).
    #[serde(with = "integral")]
    pub sinr: i64,
}

/// Per-generation readings. Either side may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalMap {
    /// LTE reading.
    #[serde(rename = "4g", default, skip_serializing_if = "Option::is_none")]
    pub four_g: Option<SignalInfo>,
    /// 5G reading.
    #[serde(rename = "5g", default, skip_serializing_if = "Option::is_none")]
    pub five_g: Option<SignalInfo>,
}

impl SignalMap {
    /// Get the reading for a generation, if present.
    #[must_use]
    pub fn get(&self, generation: Generation) -> Option<&SignalInfo> {
        match generation {
            Generation::FourG => self.four_g.as_ref(),
            Generation::FiveG => self.five_g.as_ref(),
        }
    }

    /// Iterate over the generations that are present, 4g first.
    pub fn iter(&self) -> impl Iterator<Item = (Generation, &SignalInfo)> {
        Generation::ALL
            .into_iter()
            .filter_map(|g| self.get(g).map(|info| (g, info)))
    }

    /// Returns true if neither generation is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.four_g.is_none() && self.five_g.is_none()
    }

    /// Check that every present generation lists at least one band.
    pub fn validate(&self) -> ParseResult<()> {
        for (generation, info) in self.iter() {
            if info.bands.is_empty() {
                return Err(ParseError::EmptyBands(generation));
            }
        }
        Ok(())
    }

    /// Decode and validate a signal map from its JSON form.
    pub fn from_json(json: &str) -> ParseResult<Self> {
        let map: SignalMap = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }
}

/// Gateway identity, as reported under `device` in the telemetry payload.
///
/// Every field is optional; firmware revisions differ in what they report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_state: Option<String>,
}

/// One full poll result from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Gateway identity.
    #[serde(default)]
    pub device: DeviceInfo,
    /// Radio readings.
    pub signal: SignalMap,
}

impl Stats {
    /// Decode and validate a raw gateway response body.
    ///
    /// # Examples
    ///
    /// ```
    /// use tmi_types::{Generation, Stats};
    ///
    /// let body = br#"{
    ///     "device": {"model": "FAST5688W"},
    ///     "signal": {"4g": {"bands": ["b66"], "bars": 3.0, "cid": 12,
    ///         "eNBID": 310463, "rsrp": -105, "rsrq": -9, "rssi": -96, "sinr": 5}}
    /// }"#;
    /// let stats = Stats::from_slice(body).unwrap();
    /// assert_eq!(stats.signal.get(Generation::FourG).unwrap().bars, 3);
    /// ```
    pub fn from_slice(body: &[u8]) -> ParseResult<Self> {
        let stats: Stats = serde_json::from_slice(body)?;
        stats.validate()?;
        Ok(stats)
    }

    /// Decode and validate an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> ParseResult<Self> {
        let stats: Stats = serde_json::from_value(value)?;
        stats.validate()?;
        Ok(stats)
    }

    /// Check semantic constraints serde cannot express.
    pub fn validate(&self) -> ParseResult<()> {
        self.signal.validate()
    }

    /// Returns true if the radio readings match, ignoring device metadata.
    #[must_use]
    pub fn same_signal(&self, other: &Stats) -> bool {
        self.signal == other.signal
    }
}

/// Integer fields that the gateway sometimes renders as integral floats.
mod integral {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    fn to_int<E: serde::de::Error>(n: Number) -> Result<i64, E> {
        match n {
            Number::Int(v) => Ok(v),
            Number::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
            Number::Float(f) => Err(E::custom(format!("expected an integer, got {f}"))),
        }
    }

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Number::deserialize(deserializer).and_then(to_int)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<i64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(v),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<i64>, D::Error> {
            Option::<Number>::deserialize(deserializer)?
                .map(to_int::<D::Error>)
                .transpose()
        }
    }
}
