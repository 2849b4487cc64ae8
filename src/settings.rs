//! The statically typed property record and its value types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants;
use crate::error::{Error, Result};
use crate::property::Property;
use crate::value::Value;

/// How the length of a recording or signal is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthDomain {
    #[default]
    Samples,
    Time,
}

impl LengthDomain {
    pub fn as_str(self) -> &'static str {
        match self {
            LengthDomain::Samples => "samples",
            LengthDomain::Time => "time",
        }
    }
}

impl fmt::Display for LengthDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthDomain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "samples" => Ok(LengthDomain::Samples),
            "time" => Ok(LengthDomain::Time),
            _ => Err(Error::InvalidValue {
                name: Property::LengthDomain.name(),
                expected: "\"samples\" or \"time\"",
            }),
        }
    }
}

/// Input and output device indices, as understood by the audio host.
///
/// `None` means the host has no device on that side. In dynamic values
/// a negative index stands for `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct DevicePair {
    pub input: Option<usize>,
    pub output: Option<usize>,
}

impl DevicePair {
    pub fn new(input: usize, output: usize) -> Self {
        Self {
            input: Some(input),
            output: Some(output),
        }
    }

    /// Accepts `[input, output]`, or a single index used for both sides.
    pub fn from_value(value: &Value) -> Result<Self> {
        let invalid = Error::InvalidValue {
            name: Property::Device.name(),
            expected: "[input, output] device indices",
        };
        let index = |v: &Value| v.as_i64().map(|n| usize::try_from(n).ok());
        match value {
            Value::List(items) if items.len() == 2 => {
                let input = index(&items[0]).ok_or(invalid.clone())?;
                let output = index(&items[1]).ok_or(invalid)?;
                Ok(Self { input, output })
            }
            other => {
                let both = index(other).ok_or(invalid)?;
                Ok(Self {
                    input: both,
                    output: both,
                })
            }
        }
    }
}

fn index_to_i64(index: Option<usize>) -> i64 {
    index.map_or(-1, |i| i as i64)
}

impl From<[i64; 2]> for DevicePair {
    fn from([input, output]: [i64; 2]) -> Self {
        Self {
            input: usize::try_from(input).ok(),
            output: usize::try_from(output).ok(),
        }
    }
}

impl From<DevicePair> for [i64; 2] {
    fn from(pair: DevicePair) -> Self {
        [index_to_i64(pair.input), index_to_i64(pair.output)]
    }
}

impl From<DevicePair> for Value {
    fn from(pair: DevicePair) -> Self {
        Value::from(<[i64; 2]>::from(pair))
    }
}

/// Frequency band of interest, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreqLims {
    pub min: u32,
    pub max: u32,
}

/// Silence at the beginning and end of a signal, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub start: f64,
    pub stop: f64,
}

/// One field per stored property.
///
/// `Settings::factory` is the default table; a `Properties` instance keeps
/// one copy as its factory values and one as its current values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub sampling_rate: u32,
    pub length_domain: LengthDomain,
    pub fft_degree: u32,
    pub time_length: f64,
    pub integration: f64,
    pub min_freq: u32,
    pub max_freq: u32,
    pub device: DevicePair,
    pub in_channel: Vec<u32>,
    pub out_channel: Vec<u32>,
    pub stop_margin: f64,
    pub start_margin: f64,
    pub comment: String,
}

impl Settings {
    /// The default table. `device` is whatever the audio host reported as its
    /// defaults when the table was built.
    pub fn factory(device: DevicePair) -> Self {
        Self {
            sampling_rate: constants::SAMPLING_RATE,
            length_domain: LengthDomain::Samples,
            fft_degree: constants::FFT_DEGREE,
            time_length: constants::TIME_LENGTH,
            integration: constants::INTEGRATION,
            min_freq: constants::MIN_FREQ,
            max_freq: constants::MAX_FREQ,
            device,
            in_channel: constants::IN_CHANNEL.to_vec(),
            out_channel: constants::OUT_CHANNEL.to_vec(),
            stop_margin: constants::STOP_MARGIN,
            start_margin: constants::START_MARGIN,
            comment: constants::COMMENT.to_string(),
        }
    }

    pub fn freq_lims(&self) -> FreqLims {
        FreqLims {
            min: self.min_freq,
            max: self.max_freq,
        }
    }

    pub fn margins(&self) -> Margins {
        Margins {
            start: self.start_margin,
            stop: self.stop_margin,
        }
    }

    /// Current value of any property as a dynamic `Value`.
    pub fn get(&self, property: Property) -> Value {
        match property {
            Property::SamplingRate => self.sampling_rate.into(),
            Property::LengthDomain => self.length_domain.as_str().into(),
            Property::FftDegree => self.fft_degree.into(),
            Property::TimeLength => self.time_length.into(),
            Property::Integration => self.integration.into(),
            Property::MinFreq => self.min_freq.into(),
            Property::MaxFreq => self.max_freq.into(),
            Property::FreqLims => (self.min_freq, self.max_freq).into(),
            Property::Device => self.device.into(),
            Property::InChannel => self.in_channel.clone().into(),
            Property::OutChannel => self.out_channel.clone().into(),
            Property::StartMargin => self.start_margin.into(),
            Property::StopMargin => self.stop_margin.into(),
            Property::Margins => (self.start_margin, self.stop_margin).into(),
            Property::Comment => self.comment.as_str().into(),
        }
    }

    /// Converts and stores `value`. Returns whether the stored value changed.
    ///
    /// Nothing is written when the value has the wrong shape. `Properties`
    /// never calls this for `device`; its writes go through the audio host.
    pub(crate) fn assign(&mut self, property: Property, value: &Value) -> Result<bool> {
        let invalid = |expected: &'static str| Error::InvalidValue {
            name: property.name(),
            expected,
        };
        let changed = match property {
            Property::SamplingRate => {
                let v = value.as_u32().ok_or(invalid("an integer rate in Hz"))?;
                replace(&mut self.sampling_rate, v)
            }
            Property::LengthDomain => {
                let v = value
                    .as_str()
                    .ok_or(invalid("\"samples\" or \"time\""))?
                    .parse::<LengthDomain>()?;
                replace(&mut self.length_domain, v)
            }
            Property::FftDegree => {
                let v = value.as_u32().ok_or(invalid("an integer exponent"))?;
                replace(&mut self.fft_degree, v)
            }
            Property::TimeLength => {
                let v = value.as_f64().ok_or(invalid("a duration in seconds"))?;
                replace(&mut self.time_length, v)
            }
            Property::Integration => {
                let v = value.as_f64().ok_or(invalid("a duration in seconds"))?;
                replace(&mut self.integration, v)
            }
            Property::MinFreq => {
                let v = value.as_u32().ok_or(invalid("an integer frequency in Hz"))?;
                replace(&mut self.min_freq, v)
            }
            Property::MaxFreq => {
                let v = value.as_u32().ok_or(invalid("an integer frequency in Hz"))?;
                replace(&mut self.max_freq, v)
            }
            Property::FreqLims => {
                let expected = "[min, max] frequencies in Hz";
                let (min, max) = pair(value, Value::as_u32).ok_or(invalid(expected))?;
                let min_changed = replace(&mut self.min_freq, min);
                replace(&mut self.max_freq, max) || min_changed
            }
            Property::InChannel => {
                let v = value.as_u32_list().ok_or(invalid("a list of channel numbers"))?;
                replace(&mut self.in_channel, v)
            }
            Property::OutChannel => {
                let v = value.as_u32_list().ok_or(invalid("a list of channel numbers"))?;
                replace(&mut self.out_channel, v)
            }
            Property::StartMargin => {
                let v = value.as_f64().ok_or(invalid("a duration in seconds"))?;
                replace(&mut self.start_margin, v)
            }
            Property::StopMargin => {
                let v = value.as_f64().ok_or(invalid("a duration in seconds"))?;
                replace(&mut self.stop_margin, v)
            }
            Property::Margins => {
                let expected = "[start, stop] durations in seconds";
                let (start, stop) = pair(value, Value::as_f64).ok_or(invalid(expected))?;
                let start_changed = replace(&mut self.start_margin, start);
                replace(&mut self.stop_margin, stop) || start_changed
            }
            Property::Comment => {
                // Anything is a valid comment; non-text values keep their printed form.
                let v = match value {
                    Value::Text(s) => s.clone(),
                    other => other.to_string(),
                };
                replace(&mut self.comment, v)
            }
            Property::Device => {
                let device = DevicePair::from_value(value)?;
                replace(&mut self.device, device)
            }
        };
        Ok(changed)
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn pair<T>(value: &Value, convert: impl Fn(&Value) -> Option<T>) -> Option<(T, T)> {
    match value.as_list()? {
        [a, b] => Some((convert(a)?, convert(b)?)),
        _ => None,
    }
}

/// One `name = value` line per stored property.
impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for property in Property::STORED {
            let name = property.name();
            let tabs = if name.len() <= 7 { "\t\t" } else { "\t" };
            writeln!(f, "{}{} = {}", name, tabs, self.get(property))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> Settings {
        Settings::factory(DevicePair::new(0, 1))
    }

    #[test]
    fn test_factory_values() {
        let s = factory();
        assert_eq!(s.sampling_rate, 44100);
        assert_eq!(s.length_domain, LengthDomain::Samples);
        assert_eq!(s.fft_degree, 18);
        assert_eq!(s.time_length, 10.0);
        assert_eq!(s.integration, 0.125);
        assert_eq!(s.freq_lims(), FreqLims { min: 20, max: 20000 });
        assert_eq!(s.in_channel, vec![1]);
        assert_eq!(s.out_channel, vec![1]);
        assert_eq!(s.margins(), Margins { start: 0.3, stop: 0.7 });
        assert_eq!(s.comment, "No comments.");
    }

    #[test]
    fn test_assign_reports_change() {
        let mut s = factory();
        assert_eq!(s.assign(Property::SamplingRate, &Value::Int(48000)), Ok(true));
        assert_eq!(s.assign(Property::SamplingRate, &Value::Int(48000)), Ok(false));
        assert_eq!(s.sampling_rate, 48000);
    }

    #[test]
    fn test_assign_integral_value_to_float_field() {
        let mut s = factory();
        assert_eq!(s.assign(Property::TimeLength, &Value::Int(5)), Ok(true));
        assert_eq!(s.time_length, 5.0);
    }

    #[test]
    fn test_assign_wrong_shape_leaves_value() {
        let mut s = factory();
        let err = s.assign(Property::FftDegree, &Value::from("big")).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { name: "fftDegree", .. }));
        assert_eq!(s.fft_degree, 18);

        assert!(s.assign(Property::LengthDomain, &Value::from("minutes")).is_err());
        assert_eq!(s.length_domain, LengthDomain::Samples);
    }

    #[test]
    fn test_derived_writes_both_fields() {
        let mut s = factory();
        s.assign(Property::FreqLims, &Value::from((30, 18000))).unwrap();
        assert_eq!(s.min_freq, 30);
        assert_eq!(s.max_freq, 18000);

        s.assign(Property::Margins, &Value::from((0.5, 1.0))).unwrap();
        assert_eq!(s.margins(), Margins { start: 0.5, stop: 1.0 });
    }

    #[test]
    fn test_min_above_max_is_accepted() {
        let mut s = factory();
        s.assign(Property::MinFreq, &Value::Int(30000)).unwrap();
        assert_eq!(s.freq_lims(), FreqLims { min: 30000, max: 20000 });
    }

    #[test]
    fn test_device_pair_from_value() {
        assert_eq!(
            DevicePair::from_value(&Value::from((2, 3))),
            Ok(DevicePair::new(2, 3))
        );
        assert_eq!(DevicePair::from_value(&Value::Int(4)), Ok(DevicePair::new(4, 4)));
        assert_eq!(
            DevicePair::from_value(&Value::from((-1, 0))),
            Ok(DevicePair {
                input: None,
                output: Some(0)
            })
        );
        assert!(DevicePair::from_value(&Value::from(vec![1, 2, 3])).is_err());
    }

    #[test]
    fn test_display_aligns_names() {
        let text = factory().to_string();
        assert!(text.contains("device\t\t = [0, 1]\n"));
        assert!(text.contains("samplingRate\t = 44100\n"));
        assert!(text.contains("comment\t\t = No comments.\n"));
        assert_eq!(text.lines().count(), Property::STORED.len());
    }

    #[test]
    fn test_settings_json_uses_public_names() {
        let json = serde_json::to_string(&factory()).unwrap();
        assert!(json.contains("\"samplingRate\":44100"));
        assert!(json.contains("\"lengthDomain\":\"samples\""));
        assert!(json.contains("\"device\":[0,1]"));
    }
}
