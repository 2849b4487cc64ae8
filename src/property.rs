//! Names of the measurement properties.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Every property with a read accessor.
///
/// `FreqLims` and `Margins` are derived views over two stored fields each;
/// all other variants are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    SamplingRate,
    LengthDomain,
    FftDegree,
    TimeLength,
    Integration,
    MinFreq,
    MaxFreq,
    FreqLims,
    Device,
    InChannel,
    OutChannel,
    StartMargin,
    StopMargin,
    Margins,
    Comment,
}

impl Property {
    /// Stored properties in display order.
    pub const STORED: [Property; 13] = [
        Property::SamplingRate,
        Property::LengthDomain,
        Property::FftDegree,
        Property::TimeLength,
        Property::Integration,
        Property::MinFreq,
        Property::MaxFreq,
        Property::Device,
        Property::InChannel,
        Property::OutChannel,
        Property::StopMargin,
        Property::StartMargin,
        Property::Comment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Property::SamplingRate => "samplingRate",
            Property::LengthDomain => "lengthDomain",
            Property::FftDegree => "fftDegree",
            Property::TimeLength => "timeLength",
            Property::Integration => "integration",
            Property::MinFreq => "minFreq",
            Property::MaxFreq => "maxFreq",
            Property::FreqLims => "freqLims",
            Property::Device => "device",
            Property::InChannel => "inChannel",
            Property::OutChannel => "outChannel",
            Property::StartMargin => "startMargin",
            Property::StopMargin => "stopMargin",
            Property::Margins => "margins",
            Property::Comment => "comment",
        }
    }

    pub fn is_derived(self) -> bool {
        matches!(self, Property::FreqLims | Property::Margins)
    }

    /// The stored properties a write to `self` changes.
    pub fn stored(self) -> &'static [Property] {
        match self {
            Property::FreqLims => &[Property::MinFreq, Property::MaxFreq],
            Property::Margins => &[Property::StartMargin, Property::StopMargin],
            Property::SamplingRate => &[Property::SamplingRate],
            Property::LengthDomain => &[Property::LengthDomain],
            Property::FftDegree => &[Property::FftDegree],
            Property::TimeLength => &[Property::TimeLength],
            Property::Integration => &[Property::Integration],
            Property::MinFreq => &[Property::MinFreq],
            Property::MaxFreq => &[Property::MaxFreq],
            Property::Device => &[Property::Device],
            Property::InChannel => &[Property::InChannel],
            Property::OutChannel => &[Property::OutChannel],
            Property::StartMargin => &[Property::StartMargin],
            Property::StopMargin => &[Property::StopMargin],
            Property::Comment => &[Property::Comment],
        }
    }

    /// Comma-separated list of every recognized name, for diagnostics.
    pub fn known_names() -> String {
        Property::STORED
            .iter()
            .chain(&[Property::FreqLims, Property::Margins])
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = Error;

    /// Accepts the camelCase public names, their snake_case spelling and the
    /// `devices` alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let property = match s {
            "samplingRate" | "sampling_rate" => Property::SamplingRate,
            "lengthDomain" | "length_domain" => Property::LengthDomain,
            "fftDegree" | "fft_degree" => Property::FftDegree,
            "timeLength" | "time_length" => Property::TimeLength,
            "integration" => Property::Integration,
            "minFreq" | "min_freq" => Property::MinFreq,
            "maxFreq" | "max_freq" => Property::MaxFreq,
            "freqLims" | "freq_lims" => Property::FreqLims,
            "device" | "devices" => Property::Device,
            "inChannel" | "in_channel" => Property::InChannel,
            "outChannel" | "out_channel" => Property::OutChannel,
            "startMargin" | "start_margin" => Property::StartMargin,
            "stopMargin" | "stop_margin" => Property::StopMargin,
            "margins" => Property::Margins,
            "comment" => Property::Comment,
            _ => return Err(Error::UnrecognizedProperty(s.to_string())),
        };
        Ok(property)
    }
}
