//! The configuration instance holding the default measurement properties.

use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

use crate::device::AudioHost;
use crate::error::{Error, Result};
use crate::property::Property;
use crate::settings::{DevicePair, FreqLims, LengthDomain, Margins, Settings};
use crate::value::Value;

/// What a bulk update did with one `name=value` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The value was stored (for `device`: whatever the host reported back).
    Applied,
    /// The value equals the stored one; nothing happened.
    Unchanged,
    /// No property has this name.
    Unrecognized,
    /// The value has the wrong shape for the property; nothing was stored.
    Invalid(Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub name: String,
    pub outcome: Outcome,
}

/// Holds parameter values for measurement objects and functions.
///
/// Created from a default table (`Settings::factory`) and an audio host.
/// `reset` goes back to that table. Device changes always go through the
/// host, which decides what is actually stored.
pub struct Properties {
    current: Settings,
    factory: Settings,
    host: Arc<dyn AudioHost>,
}

impl Properties {
    /// Builds the default table from the host's current default devices.
    pub fn new(host: Arc<dyn AudioHost>) -> Self {
        let factory = Settings::factory(host.default_device());
        Self::with_factory(factory, host)
    }

    /// Uses `factory` as the default table instead of the built-in one.
    pub fn with_factory(factory: Settings, host: Arc<dyn AudioHost>) -> Self {
        Self {
            current: factory.clone(),
            factory,
            host,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.current
    }

    pub fn factory(&self) -> &Settings {
        &self.factory
    }

    pub fn sampling_rate(&self) -> u32 {
        self.current.sampling_rate
    }

    pub fn length_domain(&self) -> LengthDomain {
        self.current.length_domain
    }

    pub fn fft_degree(&self) -> u32 {
        self.current.fft_degree
    }

    pub fn time_length(&self) -> f64 {
        self.current.time_length
    }

    pub fn integration(&self) -> f64 {
        self.current.integration
    }

    pub fn min_freq(&self) -> u32 {
        self.current.min_freq
    }

    pub fn max_freq(&self) -> u32 {
        self.current.max_freq
    }

    pub fn freq_lims(&self) -> FreqLims {
        self.current.freq_lims()
    }

    pub fn device(&self) -> DevicePair {
        self.current.device
    }

    pub fn in_channel(&self) -> &[u32] {
        &self.current.in_channel
    }

    pub fn out_channel(&self) -> &[u32] {
        &self.current.out_channel
    }

    pub fn start_margin(&self) -> f64 {
        self.current.start_margin
    }

    pub fn stop_margin(&self) -> f64 {
        self.current.stop_margin
    }

    pub fn margins(&self) -> Margins {
        self.current.margins()
    }

    pub fn comment(&self) -> &str {
        &self.current.comment
    }

    /// Reads a property by name.
    pub fn get(&self, name: &str) -> Result<Value> {
        let property: Property = name.parse()?;
        Ok(self.current.get(property))
    }

    pub fn set_sampling_rate(&mut self, rate: u32) {
        self.current.sampling_rate = rate;
    }

    pub fn set_length_domain(&mut self, domain: LengthDomain) {
        self.current.length_domain = domain;
    }

    pub fn set_fft_degree(&mut self, degree: u32) {
        self.current.fft_degree = degree;
    }

    pub fn set_time_length(&mut self, seconds: f64) {
        self.current.time_length = seconds;
    }

    pub fn set_integration(&mut self, seconds: f64) {
        self.current.integration = seconds;
    }

    pub fn set_min_freq(&mut self, hz: u32) {
        self.current.min_freq = hz;
    }

    pub fn set_max_freq(&mut self, hz: u32) {
        self.current.max_freq = hz;
    }

    pub fn set_in_channel(&mut self, channels: Vec<u32>) {
        self.current.in_channel = channels;
    }

    pub fn set_out_channel(&mut self, channels: Vec<u32>) {
        self.current.out_channel = channels;
    }

    pub fn set_start_margin(&mut self, seconds: f64) {
        self.current.start_margin = seconds;
    }

    pub fn set_stop_margin(&mut self, seconds: f64) {
        self.current.stop_margin = seconds;
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.current.comment = comment.into();
    }

    /// Requests new default devices from the host and returns what it stored.
    pub fn set_device(&mut self, device: DevicePair) -> DevicePair {
        self.set_values([(Property::Device.name(), device)]);
        self.current.device
    }

    /// Writes a single property by name.
    ///
    /// Fails with `Error::UnrecognizedProperty` if no property has that name
    /// and with `Error::InvalidValue` if the value has the wrong shape.
    /// `device` (or `devices`) is routed through `set_values`.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let property: Property = name.parse()?;
        let value = value.into();
        if property == Property::Device {
            let updates = self.set_values([(name, value)]);
            return match updates.into_iter().next().map(|u| u.outcome) {
                Some(Outcome::Invalid(e)) => Err(e),
                _ => Ok(()),
            };
        }
        self.current.assign(property, &value)?;
        Ok(())
    }

    /// Changes several properties at once.
    ///
    /// Each pair is handled on its own: a misspelled name or a bad value is
    /// logged and reported in the returned list, and the remaining pairs are
    /// still applied. Values equal to the stored ones are skipped.
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use ttaprops::{CpalHost, Properties, Value};
    /// let mut props = Properties::new(Arc::new(CpalHost::new()));
    /// props.set_values([
    ///     ("samplingRate", Value::from(48000)),
    ///     ("inChannel", Value::from(vec![1, 2])),
    /// ]);
    /// ```
    pub fn set_values<I, K, V>(&mut self, pairs: I) -> Vec<Update>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .map(|(name, value)| {
                let name = name.as_ref();
                let outcome = self.update_one(name, value.into());
                Update {
                    name: name.to_string(),
                    outcome,
                }
            })
            .collect()
    }

    fn update_one(&mut self, name: &str, value: Value) -> Outcome {
        let Ok(property) = name.parse::<Property>() else {
            warn!("{}", misspelled(name, &self.current));
            return Outcome::Unrecognized;
        };

        if property == Property::Device {
            return self.sync_device(&value);
        }

        match self.current.assign(property, &value) {
            Ok(true) => {
                debug!("{} = {}", property, value);
                Outcome::Applied
            }
            Ok(false) => Outcome::Unchanged,
            Err(e) => {
                warn!("{}", e);
                Outcome::Invalid(e)
            }
        }
    }

    /// Pushes the requested devices to the host, then stores what the host
    /// reports as its defaults.
    fn sync_device(&mut self, value: &Value) -> Outcome {
        let requested = match DevicePair::from_value(value) {
            Ok(device) => device,
            Err(e) => {
                warn!("{}", e);
                return Outcome::Invalid(e);
            }
        };
        if requested == self.current.device {
            return Outcome::Unchanged;
        }

        self.host.set_default_device(requested);
        let reported = self.host.default_device();
        if reported != requested {
            warn!(
                "Audio host set device {:?} instead of requested {:?}",
                reported, requested
            );
        }
        debug!("device = {:?}", reported);
        self.current.device = reported;
        Outcome::Applied
    }

    /// What went wrong with a pair `set_values` did not apply, or `None`.
    ///
    /// For an unrecognized name this lists the valid names and the current
    /// values.
    pub fn diagnostic(&self, update: &Update) -> Option<String> {
        match &update.outcome {
            Outcome::Unrecognized => Some(misspelled(&update.name, &self.current)),
            Outcome::Invalid(e) => Some(e.to_string()),
            Outcome::Applied | Outcome::Unchanged => None,
        }
    }

    /// Prints every stored property, one per line.
    pub fn view(&self) {
        print!("{}", self);
    }

    /// Back to the default table. Every value set since is discarded.
    pub fn reset(&mut self) {
        self.current = self.factory.clone();
        debug!("Properties reset to factory defaults");
    }
}

fn misspelled(name: &str, current: &Settings) -> String {
    format!(
        "There is no property {:?}. You've probably misspelled something.\nProperty names: {}\nCurrent properties:\n{}",
        name,
        Property::known_names(),
        current
    )
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.current, f)
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Properties")
            .field("current", &self.current)
            .field("factory", &self.factory)
            .finish_non_exhaustive()
    }
}
