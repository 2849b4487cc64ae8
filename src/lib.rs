//! Default measurement properties.
//!
//! A single process-wide set of default parameter values (sampling rate,
//! FFT degree, frequency band, audio device, channels, margins, comment)
//! read by signal generation and measurement code.
//!
//! ```no_run
//! ttaprops::with_defaults(|props| {
//!     props.set_values([("minFreq", 30), ("maxFreq", 18000)]);
//!     assert_eq!(props.freq_lims().min, 30);
//!     props.view();
//! });
//! ```

pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod global;
pub mod properties;
pub mod property;
pub mod settings;
pub mod value;

pub use device::{AudioHost, CpalHost, VirtualHost};
pub use error::{Error, Result};
pub use global::{instance, with_defaults};
pub use properties::{Outcome, Properties, Update};
pub use property::Property;
pub use settings::{DevicePair, FreqLims, LengthDomain, Margins, Settings};
pub use value::Value;
