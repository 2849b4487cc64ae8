//! Audio host access for the `device` property.
//!
//! The host is the authority on which device indices are valid: a
//! `Properties` instance pushes requested indices to it and stores whatever
//! the host reports back.

use cpal::traits::{DeviceTrait, HostTrait};
use log::{debug, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::settings::DevicePair;

/// Process-wide default input/output device selection.
pub trait AudioHost: Send + Sync {
    /// The current default devices.
    fn default_device(&self) -> DevicePair;

    /// Requests new default devices. The host may reject either side.
    fn set_default_device(&self, device: DevicePair);
}

/// Keeps each side of `requested` only if it indexes one of `available`
/// devices; rejected sides keep their `current` value.
fn validate(requested: DevicePair, current: DevicePair, available: (usize, usize)) -> DevicePair {
    let pick = |side: &str, req: Option<usize>, cur: Option<usize>, count: usize| match req {
        Some(index) if index >= count => {
            warn!(
                "Rejected {} device index {}: host has {} {} device(s)",
                side, index, count, side
            );
            cur
        }
        other => other,
    };
    DevicePair {
        input: pick("input", requested.input, current.input, available.0),
        output: pick("output", requested.output, current.output, available.1),
    }
}

fn lock(selection: &Mutex<DevicePair>) -> std::sync::MutexGuard<'_, DevicePair> {
    selection.lock().unwrap_or_else(|e| e.into_inner())
}

/// The system audio host, through cpal.
///
/// Indices refer to positions in `input_devices()` and `output_devices()`
/// of `cpal::default_host()`, as printed by `ttaprops list`.
pub struct CpalHost {
    selection: Mutex<DevicePair>,
}

impl CpalHost {
    /// Reads the system default devices. Enumeration failures are logged and
    /// leave that side unset.
    pub fn new() -> Self {
        let host = cpal::default_host();
        let input = host
            .default_input_device()
            .and_then(|d| d.name().ok())
            .and_then(|name| {
                let names = input_names(&host);
                names.iter().position(|n| *n == name)
            });
        let output = host
            .default_output_device()
            .and_then(|d| d.name().ok())
            .and_then(|name| {
                let names = output_names(&host);
                names.iter().position(|n| *n == name)
            });
        let device = DevicePair { input, output };
        debug!("Audio host {} default device {:?}", host.id().name(), device);
        Self {
            selection: Mutex::new(device),
        }
    }
}

impl Default for CpalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioHost for CpalHost {
    fn default_device(&self) -> DevicePair {
        *lock(&self.selection)
    }

    fn set_default_device(&self, device: DevicePair) {
        let host = cpal::default_host();
        let available = (input_names(&host).len(), output_names(&host).len());
        let mut selection = lock(&self.selection);
        *selection = validate(device, *selection, available);
    }
}

fn input_names(host: &cpal::Host) -> Vec<String> {
    match host.input_devices() {
        Ok(devices) => devices
            .map(|d| d.name().unwrap_or("Unknown".to_string()))
            .collect(),
        Err(e) => {
            warn!("Failed to enumerate input devices: {}", e);
            Vec::new()
        }
    }
}

fn output_names(host: &cpal::Host) -> Vec<String> {
    match host.output_devices() {
        Ok(devices) => devices
            .map(|d| d.name().unwrap_or("Unknown".to_string()))
            .collect(),
        Err(e) => {
            warn!("Failed to enumerate output devices: {}", e);
            Vec::new()
        }
    }
}

/// An in-memory host with a fixed number of devices per side.
///
/// Useful headless, and as a stand-in for the system host in tests.
pub struct VirtualHost {
    selection: Mutex<DevicePair>,
    available: (usize, usize),
    set_calls: AtomicUsize,
}

impl VirtualHost {
    pub fn new(device: DevicePair, inputs: usize, outputs: usize) -> Self {
        Self {
            selection: Mutex::new(device),
            available: (inputs, outputs),
            set_calls: AtomicUsize::new(0),
        }
    }

    /// Number of `set_default_device` requests received so far.
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::Relaxed)
    }
}

impl AudioHost for VirtualHost {
    fn default_device(&self) -> DevicePair {
        *lock(&self.selection)
    }

    fn set_default_device(&self, device: DevicePair) {
        self.set_calls.fetch_add(1, Ordering::Relaxed);
        let mut selection = lock(&self.selection);
        *selection = validate(device, *selection, self.available);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request_is_accepted() {
        let host = VirtualHost::new(DevicePair::new(0, 0), 4, 4);
        host.set_default_device(DevicePair::new(2, 3));
        assert_eq!(host.default_device(), DevicePair::new(2, 3));
        assert_eq!(host.set_calls(), 1);
    }

    #[test]
    fn test_out_of_range_side_keeps_previous() {
        let host = VirtualHost::new(DevicePair::new(0, 1), 4, 2);
        host.set_default_device(DevicePair::new(2, 3));
        assert_eq!(host.default_device(), DevicePair::new(2, 1));
    }

    #[test]
    fn test_unset_side_is_accepted() {
        let host = VirtualHost::new(DevicePair::new(0, 1), 1, 2);
        host.set_default_device(DevicePair {
            input: None,
            output: Some(0),
        });
        assert_eq!(
            host.default_device(),
            DevicePair {
                input: None,
                output: Some(0)
            }
        );
    }
}
