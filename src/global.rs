//! The process-wide properties instance.

use log::info;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::device::CpalHost;
use crate::properties::Properties;

static INSTANCE: OnceLock<Mutex<Properties>> = OnceLock::new();
#[cfg(test)]
static CONSTRUCTIONS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

/// The sole `Properties` instance, built on first call.
///
/// Concurrent first callers block until the winner has built it and then
/// all receive the same reference. The default device is read from the
/// system audio host at that moment.
pub fn instance() -> &'static Mutex<Properties> {
    INSTANCE.get_or_init(|| {
        #[cfg(test)]
        CONSTRUCTIONS.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let props = Properties::new(Arc::new(CpalHost::new()));
        info!("Default properties initialized, device {:?}", props.device());
        Mutex::new(props)
    })
}

/// Runs `f` with the global instance locked.
pub fn with_defaults<R>(f: impl FnOnce(&mut Properties) -> R) -> R {
    let mut props = instance().lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut props)
}
