//! Best-effort string persistence
//!
//! One named slot in, one string out. Web builds keep slots in localStorage
//! under a crate prefix; native builds keep them as plain files in the
//! working directory. Failures are logged and swallowed: losing a saved
//! score beats crashing over one.

/// Prefix for localStorage keys, so the game shares an origin politely
#[cfg(target_arch = "wasm32")]
const KEY_PREFIX: &str = "lawless_lanes/";

/// Read a slot. Missing or unreadable slots come back as `None`.
#[cfg(target_arch = "wasm32")]
pub fn read(slot: &str) -> Option<String> {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()?;
    match storage.get_item(&format!("{KEY_PREFIX}{slot}")) {
        Ok(value) => value,
        Err(_) => {
            log::warn!("localStorage read failed for {slot}");
            None
        }
    }
}

/// Write a slot, best effort.
#[cfg(target_arch = "wasm32")]
pub fn write(slot: &str, contents: &str) {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();
    if let Some(storage) = storage {
        if storage
            .set_item(&format!("{KEY_PREFIX}{slot}"), contents)
            .is_err()
        {
            log::warn!("localStorage write failed for {slot}");
        }
    }
}

/// Read a slot. Missing or unreadable slots come back as `None`.
#[cfg(not(target_arch = "wasm32"))]
pub fn read(slot: &str) -> Option<String> {
    std::fs::read_to_string(slot).ok()
}

/// Write a slot, best effort.
#[cfg(not(target_arch = "wasm32"))]
pub fn write(slot: &str, contents: &str) {
    if let Err(err) = std::fs::write(slot, contents) {
        log::warn!("Failed to write {slot}: {err}");
    }
}
