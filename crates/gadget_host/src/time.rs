//! Device-time helper used by the fallback client.

/// Returns the current device time as ISO-8601 text.
pub fn device_time_now_iso() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        String::from(js_sys::Date::new_0().to_iso_string())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, false)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn device_time_is_iso8601() {
        let now = device_time_now_iso();
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok(), "{now}");
    }
}
