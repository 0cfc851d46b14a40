//! Clock and presence timestamp helpers.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Playback position source, typically an HTML media element.
pub trait MediaHandle {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;
    /// Total media length in seconds.
    fn duration(&self) -> f64;
}

/// Computes `(start, end)` unix seconds for a bar at `elapsed` of `duration` seconds.
///
/// `start` is `floor(now_ms / 1000)`. `end` is `start - elapsed + duration` rounded to the
/// nearest whole second, or `None` when either input is not finite (a media element reports a
/// NaN duration before metadata loads and an infinite one for live streams).
pub fn timestamps_at(now_ms: u64, elapsed: f64, duration: f64) -> (i64, Option<i64>) {
    let now = (now_ms / 1000) as i64;
    let end = (now as f64 - elapsed + duration).round();
    (now, end.is_finite().then_some(end as i64))
}

/// [`timestamps_at`] against the current clock.
///
/// The result goes stale as playback advances; recompute on every presence update.
pub fn timestamps(elapsed: f64, duration: f64) -> (i64, Option<i64>) {
    timestamps_at(unix_time_ms_now(), elapsed, duration)
}

/// [`timestamps`] from a media handle's position and length.
pub fn timestamps_from_media(media: &dyn MediaHandle) -> (i64, Option<i64>) {
    timestamps(media.current_time(), media.duration())
}

/// Parses `HH:MM:SS`, `MM:SS`, or `SS` into seconds by base-60 accumulation.
///
/// Segments are not range checked (`"1:75"` is 135). Returns `None` when any segment, empty
/// ones included, is not a number.
pub fn timestamp_from_format(text: &str) -> Option<f64> {
    text.split(':').try_fold(0.0, |total, segment| {
        let value = segment.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(60.0 * total + value)
    })
}
