use crate::model::FrameSample;

/// Maps a playback time onto an index into `len` evenly spread frames.
///
/// Returns `clamp(floor(current_time / duration * len), 0, len - 1)`, or
/// `None` when there are no frames, the duration is not positive, or either
/// input is not finite. `current_time == duration` resolves to the last frame.
///
/// # Example
/// ```
/// use engine::frame_index_at;
///
/// assert_eq!(frame_index_at(50.0, 100.0, 4), Some(2));
/// assert_eq!(frame_index_at(100.0, 100.0, 4), Some(3));
/// assert_eq!(frame_index_at(10.0, 0.0, 4), None);
/// ```
pub fn frame_index_at(current_time: f64, duration: f64, len: usize) -> Option<usize> {
    if len == 0 || !current_time.is_finite() || !duration.is_finite() || duration <= 0.0 {
        return None;
    }

    let raw = ((current_time / duration) * len as f64).floor();
    if raw <= 0.0 {
        return Some(0);
    }

    // `as` saturates, so times far past the end still land on the last frame.
    Some((raw as usize).min(len - 1))
}

/// Looks up the frame shown at `current_time`, see [`frame_index_at`].
pub fn frame_at(current_time: f64, duration: f64, frames: &[FrameSample]) -> Option<&FrameSample> {
    frame_index_at(current_time, duration, frames.len()).and_then(|index| frames.get(index))
}
