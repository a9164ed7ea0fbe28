use std::time::Instant;

use engine::VideoHost;

/// Playback clock of the video panel.
///
/// Footage is represented by its geocoded frame samples, so the duration is
/// the sample count times the footage between two samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackClock {
    duration: f64,
    position: f64,
    anchor: Option<Instant>,
}

impl PlaybackClock {
    pub fn new(frame_count: usize, seconds_per_frame: f64) -> Self {
        Self {
            duration: frame_count as f64 * seconds_per_frame,
            position: 0.0,
            anchor: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn play(&mut self, now: Instant) {
        if self.duration <= 0.0 {
            return;
        }
        if self.position >= self.duration {
            self.position = 0.0;
        }
        self.anchor = Some(now);
    }

    pub fn pause(&mut self, now: Instant) {
        self.advance(now);
        self.anchor = None;
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_playing() {
            self.pause(now);
        } else {
            self.play(now);
        }
    }

    /// Jumps to `seconds`, clamped to the footage.
    pub fn seek(&mut self, seconds: f64, now: Instant) {
        let target = if seconds.is_finite() { seconds } else { 0.0 };
        self.position = target.clamp(0.0, self.duration.max(0.0));
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
    }

    /// Moves the clock to `now`, pausing at the end of the footage.
    pub fn advance(&mut self, now: Instant) {
        let Some(anchor) = self.anchor else {
            return;
        };
        self.position += now.saturating_duration_since(anchor).as_secs_f64();
        self.anchor = Some(now);
        if self.position >= self.duration {
            self.position = self.duration;
            self.anchor = None;
        }
    }
}

impl VideoHost for PlaybackClock {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}

/// Formats seconds as `m:ss`.
pub fn clock_label(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.max(0.0).floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
