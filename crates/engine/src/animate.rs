use std::time::{Duration, Instant};

use tracing::debug;

use crate::model::GeoPosition;

/// Duration of one marker glide.
pub const MARKER_ANIMATION_DURATION: Duration = Duration::from_millis(300);

/// Identifies one animation. Ticks carrying any other handle are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

/// Externally visible animator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    /// Nothing rendered.
    Idle,
    /// Rendered position equals the target.
    Snapped,
    Animating,
}

/// Result of feeding one frame tick to the animator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// The marker moved and the animation continues.
    Advanced(GeoPosition),
    /// The marker reached the target and the animation ended.
    Finished(GeoPosition),
    /// The handle no longer names the running animation.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct Flight {
    handle: AnimationHandle,
    from: GeoPosition,
    to: GeoPosition,
    started_at: Instant,
}

/// `1 - (1 - p)^2`, with `p` clamped to `[0, 1]`.
pub fn ease_out_quad(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p) * (1.0 - p)
}

/// Glides the video-position marker between targets.
///
/// The animator owns the rendered position. The host schedules frame ticks
/// for [`PositionAnimator::active_handle`] and forwards them to
/// [`PositionAnimator::tick`]; dropping the schedule is enough to cancel,
/// since a replaced or cancelled handle only ever yields [`Tick::Stale`].
///
/// # Example
/// ```
/// use std::time::{Duration, Instant};
///
/// use engine::{GeoPosition, PositionAnimator, Tick};
///
/// let start = Instant::now();
/// let mut animator = PositionAnimator::new();
/// animator.set_target(Some(GeoPosition { latitude: 0.0, longitude: 0.0 }), start);
/// let handle = animator
///     .set_target(Some(GeoPosition { latitude: 10.0, longitude: 10.0 }), start)
///     .expect("animation started");
///
/// let tick = animator.tick(handle, start + Duration::from_millis(300));
/// assert_eq!(tick, Tick::Finished(GeoPosition { latitude: 10.0, longitude: 10.0 }));
/// ```
#[derive(Debug)]
pub struct PositionAnimator {
    duration: Duration,
    rendered: Option<GeoPosition>,
    target: Option<GeoPosition>,
    flight: Option<Flight>,
    next_handle: u64,
}

impl Default for PositionAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionAnimator {
    pub fn new() -> Self {
        Self::with_duration(MARKER_ANIMATION_DURATION)
    }

    /// Creates an animator with a custom glide duration.
    ///
    /// `duration` must be positive.
    pub fn with_duration(duration: Duration) -> Self {
        assert!(!duration.is_zero(), "animation duration must be positive");
        Self {
            duration,
            rendered: None,
            target: None,
            flight: None,
            next_handle: 1,
        }
    }

    pub fn rendered(&self) -> Option<GeoPosition> {
        self.rendered
    }

    pub fn target(&self) -> Option<GeoPosition> {
        self.target
    }

    pub fn state(&self) -> AnimatorState {
        match (self.rendered, self.flight) {
            (None, _) => AnimatorState::Idle,
            (Some(_), Some(_)) => AnimatorState::Animating,
            (Some(_), None) => AnimatorState::Snapped,
        }
    }

    /// Handle of the running animation, if any.
    pub fn active_handle(&self) -> Option<AnimationHandle> {
        self.flight.map(|flight| flight.handle)
    }

    /// Publishes a new target and returns the handle to tick, if animating.
    ///
    /// The first target snaps. Later targets replace the running animation
    /// and glide from the current rendered position. `None` clears the
    /// marker. Panics on a non-finite target.
    pub fn set_target(
        &mut self,
        target: Option<GeoPosition>,
        now: Instant,
    ) -> Option<AnimationHandle> {
        let Some(target) = target else {
            if self.flight.take().is_some() {
                debug!("marker animation cancelled by cleared target");
            }
            self.rendered = None;
            self.target = None;
            return None;
        };
        assert!(
            target.is_finite(),
            "marker target must be finite: {target:?}"
        );

        let Some(rendered) = self.rendered else {
            self.rendered = Some(target);
            self.target = Some(target);
            return None;
        };

        match self.flight {
            Some(flight) if flight.to == target => return Some(flight.handle),
            None if rendered == target => return None,
            _ => {}
        }

        let handle = AnimationHandle(self.next_handle);
        self.next_handle += 1;
        if let Some(previous) = self.flight.replace(Flight {
            handle,
            from: rendered,
            to: target,
            started_at: now,
        }) {
            debug!(
                superseded = previous.handle.0,
                handle = handle.0,
                "marker animation superseded"
            );
        }
        self.target = Some(target);
        Some(handle)
    }

    /// Advances the animation named by `handle` to `now`.
    pub fn tick(&mut self, handle: AnimationHandle, now: Instant) -> Tick {
        let Some(flight) = self.flight.filter(|flight| flight.handle == handle) else {
            return Tick::Stale;
        };

        let elapsed = now.saturating_duration_since(flight.started_at);
        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        if progress >= 1.0 {
            self.flight = None;
            self.rendered = Some(flight.to);
            return Tick::Finished(flight.to);
        }

        let position = flight.from.lerp(flight.to, ease_out_quad(progress));
        self.rendered = Some(position);
        Tick::Advanced(position)
    }

    /// Stops any running animation where it is.
    pub fn cancel(&mut self) {
        if self.flight.take().is_some() {
            self.target = self.rendered;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use approx::assert_relative_eq;

    use super::{AnimatorState, PositionAnimator, Tick, ease_out_quad};
    use crate::model::GeoPosition;

    fn at(latitude: f64, longitude: f64) -> GeoPosition {
        GeoPosition {
            latitude,
            longitude,
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn first_target_snaps_without_animation() {
        let mut animator = PositionAnimator::new();
        assert_eq!(animator.state(), AnimatorState::Idle);

        let handle = animator.set_target(Some(at(1.0, 2.0)), Instant::now());

        assert_eq!(handle, None);
        assert_eq!(animator.rendered(), Some(at(1.0, 2.0)));
        assert_eq!(animator.state(), AnimatorState::Snapped);
    }

    #[test]
    fn glide_converges_exactly_on_target() {
        let start = Instant::now();
        let mut animator = PositionAnimator::new();
        animator.set_target(Some(at(0.0, 0.0)), start);
        let handle = animator
            .set_target(Some(at(10.0, 10.0)), start)
            .expect("animation handle");
        assert_eq!(animator.state(), AnimatorState::Animating);

        let mut previous = 0.0;
        for step in 1..10 {
            let Tick::Advanced(position) = animator.tick(handle, start + ms(step * 30)) else {
                panic!("animation must still be running at {}ms", step * 30);
            };
            assert!(position.latitude >= previous);
            assert!(position.latitude <= 10.0);
            assert_relative_eq!(position.latitude, position.longitude);
            previous = position.latitude;
        }

        let tick = animator.tick(handle, start + ms(300));
        assert_eq!(tick, Tick::Finished(at(10.0, 10.0)));
        assert_eq!(animator.rendered(), Some(at(10.0, 10.0)));
        assert_eq!(animator.state(), AnimatorState::Snapped);
        assert_eq!(animator.tick(handle, start + ms(330)), Tick::Stale);
    }

    #[test]
    fn halfway_uses_ease_out_quad() {
        let start = Instant::now();
        let mut animator = PositionAnimator::new();
        animator.set_target(Some(at(0.0, 0.0)), start);
        let handle = animator
            .set_target(Some(at(10.0, -10.0)), start)
            .expect("animation handle");

        let Tick::Advanced(position) = animator.tick(handle, start + ms(150)) else {
            panic!("animation must still be running");
        };

        assert_relative_eq!(position.latitude, 7.5, epsilon = 1e-9);
        assert_relative_eq!(position.longitude, -7.5, epsilon = 1e-9);
    }

    #[test]
    fn superseding_target_converges_once_on_second_target() {
        let start = Instant::now();
        let mut animator = PositionAnimator::new();
        animator.set_target(Some(at(0.0, 0.0)), start);
        let first = animator
            .set_target(Some(at(10.0, 10.0)), start)
            .expect("first handle");
        assert!(matches!(
            animator.tick(first, start + ms(100)),
            Tick::Advanced(_)
        ));
        let midway = animator.rendered().expect("rendered");

        let second = animator
            .set_target(Some(at(20.0, 0.0)), start + ms(100))
            .expect("second handle");
        assert_ne!(first, second);

        let mut finished = Vec::new();
        for step in 2..=12 {
            let now = start + ms(step * 40);
            for handle in [first, second] {
                if let Tick::Finished(position) = animator.tick(handle, now) {
                    finished.push((handle, position));
                }
            }
        }

        assert_eq!(finished, vec![(second, at(20.0, 0.0))]);
        assert!(midway.latitude > 0.0 && midway.latitude < 10.0);
    }

    #[test]
    fn second_animation_starts_from_interrupted_position() {
        let start = Instant::now();
        let mut animator = PositionAnimator::new();
        animator.set_target(Some(at(0.0, 0.0)), start);
        let first = animator
            .set_target(Some(at(10.0, 0.0)), start)
            .expect("first handle");
        animator.tick(first, start + ms(150));

        let second = animator
            .set_target(Some(at(0.0, 0.0)), start + ms(150))
            .expect("second handle");
        let Tick::Advanced(position) = animator.tick(second, start + ms(150)) else {
            panic!("second animation must be running");
        };

        assert_relative_eq!(position.latitude, 7.5, epsilon = 1e-9);
    }

    #[test]
    fn clearing_target_cancels_animation() {
        let start = Instant::now();
        let mut animator = PositionAnimator::new();
        animator.set_target(Some(at(0.0, 0.0)), start);
        let handle = animator
            .set_target(Some(at(1.0, 1.0)), start)
            .expect("animation handle");

        assert_eq!(animator.set_target(None, start + ms(10)), None);

        assert_eq!(animator.state(), AnimatorState::Idle);
        assert_eq!(animator.rendered(), None);
        assert_eq!(animator.tick(handle, start + ms(300)), Tick::Stale);
    }

    #[test]
    fn repeated_target_keeps_running_animation() {
        let start = Instant::now();
        let mut animator = PositionAnimator::new();
        animator.set_target(Some(at(0.0, 0.0)), start);
        let handle = animator.set_target(Some(at(5.0, 5.0)), start);

        assert_eq!(animator.set_target(Some(at(5.0, 5.0)), start + ms(200)), handle);
        assert!(animator.set_target(Some(at(0.0, 0.0)), start).is_some());
    }

    #[test]
    fn same_target_while_snapped_is_a_no_op() {
        let start = Instant::now();
        let mut animator = PositionAnimator::new();
        animator.set_target(Some(at(3.0, 4.0)), start);

        assert_eq!(animator.set_target(Some(at(3.0, 4.0)), start + ms(50)), None);
        assert_eq!(animator.state(), AnimatorState::Snapped);
    }

    #[test]
    fn cancel_freezes_marker_in_place() {
        let start = Instant::now();
        let mut animator = PositionAnimator::new();
        animator.set_target(Some(at(0.0, 0.0)), start);
        let handle = animator
            .set_target(Some(at(10.0, 0.0)), start)
            .expect("animation handle");
        animator.tick(handle, start + ms(150));

        animator.cancel();

        assert_eq!(animator.state(), AnimatorState::Snapped);
        assert_eq!(animator.target(), animator.rendered());
        assert_eq!(animator.tick(handle, start + ms(300)), Tick::Stale);
    }

    #[test]
    #[should_panic(expected = "marker target must be finite")]
    fn non_finite_target_panics() {
        let mut animator = PositionAnimator::new();
        animator.set_target(Some(at(f64::NAN, 0.0)), Instant::now());
    }

    #[test]
    fn easing_is_bounded_and_monotonic() {
        let mut previous = ease_out_quad(0.0);
        assert_eq!(previous, 0.0);
        for step in 1..=100 {
            let eased = ease_out_quad(f64::from(step) / 100.0);
            assert!(eased >= previous);
            assert!((0.0..=1.0).contains(&eased));
            previous = eased;
        }
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert_eq!(ease_out_quad(2.0), 1.0);
    }
}
