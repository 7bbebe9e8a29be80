//! Playback clock.
//!
//! The clock advances a fractional frame counter from wall-clock deltas on
//! every display refresh. Two channels come out of each tick:
//! - the precise frame, used right away to update preview transforms
//! - a throttled whole frame, published to the store at `publish_hz`
//!
//! Reaching the last frame stops playback and publishes the final frame.

use reelkit_common::clock::{ns_to_secs, RateController, TimeSource};
use reelkit_common::config::PlaybackConfig;
use reelkit_timeline::{Frame, TimelineStore};

use crate::compositor::Compositor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Result of one clock tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Precise fractional frame.
    pub frame: f64,
    /// Whole frame to publish, when the throttle allows it.
    pub published: Option<Frame>,
    /// Playback reached the end on this tick.
    pub stopped: bool,
}

/// Frame counter driven by wall-clock time.
#[derive(Debug)]
pub struct PlaybackClock {
    state: PlaybackState,
    frame: f64,
    fps: u32,
    max_frame: Frame,
    last_tick_ns: Option<u64>,
    publisher: RateController,
}

impl PlaybackClock {
    pub fn new(fps: u32, max_frame: Frame, publish_hz: u32) -> Self {
        Self {
            state: PlaybackState::Stopped,
            frame: 0.0,
            fps: fps.max(1),
            max_frame,
            last_tick_ns: None,
            publisher: RateController::new(publish_hz),
        }
    }

    pub fn from_config(config: &PlaybackConfig, fps: u32, max_frame: Frame) -> Self {
        Self::new(fps, max_frame, config.publish_hz)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Precise position.
    pub fn frame(&self) -> f64 {
        self.frame
    }

    /// Whole-frame position.
    pub fn current_frame(&self) -> Frame {
        self.frame.floor() as Frame
    }

    pub fn max_frame(&self) -> Frame {
        self.max_frame
    }

    /// Update rate and length after the document changed.
    pub fn set_bounds(&mut self, fps: u32, max_frame: Frame) {
        self.fps = fps.max(1);
        self.max_frame = max_frame;
        if self.frame > max_frame as f64 {
            self.frame = max_frame as f64;
        }
    }

    /// Start advancing from the current position with a fresh time base.
    pub fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        self.state = PlaybackState::Playing;
        self.last_tick_ns = None;
        self.publisher.reset();
        tracing::info!(frame = self.current_frame(), "Playback started");
    }

    /// Stop advancing. No further ticks produce output until [`play`](Self::play).
    pub fn pause(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.state = PlaybackState::Stopped;
        self.last_tick_ns = None;
        tracing::info!(frame = self.current_frame(), "Playback paused");
    }

    /// Jump to `frame`, clamped to the end.
    pub fn seek(&mut self, frame: Frame) {
        self.frame = frame.min(self.max_frame) as f64;
        self.publisher.reset();
    }

    /// Advance to `now_ns`. Returns `None` while stopped.
    ///
    /// The first tick after [`play`](Self::play) only establishes the time
    /// base and does not move the counter.
    pub fn tick(&mut self, now_ns: u64) -> Option<Tick> {
        if !self.is_playing() {
            return None;
        }

        let delta_ns = self
            .last_tick_ns
            .map_or(0, |last| now_ns.saturating_sub(last));
        self.last_tick_ns = Some(now_ns);
        self.frame += ns_to_secs(delta_ns) * self.fps as f64;

        let max = self.max_frame as f64;
        if self.frame >= max {
            self.frame = max;
            self.state = PlaybackState::Stopped;
            self.last_tick_ns = None;
            tracing::info!(frame = self.max_frame, "Playback reached end");
            return Some(Tick {
                frame: max,
                published: Some(self.max_frame),
                stopped: true,
            });
        }

        let published = self
            .publisher
            .should_tick(now_ns)
            .then(|| self.current_frame());
        Some(Tick {
            frame: self.frame,
            published,
            stopped: false,
        })
    }
}

/// Connects a [`PlaybackClock`] to the store and compositor.
///
/// Call [`frame_tick`](Self::frame_tick) once per display refresh. The store's
/// playing flag is authoritative, so UI code can start and stop playback by
/// writing to the store alone.
#[derive(Debug)]
pub struct PlaybackDriver<T: TimeSource> {
    clock: PlaybackClock,
    time: T,
}

impl<T: TimeSource> PlaybackDriver<T> {
    pub fn new(time: T, config: &PlaybackConfig, store: &TimelineStore) -> Self {
        let mut clock = PlaybackClock::from_config(
            config,
            store.document().frame_rate,
            store.max_frame(),
        );
        clock.seek(store.current_frame());
        Self { clock, time }
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn play(&mut self, store: &mut TimelineStore) {
        self.clock
            .set_bounds(store.document().frame_rate, store.max_frame());
        if !self.clock.is_playing() {
            self.clock.seek(store.current_frame());
        }
        self.clock.play();
        store.set_playing(true);
    }

    pub fn pause(&mut self, store: &mut TimelineStore) {
        self.clock.pause();
        store.set_current_frame(self.clock.current_frame());
        store.set_playing(false);
    }

    pub fn toggle(&mut self, store: &mut TimelineStore) {
        if self.clock.is_playing() {
            self.pause(store);
        } else {
            self.play(store);
        }
    }

    /// Move the playhead in both the store and the clock.
    pub fn seek(&mut self, store: &mut TimelineStore, frame: Frame) {
        store.set_current_frame(frame);
        self.clock.seek(store.current_frame());
    }

    /// Run one display refresh.
    pub fn frame_tick(
        &mut self,
        store: &mut TimelineStore,
        compositor: &mut Compositor,
    ) -> Option<Tick> {
        match (store.is_playing(), self.clock.is_playing()) {
            (false, true) => {
                self.clock.pause();
                return None;
            }
            (true, false) => self.play(store),
            _ => {}
        }

        let tick = self.clock.tick(self.time.now_ns())?;
        compositor.sync_transforms(store.document(), tick.frame);
        if let Some(frame) = tick.published {
            store.set_current_frame(frame);
        }
        if tick.stopped {
            store.set_playing(false);
        }
        Some(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelkit_common::clock::ManualTime;
    use reelkit_common::config::EditorConfig;
    use reelkit_timeline::NewEvent;
    use std::time::Duration;

    const REFRESH: Duration = Duration::from_micros(16_667);

    #[test]
    fn test_first_tick_sets_time_base() {
        let mut clock = PlaybackClock::new(30, 300, 10);
        assert!(clock.tick(0).is_none());
        clock.play();
        let tick = clock.tick(5_000_000_000).unwrap();
        assert_eq!(tick.frame, 0.0);
        assert_eq!(tick.published, Some(0));
    }

    #[test]
    fn test_publication_is_throttled() {
        let mut clock = PlaybackClock::new(30, 300, 10);
        clock.play();
        let mut published = 0;
        let mut now = 0;
        for _ in 0..60 {
            if clock.tick(now).unwrap().published.is_some() {
                published += 1;
            }
            now += 16_666_667;
        }
        // One second of 60 Hz refreshes publishes at ~10 Hz.
        assert!((9..=11).contains(&published), "published {published}");
        assert!((clock.frame() - 29.5).abs() < 0.1);
    }

    #[test]
    fn test_auto_stop_clamps_to_end() {
        let mut clock = PlaybackClock::new(30, 60, 10);
        clock.play();
        clock.tick(0);
        let tick = clock.tick(3_000_000_000).unwrap();
        assert!(tick.stopped);
        assert_eq!(tick.frame, 60.0);
        assert_eq!(tick.published, Some(60));
        assert_eq!(clock.state(), PlaybackState::Stopped);
        assert!(clock.tick(4_000_000_000).is_none());
    }

    #[test]
    fn test_pause_resumes_with_fresh_time_base() {
        let mut clock = PlaybackClock::new(30, 300, 10);
        clock.play();
        clock.tick(0);
        clock.tick(1_000_000_000);
        clock.pause();
        clock.play();
        // Ten seconds pass while paused; none of it counts.
        clock.tick(11_000_000_000);
        let tick = clock.tick(12_000_000_000).unwrap();
        assert!((tick.frame - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_seek_clamps() {
        let mut clock = PlaybackClock::new(30, 300, 10);
        clock.seek(1_000);
        assert_eq!(clock.current_frame(), 300);
        clock.seek(42);
        assert_eq!(clock.frame(), 42.0);
    }

    #[test]
    fn test_driver_plays_document_to_end() {
        let config = EditorConfig::default();
        let mut store = TimelineStore::new(&config);
        store.add_event(NewEvent::video("a.mp4", 0, 300)).unwrap();
        let mut compositor = Compositor::new(&config.layout);
        let time = ManualTime::new();
        let mut driver = PlaybackDriver::new(time.clone(), &config.playback, &store);

        driver.play(&mut store);
        let mut elapsed = Duration::ZERO;
        while elapsed < Duration::from_secs(11) {
            driver.frame_tick(&mut store, &mut compositor);
            time.advance(REFRESH);
            elapsed += REFRESH;
        }

        assert!(!store.is_playing());
        assert_eq!(store.current_frame(), 300);
        assert_eq!(driver.clock().state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_driver_follows_store_flag() {
        let config = EditorConfig::default();
        let mut store = TimelineStore::new(&config);
        store.add_event(NewEvent::image("a.png", 0, 300)).unwrap();
        let mut compositor = Compositor::new(&config.layout);
        let time = ManualTime::new();
        let mut driver = PlaybackDriver::new(time.clone(), &config.playback, &store);

        store.set_playing(true);
        driver.frame_tick(&mut store, &mut compositor);
        assert!(driver.clock().is_playing());

        time.advance(Duration::from_millis(500));
        let tick = driver.frame_tick(&mut store, &mut compositor).unwrap();
        assert!((tick.frame - 15.0).abs() < 1e-6);
        assert!(compositor.transforms().get(&store.document().events[0].id).unwrap().visible);

        store.set_playing(false);
        assert!(driver.frame_tick(&mut store, &mut compositor).is_none());
        assert!(!driver.clock().is_playing());
    }
}
