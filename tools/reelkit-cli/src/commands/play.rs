//! Headless playback.
//!
//! By default the clock is driven from a manual time source stepped at the
//! refresh rate, so a long timeline "plays" instantly. With `--realtime` the
//! clock follows the monotonic clock and refreshes on a tokio interval.

use std::path::PathBuf;
use std::time::Duration;

use reelkit_common::clock::{ManualTime, MonotonicTime, TimeSource};
use reelkit_common::config::EditorConfig;
use reelkit_engine::{Compositor, PlaybackDriver};
use reelkit_timeline::TimelineStore;

pub async fn run(
    file: PathBuf,
    seconds: f64,
    from: u64,
    refresh_hz: u32,
    realtime: bool,
    config: &EditorConfig,
) -> anyhow::Result<()> {
    let total = playback_span(seconds)?;
    if refresh_hz == 0 {
        anyhow::bail!("--refresh-hz must be at least 1");
    }

    let document =
        super::load_document(&file).map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;
    let mut store = TimelineStore::with_document(document, config);
    let mut compositor = Compositor::new(&config.layout);

    let refresh = Duration::from_secs_f64(1.0 / refresh_hz as f64);
    println!(
        "Playing {} from frame {} ({} frames total)",
        file.display(),
        from.min(store.max_frame()),
        store.max_frame()
    );

    if realtime {
        let time = MonotonicTime::start();
        let mut driver = PlaybackDriver::new(time, &config.playback, &store);
        start(&mut driver, &mut store, from);
        let mut interval = tokio::time::interval(refresh);
        let total_ns = u64::try_from(total.as_nanos()).unwrap_or(u64::MAX);
        while driver.time().now_ns() <= total_ns {
            interval.tick().await;
            let elapsed = driver.time().now_ns();
            if refresh_once(&mut driver, &mut store, &mut compositor, elapsed) {
                break;
            }
        }
        finish(&mut driver, &mut store);
    } else {
        let time = ManualTime::new();
        let mut driver = PlaybackDriver::new(time.clone(), &config.playback, &store);
        start(&mut driver, &mut store, from);
        let mut elapsed = Duration::ZERO;
        while elapsed <= total {
            if refresh_once(&mut driver, &mut store, &mut compositor, time.now_ns()) {
                break;
            }
            time.advance(refresh);
            elapsed += refresh;
        }
        finish(&mut driver, &mut store);
    }

    Ok(())
}

/// Wall-clock span to play for, from the `--seconds` argument.
fn playback_span(seconds: f64) -> anyhow::Result<Duration> {
    if !(seconds.is_finite() && seconds >= 0.0) {
        anyhow::bail!("--seconds must be a non-negative number, got {seconds}");
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| anyhow::anyhow!("--seconds {seconds} is out of range: {e}"))
}

fn start<T: TimeSource>(driver: &mut PlaybackDriver<T>, store: &mut TimelineStore, from: u64) {
    driver.seek(store, from);
    driver.play(store);
}

/// Run one refresh and report published frames. Returns true once playback
/// has reached the end.
fn refresh_once<T: TimeSource>(
    driver: &mut PlaybackDriver<T>,
    store: &mut TimelineStore,
    compositor: &mut Compositor,
    elapsed_ns: u64,
) -> bool {
    let Some(tick) = driver.frame_tick(store, compositor) else {
        return false;
    };
    if let Some(frame) = tick.published {
        println!(
            "  t={:>7.3}s frame {:>6} ({} on canvas)",
            elapsed_ns as f64 / 1e9,
            frame,
            compositor.transforms().visible_ids().len()
        );
    }
    if tick.stopped {
        println!("Reached the end at frame {}.", store.current_frame());
    }
    tick.stopped
}

fn finish<T: TimeSource>(driver: &mut PlaybackDriver<T>, store: &mut TimelineStore) {
    if store.is_playing() {
        driver.pause(store);
        println!("Paused at frame {}.", store.current_frame());
    }
}
