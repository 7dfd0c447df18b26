mod common;

use std::cell::Cell;
use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

use common::RecordingPlayer;
use swapgrid::engine::core::{Clock, FrameLoop, FrameScheduler};
use swapgrid::grid::animation::PulseConfig;
use swapgrid::grid::Item;

/// Clock that only moves when told to.
#[derive(Default)]
struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Default)]
struct CountingScheduler {
    requests: Cell<u32>,
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

#[test]
fn test_idle_item_scale_is_exactly_one() {
    let mut grid = common::default_grid();

    for ms in [0, 16, 33, 1_000, 123_456] {
        grid.animate(Duration::from_millis(ms));
        for item in grid.items() {
            assert_eq!(item.current_scale, 1.0);
        }
    }
}

#[test]
fn test_hover_adds_fixed_bonus() {
    let mut grid = common::default_grid();
    grid.pointer_moved(grid.items()[2].position);

    grid.animate(Duration::from_millis(500));

    assert!((grid.items()[2].current_scale - 1.03).abs() < 1e-6);
    assert_eq!(grid.items()[0].current_scale, 1.0);
}

#[test]
fn test_selected_item_pulses_with_wall_clock() {
    let pulse = PulseConfig::default();
    let mut item = Item::new(glam::Vec2::ZERO, "assets/images/item1.png");
    item.selected = true;
    // Selection overrides the hover bonus.
    item.hovered = true;

    let at_zero = pulse.scale_for(&item, Duration::ZERO);
    assert!((at_zero - 1.0).abs() < 1e-6);

    // sin(ms / 200) peaks at ms = 100 * pi.
    let peak = Duration::from_secs_f64(FRAC_PI_2 * 0.2);
    let at_peak = pulse.scale_for(&item, peak);
    assert!((at_peak - 1.05).abs() < 1e-5, "peak scale {at_peak}");

    let trough = Duration::from_secs_f64(3.0 * FRAC_PI_2 * 0.2);
    let at_trough = pulse.scale_for(&item, trough);
    assert!((at_trough - 0.95).abs() < 1e-5, "trough scale {at_trough}");
}

#[test]
fn test_frame_loop_follows_clock_not_frame_count() {
    let clock = ManualClock::default();
    clock.advance(Duration::from_secs_f64(FRAC_PI_2 * 0.2));
    let mut frame_loop = FrameLoop::new(clock);
    let mut grid = common::default_grid();
    let mut audio = RecordingPlayer::default();
    let target = grid.items()[0].position;
    grid.click(target, &mut audio);

    // Many frames at the same instant give the same scale.
    for _ in 0..5 {
        frame_loop.tick(&mut grid);
        assert!((grid.items()[0].current_scale - 1.05).abs() < 1e-5);
    }
    assert_eq!(frame_loop.frame_index(), 5);
}

#[test]
fn test_frame_loop_reports_delta_and_requests_next_frame() {
    let mut frame_loop = FrameLoop::new(ManualClock::default());
    let scheduler = CountingScheduler::default();
    let mut grid = common::default_grid();

    let first = frame_loop.tick(&mut grid);
    frame_loop.schedule_next(&scheduler);
    frame_loop.clock().advance(Duration::from_millis(16));
    let second = frame_loop.tick(&mut grid);
    frame_loop.schedule_next(&scheduler);

    assert_eq!(first.frame_index, 0);
    assert_eq!(first.delta_seconds, 0.0);
    assert_eq!(second.frame_index, 1);
    assert!((second.delta_seconds - 0.016).abs() < 1e-6);
    assert_eq!(second.elapsed, Duration::from_millis(16));
    assert_eq!(scheduler.requests.get(), 2);
}
