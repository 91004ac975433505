//! End-to-end movement scenarios on a manual clock.

use std::time::Duration;

use rstest::rstest;
use shade_core::runner::run_until_idle;
use shade_core::{MotionStatus, MoveController, TimingCfg, per_percent_duration};
use shade_hardware::{SimLink, SimulatedTransmitter};
use shade_traits::ManualClock;

fn timing(delay_s: f64, open_s: f64, close_s: f64) -> TimingCfg {
    TimingCfg {
        initial_delay: Duration::from_secs_f64(delay_s),
        total_open: Duration::from_secs_f64(open_s),
        total_close: Duration::from_secs_f64(close_s),
        ..TimingCfg::default()
    }
}

fn controller(t: TimingCfg) -> (MoveController, ManualClock, SimLink) {
    let clock = ManualClock::new();
    let tx = SimulatedTransmitter::new();
    let link = tx.link();
    let ctrl = MoveController::builder()
        .with_transmitter(tx)
        .with_timing(t)
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("valid controller");
    (ctrl, clock, link)
}

fn wait(ctrl: &mut MoveController, clock: &ManualClock, d: Duration) -> MotionStatus {
    clock.advance(d);
    ctrl.poll()
}

#[test]
fn defaults_match_documented_values() {
    let t = TimingCfg::default();
    assert_eq!(t.initial_delay, Duration::from_millis(100));
    assert_eq!(t.total_open, Duration::from_secs(45));
    assert_eq!(t.total_close, Duration::from_secs(45));
}

#[rstest]
#[case(5.0, 8.0)]
#[case(45.0, 45.0)]
#[case(2.0, 30.0)]
fn per_percent_is_total_over_hundred(#[case] open_s: f64, #[case] close_s: f64) {
    let open = Duration::from_secs_f64(open_s);
    let close = Duration::from_secs_f64(close_s);
    assert_eq!(per_percent_duration(true, open, close), open / 100);
    assert_eq!(per_percent_duration(false, open, close), close / 100);
}

#[test]
fn open_from_zero_to_fifty() {
    let t = timing(0.1, 5.0, 45.0);
    let (mut ctrl, clock, link) = controller(t);
    let per = per_percent_duration(true, t.total_open, t.total_close);

    ctrl.request_target(50);
    assert_eq!(ctrl.status(), MotionStatus::AwaitingInitialDelay);

    wait(&mut ctrl, &clock, t.initial_delay);
    assert_eq!(ctrl.read_current_position(), 0);

    let status = wait(&mut ctrl, &clock, per * 50);
    assert_eq!(status, MotionStatus::Stopped(50));
    assert_eq!(ctrl.read_current_position(), 50);

    assert!(link.has_sent(&["OPEN", "STOP"]));
    assert_eq!(link.sent_count(), 2);
    assert_eq!(ctrl.sent_codes(), vec!["OPEN", "STOP"]);
}

#[test]
fn open_to_twenty_then_fifty() {
    let t = timing(0.1, 5.0, 45.0);
    let (mut ctrl, clock, link) = controller(t);
    let per = per_percent_duration(true, t.total_open, t.total_close);

    ctrl.request_target(20);
    wait(&mut ctrl, &clock, t.initial_delay);
    assert_eq!(ctrl.read_current_position(), 0);
    wait(&mut ctrl, &clock, per * 20);
    assert_eq!(ctrl.read_current_position(), 20);

    ctrl.request_target(50);
    wait(&mut ctrl, &clock, t.initial_delay);
    assert_eq!(ctrl.read_current_position(), 20);
    wait(&mut ctrl, &clock, per * 30);
    assert_eq!(ctrl.read_current_position(), 50);

    assert!(link.has_sent(&["OPEN", "STOP"]));
    assert_eq!(link.sent(), vec!["OPEN", "STOP", "OPEN", "STOP"]);
}

#[test]
fn open_to_ninety_then_close_to_sixty() {
    let t = timing(0.1, 5.0, 3.0);
    let (mut ctrl, clock, link) = controller(t);
    let open_per = per_percent_duration(true, t.total_open, t.total_close);
    let close_per = per_percent_duration(false, t.total_open, t.total_close);

    ctrl.request_target(90);
    wait(&mut ctrl, &clock, t.initial_delay);
    assert_eq!(ctrl.read_current_position(), 0);
    wait(&mut ctrl, &clock, open_per * 90);
    assert_eq!(ctrl.read_current_position(), 90);

    ctrl.request_target(60);
    wait(&mut ctrl, &clock, t.initial_delay);
    assert_eq!(ctrl.read_current_position(), 90);
    wait(&mut ctrl, &clock, close_per * 30);
    assert_eq!(ctrl.read_current_position(), 60);

    assert!(link.has_sent(&["OPEN", "CLOSE", "STOP"]));
    assert_eq!(link.sent_count(), 4);
}

#[test]
fn nothing_is_sent_before_initial_delay() {
    let t = timing(1.0, 2.0, 45.0);
    let (mut ctrl, clock, link) = controller(t);

    ctrl.request_target(10);
    wait(&mut ctrl, &clock, Duration::from_millis(900));
    assert_eq!(link.sent_count(), 0);
    assert_eq!(ctrl.status(), MotionStatus::AwaitingInitialDelay);

    wait(&mut ctrl, &clock, Duration::from_millis(100));
    assert_eq!(link.sent(), vec!["OPEN"]);
}

#[test]
fn position_only_moves_after_start_code() {
    let t = timing(0.5, 5.0, 5.0);
    let (mut ctrl, clock, _link) = controller(t);
    ctrl.request_target(100);
    wait(&mut ctrl, &clock, Duration::from_millis(400));
    assert_eq!(ctrl.read_current_position(), 0);
    wait(&mut ctrl, &clock, Duration::from_millis(100));
    wait(&mut ctrl, &clock, Duration::from_millis(500));
    assert_eq!(ctrl.read_current_position(), 10);
}

#[rstest]
#[case(-20, 0)]
#[case(250, 100)]
fn out_of_range_targets_are_clamped(#[case] requested: i32, #[case] expected: u8) {
    let (mut ctrl, _clock, _link) = controller(timing(0.1, 1.0, 1.0));
    ctrl.request_target(40);
    run_until_idle(&mut ctrl, Duration::from_secs(5)).unwrap();

    ctrl.request_target(requested);
    assert_eq!(ctrl.target_position(), expected);
    let end = run_until_idle(&mut ctrl, Duration::from_secs(5)).unwrap();
    assert_eq!(end, expected);
    assert_eq!(ctrl.read_current_position(), expected);
}

#[test]
fn requesting_current_position_sends_nothing() {
    let (mut ctrl, clock, link) = controller(timing(0.1, 1.0, 1.0));
    ctrl.request_target(0);
    assert_eq!(ctrl.status(), MotionStatus::Idle);
    wait(&mut ctrl, &clock, Duration::from_secs(1));
    assert_eq!(link.sent_count(), 0);
}
