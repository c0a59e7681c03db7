//! Rate loop after a successful boot.

use ledblinker::app::ports::IndicatorPort;
use ledblinker::app::rate_loop::RateLoop;
use ledblinker::app::sequencer::{
    MSG_PROGRAM_STARTED, MSG_SETUP_TOPOLOGY, MSG_TRYING_TO_START, Sequencer,
};
use ledblinker::config::BlinkerConfig;

use crate::mock_hw::{Rig, Trace};

fn booted(polls: u32) -> (Rig, BlinkerConfig) {
    let cfg = BlinkerConfig::default();
    let mut rig = Rig::new(polls);
    Sequencer::new(&cfg)
        .run(&mut rig.ports())
        .expect("boot succeeds against healthy mocks");
    (rig, cfg)
}

#[test]
fn each_tick_toggles_then_cycles_then_sleeps() {
    let (mut rig, cfg) = booted(0);
    rig.clear();

    let mut rl = RateLoop::new(&cfg);
    let cycles = rl.run_while(&mut rig.ports(), |c| c < 3);

    assert_eq!(cycles, 3);
    let one_tick = [
        Trace::Toggle("led0"),
        Trace::Toggle("led1"),
        Trace::Cycle,
        Trace::SleepMs(cfg.tick_period_ms),
    ];
    let expected: Vec<Trace> = one_tick.iter().cloned().cycle().take(12).collect();
    assert_eq!(rig.trace(), expected);
}

#[test]
fn heartbeat_alternates_indicators_in_phase() {
    let (mut rig, cfg) = booted(0);
    let mut rl = RateLoop::new(&cfg);

    let mut levels = Vec::new();
    for _ in 0..4 {
        rl.step(&mut rig.ports());
        levels.push((rig.led0.level(), rig.led1.level()));
    }
    assert_eq!(
        levels,
        vec![(true, true), (false, false), (true, true), (false, false)]
    );
}

#[test]
fn cycle_count_strictly_increases() {
    let (mut rig, cfg) = booted(0);
    let mut rl = RateLoop::new(&cfg);

    let mut last = rl.cycles();
    for _ in 0..25 {
        rl.step(&mut rig.ports());
        assert!(rl.cycles() > last);
        last = rl.cycles();
    }
    assert_eq!(rig.count(|t| *t == Trace::Cycle), 25);
}

#[test]
fn end_to_end_two_intervals_then_ticks() {
    let (mut rig, cfg) = booted(2);

    assert_eq!(rig.count(|t| *t == Trace::Toggle("led0")), 2);
    assert_eq!(rig.count(|t| *t == Trace::Toggle("led1")), 2);
    assert_eq!(
        rig.logs(),
        vec![
            MSG_PROGRAM_STARTED.to_string(),
            MSG_SETUP_TOPOLOGY.to_string(),
            MSG_TRYING_TO_START.to_string(),
        ]
    );
    assert_eq!(rig.count(|t| *t == Trace::Cycle), 0, "no tick during boot");

    let mut rl = RateLoop::new(&cfg);
    rl.run_while(&mut rig.ports(), |c| c < 10);

    let setup = rig.position(|t| matches!(t, Trace::Setup(_))).unwrap();
    let first_cycle = rig.position(|t| *t == Trace::Cycle).unwrap();
    assert!(setup < first_cycle);
    assert_eq!(rig.count(|t| *t == Trace::Cycle), 10);
}

#[test]
fn loop_does_not_depend_on_runtime_state() {
    let (mut rig, cfg) = booted(0);
    rig.runtime.started = false;
    rig.clear();

    let cfg = BlinkerConfig {
        status_report_interval_cycles: 1,
        ..cfg
    };
    let mut rl = RateLoop::new(&cfg);
    rl.run_while(&mut rig.ports(), |c| c < 5);
    assert_eq!(rig.count(|t| *t == Trace::Cycle), 5);
}
