//! Boot sequence against the journaling mocks.

use ledblinker::app::ports::{ChannelHandle, EnableOutcome, IndicatorPort, PinMode, TopologyState};
use ledblinker::app::sequencer::{
    BootPhase, MSG_PROGRAM_STARTED, MSG_SETUP_TOPOLOGY, MSG_TRYING_TO_START, Sequencer,
};
use ledblinker::config::BlinkerConfig;
use ledblinker::error::{BootError, EXIT_FAILURE, EXIT_NEUTRAL};

use crate::mock_hw::{Rig, Trace};

const POLL_MS: u32 = 3000;

fn boot(rig: &mut Rig, config: &BlinkerConfig) -> (Sequencer, Result<u32, BootError>) {
    let mut seq = Sequencer::new(config);
    let res = seq.run(&mut rig.ports()).map(|r| r.channel_polls);
    (seq, res)
}

fn expected_state() -> TopologyState {
    TopologyState {
        channel: ChannelHandle { device: "mock-usb" },
        uart_baud: 115_200,
    }
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn ready_channel_boots_in_exact_order() {
    let mut rig = Rig::new(0);
    let (seq, res) = boot(&mut rig, &BlinkerConfig::default());

    assert_eq!(res, Ok(0));
    assert_eq!(seq.phase(), BootPhase::TaskRuntimeStarted);
    assert_eq!(
        rig.trace(),
        vec![
            Trace::Configure("led0", PinMode::OutputActive),
            Trace::Configure("led1", PinMode::OutputActive),
            Trace::Level("led0", true),
            Trace::Level("led1", true),
            Trace::Enable,
            Trace::Level("led0", false),
            Trace::Level("led1", false),
            Trace::ReadyCheck(true),
            Trace::OsInit,
            Trace::Log(MSG_PROGRAM_STARTED.into()),
            Trace::Level("led0", false),
            Trace::Level("led1", true),
            Trace::Setup(expected_state()),
            Trace::Log(MSG_SETUP_TOPOLOGY.into()),
            Trace::Level("led0", true),
            Trace::Level("led1", false),
            Trace::Log(MSG_TRYING_TO_START.into()),
            Trace::RuntimeStart,
            Trace::Level("led0", false),
            Trace::Level("led1", false),
        ]
    );
}

#[test]
fn both_indicators_off_after_handoff() {
    let mut rig = Rig::new(3);
    let (_, res) = boot(&mut rig, &BlinkerConfig::default());
    assert!(res.is_ok());
    assert!(!rig.led0.level());
    assert!(!rig.led1.level());
}

#[test]
fn wait_toggles_once_per_interval() {
    let mut rig = Rig::new(2);
    let (_, res) = boot(&mut rig, &BlinkerConfig::default());
    assert_eq!(res, Ok(2));

    let start = rig.position(|t| *t == Trace::Enable).unwrap() + 3;
    let wait: Vec<Trace> = rig.trace()[start..start + 9].to_vec();
    assert_eq!(
        wait,
        vec![
            Trace::ReadyCheck(false),
            Trace::SleepMs(POLL_MS),
            Trace::Toggle("led0"),
            Trace::Toggle("led1"),
            Trace::ReadyCheck(false),
            Trace::SleepMs(POLL_MS),
            Trace::Toggle("led0"),
            Trace::Toggle("led1"),
            Trace::ReadyCheck(true),
        ]
    );
}

#[test]
fn poll_count_matches_intervals_elapsed() {
    for n in [0u32, 1, 50] {
        let mut rig = Rig::new(n);
        let (_, res) = boot(&mut rig, &BlinkerConfig::default());
        assert_eq!(res, Ok(n));
        assert_eq!(rig.count(|t| *t == Trace::SleepMs(POLL_MS)), n as usize);
        assert_eq!(rig.count(|t| *t == Trace::Toggle("led0")), n as usize);
        assert_eq!(rig.count(|t| *t == Trace::Toggle("led1")), n as usize);
    }
}

#[test]
fn nothing_observes_the_channel_before_it_is_ready() {
    let mut rig = Rig::new(4);
    let (_, res) = boot(&mut rig, &BlinkerConfig::default());
    assert!(res.is_ok());

    let ready = rig.position(|t| *t == Trace::ReadyCheck(true)).unwrap();
    let os = rig.position(|t| *t == Trace::OsInit).unwrap();
    let first_log = rig.position(|t| matches!(t, Trace::Log(_))).unwrap();
    let setup = rig.position(|t| matches!(t, Trace::Setup(_))).unwrap();
    assert!(ready < os);
    assert!(os < first_log);
    assert!(first_log < setup);
}

#[test]
fn already_enabled_is_indistinguishable_from_enabled() {
    let mut fresh = Rig::new(2);
    let mut again = Rig::new(2);
    again.channel.outcome = EnableOutcome::AlreadyEnabled;

    let (_, a) = boot(&mut fresh, &BlinkerConfig::default());
    let (_, b) = boot(&mut again, &BlinkerConfig::default());
    assert_eq!(a, b);
    assert_eq!(fresh.trace(), again.trace());
}

// ── Failures ──────────────────────────────────────────────────

#[test]
fn missing_indicator_exits_quietly_without_side_effects() {
    for which in ["led0", "led1"] {
        let mut rig = Rig::new(0);
        match which {
            "led0" => rig.led0.ready = false,
            _ => rig.led1.ready = false,
        }
        let (seq, res) = boot(&mut rig, &BlinkerConfig::default());

        let err = res.unwrap_err();
        assert_eq!(err, BootError::HardwareNotReady { indicator: which });
        assert!(err.is_silent());
        assert_eq!(err.exit_code(), EXIT_NEUTRAL);
        assert_eq!(seq.phase(), BootPhase::Aborted(err));
        assert!(rig.trace().is_empty(), "no level change, log or build");
    }
}

#[test]
fn enable_failure_never_enters_wait() {
    let mut rig = Rig::new(0);
    rig.channel.outcome = EnableOutcome::Failed(-1);
    let (seq, res) = boot(&mut rig, &BlinkerConfig::default());

    let err = res.unwrap_err();
    assert_eq!(err, BootError::ChannelEnableFailure { code: -1 });
    assert_eq!(err.exit_code(), EXIT_FAILURE);
    assert!(matches!(seq.phase(), BootPhase::Aborted(_)));
    assert_eq!(rig.count(|t| matches!(t, Trace::ReadyCheck(_))), 0);
    assert_eq!(rig.count(|t| matches!(t, Trace::SleepMs(_))), 0);
    assert!(rig.logs().is_empty());
    // Outputs stay at the phase-2 pattern.
    assert_eq!(
        rig.trace().last(),
        Some(&Trace::Enable),
        "no indicator write after a failed enable"
    );
}

#[test]
fn bounded_poll_gives_up() {
    let cfg = BlinkerConfig {
        channel_poll_limit: Some(3),
        ..BlinkerConfig::default()
    };
    let mut rig = Rig::new(10);
    let (seq, res) = boot(&mut rig, &cfg);

    assert_eq!(res, Err(BootError::ChannelNeverReady { polls: 3 }));
    assert_eq!(seq.phase(), BootPhase::Aborted(BootError::ChannelNeverReady { polls: 3 }));
    assert_eq!(rig.count(|t| *t == Trace::OsInit), 0);
    assert!(!rig.runtime.started);
}

#[test]
fn sequence_runs_at_most_once() {
    let mut rig = Rig::new(0);
    let cfg = BlinkerConfig::default();
    let mut seq = Sequencer::new(&cfg);
    assert!(seq.run(&mut rig.ports()).is_ok());
    rig.clear();

    assert_eq!(seq.run(&mut rig.ports()), Err(BootError::AlreadyRan));
    assert!(rig.trace().is_empty());
    assert_eq!(seq.phase(), BootPhase::TaskRuntimeStarted);
}
