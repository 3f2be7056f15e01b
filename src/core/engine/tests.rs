// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::*;
use crate::core::controller::SfcButtons;
use crate::core::hal::Direction;
use crate::sim::{ConsolePoll, PollKind, SelectWaveform, SimBoard};

const MS: u64 = 1_000_000;

fn poll_at(start_ns: u64, kind: PollKind) -> ConsolePoll {
    ConsolePoll {
        kind,
        start_ns,
        half_period_ns: 10_000,
    }
}

fn waveform(config: &Config, polls: &[ConsolePoll]) -> SelectWaveform {
    let mut select = SelectWaveform::new(config.target.select_idle_high);
    for poll in polls {
        select.add_poll(poll);
    }
    select
}

/// Step until the board passes its horizon, collecting every event
fn run_to_horizon(engine: &mut EmulationEngine<'_, SimBoard<'_>>) -> Vec<PhaseEvent> {
    let mut events = Vec::new();
    while !engine.board().finished() {
        events.push(engine.step());
    }
    events
}

// ========== Power-on ==========

#[test]
fn test_power_on_configures_lines() {
    let signal = RestartSignal::new();
    let board = SimBoard::new(&signal, Config::default());
    let engine = EmulationEngine::power_on(board, &signal, Config::default());
    let board = engine.board();

    for line in Line::DATA {
        assert_eq!(board.direction(line), Some(Direction::Output));
    }
    assert_eq!(board.direction(Line::Select), Some(Direction::Input));
    assert_eq!(board.direction(Line::Latch), Some(Direction::Output));
    assert_eq!(board.direction(Line::Clock), Some(Direction::Output));
    assert_eq!(board.direction(Line::HostData), Some(Direction::Input));

    // All-released answer before anything else is known
    assert_eq!(board.writes()[0].lines, DataLines::all());
    assert_eq!(board.host_reads(), 1);
    assert!(!board.watchdog_running());
    assert!(!signal.is_requested());
}

#[test]
fn test_power_on_clears_stale_request() {
    let signal = RestartSignal::new();
    signal.on_overflow();
    let board = SimBoard::new(&signal, Config::default());
    let _engine = EmulationEngine::power_on(board, &signal, Config::default());
    assert!(!signal.is_requested());
}

#[test]
fn test_power_on_selects_layout_once() {
    let signal = RestartSignal::new();
    let board = SimBoard::new(&signal, Config::default()).with_held(SfcButtons::RIGHT);
    let mut engine = EmulationEngine::power_on(board, &signal, Config::default());
    assert_eq!(engine.layout(), Layout::Bc);

    // Holding Left afterwards changes nothing
    engine.board_mut().pad_mut().set_held(SfcButtons::LEFT);
    engine.step();
    assert_eq!(engine.layout(), Layout::Bc);
    assert!(engine.snapshot().is_pressed(SfcButtons::LEFT));
}

// ========== Phase cycle ==========

#[test]
fn test_first_step_resyncs() {
    let signal = RestartSignal::new();
    let board = SimBoard::new(&signal, Config::default());
    let mut engine = EmulationEngine::power_on(board, &signal, Config::default());
    engine.board_mut().pad_mut().set_held(SfcButtons::START);

    let event = engine.step();

    assert_eq!(
        event,
        PhaseEvent::Resynced {
            snapshot: ButtonSnapshot::from_pressed(SfcButtons::START)
        }
    );
    assert_eq!(engine.phase(), PhaseIndex::ZERO);
    assert_eq!(engine.resync_count(), 1);
    assert_eq!(engine.board().host_reads(), 2);
    assert_eq!(
        *engine.schedule(),
        build(ButtonSnapshot::from_pressed(SfcButtons::START), Layout::Xc)
    );
}

#[test]
fn test_full_cycle_drives_each_entry_once_in_order() {
    let config = Config::default();
    let signal = RestartSignal::new();
    let select = waveform(&config, &[poll_at(MS, PollKind::SixButton)]);
    let board = SimBoard::new(&signal, config)
        .with_select(select)
        .with_horizon(50 * MS);
    let mut engine = EmulationEngine::power_on(board, &signal, config);
    engine.board_mut().pad_mut().set_held(SfcButtons::B | SfcButtons::X);

    assert!(matches!(engine.step(), PhaseEvent::Resynced { .. }));
    let schedule = *engine.schedule();

    // Phase 0 is answered straight away, then one phase per edge
    let mut phase = PhaseIndex::ZERO;
    for _ in 0..9 {
        assert_eq!(
            engine.step(),
            PhaseEvent::Driven {
                phase,
                lines: schedule[phase],
            }
        );
        phase = phase.next();
    }

    let written: Vec<u8> = engine
        .board()
        .writes()
        .iter()
        .skip(1)
        .map(|w| w.lines.bits())
        .collect();
    let mut expected = schedule.to_bytes().to_vec();
    expected.push(schedule.to_bytes()[0]);
    assert_eq!(written, expected);
}

#[test]
fn test_edges_answered_before_console_samples() {
    let config = Config::default();
    let signal = RestartSignal::new();
    let poll = poll_at(MS, PollKind::SixButton);
    let board = SimBoard::new(&signal, config)
        .with_select(waveform(&config, &[poll]))
        .with_horizon(20 * MS);
    let mut engine = EmulationEngine::power_on(board, &signal, config);
    run_to_horizon(&mut engine);

    let board = engine.into_board();
    let edges = poll.transitions(config.target.select_idle_high);
    for (at, _) in edges {
        let answered = board
            .writes()
            .iter()
            .find(|w| w.at_ns >= at)
            .map(|w| w.at_ns - at);
        assert!(matches!(answered, Some(latency) if latency < 1_000));
    }
}

#[test]
fn test_inverted_select_polarity() {
    let mut config = Config::default();
    config.target.select_idle_high = false;
    let signal = RestartSignal::new();
    let select = waveform(&config, &[poll_at(MS, PollKind::SixButton)]);
    let board = SimBoard::new(&signal, config)
        .with_select(select)
        .with_horizon(50 * MS);
    let mut engine = EmulationEngine::power_on(board, &signal, config);

    engine.step();
    let drives = (0..9)
        .filter(|_| matches!(engine.step(), PhaseEvent::Driven { .. }))
        .count();
    assert_eq!(drives, 9);
    assert_eq!(engine.phase(), PhaseIndex::try_from(1).unwrap());
}

// ========== Watchdog ==========

#[test]
fn test_phase_zero_does_not_arm_watchdog() {
    let signal = RestartSignal::new();
    let board = SimBoard::new(&signal, Config::default()).with_horizon(20 * MS);
    let mut engine = EmulationEngine::power_on(board, &signal, Config::default());

    engine.step();
    assert!(matches!(
        engine.step(),
        PhaseEvent::Driven {
            phase: PhaseIndex::ZERO,
            ..
        }
    ));
    assert!(!engine.board().watchdog_running());

    // Nothing but the horizon ends the wait for phase 1
    assert!(matches!(engine.step(), PhaseEvent::Resynced { .. }));
    assert!(engine.board().finished());
    assert_eq!(engine.board().watchdog_overflows(), 0);
}

#[test]
fn test_arm_on_phase_zero_resamples_while_idle() {
    let mut config = Config::default();
    config.watchdog.arm_on_phase_zero = true;
    let signal = RestartSignal::new();
    let board = SimBoard::new(&signal, config).with_horizon(50 * MS);
    let mut engine = EmulationEngine::power_on(board, &signal, config);
    engine.board_mut().pad_mut().schedule(MS, SfcButtons::START);

    engine.step();
    engine.step();
    assert!(engine.board().watchdog_running());

    // No console activity at all, yet the pad change is picked up
    match engine.step() {
        PhaseEvent::Resynced { snapshot } => assert!(snapshot.is_pressed(SfcButtons::START)),
        other => panic!("expected resync, got {:?}", other),
    }
    assert_eq!(engine.board().watchdog_overflows(), 1);
}

#[test]
fn test_stalled_poll_resyncs_to_phase_zero() {
    let config = Config::default();
    let signal = RestartSignal::new();
    let mut select = SelectWaveform::new(true);
    select.push(MS, false);
    select.push(MS + 10_000, true);
    select.push(MS + 20_000, false);
    let board = SimBoard::new(&signal, config)
        .with_select(select)
        .with_horizon(50 * MS);
    let mut engine = EmulationEngine::power_on(board, &signal, config);
    engine.board_mut().pad_mut().schedule(2 * MS, SfcButtons::START);

    engine.step();
    for _ in 0..4 {
        assert!(matches!(engine.step(), PhaseEvent::Driven { .. }));
    }
    assert_eq!(engine.phase(), PhaseIndex::try_from(4).unwrap());
    assert!(engine.board().watchdog_running());

    let event = engine.step();
    assert_eq!(
        event,
        PhaseEvent::Resynced {
            snapshot: ButtonSnapshot::from_pressed(SfcButtons::START)
        }
    );
    assert_eq!(engine.phase(), PhaseIndex::ZERO);
    assert_eq!(engine.board().watchdog_overflows(), 1);
    assert_eq!(engine.board().host_reads(), 3);
    assert!(!engine.board().watchdog_running());
    assert!(!signal.is_requested());

    // Overflow came 4096us after the last edge
    assert!(engine.board().now_ns() >= MS + 20_000 + 4_096_000);
}

#[test]
fn test_pending_request_abandons_edge_wait() {
    let signal = RestartSignal::new();
    let board = SimBoard::new(&signal, Config::default());
    let mut engine = EmulationEngine::power_on(board, &signal, Config::default());
    engine.step();
    engine.step();

    signal.on_overflow();
    assert!(matches!(engine.step(), PhaseEvent::Resynced { .. }));
    assert!(!signal.is_requested());
    assert_eq!(engine.resync_count(), 2);
}

#[test]
fn test_three_button_bursts_never_reach_phase_five() {
    let config = Config::default();
    let signal = RestartSignal::new();
    let polls: Vec<_> = (0..3)
        .map(|frame| poll_at(MS + frame * 17 * MS, PollKind::ThreeButton))
        .collect();
    let board = SimBoard::new(&signal, config)
        .with_select(waveform(&config, &polls))
        .with_horizon(70 * MS);
    let mut engine = EmulationEngine::power_on(board, &signal, config);

    let events = run_to_horizon(&mut engine);

    let deepest = events
        .iter()
        .filter_map(|event| match event {
            PhaseEvent::Driven { phase, .. } => Some(u8::from(*phase)),
            PhaseEvent::Resynced { .. } => None,
        })
        .max();
    assert_eq!(deepest, Some(4));
    assert_eq!(engine.board().watchdog_overflows(), 3);
}

// ========== Schedule replacement ==========

#[test]
fn test_every_write_comes_from_one_whole_schedule() {
    let config = Config::default();
    let signal = RestartSignal::new();
    let polls: Vec<_> = (0..5)
        .map(|frame| poll_at(MS + frame * 17 * MS, PollKind::SixButton))
        .collect();
    let board = SimBoard::new(&signal, config)
        .with_select(waveform(&config, &polls))
        .with_horizon(100 * MS);
    let mut engine = EmulationEngine::power_on(board, &signal, config);

    let patterns = [
        SfcButtons::empty(),
        SfcButtons::B | SfcButtons::UP,
        SfcButtons::START | SfcButtons::L | SfcButtons::R,
        SfcButtons::all(),
    ];
    for i in 0..130u64 {
        engine
            .board_mut()
            .pad_mut()
            .schedule(i * 700_000, patterns[(i % 4) as usize]);
    }

    let mut live: Option<OutputSchedule> = None;
    let mut resyncs = 0;
    while !engine.board().finished() {
        match engine.step() {
            PhaseEvent::Resynced { snapshot } => {
                resyncs += 1;
                let rebuilt = build(snapshot, engine.layout());
                assert_eq!(*engine.schedule(), rebuilt);
                live = Some(rebuilt);
            }
            PhaseEvent::Driven { phase, lines } => {
                let schedule = live.expect("driven before the first resync");
                assert_eq!(lines, schedule[phase]);
            }
        }
    }
    // First entry, one per frame, and the horizon
    assert_eq!(resyncs, 1 + 5 + 1);
}
