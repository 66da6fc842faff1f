// Copyright 2025 eraflo
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

//! Property test: random interleavings of host lifecycle events and render
//! ticks never pull a frame from a session that is not resumed.

mod common;

use anchora_agents::{SessionState, TickOutcome};
use common::Harness;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Resume,
    Pause,
    Tick,
    CameraLost,
    CameraBack,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Resume),
        1 => Just(Op::Pause),
        4 => Just(Op::Tick),
        1 => Just(Op::CameraLost),
        1 => Just(Op::CameraBack),
    ]
}

proptest! {
    #[test]
    fn prop_update_only_while_resumed(ops in prop::collection::vec(op(), 0..64)) {
        let mut h = Harness::new();
        for op in ops {
            match op {
                Op::Resume => {
                    let _ = h.resume();
                }
                Op::Pause => h.pause(),
                Op::Tick => {
                    let resumed = h.manager.state() == SessionState::Resumed;
                    let before = h.script.with(|s| s.updates);
                    let outcome = h.render.render_tick();
                    let after = h.script.with(|s| s.updates);
                    if !resumed {
                        prop_assert_eq!(outcome, TickOutcome::NoSession);
                        prop_assert_eq!(before, after);
                    } else {
                        prop_assert_eq!(after, before + 1);
                    }
                }
                Op::CameraLost => h.script.with(|s| s.camera_available = false),
                Op::CameraBack => h.script.with(|s| s.camera_available = true),
            }
        }
        prop_assert_eq!(h.script.with(|s| s.update_violations), 0);
    }
}
