// Copyright 2024 OctoFHIR Team
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

//! Registry shared across threads

use simstats::StatsRegistry;
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_writers_and_readers() {
    let registry = Arc::new(StatsRegistry::new());
    let committed = registry
        .scalar("system.cpu.committedInsts", "committed instructions")
        .unwrap();
    registry.finalize();

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let stat = committed.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    stat.inc();
                }
            })
        })
        .collect();

    let reader = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            let handle = registry.resolve("system.cpu.committedInsts").unwrap();
            let mut last = 0.0;
            for _ in 0..100 {
                let now = handle.value().unwrap();
                assert!(now >= last);
                last = now;
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    reader.join().unwrap();

    assert_eq!(registry.value("system.cpu.committedInsts"), Some(4000.0));
}
