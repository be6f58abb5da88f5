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

//! Formula parsing and evaluation benchmarks

use criterion::{Criterion, criterion_group, criterion_main};
use mathexpr_evaluator::{Expression, MathExprEngine, VariableScope};
use std::hint::black_box;

const FORMULAS: &[(&str, &str)] = &[
    ("simple", "0.5 * issue_rate * voltage^2"),
    ("thermal", "k * temp + leak * exp(0.02 * (temp - 25))"),
    (
        "stats",
        "(system.cpu.ipc * 0.3 + system.cpu.dcache.misses / system.cpu.numCycles) * voltage^2",
    ),
    ("functions", "max(min(a, b), clamp(c, 0, 1), sqrt(abs(d)))"),
];

fn scope() -> VariableScope {
    VariableScope::new()
        .with("issue_rate", 2.0)
        .with("voltage", 0.9)
        .with("k", 0.01)
        .with("temp", 55.0)
        .with("leak", 0.2)
        .with("system.cpu.ipc", 1.4)
        .with("system.cpu.dcache.misses", 120.0)
        .with("system.cpu.numCycles", 10_000.0)
        .with("a", 1.0)
        .with("b", 2.0)
        .with("c", 0.5)
        .with("d", -4.0)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, source) in FORMULAS {
        group.bench_function(*name, |b| {
            b.iter(|| Expression::parse(black_box(source)))
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let engine = MathExprEngine::new();
    let scope = scope();
    let mut group = c.benchmark_group("evaluate");
    for (name, source) in FORMULAS {
        let Ok(expr) = Expression::parse(source) else {
            continue;
        };
        group.bench_function(*name, |b| {
            b.iter(|| engine.evaluate(black_box(&expr), &scope))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_evaluate);
criterion_main!(benches);
