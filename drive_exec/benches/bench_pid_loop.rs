//! # PID Loop Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use drive_lib::{
    heading_ctrl::{HeadingCtrl, Params, WrapPolicy},
    pid::{ControlGains, DerivativeMode, LoopLimits, LoopState, PidLoop},
    sim::{SimParams, SimRobot},
};

fn pid_loop_benchmark(c: &mut Criterion) {
    // ---- Build the heading loop ----

    let params = Params {
        gains: ControlGains { k_p: 0.15, k_i: 0.009, k_d: 0.001 },
        limits: LoopLimits {
            output_cap: 8.0,
            integral_band: 16.0,
            convergence_tolerance: 0.5,
            max_iterations: 700,
        },
        period_ms: 15,
        derivative_mode: DerivativeMode::FixedStep,
        wrap_policy: WrapPolicy::Shortest,
    };

    let sim_params = SimParams {
        turn_gain: 0.2,
        drive_gain: 5.0,
        response: 1.0,
        initial_heading_deg: 0.0,
    };

    let pid = PidLoop::new(params.gains, params.limits);
    let state = LoopState {
        error: 12.0,
        prev_error: 14.0,
        derivative: -2.0,
        integral: 26.0,
        num_iters: 10,
    };

    // Bench a single iteration
    c.bench_function("PidLoop::step", |b| {
        b.iter(|| pid.step(black_box(&state), black_box(10.5), None))
    });

    // Bench a full simulated turn, without pacing
    c.bench_function("HeadingCtrl::turn_to::sim_90_deg", |b| {
        b.iter(|| {
            let mut robot = SimRobot::new(sim_params);
            HeadingCtrl::new(params).turn_to(&mut robot, &mut Vec::new(), black_box(90.0))
        })
    });
}

criterion_group!(benches, pid_loop_benchmark);
criterion_main!(benches);
