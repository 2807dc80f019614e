//! # Log replay
//!
//! Drive a controller from a CANARY-format capture file instead of a live
//! bus. Frames pace the state machine through their recorded timestamps,
//! so faults and recoveries play out exactly as they did on the bench.
//!
//! ```bash
//! cargo run --example log_replay -- capture.txt [--common]
//! ```
//!
//! Pass `--common` for captures from the two-bus logger, which carry a bus
//! number column after the timestamp.

use std::env;
use std::fs;
use std::process;

use tg3spm::controller::{Event, PhaseModule};
use tg3spm::core::Config;
use tg3spm::replay::{LogReader, ReplayOutcome};
use tg3spm::time::DeltaTime;

fn main() {
    let mut args = env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: log_replay <capture.txt> [--common]");
            process::exit(2);
        }
    };
    let common_log = args.any(|arg| arg == "--common");

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("cannot read {path}: {err}");
            process::exit(1);
        }
    };

    let mut reader = LogReader::new();
    reader.common_log = common_log;

    let mut module = PhaseModule::new(1);
    module.set_config(Config {
        voltage_dc_v: 390.0,
        current_ac_a: 4.0,
        rated_voltage_ac_v: 240.0,
    });

    let mut clock = DeltaTime::new();
    let mut report_timer_ms = 0u32;

    for &byte in &bytes {
        let record = match reader.push_byte(byte) {
            ReplayOutcome::Consumed => continue,
            ReplayOutcome::FrameReady(record) => record,
            ReplayOutcome::Failed(error) => {
                eprintln!("parse error: {error}");
                continue;
            }
        };

        let delta_ms = clock.update_ms(record.timestamp_us / 1000);
        let event = module.step(delta_ms);
        match event {
            Event::None => {}
            Event::Fault => println!("{:?}, cause: {:?}", event, module.fault_cause()),
            _ => println!("{:?}", event),
        }

        module.put_rx_frame(&record.frame());

        // A live integration would put these on the bus.
        while module.get_tx_frame().is_some() {}

        report_timer_ms += delta_ms;
        if report_timer_ms >= 500 {
            report_timer_ms -= 500;
            if module.read_vars().is_some() {
                println!("{}\n", module.report());
            }
        }
    }

    println!("finished, total frames: {}", reader.total_frames());
}
