//! # Quickstart
//!
//! Walk one phase module controller through a full charge start on the
//! host, no hardware attached:
//! - configure the targets and power the module
//! - enable charging after the boot delay
//! - feed captured telemetry until the variables become readable
//! - drain the command frames a real integration would put on the bus
//!
//! ```bash
//! cargo run --example quickstart
//! ```

use tg3spm::controller::{Event, PhaseModule};
use tg3spm::core::Config;
use tg3spm::protocol::can_frame::Frame;

/// One frame per telemetry group, taken from a capture of module 0.
const TELEMETRY: [Frame; 5] = [
    Frame {
        id: 0x207,
        len: 8,
        data: [0x00, 0xE6, 0x02, 0x00, 0x00, 0x9C, 0x02, 0x00],
    },
    Frame {
        id: 0x217,
        len: 8,
        data: [0x02, 0x00, 0x01, 0xFC, 0x9C, 0x02, 0x00, 0x00],
    },
    Frame {
        id: 0x227,
        len: 8,
        data: [0x00, 0x00, 0x1C, 0x7F, 0x03, 0x00, 0x1F, 0xC5],
    },
    Frame {
        id: 0x237,
        len: 8,
        data: [0x3C, 0x41, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    },
    Frame {
        id: 0x247,
        len: 8,
        data: [0x44, 0x7D, 0x08, 0x02, 0x00, 0x00, 0x20, 0x00],
    },
];

fn main() {
    println!("=== tg3spm quickstart ===\n");

    // ======================================================================
    // 1. Configure and power on
    // ======================================================================
    let mut module = PhaseModule::new(0);

    println!("1. Before configuration: {:?}", module.step(0));

    module.set_config(Config {
        voltage_dc_v: 390.0,
        current_ac_a: 4.0,
        rated_voltage_ac_v: 230.0,
    });
    println!("   After configuration:  {:?}", module.step(0));
    println!("   pwron = {}\n", module.pwron_pin_state());

    // ======================================================================
    // 2. Boot delay, then charge enable
    // ======================================================================
    let mut event = Event::None;
    let mut waited_ms = 0u32;
    while event == Event::None {
        // A real loop would pass measured deltas; 10 ms ticks here.
        event = module.step(10);
        waited_ms += 10;
    }
    println!("2. After {} ms: {:?}, chgen = {}\n", waited_ms, event, module.chgen_pin_state());

    // ======================================================================
    // 3. Feed telemetry until the variables are readable
    // ======================================================================
    for frame in &TELEMETRY {
        module.put_rx_frame(frame);
    }
    match module.read_vars() {
        Some(vars) => println!(
            "3. Telemetry complete: {:.1} V DC, {} V AC, limit {:.1} A\n",
            vars.voltage_dc_v, vars.voltage_ac_v, vars.current_limit_due_temp_a
        ),
        None => println!("3. Telemetry incomplete\n"),
    }

    // ======================================================================
    // 4. Drain the queued command frames
    // ======================================================================
    module.step(0);
    println!("4. Command frames, in drain order:");
    while let Some(frame) = module.get_tx_frame() {
        print!("   0x{:03X}:", frame.id);
        for byte in &frame.data[..frame.len as usize] {
            print!(" {:02X}", byte);
        }
        println!();
    }

    // ======================================================================
    // 5. Diagnostic report
    // ======================================================================
    println!("\n5. Diagnostic report:\n{}", module.report());
}
