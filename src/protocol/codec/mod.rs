//! Encoder and decoder for the GEN3 phase module CAN protocol. Everything
//! here was reverse engineered from bus captures of the OEM charger: the
//! identifiers, the scale factors, and the fixed payload bytes are observed
//! values, not documented ones. They are kept as literal named constants and
//! must not be re-derived.
use crate::core::{Config, Vars};
use crate::protocol::can_frame::Frame;

//==================================================================================Identifiers

/// AC feedback telemetry: AC voltage and current, presence and fault bits.
pub const ID_AC_FEEDBACK: u32 = 0x207;
/// Status telemetry: one raw status byte.
pub const ID_STATUS: u32 = 0x217;
/// DC feedback telemetry: DC voltage and current.
pub const ID_DC_FEEDBACK: u32 = 0x227;
/// Temperature telemetry: two sensors plus the inlet coolant target.
pub const ID_TEMPERATURE: u32 = 0x237;
/// Thermal limit telemetry: current limit imposed by module temperature.
pub const ID_THERMAL_LIMIT: u32 = 0x247;
/// Further module transmissions whose payloads remain unidentified. They
/// still prove the module is alive.
pub const ID_AUX_GROUP: [u32; 4] = [0x347, 0x467, 0x537, 0x717];

/// Per-module command frame carrying the AC current target.
pub const ID_SETPOINT: u32 = 0x42C;
/// Bus-wide command frame carrying the DC voltage target. Only one
/// controller per bus segment should transmit it.
pub const ID_BROADCAST: u32 = 0x45C;
/// Fixed-payload frame the OEM controller emits every cycle. Purpose
/// unknown.
pub const ID_STATIC: u32 = 0x368;

/// Identifier stride between modules on the receive side. The transmit side
/// uses [`TX_ID_STRIDE`]; the asymmetry is exactly what a three-module
/// charger puts on the wire.
pub const RX_ID_STRIDE: u32 = 2;
/// Identifier stride between modules for the setpoint frame.
pub const TX_ID_STRIDE: u32 = 0x10;

//==================================================================================Scale factors

/// Volts per count of the DC voltage field: the full u16 range spans 700 V.
pub const DC_VOLTAGE_V_PER_COUNT: f32 = 700.0 / 65535.0;
/// Amps per count of the DC current field: the full u16 range spans 50 A.
pub const DC_CURRENT_A_PER_COUNT: f32 = 50.0 / 65535.0;
/// Amps per count of the AC current field, close to 0.1/sqrt(2). Fitted
/// against a clamp meter during capture sessions.
pub const AC_CURRENT_A_PER_COUNT: f32 = 0.070710678118;
/// Amps per count of the thermal current limit, 15/64 exactly.
pub const THERMAL_LIMIT_A_PER_COUNT: f32 = 0.234375;
/// Raw AC voltage above this value counts as mains present (V).
pub const AC_PRESENT_THRESHOLD_V: u16 = 70;

/// Counts per amp of the AC current target in the setpoint frame.
pub const SETPOINT_COUNTS_PER_AMP: f32 = 1500.0;
/// Counts per volt of the DC voltage target in the broadcast frame.
pub const BROADCAST_COUNTS_PER_VOLT: f32 = 100.0;
/// Divisor applied to the rated AC voltage in the startup profile byte.
pub const STARTUP_RATED_VOLTAGE_DIVISOR: f32 = 1.2;

/// Payload of the 0x368 frame, replayed verbatim from captures.
pub const STATIC_FRAME_PAYLOAD: [u8; 8] = [0x03, 0x49, 0x29, 0x11, 0x00, 0x0C, 0x40, 0xFF];

//==================================================================================Decoder

/// The five telemetry groups that feed [`Vars`]. Each owns one bit of the
/// completion mask tracked by the RX monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryGroup {
    AcFeedback,
    Status,
    DcFeedback,
    Temperature,
    ThermalLimit,
}

impl TelemetryGroup {
    /// Bit position of this group in the completion mask.
    pub fn bit(self) -> u8 {
        match self {
            TelemetryGroup::AcFeedback => 0,
            TelemetryGroup::Status => 1,
            TelemetryGroup::DcFeedback => 2,
            TelemetryGroup::Temperature => 3,
            TelemetryGroup::ThermalLimit => 4,
        }
    }
}

/// What a received frame turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Identifier not part of the module protocol; nothing happened.
    Ignored,
    /// Recognized module transmission with no mapped fields. Refreshes the
    /// RX timeout but contributes no completion bit.
    Auxiliary,
    /// Telemetry decoded into [`Vars`].
    Telemetry(TelemetryGroup),
}

/// Decode one received frame into `vars`.
///
/// The module's own identifier offset (`module_id` times [`RX_ID_STRIDE`])
/// is removed first, so the same dispatch serves all three modules.
pub fn decode_frame(vars: &mut Vars, module_id: u8, frame: &Frame) -> DecodeOutcome {
    let base_id = frame.id.wrapping_sub(module_id as u32 * RX_ID_STRIDE);
    let d = &frame.data;

    match base_id {
        ID_AC_FEEDBACK => {
            vars.voltage_ac_v = d[1] as u16;
            vars.ac_present = vars.voltage_ac_v > AC_PRESENT_THRESHOLD_V;

            let raw = ((((d[6] & 0x03) as u16) << 8) | d[5] as u16) >> 1;
            vars.current_ac_a = raw as f32 * AC_CURRENT_A_PER_COUNT;

            vars.en_present = (d[2] & 0x02) != 0;
            vars.fault = (d[2] & 0x04) != 0;
            DecodeOutcome::Telemetry(TelemetryGroup::AcFeedback)
        }
        ID_STATUS => {
            vars.status = d[0];
            DecodeOutcome::Telemetry(TelemetryGroup::Status)
        }
        ID_DC_FEEDBACK => {
            let raw_voltage = ((d[3] as u16) << 8) | d[2] as u16;
            vars.voltage_dc_v = raw_voltage as f32 * DC_VOLTAGE_V_PER_COUNT;

            let raw_current = ((d[5] as u16) << 8) | d[4] as u16;
            vars.current_dc_a = raw_current as f32 * DC_CURRENT_A_PER_COUNT;
            DecodeOutcome::Telemetry(TelemetryGroup::DcFeedback)
        }
        ID_TEMPERATURE => {
            vars.temp1_c = d[0] as i16 - 40;
            vars.temp2_c = d[1] as i16 - 40;
            vars.inlet_target_temp_c = d[5] as i16 - 40;
            DecodeOutcome::Telemetry(TelemetryGroup::Temperature)
        }
        ID_THERMAL_LIMIT => {
            vars.current_limit_due_temp_a = d[0] as f32 * THERMAL_LIMIT_A_PER_COUNT;
            DecodeOutcome::Telemetry(TelemetryGroup::ThermalLimit)
        }
        id if ID_AUX_GROUP.contains(&id) => DecodeOutcome::Auxiliary,
        _ => DecodeOutcome::Ignored,
    }
}

//==================================================================================Encoder

/// Byte set selected by the controller for the command frames: the module
/// expects a distinct profile during its first second of charging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxProfile {
    /// Just after charge enable; carries the rated AC voltage.
    Startup,
    /// Steady-state charging.
    Normal,
}

/// Encode the per-module setpoint frame (0x42C + id * 0x10), carrying the
/// AC current target.
pub fn encode_setpoint(config: &Config, module_id: u8, profile: TxProfile) -> Frame {
    let raw_current = round_u16(config.current_ac_a * SETPOINT_COUNTS_PER_AMP);

    let mut data = [0u8; 8];
    data[0] = 0x42;
    data[2] = (raw_current & 0x00FF) as u8;
    data[3] = (raw_current >> 8) as u8;

    match profile {
        TxProfile::Normal => {
            data[1] = 0xBB;
            // 0xFE keeps the module running; 0xFF would clear latched faults.
            data[4] = 0xFE;
        }
        TxProfile::Startup => {
            data[1] = round_u8(config.rated_voltage_ac_v / STARTUP_RATED_VOLTAGE_DIVISOR);
            data[4] = 0x64;
        }
    }

    Frame {
        id: ID_SETPOINT + module_id as u32 * TX_ID_STRIDE,
        len: 8,
        data,
    }
}

/// Encode the 0x45C broadcast frame carrying the DC voltage target.
pub fn encode_broadcast(config: &Config, profile: TxProfile) -> Frame {
    let raw_voltage = round_u16(config.voltage_dc_v * BROADCAST_COUNTS_PER_VOLT);

    let mut data = [0u8; 8];
    data[0] = (raw_voltage & 0x00FF) as u8;
    data[1] = (raw_voltage >> 8) as u8;
    data[2] = 0x14;
    data[3] = match profile {
        TxProfile::Normal => 0x2E,
        TxProfile::Startup => 0x0E,
    };
    data[6] = 0x90;
    data[7] = 0x8C;

    Frame {
        id: ID_BROADCAST,
        len: 8,
        data,
    }
}

/// Encode the fixed 0x368 frame.
pub fn encode_static() -> Frame {
    Frame {
        id: ID_STATIC,
        len: 8,
        data: STATIC_FRAME_PAYLOAD,
    }
}

// Float casts saturate, so negative inputs land on zero.
fn round_u16(value: f32) -> u16 {
    (value + 0.5) as u16
}

fn round_u8(value: f32) -> u8 {
    (value + 0.5) as u8
}
