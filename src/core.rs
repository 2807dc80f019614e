//! Data types shared between the controller, the codec, and the diagnostic
//! layer: operator-supplied targets, decoded module telemetry, and the
//! timing constants of the module protocol.

//==================================================================================Constants

/// Period of command frame transmission (milliseconds).
pub const CAN_TX_PERIOD_MS: u32 = 90;

/// RX silence longer than this is treated as a communication fault (ms).
pub const CAN_RX_TIMEOUT_MS: u32 = 1000;

/// Settling delay between powering the module and enabling charge (ms).
pub const BOOT_DELAY_MS: u32 = 1000;

/// Cooldown before an automatic recovery attempt out of a fault (ms).
pub const FAULT_RECOVERY_TIME_MS: u32 = 1000;

/// Time after charge enable during which the startup TX profile is kept (ms).
pub const HOLD_START_TIME_MS: u32 = 1000;

/// A GEN3 charger board carries up to three phase modules.
pub const MODULE_COUNT: u8 = 3;

/// Floor for the DC voltage target (V); `set_config` clamps below this.
pub const MIN_VOLTAGE_DC_V: f32 = 250.0;

//==================================================================================Config

/// Operator-supplied targets for one phase module.
///
/// Applied with [`crate::controller::PhaseModule::set_config`]; a valid
/// configuration is what releases the controller out of its initial state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Target DC output voltage (V).
    pub voltage_dc_v: f32,
    /// Target AC input current (A).
    pub current_ac_a: f32,
    /// Rated AC input voltage, e.g. 230 for EU mains (V).
    pub rated_voltage_ac_v: f32,
}

//==================================================================================Vars

/// Module measurements and health, decoded incrementally from telemetry
/// frames. Fields are updated one group at a time as frames arrive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vars {
    /// Measured DC output voltage (V).
    pub voltage_dc_v: f32,
    /// Measured AC input voltage, one raw byte off the wire (V).
    pub voltage_ac_v: u16,
    /// Measured DC output current (A).
    pub current_dc_a: f32,
    /// Measured AC input current (A).
    pub current_ac_a: f32,
    /// Temperature sensor 1 reading (C).
    pub temp1_c: i16,
    /// Temperature sensor 2 reading (C).
    pub temp2_c: i16,
    /// Target inlet coolant temperature (C).
    pub inlet_target_temp_c: i16,
    /// Current limit imposed by module thermals (A).
    pub current_limit_due_temp_a: f32,
    /// AC input voltage is present.
    pub ac_present: bool,
    /// Module enable signal is present.
    pub en_present: bool,
    /// Module reports an internal fault.
    pub fault: bool,
    /// Raw status byte, see [`StatusFlag`].
    pub status: u8,
}

impl Vars {
    /// Check one bit of the raw status byte.
    pub fn status_flag(&self, flag: StatusFlag) -> bool {
        (self.status & flag as u8) != 0
    }
}

//==================================================================================StatusFlag

/// Bit positions of the raw status byte carried by the status telemetry
/// group. Most bits remain unidentified; the names record what capture
/// sessions showed so far.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusFlag {
    /// Module enable.
    En = 0x01,
    Unknown2 = 0x02,
    Unknown3 = 0x04,
    Unknown4 = 0x08,
    Unknown5 = 0x10,
    Unknown6 = 0x20,
    /// Possibly "ready to start AC->DC conversion".
    Unknown7 = 0x40,
    /// Toggles a few times when no HVDC is present, settling at 0.
    Unknown8 = 0x80,
}
