//! State machine driving one GEN3 phase module: configuration validation,
//! power sequencing, periodic command transmission, and fault detection
//! with automatic recovery.
//!
//! The controller is synchronous and run-to-completion: one [`step`] call
//! per tick advances it, and RX ingestion plus TX draining happen on the
//! same logical tick. A charger with several modules owns one instance per
//! module and disables the broadcast frame on all but one of them.
//!
//! [`step`]: PhaseModule::step
use crate::core::{
    Config, Vars, BOOT_DELAY_MS, CAN_RX_TIMEOUT_MS, CAN_TX_PERIOD_MS, FAULT_RECOVERY_TIME_MS,
    HOLD_START_TIME_MS, MIN_VOLTAGE_DC_V, MODULE_COUNT,
};
use crate::diag::Report;
use crate::protocol::can_frame::Frame;
use crate::protocol::codec::{self, DecodeOutcome, TxProfile};
use crate::protocol::io::{RxMonitor, TxStack};

//==================================================================================Events and states

/// Event reported by one [`PhaseModule::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Nothing happened this tick.
    None,
    /// Configuration validation failed; charging cannot start.
    ConfigInvalid,
    /// Module power output was switched on.
    PowerOn,
    /// Charging mode was enabled.
    ChargeEnabled,
    /// A fault was detected; outputs dropped.
    Fault,
    /// Automatic recovery attempt after a fault cooldown.
    Recovery,
}

/// Controller state. Exhaustive by construction; there is no undefined
/// state to guard against at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Awaiting a valid configuration.
    Config,
    /// Powering and initializing the module.
    Boot,
    /// Fully operational, transmitting commands and watching telemetry.
    Running,
    /// Outputs dropped, waiting out the recovery cooldown.
    Fault,
}

/// Reason recorded for the most recent fault transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultCause {
    None,
    /// The module went silent for longer than the RX timeout.
    RxTimeout,
    /// The module itself raised its fault flag.
    FaultFlag,
}

//==================================================================================PhaseModule

/// Logical controller for one phase module. Caller-owned; a charger board
/// carries up to three.
#[derive(Debug)]
pub struct PhaseModule {
    pub(crate) id: u8,
    pub(crate) state: State,
    /// General purpose timer for state transitions and timeouts.
    timer_ms: u32,
    fault_cause: FaultCause,
    /// Keeps the startup TX profile for the first second of charging.
    hold_start: bool,
    /// Module power control output (3.3 V logic).
    pub(crate) pwron_out: bool,
    /// AC to HVDC charge enable output (3.3 V logic).
    pub(crate) chgen_out: bool,
    tx: TxStack,
    rx: RxMonitor,
    config: Config,
    pub(crate) vars: Vars,
}

impl PhaseModule {
    /// Create the controller for module `id`.
    ///
    /// Panics when `id` is not one of the three module slots; that is a
    /// wiring error in the integration, not a runtime condition.
    pub fn new(id: u8) -> Self {
        assert!(id < MODULE_COUNT);
        Self {
            id,
            state: State::Config,
            timer_ms: 0,
            fault_cause: FaultCause::None,
            hold_start: true,
            pwron_out: false,
            chgen_out: false,
            tx: TxStack::new(),
            rx: RxMonitor::new(),
            config: Config::default(),
            vars: Vars::default(),
        }
    }

    /// Apply a new configuration. May be called at any time; it takes
    /// effect at the next validation or TX cycle.
    ///
    /// The DC voltage target is clamped to the supported floor.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        if self.config.voltage_dc_v < MIN_VOLTAGE_DC_V {
            self.config.voltage_dc_v = MIN_VOLTAGE_DC_V;
        }
    }

    /// State of the module power output. Map to a real output pin.
    pub fn pwron_pin_state(&self) -> bool {
        self.pwron_out
    }

    /// State of the charge enable output. Map to a real output pin.
    pub fn chgen_pin_state(&self) -> bool {
        self.chgen_out
    }

    /// Current controller state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Reason for the most recent fault transition.
    pub fn fault_cause(&self) -> FaultCause {
        self.fault_cause
    }

    /// Enable or disable transmission of the 0x45C broadcast frame. With
    /// several modules on one bus, leave it enabled on exactly one.
    pub fn set_broadcast(&mut self, enabled: bool) {
        self.tx.enable_broadcast = enabled;
    }

    /// Pop the next queued TX frame, most recently encoded first. The
    /// caller puts it on the bus; `None` once the batch is drained.
    pub fn get_tx_frame(&mut self) -> Option<Frame> {
        self.tx.pop()
    }

    /// Consume one received frame. Telemetry is decoded immediately;
    /// unrecognized identifiers are silently ignored. Always returns true:
    /// there is no internal limit on consumption.
    pub fn put_rx_frame(&mut self, frame: &Frame) -> bool {
        match codec::decode_frame(&mut self.vars, self.id, frame) {
            DecodeOutcome::Ignored => {}
            DecodeOutcome::Auxiliary => self.rx.note_frame(None),
            DecodeOutcome::Telemetry(group) => self.rx.note_frame(Some(group)),
        }
        true
    }

    /// Borrow the decoded telemetry, available once every telemetry group
    /// has reported and the data is still fresh.
    pub fn read_vars(&self) -> Option<&Vars> {
        if self.rx.has_frames() {
            Some(&self.vars)
        } else {
            None
        }
    }

    /// Borrow a fixed-width diagnostic report of the current state.
    pub fn report(&self) -> Report<'_> {
        Report::new(self)
    }

    //==============================================================================Step

    /// Advance the state machine by `delta_time_ms` elapsed milliseconds.
    pub fn step(&mut self, delta_time_ms: u32) -> Event {
        match self.state {
            State::Config => self.step_config(),
            State::Boot => self.step_boot(delta_time_ms),
            State::Running => self.step_running(delta_time_ms),
            State::Fault => self.step_fault(delta_time_ms),
        }
    }

    fn step_config(&mut self) -> Event {
        // Validate before anything is powered.
        if self.config.rated_voltage_ac_v <= 0.0 || self.config.voltage_dc_v < MIN_VOLTAGE_DC_V {
            return Event::ConfigInvalid;
        }

        self.pwron_out = true;
        self.timer_ms = 0;
        self.tx.timer_ms = 0;
        self.state = State::Boot;

        #[cfg(feature = "defmt")]
        defmt::info!("module {}: powered on", self.id);

        Event::PowerOn
    }

    fn step_boot(&mut self, delta_time_ms: u32) -> Event {
        self.timer_ms += delta_time_ms;
        self.tx.timer_ms += delta_time_ms;

        if self.timer_ms < BOOT_DELAY_MS {
            return Event::None;
        }

        self.chgen_out = true;
        self.rx.restart();
        self.timer_ms = 0;
        self.hold_start = true;
        self.state = State::Running;

        #[cfg(feature = "defmt")]
        defmt::info!("module {}: charge enabled", self.id);

        Event::ChargeEnabled
    }

    fn step_running(&mut self, delta_time_ms: u32) -> Event {
        self.timer_ms += delta_time_ms;
        if self.timer_ms > HOLD_START_TIME_MS {
            // One-shot: stays latched until charging restarts.
            self.hold_start = false;
        }

        self.tx.timer_ms += delta_time_ms;
        self.rx.timer_ms += delta_time_ms;

        if self.tx.timer_ms >= CAN_TX_PERIOD_MS {
            // Subtract rather than reset so irregular ticks keep the
            // long-run transmission period.
            self.tx.timer_ms -= CAN_TX_PERIOD_MS;
            self.queue_tx();
        }

        if let Some(cause) = self.detect_charge_errors() {
            self.fault_cause = cause;
            self.pwron_out = false;
            self.chgen_out = false;
            self.tx.clear();
            self.timer_ms = 0;
            self.state = State::Fault;

            #[cfg(feature = "defmt")]
            defmt::warn!("module {}: fault, cause {}", self.id, cause);

            return Event::Fault;
        }

        Event::None
    }

    fn step_fault(&mut self, delta_time_ms: u32) -> Event {
        self.timer_ms += delta_time_ms;

        if self.timer_ms < FAULT_RECOVERY_TIME_MS {
            return Event::None;
        }

        self.rx.invalidate();
        self.state = State::Config;

        #[cfg(feature = "defmt")]
        defmt::info!("module {}: attempting recovery", self.id);

        Event::Recovery
    }

    //==============================================================================Internals

    /// Re-encode the outbound batch, discarding frames not yet drained.
    fn queue_tx(&mut self) {
        let profile = if self.hold_start {
            TxProfile::Startup
        } else {
            TxProfile::Normal
        };

        self.tx.clear();
        self.tx.push(codec::encode_setpoint(&self.config, self.id, profile));
        if self.tx.enable_broadcast {
            self.tx.push(codec::encode_broadcast(&self.config, profile));
            self.tx.push(codec::encode_static());
        }
    }

    /// Charge-time fault checks, in priority order. Silence outranks the
    /// module's own fault flag: stale telemetry must not drive the second
    /// check, so the first one drops freshness as it trips.
    fn detect_charge_errors(&mut self) -> Option<FaultCause> {
        if self.rx.timer_ms >= CAN_RX_TIMEOUT_MS {
            self.rx.mark_stale();
            return Some(FaultCause::RxTimeout);
        }
        if self.rx.has_frames() && self.vars.fault {
            return Some(FaultCause::FaultFlag);
        }
        None
    }
}
