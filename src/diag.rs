//! Fixed-width text report of a controller's externally visible state,
//! rendered through `core::fmt` so it works on hosts and deeply embedded
//! targets alike.
use crate::controller::{PhaseModule, State};
use core::fmt::{self, Display, Formatter};

/// Four-line, column-aligned snapshot of one controller. Obtained from
/// [`PhaseModule::report`]; renders raw state even before the telemetry
/// set is complete.
pub struct Report<'a> {
    module: &'a PhaseModule,
}

impl<'a> Report<'a> {
    pub(crate) fn new(module: &'a PhaseModule) -> Self {
        Self { module }
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let m = self.module;
        let v = &m.vars;

        let pwron = if m.pwron_out { "ON" } else { "OFF" };
        let chgen = if m.chgen_out { "EN" } else { "DIS" };
        let state = match m.state {
            State::Config => "CFG",
            State::Boot => "BOOT",
            State::Running => "RUN",
            State::Fault => "FLT",
        };

        writeln!(
            f,
            "|ID:{}       |Pwr:{:<3}  |Chg:{:<3}    |State:{:<4} |",
            m.id, pwron, chgen, state
        )?;
        writeln!(
            f,
            "|V-DC:{:5.1}V|V-AC:{:3}V|I-DC:{:5.1}A|I-AC:{:4.1}A|",
            v.voltage_dc_v, v.voltage_ac_v, v.current_dc_a, v.current_ac_a
        )?;
        writeln!(
            f,
            "|T1:{:+4}C   |T2:{:+4}C |Tgt:{:+4}C  |Lim:{:5.1}A|",
            v.temp1_c, v.temp2_c, v.inlet_target_temp_c, v.current_limit_due_temp_a
        )?;
        write!(
            f,
            "|AC:{}       |EN:{}     |FLT:{}      |Status:0x{:02X}|",
            yn(v.ac_present),
            yn(v.en_present),
            yn(v.fault),
            v.status
        )
    }
}

fn yn(value: bool) -> char {
    if value {
        'Y'
    } else {
        'N'
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vars;
    use core::fmt::Write;

    /// Stack-backed sink, since the crate links no allocator.
    struct Buf {
        data: [u8; 256],
        len: usize,
    }

    impl Buf {
        fn new() -> Self {
            Self {
                data: [0; 256],
                len: 0,
            }
        }

        fn as_str(&self) -> &str {
            core::str::from_utf8(&self.data[..self.len]).unwrap()
        }
    }

    impl Write for Buf {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let bytes = s.as_bytes();
            if self.len + bytes.len() > self.data.len() {
                return Err(fmt::Error);
            }
            self.data[self.len..self.len + bytes.len()].copy_from_slice(bytes);
            self.len += bytes.len();
            Ok(())
        }
    }

    #[test]
    fn report_layout_is_fixed_width() {
        let mut module = PhaseModule::new(1);
        module.state = State::Running;
        module.pwron_out = true;
        module.chgen_out = true;
        module.vars = Vars {
            voltage_dc_v: 347.5,
            voltage_ac_v: 230,
            current_dc_a: 0.0,
            current_ac_a: 3.5,
            temp1_c: 20,
            temp2_c: 25,
            inlet_target_temp_c: -40,
            current_limit_due_temp_a: 15.9375,
            ac_present: true,
            en_present: true,
            fault: false,
            status: 0x02,
        };

        let mut buf = Buf::new();
        write!(buf, "{}", module.report()).unwrap();

        let expected = "|ID:1       |Pwr:ON   |Chg:EN     |State:RUN  |\n\
                        |V-DC:347.5V|V-AC:230V|I-DC:  0.0A|I-AC: 3.5A|\n\
                        |T1: +20C   |T2: +25C |Tgt: -40C  |Lim: 15.9A|\n\
                        |AC:Y       |EN:Y     |FLT:N      |Status:0x02|";
        assert_eq!(buf.as_str(), expected);
    }

    #[test]
    fn report_renders_before_any_telemetry() {
        let module = PhaseModule::new(0);

        let mut buf = Buf::new();
        write!(buf, "{}", module.report()).unwrap();

        let first_line = buf.as_str().lines().next().unwrap();
        assert_eq!(
            first_line,
            "|ID:0       |Pwr:OFF  |Chg:DIS    |State:CFG  |"
        );
    }
}
