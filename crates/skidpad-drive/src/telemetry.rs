//! Per-frame CSV telemetry.
//!
//! The column schema is declared once; the header and the row formatter are
//! both generated from it so they cannot drift apart.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use glam::{EulerRot, Quat, Vec3};
use skidpad::RaceState;

/// Everything written for one frame.
#[derive(Clone, Debug, Default)]
pub struct TelemetrySnapshot {
    pub frame: u64,
    pub elapsed: f64,
    pub dt: f32,
    pub throttle: f32,
    pub turn: f32,
    pub boost: bool,
    pub brake: bool,
    pub position: Vec3,
    pub rotation: Quat,
    pub speed: f32,
    pub upside_down_ratio: f32,
    pub stopped: bool,
    pub stuck: bool,
    pub in_contact: [bool; 4],
    pub suspension_length: [f32; 4],
    pub race_state: RaceState,
    pub reached: usize,
    pub race_time: f32,
}

/// Destination for telemetry lines.
pub trait TelemetryOutput {
    /// Write the CSV header.
    fn write_header(&mut self, header: &str) -> io::Result<()>;
    /// Write a data row.
    fn write_row(&mut self, row: &str) -> io::Result<()>;
    /// Push buffered lines to their destination.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Buffered CSV file.
pub struct FileTelemetryOutput {
    writer: BufWriter<File>,
}

impl FileTelemetryOutput {
    /// Create (or truncate) the CSV file.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl TelemetryOutput for FileTelemetryOutput {
    fn write_header(&mut self, header: &str) -> io::Result<()> {
        writeln!(self.writer, "{header}")
    }

    fn write_row(&mut self, row: &str) -> io::Result<()> {
        writeln!(self.writer, "{row}")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// In-memory lines, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct VecTelemetryOutput {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl TelemetryOutput for VecTelemetryOutput {
    fn write_header(&mut self, header: &str) -> io::Result<()> {
        self.lines.push(header.to_owned());
        Ok(())
    }

    fn write_row(&mut self, row: &str) -> io::Result<()> {
        self.lines.push(row.to_owned());
        Ok(())
    }
}

fn state_code(state: RaceState) -> u8 {
    match state {
        RaceState::Idle => 0,
        RaceState::Countdown => 1,
        RaceState::Running => 2,
        RaceState::Finished => 3,
    }
}

/// Generates `write_header` and `write_row` from one column list.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        prelude: |$snapshot:ident| { $( $prelude:stmt );* $(;)? },
        row_values: { $( $val:expr ),* $(,)? }
    ) => {
        /// CSV header string.
        const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );

        /// Write the header line.
        pub fn write_header(output: &mut dyn TelemetryOutput) -> io::Result<()> {
            output.write_header(CSV_HEADER.trim_end_matches(','))
        }

        /// Write one frame.
        pub fn write_row($snapshot: &TelemetrySnapshot, output: &mut dyn TelemetryOutput) -> io::Result<()> {
            $( $prelude )*

            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            output.write_row(line.trim_end_matches(','))
        }
    };
}

define_telemetry! {
    columns: {
        frame: "{}",
        t: "{:.4}",
        dt: "{:.5}",
        throttle: "{:.1}",
        turn: "{:.1}",
        boost: "{}",
        brake: "{}",
        pos_x: "{:.3}",
        pos_y: "{:.3}",
        pos_z: "{:.3}",
        yaw_deg: "{:.2}",
        pitch_deg: "{:.2}",
        roll_deg: "{:.2}",
        speed: "{:.3}",
        upside_down: "{:.3}",
        stopped: "{}",
        stuck: "{}",
        contact_fr: "{}",
        contact_rr: "{}",
        contact_fl: "{}",
        contact_rl: "{}",
        susp_fr: "{:.4}",
        susp_rr: "{:.4}",
        susp_fl: "{:.4}",
        susp_rl: "{:.4}",
        race_state: "{}",
        reached: "{}",
        race_time: "{:.3}",
    },
    prelude: |s| {
        let (yaw, pitch, roll) = s.rotation.to_euler(EulerRot::YXZ);
    },
    row_values: {
        s.frame,
        s.elapsed,
        s.dt,
        s.throttle,
        s.turn,
        u8::from(s.boost),
        u8::from(s.brake),
        s.position.x,
        s.position.y,
        s.position.z,
        yaw.to_degrees(),
        pitch.to_degrees(),
        roll.to_degrees(),
        s.speed,
        s.upside_down_ratio,
        u8::from(s.stopped),
        u8::from(s.stuck),
        u8::from(s.in_contact[0]),
        u8::from(s.in_contact[1]),
        u8::from(s.in_contact[2]),
        u8::from(s.in_contact[3]),
        s.suspension_length[0],
        s.suspension_length[1],
        s.suspension_length[2],
        s.suspension_length[3],
        state_code(s.race_state),
        s.reached,
        s.race_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_row_have_same_column_count() {
        let mut out = VecTelemetryOutput::default();
        write_header(&mut out).unwrap();
        let snapshot = TelemetrySnapshot {
            frame: 3,
            in_contact: [true, true, false, true],
            race_state: RaceState::Running,
            ..TelemetrySnapshot::default()
        };
        write_row(&snapshot, &mut out).unwrap();

        assert_eq!(out.lines.len(), 2);
        let header: Vec<_> = out.lines[0].split(',').collect();
        let row: Vec<_> = out.lines[1].split(',').collect();
        assert_eq!(header.len(), row.len());
        assert_eq!(header[0], "frame");
        assert_eq!(row[0], "3");

        let column = |name: &str| header.iter().position(|h| *h == name).unwrap();
        assert_eq!(row[column("contact_fl")], "0");
        assert_eq!(row[column("race_state")], "2");
    }
}
