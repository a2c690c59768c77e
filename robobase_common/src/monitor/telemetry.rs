//! Host telemetry stream frames.
//!
//! Frames are fixed-width, fields in declared order, little-endian, with no
//! padding. The `repr(C)` structs mirror the wire layout one-to-one and the
//! size assertions below keep them honest.

use static_assertions::const_assert_eq;
use thiserror::Error;

use super::flags::{ErrorFlags, FaultFlags};

/// Stream identifiers on the host link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StreamId {
    Status = 1,
    Analog = 2,
    Motion = 3,
}

/// Frame encoding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("buffer too small for {stream:?} frame: need {needed} bytes, have {available}")]
    BufferTooSmall {
        stream: StreamId,
        needed: usize,
        available: usize,
    },
}

/// A telemetry frame with a fixed wire size.
pub trait StreamFrame {
    const STREAM_ID: StreamId;
    const WIRE_SIZE: usize;

    /// Write the frame fields in wire order.
    fn write_fields(&self, w: &mut FieldWriter<'_>);

    /// Encode into `buf`, returning the number of bytes written.
    fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        if buf.len() < Self::WIRE_SIZE {
            return Err(FrameError::BufferTooSmall {
                stream: Self::STREAM_ID,
                needed: Self::WIRE_SIZE,
                available: buf.len(),
            });
        }
        let mut w = FieldWriter {
            buf: &mut buf[..Self::WIRE_SIZE],
            pos: 0,
        };
        self.write_fields(&mut w);
        debug_assert_eq!(w.pos, Self::WIRE_SIZE);
        Ok(w.pos)
    }
}

/// Sequential little-endian field writer over a pre-sized buffer.
pub struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl FieldWriter<'_> {
    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    #[inline]
    pub fn put_u16(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    #[inline]
    pub fn put_u32(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }

    #[inline]
    pub fn put_i16(&mut self, v: i16) {
        self.put(&v.to_le_bytes());
    }

    #[inline]
    pub fn put_i16_slice(&mut self, vs: &[i16]) {
        for &v in vs {
            self.put_i16(v);
        }
    }
}

// ─── Status (id=1) ──────────────────────────────────────────────────

/// Mirror of both safety registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct StatusFrame {
    pub error_flags: u32,
    pub fault_flags: u32,
}

const_assert_eq!(core::mem::size_of::<StatusFrame>(), 8);

impl StatusFrame {
    pub const fn new(errors: ErrorFlags, faults: FaultFlags) -> Self {
        Self {
            error_flags: errors.bits(),
            fault_flags: faults.bits(),
        }
    }
}

impl StreamFrame for StatusFrame {
    const STREAM_ID: StreamId = StreamId::Status;
    const WIRE_SIZE: usize = 8;

    fn write_fields(&self, w: &mut FieldWriter<'_>) {
        w.put_u32(self.error_flags);
        w.put_u32(self.fault_flags);
    }
}

// ─── Analog (id=2) ──────────────────────────────────────────────────

/// DC bus voltage and dribble motor current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct AnalogFrame {
    /// DC bus voltage [mV].
    pub dc_bus_voltage: u16,
    /// Dribble motor current [mA].
    pub dribble_current: u16,
}

const_assert_eq!(core::mem::size_of::<AnalogFrame>(), 4);

impl AnalogFrame {
    /// Build from raw readings, clamping into the 16-bit wire range.
    pub fn from_readings(dc_bus_voltage_mv: i32, dribble_current_ma: i32) -> Self {
        Self {
            dc_bus_voltage: dc_bus_voltage_mv.clamp(0, u16::MAX as i32) as u16,
            dribble_current: dribble_current_ma.clamp(0, u16::MAX as i32) as u16,
        }
    }
}

impl StreamFrame for AnalogFrame {
    const STREAM_ID: StreamId = StreamId::Analog;
    const WIRE_SIZE: usize = 4;

    fn write_fields(&self, w: &mut FieldWriter<'_>) {
        w.put_u16(self.dc_bus_voltage);
        w.put_u16(self.dribble_current);
    }
}

// ─── Motion (id=3) ──────────────────────────────────────────────────

/// Per-tick motion snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct MotionFrame {
    /// Tick processing time, saturated at `u16::MAX`.
    pub performance_counter: u16,
    pub accelerometer: [i16; 3],
    pub gyroscope: [i16; 3],
    pub encoder_pulse_count: [i16; 4],
    pub motor_current_d: [i16; 4],
    pub motor_current_q: [i16; 4],
    pub motor_current_ref_q: [i16; 4],
    pub motor_power_5: i16,
}

const_assert_eq!(core::mem::size_of::<MotionFrame>(), 48);

impl StreamFrame for MotionFrame {
    const STREAM_ID: StreamId = StreamId::Motion;
    const WIRE_SIZE: usize = 48;

    fn write_fields(&self, w: &mut FieldWriter<'_>) {
        w.put_u16(self.performance_counter);
        w.put_i16_slice(&self.accelerometer);
        w.put_i16_slice(&self.gyroscope);
        w.put_i16_slice(&self.encoder_pulse_count);
        w.put_i16_slice(&self.motor_current_d);
        w.put_i16_slice(&self.motor_current_q);
        w.put_i16_slice(&self.motor_current_ref_q);
        w.put_i16(self.motor_power_5);
    }
}
