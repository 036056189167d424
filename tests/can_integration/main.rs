//! CAN integration test module
//!
//! End-to-end tests that drive the annotator with `embedded-can` frames:
//! - `registry_integration`: a scripted drive cycle annotated frame by frame
//! - `dbc_conformance`: the schema parser checked against `dbc-rs`

mod dbc_conformance;
mod registry_integration;

use dbc_annotate::bits::deposit_bits;
use embedded_can::{ExtendedId, Frame, Id, StandardId};

/// Fixed-size classic CAN frame.
#[derive(Debug, Clone)]
pub struct MockCanFrame {
    id: Id,
    data: [u8; 8],
    dlc: usize,
}

impl MockCanFrame {
    pub fn new_standard(id: u16, data: &[u8]) -> Self {
        Self::with_id(Id::Standard(StandardId::new(id).unwrap()), data)
    }

    pub fn new_extended(id: u32, data: &[u8]) -> Self {
        Self::with_id(Id::Extended(ExtendedId::new(id).unwrap()), data)
    }

    fn with_id(id: Id, data: &[u8]) -> Self {
        let dlc = data.len().min(8);
        let mut bytes = [0u8; 8];
        bytes[..dlc].copy_from_slice(&data[..dlc]);
        Self { id, data: bytes, dlc }
    }
}

impl Frame for MockCanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        (data.len() <= 8).then(|| Self::with_id(id.into(), data))
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        (dlc <= 8).then(|| Self {
            id: id.into(),
            data: [0u8; 8],
            dlc,
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    fn data(&self) -> &[u8] {
        &self.data[..self.dlc]
    }
}

/// Bus-visible state of the simulated vehicle at one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSample {
    pub rpm: f64,
    pub speed: f64,
    pub coolant_temp: f64,
    /// 0=Park, 3=Drive
    pub gear: u8,
    pub odometer: f64,
}

impl VehicleSample {
    /// Raw values placed at the bit positions `VEHICLE_DBC` declares.
    fn pack(fields: &[(u16, u16, u64)]) -> [u8; 8] {
        let mut payload = [0u8; 8];
        for &(start_bit, bit_length, raw) in fields {
            deposit_bits(&mut payload, start_bit, bit_length, raw).unwrap();
        }
        payload
    }

    /// One frame per message of `VEHICLE_DBC`.
    pub fn frames(&self) -> [MockCanFrame; 4] {
        let rpm_raw = (self.rpm / 0.25) as u64;
        let temp_raw = (self.coolant_temp + 40.0) as u64;
        let speed_raw = (self.speed / 0.01) as u64;
        let odometer_raw = (self.odometer * 10.0) as u64;
        [
            MockCanFrame::new_standard(0x100, &Self::pack(&[(0, 16, rpm_raw), (16, 8, temp_raw)])),
            MockCanFrame::new_standard(0x200, &Self::pack(&[(0, 16, speed_raw)])),
            MockCanFrame::new_standard(0x300, &Self::pack(&[(0, 8, self.gear as u64)])),
            MockCanFrame::new_extended(0x18FE_F100, &Self::pack(&[(0, 32, odometer_raw)])),
        ]
    }
}

/// Idle in Park, shift to Drive, then accelerate linearly.
pub fn drive_cycle(samples: usize) -> Vec<VehicleSample> {
    (0..samples)
        .map(|i| {
            let t = i as f64;
            let driving = i >= samples / 4;
            let speed = if driving { (t - (samples / 4) as f64) * 0.75 } else { 0.0 };
            VehicleSample {
                rpm: 800.0 + speed * 30.0,
                speed,
                coolant_temp: (20.0 + t * 0.5).min(90.0),
                gear: if driving { 3 } else { 0 },
                odometer: 1200.0 + t * 0.1,
            }
        })
        .collect()
}

/// DBC definition for the simulated vehicle. `Diagnostics` uses an extended
/// identifier, declared with bit 31 set (0x18FEF100 | 0x80000000).
pub const VEHICLE_DBC: &str = r#"VERSION "1.0"

NS_ :
    CM_
    BA_DEF_
    VAL_

BS_:

BU_: ECM TCM VCU

BO_ 256 Engine: 8 ECM
 SG_ RPM : 0|16@1+ (0.25,0) [0|8000] "rpm" Vector__XXX
 SG_ CoolantTemp : 16|8@1+ (1,-40) [-40|215] "degC" Vector__XXX

BO_ 512 Vehicle: 8 VCU
 SG_ Speed : 0|16@1+ (0.01,0) [0|300] "km/h" Vector__XXX

BO_ 768 Transmission: 8 TCM
 SG_ GearPosition : 0|8@1+ (1,0) [0|5] "" Vector__XXX

BO_ 2566844672 Diagnostics: 8 ECM
 SG_ Odometer : 0|32@1+ (0.1,0) [0|0] "km" Vector__XXX

CM_ BO_ 256 "Engine status";
CM_ SG_ 256 RPM "Crankshaft speed";
VAL_ 768 GearPosition 0 "Park" 1 "Reverse" 2 "Neutral" 3 "Drive" 4 "Sport" ;
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_can_frame() {
        let frame = MockCanFrame::new_standard(0x100, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(frame.is_standard());
        assert_eq!(frame.dlc(), 8);
        assert_eq!(frame.data(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        let extended = MockCanFrame::new_extended(0x18FE_F100, &[0; 8]);
        assert!(extended.is_extended());
        assert!(MockCanFrame::new(StandardId::ZERO, &[0; 9]).is_none());
    }

    #[test]
    fn test_drive_cycle_shifts_and_accelerates() {
        let cycle = drive_cycle(100);
        assert_eq!(cycle[0].gear, 0);
        assert_eq!(cycle[0].speed, 0.0);
        assert_eq!(cycle[99].gear, 3);
        assert!(cycle[99].speed > cycle[50].speed);
        assert!(cycle.iter().all(|s| s.rpm <= 8000.0 && s.speed <= 300.0));
    }

    #[test]
    fn test_packed_fields_land_at_the_end_of_the_payload() {
        let payload = VehicleSample::pack(&[(0, 16, 0x0C80)]);
        assert_eq!(payload, [0, 0, 0, 0, 0, 0, 0x0C, 0x80]);
    }
}
