//! End-to-end integration test: embedded-can frames -> Registry -> Annotations

use dbc_annotate::{EXTENDED_ID_FLAG, Frame as LogFrame, Registry, Result, SchemaDocument};
use embedded_can::{ExtendedId, Frame, StandardId};

use super::{MockCanFrame, VEHICLE_DBC, drive_cycle};

fn vehicle_registry() -> Result<Registry> {
    Ok(Registry::new(SchemaDocument::parse(VEHICLE_DBC)?))
}

#[test]
fn end_to_end_can_to_annotation() -> Result<()> {
    let registry = vehicle_registry()?;
    assert_eq!(
        registry.ids().collect::<Vec<_>>(),
        vec![256, 512, 768, 0x18FE_F100 | EXTENDED_ID_FLAG]
    );

    let cycle = drive_cycle(200);
    for sample in &cycle {
        let [engine, vehicle, transmission, diagnostics] = sample.frames();

        let annotation = registry.annotate_can_frame(&engine).expect("Engine");
        assert!(annotation.errors().next().is_none(), "{annotation}");
        let rpm = annotation.field("RPM").unwrap().as_ref().unwrap();
        assert!((rpm.physical - sample.rpm).abs() <= 0.25);
        assert!(rpm.value.ends_with(" rpm"));
        let temp = annotation.field("CoolantTemp").unwrap().as_ref().unwrap();
        assert!((temp.physical - sample.coolant_temp).abs() <= 1.0);

        let annotation = registry.annotate_can_frame(&vehicle).expect("Vehicle");
        let speed = annotation.field("Speed").unwrap().as_ref().unwrap();
        assert!((speed.physical - sample.speed).abs() <= 0.011);

        let annotation = registry.annotate_can_frame(&transmission).expect("Transmission");
        let gear = annotation.field("GearPosition").unwrap().as_ref().unwrap();
        assert_eq!(gear.physical, sample.gear as f64);
        let expected = if sample.gear == 3 { "Drive" } else { "Park" };
        assert_eq!(gear.label.as_deref(), Some(expected));

        let annotation = registry.annotate_can_frame(&diagnostics).expect("Diagnostics");
        assert_eq!(annotation.from, "ECM");
        let odometer = annotation.field("Odometer").unwrap().as_ref().unwrap();
        assert!((odometer.physical - sample.odometer).abs() <= 0.1);
    }
    Ok(())
}

#[test]
fn extended_frame_matches_flagged_message() -> Result<()> {
    let doc = SchemaDocument::parse(
        "BO_ 2566844672 Diag: 8 ECM\n SG_ Count : 0|8@1+ (1,0) [0|0] \"\" GW\n",
    )?;
    let registry = Registry::new(doc);
    let frame = MockCanFrame::new_extended(0x18FE_F100, &[0, 0, 0, 0, 0, 0, 0, 42]);

    let converted = LogFrame::from_can_frame(&frame);
    assert!(converted.is_extended());
    assert_eq!(converted.raw_id(), 0x18FE_F100);

    let annotation = registry
        .annotate_can_frame(&frame)
        .expect("extended frame matches its BO_ definition");
    assert_eq!(annotation.code, 2_566_844_672);
    assert_eq!(annotation.value("Count"), Some("42"));

    // The candump rendering of the same frame resolves to the same message
    let logged: LogFrame = "can0 18FEF100 [8] 00 00 00 00 00 00 00 2A".parse()?;
    assert_eq!(registry.annotate(&logged), Some(annotation));

    // An extended frame never matches a standard message with the same raw id
    let unflagged = MockCanFrame::new_extended(0x100, &[0; 8]);
    assert!(vehicle_registry()?.annotate_can_frame(&unflagged).is_none());
    Ok(())
}

#[test]
fn unknown_can_frame_is_skipped() -> Result<()> {
    let registry = vehicle_registry()?;
    let frame = MockCanFrame::new_standard(0x7DF, &[0x02, 0x01, 0x0C]);
    assert!(registry.annotate_can_frame(&frame).is_none());

    let id = ExtendedId::new(0x300).unwrap();
    let frame = MockCanFrame::new(id, &[0; 8]).unwrap();
    assert!(registry.annotate_can_frame(&frame).is_none());
    Ok(())
}

#[test]
fn short_can_frame_reports_per_signal_errors() -> Result<()> {
    let registry = vehicle_registry()?;
    // Only RPM fits into two bytes
    let frame = MockCanFrame::new_standard(0x100, &[0x0C, 0x80]);
    let annotation = registry.annotate_can_frame(&frame).expect("engine message");

    assert_eq!(annotation.value("RPM"), Some("800 rpm"));
    let failed: Vec<&str> = annotation.errors().map(|(name, _)| name).collect();
    assert_eq!(failed, vec!["CoolantTemp"]);
    Ok(())
}

#[test]
fn remote_frame_converts_with_its_dlc() {
    let id = StandardId::new(0x300).unwrap();
    let frame = MockCanFrame::new_remote(id, 4).unwrap();
    let converted = LogFrame::from_can_frame(&frame);
    assert_eq!(converted.id, 0x300);
    assert!(!converted.is_extended());
    assert_eq!(converted.declared_len, 4);
    assert_eq!(converted.data, [0, 0, 0, 0]);
}

#[test]
fn registry_is_shared_across_threads() -> Result<()> {
    let registry = vehicle_registry()?;
    let frames: Vec<MockCanFrame> = drive_cycle(100).iter().flat_map(|s| s.frames()).collect();
    let sequential: Vec<_> = frames
        .iter()
        .map(|f| registry.annotate_can_frame(f))
        .collect();

    let parallel: Vec<Vec<_>> = std::thread::scope(|scope| {
        let handles: Vec<_> = frames
            .chunks(frames.len().div_ceil(4))
            .map(|chunk| {
                let registry = &registry;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|f| registry.annotate_can_frame(f))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(sequential.iter().all(Option::is_some));
    assert_eq!(parallel.concat(), sequential);
    Ok(())
}
