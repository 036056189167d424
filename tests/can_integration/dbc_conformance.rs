//! Schema parser checked field by field against `dbc-rs`.

use dbc_annotate::{ByteOrder, Result, SchemaDocument};

const CONFORMANCE_DBC: &str = r#"VERSION "1.0"

BU_: ECM TCM BCM

BO_ 100 Powertrain: 8 ECM
 SG_ EngineSpeed : 0|16@1+ (0.25,0) [0|16383.75] "rpm" Vector__XXX
 SG_ Torque : 16|16@1- (0.1,-500) [-500|500] "Nm" Vector__XXX
 SG_ Status : 32|4@1+ (1,0) [0|15] "" Vector__XXX
 SG_ Pedal : 55|8@0+ (0.4,0) [0|100] "%" Vector__XXX

BO_ 200 Gearbox: 4 TCM
 SG_ Gear : 0|3@1+ (1,0) [0|7] "" Vector__XXX
 SG_ OilTemp : 8|8@1- (1,40) [-40|150] "degC" Vector__XXX

BO_ 300 Lights: 2 BCM
 SG_ Beam : 7|2@0+ (1,0) [0|3] "" Vector__XXX
"#;

#[test]
fn schema_matches_dbc_rs() -> Result<()> {
    let reference = dbc_rs::Dbc::parse(CONFORMANCE_DBC).expect("Failed to parse DBC");
    let doc = SchemaDocument::parse(CONFORMANCE_DBC)?;

    assert_eq!(doc.messages().count(), reference.messages().len());

    for expected in reference.messages().iter() {
        let msg = doc
            .message(expected.id())
            .unwrap_or_else(|| panic!("message {} missing", expected.id()));
        assert_eq!(msg.name, expected.name());
        assert_eq!(msg.byte_len, expected.dlc() as u16);
        assert_eq!(msg.origin, expected.sender());
        assert_eq!(msg.signal_count(), expected.signals().iter().count());

        for sig in expected.signals().iter() {
            let ours = msg
                .signal(sig.name())
                .unwrap_or_else(|| panic!("signal {} missing", sig.name()));
            assert_eq!(ours.bit_length, sig.length() as u16, "{}", sig.name());
            assert_eq!(ours.scale, sig.factor(), "{}", sig.name());
            assert_eq!(ours.offset, sig.offset(), "{}", sig.name());
            assert_eq!(ours.min, sig.min(), "{}", sig.name());
            assert_eq!(ours.max, sig.max(), "{}", sig.name());
            assert_eq!(ours.unit, sig.unit().unwrap_or(""), "{}", sig.name());
            assert_eq!(ours.signed, !sig.is_unsigned(), "{}", sig.name());

            let big_endian = sig.byte_order() == dbc_rs::ByteOrder::BigEndian;
            assert_eq!(ours.byte_order == ByteOrder::BigEndian, big_endian, "{}", sig.name());
        }
    }
    Ok(())
}

#[test]
fn node_list_names_every_transmitter() -> Result<()> {
    let doc = SchemaDocument::parse(CONFORMANCE_DBC)?;
    let nodes = doc
        .records()
        .iter()
        .find_map(|record| match record {
            dbc_annotate::Record::List(list) if list.name == "BU_" => Some(list.items.clone()),
            _ => None,
        })
        .expect("BU_ record");
    assert_eq!(nodes, ["ECM", "TCM", "BCM"]);

    // Every transmitter is a declared node
    for msg in doc.messages() {
        assert!(nodes.contains(&msg.origin), "{}", msg.origin);
    }
    Ok(())
}
