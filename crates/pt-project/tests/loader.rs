use pt_core::{OptionValue, PortRef};
use pt_project::{ProjectError, from_json_str, from_yaml_str, load_yaml};

const SIMPLE: &str = r#"
version: 1
name: simple
output_directory: outputs/simple
number_of_points: 4
components:
  - type: battery_pack
    id: battery_pack_1
    options:
      cell_capacity_ah: 5.0
      number_of_modules: 3
      soc_curve: [1.0, 0.9, 0.8, 0.7]
  - type: auxiliary_load
    id: load_1
    inputs:
      power_demand: 12.5
connections:
  - from: battery_pack_1.dc_voltage_out
    to: auxiliary_load:load_1.dc_voltage_in
"#;

fn malformed_line(err: &ProjectError) -> Option<usize> {
    match err {
        ProjectError::MalformedTopologyFile { context, .. } => context.line,
        other => panic!("expected MalformedTopologyFile, got {other:?}"),
    }
}

#[test]
fn parses_components_and_connections() {
    let topology = from_yaml_str(SIMPLE).unwrap();
    assert_eq!(topology.name, "simple");
    assert_eq!(topology.number_of_points, Some(4));
    assert_eq!(topology.components.len(), 2);

    let battery = &topology.components[0];
    assert_eq!(battery.type_tag, "battery_pack");
    assert_eq!(battery.options.get("cell_capacity_ah"), Some(&OptionValue::Number(5.0)));
    assert_eq!(battery.options.get("number_of_modules"), Some(&OptionValue::Integer(3)));
    assert_eq!(
        battery.options.get("soc_curve").map(OptionValue::cardinality),
        Some(4)
    );

    let connection = &topology.connections[0];
    assert_eq!(connection.from, PortRef::new("battery_pack_1", "dc_voltage_out"));
    assert_eq!(
        connection.to,
        PortRef::qualified("auxiliary_load", "load_1", "dc_voltage_in")
    );
}

#[test]
fn defaults_apply_when_fields_are_omitted() {
    let topology = from_yaml_str("version: 1\nname: empty\n").unwrap();
    assert!(topology.components.is_empty());
    assert!(topology.connections.is_empty());
    assert_eq!(topology.output_directory, std::path::PathBuf::from("outputs"));
    assert_eq!(topology.number_of_points, None);
}

#[test]
fn duplicate_option_key_is_malformed() {
    let text = r#"
version: 1
name: dup
components:
  - type: battery_pack
    id: b1
    options:
      soc_min: 20.0
      soc_min: 30.0
"#;
    let err = from_yaml_str(text).unwrap_err();
    assert!(malformed_line(&err).is_some(), "location should be reported");
    assert!(err.to_string().contains("soc_min"));
}

#[test]
fn duplicate_struct_field_is_malformed() {
    let text = "version: 1\nname: dup\ncomponents:\n  - type: dc_bus\n    id: a\n    id: b\n";
    let err = from_yaml_str(text).unwrap_err();
    assert!(matches!(err, ProjectError::MalformedTopologyFile { .. }));
}

#[test]
fn bad_endpoint_syntax_reports_line() {
    let text = "\
version: 1
name: bad
connections:
  - from: battery_pack_1
    to: load_1.dc_voltage_in
";
    let err = from_yaml_str(text).unwrap_err();
    assert!(matches!(malformed_line(&err), Some(line) if line >= 3));
    assert!(err.to_string().contains("<id>.<port>"));
}

#[test]
fn unknown_field_is_malformed() {
    let text = "\
version: 1
name: typo
components:
  - type: dc_bus
    id: a
    optoins: {}
";
    assert!(matches!(
        from_yaml_str(text),
        Err(ProjectError::MalformedTopologyFile { .. })
    ));
}

#[test]
fn empty_identifier_reports_field() {
    let text = "version: 1\nname: t\ncomponents:\n  - type: dc_bus\n    id: \"\"\n";
    match from_yaml_str(text).unwrap_err() {
        ProjectError::MalformedTopologyFile { context, .. } => {
            assert_eq!(context.field.as_deref(), Some("components[0].id"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn future_version_is_rejected() {
    assert!(matches!(
        from_yaml_str("version: 7\nname: future\n"),
        Err(ProjectError::UnsupportedVersion { version: 7, .. })
    ));
}

#[test]
fn json_input_is_equivalent() {
    let yaml = from_yaml_str(SIMPLE).unwrap();
    let json = serde_json::to_string(&yaml).unwrap();
    assert_eq!(from_json_str(&json).unwrap(), yaml);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_yaml(std::path::Path::new("does/not/exist.yaml")).unwrap_err();
    assert!(matches!(err, ProjectError::Io { .. }));
}
