use std::path::{Path, PathBuf};

use pt_app::{AppError, AssemblerConfig, EngineHandoff, HandoffStep, assemble_file};
use pt_core::InstanceKey;
use pt_graph::{Assembly, DiagnosticKind};
use pt_registry::TypeRegistry;

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/topologies")
        .join(name)
}

fn assemble(name: &str) -> Assembly {
    assemble_file(&demo(name), &TypeRegistry::builtin(), &AssemblerConfig::default())
        .unwrap_or_else(|e| panic!("{name}: {e}"))
}

fn step_names(handoff: &EngineHandoff) -> Vec<String> {
    handoff
        .steps
        .iter()
        .map(|s| match s {
            HandoffStep::FeedForward { instance } => instance.id.clone(),
            HandoffStep::Equilibrium { cluster } => cluster.clone(),
        })
        .collect()
}

#[test]
fn serial_hybrid_plan() {
    let assembly = assemble("serial_hybrid.yaml");
    let handoff = EngineHandoff::from_assembly(&assembly);
    assert_eq!(
        step_names(&handoff),
        vec![
            "propeller_1",
            "gearbox_1",
            "equilibrium_0",
            "turboshaft_1",
            "fuel_system_1",
            "fuel_tank_1"
        ]
    );
    let members: Vec<_> = handoff.clusters[0].members.iter().map(|k| k.id.as_str()).collect();
    assert_eq!(
        members,
        vec!["motor_1", "inverter_1", "dc_bus_1", "battery_pack_1", "rectifier_1", "generator_1"]
    );

    let sources = assembly.energy_consuming_sources();
    let ids: Vec<_> = sources.iter().map(|s| s.instance.id.as_str()).collect();
    assert_eq!(ids, vec!["battery_pack_1", "turboshaft_1", "fuel_tank_1"]);
    assert_eq!(
        sources[1].consumption_variable.as_deref(),
        Some("data:propulsion:he_power_train:source:turboshaft:turboshaft_1:fuel_consumed_t")
    );
    assert_eq!(sources[2].consumption_variable, None);

    assert_eq!(
        assembly
            .output_file_path(&InstanceKey::new("pmsm", "motor_1"))
            .as_deref(),
        Some(Path::new("outputs/serial_hybrid/pmsm_motor_1.csv"))
    );
}

#[test]
fn parallel_hybrid_plan() {
    let assembly = assemble("parallel_hybrid.yaml");
    let handoff = EngineHandoff::from_assembly(&assembly);
    assert_eq!(
        step_names(&handoff),
        vec![
            "propeller_1",
            "propeller_2",
            "gearbox_1",
            "equilibrium_0",
            "turboshaft_1",
            "fuel_system_1",
            "fuel_tank_1"
        ]
    );
    assert_eq!(handoff.clusters[0].members.len(), 6);

    let splitter = assembly
        .instance(&InstanceKey::new("dc_splitter", "dc_splitter_1"))
        .unwrap();
    assert_eq!(splitter.number_of_points(), Some(5));
}

#[test]
fn fuel_cell_aux_plan_and_views() {
    let assembly = assemble("fuel_cell_aux.yaml");
    let handoff = EngineHandoff::from_assembly(&assembly);
    assert_eq!(step_names(&handoff), vec!["equilibrium_0", "avionics"]);

    let watched: Vec<_> = assembly
        .performance_watcher_variables()
        .into_iter()
        .map(|w| format!("{}.{}", w.instance.id, w.port))
        .collect();
    assert_eq!(
        watched,
        vec![
            "fuel_cell_stack_1.dc_voltage_out",
            "dc_dc_converter_1.efficiency",
            "dc_bus_1.dc_voltage_out",
            "cabin.dc_current_in",
            "de_icing.dc_current_in",
            "avionics.dc_current_in"
        ]
    );
}

#[test]
fn assembling_twice_gives_identical_handoff() {
    let first = EngineHandoff::from_assembly(&assemble("serial_hybrid.yaml"));
    let second = EngineHandoff::from_assembly(&assemble("serial_hybrid.yaml"));
    assert_eq!(first, second);
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[test]
fn strict_config_accepts_demos_and_rejects_unknown_fuel() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/config/strict.yaml");
    let config = AssemblerConfig::load_yaml(&config_path).unwrap();
    let registry = TypeRegistry::builtin();
    assert!(assemble_file(&demo("serial_hybrid.yaml"), &registry, &config).is_ok());

    let text = std::fs::read_to_string(demo("serial_hybrid.yaml"))
        .unwrap()
        .replace("fuel_type: jet_a1", "fuel_type: kerosene");
    let mut assembler = pt_app::Assembler::new(&registry, config);
    assembler.load_str(&text).unwrap();
    match assembler.validate() {
        Err(AppError::Diagnostics(diagnostics)) => {
            assert!(diagnostics.contains(DiagnosticKind::UnrecognizedOptionValue));
        }
        other => panic!("expected diagnostics, got {other:?}"),
    }

    // The default policy falls back to the documented fuel.
    let mut lenient = pt_app::Assembler::new(&registry, AssemblerConfig::default());
    lenient.load_str(&text).unwrap();
    let graph = lenient.validate().unwrap();
    let turboshaft = graph.find(&InstanceKey::new("turboshaft", "turboshaft_1")).unwrap();
    assert_eq!(
        turboshaft.options.get("fuel_type").and_then(|v| v.as_str()),
        Some("jet_fuel")
    );
}
