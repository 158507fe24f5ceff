use std::path::Path;

#[test]
fn demo_topologies_load() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/topologies");
    let demos = [
        "serial_hybrid.yaml",
        "parallel_hybrid.yaml",
        "fuel_cell_aux.yaml",
    ];

    for name in demos {
        let path = root.join(name);
        let topology = pt_project::load_yaml(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        assert!(!topology.components.is_empty(), "{name} has components");
    }
}
