//! Conversion of a loaded topology description into a graph.

use pt_core::InstanceKey;
use pt_graph::{GraphBuilder, PowerTrainGraph};
use pt_project::TopologyDef;

/// Build the unvalidated graph of a topology description.
///
/// Component and connection order is preserved.
pub fn compile_topology(topology: &TopologyDef) -> PowerTrainGraph {
    let mut builder =
        GraphBuilder::new(&topology.name).output_directory(&topology.output_directory);
    if let Some(n) = topology.number_of_points {
        builder = builder.number_of_points(n);
    }

    for component in &topology.components {
        builder.add_instance(
            InstanceKey::new(&component.type_tag, &component.id),
            component.options.clone(),
            component.inputs.clone(),
        );
    }
    for connection in &topology.connections {
        builder.connect(connection.from.clone(), connection.to.clone());
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_order_and_values() {
        let topology = pt_project::from_yaml_str(
            r#"
version: 1
name: mini
number_of_points: 2
components:
  - type: auxiliary_load
    id: aux
    inputs: { dc_voltage_in: 28.0 }
  - type: dc_bus
    id: bus
connections:
  - from: bus.dc_voltage_out
    to: aux.dc_voltage_in
"#,
        )
        .unwrap();

        let graph = compile_topology(&topology);
        assert_eq!(graph.name(), "mini");
        assert_eq!(graph.number_of_points(), Some(2));
        assert_eq!(graph.instances()[0].key, InstanceKey::new("auxiliary_load", "aux"));
        assert!(graph.instances()[0].inputs.contains("dc_voltage_in"));
        assert_eq!(graph.connections()[0].from.instance, "bus");
    }
}
