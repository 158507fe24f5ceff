//! Exhaustive semantic validation of a power-train graph.
//!
//! Every problem is collected in one pass; nothing is inferred or repaired
//! except the documented option fallbacks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pt_core::{Category, InstanceIdx, InstanceKey, OptionMap, OptionValue, PortRef};
use pt_registry::{
    ComponentTypeDescriptor, OptionShape, PortDirection, ShapeCheck, TypeEntry, TypeKind,
    TypeRegistry,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Diagnostics, GraphError, Origin};
use crate::graph::{ComponentInstance, PowerTrainGraph};

/// Option carrying the count of evaluation points.
pub const NUMBER_OF_POINTS: &str = "number_of_points";

/// What to do with a textual option value outside its allowed choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownValuePolicy {
    /// Log a warning and use the documented default.
    #[default]
    Warn,
    /// Report `UnrecognizedOptionValue`.
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    pub unknown_option_values: UnknownValuePolicy,
}

/// An instance whose type resolved and whose options are final.
#[derive(Debug, Clone)]
pub struct ResolvedInstance {
    pub idx: InstanceIdx,
    pub key: InstanceKey,
    pub kind: TypeKind,
    pub descriptor: Arc<ComponentTypeDescriptor>,
    /// Options with defaults and `number_of_points` filled in.
    pub options: OptionMap,
    pub inputs: OptionMap,
}

impl ResolvedInstance {
    pub fn category(&self) -> Category {
        self.descriptor.category
    }

    pub fn number_of_points(&self) -> Option<usize> {
        self.options.get(NUMBER_OF_POINTS).and_then(|v| v.as_count().ok())
    }
}

/// A connection with both endpoints bound to instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    /// Position in the description.
    pub index: usize,
    pub producer: InstanceIdx,
    pub producer_port: String,
    pub consumer: InstanceIdx,
    pub consumer_port: String,
}

/// A graph that passed validation.
///
/// Instances keep their description order, so `instances()[idx.as_usize()]`
/// is the instance with index `idx`.
#[derive(Debug, Clone)]
pub struct ValidatedGraph {
    name: String,
    output_directory: PathBuf,
    number_of_points: Option<usize>,
    instances: Vec<ResolvedInstance>,
    connections: Vec<ResolvedConnection>,
}

impl ValidatedGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn number_of_points(&self) -> Option<usize> {
        self.number_of_points
    }

    pub fn instances(&self) -> &[ResolvedInstance] {
        &self.instances
    }

    pub fn connections(&self) -> &[ResolvedConnection] {
        &self.connections
    }

    pub fn instance(&self, idx: InstanceIdx) -> Option<&ResolvedInstance> {
        self.instances.get(idx.as_usize())
    }

    pub fn find(&self, key: &InstanceKey) -> Option<&ResolvedInstance> {
        self.instances.iter().find(|i| &i.key == key)
    }
}

/// Validate `graph` against `registry`, collecting every problem.
pub fn validate(
    graph: &PowerTrainGraph,
    registry: &TypeRegistry,
    options: &ValidationOptions,
) -> Result<ValidatedGraph, Diagnostics> {
    let mut diagnostics = Diagnostics::new();

    let entries = resolve_types(graph, registry, &mut diagnostics);
    let by_id = index_identifiers(graph, &mut diagnostics);

    let mut drivers: HashMap<(usize, String), usize> = HashMap::new();
    let mut connections = Vec::with_capacity(graph.connections.len());
    for conn in &graph.connections {
        let origin = Origin::Connection(conn.index);
        let ctx = EndpointContext {
            graph,
            by_id: &by_id,
            entries: &entries,
            origin,
        };
        let producer = ctx.check(&conn.from, PortDirection::Output, &mut diagnostics);
        let consumer = ctx.check(&conn.to, PortDirection::Input, &mut diagnostics);
        // A connection targeting a valid input drives it even if its producer is broken.
        if let Some(c) = consumer {
            *drivers.entry((c, conn.to.port.clone())).or_default() += 1;
        }
        if let (Some(p), Some(c)) = (producer, consumer) {
            connections.push(ResolvedConnection {
                index: conn.index,
                producer: graph.instances[p].idx,
                producer_port: conn.from.port.clone(),
                consumer: graph.instances[c].idx,
                consumer_port: conn.to.port.clone(),
            });
        }
    }

    let mut instances = Vec::with_capacity(graph.instances.len());
    for (i, instance) in graph.instances.iter().enumerate() {
        let Some(entry) = entries[i] else { continue };
        let descriptor = &entry.descriptor;
        let points = points_of(instance, graph.number_of_points);

        let points_reported =
            check_external_inputs(i, instance, descriptor, points, &mut drivers, &mut diagnostics);
        check_drivers(i, instance, descriptor, &drivers, &mut diagnostics);
        let resolved = resolve_options(
            i,
            instance,
            descriptor,
            graph.number_of_points,
            options.unknown_option_values,
            points_reported,
            &mut diagnostics,
        );

        instances.push(ResolvedInstance {
            idx: instance.idx,
            key: instance.key.clone(),
            kind: entry.kind,
            descriptor: Arc::clone(descriptor),
            options: resolved,
            inputs: instance.inputs.clone(),
        });
    }

    if !diagnostics.is_empty() {
        debug!(graph = %graph.name, problems = diagnostics.len(), "graph validation failed");
        return Err(diagnostics);
    }

    debug!(
        graph = %graph.name,
        instances = instances.len(),
        connections = connections.len(),
        "graph validated"
    );
    Ok(ValidatedGraph {
        name: graph.name.clone(),
        output_directory: graph.output_directory.clone(),
        number_of_points: graph.number_of_points,
        instances,
        connections,
    })
}

fn resolve_types<'r>(
    graph: &PowerTrainGraph,
    registry: &'r TypeRegistry,
    diagnostics: &mut Diagnostics,
) -> Vec<Option<&'r TypeEntry>> {
    graph
        .instances
        .iter()
        .enumerate()
        .map(|(i, instance)| match registry.resolve(&instance.key.type_tag) {
            Ok(entry) => Some(entry),
            Err(_) => {
                diagnostics.push(GraphError::UnknownComponentType {
                    type_tag: instance.key.type_tag.clone(),
                    id: instance.key.id.clone(),
                    origin: Origin::Component(i),
                });
                None
            }
        })
        .collect()
}

/// Map identifiers to instance positions, reporting repeated (type, id) pairs.
fn index_identifiers<'g>(
    graph: &'g PowerTrainGraph,
    diagnostics: &mut Diagnostics,
) -> HashMap<&'g str, Vec<usize>> {
    let mut first_seen: HashMap<&InstanceKey, usize> = HashMap::new();
    let mut by_id: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, instance) in graph.instances.iter().enumerate() {
        if let Some(&first) = first_seen.get(&instance.key) {
            diagnostics.push(GraphError::DuplicateInstanceId {
                type_tag: instance.key.type_tag.clone(),
                id: instance.key.id.clone(),
                reason: format!("already declared by components[{first}]"),
                origin: Origin::Component(i),
            });
            continue;
        }
        first_seen.insert(&instance.key, i);
        by_id.entry(instance.key.id.as_str()).or_default().push(i);
    }
    by_id
}

struct EndpointContext<'a> {
    graph: &'a PowerTrainGraph,
    by_id: &'a HashMap<&'a str, Vec<usize>>,
    entries: &'a [Option<&'a TypeEntry>],
    origin: Origin,
}

impl EndpointContext<'_> {
    /// Bind an endpoint to an instance and check its port. Returns the
    /// instance position when the endpoint is usable.
    fn check(
        &self,
        endpoint: &PortRef,
        expected: PortDirection,
        diagnostics: &mut Diagnostics,
    ) -> Option<usize> {
        let position = match self.bind(endpoint) {
            Ok(position) => position,
            Err(reason) => {
                diagnostics.push(GraphError::DanglingConnection {
                    endpoint: endpoint.clone(),
                    reason,
                    origin: self.origin,
                });
                return None;
            }
        };

        // Unknown types are already reported.
        let entry = self.entries[position]?;
        let type_tag = &self.graph.instances[position].key.type_tag;
        match entry.descriptor.port_direction(&endpoint.port) {
            None => {
                diagnostics.push(GraphError::DanglingConnection {
                    endpoint: endpoint.clone(),
                    reason: format!("type '{type_tag}' has no port '{}'", endpoint.port),
                    origin: self.origin,
                });
                None
            }
            Some(direction) if direction != expected => {
                let reason = match expected {
                    PortDirection::Output => {
                        format!("producer port '{}' is an input of '{type_tag}'", endpoint.port)
                    }
                    PortDirection::Input => {
                        format!("consumer port '{}' is an output of '{type_tag}'", endpoint.port)
                    }
                };
                diagnostics.push(GraphError::PortDirectionMismatch {
                    endpoint: endpoint.clone(),
                    reason,
                    origin: self.origin,
                });
                None
            }
            Some(_) => Some(position),
        }
    }

    fn bind(&self, endpoint: &PortRef) -> Result<usize, String> {
        let candidates: Vec<usize> = self
            .by_id
            .get(endpoint.instance.as_str())
            .into_iter()
            .flatten()
            .copied()
            .filter(|&i| endpoint.matches(&self.graph.instances[i].key))
            .collect();

        match candidates.as_slice() {
            [] => Err(match &endpoint.type_tag {
                Some(tag) => format!("no instance '{}' of type '{tag}'", endpoint.instance),
                None => format!("no instance '{}'", endpoint.instance),
            }),
            [single] => Ok(*single),
            many => {
                let types: Vec<&str> = many
                    .iter()
                    .map(|&i| self.graph.instances[i].key.type_tag.as_str())
                    .collect();
                Err(format!(
                    "identifier '{}' is shared by types [{}]; write <type>:<id>.<port>",
                    endpoint.instance,
                    types.join(", ")
                ))
            }
        }
    }
}

fn points_of(instance: &ComponentInstance, global: Option<usize>) -> Option<usize> {
    match instance.options.get(NUMBER_OF_POINTS) {
        Some(value) => value.as_count().ok().filter(|&n| n > 0),
        None => global,
    }
}

fn check_external_inputs(
    position: usize,
    instance: &ComponentInstance,
    descriptor: &ComponentTypeDescriptor,
    points: Option<usize>,
    drivers: &mut HashMap<(usize, String), usize>,
    diagnostics: &mut Diagnostics,
) -> bool {
    let origin = Origin::Component(position);
    let mut points_reported = false;
    for (port, value) in instance.inputs.iter() {
        let endpoint = || PortRef::qualified(&instance.key.type_tag, &instance.key.id, port);
        match descriptor.port_direction(port) {
            None => diagnostics.push(GraphError::DanglingConnection {
                endpoint: endpoint(),
                reason: format!("external value targets unknown input '{port}'"),
                origin,
            }),
            Some(PortDirection::Output) => diagnostics.push(GraphError::PortDirectionMismatch {
                endpoint: endpoint(),
                reason: format!("external value targets output port '{port}'"),
                origin,
            }),
            Some(PortDirection::Input) => {
                *drivers.entry((position, port.to_string())).or_default() += 1;
                let shape = OptionShape::ScalarOrPerPoint;
                match shape.check(value.cardinality(), points) {
                    ShapeCheck::Ok => {}
                    ShapeCheck::Mismatch => {
                        diagnostics.push(GraphError::ControlParameterInconsistentShape {
                            instance: instance.key.clone(),
                            option: port.to_string(),
                            expected: shape.describe(points),
                            actual: value.cardinality(),
                            origin,
                        })
                    }
                    ShapeCheck::NeedsPoints => {
                        if !points_reported {
                            points_reported = true;
                            diagnostics.push(GraphError::MissingRequiredOption {
                                instance: instance.key.clone(),
                                option: NUMBER_OF_POINTS.to_string(),
                                origin,
                            });
                        }
                    }
                }
            }
        }
    }
    points_reported
}

fn check_drivers(
    position: usize,
    instance: &ComponentInstance,
    descriptor: &ComponentTypeDescriptor,
    drivers: &HashMap<(usize, String), usize>,
    diagnostics: &mut Diagnostics,
) {
    let origin = Origin::Component(position);
    for input in &descriptor.inputs {
        let count = drivers
            .get(&(position, input.name.clone()))
            .copied()
            .unwrap_or(0);
        if count == 0 && input.mandatory {
            diagnostics.push(GraphError::UnresolvedMandatoryInput {
                instance: instance.key.clone(),
                port: input.name.clone(),
                origin,
            });
        } else if count > 1 {
            diagnostics.push(GraphError::FanInConflict {
                instance: instance.key.clone(),
                port: input.name.clone(),
                drivers: count,
                origin,
            });
        }
    }
}

fn resolve_options(
    position: usize,
    instance: &ComponentInstance,
    descriptor: &ComponentTypeDescriptor,
    global_points: Option<usize>,
    policy: UnknownValuePolicy,
    mut points_reported: bool,
    diagnostics: &mut Diagnostics,
) -> OptionMap {
    let origin = Origin::Component(position);
    let key = &instance.key;
    let mut resolved = instance.options.clone();

    if descriptor.option_spec(NUMBER_OF_POINTS).is_some()
        && !resolved.contains(NUMBER_OF_POINTS)
        && let Some(n) = global_points
    {
        resolved.insert(NUMBER_OF_POINTS, n as i64);
    }

    let points = match resolved.get(NUMBER_OF_POINTS) {
        None => global_points,
        Some(value) => match value.as_count() {
            Ok(n) if n > 0 => Some(n),
            _ => {
                diagnostics.push(GraphError::UnrecognizedOptionValue {
                    instance: key.clone(),
                    option: NUMBER_OF_POINTS.to_string(),
                    value: render(value),
                    allowed: vec!["positive integer".to_string()],
                    origin,
                });
                None
            }
        },
    };

    for spec in &descriptor.options {
        let Some(value) = resolved.get(&spec.name).cloned() else {
            if spec.required {
                diagnostics.push(GraphError::MissingRequiredOption {
                    instance: key.clone(),
                    option: spec.name.clone(),
                    origin,
                });
            } else if let Some(default) = &spec.default {
                resolved.insert(spec.name.clone(), default.clone());
            }
            continue;
        };

        match spec.shape.check(value.cardinality(), points) {
            ShapeCheck::Ok => {}
            ShapeCheck::Mismatch => diagnostics.push(GraphError::ControlParameterInconsistentShape {
                instance: key.clone(),
                option: spec.name.clone(),
                expected: spec.shape.describe(points),
                actual: value.cardinality(),
                origin,
            }),
            ShapeCheck::NeedsPoints => {
                if !points_reported {
                    points_reported = true;
                    diagnostics.push(GraphError::MissingRequiredOption {
                        instance: key.clone(),
                        option: NUMBER_OF_POINTS.to_string(),
                        origin,
                    });
                }
            }
        }

        if spec.choices.is_empty() || value.as_str().is_some_and(|text| spec.accepts_choice(text)) {
            continue;
        }
        match (policy, &spec.default) {
            (UnknownValuePolicy::Warn, Some(default)) => {
                warn!(
                    instance = %key,
                    option = %spec.name,
                    value = %render(&value),
                    fallback = %render(default),
                    "unrecognized option value, using default"
                );
                resolved.insert(spec.name.clone(), default.clone());
            }
            _ => diagnostics.push(GraphError::UnrecognizedOptionValue {
                instance: key.clone(),
                option: spec.name.clone(),
                value: render(&value),
                allowed: spec.choices.clone(),
                origin,
            }),
        }
    }

    for name in instance.options.keys() {
        if name != NUMBER_OF_POINTS && descriptor.option_spec(name).is_none() {
            warn!(instance = %key, option = name, "undeclared option kept as given");
        }
    }

    resolved
}

fn render(value: &OptionValue) -> String {
    match value {
        OptionValue::Flag(v) => v.to_string(),
        OptionValue::Integer(v) => v.to_string(),
        OptionValue::Number(v) => v.to_string(),
        OptionValue::Text(v) => v.clone(),
        OptionValue::Array(values) => format!("{values:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::error::DiagnosticKind;
    use crate::test_utils::test_registry;

    fn run(graph: &PowerTrainGraph) -> Result<ValidatedGraph, Diagnostics> {
        validate(graph, &test_registry(), &ValidationOptions::default())
    }

    fn kinds(diagnostics: &Diagnostics) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(GraphError::kind).collect()
    }

    #[test]
    fn minimal_chain_validates() {
        let mut b = GraphBuilder::new("chain");
        b.add_component("test_source", "s1");
        b.add_component("test_load", "l1");
        b.link("s1.output_voltage", "l1.input_voltage").unwrap();

        let validated = run(&b.build()).unwrap();
        assert_eq!(validated.instances().len(), 2);
        let conn = &validated.connections()[0];
        assert_eq!(conn.producer.index(), 0);
        assert_eq!(conn.consumer_port, "input_voltage");
    }

    #[test]
    fn reports_every_problem_in_one_pass() {
        let mut b = GraphBuilder::new("broken");
        b.add_component("test_source", "s1");
        b.add_component("test_load", "l1");
        b.add_component("warp_core", "w1");
        b.add_component("test_load", "l2");
        b.link("s1.output_voltage", "l1.power").unwrap();
        b.link("s1.output_voltage", "ghost.input_voltage").unwrap();
        b.link("s1.no_such_port", "l1.input_voltage").unwrap();

        let diagnostics = run(&b.build()).unwrap_err();
        let kinds = kinds(&diagnostics);
        assert!(kinds.contains(&DiagnosticKind::UnknownComponentType));
        assert!(kinds.contains(&DiagnosticKind::DuplicateInstanceId));
        assert!(kinds.contains(&DiagnosticKind::PortDirectionMismatch));
        assert_eq!(
            diagnostics.of_kind(DiagnosticKind::DanglingConnection).count(),
            2
        );
        assert!(kinds.contains(&DiagnosticKind::UnresolvedMandatoryInput));
    }

    #[test]
    fn broken_producer_still_drives_its_consumer() {
        let mut b = GraphBuilder::new("typo");
        b.add_component("test_source", "s1");
        b.add_component("test_load", "l1");
        b.link("s1.output_voltag", "l1.input_voltage").unwrap();

        let diagnostics = run(&b.build()).unwrap_err();
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::DanglingConnection]);
        assert!(diagnostics.to_string().contains("s1.output_voltag"));
    }

    #[test]
    fn undeclared_options_are_kept() {
        let mut b = GraphBuilder::new("extra");
        let l = b.add_component("test_load", "l1");
        b.set_input(l, "input_voltage", 540.0);
        b.set_option(l, "foo", 1.0);

        let validated = run(&b.build()).unwrap();
        let load = &validated.instances()[0];
        assert_eq!(load.options.get("foo"), Some(&OptionValue::Number(1.0)));
    }

    #[test]
    fn per_point_input_without_points_asks_for_points() {
        let mut b = GraphBuilder::new("points");
        let c = b.add_component("test_converter", "c1");
        b.set_input(c, "input_voltage", vec![1.0, 2.0, 3.0]);
        b.set_option(c, "power_split", vec![0.1, 0.2, 0.3]);

        let diagnostics = run(&b.build()).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        match diagnostics.iter().next().unwrap() {
            GraphError::MissingRequiredOption { instance, option, .. } => {
                assert_eq!(instance, &InstanceKey::new("test_converter", "c1"));
                assert_eq!(option, NUMBER_OF_POINTS);
            }
            other => panic!("unexpected diagnostic {other}"),
        }
    }

    #[test]
    fn direction_mismatch_points_at_connection() {
        let mut b = GraphBuilder::new("dir");
        b.add_component("test_source", "s1");
        b.add_component("test_load", "l1");
        b.link("s1.output_voltage", "l1.input_voltage").unwrap();
        b.link("s1.output_voltage", "l1.power").unwrap();

        let diagnostics = run(&b.build()).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        let err = diagnostics.iter().next().unwrap();
        assert_eq!(err.kind(), DiagnosticKind::PortDirectionMismatch);
        assert_eq!(err.origin(), Some(Origin::Connection(1)));
        assert!(err.to_string().contains("l1.power"));
    }

    #[test]
    fn mandatory_input_may_come_from_outside() {
        let mut b = GraphBuilder::new("ext");
        let l = b.add_component("test_load", "l1");
        b.set_input(l, "input_voltage", 540.0);
        assert!(run(&b.build()).is_ok());
    }

    #[test]
    fn missing_mandatory_input_is_reported() {
        let mut b = GraphBuilder::new("ext");
        b.add_component("test_load", "l1");
        let diagnostics = run(&b.build()).unwrap_err();
        match diagnostics.iter().next().unwrap() {
            GraphError::UnresolvedMandatoryInput { instance, port, origin } => {
                assert_eq!(instance, &InstanceKey::new("test_load", "l1"));
                assert_eq!(port, "input_voltage");
                assert_eq!(*origin, Origin::Component(0));
            }
            other => panic!("unexpected diagnostic {other}"),
        }
    }

    #[test]
    fn external_value_for_unknown_or_output_port() {
        let mut b = GraphBuilder::new("ext");
        let l = b.add_component("test_load", "l1");
        b.set_input(l, "input_voltage", 540.0);
        b.set_input(l, "voltage_typo", 1.0);
        b.set_input(l, "power", 1.0);
        let kinds = kinds(&run(&b.build()).unwrap_err());
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::PortDirectionMismatch,
                DiagnosticKind::DanglingConnection
            ]
        );
    }

    #[test]
    fn fan_in_is_rejected() {
        let mut b = GraphBuilder::new("fan");
        b.add_component("test_source", "s1");
        b.add_component("test_source", "s2");
        b.add_component("test_load", "l1");
        b.link("s1.output_voltage", "l1.input_voltage").unwrap();
        b.link("s2.output_voltage", "l1.input_voltage").unwrap();

        let diagnostics = run(&b.build()).unwrap_err();
        assert!(matches!(
            diagnostics.iter().next(),
            Some(GraphError::FanInConflict { drivers: 2, .. })
        ));
    }

    #[test]
    fn fan_out_is_allowed() {
        let mut b = GraphBuilder::new("fan_out");
        b.add_component("test_source", "s1");
        b.add_component("test_load", "l1");
        b.add_component("test_load", "l2");
        b.link("s1.output_voltage", "l1.input_voltage").unwrap();
        b.link("s1.output_voltage", "l2.input_voltage").unwrap();
        assert!(run(&b.build()).is_ok());
    }

    #[test]
    fn shared_identifier_needs_type_prefix() {
        let mut b = GraphBuilder::new("shared");
        b.add_component("test_source", "x");
        b.add_component("test_load", "x");
        b.link("x.output_voltage", "x.input_voltage").unwrap();
        let diagnostics = run(&b.build()).unwrap_err();
        assert_eq!(
            diagnostics.of_kind(DiagnosticKind::DanglingConnection).count(),
            2
        );

        let mut b = GraphBuilder::new("shared");
        b.add_component("test_source", "x");
        b.add_component("test_load", "x");
        b.link("test_source:x.output_voltage", "test_load:x.input_voltage")
            .unwrap();
        assert!(run(&b.build()).is_ok());
    }

    #[test]
    fn defaults_and_points_are_filled_in() {
        let mut b = GraphBuilder::new("opts").number_of_points(3);
        let c = b.add_component("test_converter", "c1");
        b.set_input(c, "input_voltage", vec![1.0, 2.0, 3.0]);
        let g = b.add_component("test_gearbox", "g1");
        b.set_option(g, "ratio", 2.5);

        let validated = run(&b.build()).unwrap();
        let conv = &validated.instances()[0];
        assert_eq!(conv.options.get("efficiency"), Some(&OptionValue::Number(0.95)));
        assert_eq!(conv.options.get("mode"), Some(&OptionValue::from("buck")));
        let gear = &validated.instances()[1];
        assert_eq!(gear.number_of_points(), Some(3));
        assert_eq!(gear.category(), Category::MechanicalLink);
    }

    #[test]
    fn missing_required_option_is_reported() {
        let mut b = GraphBuilder::new("opts");
        b.add_component("test_gearbox", "g1");
        let diagnostics = run(&b.build()).unwrap_err();
        let missing: Vec<_> = diagnostics
            .iter()
            .filter_map(|e| match e {
                GraphError::MissingRequiredOption { option, .. } => Some(option.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["ratio", "number_of_points"]);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let mut b = GraphBuilder::new("shape").number_of_points(4);
        let c = b.add_component("test_converter", "c1");
        b.set_input(c, "input_voltage", 540.0);
        b.set_option(c, "power_split", vec![0.1, 0.2, 0.3]);
        b.set_option(c, "efficiency", vec![0.9, 0.9]);

        let diagnostics = run(&b.build()).unwrap_err();
        let found: Vec<(String, String, usize)> = diagnostics
            .iter()
            .filter_map(|e| match e {
                GraphError::ControlParameterInconsistentShape {
                    option,
                    expected,
                    actual,
                    ..
                } => Some((option.clone(), expected.clone(), *actual)),
                _ => None,
            })
            .collect();
        assert_eq!(
            found,
            vec![
                ("efficiency".to_string(), "1".to_string(), 2),
                ("power_split".to_string(), "1 or 4".to_string(), 3),
            ]
        );
    }

    #[test]
    fn per_point_option_matching_points_is_accepted() {
        let mut b = GraphBuilder::new("shape").number_of_points(3);
        let c = b.add_component("test_converter", "c1");
        b.set_input(c, "input_voltage", 540.0);
        b.set_option(c, "power_split", vec![0.1, 0.2, 0.3]);
        assert!(run(&b.build()).is_ok());
    }

    #[test]
    fn unrecognized_choice_falls_back_by_default() {
        let mut b = GraphBuilder::new("choice");
        let c = b.add_component("test_converter", "c1");
        b.set_input(c, "input_voltage", 540.0);
        b.set_option(c, "mode", "flyback");
        b.set_option(c, "colour", "red");

        let validated = run(&b.build()).unwrap();
        let options = &validated.instances()[0].options;
        assert_eq!(options.get("mode"), Some(&OptionValue::from("buck")));
        assert_eq!(options.get("colour"), Some(&OptionValue::from("red")));
    }

    #[test]
    fn unrecognized_choice_is_an_error_under_strict_policy() {
        let mut b = GraphBuilder::new("choice");
        let c = b.add_component("test_converter", "c1");
        b.set_input(c, "input_voltage", 540.0);
        b.set_option(c, "mode", "flyback");

        let strict = ValidationOptions {
            unknown_option_values: UnknownValuePolicy::Error,
        };
        let diagnostics = validate(&b.build(), &test_registry(), &strict).unwrap_err();
        match diagnostics.iter().next().unwrap() {
            GraphError::UnrecognizedOptionValue { value, allowed, .. } => {
                assert_eq!(value, "flyback");
                assert_eq!(allowed, &vec!["buck".to_string(), "boost".to_string()]);
            }
            other => panic!("unexpected diagnostic {other}"),
        }
    }
}
