//! Tests for loading full simulation configurations and stackups

use std::fs;

use ems_config::simulation::{
    ConfigurationError,
    InvocationOptions,
    LayerKind,
    LoadWarning,
    SimulationConfiguration,
    WorkingDirectories,
};
use serde_json::{json, Value};

fn load(document: &Value) -> Result<SimulationConfiguration, ConfigurationError> {
    SimulationConfiguration::from_document_in(
        document,
        InvocationOptions::default(),
        WorkingDirectories::under("/nonexistent-root"),
    )
}

fn minimal_document() -> Value {
    json!({
        "format_version": "2.0",
        "ports": [
            { "width": 300, "layer": 0, "plane": 1 },
            { "width": 300, "layer": 0, "plane": 1, "excite": true }
        ]
    })
}

fn stackup() -> Value {
    json!({
        "layers": [
            { "type": "Top Solder Mask", "thickness": 0.01, "name": "F.Mask" },
            { "type": "copper", "thickness": 0.035, "name": "F.Cu" },
            { "type": "prepreg", "thickness": 0.2, "epsilon": 4.2 },
            { "type": "copper", "thickness": 0.035, "name": "In1.Cu" },
            { "type": "core", "thickness": 1.2, "epsilon": 4.5 },
            { "type": "copper", "thickness": null, "name": "B.Cu" },
            { "type": "Bottom Silk Screen", "thickness": null }
        ]
    })
}

#[test]
fn test_end_to_end_example() {
    let document = json!({
        "format_version": "2.1",
        "frequency": { "start": 1e5, "stop": 5e6 },
        "ports": [{ "width": 300, "layer": 0, "plane": 1 }],
        "differential_pairs": [{ "start_p": 0, "stop_p": 5, "start_n": 0, "stop_n": 0 }]
    });

    let configuration = load(&document).expect("Should load");

    assert_eq!(configuration.start_frequency, 100_000);
    assert_eq!(configuration.stop_frequency, 5_000_000);

    assert_eq!(configuration.ports.len(), 1);
    let port = &configuration.ports[0];
    assert_eq!(port.name, "Unnamed");
    assert_eq!(port.length, 1000.0);
    assert_eq!(port.impedance, 50.0);

    assert_eq!(configuration.diff_pairs.len(), 1);
    assert!(!configuration.diff_pairs[0].correct);
    assert_eq!(configuration.valid_differential_pairs().count(), 0);

    let invalid_references = configuration
        .warnings()
        .iter()
        .filter(|warning| matches!(warning, LoadWarning::InvalidPortReference { .. }))
        .count();
    assert_eq!(invalid_references, 1, "Only stop_p is out of range");
}

#[test]
fn test_scalar_defaults() {
    let configuration = load(&minimal_document()).expect("Should load");

    assert_eq!(configuration.start_frequency, 500_000);
    assert_eq!(configuration.stop_frequency, 10_000_000);
    assert_eq!(configuration.max_steps, None);
    assert_eq!(configuration.pcb_mesh_xy, 50);
    assert_eq!(configuration.inter_copper_layers, 5);
    assert_eq!(configuration.margin_xy, 3000);
    assert_eq!(configuration.margin_z, 3000);
    assert_eq!(configuration.margin_mesh_xy, 200);
    assert_eq!(configuration.margin_mesh_z, 200);
    assert_eq!(configuration.via_plating, 50);
    assert_eq!(configuration.via_filling_epsilon, 1.0);
    assert_eq!((configuration.pcb_width, configuration.pcb_height), (None, None));
    assert!(configuration.diff_pairs.is_empty());
    assert!(configuration.traces.is_empty());
    assert!(configuration.layers.is_empty());
}

#[test]
fn test_scalar_fields_are_read() {
    let mut document = minimal_document();
    let fields = json!({
        "frequency": { "start": 1000, "stop": 2.5e9 },
        "max_steps": 20000,
        "mesh": { "xy": 30.7, "inter_layers": 3, "margin": { "xy": 150, "z": 120 } },
        "margin": { "xy": 2000, "z": 1500 },
        "via": { "plating_thickness": 25, "filling_epsilon": 3.6 }
    });
    for (key, value) in fields.as_object().unwrap() {
        document[key] = value.clone();
    }

    let configuration = load(&document).expect("Should load");

    assert_eq!(configuration.start_frequency, 1000);
    assert_eq!(configuration.stop_frequency, 2_500_000_000);
    assert_eq!(configuration.max_steps, Some(20000));
    assert_eq!(configuration.pcb_mesh_xy, 30, "Truncated toward zero");
    assert_eq!(configuration.inter_copper_layers, 3);
    assert_eq!((configuration.margin_mesh_xy, configuration.margin_mesh_z), (150, 120));
    assert_eq!((configuration.margin_xy, configuration.margin_z), (2000, 1500));
    assert_eq!(configuration.via_plating, 25);
    assert_eq!(configuration.via_filling_epsilon, 3.6);

    let defaulted_scalars = configuration
        .warnings()
        .iter()
        .filter_map(LoadWarning::path)
        .filter(|path| !path.to_string().starts_with("ports"))
        .count();
    assert_eq!(defaulted_scalars, 2, "Only differential_pairs and traces fall back");
}

#[test]
fn test_mistyped_optional_field_falls_back() {
    let mut document = minimal_document();
    document["mesh"] = json!({ "inter_layers": 2.5 });

    let configuration = load(&document).expect("Should load");

    assert_eq!(configuration.inter_copper_layers, 5);
    assert!(configuration.warnings().iter().any(|warning| matches!(
        warning,
        LoadWarning::DefaultUsedForIncorrectType { path, .. } if path.to_string() == "mesh.inter_layers"
    )));
}

#[test]
fn test_missing_ports_is_fatal() {
    let document = json!({ "format_version": "2.0" });

    match load(&document) {
        Err(ConfigurationError::MissingField { path }) => assert_eq!(path.to_string(), "ports"),
        other => panic!("Should fail on missing ports, got {other:?}"),
    }
}

#[test]
fn test_missing_port_width_names_the_port() {
    let document = json!({
        "format_version": "2.0",
        "ports": [
            { "width": 300, "layer": 0, "plane": 1 },
            { "layer": 0, "plane": 1 }
        ]
    });

    let error = load(&document).unwrap_err();
    assert_eq!(error.to_string(), "No field ports[1].width found in config");
}

#[test]
fn test_version_gate() {
    let mut document = minimal_document();

    for (version, accepted) in [
        ("2.0", true),
        ("2.1", true),
        ("2.15", true),
        ("1.0", false),
        ("1.9", false),
        ("3.0", false),
        ("3.7", false),
        ("2", false),
        ("+2.+0", false),
        ("02.0", false),
        ("latest", false),
    ] {
        document["format_version"] = json!(version);
        let result = load(&document);

        if accepted {
            assert!(result.is_ok(), "{version} should be accepted");
        } else {
            assert!(
                matches!(result, Err(ConfigurationError::UnsupportedVersion { .. })),
                "{version} should be rejected"
            );
        }
    }
}

#[test]
fn test_version_must_be_a_string() {
    let mut document = minimal_document();
    document["format_version"] = json!(2.0);

    assert!(matches!(
        load(&document),
        Err(ConfigurationError::IncorrectType { .. })
    ));

    document.as_object_mut().unwrap().remove("format_version");
    assert!(matches!(
        load(&document),
        Err(ConfigurationError::MissingField { .. })
    ));
}

#[test]
fn test_traces_and_pairs_are_checked_against_ports() {
    let mut document = minimal_document();
    document["differential_pairs"] = json!([
        { "start_p": 0, "stop_p": 1, "start_n": 1, "stop_n": 0, "name": "lvds" },
        { "start_p": 2, "stop_p": 3, "start_n": 4, "stop_n": 5 }
    ]);
    document["traces"] = json!([
        { "start": 0, "stop": 1 },
        { "start": 1, "stop": 2, "name": "broken" }
    ]);

    let configuration = load(&document).expect("Should load");

    assert_eq!(configuration.diff_pairs.len(), 2, "Incorrect pairs are kept");
    assert!(configuration.diff_pairs[0].correct);
    assert!(!configuration.diff_pairs[1].correct);
    assert_eq!(configuration.diff_pairs[1].name, "2345");

    assert_eq!(configuration.traces.len(), 2);
    let valid_traces = configuration.valid_traces().map(|trace| trace.name.as_str()).collect::<Vec<_>>();
    assert_eq!(valid_traces, ["01"]);

    let invalid_references = configuration
        .warnings()
        .iter()
        .filter(|warning| matches!(warning, LoadWarning::InvalidPortReference { .. }))
        .count();
    assert_eq!(invalid_references, 4 + 1);
}

#[test]
fn test_excited_ports() {
    let configuration = load(&minimal_document()).expect("Should load");

    let excited = configuration.excited_ports().map(|(index, _)| index).collect::<Vec<_>>();
    assert_eq!(excited, [1]);
}

#[test]
fn test_stackup_keeps_metals_and_substrates_in_order() {
    let mut configuration = load(&minimal_document()).expect("Should load");
    configuration.load_stackup(&stackup()).expect("Should load stackup");

    assert_eq!(configuration.layers.len(), 5);
    assert!(configuration.layers.iter().all(|layer| layer.kind != LayerKind::Other));

    let metals = configuration
        .metals()
        .into_iter()
        .map(|layer| layer.file.clone().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(metals, ["F_Cu", "In1_Cu", "B_Cu"]);

    let substrates = configuration
        .substrates()
        .into_iter()
        .map(|layer| layer.epsilon.unwrap())
        .collect::<Vec<_>>();
    assert_eq!(substrates, [4.2, 4.5]);

    assert_eq!(configuration.metals().last().unwrap().thickness, 0.0);
    assert_eq!(configuration.metals(), configuration.metals(), "Views are repeatable");

    let ignored = configuration
        .warnings()
        .iter()
        .filter(|warning| matches!(warning, LoadWarning::LayerIgnored { .. }))
        .count();
    assert_eq!(ignored, 2);
}

#[test]
fn test_loading_a_stackup_again_replaces_layers() {
    let mut configuration = load(&minimal_document()).expect("Should load");
    configuration.load_stackup(&stackup()).expect("Should load stackup");

    configuration
        .load_stackup(&json!({ "layers": [{ "type": "copper", "thickness": 0.018, "name": "Top" }] }))
        .expect("Should load second stackup");

    assert_eq!(configuration.layers.len(), 1);
    assert!(configuration.substrates().is_empty());
}

#[test]
fn test_stackup_without_layers_is_fatal() {
    let mut configuration = load(&minimal_document()).expect("Should load");

    assert!(matches!(
        configuration.load_stackup(&json!({ "board": {} })),
        Err(ConfigurationError::MissingField { .. })
    ));
}

#[test]
fn test_load_from_files() {
    let directory = tempfile::tempdir().unwrap();
    let configuration_path = directory.path().join("simulation.json");
    let stackup_path = directory.path().join("stackup.json");

    fs::write(&configuration_path, minimal_document().to_string()).unwrap();
    fs::write(&stackup_path, stackup().to_string()).unwrap();

    let mut configuration =
        SimulationConfiguration::load_from_path(&configuration_path, InvocationOptions::default())
            .expect("Should load from file");
    configuration
        .load_stackup_from_path(&stackup_path)
        .expect("Should load stackup from file");

    assert_eq!(configuration.ports.len(), 2);
    assert_eq!(configuration.metals().len(), 3);
}

#[test]
fn test_unreadable_documents() {
    let directory = tempfile::tempdir().unwrap();
    let broken_path = directory.path().join("broken.json");
    fs::write(&broken_path, "{ \"format_version\": ").unwrap();

    assert!(matches!(
        SimulationConfiguration::load_from_path(&broken_path, InvocationOptions::default()),
        Err(ConfigurationError::ParseDocument { .. })
    ));
    assert!(matches!(
        SimulationConfiguration::load_from_path(
            directory.path().join("missing.json"),
            InvocationOptions::default()
        ),
        Err(ConfigurationError::ReadDocument { .. })
    ));
}

#[test]
fn test_directories_follow_requested_phases() {
    let root = tempfile::tempdir().unwrap();
    let arguments = InvocationOptions {
        simulate: true,
        postprocess: true,
        ..Default::default()
    };

    let mut configuration = SimulationConfiguration::from_document_in(
        &minimal_document(),
        arguments,
        WorkingDirectories::under(root.path()),
    )
    .expect("Should load");

    configuration.create_default_directories().expect("Should create directories");

    assert!(configuration.directories.base.is_dir());
    assert!(configuration.directories.simulation.is_dir());
    assert!(configuration.directories.results.is_dir());
    assert!(!configuration.directories.geometry.exists());

    // A second call must not wipe what the pipeline wrote in the meantime.
    let output = configuration.directories.simulation.join("solver.log");
    fs::write(&output, "step 1").unwrap();
    configuration.create_default_directories().expect("Second call is a no-op");
    assert!(output.exists());
}

#[test]
fn test_resolved_configuration_serializes() {
    let mut configuration = load(&minimal_document()).expect("Should load");
    configuration.load_stackup(&stackup()).expect("Should load stackup");

    let serialized = serde_json::to_value(&configuration).unwrap();

    assert_eq!(serialized["start_frequency"], json!(500_000));
    assert_eq!(serialized["ports"][0]["name"], json!("Unnamed"));
    assert_eq!(serialized["layers"][0]["kind"], json!("Metal"));
    assert!(serialized.get("warnings").is_none());
}
