use std::path::PathBuf;

use plotstack_studio::config::StudioConfig;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn defaults_without_flags() {
    let config = StudioConfig::from_args(&args(&["plotstack"])).unwrap();
    assert_eq!(config, StudioConfig::default());
    assert!(config.physics_enabled);
    assert_eq!(config.support_search_limit, 20);
    assert_eq!(config.dashboard_port, 8000);
    assert_eq!(config.block_unit_size_m, 3.0);
}

#[test]
fn flags_override_fields() {
    let config = StudioConfig::from_args(&args(&[
        "plotstack",
        "--no-physics",
        "--dashboard-port",
        "0",
        "--boundary",
        "site.json",
        "--export",
        "out/blocks.json",
    ]))
    .unwrap();

    assert!(!config.physics_enabled);
    assert!(!config.physics().enabled);
    assert_eq!(config.dashboard_port, 0);
    assert_eq!(config.boundary, Some(PathBuf::from("site.json")));
    assert_eq!(config.export, Some(PathBuf::from("out/blocks.json")));
    assert_eq!(config.import, None);
}

#[test]
fn bad_port_is_an_error() {
    assert!(StudioConfig::from_args(&args(&["plotstack", "--dashboard-port", "lots"])).is_err());
}

#[test]
fn partial_file_keeps_defaults() {
    let path = std::env::temp_dir().join(format!("plotstack-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "thin_base_height": 0.2, "parallel_cascade": true }"#).unwrap();

    let config =
        StudioConfig::from_args(&args(&["plotstack", "--config", path.to_str().unwrap()])).unwrap();
    assert_eq!(config.thin_base_height, 0.2);
    assert!(config.parallel_cascade);
    assert_eq!(config.physics().layout.thin_base_height, 0.2);
    assert_eq!(config.default_color, 0x8B5A2B);

    let _ = std::fs::remove_file(&path);
}
