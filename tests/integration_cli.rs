use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ballistics-cli"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn write_preset(root: &Path, dir: &str, name: &str, content: &str) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{name}.json")), content).unwrap();
}

/// A preset tree whose armour is far too strong for the bullet
fn stopping_preset_dir(root: &Path) {
    write_preset(
        root,
        "weapon_data",
        "test_pistol",
        r#"{ "barrel_length": 0.114, "muzzle_velocity": 360.0 }"#,
    );
    write_preset(
        root,
        "bullet_data",
        "test_9mm",
        r#"{
            "bullet": {
                "caliber": { "value": 9.0, "unit": "mm" },
                "core_material": {
                    "name": "lead",
                    "mass": { "value": 8.0, "unit": "g" },
                    "density": { "value": 11.34, "unit": "g/cm3" }
                },
                "ballistic_coefficient": 0.15,
                "shape": "round_nose",
                "jacket": { "material": "copper" }
            },
            "muzzle_velocity": { "value": 360.0, "unit": "m/s" }
        }"#,
    );
    write_preset(
        root,
        "air_data",
        "test_air",
        r#"{ "density": 1.2, "drag_coefficient": 0.295 }"#,
    );
    write_preset(
        root,
        "tissue_data",
        "test_tissue",
        r#"{ "density": 1060.0, "drag_coefficient": 0.295 }"#,
    );
    write_preset(
        root,
        "armour_data",
        "steel_plate",
        r#"{
            "material": "steel",
            "thickness_meters": 0.01,
            "energy_absorption_joules_per_m2": 1.0e8,
            "test_standard": "NIJ 0101.06 Level III"
        }"#,
    );
}

#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("simulate"), "Should list simulate command");
    assert!(stdout.contains("presets"), "Should list presets command");
    assert!(stdout.contains("info"), "Should list info command");
}

#[test]
fn test_cli_simulate_table() {
    let output = run_cli(&["simulate", "--time-step", "1e-6", "--chart"]);

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TERMINAL BALLISTICS RESULTS"));
    assert!(stdout.contains("AIR (unc_air"));
    assert!(stdout.contains("ARMOUR (class_2)"));
    assert!(stdout.contains("TISSUE (unc_tissue"));
    assert!(stdout.contains("Energy Distribution Across Mediums"));
}

#[test]
fn test_cli_output_format_json() {
    let output = run_cli(&["simulate", "--time-step", "1e-6", "--output", "json"]);

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("Should be JSON");

    assert_eq!(report["armour_result"]["penetration"], true);
    assert_eq!(report["tissue"]["outcome"], "penetrated");
    let air_velocity = report["air"]["final_velocity"].as_f64().unwrap();
    assert!(air_velocity > 300.0 && air_velocity < 375.0);
}

#[test]
fn test_cli_output_format_csv() {
    let output = run_cli(&["simulate", "--time-step", "1e-6", "--output", "csv"]);

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "Header plus three stages: {stdout}");
    assert!(lines[0].starts_with("stage,"));
    assert!(lines[1].starts_with("air,"));
    assert!(lines[2].starts_with("armour,"));
    assert!(lines[3].starts_with("tissue,"));
}

#[test]
fn test_cli_unknown_preset_fails() {
    let output = run_cli(&["simulate", "--bullet", "50bmg"]);

    assert!(!output.status.success(), "Unknown preset should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("50bmg"), "Error should name the preset: {stderr}");
}

#[test]
fn test_cli_step_limit_fails() {
    let output = run_cli(&["simulate", "--time-step", "1e-6", "--max-steps", "10"]);

    assert!(!output.status.success(), "Step limit should abort the run");
}

#[test]
fn test_cli_directory_presets_stopped() {
    let dir = tempfile::tempdir().unwrap();
    stopping_preset_dir(dir.path());
    let root = dir.path().to_str().unwrap();

    let output = run_cli(&[
        "simulate",
        "--preset-dir", root,
        "--weapon", "test_pistol",
        "--bullet", "test_9mm",
        "--air", "test_air",
        "--armour", "steel_plate",
        "--tissue", "test_tissue",
        "--time-step", "1e-6",
    ]);

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ARMOUR (steel_plate)"));
    assert!(stdout.contains("did not penetrate"));
}

#[test]
fn test_cli_presets_listing() {
    let output = run_cli(&["presets"]);

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["glock_17", "9mm", "unc_air", "unc_tissue", "class_1", "class_2"] {
        assert!(stdout.contains(name), "Should list {name}");
    }
}

#[test]
fn test_cli_presets_listing_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    stopping_preset_dir(dir.path());

    let output = run_cli(&["presets", "--preset-dir", dir.path().to_str().unwrap()]);

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("steel_plate"));
    assert!(stdout.contains("test_air"));
    assert!(!stdout.contains("glock_17"));
}

#[test]
fn test_cli_info() {
    let output = run_cli(&["info"]);

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TERMINAL BALLISTICS"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_cli(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
}
