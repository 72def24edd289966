use std::fs;

use tempfile::TempDir;
use track_transform::script::discover_scripts;

#[test]
fn lists_matching_files_sorted_and_hides_prelude() {
    let dir = TempDir::new().expect("tempdir");
    for name in [
        "smooth.rhai",
        "prelude.rhai",
        "Boost.rhai",
        "notes.txt",
        "invert.rhai",
    ] {
        fs::write(dir.path().join(name), "").expect("write");
    }
    fs::create_dir(dir.path().join("nested.rhai")).expect("mkdir");

    let scripts = discover_scripts(dir.path(), "rhai", Some("prelude.rhai")).expect("scan");

    let names: Vec<&str> = scripts
        .iter()
        .map(|entry| entry.display_name.as_str())
        .collect();
    assert_eq!(names, ["Boost.rhai", "invert.rhai", "smooth.rhai"]);
    assert_eq!(scripts[1].path, dir.path().join("invert.rhai"));
}

#[test]
fn prelude_is_listed_when_not_configured() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("prelude.rhai"), "").expect("write");

    let scripts = discover_scripts(dir.path(), "rhai", None).expect("scan");
    assert_eq!(scripts.len(), 1);
}

#[test]
fn missing_directory_is_created() {
    let dir = TempDir::new().expect("tempdir");
    let scripts_dir = dir.path().join("user").join("scripts");

    let scripts = discover_scripts(&scripts_dir, "rhai", None).expect("scan");

    assert!(scripts.is_empty());
    assert!(scripts_dir.is_dir());
}

#[test]
fn file_in_place_of_directory_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let blocker = dir.path().join("scripts");
    fs::write(&blocker, "").expect("write");

    let err = discover_scripts(&blocker, "rhai", None).expect_err("not a directory");
    assert!(matches!(err, track_transform::TransformError::Io { .. }));
}
