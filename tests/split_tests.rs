//! Validation-split extraction behavior.

use std::fs;
use std::path::Path;

use lesionprep::split::{copy_validation_cases, load_split};
use lesionprep::PipelineError;
use tempfile::TempDir;

fn write_volumes(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), format!("volume {name}")).unwrap();
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn copies_only_validation_cases() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("imagesTr");
    let output = tmp.path().join("imagesTs");
    write_volumes(&images, &["case01_0000.nii.gz", "case02_0000.nii.gz"]);

    let manifest = tmp.path().join("splits_final.json");
    fs::write(&manifest, r#"{"0": {"train": ["case01"], "val": ["case02"]}}"#).unwrap();
    let record = load_split(&manifest, "0").unwrap();

    let copied = copy_validation_cases(&images, &output, &record.val, ".nii.gz").unwrap();

    assert_eq!(copied.len(), 1);
    assert_eq!(file_names(&output), vec!["case02_0000.nii.gz"]);
    assert_eq!(
        fs::read_to_string(output.join("case02_0000.nii.gz")).unwrap(),
        "volume case02_0000.nii.gz"
    );
}

/// The original tooling matched case ids by substring containment, so
/// `case1` also selected `case10_0000.nii.gz`. Exact case-id comparison
/// must not reproduce that.
#[test]
fn case_id_prefixes_do_not_collide() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("imagesTr");
    let output = tmp.path().join("imagesTs");
    write_volumes(
        &images,
        &["case1_0000.nii.gz", "case10_0000.nii.gz", "case10_0001.nii.gz"],
    );

    let copied =
        copy_validation_cases(&images, &output, &["case1".to_string()], ".nii.gz").unwrap();

    assert_eq!(copied.len(), 1);
    assert_eq!(file_names(&output), vec!["case1_0000.nii.gz"]);
}

#[test]
fn all_channels_of_a_validation_case_are_copied() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("imagesTr");
    let output = tmp.path().join("imagesTs");
    write_volumes(
        &images,
        &["case02_0000.nii.gz", "case02_0001.nii.gz", "case03_0000.nii.gz"],
    );

    let copied =
        copy_validation_cases(&images, &output, &["case02".to_string()], ".nii.gz").unwrap();

    assert_eq!(copied.len(), 2);
    assert_eq!(
        file_names(&output),
        vec!["case02_0000.nii.gz", "case02_0001.nii.gz"]
    );
}

#[test]
fn files_with_other_endings_are_ignored() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("imagesTr");
    let output = tmp.path().join("imagesTs");
    write_volumes(&images, &["case02_0000.nii.gz", "case02_0000.mha"]);

    let copied =
        copy_validation_cases(&images, &output, &["case02".to_string()], ".nii.gz").unwrap();

    assert_eq!(copied.len(), 1);
    assert_eq!(file_names(&output), vec!["case02_0000.nii.gz"]);
}

#[test]
fn object_and_array_manifests_both_load() {
    let tmp = TempDir::new().unwrap();

    let object = tmp.path().join("object.json");
    fs::write(&object, r#"{"0": {"train": [], "val": ["case02"]}}"#).unwrap();
    assert_eq!(load_split(&object, "0").unwrap().val, vec!["case02"]);

    let array = tmp.path().join("array.json");
    fs::write(
        &array,
        r#"[{"train": ["case01"], "val": ["case02"]}, {"train": ["case02"], "val": ["case01"]}]"#,
    )
    .unwrap();
    assert_eq!(load_split(&array, "1").unwrap().val, vec!["case01"]);
}

#[test]
fn missing_split_key_is_a_typed_error() {
    let tmp = TempDir::new().unwrap();
    let manifest = tmp.path().join("splits_final.json");
    fs::write(&manifest, r#"{"0": {"train": [], "val": []}}"#).unwrap();

    let err = load_split(&manifest, "4").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::SplitNotFound(key)) if key == "4"
    ));
}
