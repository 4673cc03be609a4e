use std::fs;
use std::path::Path;

use smmu_xref::canonicalize_or_current;
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result =
        canonicalize_or_current(Path::new(".")).expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");

    std::env::set_current_dir(original).expect("restore cwd");
    assert_eq!(result, expected);
}

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");

    let result = canonicalize_or_current(&subdir).expect("canonicalize nested");
    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));
}

#[test]
fn canonicalize_or_current_keeps_missing_absolute_path() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("out").join("file.inf.commented");

    let result = canonicalize_or_current(&missing).expect("resolve missing");
    assert_eq!(result, missing);
}
