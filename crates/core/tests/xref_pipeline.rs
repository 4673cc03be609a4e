use std::fs;

use smmu_xref_core::project::ConfigFile;
use smmu_xref_core::services::xref::{sha256_hex, XrefRunner};
use tempfile::tempdir;

const INDENT: &str = "                                ";

#[test]
fn runner_reads_inputs_and_summarizes_without_writing_output() {
    let temp = tempdir().unwrap();
    let dts = temp.path().join("dts");
    fs::create_dir_all(dts.join("qcom")).unwrap();
    fs::write(
        dts.join("qcom").join("sm8150.dtsi"),
        "iommus = <&apps_smmu 0x0100 0x00FF>,\n         <&apps_smmu 0x0200 0x1>;\n\
         bogus = <&apps_smmu 0x0300 xyz>;\n",
    )
    .unwrap();
    fs::write(dts.join("readme.md"), "&apps_smmu 0x0400 0x0").unwrap();

    let target = temp.path().join("qcsmmu8180.inf");
    let inf = format!(
        "[Streams]\n{INDENT}; 0xFF, 0x01, 0x00, 0x00, 0xFF\n{INDENT}; 0xFF, 0x02, 0x00, 0x00, 0x00\n{INDENT}; 0xFF, 0x05, 0x00, 0x00, 0x00\n"
    );
    fs::write(&target, &inf).unwrap();

    let config = ConfigFile {
        source_dir: Some(dts.clone()),
        target: Some(target.clone()),
        ..ConfigFile::default()
    }
    .into_run_config()
    .unwrap();

    let run = XrefRunner::new(&config).run().unwrap();
    let summary = &run.summary;

    assert_eq!(summary.source_files, 1);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.full_matches, 1);
    assert_eq!(summary.mask_mismatches, 1);
    assert_eq!(summary.missing, 0);
    assert_eq!(summary.lines_annotated, 3);
    assert_eq!(summary.lines_found, 1);
    assert_eq!(summary.lines_mask_mismatch, 1);
    assert_eq!(summary.lines_not_found, 1);
    assert_eq!(summary.target_sha256, sha256_hex(inf.as_bytes()));
    assert_eq!(summary.output_sha256, sha256_hex(run.stages.annotated.text.as_bytes()));

    assert!(run
        .stages
        .annotated
        .text
        .contains("; 0xFF, 0x01, 0x00, 0x00, 0xFF ;;;;;;;; Element found in DT: qcom/sm8150.dtsi:0:10"));
    assert_eq!(run.layout.output_path, temp.path().join("qcsmmu8180.inf.commented"));
    assert!(!run.layout.output_path.exists());
}

#[test]
fn runner_fails_when_target_is_missing() {
    let temp = tempdir().unwrap();
    let config = ConfigFile {
        source_dir: Some(temp.path().to_path_buf()),
        target: Some(temp.path().join("missing.inf")),
        ..ConfigFile::default()
    }
    .into_run_config()
    .unwrap();

    let err = XrefRunner::new(&config).run().unwrap_err();
    assert!(err.to_string().contains("Failed to read target file"), "unexpected error: {err}");
}

#[test]
fn sha256_hex_is_lowercase_hex() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}
