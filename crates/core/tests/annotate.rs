use smmu_xref_core::annotate::{
    annotate_text, line_key, line_status, upsert_annotation, LineStatus, ANNOTATABLE_INDENT,
};
use smmu_xref_core::corpus::SourceFile;
use smmu_xref_core::extract::extract_corpus;
use smmu_xref_core::matcher::{match_records, MatchResult};
use smmu_xref_core::model::{SourceLocation, SourceRecord, StreamPair};
use smmu_xref_core::services::xref::run_stages;

fn record(file: &str, line: usize, id: u16, mask: u16) -> SourceRecord {
    SourceRecord::new(SourceLocation::new(file, line, 0), StreamPair::new(id, mask).canonical_key())
}

fn stream_line(key: &str) -> String {
    format!("{ANNOTATABLE_INDENT}{key}")
}

#[test]
fn single_match_gets_found_comment_and_other_lines_are_untouched() {
    let files = vec![SourceFile::new("dsp.dtsi", "&dsp_smmu 0x0100 0x00FF")];
    let target = format!(
        "[Version]\nSignature=\"$WINDOWS NT$\"\n{}\n; trailing\n",
        stream_line("; 0xFF, 0x01, 0x00, 0x00, 0xFF")
    );

    let stages = run_stages(&files, &target);
    let lines: Vec<&str> = stages.annotated.text.split('\n').collect();

    assert_eq!(lines[0], "[Version]");
    assert_eq!(lines[1], "Signature=\"$WINDOWS NT$\"");
    assert_eq!(
        lines[2],
        format!(
            "{ANNOTATABLE_INDENT}; 0xFF, 0x01, 0x00, 0x00, 0xFF ;;;;;;;; Element found in DT: dsp.dtsi:0:0"
        )
    );
    assert_eq!(lines[3], "; trailing");
    assert_eq!(lines[4], "");
    assert_eq!(stages.annotated.lines.len(), 1);
    assert_eq!(stages.annotated.lines[0].line_index, 2);
}

#[test]
fn exact_match_with_same_id_elsewhere_lists_both_clauses() {
    let result = MatchResult {
        matched: vec![record("a.dtsi", 3, 0x0100, 0x00FF)],
        unmatched: vec![record("b.dtsi", 7, 0x0100, 0x0001)],
    };
    let status = line_status("; 0xFF, 0x01, 0x00, 0x00, 0xFF", &result);

    assert!(matches!(status, LineStatus::FoundWithMaskConflict { .. }));
    assert_eq!(
        status.comment(),
        " ;;;;;;;; Element found in DT: a.dtsi:3:0 ;;;;;;;; Element found in DT with different mask: b.dtsi:7:0"
    );
}

#[test]
fn id_only_match_reports_different_mask_with_all_locations() {
    let result = MatchResult {
        matched: vec![],
        unmatched: vec![record("a.dtsi", 1, 0x0100, 0x0003), record("b.dtsi", 2, 0x0100, 0x0007)],
    };
    let status = line_status("; 0xFF, 0x01, 0x00, 0x00, 0xFF", &result);

    assert_eq!(
        status.comment(),
        " ;;;;;;;; Element found in DT with different mask: a.dtsi:1:0, b.dtsi:2:0"
    );
}

#[test]
fn unknown_stream_is_reported_not_found() {
    let result = MatchResult {
        matched: vec![record("a.dtsi", 1, 0x0200, 0x00FF)],
        unmatched: vec![record("b.dtsi", 2, 0x0300, 0x0000)],
    };
    let status = line_status("; 0xFF, 0x01, 0x00, 0x00, 0xFF", &result);

    assert_eq!(status, LineStatus::NotFound);
    assert_eq!(status.comment(), " ;;;;;;;; Element not found in DT");
}

#[test]
fn lookup_ignores_case_of_the_inf_key() {
    let result = MatchResult { matched: vec![record("a.dtsi", 0, 0x0A0B, 0x00FF)], unmatched: vec![] };
    let status = line_status("; 0xff, 0x0a, 0x0b, 0x00, 0xff", &result);
    assert!(matches!(status, LineStatus::Found { .. }));
}

#[test]
fn annotating_twice_is_byte_identical() {
    let files = vec![
        SourceFile::new("a.dtsi", "&a_smmu 0x0100 0x00FF\n&a_smmu 0x0100 0x0001\n"),
        SourceFile::new("b.dtsi", "&b_smmu 0x0200 0x0000\n"),
    ];
    let target = format!(
        "[Streams]\n{}\n{}\n{}\n",
        stream_line("; 0xFF, 0x01, 0x00, 0x00, 0xFF"),
        stream_line("; 0xFF, 0x02, 0x00, 0x00, 0x0F"),
        stream_line("; 0xFF, 0x03, 0x00, 0x00, 0x00"),
    );

    let once = run_stages(&files, &target).annotated.text;
    let twice = run_stages(&files, &once).annotated.text;

    assert_ne!(once, target);
    assert_eq!(once, twice);
}

#[test]
fn stale_annotation_is_replaced_not_stacked() {
    let line = stream_line("; 0xFF, 0x01, 0x00, 0x00, 0xFF ;;;;;;;; Element not found in DT");
    let result = MatchResult { matched: vec![record("a.dtsi", 4, 0x0100, 0x00FF)], unmatched: vec![] };

    let annotated = annotate_text(&line, &result);
    assert_eq!(
        annotated.text,
        stream_line("; 0xFF, 0x01, 0x00, 0x00, 0xFF ;;;;;;;; Element found in DT: a.dtsi:4:0")
    );
}

#[test]
fn upsert_keeps_text_before_the_marker() {
    assert_eq!(upsert_annotation("key, rest", " ;;;;;;;; Element x"), "key, rest ;;;;;;;; Element x");
    assert_eq!(
        upsert_annotation("key, rest ;;;;;;;; Element old ;;;;;;;; Element older", " ;;;;;;;; Element x"),
        "key, rest ;;;;;;;; Element x"
    );
}

#[test]
fn crlf_input_is_normalized_to_lf() {
    let target = format!("[Streams]\r\n{}\r\n", stream_line("; 0xFF, 0x01, 0x00, 0x00, 0xFF"));
    let annotated = annotate_text(&target, &MatchResult::default());

    assert!(!annotated.text.contains('\r'));
    assert!(annotated.text.ends_with("0xFF ;;;;;;;; Element not found in DT\n"));
}

#[test]
fn lines_that_do_not_carry_a_full_key_pass_through() {
    let short = stream_line("; 0xFF, 0x01");
    let over_indented = format!(" {}", stream_line("; 0xFF, 0x01, 0x00, 0x00, 0xFF"));
    let unindented = "; 0xFF, 0x01, 0x00, 0x00, 0xFF".to_string();

    for line in [&short, &over_indented, &unindented] {
        assert_eq!(line_key(line), None);
        let annotated = annotate_text(line, &MatchResult::default());
        assert_eq!(&annotated.text, line);
        assert!(annotated.lines.is_empty());
    }
}

#[test]
fn line_key_takes_thirty_characters_after_the_indent() {
    let line = stream_line("; 0xFF, 0x01, 0x00, 0x00, 0xFF, ; comment");
    assert_eq!(line_key(&line), Some("; 0xFF, 0x01, 0x00, 0x00, 0xFF"));
}

#[test]
fn extraction_and_matching_feed_the_annotator() {
    let files = vec![SourceFile::new("x.dtsi", "\n  &x_smmu 0x0001 0x0000")];
    let target = stream_line("; 0xFF, 0x00, 0x01, 0x00, 0x00");
    let extraction = extract_corpus(&files);
    let matching = match_records(&extraction.records, &target);
    let annotated = annotate_text(&target, &matching.result);

    assert!(annotated.text.ends_with(" ;;;;;;;; Element found in DT: x.dtsi:1:2"));
}
