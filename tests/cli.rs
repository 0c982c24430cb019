mod common;

use common::{COMPANY_EXPORT, TestWorkspace, fixture_path, melter};
use predicates::{prelude::PredicateBooleanExt, str::contains};

const DUPLICATE_IDS: &str = "id,Turnover 1,Turnover 2\na,1,2\na,3,4\n";

#[test]
fn melt_writes_long_rows_and_drops_empty_ones() {
    let workspace = TestWorkspace::new();
    let output = workspace.file("long.csv");
    melter()
        .args([
            "melt",
            "-i",
            fixture_path(COMPANY_EXPORT).to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--id",
            "Company name",
            "--var",
            "Turnover_,Headcount_",
            "--drop-empty-rows",
        ])
        .assert()
        .success();

    let contents = workspace.read("long.csv");
    let lines = contents.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            "Company_name,Number,Turnover_,Headcount_",
            "Acme Robotics,1,1200000,14",
            "Acme Robotics,2,1350000,18",
            "Bright Foods,1,560000,6",
        ]
    );
}

#[test]
fn melt_keeps_every_identifier_and_sequence_without_dropping() {
    let workspace = TestWorkspace::new();
    let output = workspace.file("long.csv");
    melter()
        .args([
            "melt",
            "-i",
            fixture_path(COMPANY_EXPORT).to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--id",
            "Company_name",
            "--var",
            "Turnover_",
        ])
        .assert()
        .success();

    let contents = workspace.read("long.csv");
    let lines = contents.lines().collect::<Vec<_>>();
    // four identifier tuples (including the blank row) times three sequence numbers
    assert_eq!(lines.len(), 1 + 4 * 3);
    assert_eq!(lines[3], "Acme Robotics,3,");
    assert_eq!(lines[7], ",1,");
    assert_eq!(lines[10], "\"Cobalt, Inc\",1,");
}

#[test]
fn melt_to_stdout_with_row_index() {
    let input = fixture_path(COMPANY_EXPORT);
    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            "-",
            "--id",
            "Beauhurst_URL",
            "--var",
            "Headcount_",
            "--drop-empty-rows",
            "--row-index",
            "--sequence-column",
            "Year",
        ])
        .assert()
        .success()
        .stdout(contains(",Beauhurst_URL,Year,Headcount_\n"))
        .stdout(contains(
            "2,https://platform.beauhurst.com/company/bright/,1,6\n",
        ));
}

#[test]
fn melt_reports_duplicate_axis_without_output() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("dupes.csv", "id,Postcode 1,Postcode - 1\na,AB1,CD2\n");
    let output = workspace.file("new_df.csv");
    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--id",
            "id",
            "--var",
            "Postcode_",
        ])
        .assert()
        .failure()
        .stderr(contains("Duplicate Column Error"))
        .stderr(contains("Postcode_1"));
    assert!(!output.exists());
}

#[test]
fn melt_reports_shape_mismatch_for_repeated_identifiers() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("repeat.csv", DUPLICATE_IDS);
    let output = workspace.file("new_df.csv");
    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--id",
            "id",
            "--var",
            "Turnover_",
        ])
        .assert()
        .failure()
        .stderr(contains("Data Transformation Error"));
    assert!(!output.exists());

    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--id",
            "id",
            "--var",
            "Turnover_",
            "--allow-duplicate-ids",
        ])
        .assert()
        .success();
    assert_eq!(
        workspace.read("new_df.csv"),
        "id,Number,Turnover_\na,1,1\na,2,2\n"
    );
}

#[test]
fn melt_reports_unexpected_errors_with_message() {
    let input = fixture_path(COMPANY_EXPORT);
    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            "-",
            "--id",
            "Company number",
            "--var",
            "Turnover_",
        ])
        .assert()
        .failure()
        .stderr(contains("Unexpected Error: identifier column 'Company number' not found"));
}

#[test]
fn exact_match_excludes_longer_stems() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "regions.csv",
        "id,Turnover 1,Turnover Region 1\na,5,North\n",
    );
    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            "-",
            "--id",
            "id",
            "--var",
            "Turnover_",
        ])
        .assert()
        .success()
        .stdout(contains("id,Number,Turnover_,Turnover_Region_\n"));

    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            "-",
            "--id",
            "id",
            "--var",
            "Turnover_",
            "--match",
            "exact",
        ])
        .assert()
        .success()
        .stdout("id,Number,Turnover_\na,1,5\n");
}

#[test]
fn saved_plan_reproduces_melt() {
    let workspace = TestWorkspace::new();
    let input = fixture_path(COMPANY_EXPORT);
    let plan = workspace.file("plan.yaml");
    let first = workspace.file("first.csv");
    let second = workspace.file("second.csv");
    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            first.to_str().unwrap(),
            "--id",
            "Company name",
            "--var",
            "Headcount_",
            "--drop-empty-rows",
            "--save-plan",
            plan.to_str().unwrap(),
        ])
        .assert()
        .success();

    let saved = workspace.read("plan.yaml");
    assert!(saved.contains("Company_name"));
    assert!(saved.contains("drop_empty_rows: true"));

    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            second.to_str().unwrap(),
            "--plan",
            plan.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert_eq!(workspace.read("first.csv"), workspace.read("second.csv"));
}

#[test]
fn table_flag_prints_instead_of_writing() {
    let workspace = TestWorkspace::new();
    let output = workspace.file("new_df.csv");
    melter()
        .args([
            "melt",
            "-i",
            fixture_path(COMPANY_EXPORT).to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--id",
            "Company_name",
            "--var",
            "Headcount_",
            "--drop-empty-rows",
            "--table",
        ])
        .assert()
        .success()
        .stdout(contains("Company_name"))
        .stdout(contains("Acme Robotics"));
    assert!(!output.exists());
}

#[test]
fn preview_shows_rows_and_blank_warnings() {
    melter()
        .args([
            "preview",
            "-i",
            fixture_path(COMPANY_EXPORT).to_str().unwrap(),
            "--rows",
            "2",
        ])
        .assert()
        .success()
        .stdout(contains("Acme Robotics"))
        .stdout(contains("Bright Foods"))
        .stdout(contains("Cobalt").not())
        .stderr(contains(
            "The following columns are completely blank and should be removed: Notes",
        ))
        .stderr(contains(
            "The following rows are completely blank and should be removed: 2",
        ));
}

#[test]
fn columns_json_lists_stems_and_diagnostics() {
    let output = melter()
        .args([
            "columns",
            "-i",
            fixture_path(COMPANY_EXPORT).to_str().unwrap(),
            "--id",
            "Company name",
            "--json",
        ])
        .output()
        .expect("run columns");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["identifiers"], serde_json::json!(["Company_name"]));
    assert_eq!(
        report["candidate_stems"],
        serde_json::json!([
            "Beauhurst_URL",
            "Companies_House_ID",
            "Turnover_",
            "Headcount_",
            "Head_Office_Address_Postcode_(if_UK)",
            "Notes"
        ])
    );
    assert_eq!(report["collisions"], serde_json::json!([]));
    assert_eq!(report["diagnostics"]["blank_columns"], serde_json::json!(["Notes"]));
    assert_eq!(report["diagnostics"]["blank_rows"], serde_json::json!([2]));
    assert_eq!(
        report["columns"][3]["normalized"],
        serde_json::json!("Turnover_1")
    );
}

#[test]
fn columns_table_flags_collisions() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("dupes.csv", "id,Postcode 1,Postcode - 1\na,AB1,CD2\n");
    melter()
        .args(["columns", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("duplicate"))
        .stdout(contains("Candidate stems:"))
        .stderr(contains("Several headers normalize to 'Postcode_1'"));
}

#[test]
fn tab_delimited_input_is_detected_by_extension() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("export.tsv", "id\tScore 1\tScore 2\na\t7\t9\n");
    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            "-",
            "--id",
            "id",
            "--var",
            "Score_",
        ])
        .assert()
        .success()
        .stdout("id,Number,Score_\na,1,7\na,2,9\n");
}

#[test]
fn identifier_with_comma_is_taken_whole() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("firms.csv", "\"Name, Inc\",Score 1\nAcme,3\n");
    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            "-",
            "--id",
            "Name, Inc",
            "--var",
            "Score_",
        ])
        .assert()
        .success()
        .stdout(contains("Acme,1,3\n"));
}

#[test]
fn drop_empty_rows_ignores_longer_prefix_matches() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "regions.csv",
        "id,Turnover 1,Turnover Region 1\na,,North\nb,7,\n",
    );
    melter()
        .args([
            "melt",
            "-i",
            input.to_str().unwrap(),
            "-o",
            "-",
            "--id",
            "id",
            "--var",
            "Turnover_",
            "--drop-empty-rows",
        ])
        .assert()
        .success()
        .stdout("id,Number,Turnover_,Turnover_Region_\nb,1,7,\n");
}
