mod common;

use common::{run_fline, test_uid};
use std::fs;
use std::os::unix::fs::PermissionsExt;

#[test]
fn destroy_without_create_succeeds() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let file = dir.path().join("main.sh");
    fs::write(&file, b"#!/bin/sh\necho untouched\n").expect("write script");

    let uid = test_uid("destroy");
    let (output, result) = run_fline(&[
        "destroy",
        "script-execute",
        "--file",
        file.to_str().expect("utf-8 path"),
        "--uid",
        uid.as_str(),
    ])
    .expect("run fline");

    assert!(output.status.success());
    assert_eq!(result["success"], true);
    assert_eq!(result["code"], 200);
    assert_eq!(result["result"]["uid"], uid.as_str());
}

#[test]
fn create_then_destroy_round_trips_a_raw_script() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let file = dir.path().join("probe.py");
    let body = b"#!/bin/sh\necho \"$@\"\n";
    fs::write(&file, body).expect("write script");
    fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).expect("chmod");

    let uid = test_uid("roundtrip");
    let path = file.to_str().expect("utf-8 path");
    let (output, result) = run_fline(&[
        "create",
        "script-execute",
        "--file",
        path,
        "--file-args",
        "x@@y",
        "--uid",
        uid.as_str(),
    ])
    .expect("run create");

    assert!(output.status.success(), "create failed: {result}");
    assert_eq!(result["success"], true);
    let execution = result["result"]["execution"].as_str().expect("execution");
    assert!(execution.contains("x y"), "unexpected output: {execution}");

    let (output, result) =
        run_fline(&["destroy", "script-execute", "--file", path, "--uid", uid.as_str()])
            .expect("run destroy");
    assert!(output.status.success(), "destroy failed: {result}");

    assert_eq!(fs::read(&file).expect("read restored"), body);
    let mode = fs::metadata(&file).expect("stat").permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

#[test]
fn missing_file_flag_reports_the_parameter_code() {
    let uid = test_uid("missing");
    let (output, result) =
        run_fline(&["create", "script-execute", "--uid", uid.as_str()]).expect("run fline");

    assert!(!output.status.success());
    assert_eq!(result["success"], false);
    assert_eq!(result["code"], 45);
    let error = result["error"].as_str().expect("error message");
    assert!(error.contains("file"), "unexpected error: {error}");
}
