mod support;

use predicates::prelude::*;
use serial_test::serial;
use support::{stdout_json, Sandbox};

#[test]
#[serial]
fn add_list_import_export_round_trip() {
    let sandbox = Sandbox::new();

    sandbox
        .hop()
        .args(["otp", "add", "Mail", "\"op://V/Mail/one-time password\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Mail"));

    let output = sandbox
        .hop()
        .args(["otp", "list", "--json"])
        .output()
        .expect("run list");
    assert!(output.status.success());
    let listed = stdout_json(&output.stdout);
    assert_eq!(
        listed[0]["ref"],
        "op://V/Mail/one-time password?attribute=otp"
    );
    let mail_id = listed[0]["id"].as_str().expect("id").to_string();

    sandbox
        .hop()
        .args(["otp", "import"])
        .write_stdin("mail = op://V/New/otp?attribute=otp\nnot a pair\nBank = op://V/Bank/otp\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Imported 2 OTP entries (1 updated, 1 new)",
        ));

    let output = sandbox
        .hop()
        .args(["otp", "list", "--json"])
        .output()
        .expect("run list");
    let listed = stdout_json(&output.stdout);
    assert_eq!(listed[0]["id"], mail_id.as_str());
    assert_eq!(listed[0]["label"], "Mail");
    assert_eq!(listed[0]["ref"], "op://V/New/otp?attribute=otp");
    assert_eq!(listed[1]["label"], "Bank");

    let output = sandbox
        .hop()
        .args(["otp", "export"])
        .output()
        .expect("run export");
    let exported = stdout_json(&output.stdout);
    assert_eq!(exported.as_array().map(Vec::len), Some(2));
    assert!(exported[0].get("id").is_none());

    assert!(sandbox.state_dir().join("otp_pairs.json").exists());
}

#[test]
#[serial]
fn unknown_alias_and_empty_catalog_fail_cleanly() {
    let sandbox = Sandbox::new();
    sandbox
        .hop()
        .args(["otp", "get", "Mail"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no OTP entries configured"));

    sandbox
        .hop()
        .args(["otp", "add", "Mail", "op://V/I/F"])
        .assert()
        .success();
    sandbox
        .hop()
        .args(["otp", "get", "Bank"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no OTP entry named \"Bank\""));
}

#[test]
#[serial]
fn unusable_import_is_rejected_without_writing() {
    let sandbox = Sandbox::new();
    sandbox
        .hop()
        .args(["otp", "import"])
        .write_stdin("nothing to see here")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid OTP entries"));
    assert!(!sandbox.state_dir().join("otp_pairs.json").exists());
}

#[test]
#[serial]
fn seed_env_populates_first_listing() {
    let sandbox = Sandbox::new();
    sandbox
        .hop()
        .env(
            "HOP_OTP_SEED",
            r#"[{"label":"Mail","ref":"op://V/I/F?attribute=otp"}]"#,
        )
        .args(["otp", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mail"));
    assert!(sandbox.state_dir().join("otp_pairs.json").exists());
}

#[test]
#[serial]
fn edit_and_remove_by_id() {
    let sandbox = Sandbox::new();
    sandbox
        .hop()
        .args(["otp", "add", "Mail", "op://V/I/F"])
        .assert()
        .success();
    let output = sandbox
        .hop()
        .args(["otp", "list", "--json"])
        .output()
        .expect("run list");
    let id = stdout_json(&output.stdout)[0]["id"]
        .as_str()
        .expect("id")
        .to_string();

    sandbox
        .hop()
        .args(["otp", "edit", &id, "--label", "Work Mail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated Work Mail"));
    sandbox
        .hop()
        .args(["otp", "rm", &id])
        .assert()
        .success();
    sandbox
        .hop()
        .args(["otp", "rm", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no OTP entry with id"));
}

#[cfg(unix)]
#[test]
#[serial]
fn get_prints_code_from_op() {
    let sandbox = Sandbox::new();
    let op = support::fake_op(sandbox.dir.path());
    sandbox
        .hop()
        .args(["otp", "add", "Mail", "op://V/I/F"])
        .assert()
        .success();

    sandbox
        .hop()
        .env("HOP_OP_PATH", &op)
        .args(["otp", "get", "mail"])
        .assert()
        .success()
        .stdout(predicate::str::diff("123456\n"));

    sandbox
        .hop()
        .env("HOP_OP_PATH", &op)
        .args(["otp", "doctor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 2.30.0"));
}
