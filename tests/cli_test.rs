use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn map_refuses_to_run_without_credential() {
    let dir = tempfile::tempdir().unwrap();
    let ids_path = dir.path().join("payment_ids.txt");
    let mut ids = std::fs::File::create(&ids_path).unwrap();
    writeln!(ids, "pi_A").unwrap();

    let mut cmd = Command::new(cargo_bin!("payfind"));
    cmd.current_dir(dir.path())
        .env_remove("STRIPE_SECRET_KEY")
        .arg("map")
        .arg(&ids_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("STRIPE_SECRET_KEY"));
}

#[test]
fn enrich_degrades_to_account_names_without_credential() {
    let dir = tempfile::tempdir().unwrap();

    let mapping_path = dir.path().join("mapping.csv");
    let mut mapping = std::fs::File::create(&mapping_path).unwrap();
    writeln!(
        mapping,
        "payment_id,account_id,account_name,customer_name,event_name,amount,currency,status,transaction_date_est,payout_status,payout_date"
    )
    .unwrap();
    writeln!(mapping, "pi_A,acct_p,Platform,,,50.00,USD,succeeded,,,").unwrap();

    let report_path = dir.path().join("report.csv");
    let mut report = std::fs::File::create(&report_path).unwrap();
    writeln!(report, "Payment Ref,Amount").unwrap();
    writeln!(report, "pi_A,50.00").unwrap();

    let output_path = dir.path().join("enriched.csv");
    let mut cmd = Command::new(cargo_bin!("payfind"));
    cmd.current_dir(dir.path())
        .env_remove("STRIPE_SECRET_KEY")
        .arg("enrich")
        .arg(&report_path)
        .arg("--mapping")
        .arg(&mapping_path)
        .arg("--output")
        .arg(&output_path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Loaded 1 payment mappings"))
        .stderr(predicate::str::contains("STRIPE_SECRET_KEY not set"));

    let enriched = std::fs::read_to_string(&output_path).unwrap();
    let mut lines = enriched.lines();
    assert_eq!(
        lines.next(),
        Some("Payment Ref,Amount,Stripe Account Name,Transfer/Payout ID,Bank Account,Bank Deposit Date")
    );
    assert_eq!(lines.next(), Some("pi_A,50.00,Platform,,,"));
}

#[test]
fn enrich_fails_when_no_id_column_exists() {
    let dir = tempfile::tempdir().unwrap();

    let mapping_path = dir.path().join("mapping.csv");
    let mut mapping = std::fs::File::create(&mapping_path).unwrap();
    writeln!(mapping, "payment_id,account_id,account_name").unwrap();

    let report_path = dir.path().join("report.csv");
    let mut report = std::fs::File::create(&report_path).unwrap();
    writeln!(report, "Name,Amount").unwrap();
    writeln!(report, "Gala,50.00").unwrap();

    let mut cmd = Command::new(cargo_bin!("payfind"));
    cmd.current_dir(dir.path())
        .env_remove("STRIPE_SECRET_KEY")
        .arg("enrich")
        .arg(&report_path)
        .arg("--mapping")
        .arg(&mapping_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("payment ids"));
}
