#![forbid(unsafe_code)]
//! Conformance gate: runs the membership catalog against the built-in
//! scenario universe and reports the verdicts.
//!
//! Exit codes:
//!   0   every case passed
//!   1   at least one case failed
//!   2   usage error

use anyhow::{Context, Result, bail};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use membrane_engine::conformance::{
    ConformanceReport, membership_conformance_catalog, run_catalog,
};

#[derive(Debug, Serialize)]
struct GateOutput {
    generated_at_utc: String,
    #[serde(flatten)]
    report: ConformanceReport,
}

fn main() {
    let exit_code = match run(std::env::args().skip(1).collect()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error:#}");
            2
        }
    };
    std::process::exit(exit_code);
}

fn run(args: Vec<String>) -> Result<i32> {
    let mut summary = false;
    for arg in &args {
        match arg.as_str() {
            "--summary" => summary = true,
            "help" | "--help" | "-h" => {
                println!("{}", usage());
                return Ok(0);
            }
            other => bail!("unknown argument '{other}'\n\n{}", usage()),
        }
    }

    let catalog = membership_conformance_catalog();
    let report = run_catalog(&catalog);

    if summary {
        print_summary(&report);
    } else {
        let output = GateOutput {
            generated_at_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            report: report.clone(),
        };
        let json = serde_json::to_string_pretty(&output).context("serializing report")?;
        println!("{json}");
    }

    Ok(if report.all_passed() { 0 } else { 1 })
}

fn print_summary(report: &ConformanceReport) {
    for verdict in &report.verdicts {
        let status = if verdict.pass { "PASS" } else { "FAIL" };
        match &verdict.error {
            Some(message) => println!("{status}  {}  ({message})", verdict.case_id),
            None => println!("{status}  {}", verdict.case_id),
        }
    }
    println!(
        "{} cases, {} failed, catalog {}",
        report.case_count, report.failed_count, report.catalog_digest
    );
}

fn usage() -> String {
    [
        "membrane-conformance usage:",
        "  membrane-conformance [--summary]",
        "",
        "exit codes:",
        "  0   every case passed",
        "  1   at least one case failed",
        "  2   usage error",
    ]
    .join("\n")
}
