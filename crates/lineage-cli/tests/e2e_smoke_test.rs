use std::{fs, path::PathBuf};

use tempfile::tempdir;

use lineage_cli::{Args, run};

fn demos_path() -> PathBuf {
    // Demos live at the workspace root, not inside the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all roster files (.csv, .json) from a directory
fn collect_rosters(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|s| s.to_str()),
                        Some("csv" | "json")
                    )
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn args_for(input: &PathBuf, output: PathBuf, config: Option<PathBuf>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        format: None,
        config: config.map(|path| path.to_string_lossy().to_string()),
        pdf: None,
        seed: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = demos_path();
    let rosters = collect_rosters(demos.clone());

    assert!(!rosters.is_empty(), "No rosters found in demos/");

    let mut failed = Vec::new();

    for roster in &rosters {
        let output_filename = format!("{}.dot", roster.file_name().unwrap().to_string_lossy());
        let output_path = temp_dir.path().join(output_filename);

        let args = args_for(roster, output_path.clone(), Some(demos.join("config.toml")));

        match run(&args) {
            Ok(()) => {
                let dot = fs::read_to_string(&output_path).unwrap();
                assert!(dot.starts_with("digraph"), "{}", roster.display());
                assert!(dot.contains("Chapter Founding"), "{}", roster.display());
            }
            Err(e) => failed.push((roster.clone(), e)),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemo rosters that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo roster(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let rosters = collect_rosters(demos_path().join("errors"));

    assert!(!rosters.is_empty(), "No error rosters found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for roster in &rosters {
        let output_filename = format!(
            "error_{}.dot",
            roster.file_name().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        if run(&args_for(roster, output_path, None)).is_ok() {
            unexpectedly_succeeded.push(roster.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError rosters that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error roster(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_same_seed_same_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let roster = demos_path().join("roster.csv");

    let first = temp_dir.path().join("first.dot");
    let second = temp_dir.path().join("second.dot");
    let mut args = args_for(&roster, first.clone(), None);
    args.seed = Some(11);
    run(&args).unwrap();
    args.output = second.to_string_lossy().to_string();
    run(&args).unwrap();

    assert_eq!(
        fs::read_to_string(first).unwrap(),
        fs::read_to_string(second).unwrap()
    );
}
