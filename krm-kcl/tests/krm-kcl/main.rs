use std::{path::Path, time::Duration};

use anyhow::Context;
use krm_kcl::ExecTransformer;

datatest_stable::harness! {
    { test = test, root = "tests/krm-kcl/testdata", pattern = r".*/input.yaml" },
}

// Each case's program is a shell script, run with `sh` as the interpreter.
fn test(path: &Path) -> datatest_stable::Result<()> {
    let dir = path.parent().unwrap();
    let input = std::fs::read(path).context("reading input")?;
    let transformer = ExecTransformer::new("sh").with_timeout(Some(Duration::from_secs(30)));

    let mut out = Vec::new();
    let runtime = tokio::runtime::Runtime::new()?;
    let expected_stderr = dir.join("expected.stderr");

    match runtime.block_on(krm_kcl::run(input.as_slice(), &mut out, &transformer)) {
        Ok(()) => {
            if expected_stderr.exists() {
                return Err(format!("expected {} to fail", path.display()).into());
            }
            let actual = String::from_utf8(out)?;
            snapshot(&dir.join("expected.yaml"), &actual)?;
        }
        Err(err) => {
            let actual = format!("{err:#}");
            eprintln!("Error running {}: {actual}", path.display());
            let expected = std::fs::read_to_string(&expected_stderr)
                .with_context(|| format!("reading {}", expected_stderr.display()))?;
            if !actual.contains(expected.trim()) {
                return Err(format!(
                    "error for {} does not contain `{}`:\n{actual}",
                    path.display(),
                    expected.trim()
                )
                .into());
            }

            // The original items are written back alongside the error.
            let written = krm_kcl::reslist::read_resource_list(out.as_slice())?;
            let original = krm_kcl::reslist::read_resource_list(input.as_slice())?;
            assert_eq!(written.items, original.items);
            assert_eq!(written.results.len(), 1);
        }
    }

    Ok(())
}

// Documents are compared as values, so formatting differences are not failures.
fn snapshot(path: &Path, actual: &str) -> datatest_stable::Result<()> {
    if !path.exists() || std::env::var("UPDATE_SNAPSHOTS").is_ok() {
        std::fs::write(path, actual).context("writing snapshot")?;
        return Ok(());
    }

    let expected = std::fs::read_to_string(path).context("reading snapshot")?;
    let expected_value = serde_yaml::from_str::<serde_yaml::Value>(&expected)?;
    let actual_value = serde_yaml::from_str::<serde_yaml::Value>(actual)?;
    if expected_value == actual_value {
        return Ok(());
    }

    let expected = serde_yaml::to_string(&expected_value)?;
    let chunks = dissimilar::diff(&expected, actual);
    eprintln!(
        "Snapshot mismatch for {}:\n{}",
        path.display(),
        format_chunks(chunks)
    );

    Err(format!("Snapshot mismatch for {}", path.display()).into())
}

fn format_chunks(chunks: Vec<dissimilar::Chunk<'_>>) -> String {
    let mut buf = String::new();
    for chunk in chunks {
        let formatted = match chunk {
            dissimilar::Chunk::Equal(text) => text.into(),
            dissimilar::Chunk::Delete(text) => format!("\x1b[4m\x1b[31m{}\x1b[0m", text),
            dissimilar::Chunk::Insert(text) => format!("\x1b[4m\x1b[32m{}\x1b[0m", text),
        };
        buf.push_str(&formatted);
    }
    buf
}
