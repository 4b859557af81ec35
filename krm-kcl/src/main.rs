use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use krm_kcl::{ExecTransformer, manifest::Str};
use tracing_subscriber::EnvFilter;

/// KRM function: reads a `ResourceList` on stdin, runs the `KCLRun` program from its
/// `functionConfig` over the items and writes the result to stdout.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Interpreter used to run the program source.
    #[arg(short, long, env = "KRM_KCL_INTERPRETER", default_value = "kcl")]
    interpreter: PathBuf,
    /// Extra argument passed to the interpreter before the program file.
    #[arg(long = "arg", allow_hyphen_values = true)]
    args: Vec<Str>,
    /// Environment variable for the interpreter, as `KEY=VALUE`.
    #[arg(long = "env", value_parser = parse_key_value)]
    env: Vec<(Str, Str)>,
    /// Kill the interpreter after this many seconds.
    #[arg(long, env = "KRM_KCL_TIMEOUT")]
    timeout: Option<u64>,
}

fn parse_key_value(s: &str) -> Result<(Str, Str), String> {
    s.split_once('=')
        .map(|(k, v)| (k.into(), v.into()))
        .ok_or_else(|| format!("expected `KEY=VALUE`, found `{s}`"))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let transformer = ExecTransformer::new(args.interpreter)
        .with_args(args.args)
        .with_env(args.env)
        .with_timeout(args.timeout.map(Duration::from_secs));

    match krm_kcl::run(std::io::stdin().lock(), std::io::stdout().lock(), &transformer).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "krm-kcl",
            "-i",
            "/usr/local/bin/kcl",
            "--arg",
            "run",
            "--arg",
            "-Y",
            "--env",
            "KCL_CACHE=/tmp/a=b",
            "--timeout",
            "30",
        ])
        .unwrap();
        assert_eq!(args.interpreter, PathBuf::from("/usr/local/bin/kcl"));
        assert_eq!(args.args, ["run", "-Y"]);
        assert_eq!(args.env, [(Str::from("KCL_CACHE"), Str::from("/tmp/a=b"))]);
        assert_eq!(args.timeout, Some(30));
    }

    #[test]
    fn rejects_bad_env() {
        assert!(Args::try_parse_from(["krm-kcl", "--env", "NOVALUE"]).is_err());
    }
}
