use std::{
    io,
    path::PathBuf,
    process::Stdio,
    time::{Duration, Instant},
};

use anyhow::{Context, bail};
use indexmap::IndexMap;
use serde::Deserialize as _;
use tokio::io::AsyncWriteExt as _;

use crate::{
    manifest::{Str, Symbol, kind},
    reslist::ResourceList,
    resource::Resource,
};

use super::{TransformRequest, Transformer};

/// Runs the program with an external interpreter process.
///
/// The source is written to `<tempdir>/<request.name>` and the interpreter is invoked as
/// `path args... <program>` from within that directory. The input items and the function
/// config are written to its stdin as a `ResourceList`; stdout may hold a `ResourceList`,
/// a stream of resource documents, or a sequence of resources.
#[derive(Debug, Clone)]
pub struct ExecTransformer {
    path: PathBuf,
    args: Box<[Str]>,
    env: IndexMap<Str, Str>,
    timeout: Option<Duration>,
}

impl ExecTransformer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Box::default(),
            env: IndexMap::default(),
            timeout: None,
        }
    }

    pub fn with_args<S: Into<Str>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env<K, V>(mut self, env: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Str>,
        V: Into<Str>,
    {
        self.env
            .extend(env.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl Transformer for ExecTransformer {
    #[tracing::instrument(
        skip_all,
        fields(program = request.name, interpreter = %self.path.display(), items = input.len())
    )]
    async fn transform(
        &self,
        request: TransformRequest<'_>,
        input: &[Resource],
    ) -> anyhow::Result<Vec<Resource>> {
        let workdir = tempfile::tempdir().context("create interpreter working directory")?;
        let program = workdir.path().join(request.name);
        tokio::fs::write(&program, request.source)
            .await
            .with_context(|| format!("write program to `{}`", program.display()))?;

        let mut cmd = tokio::process::Command::new(&self.path);
        cmd.args(self.args.iter().map(Str::as_str))
            .arg(&program)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .current_dir(workdir.path())
            .kill_on_drop(true);

        let mut proc = cmd
            .spawn()
            .with_context(|| format!("spawn interpreter at `{}`", self.path.display()))?;

        let list = ResourceList::new(input.iter().cloned())
            .with_function_config(request.function_config.clone());
        let stdin = serde_yaml::to_string(&list)?;
        let mut pipe = proc.stdin.take().context("interpreter stdin is not piped")?;

        let now = Instant::now();

        // Feed stdin while draining stdout so neither side blocks on a full pipe.
        let write = async move {
            let written = pipe.write_all(stdin.as_bytes()).await;
            drop(pipe);
            written
        };
        let run = async { tokio::join!(write, proc.wait_with_output()) };
        let (written, output) = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, run)
                .await
                .map_err(|_| anyhow::anyhow!("interpreter timed out after {timeout:?}"))?,
            None => run.await,
        };

        let output = output.context("wait for interpreter process")?;
        if !output.status.success() {
            bail!(
                "interpreter failed with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        match written {
            // The program is free to ignore its input.
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
            written => written.context("write to interpreter stdin")?,
        }

        tracing::info!(
            duration = ?now.elapsed(),
            cmd = ?cmd.as_std(),
            "executed interpreter"
        );

        if !output.stderr.is_empty() {
            tracing::debug!(stderr = %String::from_utf8_lossy(&output.stderr), "interpreter stderr");
        }

        parse_output(&output.stdout)
    }
}

fn parse_output(stdout: &[u8]) -> anyhow::Result<Vec<Resource>> {
    let mut resources: Vec<Resource> = vec![];
    for document in serde_yaml::Deserializer::from_slice(stdout) {
        let value =
            serde_yaml::Value::deserialize(document).context("parsing interpreter output")?;
        match value {
            serde_yaml::Value::Null => continue,
            serde_yaml::Value::Sequence(items) => {
                for item in items {
                    resources.push(
                        serde_yaml::from_value(item).context("parsing interpreter output item")?,
                    );
                }
            }
            value
                if value.get("kind").and_then(|kind| kind.as_str())
                    == Some(kind::ResourceList::VALUE) =>
            {
                let list = serde_yaml::from_value::<ResourceList>(value)
                    .context("parsing interpreter output ResourceList")?;
                resources.extend(list);
            }
            value => resources
                .push(serde_yaml::from_value(value).context("parsing interpreter output item")?),
        }
    }

    Ok(resources)
}
