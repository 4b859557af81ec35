use crate::{
    config::{DEFAULT_PROGRAM_NAME, KclRun},
    resource::Resource,
    transform::{TransformRequest, Transformer},
};

/// Runs the program named by a `KCLRun` function config over a batch of resources.
#[derive(Debug, Clone)]
pub struct Filter {
    function_config: serde_yaml::Value,
}

impl Filter {
    pub fn new(function_config: serde_yaml::Value) -> Self {
        Self { function_config }
    }

    pub fn parse_config(&self) -> anyhow::Result<KclRun> {
        KclRun::from_value(&self.function_config)
    }

    /// Errors from decoding the config and from the transformer are returned as is.
    #[tracing::instrument(skip_all, fields(items = input.len()))]
    pub async fn filter(
        &self,
        transformer: &dyn Transformer,
        input: &[Resource],
    ) -> anyhow::Result<Vec<Resource>> {
        let config = self.parse_config()?;
        tracing::debug!(name = config.name(), "parsed function config");

        let request = TransformRequest {
            name: DEFAULT_PROGRAM_NAME,
            source: config.source(),
            function_config: &self.function_config,
        };
        transformer.transform(request, input).await
    }
}
