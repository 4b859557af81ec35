mod exec;

pub use self::exec::ExecTransformer;

use crate::resource::Resource;

/// Everything a transformer needs to run one program over a batch of resources.
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    pub name: &'a str,
    pub source: &'a str,
    pub function_config: &'a serde_yaml::Value,
}

#[async_trait::async_trait]
pub trait Transformer: Send + Sync {
    /// Runs the program in `request` over `input` and returns the resulting resources.
    /// `input` is left untouched whether or not the program succeeds.
    async fn transform(
        &self,
        request: TransformRequest<'_>,
        input: &[Resource],
    ) -> anyhow::Result<Vec<Resource>>;
}
