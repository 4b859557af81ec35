use std::io;

pub mod config;
pub mod filter;
pub mod manifest;
pub mod reslist;
pub mod resource;
pub mod transform;

pub use self::filter::Filter;
pub use self::reslist::{FnResult, ResourceList, Severity};
pub use self::resource::Resource;
pub use self::transform::{ExecTransformer, TransformRequest, Transformer};

/// Reads a `ResourceList` from `input`, runs its `functionConfig` program over the items and
/// writes the resulting `ResourceList` to `output`.
///
/// On failure the original items are written back along with an error result, and the error
/// is returned.
#[tracing::instrument(skip_all)]
pub async fn run(
    input: impl io::Read,
    output: impl io::Write,
    transformer: &dyn Transformer,
) -> anyhow::Result<()> {
    let mut list = reslist::read_resource_list(input)?;

    let result = match &list.function_config {
        Some(function_config) => {
            Filter::new(function_config.clone())
                .filter(transformer, &list.items)
                .await
        }
        None => Err(anyhow::anyhow!("ResourceList is missing `functionConfig`")),
    };

    match result {
        Ok(items) => {
            tracing::debug!(before = list.items.len(), after = items.len(), "transformed items");
            list.items = items;
            reslist::write_resource_list(output, &list)
        }
        Err(err) => {
            list.results.push(FnResult::error(format!("{err:#}")));
            if let Err(write_err) = reslist::write_resource_list(output, &list) {
                tracing::warn!(error = %format!("{write_err:#}"), "failed to write error results");
            }
            Err(err)
        }
    }
}
