use krm_kcl::{Filter, Resource, TransformRequest, Transformer};

fn main() {
    divan::main();
}

struct Identity;

#[async_trait::async_trait]
impl Transformer for Identity {
    async fn transform(
        &self,
        _request: TransformRequest<'_>,
        input: &[Resource],
    ) -> anyhow::Result<Vec<Resource>> {
        Ok(input.to_vec())
    }
}

fn items(n: usize) -> Vec<Resource> {
    (0..n)
        .map(|i| {
            serde_yaml::from_str(&format!(
                "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: app-{i}\nspec:\n  replicas: 1\n"
            ))
            .unwrap()
        })
        .collect()
}

fn filter() -> Filter {
    Filter::new(
        serde_yaml::from_str(
            "apiVersion: krm.kcl.dev/v1alpha1\nkind: KCLRun\nspec:\n  source: items = option(\"items\")\n",
        )
        .unwrap(),
    )
}

#[divan::bench(args = [1, 100, 1000])]
#[tokio::main(flavor = "current_thread")]
async fn filter_identity(n: usize) -> Vec<Resource> {
    let input = items(n);
    filter().filter(&Identity, &input).await.unwrap()
}

#[divan::bench]
fn parse_config() -> krm_kcl::config::KclRun {
    filter().parse_config().unwrap()
}
