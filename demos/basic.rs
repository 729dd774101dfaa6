use ise_http::{Body, IseClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ise = IseClient::from_env()?;

    let res = ise.get("/ers/config/internaluser").await?;
    println!("{} internal users", res.get("SearchResult.total").int());
    for name in res.get("SearchResult.resources.#.name").array() {
        println!("- {}", name.str());
    }

    let body = Body::new()
        .set("IdentityGroup.name", "ise-http-demo")
        .set("IdentityGroup.description", "created by the basic demo")
        .set(
            "IdentityGroup.parent",
            "NAC Group:NAC:IdentityGroups:User Identity Groups",
        );
    let (_, location) = ise
        .post_with_location("/ers/config/identitygroup", body)
        .await?;
    if let Some(location) = location {
        println!("created {location}");
    }

    Ok(())
}
