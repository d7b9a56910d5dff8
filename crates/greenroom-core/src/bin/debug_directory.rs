use anyhow::{Context, Result};
use greenroom_core::metadata::{HttpMetadataClient, MetadataApi};
use greenroom_core::store::DirectoryStore;

/// One-shot directory dump against the real metadata service.
///
/// Env: GREENROOM_METADATA_URL (required), GREENROOM_API_TOKEN (optional),
/// GREENROOM_ACTOR_ID (required, partitions the result).
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let base_url =
        std::env::var("GREENROOM_METADATA_URL").context("GREENROOM_METADATA_URL not set")?;
    let actor_id = std::env::var("GREENROOM_ACTOR_ID").context("GREENROOM_ACTOR_ID not set")?;
    let auth_token = std::env::var("GREENROOM_API_TOKEN").ok();

    let client = HttpMetadataClient::new(base_url, auth_token);

    println!("Fetching communities-with-channels...\n");
    let fetched = client.communities_with_channels().await?;
    println!("Got {} communities\n", fetched.len());

    let mut directory = DirectoryStore::new();
    directory.replace(&actor_id, fetched);

    match directory.own_community() {
        Some(entry) => {
            println!(
                "Own community: {} ({} channels)",
                entry.community.display_name,
                entry.channels.len()
            );
            for channel in &entry.channels {
                println!(
                    "  [{}] {} -> {}",
                    channel.position,
                    channel.name,
                    channel
                        .messaging_channel_ref
                        .as_deref()
                        .unwrap_or("<not provisioned>")
                );
            }
        }
        None => println!("No own community for actor {actor_id}"),
    }

    println!();
    for entry in directory.other_communities() {
        println!(
            "{}: {} channels",
            entry.community.display_name,
            entry.channels.len()
        );
        for channel in &entry.channels {
            println!(
                "  [{}] {} (min tier {}) -> {}",
                channel.position,
                channel.name,
                channel.minimum_tier_required,
                channel
                    .messaging_channel_ref
                    .as_deref()
                    .unwrap_or("<not provisioned>")
            );
        }
    }

    Ok(())
}
