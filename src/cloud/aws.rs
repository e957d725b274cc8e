use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, Region, SdkConfig};

const FALLBACK_REGION: &str = "us-west-2";

pub async fn shared_config() -> SdkConfig {
    let region = std::env::var("AWS_REGION").ok();

    let region_provider = RegionProviderChain::first_try(region.map(Region::new))
        .or_default_provider()
        .or_else(Region::new(FALLBACK_REGION));

    aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await
}
