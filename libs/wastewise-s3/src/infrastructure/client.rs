use aws_sdk_s3::Client;
use tracing::info;

/// Build an S3 client from the ambient AWS configuration
///
/// Region, credentials and `AWS_ENDPOINT_URL` come from the usual AWS
/// environment. Path-style addressing is forced so MinIO and other
/// S3-compatible stores work without virtual-host DNS.
pub async fn build_client() -> Client {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    info!(region = ?aws_config.region(), "Built S3 client");
    Client::from_conf(s3_config)
}
