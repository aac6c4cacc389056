//! Cleaned artifact upload.

use bytes::Bytes;
use storage::ObjectStorage;
use tracing::info;

use etl_common::EtlResult;

/// Upload the artifact bytes unchanged to `key`.
///
/// # Returns
/// The `s3://` URI of the uploaded object
pub async fn upload_artifact(storage: &ObjectStorage, key: &str, data: Vec<u8>) -> EtlResult<String> {
    let size = data.len();
    storage.put(key, Bytes::from(data)).await?;

    let uri = storage.uri(key);
    info!(uri = %uri, size = size, "Uploaded cleaned artifact");
    Ok(uri)
}
