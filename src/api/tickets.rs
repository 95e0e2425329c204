use tracing::{debug, instrument};

use super::Api;
use crate::error::Result;
use crate::model::{ScanRequest, ScanResponse};

#[instrument(skip(api, code))]
pub(crate) async fn validate_ticket(
    api: &Api<'_>,
    code: &str,
    event_id: &str,
) -> Result<ScanResponse> {
    let body = ScanRequest {
        qr_code: code,
        event_id,
    };
    let response: ScanResponse = api.post_json("participants/scan", &body).await?;
    debug!(
        message = %response.message,
        redeemed = response.is_redeemed(),
        "ticket validated"
    );
    Ok(response)
}
