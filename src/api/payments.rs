use tracing::{debug, instrument};

use super::Api;
use crate::error::Result;
use crate::model::{Listing, Payment};

#[instrument(skip(api))]
pub(crate) async fn get_payments(api: &Api<'_>) -> Result<Vec<Payment>> {
    let listing: Listing<Payment> = api.get_json("payments").await?;
    let payments = listing.into_vec();
    debug!(count = payments.len(), "fetched payments");
    Ok(payments)
}
