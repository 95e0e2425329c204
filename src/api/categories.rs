use tracing::instrument;

use super::Api;
use crate::error::Result;
use crate::model::{Category, Listing};

#[instrument(skip(api))]
pub(crate) async fn get_categories(api: &Api<'_>) -> Result<Vec<Category>> {
    let listing: Listing<Category> = api.get_json("categories").await?;
    Ok(listing.into_vec())
}
