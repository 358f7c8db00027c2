use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<String, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(ProductError::from)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: String) -> Result<(), ProductError> {
        debug!("Sending request");
        self.inner.delete(id).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await {
            Ok(ProductActionResult::CheckStock(level)) => Ok(level),
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(e.into()),
        }
    }

    /// Decrements stock for every `(product_id, quantity)` pair in one actor
    /// turn. Either all decrements are applied or none.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn reserve_stock(&self, lines: Vec<(String, u32)>) -> Result<Vec<u32>, ProductError> {
        debug!("Sending request");
        let actions = lines
            .into_iter()
            .map(|(id, quantity)| (id, ProductAction::ReserveStock(quantity)))
            .collect();
        let results = self.inner.transaction(actions).await?;
        results
            .into_iter()
            .map(|result| match result {
                ProductActionResult::ReserveStock(level) => Ok(level),
                other => Err(unexpected(other)),
            })
            .collect()
    }

    /// Increments stock for every `(product_id, quantity)` pair in one actor
    /// turn. Either all increments are applied or none.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn release_stock(&self, lines: Vec<(String, u32)>) -> Result<Vec<u32>, ProductError> {
        debug!("Sending request");
        let actions = lines
            .into_iter()
            .map(|(id, quantity)| (id, ProductAction::ReleaseStock(quantity)))
            .collect();
        let results = self.inner.transaction(actions).await?;
        results
            .into_iter()
            .map(|result| match result {
                ProductActionResult::ReleaseStock(level) => Ok(level),
                other => Err(unexpected(other)),
            })
            .collect()
    }
}

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("Unexpected result: {:?}", result))
}
