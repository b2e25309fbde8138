//! Account/sequence resolution over the query channel.

use std::sync::Arc;

use shared_types::{AccountRecord, Address};
use tracing::{debug, instrument};

use crate::domain::QueryError;
use crate::ports::QueryClient;

/// Looks up the account number and current sequence of a signer.
#[derive(Clone)]
pub struct AccountResolver {
    client: Arc<dyn QueryClient>,
}

impl AccountResolver {
    pub fn new(client: Arc<dyn QueryClient>) -> Self {
        Self { client }
    }

    /// The on-chain record of `address`.
    ///
    /// An account that never received funds is [`QueryError::NotFound`];
    /// transport failures pass through untouched.
    #[instrument(skip(self), fields(%address))]
    pub async fn resolve(&self, address: &Address) -> Result<AccountRecord, QueryError> {
        let record = self.client.account(address).await?;
        debug!(
            account_number = record.account_number,
            sequence = record.sequence,
            "resolved account"
        );
        Ok(record)
    }
}
