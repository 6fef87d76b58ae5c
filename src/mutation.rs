//! Relay mutation envelope
//!
//! Carries the client's `clientMutationId` from a mutation's input to its
//! output untouched, so responses can be matched to requests.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Mutation input or payload tagged with a client mutation ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationEnvelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_mutation_id: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> MutationEnvelope<T> {
    pub fn new(client_mutation_id: Option<String>, payload: T) -> Self {
        Self {
            client_mutation_id,
            payload,
        }
    }

    pub fn into_parts(self) -> (Option<String>, T) {
        (self.client_mutation_id, self.payload)
    }

    /// Replace the payload, keeping the client mutation ID
    pub fn map<U, F>(self, f: F) -> MutationEnvelope<U>
    where
        F: FnOnce(T) -> U,
    {
        MutationEnvelope {
            client_mutation_id: self.client_mutation_id,
            payload: f(self.payload),
        }
    }

    /// Run a mutation on the payload and wrap its output
    ///
    /// Errors from the mutation are returned as they are.
    pub async fn run<U, E, F, Fut>(self, mutate: F) -> Result<MutationEnvelope<U>, E>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
    {
        let (client_mutation_id, input) = self.into_parts();
        let output = mutate(input).await?;
        Ok(MutationEnvelope {
            client_mutation_id,
            payload: output,
        })
    }
}
