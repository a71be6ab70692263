//! Player-asset-keyed cache of signature programs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::client::Transport;
use crate::error::Result;
use crate::signature::parser::parse_player;
use crate::signature::program::SignatureProgram;

/// Resolves and caches signature programs by player asset URL.
#[derive(Debug, Default)]
pub struct SignatureResolver {
    programs: RwLock<HashMap<String, Arc<SignatureProgram>>>,
}

impl SignatureResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the program for `asset_url`, fetching and parsing the asset
    /// only on the first request for that URL.
    pub async fn program_for(
        &self,
        transport: &dyn Transport,
        asset_url: &str,
    ) -> Result<Arc<SignatureProgram>> {
        if let Some(program) = self.programs.read().await.get(asset_url) {
            tracing::debug!("Signature program cache hit: {}", asset_url);
            return Ok(Arc::clone(program));
        }

        tracing::debug!("Fetching player asset: {}", asset_url);
        let source = transport.get_text(asset_url).await?;
        let program = Arc::new(parse_player(&source)?);
        tracing::debug!("Parsed signature program: {:?}", program.ops());

        self.programs
            .write()
            .await
            .insert(asset_url.to_string(), Arc::clone(&program));

        Ok(program)
    }

    /// Number of cached programs.
    pub async fn len(&self) -> usize {
        self.programs.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::testing::MockTransport;
    use crate::error::Error;
    use crate::signature::parser::tests::PLAYER_SOURCE;

    const ASSET: &str = "https://s.ytimg.com/yts/jsbin/player-en_US/base.js";

    #[tokio::test]
    async fn test_second_lookup_skips_fetch() {
        let transport = MockTransport::new().with_text(ASSET, PLAYER_SOURCE);
        let resolver = SignatureResolver::new();

        let first = resolver.program_for(&transport, ASSET).await.unwrap();
        let second = resolver.program_for(&transport, ASSET).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(transport.text_request_count(ASSET), 1);
        assert_eq!(resolver.len().await, 1);
    }

    #[tokio::test]
    async fn test_unparseable_asset_is_not_cached() {
        let transport = MockTransport::new().with_text(ASSET, "var nothing=1;");
        let resolver = SignatureResolver::new();

        let result = resolver.program_for(&transport, ASSET).await;
        assert!(matches!(result, Err(Error::Decryption(_))));
        assert_eq!(resolver.len().await, 0);
    }
}
