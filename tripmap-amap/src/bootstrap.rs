//! Runtime bootstrap and map construction for AMap.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use tripmap_core::provider::{
    ContainerHandle, Credentials, MapOptions, MapRuntime, MapView, RouteBackend, RuntimeBootstrap,
};
use tripmap_core::{MapError, RouteMode};
use url::Url;

use crate::backend::{AmapRouteBackend, direction_path};
use crate::config::{AmapBuildError, AmapConfig, LOADER_VERSION};
use crate::scene::HeadlessMap;

type SceneSlot = Arc<Mutex<Option<Arc<HeadlessMap>>>>;

/// Loads the AMap runtime by fetching the keyed loader resource.
///
/// The fetch fails on network errors and on rejected credentials, which
/// AMap reports with a non-success HTTP status.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
/// use tripmap_amap::{AmapBootstrap, AmapConfig};
/// use tripmap_core::provider::Credentials;
/// use tripmap_map::RuntimeLoader;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bootstrap = AmapBootstrap::new(AmapConfig::new())?;
/// let loader = RuntimeLoader::new(Arc::new(bootstrap), Credentials::new("api-key"));
/// # drop(loader);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AmapBootstrap {
    client: Client,
    loader_url: Url,
    rest_base: Url,
    scene: SceneSlot,
}

impl AmapBootstrap {
    /// Build the HTTP client and validate the configured URLs.
    ///
    /// # Errors
    /// Returns [`AmapBuildError`] when the client cannot be built or a URL
    /// does not parse.
    pub fn new(config: AmapConfig) -> Result<Self, AmapBuildError> {
        Ok(Self {
            client: config.build_client()?,
            loader_url: config.loader()?,
            rest_base: config.rest_base()?,
            scene: Arc::default(),
        })
    }

    /// The most recently constructed map, if any.
    #[must_use]
    pub fn scene(&self) -> Option<Arc<HeadlessMap>> {
        self.scene
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn loader_request(&self, credentials: &Credentials) -> Url {
        let mut url = self.loader_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("v", LOADER_VERSION);
            query.append_pair("key", &credentials.api_key);
            if let Some(code) = &credentials.security_code {
                query.append_pair("jscode", code);
            }
        }
        url
    }
}

#[async_trait]
impl RuntimeBootstrap for AmapBootstrap {
    async fn load(&self, credentials: &Credentials) -> Result<Arc<dyn MapRuntime>, MapError> {
        debug!("fetching AMap loader from {}", self.loader_url);
        self.client
            .get(self.loader_request(credentials))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| MapError::RuntimeLoad {
                message: err.to_string(),
            })?;
        info!("AMap runtime {LOADER_VERSION} loaded");
        Ok(Arc::new(AmapRuntime {
            client: self.client.clone(),
            rest_base: self.rest_base.clone(),
            api_key: credentials.api_key.clone(),
            scene: Arc::clone(&self.scene),
        }))
    }
}

/// A loaded AMap runtime.
#[derive(Debug)]
pub struct AmapRuntime {
    client: Client,
    rest_base: Url,
    api_key: String,
    scene: SceneSlot,
}

#[async_trait]
impl MapRuntime for AmapRuntime {
    fn create_map(
        &self,
        container: &ContainerHandle,
        options: &MapOptions,
    ) -> Result<Arc<dyn MapView>, MapError> {
        let map = Arc::new(HeadlessMap::new(container.clone(), options.clone()));
        debug!(
            "constructed map on '{}' ({}x{})",
            container.id, container.size.width, container.size.height
        );
        self.scene
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::clone(&map));
        Ok(map)
    }

    async fn load_capability(&self, mode: RouteMode) -> Result<Arc<dyn RouteBackend>, String> {
        let endpoint = self
            .rest_base
            .join(direction_path(mode))
            .map_err(|err| format!("invalid {mode} endpoint: {err}"))?;
        Ok(Arc::new(AmapRouteBackend::new(
            self.client.clone(),
            endpoint,
            self.api_key.clone(),
            mode,
        )))
    }

    fn destroy(&self) {
        if let Some(map) = self
            .scene
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            map.destroy();
        }
    }
}
