//! The per-session storefront context.

use crate::cart::CartContext;
use crate::checkout::CheckoutService;
use crate::config::StorefrontConfig;
use crate::messaging::ChatHandoff;
use crate::products::{ProductCache, ProductSource};
use crate::StorefrontError;
use grocer_auth::{AuthContext, AuthEvent, HttpIdentityProvider, IdentityProvider};
use grocer_cache::Cache;
use grocer_data::{ApiClient, FetchClient, Transport};
use grocer_observability::{AnalyticsSink, Notifier, TracingNotifier};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Everything one storefront session needs, built once and passed around.
///
/// ```rust,no_run
/// use grocer_sdk::prelude::*;
///
/// # async fn run() -> Result<(), StorefrontError> {
/// let storefront = Storefront::builder(StorefrontConfig::default()).build()?;
/// storefront.start().await;
/// storefront.cart().add_item(AddToCart::product("rice", 2)).await?;
/// storefront.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Storefront {
    config: StorefrontConfig,
    api: ApiClient,
    auth: Option<Arc<AuthContext>>,
    cart: Arc<CartContext>,
    checkout: Arc<CheckoutService>,
    notifier: Arc<dyn Notifier>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.api.fetch().base_url())
            .field("auth", &self.auth)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    pub fn builder(config: StorefrontConfig) -> StorefrontBuilder {
        StorefrontBuilder::new(config)
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cart(&self) -> &Arc<CartContext> {
        &self.cart
    }

    pub fn checkout(&self) -> &Arc<CheckoutService> {
        &self.checkout
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// The auth context, when an identity provider is configured.
    pub fn auth(&self) -> Result<&Arc<AuthContext>, StorefrontError> {
        self.auth
            .as_ref()
            .ok_or_else(|| StorefrontError::Config("auth.url is not configured".to_string()))
    }

    /// Restore the saved session and cart, and keep the API token in step
    /// with the session from here on.
    pub async fn start(&self) {
        if let Some(auth) = &self.auth {
            let events = auth.subscribe();
            let task = tokio::spawn(sync_bearer_token(auth.clone(), self.api.fetch().clone(), events));
            self.tasks.lock().push(task);

            if let Some(user) = auth.restore().await {
                info!(user_id = %user.id, "session restored");
            }
            self.api.fetch().set_bearer_token(auth.access_token());
        }

        let lines = self.cart.restore().await;
        debug!(lines, "storefront started");
    }

    /// Close the auth channel and wait for background tasks to end.
    pub async fn shutdown(&self) {
        if let Some(auth) = &self.auth {
            auth.shutdown();
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for mut task in tasks {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
                warn!("background task did not stop, aborting");
                task.abort();
            }
        }
        debug!("storefront shut down");
    }
}

/// Mirror the session's access token onto the API client.
async fn sync_bearer_token(
    auth: Arc<AuthContext>,
    client: FetchClient,
    mut events: tokio::sync::broadcast::Receiver<AuthEvent>,
) {
    loop {
        match events.recv().await {
            Ok(event) if event.is_session_change() => {
                client.set_bearer_token(auth.access_token());
                debug!(signed_in = client.has_bearer_token(), "api token updated");
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "auth events lagged");
                client.set_bearer_token(auth.access_token());
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Builds a [`Storefront`] from config, with optional overrides for tests
/// and embedding.
pub struct StorefrontBuilder {
    config: StorefrontConfig,
    transport: Option<Arc<dyn Transport>>,
    provider: Option<Arc<dyn IdentityProvider>>,
    products: Option<Arc<dyn ProductSource>>,
    notifier: Option<Arc<dyn Notifier>>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
    cache: Option<Cache>,
}

impl StorefrontBuilder {
    pub fn new(config: StorefrontConfig) -> Self {
        Self {
            config,
            transport: None,
            provider: None,
            products: None,
            notifier: None,
            analytics: None,
            cache: None,
        }
    }

    /// Send every HTTP call, API and identity provider alike, through
    /// `transport`.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn product_source(mut self, source: Arc<dyn ProductSource>) -> Self {
        self.products = Some(source);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    /// Storage for the cart and session. Defaults to files under the
    /// configured data directory.
    pub fn cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn client(&self, base_url: &str) -> Result<FetchClient, StorefrontError> {
        match &self.transport {
            Some(transport) => Ok(FetchClient::new(transport.clone(), base_url)),
            None => Ok(FetchClient::http(base_url, self.config.timeout())?),
        }
    }

    pub fn build(self) -> Result<Storefront, StorefrontError> {
        self.config.validate()?;

        let api = ApiClient::new(self.client(&self.config.api.base_url)?);
        let cache = match &self.cache {
            Some(cache) => cache.clone(),
            None => Cache::open_dir(self.config.data_dir()?)?,
        };
        let notifier: Arc<dyn Notifier> = self
            .notifier
            .clone()
            .unwrap_or_else(|| Arc::new(TracingNotifier));
        let analytics = self
            .analytics
            .clone()
            .unwrap_or_else(|| self.config.analytics.sink());

        let provider: Option<Arc<dyn IdentityProvider>> = match (&self.provider, &self.config.auth) {
            (Some(provider), _) => Some(provider.clone()),
            (None, auth) => match (&auth.url, &auth.anon_key) {
                (Some(url), Some(key)) => Some(Arc::new(HttpIdentityProvider::new(self.client(url)?, key))),
                _ => None,
            },
        };
        let auth = provider.map(|provider| {
            let mut context = AuthContext::new(provider, notifier.clone()).with_store(cache.clone());
            if let Some(url) = &self.config.auth.redirect_url {
                context = context.with_redirect_url(url.clone());
            }
            Arc::new(context)
        });

        let source: Arc<dyn ProductSource> = match &self.products {
            Some(source) => source.clone(),
            None => Arc::new(api.clone()),
        };
        let store = &self.config.store;
        let cart = Arc::new(
            CartContext::new(
                Arc::new(ProductCache::new(source)),
                analytics.clone(),
                store.shipping,
                store.currency,
            )
            .with_store(cache),
        );
        let chat = store.chat_phone.as_deref().and_then(ChatHandoff::new);
        let checkout = Arc::new(CheckoutService::new(api.clone(), cart.clone(), analytics).with_chat(chat));

        Ok(Storefront {
            config: self.config,
            api,
            auth,
            cart,
            checkout,
            notifier,
            tasks: Mutex::new(Vec::new()),
        })
    }
}
