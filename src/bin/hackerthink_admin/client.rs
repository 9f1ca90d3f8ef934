use std::sync::Arc;

use hackerthink_admin::application::error::AppError;
use hackerthink_admin::application::listing::{ListController, ListOptions};
use hackerthink_admin::application::loader::CancelHandle;
use hackerthink_admin::application::repos::AdminApi;
use hackerthink_admin::config::{self, Settings};
use hackerthink_admin::domain::content::ContentItem;
use hackerthink_admin::infra::http::AdminClient;
use hackerthink_admin::infra::telemetry;
use tokio::task::JoinHandle;
use tracing::warn;
use url::Url;

use crate::args::Cli;

#[derive(Clone, Debug)]
pub struct Ctx {
    pub client: Arc<AdminClient>,
    pub settings: Settings,
}

impl Ctx {
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let client = AdminClient::new(
            settings.api.base_url.clone(),
            settings.api.session_token.clone(),
        )?;
        Ok(Self {
            client: Arc::new(client),
            settings,
        })
    }

    pub fn api(&self) -> Arc<dyn AdminApi> {
        self.client.clone()
    }

    pub fn site(&self) -> &Url {
        &self.settings.site.public_url
    }

    pub fn list_options(&self) -> ListOptions {
        self.settings.listing.list_options()
    }

    pub fn controller<T: ContentItem>(&self) -> ListController<T> {
        ListController::new(self.api(), self.list_options())
    }
}

pub fn build_ctx_from_cli(cli: &Cli) -> Result<Ctx, AppError> {
    let settings = config::load(&cli.global)?;
    telemetry::init(&settings.logging)?;
    Ctx::new(settings)
}

/// Cancel in-flight loads when the operator presses Ctrl-C.
pub fn cancel_on_interrupt(handle: CancelHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received; abandoning in-flight requests");
                handle.cancel();
            }
            Err(err) => warn!(error = %err, "failed to listen for interrupts"),
        }
    })
}
