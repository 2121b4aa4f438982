//! CLI command implementations.

pub mod cart;

use std::path::PathBuf;

use rocketshoes_cart::config::API_URL_VAR;
use rocketshoes_cart::{
    CartConfig, CartError, CartStore, ConfigError, FileStorage, HttpCatalog, LogNotifier,
    Notifier,
};

/// The cart as the CLI uses it.
pub type Cart = CartStore<HttpCatalog, FileStorage, CliNotifier>;

/// Where cart notifications go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliNotifier {
    /// Printed to stderr for whoever is at the terminal.
    Console,
    /// Emitted as log events, so JSON log consumers see them too.
    Log(LogNotifier),
}

impl CliNotifier {
    /// Pick the notifier matching the log output format.
    #[must_use]
    pub const fn for_log_format(json: bool) -> Self {
        if json {
            Self::Log(LogNotifier)
        } else {
            Self::Console
        }
    }
}

impl Notifier for CliNotifier {
    #[allow(clippy::print_stderr)]
    fn error(&self, message: &str) {
        match self {
            Self::Console => eprintln!("error: {message}"),
            Self::Log(notifier) => notifier.error(message),
        }
    }
}

/// Load configuration from the environment, letting command-line flags win.
///
/// # Errors
///
/// Returns `ConfigError` if the API URL is missing or any variable is invalid.
pub fn load_config(
    api_url: Option<&str>,
    cart_file: Option<PathBuf>,
) -> Result<CartConfig, ConfigError> {
    let mut config = CartConfig::from_lookup(|key| match (key, api_url) {
        (API_URL_VAR, Some(url)) => Some(url.to_string()),
        _ => std::env::var(key).ok(),
    })?;

    if let Some(path) = cart_file {
        config.cart_file = path;
    }

    Ok(config)
}

/// Open the persisted cart described by `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the stored cart
/// cannot be read. A corrupt cart is only an error when `reset_corrupt` is off.
pub fn open_cart(
    config: &CartConfig,
    reset_corrupt: bool,
    notifier: CliNotifier,
) -> Result<Cart, Box<dyn std::error::Error>> {
    let catalog = HttpCatalog::new(config)?;
    let storage = FileStorage::new(&config.cart_file);

    tracing::debug!(cart_file = %config.cart_file.display(), "Opening cart");

    let cart = if reset_corrupt {
        CartStore::load_or_reset(catalog, storage, notifier)
    } else {
        CartStore::load(catalog, storage, notifier).inspect_err(|e| {
            if matches!(e, CartError::CorruptCart { .. }) {
                tracing::error!(
                    "Stored cart is unreadable; rerun with --reset-corrupt to start over"
                );
            }
        })
    }?;

    Ok(cart)
}
