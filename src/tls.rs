//! Process-wide rustls setup.

use std::sync::Once;

static INSTALL: Once = Once::new();

/// Install the ring crypto provider before lettre or reqwest build a TLS
/// client. Safe to call from every procedure entry point.
pub fn install_crypto_provider() {
    INSTALL.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("rustls crypto provider already installed by host process");
        }
    });
}
