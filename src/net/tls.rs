//! Certificate and key loading for HTTPS listeners.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Build the rustls server config from a PEM certificate chain and key.
///
/// A missing file is reported by name before rustls tries to parse anything.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> io::Result<RustlsConfig> {
    for (what, path) in [("certificate", cert_path), ("private key", key_path)] {
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} {} does not exist", what, path.display()),
            ));
        }
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}
