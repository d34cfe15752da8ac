//! TLS configuration for PostgreSQL connections.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::{info, warn};

use crate::error::{FixtureError, Result};

/// TLS modes, named after PostgreSQL's `sslmode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    /// Plain TCP.
    #[default]
    Disable,
    /// TLS without certificate verification. Test containers use self-signed certificates.
    Require,
    /// TLS with certificate and hostname verification against the web PKI roots.
    VerifyFull,
}

impl SslMode {
    /// Parse an SSL mode from a string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "disable" | "" => Ok(SslMode::Disable),
            "require" | "prefer" => Ok(SslMode::Require),
            "verify-full" | "verify-ca" => Ok(SslMode::VerifyFull),
            other => Err(FixtureError::Config(format!(
                "Invalid ssl_mode '{}'. Valid values: disable, require, verify-full",
                other
            ))),
        }
    }

    /// Check if this mode requires TLS.
    pub fn requires_tls(&self) -> bool {
        !matches!(self, SslMode::Disable)
    }

    /// Build a connector for tokio-postgres. `None` when TLS is disabled.
    pub fn connector(&self) -> Result<Option<MakeRustlsConnect>> {
        let config = match self {
            SslMode::Disable => return Ok(None),
            SslMode::Require => {
                warn!(
                    "ssl_mode=require: TLS enabled but the server certificate is not verified"
                );
                let provider = crypto_provider();
                ClientConfig::builder_with_provider(provider.clone())
                    .with_safe_default_protocol_versions()
                    .map_err(|e| FixtureError::Config(format!("TLS setup failed: {}", e)))?
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert { provider }))
                    .with_no_client_auth()
            }
            SslMode::VerifyFull => {
                info!("ssl_mode=verify-full: certificate and hostname verification enabled");
                let mut roots = rustls::RootCertStore::empty();
                roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
                ClientConfig::builder_with_provider(crypto_provider())
                    .with_safe_default_protocol_versions()
                    .map_err(|e| FixtureError::Config(format!("TLS setup failed: {}", e)))?
                    .with_root_certificates(roots)
                    .with_no_client_auth()
            }
        };

        Ok(Some(MakeRustlsConnect::new(config)))
    }
}

fn crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Accepts any server certificate but still checks handshake signatures.
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssl_mode_parsing() {
        assert_eq!(SslMode::parse("disable").unwrap(), SslMode::Disable);
        assert_eq!(SslMode::parse("").unwrap(), SslMode::Disable);
        assert_eq!(SslMode::parse("Require").unwrap(), SslMode::Require);
        assert_eq!(SslMode::parse("prefer").unwrap(), SslMode::Require);
        assert_eq!(SslMode::parse("verify-full").unwrap(), SslMode::VerifyFull);
        assert!(SslMode::parse("invalid").is_err());
    }

    #[test]
    fn test_disable_has_no_connector() {
        assert!(!SslMode::Disable.requires_tls());
        assert!(SslMode::Disable.connector().unwrap().is_none());
    }

    #[test]
    fn test_tls_modes_build_connector() {
        assert!(SslMode::Require.connector().unwrap().is_some());
        assert!(SslMode::VerifyFull.connector().unwrap().is_some());
    }
}
