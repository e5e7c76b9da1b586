//! SmartPool implementation for automatic test transaction management.
//!
//! ## Key Components
//! - [`SmartPool`] - Connection pool with automatic test transaction support
//!
//! ## Features
//! - Automatic test transactions in test mode (single connection, no TLS)
//! - Normal pooling in production mode, over TLS

#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
use std::{sync::Arc, time::Duration};

#[cfg(not(test))]
use {
    crate::constants::database::{
        CONNECTION_TIMEOUT_SECS, IDLE_TIMEOUT_SECS, MAX_LIFETIME_SECS, MAX_POOL_SIZE,
        MIN_IDLE_CONNECTIONS,
    },
    diesel::{ConnectionError, ConnectionResult},
    diesel_async::pooled_connection::ManagerConfig,
    diesel_async::RunQueryDsl,
    futures::{future::BoxFuture, FutureExt},
    rustls::{
        client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
        pki_types::{CertificateDer, ServerName, UnixTime},
        version, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
    },
    rustls_pemfile::certs as load_pem_certs,
    rustls_platform_verifier::ConfigVerifierExt,
    std::{fs::File, io::BufReader},
    tracing::warn,
};

#[cfg(test)]
use crate::constants::database::TEST_CONNECTION_TIMEOUT_SECS;
#[cfg(test)]
use diesel_async::AsyncConnection;
use diesel_async::{
    pooled_connection::{bb8::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection,
};
use near_indexer_db::{DbConnection, DbPool};

use super::error::RepositoryError;
use crate::config::DatabaseConfig;

/// Smart connection pool that automatically manages test transactions.
///
/// In test mode:
/// - Uses single connection to enable test transactions
/// - Automatically begins test transaction on first connection
/// - Transaction automatically rolls back when test ends
///
/// In production mode:
/// - Uses normal connection pooling with 32 connections
/// - Connections are established over TLS as configured in [`DatabaseConfig`]
pub struct SmartPool {
    /// The underlying bb8 pool
    inner: Arc<DbPool>,

    /// Track whether test transaction has been initialized (test mode only)
    #[cfg(test)]
    test_tx_initialized: AtomicBool,
}

impl SmartPool {
    /// Create a new SmartPool for the given database.
    ///
    /// # Arguments
    /// * `config` - Connection string and TLS settings
    pub async fn new(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        #[cfg(test)]
        let pool = {
            let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.url);

            // Single connection for test transactions
            Pool::builder()
                .max_size(1)
                .connection_timeout(Duration::from_secs(TEST_CONNECTION_TIMEOUT_SECS))
                .build(manager)
                .await
                .map_err(|e| RepositoryError::pool(format!("Failed to create test pool: {}", e)))?
        };

        #[cfg(not(test))]
        let pool = {
            let tls = make_rustls_config(config)?;
            let mut manager_cfg = ManagerConfig::default();
            manager_cfg.custom_setup =
                Box::new(move |url: &str| establish_connection(url, tls.clone()));
            let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
                &config.url,
                manager_cfg,
            );

            let pool = Pool::builder()
                .max_size(MAX_POOL_SIZE)
                .connection_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
                .idle_timeout(Some(Duration::from_secs(IDLE_TIMEOUT_SECS)))
                .max_lifetime(Some(Duration::from_secs(MAX_LIFETIME_SECS)))
                .min_idle(Some(MIN_IDLE_CONNECTIONS))
                .build(manager)
                .await
                .map_err(|e| {
                    RepositoryError::pool(format!("Failed to create production pool: {}", e))
                })?;

            // Perform immediate health-check to surface connection/TLS errors early
            {
                let mut conn = pool.get().await.map_err(|e| {
                    RepositoryError::pool(format!("Failed to get connection: {}", e))
                })?;
                diesel::sql_query("SELECT 1")
                    .execute(&mut conn)
                    .await
                    .map_err(|e| RepositoryError::pool(format!("Healthcheck failed: {}", e)))?;
            }

            pool
        };

        Ok(Self {
            inner: Arc::new(pool),
            #[cfg(test)]
            test_tx_initialized: AtomicBool::new(false),
        })
    }

    /// Get a connection from the pool.
    ///
    /// The connection goes back to the pool when the returned guard is dropped.
    /// In test mode, this will automatically begin a test transaction
    /// on the first call, which will be rolled back when the test ends.
    pub async fn get(&self) -> Result<DbConnection<'_>, RepositoryError> {
        #[allow(unused_mut)]
        let mut conn = self
            .inner
            .get()
            .await
            .map_err(|e| RepositoryError::pool(format!("Failed to get connection: {}", e)))?;

        #[cfg(test)]
        {
            if self
                .test_tx_initialized
                // if it was not initialized, it will be set as initialized
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // Begin test transaction that will rollback automatically
                conn.begin_test_transaction()
                    .await
                    .map_err(RepositoryError::Database)?;
            }
        }

        Ok(conn)
    }
}

// --- TLS setup and custom connection establishment ---

#[derive(Debug)]
#[cfg(not(test))]
struct NoCertificateVerification;

#[cfg(not(test))]
impl ServerCertVerifier for NoCertificateVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ED25519,
        ]
    }
}

#[cfg(not(test))]
fn tls_builder(
) -> Result<rustls::ConfigBuilder<ClientConfig, rustls::WantsVerifier>, RepositoryError> {
    let provider = rustls::crypto::ring::default_provider();
    ClientConfig::builder_with_provider(provider.into())
        .with_protocol_versions(&[&version::TLS13, &version::TLS12])
        .map_err(|e| RepositoryError::pool(format!("Invalid TLS configuration: {}", e)))
}

#[cfg(not(test))]
fn make_rustls_config(config: &DatabaseConfig) -> Result<ClientConfig, RepositoryError> {
    if config.tls_insecure {
        // Accept any certificate and hostname. DO NOT use in production.
        warn!("Database TLS certificate verification is disabled");
        return Ok(tls_builder()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoCertificateVerification))
            .with_no_client_auth());
    }

    let Some(path) = &config.tls_ca_file else {
        // Use system trust store and normal verification.
        return Ok(ClientConfig::with_platform_verifier());
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = ?path, error = %err, "Failed to open CA file, falling back to platform verifier");
            return Ok(ClientConfig::with_platform_verifier());
        }
    };

    let certs: Result<Vec<_>, std::io::Error> =
        load_pem_certs(&mut BufReader::new(file)).collect();
    match certs {
        Ok(pems) => {
            let mut roots = RootCertStore::empty();
            for cert in pems {
                if let Err(err) = roots.add(cert) {
                    warn!(error = %err, "Failed to add certificate to root store");
                }
            }
            Ok(tls_builder()?
                .with_root_certificates(roots)
                .with_no_client_auth())
        }
        Err(err) => {
            warn!(path = ?path, error = %err, "Failed to parse PEM certs, falling back to platform verifier");
            Ok(ClientConfig::with_platform_verifier())
        }
    }
}

#[cfg(not(test))]
fn establish_connection(
    url: &str,
    tls: ClientConfig,
) -> BoxFuture<'_, ConnectionResult<AsyncPgConnection>> {
    let fut = async move {
        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls);
        let (client, conn) = tokio_postgres::connect(url, tls)
            .await
            .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;

        AsyncPgConnection::try_from_client_and_connection(client, conn).await
    };
    fut.boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        constants::test::UNREACHABLE_DATABASE_URL,
        data::indexer_db::test_helpers::setup_test_db,
    };

    #[tokio::test]
    async fn create_and_get_connection() {
        let (_container, config) = setup_test_db(&[]).await;

        let pool = SmartPool::new(&config).await.expect("able to create pool");

        pool.get().await.expect("able to get connection");

        assert!(
            pool.test_tx_initialized.load(Ordering::SeqCst),
            "connection initialized with test_transaction"
        );
    }

    #[tokio::test]
    async fn unreachable_database_fails_on_get() {
        let mut config = Config::default().database;
        config.url = UNREACHABLE_DATABASE_URL.to_string();

        let pool = SmartPool::new(&config)
            .await
            .expect("test pool connects lazily");

        let err = pool.get().await.err().expect("nothing listens there");
        assert!(matches!(err, RepositoryError::Pool(_)));
        assert!(!pool.test_tx_initialized.load(Ordering::SeqCst));
    }
}
