use crate::client::traits::AuthApi;
use crate::proto::auth_service_client::AuthServiceClient;
use crate::proto::{
    ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
    RefreshTokenRequest, RefreshTokenResponse, RegisterRequest, RegisterResponse,
    ResetPasswordRequest, ResetPasswordResponse,
};
use async_trait::async_trait;
use thiserror::Error;
use tonic::transport::{Channel, ClientTlsConfig};
use tonic::Status;

/// Transport security mode for the connection to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Plaintext,
    Tls,
}

impl TransportMode {
    pub fn from_tls(tls: bool) -> Self {
        if tls {
            TransportMode::Tls
        } else {
            TransportMode::Plaintext
        }
    }

    fn scheme(self) -> &'static str {
        match self {
            TransportMode::Plaintext => "http",
            TransportMode::Tls => "https",
        }
    }
}

/// Errors establishing the transport session. Fatal to the scenario that
/// hits them; step-level failures are recorded as outcomes instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid target address '{0}'")]
    InvalidTarget(String),

    #[error("tls configuration failed: {0}")]
    Tls(#[source] tonic::transport::Error),

    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: tonic::transport::Error,
    },
}

/// gRPC client for the authentication service
pub struct GrpcAuthClient {
    inner: AuthServiceClient<Channel>,
}

impl GrpcAuthClient {
    /// Open a channel to `target` ("host:port" or a full URL) in the given
    /// transport mode. The channel is released when the client is dropped.
    pub async fn connect(target: &str, mode: TransportMode) -> Result<Self, ClientError> {
        let url = if target.contains("://") {
            target.to_string()
        } else {
            format!("{}://{}", mode.scheme(), target)
        };

        log::debug!("connecting to {} ({:?})", url, mode);

        let mut endpoint = Channel::from_shared(url.clone())
            .map_err(|_| ClientError::InvalidTarget(url.clone()))?;

        if mode == TransportMode::Tls {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(ClientError::Tls)?;
        }

        let channel = endpoint
            .connect()
            .await
            .map_err(|source| ClientError::Connect {
                target: url,
                source,
            })?;

        Ok(Self {
            inner: AuthServiceClient::new(channel),
        })
    }
}

#[async_trait]
impl AuthApi for GrpcAuthClient {
    async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, Status> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.inner.login(request).await.map(|r| r.into_inner())
    }

    async fn register(&mut self, email: &str, password: &str) -> Result<RegisterResponse, Status> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.inner.register(request).await.map(|r| r.into_inner())
    }

    async fn refresh_token(
        &mut self,
        refresh_token: &str,
    ) -> Result<RefreshTokenResponse, Status> {
        let request = RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.inner
            .refresh_token(request)
            .await
            .map(|r| r.into_inner())
    }

    async fn forgot_password(&mut self, email: &str) -> Result<ForgotPasswordResponse, Status> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.inner
            .forgot_password(request)
            .await
            .map(|r| r.into_inner())
    }

    async fn reset_password(
        &mut self,
        token: &str,
        password: &str,
    ) -> Result<ResetPasswordResponse, Status> {
        let request = ResetPasswordRequest {
            token: token.to_string(),
            password: password.to_string(),
        };
        self.inner
            .reset_password(request)
            .await
            .map(|r| r.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_mode_from_tls() {
        assert_eq!(TransportMode::from_tls(false), TransportMode::Plaintext);
        assert_eq!(TransportMode::from_tls(true), TransportMode::Tls);
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_target() {
        let err = GrpcAuthClient::connect("not a target", TransportMode::Plaintext)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::InvalidTarget(_)));
    }
}
