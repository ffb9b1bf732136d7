use crate::proto::{
    ForgotPasswordResponse, LoginResponse, RefreshTokenResponse, RegisterResponse,
    ResetPasswordResponse,
};
use async_trait::async_trait;
use tonic::Status;

/// Transport-agnostic interface to the authentication service
///
/// This trait covers the five operations the scenario exercises. It abstracts
/// away the transport details so the runner can be driven against an
/// in-process stub as well as a live gRPC endpoint. A non-OK response is a
/// `Status` error; the runner turns it into a failed outcome, never an abort.
#[async_trait]
pub trait AuthApi: Send {
    /// Authenticate with a known-good credential pair
    async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, Status>;

    /// Create a new account
    async fn register(&mut self, email: &str, password: &str) -> Result<RegisterResponse, Status>;

    /// Exchange a refresh token for a fresh token pair
    async fn refresh_token(&mut self, refresh_token: &str)
        -> Result<RefreshTokenResponse, Status>;

    /// Request a password reset for an account
    async fn forgot_password(&mut self, email: &str) -> Result<ForgotPasswordResponse, Status>;

    /// Complete a password reset with a reset token
    async fn reset_password(
        &mut self,
        token: &str,
        password: &str,
    ) -> Result<ResetPasswordResponse, Status>;
}
