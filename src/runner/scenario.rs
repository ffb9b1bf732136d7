use std::sync::Arc;

use tonic::Status;

use super::events::{EventEmitter, LoadEvent};
use super::state::{ScenarioState, StepState};
use crate::client::AuthApi;
use crate::identity::IdentityGenerator;

/// Step names in fixed execution order. Later steps are built from earlier
/// responses, so the order is not negotiable.
pub const STEP_NAMES: [&str; 5] = [
    "login",
    "register",
    "refreshToken",
    "forgotPassword",
    "resetPassword",
];

/// Fresh pending step states for one scenario execution
pub fn step_states() -> Vec<StepState> {
    STEP_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| StepState::new(i, name))
        .collect()
}

/// Executes the five-step authentication scenario against one connected
/// client and records an outcome per step. Step failures never abort the
/// run; every execution yields a complete report card for all five
/// operations.
pub struct ScenarioRunner {
    client: Box<dyn AuthApi>,
    generator: Arc<dyn IdentityGenerator>,
    emitter: EventEmitter,
    state: ScenarioState,
    login_email: String,
    login_password: String,
}

impl ScenarioRunner {
    pub fn new(
        client: Box<dyn AuthApi>,
        generator: Arc<dyn IdentityGenerator>,
        emitter: EventEmitter,
        login_email: &str,
        login_password: &str,
        user: u32,
        iteration: u32,
    ) -> Self {
        Self {
            client,
            generator,
            emitter,
            state: ScenarioState::new(user, iteration, step_states()),
            login_email: login_email.to_string(),
            login_password: login_password.to_string(),
        }
    }

    /// Run the scenario to completion and return its final state. The
    /// client (and with it the transport session) is dropped on return.
    pub async fn run(mut self) -> ScenarioState {
        self.state.start();
        self.emitter.emit(LoadEvent::ScenarioStarted {
            user: self.state.user,
            iteration: self.state.iteration,
            step_count: self.state.steps.len(),
        });

        let identity = self.generator.generate();

        // 1. login with the known-good credentials; the chain needs the
        // issued refresh token, so an OK response without one fails here.
        self.start_step();
        let login = self
            .client
            .login(&self.login_email, &self.login_password)
            .await;
        let refresh_token = match login {
            Ok(resp) if resp.refresh_token.is_empty() => {
                self.fail_step("response carried no refresh token".to_string());
                String::new()
            }
            Ok(resp) => {
                self.pass_step();
                resp.refresh_token
            }
            Err(status) => {
                self.fail_step(status_line(&status));
                String::new()
            }
        };

        // 2. register a previously unused identity
        self.start_step();
        let result = self
            .client
            .register(&identity.email, &identity.password)
            .await;
        self.check(result);

        // 3. refreshToken with the token captured in step 1; attempted with
        // an empty token when login yielded none
        self.start_step();
        let result = self.client.refresh_token(&refresh_token).await;
        self.check(result);

        // 4. forgotPassword for the freshly registered account
        self.start_step();
        let result = self.client.forgot_password(&identity.email).await;
        self.check(result);

        // 5. resetPassword; the generated email stands in for both the
        // reset token and the new password
        self.start_step();
        let result = self
            .client
            .reset_password(&identity.email, &identity.email)
            .await;
        self.check(result);

        self.finish()
    }

    fn start_step(&mut self) {
        let user = self.state.user;
        if let Some(step) = self.state.current_step() {
            step.start();
            let event = LoadEvent::StepStarted {
                user,
                index: step.index,
                step: step.step_name.clone(),
            };
            self.emitter.emit(event);
        }
    }

    /// Record the current step's outcome from a call result and advance
    fn check<T>(&mut self, result: Result<T, Status>) {
        match result {
            Ok(_) => self.pass_step(),
            Err(status) => self.fail_step(status_line(&status)),
        }
    }

    fn pass_step(&mut self) {
        let user = self.state.user;
        if let Some(step) = self.state.current_step() {
            step.pass();
            let event = LoadEvent::StepPassed {
                user,
                index: step.index,
                duration_ms: step.duration_ms.unwrap_or(0),
            };
            self.emitter.emit(event);
        }
        self.state.advance();
    }

    fn fail_step(&mut self, error: String) {
        let user = self.state.user;
        if let Some(step) = self.state.current_step() {
            step.fail(error.clone());
            let event = LoadEvent::StepFailed {
                user,
                index: step.index,
                error,
                duration_ms: step.duration_ms.unwrap_or(0),
            };
            self.emitter.emit(event);
        }
        self.state.advance();
    }

    fn finish(mut self) -> ScenarioState {
        self.state.finish();
        self.emitter.emit(LoadEvent::ScenarioFinished {
            user: self.state.user,
            iteration: self.state.iteration,
            status: self.state.status.clone(),
            duration_ms: self.state.total_duration_ms,
        });
        self.state
    }
}

fn status_line(status: &Status) -> String {
    format!("{:?}: {}", status.code(), status.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AuthApi;
    use crate::identity::FixedIdentityGenerator;
    use crate::proto::{
        ForgotPasswordResponse, LoginResponse, RefreshTokenResponse, RegisterResponse,
        ResetPasswordResponse,
    };
    use crate::runner::state::StepStatus;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// What the stub service saw, shared with the test body
    #[derive(Default)]
    struct Seen {
        calls: Vec<String>,
        register_email: Option<String>,
        refresh_token: Option<String>,
        reset_request: Option<(String, String)>,
    }

    struct StubAuth {
        seen: Arc<Mutex<Seen>>,
        /// None: login rejected. Some(token): login OK with this token.
        login_token: Option<String>,
        fail_register: bool,
    }

    impl StubAuth {
        fn ok(seen: Arc<Mutex<Seen>>) -> Self {
            Self {
                seen,
                login_token: Some("rt-12345".to_string()),
                fail_register: false,
            }
        }
    }

    #[async_trait]
    impl AuthApi for StubAuth {
        async fn login(&mut self, _email: &str, _password: &str) -> Result<LoginResponse, Status> {
            self.seen.lock().unwrap().calls.push("login".to_string());
            match &self.login_token {
                None => Err(Status::unauthenticated("bad credentials")),
                Some(token) => Ok(LoginResponse {
                    access_token: "at-abc".to_string(),
                    refresh_token: token.clone(),
                    access_expires_in: 900,
                    refresh_expires_in: 86400,
                }),
            }
        }

        async fn register(
            &mut self,
            email: &str,
            _password: &str,
        ) -> Result<RegisterResponse, Status> {
            let mut seen = self.seen.lock().unwrap();
            seen.calls.push("register".to_string());
            seen.register_email = Some(email.to_string());
            if self.fail_register {
                return Err(Status::already_exists("email already registered"));
            }
            Ok(RegisterResponse {
                email: email.to_string(),
            })
        }

        async fn refresh_token(
            &mut self,
            refresh_token: &str,
        ) -> Result<RefreshTokenResponse, Status> {
            let mut seen = self.seen.lock().unwrap();
            seen.calls.push("refreshToken".to_string());
            seen.refresh_token = Some(refresh_token.to_string());
            Ok(RefreshTokenResponse {
                access_token: "at-def".to_string(),
                refresh_token: "rt-67890".to_string(),
                access_expires_in: 900,
                refresh_expires_in: 86400,
            })
        }

        async fn forgot_password(
            &mut self,
            email: &str,
        ) -> Result<ForgotPasswordResponse, Status> {
            self.seen
                .lock()
                .unwrap()
                .calls
                .push("forgotPassword".to_string());
            Ok(ForgotPasswordResponse {
                email: email.to_string(),
                message: "reset email sent".to_string(),
            })
        }

        async fn reset_password(
            &mut self,
            token: &str,
            password: &str,
        ) -> Result<ResetPasswordResponse, Status> {
            let mut seen = self.seen.lock().unwrap();
            seen.calls.push("resetPassword".to_string());
            seen.reset_request = Some((token.to_string(), password.to_string()));
            Ok(ResetPasswordResponse {
                message: "password reset".to_string(),
            })
        }
    }

    fn run_stub(stub: StubAuth) -> impl std::future::Future<Output = ScenarioState> {
        let generator = Arc::new(FixedIdentityGenerator {
            email: "probe@example.com".to_string(),
            password: "probe@example.com".to_string(),
        });
        ScenarioRunner::new(
            Box::new(stub),
            generator,
            EventEmitter::default(),
            "admin@admin.com",
            "admin123",
            1,
            1,
        )
        .run()
    }

    #[tokio::test]
    async fn test_all_ok_yields_five_passed_in_order() {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let state = run_stub(StubAuth::ok(seen.clone())).await;

        assert_eq!(state.steps.len(), 5);
        let names: Vec<&str> = state.steps.iter().map(|s| s.step_name.as_str()).collect();
        assert_eq!(names, STEP_NAMES);
        assert!(state
            .steps
            .iter()
            .all(|s| matches!(s.status, StepStatus::Passed)));
        assert_eq!(seen.lock().unwrap().calls, STEP_NAMES);
    }

    #[tokio::test]
    async fn test_refresh_token_chained_verbatim() {
        let seen = Arc::new(Mutex::new(Seen::default()));
        run_stub(StubAuth::ok(seen.clone())).await;

        assert_eq!(
            seen.lock().unwrap().refresh_token.as_deref(),
            Some("rt-12345")
        );
    }

    #[tokio::test]
    async fn test_register_failure_does_not_affect_siblings() {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let stub = StubAuth {
            fail_register: true,
            ..StubAuth::ok(seen.clone())
        };
        let state = run_stub(stub).await;

        let outcomes: Vec<bool> = state
            .steps
            .iter()
            .map(|s| matches!(s.status, StepStatus::Passed))
            .collect();
        assert_eq!(outcomes, [true, false, true, true, true]);
        assert_eq!(seen.lock().unwrap().calls.len(), 5);
    }

    #[tokio::test]
    async fn test_failed_login_still_attempts_refresh_with_empty_token() {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let stub = StubAuth {
            login_token: None,
            ..StubAuth::ok(seen.clone())
        };
        let state = run_stub(stub).await;

        assert!(matches!(state.steps[0].status, StepStatus::Failed { .. }));
        assert!(matches!(state.steps[2].status, StepStatus::Passed));
        assert_eq!(seen.lock().unwrap().refresh_token.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_login_without_refresh_token_is_malformed() {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let stub = StubAuth {
            login_token: Some(String::new()),
            ..StubAuth::ok(seen.clone())
        };
        let state = run_stub(stub).await;

        match &state.steps[0].status {
            StepStatus::Failed { error } => assert!(error.contains("refresh token")),
            other => panic!("expected failed login, got {:?}", other),
        }
        // The chain still runs, with the empty substitute value
        assert_eq!(seen.lock().unwrap().refresh_token.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_generated_email_doubles_as_reset_token_and_password() {
        let seen = Arc::new(Mutex::new(Seen::default()));
        run_stub(StubAuth::ok(seen.clone())).await;

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.register_email.as_deref(),
            Some("probe@example.com")
        );
        assert_eq!(
            seen.reset_request,
            Some((
                "probe@example.com".to_string(),
                "probe@example.com".to_string()
            ))
        );
    }
}
