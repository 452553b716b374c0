//! Typed command wrappers.

use tracing::debug;

use crate::error::Result;
use crate::protocol::{
    AddFactsPayload, AuthPayload, AuthResponse, Command, ConfigureAppPayload,
    ConfigureAppResponse, ConfigureSessionPayload, CreateInteractionPayload,
    CreateInteractionResponse, GetStatusResponse, SetCredentialsPayload, UserInfo,
};

use super::Bridge;

// ============================================================================
// Bridge - Session
// ============================================================================

impl Bridge {
    /// Authenticates the embedded application.
    ///
    /// The frame reloads its context after a successful exchange, so the
    /// listener resets readiness as the response lands and the next command
    /// waits for a fresh `ready`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the response carries no
    /// user.
    pub async fn authenticate(&self, payload: AuthPayload) -> Result<UserInfo> {
        debug!(mode = ?payload.mode, "Authenticating");

        let response = self.send(Command::Auth(payload)).await?;

        let auth: AuthResponse = response.payload_as()?;
        Ok(auth.user)
    }

    /// Sets the password used by the embedded application.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn set_credentials(&self, password: impl Into<String>) -> Result<()> {
        debug!("Setting credentials");

        let payload = SetCredentialsPayload {
            password: password.into(),
        };
        self.send(Command::SetCredentials(payload)).await?;
        Ok(())
    }

    /// Sets session defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn configure_session(&self, payload: ConfigureSessionPayload) -> Result<()> {
        debug!(
            language = ?payload.default_language,
            mode = ?payload.default_mode,
            "Configuring session"
        );

        self.send(Command::ConfigureSession(payload)).await?;
        Ok(())
    }

    /// Configures appearance, features, locale and network settings.
    ///
    /// Returns the configuration now in effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the response has no
    /// configuration.
    pub async fn configure_app(&self, payload: ConfigureAppPayload) -> Result<ConfigureAppResponse> {
        debug!("Configuring embedded application");

        self.send(Command::Configure(payload)).await?.payload_as()
    }

    /// Returns authentication, location and interaction state.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the response has no status.
    pub async fn get_status(&self) -> Result<GetStatusResponse> {
        self.send(Command::GetStatus {}).await?.payload_as()
    }
}

// ============================================================================
// Bridge - Interaction
// ============================================================================

impl Bridge {
    /// Creates a new interaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or the response has no
    /// interaction.
    pub async fn create_interaction(
        &self,
        payload: CreateInteractionPayload,
    ) -> Result<CreateInteractionResponse> {
        debug!(
            encounter = %payload.encounter.identifier,
            "Creating interaction"
        );

        self.send(Command::CreateInteraction(payload))
            .await?
            .payload_as()
    }

    /// Adds facts to the current interaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn add_facts(&self, payload: AddFactsPayload) -> Result<()> {
        debug!(count = payload.facts.len(), "Adding facts");

        self.send(Command::AddFacts(payload)).await?;
        Ok(())
    }

    /// Navigates inside the embedded application.
    ///
    /// # Arguments
    ///
    /// * `path` - Application path, e.g. `/session/abc`
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn navigate_to(&self, path: &str) -> Result<()> {
        debug!(path, "Navigating");

        self.send(Command::navigate(path)).await?;
        Ok(())
    }

    /// Starts recording.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn start_recording(&self) -> Result<()> {
        debug!("Starting recording");
        self.send(Command::StartRecording {}).await?;
        Ok(())
    }

    /// Stops recording.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn stop_recording(&self) -> Result<()> {
        debug!("Stopping recording");
        self.send(Command::StopRecording {}).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    use crate::error::Error;
    use crate::protocol::{AuthMode, Fact};
    use crate::transport::{LocalFrame, LocalWindow, PostedMessage};

    use super::*;

    const EMBED: &str = "https://assistant.us.corti.app/embedded";

    /// Plays the embedded side: answers every command with `reply(action)`.
    fn spawn_remote(
        window: Arc<LocalWindow>,
        frame: Arc<LocalFrame>,
        mut outbox: mpsc::UnboundedReceiver<PostedMessage>,
        reply: fn(&str) -> Value,
    ) -> mpsc::UnboundedReceiver<Value> {
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();
        window.dispatch(frame.message(json!({ "type": "CORTI_EMBEDDED_EVENT", "event": "ready" })));

        tokio::spawn(async move {
            while let Some(posted) = outbox.recv().await {
                let action = posted.message["action"].as_str().unwrap_or_default().to_string();
                let body = reply(&action);
                let mut response = json!({
                    "type": "CORTI_EMBEDDED_RESPONSE",
                    "action": action,
                    "requestId": posted.message["requestId"],
                });
                if let (Some(response), Some(body)) = (response.as_object_mut(), body.as_object()) {
                    response.extend(body.clone());
                }
                let _ = seen_tx.send(posted.message);
                window.dispatch(frame.message(response));
            }
        });

        seen_rx
    }

    type Setup = (
        Bridge,
        Arc<LocalWindow>,
        Arc<LocalFrame>,
        mpsc::UnboundedReceiver<Value>,
    );

    fn setup(reply: fn(&str) -> Value) -> Setup {
        let window = Arc::new(LocalWindow::new());
        let (frame, outbox) = LocalFrame::new(EMBED);
        let bridge = Bridge::new(frame.clone(), window.clone());
        let seen = spawn_remote(window.clone(), frame.clone(), outbox, reply);
        (bridge, window, frame, seen)
    }

    fn ok_payload(action: &str) -> Value {
        match action {
            "auth" => json!({
                "success": true,
                "payload": { "user": { "id": "u1", "email": "doc@example.com" } }
            }),
            "getStatus" => json!({
                "success": true,
                "payload": {
                    "auth": { "isAuthenticated": true },
                    "currentUrl": "https://assistant.us.corti.app/session/1",
                    "interaction": null
                }
            }),
            "createInteraction" => json!({
                "success": true,
                "payload": { "id": "int-1", "createdAt": "2025-01-01T00:00:00Z" }
            }),
            _ => json!({ "success": true }),
        }
    }

    #[tokio::test]
    async fn test_authenticate_returns_user_and_resets_ready() {
        let (bridge, _window, _frame, mut seen) = setup(ok_payload);

        let user = bridge
            .authenticate(AuthPayload::bearer("token", AuthMode::Stateful))
            .await
            .unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.email, "doc@example.com");
        assert!(!bridge.is_ready());

        let sent = seen.recv().await.unwrap();
        assert_eq!(sent["action"], "auth");
        assert_eq!(sent["payload"]["access_token"], "token");
        assert_eq!(sent["payload"]["mode"], "stateful");
    }

    #[tokio::test]
    async fn test_command_after_authenticate_waits_for_new_ready() {
        let (bridge, window, frame, mut seen) = setup(ok_payload);

        bridge
            .authenticate(AuthPayload::bearer("token", AuthMode::Stateless))
            .await
            .unwrap();
        seen.recv().await.unwrap();

        let pending = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.start_recording().await }
        });
        tokio::task::yield_now().await;
        assert!(seen.try_recv().is_err());

        window.dispatch(frame.message(json!({ "type": "CORTI_EMBEDDED_EVENT", "event": "ready" })));
        pending.await.unwrap().unwrap();
        assert_eq!(seen.recv().await.unwrap()["action"], "startRecording");
    }

    #[tokio::test]
    async fn test_get_status_decodes_payload() {
        let (bridge, _window, _frame, _seen) = setup(ok_payload);

        let status = bridge.get_status().await.unwrap();

        assert!(status.auth.is_authenticated);
        assert_eq!(status.current_url, "https://assistant.us.corti.app/session/1");
        assert!(status.interaction.is_none());
    }

    #[tokio::test]
    async fn test_create_interaction_decodes_payload() {
        let (bridge, _window, _frame, mut seen) = setup(ok_payload);

        let payload: CreateInteractionPayload = serde_json::from_value(json!({
            "encounter": {
                "identifier": "enc-1",
                "status": "planned",
                "type": "first_consultation",
                "period": { "startedAt": "2025-01-01T00:00:00Z" }
            }
        }))
        .unwrap();
        let created = bridge.create_interaction(payload).await.unwrap();

        assert_eq!(created.id, "int-1");
        assert_eq!(seen.recv().await.unwrap()["payload"]["encounter"]["type"], "first_consultation");
    }

    #[tokio::test]
    async fn test_unit_commands_send_expected_actions() {
        let (bridge, _window, _frame, mut seen) = setup(ok_payload);

        bridge.navigate_to("/session/1").await.unwrap();
        bridge
            .add_facts(AddFactsPayload {
                facts: vec![Fact {
                    text: "Allergic to penicillin".into(),
                    group: "allergies".into(),
                    source: None,
                }],
            })
            .await
            .unwrap();
        bridge.set_credentials("hunter2").await.unwrap();
        bridge.stop_recording().await.unwrap();

        let actions: Vec<String> = [
            seen.recv().await.unwrap(),
            seen.recv().await.unwrap(),
            seen.recv().await.unwrap(),
            seen.recv().await.unwrap(),
        ]
        .iter()
        .map(|m| m["action"].as_str().unwrap().to_string())
        .collect();
        assert_eq!(actions, ["navigate", "addFacts", "setCredentials", "stopRecording"]);
    }

    #[tokio::test]
    async fn test_remote_failure_surfaces_error_fields() {
        let (bridge, _window, _frame, _seen) = setup(|_| {
            json!({
                "success": false,
                "error": "Interaction not found",
                "errorCode": "404",
                "errorDetails": { "id": "int-9" }
            })
        });

        let err = bridge.navigate_to("/session/int-9").await.unwrap_err();

        assert!(err.is_remote());
        assert_eq!(err.to_string(), "Interaction not found");
        assert_eq!(err.code(), Some("404"));
        assert!(matches!(
            err,
            Error::RemoteFailure { details: Some(ref d), .. } if d["id"] == "int-9"
        ));
    }

    #[tokio::test]
    async fn test_missing_payload_is_rejected() {
        let (bridge, _window, _frame, _seen) = setup(|_| json!({ "success": true }));

        let err = bridge.get_status().await.unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }
}
