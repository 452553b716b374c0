//! Typed payloads for commands and their responses.
//!
//! Request payloads are serialized into the `payload` field of a command
//! envelope. Response payloads are deserialized out of a successful
//! response; a payload that does not fit its shape is rejected before it
//! reaches the caller.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Auth
// ============================================================================

/// How the embedded application keeps the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Tokens are held only for the lifetime of the frame.
    #[default]
    Stateless,
    /// Tokens are persisted by the embedded application.
    Stateful,
}

/// Profile claims attached to a token response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenProfile {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Subject identifier.
    pub sub: String,
}

/// Payload for the `auth` action: an OpenID token response plus a mode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Access token.
    pub access_token: String,
    /// Token type, usually `Bearer`.
    pub token_type: String,
    /// Absolute expiry, seconds since epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Refresh token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<i64>,
    /// Refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// ID token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Not-before policy.
    #[serde(
        rename = "not-before-policy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub not_before_policy: Option<i64>,
    /// Session state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_state: Option<String>,
    /// Granted scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Profile claims.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<TokenProfile>,
    /// Session mode.
    pub mode: AuthMode,
}

impl AuthPayload {
    /// Creates a bearer token payload.
    #[must_use]
    pub fn bearer(access_token: impl Into<String>, mode: AuthMode) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            mode,
            ..Default::default()
        }
    }
}

/// Authenticated user as reported by the embedded application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User ID.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Any further fields the application includes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response payload for `auth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed-in user.
    pub user: UserInfo,
}

// ============================================================================
// Interactions
// ============================================================================

/// Time span of an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterPeriod {
    /// ISO 8601 start.
    pub started_at: String,
    /// ISO 8601 end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

/// Encounter an interaction is created for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    /// External encounter identifier.
    pub identifier: String,
    /// Encounter status, e.g. `planned`.
    pub status: String,
    /// Encounter type, e.g. `first_consultation`.
    #[serde(rename = "type")]
    pub encounter_type: String,
    /// When the encounter happens.
    pub period: EncounterPeriod,
    /// Optional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Patient attached to an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// External patient identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Patient name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Birth date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Gender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// Payload for `createInteraction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInteractionPayload {
    /// User the interaction is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<String>,
    /// Encounter details.
    pub encounter: Encounter,
    /// Patient details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
}

/// Response payload for `createInteraction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInteractionResponse {
    /// Interaction ID.
    pub id: String,
    /// Creation time.
    pub created_at: String,
    /// Interaction status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ============================================================================
// Facts
// ============================================================================

/// A single fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Fact text.
    pub text: String,
    /// Fact group.
    pub group: String,
    /// Fact source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Payload for `addFacts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddFactsPayload {
    /// Facts to add.
    pub facts: Vec<Fact>,
}

// ============================================================================
// Session
// ============================================================================

/// Default consultation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultMode {
    /// Remote consultation.
    Virtual,
    /// Face to face consultation.
    InPerson,
}

/// Payload for `configureSession`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureSessionPayload {
    /// Dictation language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    /// Output language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_output_language: Option<String>,
    /// Template key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_template_key: Option<String>,
    /// Consultation mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<DefaultMode>,
}

/// Payload for `navigate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatePayload {
    /// Path inside the embedded application.
    pub path: String,
}

/// Payload for `setCredentials`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCredentialsPayload {
    /// Password.
    pub password: String,
}

// ============================================================================
// Status
// ============================================================================

/// Authentication part of a status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    /// Whether a user is signed in.
    pub is_authenticated: bool,
    /// The signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

/// Response payload for `getStatus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStatusResponse {
    /// Authentication state.
    pub auth: AuthStatus,
    /// URL the embedded application is showing.
    pub current_url: String,
    /// Current interaction details, if any.
    #[serde(default)]
    pub interaction: Option<Value>,
}

// ============================================================================
// App Configuration
// ============================================================================

/// Appearance settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceConfig {
    /// Primary brand color.
    #[serde(default)]
    pub primary_color: Option<String>,
}

/// Feature toggles as applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesConfig {
    pub interaction_title: bool,
    pub ai_chat: bool,
    pub document_feedback: bool,
    pub navigation: bool,
    pub virtual_mode: bool,
    pub sync_document_action: bool,
    pub template_editor: bool,
}

/// Feature toggles to change; unset toggles are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_title: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_chat: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_feedback: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_document_action: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_editor: Option<bool>,
}

/// Locale settings as applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleConfig {
    /// UI language.
    pub interface_language: String,
    /// Dictation language.
    #[serde(default)]
    pub dictation_language: Option<String>,
    /// String overrides by key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<BTreeMap<String, String>>,
}

/// Locale settings to change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictation_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<BTreeMap<String, String>>,
}

/// Network settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Override for the realtime websocket endpoint.
    #[serde(default)]
    pub websocket_base_url: Option<String>,
}

/// Payload for `configure`; every section is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigureAppPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<AppearanceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeaturesPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<LocalePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkConfig>,
}

/// Response payload for `configure`: the full configuration now in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureAppResponse {
    pub appearance: AppearanceConfig,
    pub features: FeaturesConfig,
    pub locale: LocaleConfig,
    pub network: NetworkConfig,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_auth_payload_skips_missing_fields() {
        let payload = AuthPayload::bearer("tok", AuthMode::Stateful);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({ "access_token": "tok", "token_type": "Bearer", "mode": "stateful" })
        );
    }

    #[test]
    fn test_user_info_keeps_extra_fields() {
        let user: UserInfo = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@b.c",
            "role": "doctor"
        }))
        .unwrap();
        assert_eq!(user.name, None);
        assert_eq!(user.extra.get("role"), Some(&json!("doctor")));
    }

    #[test]
    fn test_create_interaction_payload_shape() {
        let payload = CreateInteractionPayload {
            assigned_user_id: None,
            encounter: Encounter {
                identifier: "enc-1".into(),
                status: "planned".into(),
                encounter_type: "first_consultation".into(),
                period: EncounterPeriod {
                    started_at: "2026-01-01T10:00:00Z".into(),
                    ended_at: None,
                },
                title: None,
            },
            patient: Some(Patient {
                birth_date: Some("1980-02-03".into()),
                ..Default::default()
            }),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["encounter"]["type"], "first_consultation");
        assert_eq!(value["encounter"]["period"]["startedAt"], "2026-01-01T10:00:00Z");
        assert_eq!(value["patient"]["birthDate"], "1980-02-03");
        assert!(value.get("assignedUserId").is_none());
    }

    #[test]
    fn test_default_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(DefaultMode::InPerson).unwrap(),
            json!("in-person")
        );
    }

    #[test]
    fn test_configure_response_parses() {
        let response: ConfigureAppResponse = serde_json::from_value(json!({
            "appearance": { "primaryColor": null },
            "features": {
                "interactionTitle": true,
                "aiChat": false,
                "documentFeedback": true,
                "navigation": true,
                "virtualMode": false,
                "syncDocumentAction": false,
                "templateEditor": true
            },
            "locale": { "interfaceLanguage": "en" },
            "network": {}
        }))
        .unwrap();
        assert!(response.features.template_editor);
        assert_eq!(response.locale.interface_language, "en");
        assert_eq!(response.network.websocket_base_url, None);
    }

    #[test]
    fn test_status_requires_auth_section() {
        let result = serde_json::from_value::<GetStatusResponse>(json!({ "currentUrl": "/" }));
        assert!(result.is_err());
    }
}
