//! Meeting gateway over the Microsoft Graph communications API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::meeting_url::{extract_meeting_id, validate_meeting_url};
use crate::ports::{
    AuthGateway, JoinError, MeetingError, MeetingGateway, MeetingInfo, Participant,
};

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

#[derive(Debug, Clone)]
pub struct GraphMeetingConfig {
    pub graph_base_url: String,
    /// Where the platform posts call notifications.
    pub callback_url: String,
    pub bot_app_id: String,
    pub bot_display_name: String,
    pub scopes: Vec<String>,
    pub timeout: Duration,
}

impl GraphMeetingConfig {
    pub fn new(callback_url: impl Into<String>, bot_app_id: impl Into<String>) -> Self {
        Self {
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            callback_url: callback_url.into(),
            bot_app_id: bot_app_id.into(),
            bot_display_name: "Interview Bot".to_string(),
            scopes: vec!["https://graph.microsoft.com/.default".to_string()],
            timeout: Duration::from_secs(15),
        }
    }

    fn calls_url(&self) -> String {
        format!("{}/communications/calls", self.graph_base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone)]
struct ActiveCall {
    call_id: String,
}

pub struct GraphMeetingGateway {
    config: GraphMeetingConfig,
    auth: Arc<dyn AuthGateway>,
    http_client: reqwest::Client,
    call: Mutex<Option<ActiveCall>>,
}

#[derive(Debug, Deserialize)]
struct CreatedCall {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ParticipantList {
    #[serde(default)]
    value: Vec<GraphParticipant>,
}

#[derive(Debug, Deserialize)]
struct GraphParticipant {
    id: String,
    info: Option<ParticipantInfo>,
}

#[derive(Debug, Deserialize)]
struct ParticipantInfo {
    identity: Option<IdentitySet>,
}

#[derive(Debug, Deserialize)]
struct IdentitySet {
    user: Option<Identity>,
    application: Option<Identity>,
}

#[derive(Debug, Deserialize)]
struct Identity {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

impl From<GraphParticipant> for Participant {
    fn from(p: GraphParticipant) -> Self {
        let display_name = p
            .info
            .and_then(|info| info.identity)
            .and_then(|identity| identity.user.or(identity.application))
            .and_then(|identity| identity.display_name);
        Participant {
            id: p.id,
            display_name,
        }
    }
}

impl GraphMeetingGateway {
    pub fn new(config: GraphMeetingConfig, auth: Arc<dyn AuthGateway>) -> Result<Self, JoinError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JoinError::Unavailable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            auth,
            http_client,
            call: Mutex::new(None),
        })
    }

    fn join_payload(&self, meeting_id: &str, join_url: &str) -> serde_json::Value {
        json!({
            "@odata.type": "#microsoft.graph.call",
            "callbackUri": format!("{}/webhook/calls", self.config.callback_url.trim_end_matches('/')),
            "requestedModalities": ["audio"],
            "mediaConfig": {
                "@odata.type": "#microsoft.graph.serviceHostedMediaConfig"
            },
            "meetingInfo": {
                "@odata.type": "#microsoft.graph.joinMeetingIdMeetingInfo",
                "joinMeetingId": meeting_id,
            },
            "source": {
                "identity": {
                    "application": {
                        "id": self.config.bot_app_id,
                        "displayName": self.config.bot_display_name,
                    }
                }
            },
            "joinWebUrl": join_url,
        })
    }

    async fn bearer(&self) -> Result<String, String> {
        self.auth
            .acquire_token(&self.config.scopes)
            .await
            .map(|t| format!("Bearer {}", t.expose()))
            .map_err(|e| e.to_string())
    }

    async fn current_call_id(&self) -> Option<String> {
        self.call.lock().await.as_ref().map(|c| c.call_id.clone())
    }
}

#[async_trait]
impl MeetingGateway for GraphMeetingGateway {
    async fn join(&self, meeting_url: &str) -> Result<MeetingInfo, JoinError> {
        validate_meeting_url(meeting_url).map_err(|e| JoinError::InvalidUrl(e.to_string()))?;
        let meeting_id = extract_meeting_id(meeting_url).ok_or_else(|| {
            JoinError::InvalidUrl("could not find a meeting id in the url".to_string())
        })?;

        let bearer = self.bearer().await.map_err(JoinError::Auth)?;

        tracing::info!(%meeting_id, "joining meeting");
        let response = self
            .http_client
            .post(self.config.calls_url())
            .header("Authorization", bearer)
            .json(&self.join_payload(&meeting_id, meeting_url))
            .send()
            .await
            .map_err(|e| JoinError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.as_u16() != 201 {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %message, "meeting join rejected");
            return Err(JoinError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let created: CreatedCall = response
            .json()
            .await
            .map_err(|e| JoinError::Unavailable(format!("unreadable join response: {}", e)))?;

        tracing::info!(call_id = %created.id, "joined meeting");
        *self.call.lock().await = Some(ActiveCall {
            call_id: created.id.clone(),
        });

        Ok(MeetingInfo {
            call_id: created.id,
            meeting_id,
            join_url: meeting_url.to_string(),
        })
    }

    async fn leave(&self) -> Result<(), MeetingError> {
        let Some(call_id) = self.current_call_id().await else {
            return Ok(());
        };

        let bearer = self.bearer().await.map_err(MeetingError::Unavailable)?;
        let response = self
            .http_client
            .delete(format!("{}/{}", self.config.calls_url(), call_id))
            .header("Authorization", bearer)
            .send()
            .await
            .map_err(|e| MeetingError::Unavailable(e.to_string()))?;

        match response.status().as_u16() {
            200 | 204 | 404 => {
                tracing::info!(%call_id, "left meeting");
                *self.call.lock().await = None;
                Ok(())
            }
            status => Err(MeetingError::RequestFailed {
                status,
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn list_participants(&self) -> Result<Vec<Participant>, MeetingError> {
        let call_id = self
            .current_call_id()
            .await
            .ok_or(MeetingError::NotJoined)?;

        let bearer = self.bearer().await.map_err(MeetingError::Unavailable)?;
        let response = self
            .http_client
            .get(format!("{}/{}/participants", self.config.calls_url(), call_id))
            .header("Authorization", bearer)
            .send()
            .await
            .map_err(|e| MeetingError::Unavailable(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(MeetingError::RequestFailed {
                status,
                message: response.text().await.unwrap_or_default(),
            });
        }

        let list: ParticipantList = response
            .json()
            .await
            .map_err(|e| MeetingError::Unavailable(format!("unreadable participant list: {}", e)))?;

        Ok(list.value.into_iter().map(Participant::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::StaticTokenAuth;

    fn gateway() -> GraphMeetingGateway {
        GraphMeetingGateway::new(
            GraphMeetingConfig::new("https://bot.example.com/", "bot-app"),
            Arc::new(StaticTokenAuth::new("token")),
        )
        .unwrap()
    }

    #[test]
    fn payload_targets_callback_and_meeting() {
        let payload = gateway().join_payload("abc", "https://teams.microsoft.com/l/meetup-join/abc");
        assert_eq!(payload["callbackUri"], "https://bot.example.com/webhook/calls");
        assert_eq!(payload["meetingInfo"]["joinMeetingId"], "abc");
        assert_eq!(payload["source"]["identity"]["application"]["id"], "bot-app");
        assert_eq!(payload["requestedModalities"][0], "audio");
    }

    #[test]
    fn participants_prefer_user_display_name() {
        let list: ParticipantList = serde_json::from_str(
            r#"{"value": [
                {"id": "p1", "info": {"identity": {"user": {"displayName": "Ada"}}}},
                {"id": "p2", "info": {"identity": {"application": {"displayName": "Interview Bot"}}}},
                {"id": "p3"}
            ]}"#,
        )
        .unwrap();
        let participants: Vec<Participant> = list.value.into_iter().map(Participant::from).collect();
        assert_eq!(participants[0].display_name.as_deref(), Some("Ada"));
        assert_eq!(participants[1].display_name.as_deref(), Some("Interview Bot"));
        assert_eq!(participants[2].display_name, None);
    }

    #[tokio::test]
    async fn join_rejects_invalid_url_before_any_request() {
        let auth = Arc::new(StaticTokenAuth::new("token"));
        let gateway = GraphMeetingGateway::new(
            GraphMeetingConfig::new("https://bot.example.com", "bot-app"),
            auth.clone(),
        )
        .unwrap();

        let result = gateway.join("https://example.com/meeting").await;

        assert!(matches!(result, Err(JoinError::InvalidUrl(_))));
        assert_eq!(auth.request_count(), 0);
    }

    #[tokio::test]
    async fn leave_without_call_is_noop() {
        assert!(gateway().leave().await.is_ok());
    }

    #[tokio::test]
    async fn participants_require_a_call() {
        assert_eq!(gateway().list_participants().await, Err(MeetingError::NotJoined));
    }
}
