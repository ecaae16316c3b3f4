use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the offer/answer exchange a description belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// A session description as exchanged on the wire. The JSON shape matches
/// `RTCSessionDescriptionInit` (`{"type": "offer", "sdp": "..."}`), so
/// payloads pass through to any standards-compliant peer engine untouched.
///
/// Offers additionally carry a random `nonce` that breaks ties between
/// simultaneous offers with identical SDPs. Peers that do not send one
/// (the field is absent on their wire objects) parse as `None` and
/// always win such a tie; peer engines never see the nonce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Uuid>,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
            nonce: None,
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
            nonce: None,
        }
    }
}

/// A trickled ICE candidate. Field names match `RTCIceCandidateInit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(rename = "sdpMid", skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", skip_serializing_if = "Option::is_none")]
    pub sdp_mline_index: Option<u16>,
    #[serde(rename = "usernameFragment", skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

/// One signaling message between the two participants of a room.
///
/// The relay never interprets these; only clients serialize/deserialize.
/// External tagging gives exactly the single-key wire objects the protocol
/// requires: `{"offer": {...}}`, `{"answer": {...}}`, `{"candidate": {...}}`
/// and `{"disconnect": true}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SignalEnvelope {
    Offer(SessionDescription),
    Answer(SessionDescription),
    Candidate(IceCandidate),
    Disconnect(bool),
}

impl SignalEnvelope {
    /// The hangup envelope, `{"disconnect": true}` on the wire.
    pub fn disconnect() -> Self {
        Self::Disconnect(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn offer_wire_shape() {
        let env = SignalEnvelope::Offer(SessionDescription::offer("v=0\r\n"));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value, json!({"offer": {"type": "offer", "sdp": "v=0\r\n"}}));
    }

    #[test]
    fn answer_wire_shape() {
        let env = SignalEnvelope::Answer(SessionDescription::answer("v=0\r\n"));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            json!({"answer": {"type": "answer", "sdp": "v=0\r\n"}})
        );
    }

    #[test]
    fn disconnect_wire_shape() {
        let text = serde_json::to_string(&SignalEnvelope::disconnect()).unwrap();
        assert_eq!(text, r#"{"disconnect":true}"#);
    }

    #[test]
    fn candidate_field_names_match_rtc_ice_candidate_init() {
        let env = SignalEnvelope::Candidate(IceCandidate {
            candidate: "candidate:1 1 udp 2130706431 192.0.2.1 54321 typ host".into(),
            sdp_mid: Some("0".into()),
            sdp_mline_index: Some(0),
            username_fragment: None,
        });

        let value = serde_json::to_value(&env).unwrap();
        let inner = &value["candidate"];
        assert_eq!(inner["sdpMid"], Value::from("0"));
        assert_eq!(inner["sdpMLineIndex"], Value::from(0));
        assert!(inner.get("usernameFragment").is_none());
    }

    #[test]
    fn offer_nonce_is_optional_on_the_wire() {
        // Foreign clients omit the field entirely.
        let text = r#"{"offer":{"type":"offer","sdp":"v=0\r\n"}}"#;
        let env: SignalEnvelope = serde_json::from_str(text).unwrap();
        match env {
            SignalEnvelope::Offer(offer) => assert!(offer.nonce.is_none()),
            other => panic!("expected offer, got {other:?}"),
        }

        let mut tagged = SessionDescription::offer("v=0\r\n");
        tagged.nonce = Some(uuid::Uuid::new_v4());
        let value = serde_json::to_value(&SignalEnvelope::Offer(tagged.clone())).unwrap();
        assert_eq!(
            value["offer"]["nonce"],
            Value::from(tagged.nonce.unwrap().to_string())
        );
    }

    #[test]
    fn browser_style_candidate_parses() {
        let text = r#"{"candidate":{"candidate":"candidate:2 1 tcp 1 198.51.100.7 9 typ host","sdpMid":"0","sdpMLineIndex":0,"usernameFragment":"abcd"}}"#;
        let env: SignalEnvelope = serde_json::from_str(text).unwrap();
        match env {
            SignalEnvelope::Candidate(c) => {
                assert_eq!(c.sdp_mid.as_deref(), Some("0"));
                assert_eq!(c.sdp_mline_index, Some(0));
                assert_eq!(c.username_fragment.as_deref(), Some("abcd"));
            }
            other => panic!("expected candidate, got {other:?}"),
        }
    }
}
