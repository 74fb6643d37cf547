//! Turns handler replies into transport actions

use crate::application::errors::ResponseError;
use crate::domain::entities::{OutboundAction, OutgoingMessage, Reply, Response};

/// Normalize a handler's reply. Plain text goes back to `origin_channel`.
pub fn normalize(reply: Reply, origin_channel: &str) -> Result<Option<OutboundAction>, ResponseError> {
    match reply {
        Reply::Nothing => Ok(None),
        Reply::Text(text) => Ok(Some(OutboundAction::SendMessage(OutgoingMessage::text(origin_channel, text)))),
        Reply::Response(response) => normalize_response(response),
        Reply::Upload(attachment) => Ok(Some(OutboundAction::Upload(attachment))),
    }
}

fn normalize_response(response: Response) -> Result<Option<OutboundAction>, ResponseError> {
    let Response {
        channel,
        text,
        original_ts,
        reaction,
        user,
        attachments,
        ephemeral,
    } = response;

    match (original_ts, reaction) {
        (Some(_), Some(_)) if text.is_some() => Err(ResponseError::ReactionWithText),
        (Some(timestamp), Some(emoji)) => Ok(Some(OutboundAction::React {
            channel,
            timestamp,
            emoji,
        })),
        (thread_ts, _) if text.is_some() || !attachments.is_empty() => {
            let ephemeral_user = match (ephemeral, user) {
                (true, None) => return Err(ResponseError::EphemeralWithoutUser),
                (true, user) => user,
                (false, _) => None,
            };
            Ok(Some(OutboundAction::SendMessage(OutgoingMessage {
                channel,
                text,
                attachments,
                thread_ts,
                ephemeral_user,
            })))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Attachment;
    use serde_json::json;

    #[test]
    fn text_goes_to_origin_channel() {
        let action = normalize("Pong".into(), "C1").unwrap();
        assert_eq!(action, Some(OutboundAction::SendMessage(OutgoingMessage::text("C1", "Pong"))));
    }

    #[test]
    fn nothing_yields_no_action() {
        assert_eq!(normalize(Reply::Nothing, "C1").unwrap(), None);
    }

    #[test]
    fn threaded_text_reply() {
        let response = Response::new("C2").with_text("hi").in_thread("123.4");
        let Some(OutboundAction::SendMessage(msg)) = normalize(response.into(), "C1").unwrap() else {
            panic!("expected a message");
        };
        assert_eq!(msg.channel, "C2");
        assert_eq!(msg.thread_ts.as_deref(), Some("123.4"));
        assert_eq!(msg.ephemeral_user, None);
    }

    #[test]
    fn reaction_needs_original_timestamp() {
        let response = Response::new("C1").in_thread("123.4").with_reaction("x");
        assert_eq!(
            normalize(response.into(), "C1").unwrap(),
            Some(OutboundAction::React {
                channel: "C1".into(),
                timestamp: "123.4".into(),
                emoji: "x".into()
            })
        );

        let without_ts = Response::new("C1").with_reaction("x");
        assert_eq!(normalize(without_ts.into(), "C1").unwrap(), None);
    }

    #[test]
    fn reaction_with_text_is_rejected() {
        let response = Response::new("C1").with_text("hi").in_thread("1.0").with_reaction("x");
        assert_eq!(normalize(response.into(), "C1"), Err(ResponseError::ReactionWithText));
    }

    #[test]
    fn ephemeral_needs_a_user() {
        let mut response = Response::new("C1").with_text("psst");
        response.ephemeral = true;
        assert_eq!(normalize(response.clone().into(), "C1"), Err(ResponseError::EphemeralWithoutUser));

        let Some(OutboundAction::SendMessage(msg)) = normalize(response.ephemeral_to("U1").into(), "C1").unwrap()
        else {
            panic!("expected a message");
        };
        assert_eq!(msg.ephemeral_user.as_deref(), Some("U1"));
    }

    #[test]
    fn attachments_only_message() {
        let response = Response::new("C1").with_attachment(json!({"title": "t"}));
        let action = normalize(response.into(), "C1").unwrap().unwrap();
        assert_eq!(action.text(), None);
        assert_eq!(action.channel(), "C1");
    }

    #[test]
    fn upload_passes_through() {
        let attachment = Attachment::new("C1", "a.txt", b"data".to_vec());
        assert_eq!(
            normalize(attachment.clone().into(), "C9").unwrap(),
            Some(OutboundAction::Upload(attachment))
        );
    }
}
