use super::*;
use pretty_assertions::assert_eq;

fn type_text(state: &mut WorkspaceState, text: &str) {
    for ch in text.chars() {
        user(state, UserAction::ChatInput(ch));
    }
}

#[test]
fn blank_input_returns_before_the_gate() {
    let mut state = state_with_credits(0);
    type_text(&mut state, "   ");
    let effects = user(&mut state, UserAction::SendChat);

    assert!(effects.is_empty());
    assert!(!state.panels.is_open(PanelId::Pricing));
    assert_eq!(state.assistant.messages.len(), 1);
}

#[test]
fn send_appends_user_message_and_clears_input() {
    let mut state = state();
    type_text(&mut state, "build me a navbar");
    assert!(state.can_send_chat());

    let effects = user(&mut state, UserAction::SendChat);
    assert_eq!(
        effects.iter().find(|effect| matches!(effect, WorkspaceEffect::Submit(_))),
        Some(&WorkspaceEffect::Submit(Submission {
            ticket: 1,
            payload: ActionPayload::ChatReply {
                prompt: "build me a navbar".to_string()
            },
        }))
    );
    assert_eq!(state.assistant.input, "");
    let last = state.assistant.messages.last().map(|message| message.role);
    assert_eq!(last, Some(ChatRole::User));
    assert!(state.is_typing());
    assert_eq!(state.entitlement.credits, Credits::Finite(49));
}

#[test]
fn denied_send_keeps_the_draft() {
    let mut state = state_with_credits(0);
    type_text(&mut state, "hello");
    user(&mut state, UserAction::SendChat);

    assert_eq!(state.assistant.input, "hello");
    assert_eq!(state.assistant.messages.len(), 1);
    assert!(state.panels.is_open(PanelId::Pricing));
}

#[test]
fn send_is_disabled_while_reply_is_pending() {
    let mut state = state();
    type_text(&mut state, "first");
    user(&mut state, UserAction::SendChat);
    type_text(&mut state, "second");
    assert!(!state.can_send_chat());

    let effects = user(&mut state, UserAction::SendChat);
    assert!(effects.is_empty());
    assert_eq!(state.assistant.input, "second");
}

#[test]
fn reply_resolution_appends_assistant_message() {
    let mut state = state();
    type_text(&mut state, "explain");
    user(&mut state, UserAction::SendChat);

    resolve(
        &mut state,
        ActionResult::ChatReply {
            content: "export function Button() {}".to_string(),
            format: MessageFormat::Code,
        },
    );
    let last = state.assistant.messages.last().expect("message");
    assert_eq!(last.role, ChatRole::Assistant);
    assert_eq!(last.format, MessageFormat::Code);
    assert!(!state.is_typing());
    assert_eq!(state.assistant.messages.len(), 3);
}

#[test]
fn quick_action_fills_input_only() {
    let mut state = state();
    user(&mut state, UserAction::QuickAction(QuickAction::ExplainCode));
    assert_eq!(state.assistant.input, "Explain what this code does...");
    assert!(state.pending.is_empty());
    assert_eq!(state.entitlement.credits, Credits::Finite(50));
}

#[test]
fn copy_message_targets_requested_index() {
    let mut state = state();
    let effects = user(&mut state, UserAction::CopyMessage(0));
    assert!(matches!(
        effects.first(),
        Some(WorkspaceEffect::CopyToClipboard(text)) if text.starts_with("Hello!")
    ));
    assert!(user(&mut state, UserAction::CopyMessage(9)).is_empty());
}
