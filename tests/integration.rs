#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use faq_bot::{
    base::{
        config::Config,
        faq::FaqIndex,
        types::{ConversationKind, Identity, InboundTurn, MessageHandle, Res, Void},
    },
    interaction::turn::{TurnOutcome, TurnResolver},
    service::{
        chat::{ChatClient, GenericChatClient},
        llm::{GenericLlmClient, LlmClient},
    },
};
use mockall::{Sequence, mock, predicate::eq};

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_handle(&self) -> &str;
        async fn start(&self) -> Void;
        async fn send_message(&self, conversation_id: i64, reply_to: Option<i32>, text: &str) -> Res<MessageHandle>;
        async fn edit_message(&self, handle: &MessageHandle, text: &str) -> Void;
        async fn send_typing(&self, conversation_id: i64) -> Void;
    }
}

// Mock LLM client for testing.

mock! {
    pub Llm {}

    #[async_trait]
    impl GenericLlmClient for Llm {
        async fn complete(&self, persona: &str, user_text: &str) -> Res<String>;
    }
}

// Fixtures.

const CHAT_ID: i64 = 4242;
const INBOUND_ID: i32 = 3;
const PLACEHOLDER_ID: i32 = 7;

const PERSONA: &str = "You are a helpful assistant for a gym.";
const PLACEHOLDER: &str = "Thinking...";
const DEGRADED: &str = "Sorry, I can't answer right now. Please contact +91-XXXXXXXXXX.";
const OPENING_HOURS: &str = "We're open Monday to Saturday 6:00 AM to 10:00 PM, and Sundays 7:00 AM to 5:00 PM.";
const MEMBERSHIP_FEE: &str = "Standard membership is 1,499/month. Discounts available for 3-month and yearly plans.";
const FEE: &str = "Fees depend on the plan you choose.";

fn gym_config(show_typing: bool) -> Config {
    let profile = format!(
        r#"
        bot_handle = "gold_fitness_bot"
        persona = "{PERSONA}"
        placeholder_message = "{PLACEHOLDER}"
        degraded_message = "{DEGRADED}"
        show_typing = {show_typing}

        [[faq]]
        trigger = "opening hours"
        answer = "{OPENING_HOURS}"

        [[faq]]
        trigger = "membership fee"
        answer = "{MEMBERSHIP_FEE}"

        [[faq]]
        trigger = "fee"
        answer = "{FEE}"
        "#
    );

    Config::from_toml(&profile, |name| match name {
        "TELEGRAM_TOKEN" => Some("123:abc".to_string()),
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        _ => None,
    })
    .expect("test profile should load")
}

/// Helper function to build a resolver over the given mocks.
fn setup_resolver(chat: MockChat, llm: MockLlm, show_typing: bool) -> TurnResolver {
    let config = gym_config(show_typing);
    let faq = FaqIndex::new(config.faq.clone()).expect("test FAQ should be valid");
    let identity = Identity::new(config.bot_handle.as_deref().unwrap_or_default(), &config.persona);

    TurnResolver::new(config, identity, faq, LlmClient::new(Arc::new(llm)), ChatClient::new(Arc::new(chat)))
}

fn direct(text: &str) -> InboundTurn {
    InboundTurn::new(CHAT_ID, ConversationKind::Direct, Some(text.to_string())).replying_to(INBOUND_ID)
}

fn group(text: &str) -> InboundTurn {
    InboundTurn::new(CHAT_ID, ConversationKind::Group, Some(text.to_string())).replying_to(INBOUND_ID)
}

fn placeholder_handle() -> MessageHandle {
    MessageHandle {
        conversation_id: CHAT_ID,
        message_id: PLACEHOLDER_ID,
    }
}

/// Expect the placeholder to be sent once, in sequence, as a reply to the inbound message.
fn expect_placeholder(chat: &mut MockChat, seq: &mut Sequence) {
    chat.expect_send_message()
        .withf(|id, reply_to, text| *id == CHAT_ID && *reply_to == Some(INBOUND_ID) && text == PLACEHOLDER)
        .times(1)
        .in_sequence(seq)
        .returning(|_, _, _| Ok(placeholder_handle()));
}

// FAQ fast path.

#[tokio::test]
async fn test_direct_faq_hit_answers_verbatim_without_backend() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();

    chat.expect_send_message()
        .withf(|id, reply_to, text| *id == CHAT_ID && *reply_to == Some(INBOUND_ID) && text == OPENING_HOURS)
        .times(1)
        .returning(|_, _, _| Ok(MessageHandle { conversation_id: CHAT_ID, message_id: 1 }));
    chat.expect_edit_message().never();
    chat.expect_send_typing().never();
    llm.expect_complete().never();

    let resolver = setup_resolver(chat, llm, true);

    let outcome = resolver.resolve(direct("What are your opening hours today?")).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Matched);
}

#[tokio::test]
async fn test_first_configured_faq_entry_wins() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();

    // Both "membership fee" and "fee" match; the earlier entry answers.
    chat.expect_send_message()
        .withf(|_, _, text| text == MEMBERSHIP_FEE)
        .times(1)
        .returning(|_, _, _| Ok(MessageHandle { conversation_id: CHAT_ID, message_id: 1 }));
    llm.expect_complete().never();

    let resolver = setup_resolver(chat, llm, false);

    let outcome = resolver.resolve(direct("How much is the MEMBERSHIP FEE?")).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Matched);
}

// LLM fallback.

#[tokio::test]
async fn test_unmatched_message_places_placeholder_then_edits() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete()
        .withf(|persona, text| persona == PERSONA && text == "can you recommend a diet plan for weight loss")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("Sure, here's a plan...".to_string()));
    chat.expect_edit_message()
        .withf(|handle, text| *handle == placeholder_handle() && text == "Sure, here's a plan...")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let resolver = setup_resolver(chat, llm, false);

    let outcome = resolver.resolve(direct("can you recommend a diet plan for weight loss")).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Edited);
}

#[tokio::test]
async fn test_typing_indicator_is_best_effort() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    chat.expect_send_typing()
        .with(eq(CHAT_ID))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(anyhow::anyhow!("Too Many Requests")));
    llm.expect_complete().times(1).in_sequence(&mut seq).returning(|_, _| Ok("Try squats.".to_string()));
    chat.expect_edit_message()
        .withf(|_, text| text == "Try squats.")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let resolver = setup_resolver(chat, llm, true);

    let outcome = resolver.resolve(direct("any warm-up tips?")).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Edited);
}

#[tokio::test]
async fn test_backend_failure_edits_placeholder_with_degraded_answer() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Err(anyhow::anyhow!("OpenAI API call timed out after 2 attempts")));
    chat.expect_edit_message()
        .withf(|_, text| text == DEGRADED)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let resolver = setup_resolver(chat, llm, false);

    let outcome = resolver.resolve(direct("do you sell protein shakes?")).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Edited);
}

#[tokio::test]
async fn test_blank_backend_answer_is_degraded() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete().times(1).in_sequence(&mut seq).returning(|_, _| Ok("   ".to_string()));
    chat.expect_edit_message()
        .withf(|_, text| text == DEGRADED)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let resolver = setup_resolver(chat, llm, false);

    assert_eq!(resolver.resolve(direct("is there parking?")).await.unwrap(), TurnOutcome::Edited);
}

// Finalization fallbacks.

#[tokio::test]
async fn test_failed_edit_sends_new_message_with_same_content() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete().times(1).in_sequence(&mut seq).returning(|_, _| Ok("Sure, here's a plan...".to_string()));
    chat.expect_edit_message()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Err(anyhow::anyhow!("Bad Request: message to edit not found")));
    chat.expect_send_message()
        .withf(|id, reply_to, text| *id == CHAT_ID && *reply_to == Some(INBOUND_ID) && text == "Sure, here's a plan...")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(MessageHandle { conversation_id: CHAT_ID, message_id: 8 }));

    let resolver = setup_resolver(chat, llm, false);

    let outcome = resolver.resolve(direct("can you recommend a diet plan for weight loss")).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Resent);
}

#[tokio::test]
async fn test_backend_failure_and_failed_edit_still_deliver_once() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete().times(1).in_sequence(&mut seq).returning(|_, _| Err(anyhow::anyhow!("connection reset")));
    chat.expect_edit_message().times(1).in_sequence(&mut seq).returning(|_, _| Err(anyhow::anyhow!("message deleted")));
    chat.expect_send_message()
        .withf(|_, _, text| text == DEGRADED)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(MessageHandle { conversation_id: CHAT_ID, message_id: 8 }));

    let resolver = setup_resolver(chat, llm, false);

    assert_eq!(resolver.resolve(direct("what about sauna etiquette?")).await.unwrap(), TurnOutcome::Resent);
}

#[tokio::test]
async fn test_failed_placeholder_sends_answer_fresh() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    chat.expect_send_message()
        .withf(|_, _, text| text == PLACEHOLDER)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Err(anyhow::anyhow!("network unreachable")));
    llm.expect_complete().times(1).in_sequence(&mut seq).returning(|_, _| Ok("Stretch daily.".to_string()));
    chat.expect_send_message()
        .withf(|_, _, text| text == "Stretch daily.")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(MessageHandle { conversation_id: CHAT_ID, message_id: 9 }));
    chat.expect_edit_message().never();

    let resolver = setup_resolver(chat, llm, false);

    assert_eq!(resolver.resolve(direct("how do i avoid soreness")).await.unwrap(), TurnOutcome::Sent);
}

#[tokio::test]
async fn test_undeliverable_answer_is_an_error() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();

    chat.expect_send_message().times(2).returning(|_, _, _| Err(anyhow::anyhow!("bot was blocked by the user")));
    llm.expect_complete().times(1).returning(|_, _| Ok("Hello!".to_string()));

    let resolver = setup_resolver(chat, llm, false);

    assert!(resolver.resolve(direct("hi there")).await.is_err());
}

// Mention gate.

#[tokio::test]
async fn test_group_message_without_mention_sends_nothing() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();

    chat.expect_send_message().never();
    chat.expect_edit_message().never();
    chat.expect_send_typing().never();
    llm.expect_complete().never();

    let resolver = setup_resolver(chat, llm, true);

    assert_eq!(resolver.resolve(group("hello")).await.unwrap(), TurnOutcome::Dropped);
    assert_eq!(resolver.resolve(group("what are your opening hours?")).await.unwrap(), TurnOutcome::Dropped);
    assert_eq!(resolver.resolve(InboundTurn::new(CHAT_ID, ConversationKind::Group, None)).await.unwrap(), TurnOutcome::Dropped);
}

#[tokio::test]
async fn test_group_mention_is_stripped_before_faq_lookup() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();

    chat.expect_send_message()
        .withf(|_, _, text| text == MEMBERSHIP_FEE)
        .times(1)
        .returning(|_, _, _| Ok(MessageHandle { conversation_id: CHAT_ID, message_id: 1 }));
    llm.expect_complete().never();

    let resolver = setup_resolver(chat, llm, true);

    let outcome = resolver.resolve(group("Gold_Fitness_Bot what is the membership fee")).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Matched);
}

#[tokio::test]
async fn test_group_mention_is_removed_once_before_backend() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete()
        .withf(|_, text| text == "does gold_fitness_bot run on weekends?")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("Yes.".to_string()));
    chat.expect_edit_message().times(1).in_sequence(&mut seq).returning(|_, _| Ok(()));

    let resolver = setup_resolver(chat, llm, false);

    let outcome = resolver.resolve(group("@gold_fitness_bot does gold_fitness_bot run on weekends?")).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Edited);
}

#[tokio::test]
async fn test_mention_only_forwards_empty_query() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete()
        .withf(|_, text| text.is_empty())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("How can I help?".to_string()));
    chat.expect_edit_message()
        .withf(|_, text| text == "How can I help?")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let resolver = setup_resolver(chat, llm, false);

    assert_eq!(resolver.resolve(group("gold_fitness_bot")).await.unwrap(), TurnOutcome::Edited);
}

#[tokio::test]
async fn test_direct_message_keeps_handle_text() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete()
        .withf(|_, text| text == "is gold_fitness_bot a real person?")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("No, I'm a bot.".to_string()));
    chat.expect_edit_message().times(1).in_sequence(&mut seq).returning(|_, _| Ok(()));

    let resolver = setup_resolver(chat, llm, false);

    assert_eq!(resolver.resolve(direct("Is gold_fitness_bot a real person?")).await.unwrap(), TurnOutcome::Edited);
}

#[tokio::test]
async fn test_missing_text_in_direct_chat_is_empty_query() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete().withf(|_, text| text.is_empty()).times(1).in_sequence(&mut seq).returning(|_, _| Ok("Hi!".to_string()));
    chat.expect_edit_message().times(1).in_sequence(&mut seq).returning(|_, _| Ok(()));

    let resolver = setup_resolver(chat, llm, false);

    let outcome = resolver.resolve(InboundTurn::new(CHAT_ID, ConversationKind::Direct, None).replying_to(INBOUND_ID)).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Edited);
}

// Reply threading.

#[tokio::test]
async fn test_group_faq_answer_replies_to_asker() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();

    chat.expect_send_message()
        .withf(|id, reply_to, text| *id == CHAT_ID && *reply_to == Some(51) && text == OPENING_HOURS)
        .times(1)
        .returning(|_, _, _| Ok(MessageHandle { conversation_id: CHAT_ID, message_id: 52 }));
    llm.expect_complete().never();

    let resolver = setup_resolver(chat, llm, false);

    let turn = InboundTurn::new(CHAT_ID, ConversationKind::Group, Some("@gold_fitness_bot opening hours?".to_string())).replying_to(51);

    assert_eq!(resolver.resolve(turn).await.unwrap(), TurnOutcome::Matched);
}

#[tokio::test]
async fn test_resent_answer_still_replies_to_asker() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();
    let mut seq = Sequence::new();

    expect_placeholder(&mut chat, &mut seq);
    llm.expect_complete().times(1).in_sequence(&mut seq).returning(|_, _| Ok("Lockers are free.".to_string()));
    chat.expect_edit_message().times(1).in_sequence(&mut seq).returning(|_, _| Err(anyhow::anyhow!("message to edit not found")));
    chat.expect_send_message()
        .withf(|_, reply_to, text| *reply_to == Some(INBOUND_ID) && text == "Lockers are free.")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(MessageHandle { conversation_id: CHAT_ID, message_id: 8 }));

    let resolver = setup_resolver(chat, llm, false);

    assert_eq!(resolver.resolve(group("gold_fitness_bot are lockers free?")).await.unwrap(), TurnOutcome::Resent);
}

#[tokio::test]
async fn test_turn_without_inbound_id_sends_unthreaded() {
    let mut chat = MockChat::new();
    let mut llm = MockLlm::new();

    chat.expect_send_message()
        .withf(|_, reply_to, text| reply_to.is_none() && text == FEE)
        .times(1)
        .returning(|_, _, _| Ok(MessageHandle { conversation_id: CHAT_ID, message_id: 1 }));
    llm.expect_complete().never();

    let resolver = setup_resolver(chat, llm, false);

    let turn = InboundTurn::new(CHAT_ID, ConversationKind::Direct, Some("what's the fee".to_string()));

    assert_eq!(resolver.resolve(turn).await.unwrap(), TurnOutcome::Matched);
}
