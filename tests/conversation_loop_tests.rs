//! Behaviour of the conversation loop against scripted collaborators.

mod common;

use common::{context, kind, ScriptedConsole, ScriptedProvider, Shown};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use simple_agent::agent_loop::{AgentContext, ConversationLoop, LoopState, StepOutcome};
use simple_agent::error::AgentError;
use simple_agent::tools::{default_tools, ToolRegistry};
use simple_agent::types::*;

fn read_call(id: &str, path: &str) -> ToolCall {
    ToolCall::new(id, "file_read", json!({ "file_path": path }))
}

#[tokio::test]
async fn reads_a_file_and_answers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, "alpha\nbeta\n").unwrap();
    let path = path.to_str().unwrap().to_string();

    let provider = ScriptedProvider::new();
    provider
        .queue_tool_calls(vec![read_call("call-1", &path)])
        .queue_text("The file lists alpha and beta.");
    let console = ScriptedConsole::with_lines(&[&format!("What's in {path}?")]);
    let mut conversation = ConversationLoop::new(context(&provider, &console));

    assert_eq!(conversation.state(), LoopState::AwaitUserInput);
    assert_eq!(conversation.step().await.unwrap(), StepOutcome::Continue(LoopState::QueryModel));
    assert_eq!(conversation.step().await.unwrap(), StepOutcome::Continue(LoopState::InvokeTools));
    assert_eq!(conversation.step().await.unwrap(), StepOutcome::Continue(LoopState::QueryModel));
    assert_eq!(
        conversation.step().await.unwrap(),
        StepOutcome::Continue(LoopState::AwaitUserInput)
    );
    assert_eq!(conversation.step().await.unwrap(), StepOutcome::InputClosed);

    let messages = conversation.transcript().messages();
    assert_eq!(
        messages.iter().map(kind).collect::<Vec<_>>(),
        ["user", "assistant_tools", "tool_result", "assistant_text"]
    );
    let Message::ToolResult(result) = &messages[2] else {
        panic!("expected tool result");
    };
    assert_eq!(result.call_id, "call-1");
    assert_eq!(result.name, "file_read");
    assert_eq!(result.content, "alpha\nbeta\n");
    assert!(!result.is_error);

    // The second query carries the augmented transcript.
    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages.len(), 3);
    assert_eq!(requests[1].messages.len(), 5);
    assert_eq!(requests[1].messages[4], messages[2]);
    assert_eq!(conversation.usage().total_tokens, 45);
}

#[tokio::test]
async fn every_request_starts_with_instruction_and_working_directory() {
    let provider = ScriptedProvider::new();
    provider.queue_text("one").queue_text("two");
    let console = ScriptedConsole::with_lines(&["first", "second"]);
    let mut conversation = ConversationLoop::new(context(&provider, &console));

    conversation.run().await.unwrap();

    for request in provider.requests() {
        assert_eq!(
            request.messages[0],
            Message::system("You are a helpful assistant that can read files.")
        );
        assert_eq!(request.messages[1], Message::user("Working directory: /work"));
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, "file_read");
        assert!((request.settings.temperature - 0.7).abs() < f64::EPSILON);
    }
    // Never persisted, so never duplicated.
    let transcript = conversation.transcript();
    assert!(transcript
        .messages()
        .iter()
        .all(|m| !matches!(m, Message::System { .. })));
    assert!(!transcript
        .messages()
        .contains(&Message::user("Working directory: /work")));
    assert_eq!(transcript.len(), 4);
}

#[tokio::test]
async fn transcript_only_grows_and_never_changes() {
    let provider = ScriptedProvider::new();
    provider
        .queue_tool_calls(vec![read_call("a", "/definitely/not/here")])
        .queue_error(AgentError::api(500, "overloaded"))
        .queue_text("sorry about that");
    let console = ScriptedConsole::with_lines(&["read it", "try again"]);
    let mut conversation = ConversationLoop::new(context(&provider, &console));

    let mut previous: Vec<Message> = Vec::new();
    loop {
        let outcome = conversation.step().await.unwrap();
        let current = conversation.transcript().messages().to_vec();
        assert!(current.len() >= previous.len());
        assert_eq!(&current[..previous.len()], &previous[..]);
        previous = current;
        if outcome == StepOutcome::InputClosed {
            break;
        }
    }
    assert_eq!(previous.len(), 5);
}

#[tokio::test]
async fn unknown_tool_still_gets_a_result() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("b.txt");
    std::fs::write(&path, "bravo").unwrap();

    let provider = ScriptedProvider::new();
    provider
        .queue_tool_calls(vec![
            ToolCall::new("x1", "delete_everything", json!({})),
            read_call("x2", path.to_str().unwrap()),
        ])
        .queue_text("done");
    let console = ScriptedConsole::with_lines(&["go"]);
    let mut conversation = ConversationLoop::new(context(&provider, &console));

    conversation.run().await.unwrap();

    let results: Vec<&ToolResult> = conversation
        .transcript()
        .messages()
        .iter()
        .filter_map(|m| match m {
            Message::ToolResult(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].call_id, "x1");
    assert!(results[0].is_error);
    assert_eq!(results[0].content, "Error: Tool 'delete_everything' not found");
    assert_eq!(results[1].call_id, "x2");
    assert_eq!(results[1].content, "bravo");
    // The model was queried again after the tool phase.
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test]
async fn missing_file_becomes_error_content_and_the_model_is_asked_again() {
    let provider = ScriptedProvider::new();
    provider
        .queue_tool_calls(vec![read_call("m1", "/no/such/file.txt")])
        .queue_text("That file does not exist.");
    let console = ScriptedConsole::with_lines(&["What's in /no/such/file.txt?"]);
    let mut conversation = ConversationLoop::new(context(&provider, &console));

    conversation.step().await.unwrap();
    conversation.step().await.unwrap();
    assert_eq!(
        conversation.step().await.unwrap(),
        StepOutcome::Continue(LoopState::QueryModel)
    );

    let Some(Message::ToolResult(result)) = conversation.transcript().last() else {
        panic!("expected a tool result");
    };
    assert_eq!(result.call_id, "m1");
    assert!(result.is_error);
    assert!(result.content.starts_with("Error: /no/such/file.txt"), "{}", result.content);
}

#[tokio::test]
async fn every_call_is_answered_in_order() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<String> = (0..4)
        .map(|i| {
            let p = dir.path().join(format!("{i}.txt"));
            std::fs::write(&p, format!("file {i}")).unwrap();
            p.to_str().unwrap().to_string()
        })
        .collect();
    let calls: Vec<ToolCall> = paths
        .iter()
        .enumerate()
        .map(|(i, p)| read_call(&format!("id-{i}"), p))
        .collect();

    for parallel in [false, true] {
        let provider = ScriptedProvider::new();
        provider.queue_tool_calls(calls.clone()).queue_text("ok");
        let console = ScriptedConsole::with_lines(&["read them all"]);
        let mut ctx = context(&provider, &console);
        ctx.parallel_tool_calls = parallel;
        let mut conversation = ConversationLoop::new(ctx);

        conversation.run().await.unwrap();

        let messages = conversation.transcript().messages();
        assert_eq!(messages[1].tool_calls().len(), 4);
        let answered: Vec<(String, String)> = messages[2..6]
            .iter()
            .map(|m| match m {
                Message::ToolResult(r) => (r.call_id.clone(), r.content.clone()),
                other => panic!("expected tool result, got {other:?}"),
            })
            .collect();
        let expected: Vec<(String, String)> = (0..4)
            .map(|i| (format!("id-{i}"), format!("file {i}")))
            .collect();
        assert_eq!(answered, expected, "parallel = {parallel}");
        assert!(conversation.transcript().pending_tool_calls().is_empty());
    }
}

#[tokio::test]
async fn model_failure_returns_to_user_input_and_keeps_the_question() {
    let provider = ScriptedProvider::new();
    provider
        .queue_error(AgentError::Authentication("API key not valid".into()))
        .queue_text("Now it works.");
    let console = ScriptedConsole::with_lines(&["hello?", "hello again"]);
    let mut conversation = ConversationLoop::new(context(&provider, &console));

    conversation.step().await.unwrap();
    assert_eq!(
        conversation.step().await.unwrap(),
        StepOutcome::Continue(LoopState::AwaitUserInput)
    );
    assert_eq!(conversation.transcript().messages(), &[Message::user("hello?")]);

    conversation.run().await.unwrap();

    assert_eq!(
        conversation.transcript().messages().iter().map(kind).collect::<Vec<_>>(),
        ["user", "user", "assistant_text"]
    );
    // The retried query still includes the unanswered question.
    let last_request = provider.requests().pop().unwrap();
    assert!(last_request.messages.contains(&Message::user("hello?")));
    assert!(console
        .shown()
        .contains(&Shown::Error("Authentication error: API key not valid".into())));
}

#[tokio::test(start_paused = true)]
async fn slow_model_times_out_without_ending_the_loop() {
    struct Stalled;

    #[async_trait::async_trait]
    impl simple_agent::provider::ModelProvider for Stalled {
        fn provider_name(&self) -> &str {
            "stalled"
        }

        fn model_id(&self) -> &str {
            "stalled"
        }

        async fn generate(
            &self,
            _request: &simple_agent::provider::ProviderRequest,
        ) -> simple_agent::error::Result<simple_agent::provider::ProviderResponse> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Err(AgentError::api(500, "unreachable"))
        }
    }

    let console = ScriptedConsole::with_lines(&["anyone there?"]);
    let ctx = AgentContext::builder()
        .provider(Box::new(Stalled))
        .console(Box::new(console.clone()))
        .request_timeout(std::time::Duration::from_secs(2))
        .build();
    let mut conversation = ConversationLoop::new(ctx);

    conversation.run().await.unwrap();

    assert!(console
        .shown()
        .contains(&Shown::Error("Timeout after 2000ms".into())));
    assert_eq!(conversation.transcript().len(), 1);
}

#[tokio::test]
async fn blank_lines_are_ignored() {
    let provider = ScriptedProvider::new();
    provider.queue_text("hi!");
    let console = ScriptedConsole::with_lines(&["", "   ", "  hello  "]);
    let mut conversation = ConversationLoop::new(context(&provider, &console));

    conversation.run().await.unwrap();

    assert_eq!(
        conversation.transcript().messages(),
        &[Message::user("hello"), Message::assistant("hi!")]
    );
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn greeting_opens_the_transcript_and_is_shown() {
    let provider = ScriptedProvider::new();
    provider.queue_text("Sure.");
    let console = ScriptedConsole::with_lines(&["help me"]);
    let ctx = AgentContext::builder()
        .provider(Box::new(provider.clone()))
        .console(Box::new(console.clone()))
        .registry(ToolRegistry::new(default_tools()).unwrap())
        .greeting("Hello! How can I assist you today?")
        .build();
    let mut conversation = ConversationLoop::new(ctx);

    conversation.run().await.unwrap();

    assert_eq!(
        conversation.transcript().messages()[0],
        Message::assistant("Hello! How can I assist you today?")
    );
    assert_eq!(
        console.shown(),
        vec![
            Shown::Banner("scripted-model".into()),
            Shown::Assistant("Hello! How can I assist you today?".into()),
            Shown::User("help me".into()),
            Shown::Assistant("Sure.".into()),
        ]
    );
}

#[tokio::test]
async fn tool_calls_and_results_are_rendered() {
    let provider = ScriptedProvider::new();
    let call = read_call("r1", "/missing");
    provider.queue_tool_calls(vec![call.clone()]).queue_text("gone");
    let console = ScriptedConsole::with_lines(&["look"]);
    let mut conversation = ConversationLoop::new(context(&provider, &console));

    conversation.run().await.unwrap();

    let shown = console.shown();
    assert_eq!(shown[2], Shown::ToolCalls(vec![call]));
    assert!(matches!(&shown[3], Shown::ToolResult(r) if r.is_error && r.call_id == "r1"));
    assert_eq!(shown[4], Shown::Assistant("gone".into()));
}
