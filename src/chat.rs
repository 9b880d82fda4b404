//! Interactive assistant that answers prayer-time questions through a
//! `get_prayer_times` tool backed by [`PrayerService`].

use std::io::Write;

use futures::stream::{self, StreamExt};
use genai::{
    Client,
    chat::{ChatMessage, ChatRequest, ChatResponse, MessageContent, Tool, ToolCall, ToolResponse},
};
use serde_json::{Value, json};
use tracing::{Instrument, debug, error, info, span};

use crate::{query::PrayerRequest, service::PrayerService};

pub const PRAYER_TOOL: &str = "get_prayer_times";

/// Tool definition advertised to the model
pub fn prayer_tool() -> Tool {
    Tool::new(PRAYER_TOOL)
        .with_description("Get the Islamic prayer times (Fajr, Dhuhr, Asr, Maghrib, Isha) for a city")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name in English, e.g. \"Lahore\"."
                },
                "country": {
                    "type": "string",
                    "description": "Country name in English, e.g. \"Pakistan\"."
                },
                "date": {
                    "type": "string",
                    "description": "Date in YYYY-MM-DD format. Omit for today."
                }
            },
            "required": ["city", "country"]
        }))
}

/// Runs the chat loop on stdin until the user (or the model) says `exit`.
pub async fn run(model: &str, service: PrayerService) -> anyhow::Result<()> {
    let client = Client::default();

    let mut chat_req = ChatRequest::default()
        .with_system(
            "Answer with one sentence or a tool call. Prayer times come from the \
             get_prayer_times tool only. Send `exit` to stop.",
        )
        .with_tools(vec![prayer_tool()]);

    span!(tracing::Level::INFO, "chat", role = "assistant").in_scope(|| {
        info!("Assalamu alaikum! Ask me for prayer times in any city");
        info!("Send `exit` to stop");
    });

    let mut buffer = String::new();
    print!("> ");
    std::io::stdout().flush()?;
    std::io::stdin().read_line(&mut buffer)?;

    // read_line returns an empty buffer on EOF
    while !buffer.is_empty() && buffer.trim() != "exit" {
        let user_request = buffer.trim_start_matches('>').trim();

        if !user_request.is_empty() {
            span!(tracing::Level::INFO, "chat", role = "user").in_scope(|| {
                info!(user_request);
            });

            chat_req = chat_req.append_message(ChatMessage::user(user_request.to_string()));

            chat_req = call_loop(&client, model, &service, chat_req)
                .instrument(span!(tracing::Level::INFO, "call_loop"))
                .await?;

            if let Some(last_message) = chat_req.messages.last() {
                if let MessageContent::Text(text) = &last_message.content {
                    span!(tracing::Level::INFO, "chat", role = "assistant")
                        .in_scope(|| info!("{}", text));
                    if text.as_str() == "exit" {
                        info!("User wants to exit");
                        break;
                    }
                }
            }
        }

        print!("> ");
        std::io::stdout().flush()?;

        buffer.clear();
        std::io::stdin().read_line(&mut buffer)?;
    }

    Ok(())
}

/// Keeps calling the model while the last message is a tool response.
async fn call_loop(
    client: &Client,
    model: &str,
    service: &PrayerService,
    chat_req: ChatRequest,
) -> anyhow::Result<ChatRequest> {
    let mut chat_req = make_call(client, model, service, chat_req).await?;
    while let Some(last_message) = chat_req.messages.last() {
        if let MessageContent::ToolResponses(_) = last_message.content {
            debug!("Tool call response detected, making another call to the model");
            chat_req = make_call(client, model, service, chat_req).await?;
        } else {
            break;
        }
    }

    Ok(chat_req)
}

/// Executes one tool call and renders its JSON answer for the model.
pub async fn answer_tool_call(service: &PrayerService, fn_name: &str, arguments: &Value) -> Value {
    if fn_name != PRAYER_TOOL {
        error!("Tool call function not implemented: {}", fn_name);
        return json!({ "error": format!("Tool call function not implemented: {fn_name}") });
    }

    let result = async {
        let query = PrayerRequest::validate_json(arguments)?;
        service.get_prayer_times(query).await
    }
    .await;

    match result {
        Ok(prayer_times) => json!(prayer_times),
        Err(e) => {
            error!("Failed to make tool call: {}", e);
            json!({ "error": e.to_string() })
        }
    }
}

async fn make_tool_call(service: &PrayerService, tool_call: ToolCall) -> ToolResponse {
    info!(
        "Tool call: \n\tFunction: {}\n\tArguments: {}",
        tool_call.fn_name, tool_call.fn_arguments
    );

    let answer = answer_tool_call(service, &tool_call.fn_name, &tool_call.fn_arguments).await;
    ToolResponse::new(tool_call.call_id.clone(), answer.to_string())
}

/// Make a call to the model and process the response.
async fn make_call(
    client: &Client,
    model: &str,
    service: &PrayerService,
    chat_req: ChatRequest,
) -> anyhow::Result<ChatRequest> {
    debug!("Sending request to the model: {:?}", chat_req.messages);
    let response: ChatResponse = client.exec_chat(model, chat_req.clone(), None).await?;

    let req: ChatRequest = match response.content {
        Some(MessageContent::Text(text)) => {
            chat_req.append_message(ChatMessage::assistant(text.trim()))
        }
        Some(MessageContent::ToolCalls(tool_calls)) => {
            let chat_req = chat_req.append_message(ChatMessage::assistant(
                MessageContent::ToolCalls(tool_calls.clone()),
            ));

            let tool_responses: Vec<ToolResponse> = stream::iter(tool_calls)
                .map(|tool_call| make_tool_call(service, tool_call))
                .buffer_unordered(3)
                .collect::<Vec<ToolResponse>>()
                .await;

            debug!("Tool calls: {:#?}", tool_responses);

            tool_responses
                .into_iter()
                .fold(chat_req, |chat_req, next| chat_req.append_message(next))
        }
        Some(_) => {
            error!("> Bot: Unsupported response type");
            chat_req.append_message(ChatMessage::assistant("Unsupported response type"))
        }
        None => {
            error!("> Bot: No response");
            chat_req.append_message(ChatMessage::assistant("No response"))
        }
    };

    Ok(req)
}
