//! Builders for the inspection events emitted by the loop.

use loupe_core::event::{InspectionEvent, TraceLabel};
use loupe_core::message::{Message, ToolCall};

pub fn thinking(iteration: u32) -> InspectionEvent {
    InspectionEvent::log(format!("Thinking... (step {iteration})"))
}

/// The raw assistant reply: content, reasoning and requested calls.
pub fn assistant_message(message: &Message) -> InspectionEvent {
    let mut event = InspectionEvent::trace("Assistant message");
    if message.has_text() {
        event = event.with_child(TraceLabel::Content, message.text());
    }
    if let Some(reasoning) = &message.reasoning {
        event = event.with_child(TraceLabel::Reasoning, reasoning.as_str());
    }
    if !message.tool_calls.is_empty() {
        let calls: Vec<String> = message
            .tool_calls
            .iter()
            .map(|c| format!("{}({})", c.name, c.arguments))
            .collect();
        event = event.with_child(TraceLabel::ToolCalls, calls.join("\n"));
    }
    event
}

pub fn tools_requested(calls: &[ToolCall]) -> InspectionEvent {
    let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
    InspectionEvent::log(format!("Requested tools: {}", names.join(", ")))
}

pub fn malformed_arguments(call: &ToolCall) -> InspectionEvent {
    InspectionEvent::log(format!(
        "Malformed arguments for {}, using {{}}: {}",
        call.name, call.arguments
    ))
}

/// One executed call and its serialized result.
pub fn tool_result(
    call: &ToolCall,
    arguments: &serde_json::Value,
    result: &str,
) -> InspectionEvent {
    InspectionEvent::trace(format!("Tool result: {}", call.name))
        .with_child(TraceLabel::ToolCalls, format!("{}({arguments})", call.name))
        .with_child(TraceLabel::Content, result)
}

pub fn final_answer(answer: &str) -> InspectionEvent {
    InspectionEvent::trace("Final answer").with_child(TraceLabel::Content, answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_trace_lists_present_parts_only() {
        let mut message = Message::assistant("");
        message.reasoning = Some("look it up".into());
        message.tool_calls = vec![ToolCall::new("c1", "getWeather", r#"{"location":"Berlin"}"#)];

        let event = assistant_message(&message);
        let labels: Vec<TraceLabel> = event.children().iter().map(|c| c.label).collect();
        assert_eq!(labels, vec![TraceLabel::Reasoning, TraceLabel::ToolCalls]);
        assert_eq!(
            event.children()[1].data,
            r#"getWeather({"location":"Berlin"})"#
        );
    }

    #[test]
    fn tools_requested_names_in_order() {
        let calls = vec![
            ToolCall::new("a", "getWeather", "{}"),
            ToolCall::new("b", "getMovie", "{}"),
        ];
        assert_eq!(
            tools_requested(&calls).headline(),
            "Requested tools: getWeather, getMovie"
        );
    }

    #[test]
    fn tool_result_carries_call_and_output() {
        let call = ToolCall::new("c1", "getMovie", r#"{"title":"Alien"}"#);
        let event = tool_result(&call, &serde_json::json!({"title": "Alien"}), r#"{"year":1979}"#);
        assert_eq!(event.headline(), "Tool result: getMovie");
        assert_eq!(event.children()[0].data, r#"getMovie({"title":"Alien"})"#);
        assert_eq!(event.children()[1].data, r#"{"year":1979}"#);
    }
}
