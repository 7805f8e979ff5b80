//! The agent reasoning loop implementation.

use loupe_config::AppConfig;
use loupe_core::error::{Error, Result};
use loupe_core::message::{Message, ToolCall};
use loupe_core::provider::{Provider, ProviderRequest, ToolChoice};
use loupe_core::tool::ToolRegistry;
use loupe_core::usage::TokenUsage;
use loupe_inspection::InspectionHub;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::session::AgentSession;
use crate::trace;

/// Returned when the model finishes without any text.
pub const NO_ANSWER: &str = "agent produced no answer";

/// Drives model and tool calls for one session until the model answers.
pub struct AgentLoop {
    /// The model endpoint
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Injected once, when the context is empty
    system_prompt: String,

    /// Maximum model calls per run
    max_iterations: u32,

    session: Arc<AgentSession>,

    /// Serializes whole runs against the shared context
    run_lock: Mutex<()>,
}

impl AgentLoop {
    /// Create a new agent loop over an existing session.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        session: Arc<AgentSession>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            system_prompt: system_prompt.into(),
            max_iterations: 25,
            session,
            run_lock: Mutex::new(()),
        }
    }

    /// Build a loop and a fresh session from configuration.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        hub: Arc<InspectionHub>,
    ) -> Self {
        let session = Arc::new(AgentSession::new(provider.clone(), tools, hub));
        Self::new(provider, &config.model, &config.system_prompt, session)
            .with_max_iterations(config.max_iterations)
    }

    /// Set the maximum number of model calls per run.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn session(&self) -> &Arc<AgentSession> {
        &self.session
    }

    /// Run one user turn with the configured system prompt.
    pub async fn run(&self, input: &str) -> Result<String> {
        self.run_with_system_prompt(input, None).await
    }

    /// Run one user turn.
    ///
    /// `system_prompt` overrides the configured prompt, but only takes effect
    /// when the context is empty. Errors leave the context as it was at the
    /// point of failure; the next run continues from there.
    pub async fn run_with_system_prompt(
        &self,
        input: &str,
        system_prompt: Option<&str>,
    ) -> Result<String> {
        let _running = self.run_lock.lock().await;
        let context = self.session.context();
        let hub = self.session.hub();
        let tools = self.session.tools();

        if context.is_empty() {
            context.append(Message::system(system_prompt.unwrap_or(&self.system_prompt)));
        }
        context.append(Message::user(input));

        info!(
            model = %self.model,
            messages = context.len(),
            "Processing user input"
        );

        let definitions = tools.definitions();

        for iteration in 1..=self.max_iterations {
            debug!(iteration, "Agent loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: context.snapshot(),
                tools: definitions.clone(),
                tool_choice: ToolChoice::Auto,
            };
            hub.publish_event(&trace::thinking(iteration));

            let response = self.provider.complete(request).await.map_err(|e| {
                warn!(provider = self.provider.name(), error = %e, "Model call failed");
                e
            })?;

            if let Some(usage) = response.usage {
                self.session
                    .usage()
                    .record_usage(
                        usage.prompt_tokens.into(),
                        usage.completion_tokens.into(),
                        usage.total_tokens.into(),
                        &self.model,
                    )
                    .await;
            }

            let message = response.message;
            hub.publish_event(&trace::assistant_message(&message));

            if message.tool_calls.is_empty() {
                let answer = if message.has_text() {
                    message.text().to_string()
                } else {
                    NO_ANSWER.to_string()
                };
                context.append(message);
                hub.publish_event(&trace::final_answer(&answer));
                info!(iterations = iteration, "Agent produced final answer");
                return Ok(answer);
            }

            let calls = message.tool_calls;
            context.append(Message::assistant_tool_calls(calls.clone()));
            hub.publish_event(&trace::tools_requested(&calls));

            for call in &calls {
                let arguments = self.parse_arguments(call);

                let Some(tool) = tools.get(&call.name) else {
                    warn!(tool = %call.name, "Model requested an unknown tool");
                    return Err(Error::UnknownTool(call.name.clone()));
                };

                debug!(tool = %call.name, call_id = %call.id, "Executing tool");
                let result = tool.execute(arguments.clone()).await.map_err(|e| {
                    warn!(tool = %call.name, error = %e, "Tool execution failed");
                    e
                })?;

                let content = serde_json::to_string(&result)?;
                context.append(Message::tool_result(&call.id, &content));
                hub.publish_event(&trace::tool_result(call, &arguments, &content));
            }
        }

        warn!(limit = self.max_iterations, "Max iterations reached without an answer");
        Err(Error::MaxIterationsExceeded {
            limit: self.max_iterations,
        })
    }

    /// Empty the context and reset usage. Waits for any run in progress.
    pub async fn clear(&self) -> TokenUsage {
        let _running = self.run_lock.lock().await;
        self.session.context().clear(&self.model).await
    }

    /// Blank arguments mean `{}`; malformed ones fall back to `{}` too.
    fn parse_arguments(&self, call: &ToolCall) -> serde_json::Value {
        if call.arguments.trim().is_empty() {
            return serde_json::json!({});
        }
        match serde_json::from_str(&call.arguments) {
            Ok(value) => value,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Malformed tool arguments, using {{}}");
                self.session
                    .hub()
                    .publish_event(&trace::malformed_arguments(call));
                serde_json::json!({})
            }
        }
    }
}
