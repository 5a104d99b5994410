//! Turn adapter
//!
//! Buffers one inbound turn of content parts, converts it into chat
//! messages, calls the model's streaming entry point, and relays each chunk
//! as a `text/plain` part with role `model`.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use futures::StreamExt;
//! use turn_adapter::{
//!     config::ModelProfile, services::openai::OpenAIChatModel, ContentPart, TurnAdapter,
//! };
//!
//! # async fn run() -> turn_adapter::Result<()> {
//! let llm = Arc::new(OpenAIChatModel::new(ModelProfile::default())?);
//! let adapter = TurnAdapter::builder(llm)
//!     .system_instruction("Be terse.")
//!     .build()?;
//!
//! let turn = futures::stream::iter(vec![ContentPart::text("Hello").with_role("user")]);
//! let mut output = Box::pin(adapter.process(turn));
//! while let Some(part) = output.next().await {
//!     print!("{}", part?.text_content());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use futures::{Stream, StreamExt};

use crate::{
    content::ContentPart,
    convert,
    error::Result,
    messages::Message,
    services::{model_identifier, ChatModel, ModelInput},
    template::PromptTemplate,
};

/// Turns buffered parts into a model payload
///
/// Holds the optional system instruction and prompt template. Immutable
/// once built, so it can be shared between concurrent turns.
#[derive(Debug, Clone, Default)]
pub struct TurnFormatter {
    system_instruction: String,
    prompt_template: Option<Arc<PromptTemplate>>,
}

impl TurnFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system instruction prepended to every turn (empty disables it)
    #[must_use]
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Compile and set the prompt template
    ///
    /// # Errors
    ///
    /// Returns [`crate::AdapterError::Template`] if the template does not parse.
    pub fn prompt_template(mut self, source: impl Into<String>) -> Result<Self> {
        self.prompt_template = Some(Arc::new(PromptTemplate::new(source)?));
        Ok(self)
    }

    #[must_use]
    pub fn has_template(&self) -> bool {
        self.prompt_template.is_some()
    }

    /// Group the turn into messages and prepend the system instruction
    ///
    /// # Errors
    ///
    /// Returns [`crate::AdapterError::UnsupportedMimetype`] for parts that
    /// are neither text nor images with bytes.
    pub fn messages(&self, parts: &[ContentPart]) -> Result<Vec<Message>> {
        let mut messages = convert::to_messages(parts)?;
        if !self.system_instruction.is_empty() {
            messages.insert(0, Message::system(self.system_instruction.clone()));
        }
        Ok(messages)
    }

    /// Build the payload handed to the model
    ///
    /// # Errors
    ///
    /// Fails on unsupported parts or when the template cannot be rendered.
    pub fn payload(&self, parts: &[ContentPart]) -> Result<ModelInput> {
        let messages = self.messages(parts)?;
        match &self.prompt_template {
            Some(template) => Ok(ModelInput::Prompt {
                input: template.render(&messages)?,
            }),
            None => Ok(ModelInput::Messages(messages)),
        }
    }
}

/// Adapter between content-part streams and a chat model
#[derive(Clone)]
pub struct TurnAdapter {
    llm: Arc<dyn ChatModel>,
    formatter: TurnFormatter,
}

impl TurnAdapter {
    /// Start building an adapter around a model
    #[must_use]
    pub fn builder(llm: Arc<dyn ChatModel>) -> TurnAdapterBuilder {
        TurnAdapterBuilder {
            llm,
            system_instruction: None,
            prompt_template: None,
        }
    }

    /// Create an adapter from a model and an already-built formatter
    #[must_use]
    pub fn from_parts(llm: Arc<dyn ChatModel>, formatter: TurnFormatter) -> Self {
        Self { llm, formatter }
    }

    /// Process one turn
    ///
    /// The whole input stream is drained before anything else happens. Input
    /// errors surface before the model is called; model errors end the
    /// output stream after whatever parts were already yielded.
    pub fn process<'a, S>(&'a self, turn: S) -> impl Stream<Item = Result<ContentPart>> + Send + 'a
    where
        S: Stream<Item = ContentPart> + Send + 'a,
    {
        async_stream::try_stream! {
            let parts: Vec<ContentPart> = turn.collect().await;
            let payload = self.formatter.payload(&parts)?;
            tracing::debug!(
                parts = parts.len(),
                templated = self.formatter.has_template(),
                "turn collected"
            );

            let model = model_identifier(self.llm.as_ref());
            let mut chunks = self.llm.stream(payload).await?;
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                yield ContentPart::model_output(chunk.content, &model);
            }
        }
    }

    /// Process a turn that has already been collected
    pub fn process_parts(
        &self,
        parts: Vec<ContentPart>,
    ) -> impl Stream<Item = Result<ContentPart>> + Send + '_ {
        self.process(futures::stream::iter(parts))
    }
}

impl std::fmt::Debug for TurnAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnAdapter")
            .field("llm", &model_identifier(self.llm.as_ref()))
            .field("formatter", &self.formatter)
            .finish()
    }
}

/// Builder for [`TurnAdapter`]
pub struct TurnAdapterBuilder {
    llm: Arc<dyn ChatModel>,
    system_instruction: Option<String>,
    prompt_template: Option<String>,
}

impl TurnAdapterBuilder {
    #[must_use]
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn prompt_template(mut self, source: impl Into<String>) -> Self {
        self.prompt_template = Some(source.into());
        self
    }

    /// Build the adapter, compiling the template if one was given
    ///
    /// # Errors
    ///
    /// Returns [`crate::AdapterError::Template`] if the template does not parse.
    pub fn build(self) -> Result<TurnAdapter> {
        let mut formatter = TurnFormatter::new();
        if let Some(instruction) = self.system_instruction {
            formatter = formatter.system_instruction(instruction);
        }
        if let Some(source) = self.prompt_template {
            formatter = formatter.prompt_template(source)?;
        }
        Ok(TurnAdapter::from_parts(self.llm, formatter))
    }
}
