//! Jinja prompt templates
//!
//! A template sees one variable, `messages`: the turn's message list. The
//! `transcript` filter renders that list as `Role: text` lines.
//!
//! ```text
//! Answer the last question in this conversation:
//! {{ messages | transcript }}
//! ```

use std::fmt;

use minijinja::{context, value::ViaDeserialize, Environment, Error, ErrorKind, Value};

use crate::{
    error::Result,
    messages::{self, Message},
};

const TEMPLATE_NAME: &str = "prompt";

/// Variable the turn's messages are bound to
const MESSAGES_VAR: &str = "messages";

/// A compiled prompt template
pub struct PromptTemplate {
    env: Environment<'static>,
    source: String,
}

impl PromptTemplate {
    /// Compile a template
    ///
    /// # Errors
    ///
    /// Returns [`crate::AdapterError::Template`] if the source does not parse
    /// or never reads `messages`.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut env = Environment::new();
        env.add_filter("transcript", transcript_filter);
        env.add_template_owned(TEMPLATE_NAME, source.clone())?;

        let referenced = env
            .get_template(TEMPLATE_NAME)?
            .undeclared_variables(false);
        if !referenced.contains(MESSAGES_VAR) {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                "prompt template never references `messages`",
            )
            .into());
        }

        Ok(Self { env, source })
    }

    /// Render the template with `messages` bound to the given list
    ///
    /// # Errors
    ///
    /// Returns [`crate::AdapterError::Template`] if rendering fails.
    pub fn render(&self, messages: &[Message]) -> Result<String> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let messages = Value::from_serialize(messages);
        Ok(template.render(context! { messages => messages })?)
    }
}

impl fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

fn transcript_filter(messages: ViaDeserialize<Vec<Message>>) -> String {
    messages::transcript(&messages.0)
}
