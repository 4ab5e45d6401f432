use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::Mutex,
};

/// A human operator consulted when automation gives up.
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    /// Show a message to the operator.
    async fn notify(&self, message: &str);

    /// Next line typed by the operator, `None` once input is closed.
    async fn read_line(&self) -> Option<String>;
}

/// Operator on the terminal: messages on stderr, answers from stdin.
pub struct StdinOperator {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinOperator {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdinOperator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OperatorPrompt for StdinOperator {
    async fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }

    async fn read_line(&self) -> Option<String> {
        self.lines.lock().await.next_line().await.ok().flatten()
    }
}

/// Operator replaying prepared answers. Records every message it is shown.
#[derive(Default)]
pub struct ScriptedOperator {
    answers: Mutex<VecDeque<String>>,
    notes: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            notes: Mutex::new(Vec::new()),
        }
    }

    pub async fn notes(&self) -> Vec<String> {
        self.notes.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.answers.lock().await.len()
    }
}

#[async_trait]
impl OperatorPrompt for ScriptedOperator {
    async fn notify(&self, message: &str) {
        self.notes.lock().await.push(message.to_string());
    }

    async fn read_line(&self) -> Option<String> {
        self.answers.lock().await.pop_front()
    }
}
