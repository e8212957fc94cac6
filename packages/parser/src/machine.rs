//! Operation state machine.
//!
//! Consumes the token stream and produces one [`SealedOperation`] per
//! operation header, in document order:
//!
//! ```text
//! Idle ──HeaderOpen──▶ HeaderCapture ──Trigger──▶ BodyCapture
//!   ▲                        │                        │
//!   └──── Título / heading / next HeaderOpen / end of input (seal) ◀┘
//! ```
//!
//! A Título heading seals in every state and updates the title context.
//! Other headings seal an open operation, except as the very first line of
//! a body (an incorporated chapter starts with its own heading). A closing
//! dictamen article ("ARTÍCULO 91- Comuníquese…") seals and returns to idle.
//!
//! Outside incorporations the header stops growing once it reads as a
//! finished sentence, and a verb-less `ARTÍCULO N-` line ends it.

use cotejo_shared::{Action, NO_TITLE};

use crate::config::MAX_HEADER_LINES;
use crate::header::Token;
use crate::lexer::HeadingKind;

/// An operation whose capture is complete, before target/law resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedOperation {
    pub dictamen_article: String,
    pub title_context: String,
    pub action: Action,
    /// Header lines joined with single spaces.
    pub header: String,
    /// Captured replacement text, `None` when nothing was captured.
    pub body: Option<String>,
}

#[derive(Debug)]
struct OpenOperation {
    dictamen_article: String,
    title_context: String,
    action: Action,
    header: Vec<String>,
    continuation_lines: usize,
    body: Vec<String>,
}

impl OpenOperation {
    fn new(dictamen_article: String, title_context: String, action: Action, header: String) -> Self {
        Self {
            dictamen_article,
            title_context,
            action,
            header: vec![header],
            continuation_lines: 0,
            body: Vec::new(),
        }
    }

    fn push_header(&mut self, line: String) {
        if !line.is_empty() {
            self.header.push(line);
        }
        self.continuation_lines += 1;
    }

    fn push_body(&mut self, line: String) {
        self.body.push(line);
    }

    /// Keep at most one blank between paragraphs, none at the start.
    fn push_blank(&mut self) {
        if self.body.last().is_some_and(|l| !l.is_empty()) {
            self.body.push(String::new());
        }
    }

    fn header_exhausted(&self) -> bool {
        self.continuation_lines >= MAX_HEADER_LINES
    }

    /// The header reads as a finished sentence or introduction.
    fn header_complete(&self) -> bool {
        self.header
            .last()
            .is_some_and(|l| l.trim_end().ends_with(['.', ':']))
    }

    /// The header announces a text without a recognised trigger phrase
    /// ("… en los siguientes términos:").
    fn header_introduces_text(&self) -> bool {
        self.header.last().is_some_and(|l| l.trim_end().ends_with(':'))
    }

    fn seal(self) -> SealedOperation {
        let body = self.body.join("\n");
        let body = body
            .trim()
            .trim_matches(['"', '“', '”', '«', '»'])
            .trim()
            .to_string();
        SealedOperation {
            dictamen_article: self.dictamen_article,
            title_context: self.title_context,
            action: self.action,
            header: self.header.join(" "),
            body: (!body.is_empty()).then_some(body),
        }
    }
}

#[derive(Debug)]
enum State {
    Idle,
    HeaderCapture(OpenOperation),
    BodyCapture(OpenOperation),
}

/// The operation state machine.
#[derive(Debug)]
pub struct OperationMachine {
    state: State,
    title_context: String,
    sealed: Vec<SealedOperation>,
}

impl Default for OperationMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationMachine {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            title_context: NO_TITLE.to_string(),
            sealed: Vec::new(),
        }
    }

    /// Run the machine over a whole token stream.
    pub fn run(tokens: impl IntoIterator<Item = Token>) -> Vec<SealedOperation> {
        let mut machine = Self::new();
        for token in tokens {
            machine.feed(token);
        }
        machine.finish()
    }

    /// Name of the current state, for diagnostics.
    pub fn state_name(&self) -> &'static str {
        match self.state {
            State::Idle => "Idle",
            State::HeaderCapture(_) => "HeaderCapture",
            State::BodyCapture(_) => "BodyCapture",
        }
    }

    /// Title context applied to operations opened from now on.
    pub fn title_context(&self) -> &str {
        &self.title_context
    }

    /// Apply one token.
    pub fn feed(&mut self, token: Token) {
        let state = std::mem::replace(&mut self.state, State::Idle);
        self.state = match (state, token) {
            (
                state,
                Token::Heading {
                    kind: HeadingKind::Title,
                    number,
                    line,
                },
            ) => {
                self.seal(state);
                self.title_context = number.unwrap_or(line);
                tracing::debug!(title = %self.title_context, "entering dictamen title");
                State::Idle
            }
            (State::BodyCapture(mut open), Token::Heading { line, .. }) if open.body.is_empty() => {
                open.push_body(line);
                State::BodyCapture(open)
            }
            (state, Token::Heading { .. }) => {
                self.seal(state);
                State::Idle
            }
            (
                state,
                Token::HeaderOpen {
                    dictamen_article,
                    action,
                    header,
                },
            ) => {
                self.seal(state);
                tracing::debug!(dictamen_article = %dictamen_article, action = %action, "opening operation");
                State::HeaderCapture(OpenOperation::new(
                    dictamen_article,
                    self.title_context.clone(),
                    action,
                    header,
                ))
            }
            (State::HeaderCapture(mut open), Token::Trigger { before, after, .. }) => {
                if open.header_exhausted() {
                    State::HeaderCapture(open)
                } else {
                    open.push_header(before);
                    if let Some(after) = after {
                        open.push_body(after);
                    }
                    State::BodyCapture(open)
                }
            }
            (state, Token::Closing { line }) => {
                tracing::debug!(line = %line, "closing article");
                self.seal(state);
                State::Idle
            }
            (State::HeaderCapture(mut open), Token::Text { line, article_like }) => {
                let starts_body = open.header_introduces_text()
                    || (open.action.is_insertion()
                        && (article_like || open.header_complete() || open.header_exhausted()));
                if starts_body {
                    open.push_body(line);
                    State::BodyCapture(open)
                } else if article_like {
                    self.seal(State::HeaderCapture(open));
                    State::Idle
                } else {
                    if !open.header_complete() && !open.header_exhausted() {
                        open.push_header(line);
                    }
                    State::HeaderCapture(open)
                }
            }
            (State::HeaderCapture(open), Token::Blank) => State::HeaderCapture(open),
            (State::BodyCapture(mut open), Token::Trigger { line, .. } | Token::Text { line, .. }) => {
                open.push_body(line);
                State::BodyCapture(open)
            }
            (State::BodyCapture(mut open), Token::Blank) => {
                open.push_blank();
                State::BodyCapture(open)
            }
            (State::Idle, Token::Trigger { .. } | Token::Text { .. } | Token::Blank) => State::Idle,
        };
    }

    /// Seal whatever is open and return every operation in document order.
    pub fn finish(mut self) -> Vec<SealedOperation> {
        let state = std::mem::replace(&mut self.state, State::Idle);
        self.seal(state);
        self.sealed
    }

    fn seal(&mut self, state: State) {
        if let State::HeaderCapture(open) | State::BodyCapture(open) = state {
            let sealed = open.seal();
            tracing::debug!(
                dictamen_article = %sealed.dictamen_article,
                has_body = sealed.body.is_some(),
                "sealed operation"
            );
            self.sealed.push(sealed);
        }
    }
}
