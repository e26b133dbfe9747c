use crate::ResultSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One instruction for the view layer, emitted by `update` as `Effect::Present`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Status(String),
    Results(ResultSet),
    Notice { message: String, level: NoticeLevel },
}

impl Presentation {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
            level: NoticeLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }

    /// Route this instruction to the matching sink method.
    pub fn deliver(&self, sink: &mut dyn PresentationSink) {
        match self {
            Presentation::Status(text) => sink.show_status(text),
            Presentation::Results(results) => sink.show_results(results),
            Presentation::Notice { message, level } => sink.show_notice(message, *level),
        }
    }
}

/// The narrow surface through which the core reaches the view layer.
pub trait PresentationSink {
    fn show_status(&mut self, text: &str);
    fn show_results(&mut self, results: &ResultSet);
    fn show_notice(&mut self, message: &str, level: NoticeLevel);
}
