pub trait FeedbackChannel {
    fn show_error(&mut self, title: &str, message: &str);
    fn show_success(&mut self, title: &str, message: &str);
}

impl<F: FeedbackChannel + ?Sized> FeedbackChannel for &mut F {
    fn show_error(&mut self, title: &str, message: &str) {
        (**self).show_error(title, message);
    }

    fn show_success(&mut self, title: &str, message: &str) {
        (**self).show_success(title, message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Error { title: String, message: String },
    Success { title: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingFeedback {
    entries: Vec<Feedback>,
}

impl RecordingFeedback {
    pub fn entries(&self) -> &[Feedback] {
        &self.entries
    }

    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Feedback::Error { title, message } => Some((title.as_str(), message.as_str())),
                Feedback::Success { .. } => None,
            })
            .collect()
    }
}

impl FeedbackChannel for RecordingFeedback {
    fn show_error(&mut self, title: &str, message: &str) {
        self.entries.push(Feedback::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn show_success(&mut self, title: &str, message: &str) {
        self.entries.push(Feedback::Success {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
