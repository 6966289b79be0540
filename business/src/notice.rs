use roughcode_states::State;

pub const REPORTED_NOTICE: &str = "신고하였습니다";

/// User-visible notices waiting to be shown, oldest first.
#[derive(Debug, Default)]
pub struct Notices {
    queue: Vec<String>,
}

impl State for Notices {}

impl Notices {
    pub fn push(&mut self, message: impl Into<String>) {
        self.queue.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn peek(&self) -> Option<&str> {
        self.queue.first().map(String::as_str)
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.queue)
    }
}
