///
/// Outcome of marking every unread notification as read.
/// Requests are independent so some of them may fail.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MarkAllAsReadReport {
    pub marked: Vec<String>,
    pub failed: Vec<String>,
}

impl MarkAllAsReadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
