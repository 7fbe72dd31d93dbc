/// One unit of content delivered to the chat.
///
/// `path` identifies the corpus file the text came from; generated messages
/// have none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub path: Option<String>,
    pub text: String,
}

impl Message {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            text: text.into(),
        }
    }

    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            path: None,
            text: text.into(),
        }
    }

    /// Path for log and diagnostic output.
    pub fn display_path(&self) -> &str {
        self.path.as_deref().unwrap_or("<generated>")
    }
}
