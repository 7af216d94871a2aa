/// Hard limit on composer input, in characters
pub const MAX_INPUT_CHARS: usize = 200;

/// Free-text input the user is composing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    value: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the input, keeping only the first `MAX_INPUT_CHARS` characters
    pub fn set(&mut self, value: &str) {
        self.value = truncate_chars(value, MAX_INPUT_CHARS);
    }

    /// Shift+Enter: line break, still subject to the limit
    pub fn insert_newline(&mut self) {
        if self.char_count() < MAX_INPUT_CHARS {
            self.value.push('\n');
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Live counter shown under the input
    pub fn counter_label(&self) -> String {
        format!("{}/{} characters", self.char_count(), MAX_INPUT_CHARS)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
