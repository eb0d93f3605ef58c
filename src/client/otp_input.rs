use crate::otp::{OtpCode, OTP_LEN};

/// Six single-digit boxes with a focus cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpInput {
    boxes: [Option<char>; OTP_LEN],
    focus: usize,
}

impl OtpInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn digit(&self, index: usize) -> Option<char> {
        self.boxes.get(index).copied().flatten()
    }

    /// Handles typing into box `index`. Only the last typed character is kept
    /// and it is dropped unless it is a digit; any keystroke moves focus on.
    pub fn enter(&mut self, index: usize, typed: &str) {
        if index >= OTP_LEN {
            return;
        }
        self.boxes[index] = typed.chars().last().filter(char::is_ascii_digit);
        if !typed.is_empty() && index < OTP_LEN - 1 {
            self.focus = index + 1;
        }
    }

    /// Backspace clears a filled box in place, or steps back from an empty one.
    pub fn backspace(&mut self, index: usize) {
        if index >= OTP_LEN {
            return;
        }
        if self.boxes[index].take().is_none() && index > 0 {
            self.focus = index - 1;
        }
    }

    /// Pastes a whole code, ignoring anything that is not a digit.
    pub fn fill(&mut self, text: &str) {
        self.clear();
        for (index, digit) in text.chars().filter(char::is_ascii_digit).take(OTP_LEN).enumerate() {
            self.boxes[index] = Some(digit);
            self.focus = index;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Entered digits concatenated in box order.
    pub fn value(&self) -> String {
        self.boxes.iter().flatten().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.boxes.iter().all(Option::is_some)
    }

    pub fn code(&self) -> Option<OtpCode> {
        if self.is_complete() {
            OtpCode::parse(&self.value()).ok()
        } else {
            None
        }
    }
}
