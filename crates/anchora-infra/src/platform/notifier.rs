// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anchora_core::platform::StatusNotifier;
use std::sync::Mutex;

/// A [`StatusNotifier`] that writes messages to the log and remembers the last one.
#[derive(Debug, Default)]
pub struct LogNotifier {
    current: Mutex<Option<String>>,
}

impl LogNotifier {
    /// Creates a notifier with nothing shown.
    pub fn new() -> Self {
        Self::default()
    }

    /// The message currently shown, if any.
    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, message: Option<String>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = message;
    }
}

impl StatusNotifier for LogNotifier {
    fn show_message(&self, message: &str) {
        log::info!("[status] {message}");
        self.set(Some(message.to_string()));
    }

    fn show_error(&self, message: &str) {
        log::error!("[status] {message}");
        self.set(Some(message.to_string()));
    }

    fn hide(&self) {
        self.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_last_message_until_hidden() {
        let notifier = LogNotifier::new();
        notifier.show_message("Searching for surfaces...");
        notifier.show_error("This device does not support AR");
        assert_eq!(
            notifier.current().as_deref(),
            Some("This device does not support AR")
        );
        notifier.hide();
        assert_eq!(notifier.current(), None);
    }
}
