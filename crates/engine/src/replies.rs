//! Canned reply texts.

pub const NAME_PROMPT: &str = "Hi! I'm Chaty, your support assistant. What's your name?";
pub const NAME_REPROMPT: &str = "I didn't catch that. Could you tell me your name?";
pub const RESET: &str = "Let's start over. What's your name?";
pub const FAREWELL: &str = "Your session has been ended. Have a great day!";
pub const APOLOGY: &str = "Sorry, I am having trouble responding right now.";
pub const HELP: &str = "You can ask me any question and I'll do my best to answer. \
Commands: 'help' shows this message, 'reset' starts over with a new name, \
'exit' ends the session.";

pub fn greeting(name: &str) -> String {
    format!("Nice to meet you, {name}! How can I assist you today?")
}
