//! Fixed interviewer wording: template questions and the scripted utterances.

use super::Stage;

/// Spoken when the opening question could not be generated.
pub const OPENING_FALLBACK: &str =
    "Hello! I'm your AI interviewer today. Could you please introduce yourself?";

/// Spoken when the candidate stays silent past the response timeout.
pub const REPROMPT: &str = "I didn't catch that. Could you please repeat your answer?";

/// Spoken once when the interview closes.
pub const CLOSING_REMARKS: &str = "Thank you for taking the time to interview with us today. \
You should hear back about the next steps within a few days. Have a great day!";

/// Template questions for a stage.
pub fn questions_for(stage: Stage) -> &'static [&'static str; 3] {
    match stage {
        Stage::Introduction => &[
            "Hello! I'm your AI interviewer today. Could you please introduce yourself and tell me a bit about your background?",
            "Welcome to the interview! Let's start with you telling me about yourself and what interests you about this role.",
            "Hi there! I'm excited to learn more about you. Could you walk me through your professional journey so far?",
        ],
        Stage::Background => &[
            "Can you tell me about a recent project you worked on that you're particularly proud of?",
            "What's the most challenging technical problem you've solved recently?",
            "Describe a time when you had to learn a new technology quickly. How did you approach it?",
        ],
        Stage::TechnicalSkills => &[
            "Let's dive into your technical expertise. Can you explain a technology you know well and how you've used it?",
            "Walk me through how you would approach designing a system for a product you've worked on.",
            "What are some best practices you follow when writing code?",
        ],
        Stage::ProblemSolving => &[
            "Tell me about a hard technical challenge you faced. How did you approach solving it?",
            "If you encountered a performance issue in production, what steps would you take to diagnose and fix it?",
            "Describe your debugging process when facing a complex issue.",
        ],
        Stage::Behavioral => &[
            "Tell me about a time when you disagreed with a team member. How did you handle it?",
            "Describe a situation where you had to work under tight deadlines. How did you manage?",
            "Can you give me an example of when you went above and beyond in your role?",
        ],
        Stage::ScenarioBased => &[
            "Imagine you're tasked with improving the performance of a slow application. Walk me through your approach.",
            "How would you handle a situation where a critical bug is discovered right before a major release?",
            "If you had to explain a complex technical concept to a non-technical stakeholder, how would you do it?",
        ],
        Stage::Closing => &[
            "Do you have any questions about the role or the company?",
            "Is there anything else you'd like to share that we haven't covered?",
            "What are you most excited about regarding this opportunity?",
        ],
    }
}

/// Template question used when the next question could not be generated.
pub fn fallback_question(stage: Stage, questions_asked: u32) -> &'static str {
    let templates = questions_for(stage);
    templates[questions_asked as usize % templates.len()]
}
