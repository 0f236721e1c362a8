use super::message::Message;
use crate::api::ConversationContext;

/// Recognized symptom phrases and the token sent to the chat service
pub const SYMPTOM_VOCABULARY: &[(&str, &str)] = &[
    ("demam", "demam"),
    ("sakit kepala", "sakit_kepala"),
    ("batuk", "batuk"),
    ("pilek", "pilek"),
    ("mual", "mual"),
    ("muntah", "muntah"),
    ("diare", "diare"),
    ("sakit perut", "sakit_perut"),
    ("sesak nafas", "sesak_nafas"),
    ("nyeri", "nyeri"),
    ("pusing", "pusing"),
    ("lemas", "lemas"),
    ("meriang", "meriang"),
    ("gatal", "gatal"),
    ("ruam", "ruam"),
];

/// Derive the context from the user messages in `history`
///
/// Stateless: the result depends only on the history. Terms come back in
/// vocabulary order, each at most once. Assistant messages are ignored.
pub fn extract_context(history: &[Message]) -> ConversationContext {
    let user_text = history
        .iter()
        .filter(|message| message.is_user())
        .map(|message| message.text().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let medical_terms = SYMPTOM_VOCABULARY
        .iter()
        .filter(|(phrase, _)| user_text.contains(*phrase))
        .map(|(_, token)| token.to_string())
        .collect();

    ConversationContext { medical_terms }
}
