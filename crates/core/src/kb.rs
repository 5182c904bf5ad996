//! Canned knowledge-base answers.
//!
//! A question matches the first topic whose keyword appears in it,
//! case-insensitively. Order in [`TOPICS`] is significant.

use crate::payload::ResponsePayload;

/// Keyword and answer pairs, checked in order.
pub const TOPICS: &[(&str, &str)] = &[
    (
        "shipping time",
        "Standard international shipping takes 5-10 business days. Express shipping takes 2-4 business days.",
    ),
    (
        "customs",
        "Customs duties and import taxes are set by the destination country and are paid by the recipient unless \
         the shipment was sent with duties prepaid.",
    ),
    ("tariff", "Tariff rates depend on the destination country. Use the tariff lookup with a country code for details."),
    (
        "return",
        "Returns are accepted within 30 days of delivery. Contact support with your tracking number to start a return.",
    ),
    (
        "lost",
        "If a package shows no tracking updates for 10 business days, open a lost package claim with your tracking \
         number.",
    ),
    (
        "insurance",
        "Shipments are insured up to 100 USD by default. Additional coverage can be purchased at checkout.",
    ),
    ("track", "Enter your tracking number in the tracking lookup to see the latest status of your package."),
];

/// Answer for questions that match no topic.
pub const NO_ANSWER: &str = "Sorry, I don't have an answer to that question.";

/// Find the answer for `question`, if any topic matches.
pub fn lookup(question: &str) -> Option<&'static str> {
    let question = question.to_lowercase();
    TOPICS
        .iter()
        .find(|(keyword, _)| question.contains(keyword))
        .map(|(_, answer)| *answer)
}

/// Answer `question`, falling back to [`NO_ANSWER`].
pub fn answer(question: &str) -> ResponsePayload {
    ResponsePayload::Kb { question: question.to_string(), answer: lookup(question).unwrap_or(NO_ANSWER).to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_substring_case_insensitive() {
        let payload = answer("What is the SHIPPING TIME?");
        let ResponsePayload::Kb { question, answer } = payload else { panic!("expected kb payload") };
        assert_eq!(question, "What is the SHIPPING TIME?");
        assert_eq!(answer, TOPICS[0].1);
    }

    #[test]
    fn test_shipping_time_question() {
        assert_eq!(lookup("What is the shipping time?"), Some(TOPICS[0].1));
    }

    #[test]
    fn test_unmatched_question() {
        assert_eq!(lookup("Do you ship to the moon?"), None);
        let ResponsePayload::Kb { answer, .. } = answer("Do you ship to the moon?") else { panic!("expected kb") };
        assert_eq!(answer, NO_ANSWER);
        assert!(answer.contains("don't have an answer"));
    }

    #[test]
    fn test_first_topic_wins() {
        // Mentions both customs and tracking; customs is listed first.
        let expected = TOPICS.iter().find(|(k, _)| *k == "customs").unwrap().1;
        assert_eq!(lookup("Will tracking show customs delays?"), Some(expected));
    }
}
