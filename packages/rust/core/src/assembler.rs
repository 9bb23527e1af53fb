//! Outbound payload assembly.
//!
//! Builds the message list sent to the provider: one system message carrying
//! the persona and retrieved context, followed by a sliding window over the
//! transcript's user/assistant turns.

use tecnobot_shared::{Message, Transcript};

use crate::persona::Persona;

/// Number of prior user/assistant messages sent with each request.
pub const HISTORY_WINDOW: usize = 10;

/// Assemble one system message followed by the last `window` non-system
/// transcript entries.
///
/// The transcript is expected to already end with the new user message.
/// System entries stored in the transcript are never forwarded; the only
/// system message in the payload is the freshly built one.
pub fn assemble(
    persona: &Persona,
    transcript: &Transcript,
    context: &str,
    window: usize,
) -> Vec<Message> {
    let turns = transcript.recent_turns(window);

    let mut payload = Vec::with_capacity(turns.len() + 1);
    payload.push(Message::system(persona.system_prompt(context)));
    payload.extend(turns.into_iter().cloned());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use tecnobot_shared::Role;

    fn long_transcript(n: usize) -> Transcript {
        let mut t = Transcript::new();
        t.push(Message::assistant("¡Hola!"));
        for i in 0..n {
            t.push(Message::user(format!("pregunta {i}")));
            t.push(Message::assistant(format!("respuesta {i}")));
        }
        t
    }

    #[test]
    fn payload_is_bounded_for_any_length() {
        let persona = Persona::default();
        for n in [0, 1, 4, 5, 6, 20, 100] {
            let mut t = long_transcript(n);
            t.push(Message::user("nueva"));
            let payload = assemble(&persona, &t, "ctx", HISTORY_WINDOW);

            let system = payload.iter().filter(|m| m.role == Role::System).count();
            assert_eq!(system, 1, "n={n}");
            assert!(payload.len() - 1 <= HISTORY_WINDOW, "n={n}");
            assert_eq!(payload[0].role, Role::System);
            assert_eq!(payload.last().unwrap().content, "nueva");
        }
    }

    #[test]
    fn window_keeps_oldest_first() {
        let mut t = long_transcript(10);
        t.push(Message::user("nueva"));
        let payload = assemble(&Persona::default(), &t, "ctx", HISTORY_WINDOW);

        let contents: Vec<&str> = payload[1..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents.first(), Some(&"respuesta 5"));
        assert_eq!(contents.last(), Some(&"nueva"));
        assert_eq!(contents.len(), 10);
    }

    #[test]
    fn stored_system_entries_are_dropped() {
        let mut t = Transcript::new();
        t.push(Message::system("viejo prompt"));
        t.push(Message::user("hola"));
        let payload = assemble(&Persona::default(), &t, "ctx", HISTORY_WINDOW);

        assert_eq!(payload.len(), 2);
        assert!(!payload[0].content.contains("viejo prompt"));
        assert!(payload[0].content.ends_with("\nctx"));
    }

    #[test]
    fn short_history_is_sent_whole() {
        let mut t = Transcript::new();
        t.push(Message::assistant("¡Hola!"));
        t.push(Message::user("¿Cuál es el horario?"));
        let payload = assemble(&Persona::default(), &t, "- Clases de 8 a 18hs.\n", HISTORY_WINDOW);

        assert_eq!(payload.len(), 3);
        assert_eq!(payload[1].role, Role::Assistant);
        assert_eq!(payload[2].role, Role::User);
    }
}
